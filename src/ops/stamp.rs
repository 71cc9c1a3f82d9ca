// ============================================================================
// STAMP RASTERIZATION — scaled, rotated bitmap placement
// ============================================================================

use eframe::egui;
use egui::Pos2;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::canvas::Surface;
use crate::components::tools::StampKind;

/// Where and how a stamp lands on the canvas, in logical units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedStamp {
    pub kind: StampKind,
    pub center: Pos2,
    /// Edge length of the square the bitmap is scaled into.
    pub size: f32,
    /// Clockwise rotation around `center`, in degrees.
    pub rotation: u32,
}

impl PlacedStamp {
    pub fn new(kind: StampKind, center: Pos2, brush_size: u32, rotation: u32) -> Self {
        Self {
            kind,
            center,
            size: (brush_size * kind.size_multiplier()) as f32,
            rotation: rotation % 360,
        }
    }

    pub fn with_rotation(&self, rotation: u32) -> Self {
        Self {
            rotation: rotation % 360,
            ..*self
        }
    }
}

/// Draw `bitmap` onto the surface as described by `placed`.
pub fn draw_stamp(surface: &mut Surface, bitmap: &RgbaImage, placed: &PlacedStamp) {
    let (canvas_w, canvas_h) = surface.physical_size();
    let (buf, buf_w, buf_h, x0, y0) =
        rasterize_stamp(bitmap, placed, surface.pixel_ratio(), canvas_w, canvas_h);
    if buf_w == 0 || buf_h == 0 {
        return;
    }
    surface.composite_rgba(&buf, buf_w, buf_h, x0, y0);
}

/// Rasterize a stamp into a straight-alpha RGBA buffer in physical pixels.
///
/// Returns `(buf, buf_w, buf_h, offset_x, offset_y)` where offset is the
/// top-left corner of the buffer on the canvas.
pub fn rasterize_stamp(
    bitmap: &RgbaImage,
    placed: &PlacedStamp,
    pixel_ratio: f32,
    canvas_w: u32,
    canvas_h: u32,
) -> (Vec<u8>, u32, u32, i32, i32) {
    let (bmp_w, bmp_h) = bitmap.dimensions();
    let size = placed.size * pixel_ratio;
    if bmp_w == 0 || bmp_h == 0 || size <= 0.0 {
        return (Vec::new(), 0, 0, 0, 0);
    }

    let half = size * 0.5;
    let cx = placed.center.x * pixel_ratio;
    let cy = placed.center.y * pixel_ratio;
    let (sin_r, cos_r) = (placed.rotation as f32).to_radians().sin_cos();

    // Axis-aligned box around the rotated square
    let corners = [(-half, -half), (half, -half), (half, half), (-half, half)];
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for (lx, ly) in &corners {
        let rx = lx * cos_r - ly * sin_r + cx;
        let ry = lx * sin_r + ly * cos_r + cy;
        min_x = min_x.min(rx);
        min_y = min_y.min(ry);
        max_x = max_x.max(rx);
        max_y = max_y.max(ry);
    }

    let x0 = ((min_x - 1.0).floor() as i32).max(0);
    let y0 = ((min_y - 1.0).floor() as i32).max(0);
    let x1 = ((max_x + 1.0).ceil() as i32).min(canvas_w as i32);
    let y1 = ((max_y + 1.0).ceil() as i32).min(canvas_h as i32);
    let buf_w = (x1 - x0).max(0) as u32;
    let buf_h = (y1 - y0).max(0) as u32;
    if buf_w == 0 || buf_h == 0 {
        return (Vec::new(), 0, 0, 0, 0);
    }

    let row_bytes = buf_w as usize * 4;
    let mut buf = vec![0u8; row_bytes * buf_h as usize];
    let scale_x = bmp_w as f32 / size;
    let scale_y = bmp_h as f32 / size;

    buf.par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(row, row_buf)| {
            let py = (y0 + row as i32) as f32 + 0.5;
            for col in 0..buf_w as usize {
                let px = (x0 + col as i32) as f32 + 0.5;

                // Inverse-rotate into stamp-local space
                let dx = px - cx;
                let dy = py - cy;
                let lx = dx * cos_r + dy * sin_r;
                let ly = -dx * sin_r + dy * cos_r;
                if lx.abs() > half + 1.0 || ly.abs() > half + 1.0 {
                    continue;
                }

                let u = (lx + half) * scale_x - 0.5;
                let v = (ly + half) * scale_y - 0.5;
                let p = bilinear_sample(bitmap, u, v);
                if p[3] == 0 {
                    continue;
                }
                let idx = col * 4;
                row_buf[idx..idx + 4].copy_from_slice(&p.0);
            }
        });

    (buf, buf_w, buf_h, x0, y0)
}

/// Bilinear sample with transparent edges outside the bitmap.
fn bilinear_sample(img: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let sample = |sx: i32, sy: i32| -> [f32; 4] {
        if sx < 0 || sy < 0 || sx >= img.width() as i32 || sy >= img.height() as i32 {
            [0.0; 4]
        } else {
            let p = img.get_pixel(sx as u32, sy as u32);
            [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
        }
    };

    let tl = sample(x0, y0);
    let tr = sample(x0 + 1, y0);
    let bl = sample(x0, y0 + 1);
    let br = sample(x0 + 1, y0 + 1);

    // Weight colour by alpha so transparent neighbours don't darken edges
    let weights = [
        (1.0 - fx) * (1.0 - fy),
        fx * (1.0 - fy),
        (1.0 - fx) * fy,
        fx * fy,
    ];
    let texels = [tl, tr, bl, br];
    let mut alpha = 0.0;
    let mut rgb = [0.0f32; 3];
    for (t, w) in texels.iter().zip(weights.iter()) {
        let a = t[3] * w;
        alpha += a;
        for c in 0..3 {
            rgb[c] += t[c] * a;
        }
    }
    if alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    Rgba([
        (rgb[0] / alpha).round().clamp(0.0, 255.0) as u8,
        (rgb[1] / alpha).round().clamp(0.0, 255.0) as u8,
        (rgb[2] / alpha).round().clamp(0.0, 255.0) as u8,
        alpha.round().clamp(0.0, 255.0) as u8,
    ])
}
