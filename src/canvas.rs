use eframe::egui;
use egui::{Pos2, Vec2};
use image::{Rgba, RgbaImage};

use crate::log_warn;

/// Logical canvas size used when no settings override it.
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Longest side of the physical buffer. Larger canvases shrink their logical size to fit.
pub const MAX_PHYSICAL_SIDE: u32 = 8192;
pub const MAX_PIXEL_RATIO: f32 = 8.0;

/// Fully transparent pixel. A freshly created or cleared canvas holds only these.
pub const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Opaque paper white. The eraser paints with this instead of punching alpha.
pub const PAPER_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

// ============================================================================
// SURFACE — the single pixel buffer owned by a drawing pad
// ============================================================================

/// Raster surface with a fixed logical size, backed by a physical buffer of
/// `round(logical × pixel_ratio)` pixels.
///
/// Every drawing entry point takes logical coordinates; the surface does the
/// scaling. `generation` is bumped on each mutation so presenters can skip
/// texture uploads when nothing changed.
pub struct Surface {
    width: u32,
    height: u32,
    pixel_ratio: f32,
    pixels: RgbaImage,
    generation: u64,
}

impl Surface {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            log_warn!("Surface: invalid pixel ratio {}, using 1.0", pixel_ratio);
            1.0
        };
        let max_side = ((MAX_PHYSICAL_SIDE as f32 / pixel_ratio).floor() as u32).max(1);
        if width > max_side || height > max_side {
            log_warn!(
                "Surface: {}x{} @{}x exceeds {} physical px, clamping",
                width,
                height,
                pixel_ratio,
                MAX_PHYSICAL_SIDE
            );
        }
        let width = width.clamp(1, max_side);
        let height = height.clamp(1, max_side);
        let phys_w = ((width as f32 * pixel_ratio).round() as u32).max(1);
        let phys_h = ((height as f32 * pixel_ratio).round() as u32).max(1);

        Self {
            width,
            height,
            pixel_ratio,
            pixels: RgbaImage::from_pixel(phys_w, phys_h, BLANK),
            generation: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Size of the backing buffer in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn to_physical(&self, p: Pos2) -> Pos2 {
        Pos2::new(p.x * self.pixel_ratio, p.y * self.pixel_ratio)
    }

    /// Pixel under a logical point, or `None` outside the canvas.
    pub fn pixel_at(&self, p: Pos2) -> Option<Rgba<u8>> {
        let phys = self.to_physical(p);
        if phys.x < 0.0 || phys.y < 0.0 {
            return None;
        }
        let (x, y) = (phys.x.floor() as u32, phys.y.floor() as u32);
        let (w, h) = self.pixels.dimensions();
        if x >= w || y >= h {
            return None;
        }
        Some(*self.pixels.get_pixel(x, y))
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| *p == BLANK)
    }

    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = BLANK;
        }
        self.touch();
    }

    /// Frozen copy of the current buffer.
    pub fn snapshot(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Overwrite the buffer with a snapshot taken from this surface.
    pub fn restore(&mut self, snapshot: &RgbaImage) {
        if snapshot.dimensions() != self.pixels.dimensions() {
            log_warn!(
                "Surface::restore: snapshot {:?} does not match surface {:?}",
                snapshot.dimensions(),
                self.pixels.dimensions()
            );
            return;
        }
        self.pixels.copy_from_slice(snapshot.as_raw());
        self.touch();
    }

    // -- Raster primitives (logical coordinates) -------------------------

    /// Anti-aliased, round-capped line segment `width` logical pixels wide.
    pub fn stroke_segment(&mut self, from: Pos2, to: Pos2, width: f32, color: Rgba<u8>) {
        let a = self.to_physical(from);
        let b = self.to_physical(to);
        let radius = (width * self.pixel_ratio * 0.5).max(0.5);
        let pad = radius + 1.0;
        let (phys_w, phys_h) = self.pixels.dimensions();

        let x0 = ((a.x.min(b.x) - pad).floor() as i32).max(0);
        let y0 = ((a.y.min(b.y) - pad).floor() as i32).max(0);
        let x1 = ((a.x.max(b.x) + pad).ceil() as i32).min(phys_w as i32);
        let y1 = ((a.y.max(b.y) + pad).ceil() as i32).min(phys_h as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for y in y0..y1 {
            for x in x0..x1 {
                let d = distance_to_segment(x as f32 + 0.5, y as f32 + 0.5, a, b);
                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(x, y, color, coverage);
                }
            }
        }
        self.touch();
    }

    /// Hard-edged `size` logical rectangle with its top-left corner at `at`,
    /// snapped to whole physical pixels (at least one).
    pub fn fill_rect(&mut self, at: Pos2, size: Vec2, color: Rgba<u8>) {
        let phys = self.to_physical(at);
        if !phys.x.is_finite() || !phys.y.is_finite() {
            return;
        }
        let (phys_w, phys_h) = self.pixels.dimensions();
        let w = ((size.x * self.pixel_ratio).round() as i64).max(1);
        let h = ((size.y * self.pixel_ratio).round() as i64).max(1);
        let left = phys.x.floor() as i64;
        let top = phys.y.floor() as i64;

        // Clip to the buffer in i64 so far-off points can't overflow
        let x0 = left.max(0);
        let y0 = top.max(0);
        let x1 = left.saturating_add(w).min(phys_w as i64);
        let y1 = top.saturating_add(h).min(phys_h as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x as i32, y as i32, color, 1.0);
            }
        }
        self.touch();
    }

    /// Source-over composite of a straight-alpha RGBA buffer whose top-left
    /// corner sits at physical `(offset_x, offset_y)`.
    pub fn composite_rgba(&mut self, buf: &[u8], buf_w: u32, buf_h: u32, offset_x: i32, offset_y: i32) {
        if buf.len() < buf_w as usize * buf_h as usize * 4 {
            log_warn!("Surface::composite_rgba: buffer shorter than {}x{}", buf_w, buf_h);
            return;
        }
        for row in 0..buf_h {
            for col in 0..buf_w {
                let idx = (row as usize * buf_w as usize + col as usize) * 4;
                let a = buf[idx + 3];
                if a == 0 {
                    continue;
                }
                let color = Rgba([buf[idx], buf[idx + 1], buf[idx + 2], 255]);
                self.blend_pixel(
                    offset_x + col as i32,
                    offset_y + row as i32,
                    color,
                    a as f32 / 255.0,
                );
            }
        }
        self.touch();
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
        let (w, h) = self.pixels.dimensions();
        if x < 0 || y < 0 || x as u32 >= w || y as u32 >= h {
            return;
        }
        let sa = color[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        *dst = source_over(*dst, color, sa);
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Porter-Duff source-over of `src` (effective alpha `sa`) onto `dst`, straight alpha.
pub(crate) fn source_over(dst: Rgba<u8>, src: Rgba<u8>, sa: f32) -> Rgba<u8> {
    if sa >= 1.0 {
        return Rgba([src[0], src[1], src[2], 255]);
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return BLANK;
    }
    let mix = |s: u8, d: u8| -> u8 {
        ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Distance from `(px, py)` to the segment `a`–`b`.
#[inline]
fn distance_to_segment(px: f32, py: f32, a: Pos2, b: Pos2) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    let t = if len2 < 1e-6 {
        0.0
    } else {
        (((px - a.x) * dx + (py - a.y) * dy) / len2).clamp(0.0, 1.0)
    };
    let cx = a.x + t * dx;
    let cy = a.y + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}
