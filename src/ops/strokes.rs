// ============================================================================
// FREEHAND STROKE RULES — brush, pencil, crayon, spray, eraser
// ============================================================================

use eframe::egui;
use egui::{Pos2, Vec2, vec2};
use image::Rgba;
use rand::Rng;

use crate::canvas::{PAPER_WHITE, Surface};
use crate::components::tools::Tool;

/// Micro-segments laid down per crayon move.
pub const CRAYON_SEGMENTS: usize = 3;
/// Dots laid down per spray move.
pub const SPRAY_DOTS: usize = 10;

/// Render one pointer move of a freehand stroke from `from` to `to`.
///
/// Crayon and spray only look at `to` and draw random texture around it.
/// Stamp tools never drag, so they draw nothing here.
pub fn render_segment<R: Rng + ?Sized>(
    surface: &mut Surface,
    tool: Tool,
    from: Pos2,
    to: Pos2,
    color: Rgba<u8>,
    brush_size: u32,
    rng: &mut R,
) {
    let size = brush_size as f32;
    match tool {
        Tool::Brush => surface.stroke_segment(from, to, size, color),
        Tool::Pencil => surface.stroke_segment(from, to, 1.0, color),
        Tool::Crayon => crayon(surface, to, color, size, rng),
        Tool::Spray => spray(surface, to, color, size, rng),
        Tool::Eraser => surface.stroke_segment(from, to, size, PAPER_WHITE),
        Tool::Stamp(_) => {}
    }
}

fn crayon<R: Rng + ?Sized>(surface: &mut Surface, at: Pos2, color: Rgba<u8>, size: f32, rng: &mut R) {
    for _ in 0..CRAYON_SEGMENTS {
        let offset = vec2(
            (rng.r#gen::<f32>() - 0.5) * size,
            (rng.r#gen::<f32>() - 0.5) * size,
        );
        let start = at + offset;
        let end = start
            + vec2(
                (rng.r#gen::<f32>() - 0.5) * 2.0,
                (rng.r#gen::<f32>() - 0.5) * 2.0,
            );
        surface.stroke_segment(start, end, size, color);
    }
}

fn spray<R: Rng + ?Sized>(surface: &mut Surface, at: Pos2, color: Rgba<u8>, size: f32, rng: &mut R) {
    for _ in 0..SPRAY_DOTS {
        let angle = rng.r#gen::<f32>() * std::f32::consts::TAU;
        let radius = rng.r#gen::<f32>() * size * 2.0;
        let dot = at + vec2(angle.cos() * radius, angle.sin() * radius);
        surface.fill_rect(dot, Vec2::splat(1.0), color);
    }
}
