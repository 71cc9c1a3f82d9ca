pub mod stamp;
pub mod strokes;
