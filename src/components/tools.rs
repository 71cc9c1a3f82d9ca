use crate::components::colors::StrokeColor;

/// Brush size bounds, in logical pixels.
pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 20;
pub const DEFAULT_BRUSH_SIZE: u32 = 5;

/// Default rotation advance for stamps and "rotate last shape".
pub const DEFAULT_ROTATION_STEP: u32 = 45;

// ============================================================================
// STAMP KINDS
// ============================================================================

/// Decorative pre-rendered bitmaps that are placed with a single click.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StampKind {
    Star,
    Heart,
    Sun,
    Tree,
    Cat,
    Rabbit,
    Bird,
    Ball,
    House,
    Flower,
}

impl StampKind {
    pub fn all() -> &'static [StampKind] {
        &[
            StampKind::Star,
            StampKind::Heart,
            StampKind::Sun,
            StampKind::Tree,
            StampKind::Cat,
            StampKind::Rabbit,
            StampKind::Bird,
            StampKind::Ball,
            StampKind::House,
            StampKind::Flower,
        ]
    }

    /// Stable identifier; also the asset file stem (`star.png`, ...).
    pub fn id(&self) -> &'static str {
        match self {
            StampKind::Star => "star",
            StampKind::Heart => "heart",
            StampKind::Sun => "sun",
            StampKind::Tree => "tree",
            StampKind::Cat => "cat",
            StampKind::Rabbit => "rabbit",
            StampKind::Bird => "bird",
            StampKind::Ball => "ball",
            StampKind::House => "house",
            StampKind::Flower => "flower",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.id() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StampKind::Star => "Star",
            StampKind::Heart => "Heart",
            StampKind::Sun => "Sun",
            StampKind::Tree => "Tree",
            StampKind::Cat => "Cat",
            StampKind::Rabbit => "Rabbit",
            StampKind::Bird => "Bird",
            StampKind::Ball => "Ball",
            StampKind::House => "House",
            StampKind::Flower => "Flower",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            StampKind::Star => "⭐",
            StampKind::Heart => "❤",
            StampKind::Sun => "☀",
            StampKind::Tree => "🌳",
            StampKind::Cat => "🐱",
            StampKind::Rabbit => "🐰",
            StampKind::Bird => "🐦",
            StampKind::Ball => "⚽",
            StampKind::House => "🏠",
            StampKind::Flower => "🌸",
        }
    }

    /// Stamp edge length = brush size × this.
    pub fn size_multiplier(&self) -> u32 {
        match self {
            StampKind::House => 20,
            StampKind::Sun => 18,
            StampKind::Tree => 16,
            StampKind::Cat => 14,
            StampKind::Rabbit => 12,
            StampKind::Bird => 10,
            StampKind::Star => 10,
            StampKind::Ball => 8,
            StampKind::Heart => 8,
            StampKind::Flower => 6,
        }
    }
}

// ============================================================================
// TOOLS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    /// Smooth anti-aliased line at brush width
    #[default]
    Brush,
    /// Always 1px wide
    Pencil,
    /// Jittered micro-segments for a waxy texture
    Crayon,
    /// Scattered single-pixel dots
    Spray,
    /// Paints opaque paper white
    Eraser,
    Stamp(StampKind),
}

impl Tool {
    /// Freehand tools followed by every stamp, in palette order.
    pub fn all() -> Vec<Tool> {
        let mut tools = vec![Tool::Brush, Tool::Pencil, Tool::Crayon, Tool::Spray, Tool::Eraser];
        tools.extend(StampKind::all().iter().map(|k| Tool::Stamp(*k)));
        tools
    }

    pub fn id(&self) -> &'static str {
        match self {
            Tool::Brush => "brush",
            Tool::Pencil => "pencil",
            Tool::Crayon => "crayon",
            Tool::Spray => "spray",
            Tool::Eraser => "eraser",
            Tool::Stamp(kind) => kind.id(),
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "brush" => Some(Tool::Brush),
            "pencil" => Some(Tool::Pencil),
            "crayon" => Some(Tool::Crayon),
            "spray" => Some(Tool::Spray),
            "eraser" => Some(Tool::Eraser),
            other => StampKind::from_id(other).map(Tool::Stamp),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Pencil => "Pencil",
            Tool::Crayon => "Crayon",
            Tool::Spray => "Spray",
            Tool::Eraser => "Eraser",
            Tool::Stamp(kind) => kind.label(),
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Tool::Brush => "🖌",
            Tool::Pencil => "✏",
            Tool::Crayon => "🖍",
            Tool::Spray => "💨",
            Tool::Eraser => "🧹",
            Tool::Stamp(kind) => kind.emoji(),
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            Tool::Brush => "Smooth drawing",
            Tool::Pencil => "Sharp lines",
            Tool::Crayon => "Waxy texture",
            Tool::Spray => "Spray paint",
            Tool::Eraser => "Erase mistakes",
            Tool::Stamp(StampKind::Star) => "Draw a star",
            Tool::Stamp(StampKind::Heart) => "Draw a heart",
            Tool::Stamp(StampKind::Sun) => "Draw a sun",
            Tool::Stamp(StampKind::Tree) => "Draw a tree",
            Tool::Stamp(StampKind::Cat) => "Draw a cat",
            Tool::Stamp(StampKind::Rabbit) => "Draw a rabbit",
            Tool::Stamp(StampKind::Bird) => "Draw a bird",
            Tool::Stamp(StampKind::Ball) => "Draw a ball",
            Tool::Stamp(StampKind::House) => "Draw a house",
            Tool::Stamp(StampKind::Flower) => "Draw a flower",
        }
    }

    pub fn stamp_kind(&self) -> Option<StampKind> {
        match self {
            Tool::Stamp(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_stamp(&self) -> bool {
        self.stamp_kind().is_some()
    }
}

// ============================================================================
// TOOL STATE — what the next drawing operation will use
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct ToolState {
    pub tool: Tool,
    pub color: StrokeColor,
    brush_size: u32,
    /// Stamp rotation in degrees, always in 0..360.
    rotation: u32,
    rotation_step: u32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::Brush,
            color: StrokeColor::default(),
            brush_size: DEFAULT_BRUSH_SIZE,
            rotation: 0,
            rotation_step: DEFAULT_ROTATION_STEP,
        }
    }
}

impl ToolState {
    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn rotation(&self) -> u32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: u32) {
        self.rotation = degrees % 360;
    }

    pub fn rotation_step(&self) -> u32 {
        self.rotation_step
    }

    /// A zero step is replaced by the default so rotation always progresses.
    pub fn set_rotation_step(&mut self, step: u32) {
        self.rotation_step = match step % 360 {
            0 => DEFAULT_ROTATION_STEP,
            s => s,
        };
    }

    /// `degrees` advanced by one rotation step, wrapped to 0..360.
    pub fn step_from(&self, degrees: u32) -> u32 {
        (degrees + self.rotation_step) % 360
    }

    pub fn advance_rotation(&mut self) -> u32 {
        self.rotation = self.step_from(self.rotation);
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_ids_round_trip() {
        for tool in Tool::all() {
            assert_eq!(Tool::from_id(tool.id()), Some(tool));
        }
        assert_eq!(Tool::from_id("  Crayon "), Some(Tool::Crayon));
        assert_eq!(Tool::from_id("dragon"), None);
    }

    #[test]
    fn fifteen_tools_in_palette() {
        let tools = Tool::all();
        assert_eq!(tools.len(), 15);
        assert_eq!(tools.iter().filter(|t| t.is_stamp()).count(), 10);
    }

    #[test]
    fn brush_size_is_clamped() {
        let mut state = ToolState::default();
        state.set_brush_size(0);
        assert_eq!(state.brush_size(), MIN_BRUSH_SIZE);
        state.set_brush_size(99);
        assert_eq!(state.brush_size(), MAX_BRUSH_SIZE);
        state.set_brush_size(7);
        assert_eq!(state.brush_size(), 7);
    }

    #[test]
    fn rotation_wraps_in_steps() {
        let mut state = ToolState::default();
        for _ in 0..8 {
            state.advance_rotation();
        }
        assert_eq!(state.rotation(), 0);
        state.set_rotation(405);
        assert_eq!(state.rotation(), 45);
        state.set_rotation_step(0);
        assert_eq!(state.rotation_step(), DEFAULT_ROTATION_STEP);
    }
}
