//! The drawing pad: one canvas, its undo history, the current tool state and
//! the record of the most recent stamp.
//!
//! Every operation runs to completion synchronously and never fails. Things
//! that cannot happen (undo at the oldest entry, rotating with nothing to
//! rotate, stamping before the bitmap has loaded) are no-ops.

use eframe::egui;
use egui::Pos2;
use image::RgbaImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::assets::{PadSettings, StampAssets};
use crate::canvas::Surface;
use crate::components::colors::StrokeColor;
use crate::components::history::HistoryManager;
use crate::components::tools::{StampKind, Tool, ToolState};
use crate::ops::stamp::{PlacedStamp, draw_stamp};
use crate::ops::strokes::render_segment;
use crate::{log_info, log_warn};

// ============================================================================
// CLOCK — time source for rainbow colour
// ============================================================================

pub trait Clock: Send {
    fn now_millis(&self) -> u64;
}

/// Wall-clock milliseconds since the Unix epoch.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

// ============================================================================
// LAST STAMP
// ============================================================================

/// The most recently committed stamp, kept so it can be re-rendered at a new angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LastStamp {
    pub placed: PlacedStamp,
    /// History entry the stamp produced. Rotation only applies while this is current.
    entry_id: u64,
}

impl LastStamp {
    pub fn kind(&self) -> StampKind {
        self.placed.kind
    }

    pub fn rotation(&self) -> u32 {
        self.placed.rotation
    }
}

// ============================================================================
// DRAWING PAD
// ============================================================================

pub struct DrawingPad {
    surface: Surface,
    history: HistoryManager,
    tools: ToolState,
    assets: StampAssets,
    last_stamp: Option<LastStamp>,
    /// Last pointer position while a freehand stroke is in progress.
    stroke_point: Option<Pos2>,
    rng: StdRng,
    clock: Box<dyn Clock>,
}

impl DrawingPad {
    /// A pad seeded from OS entropy and driven by the system clock.
    pub fn new(settings: &PadSettings, assets: StampAssets) -> Self {
        Self::with_rng_and_clock(settings, assets, StdRng::from_entropy(), Box::new(SystemClock))
    }

    /// A pad whose textured tools and rainbow colour are fully reproducible.
    pub fn with_rng_and_clock(
        settings: &PadSettings,
        assets: StampAssets,
        rng: StdRng,
        clock: Box<dyn Clock>,
    ) -> Self {
        let surface = Surface::new(
            settings.canvas_width,
            settings.canvas_height,
            settings.pixel_ratio,
        );
        let mut history = HistoryManager::new(settings.max_undo_steps);
        history.reset(&surface);

        let mut tools = ToolState::default();
        tools.color = settings.default_color;
        tools.set_brush_size(settings.default_brush_size);
        tools.set_rotation_step(settings.rotation_step);

        log_info!(
            "DrawingPad: {}x{} @{}x, {} undo steps",
            surface.width(),
            surface.height(),
            surface.pixel_ratio(),
            settings.max_undo_steps
        );

        Self {
            surface,
            history,
            tools,
            assets,
            last_stamp: None,
            stroke_point: None,
            rng,
            clock,
        }
    }

    // -- Pointer-driven operations ----------------------------------------

    /// Pointer down. Starts a freehand path, or commits a stamp for stamp tools.
    pub fn begin_stroke(&mut self, point: Pos2) {
        if self.is_drawing() {
            self.end_stroke();
        }
        if self.tools.tool.is_stamp() {
            self.commit_stamp(point);
            return;
        }
        self.stroke_point = Some(point);
    }

    /// Pointer moved while pressed. Draws from the last point using the current tool.
    pub fn extend_stroke(&mut self, point: Pos2) {
        let Some(last) = self.stroke_point else { return };
        let color = self.tools.color.resolve(self.clock.now_millis());
        render_segment(
            &mut self.surface,
            self.tools.tool,
            last,
            point,
            color,
            self.tools.brush_size(),
            &mut self.rng,
        );
        self.stroke_point = Some(point);
    }

    /// Pointer up or left the canvas. Commits the stroke once.
    pub fn end_stroke(&mut self) {
        if self.stroke_point.take().is_none() {
            return;
        }
        self.last_stamp = None;
        self.history.push(&self.surface);
    }

    /// Place the selected stamp centred at `point`. Returns false when the
    /// current tool is not a stamp or its bitmap has not loaded yet.
    pub fn commit_stamp(&mut self, point: Pos2) -> bool {
        let Some(kind) = self.tools.tool.stamp_kind() else {
            return false;
        };
        let Some(bitmap) = self.assets.get(kind) else {
            log_warn!("Stamp '{}' not loaded yet, ignoring", kind.id());
            return false;
        };

        let placed = PlacedStamp::new(kind, point, self.tools.brush_size(), self.tools.rotation());
        draw_stamp(&mut self.surface, &bitmap, &placed);
        let entry_id = self.history.push(&self.surface);
        self.last_stamp = Some(LastStamp { placed, entry_id });
        true
    }

    /// Re-render the last stamp one rotation step further, amending its
    /// history entry in place. Returns false when there is nothing to rotate.
    pub fn rotate_last_shape(&mut self) -> bool {
        if !self.can_rotate() {
            return false;
        }
        let Some(last) = self.last_stamp else {
            return false;
        };
        let Some(bitmap) = self.assets.get(last.kind()) else {
            return false;
        };
        let Some(before) = self.history.previous() else {
            return false;
        };

        let rotation = self.tools.step_from(last.rotation());
        let placed = last.placed.with_rotation(rotation);

        self.surface.restore(before.pixels());
        draw_stamp(&mut self.surface, &bitmap, &placed);
        let entry_id = self.history.replace_current(&self.surface);

        self.tools.set_rotation(rotation);
        self.last_stamp = Some(LastStamp { placed, entry_id });
        true
    }

    // -- History ----------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.stroke_point = None;
        self.history.undo(&mut self.surface)
    }

    pub fn redo(&mut self) -> bool {
        self.stroke_point = None;
        self.history.redo(&mut self.surface)
    }

    /// Wipe the canvas. Clearing is itself undoable.
    pub fn clear(&mut self) {
        self.stroke_point = None;
        self.surface.clear();
        self.last_stamp = None;
        self.history.push(&self.surface);
    }

    // -- Tool state -------------------------------------------------------

    pub fn set_tool(&mut self, tool: Tool) {
        self.tools.tool = tool;
    }

    pub fn set_color(&mut self, color: StrokeColor) {
        self.tools.color = color;
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.tools.set_brush_size(size);
    }

    pub fn set_rotation(&mut self, degrees: u32) {
        self.tools.set_rotation(degrees);
    }

    /// Advance the rotation used by the next stamp by one step.
    pub fn advance_rotation(&mut self) -> u32 {
        self.tools.advance_rotation()
    }

    pub fn tool(&self) -> Tool {
        self.tools.tool
    }

    pub fn color(&self) -> StrokeColor {
        self.tools.color
    }

    pub fn brush_size(&self) -> u32 {
        self.tools.brush_size()
    }

    pub fn rotation(&self) -> u32 {
        self.tools.rotation()
    }

    // -- Queries ----------------------------------------------------------

    pub fn is_drawing(&self) -> bool {
        self.stroke_point.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// True when the last stamp's entry is current and has an entry before it.
    pub fn can_rotate(&self) -> bool {
        match self.last_stamp {
            Some(last) => {
                self.history.current_id() == Some(last.entry_id) && self.history.previous().is_some()
            }
            None => false,
        }
    }

    pub fn last_stamp(&self) -> Option<&LastStamp> {
        self.last_stamp.as_ref()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn assets(&self) -> &StampAssets {
        &self.assets
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The rendered canvas, the pad's only output.
    pub fn image(&self) -> &RgbaImage {
        self.surface.pixels()
    }

    pub fn generation(&self) -> u64 {
        self.surface.generation()
    }
}
