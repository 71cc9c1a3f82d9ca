use doodlepad::canvas::PAPER_WHITE;
use doodlepad::{Clock, DrawingPad, PadSettings, StampAssets, StampKind, StrokeColor, Tool};
use eframe::egui::pos2;
use image::{Rgba, RgbaImage};
use rand::SeedableRng;
use rand::rngs::StdRng;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

fn small_settings() -> PadSettings {
    PadSettings {
        canvas_width: 96,
        canvas_height: 96,
        ..PadSettings::default()
    }
}

fn pad_with(settings: &PadSettings, assets: StampAssets) -> DrawingPad {
    DrawingPad::with_rng_and_clock(
        settings,
        assets,
        StdRng::seed_from_u64(7),
        Box::new(FixedClock(0)),
    )
}

/// Left half red, right half blue, so rotations are visible.
fn two_tone_bitmap() -> RgbaImage {
    RgbaImage::from_fn(8, 8, |x, _| {
        if x < 4 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    })
}

fn star_assets() -> StampAssets {
    let assets = StampAssets::new();
    assets.insert(StampKind::Star, two_tone_bitmap());
    assets
}

fn stroke(pad: &mut DrawingPad, from: (f32, f32), to: (f32, f32)) {
    pad.begin_stroke(pos2(from.0, from.1));
    pad.extend_stroke(pos2(to.0, to.1));
    pad.end_stroke();
}

#[test]
fn red_stroke_undo_redo() {
    let mut pad = pad_with(&PadSettings::default(), StampAssets::new());
    pad.set_tool(Tool::Brush);
    pad.set_color(StrokeColor::Solid(RED));
    pad.set_brush_size(5);
    stroke(&mut pad, (10.0, 10.0), (50.0, 50.0));

    assert_eq!(pad.surface().pixel_at(pos2(30.0, 30.0)), Some(RED));
    let drawn = pad.image().clone();

    assert!(pad.undo());
    assert!(pad.surface().is_blank());

    assert!(pad.redo());
    assert_eq!(pad.image().as_raw(), drawn.as_raw());
}

#[test]
fn undoing_every_operation_returns_to_blank() {
    let mut pad = pad_with(&small_settings(), star_assets());
    stroke(&mut pad, (5.0, 5.0), (40.0, 5.0));
    pad.set_tool(Tool::Spray);
    stroke(&mut pad, (20.0, 20.0), (30.0, 30.0));
    pad.set_tool(Tool::Stamp(StampKind::Star));
    pad.begin_stroke(pos2(60.0, 60.0));
    pad.clear();
    assert_eq!(pad.history_len(), 5);

    for _ in 0..4 {
        assert!(pad.undo());
    }
    assert!(pad.surface().is_blank());
    assert_eq!(pad.history_index(), 0);
    assert!(!pad.can_undo());
    assert!(!pad.undo());
}

#[test]
fn new_operation_after_undo_drops_redo_entries() {
    let mut pad = pad_with(&small_settings(), star_assets());
    stroke(&mut pad, (5.0, 5.0), (40.0, 5.0));
    stroke(&mut pad, (5.0, 15.0), (40.0, 15.0));
    stroke(&mut pad, (5.0, 25.0), (40.0, 25.0));
    let after_b = pad.history().previous().map(|s| s.pixels().clone());

    assert!(pad.undo());
    assert!(pad.can_redo());

    pad.set_tool(Tool::Stamp(StampKind::Star));
    pad.begin_stroke(pos2(60.0, 60.0));

    assert_eq!(pad.history_len(), 4);
    assert_eq!(pad.history_index(), 3);
    assert!(!pad.can_redo());
    let before = pad.image().clone();
    assert!(!pad.redo());
    assert_eq!(pad.image().as_raw(), before.as_raw());

    // The entry under the stamp is still the second stroke
    assert!(pad.undo());
    assert_eq!(Some(pad.image().clone()), after_b);
}

#[test]
fn rotating_k_times_matches_stamping_at_the_final_angle() {
    for k in [1u32, 3, 8] {
        let mut rotated = pad_with(&small_settings(), star_assets());
        rotated.set_tool(Tool::Stamp(StampKind::Star));
        rotated.set_brush_size(5);
        rotated.begin_stroke(pos2(48.0, 48.0));
        let len = rotated.history_len();
        for _ in 0..k {
            assert!(rotated.rotate_last_shape());
        }
        assert_eq!(rotated.history_len(), len);
        assert_eq!(rotated.rotation(), (45 * k) % 360);
        assert_eq!(rotated.last_stamp().map(|s| s.rotation()), Some((45 * k) % 360));

        let mut direct = pad_with(&small_settings(), star_assets());
        direct.set_tool(Tool::Stamp(StampKind::Star));
        direct.set_brush_size(5);
        direct.set_rotation(45 * k);
        direct.begin_stroke(pos2(48.0, 48.0));

        assert_eq!(rotated.image().as_raw(), direct.image().as_raw(), "k = {k}");
    }
}

#[test]
fn rotation_keeps_strokes_drawn_before_the_stamp() {
    let mut pad = pad_with(&small_settings(), star_assets());
    pad.set_color(StrokeColor::Solid(BLACK));
    stroke(&mut pad, (2.0, 90.0), (90.0, 90.0));
    pad.set_tool(Tool::Stamp(StampKind::Star));
    pad.set_brush_size(4);
    pad.begin_stroke(pos2(40.0, 40.0));
    assert!(pad.rotate_last_shape());
    assert_eq!(pad.surface().pixel_at(pos2(60.0, 90.0)), Some(BLACK));

    // Undo after rotating goes back past the stamp entirely
    assert!(pad.undo());
    assert_eq!(pad.surface().pixel_at(pos2(40.0, 40.0)), Some(Rgba([0, 0, 0, 0])));
    assert_eq!(pad.surface().pixel_at(pos2(60.0, 90.0)), Some(BLACK));
}

#[test]
fn rotate_is_a_no_op_without_a_current_stamp() {
    let mut pad = pad_with(&small_settings(), star_assets());
    assert!(!pad.can_rotate());
    assert!(!pad.rotate_last_shape());
    assert_eq!(pad.history_len(), 1);

    pad.set_tool(Tool::Stamp(StampKind::Star));
    pad.begin_stroke(pos2(48.0, 48.0));
    assert!(pad.can_rotate());

    pad.clear();
    let cleared = pad.image().clone();
    assert!(!pad.rotate_last_shape());
    assert_eq!(pad.image().as_raw(), cleared.as_raw());

    pad.begin_stroke(pos2(48.0, 48.0));
    assert!(pad.undo());
    assert!(!pad.can_rotate());

    assert!(pad.redo());
    pad.set_tool(Tool::Brush);
    stroke(&mut pad, (5.0, 5.0), (20.0, 5.0));
    assert!(!pad.rotate_last_shape());
}

#[test]
fn eraser_paints_white_over_a_stroke() {
    let mut pad = pad_with(&small_settings(), StampAssets::new());
    pad.set_color(StrokeColor::Solid(BLACK));
    pad.set_brush_size(6);
    stroke(&mut pad, (10.0, 20.0), (60.0, 20.0));
    assert_eq!(pad.surface().pixel_at(pos2(30.0, 20.0)), Some(BLACK));

    pad.set_tool(Tool::Eraser);
    pad.set_brush_size(10);
    stroke(&mut pad, (10.0, 20.0), (60.0, 20.0));
    assert_eq!(pad.surface().pixel_at(pos2(30.0, 20.0)), Some(PAPER_WHITE));
    assert_eq!(pad.history_len(), 3);
}

#[test]
fn stamping_an_unloaded_bitmap_changes_nothing() {
    let mut pad = pad_with(&small_settings(), StampAssets::new());
    pad.set_tool(Tool::Stamp(StampKind::Sun));
    pad.begin_stroke(pos2(48.0, 48.0));
    pad.end_stroke();

    assert!(pad.surface().is_blank());
    assert_eq!(pad.history_len(), 1);
    assert!(pad.last_stamp().is_none());
    assert!(!pad.is_drawing());
}

#[test]
fn bitmaps_loaded_after_construction_are_used() {
    let assets = StampAssets::new();
    let mut pad = pad_with(&small_settings(), assets.clone());
    pad.set_tool(Tool::Stamp(StampKind::Star));
    assert!(!pad.commit_stamp(pos2(48.0, 48.0)));

    assets.insert(StampKind::Star, two_tone_bitmap());
    assert!(pad.commit_stamp(pos2(48.0, 48.0)));
    assert!(!pad.surface().is_blank());
    assert_eq!(pad.last_stamp().map(|s| s.kind()), Some(StampKind::Star));
}

#[test]
fn pixel_ratio_scales_the_backing_buffer() {
    let settings = PadSettings {
        canvas_width: 32,
        canvas_height: 32,
        pixel_ratio: 2.0,
        ..PadSettings::default()
    };
    let mut pad = pad_with(&settings, StampAssets::new());
    assert_eq!(pad.image().dimensions(), (64, 64));

    pad.set_color(StrokeColor::Solid(RED));
    pad.set_brush_size(4);
    stroke(&mut pad, (5.0, 10.0), (25.0, 10.0));
    assert_eq!(pad.surface().pixel_at(pos2(15.0, 10.0)), Some(RED));
    assert_eq!(*pad.image().get_pixel(30, 20), RED);
    assert_eq!(*pad.image().get_pixel(30, 40), Rgba([0, 0, 0, 0]));
}

#[test]
fn history_is_capped_at_max_undo_steps() {
    let settings = PadSettings {
        max_undo_steps: 3,
        ..small_settings()
    };
    let mut pad = pad_with(&settings, StampAssets::new());
    for row in 0..6 {
        let y = 5.0 + row as f32 * 10.0;
        stroke(&mut pad, (5.0, y), (50.0, y));
    }
    assert_eq!(pad.history_len(), 4);

    let mut undone = 0;
    while pad.undo() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    // The oldest kept entry already holds the first three strokes
    assert!(!pad.surface().is_blank());
}
