use doodlepad::cli::{PadCommand, ScriptError, apply_command, load_script, parse_script};
use doodlepad::{Clock, DrawingPad, PadSettings, StampAssets, StampKind, StrokeColor, Tool};
use eframe::egui::pos2;
use image::{Rgba, RgbaImage};
use rand::SeedableRng;
use rand::rngs::StdRng;

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

fn pad(assets: StampAssets) -> DrawingPad {
    let settings = PadSettings {
        canvas_width: 80,
        canvas_height: 80,
        ..PadSettings::default()
    };
    DrawingPad::with_rng_and_clock(&settings, assets, StdRng::seed_from_u64(3), Box::new(FixedClock(0)))
}

fn run(pad: &mut DrawingPad, src: &str) {
    let commands = parse_script(src).expect("script should parse");
    for command in &commands {
        apply_command(pad, command);
    }
}

#[test]
fn script_matches_direct_calls() {
    let mut scripted = pad(StampAssets::new());
    run(
        &mut scripted,
        "tool brush\ncolor #0000FF\nsize 6\ndown 10 10\nmove 40 40\nmove 70 10\nup\n",
    );

    let mut direct = pad(StampAssets::new());
    direct.set_tool(Tool::Brush);
    direct.set_color(StrokeColor::Solid(Rgba([0, 0, 255, 255])));
    direct.set_brush_size(6);
    direct.begin_stroke(pos2(10.0, 10.0));
    direct.extend_stroke(pos2(40.0, 40.0));
    direct.extend_stroke(pos2(70.0, 10.0));
    direct.end_stroke();

    assert_eq!(scripted.history_len(), 2);
    assert_eq!(scripted.image().as_raw(), direct.image().as_raw());
}

#[test]
fn script_undo_redo_and_rotate() {
    let assets = StampAssets::new();
    assets.insert(StampKind::Heart, RgbaImage::from_pixel(6, 6, Rgba([220, 20, 60, 255])));
    let mut pad = pad(assets);
    run(
        &mut pad,
        "\
        # heart, turned twice\n\
        tool heart\n\
        size 4\n\
        down 40 40\n\
        rotate\n\
        rotate\n\
        undo\n\
        redo\n",
    );

    assert_eq!(pad.history_len(), 2);
    assert_eq!(pad.rotation(), 90);
    assert!(!pad.can_redo());
    assert!(!pad.surface().is_blank());
}

#[test]
fn script_file_errors_name_the_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.pad");
    std::fs::write(&path, "tool pencil\nsize big\n").expect("write script");

    match load_script(&path) {
        Err(ScriptError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a parse error, got {other:?}"),
    }
    assert!(matches!(
        load_script(&dir.path().join("missing.pad")),
        Err(ScriptError::Io(_))
    ));
}

#[test]
fn clear_command_is_undoable() {
    let mut pad = pad(StampAssets::new());
    run(&mut pad, "down 5 5\nmove 60 5\nup\nclear\n");
    assert!(pad.surface().is_blank());
    apply_command(&mut pad, &PadCommand::Undo);
    assert!(!pad.surface().is_blank());
}

#[test]
fn spraying_towards_a_huge_coordinate_does_not_panic() {
    let mut pad = pad(StampAssets::new());
    run(&mut pad, "tool spray\ndown 10 10\nmove 3000000000 10\nmove -3000000000 1e30\nup\n");
    assert_eq!(pad.history_len(), 2);
    assert!(pad.surface().is_blank());

    run(&mut pad, "tool brush\ndown 10 10\nmove 3000000000 10\nup\n");
    assert!(!pad.surface().is_blank());
}
