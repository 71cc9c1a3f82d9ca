use doodlepad::components::colors::StrokeColor;
use doodlepad::{PadSettings, StampAssets, StampKind};
use image::{Rgba, RgbaImage};

#[test]
fn settings_survive_a_save_and_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("doodlepad_settings.cfg");

    let settings = PadSettings {
        canvas_width: 1024,
        canvas_height: 768,
        pixel_ratio: 1.5,
        max_undo_steps: 20,
        default_color: StrokeColor::Solid(Rgba([0x4E, 0xCD, 0xC4, 255])),
        default_brush_size: 8,
        rotation_step: 90,
        stamp_dir: dir.path().join("shapes").display().to_string(),
    };
    settings.save_to(&path).expect("save settings");

    assert_eq!(PadSettings::load_from(&path), settings);
}

#[test]
fn missing_settings_file_gives_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loaded = PadSettings::load_from(&dir.path().join("nope.cfg"));
    assert_eq!(loaded, PadSettings::default());
}

#[test]
fn hand_edited_file_keeps_unknown_keys_harmless() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("doodlepad_settings.cfg");
    std::fs::write(
        &path,
        "# edited by hand\ncanvas_width = 400\ntheme=dark\ndefault_color=rainbow\n",
    )
    .expect("write settings");

    let loaded = PadSettings::load_from(&path);
    assert_eq!(loaded.canvas_width, 400);
    assert_eq!(loaded.default_color, StrokeColor::Rainbow);
    assert_eq!(loaded.canvas_height, PadSettings::default().canvas_height);
}

#[test]
fn stamp_directory_loads_present_bitmaps_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    RgbaImage::from_pixel(4, 4, Rgba([255, 200, 0, 255]))
        .save(StampAssets::file_path(dir.path(), StampKind::Sun))
        .expect("write sun.png");
    std::fs::write(StampAssets::file_path(dir.path(), StampKind::Cat), b"not a png")
        .expect("write cat.png");

    let assets = StampAssets::new();
    assert_eq!(assets.load_dir(dir.path()), 1);
    assert!(assets.contains(StampKind::Sun));
    assert!(!assets.contains(StampKind::Cat));
    assert_eq!(assets.get(StampKind::Sun).map(|b| b.dimensions()), Some((4, 4)));
}

#[test]
fn background_loader_fills_the_shared_map() {
    let dir = tempfile::tempdir().expect("tempdir");
    RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]))
        .save(StampAssets::file_path(dir.path(), StampKind::Ball))
        .expect("write ball.png");

    let assets = StampAssets::new();
    let reader = assets.clone();
    let loaded = assets
        .spawn_loader(dir.path().to_path_buf())
        .join()
        .expect("loader thread");
    assert_eq!(loaded, 1);
    assert!(reader.contains(StampKind::Ball));
}
