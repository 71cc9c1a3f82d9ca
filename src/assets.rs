use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::JoinHandle;

use crate::canvas::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_PHYSICAL_SIDE, MAX_PIXEL_RATIO};
use crate::components::colors::StrokeColor;
use crate::components::history::DEFAULT_MAX_UNDO_STEPS;
use crate::components::tools::{
    DEFAULT_BRUSH_SIZE, DEFAULT_ROTATION_STEP, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, StampKind,
};
use crate::{log_info, log_warn};

// ============================================================================
// ASSET ERRORS
// ============================================================================

#[derive(Debug)]
pub enum AssetError {
    Io(std::io::Error),
    Decode(image::ImageError),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::Io(e) => write!(f, "I/O error: {}", e),
            AssetError::Decode(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for AssetError {}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::Io(e)
    }
}

impl From<image::ImageError> for AssetError {
    fn from(e: image::ImageError) -> Self {
        AssetError::Decode(e)
    }
}

/// Read and decode one stamp bitmap.
pub fn load_stamp_file(path: &Path) -> Result<RgbaImage, AssetError> {
    let bytes = std::fs::read(path)?;
    Ok(image::load_from_memory(&bytes)?.into_rgba8())
}

// ============================================================================
// STAMP ASSETS — shared map filled in the background
// ============================================================================

/// Handle to the stamp bitmaps. Clones share one map, so a loader thread can
/// fill it while the pad reads the latest contents on every draw call.
#[derive(Clone, Default)]
pub struct StampAssets {
    inner: Arc<RwLock<HashMap<StampKind, Arc<RgbaImage>>>>,
}

impl StampAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: StampKind) -> Option<Arc<RgbaImage>> {
        self.read().get(&kind).cloned()
    }

    pub fn contains(&self, kind: StampKind) -> bool {
        self.read().contains_key(&kind)
    }

    pub fn insert(&self, kind: StampKind, bitmap: RgbaImage) {
        self.write().insert(kind, Arc::new(bitmap));
    }

    pub fn loaded_count(&self) -> usize {
        self.read().len()
    }

    /// Path of a stamp bitmap inside an asset directory.
    pub fn file_path(dir: &Path, kind: StampKind) -> PathBuf {
        dir.join(format!("{}.png", kind.id()))
    }

    /// Load every stamp found in `dir`, skipping (and logging) failures.
    /// Returns how many bitmaps were loaded.
    pub fn load_dir(&self, dir: &Path) -> usize {
        let mut loaded = 0;
        for kind in StampKind::all() {
            let path = Self::file_path(dir, *kind);
            match load_stamp_file(&path) {
                Ok(bitmap) => {
                    self.insert(*kind, bitmap);
                    loaded += 1;
                }
                Err(e) => {
                    log_warn!("Stamp '{}' unavailable ({}): {}", kind.id(), path.display(), e);
                }
            }
        }
        log_info!(
            "Loaded {}/{} stamp bitmaps from {}",
            loaded,
            StampKind::all().len(),
            dir.display()
        );
        loaded
    }

    /// Load stamps from `dir` on a background thread. Bitmaps become visible
    /// to every clone of this handle as soon as each one is decoded.
    pub fn spawn_loader(&self, dir: PathBuf) -> JoinHandle<usize> {
        let assets = self.clone();
        std::thread::spawn(move || assets.load_dir(&dir))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<StampKind, Arc<RgbaImage>>> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<StampKind, Arc<RgbaImage>>> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ============================================================================
// PAD SETTINGS — key=value config file
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct PadSettings {
    /// Logical canvas width
    pub canvas_width: u32,
    /// Logical canvas height
    pub canvas_height: u32,
    /// Physical pixels per logical pixel
    pub pixel_ratio: f32,
    /// Maximum number of undo steps (0 = unlimited)
    pub max_undo_steps: usize,
    pub default_color: StrokeColor,
    pub default_brush_size: u32,
    /// Degrees added by "rotate last shape"
    pub rotation_step: u32,
    /// Directory holding `<stamp>.png` files
    pub stamp_dir: String,
}

impl Default for PadSettings {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_WIDTH,
            canvas_height: DEFAULT_HEIGHT,
            pixel_ratio: 1.0,
            max_undo_steps: DEFAULT_MAX_UNDO_STEPS,
            default_color: StrokeColor::default(),
            default_brush_size: DEFAULT_BRUSH_SIZE,
            rotation_step: DEFAULT_ROTATION_STEP,
            stamp_dir: "assets/shapes".to_string(),
        }
    }
}

impl PadSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/doodlepad/doodlepad_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\DoodlePad\doodlepad_settings.cfg
    /// On macOS:   ~/Library/Application Support/DoodlePad/doodlepad_settings.cfg
    /// Fallback:   same directory as the executable.
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("doodlepad");
            return Some(config_dir.join("doodlepad_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            return Some(
                PathBuf::from(appdata)
                    .join("DoodlePad")
                    .join("doodlepad_settings.cfg"),
            );
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("DoodlePad")
                    .join("doodlepad_settings.cfg"),
            );
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("doodlepad_settings.cfg")))
        }
    }

    /// Load settings from the default location (defaults if missing or corrupt).
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_config_str(&content),
            Err(_) => Self::default(),
        }
    }

    /// Save to the default location, logging failures.
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = self.save_to(&path) {
            log_warn!("Could not save settings to {}: {}", path.display(), e);
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config_string())
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "canvas_width={}\n\
             canvas_height={}\n\
             pixel_ratio={}\n\
             max_undo_steps={}\n\
             default_color={}\n\
             default_brush_size={}\n\
             rotation_step={}\n\
             stamp_dir={}\n",
            self.canvas_width,
            self.canvas_height,
            self.pixel_ratio,
            self.max_undo_steps,
            self.default_color.to_config_string(),
            self.default_brush_size,
            self.rotation_step,
            self.stamp_dir,
        )
    }

    /// Parse `key=value` lines. Unknown keys are ignored and bad values keep their default.
    pub fn from_config_str(content: &str) -> Self {
        let d = Self::default();
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "canvas_width" => {
                    s.canvas_width = val
                        .parse::<u32>()
                        .ok()
                        .filter(|w| *w > 0)
                        .map(|w| w.min(MAX_PHYSICAL_SIDE))
                        .unwrap_or(d.canvas_width);
                }
                "canvas_height" => {
                    s.canvas_height = val
                        .parse::<u32>()
                        .ok()
                        .filter(|h| *h > 0)
                        .map(|h| h.min(MAX_PHYSICAL_SIDE))
                        .unwrap_or(d.canvas_height);
                }
                "pixel_ratio" => {
                    s.pixel_ratio = val
                        .parse::<f32>()
                        .ok()
                        .filter(|r| r.is_finite() && *r > 0.0)
                        .map(|r| r.min(MAX_PIXEL_RATIO))
                        .unwrap_or(d.pixel_ratio);
                }
                "max_undo_steps" => {
                    s.max_undo_steps = val.parse().unwrap_or(d.max_undo_steps);
                }
                "default_color" => {
                    s.default_color = StrokeColor::parse(val).unwrap_or(d.default_color);
                }
                "default_brush_size" => {
                    s.default_brush_size = val
                        .parse::<u32>()
                        .map(|v| v.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE))
                        .unwrap_or(d.default_brush_size);
                }
                "rotation_step" => {
                    s.rotation_step = val
                        .parse::<u32>()
                        .ok()
                        .filter(|v| v % 360 != 0)
                        .unwrap_or(d.rotation_step);
                }
                "stamp_dir" => {
                    s.stamp_dir = val.to_string();
                }
                _ => {}
            }
        }
        s
    }
}
