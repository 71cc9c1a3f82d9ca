use image::Rgba;

// ============================================================================
// Stroke colour — a fixed RGBA value or the time-driven rainbow
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeColor {
    Solid(Rgba<u8>),
    /// Hue follows wall-clock time, so it animates even inside one stroke.
    Rainbow,
}

impl Default for StrokeColor {
    fn default() -> Self {
        StrokeColor::Solid(Rgba([0xFF, 0x6B, 0x6B, 0xFF]))
    }
}

impl StrokeColor {
    /// Concrete colour for a draw call happening at `now_millis`.
    pub fn resolve(&self, now_millis: u64) -> Rgba<u8> {
        match self {
            StrokeColor::Solid(c) => *c,
            StrokeColor::Rainbow => rainbow_at(now_millis),
        }
    }

    /// Parse `#RRGGBB`, `RRGGBB` or `rainbow`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("rainbow") {
            return Some(StrokeColor::Rainbow);
        }
        parse_hex(s).map(StrokeColor::Solid)
    }

    /// Inverse of [`StrokeColor::parse`].
    pub fn to_config_string(&self) -> String {
        match self {
            StrokeColor::Solid(c) => format!("#{:02X}{:02X}{:02X}", c[0], c[1], c[2]),
            StrokeColor::Rainbow => "rainbow".to_string(),
        }
    }
}

/// One palette entry shown to the user.
pub struct PaletteEntry {
    pub name: &'static str,
    pub color: StrokeColor,
}

const fn solid(r: u8, g: u8, b: u8) -> StrokeColor {
    StrokeColor::Solid(Rgba([r, g, b, 255]))
}

/// The pad's fixed colour palette, light-to-dark per hue family, rainbow last.
pub const PALETTE: &[PaletteEntry] = &[
    PaletteEntry { name: "White", color: solid(0xFF, 0xFF, 0xFF) },
    PaletteEntry { name: "Light Gray", color: solid(0xE0, 0xE0, 0xE0) },
    PaletteEntry { name: "Gray", color: solid(0x9E, 0x9E, 0x9E) },
    PaletteEntry { name: "Black", color: solid(0x00, 0x00, 0x00) },
    PaletteEntry { name: "Light Red", color: solid(0xFF, 0xB6, 0xB6) },
    PaletteEntry { name: "Red", color: solid(0xFF, 0x6B, 0x6B) },
    PaletteEntry { name: "Dark Red", color: solid(0xFF, 0x00, 0x00) },
    PaletteEntry { name: "Light Orange", color: solid(0xFF, 0xB7, 0x4D) },
    PaletteEntry { name: "Orange", color: solid(0xFF, 0x98, 0x00) },
    PaletteEntry { name: "Dark Orange", color: solid(0xF5, 0x7C, 0x00) },
    PaletteEntry { name: "Light Yellow", color: solid(0xFF, 0xF1, 0x76) },
    PaletteEntry { name: "Yellow", color: solid(0xFF, 0xE6, 0x6D) },
    PaletteEntry { name: "Dark Yellow", color: solid(0xFF, 0xD5, 0x4F) },
    PaletteEntry { name: "Light Green", color: solid(0x81, 0xC7, 0x84) },
    PaletteEntry { name: "Green", color: solid(0x4C, 0xAF, 0x50) },
    PaletteEntry { name: "Dark Green", color: solid(0x38, 0x8E, 0x3C) },
    PaletteEntry { name: "Light Blue", color: solid(0x64, 0xB5, 0xF6) },
    PaletteEntry { name: "Blue", color: solid(0x4E, 0xCD, 0xC4) },
    PaletteEntry { name: "Dark Blue", color: solid(0x19, 0x76, 0xD2) },
    PaletteEntry { name: "Light Purple", color: solid(0xBA, 0x68, 0xC8) },
    PaletteEntry { name: "Purple", color: solid(0x9C, 0x27, 0xB0) },
    PaletteEntry { name: "Dark Purple", color: solid(0x7B, 0x1F, 0xA2) },
    PaletteEntry { name: "Light Pink", color: solid(0xF4, 0x8F, 0xB1) },
    PaletteEntry { name: "Pink", color: solid(0xE9, 0x1E, 0x63) },
    PaletteEntry { name: "Dark Pink", color: solid(0xC2, 0x18, 0x5B) },
    PaletteEntry { name: "Brown", color: solid(0x79, 0x55, 0x48) },
    PaletteEntry { name: "Rainbow", color: StrokeColor::Rainbow },
];

/// Rainbow colour at a given instant: hue = (ms / 10) mod 360, full saturation, half lightness.
pub fn rainbow_at(now_millis: u64) -> Rgba<u8> {
    let hue_deg = (now_millis / 10) % 360;
    // hsl(h, 100%, 50%) is hsv(h, 1, 1)
    hsv_to_rgba(hue_deg as f32 / 360.0, 1.0, 1.0, 255)
}

pub fn parse_hex(s: &str) -> Option<Rgba<u8>> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let val = u32::from_str_radix(hex, 16).ok()?;
    Some(Rgba([
        ((val >> 16) & 0xFF) as u8,
        ((val >> 8) & 0xFF) as u8,
        (val & 0xFF) as u8,
        255,
    ]))
}

/// `h`, `s`, `v` in 0.0–1.0.
pub fn hsv_to_rgba(h: f32, s: f32, v: f32, a: u8) -> Rgba<u8> {
    let h6 = (h.rem_euclid(1.0)) * 6.0;
    let c = v * s;
    let x = c * (1.0 - ((h6 % 2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h6 as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Rgba([
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
        a,
    ])
}
