// ============================================================================
// DoodlePad CLI — headless replay of pad operations via command-line arguments
// ============================================================================
//
// Usage examples:
//   doodlepad --script picture.pad --output picture.png
//   doodlepad -s picture.pad -o out.png --stamps assets/shapes --seed 42
//
// Script format, one command per line, `#` starts a comment:
//   tool brush          color #FF0000       size 5        rotation 90
//   down 10 10          move 50 50          up
//   undo   redo   clear   rotate
//
// No GUI is opened in CLI mode. Stamps are loaded synchronously before the
// script runs so replays don't depend on load timing.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use eframe::egui;
use egui::{Pos2, pos2};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::{PadSettings, StampAssets};
use crate::canvas::MAX_PHYSICAL_SIDE;
use crate::components::colors::StrokeColor;
use crate::components::tools::Tool;
use crate::pad::{Clock, DrawingPad};
use crate::{log_err, log_info};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// DoodlePad headless renderer.
///
/// Replays a script of drawing-pad operations and writes the canvas to a PNG.
#[derive(Parser, Debug)]
#[command(
    name = "doodlepad",
    about = "DoodlePad headless script replay",
    long_about = "Replay a script of drawing-pad operations without opening the GUI\n\
                  and save the resulting canvas as a PNG.\n\n\
                  Example:\n  \
                  doodlepad --script picture.pad --output picture.png --seed 7"
)]
pub struct CliArgs {
    /// Script file with one pad command per line.
    #[arg(short, long, value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Output PNG path.
    #[arg(short, long, value_name = "FILE", default_value = "drawing.png")]
    pub output: PathBuf,

    /// Directory holding `<stamp>.png` bitmaps. Defaults to the configured stamp_dir.
    #[arg(long, value_name = "DIR")]
    pub stamps: Option<PathBuf>,

    /// Seed for crayon/spray texture and a stepped rainbow clock (reproducible output).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Logical canvas width (overrides settings).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_PHYSICAL_SIDE as i64))]
    pub width: Option<u32>,

    /// Logical canvas height (overrides settings).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_PHYSICAL_SIDE as i64))]
    pub height: Option<u32>,

    /// Physical pixels per logical pixel (overrides settings).
    #[arg(long)]
    pub pixel_ratio: Option<f32>,

    /// Print each command as it is applied.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when the CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--script" || a == "-s")
    }
}

// ============================================================================
// Script model
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum PadCommand {
    Tool(Tool),
    Color(StrokeColor),
    Size(u32),
    Rotation(u32),
    Down(Pos2),
    Move(Pos2),
    Up,
    Undo,
    Redo,
    Clear,
    Rotate,
}

#[derive(Debug)]
pub enum ScriptError {
    Io(std::io::Error),
    Parse { line: usize, message: String },
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptError::Io(e) => write!(f, "I/O error: {}", e),
            ScriptError::Parse { line, message } => write!(f, "line {}: {}", line, message),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<std::io::Error> for ScriptError {
    fn from(e: std::io::Error) -> Self {
        ScriptError::Io(e)
    }
}

pub fn load_script(path: &Path) -> Result<Vec<PadCommand>, ScriptError> {
    let src = std::fs::read_to_string(path)?;
    parse_script(&src)
}

/// Parse a whole script. Stops at the first bad line.
pub fn parse_script(src: &str) -> Result<Vec<PadCommand>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, raw) in src.lines().enumerate() {
        let text = strip_comment(raw).trim();
        if text.is_empty() {
            continue;
        }
        let command = parse_line(text).map_err(|message| ScriptError::Parse {
            line: idx + 1,
            message,
        })?;
        commands.push(command);
    }
    Ok(commands)
}

/// A `#` opens a comment when it starts the line or is followed by whitespace,
/// so `color #FF0000` keeps its hex value.
fn strip_comment(line: &str) -> &str {
    for (i, ch) in line.char_indices() {
        if ch != '#' {
            continue;
        }
        let starts_line = line[..i].trim().is_empty();
        let before_space = line[i + 1..].chars().next().is_none_or(char::is_whitespace);
        if starts_line || before_space {
            return &line[..i];
        }
    }
    line
}

fn parse_line(text: &str) -> Result<PadCommand, String> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let Some((&verb, args)) = parts.split_first() else {
        return Err("empty command".to_string());
    };

    let expect_args = |n: usize| -> Result<(), String> {
        if args.len() == n {
            Ok(())
        } else {
            Err(format!("'{}' takes {} argument(s), got {}", verb, n, args.len()))
        }
    };

    match verb.to_ascii_lowercase().as_str() {
        "tool" => {
            expect_args(1)?;
            Tool::from_id(args[0])
                .map(PadCommand::Tool)
                .ok_or_else(|| format!("unknown tool '{}'", args[0]))
        }
        "color" | "colour" => {
            expect_args(1)?;
            StrokeColor::parse(args[0])
                .map(PadCommand::Color)
                .ok_or_else(|| format!("bad color '{}'", args[0]))
        }
        "size" => {
            expect_args(1)?;
            parse_number::<u32>(args[0]).map(PadCommand::Size)
        }
        "rotation" => {
            expect_args(1)?;
            parse_number::<u32>(args[0]).map(PadCommand::Rotation)
        }
        "down" => {
            expect_args(2)?;
            parse_point(args).map(PadCommand::Down)
        }
        "move" => {
            expect_args(2)?;
            parse_point(args).map(PadCommand::Move)
        }
        "up" => expect_args(0).map(|_| PadCommand::Up),
        "undo" => expect_args(0).map(|_| PadCommand::Undo),
        "redo" => expect_args(0).map(|_| PadCommand::Redo),
        "clear" => expect_args(0).map(|_| PadCommand::Clear),
        "rotate" => expect_args(0).map(|_| PadCommand::Rotate),
        other => Err(format!("unknown command '{}'", other)),
    }
}

fn parse_number<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    s.parse::<T>().map_err(|_| format!("'{}' is not a valid number", s))
}

fn parse_point(args: &[&str]) -> Result<Pos2, String> {
    let x = parse_number::<f32>(args[0])?;
    let y = parse_number::<f32>(args[1])?;
    Ok(pos2(x, y))
}

/// Feed one command to the pad.
pub fn apply_command(pad: &mut DrawingPad, command: &PadCommand) {
    match command {
        PadCommand::Tool(tool) => pad.set_tool(*tool),
        PadCommand::Color(color) => pad.set_color(*color),
        PadCommand::Size(size) => pad.set_brush_size(*size),
        PadCommand::Rotation(deg) => pad.set_rotation(*deg),
        PadCommand::Down(p) => pad.begin_stroke(*p),
        PadCommand::Move(p) => pad.extend_stroke(*p),
        PadCommand::Up => pad.end_stroke(),
        PadCommand::Undo => {
            pad.undo();
        }
        PadCommand::Redo => {
            pad.redo();
        }
        PadCommand::Clear => pad.clear(),
        PadCommand::Rotate => {
            pad.rotate_last_shape();
        }
    }
}

/// Clock that advances a fixed amount on every read, for reproducible rainbow strokes.
struct StepClock {
    next: Cell<u64>,
    step: u64,
}

impl Clock for StepClock {
    fn now_millis(&self) -> u64 {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the replay and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    crate::logger::init_stderr(args.verbose);
    match run_replay(&args) {
        Ok(()) => {
            if args.verbose {
                println!("  → {}", args.output.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_err!("CLI replay failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_replay(args: &CliArgs) -> Result<(), String> {
    let commands = load_script(&args.script)
        .map_err(|e| format!("script '{}': {}", args.script.display(), e))?;

    let mut settings = PadSettings::load();
    if let Some(w) = args.width {
        settings.canvas_width = w;
    }
    if let Some(h) = args.height {
        settings.canvas_height = h;
    }
    if let Some(r) = args.pixel_ratio {
        settings.pixel_ratio = r;
    }

    let assets = StampAssets::new();
    let stamp_dir = args
        .stamps
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.stamp_dir));
    let loaded = assets.load_dir(&stamp_dir);
    if args.verbose {
        println!("  {} stamp bitmap(s) from {}", loaded, stamp_dir.display());
    }

    let mut pad = match args.seed {
        Some(seed) => DrawingPad::with_rng_and_clock(
            &settings,
            assets,
            StdRng::seed_from_u64(seed),
            Box::new(StepClock {
                next: Cell::new(0),
                step: 16,
            }),
        ),
        None => DrawingPad::new(&settings, assets),
    };

    for command in &commands {
        if args.verbose {
            println!("  {:?}", command);
        }
        apply_command(&mut pad, command);
    }
    // A script that ends mid-stroke still gets its stroke
    pad.end_stroke();

    log_info!(
        "CLI replay: {} command(s), {} history entries",
        commands.len(),
        pad.history_len()
    );

    pad.image()
        .save(&args.output)
        .map_err(|e| format!("could not write '{}': {}", args.output.display(), e))
}
