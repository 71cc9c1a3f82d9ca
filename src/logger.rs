//! Logging for both run modes.
//!
//! The GUI logs to a session file in the OS data directory, truncated at each
//! launch:
//!   Windows:  `%APPDATA%\DoodlePad\doodlepad.log`
//!   Linux:    `~/.local/share/DoodlePad/doodlepad.log`
//!   macOS:    `~/Library/Application Support/DoodlePad/doodlepad.log`
//!
//! Headless replays log to stderr instead, warnings and errors only unless
//! `--verbose` is given.
//!
//! Use `log_info!` / `log_warn!` / `log_err!` anywhere in the crate. Until a
//! sink is installed (library use, tests) they do nothing.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

enum Sink {
    File(Mutex<File>),
    Stderr { min: Level },
}

impl Sink {
    fn accepts(&self, level: Level) -> bool {
        match self {
            Sink::File(_) => true,
            Sink::Stderr { min } => level >= *min,
        }
    }

    fn emit(&self, line: &str) {
        match self {
            Sink::File(file) => {
                if let Ok(mut file) = file.lock() {
                    let _ = writeln!(file, "{}", line);
                }
            }
            Sink::Stderr { .. } => eprintln!("{}", line),
        }
    }
}

static SINK: OnceLock<Sink> = OnceLock::new();

/// Log one message. Never fails; I/O errors are dropped.
pub fn write(level: Level, msg: &str) {
    let Some(sink) = SINK.get() else { return };
    if sink.accepts(level) {
        sink.emit(&format_line(&timestamp(), level, msg));
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*));
    };
}

/// Start the GUI session log. Call once at startup.
///
/// Creates (or truncates) the log file and installs a panic hook that records
/// the panic before handing over to the previous hook. If the file can't be
/// opened the pad runs without a log.
pub fn init() {
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path);
    let file = match file {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[logger] Failed to open log file {:?}: {}", path, e);
            return;
        }
    };
    if SINK.set(Sink::File(Mutex::new(file))).is_err() {
        return;
    }

    write(Level::Info, &format!("DoodlePad session started, log at {}", path.display()));

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write(Level::Error, &format!("PANIC: {}", info));
        prev(info);
    }));
}

/// Log to stderr for headless runs. `verbose` lets INFO lines through.
pub fn init_stderr(verbose: bool) {
    let min = if verbose { Level::Info } else { Level::Warn };
    let _ = SINK.set(Sink::Stderr { min });
}

fn format_line(stamp: &str, level: Level, msg: &str) -> String {
    format!("[{}] [{}] {}", stamp, level.tag(), msg)
}

fn log_file_path() -> PathBuf {
    data_dir().join("DoodlePad").join("doodlepad.log")
}

/// Platform data directory (without the app sub-folder).
fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support");
        }
    }
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from(".")
}

/// HH:MM:SS within the current UTC day.
fn timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => {
            let secs = d.as_secs();
            format!(
                "{:02}:{:02}:{:02}",
                (secs % 86400) / 3600,
                (secs % 3600) / 60,
                secs % 60
            )
        }
        Err(_) => "??:??:??".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_sink_filters_by_level() {
        let quiet = Sink::Stderr { min: Level::Warn };
        assert!(!quiet.accepts(Level::Info));
        assert!(quiet.accepts(Level::Warn));
        assert!(quiet.accepts(Level::Error));

        let verbose = Sink::Stderr { min: Level::Info };
        assert!(verbose.accepts(Level::Info));
    }

    #[test]
    fn lines_carry_time_and_level() {
        assert_eq!(
            format_line("12:00:01", Level::Warn, "Stamp 'sun' unavailable"),
            "[12:00:01] [WARN] Stamp 'sun' unavailable"
        );
    }

    #[test]
    fn timestamp_is_clock_shaped() {
        let t = timestamp();
        assert_eq!(t.len(), 8);
        assert_eq!(t.matches(':').count(), 2);
    }
}
