//! Session logger — writes all log output to a single file in the OS data directory.
//!
//! The file is **truncated (overwritten) at each launch**, so it only ever
//! contains output from the most-recent session.
//!
//! Log location:
//!   Windows:  `%APPDATA%\TriPaint\tripaint.log`
//!   Linux:    `~/.local/share/TriPaint/tripaint.log`
//!   macOS:    `~/Library/Application Support/TriPaint/tripaint.log`
//!
//! Use the `log_info!` / `log_warn!` / `log_err!` macros anywhere in the crate.
//! Before [`init`] runs (tests, CLI mode) they are silent no-ops.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();

/// Write a line to the session log.  Silently ignores I/O errors so that
/// logging never crashes the application.
pub fn write_line(line: &str) {
    if let Some(mutex) = LOG_FILE.get()
        && let Ok(mut file) = mutex.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

/// Write a timestamped, level-tagged line to the session log.
pub fn write(level: &str, msg: &str) {
    write_line(&format_line(&timestamp(), level, msg));
}

fn format_line(ts: &str, level: &str, msg: &str) -> String {
    format!("[{}] [{}] {}", ts, level, msg)
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write("INFO", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write("WARN", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write("ERROR", &format!($($arg)*));
    };
}

/// Initialise the session logger.  Must be called once before any logging.
///
/// * Creates (or truncates) the log file.
/// * Installs a panic hook that writes the panic message to the log before
///   propagating to the default handler.
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

    match file {
        Ok(f) => {
            let _ = LOG_FILE.set(Mutex::new(f));
        }
        Err(e) => {
            // Can't open log file — not fatal, just skip
            eprintln!("[logger] Failed to open log file {:?}: {}", path, e);
            return;
        }
    }

    write_line(&format!(
        "=== TriPaint session started (unix {}) ===",
        unix_seconds().unwrap_or(0)
    ));
    write_line(&format!("Log file: {}", path.display()));
    write_line("");

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write_line(&format_line(&timestamp(), "PANIC", &info.to_string()));
        prev(info);
    }));
}

fn log_file_path() -> PathBuf {
    data_dir().join("TriPaint").join("tripaint.log")
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

fn unix_seconds() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// HH:MM:SS (UTC) within the current day.
fn timestamp() -> String {
    match unix_seconds() {
        Some(secs) => clock(secs),
        None => "??:??:??".to_string(),
    }
}

fn clock(secs: u64) -> String {
    let h = (secs % 86400) / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
