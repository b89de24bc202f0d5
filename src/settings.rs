use std::path::PathBuf;

use crate::components::history::DEFAULT_HISTORY_CAPACITY;
use crate::grid::{DEFAULT_GRID_SIZE, MAX_GRID_SIZE};

const MIN_CELL_SIZE: f32 = 4.0;
const MAX_CELL_SIZE: f32 = 96.0;

/// Application settings that persist across sessions
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Dimension of the grid created at startup
    pub grid_size: usize,
    /// On-screen size of one cell in points
    pub cell_size: f32,
    /// Maximum number of undo snapshots
    pub history_capacity: usize,
    /// Directory exports are written to. Empty = ask with a folder picker.
    pub export_dir: String,
    /// Draw separator lines between cells
    pub show_grid_lines: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            cell_size: 24.0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            export_dir: String::new(),
            show_grid_lines: true,
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/tripaint/tripaint_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\TriPaint\tripaint_settings.cfg
    /// On macOS:   ~/Library/Application Support/TriPaint/tripaint_settings.cfg
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").or_else(|_| std::env::var("USERPROFILE")).ok()?;
            return Some(PathBuf::from(appdata).join("TriPaint").join("tripaint_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("TriPaint")
                    .join("tripaint_settings.cfg"),
            );
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
                .ok()?;
            Some(config_dir.join("tripaint").join("tripaint_settings.cfg"))
        }
    }

    /// Serialize as `key=value` lines.
    pub fn to_config_string(&self) -> String {
        format!(
            "grid_size={}\n\
             cell_size={}\n\
             history_capacity={}\n\
             export_dir={}\n\
             show_grid_lines={}\n",
            self.grid_size, self.cell_size, self.history_capacity, self.export_dir, self.show_grid_lines,
        )
    }

    /// Parse `key=value` lines. Unknown keys and unparseable values are
    /// skipped; out-of-range numbers are clamped.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "grid_size" => {
                    if let Ok(n) = val.parse::<usize>() {
                        s.grid_size = n.clamp(1, MAX_GRID_SIZE);
                    }
                }
                "cell_size" => {
                    if let Ok(v) = val.parse::<f32>()
                        && v.is_finite()
                    {
                        s.cell_size = v.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);
                    }
                }
                "history_capacity" => {
                    if let Ok(n) = val.parse::<usize>() {
                        s.history_capacity = n.max(1);
                    }
                }
                "export_dir" => {
                    s.export_dir = val.to_string();
                }
                "show_grid_lines" => {
                    s.show_grid_lines = val == "true";
                }
                _ => {}
            }
        }
        s
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(e) = std::fs::write(&path, self.to_config_string()) {
            crate::log_warn!("Could not write settings {}: {}", path.display(), e);
        }
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        let Ok(content) = std::fs::read_to_string(&path) else { return Self::default() };
        Self::parse(&content)
    }

    /// Export directory, if one is configured.
    pub fn export_dir(&self) -> Option<PathBuf> {
        if self.export_dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.export_dir))
        }
    }
}
