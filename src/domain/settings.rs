use crate::error::ShimError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_false")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_false(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_false(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "bt_controller_pairer".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

/// How the Bluetooth control tool is invoked and where its results are kept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_keywords")]
    pub controller_keywords: Vec<String>,
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    #[serde(default = "default_scan_file")]
    pub scan_file: String,
    #[serde(default = "default_paired_file")]
    pub paired_file: String,
    #[serde(default = "default_connected_file")]
    pub connected_file: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout_secs: default_timeout_secs(),
            controller_keywords: default_keywords(),
            scratch_dir: default_scratch_dir(),
            scan_file: default_scan_file(),
            paired_file: default_paired_file(),
            connected_file: default_connected_file(),
        }
    }
}

fn default_program() -> String {
    "bluetoothctl".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_keywords() -> Vec<String> {
    vec![
        "dualshock".to_string(),
        "dualsense".to_string(),
        "controller".to_string(),
    ]
}
fn default_scratch_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_scan_file() -> String {
    "BtScanOutput.json".to_string()
}
fn default_paired_file() -> String {
    "BtPairedDevices.json".to_string()
}
fn default_connected_file() -> String {
    "BtConnectedDevices.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Logging Settings
    #[serde(default)]
    pub log_settings: LogSettings,

    // Tool Settings
    #[serde(default)]
    pub tool: ToolSettings,

    /// Remove every known device before accepting commands
    #[serde(default = "default_true")]
    pub startup_cleanup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_settings: LogSettings::default(),
            tool: ToolSettings::default(),
            startup_cleanup: true,
        }
    }
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
    load_error: Option<ShimError>,
}

impl SettingsService {
    /// Load settings from the per-user config directory
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::from_path(settings_path))
    }

    /// Load settings from an explicit file, falling back to defaults if it is missing or invalid.
    ///
    /// A missing file is the normal first run; any other failure is kept for
    /// [`take_load_error`](Self::take_load_error).
    pub fn from_path(settings_path: PathBuf) -> Self {
        let (settings, load_error) = match Self::load_from_file(&settings_path) {
            Ok(settings) => (settings, None),
            Err(ShimError::Settings { source, .. }) if source.kind() == ErrorKind::NotFound => {
                (Settings::default(), None)
            }
            Err(e) => (Settings::default(), Some(e)),
        };
        Self {
            settings,
            settings_path,
            load_error,
        }
    }

    /// Why the settings file was ignored, if it existed but could not be used
    pub fn take_load_error(&mut self) -> Option<ShimError> {
        self.load_error.take()
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("BtControllerPairer");
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> Result<Settings, ShimError> {
        let contents = fs::read_to_string(path).map_err(|source| ShimError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        let settings =
            serde_json::from_str(&contents).map_err(|source| ShimError::SettingsFormat {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}
