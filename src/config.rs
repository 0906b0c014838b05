//! TOML configuration: colours, layout toggles and per-field visibility

use crate::error::{FetchError, Result};
use dirs::{config_dir, data_dir};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SYSTEM_CONFIG: &str = "/usr/share/artfetch/config.toml";
const SYSTEM_ASCII_DIR: &str = "/usr/share/artfetch/ascii";
const BUNDLED_ASCII_DIR: &str = env!("ARTFETCH_BUNDLED_ASCII_DIR");

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub colors: ColorConfig,
    pub display: DisplayConfig,
    pub show_info: ShowInfo,
}

/// Colour per UI role; names such as `cyan` or `#rrggbb`
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub title: String,
    pub labels: String,
    pub ascii: String,
    pub info: String,
    /// Accepted so older config files still parse; nothing is drawn with it
    pub bar: String,
    /// Values that degraded to `Unknown`
    pub error: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            title: "bright_cyan".to_string(),
            labels: "cyan".to_string(),
            ascii: "cyan".to_string(),
            info: "white".to_string(),
            bar: "green".to_string(),
            error: "red".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_ascii_art: bool,
    pub show_color_blocks: bool,
    pub compact_mode: bool,
    /// Pad labels to a common width instead of collapsing `Label  :`
    pub align_labels: bool,
    pub separator: String,
    pub separator_length: usize,
    pub ascii_dir: Option<String>,
    /// Colours substituted for the `$1`..`$4` art markers
    pub art_colors: Vec<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            show_ascii_art: true,
            show_color_blocks: true,
            compact_mode: false,
            align_labels: false,
            separator: "-".to_string(),
            separator_length: 40,
            ascii_dir: None,
            art_colors: ["cyan", "blue", "green", "yellow"].map(String::from).to_vec(),
        }
    }
}

/// Visibility of each report line
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ShowInfo {
    pub hostname: bool,
    pub os: bool,
    pub kernel: bool,
    pub uptime: bool,
    pub shell: bool,
    pub terminal: bool,
    pub cpu: bool,
    pub gpu: bool,
    pub memory: bool,
    pub swap: bool,
    pub disk: bool,
    pub resolution: bool,
    pub packages: bool,
    pub display: bool,
    pub de: bool,
    pub wm: bool,
    pub theme: bool,
    pub icons: bool,
    pub font: bool,
    pub cursor: bool,
    pub wm_theme: bool,
    pub locale: bool,
    pub timezone: bool,
    pub battery: bool,
    pub network: bool,
    pub android: bool,
}

impl Default for ShowInfo {
    fn default() -> Self {
        ShowInfo {
            hostname: true,
            os: true,
            kernel: true,
            uptime: true,
            shell: true,
            terminal: true,
            cpu: true,
            gpu: true,
            memory: true,
            swap: true,
            disk: true,
            resolution: true,
            packages: true,
            display: true,
            de: true,
            wm: true,
            theme: true,
            icons: true,
            font: true,
            cursor: true,
            wm_theme: true,
            locale: true,
            timezone: true,
            battery: true,
            network: false,
            android: true,
        }
    }
}

pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|err| FetchError::Config(err.to_string()))
}

fn config_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    candidates.extend(explicit.map(Path::to_path_buf));
    candidates.extend(config_dir().map(|dir| dir.join("artfetch/config.toml")));
    candidates.push(PathBuf::from(SYSTEM_CONFIG));
    candidates
}

/// First readable and valid config in lookup order, else the defaults
pub fn load_config(explicit: Option<&Path>) -> Config {
    for path in config_candidates(explicit) {
        if !path.exists() {
            if explicit == Some(path.as_path()) {
                warn!(path = %path.display(), "config file not found");
            }
            continue;
        }

        match fs::read_to_string(&path).map_err(FetchError::from).and_then(|text| parse_config(&text)) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                return config;
            }
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring unusable config"),
        }
    }

    debug!("using built-in config");
    Config::default()
}

/// Directory holding the `*.txt` art files
pub fn resolve_ascii_dir(cli_dir: Option<&Path>, config: &Config) -> PathBuf {
    if let Some(dir) = cli_dir {
        return dir.to_path_buf();
    }

    let configured = config
        .display
        .ascii_dir
        .as_deref()
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()));

    if let Some(dir) = &configured {
        if dir.is_dir() {
            return dir.clone();
        }
        warn!(path = %dir.display(), "configured ascii_dir is not a directory");
    }

    data_dir()
        .map(|dir| dir.join("artfetch/ascii"))
        .into_iter()
        .chain([PathBuf::from(SYSTEM_ASCII_DIR)])
        .find(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from(BUNDLED_ASCII_DIR))
}
