//! Host platform detection

use std::fmt;

/// Platforms with a dedicated probe implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Android,
    Unknown,
}

impl Platform {
    /// Map a Rust target OS name (`std::env::consts::OS`) to a platform
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            "android" => Platform::Android,
            _ => Platform::Unknown,
        }
    }

    /// Key used to pick ASCII art for this platform
    pub fn art_key(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Android => "android",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
            Platform::Windows => "Windows",
            Platform::Android => "Android",
            Platform::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Facts about the host computed once at startup and passed around explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformContext {
    pub platform: Platform,
    pub arch: String,
    /// Raw target OS identifier, kept for diagnostics
    pub os: String,
}

impl PlatformContext {
    /// Detect from the process environment and compile target
    pub fn detect() -> Self {
        Self::detect_with(|key| std::env::var(key).ok(), std::env::consts::OS)
    }

    /// Detection with an injectable environment lookup.
    /// Android is checked first because it also reports itself as Linux.
    pub fn detect_with<F>(env: F, os: &str) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let android = ["ANDROID_ROOT", "ANDROID_DATA"]
            .iter()
            .any(|key| env(key).is_some_and(|value| !value.trim().is_empty()));

        let platform = if android {
            Platform::Android
        } else {
            Platform::from_os(os)
        };

        PlatformContext {
            platform,
            arch: std::env::consts::ARCH.to_string(),
            os: os.to_string(),
        }
    }

    pub fn with_platform(platform: Platform) -> Self {
        PlatformContext {
            platform,
            arch: std::env::consts::ARCH.to_string(),
            os: std::env::consts::OS.to_string(),
        }
    }

    pub fn is_android(&self) -> bool {
        self.platform == Platform::Android
    }
}
