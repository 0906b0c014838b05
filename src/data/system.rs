//! System-wide information structures

use super::hardware::{BatteryEntry, CpuInfo, DisplayEntry, UsageInfo};
use super::UNKNOWN;
use crate::platform::PlatformContext;

/// Everything gathered in one run; every field is present, failures hold the sentinel
#[derive(Debug, Clone, PartialEq)]
pub struct InfoRecord {
    pub hostname: String,
    pub platform: String,
    pub distro: String,
    /// Lowercase distro id such as `debian`; Unknown off Linux
    pub distro_id: String,
    pub release: String,
    pub kernel: String,
    pub arch: String,
    pub cpu: CpuInfo,
    pub gpu: String,
    pub memory: UsageInfo,
    pub disk: UsageInfo,
    pub uptime: String,
    pub shell: String,
    pub terminal: String,
    pub resolution: String,
    pub battery: Vec<BatteryEntry>,
    pub packages: String,
    pub display: Vec<DisplayEntry>,
    pub theme: ThemeInfo,
    pub locale: LocaleInfo,
    pub network: Vec<NetworkInterface>,
    /// `None` when the host reports no swap
    pub swap: Option<UsageInfo>,
    pub android_info: Option<AndroidInfo>,
}

impl InfoRecord {
    /// Record used when gathering fails outright
    pub fn unknown(ctx: &PlatformContext) -> Self {
        InfoRecord {
            hostname: UNKNOWN.to_string(),
            platform: ctx.platform.to_string(),
            distro: UNKNOWN.to_string(),
            distro_id: UNKNOWN.to_string(),
            release: UNKNOWN.to_string(),
            kernel: UNKNOWN.to_string(),
            arch: ctx.arch.clone(),
            cpu: CpuInfo::unknown(),
            gpu: UNKNOWN.to_string(),
            memory: UsageInfo::unknown(),
            disk: UsageInfo::unknown(),
            uptime: UNKNOWN.to_string(),
            shell: UNKNOWN.to_string(),
            terminal: UNKNOWN.to_string(),
            resolution: UNKNOWN.to_string(),
            battery: Vec::new(),
            packages: UNKNOWN.to_string(),
            display: Vec::new(),
            theme: ThemeInfo::default(),
            locale: LocaleInfo::unknown(),
            network: Vec::new(),
            swap: None,
            android_info: None,
        }
    }
}

/// Operating system identity as reported by a probe
#[derive(Debug, Clone, PartialEq)]
pub struct OsInfo {
    pub distro: String,
    pub release: String,
    pub kernel: String,
    /// Machine-readable distro id (`ID=` in os-release)
    pub id: Option<String>,
}

/// Desktop theming; each entry is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeInfo {
    pub de: Option<String>,
    pub wm: Option<String>,
    pub theme: Option<String>,
    pub icons: Option<String>,
    pub font: Option<String>,
    pub cursor: Option<String>,
    pub wm_theme: Option<String>,
}

impl ThemeInfo {
    pub fn is_empty(&self) -> bool {
        *self == ThemeInfo::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocaleInfo {
    pub locale: String,
    pub timezone: String,
}

impl LocaleInfo {
    pub fn unknown() -> Self {
        LocaleInfo {
            locale: UNKNOWN.to_string(),
            timezone: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkInterface {
    pub name: String,
    pub ip: String,
}

/// Android device properties
#[derive(Debug, Clone, PartialEq)]
pub struct AndroidInfo {
    pub device: String,
    pub manufacturer: String,
    pub version: String,
    pub sdk: String,
    pub build: String,
    pub fingerprint: String,
    pub wifi: String,
    pub storage_total: String,
    pub storage_used: String,
}
