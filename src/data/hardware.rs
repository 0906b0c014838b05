//! Hardware-specific information structures

use super::UNKNOWN;
use std::fmt;

/// CPU information
#[derive(Debug, Clone, PartialEq)]
pub struct CpuInfo {
    pub model: String,
    pub cores: Option<usize>,
    /// Clock speed, already formatted (`3.80 GHz`)
    pub speed: Option<String>,
}

impl CpuInfo {
    pub fn unknown() -> Self {
        CpuInfo {
            model: UNKNOWN.to_string(),
            cores: None,
            speed: None,
        }
    }
}

/// Raw capacity numbers reported by a memory, swap or disk probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl Capacity {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.available_bytes)
    }
}

/// Derived usage figures for memory, disk and swap
#[derive(Debug, Clone, PartialEq)]
pub struct UsageInfo {
    pub total: String,
    pub used: String,
    pub percentage: String,
}

impl UsageInfo {
    pub fn unknown() -> Self {
        UsageInfo {
            total: UNKNOWN.to_string(),
            used: UNKNOWN.to_string(),
            percentage: UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        super::is_unknown(&self.total)
    }
}

/// Charge state reported by a battery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatus {
    Charging,
    Discharging,
    Full,
    NotCharging,
    Unknown,
}

impl BatteryStatus {
    /// Parse the status strings used by sysfs, pmset and wmic
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "charging" => BatteryStatus::Charging,
            "discharging" => BatteryStatus::Discharging,
            "full" | "charged" | "finishing charge" => BatteryStatus::Full,
            "not charging" | "not-charging" | "ac attached" => BatteryStatus::NotCharging,
            _ => BatteryStatus::Unknown,
        }
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatteryStatus::Charging => "Charging",
            BatteryStatus::Discharging => "Discharging",
            BatteryStatus::Full => "Full",
            BatteryStatus::NotCharging => "Not charging",
            BatteryStatus::Unknown => UNKNOWN,
        };
        f.write_str(label)
    }
}

/// One battery; devices may report several
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryEntry {
    pub name: String,
    /// Percentage string such as `85%`
    pub capacity: String,
    pub status: BatteryStatus,
    pub time_remaining: Option<String>,
    pub voltage: Option<String>,
    pub temperature: Option<String>,
    pub current: Option<String>,
    pub power: Option<String>,
}

impl BatteryEntry {
    pub fn new(name: impl Into<String>, capacity: impl Into<String>, status: BatteryStatus) -> Self {
        BatteryEntry {
            name: name.into(),
            capacity: capacity.into(),
            status,
            time_remaining: None,
            voltage: None,
            temperature: None,
            current: None,
            power: None,
        }
    }
}

/// One connected display
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEntry {
    pub name: String,
    /// `WxH`
    pub resolution: String,
    pub refresh: Option<String>,
    pub size: Option<String>,
}

impl fmt::Display for DisplayEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolution)?;
        if let Some(refresh) = &self.refresh {
            write!(f, " {}", refresh)?;
        }
        if let Some(size) = &self.size {
            write!(f, " {}", size)?;
        }
        if !self.name.is_empty() {
            write!(f, " ({})", self.name)?;
        }
        Ok(())
    }
}
