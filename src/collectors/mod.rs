//! Platform probes
//!
//! Each platform implements [`PlatformProbe`]; the aggregator asks the probe
//! returned by [`probe_for`] for one category at a time and degrades any
//! `Err` to the sentinel for that field only.

pub mod android;
pub mod common;
pub mod desktop;
pub mod gpu;
pub mod linux;
pub mod macos;
pub mod packages;
pub mod sensors;
pub mod windows;

use crate::data::{AndroidInfo, BatteryEntry, Capacity, CpuInfo, DisplayEntry, NetworkInterface, OsInfo, ThemeInfo};
use crate::error::{FetchError, Result};
use crate::platform::{Platform, PlatformContext};

/// One category of host information per method, specialised per platform
pub trait PlatformProbe: Send + Sync {
    fn name(&self) -> &'static str;

    fn hostname(&self) -> Result<String> {
        common::hostname()
    }

    fn os(&self) -> Result<OsInfo>;
    fn cpu(&self) -> Result<CpuInfo>;
    fn gpu(&self) -> Result<String>;
    fn memory(&self) -> Result<Capacity>;
    fn disk(&self) -> Result<Capacity>;
    fn uptime(&self) -> Result<u64>;
    fn batteries(&self) -> Result<Vec<BatteryEntry>>;
    fn packages(&self) -> Result<String>;
    fn displays(&self) -> Result<Vec<DisplayEntry>>;

    /// Resolution of the first display
    fn resolution(&self) -> Result<String> {
        self.displays()?
            .into_iter()
            .next()
            .map(|display| display.resolution)
            .ok_or_else(|| FetchError::detection("no display found"))
    }

    fn theme(&self) -> Result<ThemeInfo>;
    fn network(&self) -> Result<Vec<NetworkInterface>>;
    fn swap(&self) -> Result<Capacity>;

    fn android(&self) -> Result<AndroidInfo> {
        Err(FetchError::Unsupported(self.name()))
    }
}

/// Select the probe implementation for the context's platform
pub fn probe_for(ctx: &PlatformContext) -> Box<dyn PlatformProbe> {
    match ctx.platform {
        Platform::Linux => Box::new(linux::LinuxProbe::new()),
        Platform::Android => Box::new(android::AndroidProbe::new()),
        Platform::MacOs => Box::new(macos::MacProbe),
        Platform::Windows => Box::new(windows::WindowsProbe),
        Platform::Unknown => Box::new(UnsupportedProbe),
    }
}

/// Probe for platforms without an implementation; every category fails
pub struct UnsupportedProbe;

const UNSUPPORTED: &str = "an unsupported platform";

impl PlatformProbe for UnsupportedProbe {
    fn name(&self) -> &'static str {
        UNSUPPORTED
    }

    fn os(&self) -> Result<OsInfo> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn cpu(&self) -> Result<CpuInfo> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn gpu(&self) -> Result<String> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn memory(&self) -> Result<Capacity> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn disk(&self) -> Result<Capacity> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn uptime(&self) -> Result<u64> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn batteries(&self) -> Result<Vec<BatteryEntry>> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn packages(&self) -> Result<String> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn displays(&self) -> Result<Vec<DisplayEntry>> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn theme(&self) -> Result<ThemeInfo> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn network(&self) -> Result<Vec<NetworkInterface>> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }

    fn swap(&self) -> Result<Capacity> {
        Err(FetchError::Unsupported(UNSUPPORTED))
    }
}
