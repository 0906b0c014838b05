//! Builds an [`InfoRecord`] from the platform probe, one category at a time

use crate::collectors::{common, probe_for, PlatformProbe};
use crate::data::{Capacity, CpuInfo, InfoRecord, ThemeInfo, UsageInfo, UNKNOWN};
use crate::error::{FetchError, Result};
use crate::platform::PlatformContext;
use crate::utils::parsing::{format_gb, format_percentage, format_uptime};
use tracing::debug;

/// Gather everything for the detected platform. Never fails: a category whose
/// probe errors holds the sentinel and the remaining categories still run.
pub fn gather_info(ctx: &PlatformContext) -> InfoRecord {
    let probe = probe_for(ctx);
    debug!(probe = probe.name(), "gathering system information");
    gather_with(probe.as_ref(), ctx)
}

/// Keep a probe value, or log the failure and use the fallback
fn field<T>(category: &'static str, result: Result<T>, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            debug!(category, error = %err, "probe failed, using fallback");
            fallback()
        }
    }
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Used/total figures for a capacity; an empty total is not a measurement
pub fn usage_from(capacity: Capacity) -> Result<UsageInfo> {
    let percentage = format_percentage(capacity.used_bytes(), capacity.total_bytes)
        .ok_or_else(|| FetchError::detection("capacity reported as zero"))?;

    Ok(UsageInfo {
        total: format_gb(capacity.total_bytes),
        used: format_gb(capacity.used_bytes()),
        percentage,
    })
}

pub fn gather_with(probe: &dyn PlatformProbe, ctx: &PlatformContext) -> InfoRecord {
    // Independent categories run in parallel; each result lands in a fixed slot
    let ((hostname, os), ((cpu, gpu), (memory, disk))) = rayon::join(
        || rayon::join(|| probe.hostname(), || probe.os()),
        || {
            rayon::join(
                || rayon::join(|| probe.cpu(), || probe.gpu()),
                || rayon::join(|| probe.memory(), || probe.disk()),
            )
        },
    );

    let ((uptime, (batteries, packages)), ((displays, theme), (network, swap))) = rayon::join(
        || rayon::join(|| probe.uptime(), || rayon::join(|| probe.batteries(), || probe.packages())),
        || {
            rayon::join(
                || rayon::join(|| probe.displays(), || probe.theme()),
                || rayon::join(|| probe.network(), || probe.swap()),
            )
        },
    );

    let ((shell, terminal), (locale, android)) = rayon::join(
        || rayon::join(|| common::shell(ctx), common::terminal),
        || {
            rayon::join(
                || common::locale(ctx),
                || ctx.is_android().then(|| probe.android()),
            )
        },
    );

    let os = field("os", os.map(Some), || None);
    let displays = field("display", displays, Vec::new);
    let resolution = match displays.first() {
        Some(display) => display.resolution.clone(),
        None => field("resolution", probe.resolution(), unknown),
    };

    // No swap configured hides the line rather than showing Unknown
    let swap = swap.and_then(|swap| match swap.total_bytes {
        0 => Ok(None),
        _ => usage_from(swap).map(Some),
    });
    let swap = field("swap", swap, || None);

    InfoRecord {
        hostname: field("hostname", hostname, unknown),
        platform: ctx.platform.to_string(),
        distro: os.as_ref().map(|os| os.distro.clone()).unwrap_or_else(unknown),
        distro_id: os.as_ref().and_then(|os| os.id.clone()).unwrap_or_else(unknown),
        release: os.as_ref().map(|os| os.release.clone()).unwrap_or_else(unknown),
        kernel: os.map(|os| os.kernel).unwrap_or_else(unknown),
        arch: ctx.arch.clone(),
        cpu: field("cpu", cpu, CpuInfo::unknown),
        gpu: field("gpu", gpu, unknown),
        memory: field("memory", memory.and_then(usage_from), UsageInfo::unknown),
        disk: field("disk", disk.and_then(usage_from), UsageInfo::unknown),
        uptime: field("uptime", uptime.map(format_uptime), unknown),
        shell: field("shell", shell, unknown),
        terminal,
        resolution,
        battery: field("battery", batteries, Vec::new),
        packages: field("packages", packages, unknown),
        display: displays,
        theme: field("theme", theme, ThemeInfo::default),
        locale,
        network: field("network", network, Vec::new),
        swap,
        android_info: android.and_then(|android| field("android", android.map(Some), || None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::UnsupportedProbe;
    use crate::data::{BatteryEntry, BatteryStatus, DisplayEntry, NetworkInterface, OsInfo};
    use crate::platform::Platform;

    const GIB: u64 = 1024 * 1024 * 1024;

    /// Probe with canned values; categories listed in `failing` return errors
    struct FakeProbe {
        failing: &'static [&'static str],
        swap_total: u64,
    }

    impl FakeProbe {
        fn check(&self, category: &'static str) -> Result<()> {
            if self.failing.contains(&category) {
                return Err(FetchError::detection(category));
            }
            Ok(())
        }
    }

    impl PlatformProbe for FakeProbe {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn hostname(&self) -> Result<String> {
            self.check("hostname")?;
            Ok("testbox".into())
        }

        fn os(&self) -> Result<OsInfo> {
            self.check("os")?;
            Ok(OsInfo {
                distro: "Arch Linux".into(),
                release: "rolling".into(),
                kernel: "6.9.1-arch1-1".into(),
                id: Some("arch".into()),
            })
        }

        fn cpu(&self) -> Result<CpuInfo> {
            self.check("cpu")?;
            Ok(CpuInfo {
                model: "AMD Ryzen 7 5800X".into(),
                cores: Some(16),
                speed: Some("3.80 GHz".into()),
            })
        }

        fn gpu(&self) -> Result<String> {
            self.check("gpu")?;
            Ok("AMD Radeon RX 6700 XT".into())
        }

        fn memory(&self) -> Result<Capacity> {
            self.check("memory")?;
            Ok(Capacity { total_bytes: 16 * GIB, available_bytes: 8 * GIB })
        }

        fn disk(&self) -> Result<Capacity> {
            self.check("disk")?;
            Ok(Capacity { total_bytes: 0, available_bytes: 0 })
        }

        fn uptime(&self) -> Result<u64> {
            self.check("uptime")?;
            Ok(3661)
        }

        fn batteries(&self) -> Result<Vec<BatteryEntry>> {
            self.check("battery")?;
            Ok(vec![BatteryEntry::new("BAT0", "85%", BatteryStatus::Charging)])
        }

        fn packages(&self) -> Result<String> {
            self.check("packages")?;
            Ok("1024 (pacman)".into())
        }

        fn displays(&self) -> Result<Vec<DisplayEntry>> {
            self.check("display")?;
            Ok(vec![DisplayEntry {
                name: "DP-1".into(),
                resolution: "2560x1440".into(),
                refresh: Some("144 Hz".into()),
                size: None,
            }])
        }

        fn theme(&self) -> Result<ThemeInfo> {
            self.check("theme")?;
            Ok(ThemeInfo { wm: Some("Sway".into()), ..ThemeInfo::default() })
        }

        fn network(&self) -> Result<Vec<NetworkInterface>> {
            self.check("network")?;
            Ok(vec![NetworkInterface { name: "eth0".into(), ip: "10.0.0.2".into() }])
        }

        fn swap(&self) -> Result<Capacity> {
            self.check("swap")?;
            Ok(Capacity { total_bytes: self.swap_total, available_bytes: self.swap_total / 4 })
        }
    }

    fn linux() -> PlatformContext {
        PlatformContext::with_platform(Platform::Linux)
    }

    #[test]
    fn derived_fields() {
        let probe = FakeProbe { failing: &[], swap_total: 4 * GIB };
        let info = gather_with(&probe, &linux());

        assert_eq!(info.hostname, "testbox");
        assert_eq!(info.distro, "Arch Linux");
        assert_eq!(info.distro_id, "arch");
        assert_eq!(info.memory.percentage, "50.0%");
        assert_eq!(info.memory.total, "16.00 GB");
        assert_eq!(info.memory.used, "8.00 GB");
        assert_eq!(info.uptime, "1h 1m");
        assert_eq!(info.resolution, "2560x1440");
        assert_eq!(info.swap.as_ref().map(|s| s.percentage.as_str()), Some("75.0%"));
        assert!(info.android_info.is_none());
    }

    #[test]
    fn zero_sized_disk_is_unknown_and_empty_swap_hidden() {
        let probe = FakeProbe { failing: &[], swap_total: 0 };
        let info = gather_with(&probe, &linux());
        assert!(info.disk.is_unknown());
        assert_eq!(info.swap, None);
    }

    #[test]
    fn failures_degrade_single_fields() {
        let probe = FakeProbe {
            failing: &["cpu", "gpu", "display", "uptime", "os"],
            swap_total: GIB,
        };
        let info = gather_with(&probe, &linux());

        assert_eq!(info.cpu, CpuInfo::unknown());
        assert_eq!(info.gpu, UNKNOWN);
        assert_eq!(info.resolution, UNKNOWN);
        assert_eq!(info.uptime, UNKNOWN);
        assert_eq!(info.kernel, UNKNOWN);
        assert!(info.display.is_empty());
        // untouched categories still populated
        assert_eq!(info.hostname, "testbox");
        assert_eq!(info.packages, "1024 (pacman)");
        assert_eq!(info.memory.percentage, "50.0%");
    }

    #[test]
    fn unsupported_platform_yields_unknown_record() {
        let ctx = PlatformContext::with_platform(Platform::Unknown);
        let info = gather_with(&UnsupportedProbe, &ctx);

        assert_eq!(info.distro, UNKNOWN);
        assert_eq!(info.cpu.model, UNKNOWN);
        assert!(info.memory.is_unknown());
        assert!(info.battery.is_empty());
        assert_eq!(info.platform, "Unknown");
    }
}
