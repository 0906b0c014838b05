//! Android probes: Linux pseudo-files plus `getprop`, `dumpsys` and `wm`

use super::linux::{self, LinuxProbe};
use super::{gpu, sensors, PlatformProbe};
use crate::data::{is_unknown, AndroidInfo, BatteryEntry, Capacity, CpuInfo, DisplayEntry, NetworkInterface, OsInfo, ThemeInfo, UNKNOWN};
use crate::error::{FetchError, Result};
use crate::utils::{command::*, file::*, parsing::*};
use std::env;
use std::path::Path;
use tracing::debug;

const POWER_SUPPLY: &str = "/sys/class/power_supply";
const STORAGE_MOUNTS: [&str; 3] = ["/storage/emulated/0", "/data", "/"];

pub struct AndroidProbe {
    linux: LinuxProbe,
}

impl AndroidProbe {
    pub fn new() -> Self {
        // Termux installs its package database under $PREFIX
        let prefix = env::var("PREFIX").unwrap_or_default();
        AndroidProbe {
            linux: LinuxProbe::with_prefix(prefix),
        }
    }
}

impl Default for AndroidProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn getprop(key: &str) -> Option<String> {
    run_command_nonempty("getprop", &[key])
        .map_err(|err| debug!(key, error = %err, "getprop failed"))
        .ok()
}

impl PlatformProbe for AndroidProbe {
    fn name(&self) -> &'static str {
        "Android"
    }

    fn hostname(&self) -> Result<String> {
        self.linux.hostname()
    }

    fn os(&self) -> Result<OsInfo> {
        Ok(OsInfo {
            distro: getprop("ro.product.model").unwrap_or_else(|| UNKNOWN.to_string()),
            release: getprop("ro.build.id").unwrap_or_else(|| UNKNOWN.to_string()),
            kernel: linux::kernel_version().unwrap_or_else(|_| UNKNOWN.to_string()),
            id: None,
        })
    }

    fn cpu(&self) -> Result<CpuInfo> {
        // Newer kernels and SELinux policies can hide /proc/cpuinfo
        let cpuinfo = read_file_safe("/proc/cpuinfo").unwrap_or_else(|err| {
            debug!(error = %err, "cpuinfo unreadable, naming CPU from properties");
            String::new()
        });
        let base = linux::parse_cpuinfo(&cpuinfo).ok();

        let model = compose_android_cpu(&CpuNameParts::gather(&cpuinfo, base.as_ref(), getprop))
            .ok_or_else(|| FetchError::detection("no CPU name source"))?;

        Ok(CpuInfo {
            model,
            cores: base.as_ref().and_then(|cpu| cpu.cores),
            speed: base.and_then(|cpu| cpu.speed).or_else(|| {
                read_sys_i64("/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq")
                    .map(|khz| format!("{:.2} GHz", khz as f64 / 1_000_000.0))
            }),
        })
    }

    fn gpu(&self) -> Result<String> {
        gpu::android_gpu()
    }

    fn memory(&self) -> Result<Capacity> {
        self.linux.memory()
    }

    fn disk(&self) -> Result<Capacity> {
        let mut last_err = FetchError::detection("no storage mount");
        for mount in STORAGE_MOUNTS {
            match linux::root_disk_usage(mount) {
                Ok(capacity) => return Ok(capacity),
                Err(err) => last_err = err,
            }
        }
        Err(last_err)
    }

    fn uptime(&self) -> Result<u64> {
        self.linux.uptime()
    }

    fn batteries(&self) -> Result<Vec<BatteryEntry>> {
        sensors::android_batteries(Path::new(POWER_SUPPLY))
    }

    fn packages(&self) -> Result<String> {
        self.linux.packages()
    }

    fn displays(&self) -> Result<Vec<DisplayEntry>> {
        match run_command("wm", &["size"]) {
            Ok(output) => {
                if let Some(resolution) = parse_wm_size(&output) {
                    return Ok(vec![DisplayEntry {
                        name: "Built-in".to_string(),
                        resolution,
                        refresh: None,
                        size: None,
                    }]);
                }
            }
            Err(err) => debug!(error = %err, "wm size unavailable"),
        }
        self.linux.displays()
    }

    fn theme(&self) -> Result<ThemeInfo> {
        Err(FetchError::Unsupported("Android"))
    }

    fn network(&self) -> Result<Vec<NetworkInterface>> {
        self.linux.network()
    }

    fn swap(&self) -> Result<Capacity> {
        self.linux.swap()
    }

    fn android(&self) -> Result<AndroidInfo> {
        let prop_or_env = |key: &str, fallback: &str| {
            getprop(key)
                .or_else(|| env::var(fallback).ok().filter(|v| !v.is_empty()))
                .unwrap_or_else(|| UNKNOWN.to_string())
        };

        let wifi = run_command("dumpsys", &["wifi"])
            .ok()
            .and_then(|output| parse_dumpsys_ssid(&output))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let (storage_total, storage_used) = ["/storage/emulated/0", "/sdcard"]
            .iter()
            .find_map(|mount| run_command("df", &["-h", *mount]).ok().and_then(|out| parse_df_human(&out)))
            .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string()));

        Ok(AndroidInfo {
            device: prop_or_env("ro.product.model", "ANDROID_DEVICE"),
            manufacturer: getprop("ro.product.manufacturer").unwrap_or_else(|| UNKNOWN.to_string()),
            version: prop_or_env("ro.build.version.release", "ANDROID_VERSION"),
            sdk: prop_or_env("ro.build.version.sdk", "ANDROID_SDK_VERSION"),
            build: prop_or_env("ro.build.id", "ANDROID_BUILD_ID"),
            fingerprint: getprop("ro.build.fingerprint").unwrap_or_else(|| UNKNOWN.to_string()),
            wifi,
            storage_total,
            storage_used,
        })
    }
}

/// Inputs to the Android CPU naming heuristic
#[derive(Debug, Default)]
pub struct CpuNameParts {
    pub platform: Option<String>,
    pub chipname: Option<String>,
    pub hardware: Option<String>,
    pub cpuinfo_model: Option<String>,
    pub manufacturer: Option<String>,
    pub revision: Option<String>,
}

impl CpuNameParts {
    /// Properties through `prop`, the rest from cpuinfo text (possibly empty)
    pub fn gather(cpuinfo: &str, base: Option<&CpuInfo>, prop: impl Fn(&str) -> Option<String>) -> Self {
        CpuNameParts {
            platform: prop("ro.board.platform"),
            chipname: prop("ro.chipname"),
            hardware: find_colon_value(cpuinfo, "Hardware").or_else(|| prop("ro.hardware")),
            cpuinfo_model: base.map(|cpu| cpu.model.clone()),
            manufacturer: prop("ro.product.manufacturer"),
            revision: find_colon_value(cpuinfo, "CPU revision"),
        }
    }
}

/// Board platform, chip name, hardware, then the cpuinfo model; a Snapdragon
/// platform name beats the chip name. Prefixed with the manufacturer unless
/// already present and suffixed with the CPU revision.
pub fn compose_android_cpu(parts: &CpuNameParts) -> Option<String> {
    let known = |value: &Option<String>| value.as_deref().filter(|v| !is_unknown(v)).map(str::to_string);

    let platform = known(&parts.platform);
    let chipname = known(&parts.chipname);

    let mut name = match (platform, chipname) {
        (Some(platform), _) if platform.to_lowercase().contains("snapdragon") => platform,
        (Some(_), Some(chip)) => chip,
        (Some(platform), None) => platform,
        (None, Some(chip)) => chip,
        (None, None) => known(&parts.hardware).or_else(|| known(&parts.cpuinfo_model))?,
    };

    if let Some(manufacturer) = known(&parts.manufacturer) {
        if !name.to_lowercase().contains(&manufacturer.to_lowercase()) {
            name = format!("{} {}", manufacturer, name);
        }
    }
    if let Some(revision) = known(&parts.revision) {
        name = format!("{} (rev {})", name, revision);
    }
    Some(name.trim().to_string())
}

/// `Physical size: 1080x2400`, preferring an `Override size` line
pub fn parse_wm_size(output: &str) -> Option<String> {
    let size_for = |label: &str| {
        output
            .lines()
            .find_map(|line| line.trim().strip_prefix(label))
            .map(|size| size.trim().to_string())
            .filter(|size| size.contains('x'))
    };
    size_for("Override size:").or_else(|| size_for("Physical size:"))
}

/// Current network from `dumpsys wifi`
pub fn parse_dumpsys_ssid(output: &str) -> Option<String> {
    let line = output.lines().find(|line| line.contains("SSID: "))?;
    let (_, rest) = line.split_once("SSID: ")?;
    let ssid = rest.split(',').next()?.trim().trim_matches('"');
    (!ssid.is_empty() && ssid != "<unknown ssid>").then(|| ssid.to_string())
}

/// Size and used columns of `df -h <mount>`
pub fn parse_df_human(output: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = output
        .lines()
        .skip(1)
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|parts| parts.len() >= 5)?;
    Some((parts[1].to_string(), parts[2].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn snapdragon_platform_wins() {
        let parts = CpuNameParts {
            platform: some("Snapdragon 865"),
            chipname: some("SM8250"),
            manufacturer: some("Xiaomi"),
            ..CpuNameParts::default()
        };
        assert_eq!(compose_android_cpu(&parts).as_deref(), Some("Xiaomi Snapdragon 865"));
    }

    #[test]
    fn chipname_beats_codename_platform() {
        let parts = CpuNameParts {
            platform: some("kona"),
            chipname: some("SM8250"),
            manufacturer: some("Qualcomm"),
            revision: some("0xd"),
            ..CpuNameParts::default()
        };
        assert_eq!(compose_android_cpu(&parts).as_deref(), Some("Qualcomm SM8250 (rev 0xd)"));
    }

    #[test]
    fn hardware_then_cpuinfo_model() {
        let parts = CpuNameParts {
            hardware: some("Exynos 9820"),
            cpuinfo_model: some("AArch64 Processor rev 0"),
            manufacturer: some("samsung"),
            ..CpuNameParts::default()
        };
        assert_eq!(compose_android_cpu(&parts).as_deref(), Some("samsung Exynos 9820"));

        let only_model = CpuNameParts {
            cpuinfo_model: some("AArch64 Processor rev 0"),
            ..CpuNameParts::default()
        };
        assert_eq!(compose_android_cpu(&only_model).as_deref(), Some("AArch64 Processor rev 0"));
        assert_eq!(compose_android_cpu(&CpuNameParts::default()), None);
    }

    #[test]
    fn named_from_properties_without_cpuinfo() {
        let props = |key: &str| match key {
            "ro.board.platform" => some("Snapdragon 865"),
            "ro.product.manufacturer" => some("Xiaomi"),
            _ => None,
        };
        let parts = CpuNameParts::gather("", linux::parse_cpuinfo("").ok().as_ref(), props);
        assert_eq!(parts.cpuinfo_model, None);
        assert_eq!(parts.revision, None);
        assert_eq!(compose_android_cpu(&parts).as_deref(), Some("Xiaomi Snapdragon 865"));
    }

    #[test]
    fn manufacturer_not_repeated() {
        let parts = CpuNameParts {
            chipname: some("Google Tensor G2"),
            manufacturer: some("Google"),
            ..CpuNameParts::default()
        };
        assert_eq!(compose_android_cpu(&parts).as_deref(), Some("Google Tensor G2"));
    }

    #[test]
    fn wm_size_prefers_override() {
        assert_eq!(parse_wm_size("Physical size: 1080x2400\n").as_deref(), Some("1080x2400"));
        assert_eq!(
            parse_wm_size("Physical size: 1440x3200\nOverride size: 1080x2400\n").as_deref(),
            Some("1080x2400")
        );
        assert_eq!(parse_wm_size("Error: no display\n"), None);
    }

    #[test]
    fn dumpsys_ssid() {
        let output = "Wi-Fi is enabled\nmWifiInfo SSID: \"HomeNet\", BSSID: aa:bb:cc:dd:ee:ff, Supplicant state: COMPLETED\n";
        assert_eq!(parse_dumpsys_ssid(output).as_deref(), Some("HomeNet"));
        assert_eq!(parse_dumpsys_ssid("mWifiInfo SSID: <unknown ssid>, BSSID: <none>\n"), None);
    }

    #[test]
    fn df_human_columns() {
        let output = "Filesystem                          Size  Used Avail Use% Mounted on\n/dev/fuse                           110G   43G   67G  40% /storage/emulated\n";
        assert_eq!(parse_df_human(output), Some(("110G".to_string(), "43G".to_string())));
    }
}
