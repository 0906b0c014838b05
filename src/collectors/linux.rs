//! Linux probes (OS, CPU, memory, disk, uptime, displays, network)

use super::{desktop, gpu, packages, sensors, PlatformProbe};
use crate::data::{BatteryEntry, Capacity, CpuInfo, DisplayEntry, NetworkInterface, OsInfo, ThemeInfo, UNKNOWN};
use crate::error::{FetchError, Result};
use crate::utils::{command::*, file::*, parsing::*};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

const POWER_SUPPLY: &str = "/sys/class/power_supply";

static XRANDR_GEOMETRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)x(\d+)\+\d+\+\d+").expect("valid regex"));
static XRANDR_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)mm x (\d+)mm").expect("valid regex"));

pub struct LinuxProbe {
    /// Filesystem prefix for package databases (Termux sets `$PREFIX`)
    prefix: String,
}

impl LinuxProbe {
    pub fn new() -> Self {
        LinuxProbe { prefix: String::new() }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        LinuxProbe { prefix: prefix.into() }
    }
}

impl Default for LinuxProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformProbe for LinuxProbe {
    fn name(&self) -> &'static str {
        "Linux"
    }

    fn hostname(&self) -> Result<String> {
        read_first_line("/proc/sys/kernel/hostname")
            .ok()
            .filter(|name| !name.is_empty())
            .map(Ok)
            .unwrap_or_else(super::common::hostname)
    }

    fn os(&self) -> Result<OsInfo> {
        let release = match read_file_safe("/etc/os-release") {
            Ok(text) => parse_os_release(&text),
            Err(err) => {
                debug!(error = %err, "/etc/os-release unreadable");
                OsRelease::default()
            }
        };

        Ok(OsInfo {
            distro: release.name.unwrap_or_else(|| UNKNOWN.to_string()),
            release: release.version.unwrap_or_else(|| UNKNOWN.to_string()),
            kernel: kernel_version().unwrap_or_else(|_| UNKNOWN.to_string()),
            id: release.id,
        })
    }

    fn cpu(&self) -> Result<CpuInfo> {
        let cpuinfo = read_file_safe("/proc/cpuinfo")?;
        let mut cpu = parse_cpuinfo(&cpuinfo)?;
        if cpu.speed.is_none() {
            cpu.speed = max_cpu_frequency();
        }
        Ok(cpu)
    }

    fn gpu(&self) -> Result<String> {
        gpu::linux_gpu()
    }

    fn memory(&self) -> Result<Capacity> {
        let meminfo = read_file_safe("/proc/meminfo")?;
        parse_meminfo(&meminfo)
    }

    fn disk(&self) -> Result<Capacity> {
        root_disk_usage("/")
    }

    fn uptime(&self) -> Result<u64> {
        let uptime = read_first_line("/proc/uptime")?;
        parse_proc_uptime(&uptime)
    }

    fn batteries(&self) -> Result<Vec<BatteryEntry>> {
        sensors::linux_batteries(Path::new(POWER_SUPPLY))
    }

    fn packages(&self) -> Result<String> {
        packages::linux_packages(&self.prefix)
    }

    fn displays(&self) -> Result<Vec<DisplayEntry>> {
        match run_command("xrandr", &["--current"]) {
            Ok(output) => {
                let displays = parse_xrandr(&output);
                if !displays.is_empty() {
                    return Ok(displays);
                }
            }
            Err(err) => debug!(error = %err, "xrandr unavailable, reading DRM connectors"),
        }

        let displays = drm_displays(Path::new("/sys/class/drm"));
        if displays.is_empty() {
            return Err(FetchError::detection("no connected display"));
        }
        Ok(displays)
    }

    fn theme(&self) -> Result<ThemeInfo> {
        desktop::linux_theme()
    }

    fn network(&self) -> Result<Vec<NetworkInterface>> {
        let output = run_command("ip", &["-o", "-4", "addr", "show"])?;
        Ok(parse_ip_addr(&output))
    }

    fn swap(&self) -> Result<Capacity> {
        let from_meminfo = read_file_safe("/proc/meminfo").ok().and_then(|meminfo| {
            Some(Capacity {
                total_bytes: meminfo_kb(&meminfo, "SwapTotal")? * 1024,
                available_bytes: meminfo_kb(&meminfo, "SwapFree")? * 1024,
            })
        });
        if let Some(swap) = from_meminfo {
            return Ok(swap);
        }

        let output = run_command("free", &["-b"])?;
        parse_free_swap(&output)
    }
}

/// Kernel release from /proc/version, falling back to `uname -r`
pub fn kernel_version() -> Result<String> {
    read_first_line("/proc/version")
        .ok()
        .and_then(|version| version.split_whitespace().nth(2).map(str::to_string))
        .map(Ok)
        .unwrap_or_else(|| run_command_nonempty("uname", &["-r"]))
}

/// Usage of the filesystem at `path`, falling back to `df`
pub fn root_disk_usage(path: &str) -> Result<Capacity> {
    match filesystem_usage(path) {
        Ok((total_bytes, available_bytes)) if total_bytes > 0 => {
            return Ok(Capacity { total_bytes, available_bytes });
        }
        Ok(_) => debug!(path, "statvfs reported an empty filesystem"),
        Err(err) => debug!(path, error = %err, "statvfs failed, trying df"),
    }

    let output = run_command("df", &["-k", path])?;
    parse_df_kb(&output)
}

/// The os-release fields the report uses
#[derive(Debug, Default, PartialEq)]
pub struct OsRelease {
    pub name: Option<String>,
    pub version: Option<String>,
    pub id: Option<String>,
}

/// Distro name, version and id from os-release
pub fn parse_os_release(text: &str) -> OsRelease {
    let field = |key: &str| {
        text.lines()
            .find_map(|line| line.strip_prefix(key)?.strip_prefix('='))
            .map(|value| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    };

    let id = field("ID").map(|id| id.to_lowercase());
    OsRelease {
        name: field("NAME").or_else(|| field("PRETTY_NAME")).or_else(|| id.clone()),
        version: field("VERSION_ID").or_else(|| field("BUILD_ID")),
        id,
    }
}

pub fn parse_cpuinfo(cpuinfo: &str) -> Result<CpuInfo> {
    let model = ["model name", "Hardware", "Processor", "cpu model", "cpu"]
        .iter()
        .find_map(|key| find_colon_value(cpuinfo, key))
        .ok_or_else(|| FetchError::detection("CPU model not found"))?;

    let cores = cpuinfo
        .lines()
        .filter(|line| line.split(':').next().is_some_and(|key| key.trim() == "processor"))
        .count();

    let speed = find_colon_value(cpuinfo, "cpu MHz")
        .and_then(|mhz| mhz.parse::<f64>().ok())
        .map(|mhz| format!("{:.2} GHz", mhz / 1000.0));

    Ok(CpuInfo {
        model,
        cores: (cores > 0).then_some(cores),
        speed,
    })
}

fn max_cpu_frequency() -> Option<String> {
    let khz = read_sys_i64("/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq")?;
    Some(format!("{:.2} GHz", khz as f64 / 1_000_000.0))
}

pub fn parse_meminfo(meminfo: &str) -> Result<Capacity> {
    let total = meminfo_kb(meminfo, "MemTotal")
        .ok_or_else(|| FetchError::detection("MemTotal missing"))?;

    // Older kernels lack MemAvailable
    let available = meminfo_kb(meminfo, "MemAvailable").unwrap_or_else(|| {
        ["MemFree", "Buffers", "Cached"]
            .iter()
            .filter_map(|key| meminfo_kb(meminfo, key))
            .sum()
    });

    Ok(Capacity {
        total_bytes: total * 1024,
        available_bytes: available * 1024,
    })
}

pub fn parse_proc_uptime(uptime: &str) -> Result<u64> {
    uptime
        .split_whitespace()
        .next()
        .and_then(|secs| secs.parse::<f64>().ok())
        .map(|secs| secs as u64)
        .ok_or_else(|| FetchError::parse(format!("unexpected /proc/uptime content: {}", uptime)))
}

/// Parse `df -k` output (1K blocks)
pub fn parse_df_kb(output: &str) -> Result<Capacity> {
    output
        .lines()
        .skip(1)
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|parts| parts.len() >= 4)
        .and_then(|parts| {
            Some(Capacity {
                total_bytes: parts[1].parse::<u64>().ok()? * 1024,
                available_bytes: parts[3].parse::<u64>().ok()? * 1024,
            })
        })
        .ok_or_else(|| FetchError::parse("unexpected df output"))
}

/// Swap line of `free -b`
pub fn parse_free_swap(output: &str) -> Result<Capacity> {
    output
        .lines()
        .find(|line| line.starts_with("Swap:"))
        .and_then(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            Some(Capacity {
                total_bytes: size_to_bytes(parts.get(1)?)?,
                available_bytes: size_to_bytes(parts.get(3)?)?,
            })
        })
        .ok_or_else(|| FetchError::parse("no Swap line in free output"))
}

/// Connected outputs from `xrandr --current`
pub fn parse_xrandr(output: &str) -> Vec<DisplayEntry> {
    let mut displays: Vec<DisplayEntry> = Vec::new();
    let mut in_active_output = false;

    for line in output.lines() {
        if !line.starts_with(char::is_whitespace) {
            in_active_output = false;
            let mut fields = line.split_whitespace();
            let (Some(name), Some("connected")) = (fields.next(), fields.next()) else {
                continue;
            };
            let Some(geometry) = XRANDR_GEOMETRY.captures(line) else {
                continue;
            };

            let size = XRANDR_SIZE.captures(line).and_then(|caps| {
                let width: f64 = caps[1].parse().ok()?;
                let height: f64 = caps[2].parse().ok()?;
                let inches = (width.powi(2) + height.powi(2)).sqrt() / 25.4;
                (inches > 0.0).then(|| format!("{:.0}\"", inches))
            });

            displays.push(DisplayEntry {
                name: name.to_string(),
                resolution: format!("{}x{}", &geometry[1], &geometry[2]),
                refresh: None,
                size,
            });
            in_active_output = true;
        } else if in_active_output {
            let Some(display) = displays.last_mut() else {
                continue;
            };
            if display.refresh.is_some() {
                continue;
            }
            display.refresh = line
                .split_whitespace()
                .find(|token| token.contains('*'))
                .and_then(|token| token.trim_end_matches(['*', '+']).parse::<f64>().ok())
                .map(|hz| format!("{} Hz", hz.round()));
        }
    }

    displays
}

/// Connected DRM connectors and their preferred mode
fn drm_displays(drm_root: &Path) -> Vec<DisplayEntry> {
    let Ok(entries) = fs::read_dir(drm_root) else {
        return Vec::new();
    };

    let mut connectors: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("card") && n.contains('-'))
        })
        .collect();
    connectors.sort();

    connectors
        .iter()
        .filter(|path| read_sys_value(path.join("status")).is_ok_and(|s| s == "connected"))
        .filter_map(|path| {
            let mode = read_file_safe(path.join("modes")).ok()?.lines().next()?.trim().to_string();
            let connector = path.file_name()?.to_str()?;
            let name = connector.split_once('-').map_or(connector, |(_, rest)| rest);
            Some(DisplayEntry {
                name: name.to_string(),
                resolution: mode,
                refresh: None,
                size: None,
            })
        })
        .collect()
}

/// IPv4 interfaces from `ip -o -4 addr show`, loopback excluded
pub fn parse_ip_addr(output: &str) -> Vec<NetworkInterface> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let inet = parts.iter().position(|part| *part == "inet")?;
            let name = parts.get(1)?.trim_end_matches(':');
            let ip = parts.get(inet + 1)?.split('/').next()?;
            (name != "lo").then(|| NetworkInterface {
                name: name.to_string(),
                ip: ip.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn os_release_prefers_name_and_version_id() {
        let text = "PRETTY_NAME=\"Ubuntu 22.04.3 LTS\"\nNAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nID=ubuntu\nID_LIKE=debian\n";
        assert_eq!(
            parse_os_release(text),
            OsRelease { name: Some("Ubuntu".into()), version: Some("22.04".into()), id: Some("ubuntu".into()) }
        );

        let arch = "NAME=\"Arch Linux\"\nPRETTY_NAME=\"Arch Linux\"\nID=arch\nBUILD_ID=rolling\n";
        assert_eq!(
            parse_os_release(arch),
            OsRelease { name: Some("Arch Linux".into()), version: Some("rolling".into()), id: Some("arch".into()) }
        );
    }

    #[test]
    fn os_release_id_fills_missing_name() {
        let release = parse_os_release("ID=\"Alpine\"\nVERSION_ID=3.19.1\n");
        assert_eq!(release.name.as_deref(), Some("alpine"));
        assert_eq!(release.id.as_deref(), Some("alpine"));
        assert_eq!(parse_os_release(""), OsRelease::default());
    }

    #[test]
    fn cpuinfo_counts_processors() {
        let cpuinfo = "processor\t: 0\nmodel name\t: Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz\ncpu MHz\t\t: 1992.000\n\n\
                       processor\t: 1\nmodel name\t: Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz\ncpu MHz\t\t: 2100.000\n";
        let cpu = parse_cpuinfo(cpuinfo).unwrap();
        assert_eq!(cpu.model, "Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz");
        assert_eq!(cpu.cores, Some(2));
        assert_eq!(cpu.speed.as_deref(), Some("1.99 GHz"));
    }

    #[test]
    fn cpuinfo_without_model_is_an_error() {
        assert!(parse_cpuinfo("processor\t: 0\n").is_err());
    }

    #[test]
    fn meminfo_falls_back_without_mem_available() {
        let meminfo = "MemTotal: 1000 kB\nMemFree: 100 kB\nBuffers: 50 kB\nCached: 250 kB\n";
        let mem = parse_meminfo(meminfo).unwrap();
        assert_eq!(mem.total_bytes, 1000 * 1024);
        assert_eq!(mem.available_bytes, 400 * 1024);
    }

    #[test]
    fn df_and_free_output() {
        let df = "Filesystem     1K-blocks     Used Available Use% Mounted on\n/dev/nvme0n1p2 100000000 40000000  60000000  40% /\n";
        let disk = parse_df_kb(df).unwrap();
        assert_eq!(disk.total_bytes, 100_000_000 * 1024);
        assert_eq!(disk.used_bytes(), 40_000_000 * 1024);

        let free = "               total        used        free\nMem:     16000000000  8000000000  8000000000\nSwap:     2147483648   536870912  1610612736\n";
        let swap = parse_free_swap(free).unwrap();
        assert_eq!(swap.total_bytes, 2_147_483_648);
        assert_eq!(swap.available_bytes, 1_610_612_736);
    }

    #[test]
    fn xrandr_connected_outputs() {
        let output = [
            "Screen 0: minimum 8 x 8, current 3840 x 1080, maximum 32767 x 32767",
            "HDMI-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 527mm x 296mm",
            "   1920x1080     60.00*+  50.00    59.94",
            "   1280x720      60.00    50.00",
            "DP-1 disconnected (normal left inverted right x axis y axis)",
            "DP-2 connected 1920x1080+1920+0 (normal left inverted right x axis y axis) 0mm x 0mm",
            "   1920x1080     59.94 +  143.98*",
        ]
        .join("\n");
        let displays = parse_xrandr(&output);
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].name, "HDMI-1");
        assert_eq!(displays[0].resolution, "1920x1080");
        assert_eq!(displays[0].refresh.as_deref(), Some("60 Hz"));
        assert_eq!(displays[0].size.as_deref(), Some("24\""));
        assert_eq!(displays[1].refresh.as_deref(), Some("144 Hz"));
        assert_eq!(displays[1].size, None);
    }

    #[test]
    fn ip_addr_skips_loopback() {
        let output = "1: lo    inet 127.0.0.1/8 scope host lo\\       valid_lft forever preferred_lft forever\n\
2: wlan0    inet 192.168.1.23/24 brd 192.168.1.255 scope global dynamic wlan0\\       valid_lft 85000sec\n";
        assert_eq!(
            parse_ip_addr(output),
            vec![NetworkInterface { name: "wlan0".into(), ip: "192.168.1.23".into() }]
        );
    }

    #[test]
    fn uptime_parses_first_field() {
        assert_eq!(parse_proc_uptime("3661.52 12000.00").unwrap(), 3661);
        assert!(parse_proc_uptime("").is_err());
    }
}
