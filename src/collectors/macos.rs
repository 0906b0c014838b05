//! macOS probes (sw_vers, sysctl, vm_stat, system_profiler, ifconfig)

use super::{desktop, packages, sensors, PlatformProbe};
use crate::data::{BatteryEntry, Capacity, CpuInfo, DisplayEntry, NetworkInterface, OsInfo, ThemeInfo, UNKNOWN};
use crate::error::{FetchError, Result};
use crate::utils::{command::*, file::*, parsing::*};
use regex::Regex;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

static PROFILER_RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) x (\d+)").expect("valid regex"));
static PROFILER_REFRESH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@ ?(\d+(?:\.\d+)?) ?Hz").expect("valid regex"));
static BOOTTIME_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sec = (\d+)").expect("valid regex"));

pub struct MacProbe;

fn sysctl(key: &str) -> Result<String> {
    run_command_nonempty("sysctl", &["-n", key])
}

impl MacProbe {
    fn system_profiler_displays(&self) -> Result<String> {
        run_command_nonempty("system_profiler", &["SPDisplaysDataType"])
    }
}

impl PlatformProbe for MacProbe {
    fn name(&self) -> &'static str {
        "macOS"
    }

    fn hostname(&self) -> Result<String> {
        run_command_nonempty("scutil", &["--get", "ComputerName"]).or_else(|_| super::common::hostname())
    }

    fn os(&self) -> Result<OsInfo> {
        let (distro, release) = run_command("sw_vers", &[])
            .map(|output| parse_sw_vers(&output))
            .unwrap_or((None, None));

        Ok(OsInfo {
            distro: distro.unwrap_or_else(|| "macOS".to_string()),
            release: release.unwrap_or_else(|| UNKNOWN.to_string()),
            kernel: run_command_nonempty("uname", &["-r"]).unwrap_or_else(|_| UNKNOWN.to_string()),
            id: None,
        })
    }

    fn cpu(&self) -> Result<CpuInfo> {
        let model = sysctl("machdep.cpu.brand_string")?;
        let cores = sysctl("hw.ncpu").ok().and_then(|n| n.parse().ok());
        // Apple silicon does not report hw.cpufrequency
        let speed = sysctl("hw.cpufrequency")
            .ok()
            .and_then(|hz| hz.parse::<f64>().ok())
            .map(|hz| format!("{:.2} GHz", hz / 1_000_000_000.0));

        Ok(CpuInfo { model, cores, speed })
    }

    fn gpu(&self) -> Result<String> {
        let output = self.system_profiler_displays()?;
        parse_chipset_models(&output).ok_or_else(|| FetchError::detection("no Chipset Model"))
    }

    fn memory(&self) -> Result<Capacity> {
        let total_bytes: u64 = sysctl("hw.memsize")?
            .parse()
            .map_err(|_| FetchError::parse("hw.memsize is not a number"))?;
        let vm_stat = run_command("vm_stat", &[])?;
        let available_bytes = parse_vm_stat_available(&vm_stat)
            .ok_or_else(|| FetchError::parse("unexpected vm_stat output"))?;

        Ok(Capacity { total_bytes, available_bytes })
    }

    fn disk(&self) -> Result<Capacity> {
        // The writable data volume holds user files on APFS
        ["/System/Volumes/Data", "/"]
            .iter()
            .find_map(|path| match filesystem_usage(path) {
                Ok((total_bytes, available_bytes)) if total_bytes > 0 => {
                    Some(Capacity { total_bytes, available_bytes })
                }
                Ok(_) => None,
                Err(err) => {
                    debug!(path, error = %err, "statvfs failed");
                    None
                }
            })
            .ok_or_else(|| FetchError::detection("no mounted volume"))
    }

    fn uptime(&self) -> Result<u64> {
        let boot = parse_boottime(&sysctl("kern.boottime")?)
            .ok_or_else(|| FetchError::parse("unexpected kern.boottime output"))?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| FetchError::detection(err.to_string()))?
            .as_secs();
        Ok(now.saturating_sub(boot))
    }

    fn batteries(&self) -> Result<Vec<BatteryEntry>> {
        sensors::macos_batteries()
    }

    fn packages(&self) -> Result<String> {
        packages::macos_packages()
    }

    fn displays(&self) -> Result<Vec<DisplayEntry>> {
        let output = self.system_profiler_displays()?;
        let displays = parse_profiler_displays(&output);
        if displays.is_empty() {
            return Err(FetchError::detection("no display in system_profiler output"));
        }
        Ok(displays)
    }

    fn theme(&self) -> Result<ThemeInfo> {
        desktop::macos_theme()
    }

    fn network(&self) -> Result<Vec<NetworkInterface>> {
        let output = run_command("ifconfig", &[])?;
        Ok(parse_ifconfig(&output))
    }

    fn swap(&self) -> Result<Capacity> {
        parse_swapusage(&sysctl("vm.swapusage")?).ok_or_else(|| FetchError::parse("unexpected vm.swapusage output"))
    }
}

/// `ProductName:` and `ProductVersion:` from `sw_vers`
pub fn parse_sw_vers(output: &str) -> (Option<String>, Option<String>) {
    (
        find_colon_value(output, "ProductName"),
        find_colon_value(output, "ProductVersion"),
    )
}

/// Free, inactive and speculative pages times the page size
pub fn parse_vm_stat_available(output: &str) -> Option<u64> {
    let page_size: u64 = output
        .lines()
        .next()?
        .split("page size of ")
        .nth(1)?
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;

    let pages = |key: &str| -> u64 {
        find_colon_value(output, key)
            .and_then(|value| value.trim_end_matches('.').parse().ok())
            .unwrap_or(0)
    };

    Some((pages("Pages free") + pages("Pages inactive") + pages("Pages speculative")) * page_size)
}

/// `{ sec = 1700000000, usec = 123 } Tue Nov 14 ...`
pub fn parse_boottime(output: &str) -> Option<u64> {
    BOOTTIME_SECONDS.captures(output)?[1].parse().ok()
}

/// `total = 2048.00M  used = 512.00M  free = 1536.00M  (encrypted)`
pub fn parse_swapusage(output: &str) -> Option<Capacity> {
    let field = |key: &str| -> Option<u64> {
        let rest = output.split(&format!("{} = ", key)).nth(1)?;
        size_to_bytes(rest.split_whitespace().next()?)
    };

    Some(Capacity {
        total_bytes: field("total")?,
        available_bytes: field("free")?,
    })
}

/// GPU names from `Chipset Model:` lines, deduplicated
pub fn parse_chipset_models(output: &str) -> Option<String> {
    let mut models: Vec<String> = Vec::new();
    for line in output.lines() {
        if let Some(model) = line.trim().strip_prefix("Chipset Model:") {
            let model = model.trim().to_string();
            if !model.is_empty() && !models.contains(&model) {
                models.push(model);
            }
        }
    }
    (!models.is_empty()).then(|| models.join(", "))
}

/// One entry per `Resolution:` line, named after the enclosing display section
pub fn parse_profiler_displays(output: &str) -> Vec<DisplayEntry> {
    let mut displays: Vec<DisplayEntry> = Vec::new();
    let mut section = String::new();

    for line in output.lines() {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_suffix(':') {
            if !header.contains(": ") {
                section = header.to_string();
            }
            continue;
        }

        if let Some(value) = trimmed.strip_prefix("Resolution:") {
            let Some(caps) = PROFILER_RESOLUTION.captures(value) else {
                continue;
            };
            displays.push(DisplayEntry {
                name: section.clone(),
                resolution: format!("{}x{}", &caps[1], &caps[2]),
                refresh: refresh_rate(value),
                size: None,
            });
        } else if trimmed.starts_with("UI Looks like:") {
            if let Some(display) = displays.last_mut().filter(|display| display.refresh.is_none()) {
                display.refresh = refresh_rate(trimmed);
            }
        }
    }

    displays
}

fn refresh_rate(text: &str) -> Option<String> {
    let hz: f64 = PROFILER_REFRESH.captures(text)?[1].parse().ok()?;
    Some(format!("{} Hz", hz.round()))
}

/// IPv4 addresses per interface from `ifconfig`, loopback excluded
pub fn parse_ifconfig(output: &str) -> Vec<NetworkInterface> {
    let mut interfaces = Vec::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        if !line.starts_with(char::is_whitespace) {
            current = line.split_once(':').map(|(name, _)| name.to_string());
            continue;
        }
        let mut fields = line.split_whitespace();
        if fields.next() != Some("inet") {
            continue;
        }
        let (Some(name), Some(ip)) = (current.as_deref(), fields.next()) else {
            continue;
        };
        if name.starts_with("lo") || ip.starts_with("127.") {
            continue;
        }
        interfaces.push(NetworkInterface {
            name: name.to_string(),
            ip: ip.to_string(),
        });
    }

    interfaces
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROFILER: &str = "Graphics/Displays:

    Apple M1 Pro:

      Chipset Model: Apple M1 Pro
      Type: GPU
      Bus: Built-In
      Total Number of Cores: 16
      Displays:
        Color LCD:
          Display Type: Built-in Liquid Retina XDR Display
          Resolution: 3024 x 1964 Retina
          Main Display: Yes
        LG HDR 4K:
          Resolution: 3840 x 2160 (2160p/4K UHD 1 - Ultra High Definition)
          UI Looks like: 1920 x 1080 @ 60.00Hz
";

    #[test]
    fn sw_vers_fields() {
        let output = "ProductName:\t\tmacOS\nProductVersion:\t\t14.2.1\nBuildVersion:\t\t23C71\n";
        assert_eq!(parse_sw_vers(output), (Some("macOS".into()), Some("14.2.1".into())));
    }

    #[test]
    fn vm_stat_available_pages() {
        let output = "Mach Virtual Memory Statistics: (page size of 16384 bytes)\n\
                      Pages free:                               10000.\n\
                      Pages active:                            200000.\n\
                      Pages inactive:                           30000.\n\
                      Pages speculative:                         2000.\n";
        assert_eq!(parse_vm_stat_available(output), Some(42_000 * 16_384));
    }

    #[test]
    fn boottime_and_swapusage() {
        assert_eq!(parse_boottime("{ sec = 1700000000, usec = 523172 } Tue Nov 14 22:13:20 2023"), Some(1_700_000_000));
        let swap = parse_swapusage("total = 2048.00M  used = 512.00M  free = 1536.00M  (encrypted)").unwrap();
        assert_eq!(swap.total_bytes, 2048 * 1024 * 1024);
        assert_eq!(swap.used_bytes(), 512 * 1024 * 1024);
    }

    #[test]
    fn system_profiler_gpu_and_displays() {
        assert_eq!(parse_chipset_models(PROFILER).as_deref(), Some("Apple M1 Pro"));

        let displays = parse_profiler_displays(PROFILER);
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].name, "Color LCD");
        assert_eq!(displays[0].resolution, "3024x1964");
        assert_eq!(displays[0].refresh, None);
        assert_eq!(displays[1].name, "LG HDR 4K");
        assert_eq!(displays[1].refresh.as_deref(), Some("60 Hz"));
    }

    #[test]
    fn ifconfig_interfaces() {
        let output = "lo0: flags=8049<UP,LOOPBACK,RUNNING,MULTICAST> mtu 16384\n\
\tinet 127.0.0.1 netmask 0xff000000\n\
en0: flags=8863<UP,BROADCAST,SMART,RUNNING,SIMPLEX,MULTICAST> mtu 1500\n\
\tether 3c:22:fb:00:00:00\n\
\tinet6 fe80::1%en0 prefixlen 64 secured scopeid 0xe\n\
\tinet 192.168.0.42 netmask 0xffffff00 broadcast 192.168.0.255\n";
        assert_eq!(
            parse_ifconfig(output),
            vec![NetworkInterface { name: "en0".into(), ip: "192.168.0.42".into() }]
        );
    }
}
