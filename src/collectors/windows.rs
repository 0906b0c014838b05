//! Windows probes (wmic, reg, ipconfig)

use super::{desktop, packages, sensors, PlatformProbe};
use crate::data::{BatteryEntry, Capacity, CpuInfo, DisplayEntry, NetworkInterface, OsInfo, ThemeInfo, UNKNOWN};
use crate::error::{FetchError, Result};
use crate::utils::{command::*, parsing::*};
use std::collections::HashMap;

pub struct WindowsProbe;

/// `wmic <class...> get <fields> /value` as key/value pairs
fn wmic(class: &[&str], fields: &str) -> Result<HashMap<String, String>> {
    let mut args: Vec<&str> = class.to_vec();
    args.extend(["get", fields, "/value"]);
    let values = parse_key_values(&run_command("wmic", &args)?);
    if values.is_empty() {
        return Err(FetchError::parse(format!("wmic {} returned no values", class.join(" "))));
    }
    Ok(values)
}

fn wmic_u64(values: &HashMap<String, String>, key: &str) -> Result<u64> {
    values
        .get(key)
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| FetchError::parse(format!("wmic field {} missing", key)))
}

impl PlatformProbe for WindowsProbe {
    fn name(&self) -> &'static str {
        "Windows"
    }

    fn os(&self) -> Result<OsInfo> {
        let values = wmic(&["os"], "Caption,Version")?;
        let caption = values.get("Caption").cloned().unwrap_or_else(|| "Windows".to_string());
        let version = values.get("Version").cloned().unwrap_or_else(|| UNKNOWN.to_string());

        Ok(OsInfo {
            distro: caption.trim_start_matches("Microsoft ").to_string(),
            release: version.clone(),
            kernel: version,
            id: None,
        })
    }

    fn cpu(&self) -> Result<CpuInfo> {
        let values = wmic(&["cpu"], "Name,NumberOfLogicalProcessors,MaxClockSpeed")?;
        let model = values
            .get("Name")
            .cloned()
            .ok_or_else(|| FetchError::detection("no CPU name"))?;

        Ok(CpuInfo {
            model,
            cores: values.get("NumberOfLogicalProcessors").and_then(|n| n.parse().ok()),
            speed: values
                .get("MaxClockSpeed")
                .and_then(|mhz| mhz.parse::<f64>().ok())
                .map(|mhz| format!("{:.2} GHz", mhz / 1000.0)),
        })
    }

    fn gpu(&self) -> Result<String> {
        let output = run_command("wmic", &["path", "Win32_VideoController", "get", "Name", "/value"])?;
        let mut names: Vec<String> = Vec::new();
        for record in parse_wmic_records(&output) {
            if let Some(name) = record.get("Name").filter(|name| !name.is_empty()) {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        if names.is_empty() {
            return Err(FetchError::detection("no video controller"));
        }
        Ok(names.join(", "))
    }

    fn memory(&self) -> Result<Capacity> {
        let values = wmic(&["os"], "TotalVisibleMemorySize,FreePhysicalMemory")?;
        Ok(Capacity {
            total_bytes: wmic_u64(&values, "TotalVisibleMemorySize")? * 1024,
            available_bytes: wmic_u64(&values, "FreePhysicalMemory")? * 1024,
        })
    }

    fn disk(&self) -> Result<Capacity> {
        let values = wmic(&["logicaldisk", "where", "DeviceID='C:'"], "Size,FreeSpace")?;
        Ok(Capacity {
            total_bytes: wmic_u64(&values, "Size")?,
            available_bytes: wmic_u64(&values, "FreeSpace")?,
        })
    }

    fn uptime(&self) -> Result<u64> {
        let values = wmic(&["path", "Win32_PerfFormattedData_PerfOS_System"], "SystemUpTime")?;
        wmic_u64(&values, "SystemUpTime")
    }

    fn batteries(&self) -> Result<Vec<BatteryEntry>> {
        sensors::windows_batteries()
    }

    fn packages(&self) -> Result<String> {
        packages::windows_packages()
    }

    fn displays(&self) -> Result<Vec<DisplayEntry>> {
        let output = run_command(
            "wmic",
            &[
                "path",
                "Win32_VideoController",
                "get",
                "Name,CurrentHorizontalResolution,CurrentVerticalResolution,CurrentRefreshRate",
                "/value",
            ],
        )?;
        let displays = parse_video_controllers(&output);
        if displays.is_empty() {
            return Err(FetchError::detection("no active video controller"));
        }
        Ok(displays)
    }

    fn theme(&self) -> Result<ThemeInfo> {
        desktop::windows_theme()
    }

    fn network(&self) -> Result<Vec<NetworkInterface>> {
        let output = run_command("ipconfig", &[])?;
        Ok(parse_ipconfig(&output))
    }

    fn swap(&self) -> Result<Capacity> {
        let values = wmic(&["pagefile"], "AllocatedBaseSize,CurrentUsage")?;
        // Both values are in megabytes
        let total = wmic_u64(&values, "AllocatedBaseSize")? * 1024 * 1024;
        let used = wmic_u64(&values, "CurrentUsage")? * 1024 * 1024;
        Ok(Capacity {
            total_bytes: total,
            available_bytes: total.saturating_sub(used),
        })
    }
}

/// Video controllers that currently drive a display
pub fn parse_video_controllers(output: &str) -> Vec<DisplayEntry> {
    parse_wmic_records(output)
        .into_iter()
        .filter_map(|record| {
            let width = record.get("CurrentHorizontalResolution").filter(|v| !v.is_empty())?;
            let height = record.get("CurrentVerticalResolution").filter(|v| !v.is_empty())?;
            Some(DisplayEntry {
                name: record.get("Name").cloned().unwrap_or_default(),
                resolution: format!("{}x{}", width, height),
                refresh: record
                    .get("CurrentRefreshRate")
                    .filter(|hz| !hz.is_empty() && hz.as_str() != "0")
                    .map(|hz| format!("{} Hz", hz)),
                size: None,
            })
        })
        .collect()
}

/// IPv4 addresses per adapter section of `ipconfig`
pub fn parse_ipconfig(output: &str) -> Vec<NetworkInterface> {
    let mut interfaces = Vec::new();
    let mut adapter: Option<String> = None;

    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            adapter = trimmed
                .strip_suffix(':')
                .map(|header| header.split_once(" adapter ").map_or(header, |(_, name)| name).to_string());
            continue;
        }
        if trimmed.starts_with("IPv4 Address") {
            if let (Some(name), Some(ip)) = (adapter.as_ref(), trimmed.rsplit(':').next()) {
                interfaces.push(NetworkInterface {
                    name: name.clone(),
                    ip: ip.trim().trim_end_matches("(Preferred)").to_string(),
                });
            }
        }
    }

    interfaces
}
