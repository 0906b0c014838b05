//! Battery sensors (sysfs power_supply, pmset/ioreg, wmic)

use crate::data::{BatteryEntry, BatteryStatus};
use crate::error::{FetchError, Result};
use crate::utils::{command::*, file::*, parsing::parse_wmic_records};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static PMSET_PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)%").expect("valid regex"));
static PMSET_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(discharging|charging|charged|finishing charge|AC attached)").expect("valid regex")
});
static PMSET_TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+):(\d{2})").expect("valid regex"));
static IOREG_TEMPERATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""Temperature"\s*=\s*(\d+)"#).expect("valid regex"));
static IOREG_VOLTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""Voltage"\s*=\s*(\d+)"#).expect("valid regex"));

/// All `BAT*` supplies under a power_supply directory, in name order
pub fn linux_batteries(root: &Path) -> Result<Vec<BatteryEntry>> {
    let mut names: Vec<String> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("BAT"))
        .collect();
    names.sort();

    let batteries: Vec<BatteryEntry> = names
        .iter()
        .filter_map(|name| read_battery_dir(&root.join(name), name))
        .collect();

    if batteries.is_empty() {
        return Err(FetchError::detection("no battery found"));
    }
    Ok(batteries)
}

/// Android exposes a single supply named `battery`
pub fn android_batteries(root: &Path) -> Result<Vec<BatteryEntry>> {
    match read_battery_dir(&root.join("battery"), "BAT0") {
        Some(battery) => Ok(vec![battery]),
        None => {
            debug!("no android battery node, scanning BAT* supplies");
            linux_batteries(root)
        }
    }
}

fn read_battery_dir(dir: &Path, name: &str) -> Option<BatteryEntry> {
    let capacity = read_sys_value(dir.join("capacity")).ok()?;
    let status = read_sys_value(dir.join("status"))
        .map(|s| BatteryStatus::parse(&s))
        .unwrap_or(BatteryStatus::Unknown);

    let attr = |file: &str| read_sys_i64(dir.join(file));

    let mut battery = BatteryEntry::new(name, format!("{}%", capacity), status);
    battery.voltage = attr("voltage_now").map(|uv| format!("{:.2}V", uv as f64 / 1_000_000.0));
    battery.temperature = attr("temp").map(|tenths| format!("{:.1}°C", tenths as f64 / 10.0));
    battery.current = attr("current_now").map(|ua| format!("{}mA", ua / 1000));
    battery.power = attr("power_now").map(|uw| format!("{:.2}W", uw as f64 / 1_000_000.0));

    if status == BatteryStatus::Discharging {
        // energy/power (µWh, µW) or charge/current (µAh, µA)
        let hours = match (attr("energy_now"), attr("power_now")) {
            (Some(energy), Some(power)) if power > 0 => Some(energy as f64 / power as f64),
            _ => match (attr("charge_now"), attr("current_now")) {
                (Some(charge), Some(current)) if current != 0 => Some(charge as f64 / current.abs() as f64),
                _ => None,
            },
        };
        battery.time_remaining = hours.map(format_hours);
    }

    Some(battery)
}

fn format_hours(hours: f64) -> String {
    let whole = hours.floor();
    let minutes = ((hours - whole) * 60.0).floor();
    format!("{}h {}m", whole as u64, minutes as u64)
}

pub fn macos_batteries() -> Result<Vec<BatteryEntry>> {
    let pmset = run_command("pmset", &["-g", "batt"])?;
    let ioreg = run_command("ioreg", &["-rn", "AppleSmartBattery"]).ok();
    parse_pmset(&pmset, ioreg.as_deref())
        .map(|battery| vec![battery])
        .ok_or_else(|| FetchError::detection("no battery in pmset output"))
}

/// Battery line of `pmset -g batt`, enriched with `ioreg` readings
pub fn parse_pmset(pmset: &str, ioreg: Option<&str>) -> Option<BatteryEntry> {
    let line = pmset.lines().find(|line| line.contains("InternalBattery"))?;

    let capacity = PMSET_PERCENT.captures(line)?;
    let status = PMSET_STATUS
        .captures(line)
        .map(|caps| BatteryStatus::parse(&caps[1]))
        .unwrap_or(BatteryStatus::Unknown);

    let mut battery = BatteryEntry::new("BAT0", format!("{}%", &capacity[1]), status);
    battery.time_remaining = PMSET_TIME
        .captures(line)
        .map(|caps| format!("{}h {}m", &caps[1], caps[2].trim_start_matches('0').parse::<u32>().unwrap_or(0)));

    if let Some(ioreg) = ioreg {
        battery.temperature = IOREG_TEMPERATURE
            .captures(ioreg)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .map(|centi| format!("{:.1}°C", centi / 100.0));
        battery.voltage = IOREG_VOLTAGE
            .captures(ioreg)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .map(|mv| format!("{:.2}V", mv / 1000.0));
    }

    Some(battery)
}

pub fn windows_batteries() -> Result<Vec<BatteryEntry>> {
    let output = run_command(
        "wmic",
        &[
            "path",
            "Win32_Battery",
            "get",
            "BatteryStatus,EstimatedChargeRemaining,EstimatedRunTime,DesignVoltage",
            "/value",
        ],
    )?;

    let batteries = parse_wmic_batteries(&output);
    if batteries.is_empty() {
        return Err(FetchError::detection("no Win32_Battery instance"));
    }
    Ok(batteries)
}

pub fn parse_wmic_batteries(output: &str) -> Vec<BatteryEntry> {
    parse_wmic_records(output)
        .into_iter()
        .filter_map(|record| {
            let capacity = record.get("EstimatedChargeRemaining").filter(|v| !v.is_empty())?;
            let status = match record.get("BatteryStatus").and_then(|v| v.parse::<u32>().ok()) {
                Some(1) | Some(4) | Some(5) => BatteryStatus::Discharging,
                Some(3) => BatteryStatus::Full,
                Some(6..=9) => BatteryStatus::Charging,
                Some(2) | Some(11) => BatteryStatus::NotCharging,
                _ => BatteryStatus::Unknown,
            };
            Some((capacity.clone(), status, record))
        })
        .enumerate()
        .map(|(index, (capacity, status, record))| {
            let mut battery = BatteryEntry::new(format!("BAT{}", index), format!("{}%", capacity), status);
            // Windows reports 71582788 minutes while on AC power
            battery.time_remaining = record
                .get("EstimatedRunTime")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|minutes| *minutes < 14_400)
                .map(|minutes| format!("{}h {}m", minutes / 60, minutes % 60));
            battery.voltage = record
                .get("DesignVoltage")
                .and_then(|v| v.parse::<f64>().ok())
                .map(|mv| format!("{:.2}V", mv / 1000.0));
            battery
        })
        .collect()
}
