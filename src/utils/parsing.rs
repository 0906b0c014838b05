//! String parsing and formatting utilities

use std::collections::HashMap;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Extract value after the first colon
pub fn extract_after_colon(line: &str) -> Option<String> {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Find `key: value` in colon-separated text such as /proc/cpuinfo
pub fn find_colon_value(text: &str, key: &str) -> Option<String> {
    text.lines()
        .find(|line| {
            line.split_once(':')
                .is_some_and(|(name, _)| name.trim() == key)
        })
        .and_then(extract_after_colon)
}

/// Parse `Key=Value` lines, as printed by `wmic ... /value`
pub fn parse_key_values(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .collect()
}

/// Split `wmic ... /value` output into one map per instance.
/// Instances are separated by blank lines.
pub fn parse_wmic_records(text: &str) -> Vec<HashMap<String, String>> {
    let mut records = Vec::new();
    let mut current = HashMap::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            current.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    if !current.is_empty() {
        records.push(current);
    }
    records
}

/// Read a value in kB from /proc/meminfo-style text
pub fn meminfo_kb(meminfo: &str, key: &str) -> Option<u64> {
    meminfo
        .lines()
        .find(|line| line.split(':').next() == Some(key))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|value| value.parse().ok())
}

/// Format uptime from seconds as `{d}d {h}h {m}m`, leading zero units omitted
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// `part / whole` as a percentage with one decimal, e.g. `50.0%`
pub fn format_percentage(part: u64, whole: u64) -> Option<String> {
    if whole == 0 {
        return None;
    }
    let percent = (part as f64 / whole as f64 * 100.0).min(100.0);
    Some(format!("{:.1}%", percent))
}

/// Bytes to a `12.34 GB` string (binary gigabytes)
pub fn format_gb(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / GIB)
}

/// Convert sizes like `2.0Gi`, `512M` or `1024` to bytes
pub fn size_to_bytes(value: &str) -> Option<u64> {
    let value = value.trim().trim_end_matches('B').trim_end_matches('i');
    let (number, multiplier) = match value.chars().last()? {
        'K' | 'k' => (&value[..value.len() - 1], 1024f64),
        'M' => (&value[..value.len() - 1], 1024f64.powi(2)),
        'G' => (&value[..value.len() - 1], 1024f64.powi(3)),
        'T' => (&value[..value.len() - 1], 1024f64.powi(4)),
        _ => (value, 1.0),
    };
    let number: f64 = number.trim().parse().ok()?;
    Some((number * multiplier) as u64)
}

/// First `\d+.\d+.\d+` version in command output
pub fn extract_version(text: &str) -> Option<String> {
    let re = regex::Regex::new(r"\d+\.\d+\.\d+").ok()?;
    re.find(text).map(|m| m.as_str().to_string())
}

pub fn capitalize_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip one pair of surrounding single quotes, as gsettings prints strings
pub fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_omits_leading_zero_units() {
        assert_eq!(format_uptime(0), "0m");
        assert_eq!(format_uptime(45 * 60), "45m");
        assert_eq!(format_uptime(3661), "1h 1m");
        assert_eq!(format_uptime(90_000), "1d 1h 0m");
        assert_eq!(format_uptime(86_400 + 5 * 60), "1d 0h 5m");
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        let gib = 1024 * 1024 * 1024;
        assert_eq!(format_percentage(8 * gib, 16 * gib).as_deref(), Some("50.0%"));
        assert_eq!(format_percentage(1, 3).as_deref(), Some("33.3%"));
        assert_eq!(format_percentage(5, 0), None);
    }

    #[test]
    fn sizes_with_suffixes() {
        assert_eq!(size_to_bytes("2.0Gi"), Some(2 * 1024 * 1024 * 1024));
        assert_eq!(size_to_bytes("512M"), Some(512 * 1024 * 1024));
        assert_eq!(size_to_bytes("0B"), Some(0));
        assert_eq!(size_to_bytes("n/a"), None);
    }

    #[test]
    fn key_values_skip_blank_entries() {
        let parsed = parse_key_values("\r\nCaption=Microsoft Windows 11 Pro\r\nVersion=10.0.22631\r\nEmpty=\r\n");
        assert_eq!(parsed.get("Caption").map(String::as_str), Some("Microsoft Windows 11 Pro"));
        assert_eq!(parsed.get("Version").map(String::as_str), Some("10.0.22631"));
        assert!(!parsed.contains_key("Empty"));
    }

    #[test]
    fn wmic_records_split_on_blank_lines() {
        let text = "\r\r\nName=NVIDIA GeForce RTX 3060\r\r\nCurrentRefreshRate=144\r\r\n\r\r\n\r\r\nName=Intel(R) UHD Graphics\r\r\nCurrentRefreshRate=\r\r\n";
        let records = parse_wmic_records(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Name"], "NVIDIA GeForce RTX 3060");
        assert_eq!(records[1]["CurrentRefreshRate"], "");
    }

    #[test]
    fn colon_values_match_whole_key() {
        let cpuinfo = "processor\t: 0\nmodel name\t: AMD Ryzen 7 5800X\ncpu MHz\t\t: 3800.000\n";
        assert_eq!(find_colon_value(cpuinfo, "model name").as_deref(), Some("AMD Ryzen 7 5800X"));
        assert_eq!(find_colon_value(cpuinfo, "model"), None);
    }

    #[test]
    fn meminfo_reads_kb_column() {
        let meminfo = "MemTotal:       16318480 kB\nMemAvailable:    8159240 kB\n";
        assert_eq!(meminfo_kb(meminfo, "MemTotal"), Some(16_318_480));
        assert_eq!(meminfo_kb(meminfo, "SwapTotal"), None);
    }

    #[test]
    fn misc_helpers() {
        assert_eq!(extract_version("GNU bash, version 5.2.21(1)-release").as_deref(), Some("5.2.21"));
        assert_eq!(capitalize_first_letter("hyprland"), "Hyprland");
        assert_eq!(strip_quotes("'Adwaita-dark'"), "Adwaita-dark");
    }
}
