//! GPU model detection for Linux and Android

use crate::error::{FetchError, Result};
use crate::utils::{command::*, file::*};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static GPUINFO_MALI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Mali-(\w+)").expect("valid regex"));
static GPUINFO_ADRENO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Adreno\s*(\d+)").expect("valid regex"));
static GPUINFO_POWERVR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"PowerVR\s*(\w+)").expect("valid regex"));

const MOBILE_VENDORS: [&str; 3] = ["Adreno", "Mali", "PowerVR"];

/// Renderer from `glxinfo`, then `lspci`, then the DRM vendor id
pub fn linux_gpu() -> Result<String> {
    match run_command("glxinfo", &["-B"]) {
        Ok(output) => {
            if let Some(renderer) = parse_glx_renderer(&output) {
                return Ok(renderer);
            }
        }
        Err(err) => debug!(error = %err, "glxinfo unavailable"),
    }

    match run_command("lspci", &[]) {
        Ok(output) => {
            if let Some(gpu) = parse_lspci(&output) {
                return Ok(gpu);
            }
        }
        Err(err) => debug!(error = %err, "lspci unavailable"),
    }

    drm_vendor_gpu(Path::new("/sys/class/drm"))
        .ok_or_else(|| FetchError::detection("no GPU found"))
}

/// `OpenGL renderer string: AMD Radeon RX 6700 XT (radeonsi, navi22, ...)`
pub fn parse_glx_renderer(output: &str) -> Option<String> {
    let renderer = output
        .lines()
        .find_map(|line| line.trim().strip_prefix("OpenGL renderer string:"))?
        .trim();
    let model = renderer.split(" (").next().unwrap_or(renderer).trim();
    (!model.is_empty() && model != "llvmpipe").then(|| model.to_string())
}

/// First display controller listed by `lspci`
pub fn parse_lspci(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| {
            line.contains("VGA compatible controller")
                || line.contains("3D controller")
                || line.contains("Display controller")
        })
        .find_map(gpu_from_lspci_line)
}

fn gpu_from_lspci_line(line: &str) -> Option<String> {
    // The bus address has no space after its colons
    let (_, description) = line.split_once(": ")?;
    let description = description.split(" (rev ").next().unwrap_or(description).trim();

    if description.contains("NVIDIA") {
        return Some(match bracketed(description) {
            Some(name) => format!("NVIDIA {}", name),
            None => "NVIDIA GPU".to_string(),
        });
    }
    if description.contains("AMD") || description.contains("Advanced Micro Devices") {
        return Some(match bracketed(description) {
            Some(name) if name.contains("Radeon") => format!("AMD {}", top_model(name)),
            Some(name) => format!("AMD {}", name),
            None => "AMD GPU".to_string(),
        });
    }
    if description.contains("Intel") {
        let cleaned = description.replace("Intel Corporation ", "");
        let model = cleaned.split(" [").next().unwrap_or(&cleaned).trim();
        return Some(format!("Intel {}", model));
    }

    Some(bracketed(description).unwrap_or(description).to_string())
}

/// `Radeon RX 7700 XT / 7800 XT` -> `Radeon RX 7800 XT`
fn top_model(family: &str) -> String {
    let (Some((first, _)), Some((_, last))) = (family.split_once(" / "), family.rsplit_once(" / ")) else {
        return family.to_string();
    };
    let series: Vec<&str> = first
        .split_whitespace()
        .take_while(|word| !word.chars().any(|c| c.is_ascii_digit()))
        .collect();
    let last = last.trim();
    if series.is_empty() || last.starts_with(series[0]) {
        last.to_string()
    } else {
        format!("{} {}", series.join(" "), last)
    }
}

/// Content of the last `[...]` that is not a vendor tag like `[AMD/ATI]`
fn bracketed(description: &str) -> Option<&str> {
    let start = description.rfind('[')?;
    let end = description[start..].find(']')? + start;
    let content = &description[start + 1..end];
    (!content.contains('/') || content.contains(" / "))
        .then_some(content)
        .filter(|content| content.len() > 2)
}

fn drm_vendor_gpu(drm_root: &Path) -> Option<String> {
    let mut cards: Vec<_> = fs::read_dir(drm_root)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("card") && !n.contains('-'))
        })
        .collect();
    cards.sort();

    cards.iter().find_map(|card| {
        let vendor = read_sys_value(card.join("device/vendor")).ok()?;
        match vendor.as_str() {
            "0x10de" => Some("NVIDIA GPU".to_string()),
            "0x1002" => Some("AMD GPU".to_string()),
            "0x8086" => Some("Intel GPU".to_string()),
            _ => None,
        }
    })
}

/// Mobile GPU from vendor sysfs nodes, /proc/gpuinfo and DRM device names
pub fn android_gpu() -> Result<String> {
    let mut candidates = Vec::new();

    if let Ok(mali) = read_sys_value("/sys/class/misc/mali0/device/gpuinfo") {
        let clock = read_sys_value("/sys/class/misc/mali0/device/clock")
            .map(|mhz| format!(" @ {} MHz", mhz))
            .unwrap_or_default();
        candidates.push(format!("Mali {}{}", mali, clock));
    }

    if let Ok(adreno) = read_sys_value("/sys/class/kgsl/kgsl-3d0/gpu_model") {
        let model = adreno.trim_start_matches("Adreno").trim();
        candidates.push(format!("Adreno {}{}", model, hz_clock("/sys/class/kgsl/kgsl-3d0/gpuclk")));
    }

    if let Ok(powervr) = read_sys_value("/sys/class/pvr_sync/gpuinfo") {
        candidates.push(format!("PowerVR {}{}", powervr, hz_clock("/sys/class/pvr_sync/gpuclk")));
    }

    if let Ok(gpuinfo) = read_file_safe("/proc/gpuinfo") {
        candidates.extend(parse_proc_gpuinfo(&gpuinfo));
    }

    if let Ok(entries) = fs::read_dir("/sys/class/drm") {
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with("card") && !name.contains('-')
            })
            .filter_map(|entry| read_sys_value(entry.path().join("device/name")).ok())
            .map(|name| collapse_vendor_repeat(&name))
            .collect();
        names.sort();
        candidates.extend(names);
    }

    pick_android_gpu(candidates).ok_or_else(|| FetchError::detection("no mobile GPU node found"))
}

fn hz_clock(path: &str) -> String {
    read_sys_i64(path)
        .map(|hz| format!(" @ {} MHz", (hz as f64 / 1_000_000.0).round()))
        .unwrap_or_default()
}

pub fn parse_proc_gpuinfo(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    if let Some(caps) = GPUINFO_MALI.captures(text) {
        found.push(format!("Mali-{}", &caps[1]));
    }
    if let Some(caps) = GPUINFO_ADRENO.captures(text) {
        found.push(format!("Adreno {}", &caps[1]));
    }
    if let Some(caps) = GPUINFO_POWERVR.captures(text) {
        found.push(format!("PowerVR {}", &caps[1]));
    }
    found
}

/// `Adreno Adreno 640` -> `Adreno 640`
fn collapse_vendor_repeat(name: &str) -> String {
    let name = name.trim();
    for vendor in MOBILE_VENDORS {
        let Some(rest) = name.strip_prefix(vendor) else {
            continue;
        };
        if let Some(tail) = rest.trim_start().strip_prefix(vendor) {
            return format!("{}{}", vendor, tail);
        }
    }
    name.to_string()
}

/// Deduplicate, then prefer the first entry carrying a model number
pub fn pick_android_gpu(candidates: Vec<String>) -> Option<String> {
    let mut unique: Vec<String> = Vec::new();
    for candidate in candidates {
        if !candidate.is_empty() && !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }

    if unique.len() > 1 {
        if let Some(specific) = unique.iter().find(|entry| entry.chars().any(|c| c.is_ascii_digit())) {
            return Some(specific.clone());
        }
    }
    (!unique.is_empty()).then(|| unique.join(", "))
}
