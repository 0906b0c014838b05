//! Two-column terminal layout: coloured art on the left, report lines on the right

use crate::ascii::{process_art, visible_width, RESET};
use crate::config::{Config, ShowInfo};
use crate::data::{is_unknown, InfoRecord, UsageInfo, UNKNOWN};
use crate::platform::PlatformContext;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

const MARGIN: usize = 8;
const COMPACT_MARGIN: usize = 2;
const COLOR_BLOCK: &str = "   ";

static SPACE_BEFORE_COLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+:").expect("valid regex"));

/// Escape sequence for a colour name or `#rrggbb`; unrecognised values reset
pub fn color_code(color: &str) -> String {
    if let Some(code) = named_color_code(color) {
        return code.to_string();
    }

    let hex = color.trim();
    if hex.starts_with('#') && hex.len() == 7 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[1..3], 16),
            u8::from_str_radix(&hex[3..5], 16),
            u8::from_str_radix(&hex[5..7], 16),
        ) {
            return format!("\x1b[38;2;{};{};{}m", r, g, b);
        }
    }

    warn!(color, "unknown colour, expected a colour name or #rrggbb");
    RESET.to_string()
}

fn named_color_code(name: &str) -> Option<&'static str> {
    let code = match name.trim().to_lowercase().as_str() {
        "black" => "\x1b[30m",
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" | "purple" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        "white" => "\x1b[37m",
        "bright_black" | "gray" | "grey" => "\x1b[90m",
        "bright_red" | "orange" => "\x1b[91m",
        "bright_green" => "\x1b[92m",
        "bright_yellow" => "\x1b[93m",
        "bright_blue" => "\x1b[94m",
        "bright_magenta" | "violet" => "\x1b[95m",
        "bright_cyan" => "\x1b[96m",
        "bright_white" => "\x1b[97m",
        "reset" | "default" => RESET,
        _ => return None,
    };
    Some(code)
}

/// `Label   : value` becomes `Label: value`
pub fn collapse_label_colon(text: &str) -> String {
    SPACE_BEFORE_COLON.replace(text, ":").into_owned()
}

fn usage(info: &UsageInfo) -> String {
    format!("{} / {} ({})", info.used, info.total, info.percentage)
}

fn known(value: &str) -> Option<String> {
    (!is_unknown(value)).then(|| value.to_string())
}

type Entries = Vec<(String, String)>;

fn push_core(entries: &mut Entries, enabled: bool, label: &str, value: String) {
    if enabled {
        entries.push((label.to_string(), value));
    }
}

fn push_optional(entries: &mut Entries, enabled: bool, label: &str, value: Option<String>) {
    if let (true, Some(value)) = (enabled, value.filter(|v| !is_unknown(v))) {
        entries.push((label.to_string(), value));
    }
}

/// Label/value pairs in report order. Core fields are kept even when Unknown.
pub fn info_entries(info: &InfoRecord, show: &ShowInfo, ctx: &PlatformContext) -> Entries {
    let mut entries = Entries::new();
    let e = &mut entries;

    push_core(e, show.hostname, "Hostname", info.hostname.clone());
    push_core(e, show.os, "OS", os_line(info));
    push_core(e, show.kernel, "Kernel", info.kernel.clone());
    push_core(e, show.uptime, "Uptime", info.uptime.clone());
    push_core(e, show.shell, "Shell", info.shell.clone());
    push_core(e, show.terminal, "Terminal", info.terminal.clone());
    push_core(e, show.cpu, "CPU", cpu_line(info));
    push_optional(e, show.gpu, "GPU", Some(info.gpu.clone()));
    push_core(e, show.memory, "Memory", usage(&info.memory));
    push_optional(e, show.swap, "Swap", info.swap.as_ref().filter(|swap| !swap.is_unknown()).map(usage));
    push_core(e, show.disk, "Disk", usage(&info.disk));
    push_optional(e, show.resolution, "Resolution", Some(info.resolution.clone()));
    push_optional(e, show.packages, "Packages", Some(info.packages.clone()));

    let displays: Vec<String> = info.display.iter().map(ToString::to_string).collect();
    push_optional(e, show.display, "Display", Some(displays.join(", ")));

    let theme = &info.theme;
    push_optional(e, show.de, "DE", theme.de.clone());
    push_optional(e, show.wm, "WM", theme.wm.clone());
    push_optional(e, show.theme, "Theme", theme.theme.clone());
    push_optional(e, show.icons, "Icons", theme.icons.clone());
    push_optional(e, show.font, "Font", theme.font.clone());
    push_optional(e, show.cursor, "Cursor", theme.cursor.clone());
    push_optional(e, show.wm_theme, "WM Theme", theme.wm_theme.clone());
    push_optional(e, show.locale, "Locale", Some(info.locale.locale.clone()));
    push_optional(e, show.timezone, "Timezone", Some(info.locale.timezone.clone()));

    let several = info.battery.len() > 1;
    for battery in &info.battery {
        let label = if several { format!("Battery ({})", battery.name) } else { "Battery".to_string() };
        let mut value = format!("{} ({})", battery.capacity, battery.status);
        if let Some(remaining) = &battery.time_remaining {
            value.push_str(&format!(", {} remaining", remaining));
        }
        push_optional(e, show.battery, &label, Some(value));
    }

    for interface in &info.network {
        push_optional(e, show.network, &format!("Network ({})", interface.name), Some(interface.ip.clone()));
    }

    if let (true, Some(android)) = (ctx.is_android(), info.android_info.as_ref()) {
        let device = match known(&android.manufacturer) {
            Some(manufacturer) if !android.device.to_lowercase().contains(&manufacturer.to_lowercase()) => {
                format!("{} {}", manufacturer, android.device)
            }
            _ => android.device.clone(),
        };
        let version = known(&android.version).map(|version| match known(&android.sdk) {
            Some(sdk) => format!("{} (SDK {})", version, sdk),
            None => version,
        });
        let storage = known(&android.storage_total).map(|total| format!("{} / {}", android.storage_used, total));

        push_optional(e, show.android, "Device", known(&android.device).map(|_| device));
        push_optional(e, show.android, "Android", version);
        push_optional(e, show.android, "Storage", storage);
        push_optional(e, show.android, "Wi-Fi", Some(android.wifi.clone()));
    }

    entries
}

fn os_line(info: &InfoRecord) -> String {
    let distro = if is_unknown(&info.distro) { &info.platform } else { &info.distro };
    let mut line = distro.clone();
    if !is_unknown(&info.release) && !distro.contains(info.release.as_str()) {
        line.push(' ');
        line.push_str(&info.release);
    }
    if !info.arch.is_empty() {
        line.push(' ');
        line.push_str(&info.arch);
    }
    line
}

fn cpu_line(info: &InfoRecord) -> String {
    let cpu = &info.cpu;
    match (cpu.cores, cpu.speed.as_deref()) {
        (Some(cores), Some(speed)) => format!("{} ({} cores @ {})", cpu.model, cores, speed),
        (Some(cores), None) => format!("{} ({} cores)", cpu.model, cores),
        (None, Some(speed)) => format!("{} @ {}", cpu.model, speed),
        (None, None) => cpu.model.clone(),
    }
}

/// Every word of the value is the Unknown sentinel, e.g. `Unknown / Unknown (Unknown)`
fn is_degraded(value: &str) -> bool {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .all(|word| word == UNKNOWN)
}

/// Colourised `Label: value` lines; degraded values use the error colour
fn info_lines(entries: &[(String, String)], config: &Config) -> Vec<String> {
    let label_color = color_code(&config.colors.labels);
    let info_color = color_code(&config.colors.info);
    let error_color = color_code(&config.colors.error);
    let width = entries.iter().map(|(label, _)| label.width()).max().unwrap_or(0);

    entries
        .iter()
        .map(|(label, value)| {
            let padded = format!("{:<width$} :", label, width = width);
            let label = if config.display.align_labels {
                padded
            } else {
                collapse_label_colon(&padded)
            };
            let value_color = if is_degraded(value) { &error_color } else { &info_color };
            format!("{}\x1b[1m{}{} {}{}{}", label_color, label, RESET, value_color, value, RESET)
        })
        .collect()
}

fn color_blocks(indent: usize) -> Vec<String> {
    [40..48, 100..108]
        .into_iter()
        .map(|codes| {
            let mut row = " ".repeat(indent);
            for code in codes {
                row.push_str(&format!("\x1b[{}m{}", code, COLOR_BLOCK));
            }
            row.push_str(RESET);
            row
        })
        .collect()
}

/// Render the full report. Never fails; an empty art block or an empty
/// report still produces a well-formed layout.
pub fn render(info: &InfoRecord, art: &[String], config: &Config, ctx: &PlatformContext) -> Vec<String> {
    let display = &config.display;
    let margin = if display.compact_mode { COMPACT_MARGIN } else { MARGIN };

    let mut out = Vec::new();
    out.push(format!(
        "{}{}{}",
        color_code(&config.colors.title),
        display.separator.repeat(display.separator_length),
        RESET
    ));
    if !display.compact_mode {
        out.push(String::new());
    }

    let info = info_lines(&info_entries(info, &config.show_info, ctx), config);
    let art: Vec<String> = if display.show_ascii_art {
        let palette: Vec<String> = display.art_colors.iter().map(|color| color_code(color)).collect();
        process_art(art, &palette, &color_code(&config.colors.ascii))
    } else {
        Vec::new()
    };

    let art_width = art.iter().map(|line| visible_width(line)).max().unwrap_or(0);
    let total_rows = art.len().max(info.len());
    let top_pad = (total_rows - art.len().min(info.len())) / 2;
    let (art_offset, info_offset) = if art.len() < info.len() { (top_pad, 0) } else { (0, top_pad) };
    let column_width = margin + art_width + margin;

    for row in 0..total_rows {
        let mut line = String::new();
        if display.show_ascii_art {
            match row.checked_sub(art_offset).and_then(|i| art.get(i)) {
                Some(art_line) => {
                    line.push_str(&" ".repeat(margin));
                    line.push_str(art_line);
                    line.push_str(&" ".repeat(art_width - visible_width(art_line) + margin));
                }
                None => line.push_str(&" ".repeat(column_width)),
            }
        }
        if let Some(info_line) = row.checked_sub(info_offset).and_then(|i| info.get(i)) {
            line.push_str(info_line);
        }
        out.push(line);
    }

    if display.show_color_blocks {
        if !display.compact_mode {
            out.push(String::new());
        }
        out.extend(color_blocks(margin));
    }

    out
}
