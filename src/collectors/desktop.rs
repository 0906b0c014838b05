//! Desktop environment, window manager and theme detection

use crate::data::ThemeInfo;
use crate::error::{FetchError, Result};
use crate::utils::{command::*, parsing::*};
use std::env;
use tracing::debug;

/// Where one desktop keeps its appearance settings
struct DesktopSettings {
    /// Matched case-insensitively against the session name
    key: &'static str,
    theme: &'static [&'static str],
    icons: &'static [&'static str],
    font: &'static [&'static str],
    cursor: &'static [&'static str],
    wm_theme: Option<&'static [&'static str]>,
}

const GNOME_INTERFACE: DesktopSettings = DesktopSettings {
    key: "gnome",
    theme: &["gsettings", "get", "org.gnome.desktop.interface", "gtk-theme"],
    icons: &["gsettings", "get", "org.gnome.desktop.interface", "icon-theme"],
    font: &["gsettings", "get", "org.gnome.desktop.interface", "font-name"],
    cursor: &["gsettings", "get", "org.gnome.desktop.interface", "cursor-theme"],
    wm_theme: None,
};

const DESKTOPS: [DesktopSettings; 8] = [
    DesktopSettings {
        key: "kde",
        theme: &["kreadconfig5", "--group", "Theme", "--key", "name"],
        icons: &["kreadconfig5", "--group", "Icons", "--key", "Theme"],
        font: &["kreadconfig5", "--group", "General", "--key", "font"],
        cursor: &["kreadconfig5", "--group", "Mouse", "--key", "cursorTheme"],
        wm_theme: Some(&["kreadconfig5", "--group", "WM", "--key", "theme"]),
    },
    GNOME_INTERFACE,
    DesktopSettings {
        key: "xfce",
        theme: &["xfconf-query", "-c", "xsettings", "-p", "/Net/ThemeName"],
        icons: &["xfconf-query", "-c", "xsettings", "-p", "/Net/IconThemeName"],
        font: &["xfconf-query", "-c", "xsettings", "-p", "/Gtk/FontName"],
        cursor: &["xfconf-query", "-c", "xsettings", "-p", "/Gtk/CursorThemeName"],
        wm_theme: Some(&["xfconf-query", "-c", "xfwm4", "-p", "/general/theme"]),
    },
    DesktopSettings {
        key: "cinnamon",
        theme: &["gsettings", "get", "org.cinnamon.desktop.interface", "gtk-theme"],
        icons: &["gsettings", "get", "org.cinnamon.desktop.interface", "icon-theme"],
        font: &["gsettings", "get", "org.cinnamon.desktop.interface", "font-name"],
        cursor: &["gsettings", "get", "org.cinnamon.desktop.interface", "cursor-theme"],
        wm_theme: None,
    },
    DesktopSettings {
        key: "mate",
        theme: &["gsettings", "get", "org.mate.interface", "gtk-theme"],
        icons: &["gsettings", "get", "org.mate.interface", "icon-theme"],
        font: &["gsettings", "get", "org.mate.interface", "font-name"],
        cursor: &["gsettings", "get", "org.mate.peripherals-mouse", "cursor-theme"],
        wm_theme: None,
    },
    DesktopSettings { key: "budgie", ..GNOME_INTERFACE },
    DesktopSettings {
        key: "lxde",
        theme: &["lxappearance", "--print-theme"],
        icons: &["lxappearance", "--print-icon-theme"],
        font: &["lxappearance", "--print-font"],
        cursor: &["lxappearance", "--print-cursor-theme"],
        wm_theme: None,
    },
    DesktopSettings {
        key: "lxqt",
        theme: &["lxqt-config-appearance", "--print-theme"],
        icons: &["lxqt-config-appearance", "--print-icon-theme"],
        font: &["lxqt-config-appearance", "--print-font"],
        cursor: &["lxqt-config-appearance", "--print-cursor-theme"],
        wm_theme: None,
    },
];

/// Window managers recognised from running process names
const WM_PROCESSES: [&str; 14] = [
    "sway",
    "hyprland",
    "kwin_wayland",
    "kwin_x11",
    "niri",
    "mutter",
    "xfwm4",
    "openbox",
    "i3",
    "bspwm",
    "awesome",
    "weston",
    "marco",
    "muffin",
];

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn linux_theme() -> Result<ThemeInfo> {
    let mut info = ThemeInfo {
        de: env_value("DESKTOP_SESSION").or_else(|| env_value("XDG_CURRENT_DESKTOP")),
        wm: running_window_manager()
            .or_else(|| env_value("XDG_SESSION_TYPE").map(|session| session.to_uppercase()))
            .or_else(|| env_value("WINDOWMANAGER")),
        ..ThemeInfo::default()
    };

    if let Some(settings) = info.de.as_deref().and_then(desktop_settings) {
        debug!(desktop = settings.key, "reading desktop appearance settings");
        info.theme = read_setting(settings.theme);
        info.icons = read_setting(settings.icons);
        info.font = read_setting(settings.font);
        info.cursor = read_setting(settings.cursor);
        info.wm_theme = settings.wm_theme.and_then(read_setting);
    }

    info.theme = info.theme.or_else(|| env_value("GTK_THEME"));
    info.icons = info.icons.or_else(|| env_value("ICON_THEME"));
    info.font = info.font.or_else(|| env_value("GTK_FONT"));
    info.cursor = info.cursor.or_else(|| env_value("XCURSOR_THEME"));

    if info.is_empty() {
        return Err(FetchError::detection("no desktop session"));
    }
    Ok(info)
}

fn desktop_settings(session: &str) -> Option<&'static DesktopSettings> {
    let session = session.to_lowercase();
    DESKTOPS.iter().find(|desktop| session.contains(desktop.key))
}

fn read_setting(command: &[&str]) -> Option<String> {
    let (program, args) = command.split_first()?;
    let output = run_command(program, args).ok()?;
    let value = strip_quotes(&output).to_string();
    (!value.is_empty()).then_some(value)
}

/// Scan the first processes for a known window manager
fn running_window_manager() -> Option<String> {
    let entries = std::fs::read_dir("/proc").ok()?;

    // Window managers start early; a bounded scan keeps this cheap
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_str().is_some_and(|name| name.parse::<u32>().is_ok()))
        .take(512)
        .find_map(|entry| {
            let comm = std::fs::read_to_string(entry.path().join("comm")).ok()?;
            window_manager_name(comm.trim())
        })
}

pub fn window_manager_name(process: &str) -> Option<String> {
    WM_PROCESSES
        .iter()
        .find(|wm| process == **wm)
        .map(|wm| match *wm {
            "kwin_wayland" | "kwin_x11" => "KWin".to_string(),
            "i3" => "i3".to_string(),
            other => capitalize_first_letter(other),
        })
}

pub fn macos_theme() -> Result<ThemeInfo> {
    // The key is absent in light mode, so a failed read means Light
    let dark = run_command("defaults", &["read", "-g", "AppleInterfaceStyle"])
        .is_ok_and(|style| style.eq_ignore_ascii_case("dark"));

    Ok(ThemeInfo {
        de: Some("Aqua".to_string()),
        wm: Some("Quartz Compositor".to_string()),
        theme: Some(if dark { "Dark" } else { "Light" }.to_string()),
        font: run_command_nonempty("defaults", &["read", "-g", "AppleSystemUIFont"]).ok(),
        ..ThemeInfo::default()
    })
}

pub fn windows_theme() -> Result<ThemeInfo> {
    let output = run_command(
        "reg",
        &[
            "query",
            r"HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize",
            "/v",
            "AppsUseLightTheme",
        ],
    )?;

    Ok(ThemeInfo {
        de: Some("Windows".to_string()),
        wm: Some("DWM".to_string()),
        theme: Some(parse_reg_light_theme(&output).to_string()),
        ..ThemeInfo::default()
    })
}

/// `AppsUseLightTheme    REG_DWORD    0x0` means dark mode
pub fn parse_reg_light_theme(output: &str) -> &'static str {
    let value = output
        .lines()
        .find(|line| line.contains("AppsUseLightTheme"))
        .and_then(|line| line.split_whitespace().last());

    match value {
        Some("0x0") => "Dark",
        _ => "Light",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_names_select_desktop_settings() {
        assert_eq!(desktop_settings("plasma-KDE").map(|d| d.key), Some("kde"));
        assert_eq!(desktop_settings("ubuntu:GNOME").map(|d| d.key), Some("gnome"));
        assert_eq!(desktop_settings("Budgie:GNOME").map(|d| d.key), Some("gnome"));
        assert_eq!(desktop_settings("XFCE").map(|d| d.key), Some("xfce"));
        assert!(desktop_settings("hyprland").is_none());
    }

    #[test]
    fn budgie_reuses_gnome_commands() {
        let budgie = desktop_settings("budgie-desktop").unwrap();
        assert_eq!(budgie.key, "budgie");
        assert_eq!(budgie.theme, GNOME_INTERFACE.theme);
    }

    #[test]
    fn window_manager_process_names() {
        assert_eq!(window_manager_name("sway").as_deref(), Some("Sway"));
        assert_eq!(window_manager_name("kwin_wayland").as_deref(), Some("KWin"));
        assert_eq!(window_manager_name("i3").as_deref(), Some("i3"));
        assert_eq!(window_manager_name("i3bar"), None);
        assert_eq!(window_manager_name("bash"), None);
    }

    #[test]
    fn registry_light_theme_flag() {
        let dark = "\r\nHKEY_CURRENT_USER\\Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize\r\n    AppsUseLightTheme    REG_DWORD    0x0\r\n";
        let light = "    AppsUseLightTheme    REG_DWORD    0x1\r\n";
        assert_eq!(parse_reg_light_theme(dark), "Dark");
        assert_eq!(parse_reg_light_theme(light), "Light");
    }
}
