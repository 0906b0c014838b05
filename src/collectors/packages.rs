//! Installed package counts per package manager

use crate::error::{FetchError, Result};
use crate::utils::{command::*, file::*};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Package managers counted on Linux and Android
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Pacman,  // Arch Linux, Manjaro
    Dpkg,    // Debian, Ubuntu, Termux
    Rpm,     // Fedora, openSUSE, RHEL
    Xbps,    // Void Linux
    Portage, // Gentoo
    Apk,     // Alpine
    Nix,     // NixOS
    Flatpak,
    Snap,
}

const LINUX_MANAGERS: [PackageManager; 9] = [
    PackageManager::Pacman,
    PackageManager::Dpkg,
    PackageManager::Rpm,
    PackageManager::Xbps,
    PackageManager::Portage,
    PackageManager::Apk,
    PackageManager::Nix,
    PackageManager::Flatpak,
    PackageManager::Snap,
];

impl PackageManager {
    pub fn label(&self) -> &'static str {
        match self {
            PackageManager::Pacman => "pacman",
            PackageManager::Dpkg => "dpkg",
            PackageManager::Rpm => "rpm",
            PackageManager::Xbps => "xbps",
            PackageManager::Portage => "portage",
            PackageManager::Apk => "apk",
            PackageManager::Nix => "nix",
            PackageManager::Flatpak => "flatpak",
            PackageManager::Snap => "snap",
        }
    }

    /// Installed package count, `Ok(0)` or `Err` when the manager is absent.
    /// `prefix` is prepended to database paths (Termux keeps them under `$PREFIX`).
    pub fn count(&self, prefix: &Path) -> Result<usize> {
        let db = |path: &str| rooted(prefix, path);
        match self {
            PackageManager::Pacman => {
                count_dir_entries(&db("/var/lib/pacman/local"), |name| name != "ALPM_DB_VERSION")
            }
            PackageManager::Dpkg => {
                let status = read_file_safe(db("/var/lib/dpkg/status"))?;
                Ok(count_dpkg_installed(&status))
            }
            PackageManager::Rpm => {
                if !file_exists(db("/var/lib/rpm")) {
                    return Ok(0);
                }
                let output = run_command("rpm", &["-qa"])?;
                Ok(count_lines(&output))
            }
            PackageManager::Xbps => {
                let plists = count_dir_entries(&db("/var/db/xbps"), |name| name.ends_with(".plist"));
                match plists {
                    Ok(count) if count > 0 => Ok(count),
                    _ => Ok(count_lines(&run_command("xbps-query", &["-l"])?)),
                }
            }
            PackageManager::Portage => {
                // Packages live one level below the category directories
                let root = db("/var/db/pkg");
                let count = fs::read_dir(&root)?
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.path().is_dir())
                    .filter_map(|entry| fs::read_dir(entry.path()).ok())
                    .map(|packages| packages.count())
                    .sum();
                Ok(count)
            }
            PackageManager::Apk => {
                let installed = read_file_safe(db("/lib/apk/db/installed"))?;
                Ok(installed.lines().filter(|line| line.starts_with("P:")).count())
            }
            PackageManager::Nix => {
                if !command_exists("nix-store") {
                    return Ok(0);
                }
                let output = run_command("nix-store", &["--query", "--requisites", "/run/current-system/sw"])?;
                Ok(count_lines(&output))
            }
            PackageManager::Flatpak => {
                let system = count_dir_entries(&db("/var/lib/flatpak/app"), |_| true).unwrap_or(0);
                let user = dirs::data_dir()
                    .map(|data| data.join("flatpak/app"))
                    .and_then(|dir| count_dir_entries(&dir, |_| true).ok())
                    .unwrap_or(0);
                Ok(system + user)
            }
            PackageManager::Snap => {
                if !command_exists("snap") {
                    return Ok(0);
                }
                let output = run_command("snap", &["list"])?;
                // First line is the column header
                Ok(count_lines(&output).saturating_sub(1))
            }
        }
    }
}

fn rooted(prefix: &Path, path: &str) -> PathBuf {
    if prefix.as_os_str().is_empty() {
        PathBuf::from(path)
    } else {
        prefix.join(path.trim_start_matches('/'))
    }
}

fn count_lines(output: &str) -> usize {
    output.lines().filter(|line| !line.trim().is_empty()).count()
}

fn count_dir_entries(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<usize> {
    let count = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| keep(&entry.file_name().to_string_lossy()))
        .count();
    Ok(count)
}

/// Packages in a dpkg status database whose state is fully installed
pub fn count_dpkg_installed(status: &str) -> usize {
    status
        .lines()
        .filter(|line| line.trim() == "Status: install ok installed")
        .count()
}

/// `"1234 (pacman), 12 (flatpak)"`, skipping managers with no packages
pub fn format_package_counts(counts: &[(&str, usize)]) -> Result<String> {
    let parts: Vec<String> = counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| format!("{} ({})", count, label))
        .collect();

    if parts.is_empty() {
        return Err(FetchError::detection("no package manager found"));
    }
    Ok(parts.join(", "))
}

pub fn linux_packages(prefix: &str) -> Result<String> {
    let prefix = Path::new(prefix);
    let counts: Vec<(&str, usize)> = LINUX_MANAGERS
        .iter()
        .filter_map(|manager| match manager.count(prefix) {
            Ok(count) => Some((manager.label(), count)),
            Err(err) => {
                debug!(manager = manager.label(), error = %err, "package manager not counted");
                None
            }
        })
        .collect();

    format_package_counts(&counts)
}

pub fn macos_packages() -> Result<String> {
    let brew: usize = ["/opt/homebrew/Cellar", "/usr/local/Cellar", "/opt/homebrew/Caskroom", "/usr/local/Caskroom"]
        .iter()
        .filter_map(|dir| count_dir_entries(Path::new(dir), |name| !name.starts_with('.')).ok())
        .sum();

    let port = if command_exists("port") {
        run_command("port", &["installed"])
            .map(|output| count_lines(&output).saturating_sub(1))
            .unwrap_or(0)
    } else {
        0
    };

    format_package_counts(&[("brew", brew), ("port", port)])
}

pub fn windows_packages() -> Result<String> {
    let choco = std::env::var("ChocolateyInstall")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(r"C:\ProgramData\chocolatey"));
    let choco = count_dir_entries(&choco.join("lib"), |_| true).unwrap_or(0);

    let scoop = std::env::var("SCOOP")
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|home| home.join("scoop")))
        .and_then(|root| count_dir_entries(&root.join("apps"), |name| name != "scoop").ok())
        .unwrap_or(0);

    format_package_counts(&[("choco", choco), ("scoop", scoop)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn counts_are_joined_and_empty_managers_skipped() {
        let formatted = format_package_counts(&[("pacman", 1234), ("snap", 0), ("flatpak", 12)]).unwrap();
        assert_eq!(formatted, "1234 (pacman), 12 (flatpak)");
        assert!(format_package_counts(&[("dpkg", 0)]).is_err());
    }

    #[test]
    fn dpkg_counts_only_installed_state() {
        let status = "Package: bash\nStatus: install ok installed\n\n\
                      Package: old-lib\nStatus: deinstall ok config-files\n\n\
                      Package: coreutils\nStatus: install ok installed\n";
        assert_eq!(count_dpkg_installed(status), 2);
    }

    #[test]
    fn prefixed_databases() {
        let prefix = TempDir::new().unwrap();
        let local = prefix.path().join("var/lib/pacman/local");
        fs::create_dir_all(local.join("bash-5.2.026-2")).unwrap();
        fs::create_dir_all(local.join("glibc-2.39-1")).unwrap();
        fs::write(local.join("ALPM_DB_VERSION"), "9\n").unwrap();

        let apk = prefix.path().join("lib/apk/db");
        fs::create_dir_all(&apk).unwrap();
        fs::write(apk.join("installed"), "C:Q1abc\nP:musl\nV:1.2.4\n\nC:Q1def\nP:busybox\nV:1.36\n").unwrap();

        assert_eq!(PackageManager::Pacman.count(prefix.path()).unwrap(), 2);
        assert_eq!(PackageManager::Apk.count(prefix.path()).unwrap(), 2);
        assert!(PackageManager::Dpkg.count(prefix.path()).is_err());
    }
}
