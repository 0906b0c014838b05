//! Environment-derived fields shared by every platform (shell, terminal, locale)

use crate::data::{LocaleInfo, UNKNOWN};
use crate::error::{FetchError, Result};
use crate::platform::{Platform, PlatformContext};
use crate::utils::{command::*, file::*, parsing::extract_version};
use std::collections::HashSet;
use std::env;
use std::path::Path;
use tracing::debug;

/// Hostname from the environment or the `hostname` command
pub fn hostname() -> Result<String> {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .map(Ok)
        .unwrap_or_else(|| run_command_nonempty("hostname", &[]))
}

/// Shell name with its version, e.g. `zsh 5.9`
pub fn shell(ctx: &PlatformContext) -> Result<String> {
    let name = match ctx.platform {
        Platform::Linux | Platform::Android => parent_shell().or_else(shell_from_env),
        _ => shell_from_env(),
    }
    .ok_or_else(|| FetchError::detection("no shell detected"))?;

    let version = (ctx.platform != Platform::Windows && command_exists(&name))
        .then(|| run_command(&name, &["--version"]).ok())
        .flatten()
        .and_then(|output| extract_version(&output));

    Ok(match version {
        Some(version) => format!("{} {}", name, version),
        None => name,
    })
}

fn shell_from_env() -> Option<String> {
    let path = env::var("SHELL").or_else(|_| env::var("ComSpec")).ok()?;
    let name = Path::new(path.trim()).file_stem()?.to_str()?.to_string();
    (!name.is_empty()).then_some(name)
}

/// Walk up the process tree to the first known shell
fn parent_shell() -> Option<String> {
    let known_shells: HashSet<&str> = [
        "bash", "zsh", "fish", "nu", "nushell", "ksh", "mksh", "csh", "tcsh", "elvish", "xonsh",
    ]
    .into_iter()
    .collect();

    let ppid_of = |pid: &str| -> Option<String> {
        let stat = read_file_safe(format!("/proc/{}/stat", pid)).ok()?;
        // comm may contain spaces; fields resume after the closing paren
        let after_comm = &stat[stat.rfind(')')? + 1..];
        after_comm.split_whitespace().nth(1).map(str::to_string)
    };

    let mut pid = ppid_of("self")?;
    for _ in 0..10 {
        if pid == "0" || pid == "1" {
            break;
        }
        if let Ok(exe) = std::fs::read_link(format!("/proc/{}/exe", pid)) {
            if let Some(name) = exe.file_name().and_then(|n| n.to_str()) {
                let name = name.to_lowercase();
                // `sh` and `dash` are usually wrappers; keep climbing
                if known_shells.contains(name.as_str()) {
                    return Some(name);
                }
            }
        }
        pid = ppid_of(&pid)?;
    }
    None
}

/// `"<tty> (<emulator> - <TERM>)"`, dropping parts that are unknown
pub fn terminal() -> String {
    let tty = tty_path();
    let emulator = ["TERMINAL_EMULATOR", "TERM_PROGRAM"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.is_empty()));
    let term = ["TERM", "TERMINAL"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.is_empty()));

    describe_terminal(tty.as_deref(), emulator.as_deref(), term.as_deref())
}

pub fn describe_terminal(tty: Option<&str>, emulator: Option<&str>, term: Option<&str>) -> String {
    let detail = match (emulator, term) {
        (Some(emulator), Some(term)) => Some(format!("{} - {}", emulator, term)),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    };

    match (tty, detail) {
        (Some(tty), Some(detail)) => format!("{} ({})", tty, detail),
        (Some(tty), None) => tty.to_string(),
        (None, Some(detail)) => detail,
        (None, None) => UNKNOWN.to_string(),
    }
}

#[cfg(unix)]
fn tty_path() -> Option<String> {
    // SAFETY: ttyname returns a pointer to a static buffer or NULL; it is
    // copied out immediately.
    let from_libc = unsafe {
        let ptr = libc::ttyname(libc::STDIN_FILENO);
        if ptr.is_null() {
            None
        } else {
            std::ffi::CStr::from_ptr(ptr).to_str().ok().map(str::to_string)
        }
    };

    from_libc
        .or_else(|| {
            std::fs::read_link("/proc/self/fd/0")
                .ok()
                .and_then(|p| p.to_str().map(str::to_string))
        })
        .filter(|p| is_terminal_device(p))
        .or_else(|| env::var("TTY").ok().filter(|p| is_terminal_device(p)))
        .or_else(controlling_tty)
}

#[cfg(not(unix))]
fn tty_path() -> Option<String> {
    env::var("TTY").ok()
}

/// True for `/dev/pts/*`, `/dev/tty*` and `/dev/console`
pub fn is_terminal_device(path: &str) -> bool {
    path == "/dev/console"
        || path.strip_prefix("/dev/pts/").is_some_and(|n| !n.is_empty())
        || path.strip_prefix("/dev/tty").is_some_and(|n| !n.is_empty())
}

/// Controlling terminal of this process when stdin is redirected
#[cfg(unix)]
fn controlling_tty() -> Option<String> {
    let from_stat = read_file_safe("/proc/self/stat")
        .ok()
        .and_then(|stat| stat_tty_nr(&stat))
        .and_then(tty_from_tty_nr);

    from_stat
        .or_else(|| {
            let pid = std::process::id().to_string();
            run_command_nonempty("ps", &["-o", "tty=", "-p", &pid])
                .ok()
                .filter(|tty| tty != "?" && tty != "??")
                .map(|tty| format!("/dev/{}", tty))
        })
        .filter(|p| is_terminal_device(p))
}

/// `tty_nr` is the seventh field of `/proc/<pid>/stat`; `comm` may hold spaces
pub fn stat_tty_nr(stat: &str) -> Option<u32> {
    let (_, rest) = stat.rsplit_once(')')?;
    rest.split_whitespace().nth(4)?.parse::<i64>().ok().map(|nr| nr as u32)
}

/// Device path for a kernel `tty_nr`; 0 means no controlling terminal
pub fn tty_from_tty_nr(nr: u32) -> Option<String> {
    let major = (nr >> 8) & 0xfff;
    let minor = (nr & 0xff) | ((nr >> 12) & 0xfff00);

    match major {
        136..=143 => Some(format!("/dev/pts/{}", (major - 136) * 256 + minor)),
        4 if minor < 64 => Some(format!("/dev/tty{}", minor)),
        4 => Some(format!("/dev/ttyS{}", minor - 64)),
        5 if minor == 1 => Some("/dev/console".to_string()),
        _ => None,
    }
}

/// Locale and timezone
pub fn locale(ctx: &PlatformContext) -> LocaleInfo {
    let locale = ["LC_ALL", "LANG"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let timezone = timezone(ctx).unwrap_or_else(|err| {
        debug!(error = %err, "timezone not detected");
        UNKNOWN.to_string()
    });

    LocaleInfo { locale, timezone }
}

fn timezone(ctx: &PlatformContext) -> Result<String> {
    if let Some(tz) = env::var("TZ").ok().map(|tz| tz.trim_start_matches(':').to_string()) {
        if !tz.is_empty() {
            return Ok(tz);
        }
    }

    match ctx.platform {
        Platform::Windows => run_command_nonempty("tzutil", &["/g"]),
        Platform::Android => run_command_nonempty("getprop", &["persist.sys.timezone"]),
        _ => read_sys_value("/etc/timezone").or_else(|_| {
            let target = std::fs::read_link("/etc/localtime")?;
            timezone_from_link(&target.to_string_lossy())
                .ok_or_else(|| FetchError::detection("/etc/localtime is not a zoneinfo link"))
        }),
    }
}

/// `/usr/share/zoneinfo/Europe/Lisbon` -> `Europe/Lisbon`
pub fn timezone_from_link(target: &str) -> Option<String> {
    target
        .split_once("zoneinfo/")
        .map(|(_, zone)| zone.to_string())
        .filter(|zone| !zone.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_description_drops_unknown_parts() {
        assert_eq!(
            describe_terminal(Some("/dev/pts/3"), Some("WezTerm"), Some("xterm-256color")),
            "/dev/pts/3 (WezTerm - xterm-256color)"
        );
        assert_eq!(describe_terminal(Some("/dev/tty1"), None, Some("linux")), "/dev/tty1 (linux)");
        assert_eq!(describe_terminal(None, None, Some("xterm-kitty")), "xterm-kitty");
        assert_eq!(describe_terminal(None, None, None), UNKNOWN);
    }

    #[test]
    fn only_terminal_devices_count_as_tty() {
        for tty in ["/dev/pts/3", "/dev/tty1", "/dev/ttyS0", "/dev/console"] {
            assert!(is_terminal_device(tty), "{}", tty);
        }
        for other in ["/dev/null", "/dev/zero", "/dev/pts/", "/dev/tty", "pipe:[1234]", "/tmp/input"] {
            assert!(!is_terminal_device(other), "{}", other);
        }
    }

    #[test]
    fn controlling_tty_from_proc_stat() {
        let stat = "4242 (my (odd) shell) S 4200 4242 4200 34819 4242 4194560 120 0";
        assert_eq!(stat_tty_nr(stat), Some(34819));
        assert_eq!(stat_tty_nr("garbage"), None);

        assert_eq!(tty_from_tty_nr(34819).as_deref(), Some("/dev/pts/3"));
        assert_eq!(tty_from_tty_nr(1025).as_deref(), Some("/dev/tty1"));
        assert_eq!(tty_from_tty_nr(1088).as_deref(), Some("/dev/ttyS0"));
        assert_eq!(tty_from_tty_nr(1281).as_deref(), Some("/dev/console"));
        assert_eq!(tty_from_tty_nr(0), None);
    }

    #[test]
    fn timezone_from_zoneinfo_link() {
        assert_eq!(
            timezone_from_link("/usr/share/zoneinfo/America/Sao_Paulo").as_deref(),
            Some("America/Sao_Paulo")
        );
        assert_eq!(
            timezone_from_link("/var/db/timezone/zoneinfo/Europe/Berlin").as_deref(),
            Some("Europe/Berlin")
        );
        assert_eq!(timezone_from_link("/etc/localtime.bak"), None);
    }
}
