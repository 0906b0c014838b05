//! Command execution utilities

use crate::error::{FetchError, Result};
use std::process::{Command, Stdio};
use tracing::debug;

/// Execute a command and return trimmed stdout
pub fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|err| {
            debug!(program, error = %err, "failed to spawn command");
            FetchError::from(err)
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        debug!(program, code = ?output.status.code(), "command exited unsuccessfully");
        Err(FetchError::Command {
            program: program.to_string(),
            code: output.status.code(),
        })
    }
}

/// Execute a command, failing when it succeeds but prints nothing
pub fn run_command_nonempty(program: &str, args: &[&str]) -> Result<String> {
    let output = run_command(program, args)?;
    if output.is_empty() {
        return Err(FetchError::detection(format!("'{}' produced no output", program)));
    }
    Ok(output)
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };

    std::env::split_paths(&path).any(|dir| {
        let full_path = dir.join(program);
        full_path.is_file() || (cfg!(windows) && full_path.with_extension("exe").is_file())
    })
}
