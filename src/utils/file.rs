//! File reading utilities

use crate::error::{FetchError, Result};
use std::fs;
use std::path::Path;

/// Read a file to string, mapping the error into the crate error
pub fn read_file_safe<P: AsRef<Path>>(path: P) -> Result<String> {
    fs::read_to_string(path).map_err(FetchError::from)
}

/// Read first line of a file, trimmed
/// Optimized for single-line files like /proc/sys/kernel/hostname
#[cfg(unix)]
pub fn read_first_line<P: AsRef<Path>>(path: P) -> Result<String> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let path_cstr = CString::new(path.as_ref().as_os_str().as_bytes())
        .map_err(|_| FetchError::parse("path contains a NUL byte"))?;

    // SAFETY: `path_cstr` is NUL-terminated and outlives the call; the buffer
    // length passed to read matches the buffer.
    unsafe {
        let fd = libc::open(path_cstr.as_ptr(), libc::O_RDONLY);
        if fd < 0 {
            return Err(FetchError::from(std::io::Error::last_os_error()));
        }

        let mut buffer = [0u8; 256];
        let bytes_read = libc::read(fd, buffer.as_mut_ptr() as *mut libc::c_void, buffer.len());
        libc::close(fd);

        if bytes_read < 0 {
            return Err(FetchError::from(std::io::Error::last_os_error()));
        }

        let content = std::str::from_utf8(&buffer[..bytes_read as usize])
            .map_err(|_| FetchError::parse("invalid UTF-8"))?;
        Ok(content.lines().next().unwrap_or("").trim().to_string())
    }
}

#[cfg(not(unix))]
pub fn read_first_line<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(read_file_safe(path)?.lines().next().unwrap_or("").trim().to_string())
}

/// Read a sysfs attribute, failing on empty content
pub fn read_sys_value<P: AsRef<Path>>(path: P) -> Result<String> {
    let value = read_file_safe(path.as_ref())?.trim().to_string();
    if value.is_empty() {
        return Err(FetchError::detection(format!("{} is empty", path.as_ref().display())));
    }
    Ok(value)
}

/// Read a sysfs attribute and parse it as an integer
pub fn read_sys_i64<P: AsRef<Path>>(path: P) -> Option<i64> {
    read_sys_value(path).ok()?.parse().ok()
}

/// Check if a file exists safely
pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists()
}

/// Total and available bytes of the filesystem holding `path`
#[cfg(unix)]
pub fn filesystem_usage(path: &str) -> Result<(u64, u64)> {
    use std::ffi::CString;

    let path = CString::new(path).map_err(|_| FetchError::parse("path contains a NUL byte"))?;

    // SAFETY: statvfs only writes into the zeroed struct we own.
    unsafe {
        let mut stat: libc::statvfs = std::mem::zeroed();
        if libc::statvfs(path.as_ptr(), &mut stat) != 0 {
            return Err(FetchError::from(std::io::Error::last_os_error()));
        }

        let total = (stat.f_blocks as u64).wrapping_mul(stat.f_frsize as u64);
        let available = (stat.f_bavail as u64).wrapping_mul(stat.f_frsize as u64);
        Ok((total, available))
    }
}

#[cfg(not(unix))]
pub fn filesystem_usage(_path: &str) -> Result<(u64, u64)> {
    Err(FetchError::Unsupported("this platform"))
}
