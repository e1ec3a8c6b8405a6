//! Error mapping utilities for converting between error types.
//!
//! Device errors carry a classic errno value. This module
//! converts errno values to `embedded_io::ErrorKind` and error kinds to
//! human-readable static strings.

use core::ffi::c_int;
use fourdev::DeviceError;

/// Convert errno to `embedded_io::ErrorKind`
#[must_use]
#[allow(clippy::match_same_arms)] // We explicitly list common errno values for documentation
pub fn errno_to_error_kind(errno: c_int) -> embedded_io::ErrorKind {
    match errno {
        1 | 13 => embedded_io::ErrorKind::PermissionDenied, // EPERM, EACCES
        2 | 19 => embedded_io::ErrorKind::NotFound,         // ENOENT, ENODEV
        9 | 22 => embedded_io::ErrorKind::InvalidInput,     // EBADF, EINVAL
        12 | 28 => embedded_io::ErrorKind::OutOfMemory,     // ENOMEM, ENOSPC
        14 => embedded_io::ErrorKind::InvalidData,          // EFAULT
        25 => embedded_io::ErrorKind::Unsupported,          // ENOTTY
        5 => embedded_io::ErrorKind::Other,                 // EIO
        _ => embedded_io::ErrorKind::Other,
    }
}

/// Convert a device error to `embedded_io::ErrorKind`
#[must_use]
pub fn device_error_kind(err: &DeviceError) -> embedded_io::ErrorKind {
    errno_to_error_kind(err.errno())
}

/// Convert error kind to a static string description
#[must_use]
pub fn error_kind_to_str(kind: embedded_io::ErrorKind) -> &'static str {
    match kind {
        embedded_io::ErrorKind::NotFound => "no such device",
        embedded_io::ErrorKind::PermissionDenied => "permission denied",
        embedded_io::ErrorKind::InvalidInput => "invalid argument",
        embedded_io::ErrorKind::InvalidData => "bad address",
        embedded_io::ErrorKind::Unsupported => "inappropriate ioctl for device",
        embedded_io::ErrorKind::OutOfMemory => "out of memory",
        embedded_io::ErrorKind::Interrupted => "interrupted",
        embedded_io::ErrorKind::Other => "other error",
        _ => "unknown error",
    }
}
