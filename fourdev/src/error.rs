//! Errors reported by the device
//!
//! Every variant corresponds to a classic errno value so that callers
//! speaking the POSIX dialect (see `four_io`) can translate losslessly.

use std::os::raw::c_int;

pub const EINVAL: c_int = 22;
pub const ENOMEM: c_int = 12;
pub const EFAULT: c_int = 14;
pub const ENOTTY: c_int = 25;
pub const ENODEV: c_int = 19;

/// Error type for device operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Write target outside `[0, capacity)`
    #[error("offset {0} is outside the device")]
    InvalidOffset(i64),

    /// Unknown seek base or a computed position outside `[0, high-water]`
    #[error("invalid argument")]
    InvalidArgument,

    /// Storage or message buffer could not be allocated
    #[error("cannot allocate {0} bytes")]
    OutOfMemory(usize),

    /// Transfer across the caller boundary failed
    #[error("bad address")]
    IoFault,

    /// Unknown or malformed control command
    #[error("control command {0:#010x} is not supported")]
    NotSupported(u32),

    /// The device has been torn down
    #[error("no such device")]
    NoDevice,
}

impl DeviceError {
    /// The errno value a character device returns for this error
    #[must_use]
    pub fn errno(&self) -> c_int {
        match self {
            Self::InvalidOffset(_) | Self::InvalidArgument => EINVAL,
            Self::OutOfMemory(_) => ENOMEM,
            Self::IoFault => EFAULT,
            Self::NotSupported(_) => ENOTTY,
            Self::NoDevice => ENODEV,
        }
    }
}
