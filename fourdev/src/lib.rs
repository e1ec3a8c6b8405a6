//! `four`: a 4 MiB in-memory byte device with a control channel
//!
//! ```
//! use fourdev::{Device, Whence};
//!
//! let device = Device::new().unwrap();
//! let mut handle = device.open();
//! handle.write(b"hello").unwrap();
//!
//! handle.seek(Whence::Start, 0).unwrap();
//! let mut buf = [0u8; 16];
//! let n = handle.read(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"hello");
//! ```

pub mod control;
pub mod cursor;
pub mod device;
pub mod error;
pub mod idgen;
pub mod storage;

// Re-export the public surface for convenience
pub use control::{ControlRequest, ControlResponse, Message, Opcode, MSG_SIZE};
pub use cursor::Whence;
pub use device::{Device, Handle, DEV_NAME};
pub use error::DeviceError;
pub use idgen::HandleId;
pub use storage::CAPACITY;
