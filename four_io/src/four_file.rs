//! File-like access to the device.
//!
//! `FourFile` wraps a device handle and implements the [`embedded_io::Read`],
//! [`embedded_io::Write`] and [`embedded_io::Seek`] traits. It also offers the
//! four control operations, issued through the same command words a C client
//! would pass to `ioctl`.
//!
//! # Example
//! ```
//! use embedded_io::{Read, Seek, SeekFrom, Write};
//! use four_io::FourFile;
//! use fourdev::Device;
//!
//! let device = Device::new().unwrap();
//! let mut file = FourFile::open(&device);
//! file.write(b"Hello, world!").unwrap();
//!
//! file.seek(SeekFrom::Start(0)).unwrap();
//! let mut buf = [0u8; 32];
//! let n = file.read(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"Hello, world!");
//! file.close();
//! ```

use embedded_io::{ErrorKind, SeekFrom};
use fourdev::{Device, Handle, Message, Opcode, MSG_SIZE};
use std::sync::Arc;

use crate::error_mapping::device_error_kind;

pub struct FourFile {
    handle: Option<Handle>,
}

impl FourFile {
    /// Open the device. Always succeeds.
    #[must_use]
    pub fn open(device: &Arc<Device>) -> Self {
        Self {
            handle: Some(device.open()),
        }
    }

    /// Close the file.
    /// Can be called multiple times.
    /// "drop" will call "close" automatically.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
    }

    fn handle(&mut self) -> Result<&mut Handle, ErrorKind> {
        // EBADF
        self.handle.as_mut().ok_or(ErrorKind::InvalidInput)
    }

    /// Issue a raw control command.
    ///
    /// # Errors
    /// Returns the mapped device error.
    pub fn ioctl(&mut self, cmd: u32, arg: &mut [u8]) -> Result<(), ErrorKind> {
        self.handle()?
            .ioctl(cmd, arg)
            .map_err(|e| device_error_kind(&e))
    }

    /// Ask the device to acknowledge the control channel.
    ///
    /// # Errors
    /// Returns the mapped device error.
    pub fn hello(&mut self) -> Result<(), ErrorKind> {
        self.ioctl(Opcode::Probe.command(), &mut [])
    }

    /// Replace the device message.
    ///
    /// # Errors
    /// Returns the mapped device error.
    pub fn set_message(&mut self, msg: &Message) -> Result<(), ErrorKind> {
        let mut arg = *msg.as_bytes();
        self.ioctl(Opcode::SetMessage.command(), &mut arg)
    }

    /// Fetch a copy of the device message.
    ///
    /// # Errors
    /// Returns the mapped device error.
    pub fn get_message(&mut self) -> Result<Message, ErrorKind> {
        let mut arg = [0u8; MSG_SIZE];
        self.ioctl(Opcode::GetMessage.command(), &mut arg)?;
        Ok(Message::from_bytes(&arg))
    }

    /// Store `msg` as the device message; on return `msg` holds the
    /// previous one.
    ///
    /// # Errors
    /// Returns the mapped device error. `msg` is unchanged on error.
    pub fn exchange_message(&mut self, msg: &mut Message) -> Result<(), ErrorKind> {
        let mut arg = *msg.as_bytes();
        self.ioctl(Opcode::ExchangeMessage.command(), &mut arg)?;
        *msg = Message::from_bytes(&arg);
        Ok(())
    }
}

impl Drop for FourFile {
    fn drop(&mut self) {
        self.close();
    }
}

impl embedded_io::ErrorType for FourFile {
    type Error = ErrorKind;
}

impl embedded_io::Read for FourFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(0);
        };
        handle.read(buf).map_err(|e| device_error_kind(&e))
    }
}

impl embedded_io::Write for FourFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.handle()?
            .write(buf)
            .map_err(|e| device_error_kind(&e))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl embedded_io::Seek for FourFile {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        let handle = self.handle()?;
        let result = match pos {
            SeekFrom::Start(offset) => {
                let offset = i64::try_from(offset).map_err(|_| ErrorKind::InvalidInput)?;
                handle.seek(fourdev::Whence::Start, offset)
            }
            SeekFrom::Current(offset) => handle.seek(fourdev::Whence::Current, offset),
            SeekFrom::End(offset) => handle.seek(fourdev::Whence::End, offset),
        };
        let pos = result.map_err(|e| device_error_kind(&e))?;
        u64::try_from(pos).map_err(|_| ErrorKind::InvalidInput)
    }
}

impl core::fmt::Debug for FourFile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FourFile")
            .field("handle", &self.handle)
            .finish()
    }
}
