//! The device and its open handles
//!
//! A [`Device`] owns the storage buffer, the high-water counter and the
//! control message. Handles keep an `Arc` to the device and own nothing but
//! their cursor.
//!
//! # Thread Safety
//!
//! Storage and control message each sit behind a `parking_lot::Mutex`, so a
//! single read, write, seek or control call is never torn. Nothing ties calls
//! together, though:
//!
//! - Handles share the high-water counter. A position obtained by seeking
//!   from the end can be out of date by the time the same handle reads,
//!   because another handle's read or write moved the counter in between.
//! - Exchange returns the previous message and stores the new one under one
//!   lock, but a set from another handle may land right before or after it.
//!
//! Callers that need sequences of operations to be consistent must serialize
//! them themselves.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::control::{ControlChannel, ControlRequest, ControlResponse};
use crate::cursor::{Cursor, Whence};
use crate::error::DeviceError;
use crate::idgen::{HandleId, IdGen};
use crate::storage::{Storage, CAPACITY};

/// Name used in log lines
pub const DEV_NAME: &str = "four";

pub struct Device {
    storage: Mutex<Option<Storage>>,
    control: Mutex<Option<ControlChannel>>,
    idgen: IdGen,
}

impl Device {
    /// Allocate the storage buffer and the message slot
    ///
    /// # Errors
    /// `OutOfMemory` if either allocation fails. Whatever was already
    /// allocated is released before the error is returned.
    pub fn new() -> Result<Arc<Self>, DeviceError> {
        let storage = Storage::allocate(CAPACITY)?;
        let control = match ControlChannel::allocate() {
            Ok(control) => control,
            Err(e) => {
                drop(storage);
                log::warn!("{DEV_NAME}: cannot allocate message slot: {e}");
                return Err(e);
            }
        };

        log::info!("This is a 4MB device module");
        Ok(Arc::new(Self {
            storage: Mutex::new(Some(storage)),
            control: Mutex::new(Some(control)),
            idgen: IdGen::new(),
        }))
    }

    /// Release the storage buffer and the message slot
    ///
    /// Can be called multiple times. Afterwards every operation except
    /// `open` and `close` fails with `NoDevice`.
    pub fn teardown(&self) {
        let storage = self.storage.lock().take();
        let control = self.control.lock().take();
        if storage.is_some() || control.is_some() {
            log::info!("{DEV_NAME} device module is unloaded");
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.storage.lock().is_some()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        CAPACITY
    }

    /// Open a new handle positioned at offset 0
    #[must_use]
    pub fn open(self: &Arc<Self>) -> Handle {
        let id = self.idgen.get_next();
        log::debug!("{DEV_NAME}: open {id}");
        Handle {
            id,
            device: Arc::clone(self),
            cursor: Cursor::new(),
        }
    }

    fn with_storage<R>(&self, f: impl FnOnce(&mut Storage) -> R) -> Result<R, DeviceError> {
        let mut guard = self.storage.lock();
        let storage = guard.as_mut().ok_or(DeviceError::NoDevice)?;
        Ok(f(storage))
    }

    /// Current value of the high-water counter
    ///
    /// # Errors
    /// `NoDevice` after teardown.
    pub fn high_water(&self) -> Result<usize, DeviceError> {
        self.with_storage(|storage| storage.high_water())
    }

    /// Length of the terminator-free run at the start of the buffer
    ///
    /// # Errors
    /// `NoDevice` after teardown.
    pub fn logical_len(&self) -> Result<usize, DeviceError> {
        self.with_storage(|storage| storage.logical_len())
    }

    /// Store `data` at `offset`, see [`Storage::write_at`]
    ///
    /// # Errors
    /// - `InvalidOffset` if `offset` is outside `[0, capacity)`
    /// - `NoDevice` after teardown
    pub fn write_at(&self, offset: i64, data: &[u8]) -> Result<usize, DeviceError> {
        let result = self.with_storage(|storage| storage.write_at(offset, data))?;
        match result {
            Ok(n) => log::debug!("{DEV_NAME}: write done, {n} bytes at {offset}"),
            Err(_) => log::info!("{DEV_NAME}: end of file"),
        }
        result
    }

    /// Copy bytes at `offset` into `buf`, see [`Storage::read_at`]
    ///
    /// # Errors
    /// `NoDevice` after teardown. End of file is `Ok(0)`.
    pub fn read_at(&self, offset: i64, buf: &mut [u8]) -> Result<usize, DeviceError> {
        let n = self.with_storage(|storage| storage.read_at(offset, buf))?;
        if n == 0 {
            log::info!("{DEV_NAME}: end of file");
        } else {
            log::debug!("{DEV_NAME}: read done, {n} bytes at {offset}");
        }
        Ok(n)
    }

    /// Run a control operation
    ///
    /// # Errors
    /// `NoDevice` after teardown.
    pub fn control(&self, request: ControlRequest) -> Result<ControlResponse, DeviceError> {
        let mut guard = self.control.lock();
        let channel = guard.as_mut().ok_or(DeviceError::NoDevice)?;
        Ok(channel.handle(request))
    }

    /// Run a control operation given as a command word
    ///
    /// `arg` holds the message for set and exchange, and receives the
    /// message for get and exchange.
    ///
    /// # Errors
    /// - `NotSupported` for an invalid command word
    /// - `IoFault` if a message-carrying command gets a short `arg`
    /// - `NoDevice` after teardown
    pub fn ioctl(&self, cmd: u32, arg: &mut [u8]) -> Result<(), DeviceError> {
        let request = ControlRequest::from_raw(cmd, arg).inspect_err(|e| {
            log::debug!("{DEV_NAME}: ioctl {cmd:#010x} rejected: {e}");
        })?;
        if let ControlResponse::Message(msg) = self.control(request)? {
            msg.copy_to_arg(arg)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("storage", &*self.storage.lock())
            .field("control", &*self.control.lock())
            .finish()
    }
}

/// One open view of the device with its own position
pub struct Handle {
    id: HandleId,
    device: Arc<Device>,
    cursor: Cursor,
}

impl Handle {
    #[must_use]
    pub fn id(&self) -> HandleId {
        self.id
    }

    #[must_use]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    #[must_use]
    pub fn position(&self) -> i64 {
        self.cursor.position()
    }

    /// Read at the current position and advance past the returned bytes
    ///
    /// # Errors
    /// `NoDevice` after teardown. End of file is `Ok(0)`.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, DeviceError> {
        let n = self.device.read_at(self.cursor.position(), buf)?;
        self.cursor.advance(n);
        Ok(n)
    }

    /// Write at the current position and advance past the stored bytes
    ///
    /// # Errors
    /// - `InvalidOffset` if the position is at or past the capacity
    /// - `NoDevice` after teardown
    pub fn write(&mut self, data: &[u8]) -> Result<usize, DeviceError> {
        let n = self.device.write_at(self.cursor.position(), data)?;
        self.cursor.advance(n);
        Ok(n)
    }

    /// Reposition within `[0, high-water]`
    ///
    /// # Errors
    /// - `InvalidArgument` if the target is out of bounds
    /// - `NoDevice` after teardown
    pub fn seek(&mut self, whence: Whence, offset: i64) -> Result<i64, DeviceError> {
        let high_water = self.device.high_water()?;
        let pos = self.cursor.seek(whence, offset, high_water)?;
        log::debug!("{DEV_NAME}: {} seek to {pos}", self.id);
        Ok(pos)
    }

    /// Seek with a raw `whence` value (0, 1 or 2)
    ///
    /// # Errors
    /// `InvalidArgument` for any other `whence`, or as [`Handle::seek`].
    pub fn lseek(&mut self, offset: i64, whence: std::os::raw::c_int) -> Result<i64, DeviceError> {
        self.seek(Whence::try_from(whence)?, offset)
    }

    /// See [`Device::control`]
    ///
    /// # Errors
    /// `NoDevice` after teardown.
    pub fn control(&self, request: ControlRequest) -> Result<ControlResponse, DeviceError> {
        self.device.control(request)
    }

    /// See [`Device::ioctl`]
    ///
    /// # Errors
    /// As [`Device::ioctl`].
    pub fn ioctl(&self, cmd: u32, arg: &mut [u8]) -> Result<(), DeviceError> {
        self.device.ioctl(cmd, arg)
    }

    /// Release the handle. Always succeeds.
    pub fn close(self) {}
}

impl Drop for Handle {
    fn drop(&mut self) {
        log::debug!("{DEV_NAME}: release {}", self.id);
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("pos", &self.cursor.position())
            .finish()
    }
}
