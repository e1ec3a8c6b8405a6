//! Control channel: a 60-byte message slot beside the storage
//!
//! Four operations are defined: probe, set, get and exchange. They never
//! touch the storage buffer or the high-water counter.
//!
//! Requests are normally built as [`ControlRequest`] values. For callers that
//! speak the ioctl dialect, [`decode_command`] validates a Linux-style command
//! word (nr, type, size and direction bit fields) and
//! [`ControlRequest::from_raw`] turns it plus an argument buffer into a
//! request.

use std::fmt;

use crate::error::DeviceError;
use crate::storage::logical_len;

/// Size of the control message in bytes
pub const MSG_SIZE: usize = 60;

/// Type tag of all control commands
pub const IOC_MAGIC: u8 = b'k';

/// Highest valid command number
pub const IOC_MAXNR: u32 = 4;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

// Commands carry a pointer argument; the size field records its width.
#[allow(clippy::cast_possible_truncation)]
const IOC_ARG_SIZE: u32 = std::mem::size_of::<*const u8>() as u32;

/// Transfer direction, seen from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    None = 0,
    /// Caller writes to the device
    Write = 1,
    /// Caller reads from the device
    Read = 2,
    ReadWrite = 3,
}

/// Control operation numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Probe = 1,
    SetMessage = 2,
    GetMessage = 3,
    ExchangeMessage = 4,
}

impl Opcode {
    #[must_use]
    pub fn direction(self) -> Direction {
        match self {
            Self::Probe => Direction::None,
            Self::SetMessage => Direction::Write,
            Self::GetMessage => Direction::Read,
            Self::ExchangeMessage => Direction::ReadWrite,
        }
    }

    /// The command word a C caller passes to `ioctl`
    #[must_use]
    pub fn command(self) -> u32 {
        let size = match self.direction() {
            Direction::None => 0,
            _ => IOC_ARG_SIZE,
        };
        ((self.direction() as u32) << IOC_DIRSHIFT)
            | (u32::from(IOC_MAGIC) << IOC_TYPESHIFT)
            | ((self as u32) << IOC_NRSHIFT)
            | (size << IOC_SIZESHIFT)
    }

    /// Whether the operation moves a message in either direction
    #[must_use]
    pub fn carries_message(self) -> bool {
        self.direction() != Direction::None
    }
}

impl TryFrom<u32> for Opcode {
    type Error = DeviceError;

    fn try_from(nr: u32) -> Result<Self, Self::Error> {
        match nr {
            1 => Ok(Self::Probe),
            2 => Ok(Self::SetMessage),
            3 => Ok(Self::GetMessage),
            4 => Ok(Self::ExchangeMessage),
            _ => Err(DeviceError::NotSupported(nr)),
        }
    }
}

/// Validate a command word and return its operation
///
/// # Errors
/// `NotSupported` if the type tag is not [`IOC_MAGIC`], the number is outside
/// `1..=IOC_MAXNR`, or the direction or size bits differ from the ones the
/// operation is defined with.
pub fn decode_command(cmd: u32) -> Result<Opcode, DeviceError> {
    let kind = (cmd >> IOC_TYPESHIFT) & ((1 << IOC_TYPEBITS) - 1);
    let nr = (cmd >> IOC_NRSHIFT) & ((1 << IOC_NRBITS) - 1);

    if kind != u32::from(IOC_MAGIC) || nr > IOC_MAXNR {
        return Err(DeviceError::NotSupported(cmd));
    }
    let opcode = Opcode::try_from(nr).map_err(|_| DeviceError::NotSupported(cmd))?;
    if opcode.command() != cmd {
        return Err(DeviceError::NotSupported(cmd));
    }
    Ok(opcode)
}

/// Fixed-size control message
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Message([u8; MSG_SIZE]);

impl Message {
    #[must_use]
    pub const fn zeroed() -> Self {
        Self([0; MSG_SIZE])
    }

    /// Build a message from `bytes`, zero-padded
    ///
    /// Anything past `MSG_SIZE` bytes is dropped.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut msg = Self::zeroed();
        let n = bytes.len().min(MSG_SIZE);
        msg.0[..n].copy_from_slice(&bytes[..n]);
        msg
    }

    /// Copy a message in from a caller-supplied argument buffer
    ///
    /// # Errors
    /// `IoFault` if `arg` is shorter than `MSG_SIZE`.
    pub fn from_arg(arg: &[u8]) -> Result<Self, DeviceError> {
        let src = arg.get(..MSG_SIZE).ok_or(DeviceError::IoFault)?;
        Ok(Self::from_bytes(src))
    }

    /// Copy the message out to a caller-supplied argument buffer
    ///
    /// # Errors
    /// `IoFault` if `arg` is shorter than `MSG_SIZE`.
    pub fn copy_to_arg(&self, arg: &mut [u8]) -> Result<(), DeviceError> {
        let dst = arg.get_mut(..MSG_SIZE).ok_or(DeviceError::IoFault)?;
        dst.copy_from_slice(&self.0);
        Ok(())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; MSG_SIZE] {
        &self.0
    }

    /// Bytes up to the first terminator
    #[must_use]
    pub fn text(&self) -> &[u8] {
        &self.0[..logical_len(&self.0)]
    }

    #[must_use]
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(self.text()).into_owned()
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Message").field(&self.text_lossy()).finish()
    }
}

/// A control operation together with its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    Probe,
    SetMessage(Message),
    GetMessage,
    ExchangeMessage(Message),
}

impl ControlRequest {
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Probe => Opcode::Probe,
            Self::SetMessage(_) => Opcode::SetMessage,
            Self::GetMessage => Opcode::GetMessage,
            Self::ExchangeMessage(_) => Opcode::ExchangeMessage,
        }
    }

    /// Build a request from a command word and its argument buffer
    ///
    /// The argument is checked before anything is dispatched, so a short
    /// buffer fails without effect.
    ///
    /// # Errors
    /// - `NotSupported` for an invalid command word
    /// - `IoFault` if a message-carrying command gets fewer than `MSG_SIZE`
    ///   bytes of argument
    pub fn from_raw(cmd: u32, arg: &[u8]) -> Result<Self, DeviceError> {
        let opcode = decode_command(cmd)?;
        if opcode.carries_message() && arg.len() < MSG_SIZE {
            return Err(DeviceError::IoFault);
        }
        Ok(match opcode {
            Opcode::Probe => Self::Probe,
            Opcode::SetMessage => Self::SetMessage(Message::from_arg(arg)?),
            Opcode::GetMessage => Self::GetMessage,
            Opcode::ExchangeMessage => Self::ExchangeMessage(Message::from_arg(arg)?),
        })
    }
}

/// Result of a control operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlResponse {
    /// Operation done, nothing to return
    Ack,
    /// A copy of the stored message (for exchange: the previous one)
    Message(Message),
}

impl ControlResponse {
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Ack => None,
            Self::Message(msg) => Some(msg),
        }
    }
}

/// The message slot
pub struct ControlChannel {
    message: Box<[u8; MSG_SIZE]>,
}

impl ControlChannel {
    /// Allocate the message slot
    ///
    /// # Errors
    /// `OutOfMemory` if the slot cannot be allocated.
    pub fn allocate() -> Result<Self, DeviceError> {
        let mut slot = Vec::new();
        slot.try_reserve_exact(MSG_SIZE)
            .map_err(|_| DeviceError::OutOfMemory(MSG_SIZE))?;
        slot.resize(MSG_SIZE, 0);
        let message: Box<[u8; MSG_SIZE]> = slot
            .into_boxed_slice()
            .try_into()
            .map_err(|_| DeviceError::OutOfMemory(MSG_SIZE))?;
        Ok(Self { message })
    }

    #[must_use]
    pub fn message(&self) -> Message {
        Message(*self.message)
    }

    pub fn handle(&mut self, request: ControlRequest) -> ControlResponse {
        match request {
            ControlRequest::Probe => {
                log::warn!("ioctl: hello");
                ControlResponse::Ack
            }
            ControlRequest::SetMessage(msg) => {
                *self.message = msg.0;
                log::info!("ioctl: set message {:?}", msg.text_lossy());
                ControlResponse::Ack
            }
            ControlRequest::GetMessage => {
                let msg = self.message();
                log::info!("ioctl: get message {:?}", msg.text_lossy());
                ControlResponse::Message(msg)
            }
            ControlRequest::ExchangeMessage(msg) => {
                let previous = self.message();
                *self.message = msg.0;
                log::info!(
                    "ioctl: exchange message {:?} -> {:?}",
                    previous.text_lossy(),
                    msg.text_lossy()
                );
                ControlResponse::Message(previous)
            }
        }
    }
}

impl fmt::Debug for ControlChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlChannel")
            .field("message", &self.message())
            .finish()
    }
}
