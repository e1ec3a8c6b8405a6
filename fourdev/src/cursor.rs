//! Per-handle position and seek arithmetic

use std::os::raw::c_int;

use crate::error::DeviceError;

/// Base of a seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Relative to offset 0
    Start = 0,
    /// Relative to the handle's position
    Current = 1,
    /// Relative to the shared high-water counter
    End = 2,
}

impl TryFrom<c_int> for Whence {
    type Error = DeviceError;

    fn try_from(value: c_int) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Start),
            1 => Ok(Self::Current),
            2 => Ok(Self::End),
            _ => Err(DeviceError::InvalidArgument),
        }
    }
}

/// Position of one open handle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pos: i64,
}

impl Cursor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn position(&self) -> i64 {
        self.pos
    }

    /// Move forward after a transfer of `count` bytes
    pub fn advance(&mut self, count: usize) {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        self.pos = self.pos.saturating_add(count);
    }

    /// Reposition the cursor
    ///
    /// The new position must lie in `[0, high_water]`; the capacity is not
    /// the ceiling.
    ///
    /// # Errors
    /// `InvalidArgument` if the position would be negative, beyond
    /// `high_water`, or not representable.
    pub fn seek(
        &mut self,
        whence: Whence,
        offset: i64,
        high_water: usize,
    ) -> Result<i64, DeviceError> {
        let ceiling = i64::try_from(high_water).map_err(|_| DeviceError::InvalidArgument)?;
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => self.pos,
            Whence::End => ceiling,
        };
        let candidate = base
            .checked_add(offset)
            .ok_or(DeviceError::InvalidArgument)?;

        if candidate < 0 || candidate > ceiling {
            return Err(DeviceError::InvalidArgument);
        }
        self.pos = candidate;
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whence_from_raw() {
        assert_eq!(Whence::try_from(0), Ok(Whence::Start));
        assert_eq!(Whence::try_from(1), Ok(Whence::Current));
        assert_eq!(Whence::try_from(2), Ok(Whence::End));
        assert_eq!(Whence::try_from(3), Err(DeviceError::InvalidArgument));
        assert_eq!(Whence::try_from(-1), Err(DeviceError::InvalidArgument));
    }

    #[test]
    fn test_seek_start_and_current() {
        let mut cursor = Cursor::new();
        assert_eq!(cursor.seek(Whence::Start, 0, 0), Ok(0));
        assert_eq!(cursor.seek(Whence::Current, 0, 0), Ok(0));

        assert_eq!(cursor.seek(Whence::Start, 4, 10), Ok(4));
        assert_eq!(cursor.seek(Whence::Current, 3, 10), Ok(7));
        assert_eq!(cursor.seek(Whence::Current, -7, 10), Ok(0));
    }

    #[test]
    fn test_seek_end_uses_high_water() {
        let mut cursor = Cursor::new();
        assert_eq!(cursor.seek(Whence::End, 0, 42), Ok(42));
        assert_eq!(cursor.seek(Whence::End, -2, 42), Ok(40));
    }

    #[test]
    fn test_seek_out_of_bounds_keeps_position() {
        let mut cursor = Cursor::new();
        cursor.seek(Whence::Start, 5, 10).unwrap();

        assert_eq!(
            cursor.seek(Whence::Start, 11, 10),
            Err(DeviceError::InvalidArgument)
        );
        assert_eq!(
            cursor.seek(Whence::Current, -6, 10),
            Err(DeviceError::InvalidArgument)
        );
        assert_eq!(
            cursor.seek(Whence::End, 1, 10),
            Err(DeviceError::InvalidArgument)
        );
        assert_eq!(
            cursor.seek(Whence::Current, i64::MAX, 10),
            Err(DeviceError::InvalidArgument)
        );
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn test_advance() {
        let mut cursor = Cursor::new();
        cursor.advance(3);
        cursor.advance(4);
        assert_eq!(cursor.position(), 7);
    }
}
