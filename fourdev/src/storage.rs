//! Fixed-capacity byte storage
//!
//! The buffer is treated as a null-terminated string: its logical length is
//! the length of the terminator-free run starting at index 0, no matter where
//! a read begins. A terminator written anywhere hides everything after it.
//!
//! Storage also keeps the high-water counter: every write adds the number of
//! bytes it stored, every read subtracts the number of bytes it returned. The
//! counter is clamped to `[0, capacity]` and is not a count of stored bytes.

use crate::error::DeviceError;

/// Capacity of the device storage in bytes
pub const CAPACITY: usize = 4_194_304;

/// Byte that ends the logical content of the buffer
pub const TERMINATOR: u8 = 0;

/// Length of the terminator-free run starting at index 0 of `data`
///
/// Bounded by `data.len()` when no terminator is present.
#[must_use]
pub fn logical_len(data: &[u8]) -> usize {
    data.iter()
        .position(|&b| b == TERMINATOR)
        .unwrap_or(data.len())
}

/// Zero-initialized buffer plus the high-water counter
pub struct Storage {
    data: Vec<u8>,
    high_water: usize,
}

impl Storage {
    /// Allocate a zeroed buffer of `capacity` bytes
    ///
    /// # Errors
    /// `OutOfMemory` if the allocation cannot be satisfied.
    pub fn allocate(capacity: usize) -> Result<Self, DeviceError> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| DeviceError::OutOfMemory(capacity))?;
        data.resize(capacity, 0);
        Ok(Self {
            data,
            high_water: 0,
        })
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    #[must_use]
    pub fn logical_len(&self) -> usize {
        logical_len(&self.data)
    }

    /// Raw view of the whole buffer, terminators included
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn index(&self, offset: i64) -> Option<usize> {
        usize::try_from(offset)
            .ok()
            .filter(|&idx| idx < self.data.len())
    }

    /// Store `src` at `offset`, truncated at capacity
    ///
    /// Returns the number of bytes stored. A terminator follows the stored
    /// bytes unless they reach the end of the buffer.
    ///
    /// # Errors
    /// `InvalidOffset` if `offset` is negative or not below capacity. Nothing
    /// is changed in that case.
    pub fn write_at(&mut self, offset: i64, src: &[u8]) -> Result<usize, DeviceError> {
        let Some(start) = self.index(offset) else {
            return Err(DeviceError::InvalidOffset(offset));
        };

        let capacity = self.capacity();
        let count = src.len().min(capacity - start);
        let end = start + count;
        self.data[start..end].copy_from_slice(&src[..count]);

        self.high_water = self.high_water.saturating_add(count).min(capacity);

        if end < capacity {
            self.data[end] = TERMINATOR;
        }
        Ok(count)
    }

    /// Copy bytes starting at `offset` into `dst`
    ///
    /// Returns 0 (end of file) if `offset` is outside the buffer, points at a
    /// terminator, or lies past the logical length.
    pub fn read_at(&mut self, offset: i64, dst: &mut [u8]) -> usize {
        let Some(start) = self.index(offset) else {
            return 0;
        };
        if self.data[start] == TERMINATOR {
            return 0;
        }

        let available = self.logical_len().saturating_sub(start);
        let count = dst.len().min(available);
        dst[..count].copy_from_slice(&self.data[start..start + count]);

        self.high_water = self.high_water.saturating_sub(count);
        count
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("capacity", &self.capacity())
            .field("high_water", &self.high_water)
            .field("logical_len", &self.logical_len())
            .finish()
    }
}
