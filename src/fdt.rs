//! Seam towards the flattened device tree handed to the next boot stage.

use core::fmt;

use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Failure reported by a device-tree buffer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FdtError {
    /// Not enough free space in the buffer.
    NoSpace,
    /// Buffer is not in a state that permits the operation.
    BadState,
    /// Buffer does not hold a device tree.
    BadMagic,
    /// Any other library error, by its code.
    Other(i32),
}

impl FdtError {
    /// Negative libfdt-style error code.
    pub fn code(&self) -> i32 {
        match self {
            FdtError::NoSpace => -3,
            FdtError::BadState => -7,
            FdtError::BadMagic => -9,
            FdtError::Other(code) => *code,
        }
    }
}

impl fmt::Display for FdtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FdtError::NoSpace => f.write_str("FDT_ERR_NOSPACE"),
            FdtError::BadState => f.write_str("FDT_ERR_BADSTATE"),
            FdtError::BadMagic => f.write_str("FDT_ERR_BADMAGIC"),
            FdtError::Other(code) => write!(f, "error {}", code),
        }
    }
}

/// Entry of the memory reservation block.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MemReservation {
    pub address: u64,
    pub size: u64,
}

/// An in-memory device tree that board fixups may modify.
pub trait FdtBuffer {
    /// Append an entry to the memory reservation block.
    fn add_mem_rsv(&mut self, address: u64, size: u64) -> Result<(), FdtError>;
}

/// Memory reservation block with room for `N` entries.
#[derive(Debug, Default)]
pub struct MemReserveMap<const N: usize> {
    entries: Vec<MemReservation, N>,
}

impl<const N: usize> MemReserveMap<N> {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn reservations(&self) -> &[MemReservation] {
        &self.entries
    }

    pub fn free(&self) -> usize {
        N - self.entries.len()
    }
}

impl<const N: usize> FdtBuffer for MemReserveMap<N> {
    fn add_mem_rsv(&mut self, address: u64, size: u64) -> Result<(), FdtError> {
        self.entries
            .push(MemReservation { address, size })
            .map_err(|_| FdtError::NoSpace)
    }
}
