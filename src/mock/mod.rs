use core::cell::Cell;
#[cfg(feature = "capsule")]
use std::vec::Vec;

#[cfg(feature = "capsule")]
use embedded_storage_async::nor_flash::{ErrorType, NorFlash, NorFlashErrorKind, ReadNorFlash};

#[cfg(feature = "late-init")]
use crate::device::{DeviceRegistry, LookupError, UclassId};
use crate::timer::HostClock;

/// Host clock that only moves when told to.
pub struct MockClock(Cell<u64>);

impl MockClock {
    pub const fn new() -> Self {
        MockClock(Cell::new(0))
    }

    pub fn advance(&self, nanos: u64) {
        self.0.set(self.0.get() + nanos);
    }
}

impl HostClock for MockClock {
    fn nanos(&self) -> u64 {
        self.0.get()
    }
}

#[cfg(feature = "late-init")]
#[derive(Debug, PartialEq)]
pub struct MockEc;

/// Registry whose embedded controller lookup gives a preset answer.
#[cfg(feature = "late-init")]
pub struct MockRegistry {
    pub cros_ec: Result<(), LookupError>,
    pub lookups: usize,
}

#[cfg(feature = "late-init")]
impl MockRegistry {
    pub const fn new(cros_ec: Result<(), LookupError>) -> Self {
        MockRegistry {
            cros_ec,
            lookups: 0,
        }
    }
}

#[cfg(feature = "late-init")]
impl DeviceRegistry for MockRegistry {
    type Device = MockEc;

    fn first_device_err(&mut self, id: UclassId) -> Result<MockEc, LookupError> {
        self.lookups += 1;
        match id {
            UclassId::CrosEc => self.cros_ec.map(|()| MockEc),
        }
    }
}

/// NOR flash in memory: erase sets bytes to 0xff, writes can only clear bits.
#[cfg(feature = "capsule")]
pub struct MockFlash {
    pub data: Vec<u8>,
}

#[cfg(feature = "capsule")]
impl MockFlash {
    pub fn new(capacity: usize) -> Self {
        MockFlash {
            data: std::vec![0; capacity],
        }
    }

    fn range(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>, NorFlashErrorKind> {
        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        Ok(start..end)
    }
}

#[cfg(feature = "capsule")]
impl ErrorType for MockFlash {
    type Error = NorFlashErrorKind;
}

#[cfg(feature = "capsule")]
impl ReadNorFlash for MockFlash {
    const READ_SIZE: usize = 1;

    async fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

#[cfg(feature = "capsule")]
impl NorFlash for MockFlash {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = 4096;

    async fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if from as usize % Self::ERASE_SIZE != 0 || to as usize % Self::ERASE_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        let range = self.range(from, (to - from) as usize)?;
        self.data[range].fill(0xff);
        Ok(())
    }

    async fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if offset as usize % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        let range = self.range(offset, bytes.len())?;
        for (cell, byte) in self.data[range].iter_mut().zip(bytes) {
            *cell &= *byte;
        }
        Ok(())
    }
}
