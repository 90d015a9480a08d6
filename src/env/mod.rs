//! Ordered discovery of where the persisted environment lives.
//!
//! The boot core asks for the backend at priority 0, 1, 2, ... until it finds one it can use or
//! receives [`EnvLocation::Unknown`], at which point it falls back to the built-in default
//! environment.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Storage backend from which the environment may be loaded.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EnvLocation {
    /// No (more) location at the requested priority.
    Unknown,
    Eeprom,
    Ext4,
    Fat,
    Flash,
    Mmc,
    Nand,
    Nvram,
    Onenand,
    Remote,
    SpiFlash,
    Ubi,
    /// Environment is never persisted; defaults are used.
    Nowhere,
}

impl EnvLocation {
    /// Name of the driver serving this location.
    pub const fn name(self) -> &'static str {
        match self {
            EnvLocation::Unknown => "unknown",
            EnvLocation::Eeprom => "EEPROM",
            EnvLocation::Ext4 => "EXT4",
            EnvLocation::Fat => "FAT",
            EnvLocation::Flash => "Flash",
            EnvLocation::Mmc => "MMC",
            EnvLocation::Nand => "NAND",
            EnvLocation::Nvram => "NVRAM",
            EnvLocation::Onenand => "OneNAND",
            EnvLocation::Remote => "Remote",
            EnvLocation::SpiFlash => "SPIFlash",
            EnvLocation::Ubi => "UBI",
            EnvLocation::Nowhere => "nowhere",
        }
    }
}

impl fmt::Display for EnvLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the boot core intends to do with the environment.
///
/// Part of the query contract; the sandbox order is the same for every operation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EnvOperation {
    Init,
    Load,
    Save,
    Erase,
}

/// Fixed priority order of environment backends.
///
/// The first entry is the platform default. The order never changes once built.
#[derive(Clone, Copy, Debug)]
pub struct LocationPriority(&'static [EnvLocation]);

/// Sandbox order: nowhere first so that tests start from the default environment.
pub const SANDBOX_LOCATIONS: LocationPriority =
    LocationPriority::new(&[EnvLocation::Nowhere, EnvLocation::Ext4, EnvLocation::Fat]).unwrap();

impl LocationPriority {
    /// Build a priority order. Returns `None` if it is empty or lists [`EnvLocation::Unknown`],
    /// which is reserved to mark the end of the order.
    pub const fn new(locations: &'static [EnvLocation]) -> Option<Self> {
        if locations.is_empty() {
            return None;
        }

        let mut i = 0;
        while i < locations.len() {
            if matches!(locations[i], EnvLocation::Unknown) {
                return None;
            }
            i += 1;
        }

        Some(Self(locations))
    }

    /// Backend at priority `prio`, or [`EnvLocation::Unknown`] past the end.
    pub fn get(&self, _op: EnvOperation, prio: usize) -> EnvLocation {
        self.0.get(prio).copied().unwrap_or(EnvLocation::Unknown)
    }

    pub fn default_location(&self) -> EnvLocation {
        self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Walk the order like the boot core does, returning the first backend `usable` accepts.
    ///
    /// `None` means every backend was rejected and the built-in environment applies.
    pub fn first_usable(
        &self,
        op: EnvOperation,
        mut usable: impl FnMut(EnvLocation) -> bool,
    ) -> Option<EnvLocation> {
        (0..)
            .map(|prio| self.get(op, prio))
            .take_while(|location| *location != EnvLocation::Unknown)
            .find(|location| usable(*location))
    }
}
