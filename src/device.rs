//! Seam towards the driver-model device registry.

use core::fmt;

/// Class of devices a board may look up.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UclassId {
    CrosEc,
}

/// Why a device lookup failed.
///
/// The first two are kept apart because late init treats them differently.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LookupError {
    /// The class was never configured in this build.
    NotConfigured,
    /// The class is configured, but no device of it exists.
    NotFound,
    /// A device exists but failed to probe, with the driver's error code.
    Probe(i32),
}

impl LookupError {
    /// Negative errno-style code, as printed in diagnostics.
    pub fn errno(&self) -> i32 {
        match self {
            LookupError::NotConfigured => -19,
            LookupError::NotFound => -2,
            LookupError::Probe(code) => *code,
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.errno())
    }
}

/// Registry of probed devices, organised by class.
pub trait DeviceRegistry {
    type Device;

    /// First device of class `id`, probed and ready.
    fn first_device_err(&mut self, id: UclassId) -> Result<Self::Device, LookupError>;
}

/// Driver declared statically by the board, bound without a device tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DriverInfo {
    pub name: &'static str,
}
