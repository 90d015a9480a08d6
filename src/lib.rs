//! Board support for the emulated sandbox target, tailored to host-side testing of a bootloader
//! core.
//!
//! Nothing here touches real silicon. The board answers the handful of questions a boot core asks
//! of a platform (how much RAM, what time is it, where does the environment live, what can be
//! updated, which expansion boards are attached) deterministically, so that tests are reproducible.
#![no_std]

use core::fmt;

pub mod board;
pub mod boot;
#[cfg(feature = "capsule")]
pub mod capsule;
pub mod device;
pub mod env;
#[cfg(feature = "extension")]
pub mod extension;
pub mod fdt;
pub mod timer;

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(test)]
mod mock;

pub use board::{Board, GlobalData, Sandbox, SandboxConfig};
pub use env::{EnvLocation, EnvOperation, LocationPriority};
pub use timer::{Counter, HostClock};

#[cfg(feature = "capsule")]
use capsule::CapsuleError;
use fdt::FdtError;

/// Unrecoverable condition raised by a boot hook.
///
/// A hook never halts the process itself; it returns this and the boot driver decides how to stop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fatal {
    reason: &'static str,
}

impl Fatal {
    pub const fn new(reason: &'static str) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Error {
    /// A record could not be allocated or appended.
    OutOfMemory,
    /// Failure reported by the device-tree buffer, passed through untouched.
    Fdt(FdtError),
    #[cfg(feature = "capsule")]
    Capsule(CapsuleError),
    /// The boot must not continue.
    Fatal(Fatal),
}

impl Error {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfMemory => f.write_str("out of memory"),
            Error::Fdt(e) => write!(f, "device tree: {} ({})", e, e.code()),
            #[cfg(feature = "capsule")]
            Error::Capsule(e) => write!(f, "capsule: {}", e),
            Error::Fatal(e) => write!(f, "fatal: {}", e),
        }
    }
}

impl From<FdtError> for Error {
    fn from(e: FdtError) -> Self {
        Error::Fdt(e)
    }
}

#[cfg(feature = "capsule")]
impl From<CapsuleError> for Error {
    fn from(e: CapsuleError) -> Self {
        Error::Capsule(e)
    }
}

impl From<Fatal> for Error {
    fn from(e: Fatal) -> Self {
        Error::Fatal(e)
    }
}
