//! Hooks the boot core calls at fixed stages, and the optional capabilities a board may offer.
//!
//! Optional subsystems are separate traits, implemented only when the matching Cargo feature is
//! enabled. A boot core that needs one simply requires the trait.

#[cfg(feature = "late-init")]
use core::fmt;

#[cfg(feature = "capsule")]
use crate::capsule::UpdateInfo;
#[cfg(feature = "late-init")]
use crate::device::DeviceRegistry;
#[cfg(feature = "extension")]
use crate::extension::ExtensionSink;
use crate::{
    Error,
    device::DriverInfo,
    env::{EnvLocation, EnvOperation},
    fdt::FdtBuffer,
};

mod sandbox;

pub use sandbox::{SYS_SDRAM_SIZE, Sandbox, SandboxConfig, TEST_RESERVATION};

/// State shared between the boot core and the board.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct GlobalData {
    /// Usable RAM in bytes.
    pub ram_size: u64,
    /// Console output is suppressed.
    pub silent: bool,
}

/// Hooks every board provides.
pub trait Board {
    /// Report the amount of RAM in `gd`.
    fn dram_init(&self, gd: &mut GlobalData) -> Result<(), Error>;

    /// Bring up board peripherals.
    fn board_init(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Adjust the device tree before it is handed to the next stage.
    ///
    /// Errors from `fdt` must be returned as they are.
    fn ft_board_setup<F: FdtBuffer>(&self, fdt: &mut F) -> Result<(), Error>;

    /// Environment backend at priority `prio`, [`EnvLocation::Unknown`] past the last one.
    fn env_get_location(&self, op: EnvOperation, prio: usize) -> EnvLocation;

    /// Drivers to bind without a device tree node.
    fn driver_infos(&self) -> &'static [DriverInfo] {
        &[]
    }
}

/// Firmware can be updated through capsules.
#[cfg(feature = "capsule")]
pub trait CapsuleUpdate {
    fn update_info(&self) -> UpdateInfo;
}

/// Expansion boards can be discovered.
#[cfg(feature = "extension")]
pub trait ExtensionScan {
    /// Append discovered boards to `list` and return how many were added.
    fn extension_board_scan(&self, list: &mut impl ExtensionSink) -> Result<usize, Error>;
}

/// Peripheral checks once the core subsystems are up.
#[cfg(feature = "late-init")]
pub trait LateInit {
    /// Diagnostics for the user go to `console`, which must be shown even on a silent console.
    fn board_late_init<R: DeviceRegistry, W: fmt::Write>(
        &self,
        gd: &mut GlobalData,
        devices: &mut R,
        console: &mut W,
    ) -> Result<(), Error>;
}
