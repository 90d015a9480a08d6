#[cfg(feature = "late-init")]
use core::fmt;

#[cfg(feature = "capsule")]
use crate::capsule::{CapsuleLayout, UpdateInfo};
#[cfg(feature = "late-init")]
use crate::device::{DeviceRegistry, LookupError, UclassId};
#[cfg(feature = "extension")]
use crate::extension::{self, ExtensionSink};
use crate::{
    Error,
    device::DriverInfo,
    env::{EnvLocation, EnvOperation, LocationPriority, SANDBOX_LOCATIONS},
    fdt::{FdtBuffer, MemReservation},
};

#[cfg(feature = "capsule")]
use super::CapsuleUpdate;
#[cfg(feature = "extension")]
use super::ExtensionScan;
#[cfg(feature = "late-init")]
use super::LateInit;
use super::{Board, GlobalData};

pub const SYS_SDRAM_SIZE: u64 = 128 << 20;

/// Arbitrary reservation added to every device tree, so that board fixups get exercised.
pub const TEST_RESERVATION: MemReservation = MemReservation {
    address: 0x00d0_2000,
    size: 0x4000,
};

// Generated platform data binds its own GPIO device; a second one would clash.
#[cfg(not(feature = "of-platdata"))]
static DRIVER_INFOS: [DriverInfo; 1] = [DriverInfo {
    name: "sandbox_gpio",
}];
#[cfg(feature = "of-platdata")]
static DRIVER_INFOS: [DriverInfo; 0] = [];

/// Build configuration of the sandbox board.
#[derive(Clone, Copy, Debug)]
pub struct SandboxConfig {
    pub sdram_size: u64,
    pub env_locations: LocationPriority,
    #[cfg(feature = "capsule")]
    pub capsule: CapsuleLayout,
}

impl SandboxConfig {
    pub const DEFAULT: Self = Self {
        sdram_size: SYS_SDRAM_SIZE,
        env_locations: SANDBOX_LOCATIONS,
        #[cfg(feature = "capsule")]
        capsule: CapsuleLayout::Raw,
    };
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The emulated board.
#[derive(Clone, Debug, Default)]
pub struct Sandbox {
    config: SandboxConfig,
}

impl Sandbox {
    pub const fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }
}

impl Board for Sandbox {
    fn dram_init(&self, gd: &mut GlobalData) -> Result<(), Error> {
        gd.ram_size = self.config.sdram_size;
        Ok(())
    }

    fn ft_board_setup<F: FdtBuffer>(&self, fdt: &mut F) -> Result<(), Error> {
        fdt.add_mem_rsv(TEST_RESERVATION.address, TEST_RESERVATION.size)?;
        Ok(())
    }

    fn env_get_location(&self, op: EnvOperation, prio: usize) -> EnvLocation {
        self.config.env_locations.get(op, prio)
    }

    fn driver_infos(&self) -> &'static [DriverInfo] {
        &DRIVER_INFOS
    }
}

#[cfg(feature = "capsule")]
impl CapsuleUpdate for Sandbox {
    fn update_info(&self) -> UpdateInfo {
        UpdateInfo::sandbox(self.config.capsule)
    }
}

#[cfg(feature = "extension")]
impl ExtensionScan for Sandbox {
    fn extension_board_scan(&self, list: &mut impl ExtensionSink) -> Result<usize, Error> {
        extension::scan(list)
    }
}

#[cfg(feature = "late-init")]
impl LateInit for Sandbox {
    fn board_late_init<R: DeviceRegistry, W: fmt::Write>(
        &self,
        gd: &mut GlobalData,
        devices: &mut R,
        console: &mut W,
    ) -> Result<(), Error> {
        match devices.first_device_err(UclassId::CrosEc) {
            Ok(_) | Err(LookupError::NotConfigured) => Ok(()),
            Err(err) => {
                gd.silent = false;
                log::error!("cros-ec communications failure {}", err);

                // Nothing left to do if the console fails too; the halt follows regardless.
                let _ = writeln!(console, "cros-ec communications failure {}", err);
                let _ = write!(console, "\nPlease reset with Power+Refresh\n\n");

                Err(Error::Fatal(crate::Fatal::new("Cannot init cros-ec device")))
            }
        }
    }
}
