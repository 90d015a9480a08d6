//! Drives the board hooks in boot order and stops the boot when one of them reports [`Fatal`].

#[cfg(feature = "late-init")]
use core::fmt;

#[cfg(feature = "late-init")]
use crate::{board::LateInit, device::DeviceRegistry};
use crate::{
    Error, Fatal,
    board::{Board, GlobalData},
    env::{EnvLocation, EnvOperation},
    fdt::FdtBuffer,
};

/// Mechanism that ends the boot for good.
pub trait Halt {
    fn halt(&mut self, fatal: Fatal) -> !;
}

/// Halt by panicking with the reason, the way firmware panics on an unrecoverable error.
#[cfg(feature = "std")]
pub struct PanicHalt;

#[cfg(feature = "std")]
impl Halt for PanicHalt {
    fn halt(&mut self, fatal: Fatal) -> ! {
        panic!("{}", fatal)
    }
}

pub struct BootDriver<B: Board, H: Halt> {
    board: B,
    halt: H,
    gd: GlobalData,
}

impl<B: Board, H: Halt> BootDriver<B, H> {
    pub fn new(board: B, halt: H) -> Self {
        Self {
            board,
            halt,
            gd: GlobalData::default(),
        }
    }

    pub fn gd(&self) -> &GlobalData {
        &self.gd
    }

    pub fn gd_mut(&mut self) -> &mut GlobalData {
        &mut self.gd
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    /// Stages before relocation: RAM sizing, then board init.
    pub fn init_f(&mut self) -> Result<(), Error> {
        let result = self.board.dram_init(&mut self.gd);
        self.check(result)?;
        log::info!("DRAM: {} MiB", self.gd.ram_size >> 20);

        let result = self.board.board_init();
        self.check(result)
    }

    /// Stages after relocation. Does not return if the board reports a fatal error.
    #[cfg(feature = "late-init")]
    pub fn init_r<R: DeviceRegistry, W: fmt::Write>(
        &mut self,
        devices: &mut R,
        console: &mut W,
    ) -> Result<(), Error>
    where
        B: LateInit,
    {
        let result = self.board.board_late_init(&mut self.gd, devices, console);
        self.check(result)
    }

    pub fn fixup_fdt<F: FdtBuffer>(&mut self, fdt: &mut F) -> Result<(), Error> {
        let result = self.board.ft_board_setup(fdt);
        self.check(result)
    }

    /// Ask the board for environment backends in priority order until `usable` accepts one.
    pub fn env_location(
        &self,
        op: EnvOperation,
        mut usable: impl FnMut(EnvLocation) -> bool,
    ) -> Option<EnvLocation> {
        for prio in 0.. {
            match self.board.env_get_location(op, prio) {
                EnvLocation::Unknown => break,
                location if usable(location) => return Some(location),
                location => log::debug!("env: {} not usable", location),
            }
        }
        log::debug!("env: using default environment");
        None
    }

    fn check(&mut self, result: Result<(), Error>) -> Result<(), Error> {
        match result {
            Err(Error::Fatal(fatal)) => {
                log::error!("halting: {}", fatal);
                self.halt.halt(fatal)
            }
            other => other,
        }
    }
}
