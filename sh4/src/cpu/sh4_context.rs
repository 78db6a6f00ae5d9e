//! # SH-4 register context and its synchronizers
//!
//! The interpreter owns an [`Sh4Context`] and must call
//! [`Sh4Context::update_sr`] after every write to SR and
//! [`Sh4Context::update_fpscr`] after every write to FPSCR, before the next
//! instruction executes. Both are edge triggered against the `old_sr` /
//! `old_fpscr` snapshots, so calling them when nothing relevant changed is a
//! no-op apart from the interrupt re-evaluation.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cpu::fpscr::{Fpscr, GuestRounding};
use crate::cpu::interrupts::InterruptDecision;
use crate::cpu::registers::{FpRegisters, GeneralRegisters};
use crate::cpu::status_register::StatusRegister;
use crate::host;

/// Address fetched from after a power-on reset.
pub const RESET_VECTOR: u32 = 0xA000_0000;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Sh4Context {
    pub registers: GeneralRegisters,
    pub fp_registers: FpRegisters,

    pub sr: StatusRegister,
    /// SR as of the last [`Self::update_sr`], RB cleared while MD was clear.
    pub old_sr: StatusRegister,
    pub fpscr: Fpscr,
    /// FPSCR as of the last [`Self::update_fpscr`].
    pub old_fpscr: Fpscr,

    pub pc: u32,
    pub pr: u32,
    pub gbr: u32,
    pub vbr: u32,
    pub ssr: u32,
    pub spc: u32,
    pub sgr: u32,
    pub dbr: u32,
    pub mach: u32,
    pub macl: u32,
    pub fpul: u32,
}

impl Sh4Context {
    /// Power-on reset of the register file, then brings the host FPU in line
    /// with the reset FPSCR.
    pub fn reset(&mut self) {
        *self = Self {
            sr: StatusRegister::POWER_ON,
            old_sr: StatusRegister::POWER_ON,
            fpscr: Fpscr::POWER_ON,
            old_fpscr: Fpscr::POWER_ON,
            pc: RESET_VECTOR,
            ..Self::default()
        };
        self.restore_host_rounding();
    }

    pub fn swap_gpr_bank(&mut self) {
        trace!(sr = u32::from(self.sr), "swapping R0-R7 bank");
        self.registers.swap_banks();
    }

    pub fn swap_fpu_bank(&mut self) {
        trace!(fpscr = u32::from(self.fpscr), "swapping FR/XF bank");
        self.fp_registers.swap_banks();
    }

    /// Reacts to a change of SR: swaps the R0-R7 bank when the visible bank
    /// changed and returns whether an interrupt is now pending.
    pub fn update_sr(&mut self, irq: &mut impl InterruptDecision) -> bool {
        let bank_changed = if self.sr.privileged_mode() {
            self.old_sr.bank_select() != self.sr.bank_select()
        } else {
            self.old_sr.bank_select()
        };
        if bank_changed {
            self.swap_gpr_bank();
        }

        self.old_sr = self.sr;
        // outside privileged mode bank 0 is visible whatever RB says
        let rb = self.old_sr.bank_select() && self.sr.privileged_mode();
        self.old_sr.set_bank_select(rb);

        irq.sr_decode(self.sr)
    }

    /// Reacts to a change of FPSCR: swaps FR/XF when FR flipped and mirrors
    /// RM/DN into the host FPU.
    pub fn update_fpscr(&mut self) {
        if self.fpscr.fp_bank_select() != self.old_fpscr.fp_bank_select() {
            self.swap_fpu_bank();
        }

        self.old_fpscr = self.fpscr;
        host::apply_host_rounding(self.fpscr.rounding());
    }

    /// LDC Rm,SR and friends.
    pub fn write_sr(&mut self, value: u32, irq: &mut impl InterruptDecision) -> bool {
        self.sr = StatusRegister::from(value);
        self.update_sr(irq)
    }

    /// LDS Rm,FPSCR and friends.
    pub fn write_fpscr(&mut self, value: u32) {
        self.fpscr = Fpscr::from(value);
        self.update_fpscr();
    }

    /// Runs `work` with the host FPU rounding to nearest and keeping
    /// denormals, then puts the guest RM/DN back in FPSCR and on the host.
    pub fn run_with_default_rounding<T>(&mut self, work: impl FnOnce() -> T) -> T {
        let saved = self.fpscr.rounding();
        self.fpscr.set_rounding(GuestRounding::DEFAULT);
        host::apply_host_rounding(self.fpscr.rounding());

        let result = work();

        self.fpscr.set_rounding(saved);
        host::apply_host_rounding(saved);
        result
    }

    /// Rewrites the host control register from FPSCR even if this thread
    /// believes it is already up to date.
    pub fn restore_host_rounding(&self) {
        host::force_resync();
        host::apply_host_rounding(self.fpscr.rounding());
    }
}
