//! VFP FPSCR backend for 32-bit ARM.
//!
//! Same field layout as aarch64 FPCR for the bits we touch; the register also
//! carries the cumulative exception flags, which a write clears.

use std::arch::asm;

use super::FpuControl;
use crate::cpu::fpscr::GuestRounding;

/// Bits of the previous FPSCR value that survive a write.
pub const KEEP_MASK: u64 = 0x0408_6060;

/// DN = 1: NaN operands produce the default NaN. Round to nearest, no flush.
pub const DEFAULT: u64 = 0x0200_0000;

/// RMode = 11, round toward zero.
pub const ROUND_TO_ZERO: u64 = 3 << 22;

/// FZ, denormal operands and results become zero.
pub const FLUSH_TO_ZERO: u64 = 1 << 24;

/// Cumulative exception flags (IOC, DZC, OFC, UFC, IXC, IDC).
pub const STICKY_FLAGS: u64 = 0x9F;

#[must_use]
pub const fn encode(rounding: GuestRounding, current: u64) -> u64 {
    let mut on = DEFAULT;
    if rounding.round_to_zero() {
        on |= ROUND_TO_ZERO;
    }
    if rounding.denormals_as_zero {
        on |= FLUSH_TO_ZERO;
    }
    (current & KEEP_MASK) | on
}

/// The VFP FPSCR of the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFpu;

impl FpuControl for NativeFpu {
    fn read(&self) -> u64 {
        let fpscr: u32;
        // SAFETY: reading FPSCR has no side effects.
        unsafe {
            asm!("vmrs {}, fpscr", out(reg) fpscr, options(nomem, nostack));
        }
        u64::from(fpscr)
    }

    fn write(&mut self, rounding: GuestRounding) -> u64 {
        let value = encode(rounding, self.read());
        #[allow(clippy::cast_possible_truncation)]
        let fpscr = value as u32;
        // SAFETY: only rounding, flush and default-NaN controls are set; trap
        // enables end up cleared.
        unsafe {
            asm!("vmsr fpscr, {}", in(reg) fpscr, options(nomem, nostack));
        }
        value
    }
}
