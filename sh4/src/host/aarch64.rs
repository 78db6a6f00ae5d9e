//! FPCR backend for aarch64.
//!
//! Read-modify-write: bits in [`KEEP_MASK`] (AHP and FZ16) are
//! carried over, everything else is rebuilt from [`DEFAULT`].

use std::arch::asm;

use super::FpuControl;
use crate::cpu::fpscr::GuestRounding;

/// Bits of the previous FPCR value that survive a write.
pub const KEEP_MASK: u64 = 0x0408_0000;

/// DN = 1: NaN operands produce the default NaN. Round to nearest, no flush.
pub const DEFAULT: u64 = 0x0200_0000;

/// RMode = 11, round toward zero.
pub const ROUND_TO_ZERO: u64 = 3 << 22;

/// FZ, denormal operands and results become zero.
pub const FLUSH_TO_ZERO: u64 = 1 << 24;

/// FPCR holds no cumulative exception bits, those live in FPSR.
pub const STICKY_FLAGS: u64 = 0;

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

/// The FPCR of the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFpu;

impl FpuControl for NativeFpu {
    fn read(&self) -> u64 {
        let fpcr: u64;
        // SAFETY: reading FPCR has no side effects.
        unsafe {
            asm!("mrs {}, fpcr", out(reg) fpcr, options(nomem, nostack, preserves_flags));
        }
        fpcr
    }

    fn write(&mut self, rounding: GuestRounding) -> u64 {
        let value = encode(rounding, self.read());
        // SAFETY: only rounding, flush and default-NaN controls change; trap
        // enables stay clear.
        unsafe {
            asm!("msr fpcr, {}", in(reg) value, options(nomem, nostack, preserves_flags));
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encodings() {
        assert_eq!(encode(GuestRounding::new(0, false), 0), 0x0200_0000);
        assert_eq!(encode(GuestRounding::new(1, false), 0), 0x02C0_0000);
        assert_eq!(encode(GuestRounding::new(0, true), 0), 0x0300_0000);
        assert_eq!(encode(GuestRounding::new(1, true), 0), 0x03C0_0000);
    }

    #[test]
    fn keeps_only_masked_bits() {
        let current = 0x04C8_9F00;
        assert_eq!(encode(GuestRounding::DEFAULT, current), 0x0608_0000);
    }
}
