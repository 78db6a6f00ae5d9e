//! MXCSR backend for x86 and x86_64.
//!
//! ```text
//! 15  14 13  12 11 10  9  8  7  6   5 4 3 2 1 0
//! ┌───┬─────┬──┬──┬──┬──┬──┬──┬───┬───────────┐
//! │FTZ│ RC  │PM│UM│OM│ZM│DM│IM│DAZ│  flags    │
//! └───┴─────┴──┴──┴──┴──┴──┴──┴───┴───────────┘
//! ```
//!
//! The whole register is rewritten, so the exception flags are cleared on
//! every write.

use std::arch::asm;

use super::FpuControl;
use crate::cpu::fpscr::GuestRounding;

/// All exceptions masked, round to nearest, no flush to zero.
pub const DEFAULT: u32 = 0x1F80;

/// RC = 11, round toward zero.
pub const ROUND_TO_ZERO: u32 = 3 << 13;

/// FTZ, denormal results become zero.
pub const FLUSH_TO_ZERO: u32 = 1 << 15;

/// Exception status bits (IE, DE, ZE, OE, UE, PE) set by arithmetic.
pub const STICKY_FLAGS: u64 = 0x3F;

/// MXCSR value for `rounding`. The previous value does not contribute.
#[must_use]
pub const fn encode(rounding: GuestRounding, _current: u64) -> u64 {
    let mut mxcsr = DEFAULT;
    if rounding.round_to_zero() {
        mxcsr |= ROUND_TO_ZERO;
    }
    if rounding.denormals_as_zero {
        mxcsr |= FLUSH_TO_ZERO;
    }
    mxcsr as u64
}

/// The MXCSR of the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFpu;

impl FpuControl for NativeFpu {
    fn read(&self) -> u64 {
        let mut mxcsr: u32 = 0;
        // SAFETY: stmxcsr stores 4 bytes into `mxcsr`, which is valid for writes.
        unsafe {
            asm!(
                "stmxcsr dword ptr [{}]",
                in(reg) std::ptr::addr_of_mut!(mxcsr),
                options(nostack, preserves_flags)
            );
        }
        u64::from(mxcsr)
    }

    fn write(&mut self, rounding: GuestRounding) -> u64 {
        let value = encode(rounding, 0);
        #[allow(clippy::cast_possible_truncation)]
        let mxcsr = value as u32;
        // SAFETY: ldmxcsr reads 4 bytes from `mxcsr`; the value has no reserved bits set.
        unsafe {
            asm!(
                "ldmxcsr dword ptr [{}]",
                in(reg) std::ptr::addr_of!(mxcsr),
                options(nostack, readonly, preserves_flags)
            );
        }
        value
    }
}
