//! # SH-4 Floating-Point Status/Control Register (FPSCR)
//!
//! ```text
//! 31      22 21 20 19 18 17     12 11     7 6     2 1 0
//! ┌─────────┬──┬──┬──┬──┬─────────┬────────┬───────┬───┐
//! │Reserved │FR│SZ│PR│DN│ Cause   │ Enable │ Flag  │RM │
//! └─────────┴──┴──┴──┴──┴─────────┴────────┴───────┴───┘
//! ```
//!
//! Only FR, RM and DN matter to the synchronization core: FR selects the
//! visible FP register bank, RM and DN are mirrored into the host FPU.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;

/// RM field value selecting round-to-zero. Every other value rounds to nearest.
pub const RM_ROUND_TO_ZERO: u32 = 1;

/// The part of FPSCR that the host FPU has to reproduce.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuestRounding {
    /// Raw RM field (bits 0-1).
    pub round_mode: u32,
    pub denormals_as_zero: bool,
}

impl GuestRounding {
    /// Round to nearest, denormals preserved.
    pub const DEFAULT: Self = Self {
        round_mode: 0,
        denormals_as_zero: false,
    };

    #[must_use]
    pub const fn new(round_mode: u32, denormals_as_zero: bool) -> Self {
        Self {
            round_mode,
            denormals_as_zero,
        }
    }

    #[must_use]
    pub const fn round_to_zero(self) -> bool {
        self.round_mode == RM_ROUND_TO_ZERO
    }
}

/// FPSCR as a raw `u32` with typed accessors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fpscr(u32);

impl Fpscr {
    /// Value loaded on power-on reset: RM=01 (round to zero), DN=1.
    pub const POWER_ON: Self = Self(0x0004_0001);

    pub const WRITABLE_MASK: u32 = 0x003F_FFFF;

    /// RM => Bits 0-1
    #[must_use]
    pub fn round_mode(self) -> u32 {
        self.0.get_bits(0..=1)
    }

    /// Flag => Bits 2-6, sticky exception flags (I, U, O, Z, V).
    #[must_use]
    pub fn flags(self) -> u32 {
        self.0.get_bits(2..=6)
    }

    /// Enable => Bits 7-11
    #[must_use]
    pub fn enables(self) -> u32 {
        self.0.get_bits(7..=11)
    }

    /// Cause => Bits 12-17 (I, U, O, Z, V, E)
    #[must_use]
    pub fn causes(self) -> u32 {
        self.0.get_bits(12..=17)
    }

    /// DN => Bit 18, (1=denormal source and result treated as zero)
    #[must_use]
    pub fn denormals_as_zero(self) -> bool {
        self.0.get_bit(18)
    }

    /// PR => Bit 19, (0=single, 1=double precision operations)
    #[must_use]
    pub fn double_precision(self) -> bool {
        self.0.get_bit(19)
    }

    /// SZ => Bit 20, (0=32-bit, 1=64-bit FMOV transfers)
    #[must_use]
    pub fn transfer_size(self) -> bool {
        self.0.get_bit(20)
    }

    /// FR => Bit 21, (0=FPR0_BANK0 visible, 1=FPR0_BANK1 visible)
    #[must_use]
    pub fn fp_bank_select(self) -> bool {
        self.0.get_bit(21)
    }

    pub fn set_round_mode(&mut self, rm: u32) {
        self.0.set_bits(0..=1, rm);
    }

    pub fn set_flags(&mut self, flags: u32) {
        self.0.set_bits(2..=6, flags);
    }

    pub fn set_enables(&mut self, enables: u32) {
        self.0.set_bits(7..=11, enables);
    }

    pub fn set_causes(&mut self, causes: u32) {
        self.0.set_bits(12..=17, causes);
    }

    pub fn set_denormals_as_zero(&mut self, value: bool) {
        self.0.set_bit(18, value);
    }

    pub fn set_double_precision(&mut self, value: bool) {
        self.0.set_bit(19, value);
    }

    pub fn set_transfer_size(&mut self, value: bool) {
        self.0.set_bit(20, value);
    }

    pub fn set_fp_bank_select(&mut self, value: bool) {
        self.0.set_bit(21, value);
    }

    #[must_use]
    pub fn rounding(self) -> GuestRounding {
        GuestRounding::new(self.round_mode(), self.denormals_as_zero())
    }

    pub fn set_rounding(&mut self, rounding: GuestRounding) {
        self.set_round_mode(rounding.round_mode);
        self.set_denormals_as_zero(rounding.denormals_as_zero);
    }
}

impl From<u32> for Fpscr {
    fn from(value: u32) -> Self {
        Self(value & Self::WRITABLE_MASK)
    }
}

impl From<Fpscr> for u32 {
    fn from(fpscr: Fpscr) -> Self {
        fpscr.0
    }
}
