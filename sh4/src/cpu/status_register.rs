//! # SH-4 Status Register (SR)
//!
//! ```text
//! 31 30 29 28 27     16 15 14  10 9 8 7    4 3 2 1 0
//! ┌──┬──┬──┬──┬─────────┬──┬──────┬─┬─┬──────┬───┬─┬─┐
//! │- │MD│RB│BL│Reserved │FD│  -   │M│Q│IMASK │ - │S│T│
//! └──┴──┴──┴──┴─────────┴──┴──────┴─┴─┴──────┴───┴─┴─┘
//! ```
//!
//! - **MD (30)**: privileged mode. Only meaningful bank selection happens here.
//! - **RB (29)**: selects which R0-R7 bank is visible while MD is set.
//! - **BL (28)**: blocks exceptions and interrupts.
//! - **IMASK (4-7)**: interrupt level mask.
//!
//! See [`Sh4Context::update_sr`](super::sh4_context::Sh4Context::update_sr)
//! for how a change of MD/RB swaps the general register bank.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;

/// SR as a raw `u32` with typed accessors. Every bit pattern is a legal value.
///
/// # Example
///
/// ```
/// use sh4::cpu::status_register::StatusRegister;
///
/// let mut sr = StatusRegister::default();
/// sr.set_privileged_mode(true);
/// sr.set_bank_select(true);
/// assert_eq!(u32::from(sr), 0x6000_0000);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRegister(u32);

impl StatusRegister {
    /// Value loaded on power-on reset: MD=1, RB=1, BL=1, IMASK=0xF.
    pub const POWER_ON: Self = Self(0x7000_00F0);

    /// Bits that exist in hardware. Writes to the rest read back as zero.
    pub const WRITABLE_MASK: u32 = 0x7000_83F3;

    /// T => Bit 0, condition/carry bit.
    #[must_use]
    pub fn t(self) -> bool {
        self.0.get_bit(0)
    }

    /// S => Bit 1, MAC saturation.
    #[must_use]
    pub fn s(self) -> bool {
        self.0.get_bit(1)
    }

    /// IMASK => Bits 4-7, interrupts at or below this level are masked.
    #[must_use]
    pub fn imask(self) -> u32 {
        self.0.get_bits(4..=7)
    }

    /// Q => Bit 8, used by DIV0S/DIV0U/DIV1.
    #[must_use]
    pub fn q(self) -> bool {
        self.0.get_bit(8)
    }

    /// M => Bit 9, used by DIV0S/DIV0U/DIV1.
    #[must_use]
    pub fn m(self) -> bool {
        self.0.get_bit(9)
    }

    /// FD => Bit 15, (1=FPU instructions raise an exception)
    #[must_use]
    pub fn fpu_disable(self) -> bool {
        self.0.get_bit(15)
    }

    /// BL => Bit 28, (1=exceptions and interrupts blocked)
    #[must_use]
    pub fn block(self) -> bool {
        self.0.get_bit(28)
    }

    /// RB => Bit 29, (0=bank 0, 1=bank 1). Ignored by hardware while MD is clear.
    #[must_use]
    pub fn bank_select(self) -> bool {
        self.0.get_bit(29)
    }

    /// MD => Bit 30, (0=user, 1=privileged)
    #[must_use]
    pub fn privileged_mode(self) -> bool {
        self.0.get_bit(30)
    }

    pub fn set_t(&mut self, value: bool) {
        self.0.set_bit(0, value);
    }

    pub fn set_s(&mut self, value: bool) {
        self.0.set_bit(1, value);
    }

    pub fn set_imask(&mut self, level: u32) {
        self.0.set_bits(4..=7, level);
    }

    pub fn set_q(&mut self, value: bool) {
        self.0.set_bit(8, value);
    }

    pub fn set_m(&mut self, value: bool) {
        self.0.set_bit(9, value);
    }

    pub fn set_fpu_disable(&mut self, value: bool) {
        self.0.set_bit(15, value);
    }

    pub fn set_block(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    pub fn set_bank_select(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_privileged_mode(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    /// Register bank that is visible with this SR value.
    /// Outside privileged mode bank 0 is always the visible one.
    #[must_use]
    pub fn active_bank(self) -> usize {
        usize::from(self.privileged_mode() && self.bank_select())
    }
}

impl From<u32> for StatusRegister {
    fn from(value: u32) -> Self {
        Self(value & Self::WRITABLE_MASK)
    }
}

impl From<StatusRegister> for u32 {
    fn from(sr: StatusRegister) -> Self {
        sr.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn check_privileged_mode() {
        let mut sr = StatusRegister(0);
        sr.set_privileged_mode(true);
        assert!(sr.privileged_mode());
        assert_eq!(sr.0, 1 << 30);
    }

    #[test]
    fn check_bank_select() {
        let mut sr = StatusRegister(0);
        sr.set_bank_select(true);
        assert!(sr.bank_select());
        assert_eq!(sr.0, 1 << 29);
    }

    #[test]
    fn check_block() {
        let mut sr = StatusRegister(0);
        sr.set_block(true);
        assert!(sr.block());
        assert_eq!(sr.0, 1 << 28);
    }

    #[test]
    fn check_imask() {
        let mut sr = StatusRegister(0xFFFF_FFFF);
        sr.set_imask(0x5);
        assert_eq!(sr.imask(), 0x5);
        assert_eq!(sr.0, 0xFFFF_FF5F);
    }

    #[test]
    fn check_fpu_disable() {
        let mut sr = StatusRegister(0);
        sr.set_fpu_disable(true);
        assert!(sr.fpu_disable());
    }

    #[test]
    fn check_arithmetic_bits() {
        let mut sr = StatusRegister(0);
        sr.set_t(true);
        sr.set_s(true);
        sr.set_q(true);
        sr.set_m(true);
        assert_eq!(sr.0, 0b11_0000_0011);
        assert!(sr.t() && sr.s() && sr.q() && sr.m());
    }

    #[test]
    fn check_power_on() {
        let sr = StatusRegister::POWER_ON;
        assert!(sr.privileged_mode());
        assert!(sr.bank_select());
        assert!(sr.block());
        assert_eq!(sr.imask(), 0xF);
        assert_eq!(sr.active_bank(), 1);
    }

    #[test]
    fn active_bank_ignores_rb_in_user_mode() {
        let sr = StatusRegister::from(1 << 29);
        assert!(sr.bank_select());
        assert_eq!(sr.active_bank(), 0);
    }

    #[test]
    fn reserved_bits_are_dropped() {
        let sr = StatusRegister::from(u32::MAX);
        assert_eq!(u32::from(sr), StatusRegister::WRITABLE_MASK);
    }
}
