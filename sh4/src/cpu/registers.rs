//! # SH-4 Register Files
//!
//! - **R0-R15**: general purpose. R0-R7 exist twice (bank 0 and bank 1),
//!   R8-R15 are shared.
//! - **FR0-FR15 / XF0-XF15**: two single-precision banks, FPSCR.FR selects
//!   which one is addressed as FR.
//!
//! The inactive copy of a banked file lives in its own named array. A bank
//! change exchanges the arrays in place; nothing is re-indexed at access time.

use serde::{Deserialize, Serialize};

/// Number of general registers shadowed by the alternate bank (R0-R7).
pub const BANKED_GPR_COUNT: usize = 8;

/// Registers in each floating-point bank.
pub const FPR_COUNT: usize = 16;

/// General registers as seen by the running code plus the hidden R0-R7 bank.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralRegisters {
    r: [u32; 16],
    r_bank: [u32; BANKED_GPR_COUNT],
}

impl GeneralRegisters {
    #[must_use]
    pub const fn register_at(&self, reg: usize) -> u32 {
        self.r[reg]
    }

    /// # Panics
    ///
    /// Panics if `reg` is not in 0..=15.
    pub fn set_register_at(&mut self, reg: usize, new_value: u32) {
        assert!(reg <= 15, "Invalid register index: {reg} (0x{reg:X})");
        self.r[reg] = new_value;
    }

    /// Rn_BANK as accessed by LDC/STC: the R0-R7 copy that is not visible.
    #[must_use]
    pub const fn bank_register_at(&self, reg: usize) -> u32 {
        self.r_bank[reg]
    }

    /// # Panics
    ///
    /// Panics if `reg` is not in 0..=7.
    pub fn set_bank_register_at(&mut self, reg: usize, new_value: u32) {
        assert!(
            reg < BANKED_GPR_COUNT,
            "Invalid banked register index: {reg} (0x{reg:X})"
        );
        self.r_bank[reg] = new_value;
    }

    /// Exchanges R0-R7 with R0_BANK-R7_BANK.
    pub fn swap_banks(&mut self) {
        self.r[..BANKED_GPR_COUNT].swap_with_slice(&mut self.r_bank);
    }
}

/// Floating-point registers, stored as raw bit patterns so a bank change
/// never canonicalizes a NaN or touches a denormal.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpRegisters {
    fr: [u32; FPR_COUNT],
    xf: [u32; FPR_COUNT],
}

impl FpRegisters {
    #[must_use]
    pub const fn fr_bits(&self, reg: usize) -> u32 {
        self.fr[reg]
    }

    pub const fn set_fr_bits(&mut self, reg: usize, bits: u32) {
        self.fr[reg] = bits;
    }

    #[must_use]
    pub const fn xf_bits(&self, reg: usize) -> u32 {
        self.xf[reg]
    }

    pub const fn set_xf_bits(&mut self, reg: usize, bits: u32) {
        self.xf[reg] = bits;
    }

    #[must_use]
    pub const fn fr(&self, reg: usize) -> f32 {
        f32::from_bits(self.fr[reg])
    }

    pub const fn set_fr(&mut self, reg: usize, value: f32) {
        self.fr[reg] = value.to_bits();
    }

    #[must_use]
    pub const fn xf(&self, reg: usize) -> f32 {
        f32::from_bits(self.xf[reg])
    }

    pub const fn set_xf(&mut self, reg: usize, value: f32) {
        self.xf[reg] = value.to_bits();
    }

    /// Exchanges FR0-FR15 with XF0-XF15.
    pub const fn swap_banks(&mut self) {
        std::mem::swap(&mut self.fr, &mut self.xf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    #[test]
    fn gpr_swap_exchanges_only_banked_half() {
        let mut regs = GeneralRegisters::default();
        for i in 0..16 {
            regs.set_register_at(i, i as u32);
        }
        for i in 0..BANKED_GPR_COUNT {
            regs.set_bank_register_at(i, 0x100 + i as u32);
        }

        regs.swap_banks();

        for i in 0..BANKED_GPR_COUNT {
            assert_eq!(regs.register_at(i), 0x100 + i as u32);
            assert_eq!(regs.bank_register_at(i), i as u32);
        }
        for i in BANKED_GPR_COUNT..16 {
            assert_eq!(regs.register_at(i), i as u32);
        }
    }

    #[test]
    fn gpr_double_swap_is_identity() {
        let mut rng = rand::thread_rng();
        let mut regs = GeneralRegisters::default();
        for i in 0..16 {
            regs.set_register_at(i, rng.r#gen());
        }
        for i in 0..BANKED_GPR_COUNT {
            regs.set_bank_register_at(i, rng.r#gen());
        }
        let before = regs.clone();

        regs.swap_banks();
        assert_ne!(regs, before);
        regs.swap_banks();

        assert_eq!(regs, before);
    }

    #[test]
    #[should_panic(expected = "Invalid register index")]
    fn register_out_of_range() {
        let mut regs = GeneralRegisters::default();
        regs.set_register_at(16, 0);
    }

    #[test]
    #[should_panic(expected = "Invalid banked register index")]
    fn bank_register_out_of_range() {
        let mut regs = GeneralRegisters::default();
        regs.set_bank_register_at(8, 0);
    }

    #[test]
    fn fpr_swap_preserves_raw_bits() {
        let mut regs = FpRegisters::default();
        // signalling NaN with payload, negative zero and the smallest denormal
        let patterns = [0x7F80_0001, 0x8000_0000, 0x0000_0001, 0x3F80_0000];
        for (i, bits) in patterns.iter().enumerate() {
            regs.set_fr_bits(i, *bits);
        }
        regs.set_xf(0, 2.5);

        regs.swap_banks();

        for (i, bits) in patterns.iter().enumerate() {
            assert_eq!(regs.xf_bits(i), *bits);
        }
        assert_eq!(regs.fr(0), 2.5);
    }

    #[test]
    fn fpr_double_swap_is_identity() {
        let mut rng = rand::thread_rng();
        let mut regs = FpRegisters::default();
        for i in 0..FPR_COUNT {
            regs.set_fr_bits(i, rng.r#gen());
            regs.set_xf_bits(i, rng.r#gen());
        }
        let before = regs.clone();

        regs.swap_banks();
        regs.swap_banks();

        assert_eq!(regs, before);
    }
}
