//! Interrupt decision seam.
//!
//! The synchronization core only asks "is something pending now?" after SR
//! changes. Which sources are raised and what vector gets taken belongs to the
//! interrupt controller that implements [`InterruptDecision`].

use serde::{Deserialize, Serialize};

use crate::cpu::status_register::StatusRegister;

/// Highest interrupt priority level on SH-4 (NMI excluded).
pub const MAX_PRIORITY: u8 = 15;

/// Decides, for a given SR, whether an interrupt is ready to be accepted.
pub trait InterruptDecision {
    fn sr_decode(&mut self, sr: StatusRegister) -> bool;
}

impl<F> InterruptDecision for F
where
    F: FnMut(StatusRegister) -> bool,
{
    fn sr_decode(&mut self, sr: StatusRegister) -> bool {
        self(sr)
    }
}

/// Reference controller: up to 32 interrupt sources, each with a priority
/// level taken from the IPR registers of the owning peripheral.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PendingInterrupts {
    /// Bit n set when source n is raised.
    pending: u32,
    /// Priority level (0-15) of each source. Level 0 never interrupts.
    priorities: [u8; 32],
}

impl PendingInterrupts {
    /// # Panics
    ///
    /// Panics if `source` is not below 32.
    pub fn set_priority(&mut self, source: usize, level: u8) {
        assert!(source < 32, "Invalid interrupt source: {source}");
        self.priorities[source] = level.min(MAX_PRIORITY);
    }

    /// # Panics
    ///
    /// Panics if `source` is not below 32.
    pub fn raise(&mut self, source: usize) {
        assert!(source < 32, "Invalid interrupt source: {source}");
        self.pending |= 1 << source;
    }

    /// # Panics
    ///
    /// Panics if `source` is not below 32.
    pub fn clear(&mut self, source: usize) {
        assert!(source < 32, "Invalid interrupt source: {source}");
        self.pending &= !(1 << source);
    }

    #[must_use]
    pub const fn pending_mask(&self) -> u32 {
        self.pending
    }

    /// Priority level of the most urgent raised source, 0 when nothing is raised.
    #[must_use]
    pub fn highest_pending_level(&self) -> u8 {
        (0..32)
            .filter(|&source| self.pending & (1 << source) != 0)
            .map(|source| self.priorities[source])
            .max()
            .unwrap_or(0)
    }
}

impl InterruptDecision for PendingInterrupts {
    fn sr_decode(&mut self, sr: StatusRegister) -> bool {
        !sr.block() && u32::from(self.highest_pending_level()) > sr.imask()
    }
}
