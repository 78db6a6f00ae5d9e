//! SH-4 register bank and host FPU rounding synchronization.
//!
//! - [`cpu::sh4_context::Sh4Context`] holds the guest register file and the
//!   SR/FPSCR synchronizers the interpreter calls after register writes.
//! - [`host`] keeps the host FPU control register in step with FPSCR.RM/DN.

mod bitwise;

pub mod cpu;
pub mod host;

pub use cpu::fpscr::{Fpscr, GuestRounding};
pub use cpu::interrupts::{InterruptDecision, PendingInterrupts};
pub use cpu::sh4_context::Sh4Context;
pub use cpu::status_register::StatusRegister;
pub use host::{apply_host_rounding, force_resync};
