pub mod fpscr;
pub mod interrupts;
pub mod registers;
pub mod sh4_context;
pub mod status_register;
