pub mod clock;
pub mod cpu;
pub mod memory;
