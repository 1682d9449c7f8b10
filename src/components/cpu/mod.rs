pub mod address_stack;
pub mod alu;
pub mod index_registers;
pub mod instruction;
pub mod intel_4004;

pub use intel_4004::{ControlLines, CpuCore};
