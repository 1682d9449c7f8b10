//! Cycle-accurate simulation of an Intel MCS-4 (4004) system.
//!
//! The model is structural rather than behavioral: a 4004-class CPU core,
//! 4001-style ROM and 4002-style RAM share a 4-bit data bus and a SYNC /
//! CM-ROM / CM-RAM control interface, all driven phase by phase from a
//! single two-phase clock distributor. Instructions take eight clock
//! phases (three address, two fetch, three execute); nothing is executed
//! "at once", and every register transfer happens in the phase the real
//! hardware performs it.

pub mod bus;
pub mod clocked;
pub mod components;
pub mod console;
pub mod program;
pub mod system_config;
pub mod systems;
pub mod types;

pub use bus::Bus;
pub use clocked::Clocked;
pub use components::clock::{ClockDistributor, ClockPhase};
pub use components::cpu::{ControlLines, CpuCore};
pub use components::memory::{Ram4002, Rom4001};
pub use systems::Mcs4System;
pub use types::U12;
