//! The sixteen 4-bit index registers (R0-R15).
//!
//! Registers are edge-triggered: a load staged during the LOW phase only
//! becomes visible after the following HIGH commit, which is what makes
//! XCH's read-then-write exchange work without an explicit shadow copy.

use crate::bus::Bus;
use crate::clocked::Clocked;
use crate::components::clock::ClockPhase;

pub const REGISTER_COUNT: usize = 16;

pub struct IndexRegisters {
    registers: [Clocked<u8>; REGISTER_COUNT],
}

impl IndexRegisters {
    pub fn new() -> Self {
        IndexRegisters {
            registers: std::array::from_fn(|_| Clocked::new(0, ClockPhase::High)),
        }
    }

    /// Drive the committed value of the selected register onto the bus.
    pub fn read_to_bus(&self, index: usize, bus: &mut Bus) {
        bus.write(self.registers[index].read() as u16);
    }

    /// Stage a load of the selected register from the bus.
    pub fn load_from_bus(&mut self, index: usize, bus: &Bus) {
        self.registers[index].write((bus.read() & 0xF) as u8);
    }

    /// Committed value, bypassing the bus. Used by the ALU path and tests.
    pub fn read_direct(&self, index: usize) -> u8 {
        self.registers[index].read()
    }

    /// Immediate write, bypassing the clock. Reset and test access only.
    pub fn write_direct(&mut self, index: usize, value: u8) {
        self.registers[index].force(value & 0xF);
    }

    pub fn tick(&mut self, phase: ClockPhase) {
        for reg in self.registers.iter_mut() {
            reg.tick(phase);
        }
    }
}

impl Default for IndexRegisters {
    fn default() -> Self {
        Self::new()
    }
}
