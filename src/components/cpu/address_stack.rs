//! 12-bit program counter plus the three-level subroutine return stack.
//!
//! The stack is a circular buffer with no overflow detection: a fourth
//! nested call silently overwrites the oldest return address, matching the
//! hardware it models. Pushes store the committed PC, so a JMS at address N
//! pushes N+1 (the PC was incremented during the fetch of the same
//! instruction).

use crate::bus::Bus;
use crate::clocked::Clocked;
use crate::components::clock::ClockPhase;
use crate::types::U12;

pub const STACK_DEPTH: usize = 3;

pub struct AddressStack {
    program_counter: Clocked<u16>,
    stack: [Clocked<u16>; STACK_DEPTH],
    stack_pointer: Clocked<u8>,
}

impl AddressStack {
    pub fn new() -> Self {
        AddressStack {
            program_counter: Clocked::new(0, ClockPhase::High),
            stack: std::array::from_fn(|_| Clocked::new(0, ClockPhase::High)),
            stack_pointer: Clocked::new(0, ClockPhase::High),
        }
    }

    pub fn program_counter(&self) -> U12 {
        U12::new(self.program_counter.read())
    }

    /// Immediate PC write. Reset and test access only.
    pub fn force_program_counter(&mut self, value: u16) {
        self.program_counter.force(value & 0xFFF);
    }

    /// Drive the selected nibble (0 = low, 2 = high) of the committed PC.
    pub fn read_program_counter(&self, nibble: usize, bus: &mut Bus) {
        bus.write(self.program_counter().nibble(nibble as u8) as u16);
    }

    /// Merge the bus value into the selected nibble of the pending PC.
    /// Called once per address phase; the full 12-bit value commits on HIGH.
    pub fn write_program_counter(&mut self, nibble: usize, bus: &Bus) {
        let current = U12::new(self.program_counter.pending());
        let updated = current.with_nibble(nibble as u8, (bus.read() & 0xF) as u8);
        self.program_counter.write(updated.value());
    }

    /// Stage PC+1. 12-bit wraparound, no carry out.
    pub fn increment(&mut self) {
        self.program_counter
            .write(self.program_counter().wrapping_inc().value());
    }

    /// Stage a push of the committed PC. Oldest entry is lost past depth 3.
    pub fn push(&mut self) {
        let sp = self.stack_pointer.read() as usize;
        self.stack[sp].write(self.program_counter.read());
        self.stack_pointer.write(((sp + 1) % STACK_DEPTH) as u8);
    }

    /// Stage a pop of the most recent return address into the PC.
    pub fn pop(&mut self) {
        let top = (self.stack_pointer.read() as usize + STACK_DEPTH - 1) % STACK_DEPTH;
        self.program_counter.write(self.stack[top].read());
        self.stack_pointer.write(top as u8);
    }

    pub fn stack_entry(&self, level: usize) -> U12 {
        U12::new(self.stack[level].read())
    }

    pub fn tick(&mut self, phase: ClockPhase) {
        self.program_counter.tick(phase);
        for entry in self.stack.iter_mut() {
            entry.tick(phase);
        }
        self.stack_pointer.tick(phase);
    }
}

impl Default for AddressStack {
    fn default() -> Self {
        Self::new()
    }
}
