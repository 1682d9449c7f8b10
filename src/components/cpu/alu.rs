//! 4-bit arithmetic unit with accumulator, temp register and carry flag.
//!
//! Arithmetic runs over three execute phases: the operand is latched into
//! temp at X1, the result is computed into the ALU output register at X2,
//! and the output is driven back to the accumulator at X3. All four cells
//! are edge-triggered so each step uses the previous phase's committed
//! state.

use crate::bus::Bus;
use crate::clocked::Clocked;
use crate::components::clock::ClockPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluMode {
    /// accumulator + temp + nothing; sets carry on overflow.
    Add,
    /// accumulator - temp via two's complement; carry acts as "no borrow".
    Subtract,
    /// temp + 1; carry is left untouched.
    Increment,
}

pub struct AluCore {
    accumulator: Clocked<u8>,
    temp: Clocked<u8>,
    output: Clocked<u8>,
    carry: Clocked<bool>,
}

impl AluCore {
    pub fn new() -> Self {
        AluCore {
            accumulator: Clocked::new(0, ClockPhase::High),
            temp: Clocked::new(0, ClockPhase::High),
            output: Clocked::new(0, ClockPhase::High),
            carry: Clocked::new(false, ClockPhase::High),
        }
    }

    pub fn accumulator(&self) -> u8 {
        self.accumulator.read()
    }

    pub fn temp(&self) -> u8 {
        self.temp.read()
    }

    pub fn carry(&self) -> bool {
        self.carry.read()
    }

    /// Immediate accumulator write. Reset and test access only.
    pub fn force_accumulator(&mut self, value: u8) {
        self.accumulator.force(value & 0xF);
    }

    pub fn drive_accumulator(&self, bus: &mut Bus) {
        bus.write(self.accumulator.read() as u16);
    }

    pub fn drive_temp(&self, bus: &mut Bus) {
        bus.write(self.temp.read() as u16);
    }

    pub fn drive_output(&self, bus: &mut Bus) {
        bus.write(self.output.read() as u16);
    }

    pub fn load_accumulator(&mut self, bus: &Bus) {
        self.accumulator.write((bus.read() & 0xF) as u8);
    }

    pub fn load_temp(&mut self, bus: &Bus) {
        self.temp.write((bus.read() & 0xF) as u8);
    }

    /// Compute the selected operation from committed operand state and stage
    /// the result. Runs during a LOW phase; the result and carry become
    /// visible after the next HIGH commit.
    pub fn evaluate(&mut self, mode: AluMode) {
        let acc = self.accumulator.read() as u16;
        let tmp = self.temp.read() as u16;
        match mode {
            AluMode::Add => {
                let sum = acc + tmp;
                self.output.write((sum & 0xF) as u8);
                self.carry.write(sum > 0xF);
            }
            AluMode::Subtract => {
                let diff = acc + ((!tmp) & 0xF) + 1;
                self.output.write((diff & 0xF) as u8);
                self.carry.write(diff > 0xF);
            }
            AluMode::Increment => {
                self.output.write(((tmp + 1) & 0xF) as u8);
            }
        }
    }

    pub fn tick(&mut self, phase: ClockPhase) {
        self.accumulator.tick(phase);
        self.temp.tick(phase);
        self.output.tick(phase);
        self.carry.tick(phase);
    }
}

impl Default for AluCore {
    fn default() -> Self {
        Self::new()
    }
}
