//! The 4004 CPU core: address stack, index registers, ALU and decoder,
//! wired to the shared external bus through a CPU-local internal bus.
//!
//! On every LOW phase the core advances its eight-phase counter, latches
//! fetched nibbles, computes the control flags for the current
//! `(phase, opcode)` pair and applies them in a fixed datapath order. On
//! every HIGH phase all edge-triggered state commits at once.
//!
//! Bus timing is deliberately skewed: the external bus keeps its value when
//! reset (only the driven flag clears), so a value a peripheral drove in
//! phase N is sampled by the core in phase N+1. This is why the opcode high
//! nibble, driven by the ROM at M1, is latched here at M2, and the low
//! nibble, driven at M2, at X1.

use crate::bus::Bus;
use crate::clocked::Clocked;
use crate::components::clock::ClockPhase;
use crate::types::U12;

use super::address_stack::AddressStack;
use super::alu::AluCore;
use super::index_registers::IndexRegisters;
use super::instruction::{
    control_flags, is_two_cycle, jcn_condition, BusDirection, ControlFlags, InstHalf, InstSource,
    PHASES_PER_CYCLE, PHASE_X3,
};

/// Level of the three control outputs as seen by the memory chips.
///
/// SYNC is registered: peripherals observe the value committed on the
/// previous HIGH edge. The CM chip-select lines are combinational levels
/// valid within the current phase, which works because the clock
/// distributor runs the CPU before any peripheral.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlLines {
    pub sync: bool,
    pub cm_rom: bool,
    pub cm_ram: bool,
}

pub struct CpuCore {
    internal_bus: Bus,
    stack: AddressStack,
    index: IndexRegisters,
    alu: AluCore,
    phase_counter: Clocked<u8>,
    sync: Clocked<bool>,
    cm_rom: bool,
    cm_ram: bool,
    instruction: u8,
    fetched_high: u8,
    fetched_low: u8,
    second_cycle: bool,
    jump_taken: bool,
    total_clocks: u64,
}

impl CpuCore {
    pub fn new() -> Self {
        CpuCore {
            internal_bus: Bus::new("cpu.internal", 4),
            stack: AddressStack::new(),
            index: IndexRegisters::new(),
            alu: AluCore::new(),
            phase_counter: Clocked::new(0, ClockPhase::High),
            // SYNC idles high out of reset so peripherals align on cycle 0.
            sync: Clocked::new(true, ClockPhase::High),
            cm_rom: false,
            cm_ram: false,
            instruction: 0,
            fetched_high: 0,
            fetched_low: 0,
            second_cycle: false,
            jump_taken: false,
            total_clocks: 0,
        }
    }

    /// Power-on state: PC 0, SYNC asserted, accumulator and carry clear.
    pub fn reset(&mut self) {
        *self = CpuCore::new();
    }

    pub fn process(&mut self, external_bus: &mut Bus, phase: ClockPhase) {
        match phase {
            ClockPhase::Low => self.phase_low(external_bus),
            ClockPhase::High => self.phase_high(),
        }
    }

    fn phase_low(&mut self, external_bus: &mut Bus) {
        self.total_clocks += 1;
        let count = self.phase_counter.read();
        self.phase_counter.write((count + 1) % PHASES_PER_CYCLE);
        self.internal_bus.reset();

        // Fetch pipeline, one phase behind the memory chip's drive. The
        // latch enable is opcode-independent, so probing the table with the
        // previous instruction is fine; the flags applied below are then
        // recomputed against the freshly latched opcode.
        let latch = control_flags(self.instruction, count, self.second_cycle, self.jump_taken);
        match latch.inst_load {
            Some(InstHalf::High) => {
                self.fetched_high = (external_bus.read() & 0xF) as u8;
            }
            Some(InstHalf::Low) => {
                self.fetched_low = (external_bus.read() & 0xF) as u8;
                if !self.second_cycle {
                    self.instruction = (self.fetched_high << 4) | self.fetched_low;
                }
                self.jump_taken = self.branch_decision();
            }
            None => {}
        }

        let flags = control_flags(self.instruction, count, self.second_cycle, self.jump_taken);
        self.apply(&flags, external_bus);

        if count == PHASE_X3 {
            self.second_cycle = !self.second_cycle && is_two_cycle(self.instruction);
        }
    }

    fn phase_high(&mut self) {
        self.stack.tick(ClockPhase::High);
        self.index.tick(ClockPhase::High);
        self.alu.tick(ClockPhase::High);
        self.phase_counter.tick(ClockPhase::High);
        self.sync.tick(ClockPhase::High);
    }

    /// Branch decision for the cycle, evaluated once the opcode (or its
    /// operand byte) has been latched. ISZ is decided on its second cycle,
    /// after the incremented register value has committed.
    fn branch_decision(&self) -> bool {
        let opa = (self.instruction & 0x0F) as usize;
        match self.instruction & 0xF0 {
            0x40 | 0x50 => true,
            0x10 => jcn_condition(self.instruction & 0x0F, self.alu.accumulator(), self.alu.carry()),
            0x70 => self.index.read_direct(opa) != 0,
            _ => false,
        }
    }

    fn apply(&mut self, flags: &ControlFlags, external_bus: &mut Bus) {
        // Internal bus sources.
        if let Some(source) = flags.inst_out {
            let value = match source {
                InstSource::Opa => self.instruction & 0x0F,
                InstSource::HighNibble => self.fetched_high,
                InstSource::LowNibble => self.fetched_low,
            };
            self.internal_bus.write(value as u16);
        }
        if let Some(index) = flags.index_out {
            self.index.read_to_bus(index, &mut self.internal_bus);
        }
        if flags.acc_out {
            self.alu.drive_accumulator(&mut self.internal_bus);
        }
        if flags.temp_out {
            self.alu.drive_temp(&mut self.internal_bus);
        }
        if flags.alu_out {
            self.alu.drive_output(&mut self.internal_bus);
        }

        // Couple the buses in the direction the decoder chose.
        match flags.bus_dir {
            Some(BusDirection::Output) => {
                if self.internal_bus.was_driven() {
                    external_bus.write(self.internal_bus.read());
                }
            }
            Some(BusDirection::Input) => {
                self.internal_bus.write(external_bus.read());
            }
            None => {}
        }

        // Address stack. Pushes read the committed PC, so a push staged in
        // the same phase as a PC load still saves the return address.
        if let Some(nibble) = flags.pc_out {
            self.stack.read_program_counter(nibble, external_bus);
        }
        if flags.pc_inc {
            self.stack.increment();
        }
        if flags.stack_push {
            self.stack.push();
        }
        if let Some(nibble) = flags.pc_load {
            self.stack.write_program_counter(nibble, &self.internal_bus);
        }
        if flags.stack_pop {
            self.stack.pop();
        }

        if let Some(mode) = flags.alu_eval {
            self.alu.evaluate(mode);
        }

        // Register loads sample the internal bus last.
        if flags.acc_load {
            self.alu.load_accumulator(&self.internal_bus);
        }
        if flags.temp_load {
            self.alu.load_temp(&self.internal_bus);
        }
        if let Some(index) = flags.index_load {
            self.index.load_from_bus(index, &self.internal_bus);
        }

        self.sync.write(flags.sync);
        self.cm_rom = flags.cm_rom;
        self.cm_ram = flags.cm_ram;
    }

    // Snapshot accessors for benches, the console and the peripherals.

    pub fn get_program_counter(&self) -> U12 {
        self.stack.program_counter()
    }

    pub fn get_accumulator(&self) -> u8 {
        self.alu.accumulator()
    }

    pub fn get_carry(&self) -> bool {
        self.alu.carry()
    }

    pub fn get_temp(&self) -> u8 {
        self.alu.temp()
    }

    pub fn get_index_register(&self, index: usize) -> u8 {
        self.index.read_direct(index)
    }

    pub fn get_sync(&self) -> bool {
        self.sync.read()
    }

    pub fn get_control_lines(&self) -> ControlLines {
        ControlLines {
            sync: self.sync.read(),
            cm_rom: self.cm_rom,
            cm_ram: self.cm_ram,
        }
    }

    /// Phase the next LOW tick will execute (0..=7).
    pub fn get_phase(&self) -> u8 {
        self.phase_counter.read()
    }

    pub fn get_total_clocks(&self) -> u64 {
        self.total_clocks
    }

    pub fn get_instruction(&self) -> u8 {
        self.instruction
    }

    pub fn is_second_cycle(&self) -> bool {
        self.second_cycle
    }

    pub fn get_internal_bus_value(&self) -> u16 {
        self.internal_bus.read()
    }

    /// Direct accumulator access for test setup, mirroring the hardware's
    /// own debug path.
    pub fn set_accumulator(&mut self, value: u8) {
        self.alu.force_accumulator(value);
    }

    pub fn set_index_register(&mut self, index: usize, value: u8) {
        self.index.write_direct(index, value);
    }

    pub fn stack_entry(&self, level: usize) -> U12 {
        self.stack.stack_entry(level)
    }
}

impl Default for CpuCore {
    fn default() -> Self {
        Self::new()
    }
}
