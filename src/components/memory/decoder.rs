//! Shared ROM/RAM decode logic.
//!
//! Both memory chip families run the same bus-side state machine: realign
//! the phase counter on SYNC, latch the three address nibbles, compare the
//! page against the chip ID, drive the program byte during the fetch phases
//! when selected, watch the fetched byte for SRC and I/O opcodes, and act
//! on the execute-phase bus traffic when armed. The family-specific parts
//! (program storage vs character/status storage, how the select nibble is
//! split into fields) are switched on `StorageKind`.
//!
//! SRC detection has to distinguish SRC from FIM, which shares the top
//! opcode nibble: the M1 nibble only makes the cycle a candidate, and the
//! low bit of the M2 nibble decides. A data byte of a two-cycle instruction
//! is never decoded as an opcode.

use crate::bus::Bus;
use crate::components::clock::ClockPhase;
use crate::components::cpu::instruction::{
    is_two_cycle, OP_RD0, OP_RD3, OP_RDM, OP_RDR, OP_WMP, OP_WR0, OP_WR3, OP_WRM, OP_WRR,
    PHASES_PER_CYCLE, PHASE_A1, PHASE_A2, PHASE_A3, PHASE_M1, PHASE_M2, PHASE_X2, PHASE_X3,
};
use crate::components::cpu::ControlLines;
use crate::clocked::Clocked;

pub const PROGRAM_BYTES: usize = 256;

/// What a chip stores and which CM line and SRC field layout it answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// ROM-class: 256 bytes of program, one output port, selected by the
    /// full high address nibble and a 4-bit SRC chip number.
    Program,
    /// RAM-class: character and status storage, one write-only output
    /// port, selected only through SRC (2-bit chip, 2-bit register).
    Data,
}

pub struct MemoryDecoder {
    kind: StorageKind,
    chip_id: u8,
    phase_counter: Clocked<u8>,
    synced: bool,
    address: u16,
    chip_selected: bool,
    fetched_high: u8,
    fetched_low: u8,
    current_op: u8,
    second_cycle: bool,
    src_candidate: bool,
    src_cycle: bool,
    src_detected: bool,
    src_device: u8,
    src_register: u8,
    src_character: u8,
    pending_character: Option<u8>,
    program: Vec<u8>,
    characters: Vec<u8>,
    status: Vec<u8>,
    registers: usize,
    chars_per_register: usize,
    status_per_register: usize,
    io_port: u8,
    total_clocks: u64,
}

impl MemoryDecoder {
    pub fn new_program(chip_id: u8) -> Self {
        MemoryDecoder {
            kind: StorageKind::Program,
            chip_id: chip_id & 0xF,
            phase_counter: Clocked::new(0, ClockPhase::High),
            synced: false,
            address: 0,
            chip_selected: false,
            fetched_high: 0,
            fetched_low: 0,
            current_op: 0,
            second_cycle: false,
            src_candidate: false,
            src_cycle: false,
            src_detected: false,
            src_device: 0,
            src_register: 0,
            src_character: 0,
            pending_character: None,
            program: vec![0; PROGRAM_BYTES],
            characters: Vec::new(),
            status: Vec::new(),
            registers: 0,
            chars_per_register: 0,
            status_per_register: 0,
            io_port: 0,
            total_clocks: 0,
        }
    }

    /// RAM-class decoder. Geometry is validated up front rather than during
    /// simulation: the 4-bit SRC fields cap characters at 16 per register,
    /// registers at 4 per chip and status characters at 4 per register.
    pub fn new_data(
        chip_id: u8,
        registers: usize,
        chars_per_register: usize,
        status_per_register: usize,
    ) -> Result<Self, String> {
        if registers == 0 || registers > 4 {
            return Err(format!(
                "invalid RAM geometry: {} registers (must be 1..=4)",
                registers
            ));
        }
        if chars_per_register == 0 || chars_per_register > 16 {
            return Err(format!(
                "invalid RAM geometry: {} characters per register (must be 1..=16)",
                chars_per_register
            ));
        }
        if status_per_register > 4 {
            return Err(format!(
                "invalid RAM geometry: {} status characters per register (must be 0..=4)",
                status_per_register
            ));
        }
        let mut decoder = MemoryDecoder::new_program(chip_id & 0x3);
        decoder.kind = StorageKind::Data;
        decoder.program = Vec::new();
        decoder.characters = vec![0; registers * chars_per_register];
        decoder.status = vec![0; registers * status_per_register];
        decoder.registers = registers;
        decoder.chars_per_register = chars_per_register;
        decoder.status_per_register = status_per_register;
        Ok(decoder)
    }

    pub fn set_chip_id(&mut self, chip_id: u8) {
        self.chip_id = match self.kind {
            StorageKind::Program => chip_id & 0xF,
            StorageKind::Data => chip_id & 0x3,
        };
    }

    pub fn get_chip_id(&self) -> u8 {
        self.chip_id
    }

    pub fn load_program(&mut self, image: &[u8]) -> Result<(), String> {
        if self.kind != StorageKind::Program {
            return Err("only ROM-class chips hold a program image".to_string());
        }
        if image.len() > self.program.len() {
            return Err(format!(
                "program image of {} bytes exceeds the {}-byte address space",
                image.len(),
                self.program.len()
            ));
        }
        self.program[..image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn process(
        &mut self,
        external_bus: &mut Bus,
        io_bus: &mut Bus,
        lines: ControlLines,
        phase: ClockPhase,
    ) {
        match phase {
            ClockPhase::Low => self.phase_low(external_bus, io_bus, lines),
            ClockPhase::High => self.phase_counter.tick(ClockPhase::High),
        }
    }

    fn phase_low(&mut self, external_bus: &mut Bus, io_bus: &mut Bus, lines: ControlLines) {
        self.total_clocks += 1;

        // Character select from the previous X3 becomes effective now.
        if let Some(character) = self.pending_character.take() {
            self.src_character = character;
        }

        if !self.synced {
            if !lines.sync {
                return;
            }
            self.synced = true;
        }
        let count = if lines.sync {
            0
        } else {
            (self.phase_counter.read() + 1) % PHASES_PER_CYCLE
        };
        self.phase_counter.write(count);

        let nibble = (external_bus.read() & 0xF) as u8;
        match count {
            PHASE_A1 => self.address = (self.address & 0xFF0) | nibble as u16,
            PHASE_A2 => self.address = (self.address & 0xF0F) | ((nibble as u16) << 4),
            PHASE_A3 => {
                self.address = (self.address & 0x0FF) | ((nibble as u16) << 8);
                self.chip_selected =
                    self.kind == StorageKind::Program && nibble == self.chip_id;
            }
            PHASE_M1 => {
                if self.chip_selected {
                    external_bus.write((self.stored_byte() >> 4) as u16);
                }
                if !self.second_cycle {
                    let observed = (external_bus.read() & 0xF) as u8;
                    self.fetched_high = observed;
                    self.src_candidate = observed == 0x2;
                }
            }
            PHASE_M2 => {
                if self.chip_selected {
                    external_bus.write((self.stored_byte() & 0xF) as u16);
                }
                if !self.second_cycle {
                    self.fetched_low = (external_bus.read() & 0xF) as u8;
                    self.current_op = (self.fetched_high << 4) | self.fetched_low;
                    self.src_cycle = self.src_candidate && self.fetched_low & 0x1 == 1;
                }
            }
            PHASE_X2 => {
                if self.src_cycle && self.cm_asserted(lines) {
                    self.latch_select_fields(nibble);
                } else if self.cm_asserted(lines) && self.src_detected {
                    self.execute_io(external_bus, io_bus, nibble);
                }
            }
            PHASE_X3 => {
                if self.src_cycle && self.cm_asserted(lines) && self.kind == StorageKind::Data {
                    self.pending_character = Some((external_bus.read() & 0xF) as u8);
                }
                self.second_cycle = !self.second_cycle && is_two_cycle(self.current_op);
            }
            _ => {}
        }
    }

    fn cm_asserted(&self, lines: ControlLines) -> bool {
        match self.kind {
            StorageKind::Program => lines.cm_rom,
            StorageKind::Data => lines.cm_ram,
        }
    }

    fn stored_byte(&self) -> u8 {
        self.program[(self.address & 0xFF) as usize]
    }

    /// SRC select nibble. Fields are latched unconditionally so diagnostics
    /// show what was on the bus; only the device comparison arms the chip.
    fn latch_select_fields(&mut self, nibble: u8) {
        match self.kind {
            StorageKind::Program => {
                self.src_device = nibble;
                self.src_register = 0;
            }
            StorageKind::Data => {
                self.src_device = (nibble >> 2) & 0x3;
                self.src_register = nibble & 0x3;
            }
        }
        self.src_detected = self.src_device == self.chip_id;
    }

    fn execute_io(&mut self, external_bus: &mut Bus, io_bus: &mut Bus, nibble: u8) {
        match self.kind {
            StorageKind::Program => match self.current_op {
                OP_WRR => {
                    self.io_port = nibble;
                    io_bus.write(nibble as u16);
                }
                OP_RDR => {
                    external_bus.write(io_bus.read() & 0xF);
                }
                _ => {}
            },
            StorageKind::Data => match self.current_op {
                OP_WRM => {
                    let index = self.character_index();
                    self.characters[index] = nibble;
                }
                OP_RDM => {
                    let index = self.character_index();
                    external_bus.write(self.characters[index] as u16);
                }
                OP_WMP => {
                    // Output port only; the value cannot be read back.
                    io_bus.write(nibble as u16);
                }
                op @ OP_WR0..=OP_WR3 => {
                    if let Some(index) = self.status_index((op - OP_WR0) as usize) {
                        self.status[index] = nibble;
                    }
                }
                op @ OP_RD0..=OP_RD3 => {
                    if let Some(index) = self.status_index((op - OP_RD0) as usize) {
                        external_bus.write(self.status[index] as u16);
                    }
                }
                _ => {}
            },
        }
    }

    fn character_index(&self) -> usize {
        // A select past the chip's geometry wraps, like short address lines.
        let register = self.src_register as usize % self.registers;
        let character = self.src_character as usize % self.chars_per_register;
        register * self.chars_per_register + character
    }

    fn status_index(&self, status: usize) -> Option<usize> {
        if status < self.status_per_register {
            let register = self.src_register as usize % self.registers;
            Some(register * self.status_per_register + status)
        } else {
            None
        }
    }

    // Diagnostic and storage accessors.

    pub fn is_chip_selected(&self) -> bool {
        self.chip_selected
    }

    pub fn is_src_detected(&self) -> bool {
        self.src_detected
    }

    pub fn get_src_device(&self) -> u8 {
        self.src_device
    }

    pub fn get_src_register(&self) -> u8 {
        self.src_register
    }

    pub fn get_src_character(&self) -> u8 {
        self.src_character
    }

    pub fn get_address(&self) -> u16 {
        self.address
    }

    pub fn get_phase(&self) -> u8 {
        self.phase_counter.read()
    }

    pub fn get_total_clocks(&self) -> u64 {
        self.total_clocks
    }

    pub fn get_io_port(&self) -> u8 {
        self.io_port
    }

    pub fn get_program_byte(&self, address: usize) -> u8 {
        self.program[address & 0xFF]
    }

    pub fn read_character_direct(&self, register: usize, character: usize) -> u8 {
        self.characters[register * self.chars_per_register + character]
    }

    pub fn write_character_direct(&mut self, register: usize, character: usize, value: u8) {
        self.characters[register * self.chars_per_register + character] = value & 0xF;
    }

    pub fn read_status_direct(&self, register: usize, status: usize) -> u8 {
        self.status[register * self.status_per_register + status]
    }

    pub fn character_storage(&self) -> &[u8] {
        &self.characters
    }
}
