//! 4002-style RAM: character storage split into register banks, a status
//! character array per bank, and a write-only output port.

use crate::bus::Bus;
use crate::components::clock::ClockPhase;
use crate::components::cpu::ControlLines;

use super::decoder::MemoryDecoder;

pub struct Ram4002 {
    decoder: MemoryDecoder,
    registers: usize,
    chars_per_register: usize,
    status_per_register: usize,
}

impl Ram4002 {
    /// RAM chip with the given geometry. The SRC field widths cap the
    /// geometry at 4 registers of 16 characters with 4 status characters;
    /// anything beyond that is a configuration error reported at build
    /// time, not mid-simulation.
    pub fn create_memory(
        chip_id: u8,
        registers: usize,
        chars_per_register: usize,
        status_per_register: usize,
    ) -> Result<Self, String> {
        let decoder =
            MemoryDecoder::new_data(chip_id, registers, chars_per_register, status_per_register)?;
        Ok(Ram4002 {
            decoder,
            registers,
            chars_per_register,
            status_per_register,
        })
    }

    pub fn process(
        &mut self,
        external_bus: &mut Bus,
        io_bus: &mut Bus,
        lines: ControlLines,
        phase: ClockPhase,
    ) {
        self.decoder.process(external_bus, io_bus, lines, phase);
    }

    pub fn is_src_detected(&self) -> bool {
        self.decoder.is_src_detected()
    }

    pub fn get_src_device(&self) -> u8 {
        self.decoder.get_src_device()
    }

    pub fn get_src_register(&self) -> u8 {
        self.decoder.get_src_register()
    }

    pub fn get_src_character(&self) -> u8 {
        self.decoder.get_src_character()
    }

    pub fn get_phase(&self) -> u8 {
        self.decoder.get_phase()
    }

    pub fn get_total_clocks(&self) -> u64 {
        self.decoder.get_total_clocks()
    }

    pub fn register_count(&self) -> usize {
        self.registers
    }

    pub fn chars_per_register(&self) -> usize {
        self.chars_per_register
    }

    pub fn status_per_register(&self) -> usize {
        self.status_per_register
    }

    /// Direct storage access for inspection and test setup.
    pub fn read_character(&self, register: usize, character: usize) -> u8 {
        self.decoder.read_character_direct(register, character)
    }

    pub fn write_character(&mut self, register: usize, character: usize, value: u8) {
        self.decoder.write_character_direct(register, character, value);
    }

    pub fn read_status(&self, register: usize, status: usize) -> u8 {
        self.decoder.read_status_direct(register, status)
    }

    pub fn character_storage(&self) -> &[u8] {
        self.decoder.character_storage()
    }
}
