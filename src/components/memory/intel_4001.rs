//! 4001-style ROM: 256 bytes of program storage plus a 4-bit I/O port.

use crate::bus::Bus;
use crate::components::clock::ClockPhase;
use crate::components::cpu::ControlLines;

use super::decoder::{MemoryDecoder, PROGRAM_BYTES};

pub struct Rom4001 {
    decoder: MemoryDecoder,
}

impl Rom4001 {
    /// ROM with chip ID 0, answering addresses 0x000..=0x0FF.
    pub fn new() -> Self {
        Rom4001 {
            decoder: MemoryDecoder::new_program(0),
        }
    }

    /// Reassign the chip ID; the chip then answers page `id` fetches and
    /// SRC selects naming device `id`.
    pub fn set_rom_id(&mut self, chip_id: u8) {
        self.decoder.set_chip_id(chip_id);
    }

    pub fn get_rom_id(&self) -> u8 {
        self.decoder.get_chip_id()
    }

    /// Load a program image starting at offset 0. Images longer than the
    /// chip's 256-byte address space are rejected.
    pub fn load_program(&mut self, image: &[u8]) -> Result<(), String> {
        self.decoder.load_program(image)
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

    pub fn is_chip_selected(&self) -> bool {
        self.decoder.is_chip_selected()
    }

    pub fn is_src_detected(&self) -> bool {
        self.decoder.is_src_detected()
    }

    pub fn get_src_device(&self) -> u8 {
        self.decoder.get_src_device()
    }

    pub fn get_io_port(&self) -> u8 {
        self.decoder.get_io_port()
    }

    pub fn get_byte(&self, address: usize) -> u8 {
        self.decoder.get_program_byte(address)
    }

    pub fn get_address(&self) -> u16 {
        self.decoder.get_address()
    }

    pub fn get_phase(&self) -> u8 {
        self.decoder.get_phase()
    }

    pub fn get_total_clocks(&self) -> u64 {
        self.decoder.get_total_clocks()
    }

    pub fn capacity(&self) -> usize {
        PROGRAM_BYTES
    }
}

impl Default for Rom4001 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_fills_from_offset_zero() {
        let mut rom = Rom4001::new();
        rom.load_program(&[0xD5, 0xB2]).unwrap();
        assert_eq!(rom.get_byte(0), 0xD5);
        assert_eq!(rom.get_byte(1), 0xB2);
        assert_eq!(rom.get_byte(2), 0x00);
    }

    #[test]
    fn test_oversized_image_fails_fast() {
        let mut rom = Rom4001::new();
        let image = vec![0u8; 257];
        let err = rom.load_program(&image).unwrap_err();
        assert!(err.contains("256"));
    }
}
