//! JSON-based system configuration.
//!
//! A configuration file names the system, describes the ROM (chip ID and
//! program bytes as hex strings) and the RAM geometry, and optionally a
//! default run length. `SystemConfig::build` turns a validated
//! configuration into a ready-to-run [`Mcs4System`].
//!
//! ```json
//! {
//!   "name": "LED counter",
//!   "description": "Counts on the ROM output port",
//!   "rom": { "chip_id": 0, "program": ["0x00", "0x21", "0xA2", "0xE2", "0x62", "0x40", "0x02"] },
//!   "ram": { "chip_id": 0, "registers": 4, "chars_per_register": 16, "status_per_register": 4 },
//!   "run": { "clock_ticks": 256 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::systems::intel_mcs_4::Mcs4System;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rom: RomConfig,
    #[serde(default)]
    pub ram: RamConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RomConfig {
    #[serde(default)]
    pub chip_id: u8,
    /// Program bytes as hex strings ("0x40") or decimal strings.
    pub program: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RamConfig {
    #[serde(default)]
    pub chip_id: u8,
    pub registers: usize,
    pub chars_per_register: usize,
    pub status_per_register: usize,
}

impl Default for RamConfig {
    fn default() -> Self {
        RamConfig {
            chip_id: 0,
            registers: 4,
            chars_per_register: 16,
            status_per_register: 4,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// 0 means free-run until interrupted.
    #[serde(default)]
    pub clock_ticks: u64,
}

impl SystemConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let text = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("cannot read config {}: {}", path.as_ref().display(), e))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("cannot parse config {}: {}", path.as_ref().display(), e))
    }

    pub fn build(&self) -> Result<Mcs4System, String> {
        let image = self
            .rom
            .program
            .iter()
            .map(|s| parse_byte(s))
            .collect::<Result<Vec<u8>, String>>()?;

        let mut system = Mcs4System::with_ram_geometry(
            self.ram.chip_id,
            self.ram.registers,
            self.ram.chars_per_register,
            self.ram.status_per_register,
        )?;
        system.rom_mut().set_rom_id(self.rom.chip_id);
        system.load_program(&image)?;
        Ok(system)
    }
}

fn parse_byte(text: &str) -> Result<u8, String> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else {
        text.parse::<u8>()
    };
    parsed.map_err(|_| format!("invalid program byte: {:?}", text))
}
