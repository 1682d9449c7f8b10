//! Test benches that stand in for the rest of the board.
//!
//! `CpuBench` plays the part of a ROM chip against an isolated CPU core:
//! it feeds opcode nibbles onto the bus during the fetch phases and records
//! the address the CPU drives during the address phases. `ChipBench` plays
//! the part of the CPU against an isolated memory chip: it drives address
//! nibbles, SYNC and the CM lines the way the core would.

// Not every test binary uses every helper.
#![allow(dead_code)]

use mcs4_sim::bus::Bus;
use mcs4_sim::components::clock::ClockPhase;
use mcs4_sim::components::cpu::{ControlLines, CpuCore};
use mcs4_sim::components::memory::{Ram4002, Rom4001};

pub struct CpuBench {
    pub cpu: CpuCore,
    pub bus: Bus,
}

impl CpuBench {
    pub fn new() -> Self {
        CpuBench {
            cpu: CpuCore::new(),
            bus: Bus::new("bench.ext", 4),
        }
    }

    /// One clock tick. `drive` is put on the bus before the LOW phase, the
    /// way a peripheral's drive from the previous phase would still be
    /// visible. Returns the bus value after the LOW phase.
    pub fn tick(&mut self, drive: Option<u8>) -> u8 {
        self.bus.reset();
        if let Some(value) = drive {
            self.bus.write(value as u16);
        }
        self.cpu.process(&mut self.bus, ClockPhase::Low);
        let observed = (self.bus.read() & 0xF) as u8;
        self.bus.reset();
        self.cpu.process(&mut self.bus, ClockPhase::High);
        observed
    }

    /// One full machine cycle feeding `opcode` during the fetch phases.
    /// Returns the 12-bit address the CPU drove during A1..A3.
    pub fn run_cycle(&mut self, opcode: u8) -> u16 {
        self.run_cycle_with_io(opcode, None)
    }

    /// As `run_cycle`, additionally answering an I/O read by driving
    /// `io_response` during X3 the way an armed chip would.
    pub fn run_cycle_with_io(&mut self, opcode: u8, io_response: Option<u8>) -> u16 {
        assert_eq!(self.cpu.get_phase(), 0, "bench out of step with the CPU");
        let mut address = 0u16;
        for phase in 0..8u8 {
            let drive = match phase {
                4 => Some(opcode >> 4),
                5 => Some(opcode & 0xF),
                7 => io_response,
                _ => None,
            };
            let observed = self.tick(drive);
            if phase < 3 {
                address |= (observed as u16) << (4 * phase);
            }
        }
        address
    }

    /// Run until SYNC is observed, returning how many ticks it took to
    /// appear (SYNC commits on the final phase of a machine cycle).
    pub fn wait_for_sync(&mut self) -> (bool, u8) {
        for i in 0..16u8 {
            self.tick(None);
            if self.cpu.get_sync() {
                return (true, i);
            }
        }
        (false, 0)
    }
}

/// Uniform bus-side interface over the two memory chip families, for the
/// bench only.
pub trait BusChip {
    fn chip_process(&mut self, bus: &mut Bus, io: &mut Bus, lines: ControlLines, phase: ClockPhase);
}

impl BusChip for Rom4001 {
    fn chip_process(&mut self, bus: &mut Bus, io: &mut Bus, lines: ControlLines, phase: ClockPhase) {
        self.process(bus, io, lines, phase);
    }
}

impl BusChip for Ram4002 {
    fn chip_process(&mut self, bus: &mut Bus, io: &mut Bus, lines: ControlLines, phase: ClockPhase) {
        self.process(bus, io, lines, phase);
    }
}

pub struct ChipBench<C: BusChip> {
    pub chip: C,
    pub bus: Bus,
    pub io: Bus,
}

/// What the bench drives (or asserts) during each phase of one cycle.
#[derive(Default, Clone, Copy)]
struct CyclePlan {
    address: u16,
    opcode: Option<u8>,
    x2_drive: Option<u8>,
    x2_cm: bool,
    x3_drive: Option<u8>,
    x3_cm: bool,
}

impl<C: BusChip> ChipBench<C> {
    pub fn new(chip: C) -> Self {
        ChipBench {
            chip,
            bus: Bus::new("bench.ext", 4),
            io: Bus::new("bench.io", 4),
        }
    }

    fn run_plan(&mut self, plan: CyclePlan) -> (Option<u8>, Option<u8>, Option<u8>) {
        let mut fetch_high = None;
        let mut fetch_low = None;
        let mut x3_read = None;
        for phase in 0..8u8 {
            self.bus.reset();
            self.io.reset();
            let lines = ControlLines {
                sync: phase == 0,
                cm_rom: (phase == 6 && plan.x2_cm) || (phase == 7 && plan.x3_cm),
                cm_ram: (phase == 6 && plan.x2_cm) || (phase == 7 && plan.x3_cm),
            };
            match phase {
                0 => self.bus.write(plan.address & 0xF),
                1 => self.bus.write((plan.address >> 4) & 0xF),
                2 => self.bus.write((plan.address >> 8) & 0xF),
                3 => {
                    if let Some(op) = plan.opcode {
                        self.bus.write((op >> 4) as u16);
                    }
                }
                4 => {
                    if let Some(op) = plan.opcode {
                        self.bus.write((op & 0xF) as u16);
                    }
                }
                6 => {
                    if let Some(value) = plan.x2_drive {
                        self.bus.write(value as u16);
                    }
                }
                7 => {
                    if let Some(value) = plan.x3_drive {
                        self.bus.write(value as u16);
                    }
                }
                _ => {}
            }
            self.chip
                .chip_process(&mut self.bus, &mut self.io, lines, ClockPhase::Low);
            match phase {
                3 if plan.opcode.is_none() && self.bus.was_driven() => {
                    fetch_high = Some((self.bus.read() & 0xF) as u8);
                }
                4 if plan.opcode.is_none() && self.bus.was_driven() => {
                    fetch_low = Some((self.bus.read() & 0xF) as u8);
                }
                6 | 7 if plan.x2_drive.is_none() && plan.x3_drive.is_none() => {
                    if self.bus.was_driven() && x3_read.is_none() {
                        x3_read = Some((self.bus.read() & 0xF) as u8);
                    }
                }
                _ => {}
            }
            self.chip
                .chip_process(&mut self.bus, &mut self.io, lines, ClockPhase::High);
        }
        (fetch_high, fetch_low, x3_read)
    }

    /// Drive a fetch at `address` and return the byte the chip drove during
    /// M1/M2, or `None` if it stayed silent.
    pub fn run_fetch_cycle(&mut self, address: u16) -> Option<u8> {
        let (high, low, _) = self.run_plan(CyclePlan {
            address,
            ..CyclePlan::default()
        });
        match (high, low) {
            (Some(h), Some(l)) => Some((h << 4) | l),
            _ => None,
        }
    }

    /// Present an SRC cycle: the opcode during fetch, then the select
    /// nibble at X2 and the character nibble at X3, both under CM.
    pub fn run_src_cycle(&mut self, select: u8, character: u8) {
        self.run_plan(CyclePlan {
            address: 0xF00, // an unselected page, so the chip stays silent
            opcode: Some(0x21),
            x2_drive: Some(select),
            x2_cm: true,
            x3_drive: Some(character),
            x3_cm: true,
        });
    }

    /// Present an I/O write: the opcode during fetch, the accumulator
    /// value at X2 under CM.
    pub fn run_io_write_cycle(&mut self, opcode: u8, value: u8) {
        self.run_plan(CyclePlan {
            address: 0xF00,
            opcode: Some(opcode),
            x2_drive: Some(value),
            x2_cm: true,
            ..CyclePlan::default()
        });
    }

    /// Present an I/O read and return what the chip drove, if anything.
    pub fn run_io_read_cycle(&mut self, opcode: u8) -> Option<u8> {
        let (_, _, value) = self.run_plan(CyclePlan {
            address: 0xF00,
            opcode: Some(opcode),
            x2_cm: true,
            ..CyclePlan::default()
        });
        value
    }

    /// Present a plain opcode cycle with no execute-phase traffic.
    pub fn run_opcode_cycle(&mut self, opcode: u8) {
        self.run_plan(CyclePlan {
            address: 0xF00,
            opcode: Some(opcode),
            ..CyclePlan::default()
        });
    }
}
