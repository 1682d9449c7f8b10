//! A minimal MCS-4 board: one CPU, one ROM, one RAM on a shared 4-bit
//! data bus, driven by a single clock distributor.
//!
//! Subscriber order is part of the bus protocol: the CPU registers first
//! so its address and data drives are visible to the memory chips within
//! the same phase, while anything a chip drives is picked up by the CPU
//! one phase later.

use crate::bus::Bus;
use crate::components::clock::{ClockDistributor, ClockPhase};
use crate::components::cpu::CpuCore;
use crate::components::memory::{Ram4002, Rom4001};

pub struct SystemState {
    pub external_bus: Bus,
    pub rom_io_bus: Bus,
    pub ram_io_bus: Bus,
    pub cpu: CpuCore,
    pub rom: Rom4001,
    pub ram: Ram4002,
}

pub struct Mcs4System {
    state: SystemState,
    clock: ClockDistributor<SystemState>,
}

impl Mcs4System {
    /// Board with the standard 4002 geometry: 4 registers of 16 characters
    /// plus 4 status characters each.
    pub fn new() -> Result<Self, String> {
        Mcs4System::with_ram_geometry(0, 4, 16, 4)
    }

    pub fn with_ram_geometry(
        ram_chip_id: u8,
        registers: usize,
        chars_per_register: usize,
        status_per_register: usize,
    ) -> Result<Self, String> {
        let state = SystemState {
            external_bus: Bus::new("mcs4.data", 4),
            rom_io_bus: Bus::new("mcs4.rom_io", 4),
            ram_io_bus: Bus::new("mcs4.ram_io", 4),
            cpu: CpuCore::new(),
            rom: Rom4001::new(),
            ram: Ram4002::create_memory(
                ram_chip_id,
                registers,
                chars_per_register,
                status_per_register,
            )?,
        };

        let mut clock = ClockDistributor::new();
        clock.subscribe("cpu", |state: &mut SystemState, phase: ClockPhase| {
            state.cpu.process(&mut state.external_bus, phase);
        });
        clock.subscribe("rom", |state: &mut SystemState, phase: ClockPhase| {
            let lines = state.cpu.get_control_lines();
            state
                .rom
                .process(&mut state.external_bus, &mut state.rom_io_bus, lines, phase);
        });
        clock.subscribe("ram", |state: &mut SystemState, phase: ClockPhase| {
            let lines = state.cpu.get_control_lines();
            state
                .ram
                .process(&mut state.external_bus, &mut state.ram_io_bus, lines, phase);
        });

        Ok(Mcs4System { state, clock })
    }

    pub fn load_program(&mut self, image: &[u8]) -> Result<(), String> {
        self.state.rom.load_program(image)
    }

    /// One full clock tick: LOW then HIGH, with the drive flags cleared
    /// before each half so the previous phase's owner releases the bus.
    pub fn step_clock(&mut self) {
        self.reset_buses();
        self.clock.broadcast(&mut self.state, ClockPhase::Low);
        self.reset_buses();
        self.clock.broadcast(&mut self.state, ClockPhase::High);
    }

    /// Run for a caller-specified number of clock ticks.
    pub fn run(&mut self, clock_ticks: u64) {
        for _ in 0..clock_ticks {
            self.step_clock();
        }
    }

    /// Run one full eight-phase machine cycle.
    pub fn step_instruction_cycle(&mut self) {
        for _ in 0..8 {
            self.step_clock();
        }
    }

    pub fn reset(&mut self) {
        self.state.cpu.reset();
        self.state.external_bus.reset();
        self.state.rom_io_bus.reset();
        self.state.ram_io_bus.reset();
    }

    fn reset_buses(&mut self) {
        self.state.external_bus.reset();
        self.state.rom_io_bus.reset();
        self.state.ram_io_bus.reset();
    }

    pub fn get_cpu(&self) -> &CpuCore {
        &self.state.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CpuCore {
        &mut self.state.cpu
    }

    pub fn get_rom(&self) -> &Rom4001 {
        &self.state.rom
    }

    pub fn rom_mut(&mut self) -> &mut Rom4001 {
        &mut self.state.rom
    }

    pub fn get_ram(&self) -> &Ram4002 {
        &self.state.ram
    }

    pub fn ram_mut(&mut self) -> &mut Ram4002 {
        &mut self.state.ram
    }

    pub fn get_bus_value(&self) -> u16 {
        self.state.external_bus.read()
    }

    pub fn get_rom_io_value(&self) -> u16 {
        self.state.rom_io_bus.read()
    }

    pub fn get_ram_io_value(&self) -> u16 {
        self.state.ram_io_bus.read()
    }

    pub fn get_tick_count(&self) -> u64 {
        self.clock.tick_count()
    }
}
