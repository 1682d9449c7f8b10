//! Instruction decode: opcode constants and the per-phase control table.
//!
//! The CPU core is a thin state machine; everything an instruction does is
//! expressed here as a `ControlFlags` record computed from the opcode, the
//! current phase of the eight-phase machine cycle and the second-cycle bit.
//! The core just applies the flags in a fixed datapath order, so instruction
//! behavior is a pure function that can be tested without a bus or clock.

use super::alu::AluMode;

// One machine cycle is eight clock ticks: three address phases, two
// instruction-fetch phases, three execute phases.
pub const PHASE_A1: u8 = 0;
pub const PHASE_A2: u8 = 1;
pub const PHASE_A3: u8 = 2;
pub const PHASE_M1: u8 = 3;
pub const PHASE_M2: u8 = 4;
pub const PHASE_X1: u8 = 5;
pub const PHASE_X2: u8 = 6;
pub const PHASE_X3: u8 = 7;
pub const PHASES_PER_CYCLE: u8 = 8;

// Opcode bases. The low nibble (OPA) carries the register, pair, condition
// or immediate operand; IO opcodes use the full byte.
pub const OP_NOP: u8 = 0x00;
pub const OP_JCN: u8 = 0x10;
pub const OP_FIM: u8 = 0x20;
pub const OP_SRC: u8 = 0x21;
pub const OP_JUN: u8 = 0x40;
pub const OP_JMS: u8 = 0x50;
pub const OP_INC: u8 = 0x60;
pub const OP_ISZ: u8 = 0x70;
pub const OP_ADD: u8 = 0x80;
pub const OP_SUB: u8 = 0x90;
pub const OP_LD: u8 = 0xA0;
pub const OP_XCH: u8 = 0xB0;
pub const OP_BBL: u8 = 0xC0;
pub const OP_LDM: u8 = 0xD0;

pub const OP_WRM: u8 = 0xE0;
pub const OP_WMP: u8 = 0xE1;
pub const OP_WRR: u8 = 0xE2;
pub const OP_WR0: u8 = 0xE4;
pub const OP_WR1: u8 = 0xE5;
pub const OP_WR2: u8 = 0xE6;
pub const OP_WR3: u8 = 0xE7;
pub const OP_RDM: u8 = 0xE9;
pub const OP_RDR: u8 = 0xEA;
pub const OP_RD0: u8 = 0xEC;
pub const OP_RD1: u8 = 0xED;
pub const OP_RD2: u8 = 0xEE;
pub const OP_RD3: u8 = 0xEF;

/// Direction of the coupling between the CPU-internal bus and the shared
/// external bus for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusDirection {
    /// Internal value is driven out onto the external bus.
    Output,
    /// External bus value is copied onto the internal bus.
    Input,
}

/// Which piece of the instruction register is driven onto the internal bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstSource {
    /// Low nibble of the opcode byte latched in the first cycle.
    Opa,
    /// High nibble of the most recently fetched byte.
    HighNibble,
    /// Low nibble of the most recently fetched byte.
    LowNibble,
}

/// Which half of the instruction register latches the bus this phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstHalf {
    High,
    Low,
}

/// Everything the datapath can be told to do in one clock phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    /// Drive this nibble of the program counter onto the external bus.
    pub pc_out: Option<usize>,
    pub pc_inc: bool,
    /// Load this nibble of the program counter from the internal bus.
    pub pc_load: Option<usize>,
    pub stack_push: bool,
    pub stack_pop: bool,
    pub inst_out: Option<InstSource>,
    /// Latch this half of the fetched byte from the external bus.
    pub inst_load: Option<InstHalf>,
    pub index_out: Option<usize>,
    pub index_load: Option<usize>,
    pub acc_out: bool,
    pub acc_load: bool,
    pub temp_out: bool,
    pub temp_load: bool,
    pub alu_out: bool,
    pub alu_eval: Option<AluMode>,
    pub bus_dir: Option<BusDirection>,
    pub sync: bool,
    pub cm_rom: bool,
    pub cm_ram: bool,
}

/// True for instructions whose operand occupies a second machine cycle.
pub fn is_two_cycle(opcode: u8) -> bool {
    match opcode & 0xF0 {
        0x10 | 0x40 | 0x50 | 0x70 => true,
        0x20 => opcode & 0x01 == 0, // FIM; SRC is the odd half of the row
        _ => false,
    }
}

fn is_src(opcode: u8) -> bool {
    opcode & 0xF0 == 0x20 && opcode & 0x01 == 1
}

/// Evaluate the JCN condition nibble against current CPU state. The test
/// pin is not modelled and reads as inactive, so its condition bit is
/// always satisfied.
pub fn jcn_condition(condition: u8, accumulator: u8, carry: bool) -> bool {
    let invert = condition & 0x8 != 0;
    let mut taken = false;
    if condition & 0x4 != 0 && accumulator == 0 {
        taken = true;
    }
    if condition & 0x2 != 0 && carry {
        taken = true;
    }
    if condition & 0x1 != 0 {
        taken = true;
    }
    if invert {
        !taken
    } else {
        taken
    }
}

/// Control table. `opcode` is the byte latched during the first cycle of
/// the instruction, `phase` the position within the current machine cycle,
/// `second_cycle` whether this is the operand cycle of a two-byte
/// instruction, `jump_taken` the precomputed branch decision.
pub fn control_flags(opcode: u8, phase: u8, second_cycle: bool, jump_taken: bool) -> ControlFlags {
    let mut flags = ControlFlags::default();
    let opa = (opcode & 0x0F) as usize;

    match phase {
        // Address out. The CPU owns the bus for all three nibbles.
        PHASE_A1 => {
            flags.pc_out = Some(0);
            flags.bus_dir = Some(BusDirection::Output);
        }
        PHASE_A2 => {
            flags.pc_out = Some(1);
            flags.pc_inc = true;
            flags.bus_dir = Some(BusDirection::Output);
        }
        PHASE_A3 => {
            flags.pc_out = Some(2);
            flags.bus_dir = Some(BusDirection::Output);
        }
        // Instruction fetch. The selected memory chip drives the bus; a
        // nibble driven during one phase is latched at the start of the
        // next, so the high half lands at M2 and the low half at X1.
        PHASE_M1 => {
            flags.bus_dir = Some(BusDirection::Input);
        }
        PHASE_M2 => {
            flags.bus_dir = Some(BusDirection::Input);
            flags.inst_load = Some(InstHalf::High);
        }
        PHASE_X1 => {
            flags.inst_load = Some(InstHalf::Low);
            execute_x1(&mut flags, opcode, opa, second_cycle, jump_taken);
        }
        PHASE_X2 => execute_x2(&mut flags, opcode, opa, second_cycle, jump_taken),
        PHASE_X3 => {
            execute_x3(&mut flags, opcode, opa, second_cycle, jump_taken);
            flags.sync = true;
        }
        _ => unreachable!("machine cycle phase out of range: {}", phase),
    }
    flags
}

fn execute_x1(flags: &mut ControlFlags, opcode: u8, opa: usize, second_cycle: bool, taken: bool) {
    if second_cycle {
        match opcode & 0xF0 {
            0x20 => {
                // FIM: second byte lands in the register pair, high nibble
                // into the even register.
                flags.inst_out = Some(InstSource::HighNibble);
                flags.index_load = Some(opa & 0xE);
            }
            // JUN/JMS carry a 12-bit target; the high nibble rides in the
            // opcode's OPA field. JCN/ISZ are page-relative: their 8-bit
            // operand replaces only the low two PC nibbles.
            0x40 | 0x50 if taken => {
                flags.inst_out = Some(InstSource::Opa);
                flags.pc_load = Some(2);
                if opcode & 0xF0 == 0x50 {
                    flags.stack_push = true;
                }
            }
            _ => {}
        }
        return;
    }
    match opcode & 0xF0 {
        0x60 | 0x70 | 0x80 | 0x90 => {
            flags.index_out = Some(opa);
            flags.temp_load = true;
        }
        0xA0 => {
            flags.index_out = Some(opa);
            flags.acc_load = true;
        }
        0xB0 => {
            flags.index_out = Some(opa);
            flags.temp_load = true;
        }
        0xC0 => {
            flags.inst_out = Some(InstSource::Opa);
            flags.acc_load = true;
            flags.stack_pop = true;
        }
        0xD0 => {
            flags.inst_out = Some(InstSource::Opa);
            flags.acc_load = true;
        }
        _ => {}
    }
}

fn execute_x2(flags: &mut ControlFlags, opcode: u8, opa: usize, second_cycle: bool, taken: bool) {
    if second_cycle {
        match opcode & 0xF0 {
            0x20 => {
                flags.inst_out = Some(InstSource::LowNibble);
                flags.index_load = Some(opa | 0x1);
            }
            0x10 | 0x40 | 0x50 | 0x70 if taken => {
                flags.inst_out = Some(InstSource::HighNibble);
                flags.pc_load = Some(1);
            }
            _ => {}
        }
        return;
    }
    if is_src(opcode) {
        // Device-select nibble from the even register of the pair. Both CM
        // lines pulse: every memory chip latches the fields and compares.
        flags.index_out = Some(opa & 0xE);
        flags.bus_dir = Some(BusDirection::Output);
        flags.cm_rom = true;
        flags.cm_ram = true;
        return;
    }
    match opcode & 0xF0 {
        0x60 => flags.alu_eval = Some(AluMode::Increment),
        0x70 => flags.alu_eval = Some(AluMode::Increment),
        0x80 => flags.alu_eval = Some(AluMode::Add),
        0x90 => flags.alu_eval = Some(AluMode::Subtract),
        0xB0 => {
            flags.acc_out = true;
            flags.index_load = Some(opa);
        }
        0xE0 => match opcode {
            OP_WRM | OP_WMP | OP_WR0 | OP_WR1 | OP_WR2 | OP_WR3 => {
                flags.acc_out = true;
                flags.bus_dir = Some(BusDirection::Output);
                flags.cm_ram = true;
            }
            OP_WRR => {
                flags.acc_out = true;
                flags.bus_dir = Some(BusDirection::Output);
                flags.cm_rom = true;
            }
            OP_RDM | OP_RD0 | OP_RD1 | OP_RD2 | OP_RD3 => {
                flags.bus_dir = Some(BusDirection::Input);
                flags.cm_ram = true;
            }
            OP_RDR => {
                flags.bus_dir = Some(BusDirection::Input);
                flags.cm_rom = true;
            }
            _ => {}
        },
        _ => {}
    }
}

fn execute_x3(flags: &mut ControlFlags, opcode: u8, opa: usize, second_cycle: bool, taken: bool) {
    if second_cycle {
        if let 0x10 | 0x40 | 0x50 | 0x70 = opcode & 0xF0 {
            if taken {
                flags.inst_out = Some(InstSource::LowNibble);
                flags.pc_load = Some(0);
            }
        }
        return;
    }
    if is_src(opcode) {
        flags.index_out = Some(opa);
        flags.bus_dir = Some(BusDirection::Output);
        flags.cm_rom = true;
        flags.cm_ram = true;
        return;
    }
    match opcode & 0xF0 {
        0x60 | 0x70 => {
            flags.alu_out = true;
            flags.index_load = Some(opa);
        }
        0x80 | 0x90 => {
            flags.alu_out = true;
            flags.acc_load = true;
        }
        0xB0 => {
            flags.temp_out = true;
            flags.acc_load = true;
        }
        0xE0 => match opcode {
            OP_RDM | OP_RDR | OP_RD0 | OP_RD1 | OP_RD2 | OP_RD3 => {
                flags.bus_dir = Some(BusDirection::Input);
                flags.acc_load = true;
            }
            _ => {}
        },
        _ => {}
    }
}
