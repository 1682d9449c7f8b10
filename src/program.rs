//! Program image helpers and a couple of built-in demo programs.

use crate::components::memory::decoder::PROGRAM_BYTES;

pub use crate::components::cpu::instruction::{
    OP_ADD, OP_BBL, OP_FIM, OP_INC, OP_ISZ, OP_JCN, OP_JMS, OP_JUN, OP_LD, OP_LDM, OP_NOP, OP_RD0,
    OP_RDM, OP_RDR, OP_SRC, OP_SUB, OP_WMP, OP_WR0, OP_WRM, OP_WRR, OP_XCH,
};

/// Append a one-byte instruction: opcode base ORed with its OPA operand.
pub fn add_instruction(program: &mut Vec<u8>, opcode: u8, operand: u8) {
    program.push(opcode | (operand & 0x0F));
}

/// Append a two-byte instruction with its 8-bit operand byte.
pub fn add_two_byte_instruction(program: &mut Vec<u8>, opcode: u8, operand: u8, byte: u8) {
    program.push(opcode | (operand & 0x0F));
    program.push(byte);
}

/// Pad a program image with NOPs up to the full 256-byte ROM.
pub fn fill_empty_program(program: &mut Vec<u8>) {
    while program.len() < PROGRAM_BYTES {
        program.push(OP_NOP);
    }
}

/// Demo: count on the ROM output port. Selects ROM 0 via SRC, then loops
/// loading R2 to the accumulator, writing it to the port and incrementing.
pub fn led_counter_program() -> Vec<u8> {
    let mut program = Vec::new();
    add_instruction(&mut program, OP_NOP, 0); // 0x000
    add_instruction(&mut program, OP_SRC, 0); // 0x001: pair 0 selects ROM 0
    add_instruction(&mut program, OP_LD, 2); // 0x002: loop head
    add_instruction(&mut program, OP_WRR, 0); // 0x003
    add_instruction(&mut program, OP_INC, 2); // 0x004
    add_two_byte_instruction(&mut program, OP_JUN, 0, 0x02); // 0x005: back to 0x002
    program
}
