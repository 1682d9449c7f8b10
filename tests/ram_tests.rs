//! RAM chip behavior: SRC arming, character and status storage, and the
//! write-only output port.

mod common;

use common::ChipBench;
use mcs4_sim::components::memory::Ram4002;
use mcs4_sim::program::{OP_RD0, OP_RDM, OP_RDR, OP_WMP, OP_WR0, OP_WRM};

fn src_select(device: u8, register: u8) -> u8 {
    (device << 2) | (register & 0x3)
}

fn bench() -> ChipBench<Ram4002> {
    ChipBench::new(Ram4002::create_memory(0, 4, 16, 4).unwrap())
}

#[test]
fn test_src_splits_device_and_register_fields() {
    let mut b = bench();
    b.run_src_cycle(src_select(0, 2), 0x7);
    assert!(b.chip.is_src_detected());
    assert_eq!(b.chip.get_src_register(), 2);
}

#[test]
fn test_src_device_mismatch() {
    let mut b = bench();
    b.run_src_cycle(src_select(1, 0), 0x0);
    assert!(!b.chip.is_src_detected());
    assert_eq!(b.chip.get_src_device(), 1);
}

#[test]
fn test_fim_is_not_mistaken_for_src() {
    let mut b = bench();
    // FIM shares the 0x2 top nibble; the even low bit tells it apart.
    b.run_opcode_cycle(0x20);
    b.run_opcode_cycle(0x21); // operand byte of the FIM, not an SRC
    assert!(!b.chip.is_src_detected());
}

#[test]
fn test_src_after_fim_operand_is_decoded_again() {
    let mut b = bench();
    b.run_opcode_cycle(0x20);
    b.run_opcode_cycle(0xFF); // FIM operand
    b.run_src_cycle(src_select(0, 0), 0x0);
    assert!(b.chip.is_src_detected());
}

#[test]
fn test_character_select_takes_effect_next_cycle() {
    let mut b = bench();
    b.run_src_cycle(src_select(0, 0), 0x9);
    // The X3 nibble is latched but only applied on the following cycle.
    assert_eq!(b.chip.get_src_character(), 0);
    b.run_opcode_cycle(0x00);
    assert_eq!(b.chip.get_src_character(), 9);
}

#[test]
fn test_character_write_and_read() {
    let mut b = bench();
    b.run_src_cycle(src_select(0, 1), 0x3);
    b.run_io_write_cycle(OP_WRM, 0xA);
    assert_eq!(b.chip.read_character(1, 3), 0xA);
    assert_eq!(b.run_io_read_cycle(OP_RDM), Some(0xA));
}

#[test]
fn test_character_round_trip_all_sixteen_cells() {
    let mut b = bench();
    for cell in 0..16u8 {
        b.run_src_cycle(src_select(0, 0), cell);
        b.run_io_write_cycle(OP_WRM, 15 - cell);
    }
    for cell in 0..16u8 {
        b.run_src_cycle(src_select(0, 0), cell);
        assert_eq!(b.run_io_read_cycle(OP_RDM), Some(15 - cell));
    }
}

#[test]
fn test_registers_are_independent() {
    let mut b = bench();
    b.run_src_cycle(src_select(0, 0), 0x0);
    b.run_io_write_cycle(OP_WRM, 0x5);
    b.run_src_cycle(src_select(0, 3), 0x0);
    b.run_io_write_cycle(OP_WRM, 0xB);
    assert_eq!(b.chip.read_character(0, 0), 0x5);
    assert_eq!(b.chip.read_character(3, 0), 0xB);
}

#[test]
fn test_status_characters() {
    let mut b = bench();
    b.run_src_cycle(src_select(0, 2), 0x0);
    for status in 0..4u8 {
        b.run_io_write_cycle(OP_WR0 + status, status + 1);
    }
    for status in 0..4u8 {
        assert_eq!(b.chip.read_status(2, status as usize), status + 1);
        assert_eq!(b.run_io_read_cycle(OP_RD0 + status), Some(status + 1));
    }
}

#[test]
fn test_output_port_is_write_only() {
    let mut b = bench();
    b.run_src_cycle(src_select(0, 0), 0x0);
    b.run_io_write_cycle(OP_WMP, 0x6);
    assert_eq!(b.io.read(), 0x6, "value reaches the port lines");
    // No opcode reads the port back; RDM reads character storage instead.
    assert_eq!(b.run_io_read_cycle(OP_RDM), Some(0x0));
}

#[test]
fn test_port_lines_never_answer_rdr() {
    let mut b = bench();
    // A value sitting on the port lines must not leak back through RDR;
    // only ROM chips answer a port read.
    b.io.write(0xB);
    b.run_src_cycle(src_select(0, 0), 0x0);
    assert!(b.chip.is_src_detected());
    assert_eq!(b.run_io_read_cycle(OP_RDR), None);
}

#[test]
fn test_unarmed_chip_ignores_writes() {
    let mut b = bench();
    b.run_src_cycle(src_select(2, 0), 0x0);
    b.run_io_write_cycle(OP_WRM, 0xF);
    assert!(b.chip.character_storage().iter().all(|&c| c == 0));
}
