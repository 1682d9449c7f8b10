//! Full-board integration: CPU, ROM and RAM on the shared bus, running
//! real programs from reset.

use mcs4_sim::program::{
    add_instruction, add_two_byte_instruction, fill_empty_program, led_counter_program, OP_BBL,
    OP_INC, OP_JMS, OP_JUN, OP_LD, OP_LDM, OP_RDM, OP_SRC, OP_WRM, OP_WRR, OP_XCH,
};
use mcs4_sim::systems::intel_mcs_4::Mcs4System;

const TICKS_PER_CYCLE: u64 = 8;

fn system_with(program: &[u8]) -> Mcs4System {
    let mut system = Mcs4System::new().unwrap();
    system.load_program(program).unwrap();
    system
}

#[test]
fn test_immediate_load_through_real_fetch() {
    let mut system = system_with(&[OP_LDM | 0x5]);
    system.run(TICKS_PER_CYCLE);
    assert_eq!(system.get_cpu().get_accumulator(), 5);
}

#[test]
fn test_accumulator_reaches_rom_port() {
    let program = [OP_LDM | 0x5, OP_SRC | 0x1, OP_WRR];
    let mut system = system_with(&program);
    system.run(3 * TICKS_PER_CYCLE);
    assert_eq!(system.get_rom().get_io_port(), 5);
    assert_eq!(system.get_rom_io_value(), 5);
}

#[test]
fn test_accumulator_reaches_ram_character() {
    // SRC pair 0 with R0=R1=0 arms RAM device 0, register 0, character 0.
    let program = [OP_LDM | 0x7, OP_SRC | 0x1, OP_WRM];
    let mut system = system_with(&program);
    system.run(3 * TICKS_PER_CYCLE);
    assert!(system.get_ram().is_src_detected());
    assert_eq!(system.get_ram().read_character(0, 0), 7);
}

#[test]
fn test_character_read_back_into_accumulator() {
    let program = [OP_LDM | 0x7, OP_SRC | 0x1, OP_WRM, OP_LDM | 0x0, OP_RDM];
    let mut system = system_with(&program);
    system.run(5 * TICKS_PER_CYCLE);
    assert_eq!(system.get_cpu().get_accumulator(), 7);
}

#[test]
fn test_jun_loops_the_program() {
    let mut program = Vec::new();
    add_instruction(&mut program, OP_INC, 0); // 0x000
    add_two_byte_instruction(&mut program, OP_JUN, 0, 0x00); // 0x001: back to 0
    let mut system = system_with(&program);
    // Each loop iteration is three machine cycles (INC + two-cycle JUN).
    system.run(3 * 4 * TICKS_PER_CYCLE);
    assert_eq!(system.get_cpu().get_index_register(0), 4);
    assert!(system.get_cpu().get_program_counter().value() <= 2);
}

#[test]
fn test_call_and_return_through_rom() {
    let mut program = Vec::new();
    add_two_byte_instruction(&mut program, OP_JMS, 0, 0x10); // 0x000: call 0x010
    add_instruction(&mut program, OP_XCH, 2); // 0x002: runs after return
    fill_empty_program(&mut program);
    program[0x10] = OP_LDM | 0x9;
    program[0x11] = OP_BBL | 0x9;
    let mut system = system_with(&program);
    // call (2 cycles) + LDM + BBL + XCH
    system.run(5 * TICKS_PER_CYCLE);
    assert_eq!(system.get_cpu().get_index_register(2), 9);
    assert_eq!(system.get_cpu().get_program_counter().value(), 0x003);
}

#[test]
fn test_led_counter_counts_on_the_port() {
    let mut system = system_with(&led_counter_program());
    // Two cycles of prologue, then a five-cycle loop: LD, WRR, INC and a
    // two-cycle JUN. Each pass writes the previous pass's count.
    system.run(2 * TICKS_PER_CYCLE);
    for expected in 0..6u8 {
        system.run(5 * TICKS_PER_CYCLE);
        assert_eq!(system.get_rom().get_io_port(), expected);
    }
}

#[test]
fn test_load_through_system_helper() {
    let mut program = vec![OP_LD | 0x3];
    fill_empty_program(&mut program);
    let mut system = system_with(&program);
    system.cpu_mut().set_index_register(3, 0xE);
    system.run(TICKS_PER_CYCLE);
    assert_eq!(system.get_cpu().get_accumulator(), 0xE);
}
