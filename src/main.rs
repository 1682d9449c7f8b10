use mcs4_sim::console;
use mcs4_sim::program;
use mcs4_sim::system_config::SystemConfig;
use mcs4_sim::systems::intel_mcs_4::Mcs4System;

use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<String> = None;
    let mut headless_ticks: Option<u64> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--headless" => {
                let Some(count) = args.get(i + 1) else {
                    eprintln!("--headless requires a tick count");
                    process::exit(2);
                };
                match count.parse::<u64>() {
                    Ok(ticks) => headless_ticks = Some(ticks),
                    Err(_) => {
                        eprintln!("invalid tick count: {}", count);
                        process::exit(2);
                    }
                }
                i += 2;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            path if config_path.is_none() => {
                config_path = Some(path.to_string());
                i += 1;
            }
            unexpected => {
                eprintln!("unexpected argument: {}", unexpected);
                print_usage();
                process::exit(2);
            }
        }
    }

    let (system, run_ticks) = match build_system(config_path.as_deref()) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("failed to build system: {}", e);
            process::exit(1);
        }
    };

    if let Some(ticks) = headless_ticks.or(run_ticks) {
        run_headless(system, ticks);
        return;
    }

    if let Err(e) = console::run_console(system) {
        eprintln!("console error: {}", e);
        process::exit(1);
    }
}

fn build_system(config_path: Option<&str>) -> Result<(Mcs4System, Option<u64>), String> {
    match config_path {
        Some(path) => {
            let config = SystemConfig::from_file(path)?;
            println!("Loaded configuration: {}", config.name);
            let ticks = (config.run.clock_ticks > 0).then_some(config.run.clock_ticks);
            Ok((config.build()?, ticks))
        }
        None => {
            println!("No configuration given, running the LED counter demo");
            let mut system = Mcs4System::new()?;
            system.load_program(&program::led_counter_program())?;
            Ok((system, None))
        }
    }
}

fn run_headless(mut system: Mcs4System, ticks: u64) {
    println!("Running for {} clock ticks...", ticks);
    system.run(ticks);

    let cpu = system.get_cpu();
    println!("PC:          {}", cpu.get_program_counter());
    println!("Accumulator: {:X}  carry: {}", cpu.get_accumulator(), cpu.get_carry() as u8);
    println!(
        "ROM port:    {:X}  RAM port bus: {:X}",
        system.get_rom().get_io_port(),
        system.get_ram_io_value()
    );
    println!("Clock ticks: {}", system.get_tick_count());
}

fn print_usage() {
    println!("Usage: mcs4_sim [CONFIG.json] [--headless TICKS]");
    println!();
    println!("With no arguments, starts the interactive console on the demo program.");
    println!("  CONFIG.json       system configuration (ROM image, RAM geometry)");
    println!("  --headless TICKS  run TICKS clock ticks and print the final state");
}
