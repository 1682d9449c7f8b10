//! Interactive terminal front end.
//!
//! Renders a live view of the running system: CPU state, index registers,
//! the shared bus and control lines, RAM character storage and the I/O
//! ports. Run control is keyboard driven: space toggles free-run, `s`
//! single-steps one machine cycle, `c` steps one clock tick, `r` resets
//! the CPU, `q` quits.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

use crate::systems::intel_mcs_4::Mcs4System;

const TICKS_PER_FRAME: u64 = 8;
const REFRESH_MS: u64 = 50;

pub struct ConsoleApp {
    system: Mcs4System,
    running: bool,
    free_run: bool,
}

impl ConsoleApp {
    pub fn new(system: Mcs4System) -> Self {
        ConsoleApp {
            system,
            running: false,
            free_run: false,
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.running = true;
        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut last_frame = Instant::now();
        while self.running {
            if self.free_run {
                self.system.run(TICKS_PER_FRAME);
            }

            if event::poll(Duration::from_millis(10))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key_event(key.code);
                }
            }

            if last_frame.elapsed() >= Duration::from_millis(REFRESH_MS) {
                terminal.draw(|f| self.draw_ui(f))?;
                last_frame = Instant::now();
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char(' ') => {
                self.free_run = !self.free_run;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.system.step_instruction_cycle();
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.system.step_clock();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.system.reset();
            }
            _ => {}
        }
    }

    fn draw_ui(&self, f: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(8),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(f.size());

        self.draw_title(f, rows[0]);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        self.draw_cpu_state(f, middle[0]);
        self.draw_bus_state(f, middle[1]);

        self.draw_ram_contents(f, rows[2]);
        self.draw_controls(f, rows[3]);
    }

    fn draw_title(&self, f: &mut Frame, area: Rect) {
        let mode = if self.free_run { "RUNNING" } else { "PAUSED" };
        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "MCS-4 Simulator ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "- {} - tick {}",
                mode,
                self.system.get_tick_count()
            )),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn draw_cpu_state(&self, f: &mut Frame, area: Rect) {
        let cpu = self.system.get_cpu();
        let mut lines = vec![
            Line::from(format!(
                "PC: {}  phase: {}  inst: {:02X}",
                cpu.get_program_counter(),
                cpu.get_phase(),
                cpu.get_instruction()
            )),
            Line::from(format!(
                "ACC: {:X}  CARRY: {}  TEMP: {:X}",
                cpu.get_accumulator(),
                cpu.get_carry() as u8,
                cpu.get_temp()
            )),
        ];
        for row in 0..4 {
            let regs: Vec<String> = (0..4)
                .map(|col| {
                    let index = row * 4 + col;
                    format!("R{:<2}={:X}", index, cpu.get_index_register(index))
                })
                .collect();
            lines.push(Line::from(regs.join("  ")));
        }
        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("CPU"));
        f.render_widget(widget, area);
    }

    fn draw_bus_state(&self, f: &mut Frame, area: Rect) {
        let cpu = self.system.get_cpu();
        let rom = self.system.get_rom();
        let ram = self.system.get_ram();
        let lines = vec![
            Line::from(format!("data bus: {:X}", self.system.get_bus_value())),
            Line::from(format!(
                "SYNC: {}  CM-ROM: {}  CM-RAM: {}",
                cpu.get_sync() as u8,
                cpu.get_control_lines().cm_rom as u8,
                cpu.get_control_lines().cm_ram as u8
            )),
            Line::from(format!(
                "ROM port: {:X}  RAM port bus: {:X}",
                rom.get_io_port(),
                self.system.get_ram_io_value()
            )),
            Line::from(format!(
                "ROM sel: {}  src: {}  addr: {:03X}",
                rom.is_chip_selected() as u8,
                rom.is_src_detected() as u8,
                rom.get_address()
            )),
            Line::from(format!(
                "RAM src: {}  reg: {}  char: {}",
                ram.is_src_detected() as u8,
                ram.get_src_register(),
                ram.get_src_character()
            )),
        ];
        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Bus & Chips"));
        f.render_widget(widget, area);
    }

    fn draw_ram_contents(&self, f: &mut Frame, area: Rect) {
        let ram = self.system.get_ram();
        let chars = ram.chars_per_register();
        let mut lines = Vec::new();
        for register in 0..ram.register_count() {
            let cells: Vec<String> = (0..chars)
                .map(|c| format!("{:X}", ram.read_character(register, c)))
                .collect();
            let status: Vec<String> = (0..ram.status_per_register())
                .map(|s| format!("{:X}", ram.read_status(register, s)))
                .collect();
            lines.push(Line::from(format!(
                "reg {}: {}  | status: {}",
                register,
                cells.join(" "),
                status.join(" ")
            )));
        }
        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("RAM"));
        f.render_widget(widget, area);
    }

    fn draw_controls(&self, f: &mut Frame, area: Rect) {
        let help = Paragraph::new(Line::from(
            "space: run/pause  s: step cycle  c: step clock  r: reset  q: quit",
        ))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(help, area);
    }
}

pub fn run_console(system: Mcs4System) -> Result<(), Box<dyn std::error::Error>> {
    ConsoleApp::new(system).run()
}
