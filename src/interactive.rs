//! Interactive terminal session
//!
//! Draws the breathing scale as a bar in the terminal and maps key presses
//! onto the controller's setters. Frames are paced by a [`FrameClock`].

use crate::controller::CycleController;
use crate::error::CalmResult;
use crate::tick::{check_fps, FrameClock, TickSource};
use crate::visual::{VisualFrame, VisualSink};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, disable_raw_mode, enable_raw_mode, ClearType},
};
use std::io::{self, Write};
use std::time::Duration;
use tracing::debug;

const BAR_WIDTH: usize = 48;
const VISUAL_ROW: u16 = 1;
const STATUS_ROW: u16 = 3;
const HELP_ROW: u16 = 5;

/// What a key press asks the controller to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    ToggleActive,
    ToggleMute,
    Longer,
    Shorter,
    /// Zero-based index into the sorted preset keys
    Preset(usize),
    Quit,
}

pub fn map_key(key: KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Quit)
        }
        KeyCode::Char(' ') | KeyCode::Enter => Some(KeyAction::ToggleActive),
        KeyCode::Char('m') => Some(KeyAction::ToggleMute),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(KeyAction::Longer),
        KeyCode::Char('-') | KeyCode::Down => Some(KeyAction::Shorter),
        KeyCode::Char(c @ '1'..='9') => Some(KeyAction::Preset(c as usize - '1' as usize)),
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        _ => None,
    }
}

/// Apply a key action; returns false when the session should end
pub fn apply_action(controller: &mut CycleController, action: KeyAction) -> bool {
    match action {
        KeyAction::ToggleActive => controller.toggle_active(),
        KeyAction::ToggleMute => {
            controller.toggle_muted();
        }
        KeyAction::Longer | KeyAction::Shorter => {
            let step = if action == KeyAction::Longer { 1 } else { -1 };
            let current = controller.cycle_seconds();
            let next = controller.cycle_bounds().clamp(i64::from(current) + step);
            if next != current {
                if let Err(e) = controller.set_cycle_duration(next) {
                    debug!("Cycle length key ignored: {}", e);
                }
            }
        }
        KeyAction::Preset(index) => {
            let key = controller.presets().keys().nth(index).map(str::to_string);
            match key {
                Some(key) => {
                    if let Err(e) = controller.set_preset(&key) {
                        debug!("Preset key ignored: {}", e);
                    }
                }
                None => debug!("No preset bound to key {}", index + 1),
            }
        }
        KeyAction::Quit => return false,
    }
    true
}

/// `[#####.....]` bar for a scale value
pub fn scale_bar(scale: f64, scale_max: f64, width: usize) -> String {
    let filled = ((scale / scale_max).clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(width - filled))
}

/// Draws the breathing bar on a fixed terminal row
pub struct TerminalVisual {
    scale_max: f64,
}

impl TerminalVisual {
    pub fn new(scale_max: f64) -> Self {
        Self { scale_max }
    }

    fn draw(&self, frame: &VisualFrame) -> io::Result<()> {
        let mut stdout = io::stdout();
        queue!(
            stdout,
            cursor::MoveTo(0, VISUAL_ROW),
            terminal::Clear(ClearType::CurrentLine),
            Print(format!(
                "{} {:.2}  {}",
                scale_bar(frame.scale, self.scale_max, BAR_WIDTH),
                frame.scale,
                frame.label
            ))
        )?;
        stdout.flush()
    }
}

impl VisualSink for TerminalVisual {
    fn publish(&mut self, frame: &VisualFrame) {
        if let Err(e) = self.draw(frame) {
            debug!("Terminal draw failed: {}", e);
        }
    }
}

fn draw_status(controller: &CycleController) -> io::Result<()> {
    let runtime = controller.runtime();
    let preset = controller
        .current_preset()
        .map(|p| p.name.clone())
        .unwrap_or_default();
    let mut stdout = io::stdout();
    queue!(
        stdout,
        cursor::MoveTo(0, STATUS_ROW),
        terminal::Clear(ClearType::CurrentLine),
        Print(format!(
            "{}  cycle {}s  preset {} ({})  {}",
            if runtime.is_active { "running" } else { "paused" },
            controller.cycle_seconds(),
            runtime.current_preset,
            preset,
            if runtime.is_muted { "muted" } else { "sound on" }
        )),
        cursor::MoveTo(0, HELP_ROW),
        terminal::Clear(ClearType::CurrentLine),
        Print("space start/stop   m mute   +/- cycle length   1-9 preset   q quit")
    )?;
    stdout.flush()
}

/// Run the controller against the terminal until the user quits
pub fn run_terminal(controller: &mut CycleController, fps: f64) -> CalmResult<()> {
    let fps = check_fps(fps)?;
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::Clear(ClearType::All)
    )?;

    let result = session_loop(controller, fps);

    controller.shutdown();
    disable_raw_mode()?;
    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;

    result
}

fn session_loop(controller: &mut CycleController, fps: f64) -> CalmResult<()> {
    let mut clock = FrameClock::new(fps);
    controller.start();
    draw_status(controller)?;

    loop {
        let mut changed = false;
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(action) = map_key(key) {
                    if !apply_action(controller, action) {
                        return Ok(());
                    }
                    changed = true;
                }
            }
        }
        if changed {
            draw_status(controller)?;
        }

        let Some(timestamp) = clock.next_frame() else {
            return Ok(());
        };
        controller.tick(timestamp);
    }
}
