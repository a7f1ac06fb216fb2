//! TUI module for clickwork
//!
//! Shows tempo and run state, and flashes each beat when its click sounds.

mod beat;
mod state;
mod transport;

use std::time::{Duration, Instant};

use clickwork::{runtime::MetronomeHandle, MetronomeError};
use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};

pub use state::UiState;

use beat::render_beat;
use transport::render_transport;

/// UI application state
pub struct UiApp {
    metronome: MetronomeHandle,
    state: UiState,
    should_quit: bool,
}

impl UiApp {
    pub fn new(metronome: MetronomeHandle) -> Self {
        let state = UiState::new(metronome.tempo());
        Self {
            metronome,
            state,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_events();

            let now = Instant::now();
            self.state.tick(now);
            terminal.draw(|frame| self.render(frame, now))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.metronome.shutdown();
        Ok(())
    }

    fn poll_events(&mut self) {
        while let Some(event) = self.metronome.try_event() {
            self.state.apply(event, Instant::now());
        }
        self.state.running = self.metronome.is_running();
        self.state.tempo = self.metronome.tempo();
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.toggle(),
            KeyCode::Up => self.nudge(1),
            KeyCode::Down => self.nudge(-1),
            KeyCode::PageUp => self.nudge(10),
            KeyCode::PageDown => self.nudge(-10),
            _ => {}
        }
    }

    fn toggle(&mut self) {
        let result = if self.metronome.is_running() {
            self.metronome.deactivate()
        } else {
            self.metronome.activate()
        };
        if let Err(err) = result {
            self.state.status = Some(err.to_string());
        }
    }

    fn nudge(&mut self, delta: i32) {
        if self.metronome.is_running() {
            self.state.status = Some(MetronomeError::TempoLocked.to_string());
            return;
        }
        let bpm = self.metronome.tempo().nudged(delta).bpm() as u32;
        match self.metronome.set_tempo(bpm) {
            Ok(tempo) => {
                self.state.tempo = tempo;
                self.state.status = None;
            }
            Err(err) => self.state.status = Some(err.to_string()),
        }
    }

    fn render(&self, frame: &mut Frame, now: Instant) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(5),    // Beat indicator
                Constraint::Length(1), // Status
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_transport(frame, chunks[0], &self.state);
        render_beat(frame, chunks[1], &self.state, self.state.is_flashing(now));

        if let Some(status) = &self.state.status {
            let status = Paragraph::new(format!(" {status}")).style(Style::default().fg(Color::Red));
            frame.render_widget(status, chunks[2]);
        }

        let help = Paragraph::new(" [Space] Start/Stop  [↑/↓] ±1 BPM  [PgUp/PgDn] ±10 BPM  [Q] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
