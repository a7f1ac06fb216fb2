//! Transport bar widget - shows BPM, run state and the click settings

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::UiState;

pub fn render_transport(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().title(" clickwork ").borders(Borders::ALL);

    let play_symbol = if state.running { "▶" } else { "■" };
    let play_state_str = if state.running { "Running" } else { "Stopped" };

    let beat = match state.beat {
        Some(beat) => format!("Bar {} | Beat {}", beat / 4 + 1, beat % 4 + 1),
        None => "Bar - | Beat -".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {}  ", state.tempo.bpm()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if state.running {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(beat, Style::default().fg(Color::White)),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
