//! Beat indicator - four cells, the current one lit while its click sounds

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

use super::UiState;

const BEATS_PER_BAR: u64 = 4;

pub fn render_beat(frame: &mut Frame, area: Rect, state: &UiState, flashing: bool) {
    let block = Block::default().title(" Beat ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, BEATS_PER_BAR as u32); BEATS_PER_BAR as usize])
        .split(inner);

    let current = state.beat.map(|beat| beat % BEATS_PER_BAR);
    for (idx, cell) in cells.iter().enumerate() {
        let lit = flashing && current == Some(idx as u64);
        let color = match (lit, idx) {
            (true, 0) => Color::Red, // downbeat
            (true, _) => Color::Green,
            (false, _) => Color::DarkGray,
        };
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().bg(if lit { color } else { Color::Reset }))
                .border_style(Style::default().fg(color)),
            *cell,
        );
    }
}
