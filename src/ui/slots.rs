use crate::app::App;
use crate::app_state::AppState;
use crate::save::MAX_SAVES;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::utils::centered_rect;

pub fn draw(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let title = if app.state == AppState::SaveMenu {
        " Save story "
    } else {
        " Load story "
    };

    let mut lines = Vec::with_capacity(MAX_SAVES + 2);
    for i in 0..MAX_SAVES {
        let selected = i == app.slot_index;
        let marker = if selected { "> " } else { "  " };
        let summary = match app.save_manager.slot(i) {
            Some(data) => format!(
                "{} — {} turns, {}",
                data.scenario.player_name,
                data.transcript.len(),
                data.saved_at.format("%Y-%m-%d %H:%M"),
            ),
            None => "empty".to_string(),
        };
        let style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{marker}Slot {}: {summary}", i + 1),
            style,
        )));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Enter to confirm, d to delete, Esc to go back",
        Style::default().fg(Color::DarkGray),
    )));

    let menu = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(menu, area);
}
