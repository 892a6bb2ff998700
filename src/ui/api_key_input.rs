use crate::app::App;
use ratatui::{
    Frame,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::utils::centered_rect;

pub fn draw(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);

    // The key is masked; only its length shows.
    let masked: String = app.api_key_input.chars().map(|_| '*').collect();
    let mut lines = vec![
        Line::from("Paste your API key and press Enter:"),
        Line::from(Span::styled(
            format!("{masked}_"),
            Style::default().fg(Color::LightCyan),
        )),
    ];
    if let Some(notice) = &app.startup_notice {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let popup = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" API key "));
    f.render_widget(popup, area);
}
