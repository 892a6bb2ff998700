use crate::app::App;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::constants::TITLE_ART;
use super::utils::centered_rect;

const MENU_ITEMS: &[&str] = &["New story", "Load story", "Enter API key", "Quit"];

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new(TITLE_ART)
        .style(Style::default().fg(Color::Green))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let menu_area = centered_rect(40, 60, chunks[1]);
    f.render_widget(Clear, menu_area);

    let lines: Vec<Line> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if i == app.main_menu_index {
                Line::from(Span::styled(
                    format!("> {item}"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::raw(format!("  {item}")))
            }
        })
        .collect();
    let menu = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Menu"));
    f.render_widget(menu, menu_area);

    let status = match &app.startup_notice {
        Some(notice) => Paragraph::new(notice.as_str()).style(Style::default().fg(Color::Yellow)),
        None => Paragraph::new("Up/Down to navigate, Enter to select, q to quit")
            .style(Style::default().fg(Color::LightCyan)),
    };
    f.render_widget(
        status.alignment(Alignment::Center).block(Block::default()),
        chunks[2],
    );
}
