use crate::app::{App, CharacterInput};
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::utils::centered_rect;

pub fn draw(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 60, f.area());
    f.render_widget(Clear, area);

    let mut lines = Vec::new();
    match &app.character_input {
        CharacterInput::None => {
            let characters = app
                .scenario
                .as_ref()
                .map(|s| s.secondary_characters.as_slice())
                .unwrap_or(&[]);
            if characters.is_empty() {
                lines.push(Line::from("No secondary characters yet."));
            }
            for (i, character) in characters.iter().enumerate() {
                let selected = i == app.character_index;
                let marker = if selected { "> " } else { "  " };
                let style = if selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!("{marker}{}", character.name),
                    style,
                )));
                lines.push(Line::from(Span::styled(
                    format!("    {}", character.description),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "a to add, d to remove the selected character, Esc to go back",
                Style::default().fg(Color::DarkGray),
            )));
        }
        CharacterInput::Name(name) => {
            lines.push(Line::from("Name the new character:"));
            lines.push(Line::from(Span::styled(
                format!("{name}_"),
                Style::default().fg(Color::LightCyan),
            )));
        }
        CharacterInput::Description { name, text } => {
            lines.push(Line::from(format!("Describe {name}:")));
            lines.push(Line::from(Span::styled(
                format!("{text}_"),
                Style::default().fg(Color::LightCyan),
            )));
        }
    }

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Cast of characters "),
    );
    f.render_widget(popup, area);
}
