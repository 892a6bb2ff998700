use crate::app::App;
use crate::message::{ChatMessage, Sender};
use crate::scenario::{ResponseLength, TurnMode};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::utils::centered_rect;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_transcript(f, app, chunks[0]);
    draw_status(f, app, chunks[1]);
    draw_input(f, app, chunks[2]);
    draw_help(f, chunks[3]);

    if !app.plot_choices.is_empty() {
        draw_plot_choices(f, app);
    }
    if app.show_thoughts {
        draw_thoughts(f, app);
    }
}

fn message_lines(message: &ChatMessage, width: usize) -> Vec<Line<'static>> {
    let (prefix, style) = match message.sender {
        Sender::User => ("You: ".to_string(), Style::default().fg(Color::Cyan)),
        Sender::System => (
            String::new(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ),
        Sender::Ai => match &message.character_name {
            Some(name) => (format!("{name}: "), Style::default().fg(Color::Magenta)),
            None => (String::new(), Style::default().fg(Color::White)),
        },
    };
    let text = format!("{prefix}{}", message.text);
    textwrap::wrap(&text, width.max(20))
        .into_iter()
        .map(|cow| Line::from(Span::styled(cow.into_owned(), style)))
        .collect()
}

fn draw_transcript(f: &mut Frame, app: &App, area: Rect) {
    let title = app
        .scenario
        .as_ref()
        .map(|s| format!(" {} & {} ", s.player_name, s.partner_name))
        .unwrap_or_else(|| " Story ".to_string());
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    for message in app.transcript.messages() {
        lines.extend(message_lines(message, width));
        lines.push(Line::default());
    }

    // Scroll offset counts lines up from the bottom of the transcript.
    let visible = inner.height as usize;
    let bottom = lines.len().saturating_sub(app.scroll_offset);
    let top = bottom.saturating_sub(visible);
    let window: Vec<Line> = lines[top..bottom].to_vec();
    f.render_widget(Paragraph::new(window), inner);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let mode = match app.turn_mode {
        TurnMode::Dialogue => "say",
        TurnMode::Action => "do",
    };
    let length = match app.response_length {
        ResponseLength::Short => "short",
        ResponseLength::Medium => "medium",
        ResponseLength::Long => "long",
        ResponseLength::ExtraLong => "extra long",
    };
    let mut spans = vec![Span::styled(
        format!(" mode: {mode}  length: {length} "),
        Style::default().fg(Color::DarkGray),
    )];
    if app.is_busy() {
        spans.push(Span::styled(
            super::spinner::spinner_frame(&app.spinner),
            Style::default().fg(Color::Green),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let input = Paragraph::new(format!("{}_", app.input))
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title(" Your turn "));
    f.render_widget(input, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "Tab say/do  ^R rewind  ^P suggest  ^T thoughts  ^N cast  ^S save  ^O length  Esc menu",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(help, area);
}

fn draw_plot_choices(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 40, f.area());
    f.render_widget(Clear, area);

    let mut lines = Vec::new();
    for (i, choice) in app.plot_choices.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("{}. {}", i + 1, choice.title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        for wrapped in textwrap::wrap(&choice.description, area.width.saturating_sub(4) as usize) {
            lines.push(Line::from(format!("   {wrapped}")));
        }
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        "Press 1 or 2 with an empty input line, or just keep typing.",
        Style::default().fg(Color::DarkGray),
    )));
    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" What happens next? "),
    );
    f.render_widget(popup, area);
}

fn draw_thoughts(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);

    let lines = match &app.inner_thoughts {
        Some(thoughts) => {
            let mut lines: Vec<Line> = textwrap::wrap(
                &thoughts.monologue,
                area.width.saturating_sub(4) as usize,
            )
            .into_iter()
            .map(|cow| Line::from(cow.into_owned()))
            .collect();
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("Relationship: {}", thoughts.relationship),
                Style::default().fg(Color::LightCyan),
            )));
            lines
        }
        None => vec![Line::from(super::spinner::spinner_frame(&app.spinner))],
    };
    let title = app
        .scenario
        .as_ref()
        .map(|s| format!(" {}'s thoughts ", s.partner_name))
        .unwrap_or_else(|| " Thoughts ".to_string());
    let popup = Paragraph::new(lines)
        .style(Style::default().fg(Color::Magenta))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(popup, area);
}
