use crate::app::{App, SETUP_ITEMS, SetupItem};
use crate::scenario::ModelQuality;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

fn row_label(item: SetupItem) -> &'static str {
    match item {
        SetupItem::PlayerName => "Your name",
        SetupItem::PlayerGender => "Your gender",
        SetupItem::PlayerDescription => "Your description",
        SetupItem::GeneratePlayer => "[ Generate protagonist ]",
        SetupItem::PartnerName => "Companion name",
        SetupItem::PartnerGender => "Companion gender",
        SetupItem::PartnerDescription => "Companion description",
        SetupItem::GeneratePartner => "[ Generate companion ]",
        SetupItem::WorldView => "World premise",
        SetupItem::OpeningPlot => "Opening plot",
        SetupItem::GenerateWorld => "[ Generate world ]",
        SetupItem::GenerateImage => "[ Generate scene image ]",
        SetupItem::ToggleQuality => "Model quality",
        SetupItem::ToggleSimulation => "Simulation mode",
        SetupItem::Start => "[ Begin the story ]",
    }
}

fn row_value(app: &App, item: SetupItem) -> Option<String> {
    let form = &app.setup;
    match item {
        SetupItem::PlayerName => Some(form.player_name.clone()),
        SetupItem::PlayerGender => Some(form.player_gender.clone()),
        SetupItem::PlayerDescription => Some(form.player_description.clone()),
        SetupItem::PartnerName => Some(form.partner_name.clone()),
        SetupItem::PartnerGender => Some(form.partner_gender.clone()),
        SetupItem::PartnerDescription => Some(form.partner_description.clone()),
        SetupItem::WorldView => Some(form.world_view.clone()),
        SetupItem::OpeningPlot => Some(form.opening_plot.clone()),
        SetupItem::ToggleQuality => Some(
            match form.model_quality {
                ModelQuality::Fast => "fast",
                ModelQuality::High => "high",
            }
            .to_string(),
        ),
        SetupItem::ToggleSimulation => Some(if form.simulation { "on" } else { "off" }.to_string()),
        SetupItem::GenerateImage => form
            .background_image
            .clone()
            .or_else(|| Some(String::new())),
        _ => None,
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(SETUP_ITEMS.len() as u16),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("New story")
        .style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, chunks[0]);

    let mut lines = Vec::with_capacity(SETUP_ITEMS.len());
    for (i, &item) in SETUP_ITEMS.iter().enumerate() {
        let selected = i == app.setup.selected;
        let marker = if selected { "> " } else { "  " };
        let mut spans = vec![Span::styled(
            format!("{marker}{:<26}", row_label(item)),
            if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            },
        )];
        if let Some(value) = row_value(app, item) {
            let editing = selected && app.setup.editing;
            let shown = if editing {
                format!("{value}_")
            } else {
                value
            };
            spans.push(Span::styled(
                shown,
                if editing {
                    Style::default().fg(Color::LightCyan)
                } else {
                    Style::default().fg(Color::White)
                },
            ));
        }
        lines.push(Line::from(spans));
    }
    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Setup"));
    f.render_widget(form, chunks[1]);

    let hint = if app.waiting_setup {
        super::spinner::spinner_frame(&app.spinner)
    } else if let Some(notice) = &app.startup_notice {
        notice.clone()
    } else if app.setup.editing {
        "Type to edit, Enter or Esc to stop editing".to_string()
    } else {
        "Up/Down to move, Enter to edit or activate, Esc for the menu".to_string()
    };
    let footer = Paragraph::new(hint)
        .style(Style::default().fg(Color::LightCyan))
        .alignment(Alignment::Center);
    f.render_widget(footer, chunks[2]);
}
