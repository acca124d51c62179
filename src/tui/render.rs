use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::constants::EXAMPLE_QUESTIONS;
use crate::gateway::{ChatMessage, MessageRole};
use crate::session::is_failure_message;
use crate::tui::app::{App, InputMode};
use crate::tui::markdown::parse_markdown;

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Main content
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);

    if app.on_upload_screen() {
        render_upload(frame, chunks[1], app);
    } else {
        render_chat(frame, chunks[1], app);
    }

    render_input(frame, chunks[2], app);
    render_status_bar(frame, chunks[3], app);

    if app.show_help {
        render_help(frame, frame.area());
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("📚 ", Style::default().fg(Color::Cyan)),
        Span::styled(
            "Educational Content Assistant",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    match app.session.document() {
        Some(handle) => {
            spans.push(Span::raw(" | 📄 "));
            spans.push(Span::styled(
                handle.to_string(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                "  (Ctrl+R change file)",
                Style::default().fg(Color::DarkGray),
            ));
        }
        None => {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(&app.backend_url, Style::default().fg(Color::Gray)));
        }
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(header, area);
}

fn render_upload(frame: &mut Frame, area: Rect, app: &App) {
    let panel = &app.upload;
    let mut lines = vec![
        Line::from(Span::styled(
            "📁 Upload Your Educational PDF",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Select a textbook, lecture notes, or any educational PDF document."),
        Line::from("The AI will analyze it and answer your questions."),
        Line::from(""),
    ];

    match &panel.selected {
        Some(selected) => lines.push(Line::from(vec![
            Span::raw("📄 "),
            Span::styled(selected.file_name(), Style::default().fg(Color::Green)),
            Span::styled(
                format!(" ({})", selected.display_size()),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                "  press Enter to upload & process",
                Style::default().fg(Color::DarkGray),
            ),
        ])),
        None => lines.push(Line::from(Span::styled(
            "Type the path to a PDF below and press Enter to select it",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    if panel.is_uploading {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "⏳ Uploading...",
            Style::default().fg(Color::Yellow),
        )));
    }

    if let Some(error) = &panel.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("⚠️ {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tips:",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for tip in [
        "Maximum file size: 50MB",
        "Only PDF files are supported",
        "Clear, text-based PDFs work best",
    ] {
        lines.push(Line::from(format!("  • {}", tip)));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Upload "))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn message_lines(msg: &ChatMessage, render_markdown: bool) -> Vec<Line<'static>> {
    let (label, color) = match msg.role {
        MessageRole::User => ("👤 You", Color::Blue),
        MessageRole::Assistant => ("🤖 Assistant", Color::Green),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", msg.timestamp.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    if is_failure_message(msg) {
        lines.extend(msg.content.lines().map(|line| {
            Line::from(Span::styled(line.to_string(), Style::default().fg(Color::Red)))
        }));
    } else if render_markdown && msg.role == MessageRole::Assistant {
        lines.extend(parse_markdown(&msg.content));
    } else {
        lines.extend(msg.content.lines().map(|line| Line::from(line.to_string())));
    }

    lines.push(Line::from(""));
    lines
}

/// Render the chat area
fn render_chat(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    let transcript = app.session.transcript();

    for msg in transcript {
        lines.extend(message_lines(msg, app.config.ui.render_markdown));
    }

    let asked_anything = transcript.iter().any(|m| m.role == MessageRole::User);
    if !asked_anything && app.config.ui.show_examples {
        lines.push(Line::from(Span::styled(
            "Example questions:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for example in EXAMPLE_QUESTIONS {
            lines.push(Line::from(Span::styled(
                format!("  \"{}\"", example),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    if app.session.is_awaiting_response() {
        lines.push(Line::from(Span::styled(
            "🤖 Assistant",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            "● ● ●",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::SLOW_BLINK),
        )));
    }

    // scroll_offset counts up from the bottom, in wrapped rows
    let viewport = area.height.saturating_sub(2);
    let chat = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total = u16::try_from(chat.line_count(area.width.saturating_sub(2))).unwrap_or(u16::MAX);
    let max_offset = total.saturating_sub(viewport);
    let scroll = max_offset.saturating_sub(app.scroll_offset.min(max_offset));

    let chat = chat
        .block(Block::default().borders(Borders::ALL).title(" Chat "))
        .scroll((scroll, 0));
    frame.render_widget(chat, area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let (title, text, style) = if app.on_upload_screen() {
        (
            " PDF path ",
            app.upload.path_input.clone(),
            if app.upload.is_uploading {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            },
        )
    } else {
        match app.input_mode {
            InputMode::Command => (" Command ", format!(":{}", app.input), Style::default()),
            _ if app.session.is_awaiting_response() => (
                " ⏳ Waiting for answer ",
                app.input.clone(),
                Style::default().fg(Color::DarkGray),
            ),
            _ => (
                " Ask a question about your document... ",
                app.input.clone(),
                Style::default(),
            ),
        }
    };

    // Multi-line questions show their last line while typing
    let visible = text.lines().last().unwrap_or("").to_string();
    let input = Paragraph::new(visible)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(input, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mode = match app.input_mode {
        InputMode::Insert => "INSERT",
        InputMode::Normal => "NORMAL",
        InputMode::Command => "COMMAND",
    };

    let hint = if app.on_upload_screen() {
        "Enter select/upload • F1 help • Ctrl+C quit"
    } else {
        "Enter send • Alt+Enter new line • Esc normal mode • F1 help • Ctrl+C quit"
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", mode),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw(" "),
    ];
    match &app.status_message {
        Some(status) => spans.push(Span::styled(status.clone(), Style::default().fg(Color::Yellow))),
        None => spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 60, area);
    let text = vec![
        Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Enter        send question / select & upload file"),
        Line::from("  Alt+Enter    new line in question"),
        Line::from("  Ctrl+R       change file (clears the chat)"),
        Line::from("  Esc          normal mode (scroll with ↑/↓, PgUp/PgDn)"),
        Line::from("  i            back to typing"),
        Line::from("  :            command mode"),
        Line::from("  F1           toggle this help"),
        Line::from("  Ctrl+C       quit"),
        Line::from(""),
        Line::from(Span::styled("Commands", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  :change      change file"),
        Line::from("  :help/:h     toggle this help"),
        Line::from("  :quit/:q     quit"),
    ];
    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, popup);
    frame.render_widget(help, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
