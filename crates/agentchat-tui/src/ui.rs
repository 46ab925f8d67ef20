use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use agentchat_core::render::{SOURCES_HINT, SOURCES_LABEL, TRACE_TITLE};
use agentchat_core::{Body, ChatMessage, ChatRole, MessageView, SourcesBlock, TraceBlock};
use crate::app::{App, InputMode};

const INPUT_PLACEHOLDER: &str = "Type your message...";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Agent Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(app.endpoint.clone(), Style::default().fg(Color::Gray)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let border_color = if app.input_mode == InputMode::Normal { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Conversation ({} messages) ", app.session.len()));

    let chat = Paragraph::new(Text::from(chat_lines(app))).wrap(Wrap { trim: false });

    // Store chat dimensions for scroll calculations (inner size minus borders),
    // counting rows the way the paragraph word-wraps them
    app.chat_height = area.height.saturating_sub(2);
    app.chat_total_lines = chat
        .line_count(area.width.saturating_sub(2))
        .min(u16::MAX as usize) as u16;
    app.scroll = if app.follow_tail {
        app.max_scroll()
    } else {
        app.scroll.min(app.max_scroll())
    };

    frame.render_widget(chat.block(block).scroll((app.scroll, 0)), area);

    if app.max_scroll() > 0 {
        let mut state = ScrollbarState::new(app.max_scroll() as usize).position(app.scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin { vertical: 1, horizontal: 0 }),
            &mut state,
        );
    }
}

fn chat_lines(app: &App) -> Vec<Line<'static>> {
    if app.session.is_empty() && !app.is_busy() {
        return vec![Line::from(Span::styled(
            "No messages yet. Type below and press Enter to ask the agent.",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let mut lines = Vec::new();
    for (index, message) in app.session.messages().iter().enumerate() {
        lines.extend(message_lines(
            message,
            app.selected == Some(index),
            app.is_trace_expanded(index),
        ));
    }

    if app.is_busy() {
        lines.push(role_line(ChatRole::Agent, false));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Agent is typing{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn role_line(role: ChatRole, selected: bool) -> Line<'static> {
    let (label, color) = match role {
        ChatRole::User => ("You:", Color::Cyan),
        ChatRole::Agent => ("Agent:", Color::Yellow),
    };
    let mut spans = vec![Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if selected {
        spans.push(Span::styled(" [selected]", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn message_lines(message: &ChatMessage, selected: bool, trace_expanded: bool) -> Vec<Line<'static>> {
    let view = MessageView::from_message(message);
    let mut lines = vec![role_line(message.role, selected)];

    match view.body {
        Body::List { heading, items } => {
            lines.push(Line::from(Span::styled(
                heading,
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for item in items {
                lines.push(Line::from(vec![Span::raw("  • "), Span::raw(item)]));
            }
        }
        Body::Plain(content) => {
            lines.extend(content.lines().map(|l| Line::from(l.to_string())));
        }
    }

    if let Some(sources) = &view.sources {
        lines.extend(sources_lines(sources));
    }
    if let Some(trace) = &view.trace {
        lines.extend(trace_lines(trace, trace_expanded));
    }

    lines.push(Line::default());
    lines
}

fn sources_lines(sources: &SourcesBlock) -> Vec<Line<'static>> {
    let number_style = Style::default().fg(Color::DarkGray);
    let link_style = Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED);

    let mut spans = vec![Span::styled(
        format!("{} ", SOURCES_LABEL),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for (i, link) in sources.links.iter().enumerate() {
        spans.push(Span::styled(format!("[{}] ", i + 1), number_style));
        spans.push(Span::styled(link.text.clone(), link_style));
        spans.push(Span::raw("  "));
    }

    vec![
        Line::from(spans),
        Line::from(Span::styled(SOURCES_HINT, Style::default().fg(Color::DarkGray))),
    ]
}

fn trace_lines(trace: &TraceBlock, expanded: bool) -> Vec<Line<'static>> {
    let title_style = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
    let steps = trace.steps.len();
    let noun = if steps == 1 { "step" } else { "steps" };

    if !expanded {
        return vec![Line::from(Span::styled(
            format!("▸ {} ({} {})", TRACE_TITLE, steps, noun),
            title_style,
        ))];
    }

    let label_style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD);
    let value_style = Style::default().fg(Color::Blue);

    let mut lines = vec![Line::from(Span::styled(format!("▾ {}", TRACE_TITLE), title_style))];
    for step in &trace.steps {
        lines.push(Line::from(Span::styled(
            format!("  {}", step.tool),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(vec![
            Span::styled("    Input: ", label_style),
            Span::styled(step.input.clone(), value_style),
        ]));
        lines.push(Line::from(vec![
            Span::styled("    Output: ", label_style),
            Span::styled(step.output.clone(), value_style),
        ]));
    }
    lines
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let (title, border_color) = if app.is_busy() {
        (" Waiting for the agent... ", Color::DarkGray)
    } else if editing {
        (" Message (Enter to send) ", Color::Yellow)
    } else {
        (" Message (i to type) ", Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width > 0 && app.cursor >= inner_width {
        app.cursor - inner_width + 1
    } else {
        0
    };

    let content = if app.input.is_empty() {
        Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        let visible_text: String = app.input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Span::styled(visible_text, Style::default().fg(Color::Cyan))
    };

    frame.render_widget(Paragraph::new(content).block(block), area);

    // Show cursor when the input accepts typing
    if editing && !app.is_busy() {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INSERT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Editing => &[(" Enter ", " send "), (" Esc ", " stop typing ")],
        InputMode::Normal => &[
            (" j/k ", " scroll "),
            (" [/] ", " select "),
            (" t ", " trace "),
            (" 1-9 ", " open source "),
            (" i ", " type "),
            (" q ", " quit "),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)];
    for (key, label) in hints {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(*label, label_style));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(format!(" {}", status), Style::default().fg(Color::Yellow)));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
