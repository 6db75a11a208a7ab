use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style as TextStyle},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Field, Output, Popup};
use crate::blog::Style;
use crate::theme::Theme;

/// Render the whole form from the current app state
pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),  // Header
            Constraint::Length(3),  // Topic
            Constraint::Length(3),  // Words + style
            Constraint::Length(3),  // Generate button
            Constraint::Min(3),     // Output
            Constraint::Length(1),  // Status line
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    draw_header(f, app, chunks[0]);
    draw_text_input(f, app, chunks[1], " Enter your topic ", &app.topic, Field::Topic);

    // Two equal columns for the additional inputs
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(chunks[2]);
    draw_text_input(f, app, columns[0], " Number of words ", &app.words, Field::Words);
    draw_style_selector(f, app, columns[1]);

    draw_button(f, app, chunks[3]);
    draw_output(f, app, chunks[4]);
    draw_status_line(f, app, chunks[5]);
    draw_footer(f, app, chunks[6]);

    if app.popup == Popup::Help {
        draw_help_popup(f, &app.theme);
    }
}

fn border_style(theme: &Theme, focused: bool) -> (TextStyle, TextStyle) {
    if focused {
        (
            TextStyle::default().fg(theme.accent),
            TextStyle::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            TextStyle::default().fg(theme.inactive),
            TextStyle::default().fg(theme.inactive),
        )
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(Line::from(Span::styled(
        "Generate Blogs",
        TextStyle::default().fg(app.theme.header).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn draw_text_input(f: &mut Frame, app: &App, area: Rect, title: &str, value: &str, field: Field) {
    let focused = app.focus == field;
    let (border, title_style) = border_style(&app.theme, focused);
    let cursor = if focused { "_" } else { "" };

    let input = Paragraph::new(Line::from(vec![
        Span::styled(value, TextStyle::default().fg(app.theme.text)),
        Span::styled(cursor, TextStyle::default().fg(app.theme.accent)),
    ]))
    .block(
        Block::default()
            .title(Span::styled(title, title_style))
            .borders(Borders::ALL)
            .border_style(border),
    );

    f.render_widget(input, area);
}

fn draw_style_selector(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Field::Style;
    let (border, title_style) = border_style(&app.theme, focused);

    let mut spans = Vec::new();
    if focused {
        spans.push(Span::styled("◀ ", TextStyle::default().fg(app.theme.accent)));
    }
    spans.push(Span::styled(
        app.style.label(),
        TextStyle::default().fg(app.theme.text).add_modifier(Modifier::BOLD),
    ));
    if focused {
        spans.push(Span::styled(" ▶", TextStyle::default().fg(app.theme.accent)));
    }

    // Position in the closed set, e.g. 1/3
    spans.push(Span::styled(
        format!("  {}/{}", app.style.index() + 1, Style::ALL.len()),
        TextStyle::default().fg(app.theme.text_dim),
    ));

    let selector = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(Span::styled(" Select blog writing style ", title_style))
            .borders(Borders::ALL)
            .border_style(border),
    );

    f.render_widget(selector, area);
}

fn draw_button(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Field::Generate;
    let (border, _) = border_style(&app.theme, focused);

    let label_style = if app.is_generating() {
        TextStyle::default().fg(app.theme.text_dim)
    } else if focused {
        TextStyle::default()
            .fg(app.theme.success)
            .bg(app.theme.bg_selected)
            .add_modifier(Modifier::BOLD)
    } else {
        TextStyle::default().fg(app.theme.success)
    };

    let button = Paragraph::new(Line::from(vec![
        Span::styled("[ ", TextStyle::default().fg(app.theme.text_dim)),
        Span::styled("Generate Blog", label_style),
        Span::styled(" ]", TextStyle::default().fg(app.theme.text_dim)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(border));

    f.render_widget(button, area);
}

fn draw_output(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let (title, title_color, body) = match &app.output {
        Output::Empty => (
            " Blog ",
            theme.inactive,
            Paragraph::new(Span::styled(
                "Fill in the form and press Generate Blog",
                TextStyle::default().fg(theme.text_dim),
            )),
        ),
        Output::Generating => (
            " Blog ",
            theme.accent,
            Paragraph::new(Line::from(vec![
                Span::styled("󰔟 ", TextStyle::default().fg(theme.accent)),
                Span::styled(
                    format!("Generating with {}...", app.model()),
                    TextStyle::default().fg(theme.text),
                ),
                Span::styled(" (Esc cancels)", TextStyle::default().fg(theme.text_dim)),
            ])),
        ),
        Output::Text(text) => (
            " Blog ",
            theme.success,
            Paragraph::new(text.as_str())
                .style(TextStyle::default().fg(theme.text))
                .scroll((app.output_scroll, 0)),
        ),
        Output::Error(message) => (
            " Error ",
            theme.danger,
            Paragraph::new(Span::styled(
                message.as_str(),
                TextStyle::default().fg(theme.danger),
            )),
        ),
    };

    let block = Block::default()
        .title(Span::styled(title, TextStyle::default().fg(title_color)))
        .borders(Borders::ALL)
        .border_style(TextStyle::default().fg(theme.inactive));

    // Scroll limits in App depend on the wrapped size of this area
    let inner = block.inner(area);
    app.output_viewport.set((inner.width, inner.height));

    f.render_widget(body.block(block).wrap(Wrap { trim: false }), area);
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, TextStyle::default().fg(app.theme.warning)))
    } else {
        Line::from(vec![
            Span::styled("Model: ", TextStyle::default().fg(app.theme.text_dim)),
            Span::styled(app.model(), TextStyle::default().fg(app.theme.text)),
        ])
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let mut hints: Vec<(&str, &str)> = vec![("Tab", "Next")];
    match app.focus {
        Field::Style => hints.push(("←→", "Style")),
        Field::Generate => hints.push(("Enter", "Generate")),
        Field::Topic | Field::Words => hints.push(("^G", "Generate")),
    }
    if app.is_generating() {
        hints.push(("Esc", "Cancel"));
    }
    hints.extend([("PgUp/PgDn", "Scroll"), ("F1", "Help"), ("^Q", "Quit")]);

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 3 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, TextStyle::default().fg(app.theme.accent)),
                Span::styled(format!(" {} │ ", action), TextStyle::default().fg(app.theme.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, theme: &Theme) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            TextStyle::default().fg(theme.header).add_modifier(Modifier::BOLD),
        ))
    };
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(k, TextStyle::default().fg(theme.accent)),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Form ═══"),
        key("  Tab/S-Tab   ", "Move between fields"),
        key("  ←/→         ", "Change blog writing style"),
        key("  Enter       ", "Next field, or generate on the button"),
        Line::from(""),
        section("═══ Generation ═══"),
        key("  Ctrl+G/F5   ", "Generate from any field"),
        key("  Esc         ", "Cancel a running generation"),
        key("  PgUp/PgDn   ", "Scroll the generated blog"),
        Line::from(""),
        section("═══ Command line ═══"),
        key("  blogsmith --topic T --words N --style S  ", "Print a blog"),
        key("  blogsmith --topic T --dry-run            ", "Print the prompt only"),
        key("  blogsmith --list-models                  ", "Models on the server"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", TextStyle::default().fg(theme.text_dim)),
            Span::styled("F1", TextStyle::default().fg(theme.accent)),
            Span::styled("/", TextStyle::default().fg(theme.text_dim)),
            Span::styled("Esc", TextStyle::default().fg(theme.accent)),
            Span::styled(" to close", TextStyle::default().fg(theme.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 blogsmith Help ", TextStyle::default().fg(theme.accent)))
                .borders(Borders::ALL)
                .border_style(TextStyle::default().fg(theme.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{app_with, StubGenerator};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_form() {
        let mut app = app_with(StubGenerator::ok("ok"));
        app.topic = "Rust ownership".to_string();
        app.words = "150".to_string();

        let screen = render(&app);
        assert!(screen.contains("Generate Blogs"));
        assert!(screen.contains("Enter your topic"));
        assert!(screen.contains("Rust ownership"));
        assert!(screen.contains("Number of words"));
        assert!(screen.contains("Researchers"));
        assert!(screen.contains("Generate Blog"));
    }

    #[test]
    fn test_output_shows_text_or_error_never_both() {
        let mut app = app_with(StubGenerator::ok("ok"));

        app.output = Output::Text("Ownership is a set of rules.".to_string());
        let screen = render(&app);
        assert!(screen.contains("Ownership is a set of rules."));
        assert!(!screen.contains(" Error "));

        app.output = Output::Error("model service unreachable".to_string());
        let screen = render(&app);
        assert!(screen.contains("model service unreachable"));
        assert!(!screen.contains("Ownership is a set of rules."));
    }

    #[test]
    fn test_long_blog_scrolls_to_last_row() {
        let mut app = app_with(StubGenerator::ok("ok"));
        let mut blog = "lorem ipsum ".repeat(400);
        blog.push_str("THE-END");
        app.output = Output::Text(blog);

        let screen = render(&app);
        assert!(!screen.contains("THE-END"));
        assert!(app.max_output_scroll() > 0);

        for _ in 0..100 {
            app.handle_key(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE));
        }
        assert_eq!(app.output_scroll, app.max_output_scroll());
        assert!(render(&app).contains("THE-END"));
    }

    #[test]
    fn test_generating_state() {
        let mut app = app_with(StubGenerator::ok("ok"));
        app.output = Output::Generating;
        assert!(render(&app).contains("Generating with stub..."));
    }

    #[test]
    fn test_help_popup() {
        let mut app = app_with(StubGenerator::ok("ok"));
        app.popup = Popup::Help;
        assert!(render(&app).contains("blogsmith Help"));
    }
}
