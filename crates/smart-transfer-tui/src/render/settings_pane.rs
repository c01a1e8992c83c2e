use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;

/// Output directory, format list and options, stacked top to bottom.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(area);

    render_output(frame, chunks[0], app);
    render_formats(frame, chunks[1], app);
    render_options(frame, chunks[2], app);
}

fn render_output(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title(" Output ");
    let line = match &app.selection.output_dir {
        Some(dir) => Line::from(format!(" {}", dir.display())),
        None => Line::from(Span::styled(
            " not set (press o)",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_formats(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title(" Format ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let plugins = app.plugins();
    if plugins.is_empty() {
        let line = Line::from(Span::styled(
            " No compression formats available",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(line), inner);
        return;
    }

    let selected = app.selection.plugin.as_deref();
    let lines: Vec<Line> = plugins
        .iter()
        .enumerate()
        .map(|(idx, plugin)| {
            let is_selected = selected == Some(plugin.name.as_str());
            let style = if is_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if idx == app.format_cursor {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("  {:<6}", plugin.name), style),
                Span::styled(
                    format!(" {}", plugin.version),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_options(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title(" Options ");
    let label_style = Style::default().fg(Color::DarkGray);
    let value_style = Style::default().fg(Color::Yellow);

    let split = match app.selection.options.split_bytes() {
        Some(_) => format!("{} MiB volumes", app.split_mb),
        None => format!("off ({} MiB)", app.split_mb),
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(" Mode:  ", label_style),
            Span::styled(app.selection.options.mode.to_string(), value_style),
        ]),
        Line::from(vec![
            Span::styled(" Split: ", label_style),
            Span::styled(split, value_style),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
