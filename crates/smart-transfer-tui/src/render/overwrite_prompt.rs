use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::App;

const MAX_LISTED: usize = 10;

/// Render the overwrite confirmation dialog with the colliding paths.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.pending() else {
        return;
    };
    let paths = session.existing_paths();
    let listed = paths.len().min(MAX_LISTED);
    let more = paths.len() - listed;

    // Question, paths, optional "and N more", hints, borders and margin.
    let content_height = 2 + listed as u16 + u16::from(more > 0) + 2;
    let popup_width = 70u16.min(area.width.saturating_sub(4));
    let popup_area = super::centered_rect_fixed(popup_width, content_height + 4, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Overwrite Files? ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .margin(1)
        .split(inner);

    let question = Paragraph::new(Line::from(
        "These files already exist and would be replaced:",
    ))
    .style(Style::default().fg(Color::White));
    frame.render_widget(question, chunks[0]);

    let mut lines: Vec<Line> = paths
        .iter()
        .take(listed)
        .map(|p| Line::from(p.display().to_string()))
        .collect();
    if more > 0 {
        lines.push(Line::from(format!("…and {more} more")));
    }
    let list = Paragraph::new(lines)
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: false });
    frame.render_widget(list, chunks[1]);

    let hints = super::hints(&[("Enter/y", "overwrite"), ("Esc/n", "cancel")]);
    frame.render_widget(Paragraph::new(hints), chunks[2]);
}
