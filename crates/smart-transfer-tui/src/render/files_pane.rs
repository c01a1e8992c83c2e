use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let files = &app.selection.files;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Files ({}) ", files.len()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible_height = inner.height as usize;
    if visible_height == 0 {
        return;
    }
    if files.is_empty() {
        let hint = Line::from(Span::styled(
            "No files selected. Press a to add some.",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(hint), inner);
        return;
    }

    // Keep the most recently added files in view.
    let scroll_offset = files.len().saturating_sub(visible_height);
    let lines: Vec<Line> = files
        .iter()
        .skip(scroll_offset)
        .map(|path| Line::from(format!("  {}", path.display())))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);

    if files.len() > visible_height {
        let mut scrollbar_state = ScrollbarState::new(files.len())
            .position(scroll_offset)
            .viewport_content_length(visible_height);

        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None)
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
    }
}
