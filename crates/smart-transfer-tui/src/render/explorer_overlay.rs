use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{App, Mode};

/// Render the file explorer overlay, for adding files or picking the
/// output directory depending on the mode.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(explorer) = &app.file_explorer else {
        return;
    };

    let popup_area = super::centered_rect_percent(60, 70, area);
    frame.render_widget(Clear, popup_area);

    // Explorer, preview line, hint bar.
    let chunks = Layout::default()
        .constraints([
            Constraint::Min(3),
            Constraint::Length(2),
            Constraint::Length(2),
        ])
        .split(popup_area);

    let choosing_output = app.mode == Mode::ChooseOutput;
    let title = if choosing_output {
        " Choose Output Directory "
    } else {
        " Add Files "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(title);
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);
    frame.render_widget(&explorer.widget(), inner);

    let preview_style = Style::default().fg(Color::DarkGray);
    let path_style = Style::default().fg(Color::Yellow);
    let preview = if choosing_output {
        Line::from(vec![
            Span::styled(" Output to: ", preview_style),
            Span::styled(explorer.cwd().display().to_string(), path_style),
        ])
    } else {
        Line::from(vec![
            Span::styled(" Selected: ", preview_style),
            Span::styled(format!("{} file(s)", app.selection.files.len()), path_style),
        ])
    };
    frame.render_widget(Paragraph::new(preview), chunks[1]);

    let hints = if choosing_output {
        super::hints(&[("j/k", "nav"), ("Enter", "open"), ("o", "use this directory"), ("Esc", "cancel")])
    } else {
        super::hints(&[("j/k", "nav"), ("Enter", "open / toggle file"), ("Esc", "done")])
    };
    frame.render_widget(Paragraph::new(hints), chunks[2]);
}
