use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use smart_transfer::Feedback;

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(msg) = &app.status_message {
        let color = match msg.feedback {
            Feedback::Success(_) => Color::Green,
            Feedback::Warning(_) => Color::Yellow,
            Feedback::Error(_) => Color::Red,
        };
        Line::from(Span::styled(
            format!(" {}: {}", msg.feedback.title(), msg.feedback.message()),
            Style::default().fg(color),
        ))
    } else {
        super::hints(&[
            ("a", "add"),
            ("o", "output"),
            ("j/k", "format"),
            ("m", "mode"),
            ("s", "split"),
            ("+/-", "size"),
            ("c", "compress"),
            ("d", "decompress"),
            ("x", "clear"),
            ("q", "quit"),
        ])
    };

    frame.render_widget(Paragraph::new(line), area);
}
