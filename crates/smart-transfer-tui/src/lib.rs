pub mod action;
pub mod app;
mod render;

use std::sync::Arc;

use crossterm::ExecutableCommand;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use smart_transfer::{Backend, Dispatcher, Feedback, PluginCatalog, Selection};
use tokio::sync::mpsc;
use tokio::time::{Duration, interval};

use crate::action::{Action, AppCommand};
use crate::app::App;

/// Launch the interactive TUI. Returns when the user quits.
///
/// `startup` is shown in the status bar first, typically the catalog load
/// warning. `selection` carries the configured defaults.
pub async fn run<B: Backend + 'static>(
    dispatcher: Dispatcher<B>,
    catalog: PluginCatalog,
    startup: Option<Feedback>,
    selection: Selection,
) -> anyhow::Result<()> {
    // Terminal setup.
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(catalog, selection, startup);
    let result = run_event_loop(&mut terminal, Arc::new(dispatcher), app).await;

    // Terminal teardown (always runs).
    disable_raw_mode()?;
    std::io::stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_event_loop<B: Backend + 'static>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    dispatcher: Arc<Dispatcher<B>>,
    mut app: App,
) -> anyhow::Result<()> {
    use futures::StreamExt;

    let (action_tx, mut action_rx) = mpsc::channel::<Action>(32);
    let mut event_stream = EventStream::new();
    let mut tick_interval = interval(Duration::from_millis(250));

    loop {
        terminal.draw(|frame| render::render(frame, &app))?;

        let command = tokio::select! {
            Some(event_result) = event_stream.next() => {
                match event_result {
                    Ok(event) => {
                        // Only key presses, not release/repeat.
                        match &event {
                            Event::Key(key) if key.kind == KeyEventKind::Press => {}
                            _ => continue,
                        }
                        app.handle_event(event)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "terminal event error");
                        continue;
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.handle_action(action)
            }
            _ = tick_interval.tick() => {
                app.tick();
                AppCommand::None
            }
        };

        match command {
            AppCommand::None => {}
            AppCommand::Quit => break,
            AppCommand::Dispatch(request) => {
                let dispatcher = Arc::clone(&dispatcher);
                let tx = action_tx.clone();
                tokio::spawn(async move {
                    let outcome = dispatcher.dispatch(&request).await;
                    let _ = tx.send(Action::Dispatched { request, outcome }).await;
                });
            }
        }
    }

    Ok(())
}
