use std::sync::Arc;

use agentchat_core::{Config, HttpTransport};
use anyhow::Result;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Logging is optional: the UI still starts and shows why it is off
    let (log_path, log_error) = match logging::init(&config.log_filter()) {
        Ok(path) => (path, None),
        Err(e) => (None, Some(format!("Logging disabled: {:#}", e))),
    };
    if let Err(e) = &loaded {
        tracing::warn!("ignoring unreadable config, using defaults: {}", e);
    }

    let endpoint = config.endpoint();
    tracing::info!(endpoint = %endpoint, log = ?log_path, "starting agent chat");

    let events = EventHandler::new();
    let transport = Arc::new(HttpTransport::new(&endpoint));
    let mut app = App::new(transport, endpoint, events.sender());
    app.status = log_error;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, app, events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, mut app: App, mut events: EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event),
            None => break,
        }
    }

    tracing::info!(messages = app.session.len(), "exiting agent chat");
    Ok(())
}
