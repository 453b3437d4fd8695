//! Main TUI runner - entry point and event loop

use afcdeck_app::{Engine, Settings};
use afcdeck_core::prelude::*;
use afcdeck_core::LogSource;
use afcdeck_device::DeviceBackend;

use super::{event, render, terminal};

/// Run the TUI against a device backend until the user quits
pub async fn run<B>(settings: Settings, backend: B) -> Result<()>
where
    B: DeviceBackend + Sync + 'static,
{
    // Install panic hook for terminal restoration
    terminal::install_panic_hook();

    let mut engine = Engine::new(settings, backend);
    engine.state.log_info(LogSource::App, "afcdeck starting...");

    let mut term = ratatui::init();

    engine.start();
    let result = run_loop(&mut term, &mut engine);

    engine.shutdown().await;
    ratatui::restore();

    info!("afcdeck exited");
    result
}

/// Main event loop
fn run_loop<B>(terminal: &mut ratatui::DefaultTerminal, engine: &mut Engine<B>) -> Result<()>
where
    B: DeviceBackend + Sync + 'static,
{
    while !engine.should_quit() {
        // Results from background tasks and the signal handler
        engine.drain_pending_messages();

        terminal.draw(|frame| render::view(frame, &engine.state))?;

        if let Some(message) = event::poll()? {
            engine.process_message(message);
        }
    }

    Ok(())
}
