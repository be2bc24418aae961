use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use winit::event_loop::EventLoop;

use scene_host::cli::Cli;
use scene_host::document::SessionDocument;
use scene_host::logging::{init_logging, LoggingConfig};
use scene_host::surface_set::SurfaceSet;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(LoggingConfig {
        filter: cli.log.clone(),
        ..LoggingConfig::default()
    });

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("scene-host: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let session = SessionDocument::load(&cli.session)
        .with_context(|| format!("failed to load session {}", cli.session.display()))?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = SurfaceSet::new(cli.session.clone(), session);
    event_loop.run_app(&mut app).context("event loop terminated abnormally")?;

    if let Some(err) = app.error() {
        eprintln!("scene-host: {err}");
    }
    Ok(app.exit_code())
}
