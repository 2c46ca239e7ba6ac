use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use desktop_starter::error::{Result, StarterError};
use desktop_starter::event::{Event, EventHandler};
use desktop_starter::starter::{StarterAction, StarterApp, StarterConfig};
use ratatui::prelude::*;
use std::io::stdout;
use std::panic;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "desktop-starter")]
#[command(author, version, about = "First-run setup wizard with a package explorer")]
struct Args {
    /// Path to config file (default: /etc/desktop-starter/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Simulate status queries, storage and autostart without touching the system
    #[arg(long)]
    dryrun: bool,

    /// Log file path (logging disabled if not specified)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging only if log file is specified
    if let Some(ref log_path) = args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .ok();

        if let Some(file) = file {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .init();

            info!("Starting desktop-starter");
        }
    }

    // Load config from specified path, default path, or use defaults
    let mut config = match args.config.as_deref() {
        Some(path) => StarterConfig::load_from(path)?,
        None => StarterConfig::load_or_default(),
    };

    // --dryrun flag overrides config
    if args.dryrun {
        config.general.dryrun = true;
    }

    let (status_tx, status_rx) = mpsc::unbounded_channel();
    let mut app = StarterApp::from_config(config, Some(status_tx)).await?;

    // Set up panic handler to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app, EventHandler::new(Duration::from_millis(150), Some(status_rx))).await;
    restore_terminal()?;

    if let Err(ref e) = result {
        error!("Wizard error: {}", e);
    }

    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode().map_err(|e| StarterError::Terminal(e.to_string()))?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| StarterError::Terminal(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).map_err(|e| StarterError::Terminal(e.to_string()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().map_err(|e| StarterError::Terminal(e.to_string()))?;
    execute!(stdout(), LeaveAlternateScreen).map_err(|e| StarterError::Terminal(e.to_string()))?;
    Ok(())
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut StarterApp,
    mut events: EventHandler,
) -> Result<()> {
    loop {
        terminal
            .draw(|frame| desktop_starter::starter::ui::draw(frame, app))
            .map_err(|e| StarterError::Terminal(e.to_string()))?;

        match events.next().await {
            Some(Event::Key(key)) => {
                if let Some(StarterAction::SetLaunchAtStartup(enabled)) = app.handle_key(key) {
                    app.set_launch_at_startup(enabled).await;
                }
            }
            Some(Event::Status(update)) => app.handle_status_update(update),
            Some(Event::Tick) => app.tick(),
            Some(Event::Resize) => {}
            None => break,
        }

        if app.should_exit {
            break;
        }
    }

    info!("Exiting desktop-starter");
    Ok(())
}
