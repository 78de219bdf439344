// Sysfleet - Remote Service Monitor TUI
// Main entry point

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use sysfleet::app::App;
use sysfleet::config::load_services;
use sysfleet::events::{spawn_input_handler, AppEvent, RefreshTimer, AUTO_REFRESH_INTERVAL};
use sysfleet::inventory::load_inventory;
use sysfleet::remote::Fleet;
use sysfleet::version::build_info;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "sysfleet")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Host inventory file path
    #[arg(short, long, required_unless_present_any = ["version", "build_info"])]
    inventory: Option<PathBuf>,

    /// Services config file path
    #[arg(short, long, required_unless_present_any = ["version", "build_info"])]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Show version information
    #[arg(short = 'V', long)]
    version: bool,

    /// Show detailed build information
    #[arg(long)]
    build_info: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle version flag
    if cli.version {
        println!("{}", build_info().format_display());
        return Ok(());
    }

    // Handle build info flag
    if cli.build_info {
        println!("{}", build_info().format_display());
        println!("\n{}", build_info().format_build_info());
        return Ok(());
    }

    // Initialize logging to file
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| PathBuf::from("/tmp/sysfleet.log"));
    let log_file = std::fs::File::create(&log_path)?;
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // Disable ANSI colors in log file
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("Sysfleet starting, logging to {}", log_path.display());

    // clap enforces presence once the version flags are out of the way
    let inventory_path = cli
        .inventory
        .ok_or_else(|| anyhow::anyhow!("--inventory is required"))?;
    let config_path = cli
        .config
        .ok_or_else(|| anyhow::anyhow!("--config is required"))?;

    // Run the TUI
    run_tui(inventory_path, config_path).await?;

    Ok(())
}

async fn run_tui(inventory_path: PathBuf, config_path: PathBuf) -> Result<()> {
    // Load host inventory and service config
    let hosts = load_inventory(&inventory_path)?;
    let specs = load_services(&config_path)?;
    tracing::info!(
        "Loaded {} hosts from {}, {} service specs from {}",
        hosts.len(),
        inventory_path.display(),
        specs.len(),
        config_path.display()
    );

    let fleet = Arc::new(Fleet::new(hosts, specs));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create event channel
    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);

    // Spawn input handler
    spawn_input_handler(tx.clone()).await;

    // Auto-refresh timer; paused while the detail view is open
    let timer = RefreshTimer::spawn(tx.clone(), AUTO_REFRESH_INTERVAL);

    // Create app and kick off the startup connect + fetch cycle
    let mut app = App::new(fleet.clone(), tx.clone(), timer);
    app.start();

    // Main event loop
    loop {
        // Clear terminal if full redraw is needed (e.g., after view change)
        if app.needs_full_redraw {
            terminal.clear()?;
            app.needs_full_redraw = false;
        }

        // Render UI
        terminal.draw(|f| app.render(f))?;

        // Handle events
        if let Some(event) = rx.recv().await {
            app.handle_event(event).await?;

            if app.should_quit {
                break;
            }
        }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Tear down multiplexed sessions before exiting
    fleet.close().await;

    println!("Sysfleet exited. Goodbye!");

    Ok(())
}
