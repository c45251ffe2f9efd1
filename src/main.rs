mod console;
mod domain;
mod error;
mod infrastructure;

use anyhow::Context;
use clap::Parser;
use console::Console;
use domain::settings::{Settings, SettingsService};
use infrastructure::bluetooth::runner::CliRunner;
use infrastructure::bluetooth::BluetoothService;
use infrastructure::reporter::Reporter;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "bt-controller-pairer",
    version,
    about = "Scan for, pair and track Bluetooth game controllers through bluetoothctl"
)]
struct Cli {
    #[arg(long, help = "Settings file (defaults to the user config directory)")]
    config: Option<PathBuf>,
    #[arg(long, help = "Directory for the scan/paired/connected JSON files")]
    scratch_dir: Option<PathBuf>,
    #[arg(long, help = "Bluetooth control program to invoke")]
    tool: Option<String>,
    #[arg(long, help = "Seconds before a tool invocation is killed")]
    timeout_secs: Option<u64>,
    #[arg(long, help = "Log filter, e.g. debug or bt_controller_pairer=trace")]
    log_level: Option<String>,
    #[arg(long, help = "Keep known devices instead of removing them on start")]
    skip_startup_cleanup: bool,
    #[arg(long, help = "Write the effective settings to the settings file and exit")]
    save_config: bool,
    #[arg(help = "Run a single console command and exit, e.g. `scan` or `pair <address>`")]
    command: Vec<String>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.scratch_dir {
            settings.tool.scratch_dir = dir.clone();
        }
        if let Some(tool) = &self.tool {
            settings.tool.program = tool.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.tool.timeout_secs = secs;
        }
        if let Some(level) = &self.log_level {
            settings.log_settings.level = level.clone();
        }
        if self.skip_startup_cleanup {
            settings.startup_cleanup = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings_service = match &cli.config {
        Some(path) => SettingsService::from_path(path.clone()),
        None => SettingsService::new()?,
    };
    let load_error = settings_service.take_load_error();
    cli.apply(settings_service.get_mut());
    let settings = settings_service.get().clone();

    if cli.save_config {
        if let Some(e) = &load_error {
            eprintln!("Replacing unreadable settings: {}", e);
        }
        settings_service.save()?;
        println!("Settings written to {}", settings_service.path().display());
        return Ok(());
    }

    let _logging_guard = infrastructure::logging::init_logger(&settings.log_settings)
        .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
        .ok();

    if let Some(e) = load_error {
        warn!("{}; using default settings", e);
    }

    info!(
        "Starting Bluetooth controller pairer (settings: {})",
        settings_service.path().display()
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    rt.block_on(run(cli.command, settings))
}

async fn run(command: Vec<String>, settings: Settings) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(console::print_events(event_rx, std::io::stdout()));

    let runner = CliRunner::new(
        settings.tool.program.clone(),
        Duration::from_secs(settings.tool.timeout_secs),
    );
    let service = BluetoothService::new(runner, Reporter::new(event_tx.clone()), settings.tool);
    let console = Console::new(service, Reporter::new(event_tx));

    if command.is_empty() {
        if settings.startup_cleanup {
            console.startup_cleanup().await;
        }
        let lines = console::spawn_stdin_reader();
        console
            .run_until(lines, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Ctrl-C handler unavailable: {}", e);
                    std::future::pending::<()>().await;
                }
            })
            .await;
    } else {
        console.handle_line(&command.join(" ")).await;
    }

    // Closing the last sender lets the printer drain and finish
    drop(console);
    printer.await.context("Status printer failed")?;

    info!("Shutting down");
    Ok(())
}
