//! Console front end.
//!
//! Reads one command per line, runs it to completion, then reads the next.
//! Status lines produced by the handlers travel over the event channel and
//! are printed to stdout by [`print_events`].

use crate::domain::models::{AppEvent, ConsoleCommand};
use crate::infrastructure::bluetooth::runner::ToolRunner;
use crate::infrastructure::bluetooth::BluetoothService;
use crate::infrastructure::reporter::Reporter;
use std::future::Future;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

pub struct Console<R: ToolRunner> {
    service: BluetoothService<R>,
    reporter: Reporter,
}

impl<R: ToolRunner> Console<R> {
    pub fn new(service: BluetoothService<R>, reporter: Reporter) -> Self {
        Self { service, reporter }
    }

    /// Forget every device so the session starts from a clean slate
    pub async fn startup_cleanup(&self) {
        info!("Removing all known devices before accepting commands");
        self.service.remove_all().await;
    }

    /// Handle one input line. Blank lines are ignored.
    pub async fn handle_line(&self, line: &str) {
        let command = line.trim();
        if command.is_empty() {
            return;
        }

        self.reporter.info(command);
        debug!("Dispatching {:?}", command);

        match ConsoleCommand::parse(command) {
            ConsoleCommand::ScanAndPair => self.service.scan_and_pair().await,
            ConsoleCommand::Scan => {
                self.service.scan().await;
            }
            ConsoleCommand::RemoveAllDevices => self.service.remove_all().await,
            ConsoleCommand::RemoveNonConnected => self.service.remove_non_connected().await,
            ConsoleCommand::UpdatePairInfo => self.service.update_pair_info().await,
            ConsoleCommand::Pair(address) => {
                self.service.pair(&address).await;
            }
            ConsoleCommand::Connect(address) => {
                self.service.connect(&address).await;
            }
            ConsoleCommand::Remove(address) => {
                self.service.remove(&address).await;
            }
            ConsoleCommand::Usage(verb) => {
                self.reporter.warning(format!("Usage: {} <address>", verb));
            }
            ConsoleCommand::Invalid => self.reporter.warning("Invalid command-line argument"),
        }
    }

    /// Process lines until the input closes or `shutdown` resolves
    pub async fn run_until<F>(&self, mut lines: mpsc::UnboundedReceiver<String>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                line = lines.recv() => match line {
                    Some(line) => self.handle_line(&line).await,
                    None => {
                        info!("Input closed");
                        break;
                    }
                },
                _ = &mut shutdown => {
                    info!("Interrupted");
                    break;
                }
            }
        }
    }
}

/// Read stdin on a dedicated thread and forward each line
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

/// Print every status line until all senders are gone
pub async fn print_events<W: Write>(mut events: mpsc::UnboundedReceiver<AppEvent>, mut out: W) {
    while let Some(event) = events.recv().await {
        match event {
            AppEvent::LogMessage(msg) => {
                trace!("[{:?}] {}", msg.severity, msg.message);
                if writeln!(out, "{}", msg.message)
                    .and_then(|_| out.flush())
                    .is_err()
                {
                    error!("stdout closed, dropping status lines");
                    break;
                }
            }
        }
    }
}
