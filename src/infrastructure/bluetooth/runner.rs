//! Tool Runner Module
//!
//! Launches the Bluetooth control tool and collects its output.

use crate::domain::models::ToolOutput;
use crate::error::ShimError;
use crate::infrastructure::bluetooth::protocol::ToolCommand;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, warn};

/// Anything that can execute a [`ToolCommand`].
///
/// Implementations never fail: problems are folded into the returned
/// [`ToolOutput`] with a non-zero code.
#[allow(async_fn_in_trait)]
pub trait ToolRunner {
    async fn run(&self, command: &ToolCommand) -> ToolOutput;
}

/// Runs the real tool as a child process with a fixed timeout
#[derive(Debug, Clone)]
pub struct CliRunner {
    program: String,
    timeout: Duration,
}

impl CliRunner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Run the program with raw arguments.
    ///
    /// On timeout the child is killed and the `-1` sentinel is returned.
    pub async fn run_args(&self, args: &[String]) -> ToolOutput {
        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(source) => {
                let err = ShimError::Spawn {
                    program: self.program.clone(),
                    source,
                };
                error!("{}", err);
                return ToolOutput::failed(err.to_string());
            }
        };

        // Dropping the wait future on timeout drops the child, which kills it
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let code = exit_code(output.status);
                debug!("{} exited with code {}", self.program, code);
                ToolOutput {
                    code,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
            Ok(Err(e)) => {
                error!("Failed waiting for {}: {}", self.program, e);
                ToolOutput::failed(e.to_string())
            }
            Err(_) => {
                warn!(
                    "{} {} did not finish within {:?}, killed",
                    self.program,
                    args.join(" "),
                    self.timeout
                );
                ToolOutput::timed_out()
            }
        }
    }
}

/// Exit code of a finished child; a child killed by signal `N` reports `-N`
#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => -signal,
        (None, None) => ToolOutput::FAILURE_CODE,
    }
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(ToolOutput::FAILURE_CODE)
}

impl ToolRunner for CliRunner {
    async fn run(&self, command: &ToolCommand) -> ToolOutput {
        debug!("Running: {} {}", self.program, command.command_line());
        self.run_args(&command.args()).await
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::domain::models::DeviceFilter;
    use std::time::Instant;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_captures_code_and_streams() {
        let runner = CliRunner::new("sh", Duration::from_secs(5));
        let out = runner.run_args(&sh("echo out; echo err >&2; exit 3")).await;
        assert_eq!(out.code, 3);
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let runner = CliRunner::new("sh", Duration::from_millis(200));

        let started = Instant::now();
        let out = runner
            .run_args(&sh(&format!("sleep 1; touch '{}'", marker.display())))
            .await;
        assert_eq!(out, ToolOutput::timed_out());
        assert!(started.elapsed() < Duration::from_millis(900));

        // Had the child survived, it would have created the marker by now
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_signal_exit_is_negative_signal_number() {
        let runner = CliRunner::new("sh", Duration::from_secs(5));
        let out = runner.run_args(&sh("kill -TERM $$")).await;
        assert_eq!(out.code, -15);
        assert_ne!(out.code, ToolOutput::FAILURE_CODE);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let runner = CliRunner::new("definitely-not-a-bluetooth-tool", Duration::from_secs(1));
        let out = runner.run(&ToolCommand::Devices(DeviceFilter::All)).await;
        assert_eq!(out.code, ToolOutput::FAILURE_CODE);
        assert!(out.stderr.contains("definitely-not-a-bluetooth-tool"));
    }

    #[tokio::test]
    async fn test_passes_command_words_as_arguments() {
        let runner = CliRunner::new("echo", Duration::from_secs(5));
        let out = runner
            .run(&ToolCommand::Devices(DeviceFilter::Connected))
            .await;
        assert!(out.success());
        assert_eq!(out.stdout, "devices Connected\n");
    }
}
