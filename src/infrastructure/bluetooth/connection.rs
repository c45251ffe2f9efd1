//! Device Connection Module
//!
//! Handles pairing, trusting, connecting and removing a single device.

use crate::infrastructure::bluetooth::protocol::ToolCommand;
use crate::infrastructure::bluetooth::runner::ToolRunner;
use crate::infrastructure::reporter::Reporter;
use tracing::{info, warn};

/// Single-device operations
pub struct DeviceConnection<'a, R: ToolRunner> {
    runner: &'a R,
    reporter: &'a Reporter,
}

impl<'a, R: ToolRunner> DeviceConnection<'a, R> {
    pub fn new(runner: &'a R, reporter: &'a Reporter) -> Self {
        Self { runner, reporter }
    }

    /// Pair with a device and, if that worked, trust it
    pub async fn pair_and_trust(&self, address: &str) -> bool {
        info!("Pairing with {}", address);
        let out = self.runner.run(&ToolCommand::Pair(address.to_string())).await;

        if out.success() {
            self.reporter.success(format!(
                "Successfully paired with device at address {}",
                address
            ));
            self.trust(address).await
        } else {
            warn!("Pairing with {} failed with code {}", address, out.code);
            self.reporter.error(format!(
                "Failed to pair with device at address {}. Error: {}",
                address,
                out.stderr.trim_end()
            ));
            self.reporter.error(format!("Error: {}", out.stdout.trim_end()));
            false
        }
    }

    pub async fn trust(&self, address: &str) -> bool {
        let out = self.runner.run(&ToolCommand::Trust(address.to_string())).await;

        if out.success() {
            self.reporter.success(format!(
                "Successfully trusted device at address {}",
                address
            ));
            true
        } else {
            self.reporter.error(format!(
                "Failed to trust device at address {}. Error: {}",
                address,
                out.stderr.trim_end()
            ));
            self.reporter.error(format!("Error: {}", out.stdout.trim_end()));
            false
        }
    }

    pub async fn connect(&self, address: &str) -> bool {
        info!("Connecting to {}", address);
        let out = self
            .runner
            .run(&ToolCommand::Connect(address.to_string()))
            .await;

        if out.success() {
            self.reporter.success(format!(
                "Successfully connected to device at address {}",
                address
            ));
            true
        } else {
            warn!("Connecting to {} failed with code {}", address, out.code);
            self.reporter.error(format!(
                "Failed to connect to device at address {}. Error: {}",
                address,
                out.stderr.trim_end()
            ));
            self.reporter.error(format!("Error: {}", out.stdout.trim_end()));
            false
        }
    }

    /// Remove the device, dropping its pairing and trust
    pub async fn remove(&self, address: &str) -> bool {
        let out = self
            .runner
            .run(&ToolCommand::Remove(address.to_string()))
            .await;

        if out.success() {
            self.reporter.success(format!(
                "Successfully removed trust from device at address {}",
                address
            ));
            true
        } else {
            self.reporter.error(format!(
                "Failed to remove trust from device at address {}. Error: {}",
                address,
                out.stderr.trim_end()
            ));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::bluetooth::runner::testing::ScriptedRunner;
    use crate::infrastructure::reporter::testing::{capture, drain};

    const ADDR: &str = "AA:BB:CC:DD:EE:FF";

    #[tokio::test]
    async fn test_pair_success_trusts() {
        let runner = ScriptedRunner::new();
        let (reporter, mut rx) = capture();

        assert!(DeviceConnection::new(&runner, &reporter).pair_and_trust(ADDR).await);
        assert_eq!(
            runner.calls(),
            vec![format!("pair {}", ADDR), format!("trust {}", ADDR)]
        );
        assert_eq!(
            drain(&mut rx),
            vec![
                format!("Successfully paired with device at address {}", ADDR),
                format!("Successfully trusted device at address {}", ADDR),
            ]
        );
    }

    #[tokio::test]
    async fn test_pair_failure_skips_trust() {
        let runner = ScriptedRunner::new().respond(
            &format!("pair {}", ADDR),
            1,
            "Attempting to pair",
            "Failed to pair: org.bluez.Error.AuthenticationFailed\n",
        );
        let (reporter, mut rx) = capture();

        assert!(!DeviceConnection::new(&runner, &reporter).pair_and_trust(ADDR).await);
        assert_eq!(runner.calls(), vec![format!("pair {}", ADDR)]);
        assert_eq!(
            drain(&mut rx),
            vec![
                format!(
                    "Failed to pair with device at address {}. Error: Failed to pair: org.bluez.Error.AuthenticationFailed",
                    ADDR
                ),
                "Error: Attempting to pair".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_timed_out_connect_is_failure() {
        let runner = ScriptedRunner::new().respond(
            &format!("connect {}", ADDR),
            -1,
            "",
            "Timeout expired while executing the command.",
        );
        let (reporter, mut rx) = capture();

        assert!(!DeviceConnection::new(&runner, &reporter).connect(ADDR).await);
        let lines = drain(&mut rx);
        assert!(lines[0].starts_with("Failed to connect to device at address"));
    }

    #[tokio::test]
    async fn test_remove() {
        let runner = ScriptedRunner::new();
        let (reporter, mut rx) = capture();

        assert!(DeviceConnection::new(&runner, &reporter).remove(ADDR).await);
        assert_eq!(runner.calls(), vec![format!("remove {}", ADDR)]);
        assert_eq!(
            drain(&mut rx),
            vec![format!(
                "Successfully removed trust from device at address {}",
                ADDR
            )]
        );
    }
}
