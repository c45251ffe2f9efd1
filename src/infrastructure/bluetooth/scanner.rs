//! Device Scanner Module
//!
//! Handles device listings and discovery of nearby controllers.

use crate::domain::models::{DeviceEntry, DeviceFilter, ToolOutput};
use crate::infrastructure::bluetooth::protocol::{self, ToolCommand};
use crate::infrastructure::bluetooth::runner::ToolRunner;
use crate::infrastructure::reporter::Reporter;
use tracing::{debug, info};

/// Listing and discovery
pub struct DeviceScanner<'a, R: ToolRunner> {
    runner: &'a R,
    reporter: &'a Reporter,
}

impl<'a, R: ToolRunner> DeviceScanner<'a, R> {
    pub fn new(runner: &'a R, reporter: &'a Reporter) -> Self {
        Self { runner, reporter }
    }

    /// Fetch a `devices` listing; a failed listing is reported and treated as empty
    pub async fn list(&self, filter: DeviceFilter) -> Vec<DeviceEntry> {
        let out = self.runner.run(&ToolCommand::Devices(filter)).await;

        if out.success() {
            let devices = protocol::parse_device_listing(&out.stdout);
            debug!("Listed {} {} device(s)", devices.len(), filter.label());
            devices
        } else {
            self.reporter.error(format!(
                "Failed to fetch {} devices. Error: {}",
                filter.label(),
                out.stderr.trim_end()
            ));
            Vec::new()
        }
    }

    /// Run discovery until the tool times out, then list everything it knows about.
    ///
    /// `scan on` never exits by itself, so the timeout sentinel counts as a
    /// completed scan.
    pub async fn discover(&self) -> Vec<DeviceEntry> {
        self.reporter.info("Scanning for Bluetooth devices!");
        info!("Starting device discovery");

        let out = self.runner.run(&ToolCommand::ScanOn).await;

        if out.success() || out.code == ToolOutput::FAILURE_CODE {
            self.reporter.info("Scan ended");
            self.list(DeviceFilter::All).await
        } else {
            self.reporter.error(format!(
                "Return code: {}. Error: {}",
                out.code,
                out.stderr.trim_end()
            ));
            self.reporter.error(format!("Error: {}", out.stdout.trim_end()));
            Vec::new()
        }
    }
}

/// Keep only devices whose name contains one of the controller keywords
pub fn controllers(devices: &[DeviceEntry], keywords: &[String]) -> Vec<DeviceEntry> {
    devices
        .iter()
        .filter(|d| d.matches_any(keywords))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::bluetooth::runner::testing::ScriptedRunner;
    use crate::infrastructure::reporter::testing::{capture, drain};

    const LISTING: &str = "Device 00:1A:7D:DA:71:13 Wireless Controller\n\
                           Device 11:22:33:44:55:66 JBL Flip 5\n";

    #[tokio::test]
    async fn test_discover_after_timeout() {
        let runner = ScriptedRunner::new()
            .respond("scan on", -1, "", "Timeout expired while executing the command.")
            .respond("devices", 0, LISTING, "");
        let (reporter, mut rx) = capture();

        let devices = DeviceScanner::new(&runner, &reporter).discover().await;

        assert_eq!(runner.calls(), vec!["scan on", "devices"]);
        assert_eq!(devices.len(), 2);
        assert_eq!(
            drain(&mut rx),
            vec!["Scanning for Bluetooth devices!", "Scan ended"]
        );
    }

    #[tokio::test]
    async fn test_discover_tool_error() {
        let runner = ScriptedRunner::new().respond(
            "scan on",
            1,
            "",
            "No default controller available",
        );
        let (reporter, mut rx) = capture();

        let devices = DeviceScanner::new(&runner, &reporter).discover().await;

        assert!(devices.is_empty());
        assert_eq!(runner.calls(), vec!["scan on"]);
        assert_eq!(
            drain(&mut rx),
            vec![
                "Scanning for Bluetooth devices!",
                "Return code: 1. Error: No default controller available",
                "Error: ",
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_killed_scan_is_not_a_finished_scan() {
        let runner = ScriptedRunner::new().respond("scan on", -15, "Discovery started", "");
        let (reporter, mut rx) = capture();

        let devices = DeviceScanner::new(&runner, &reporter).discover().await;

        assert!(devices.is_empty());
        assert_eq!(runner.calls(), vec!["scan on"]);
        assert_eq!(
            drain(&mut rx),
            vec![
                "Scanning for Bluetooth devices!",
                "Return code: -15. Error: ",
                "Error: Discovery started",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_listing_is_empty() {
        let runner = ScriptedRunner::new().respond("devices Paired", 1, "", "dbus down");
        let (reporter, mut rx) = capture();

        let devices = DeviceScanner::new(&runner, &reporter)
            .list(DeviceFilter::Paired)
            .await;

        assert!(devices.is_empty());
        assert_eq!(
            drain(&mut rx),
            vec!["Failed to fetch paired devices. Error: dbus down"]
        );
    }

    #[test]
    fn test_controllers_filter() {
        let devices = protocol::parse_device_listing(LISTING);
        let keywords = vec!["controller".to_string()];
        let found = controllers(&devices, &keywords);
        assert_eq!(
            found,
            vec![DeviceEntry::new("00:1A:7D:DA:71:13", "Wireless Controller")]
        );
    }
}
