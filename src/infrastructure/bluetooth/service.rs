//! Bluetooth Service Module
//!
//! Main service that coordinates listing, scanning, pairing and cleanup,
//! and hands device lists between steps through scratch files.

use crate::domain::models::{DeviceEntry, DeviceFilter};
use crate::domain::settings::ToolSettings;
use crate::infrastructure::bluetooth::{
    connection::DeviceConnection,
    runner::ToolRunner,
    scanner::{self, DeviceScanner},
};
use crate::infrastructure::reporter::Reporter;
use crate::infrastructure::scratch::{ScratchStore, Taken};
use std::collections::HashSet;
use tracing::{error, info};

/// Main Bluetooth service coordinating all tool operations
pub struct BluetoothService<R: ToolRunner> {
    runner: R,
    reporter: Reporter,
    store: ScratchStore,
    config: ToolSettings,
}

impl<R: ToolRunner> BluetoothService<R> {
    /// Create a new Bluetooth service
    pub fn new(runner: R, reporter: Reporter, config: ToolSettings) -> Self {
        Self {
            runner,
            reporter,
            store: ScratchStore::new(config.scratch_dir.clone()),
            config,
        }
    }

    #[cfg(test)]
    pub(crate) fn runner(&self) -> &R {
        &self.runner
    }

    fn scanner(&self) -> DeviceScanner<'_, R> {
        DeviceScanner::new(&self.runner, &self.reporter)
    }

    fn connection(&self) -> DeviceConnection<'_, R> {
        DeviceConnection::new(&self.runner, &self.reporter)
    }

    /// List connected devices and persist them to the connected scratch file
    pub async fn connected_devices(&self) -> Vec<DeviceEntry> {
        let devices = self.scanner().list(DeviceFilter::Connected).await;
        if !devices.is_empty() {
            self.reporter
                .info(format!("Connected Devices: '{}'", rows(&devices)));
        }
        for device in &devices {
            self.reporter.info(format!("Connected Device: {}", device));
        }
        self.save(&self.config.connected_file, &devices);
        devices
    }

    /// List paired devices and persist them to the paired scratch file
    pub async fn paired_devices(&self) -> Vec<DeviceEntry> {
        let devices = self.scanner().list(DeviceFilter::Paired).await;
        if !devices.is_empty() {
            self.reporter
                .info(format!("All Paired Devices: '{}'", rows(&devices)));
        }
        for device in &devices {
            self.reporter.info(format!("All Paired Device: {}", device));
        }
        self.save(&self.config.paired_file, &devices);
        devices
    }

    /// Paired devices that are not currently connected
    pub async fn non_connected_devices(&self) -> Vec<DeviceEntry> {
        let connected = self.connected_devices().await;
        let paired = self.paired_devices().await;

        let connected: HashSet<&str> = connected.iter().map(|d| d.address.as_str()).collect();
        let non_connected: Vec<DeviceEntry> = paired
            .into_iter()
            .filter(|d| !connected.contains(d.address.as_str()))
            .collect();

        for device in &non_connected {
            self.reporter
                .info(format!("Non-connected Device: {}", device));
        }
        non_connected
    }

    /// Remove every paired device that is not connected
    pub async fn remove_non_connected(&self) {
        for device in self.non_connected_devices().await {
            self.reporter.info(format!(
                "Removing Non-connected Device: {} ({})",
                device.name, device.address
            ));
            self.connection().remove(&device.address).await;
        }
    }

    /// Remove every connected device
    pub async fn remove_connected(&self) {
        for device in self.connected_devices().await {
            self.reporter.info(format!(
                "Removing connected Device: {} ({})",
                device.name, device.address
            ));
            self.connection().remove(&device.address).await;
        }
    }

    /// Remove everything the tool knows about
    pub async fn remove_all(&self) {
        self.remove_non_connected().await;
        self.remove_connected().await;
    }

    /// Refresh the paired and connected scratch files
    pub async fn update_pair_info(&self) {
        self.paired_devices().await;
        self.connected_devices().await;
    }

    /// Discover nearby devices and save the controllers among them to the scan file
    pub async fn scan(&self) -> Vec<DeviceEntry> {
        self.update_pair_info().await;

        let nearby = self.scanner().discover().await;
        if nearby.is_empty() {
            self.reporter.warning("No Bluetooth devices found.");
        } else {
            self.reporter.info("Nearby Bluetooth Devices:");
            for device in &nearby {
                self.reporter.info(format!("  {}", device));
            }
        }

        let controllers = scanner::controllers(&nearby, &self.config.controller_keywords);
        if controllers.is_empty() {
            self.reporter.warning("No Controller devices found.");
        } else {
            info!("Found {} controller(s)", controllers.len());
            self.reporter.info("Nearby Controller Devices:");
            for device in &controllers {
                self.reporter.info(format!("  {}", device));
            }
            self.save(&self.config.scan_file, &controllers);
        }
        controllers
    }

    /// Pair, trust and connect every device in the scan file, consuming it
    pub async fn pair_scan(&self) {
        let devices = self.take(&self.config.scan_file);

        if devices.is_empty() {
            self.reporter.warning("No device info found");
            return;
        }

        self.reporter.info(format!("Raw data: '{}'", rows(&devices)));
        for device in &devices {
            self.reporter.info(format!("Device: {}", device));
            self.connection().pair_and_trust(&device.address).await;
            self.connection().connect(&device.address).await;
        }

        self.update_pair_info().await;
    }

    pub async fn scan_and_pair(&self) {
        self.scan().await;
        self.pair_scan().await;
    }

    pub async fn pair(&self, address: &str) -> bool {
        self.connection().pair_and_trust(address).await
    }

    pub async fn connect(&self, address: &str) -> bool {
        self.connection().connect(address).await
    }

    pub async fn remove(&self, address: &str) -> bool {
        self.connection().remove(address).await
    }

    fn save(&self, file_name: &str, devices: &[DeviceEntry]) {
        match self.store.save(file_name, devices) {
            Ok(path) => self
                .reporter
                .info(format!("Data saved to {}", path.display())),
            Err(e) => {
                error!("{}", e);
                self.reporter.error(format!("Could not save devices: {}", e));
            }
        }
    }

    fn take(&self, file_name: &str) -> Vec<DeviceEntry> {
        let path = self.store.path_for(file_name);
        match self.store.take(file_name) {
            Ok(Taken::Devices(devices)) => {
                self.reporter
                    .info(format!("File '{}' removed.", path.display()));
                devices
            }
            Ok(Taken::Lingering(devices, e)) => {
                self.reporter.error(format!(
                    "An error occurred while trying to remove the file: {}",
                    e
                ));
                devices
            }
            Ok(Taken::Missing) => {
                self.reporter
                    .warning(format!("The file '{}' does not exist.", path.display()));
                Vec::new()
            }
            Err(e) => {
                error!("{}", e);
                self.reporter.error(format!("Could not read devices: {}", e));
                Vec::new()
            }
        }
    }
}

/// Compact JSON rows, the same shape as the scratch files
fn rows(devices: &[DeviceEntry]) -> String {
    serde_json::to_string(devices).unwrap_or_default()
}
