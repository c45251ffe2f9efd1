//! Scratch Files
//!
//! Device lists handed from one step to the next through JSON files.
//! A file is written once and removed by the first read.

use crate::domain::models::DeviceEntry;
use crate::error::ShimError;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Outcome of [`ScratchStore::take`]
#[derive(Debug)]
pub enum Taken {
    Devices(Vec<DeviceEntry>),
    /// The devices were read but the file could not be removed
    Lingering(Vec<DeviceEntry>, std::io::Error),
    Missing,
}

pub struct ScratchStore {
    dir: PathBuf,
}

impl ScratchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Write the devices as a pretty-printed JSON array of `[address, name]` pairs
    pub fn save(&self, file_name: &str, devices: &[DeviceEntry]) -> Result<PathBuf, ShimError> {
        let path = self.path_for(file_name);

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        devices
            .serialize(&mut ser)
            .map_err(|source| ShimError::ScratchFormat {
                path: path.clone(),
                source,
            })?;

        fs::write(&path, buf).map_err(|source| ShimError::Scratch {
            path: path.clone(),
            source,
        })?;
        debug!("Saved {} device(s) to {}", devices.len(), path.display());
        Ok(path)
    }

    /// Read the devices and remove the file.
    ///
    /// An undecodable file is removed as well, so the next run starts clean.
    pub fn take(&self, file_name: &str) -> Result<Taken, ShimError> {
        let path = self.path_for(file_name);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Taken::Missing),
            Err(source) => return Err(ShimError::Scratch { path, source }),
        };

        let decoded: Result<Vec<DeviceEntry>, _> = serde_json::from_str(&contents);
        let removed = fs::remove_file(&path);

        let devices = match decoded {
            Ok(devices) => devices,
            Err(source) => {
                if let Err(e) = removed {
                    warn!("Could not remove corrupt {}: {}", path.display(), e);
                }
                return Err(ShimError::ScratchFormat { path, source });
            }
        };

        match removed {
            Ok(()) => Ok(Taken::Devices(devices)),
            Err(e) => {
                warn!("Could not remove {}: {}", path.display(), e);
                Ok(Taken::Lingering(devices, e))
            }
        }
    }
}
