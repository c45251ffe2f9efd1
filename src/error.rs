use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShimError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scratch file {path}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scratch file {path} is not a device list: {source}")]
    ScratchFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is invalid: {source}")]
    SettingsFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
