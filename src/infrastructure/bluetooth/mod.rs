//! Bluetooth Module
//!
//! Drives the external Bluetooth control tool.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    BluetoothService                      │
//! │  (Main coordinator - public API for the console)         │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!         ┌─────────────┼─────────────┐
//!         │             │             │
//!         ▼             ▼             ▼
//! ┌───────────┐  ┌────────────┐  ┌──────────┐
//! │  Scanner  │  │ Connection │  │ Protocol │
//! │           │  │            │  │          │
//! │ - Listing │  │ - Pair     │  │ - Command│
//! │ - Scan    │  │ - Trust    │  │   words  │
//! │           │  │ - Connect  │  │ - Listing│
//! │           │  │ - Remove   │  │   parser │
//! └─────┬─────┘  └─────┬──────┘  └──────────┘
//!       └──────┬───────┘
//!              ▼
//!        ┌──────────┐
//!        │  Runner  │  child process + timeout
//!        └──────────┘
//! ```
//!
//! ## Modules
//!
//! - [`protocol`] - Tool command words and listing parser
//! - [`runner`] - Child process invocation with a fixed timeout
//! - [`scanner`] - Device listings and discovery
//! - [`connection`] - Pairing, trust, connection and removal of one device
//! - [`service`] - Main service coordinator

pub mod connection;
pub mod protocol;
pub mod runner;
pub mod scanner;
pub mod service;

// Re-export main service for convenience
pub use service::BluetoothService;
