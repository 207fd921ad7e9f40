//! # statlink - Hardware Telemetry over Serial
//!
//! A small Rust crate that samples local hardware telemetry (CPU/GPU/RAM/
//! disk/network) once per tick and streams it as a compact ASCII line to an
//! external microcontroller display over a serial link. Built to run forever:
//! missing sensors read as zero, a failed serial write triggers a
//! close-and-retry cycle, and one bad tick never kills the loop.
//!
//! ## Features
//!
//! - **One consistent snapshot per tick**: many independent sensor readings
//!   aggregated with fixed disambiguation rules
//! - **Sensor absence tolerated**: an absent metric is a valid zero reading
//! - **Serial auto-reconnect**: unplug/replug the device without restarting
//! - **Cooperative cancellation**: both waits are interruptible, shutdown is
//!   observed within one cadence period
//! - **Library + Binary**: embed the loop in a shell or run it standalone
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use statlink::{
//!     Config, DiskProbe, HostSource, LogNotifier, SampleLoop, TokioSerialEndpoint,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::new("/dev/ttyUSB0", 115_200);
//!     let endpoint = TokioSerialEndpoint::new(&config.serial_port, config.baud_rate);
//!     let driver = SampleLoop::new(
//!         &config,
//!         HostSource::new(),
//!         DiskProbe::new(),
//!         endpoint,
//!         Arc::new(LogNotifier),
//!     );
//!
//!     let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let task = tokio::spawn(driver.run(shutdown_rx));
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     let _ = shutdown_tx.send(true);
//!     let _ = task.await;
//! }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod hardware;
pub mod metrics;
pub mod notify;
pub mod protocol;
pub mod transport;

// Re-export public API
pub use config::Config;
pub use driver::SampleLoop;
pub use error::{Result, TelemetryError};
pub use hardware::{
    disks::{DiskProbe, VolumeProbe},
    host::HostSource,
    node::{HardwareKind, HardwareNode, HardwareSource, SensorKind, SensorReading},
};
pub use metrics::{
    aggregator::SnapshotAggregator,
    calculator::{build_frame, FanCalibration},
    snapshot::{DisplayFrame, Snapshot},
};
pub use notify::{LogNotifier, Notifier};
pub use protocol::encode_frame;
pub use transport::{serial::TokioSerialEndpoint, ConnectionState, TransportManager};

/// The default tick period in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// The default wait after a transport failure in milliseconds
pub const FAILURE_BACKOFF_MS: u64 = 1500;
