//! The sample loop: aggregate, convert, encode, send, sleep, repeat.
//!
//! Runs on one dedicated background task for the lifetime of the process.
//! The foreground only flips the shutdown watch channel; both timed waits
//! select on it, so cancellation is observed within one wait interval, not
//! just between ticks. One bad tick never terminates the loop - the only
//! way out is cancellation.

use crate::config::Config;
use crate::hardware::disks::VolumeProbe;
use crate::hardware::node::HardwareSource;
use crate::metrics::aggregator::SnapshotAggregator;
use crate::metrics::calculator::{build_frame, FanCalibration};
use crate::notify::Notifier;
use crate::protocol::encode_frame;
use crate::transport::{SerialEndpoint, TransportManager};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Consecutive unexpected tick failures before the notifier hears about it.
const DEGRADED_THRESHOLD: u32 = 3;

/// Drives the full pipeline at a fixed cadence.
pub struct SampleLoop<S, P, E>
where
    S: HardwareSource,
    P: VolumeProbe,
    E: SerialEndpoint,
{
    aggregator: SnapshotAggregator,
    source: S,
    probe: P,
    transport: TransportManager<E>,
    notifier: Arc<dyn Notifier>,
    fans: FanCalibration,
    interval: Duration,
    backoff: Duration,
}

impl<S, P, E> SampleLoop<S, P, E>
where
    S: HardwareSource,
    P: VolumeProbe,
    E: SerialEndpoint,
{
    pub fn new(
        config: &Config,
        source: S,
        probe: P,
        endpoint: E,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            aggregator: SnapshotAggregator::new(config.volumes.clone()),
            source,
            probe,
            transport: TransportManager::new(endpoint, notifier.clone()),
            notifier,
            fans: FanCalibration::from(config),
            interval: Duration::from_millis(config.interval_ms),
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }

    /// Run until the shutdown channel flips to `true` (or its sender drops).
    /// The serial endpoint is released exactly once, after the loop exits.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let started = Instant::now();
        let mut consecutive_faults: u32 = 0;
        let mut degraded_reported = false;

        info!(
            interval_ms = self.interval.as_millis() as u64,
            backoff_ms = self.backoff.as_millis() as u64,
            "telemetry loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let uptime_secs = started.elapsed().as_secs();
            let wait = match self.tick(uptime_secs).await {
                Ok(()) => {
                    consecutive_faults = 0;
                    degraded_reported = false;
                    self.interval
                }
                Err(err) if err.is_transport() => {
                    // The display may simply be unplugged; give it longer
                    // than a tick before knocking again.
                    warn!(error = %err, "transport failure, retrying after backoff");
                    self.backoff
                }
                Err(err) => {
                    consecutive_faults += 1;
                    error!(error = %err, "tick failed, skipping");
                    if consecutive_faults >= DEGRADED_THRESHOLD && !degraded_reported {
                        self.notifier
                            .degraded(&format!("telemetry sampling failing repeatedly: {}", err));
                        degraded_reported = true;
                    }
                    self.interval
                }
            };

            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        self.transport.close().await;
        info!("telemetry loop stopped");
    }

    async fn tick(&mut self, uptime_secs: u64) -> Result<()> {
        let snapshot = self.aggregator.collect(&mut self.source, &mut self.probe)?;
        let frame = build_frame(&snapshot, uptime_secs, &self.fans);
        let line = encode_frame(&frame);

        self.transport.ensure_open().await?;
        self.transport.send(&line).await?;
        debug!(line = line.trim_end(), "frame sent");
        Ok(())
    }
}
