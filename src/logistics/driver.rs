//! Frame Driver
//!
//! Stands in for the host's per-frame update: ticks a [`TransferScheduler`]
//! on a fixed wall-clock interval until shutdown is signalled.
//!
//! For hosts that own a tokio runtime. Hosts with their own frame callback
//! call [`TransferScheduler::tick`] directly instead.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::config::DriverConfig;

use super::host::{EndpointCapabilities, SimulationClock};
use super::scheduler::TransferScheduler;

#[derive(Debug, Clone)]
pub struct FrameDriver {
    frame_interval: Duration,
}

impl FrameDriver {
    pub fn new(frame_interval: Duration) -> Self {
        Self { frame_interval }
    }

    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(Duration::from_millis(config.frame_interval_ms.max(1)))
    }

    /// Tick `scheduler` once per frame until `shutdown` turns `true` or its
    /// sender is dropped. Returns the number of frames run.
    pub async fn run<C, H>(
        &self,
        scheduler: &mut TransferScheduler,
        clock: &C,
        host: &mut H,
        mut shutdown: watch::Receiver<bool>,
    ) -> usize
    where
        C: SimulationClock + ?Sized,
        H: EndpointCapabilities + ?Sized,
    {
        let mut frames = interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            frame_interval_ms = self.frame_interval.as_millis() as u64,
            "Frame driver started"
        );

        let mut count = 0;
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = frames.tick() => {
                    let report = scheduler.tick(clock, host);
                    count += 1;
                    if !report.completed.is_empty() {
                        debug!(
                            frame = count,
                            completed = report.completed.len(),
                            "Frame delivered transfers"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(frames = count, "Frame driver stopped");
        count
    }
}
