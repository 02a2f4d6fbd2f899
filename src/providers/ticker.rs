//! Tick poller
//!
//! Refreshes tick info on a fixed cadence and publishes it on a watch
//! channel. A tick of zero means "not known yet"; consumers either defer with
//! `wait_for_tick()` or treat it as `TICK_NOT_READY`.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::types::TickInfo;
use crate::providers::rpc::EndpointClient;
use crate::providers::transport::Transport;

/// Read side handed to consumers
#[derive(Clone)]
pub struct TickWatch {
    rx: watch::Receiver<TickInfo>,
}

impl TickWatch {
    /// Latest published tick info (tick == 0 until the first success)
    pub fn current(&self) -> TickInfo {
        *self.rx.borrow()
    }

    /// Resolve once a non-zero tick has been published.
    /// Returns `None` if the poller is gone before that happens.
    pub async fn wait_for_tick(&mut self) -> Option<TickInfo> {
        self.rx.wait_for(|info| info.tick > 0).await.ok().map(|info| *info)
    }
}

/// Write side, owned by the polling task
pub struct TickPoller;

impl TickPoller {
    /// Watch pair without a background task (tests, manual feeding)
    pub fn channel() -> (watch::Sender<TickInfo>, TickWatch) {
        let (tx, rx) = watch::channel(TickInfo::default());
        (tx, TickWatch { rx })
    }

    pub fn spawn<T: Transport>(client: Arc<EndpointClient<T>>, every: Duration) -> (TickWatch, JoinHandle<()>) {
        let (tx, watch) = Self::channel();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                match client.tick_info().await {
                    Ok(info) if info.tick > 0 => {
                        let changed = tx.borrow().tick != info.tick;
                        if changed {
                            info!("🕒 tick {} (epoch {})", info.tick, info.epoch);
                        }
                        if tx.send(info).is_err() {
                            // every TickWatch dropped
                            break;
                        }
                    }
                    Ok(_) => warn!("⚠️ Tick info reported tick 0, keeping last known tick"),
                    Err(e) => warn!("⚠️ Tick poll failed, keeping last known tick: {}", e),
                }
            }
        });

        (watch, handle)
    }
}
