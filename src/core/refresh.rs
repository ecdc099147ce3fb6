//! Periodic rate refresh

use crate::core::rates::{RateProvider, RateTable};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, instrument};

pub type FetchOutcome = anyhow::Result<RateTable>;

/// Re-fetches the rate table for one base on a fixed interval.
///
/// Every tick spawns its own fetch and never waits for the previous one, so
/// slow responses can overlap; outcomes reach the receiver in completion
/// order. The loop stops once the receiver is dropped.
pub struct RateRefresher {
    provider: Arc<dyn RateProvider>,
    base: String,
    period: Duration,
}

impl RateRefresher {
    pub fn new(provider: Arc<dyn RateProvider>, base: &str, period: Duration) -> Self {
        RateRefresher {
            provider,
            base: base.to_string(),
            period,
        }
    }

    pub fn spawn(self, outcomes: UnboundedSender<FetchOutcome>) -> JoinHandle<()> {
        tokio::spawn(self.run(outcomes))
    }

    #[instrument(name = "RateRefresh", skip(self, outcomes), fields(base = %self.base))]
    async fn run(self, outcomes: UnboundedSender<FetchOutcome>) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        loop {
            ticker.tick().await;
            if outcomes.is_closed() {
                debug!("Receiver gone, stopping refresh");
                break;
            }

            debug!("Refreshing rates");
            let provider = Arc::clone(&self.provider);
            let base = self.base.clone();
            let outcomes = outcomes.clone();
            tokio::spawn(async move {
                let outcome = provider.fetch_rates(&base).await;
                // The session may have ended while the request was in flight
                let _ = outcomes.send(outcome);
            });
        }
    }
}
