use crate::api::odds_api::OddsSource;
use crate::api::telegram::Messenger;
use crate::tips::daily_tips;
use crate::utils::formatter::compose_daily_broadcast;
use crate::utils::selection::DEFAULT_TIP_LIMIT;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

pub const BROADCAST_APOLOGY: &str =
    "⚠️ Unable to fetch today's betting tips. Please try /tips command manually.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    Sent { tips: usize },
    /// No tips could be built; the apology went out instead
    Apology,
    /// Another run was still in progress
    Skipped,
    /// Delivery to the recipient failed
    Failed,
}

/// Rotation tips pushed to one fixed chat
pub struct DailyBroadcast {
    odds: Arc<dyn OddsSource>,
    messenger: Arc<dyn Messenger>,
    recipient: i64,
    limit: usize,
    running: AtomicBool,
}

/// Clears the running flag when a run ends, including on early return
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DailyBroadcast {
    pub fn new(odds: Arc<dyn OddsSource>, messenger: Arc<dyn Messenger>, recipient: i64) -> Self {
        Self {
            odds,
            messenger,
            recipient,
            limit: DEFAULT_TIP_LIMIT,
            running: AtomicBool::new(false),
        }
    }

    pub fn recipient(&self) -> i64 {
        self.recipient
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Build and deliver one broadcast. Never overlaps with itself.
    pub async fn run_once(&self) -> BroadcastOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Daily broadcast already running, skipping this trigger");
            return BroadcastOutcome::Skipped;
        }
        let _guard = RunGuard(&self.running);

        info!("📊 Fetching daily tips for scheduled broadcast...");
        let mut rng = StdRng::from_entropy();
        let (text, outcome) = match daily_tips(self.odds.as_ref(), &mut rng, self.limit).await {
            Ok(tips) => (
                compose_daily_broadcast(&tips),
                BroadcastOutcome::Sent { tips: tips.len() },
            ),
            Err(e) => {
                warn!("No valid tips available for daily broadcast: {}", e);
                (BROADCAST_APOLOGY.to_string(), BroadcastOutcome::Apology)
            }
        };

        match self.messenger.send_message(self.recipient, &text).await {
            Ok(()) => {
                info!("Daily broadcast delivered to {}: {:?}", self.recipient, outcome);
                outcome
            }
            Err(e) => {
                error!("Failed to send daily broadcast to {}: {:#}", self.recipient, e);
                BroadcastOutcome::Failed
            }
        }
    }
}

/// Register the broadcast on a six-field cron expression (UTC) and start
/// the scheduler. The returned handle must be kept alive.
pub async fn start_scheduler(broadcast: Arc<DailyBroadcast>, cron: &str) -> Result<JobScheduler> {
    info!("Starting broadcast scheduler with cron: {}", cron);

    let scheduler = JobScheduler::new().await?;
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let broadcast = broadcast.clone();
        Box::pin(async move {
            info!("⏰ Broadcast job triggered");
            let outcome = broadcast.run_once().await;
            info!("Broadcast job finished: {:?}", outcome);
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Broadcast scheduler started");
    Ok(scheduler)
}
