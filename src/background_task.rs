use tokio::time::{interval, Duration};

use crate::limiter::UsageQuotaStore;

const QUOTA_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Drops quota counters from previous days so the map doesn't grow with
/// every member who ever used an AI feature.
pub async fn start_quota_sweep(quotas: UsageQuotaStore) {
    let mut interval = interval(QUOTA_SWEEP_INTERVAL);

    loop {
        interval.tick().await;

        let evicted = quotas.evict_stale();
        if evicted > 0 {
            tracing::info!("Evicted {} stale quota counters", evicted);
        }
    }
}
