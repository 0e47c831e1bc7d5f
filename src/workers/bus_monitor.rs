use anyhow::Result;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use crate::application::events::{BusStats, TopicEventBus};

/// Run bus monitor worker
/// Logs a stats snapshot every `period`, and the drops since the last tick at warn
pub async fn run_bus_monitor(bus: TopicEventBus, period: Duration) -> Result<()> {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Bus monitor started (every {}s)", period.as_secs());

    let mut last_dropped = bus.stats().dropped;
    loop {
        ticker.tick().await;
        let stats = bus.stats();
        let delta = report(&stats, last_dropped);
        last_dropped = stats.dropped;

        if delta > 0 {
            warn!(
                dropped = delta,
                "{} events dropped on full mailboxes since last check", delta
            );
        }
    }
}

/// Log one snapshot and return the drop delta against `last_dropped`.
fn report(stats: &BusStats, last_dropped: u64) -> u64 {
    info!(
        topics = stats.topics,
        subscribers = stats.subscribers,
        published = stats.published,
        delivered = stats.delivered,
        dropped = stats.dropped,
        last_sequence = stats.last_sequence,
        "Event bus stats"
    );
    stats.dropped.saturating_sub(last_dropped)
}
