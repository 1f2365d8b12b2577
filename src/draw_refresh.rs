use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::api::health::HealthState;
use crate::api::latency::UpstreamLatency;
use crate::config::Config;
use crate::fetcher::{fetch_draws, today_utc};
use crate::state::DrawCache;
use crate::types::{DrawResult, DrawSource};

/// Today's draws, served from the cache while fresh and fetched otherwise.
pub struct DrawFeed {
    cfg: Config,
    http: reqwest::Client,
    cache: Arc<DrawCache>,
    health: Arc<HealthState>,
    latency: Arc<UpstreamLatency>,
}

impl DrawFeed {
    pub fn new(
        cfg: Config,
        http: reqwest::Client,
        cache: Arc<DrawCache>,
        health: Arc<HealthState>,
        latency: Arc<UpstreamLatency>,
    ) -> Self {
        Self { cfg, http, cache, health, latency }
    }

    pub fn cache(&self) -> &Arc<DrawCache> {
        &self.cache
    }

    pub async fn today(&self) -> (Arc<Vec<DrawResult>>, DrawSource) {
        let date = today_utc();
        let ttl = Duration::from_secs(self.cfg.draw_cache_ttl_secs);
        if let Some(hit) = self.cache.get_fresh(&date, ttl) {
            debug!(date = %date, draws = hit.0.len(), "[FEED] cache hit");
            return hit;
        }
        self.refresh(&date).await
    }

    /// Fetch `date` from upstream. A failed fetch keeps serving whatever is
    /// cached for that date, however old.
    pub async fn refresh(&self, date: &str) -> (Arc<Vec<DrawResult>>, DrawSource) {
        let started = Instant::now();
        let (draws, source) = fetch_draws(&self.http, &self.cfg, date).await;
        self.latency.lottery.record(started.elapsed());
        self.health.record_fetch(!draws.is_empty(), now_ns());

        if self.cache.insert(date, draws, source) {
            if let Some(hit) = self.cache.get_any(date) {
                return hit;
            }
        }
        match self.cache.get_any(date) {
            Some(stale) => {
                warn!(date, draws = stale.0.len(), "[FEED] fetch failed, serving stale draws");
                stale
            }
            None => (Arc::new(Vec::new()), DrawSource::None),
        }
    }
}

/// Keeps today's draws warm so requests rarely wait on the lottery API.
pub struct DrawRefresher {
    feed: Arc<DrawFeed>,
    interval_secs: u64,
}

impl DrawRefresher {
    pub fn new(feed: Arc<DrawFeed>, interval_secs: u64) -> Self {
        Self { feed, interval_secs }
    }

    pub async fn run(self) {
        if self.interval_secs == 0 {
            info!("[REFRESH] disabled (DRAW_REFRESH_INTERVAL_SECS=0)");
            return;
        }
        let mut ticker = interval(Duration::from_secs(self.interval_secs));
        ticker.tick().await; // skip immediate first tick, bootstrap already ran

        loop {
            ticker.tick().await;
            let date = today_utc();
            let (draws, source) = self.feed.refresh(&date).await;
            info!(
                date = %date,
                draws = draws.len(),
                source = %source,
                "[REFRESH] {} draws cached for {date}",
                draws.len(),
            );
        }
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
