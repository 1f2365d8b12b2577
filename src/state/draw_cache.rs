use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::types::{DrawResult, DrawSource};

#[derive(Debug, Clone)]
struct CachedDraws {
    fetched_at: Instant,
    draws: Arc<Vec<DrawResult>>,
    source: DrawSource,
}

/// Draw lists keyed by date (YYYY-MM-DD). Only the most recently stored
/// date is retained, so the map never grows past one day.
pub struct DrawCache {
    entries: DashMap<String, CachedDraws>,
}

impl DrawCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Draws for `date` stored less than `ttl` ago.
    pub fn get_fresh(&self, date: &str, ttl: Duration) -> Option<(Arc<Vec<DrawResult>>, DrawSource)> {
        let entry = self.entries.get(date)?;
        if entry.fetched_at.elapsed() >= ttl {
            return None;
        }
        Some((Arc::clone(&entry.draws), entry.source))
    }

    /// Draws for `date` regardless of age.
    pub fn get_any(&self, date: &str) -> Option<(Arc<Vec<DrawResult>>, DrawSource)> {
        let entry = self.entries.get(date)?;
        Some((Arc::clone(&entry.draws), entry.source))
    }

    /// Store a fetch result. Empty lists are ignored so a failed fetch never
    /// hides good data; storing a new date evicts older ones.
    pub fn insert(&self, date: &str, draws: Vec<DrawResult>, source: DrawSource) -> bool {
        if draws.is_empty() {
            return false;
        }
        self.entries.retain(|k, _| k == date);
        self.entries.insert(
            date.to_string(),
            CachedDraws { fetched_at: Instant::now(), draws: Arc::new(draws), source },
        );
        true
    }

    /// Number of draws cached for `date`.
    pub fn draw_count(&self, date: &str) -> usize {
        self.entries.get(date).map(|e| e.draws.len()).unwrap_or(0)
    }

    /// Seconds since `date` was stored.
    pub fn age_secs(&self, date: &str) -> Option<u64> {
        self.entries.get(date).map(|e| e.fetched_at.elapsed().as_secs())
    }
}

impl Default for DrawCache {
    fn default() -> Self {
        Self { entries: DashMap::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(no: &str) -> DrawResult {
        DrawResult {
            draw_number: no.to_string(),
            draw_date: "2025-01-01".to_string(),
            draw_time: None,
            numbers: (1..=20).collect(),
        }
    }

    #[test]
    fn fresh_entries_are_served() {
        let cache = DrawCache::new();
        assert!(cache.insert("2025-01-01", vec![draw("002"), draw("001")], DrawSource::OfficialApi));
        let (draws, source) = cache.get_fresh("2025-01-01", Duration::from_secs(60)).unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(source, DrawSource::OfficialApi);
        assert_eq!(cache.draw_count("2025-01-01"), 2);
    }

    #[test]
    fn expired_entries_are_not_fresh() {
        let cache = DrawCache::new();
        cache.insert("2025-01-01", vec![draw("001")], DrawSource::OfficialApi);
        assert!(cache.get_fresh("2025-01-01", Duration::ZERO).is_none());
        assert!(cache.get_any("2025-01-01").is_some());
    }

    #[test]
    fn empty_results_are_not_cached() {
        let cache = DrawCache::new();
        cache.insert("2025-01-01", vec![draw("001")], DrawSource::OfficialApi);
        assert!(!cache.insert("2025-01-01", Vec::new(), DrawSource::None));
        assert_eq!(cache.draw_count("2025-01-01"), 1);
    }

    #[test]
    fn new_day_evicts_old_day() {
        let cache = DrawCache::new();
        cache.insert("2025-01-01", vec![draw("001")], DrawSource::OfficialApi);
        cache.insert("2025-01-02", vec![draw("001")], DrawSource::OfficialApi);
        assert!(cache.get_any("2025-01-01").is_none());
        assert_eq!(cache.draw_count("2025-01-02"), 1);
    }
}
