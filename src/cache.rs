use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Event;
use crate::utils;

/// Fixed time-to-live for a cached fetch result.
pub const CACHE_TTL_HOURS: i64 = 24;

fn ttl() -> Duration {
    Duration::hours(CACHE_TTL_HOURS)
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("cache payload error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("cache lock poisoned")]
    Poisoned,
}

/// The most recent fetch result for one location key.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub location_key: String,
    pub events: Vec<Event>,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Sqlite-backed per-location event cache. One live row per location key,
/// replaced wholesale on every store. `expires_at` is the sole authority for
/// validity; the sweep only reclaims storage.
pub struct EventCache {
    conn: Mutex<Connection>,
}

impl EventCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_default() -> Result<Self, CacheError> {
        Self::open(utils::database_path())
    }

    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS event_cache(
                location_key TEXT PRIMARY KEY,
                events TEXT NOT NULL,
                fetched_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Returns the entry for `location_key` if it exists and has not expired.
    /// A stale row is reported as a miss but left in place; eviction belongs
    /// to [`clear`](Self::clear) and [`sweep_expired`](Self::sweep_expired).
    pub fn lookup(&self, location_key: &str) -> Result<Option<CacheEntry>, CacheError> {
        self.lookup_at(location_key, Utc::now())
    }

    fn lookup_at(
        &self,
        location_key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let row: Option<(String, DateTime<Utc>, DateTime<Utc>)> = self
            .lock()?
            .query_row(
                "SELECT events, fetched_at, expires_at FROM event_cache WHERE location_key = ?1",
                params![location_key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((payload, fetched_at, expires_at)) = row else {
            debug!("no cache entry for location {location_key}");
            return Ok(None);
        };

        if now >= expires_at {
            debug!("cache expired for location {location_key}");
            return Ok(None);
        }

        let events: Vec<Event> = serde_json::from_str(&payload)?;
        debug!("cache hit for location {location_key} ({} events)", events.len());
        Ok(Some(CacheEntry {
            location_key: location_key.to_string(),
            events,
            fetched_at,
            expires_at,
        }))
    }

    /// Upserts the full event list for `location_key`, resetting the TTL.
    /// Last writer wins on concurrent stores for the same key.
    pub fn store(&self, location_key: &str, events: &[Event]) -> Result<CacheEntry, CacheError> {
        self.store_at(location_key, events, Utc::now())
    }

    fn store_at(
        &self,
        location_key: &str,
        events: &[Event],
        now: DateTime<Utc>,
    ) -> Result<CacheEntry, CacheError> {
        let payload = serde_json::to_string(events)?;
        let expires_at = now + ttl();
        self.lock()?.execute(
            "INSERT INTO event_cache (location_key, events, fetched_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(location_key) DO UPDATE SET
               events = excluded.events,
               fetched_at = excluded.fetched_at,
               expires_at = excluded.expires_at",
            params![location_key, payload, now, expires_at],
        )?;
        debug!("cache updated for location {location_key} with {} events", events.len());
        Ok(CacheEntry {
            location_key: location_key.to_string(),
            events: events.to_vec(),
            fetched_at: now,
            expires_at,
        })
    }

    /// Removes the entry for `location_key`; a no-op if none exists.
    pub fn clear(&self, location_key: &str) -> Result<(), CacheError> {
        let removed = self.lock()?.execute(
            "DELETE FROM event_cache WHERE location_key = ?1",
            params![location_key],
        )?;
        if removed > 0 {
            debug!("cache cleared for location {location_key}");
        }
        Ok(())
    }

    /// Deletes every row past its expiry and returns how many were removed.
    /// Pure storage reclamation; lookup correctness never depends on it.
    pub fn sweep_expired(&self) -> Result<usize, CacheError> {
        self.sweep_expired_at(Utc::now())
    }

    fn sweep_expired_at(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let removed = self.lock()?.execute(
            "DELETE FROM event_cache WHERE expires_at <= ?1",
            params![now],
        )?;
        Ok(removed)
    }
}

/// Periodic housekeeping task removing expired rows.
pub fn spawn_sweeper(
    cache: Arc<EventCache>,
    period: StdDuration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match cache.sweep_expired() {
                Ok(0) => {}
                Ok(count) => debug!("swept {count} expired cache entries"),
                Err(err) => warn!("cache sweep failed: {err}"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cache() -> EventCache {
        EventCache::open_in_memory().expect("in-memory cache")
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    fn event(title: &str) -> Event {
        Event::new(title, t0() + Duration::days(3))
    }

    #[test]
    fn lookup_honors_ttl_boundary() {
        let cache = cache();
        cache.store_at("90210", &[event("A")], t0()).unwrap();

        let just_before = t0() + Duration::hours(23) + Duration::minutes(59);
        assert!(cache.lookup_at("90210", just_before).unwrap().is_some());

        let just_after = t0() + Duration::hours(24) + Duration::minutes(1);
        assert!(cache.lookup_at("90210", just_after).unwrap().is_none());
    }

    #[test]
    fn lookup_missing_key_is_a_miss() {
        assert!(cache().lookup("90210").unwrap().is_none());
    }

    #[test]
    fn store_replaces_rather_than_appends() {
        let cache = cache();
        cache
            .store_at("90210", &[event("A"), event("B")], t0())
            .unwrap();
        cache.store_at("90210", &[event("C")], t0()).unwrap();

        let entry = cache.lookup_at("90210", t0()).unwrap().unwrap();
        assert_eq!(entry.events.len(), 1);
        assert_eq!(entry.events[0].title, "C");
    }

    #[test]
    fn store_resets_expiry_from_now() {
        let cache = cache();
        let entry = cache.store_at("90210", &[event("A")], t0()).unwrap();
        assert_eq!(entry.fetched_at, t0());
        assert_eq!(entry.expires_at, t0() + Duration::hours(24));

        // values survive the sqlite round trip unchanged
        let read = cache.lookup_at("90210", t0()).unwrap().unwrap();
        assert_eq!(read.fetched_at, entry.fetched_at);
        assert_eq!(read.expires_at, entry.expires_at);
    }

    #[test]
    fn keys_do_not_interfere() {
        let cache = cache();
        cache.store_at("90210", &[event("A")], t0()).unwrap();
        cache.store_at("10001", &[event("B"), event("C")], t0()).unwrap();

        assert_eq!(cache.lookup_at("90210", t0()).unwrap().unwrap().events.len(), 1);
        assert_eq!(cache.lookup_at("10001", t0()).unwrap().unwrap().events.len(), 2);
    }

    #[test]
    fn clear_is_idempotent() {
        let cache = cache();
        cache.clear("90210").unwrap();

        cache.store_at("90210", &[event("A")], t0()).unwrap();
        cache.clear("90210").unwrap();
        cache.clear("90210").unwrap();
        assert!(cache.lookup_at("90210", t0()).unwrap().is_none());
    }

    #[test]
    fn stale_rows_survive_lookup_until_swept() {
        let cache = cache();
        cache.store_at("90210", &[event("A")], t0()).unwrap();

        let later = t0() + Duration::hours(25);
        assert!(cache.lookup_at("90210", later).unwrap().is_none());

        // the row was not evicted by the miss; the sweep still finds it
        assert_eq!(cache.sweep_expired_at(later).unwrap(), 1);
        assert_eq!(cache.sweep_expired_at(later).unwrap(), 0);
    }

    #[tokio::test]
    async fn sweeper_reclaims_expired_rows() {
        let cache = Arc::new(cache());
        cache
            .store_at("90210", &[event("A")], Utc::now() - Duration::hours(30))
            .unwrap();

        let handle = spawn_sweeper(Arc::clone(&cache), StdDuration::from_millis(10));
        tokio::time::sleep(StdDuration::from_millis(100)).await;
        handle.abort();

        assert_eq!(cache.sweep_expired().unwrap(), 0);
    }

    #[test]
    fn sweep_leaves_live_rows() {
        let cache = cache();
        cache.store_at("90210", &[event("A")], t0()).unwrap();
        cache
            .store_at("10001", &[event("B")], t0() - Duration::hours(30))
            .unwrap();

        assert_eq!(cache.sweep_expired_at(t0() + Duration::hours(1)).unwrap(), 1);
        assert!(cache
            .lookup_at("90210", t0() + Duration::hours(1))
            .unwrap()
            .is_some());
    }
}
