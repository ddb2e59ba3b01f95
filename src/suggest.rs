use std::sync::Arc;

use tokio::task;
use tracing::{debug, warn};

use crate::cache::EventCache;
use crate::error::SuggestError;
use crate::models::{Event, FamilyMember, RefreshResponse, SuggestionsResponse};
use crate::ranker::Ranker;
use crate::sources::Fetcher;
use crate::utils;

const SUCCESS_MESSAGE: &str = "Events retrieved successfully";
const NO_EVENTS_MESSAGE: &str = "No events found for your area at this time";
const REFRESH_MESSAGE: &str = "Cache refreshed successfully";

/// Ties the cache, the fetcher and the ranker together. Built once at process
/// start from its parts; requests hold no state of their own beyond the cache.
pub struct Suggester {
    cache: Arc<EventCache>,
    fetcher: Arc<Fetcher>,
    ranker: Ranker,
}

impl Suggester {
    pub fn new(cache: EventCache, fetcher: Fetcher, ranker: Ranker) -> Self {
        Self {
            cache: Arc::new(cache),
            fetcher: Arc::new(fetcher),
            ranker,
        }
    }

    /// Handle to the cache, e.g. for wiring up [`crate::cache::spawn_sweeper`].
    pub fn cache(&self) -> Arc<EventCache> {
        Arc::clone(&self.cache)
    }

    /// Cache-first suggestion lookup: serve cached events when fresh, fetch
    /// and store on a miss, then rank for the given family. An empty event
    /// set short-circuits with an explanatory message and never hits the
    /// ranker.
    pub async fn get_suggestions(
        &self,
        location_key: &str,
        profile: &[FamilyMember],
    ) -> Result<SuggestionsResponse, SuggestError> {
        validate_location_key(location_key)?;
        if profile.is_empty() {
            return Err(SuggestError::InvalidInput(
                "family profile must have at least one member".to_string(),
            ));
        }

        let events = match self.cache.lookup(location_key)? {
            Some(entry) => {
                debug!("using cached events for location {location_key}");
                entry.events
            }
            None => {
                debug!("cache miss for location {location_key}");
                self.fetch_and_store(location_key).await?
            }
        };

        if events.is_empty() {
            return Ok(SuggestionsResponse {
                message: NO_EVENTS_MESSAGE.to_string(),
                location_key: location_key.to_string(),
                events: Vec::new(),
                total_events: 0,
                personalized_count: 0,
            });
        }

        let total_events = events.len();
        let personalized = self.ranker.rank(&events, profile).await;

        Ok(SuggestionsResponse {
            message: SUCCESS_MESSAGE.to_string(),
            location_key: location_key.to_string(),
            total_events,
            personalized_count: personalized.len(),
            events: personalized,
        })
    }

    /// Drops the cache entry for the location and refetches regardless of how
    /// fresh the old entry was. Ranking is not involved; it happens only on
    /// [`get_suggestions`](Self::get_suggestions).
    pub async fn force_refresh(
        &self,
        location_key: &str,
    ) -> Result<RefreshResponse, SuggestError> {
        validate_location_key(location_key)?;

        self.cache.clear(location_key)?;
        let events = self.fetch_and_store(location_key).await?;

        Ok(RefreshResponse {
            message: REFRESH_MESSAGE.to_string(),
            location_key: location_key.to_string(),
            event_count: events.len(),
        })
    }

    /// Fetch runs on the blocking pool; the result is stored unconditionally,
    /// with a total fetch failure degraded to an empty set ("no events" is a
    /// valid outcome, not a hard error).
    async fn fetch_and_store(&self, location_key: &str) -> Result<Vec<Event>, SuggestError> {
        let fetcher = Arc::clone(&self.fetcher);
        let key = location_key.to_string();
        let fetched = task::spawn_blocking(move || fetcher.fetch(&key)).await?;

        let events = match fetched {
            Ok(events) => events,
            Err(err) => {
                warn!("fetch failed for location {location_key}: {err}");
                Vec::new()
            }
        };

        self.cache.store(location_key, &events)?;
        Ok(events)
    }
}

fn validate_location_key(location_key: &str) -> Result<(), SuggestError> {
    if utils::is_valid_location_key(location_key) {
        Ok(())
    } else {
        Err(SuggestError::InvalidInput(format!(
            "invalid location key: {location_key:?}"
        )))
    }
}
