pub mod sample;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Event;

/// Events further out than this are dropped at fetch time.
pub const FETCH_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("all event providers failed: {0}")]
    AllProvidersFailed(String),
}

/// A single external data source for one location. Implementations do the
/// provider-specific acquisition (network, parsing) and are free to block.
pub trait EventProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn fetch(&self, location_key: &str, window_end: DateTime<Utc>)
        -> anyhow::Result<Vec<Event>>;
}

/// Merges candidate events from every configured provider. Individual provider
/// failures are logged and absorbed; only a total failure surfaces, and the
/// orchestrator degrades that to an empty result.
pub struct Fetcher {
    providers: Vec<Box<dyn EventProvider>>,
}

impl Fetcher {
    pub fn new(providers: Vec<Box<dyn EventProvider>>) -> Self {
        Self { providers }
    }

    /// Default provider set shipped with the crate.
    pub fn with_sample_data() -> Self {
        Self::new(vec![Box::new(sample::SampleProvider)])
    }

    pub fn fetch(&self, location_key: &str) -> Result<Vec<Event>, FetchError> {
        let window_end = Utc::now() + Duration::days(FETCH_WINDOW_DAYS);
        let mut events = Vec::new();
        let mut failures = Vec::new();

        for provider in &self.providers {
            match provider.fetch(location_key, window_end) {
                Ok(mut found) => {
                    debug!(
                        "provider {} returned {} events for location {location_key}",
                        provider.name(),
                        found.len()
                    );
                    events.append(&mut found);
                }
                Err(err) => {
                    warn!("provider {} failed for location {location_key}: {err}", provider.name());
                    failures.push(format!("{}: {err}", provider.name()));
                }
            }
        }

        if events.is_empty() && !failures.is_empty() && failures.len() == self.providers.len() {
            return Err(FetchError::AllProvidersFailed(failures.join("; ")));
        }

        // providers are trusted to filter, but the window is enforced here too
        events.retain(|event| event.date <= window_end);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FixedProvider(Vec<Event>);

    impl EventProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn fetch(&self, _key: &str, _end: DateTime<Utc>) -> anyhow::Result<Vec<Event>> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    impl EventProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn fetch(&self, _key: &str, _end: DateTime<Utc>) -> anyhow::Result<Vec<Event>> {
            Err(anyhow!("connection refused"))
        }
    }

    fn event_in(days: i64) -> Event {
        Event::new(format!("event+{days}d"), Utc::now() + Duration::days(days))
    }

    #[test]
    fn merges_results_across_providers() {
        let fetcher = Fetcher::new(vec![
            Box::new(FixedProvider(vec![event_in(1), event_in(2)])),
            Box::new(FixedProvider(vec![event_in(3)])),
        ]);
        assert_eq!(fetcher.fetch("90210").unwrap().len(), 3);
    }

    #[test]
    fn one_failing_provider_still_yields_partial_results() {
        let fetcher = Fetcher::new(vec![
            Box::new(FailingProvider),
            Box::new(FixedProvider(vec![event_in(1)])),
        ]);
        assert_eq!(fetcher.fetch("90210").unwrap().len(), 1);
    }

    #[test]
    fn all_providers_failing_is_an_error() {
        let fetcher = Fetcher::new(vec![Box::new(FailingProvider), Box::new(FailingProvider)]);
        assert!(matches!(
            fetcher.fetch("90210"),
            Err(FetchError::AllProvidersFailed(_))
        ));
    }

    #[test]
    fn no_providers_yields_empty_not_error() {
        let fetcher = Fetcher::new(Vec::new());
        assert!(fetcher.fetch("90210").unwrap().is_empty());
    }

    #[test]
    fn events_past_the_window_are_dropped() {
        let fetcher = Fetcher::new(vec![Box::new(FixedProvider(vec![
            event_in(5),
            event_in(FETCH_WINDOW_DAYS + 5),
        ]))]);
        let events = fetcher.fetch("90210").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "event+5d");
    }
}
