//! Family event suggestions: a per-location cache with a 24 hour TTL, a
//! pluggable source fetcher, and an LLM-backed relevance ranker that degrades
//! to deterministic ordering whenever the service misbehaves. The surrounding
//! web layer (auth, profiles, routing) lives elsewhere and talks to
//! [`Suggester`].

pub mod cache;
pub mod error;
pub mod models;
pub mod ranker;
pub mod sources;
pub mod suggest;
mod utils;

pub use cache::{spawn_sweeper, CacheEntry, CacheError, EventCache, CACHE_TTL_HOURS};
pub use error::{Result, SuggestError};
pub use models::{
    age_from_dob, Event, FamilyMember, Gender, RefreshResponse, SuggestionsResponse,
};
pub use ranker::{Ranker, RankerConfig, MAX_SUGGESTIONS};
pub use sources::{EventProvider, FetchError, Fetcher, FETCH_WINDOW_DAYS};
pub use suggest::Suggester;
