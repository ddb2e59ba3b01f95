use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Event, FamilyMember};

/// Hard cap on how many events a ranking pass may return.
pub const MAX_SUGGESTIONS: usize = 10;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
enum RankError {
    #[error("reasoning service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Base URL of the reasoning service. `None` disables ranking entirely.
    pub endpoint: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RankerConfig {
    /// Reads `LLM_ENDPOINT`, `LLM_MODEL`, `LLM_API_KEY`, `LLM_TEMPERATURE`,
    /// `LLM_MAX_TOKENS` and `LLM_TIMEOUT_SECS`. Without an endpoint or an API
    /// key the ranker stays disabled and every request takes the fallback.
    pub fn from_env() -> Self {
        let api_key = std::env::var("LLM_API_KEY").ok();
        let endpoint = std::env::var("LLM_ENDPOINT")
            .ok()
            .or_else(|| api_key.is_some().then(|| DEFAULT_ENDPOINT.to_string()));
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let temperature = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse::<f32>().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);
        let max_tokens = std::env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);
        let timeout = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Self {
            endpoint,
            model,
            api_key,
            temperature,
            max_tokens,
            timeout,
        }
    }
}

/// Filters and ranks candidate events for a family via an external reasoning
/// service. Never fails: any trouble with the service or its output turns into
/// one of two deterministic fallbacks.
pub struct Ranker {
    config: RankerConfig,
    client: Client,
}

impl Ranker {
    pub fn new(config: RankerConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("http client");
        Self { config, client }
    }

    pub fn from_env() -> Self {
        Self::new(RankerConfig::from_env())
    }

    /// A ranker with no reasoning service; always date-sorts.
    pub fn disabled() -> Self {
        Self::new(RankerConfig::default())
    }

    pub fn is_configured(&self) -> bool {
        self.config.endpoint.is_some()
    }

    /// Returns at most [`MAX_SUGGESTIONS`] events. Fallback ladder:
    /// service unconfigured or unreachable -> input sorted by date, truncated;
    /// service answered but with unusable output -> first ids in input order,
    /// still annotated with rationales.
    pub async fn rank(&self, events: &[Event], profile: &[FamilyMember]) -> Vec<Event> {
        let Some(endpoint) = self.config.endpoint.clone() else {
            debug!("reasoning service not configured; sorting events by date");
            return date_ordered(events);
        };

        match self.request_ranking(&endpoint, events, profile).await {
            Ok(content) => {
                let ranked = select_events(events, &content, profile);
                debug!("ranked {} events down to {}", events.len(), ranked.len());
                ranked
            }
            Err(err) => {
                warn!("ranking degraded: {err}");
                date_ordered(events)
            }
        }
    }

    async fn request_ranking(
        &self,
        endpoint: &str,
        events: &[Event],
        profile: &[FamilyMember],
    ) -> Result<String, RankError> {
        let base = endpoint.trim_end_matches('/');
        let url = format!("{base}/chat/completions");

        let events_json = serde_json::to_string_pretty(&events_payload(events))
            .map_err(|err| RankError::Unavailable(err.to_string()))?;
        let payload = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a helpful assistant that filters and ranks family events based on family demographics. Return only valid JSON.",
                },
                {
                    "role": "user",
                    "content": build_user_prompt(&profile_summary(profile), &events_json),
                }
            ],
        });

        let mut request = self.client.post(url).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| RankError::Unavailable(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| RankError::Unavailable(err.to_string()))?;

        if !status.is_success() {
            return Err(RankError::Unavailable(format!("HTTP {status}: {body}")));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|err| RankError::Unavailable(err.to_string()))?;

        value
            .get("choices")
            .and_then(|choices| choices.as_array())
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RankError::Unavailable("response missing content".to_string()))
    }
}

fn profile_summary(profile: &[FamilyMember]) -> String {
    profile
        .iter()
        .map(|member| format!("{} years old ({})", member.age, member.gender))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Candidate summaries keyed by position in the input sequence. The ids are
/// request-scoped; the response is mapped back against the same slice.
fn events_payload(events: &[Event]) -> Value {
    Value::Array(
        events
            .iter()
            .enumerate()
            .map(|(id, event)| {
                json!({
                    "id": id,
                    "title": event.title,
                    "date": event.date.to_rfc3339(),
                    "description": event.description,
                    "ageHints": event.age_hints,
                    "genderHints": event.gender_hints,
                })
            })
            .collect(),
    )
}

fn build_user_prompt(family_desc: &str, events_json: &str) -> String {
    format!(
        "You are helping a family find suitable local events.\n\n\
         Family Profile: {family_desc}\n\n\
         Available Events:\n{events_json}\n\n\
         Please analyze these events and:\n\
         1. Filter events that are appropriate for this family based on ages and interests\n\
         2. Rank the top {MAX_SUGGESTIONS} events by relevance and suitability\n\
         3. Prioritize events that are inclusive and suitable for multiple family members\n\
         4. Consider age appropriateness and family-friendly nature\n\n\
         Return your response as a JSON object with this structure:\n\
         {{\n  \"rankedEventIds\": [array of event IDs in order of preference, max {MAX_SUGGESTIONS}]\n}}\n\n\
         Only return the JSON object, no additional text."
    )
}

/// `None` when the content is not a JSON object carrying a ranked-id list.
/// Non-numeric entries are discarded rather than failing the whole response.
fn parse_ranked_ids(content: &str) -> Option<Vec<usize>> {
    let value: Value = serde_json::from_str(content).ok()?;
    let ids = value
        .get("rankedEventIds")
        .or_else(|| value.get("events"))?
        .as_array()?;
    Some(
        ids.iter()
            .filter_map(|id| id.as_u64().map(|id| id as usize))
            .collect(),
    )
}

/// Turns the service's raw reply into the final selection. Unusable replies
/// keep the first `min(10, N)` events in input order rather than dropping
/// everything.
fn select_events(events: &[Event], content: &str, profile: &[FamilyMember]) -> Vec<Event> {
    let ids = parse_ranked_ids(content).unwrap_or_else(|| {
        warn!("unusable ranking response; preserving input order");
        (0..events.len().min(MAX_SUGGESTIONS)).collect()
    });
    apply_ranking(events, &ids, profile)
}

fn apply_ranking(events: &[Event], ids: &[usize], profile: &[FamilyMember]) -> Vec<Event> {
    ids.iter()
        .take(MAX_SUGGESTIONS)
        .filter_map(|&id| events.get(id))
        .map(|event| {
            let mut chosen = event.clone();
            chosen.rationale = Some(rationale_for(event, profile));
            chosen
        })
        .collect()
}

fn date_ordered(events: &[Event]) -> Vec<Event> {
    let mut ordered = events.to_vec();
    ordered.sort_by_key(|event| event.date);
    ordered.truncate(MAX_SUGGESTIONS);
    ordered
}

/// Rationale text derived from the event's suitability hints and the family's
/// age range. Deterministic; no service call involved.
fn rationale_for(event: &Event, profile: &[FamilyMember]) -> String {
    let min_age = profile.iter().map(|m| m.age).min().unwrap_or(0);
    let max_age = profile.iter().map(|m| m.age).max().unwrap_or(0);

    let mut rationale = String::from("This event is suitable for your family.");

    match event.age_hints.as_deref() {
        Some(hints) if hints.to_lowercase().contains("all ages") => {
            rationale.push_str(&format!(
                " It welcomes all ages, perfect for families with members aged {min_age} to {max_age}."
            ));
        }
        Some(hints) => {
            rationale.push_str(&format!(" Age recommendation: {hints}."));
        }
        None => {}
    }

    if let Some(hints) = event.gender_hints.as_deref() {
        if hints.to_lowercase().contains("all") {
            rationale.push_str(" This event is inclusive and welcoming to all.");
        }
    }

    rationale
}
