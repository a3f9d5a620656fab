use crate::models::{Event, MarketKey};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

pub const ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";
pub const DEFAULT_REGION: &str = "eu";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Prefix put in front of every error shown to a chat user
pub const WARNING_MARKER: &str = "⚠️";

/// Every way an odds fetch can fail. None of these escape as a panic; callers
/// branch on the variant and usually just show [`FetchError::user_message`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No Odds API key found. Set ODDS_API_KEY in config.json")]
    MissingApiKey,

    #[error("Error fetching odds ({0})")]
    Status(u16),

    #[error("Odds API request timed out.")]
    Timeout,

    #[error("Error fetching odds: {0}")]
    Transport(String),

    #[error("Error reading odds response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn user_message(&self) -> String {
        format!("{} {}", WARNING_MARKER, self)
    }

    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Anything that can hand back the provider's events for a league
#[async_trait]
pub trait OddsSource: Send + Sync {
    async fn fetch_events(
        &self,
        league: &str,
        markets: &[MarketKey],
    ) -> Result<Vec<Event>, FetchError>;
}

/// Request quota as reported by the provider's response headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiUsage {
    pub remaining: Option<String>,
    pub used: Option<String>,
}

pub struct OddsApiClient {
    api_key: Option<String>,
    base_url: String,
    region: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OddsApiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: ODDS_API_BASE_URL.to_string(),
            region: DEFAULT_REGION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check how many API requests you have remaining
    pub async fn check_usage(&self) -> Result<ApiUsage, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;
        let url = format!("{}/sports", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", api_key)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(read_usage(response.headers()))
    }
}

#[async_trait]
impl OddsSource for OddsApiClient {
    /// Fetch upcoming events for a league with decimal odds for the given markets
    async fn fetch_events(
        &self,
        league: &str,
        markets: &[MarketKey],
    ) -> Result<Vec<Event>, FetchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("Odds API key is not configured, skipping fetch for {}", league);
            return Err(FetchError::MissingApiKey);
        };

        let url = format!("{}/sports/{}/odds", self.base_url, league);
        let markets = MarketKey::join(markets);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", api_key),
                ("regions", self.region.as_str()),
                ("markets", markets.as_str()),
                ("oddsFormat", "decimal"),
                ("dateFormat", "iso"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                let err = FetchError::from_reqwest(e);
                error!("Exception querying Odds API for {}: {}", league, err);
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Odds API error {} for {}: {}", status, league, body);
            return Err(FetchError::Status(status.as_u16()));
        }

        let usage = read_usage(response.headers());
        debug!(
            "Odds API quota for {}: remaining={:?} used={:?}",
            league, usage.remaining, usage.used
        );

        let records: Vec<Value> = response.json().await.map_err(|e| {
            let err = FetchError::from_reqwest(e);
            error!("Failed to parse Odds API response for {}: {}", league, err);
            err
        })?;

        info!("Fetched {} events for {} ({})", records.len(), league, markets);
        Ok(records.into_iter().map(Event::from_value).collect())
    }
}

fn read_usage(headers: &reqwest::header::HeaderMap) -> ApiUsage {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    ApiUsage {
        remaining: header("x-requests-remaining"),
        used: header("x-requests-used"),
    }
}
