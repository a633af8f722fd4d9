use std::{num::NonZeroU32, path::PathBuf, time::Duration};

use anyhow::Context;
use nonzero_ext::nonzero;
use reqwest::Url;
use serde::{Deserialize, de::DeserializeOwned};

use crate::UrlInvalidError;

const DEFAULT_LEGISLATURE_URL: &str = "https://legislature.maine.gov";
// House of Representatives, listed alphabetically by municipality.
const DEFAULT_LISTING_PATH: &str = "/house/house/MemberProfiles/ListAlphaTown";
const DEFAULT_PAGINATION_QUERY: &str = "selectedLetter";
const DEFAULT_OUTPUT_PATH: &str = "district_data.csv";

const DEFAULT_REQUESTS_PER_PERIOD: NonZeroU32 = nonzero!(5u32);
const DEFAULT_RATE_LIMIT_PERIOD_SECS: u64 = 3;
const DEFAULT_MIN_REQUEST_GAP_MS: u64 = 500;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!("legislator_scraper/", env!("CARGO_PKG_VERSION"));

/// The env vars describing which site to scrape and where to write the roster.
#[derive(Debug, Deserialize)]
pub struct ScrapingEnv {
    #[serde(default = "default_legislature_url")]
    legislature_url: String,
    #[serde(default = "default_listing_path")]
    listing_path: String,
    #[serde(default = "default_pagination_query")]
    pagination_query: String,
    #[serde(default = "default_output_path")]
    output_path: PathBuf,
}

fn default_legislature_url() -> String {
    DEFAULT_LEGISLATURE_URL.to_string()
}

fn default_listing_path() -> String {
    DEFAULT_LISTING_PATH.to_string()
}

fn default_pagination_query() -> String {
    DEFAULT_PAGINATION_QUERY.to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

#[derive(Debug, Clone)]
pub struct ScrapingConfig {
    legislature_url: Url,
    listing_path: String,
    pagination_query: String,
    pub output_path: PathBuf,
}

impl ScrapingConfig {
    pub fn new() -> anyhow::Result<Self> {
        let scraping_env = ScrapingEnv::load_from_env()?;
        let mut config = Self::for_site(&scraping_env.legislature_url, &scraping_env.listing_path)?;
        config.pagination_query = scraping_env.pagination_query;
        config.output_path = scraping_env.output_path;
        Ok(config)
    }

    /// Builds a config for an arbitrary host and listing path, leaving the
    /// rest at their defaults.
    pub fn for_site(legislature_url: &str, listing_path: &str) -> Result<Self, UrlInvalidError> {
        let legislature_url = Url::parse(legislature_url).map_err(|_| UrlInvalidError {
            url: legislature_url.to_string(),
        })?;
        if legislature_url.cannot_be_a_base() {
            return Err(UrlInvalidError {
                url: legislature_url.to_string(),
            });
        }
        Ok(Self {
            legislature_url,
            listing_path: listing_path.to_string(),
            pagination_query: default_pagination_query(),
            output_path: default_output_path(),
        })
    }

    pub fn pagination_url(&self) -> Result<Url, UrlInvalidError> {
        self.join(&self.listing_path)
    }

    pub fn listing_url(&self, pagination_key: &str) -> Result<Url, UrlInvalidError> {
        let mut url = self.pagination_url()?;
        url.query_pairs_mut()
            .clear()
            .append_pair(&self.pagination_query, pagination_key);
        Ok(url)
    }

    pub fn detail_url(&self, detail_path: &str) -> Result<Url, UrlInvalidError> {
        self.join(detail_path)
    }

    fn join(&self, path: &str) -> Result<Url, UrlInvalidError> {
        self.legislature_url.join(path).map_err(|_| UrlInvalidError {
            url: format!("{}{}", self.legislature_url, path),
        })
    }
}

/// The env vars tuning how politely we talk to the legislature's server.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_requests_per_period")]
    pub requests_per_period: NonZeroU32,
    #[serde(default = "default_rate_limit_period_secs")]
    rate_limit_period_secs: u64,
    #[serde(default = "default_min_request_gap_ms")]
    min_request_gap_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    backoff_base_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_requests_per_period() -> NonZeroU32 {
    DEFAULT_REQUESTS_PER_PERIOD
}

fn default_rate_limit_period_secs() -> u64 {
    DEFAULT_RATE_LIMIT_PERIOD_SECS
}

fn default_min_request_gap_ms() -> u64 {
    DEFAULT_MIN_REQUEST_GAP_MS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_backoff_base_ms() -> u64 {
    DEFAULT_BACKOFF_BASE_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            requests_per_period: default_requests_per_period(),
            rate_limit_period_secs: default_rate_limit_period_secs(),
            min_request_gap_ms: default_min_request_gap_ms(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl RequestConfig {
    pub fn new() -> anyhow::Result<Self> {
        Self::load_from_env()
    }

    pub fn rate_limit_period(&self) -> Duration {
        Duration::from_secs(self.rate_limit_period_secs)
    }

    pub fn min_request_gap(&self) -> Duration {
        Duration::from_millis(self.min_request_gap_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        // A zero timeout would fail every request before it is sent.
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
