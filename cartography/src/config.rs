use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Ensure a base URL ends with a slash so endpoint paths join onto it.
fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

pub const DEFAULT_HUB_BASE_URL: &str = "https://hub-api.neynar.com/v1/";
pub const DEFAULT_API_BASE_URL: &str = "https://api.neynar.com/v2/farcaster/";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub hub: HubConfig,
    pub store: StoreConfig,
    pub graph: GraphConfig,
    pub visual: VisualConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Remote hub API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    pub api_key: Option<String>,
    /// Base URL for paginated "messages by subject" endpoints.
    pub base_url: String,
    /// Base URL for the bulk user lookup endpoint.
    pub api_base_url: String,
    pub page_size: u32,
    /// Retries after the first failed attempt of a page.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    /// Fixed pause before every request.
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub bulk_batch_size: usize,
    pub fetch_followers: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_HUB_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: 1000,
            max_retries: 3,
            initial_backoff_ms: 1000,
            request_delay_ms: 100,
            timeout_secs: 30,
            bulk_batch_size: 100,
            fetch_followers: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub data_dir: String,
    /// Cached user records older than this are refetched.
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub top_n: usize,
}

/// Tunables for snapshot rendering. None of these affect graph contents.
#[derive(Debug, Clone, Deserialize)]
pub struct VisualConfig {
    pub min_edge_width: f64,
    pub max_edge_width: f64,
    pub node_base_size: f64,
    pub recency_cap: usize,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            min_edge_width: 1.5,
            max_edge_width: 15.0,
            node_base_size: 45.0,
            recency_cap: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let hub_defaults = HubConfig::default();
        let visual_defaults = VisualConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("CARTOGRAPHY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("CARTOGRAPHY_PORT", 8050),
            },
            hub: HubConfig {
                api_key: env::var("NEYNAR_API_KEY").ok().filter(|key| !key.is_empty()),
                base_url: with_trailing_slash(
                    env::var("HUB_BASE_URL").unwrap_or(hub_defaults.base_url),
                ),
                api_base_url: with_trailing_slash(
                    env::var("HUB_API_BASE_URL").unwrap_or(hub_defaults.api_base_url),
                ),
                page_size: parse_env_or("HUB_PAGE_SIZE", hub_defaults.page_size),
                max_retries: parse_env_or("HUB_MAX_RETRIES", hub_defaults.max_retries),
                initial_backoff_ms: parse_env_or(
                    "HUB_INITIAL_BACKOFF_MS",
                    hub_defaults.initial_backoff_ms,
                ),
                request_delay_ms: parse_env_or("HUB_REQUEST_DELAY_MS", hub_defaults.request_delay_ms),
                timeout_secs: parse_env_or("HUB_TIMEOUT", hub_defaults.timeout_secs),
                bulk_batch_size: parse_env_or("HUB_BULK_BATCH_SIZE", hub_defaults.bulk_batch_size)
                    .clamp(1, 100),
                fetch_followers: parse_env_or("HUB_FETCH_FOLLOWERS", hub_defaults.fetch_followers),
            },
            store: StoreConfig {
                data_dir: env::var("CARTOGRAPHY_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
                max_age_secs: parse_env_or("CARTOGRAPHY_MAX_AGE_SECS", 86400),
            },
            graph: GraphConfig {
                top_n: parse_env_or("CARTOGRAPHY_TOP_N", 25),
            },
            visual: VisualConfig {
                min_edge_width: parse_env_or("MIN_EDGE_WIDTH", visual_defaults.min_edge_width),
                max_edge_width: parse_env_or("MAX_EDGE_WIDTH", visual_defaults.max_edge_width),
                node_base_size: parse_env_or("NODE_BASE_SIZE", visual_defaults.node_base_size),
                recency_cap: parse_env_or("RECENCY_CAP", visual_defaults.recency_cap),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
