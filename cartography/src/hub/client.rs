use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT},
    Client, StatusCode,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::messages::{BulkUser, BulkUsersResponse, HubMessage, HubPage};
use super::BULK_USERS;
use crate::config::HubConfig;
use crate::error::{CartographyError, Result};

/// The bulk lookup endpoint accepts at most this many ids per call.
pub const MAX_BULK_IDS: usize = 100;

/// Why a paginated fetch stopped before the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchInterruption {
    /// Page `page` (0-based) failed on every attempt.
    RetriesExhausted { page: usize, error: String },
    /// The hub refused the request outright; retrying would not help.
    Rejected { page: usize, error: String },
    Cancelled { page: usize },
}

impl std::fmt::Display for FetchInterruption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchInterruption::RetriesExhausted { page, error } => {
                write!(f, "page {page} failed after retries: {error}")
            }
            FetchInterruption::Rejected { page, error } => {
                write!(f, "page {page} rejected: {error}")
            }
            FetchInterruption::Cancelled { page } => write!(f, "cancelled before page {page}"),
        }
    }
}

/// Messages collected by a paginated fetch, complete or not.
#[derive(Debug, Default)]
pub struct FetchResult {
    pub messages: Vec<HubMessage>,
    /// Pages successfully fetched.
    pub pages: usize,
    /// Messages dropped because they could not be decoded.
    pub skipped: usize,
    pub interruption: Option<FetchInterruption>,
}

impl FetchResult {
    pub fn is_complete(&self) -> bool {
        self.interruption.is_none()
    }
}

enum AttemptError {
    Transient(String),
    Permanent(String),
    Cancelled,
}

/// Client for the hub's paginated message endpoints and the bulk user lookup.
///
/// Never returns an error from a fetch: failures degrade to whatever was
/// collected before them.
#[derive(Clone)]
pub struct HubClient {
    client: Client,
    config: HubConfig,
    base_url: Url,
    api_base_url: Url,
    cancel: CancellationToken,
}

impl HubClient {
    pub fn new(config: HubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(ref api_key) = config.api_key {
            headers.insert(
                HeaderName::from_static("api_key"),
                HeaderValue::from_str(api_key)
                    .map_err(|e| CartographyError::Validation(format!("Invalid API key header: {e}")))?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| CartographyError::Hub(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            api_base_url: Url::parse(&config.api_base_url)?,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Share a cancellation token; cancelling it stops any in-flight fetch.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Fetch every page of `endpoint`, following `nextPageToken` until the hub
    /// stops returning one.
    pub async fn fetch_typed(&self, endpoint: &str, params: &[(&str, String)]) -> FetchResult {
        let mut result = FetchResult::default();

        let url = match self.base_url.join(endpoint) {
            Ok(url) => url,
            Err(e) => {
                result.interruption = Some(FetchInterruption::Rejected {
                    page: 0,
                    error: format!("Invalid endpoint '{endpoint}': {e}"),
                });
                return result;
            }
        };

        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("pageSize", self.config.page_size.to_string()));
        let mut page_token: Option<String> = None;

        loop {
            let page_index = result.pages;
            let mut page_query = query.clone();
            if let Some(ref token) = page_token {
                page_query.push(("pageToken", token.clone()));
            }

            let page: HubPage = match self.get_with_retry(&url, &page_query).await {
                Ok(page) => page,
                Err(AttemptError::Cancelled) => {
                    tracing::info!(endpoint, page = page_index, "Hub fetch cancelled");
                    result.interruption = Some(FetchInterruption::Cancelled { page: page_index });
                    break;
                }
                Err(AttemptError::Permanent(error)) => {
                    tracing::warn!(endpoint, page = page_index, %error, "Hub rejected request");
                    result.interruption = Some(FetchInterruption::Rejected {
                        page: page_index,
                        error,
                    });
                    break;
                }
                Err(AttemptError::Transient(error)) => {
                    tracing::warn!(
                        endpoint,
                        page = page_index,
                        collected = result.messages.len(),
                        %error,
                        "Giving up on hub pagination, returning partial result"
                    );
                    result.interruption = Some(FetchInterruption::RetriesExhausted {
                        page: page_index,
                        error,
                    });
                    break;
                }
            };

            result.pages += 1;
            let next = page.next_token().map(str::to_string);
            let raw = page.messages.unwrap_or_default();
            let received = raw.len();

            for value in raw {
                match serde_json::from_value::<HubMessage>(value) {
                    Ok(message) => result.messages.push(message),
                    Err(_) => result.skipped += 1,
                }
            }

            tracing::debug!(
                endpoint,
                page = page_index,
                received,
                total = result.messages.len(),
                "Fetched hub page"
            );

            match next {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        if result.skipped > 0 {
            tracing::warn!(endpoint, skipped = result.skipped, "Dropped undecodable hub messages");
        }

        result
    }

    /// Look up display profiles for up to [`MAX_BULK_IDS`] users in one call.
    ///
    /// Users the hub does not know are simply absent from the result. A call
    /// that fails is reported as an interruption of its single page.
    pub async fn fetch_users_bulk(
        &self,
        ids: &[String],
    ) -> std::result::Result<Vec<BulkUser>, FetchInterruption> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > MAX_BULK_IDS {
            tracing::warn!(
                requested = ids.len(),
                limit = MAX_BULK_IDS,
                "Bulk user lookup over the per-call limit, skipping batch"
            );
            return Err(FetchInterruption::Rejected {
                page: 0,
                error: format!("{} ids exceed the limit of {MAX_BULK_IDS}", ids.len()),
            });
        }

        let url = self.api_base_url.join(BULK_USERS).map_err(|e| {
            FetchInterruption::Rejected {
                page: 0,
                error: format!("Invalid bulk lookup URL: {e}"),
            }
        })?;
        let query = [("fids", ids.join(","))];

        let response: BulkUsersResponse = match self.get_with_retry(&url, &query).await {
            Ok(response) => response,
            Err(AttemptError::Cancelled) => {
                tracing::info!(batch = ids.len(), "Bulk user lookup cancelled");
                return Err(FetchInterruption::Cancelled { page: 0 });
            }
            Err(AttemptError::Permanent(error)) => {
                tracing::warn!(batch = ids.len(), %error, "Bulk user lookup rejected");
                return Err(FetchInterruption::Rejected { page: 0, error });
            }
            Err(AttemptError::Transient(error)) => {
                tracing::warn!(batch = ids.len(), %error, "Bulk user lookup failed");
                return Err(FetchInterruption::RetriesExhausted { page: 0, error });
            }
        };

        let Some(raw) = response.users else {
            tracing::warn!(batch = ids.len(), "Bulk user response had no users field");
            return Err(FetchInterruption::Rejected {
                page: 0,
                error: "response had no users field".to_string(),
            });
        };

        Ok(raw
            .into_iter()
            .filter_map(|value| serde_json::from_value::<BulkUser>(value).ok())
            .collect())
    }

    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: &[(&str, String)],
    ) -> std::result::Result<T, AttemptError> {
        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);
        let mut last_error = String::from("no attempt made");

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    url = %url,
                    attempt,
                    delay_ms = backoff.as_millis() as u64,
                    error = %last_error,
                    "Hub request failed, retrying"
                );
                self.pause(backoff).await?;
                backoff *= 2;
            }

            self.pause(Duration::from_millis(self.config.request_delay_ms))
                .await?;

            match self.get_once(url, query).await {
                Ok(body) => return Ok(body),
                Err(AttemptError::Transient(error)) => last_error = error,
                Err(other) => return Err(other),
            }
        }

        Err(AttemptError::Transient(last_error))
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: &[(&str, String)],
    ) -> std::result::Result<T, AttemptError> {
        let request = self.client.get(url.clone()).query(query).send();

        let resp = tokio::select! {
            _ = self.cancel.cancelled() => return Err(AttemptError::Cancelled),
            resp = request => resp.map_err(|e| AttemptError::Transient(format!("Request failed: {e}")))?,
        };

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = resp.text().await.unwrap_or_default();
            return Err(AttemptError::Permanent(
                CartographyError::HubStatus {
                    status: status.as_u16(),
                    body,
                }
                .to_string(),
            ));
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AttemptError::Transient(
                CartographyError::HubStatus {
                    status: status.as_u16(),
                    body,
                }
                .to_string(),
            ));
        }

        resp.json::<T>()
            .await
            .map_err(|e| AttemptError::Transient(format!("Failed to parse response: {e}")))
    }

    /// Sleep unless cancelled first.
    async fn pause(&self, duration: Duration) -> std::result::Result<(), AttemptError> {
        if self.cancel.is_cancelled() {
            return Err(AttemptError::Cancelled);
        }
        if duration.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(AttemptError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unprintable_api_key() {
        let config = HubConfig {
            api_key: Some("bad\nkey".to_string()),
            ..HubConfig::default()
        };
        assert!(matches!(
            HubClient::new(config),
            Err(CartographyError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = HubConfig {
            base_url: "not a url".to_string(),
            ..HubConfig::default()
        };
        assert!(matches!(
            HubClient::new(config),
            Err(CartographyError::UrlParse(_))
        ));
    }

    #[test]
    fn test_interruption_display() {
        let interruption = FetchInterruption::RetriesExhausted {
            page: 2,
            error: "boom".to_string(),
        };
        assert_eq!(interruption.to_string(), "page 2 failed after retries: boom");
        assert_eq!(
            FetchInterruption::Cancelled { page: 0 }.to_string(),
            "cancelled before page 0"
        );
    }

    #[tokio::test]
    async fn test_cancelled_client_returns_immediately() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let client = HubClient::new(HubConfig {
            base_url: "http://127.0.0.1:9/v1/".to_string(),
            ..HubConfig::default()
        })
        .unwrap()
        .with_cancellation(cancel);

        let result = client.fetch_typed("castsByFid", &[("fid", "1".to_string())]).await;
        assert!(result.messages.is_empty());
        assert_eq!(result.interruption, Some(FetchInterruption::Cancelled { page: 0 }));
    }
}
