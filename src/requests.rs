use std::{future::Future, time::Duration};

use anyhow::Context;
use log::{debug, warn};
use reqwest::{
    Client, ClientBuilder, Response, StatusCode, Url,
    header::{HeaderMap, RETRY_AFTER},
};

use crate::{config::RequestConfig, ratelimit::RateLimiter};

/// Status codes worth another attempt: rate limiting and transient server errors.
const RETRY_STATUS_CODES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Anything that can hand back the HTML body behind a URL.
pub trait PageSource {
    fn fetch_page(&self, url: &Url) -> impl Future<Output = anyhow::Result<String>> + Send;
}

pub struct RequestClient {
    client: Client,
    rate_limiter: RateLimiter,
    max_attempts: u32,
    backoff_base: Duration,
}

impl RequestClient {
    pub fn new(config: &RequestConfig) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;
        let rate_limiter = RateLimiter::new(
            config.requests_per_period,
            config.rate_limit_period(),
            config.min_request_gap(),
        )?;
        Ok(Self {
            client,
            rate_limiter,
            max_attempts: config.max_attempts.max(1),
            backoff_base: config.backoff_base(),
        })
    }

    pub async fn fetch_url_response(&self, url: &Url) -> anyhow::Result<Response> {
        let mut attempt = 1;
        loop {
            // Wait (non-blocking) until we're allowed to make a request according
            // to our self-imposed rate-limiting policy.
            self.rate_limiter.wait_until_ready().await;

            debug!("GET {url} (attempt {attempt}/{})", self.max_attempts);
            let delay = match self.client.get(url.clone()).send().await {
                Ok(response) if !RETRY_STATUS_CODES.contains(&response.status()) => {
                    // Error pages still carry a body; the parsers treat it as
                    // a page with none of the expected markup.
                    if !response.status().is_success() {
                        warn!("{url} answered {}, using its body as is", response.status());
                    }
                    return Ok(response);
                }
                Ok(response) if attempt < self.max_attempts => {
                    let delay = retry_after(response.headers())
                        .unwrap_or_else(|| backoff_delay(self.backoff_base, attempt));
                    warn!(
                        "{url} answered {}, retrying in {delay:?}",
                        response.status()
                    );
                    delay
                }
                Ok(response) => {
                    return response.error_for_status().with_context(|| {
                        format!("request to {url} failed after {attempt} attempts")
                    });
                }
                Err(e) if attempt < self.max_attempts => {
                    let delay = backoff_delay(self.backoff_base, attempt);
                    warn!("request to {url} failed ({e}), retrying in {delay:?}");
                    delay
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("request to {url} failed after {attempt} attempts"));
                }
            };
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    pub async fn fetch_url_body(&self, url: &Url) -> anyhow::Result<String> {
        let response = self.fetch_url_response(url).await?;
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read body of {url}"))?;
        Ok(body)
    }
}

impl PageSource for RequestClient {
    async fn fetch_page(&self, url: &Url) -> anyhow::Result<String> {
        self.fetch_url_body(url).await
    }
}

/// Exponential backoff: `base`, `2 * base`, `4 * base`, ...
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Only the delay-seconds form of Retry-After is honoured.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CannedServer, fast_request_client, http_response};
    use reqwest::header::HeaderValue;
    use std::time::Instant;

    fn page_url(server: &CannedServer) -> Url {
        Url::parse(&format!("{}/m/1", server.base_url)).unwrap()
    }

    #[test]
    fn backoff_doubles_each_attempt() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(1));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(4));
    }

    #[test]
    fn retry_after_seconds_are_honoured() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(7)));
    }

    #[test]
    fn retry_after_http_date_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
        assert_eq!(retry_after(&HeaderMap::new()), None);
    }

    #[test]
    fn only_transient_statuses_are_retried() {
        assert!(RETRY_STATUS_CODES.contains(&StatusCode::TOO_MANY_REQUESTS));
        assert!(RETRY_STATUS_CODES.contains(&StatusCode::SERVICE_UNAVAILABLE));
        assert!(!RETRY_STATUS_CODES.contains(&StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn persistent_503_fails_after_max_attempts() {
        let server =
            CannedServer::start(vec![http_response("503 Service Unavailable", &[], "")]).await;
        let client = fast_request_client();

        let result = client.fetch_url_body(&page_url(&server)).await;

        assert!(result.is_err());
        assert_eq!(server.hits(), 3);
    }

    #[tokio::test]
    async fn transient_503_is_retried_until_success() {
        let server = CannedServer::start(vec![
            http_response("503 Service Unavailable", &[], ""),
            http_response("200 OK", &[], "<p>ok</p>"),
        ])
        .await;
        let client = fast_request_client();

        let body = client.fetch_url_body(&page_url(&server)).await.unwrap();

        assert_eq!(body, "<p>ok</p>");
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn retry_after_sets_the_delay() {
        let server = CannedServer::start(vec![
            http_response("429 Too Many Requests", &["Retry-After: 1"], ""),
            http_response("200 OK", &[], "<p>ok</p>"),
        ])
        .await;
        let client = fast_request_client();

        let start = Instant::now();
        let body = client.fetch_url_body(&page_url(&server)).await.unwrap();

        assert_eq!(body, "<p>ok</p>");
        // The 10ms backoff base would have retried far sooner.
        assert!(start.elapsed() >= Duration::from_millis(950));
    }

    #[tokio::test]
    async fn not_found_is_fetched_once_and_returns_its_body() {
        let server =
            CannedServer::start(vec![http_response("404 Not Found", &[], "<p>gone</p>")]).await;
        let client = fast_request_client();

        let body = client.fetch_url_body(&page_url(&server)).await.unwrap();

        assert_eq!(body, "<p>gone</p>");
        assert_eq!(server.hits(), 1);
    }
}
