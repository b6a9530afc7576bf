use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Errors from outbound calls to sibling services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    #[error("{service} returned {status}: {message}")]
    BadStatus {
        service: String,
        status: u16,
        message: String,
    },

    #[error("{service} returned a malformed response")]
    MalformedResponse { service: String },
}

/// Outcome of a best-effort call. Controllers use this where a dependency
/// failure should degrade the response instead of aborting the request.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(Value),
    Degraded(String),
}

impl FetchOutcome {
    pub fn into_option(self) -> Option<Value> {
        match self {
            FetchOutcome::Fetched(v) => Some(v),
            FetchOutcome::Degraded(_) => None,
        }
    }
}

/// Bounded exponential backoff: attempt 0 retries after `base`, attempt 1
/// after `2 * base`, and so on. No jitter; attempts are small.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Authenticated HTTP client for sibling services. Forwards the original
/// caller's bearer token and retries transport-level failures and 5xx
/// responses; 4xx responses are surfaced immediately.
#[derive(Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl ServiceClient {
    pub fn new(retry_attempts: u32, retry_base_delay_ms: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http,
            retry: RetryPolicy {
                attempts: retry_attempts,
                base_delay: Duration::from_millis(retry_base_delay_ms),
            },
        }
    }

    /// GET a JSON document from a sibling service. The result is required:
    /// failure after retries is a hard error for the caller to surface.
    pub async fn get_json(
        &self,
        service: &str,
        url: &str,
        bearer: &str,
    ) -> Result<Value, ServiceError> {
        self.request_json(service, url, bearer, None).await
    }

    /// GET where failure should degrade rather than abort.
    pub async fn get_json_degraded(&self, service: &str, url: &str, bearer: &str) -> FetchOutcome {
        match self.get_json(service, url, bearer).await {
            Ok(value) => FetchOutcome::Fetched(value),
            Err(e) => {
                warn!("degraded fetch from {}: {}", service, e);
                FetchOutcome::Degraded(e.to_string())
            }
        }
    }

    /// POST a JSON body to a sibling service.
    pub async fn post_json(
        &self,
        service: &str,
        url: &str,
        bearer: &str,
        body: Value,
    ) -> Result<Value, ServiceError> {
        self.request_json(service, url, bearer, Some(body)).await
    }

    /// POST where failure should degrade rather than abort.
    pub async fn post_json_degraded(
        &self,
        service: &str,
        url: &str,
        bearer: &str,
        body: Value,
    ) -> FetchOutcome {
        match self.post_json(service, url, bearer, body).await {
            Ok(value) => FetchOutcome::Fetched(value),
            Err(e) => {
                warn!("degraded post to {}: {}", service, e);
                FetchOutcome::Degraded(e.to_string())
            }
        }
    }

    async fn request_json(
        &self,
        service: &str,
        url: &str,
        bearer: &str,
        body: Option<Value>,
    ) -> Result<Value, ServiceError> {
        let mut last_err: Option<ServiceError> = None;

        for attempt in 0..=self.retry.attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry.delay_for(attempt - 1)).await;
            }

            let mut request = match &body {
                Some(json) => self.http.post(url).json(json),
                None => self.http.get(url),
            };
            request = request.header("Authorization", format!("Bearer {}", bearer));

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_err = Some(ServiceError::Unavailable {
                        service: service.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return response.json::<Value>().await.map_err(|_| {
                    ServiceError::MalformedResponse {
                        service: service.to_string(),
                    }
                });
            }

            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .or_else(|| v.get("error"))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| status.to_string());

            let err = ServiceError::BadStatus {
                service: service.to_string(),
                status: status.as_u16(),
                message,
            };

            // Client errors are definitive; retrying will not change them.
            if status.is_client_error() {
                return Err(err);
            }
            last_err = Some(err);
        }

        Err(last_err.unwrap_or(ServiceError::MalformedResponse {
            service: service.to_string(),
        }))
    }
}
