//! HTTP GET abstraction used by the Open5e and Scryfall lookups.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serenity::async_trait;
use tracing::{debug, warn};

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Something that can perform a GET.
///
/// Returns `Err` only when no response was obtained. Any status code,
/// including errors, is an `Ok` response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, String>;
}

/// Production transport backed by `reqwest`.
///
/// Connection failures and timeouts are retried a few times with
/// exponential backoff. Responses, whatever their status, are not.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    max_retries: usize,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("oghma/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            max_retries: 2,
        })
    }

    async fn fetch(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, String> {
        debug!("GET {}", url);

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(5))
            .with_max_times(self.max_retries);

        (|| self.fetch(url))
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .when(|e: &reqwest::Error| e.is_connect() || e.is_timeout())
            .notify(|e: &reqwest::Error, delay: Duration| {
                warn!("GET {} failed ({}), retrying in {:.1}s", url, e, delay.as_secs_f64());
            })
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory transport for tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Serves canned responses keyed by exact URL and records every request.
    /// Unknown URLs answer 404.
    #[derive(Default)]
    pub struct FakeTransport {
        routes: HashMap<String, Result<HttpResponse, String>>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_json(mut self, url: &str, body: serde_json::Value) -> Self {
            self.routes.insert(
                url.to_string(),
                Ok(HttpResponse {
                    status: 200,
                    body: body.to_string(),
                }),
            );
            self
        }

        pub fn with_status(mut self, url: &str, status: u16) -> Self {
            self.routes.insert(
                url.to_string(),
                Ok(HttpResponse {
                    status,
                    body: String::new(),
                }),
            );
            self
        }

        pub fn with_body(mut self, url: &str, body: &str) -> Self {
            self.routes.insert(
                url.to_string(),
                Ok(HttpResponse {
                    status: 200,
                    body: body.to_string(),
                }),
            );
            self
        }

        pub fn with_failure(mut self, url: &str, message: &str) -> Self {
            self.routes.insert(url.to_string(), Err(message.to_string()));
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, String> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(url.to_string());
            }
            self.routes.get(url).cloned().unwrap_or(Ok(HttpResponse {
                status: 404,
                body: String::new(),
            }))
        }
    }
}
