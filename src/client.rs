//! The SportMonks soccer client: configuration, transport, and the
//! paginate-normalize-cache pipeline behind every endpoint method.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER, USER_AGENT};
use serde_json::Value;
use url::Url;

use crate::error::{Result, SportmonksError};
use crate::fetch::cache::{LookupCache, LookupKey};
use crate::fetch::envelope::Body;
use crate::fetch::{normalize, paginate};
use crate::query::{Includes, Query};
use crate::retry::RetryPolicy;
use crate::Record;


pub const DEFAULT_BASE_URL: &str = "https://soccer.sportmonks.com/api/v2.0/";

const CLIENT_USER_AGENT: &str = concat!("sportmonks-rs/", env!("CARGO_PKG_VERSION"));

/// Client for the SportMonks soccer API v2.0.
///
/// Owns the HTTP connection pool and the identifier cache; the cache lives as
/// long as the client and is only emptied by [`SoccerClient::clear_cache`].
#[derive(Debug)]
pub struct SoccerClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: String,
    timezone: Option<String>,
    retry: Option<RetryPolicy>,
    cache: LookupCache,
    requests_made: AtomicU64,
}

pub struct SoccerClientBuilder {
    api_token: String,
    base_url: String,
    timezone: Option<String>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl SoccerClientBuilder {
    /// Override the API base URL (mock servers, proxies).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// IANA timezone name sent with every request as the `tz` parameter.
    pub fn timezone(mut self, tz_name: impl Into<String>) -> Self {
        self.timezone = Some(tz_name.into());
        self
    }

    /// Per-request timeout; a lapse surfaces as `Timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable bounded retry with backoff for transient failures.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn build(self) -> Result<SoccerClient> {
        if self.api_token.is_empty() {
            return Err(SportmonksError::MissingApiToken);
        }

        // `Url::join` treats the last path segment of a slashless base as a
        // file name, so the base must end with a slash.
        let base = if self.base_url.ends_with('/') {
            self.base_url
        } else {
            format!("{}/", self.base_url)
        };
        let base_url = Url::parse(&base)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let mut http = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().map_err(SportmonksError::Network)?;

        Ok(SoccerClient {
            http,
            base_url,
            api_token: self.api_token,
            timezone: self.timezone,
            retry: self.retry,
            cache: LookupCache::new(),
            requests_made: AtomicU64::new(0),
        })
    }
}

impl SoccerClient {
    /// Client with default configuration; `api_token` comes from the
    /// SportMonks profile page.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        SoccerClient::builder(api_token).build()
    }

    pub fn builder(api_token: impl Into<String>) -> SoccerClientBuilder {
        SoccerClientBuilder {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timezone: None,
            timeout: None,
            retry: None,
        }
    }

    /// Number of HTTP requests issued over the lifetime of this client.
    pub fn http_requests_made(&self) -> u64 {
        self.requests_made.load(Ordering::Relaxed)
    }

    /// The identifier cache owned by this client session.
    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    /// Empty the identifier cache. Entries are never invalidated any other
    /// way.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Issue one GET for one page, applying the retry policy if configured.
    pub(crate) async fn get_page(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let url = self.base_url.join(path)?;
        // The token is appended at send time, keeping it out of request logs.
        debug!("GET {url}, params: {params:?}");

        let Some(policy) = &self.retry else {
            return self.execute(url, params).await;
        };

        let mut attempt = 0;
        loop {
            match self.execute(url.clone(), params).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_transient() && attempt + 1 < policy.max_attempts => {
                    let mut delay = policy.delay_for(attempt);
                    if let SportmonksError::RateLimit {
                        retry_after: Some(after),
                    } = &err
                    {
                        delay = delay.max(*after);
                    }
                    debug!("transient failure ({err}); retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn execute(&self, url: Url, params: &[(String, String)]) -> Result<Value> {
        self.requests_made.fetch_add(1, Ordering::Relaxed);

        let mut request = self
            .http
            .get(url)
            .query(params)
            .query(&[("api_token", self.api_token.as_str())]);
        if let Some(tz) = &self.timezone {
            request = request.query(&[("tz", tz.as_str())]);
        }

        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(SportmonksError::RateLimit { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SportmonksError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                SportmonksError::Timeout
            } else {
                SportmonksError::malformed(format!("response body is not JSON: {e}"))
            }
        })
    }

    /// Fetch all pages of a collection query and normalize each record.
    pub async fn get_records(&self, query: Query) -> Result<Vec<Record>> {
        match paginate::fetch_all(self, &query).await? {
            Body::List(records) => records
                .into_iter()
                .map(|record| normalize::normalize(record, query.include_names()))
                .collect(),
            Body::Object(_) => Err(SportmonksError::malformed(
                "expected a record collection, got a single object",
            )),
        }
    }

    /// Fetch a single-resource query and normalize the record.
    pub async fn get_record(&self, query: Query) -> Result<Record> {
        match paginate::fetch_all(self, &query).await? {
            Body::Object(record) => normalize::normalize(record, query.include_names()),
            Body::List(_) => Err(SportmonksError::malformed(
                "expected a single record, got a collection",
            )),
        }
    }

    /// Resource-by-id fetch through the identifier cache.
    pub(crate) async fn lookup(
        &self,
        resource: &'static str,
        id: u64,
        includes: Includes,
    ) -> Result<Record> {
        let key = LookupKey::new(resource, id, includes.clone());
        self.cache
            .get_or_fetch(key, || {
                self.get_record(Query::new(format!("{resource}/{id}")).includes(includes.clone()))
            })
            .await
    }
}

fn classify_transport_error(err: reqwest::Error) -> SportmonksError {
    if err.is_timeout() {
        SportmonksError::Timeout
    } else {
        SportmonksError::Network(err)
    }
}
