//! Proxy-rotating HTTP fetcher with retry, pacing, and proxy eviction
//!
//! One logical GET runs as a bounded attempt loop. Before each attempt the
//! shared rate limiter is awaited and a uniformly-jittered sleep paces the
//! request rate; the attempt then goes out through the next proxy in
//! rotation with a bounded per-attempt timeout.
//!
//! Failure handling separates HTTP-level failures (retry, keep the proxy)
//! from transport-level failures (retry, discard the proxy). Conflating the
//! two either wastes good proxies or keeps reusing dead ones, so eviction is
//! decided by a single table keyed on [`FailureKind`].

pub mod headers;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::Rng;
use reqwest::Client;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::{FetchConfig, ProxyConfig};
use crate::proxy::{Proxy, ProxyPool};
use crate::utils::error::FetchError;

pub use crate::utils::error::FailureKind;

use headers::build_browser_headers;

/// Successful fetch: page body plus the URL the request finally resolved to
///
/// The final URL may differ from the requested one after redirects; the
/// cross-referencer branches on it.
#[derive(Debug, Clone)]
pub struct FetchSuccess {
    pub body: String,
    pub final_url: String,
}

/// HTTP fetcher owning the proxy pool
pub struct Fetcher {
    config: FetchConfig,
    /// `None` in direct mode (tests, trusted egress)
    pool: Option<Mutex<ProxyPool>>,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    /// Client used for direct-mode requests
    direct_client: Client,
    /// Optional base URL prefix for mock servers in tests
    base_url: Option<String>,
}

impl Fetcher {
    /// Create a fetcher that routes through a proxy pool
    pub fn new(config: FetchConfig, proxy_config: ProxyConfig) -> Result<Self, FetchError> {
        let pool = ProxyPool::new(proxy_config)?;
        Self::build(config, Some(pool))
    }

    /// Create a fetcher around an already-populated pool
    pub fn with_pool(config: FetchConfig, pool: ProxyPool) -> Result<Self, FetchError> {
        Self::build(config, Some(pool))
    }

    /// Create a proxy-less fetcher
    pub fn direct(config: FetchConfig) -> Result<Self, FetchError> {
        Self::build(config, None)
    }

    /// Create a proxy-less fetcher with a base URL for mock servers
    pub fn with_base_url(base_url: &str, config: FetchConfig) -> Result<Self, FetchError> {
        let mut fetcher = Self::build(config, None)?;
        fetcher.base_url = Some(base_url.to_string());
        Ok(fetcher)
    }

    fn build(config: FetchConfig, pool: Option<ProxyPool>) -> Result<Self, FetchError> {
        let direct_client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(config.rate_limit).unwrap_or(NonZeroU32::new(1).unwrap());
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            config,
            pool: pool.map(Mutex::new),
            rate_limiter,
            direct_client,
            base_url: None,
        })
    }

    /// Addresses currently in the pool; empty in direct mode
    pub async fn live_proxies(&self) -> Vec<String> {
        match &self.pool {
            Some(pool) => pool.lock().await.addresses(),
            None => Vec::new(),
        }
    }

    /// Perform one logical GET
    ///
    /// # Errors
    ///
    /// - `FetchError::EmptyPool` when no proxy can be obtained even after a
    ///   refresh (run-fatal for the caller)
    /// - `FetchError::RetriesExhausted` when every attempt failed
    pub async fn fetch(&self, url: &str) -> Result<FetchSuccess, FetchError> {
        self.fetch_with_query(url, &[]).await
    }

    /// Perform one logical GET with query parameters
    pub async fn fetch_with_query(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<FetchSuccess, FetchError> {
        self.ensure_pool_fresh().await?;

        let full_url = match &self.base_url {
            Some(base) => format!("{base}{url}"),
            None => url.to_string(),
        };

        let mut last = FailureKind::Transport;
        for attempt in 1..=self.config.max_retries {
            self.rate_limiter.until_ready().await;
            self.jitter_sleep().await;

            let proxy = self.take_proxy().await?;
            let client = self.client_for(proxy.as_ref())?;

            let mut request = client
                .get(&full_url)
                .headers(build_browser_headers(&self.config.user_agent));
            if !query.is_empty() {
                request = request.query(query);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let final_url = response.url().to_string();
                        let body = match response.text().await {
                            Ok(body) => body,
                            Err(e) => {
                                last = FailureKind::from_error(&e);
                                self.handle_failure(&last, proxy.as_ref(), attempt, url).await;
                                continue;
                            }
                        };
                        tracing::debug!(url, attempt, final_url = %final_url, "Fetch succeeded");
                        return Ok(FetchSuccess { body, final_url });
                    }

                    last = FailureKind::HttpStatus(status.as_u16());
                    self.handle_failure(&last, proxy.as_ref(), attempt, url).await;
                }
                Err(e) => {
                    last = FailureKind::from_error(&e);
                    self.handle_failure(&last, proxy.as_ref(), attempt, url).await;
                }
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            last,
        })
    }

    /// Log the failed attempt and apply the eviction table
    async fn handle_failure(
        &self,
        kind: &FailureKind,
        proxy: Option<&Proxy>,
        attempt: u32,
        url: &str,
    ) {
        tracing::warn!(
            url,
            attempt,
            max = self.config.max_retries,
            failure = %kind,
            proxy = proxy.map(Proxy::address).unwrap_or("direct"),
            "Fetch attempt failed"
        );

        if kind.evicts_proxy() {
            if let (Some(pool), Some(proxy)) = (&self.pool, proxy) {
                pool.lock().await.remove(proxy).await;
            }
        }
    }

    /// Refresh the pool when stale or empty; error out when it stays empty
    async fn ensure_pool_fresh(&self) -> Result<(), FetchError> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };

        let mut pool = pool.lock().await;
        if pool.is_empty() || pool.is_stale() {
            pool.refresh().await;
        }
        if pool.is_empty() {
            return Err(FetchError::EmptyPool);
        }
        Ok(())
    }

    async fn take_proxy(&self) -> Result<Option<Proxy>, FetchError> {
        match &self.pool {
            Some(pool) => Ok(Some(pool.lock().await.next()?)),
            None => Ok(None),
        }
    }

    fn client_for(&self, proxy: Option<&Proxy>) -> Result<Client, FetchError> {
        match proxy {
            None => Ok(self.direct_client.clone()),
            Some(p) => Ok(Client::builder()
                .timeout(self.config.timeout())
                .gzip(true)
                .proxy(reqwest::Proxy::all(p.url())?)
                .build()?),
        }
    }

    /// Randomized pre-attempt delay, uniform over the configured range
    async fn jitter_sleep(&self) {
        let (min, max) = (self.config.min_delay_ms, self.config.max_delay_ms);
        let delay = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}
