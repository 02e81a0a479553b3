//! Egress proxy pool: discovery, validation, rotation, expiry
//!
//! The pool owns the set of currently-usable proxies. It is refreshed in
//! full (never incrementally re-validated): on expiry of the validity window
//! or on exhaustion, a new candidate list is fetched from the discovery
//! source and every candidate is probed before it is admitted.
//!
//! A candidate is live iff a probe through it completes without a
//! transport-level error within the validation timeout. HTTP error statuses
//! do not disqualify a candidate; the validation target may reject for
//! unrelated reasons.

use reqwest::Client;
use std::time::Instant;

use crate::config::ProxyConfig;
use crate::utils::error::FetchError;

/// A single egress proxy address
///
/// Identity is the bare `host:port` string; there is no persisted state
/// beyond it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Proxy {
    address: String,
}

impl Proxy {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Bare `host:port` address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Proxy URL usable with the HTTP client
    pub fn url(&self) -> String {
        format!("http://{}", self.address)
    }
}

impl std::fmt::Display for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.address)
    }
}

/// Ordered collection of live proxies with a rotation cursor
///
/// Owned exclusively by the fetcher; all mutation goes through it. The
/// cursor always indexes a valid position while the collection is non-empty.
pub struct ProxyPool {
    proxies: Vec<Proxy>,
    cursor: usize,
    refreshed_at: Option<Instant>,
    config: ProxyConfig,
    client: Client,
}

impl ProxyPool {
    /// Create an empty pool; call [`refresh`](Self::refresh) to populate it
    pub fn new(config: ProxyConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.validation_timeout())
            .build()?;

        Ok(Self {
            proxies: Vec::new(),
            cursor: 0,
            refreshed_at: None,
            config,
            client,
        })
    }

    /// Create a pool seeded with fixed addresses, skipping discovery
    ///
    /// Intended for tests and for deployments with a known proxy set.
    pub fn with_proxies<I, S>(config: ProxyConfig, addresses: I) -> Result<Self, FetchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool = Self::new(config)?;
        pool.proxies = addresses.into_iter().map(Proxy::new).collect();
        pool.refreshed_at = Some(Instant::now());
        Ok(pool)
    }

    /// Number of live proxies
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Whether the pool holds the given address
    pub fn contains(&self, address: &str) -> bool {
        self.proxies.iter().any(|p| p.address == address)
    }

    /// Addresses currently in the pool, in rotation order
    pub fn addresses(&self) -> Vec<String> {
        self.proxies.iter().map(|p| p.address.clone()).collect()
    }

    /// Whether the validity window has elapsed since the last refresh
    pub fn is_stale(&self) -> bool {
        match self.refreshed_at {
            Some(at) => at.elapsed() >= self.config.max_age(),
            None => true,
        }
    }

    /// Return the proxy at the rotation cursor and advance circularly
    ///
    /// # Errors
    ///
    /// Returns `FetchError::EmptyPool` when no proxies are live; the caller
    /// must refresh first.
    pub fn next(&mut self) -> Result<Proxy, FetchError> {
        if self.proxies.is_empty() {
            return Err(FetchError::EmptyPool);
        }

        let proxy = self.proxies[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.proxies.len();
        Ok(proxy)
    }

    /// Evict a proxy after a hard transport failure attributable to it
    ///
    /// Resets the cursor and triggers an immediate refresh when the pool
    /// empties as a result.
    pub async fn remove(&mut self, proxy: &Proxy) {
        let before = self.proxies.len();
        self.proxies.retain(|p| p.address != proxy.address);
        self.cursor = 0;

        if self.proxies.len() < before {
            tracing::debug!(proxy = %proxy, remaining = self.proxies.len(), "Evicted dead proxy");
        }

        if self.proxies.is_empty() {
            self.refresh().await;
        }
    }

    /// Fetch a candidate list from the discovery source and replace the live
    /// set with the candidates that validate
    ///
    /// Fails softly: when discovery errors out or zero candidates survive
    /// validation, the pool is left as it was and the caller decides whether
    /// to retry. Returns the number of live proxies after the call.
    pub async fn refresh(&mut self) -> usize {
        for attempt in 1..=self.config.refresh_attempts {
            let body = match self.client.get(&self.config.discovery_url).send().await {
                Ok(resp) if resp.status().is_success() => match resp.text().await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(attempt, error = %e, "Proxy discovery body unreadable");
                        continue;
                    }
                },
                Ok(resp) => {
                    tracing::warn!(
                        attempt,
                        status = resp.status().as_u16(),
                        "Proxy discovery responded with error status"
                    );
                    continue;
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Proxy discovery request failed");
                    continue;
                }
            };

            let candidates: Vec<&str> = body.split_whitespace().collect();
            let mut live = Vec::new();
            for candidate in &candidates {
                if self.validate(candidate).await {
                    live.push(Proxy::new(*candidate));
                }
            }

            tracing::info!(
                candidates = candidates.len(),
                live = live.len(),
                "Proxy pool refresh"
            );

            if !live.is_empty() {
                self.proxies = live;
                self.cursor = 0;
                self.refreshed_at = Some(Instant::now());
                return self.proxies.len();
            }
        }

        tracing::warn!(
            attempts = self.config.refresh_attempts,
            remaining = self.proxies.len(),
            "Proxy refresh yielded no live candidates, pool left as-is"
        );
        self.proxies.len()
    }

    /// Probe a candidate by issuing a real request through it
    ///
    /// Live iff the request completes without a transport error within the
    /// validation timeout. Any HTTP status counts as live.
    async fn validate(&self, address: &str) -> bool {
        let proxy_url = format!("http://{address}");
        let client = match Client::builder()
            .timeout(self.config.validation_timeout())
            .proxy(match reqwest::Proxy::all(&proxy_url) {
                Ok(p) => p,
                Err(_) => return false,
            })
            .build()
        {
            Ok(c) => c,
            Err(_) => return false,
        };

        match client.get(&self.config.validation_url).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::trace!(proxy = address, error = %e, "Candidate failed validation");
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn force_stale(&mut self) {
        let over = self.config.max_age() + std::time::Duration::from_secs(1);
        self.refreshed_at = Instant::now().checked_sub(over);
    }
}
