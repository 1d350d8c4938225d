use crate::client::KiroSdkConfig;
use crate::infrastructure::{RequestOptions, RequestPool, RetryPolicy, join_url};
use crate::types::constants::{CONNECTION_FAILED, endpoints};
use crate::types::{ConnectionError, ConnectionStatus, HealthStatus, KiroError, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// HTTP side of the SDK: health probing, status tracking and a request
/// pipeline with timeout, retry and cancellation.
///
/// Every request goes through [`make_request`](Self::make_request). Attempts
/// that fail with a retryable error are repeated according to the
/// [`RetryPolicy`]; [`disconnect`](Self::disconnect) aborts everything in
/// flight, including requests waiting out a backoff delay.
pub struct ConnectionManager {
    api_url: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
    http: reqwest::Client,
    status: RwLock<ConnectionStatus>,
    pool: RequestPool,
    // Cancelled and replaced by every disconnect; wakes retry loops sleeping in backoff.
    session: Mutex<CancellationToken>,
}

impl ConnectionManager {
    pub fn new(config: &KiroSdkConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Uses a preconfigured reqwest client (proxies, default headers, ...).
    pub fn with_client(config: &KiroSdkConfig, http: reqwest::Client) -> Self {
        Self {
            api_url: config.api_url.clone(),
            timeout: config.timeout(),
            retry_policy: config.retry_policy.clone(),
            http,
            status: RwLock::new(ConnectionStatus::default()),
            pool: RequestPool::new(),
            session: Mutex::new(CancellationToken::new()),
        }
    }

    /// Probes the health endpoint and records the outcome.
    ///
    /// On success the status becomes connected with the advertised services
    /// and the measured round trip. On failure the status is reset to
    /// disconnected with a single `CONNECTION_FAILED` entry and the error is
    /// returned.
    pub async fn connect(&self) -> Result<()> {
        tracing::info!("Connecting to Kiro server: {}", self.api_url);

        match self.probe().await {
            Ok((health, latency_ms)) => {
                tracing::info!(
                    "Connected to Kiro server in {}ms (services: {:?})",
                    latency_ms,
                    health.services
                );
                *self.status.write().await = ConnectionStatus::connected(health.services, latency_ms);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to connect to Kiro server: {}", e);
                *self.status.write().await = ConnectionStatus::failed(ConnectionError::new(
                    CONNECTION_FAILED,
                    e.to_string(),
                    true,
                ));
                Err(e)
            }
        }
    }

    /// Fetches the health endpoint.
    ///
    /// While connected, the advertised services and latency are refreshed
    /// from the response. A failed check leaves the status untouched.
    pub async fn check_health(&self) -> Result<HealthStatus> {
        let (health, latency_ms) = self.probe().await?;

        let mut status = self.status.write().await;
        if status.connected {
            status.available_services = health.services.clone();
            status.latency_ms = Some(latency_ms);
        }

        Ok(health)
    }

    async fn probe(&self) -> Result<(HealthStatus, u64)> {
        let started = Instant::now();
        let response = self
            .make_request(endpoints::HEALTH, RequestOptions::get())
            .await?;
        let health: HealthStatus = response.json().await?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok((health, latency_ms))
    }

    /// Sends a request to `api_url + endpoint`, retrying retryable failures.
    ///
    /// Returns the response of the first successful attempt. Non-success
    /// statuses are turned into typed errors via [`KiroError::from_status`].
    /// An attempt that outlives the timeout is aborted and reported as
    /// [`KiroError::Timeout`] once retries are exhausted; a request aborted by
    /// [`disconnect`](Self::disconnect) fails with [`KiroError::Cancelled`],
    /// even while it is waiting out a backoff delay.
    ///
    /// Timeouts count as retryable, so a server that never answers surfaces
    /// [`KiroError::Timeout`] only after `max_attempts + 1` full timeouts plus
    /// the backoff delays between them (about 40s plus backoff with defaults).
    pub async fn make_request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<reqwest::Response> {
        let url = join_url(&self.api_url, endpoint);
        let session = self.session().clone();
        let mut retries = 0;

        loop {
            let error = match self.attempt(&url, &options).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            if !error.is_retryable() || !self.retry_policy.allows_retry(retries) {
                if retries > 0 {
                    tracing::warn!(
                        "{} {} failed after {} retries: {}",
                        options.method,
                        endpoint,
                        retries,
                        error
                    );
                }
                return Err(error);
            }

            let delay = self.retry_policy.delay_for(retries);
            retries += 1;
            tracing::warn!(
                "{} {} failed ({}), retrying in {}ms ({}/{})",
                options.method,
                endpoint,
                error,
                delay.as_millis(),
                retries,
                self.retry_policy.max_attempts
            );
            tokio::select! {
                biased;
                _ = session.cancelled() => {
                    tracing::debug!("Dropping retry of {} after disconnect", endpoint);
                    return Err(KiroError::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn attempt(&self, url: &str, options: &RequestOptions) -> Result<reqwest::Response> {
        let guard = self.pool.register();
        tracing::debug!("{} {} (request {})", options.method, url, guard.id());

        let request = options.build(&self.http, url);
        let response = tokio::select! {
            biased;
            _ = guard.token().cancelled() => return Err(KiroError::Cancelled),
            _ = tokio::time::sleep(self.timeout) => {
                guard.token().cancel();
                return Err(KiroError::Timeout { timeout_ms: self.timeout_ms() });
            }
            result = request.send() => result?,
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match tokio::time::timeout(self.timeout, response.text()).await {
            Ok(Ok(body)) => body,
            _ => String::new(),
        };
        tracing::debug!("{} {} returned {}: {}", options.method, url, status, body);
        Err(KiroError::from_status(status, &body))
    }

    /// Aborts in-flight requests and resets the status to disconnected.
    pub async fn disconnect(&self) {
        std::mem::take(&mut *self.session()).cancel();
        let cancelled = self.pool.cancel_all();
        if cancelled > 0 {
            tracing::info!("Cancelled {} in-flight request(s)", cancelled);
        }
        *self.status.write().await = ConnectionStatus::default();
    }

    pub async fn is_connected(&self) -> bool {
        self.status.read().await.connected
    }

    /// Copy of the current status.
    pub async fn status(&self) -> ConnectionStatus {
        self.status.read().await.clone()
    }

    pub fn in_flight(&self) -> usize {
        self.pool.len()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    fn session(&self) -> MutexGuard<'_, CancellationToken> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
