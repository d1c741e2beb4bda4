//! Adafruit IO Feed Client
//!
//! ## Overview
//!
//! Reports go to a versioned feed-data endpoint:
//!
//! ```text
//! POST {base_url}{username}/feeds/{feed}/data
//! X-AIO-Key: <key>
//! {"value": 87.5}
//! ```
//!
//! - HTTP 200 is a successful report.
//! - HTTP 404 means the feed does not exist yet: the client issues one
//!   `POST {base_url}{username}/feeds` creation call, and on HTTP 201
//!   retries the original data post exactly once. A creation response
//!   other than 201 fails the report without retrying.
//! - Any other status fails the report; the next scheduled or
//!   hysteresis-triggered wake retries naturally, so there is no backoff
//!   loop here.
//! - Transport failures (DNS, TLS, timeout) are caught and reported as a
//!   failed post, never propagated as a crash.
//!
//! Diagnostics ride the same API on a separate feed via
//! [`AioClient::post_note`]; a note's own failure is logged and swallowed.
//!
//! ## Design Decisions
//!
//! The wire sits behind the [`HttpExchange`] seam. The production
//! implementation is a [`ureq`] agent configured once (timeout, user
//! agent); tests script responses and assert on the exact sequence of
//! requests the retry policy produces.

use serde::Serialize;

use tankgauge_core::config::MonitorConfig;
use tankgauge_core::constants::HTTP_TIMEOUT_SECS;
use tankgauge_core::uplink::{Radio, Uplink};

use crate::{ReportStats, TransportError};

/// Default Adafruit IO API root.
pub const DEFAULT_BASE_URL: &str = "https://io.adafruit.com/api/v2/";

/// Errors surfaced to the caller (misconfiguration only; transport trouble
/// becomes a failed report instead).
#[derive(Debug, thiserror::Error)]
pub enum AioError {
    /// Base URL is not an absolute http(s) URL
    #[error("configuration error: {0}")]
    Config(String),

    /// Username or key is empty; posting is impossible
    #[error("Adafruit IO credentials missing")]
    MissingCredentials,
}

/// Response to one HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, possibly empty
    pub body: String,
}

/// Minimal HTTP seam: one POST, one response.
pub trait HttpExchange {
    /// Execute a POST and return the response, whatever its status.
    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<HttpResponse, TransportError>;
}

/// Production exchange over a [`ureq`] agent.
pub struct UreqExchange {
    agent: ureq::Agent,
}

impl UreqExchange {
    /// Agent with the monitor's timeout and user agent.
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(&format!("tankgauge/{}", tankgauge_core::VERSION))
            .build();
        Self { agent }
    }
}

impl Default for UreqExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpExchange for UreqExchange {
    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.agent.post(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }

        match request.send_string(body) {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string().unwrap_or_default();
                Ok(HttpResponse { status, body })
            }
            // Non-2xx still carries a response; the policy layer judges it.
            Err(ureq::Error::Status(status, resp)) => Ok(HttpResponse {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(t)) => Err(TransportError::Request(t.to_string())),
        }
    }
}

/// Account and endpoint configuration.
#[derive(Debug, Clone)]
pub struct AioConfig {
    /// API root, ending in a slash
    pub base_url: String,
    /// Account name, part of every feed URL
    pub username: String,
    /// API key sent in the `X-AIO-Key` header
    pub key: String,
}

impl AioConfig {
    /// Configuration against the public Adafruit IO API.
    pub fn new(username: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            username: username.into(),
            key: key.into(),
        }
    }

    /// Point at a different API root (self-hosted, test server).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Pull account settings from the monitor configuration.
    pub fn from_monitor(cfg: &MonitorConfig) -> Self {
        Self::new(cfg.aio_username.clone(), cfg.aio_key.clone())
    }
}

/// Body of a feed-creation call.
#[derive(Debug, Serialize)]
struct FeedSpec<'a> {
    name: &'a str,
    key: &'a str,
    description: String,
    visibility: &'a str,
}

/// Feed client implementing the create-on-404 retry policy.
pub struct AioClient<E: HttpExchange> {
    config: AioConfig,
    exchange: E,
    stats: ReportStats,
}

impl<E: HttpExchange> AioClient<E> {
    /// Validate the configuration and build a client.
    pub fn new(config: AioConfig, exchange: E) -> Result<Self, AioError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(AioError::Config(
                "base URL must start with http:// or https://".into(),
            ));
        }
        Ok(Self {
            config,
            exchange,
            stats: ReportStats::default(),
        })
    }

    /// Counters for this process lifetime.
    pub fn stats(&self) -> &ReportStats {
        &self.stats
    }

    /// Post a numeric value to `feed`; `Ok(true)` only on HTTP 200.
    pub fn post_value(&mut self, feed: &str, value: f32) -> Result<bool, AioError> {
        self.post_json(feed, serde_json::json!(value))
    }

    /// Best-effort diagnostic post; its own failure is swallowed.
    pub fn post_note(&mut self, feed: &str, message: &str) {
        match self.post_json(feed, serde_json::json!(message)) {
            Ok(true) => self.stats.notes_sent += 1,
            Ok(false) => log::warn!("failed to report note: {}", message),
            Err(e) => log::warn!("failed to report note ({}): {}", e, message),
        }
    }

    fn post_json(&mut self, feed: &str, value: serde_json::Value) -> Result<bool, AioError> {
        if self.config.username.is_empty() || self.config.key.is_empty() {
            return Err(AioError::MissingCredentials);
        }

        let url = self.data_url(feed);
        let body = serde_json::json!({ "value": value }).to_string();

        log::info!("posting to feed '{}'", feed);
        let sent = match self.send(&url, &body) {
            Some(200) => true,
            Some(404) => {
                log::warn!("feed '{}' not found, creating and retrying", feed);
                self.create_feed(feed) && matches!(self.send(&url, &body), Some(200))
            }
            Some(status) => {
                log::warn!("post to '{}' failed: HTTP {}", feed, status);
                false
            }
            None => false,
        };

        if sent {
            self.stats.values_sent += 1;
        } else {
            self.stats.values_failed += 1;
        }
        Ok(sent)
    }

    /// One POST; `None` when the request never got an HTTP response.
    fn send(&self, url: &str, body: &str) -> Option<u16> {
        let headers = [
            ("X-AIO-Key", self.config.key.as_str()),
            ("Content-Type", "application/json"),
        ];
        match self.exchange.post(url, &headers, body) {
            Ok(resp) => Some(resp.status),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }

    /// `true` when the API answered 201 Created.
    fn create_feed(&mut self, feed: &str) -> bool {
        let spec = FeedSpec {
            name: feed,
            key: feed,
            description: format!("Auto-created {} feed", feed),
            visibility: "public",
        };
        let body = match serde_json::to_string(&spec) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("feed spec encode failed: {}", e);
                return false;
            }
        };

        match self.send(&self.feeds_url(), &body) {
            Some(201) => {
                log::info!("feed '{}' created", feed);
                self.stats.feeds_created += 1;
                true
            }
            Some(status) => {
                log::warn!("feed creation failed: HTTP {}", status);
                false
            }
            None => false,
        }
    }

    fn data_url(&self, feed: &str) -> String {
        format!(
            "{}{}/feeds/{}/data",
            self.config.base_url, self.config.username, feed
        )
    }

    fn feeds_url(&self) -> String {
        format!("{}{}/feeds", self.config.base_url, self.config.username)
    }
}

/// Feed names the uplink posts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedNames {
    /// Primary distance feed
    pub data: String,
    /// Diagnostic feed
    pub error: String,
    /// Battery-level feed, `{data}-{suffix}`
    pub battery: String,
}

impl FeedNames {
    /// Resolve the three feed names from the monitor configuration.
    pub fn from_monitor(cfg: &MonitorConfig) -> Self {
        Self {
            data: cfg.feed.clone(),
            error: cfg.error_feed.clone(),
            battery: format!("{}-{}", cfg.feed, cfg.battery_feed_suffix),
        }
    }
}

/// Adapts [`AioClient`] plus a [`Radio`] to the core uplink capability.
///
/// The radio is brought up lazily on the first send and powered down by the
/// orchestrator at the end of the cycle.
pub struct AioUplink<E: HttpExchange, R: Radio> {
    client: AioClient<E>,
    radio: R,
    feeds: FeedNames,
}

impl<E: HttpExchange, R: Radio> AioUplink<E, R> {
    /// Build the uplink from its parts.
    pub fn new(client: AioClient<E>, radio: R, feeds: FeedNames) -> Self {
        Self {
            client,
            radio,
            feeds,
        }
    }

    /// Counters for this process lifetime.
    pub fn stats(&self) -> &ReportStats {
        self.client.stats()
    }

    fn ensure_up(&mut self) -> bool {
        if self.radio.is_up() {
            return true;
        }
        if self.radio.bring_up() {
            return true;
        }
        log::warn!("could not bring the network link up");
        false
    }

    fn post_or_false(&mut self, feed_kind: &str, feed: &str, cm: f32) -> bool {
        match self.client.post_value(feed, cm) {
            Ok(sent) => sent,
            Err(e) => {
                log::error!("{} report impossible: {}", feed_kind, e);
                false
            }
        }
    }
}

impl<E: HttpExchange, R: Radio> Uplink for AioUplink<E, R> {
    fn send_reading(&mut self, cm: f32) -> bool {
        if !self.ensure_up() {
            return false;
        }
        let feed = self.feeds.data.clone();
        self.post_or_false("distance", &feed, cm)
    }

    fn send_battery(&mut self, percent: f32) -> bool {
        if !self.ensure_up() {
            return false;
        }
        let feed = self.feeds.battery.clone();
        self.post_or_false("battery", &feed, percent)
    }

    fn send_note(&mut self, note: &str) {
        if !self.radio.is_up() {
            return;
        }
        let feed = self.feeds.error.clone();
        self.client.post_note(&feed, note);
    }

    fn online(&self) -> bool {
        self.radio.is_up()
    }

    fn power_down(&mut self) {
        self.radio.shut_down();
    }
}
