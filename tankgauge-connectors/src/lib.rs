//! Cloud uplink for the tankgauge monitor
//!
//! One transport is in scope: HTTPS to an Adafruit-IO-style feed API. The
//! device is duty-cycled, so there is nothing to keep alive between wakes —
//! every report is a cold POST bounded by a request timeout, and a failed
//! report simply waits for the next wake.
//!
//! The interesting policy lives in [`aio::AioClient`]: a 404 on the data
//! endpoint means the feed does not exist yet, which triggers exactly one
//! feed-creation call and one retry of the original post. Everything else
//! non-200 is a failed report, not an error.
//!
//! The HTTP wire itself sits behind the [`aio::HttpExchange`] seam so the
//! retry policy is testable without a network; [`aio::UreqExchange`] is the
//! production implementation.
//!
//! ## Example
//!
//! ```no_run
//! use tankgauge_connectors::aio::{AioClient, AioConfig, UreqExchange};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AioConfig::new("gauge-owner", "aio_key_here");
//! let mut client = AioClient::new(config, UreqExchange::new())?;
//!
//! if client.post_value("oil-tank-depth", 87.5)? {
//!     println!("reported");
//! }
//! # Ok(())
//! # }
//! ```

pub mod aio;

pub use aio::{AioClient, AioConfig, AioError, AioUplink, FeedNames, UreqExchange};

use thiserror::Error;

/// Transport-level failures: DNS, TCP, TLS, timeout.
///
/// These never escape a report attempt as a crash — the client maps them to
/// a failed report and the next wake retries.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced an HTTP response
    #[error("request failed: {0}")]
    Request(String),
}

/// Counters across one process lifetime (one wake cycle).
#[derive(Debug, Default, Clone)]
pub struct ReportStats {
    /// Values accepted by the feed API
    pub values_sent: u64,
    /// Value posts that failed for any reason
    pub values_failed: u64,
    /// Feeds auto-created after a 404
    pub feeds_created: u32,
    /// Diagnostic notes accepted by the error feed
    pub notes_sent: u64,
}
