//! Price-feed client — fetches the payment currency's USD price.
//!
//! The feed answers `GET {ORACLE_URL}` with an aggregator-style body:
//!
//! ```json
//! { "answer": "200000000000", "decimals": 8, "updatedAt": 1704067200 }
//! ```
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the feed returns a rate-limit
//!   response or the request hits a transport error, up to
//!   [`MAX_BACKOFF`].
//! * Any other non-2xx status fails at once.
//! * After `max_retries` retries the request fails with
//!   [`GatewayError::Oracle`]; nothing is cached between calls.

use std::time::Duration;

use reach_token::{FixedPoint, OracleReading};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{GatewayError, Result};

const MAX_BACKOFF: Duration = Duration::from_secs(60);
const INITIAL_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    /// Integer answer, as a JSON number or decimal string
    pub answer: Value,
    pub decimals: u32,
    pub updated_at: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum OracleSource {
    Http {
        client: Client,
        url: String,
        max_retries: u32,
    },
    Static(FixedPoint),
}

impl OracleSource {
    /// Fetch a fresh reading.
    pub async fn fetch_reading(&self) -> Result<OracleReading> {
        match self {
            OracleSource::Static(price) => Ok(OracleReading {
                price: *price,
                timestamp: chrono::Utc::now().timestamp().max(0) as u64,
            }),
            OracleSource::Http {
                client,
                url,
                max_retries,
            } => fetch_feed(client, url, *max_retries, INITIAL_BACKOFF).await,
        }
    }
}

async fn fetch_feed(
    client: &Client,
    url: &str,
    max_retries: u32,
    initial_backoff: Duration,
) -> Result<OracleReading> {
    let mut backoff = initial_backoff;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let failure = match client.get(url).send().await {
            Err(e) => e.to_string(),
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    "rate-limited".to_string()
                } else if !status.is_success() {
                    return Err(GatewayError::Oracle(format!("feed returned {status}")));
                } else {
                    let body: FeedResponse = resp.json().await?;
                    let reading = decode_reading(&body)?;
                    debug!(price = %reading.price, updated_at = reading.timestamp, "oracle reading fetched");
                    return Ok(reading);
                }
            }
        };

        if attempt > max_retries {
            return Err(GatewayError::Oracle(format!(
                "feed unavailable after {attempt} attempts: {failure}"
            )));
        }
        warn!("Price feed request failed (will retry in {backoff:?}): {failure}");
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Turn a feed body into an [`OracleReading`]. Negative, zero or
/// non-integer answers are rejected.
pub fn decode_reading(body: &FeedResponse) -> Result<OracleReading> {
    let raw = match &body.answer {
        Value::String(s) => s.parse::<u128>().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
    .ok_or_else(|| GatewayError::Oracle(format!("invalid feed answer: {}", body.answer)))?;

    let price = FixedPoint::from_scaled(raw, body.decimals)?;
    if price.is_zero() {
        return Err(GatewayError::Oracle("feed answered zero".to_string()));
    }
    Ok(OracleReading {
        price,
        timestamp: body.updated_at.unwrap_or(0),
    })
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
