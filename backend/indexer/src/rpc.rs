//! Soroban RPC client: polls `getEvents` and decodes campaign ledger events.
//!
//! Network failures, HTTP 429 and soft JSON-RPC errors are retried with a
//! doubling delay; malformed-request errors are returned to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{CampaignEvent, EventKind};
use crate::xdr;

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

/// One entry of `getEvents.events`.
///
/// Topics arrive either as JSON-wrapped `ScVal`s or as base64 XDR, depending
/// on the RPC's `xdrFormat`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub topic: Vec<String>,
    pub value: Value,
    pub contract_id: Option<String>,
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    pub ledger_closed_at: Option<String>,
    pub in_successful_contract_call: Option<bool>,
    #[allow(dead_code)]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Fetching
// ─────────────────────────────────────────────────────────

/// Doubling retry delay, capped at [`MAX_BACKOFF_SECS`].
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self, reason: &str) {
        warn!("{reason}; retrying in {}s", self.secs);
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

/// A page of `getEvents` output: `(events, next_cursor, latest_ledger)`.
pub type EventPage = (Vec<RawEvent>, Option<String>, Option<u64>);

/// JSON-RPC codes that retrying cannot fix.
fn is_hard_rpc_error(code: i64) -> bool {
    matches!(code, -32600 | -32601)
}

/// Fetch one page of contract events, retrying transient failures.
///
/// With a `cursor` the request continues a previous page; otherwise it scans
/// from `start_ledger`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });
    let mut backoff = Backoff::new();

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                backoff.wait(&format!("RPC request failed: {e}")).await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            backoff.wait("Rate-limited by RPC").await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;
        if let Some(err) = body.error {
            if is_hard_rpc_error(err.code) {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            backoff
                .wait(&format!("RPC error {}: {}", err.code, err.message))
                .await;
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::EventParse("getEvents returned no result".to_string()))?;
        debug!(
            count = result.events.len(),
            latest_ledger = ?result.latest_ledger,
            "Fetched event page"
        );
        return Ok((result.events, result.cursor, result.latest_ledger));
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`CampaignEvent`] structs.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<CampaignEvent> {
    raw.iter()
        .enumerate()
        .filter_map(|(idx, e)| decode_single(e, idx, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, idx: usize, contract_id: &str) -> Option<CampaignEvent> {
    if raw.in_successful_contract_call == Some(false) {
        return None;
    }

    // Leading topic symbol determines the event type.
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let payload = decode_payload(&raw.value);

    // Second topic is the acting address; fall back to the payload.
    let actor = raw
        .topic
        .get(1)
        .map(|t| extract_topic_value(t))
        .or_else(|| decode_actor(&payload, &kind));
    let amount = decode_amount(&payload, &kind);
    if amount.is_none() && kind.total_delta_sign().is_some() {
        warn!(
            event_id = ?raw.id,
            kind = kind.as_str(),
            "Could not decode amount from event value"
        );
    }

    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{ledger}-{}-{idx}",
            raw.tx_hash.as_deref().unwrap_or("notx")
        )
    });

    Some(CampaignEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        actor,
        amount,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

fn decode_actor(value: &Value, kind: &EventKind) -> Option<String> {
    match kind {
        EventKind::ContributionReceived
        | EventKind::ContributionRefunded
        | EventKind::ContributionReset
        | EventKind::ContributionWithdrawn => extract_field(value, &["contributor", "address"]),
        EventKind::Unknown => None,
        _ => extract_field(value, &["owner", "address"]),
    }
}

/// Pull the amount relevant to `kind` out of the JSON `value` blob.
fn decode_amount(value: &Value, kind: &EventKind) -> Option<String> {
    match kind {
        EventKind::CampaignInitialized | EventKind::GoalUpdated => {
            extract_field(value, &["goal"])
        }
        EventKind::MinimumUpdated => extract_field(value, &["minimum_contribution"]),
        EventKind::ContributionReceived
        | EventKind::ContributionRefunded
        | EventKind::ContributionReset
        | EventKind::ContributionWithdrawn
        | EventKind::ExcessWithdrawn => extract_field(value, &["amount"]),
        EventKind::CampaignOpened | EventKind::CampaignClosed | EventKind::Unknown => None,
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(key) {
            let s = match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            };
            if s.is_some() {
                return s;
            }
        }
    }
    None
}

/// Event data as JSON: base64 XDR values are decoded, JSON passes through.
fn decode_payload(value: &Value) -> Value {
    match value {
        Value::String(raw) => match xdr::decode_base64(raw) {
            Ok(decoded) => decoded.to_json(),
            Err(e) => {
                debug!("Event value is not XDR: {e}");
                value.clone()
            }
        },
        other => other.clone(),
    }
}

/// Text inside a JSON-wrapped `ScVal`, e.g. `{"type":"symbol","value":"contrib"}`
/// or `{"address":"G…"}`.
fn json_topic_text(raw: &str) -> Option<String> {
    let v = serde_json::from_str::<Value>(raw).ok()?;
    ["value", "symbol", "address", "string"]
        .iter()
        .find_map(|key| v.get(key).and_then(Value::as_str))
        .map(String::from)
}

/// Extract a Soroban Symbol from a topic entry.
///
/// The RPC may return a JSON-wrapped `ScVal`, a base64 XDR `ScVal`, or just
/// the raw string.
fn extract_symbol(raw: &str) -> String {
    if let Some(s) = json_topic_text(raw) {
        return s;
    }
    xdr::decode_base64(raw)
        .ok()
        .and_then(|value| value.as_symbol().map(String::from))
        .unwrap_or_else(|| raw.to_string())
}

/// Textual value of a non-leading topic: an address strkey in practice.
fn extract_topic_value(raw: &str) -> String {
    if let Some(s) = json_topic_text(raw) {
        return s;
    }
    xdr::decode_base64(raw)
        .ok()
        .and_then(|value| value.as_text().map(String::from))
        .unwrap_or_else(|| raw.to_string())
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    use chrono::DateTime;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
