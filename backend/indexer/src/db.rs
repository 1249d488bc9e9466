//! SQLite persistence: pool setup, the resume cursor, event writes and the
//! read models behind the REST API.

use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{CampaignEvent, EventKind, EventRecord};

const MAX_CONNECTIONS: u32 = 5;

/// Open (creating if needed) the SQLite database and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    connect(&url, MAX_CONNECTIONS).await
}

pub(crate) async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor
// ─────────────────────────────────────────────────────────

/// Last ledger the poller finished, `0` if it has never run.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Pagination cursor from the last `getEvents` page, if one was saved.
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Writes
// ─────────────────────────────────────────────────────────

/// Store a batch of decoded events inside one transaction.
///
/// `event_id` is unique, so re-polling an overlapping ledger range is a
/// no-op. Returns the number of rows actually inserted.
pub async fn insert_events(pool: &SqlitePool, events: &[CampaignEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, actor, amount, ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Reads
// ─────────────────────────────────────────────────────────

pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_id, event_type, actor, amount, ledger, timestamp,
               contract_id, tx_hash, created_at
        FROM   events
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Events whose actor (contributor or owner) is `actor`, ledger ascending.
pub async fn get_events_for_actor(pool: &SqlitePool, actor: &str) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_id, event_type, actor, amount, ledger, timestamp,
               contract_id, tx_hash, created_at
        FROM   events
        WHERE  actor = ?1
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .bind(actor)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Aggregate view of everything indexed so far.
///
/// Amounts are decimal strings so `u128` values survive JSON clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignStats {
    pub event_count: usize,
    pub counts: BTreeMap<&'static str, usize>,
    pub contributor_count: usize,
    pub total_received: String,
    pub total_released: String,
    pub total_excess_withdrawn: String,
    /// `received - released - excess`, floored at zero when the index
    /// started mid-campaign.
    pub net_contributed: String,
    /// Value-moving events stored without an amount. Non-zero means the
    /// totals above are incomplete.
    pub undecoded: usize,
    pub last_ledger: i64,
}

pub async fn get_stats(pool: &SqlitePool) -> Result<CampaignStats> {
    let events = get_all_events(pool).await?;
    summarise(&events)
}

/// Fold stored events into [`CampaignStats`].
pub fn summarise(events: &[EventRecord]) -> Result<CampaignStats> {
    let mut counts = BTreeMap::new();
    let mut contributors = HashSet::new();
    let mut received: u128 = 0;
    let mut released: u128 = 0;
    let mut excess: u128 = 0;
    let mut undecoded = 0usize;
    let mut last_ledger = 0i64;

    for ev in events {
        let kind = EventKind::from_stored(&ev.event_type);
        *counts.entry(kind.as_str()).or_insert(0) += 1;
        last_ledger = last_ledger.max(ev.ledger);

        if kind == EventKind::ContributionReceived {
            if let Some(actor) = &ev.actor {
                contributors.insert(actor.as_str());
            }
        }

        let Some(sign) = kind.total_delta_sign() else {
            continue;
        };
        let Some(amount) = parse_amount(ev)? else {
            warn!(
                event_id = %ev.event_id,
                event_type = %ev.event_type,
                "Skipping event with no amount in stats"
            );
            undecoded += 1;
            continue;
        };
        let (bucket, label) = match (sign, kind) {
            (1, _) => (&mut received, "received"),
            (_, EventKind::ExcessWithdrawn) => (&mut excess, "excess"),
            _ => (&mut released, "released"),
        };
        *bucket = bucket
            .checked_add(amount)
            .ok_or(IndexerError::AmountOverflow(label))?;
    }

    let net = received.saturating_sub(released).saturating_sub(excess);

    Ok(CampaignStats {
        event_count: events.len(),
        counts,
        contributor_count: contributors.len(),
        total_received: received.to_string(),
        total_released: released.to_string(),
        total_excess_withdrawn: excess.to_string(),
        net_contributed: net.to_string(),
        undecoded,
        last_ledger,
    })
}

/// `None` when the event was stored without an amount.
fn parse_amount(ev: &EventRecord) -> Result<Option<u128>> {
    let Some(raw) = ev.amount.as_deref() else {
        return Ok(None);
    };
    raw.parse().map(Some).map_err(|_| IndexerError::InvalidAmount {
        event_id: ev.event_id.clone(),
        value: raw.to_string(),
    })
}
