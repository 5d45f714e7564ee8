//! Long-running background task that polls the Soroban RPC and writes
//! decoded crowdfund events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db::{self, Cursor};
use crate::errors::Result;
use crate::rpc::{self, EventPage};

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Poll until `shutdown` is cancelled. An in-flight poll (including its RPC
/// back-off) is abandoned on cancellation.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!(contract = %state.config.contract_id, "Indexer starting");

    let mut cursor = resume_cursor(&state.pool, state.config.start_ledger).await;
    info!(ledger = cursor.last_ledger, "Resuming");

    loop {
        let polled = tokio::select! {
            _ = shutdown.cancelled() => break,
            polled = poll_once(&state, &cursor) => polled,
        };
        match polled {
            Ok(next) => cursor = next,
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!("Indexer stopped");
}

/// The saved cursor if a previous run got past ledger 0, otherwise
/// `start_ledger`.
async fn resume_cursor(pool: &SqlitePool, start_ledger: u32) -> Cursor {
    let fresh = Cursor {
        last_ledger: i64::from(start_ledger),
        last_cursor: None,
    };
    match db::load_cursor(pool).await {
        Ok(saved) if saved.last_ledger > 0 => saved,
        Ok(_) => fresh,
        Err(e) => {
            error!("Could not load cursor, starting from configured ledger: {e}");
            fresh
        }
    }
}

async fn poll_once(state: &IndexerState, cursor: &Cursor) -> Result<Cursor> {
    let start_ledger = u32::try_from(cursor.last_ledger).unwrap_or(u32::MAX);
    let page = rpc::fetch_events(
        &state.client,
        &state.config.rpc_url,
        &state.config.contract_id,
        start_ledger,
        cursor.last_cursor.as_deref(),
        state.config.events_per_page,
    )
    .await?;

    store_page(&state.pool, &state.config.contract_id, cursor, page).await
}

/// Store one page and persist the advanced cursor. The cursor is left
/// untouched if the insert fails, so the page is fetched again.
async fn store_page(
    pool: &SqlitePool,
    contract_id: &str,
    cursor: &Cursor,
    page: EventPage,
) -> Result<Cursor> {
    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            raw = page.events.len(),
            stored = inserted,
            "Polled events"
        );
    }

    let next = advance(cursor, &page);
    db::save_cursor(pool, &next).await?;
    Ok(next)
}

/// Take the page's pagination cursor; the ledger only moves forward.
fn advance(cursor: &Cursor, page: &EventPage) -> Cursor {
    let latest = page
        .latest_ledger
        .and_then(|l| i64::try_from(l).ok())
        .unwrap_or(cursor.last_ledger);
    Cursor {
        last_ledger: latest.max(cursor.last_ledger),
        last_cursor: page.cursor.clone(),
    }
}
