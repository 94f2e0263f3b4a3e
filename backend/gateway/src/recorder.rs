//! Long-running background task that writes engine events to the database.
//!
//! Handlers drain the engine's event log while they still hold the engine
//! lock and push the batch onto an unbounded channel, so batches arrive here
//! in the order the engine emitted them.

use sqlx::SqlitePool;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info};

use crate::db;
use crate::events::NewEvent;

pub type EventBatch = Vec<NewEvent>;

/// Spawn the recorder loop as a background [`tokio`] task. Returns once
/// every sender has been dropped and the channel is empty.
pub async fn run(pool: SqlitePool, mut batches: UnboundedReceiver<EventBatch>) {
    info!("Event recorder starting");

    while let Some(batch) = batches.recv().await {
        match db::insert_events(&pool, &batch).await {
            Ok(inserted) => debug!("Recorded {inserted} events"),
            Err(e) => error!("Event recorder write error ({} events lost): {e}", batch.len()),
        }
    }

    info!("Event recorder stopped");
}
