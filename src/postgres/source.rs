use std::future::Future;
use std::sync::Arc;
use tokio_postgres::Client;
use tracing::debug;

use super::slot::ReplicationSlot;
use super::types::RawChange;
use crate::{Error, Result};

const GET_CHANGES: &str =
    "SELECT lsn::text, xid::text, data FROM pg_logical_slot_get_changes($1, NULL, $2)";

/// Hands out batches of undecoded change lines.
///
/// Each call consumes what it returns; a later call never repeats a line.
pub trait ChangeSource {
    fn fetch_changes(&mut self) -> impl Future<Output = Result<Vec<RawChange>>> + Send;
}

/// Reads pending changes from a replication slot through SQL.
pub struct PgChangeSource {
    client: Arc<Client>,
    slot: ReplicationSlot,
    max_changes: Option<i32>,
}

impl PgChangeSource {
    pub fn new(client: Arc<Client>, slot: ReplicationSlot, max_changes: Option<u32>) -> Self {
        Self {
            client,
            slot,
            max_changes: max_changes.map(|n| i32::try_from(n).unwrap_or(i32::MAX)),
        }
    }
}

impl ChangeSource for PgChangeSource {
    async fn fetch_changes(&mut self) -> Result<Vec<RawChange>> {
        let rows = self
            .client
            .query(GET_CHANGES, &[&self.slot.name(), &self.max_changes])
            .await?;

        let mut changes = Vec::with_capacity(rows.len());
        for row in rows {
            let xid: String = row.try_get(1)?;
            changes.push(RawChange {
                lsn: row.try_get(0)?,
                xid: xid.parse().map_err(|_| Error::Replication {
                    message: format!("Invalid transaction id: {}", xid),
                })?,
                data: row.try_get(2)?,
            });
        }

        debug!(slot = self.slot.name(), count = changes.len(), "Fetched changes");
        Ok(changes)
    }
}
