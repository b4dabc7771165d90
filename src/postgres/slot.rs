use tokio_postgres::Client;
use tracing::{info, warn};

use crate::Result;

/// The output plugin every slot is created with.
pub const OUTPUT_PLUGIN: &str = "test_decoding";

const CHECK_SLOT: &str = "SELECT count(1) FROM pg_replication_slots WHERE slot_name = $1";
const CREATE_SLOT: &str =
    "SELECT slot_name::text, lsn::text FROM pg_create_logical_replication_slot($1, 'test_decoding')";
const DROP_SLOT: &str = "SELECT pg_drop_replication_slot($1)";

/// A logical replication slot decoded with `test_decoding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationSlot {
    name: String,
}

impl ReplicationSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn exists(&self, client: &Client) -> Result<bool> {
        let row = client.query_one(CHECK_SLOT, &[&self.name]).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count > 0)
    }

    /// Creates the slot unless it is already there.
    pub async fn ensure(&self, client: &Client) -> Result<()> {
        if self.exists(client).await? {
            info!("Replication slot '{}' already exists", self.name);
            return Ok(());
        }

        let row = client.query_one(CREATE_SLOT, &[&self.name]).await?;
        let lsn: Option<String> = row.try_get(1)?;
        info!(
            slot = %self.name,
            plugin = OUTPUT_PLUGIN,
            lsn = lsn.as_deref().unwrap_or("unknown"),
            "Created replication slot"
        );
        Ok(())
    }

    /// Drops the slot; a slot that is already gone is not an error.
    pub async fn remove(&self, client: &Client) -> Result<()> {
        if !self.exists(client).await? {
            warn!("Replication slot '{}' does not exist", self.name);
            return Ok(());
        }

        client.execute(DROP_SLOT, &[&self.name]).await?;
        info!("Dropped replication slot '{}'", self.name);
        Ok(())
    }
}
