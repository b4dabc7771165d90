use std::sync::Arc;
use tokio_postgres::{Client, NoTls};
use tracing::{error, info};

use crate::Result;

/// A regular (non-replication) client plus the task driving its socket.
///
/// `test_decoding` changes are read through SQL functions, so no
/// `replication=database` connection is needed.
pub struct PgConnection {
    client: Arc<Client>,
    connection_task: tokio::task::JoinHandle<()>,
}

impl PgConnection {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL");

        let config = connection_string.parse::<tokio_postgres::Config>()?;
        let (client, connection) = config.connect(NoTls).await?;

        let connection_task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Connection error: {}", e);
            }
        });

        info!("Successfully connected to PostgreSQL");

        Ok(Self {
            client: Arc::new(client),
            connection_task,
        })
    }

    pub fn client(&self) -> Arc<Client> {
        Arc::clone(&self.client)
    }

    pub fn close(self) {
        info!("Closing PostgreSQL connection");
        drop(self.client);
        self.connection_task.abort();
    }
}
