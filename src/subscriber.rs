//! The polling loop that turns a replication slot into a stream of decoded
//! records.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, trace, warn};

use crate::config::{ParseFailurePolicy, SubscriptionConfig};
use crate::postgres::{ChangeRecord, ChangeSource};
use crate::test_decoding::parse;
use crate::{Error, Result};

/// Counters reported when a subscription ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriberStats {
    pub batches: u64,
    pub records: u64,
    pub skipped: u64,
}

pub struct Subscriber<S> {
    source: S,
    poll_interval: Duration,
    on_parse_failure: ParseFailurePolicy,
    stats: SubscriberStats,
}

impl<S: ChangeSource> Subscriber<S> {
    pub fn new(source: S, config: &SubscriptionConfig) -> Self {
        Self {
            source,
            poll_interval: config.poll_interval(),
            on_parse_failure: config.on_parse_failure,
            stats: SubscriberStats::default(),
        }
    }

    pub fn stats(&self) -> SubscriberStats {
        self.stats
    }

    /// Polls until `shutdown` flips to `true` (or its sender goes away).
    ///
    /// A batch already fetched is always forwarded in full before shutdown
    /// is honoured, since fetching consumes the changes on the server.
    pub async fn run(
        &mut self,
        sink: mpsc::Sender<ChangeRecord>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<SubscriberStats> {
        info!("Subscriber starting");

        while !*shutdown.borrow() {
            let batch = self.source.fetch_changes().await?;
            self.stats.batches += 1;
            debug!(size = batch.len(), "Processing batch");

            for raw in batch {
                match parse(&raw.data) {
                    Ok(message) => {
                        trace!(lsn = %raw.lsn, xid = raw.xid, command = message.command(), "Forwarding record");
                        sink.send(ChangeRecord::new(&raw, message))
                            .await
                            .map_err(|_| Error::ChannelClosed)?;
                        self.stats.records += 1;
                    }
                    Err(failure) => match self.on_parse_failure {
                        ParseFailurePolicy::Abort => {
                            error!(lsn = %raw.lsn, reason = failure.reason, "Undecodable change, stopping");
                            return Err(failure.into());
                        }
                        ParseFailurePolicy::Skip => {
                            warn!(lsn = %raw.lsn, reason = failure.reason, line = %failure.line, "Skipping undecodable change");
                            self.stats.skipped += 1;
                        }
                    },
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.changed() => {}
            }
            if shutdown.has_changed().is_err() {
                break;
            }
        }

        info!(
            batches = self.stats.batches,
            records = self.stats.records,
            skipped = self.stats.skipped,
            "Subscriber stopped"
        );
        Ok(self.stats)
    }
}

/// Runs a [`Subscriber`] on its own task and exposes its output as a stream.
pub fn subscribe<S>(
    source: S,
    config: &SubscriptionConfig,
    shutdown: watch::Receiver<bool>,
) -> (ReceiverStream<ChangeRecord>, JoinHandle<Result<SubscriberStats>>)
where
    S: ChangeSource + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.max_buffer_size.max(1));
    let mut subscriber = Subscriber::new(source, config);
    let handle = tokio::spawn(async move { subscriber.run(tx, shutdown).await });
    (ReceiverStream::new(rx), handle)
}
