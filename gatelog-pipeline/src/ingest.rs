use gatelog_core::config::IngestConfig;
use gatelog_core::error::GatelogError;
use gatelog_core::record::{LogRecord, decode_line};
use gatelog_store::driver::LogStore;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Batch ingestor for newline-delimited JSON access logs.
///
/// The read loop is single-threaded (input order matters within a batch),
/// but every full batch is dispatched as an independent task so reading the
/// next line never blocks on a prior write. Dispatches are fire-and-forget:
/// a failed batch write is logged and lost. The only synchronization point
/// is the join-all barrier after the input is exhausted.
pub struct BatchIngestor {
    store: Arc<dyn LogStore>,
    config: IngestConfig,
}

/// Totals for a completed parse. `dispatched` counts records handed to the
/// store; a dropped trailing batch makes it smaller than `read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub read: usize,
    pub dispatched: usize,
}

impl BatchIngestor {
    pub fn new(store: Arc<dyn LogStore>, config: IngestConfig) -> Self {
        Self { store, config }
    }

    /// Parse `path` line by line, dispatching full batches to the store.
    ///
    /// A blank line is treated as end-of-stream, not an error. A malformed
    /// line aborts the whole parse. Returns once every dispatched write has
    /// completed.
    pub async fn parse(&self, path: &Path) -> Result<IngestSummary, GatelogError> {
        let file = File::open(path).await?;
        let mut lines = BufReader::new(file).lines();

        let mut batch: Vec<LogRecord> = Vec::with_capacity(self.config.batch_size);
        let mut in_flight: JoinSet<()> = JoinSet::new();
        let mut read = 0usize;
        let mut dispatched = 0usize;

        while let Some(line) = lines.next_line().await? {
            if line.is_empty() {
                break;
            }

            batch.push(decode_line(&line)?);
            read += 1;

            if batch.len() >= self.config.batch_size {
                let full = std::mem::replace(
                    &mut batch,
                    Vec::with_capacity(self.config.batch_size),
                );
                dispatched += full.len();
                self.dispatch(full, &mut in_flight);
            }
        }

        if !batch.is_empty() {
            if self.config.flush_trailing {
                dispatched += batch.len();
                self.dispatch(batch, &mut in_flight);
            } else {
                debug!(count = batch.len(), "Dropping trailing sub-threshold batch");
            }
        }

        // Join-all barrier: do not report success while writes are in flight
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Batch write task panicked");
            }
        }

        info!(path = %path.display(), read, dispatched, "Ingest finished");
        Ok(IngestSummary { read, dispatched })
    }

    fn dispatch(&self, batch: Vec<LogRecord>, in_flight: &mut JoinSet<()>) {
        let store = Arc::clone(&self.store);
        in_flight.spawn(async move {
            let count = batch.len();
            if let Err(e) = store.add_batch(&batch).await {
                // Fire-and-forget policy: a failed batch is a lost batch
                error!(error = %e, count, "Batch write failed, records lost");
            } else {
                debug!(count, "Batch write completed");
            }
        });
    }
}
