use crate::driver::{LogStore, QueryPage, QueryPattern, StartKey};
use async_trait::async_trait;
use gatelog_core::error::GatelogError;
use gatelog_core::record::LogRecord;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::sync::RwLock;
use tracing::debug;

/// In-memory log store with the same key semantics as the DynamoDB table:
/// a primary key of (service_id, started_at) — same-key puts overwrite —
/// plus a secondary index ordered by (consumer_id, started_at). Like a GSI,
/// the index key need not be unique, so it carries the primary service_id
/// as a tiebreaker: two services logging one consumer in the same second
/// keep distinct entries.
///
/// Backs every test in the workspace and serves as the no-infrastructure
/// store for local runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    primary: BTreeMap<(String, i64), LogRecord>,
    by_consumer: BTreeMap<(String, i64, String), (String, i64)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records held (test helper).
    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.primary.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn add_batch(&self, records: &[LogRecord]) -> Result<(), GatelogError> {
        let mut tables = self
            .inner
            .write()
            .map_err(|_| GatelogError::StoreWrite("store lock poisoned".into()))?;

        for record in records {
            let key = (record.service_id.clone(), record.started_at);
            if let Some(previous) = tables.primary.insert(key.clone(), record.clone()) {
                // Overwrite: drop only the superseded index entry
                tables.by_consumer.remove(&(
                    previous.consumer_id,
                    previous.started_at,
                    record.service_id.clone(),
                ));
            }
            if !record.consumer_id.is_empty() {
                tables.by_consumer.insert(
                    (
                        record.consumer_id.clone(),
                        record.started_at,
                        record.service_id.clone(),
                    ),
                    key,
                );
            }
        }
        debug!(count = records.len(), "Batch written to memory store");
        Ok(())
    }

    async fn query_page(
        &self,
        pattern: &QueryPattern,
        limit: usize,
        start_key: Option<&StartKey>,
    ) -> Result<QueryPage, GatelogError> {
        let tables = self
            .inner
            .read()
            .map_err(|_| GatelogError::StoreQuery("store lock poisoned".into()))?;

        let partition = pattern.key_value().to_string();
        let mut records = Vec::new();
        let mut has_more = false;

        match pattern {
            QueryPattern::ByService(_) => {
                let lower = match start_key {
                    Some(key) => Excluded((partition.clone(), key.started_at)),
                    None => Included((partition.clone(), i64::MIN)),
                };
                for (key, record) in tables.primary.range((lower, Unbounded)) {
                    if key.0 != partition {
                        break;
                    }
                    if records.len() == limit {
                        has_more = true;
                        break;
                    }
                    records.push(record.clone());
                }
            }
            QueryPattern::ByConsumer(_) => {
                // Resume keys carry the table key, so the position within a
                // shared timestamp is exact.
                let lower = match start_key {
                    Some(key) => {
                        Excluded((partition.clone(), key.started_at, key.service_id.clone()))
                    }
                    None => Included((partition.clone(), i64::MIN, String::new())),
                };
                for (key, primary_key) in tables.by_consumer.range((lower, Unbounded)) {
                    if key.0 != partition {
                        break;
                    }
                    if records.len() == limit {
                        has_more = true;
                        break;
                    }
                    if let Some(record) = tables.primary.get(primary_key) {
                        records.push(record.clone());
                    }
                }
            }
        }

        Ok(QueryPage { records, has_more })
    }
}
