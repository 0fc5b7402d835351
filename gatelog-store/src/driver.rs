use async_trait::async_trait;
use gatelog_core::error::GatelogError;
use gatelog_core::record::LogRecord;
use serde::{Deserialize, Serialize};

/// The two access patterns the store supports. Fixed at cursor construction;
/// the key condition never changes mid-session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPattern {
    /// Partition-key equality on `service_id` against the primary table.
    ByService(String),
    /// Key equality on `consumer_id` against the consumer secondary index.
    ByConsumer(String),
}

impl QueryPattern {
    pub fn key_field(&self) -> &'static str {
        match self {
            QueryPattern::ByService(_) => "service_id",
            QueryPattern::ByConsumer(_) => "consumer_id",
        }
    }

    pub fn key_value(&self) -> &str {
        match self {
            QueryPattern::ByService(v) | QueryPattern::ByConsumer(v) => v,
        }
    }

    pub fn uses_consumer_index(&self) -> bool {
        matches!(self, QueryPattern::ByConsumer(_))
    }
}

/// Resume point for a paginated query, derived from the last record of the
/// previous page rather than the store's raw low-level key.
///
/// `consumer_id` is present only for cursors produced while traversing the
/// consumer index; a cursor is valid only for the pattern that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartKey {
    pub service_id: String,
    pub started_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
}

impl StartKey {
    /// Build the resume key for `pattern` from the last decoded record of a
    /// page.
    pub fn from_record(record: &LogRecord, pattern: &QueryPattern) -> Self {
        Self {
            service_id: record.service_id.clone(),
            started_at: record.started_at,
            consumer_id: match pattern {
                QueryPattern::ByService(_) => None,
                QueryPattern::ByConsumer(_) => Some(record.consumer_id.clone()),
            },
        }
    }
}

/// One page of a paginated query. `has_more` mirrors the store's
/// further-data indicator (e.g. a last-evaluated key being present).
#[derive(Debug, Default)]
pub struct QueryPage {
    pub records: Vec<LogRecord>,
    pub has_more: bool,
}

/// Capability interface over the backing store. The pipeline only needs
/// batch writes and the two fixed paginated access patterns, so the core
/// stays testable against an in-memory implementation.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Durably persist a batch of records keyed by (service_id, started_at).
    async fn add_batch(&self, records: &[LogRecord]) -> Result<(), GatelogError>;

    /// Fetch up to `limit` records for `pattern`, resuming after `start_key`
    /// when present.
    async fn query_page(
        &self,
        pattern: &QueryPattern,
        limit: usize,
        start_key: Option<&StartKey>,
    ) -> Result<QueryPage, GatelogError>;
}
