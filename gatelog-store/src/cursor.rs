use crate::driver::{LogStore, QueryPattern, StartKey};
use gatelog_core::error::GatelogError;
use gatelog_core::record::LogRecord;
use std::sync::Arc;
use tracing::debug;

/// Stateful paginated cursor over one access pattern.
///
/// Both the CSV export loop and the metrics aggregation drive cursors with
/// identical semantics, so pagination lives here instead of being inlined at
/// each call site. A cursor instance is owned by a single caller; it is not
/// meant to be shared across tasks.
pub struct LogCursor {
    store: Arc<dyn LogStore>,
    pattern: QueryPattern,
    resume: Option<StartKey>,
    exhausted: bool,
}

impl LogCursor {
    pub fn new(store: Arc<dyn LogStore>, pattern: QueryPattern) -> Self {
        Self {
            store,
            pattern,
            resume: None,
            exhausted: false,
        }
    }

    /// Fetch the next page: up to `limit` records plus a further-data flag.
    ///
    /// Once the store reports no further pages the session is exhausted and
    /// every subsequent call returns `(empty, false)` without contacting the
    /// store. A query error leaves the cursor untouched, so retrying repeats
    /// the same logical page boundary.
    pub async fn next(&mut self, limit: usize) -> Result<(Vec<LogRecord>, bool), GatelogError> {
        if self.exhausted {
            return Ok((Vec::new(), false));
        }

        let page = self
            .store
            .query_page(&self.pattern, limit, self.resume.as_ref())
            .await?;

        if !page.has_more {
            self.exhausted = true;
            self.resume = None;
            debug!(pattern = self.pattern.key_value(), "Cursor exhausted");
        } else if let Some(last) = page.records.last() {
            // Resume from the last decoded record, not the store's raw key
            self.resume = Some(StartKey::from_record(last, &self.pattern));
        }

        Ok((page.records, page.has_more))
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn pattern(&self) -> &QueryPattern {
        &self.pattern
    }
}
