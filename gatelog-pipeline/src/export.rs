use crate::metrics::{LatencySummary, METRICS_COLUMNS};
use crate::writer::CsvExportWriter;
use gatelog_core::config::ExportConfig;
use gatelog_core::error::GatelogError;
use gatelog_core::record::EXPORT_COLUMNS;
use gatelog_store::cursor::LogCursor;
use gatelog_store::driver::{LogStore, QueryPattern};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Cursor-driven export of stored records to CSV files.
pub struct ExportService {
    store: Arc<dyn LogStore>,
    config: ExportConfig,
}

impl ExportService {
    pub fn new(store: Arc<dyn LogStore>, config: ExportConfig) -> Self {
        Self { store, config }
    }

    /// Export every record for one service id. Returns the file path.
    pub async fn export_by_service(&self, service: &str) -> Result<PathBuf, GatelogError> {
        self.export_records("service", QueryPattern::ByService(service.to_string()))
            .await
    }

    /// Export every record for one consumer id via the secondary index.
    pub async fn export_by_consumer(&self, consumer: &str) -> Result<PathBuf, GatelogError> {
        self.export_records("consumer", QueryPattern::ByConsumer(consumer.to_string()))
            .await
    }

    /// Drain a by-service query and write one latency-averages summary row.
    ///
    /// A service with no records yields [`GatelogError::NoData`]; no file is
    /// created in that case.
    pub async fn export_metrics_by_service(&self, service: &str) -> Result<PathBuf, GatelogError> {
        let mut cursor = LogCursor::new(
            Arc::clone(&self.store),
            QueryPattern::ByService(service.to_string()),
        );
        let mut summary = LatencySummary::default();

        loop {
            let (records, has_more) = cursor.next(self.config.page_size).await?;
            if records.is_empty() {
                break;
            }
            summary.observe_page(&records);
            if !has_more {
                break;
            }
        }

        let row = summary
            .to_row(service)
            .ok_or_else(|| GatelogError::NoData(service.to_string()))?;

        let mut writer = CsvExportWriter::create(&self.config.output_dir, "metrics", service)?;
        writer.write_header(&METRICS_COLUMNS)?;
        writer.write_row(&row)?;

        info!(
            path = %writer.path().display(),
            records = summary.count(),
            "Metrics export complete"
        );
        Ok(writer.path().to_path_buf())
    }

    async fn export_records(
        &self,
        kind: &str,
        pattern: QueryPattern,
    ) -> Result<PathBuf, GatelogError> {
        let mut writer =
            CsvExportWriter::create(&self.config.output_dir, kind, pattern.key_value())?;
        writer.write_header(&EXPORT_COLUMNS)?;

        let mut cursor = LogCursor::new(Arc::clone(&self.store), pattern);
        let mut exported = 0usize;

        loop {
            let (records, has_more) = cursor.next(self.config.page_size).await?;
            // Stop on an empty page even if the store claimed more data
            if records.is_empty() {
                break;
            }
            writer.write_page(&records)?;
            exported += records.len();
            if !has_more {
                break;
            }
        }

        info!(path = %writer.path().display(), records = exported, "Export complete");
        Ok(writer.path().to_path_buf())
    }
}
