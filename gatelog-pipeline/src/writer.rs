use chrono::Utc;
use gatelog_core::error::GatelogError;
use gatelog_core::record::LogRecord;
use std::fs::File;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Semicolon-delimited CSV writer for one export invocation.
///
/// The file name is generated once per invocation with a random suffix, so
/// concurrent or repeated exports of the same filter never contend on one
/// file. Rows hit the file after every page; memory stays bounded by a
/// single page of records. On a write failure the partially written file is
/// left on disk — there is no rollback.
pub struct CsvExportWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    header_written: bool,
}

impl CsvExportWriter {
    /// Create `<kind>-<filter>-<ddMMyyyy>-<random>.csv` under `dir`.
    pub fn create(dir: &Path, kind: &str, filter: &str) -> Result<Self, GatelogError> {
        let path = dir.join(export_file_name(kind, filter));
        let file = File::create_new(&path)?;
        Ok(Self {
            writer: csv::WriterBuilder::new().delimiter(b';').from_writer(file),
            path,
            header_written: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header row. Must be called exactly once, before any rows.
    pub fn write_header(&mut self, columns: &[&str]) -> Result<(), GatelogError> {
        if self.header_written {
            return Err(GatelogError::Output("header already written".into()));
        }
        self.writer
            .write_record(columns)
            .map_err(|e| GatelogError::Output(e.to_string()))?;
        self.writer.flush()?;
        self.header_written = true;
        Ok(())
    }

    /// Append one row per record and flush the page to disk.
    pub fn write_page(&mut self, records: &[LogRecord]) -> Result<(), GatelogError> {
        if !self.header_written {
            return Err(GatelogError::Output("header must be written before rows".into()));
        }
        for record in records {
            self.writer
                .write_record(&record.to_row()?)
                .map_err(|e| GatelogError::Output(e.to_string()))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Append one pre-rendered row (metrics summary) and flush.
    pub fn write_row(&mut self, row: &[String]) -> Result<(), GatelogError> {
        if !self.header_written {
            return Err(GatelogError::Output("header must be written before rows".into()));
        }
        self.writer
            .write_record(row)
            .map_err(|e| GatelogError::Output(e.to_string()))?;
        self.writer.flush()?;
        Ok(())
    }
}

fn export_file_name(kind: &str, filter: &str) -> String {
    let date = Utc::now().format("%d%m%Y");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{kind}-{filter}-{date}-{}.csv", &suffix[..8])
}
