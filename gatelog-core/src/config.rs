use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration.
///
/// Constructed once at process entry and passed by reference into the store
/// client and services — no ambient globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Backing-store settings (DynamoDB-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Endpoint override for local/dev stores. None = SDK default resolution.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// Secondary index keyed by consumer identity.
    #[serde(default = "default_consumer_index")]
    pub consumer_index: String,
}

/// Write-path settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Records per dispatched batch. Dispatched batches never exceed this.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Flush a trailing batch smaller than `batch_size` at end-of-stream.
    /// When false, trailing records are dropped.
    #[serde(default)]
    pub flush_trailing: bool,
}

/// Read/export-path settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Records fetched per store query.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_region() -> String { "us-east-1".into() }
fn default_table() -> String { "api_gateway_logs".into() }
fn default_consumer_index() -> String { "ConsumerIDIndex".into() }
fn default_batch_size() -> usize { 200 }
fn default_page_size() -> usize { 1000 }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }

// ── Impls ─────────────────────────────────────────────────────

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            ingest: IngestConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: default_region(),
            table: default_table(),
            consumer_index: default_consumer_index(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            flush_trailing: false,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            output_dir: default_output_dir(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from YAML file + env overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: PipelineConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("GATELOG_").split("__"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_store_config_has_expected_values() {
        let cfg = StoreConfig::default();
        assert!(cfg.endpoint.is_none());
        assert_eq!(cfg.region, "us-east-1");
        assert_eq!(cfg.table, "api_gateway_logs");
        assert_eq!(cfg.consumer_index, "ConsumerIDIndex");
    }

    #[test]
    fn default_ingest_config_drops_trailing_batch() {
        let cfg = IngestConfig::default();
        assert_eq!(cfg.batch_size, 200);
        assert!(!cfg.flush_trailing);
    }

    #[test]
    fn default_export_config_has_expected_values() {
        let cfg = ExportConfig::default();
        assert_eq!(cfg.page_size, 1000);
        assert_eq!(cfg.output_dir, PathBuf::from("."));
    }

    #[test]
    fn load_from_valid_yaml_overrides_defaults() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmpfile,
            "ingest:\n  batch_size: 50\n  flush_trailing: true\nstore:\n  table: logs-test\n"
        )
        .unwrap();
        let cfg = PipelineConfig::load(tmpfile.path()).unwrap();
        assert_eq!(cfg.ingest.batch_size, 50);
        assert!(cfg.ingest.flush_trailing);
        assert_eq!(cfg.store.table, "logs-test");
        // Defaults still apply for unspecified fields
        assert_eq!(cfg.export.page_size, 1000);
    }

    #[test]
    fn load_yaml_with_store_endpoint() {
        let yaml = r#"
store:
  endpoint: "http://localhost:8000"
  region: "eu-west-1"
  consumer_index: "MyConsumerIndex"
"#;
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "{yaml}").unwrap();
        let cfg = PipelineConfig::load(tmpfile.path()).unwrap();
        assert_eq!(cfg.store.endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(cfg.store.region, "eu-west-1");
        assert_eq!(cfg.store.consumer_index, "MyConsumerIndex");
    }
}
