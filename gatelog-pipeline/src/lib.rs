pub mod export;
pub mod ingest;
pub mod metrics;
pub mod writer;
