use thiserror::Error;

/// Unified error type for gatelog.
#[derive(Error, Debug)]
pub enum GatelogError {
    #[error("Malformed log line: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store write failed: {0}")]
    StoreWrite(String),

    #[error("Store query failed: {0}")]
    StoreQuery(String),

    #[error("Output write failed: {0}")]
    Output(String),

    #[error("No records found for service: {0}")]
    NoData(String),

    #[error("{0} parameter could not be empty")]
    EmptyArgument(&'static str),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
