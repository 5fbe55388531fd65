use thiserror::Error;

/// Failure to obtain rows from a campaign source.
///
/// Every variant is an ordinary refresh failure: the cached snapshot stays
/// authoritative and nothing retries inside the engine.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid source: {0}")]
    InvalidSource(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("source returned HTTP {0}")]
    Status(u16),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("source contained no data rows")]
    NoRows,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },
    #[error("{name} must be true or false, got {value:?}")]
    InvalidFlag { name: &'static str, value: String },
}

/// Failure writing a report or export file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
}
