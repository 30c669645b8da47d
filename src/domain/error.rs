//! Domain error types.

/// Top-level error type for tradecore.
///
/// Expected failures (validation, venue rejection) and transport faults are
/// distinct variants so callers can branch without string matching.
#[derive(Debug, thiserror::Error)]
pub enum TradecoreError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("order placement failed: {reason}")]
    OrderPlacement { reason: String },

    #[error("data fetch failed: {reason}")]
    DataFetch { reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradecoreError> for std::process::ExitCode {
    fn from(err: &TradecoreError) -> Self {
        let code: u8 = match err {
            TradecoreError::Io(_) => 1,
            TradecoreError::ConfigParse { .. }
            | TradecoreError::ConfigMissing { .. }
            | TradecoreError::ConfigInvalid { .. } => 2,
            TradecoreError::Database { .. } | TradecoreError::DatabaseQuery { .. } => 3,
            TradecoreError::InvalidRequest { .. } => 4,
            TradecoreError::OrderPlacement { .. } | TradecoreError::DataFetch { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
