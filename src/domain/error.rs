//! Domain error types.
//!
//! Only I/O, configuration and persistence failures are errors. A window
//! that cannot be computed, a rejected threshold update or an empty match
//! list are ordinary results and never reach this type.

/// Top-level error type for findbetter.
#[derive(Debug, thiserror::Error)]
pub enum FindBetterError {
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

    #[error("data parse error at row {row}: {reason}")]
    DataParse { row: usize, reason: String },

    #[error("fund {fund_id} has no record for period {period}")]
    UnknownFund { fund_id: i64, period: i32 },

    #[error("no fund records for reporting period {0}")]
    UnknownPeriod(i32),

    #[error("trailing {months}-month yield is not computable for fund {fund_id} at {period}")]
    NotComputable {
        fund_id: i64,
        months: u32,
        period: i32,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FindBetterError> for std::process::ExitCode {
    fn from(err: &FindBetterError) -> Self {
        let code: u8 = match err {
            FindBetterError::Io(_) => 1,
            FindBetterError::ConfigParse { .. }
            | FindBetterError::ConfigMissing { .. }
            | FindBetterError::ConfigInvalid { .. } => 2,
            FindBetterError::Database { .. }
            | FindBetterError::DatabaseQuery { .. }
            | FindBetterError::DataParse { .. } => 3,
            FindBetterError::UnknownFund { .. } | FindBetterError::UnknownPeriod(_) => 4,
            FindBetterError::NotComputable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
