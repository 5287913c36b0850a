use thiserror::Error;

use crate::ports::{ProviderError, StoreError};

/// Failure of a whole stage invocation. Per-item failures in enrichment and
/// archival are reported in the stage output instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MissingColumn(String),

    #[error("{context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: ProviderError,
    },

    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    /// Stable machine-readable code, used as the API error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::MissingColumn(_) => "missing_column",
            Self::Upstream { .. } => "upstream_error",
            Self::Store { .. } => "store_error",
        }
    }

    /// Map a failed sheet read to the caller-facing error: unknown
    /// spreadsheets and worksheets are `NotFound`, anything else is a store
    /// failure.
    pub(crate) fn sheet_read(spreadsheet_id: &str, sheet_name: &str, err: StoreError) -> Self {
        match err {
            StoreError::SpreadsheetNotFound(_) => {
                Self::NotFound(format!("Spreadsheet with ID '{spreadsheet_id}' not found."))
            }
            StoreError::WorksheetNotFound(_) => {
                Self::NotFound(format!("Sheet '{sheet_name}' not found in the spreadsheet."))
            }
            StoreError::Backend(_) => Self::Store {
                context: "An error occurred while accessing the Google Sheet".to_owned(),
                source: err,
            },
        }
    }
}
