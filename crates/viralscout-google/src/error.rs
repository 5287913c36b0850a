use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid Google credentials: {0}")]
    Credentials(String),

    #[error("token exchange failed with status {status}: {message}")]
    Auth { status: u16, message: String },

    #[error("Google API error {status} from {context}: {message}")]
    Api {
        context: String,
        status: u16,
        message: String,
    },

    #[error("spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    #[error("worksheet \"{title}\" not found in spreadsheet {spreadsheet_id}")]
    WorksheetNotFound {
        spreadsheet_id: String,
        title: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
