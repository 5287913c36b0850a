//! Google Sheets v4 client.
//!
//! Only the handful of calls the pipeline needs: resolve a worksheet, read
//! all of its cells, append rows, create a worksheet, write a block of
//! values and patch individual cells.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::a1;
use crate::auth::TokenSource;
use crate::error::GoogleError;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

/// How Sheets interprets values sent by [`SheetsClient::update_values`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInput {
    /// Stored verbatim: long digit strings stay text, `=` is not a formula.
    Raw,
    /// Parsed as if typed into the UI.
    UserEntered,
}

impl ValueInput {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: WorksheetProperties,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// One single-cell write for [`SheetsClient::batch_update_cells`].
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    /// 1-based sheet row.
    pub row: usize,
    /// 0-based column index.
    pub col: usize,
    pub value: Value,
}

pub struct SheetsClient {
    client: Client,
    tokens: Arc<TokenSource>,
    base_url: Url,
}

impl SheetsClient {
    /// # Errors
    ///
    /// Returns [`GoogleError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(tokens: Arc<TokenSource>, timeout_secs: u64) -> Result<Self, GoogleError> {
        Self::with_base_url(tokens, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GoogleError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        tokens: Arc<TokenSource>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GoogleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            tokens,
            base_url: crate::parse_base_url(base_url)?,
        })
    }

    /// Properties of the worksheet titled `title`.
    ///
    /// # Errors
    ///
    /// - [`GoogleError::SpreadsheetNotFound`] when the spreadsheet does not
    ///   exist or is not shared with the caller.
    /// - [`GoogleError::WorksheetNotFound`] when no worksheet has that title.
    pub async fn worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
    ) -> Result<WorksheetProperties, GoogleError> {
        let mut url = crate::endpoint(&self.base_url, &[spreadsheet_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");

        let token = self.tokens.access_token().await?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let response = match crate::check_status(response, "spreadsheet metadata").await {
            Err(GoogleError::Api { status: 404, .. }) => {
                return Err(GoogleError::SpreadsheetNotFound(spreadsheet_id.to_owned()))
            }
            other => other?,
        };

        let meta: SpreadsheetMeta = crate::decode_json(response, "spreadsheet metadata").await?;
        meta.sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.title == title)
            .ok_or_else(|| GoogleError::WorksheetNotFound {
                spreadsheet_id: spreadsheet_id.to_owned(),
                title: title.to_owned(),
            })
    }

    /// Every cell of the worksheet as displayed text.
    ///
    /// The API drops trailing empty cells from each row; rows are padded back
    /// with empty strings to the width of the widest row.
    ///
    /// # Errors
    ///
    /// Same as [`Self::worksheet`], plus [`GoogleError::Api`] for any other
    /// non-2xx response.
    pub async fn get_all_values(
        &self,
        spreadsheet_id: &str,
        title: &str,
    ) -> Result<Vec<Vec<String>>, GoogleError> {
        self.worksheet(spreadsheet_id, title).await?;

        let range = a1::quote_sheet(title);
        let url = crate::endpoint(&self.base_url, &[spreadsheet_id, "values", &range])?;
        let token = self.tokens.access_token().await?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let response = crate::check_status(response, "get values").await?;
        let value_range: ValueRange = crate::decode_json(response, "get values").await?;

        Ok(pad_rows(value_range.values))
    }

    /// Append `rows` after the last non-empty row of the worksheet.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Api`] for any non-2xx response.
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: &[Vec<Value>],
    ) -> Result<(), GoogleError> {
        let range = format!("{}:append", a1::quote_sheet(title));
        let mut url = crate::endpoint(&self.base_url, &[spreadsheet_id, "values", &range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        crate::check_status(response, "append rows").await?;
        Ok(())
    }

    /// Create a worksheet and return its sheet id.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Api`] for any non-2xx response (including a
    /// duplicate title).
    pub async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: usize,
        cols: usize,
    ) -> Result<i64, GoogleError> {
        let batch = format!("{spreadsheet_id}:batchUpdate");
        let url = crate::endpoint(&self.base_url, &[&batch])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": cols }
                    }
                }
            }]
        });

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let response = crate::check_status(response, "add worksheet").await?;
        let reply: Value = crate::decode_json(response, "add worksheet").await?;

        reply
            .pointer("/replies/0/addSheet/properties/sheetId")
            .and_then(Value::as_i64)
            .ok_or_else(|| GoogleError::Api {
                context: "add worksheet".to_owned(),
                status: 200,
                message: "response did not include the new sheet id".to_owned(),
            })
    }

    /// Overwrite the cells starting at `a1_start` (e.g. `A2`) with `rows`.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Api`] for any non-2xx response.
    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        title: &str,
        a1_start: &str,
        rows: &[Vec<Value>],
        input: ValueInput,
    ) -> Result<(), GoogleError> {
        let range = a1::range(title, a1_start);
        let mut url = crate::endpoint(&self.base_url, &[spreadsheet_id, "values", &range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", input.as_str());

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": rows }))
            .send()
            .await?;
        crate::check_status(response, "update values").await?;
        Ok(())
    }

    /// Write each cell in one `values:batchUpdate` call.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Api`] for any non-2xx response; no cell is
    /// written in that case.
    pub async fn batch_update_cells(
        &self,
        spreadsheet_id: &str,
        title: &str,
        cells: &[CellUpdate],
    ) -> Result<(), GoogleError> {
        if cells.is_empty() {
            return Ok(());
        }

        let url = crate::endpoint(&self.base_url, &[spreadsheet_id, "values:batchUpdate"])?;
        let data: Vec<Value> = cells
            .iter()
            .map(|c| {
                json!({
                    "range": a1::cell(title, c.row, c.col),
                    "values": [[c.value]],
                })
            })
            .collect();

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "valueInputOption": "USER_ENTERED", "data": data }))
            .send()
            .await?;
        crate::check_status(response, "batch update cells").await?;
        Ok(())
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn pad_rows(values: Vec<Vec<Value>>) -> Vec<Vec<String>> {
    let width = values.iter().map(Vec::len).max().unwrap_or(0);
    values
        .into_iter()
        .map(|row| {
            let mut cells: Vec<String> = row.into_iter().map(cell_text).collect();
            cells.resize(width, String::new());
            cells
        })
        .collect()
}
