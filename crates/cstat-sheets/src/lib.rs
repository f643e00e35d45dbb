//! Google Sheets adapter.
//!
//! Implements the `cstat-core` RowSource port over the Sheets v4 `values`
//! endpoint. The first row of the range is the header; the identifier and
//! status columns are located by header name.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use cstat_core::{
    config::{Config, SheetsAuth},
    domain::RawRow,
    errors::Error,
    ports::RowSource,
    status::fold_status,
    Result,
};

#[derive(Clone, Debug)]
pub struct SheetsRowSource {
    http: reqwest::Client,
    api_base: String,
    sheet_id: String,
    sheet_name: String,
    auth: SheetsAuth,
    identifier_column: String,
    status_column: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsRowSource {
    pub fn new(
        api_base: impl Into<String>,
        sheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        auth: SheetsAuth,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            sheet_id: sheet_id.into(),
            sheet_name: sheet_name.into(),
            auth,
            identifier_column: cstat_core::config::DEFAULT_IDENTIFIER_COLUMN.to_string(),
            status_column: cstat_core::config::DEFAULT_STATUS_COLUMN.to_string(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(
            cfg.sheets_api_base.clone(),
            cfg.sheet_id.clone(),
            cfg.sheet_name.clone(),
            cfg.sheets_auth.clone(),
            cfg.fetch_timeout,
        )?
        .with_columns(cfg.identifier_column.clone(), cfg.status_column.clone()))
    }

    pub fn with_columns(
        mut self,
        identifier_column: impl Into<String>,
        status_column: impl Into<String>,
    ) -> Self {
        self.identifier_column = identifier_column.into();
        self.status_column = status_column.into();
        self
    }

    fn values_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| Error::Config(format!("invalid sheets api base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("sheets api base cannot be a base url".to_string()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.sheet_id.as_str(),
                "values",
                self.sheet_name.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");
        if let SheetsAuth::ApiKey(key) = &self.auth {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}

#[async_trait]
impl RowSource for SheetsRowSource {
    async fn fetch_all_rows(&self) -> Result<Vec<RawRow>> {
        let mut req = self.http.get(self.values_url()?);
        if let SheetsAuth::BearerToken(token) = &self.auth {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::Connection(format!("sheets request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Connection(format!(
                "sheets read failed: {status} {}",
                api_error_message(&body)
            )));
        }

        let range: ValueRange = resp
            .json()
            .await
            .map_err(|e| Error::Connection(format!("sheets json error: {e}")))?;

        let rows = rows_from_values(range.values, &self.identifier_column, &self.status_column)?;
        tracing::debug!(sheet = %self.sheet_name, rows = rows.len(), "read sheet");
        Ok(rows)
    }
}

/// Turn a header-first grid into rows of (identifier, status).
///
/// Short rows are padded with empty cells; rows with both cells blank are
/// skipped. An empty grid is an empty table.
pub fn rows_from_values(
    values: Vec<Vec<serde_json::Value>>,
    identifier_column: &str,
    status_column: &str,
) -> Result<Vec<RawRow>> {
    let mut grid = values.into_iter();
    let Some(header) = grid.next() else {
        return Ok(Vec::new());
    };

    let header: Vec<String> = header.iter().map(|c| fold_status(&cell_text(c))).collect();
    let find = |name: &str| {
        let wanted = fold_status(name);
        header.iter().position(|h| *h == wanted).ok_or_else(|| {
            Error::Connection(format!("column `{name}` not found in sheet header"))
        })
    };
    let id_idx = find(identifier_column)?;
    let status_idx = find(status_column)?;

    let cell = |row: &[serde_json::Value], idx: usize| {
        row.get(idx).map(cell_text).unwrap_or_default()
    };

    Ok(grid
        .map(|row| RawRow::new(cell(&row, id_idx), cell(&row, status_idx)))
        .filter(|r| !(r.identifier.trim().is_empty() && r.status.trim().is_empty()))
        .collect())
}

fn cell_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pull `error.message` out of a Google API error body, else a short prefix.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
