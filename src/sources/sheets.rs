use crate::normalize::RawRow;
use crate::sources::traits::RowSource;
use crate::sources::types::{SheetCredentials, SheetParams};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Google Sheets values API response
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Reads availability rows from a spreadsheet through the values API
pub struct SheetsSource {
    client: Client,
    params: SheetParams,
    credentials: SheetCredentials,
}

impl SheetsSource {
    pub fn new(params: SheetParams, credentials: SheetCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            params,
            credentials,
        })
    }

    fn values_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.params.api_base)
            .with_context(|| format!("Invalid Sheets API base `{}`", self.params.api_base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Sheets API base cannot carry a path"))?
            .pop_if_empty()
            .extend([
                self.params.spreadsheet_id.as_str(),
                "values",
                self.params.range.as_str(),
            ]);
        if let SheetCredentials::ApiKey(key) = &self.credentials {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}

/// Cells come back as strings by default, but numbers and booleans are possible.
fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RowSource for SheetsSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        info!(
            spreadsheet = %self.params.spreadsheet_id,
            range = %self.params.range,
            "Fetching availability sheet"
        );

        let url = self.values_url()?;
        let mut request = self.client.get(url);
        if let SheetCredentials::BearerToken(token) = &self.credentials {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to fetch spreadsheet values")?;

        if !response.status().is_success() {
            warn!("Sheets API returned status: {}", response.status());
            anyhow::bail!("Failed to fetch spreadsheet values: {}", response.status());
        }

        let payload: ValueRange = response
            .json()
            .await
            .context("Failed to decode spreadsheet values")?;

        debug!("Received {} rows from Sheets API", payload.values.len());

        Ok(payload
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    fn source_name(&self) -> &'static str {
        "Google Sheets"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(credentials: SheetCredentials) -> SheetsSource {
        let params = SheetParams {
            spreadsheet_id: "sheet-123".to_string(),
            ..SheetParams::default()
        };
        SheetsSource::new(params, credentials).unwrap()
    }

    #[test]
    fn builds_encoded_values_url() {
        let url = source(SheetCredentials::ApiKey("k3y".to_string()))
            .values_url()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/Sheet1!A2:M?key=k3y"
        );
    }

    #[test]
    fn bearer_token_stays_out_of_url() {
        let url = source(SheetCredentials::BearerToken("t0k".to_string()))
            .values_url()
            .unwrap();
        assert!(url.query().is_none());
    }

    #[test]
    fn converts_non_string_cells() {
        assert_eq!(cell_text(Value::from(4)), "4");
        assert_eq!(cell_text(Value::Null), "");
        assert_eq!(cell_text(Value::from("9/1-9/5")), "9/1-9/5");
    }
}
