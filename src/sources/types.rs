use serde::{Deserialize, Serialize};

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const DEFAULT_SHEET_RANGE: &str = "Sheet1!A2:M";

/// Where to read availability rows from in the spreadsheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetParams {
    /// Spreadsheet document id
    pub spreadsheet_id: String,
    /// A1 range covering the data rows
    pub range: String,
    /// Values API base URL
    pub api_base: String,
}

impl Default for SheetParams {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: DEFAULT_SHEET_RANGE.to_string(),
            api_base: DEFAULT_SHEETS_API_BASE.to_string(),
        }
    }
}

/// How requests to the values API are authorized
#[derive(Debug, Clone)]
pub enum SheetCredentials {
    ApiKey(String),
    BearerToken(String),
}
