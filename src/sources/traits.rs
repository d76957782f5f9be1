use anyhow::Result;
use async_trait::async_trait;

use crate::normalize::RawRow;

/// Common trait for everything that can supply raw availability rows.
/// The spreadsheet is the production source; fixtures stand in for it locally.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch every data row, header excluded
    async fn fetch_rows(&self) -> Result<Vec<RawRow>>;

    /// Get the name of the row source
    fn source_name(&self) -> &'static str;
}
