pub mod fixture;
pub mod sheets;
pub mod traits;
pub mod types;

pub use fixture::FixtureSource;
pub use sheets::SheetsSource;
pub use traits::RowSource;
pub use types::{SheetCredentials, SheetParams};
