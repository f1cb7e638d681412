//! File-backed stores: the catalog reader with its TTL index, the JSON
//! resolution cache, and the JSON inventory file.

mod catalog;
mod cache;
mod inventory;
mod reader;

use thiserror::Error;

pub use cache::JsonCache;
pub use catalog::read_catalog;
pub use inventory::InventoryFile;
pub use reader::DatasetReader;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Xlsx(#[from] calamine::XlsxError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("spreadsheet has no sheets: {0}")]
    EmptyWorkbook(String),
}
