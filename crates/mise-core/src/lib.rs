mod app_config;
mod codes;
mod config;
mod records;

use thiserror::Error;

pub use app_config::AppConfig;
pub use codes::{clean_product_name, is_valid_code, normalize};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{
    CachedResolution, InventoryRecord, OnlineProduct, PhotoRef, PhotoSource, ProductRecord,
    SearchHit,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
