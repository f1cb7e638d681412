use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub catalog_csv: PathBuf,
    pub catalog_xlsx: PathBuf,
    pub cache_path: PathBuf,
    pub inventory_path: PathBuf,
    pub photos_dir: PathBuf,
    pub static_dir: PathBuf,
    pub dataset_ttl_secs: u64,
    pub source_timeout_secs: u64,
    pub user_agent: String,
    pub r2_public_base_url: Option<String>,
    pub upcitemdb_api_key: Option<String>,
    pub onedrive_client_id: Option<String>,
    pub onedrive_client_secret: Option<String>,
    pub onedrive_refresh_token: Option<String>,
    pub onedrive_folder: Option<String>,
}

impl AppConfig {
    /// Whether every OneDrive credential needed by the mirror is present.
    #[must_use]
    pub fn onedrive_configured(&self) -> bool {
        self.onedrive_client_id.is_some()
            && self.onedrive_client_secret.is_some()
            && self.onedrive_refresh_token.is_some()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field("database_path", &self.database_path)
            .field("catalog_csv", &self.catalog_csv)
            .field("catalog_xlsx", &self.catalog_xlsx)
            .field("cache_path", &self.cache_path)
            .field("inventory_path", &self.inventory_path)
            .field("photos_dir", &self.photos_dir)
            .field("static_dir", &self.static_dir)
            .field("dataset_ttl_secs", &self.dataset_ttl_secs)
            .field("source_timeout_secs", &self.source_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("r2_public_base_url", &self.r2_public_base_url)
            .field(
                "upcitemdb_api_key",
                &self.upcitemdb_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("onedrive_client_id", &self.onedrive_client_id)
            .field(
                "onedrive_client_secret",
                &self.onedrive_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "onedrive_refresh_token",
                &self.onedrive_refresh_token.as_ref().map(|_| "[redacted]"),
            )
            .field("onedrive_folder", &self.onedrive_folder)
            .finish()
    }
}
