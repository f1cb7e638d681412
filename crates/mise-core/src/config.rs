use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function. Decoupled from the real environment so config parsing can be
/// tested against a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|value| !value.trim().is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let bind_addr = parse_addr("MISE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("MISE_LOG_LEVEL", "info");

    let data_dir = PathBuf::from(or_default("MISE_DATA_DIR", "./data"));
    let under_data = |var: &str, file: &str| -> PathBuf {
        optional(var).map_or_else(|| data_dir.join(file), PathBuf::from)
    };

    let database_path = under_data("MISE_DATABASE_PATH", "catalog.db");
    let catalog_csv = under_data("MISE_CATALOG_CSV", "catalog.csv");
    let catalog_xlsx = under_data("MISE_CATALOG_XLSX", "catalog.xlsx");
    let cache_path = under_data("MISE_CACHE_PATH", "produtos-online.json");
    let inventory_path = under_data("MISE_INVENTORY_PATH", "inventario.json");
    let photos_dir = under_data("MISE_PHOTOS_DIR", "fotos");
    let static_dir = PathBuf::from(or_default("MISE_STATIC_DIR", "./static"));

    let dataset_ttl_secs = parse_u64("MISE_DATASET_TTL_SECS", "300")?;
    let source_timeout_secs = parse_u64("MISE_SOURCE_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("MISE_USER_AGENT", "mise-scanner/0.1 (barcode-lookup)");

    Ok(AppConfig {
        bind_addr,
        log_level,
        data_dir,
        database_path,
        catalog_csv,
        catalog_xlsx,
        cache_path,
        inventory_path,
        photos_dir,
        static_dir,
        dataset_ttl_secs,
        source_timeout_secs,
        user_agent,
        r2_public_base_url: optional("MISE_R2_PUBLIC_BASE_URL")
            .map(|base| base.trim_end_matches('/').to_string()),
        upcitemdb_api_key: optional("MISE_UPCITEMDB_API_KEY"),
        onedrive_client_id: optional("ONEDRIVE_CLIENT_ID"),
        onedrive_client_secret: optional("ONEDRIVE_CLIENT_SECRET"),
        onedrive_refresh_token: optional("ONEDRIVE_REFRESH_TOKEN"),
        onedrive_folder: optional("ONEDRIVE_FOLDER"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn defaults_apply_with_empty_environment() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();

        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.database_path, PathBuf::from("./data/catalog.db"));
        assert_eq!(cfg.cache_path, PathBuf::from("./data/produtos-online.json"));
        assert_eq!(cfg.photos_dir, PathBuf::from("./data/fotos"));
        assert_eq!(cfg.dataset_ttl_secs, 300);
        assert_eq!(cfg.source_timeout_secs, 10);
        assert!(cfg.r2_public_base_url.is_none());
        assert!(!cfg.onedrive_configured());
    }

    #[test]
    fn file_paths_follow_data_dir() {
        let mut map = HashMap::new();
        map.insert("MISE_DATA_DIR", "/srv/mise");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.catalog_csv, PathBuf::from("/srv/mise/catalog.csv"));
        assert_eq!(cfg.catalog_xlsx, PathBuf::from("/srv/mise/catalog.xlsx"));
        assert_eq!(cfg.inventory_path, PathBuf::from("/srv/mise/inventario.json"));
    }

    #[test]
    fn explicit_paths_override_data_dir() {
        let mut map = HashMap::new();
        map.insert("MISE_DATA_DIR", "/srv/mise");
        map.insert("MISE_CATALOG_CSV", "/mnt/shared/base.csv");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.catalog_csv, PathBuf::from("/mnt/shared/base.csv"));
        assert_eq!(cfg.database_path, PathBuf::from("/srv/mise/catalog.db"));
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let mut map = HashMap::new();
        map.insert("MISE_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MISE_BIND_ADDR"),
            "expected InvalidEnvVar(MISE_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn invalid_ttl_is_rejected() {
        let mut map = HashMap::new();
        map.insert("MISE_DATASET_TTL_SECS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MISE_DATASET_TTL_SECS"),
            "expected InvalidEnvVar(MISE_DATASET_TTL_SECS), got: {result:?}"
        );
    }

    #[test]
    fn r2_base_url_trailing_slash_is_trimmed() {
        let mut map = HashMap::new();
        map.insert("MISE_R2_PUBLIC_BASE_URL", "https://pub-abc.r2.dev/");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(
            cfg.r2_public_base_url.as_deref(),
            Some("https://pub-abc.r2.dev")
        );
    }

    #[test]
    fn onedrive_configured_requires_all_credentials() {
        let mut map = HashMap::new();
        map.insert("ONEDRIVE_CLIENT_ID", "id");
        map.insert("ONEDRIVE_CLIENT_SECRET", "secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(!cfg.onedrive_configured());

        map.insert("ONEDRIVE_REFRESH_TOKEN", "token");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.onedrive_configured());
    }

    #[test]
    fn blank_optional_values_are_ignored() {
        let mut map = HashMap::new();
        map.insert("MISE_R2_PUBLIC_BASE_URL", "  ");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.r2_public_base_url.is_none());
    }
}
