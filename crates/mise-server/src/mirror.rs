//! The catalog-mirror seam.
//!
//! The core only ever calls an "is configured" predicate and an "upload
//! this file" capability; the OneDrive OAuth dance and chunked uploads are
//! a collaborator concern. Uploads are fired as detached tasks whose
//! failures are logged and never surface to the triggering request.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use mise_core::AppConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("token exchange failed: {0}")]
    Token(String),
}

/// Upload capability injected into the request handlers.
pub trait CatalogMirror: Send + Sync {
    fn is_configured(&self) -> bool;
    fn upload(&self, path: PathBuf) -> BoxFuture<'static, Result<(), MirrorError>>;
}

/// Mirror used when no credentials are configured: reports unconfigured
/// and uploads nothing.
pub struct NoopMirror;

impl CatalogMirror for NoopMirror {
    fn is_configured(&self) -> bool {
        false
    }

    fn upload(&self, path: PathBuf) -> BoxFuture<'static, Result<(), MirrorError>> {
        async move {
            tracing::debug!(path = %path.display(), "mirror not configured; skipping upload");
            Ok(())
        }
        .boxed()
    }
}

/// Thin OneDrive mirror: refresh-token exchange plus a single-shot content
/// upload. Files larger than the simple-upload window are left to the
/// external sync tooling.
pub struct OneDriveMirror {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    folder: String,
}

const TOKEN_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";
const GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl OneDriveMirror {
    /// # Errors
    ///
    /// Returns [`MirrorError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn new(
        client_id: String,
        client_secret: String,
        refresh_token: String,
        folder: String,
    ) -> Result<Self, MirrorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            client_id,
            client_secret,
            refresh_token,
            folder,
        })
    }

    async fn access_token(
        client: &reqwest::Client,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<String, MirrorError> {
        let response = client
            .post(TOKEN_URL)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MirrorError::Token(format!(
                "token endpoint answered {}",
                response.status()
            )));
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

impl CatalogMirror for OneDriveMirror {
    fn is_configured(&self) -> bool {
        true
    }

    fn upload(&self, path: PathBuf) -> BoxFuture<'static, Result<(), MirrorError>> {
        let client = self.client.clone();
        let client_id = self.client_id.clone();
        let client_secret = self.client_secret.clone();
        let refresh_token = self.refresh_token.clone();
        let folder = self.folder.clone();

        async move {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "catalog".to_string());
            let contents = tokio::fs::read(&path).await?;
            let token =
                Self::access_token(&client, &client_id, &client_secret, &refresh_token).await?;

            let url = format!("{GRAPH_URL}/me/drive/root:/{folder}/{name}:/content");
            let response = client
                .put(&url)
                .bearer_auth(token)
                .body(contents)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(MirrorError::Token(format!(
                    "upload of {name} answered {}",
                    response.status()
                )));
            }
            tracing::info!(file = %name, "catalog mirrored");
            Ok(())
        }
        .boxed()
    }
}

/// Builds the mirror the configuration asks for.
///
/// # Errors
///
/// Returns [`MirrorError::Http`] if the OneDrive client cannot be
/// constructed.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn CatalogMirror>, MirrorError> {
    if !config.onedrive_configured() {
        return Ok(Arc::new(NoopMirror));
    }

    let mirror = OneDriveMirror::new(
        config.onedrive_client_id.clone().unwrap_or_default(),
        config.onedrive_client_secret.clone().unwrap_or_default(),
        config.onedrive_refresh_token.clone().unwrap_or_default(),
        config
            .onedrive_folder
            .clone()
            .unwrap_or_else(|| "mise-scanner".to_string()),
    )?;
    Ok(Arc::new(mirror))
}

/// Fires a detached upload for every existing path. Failures are logged;
/// nothing reaches the caller.
pub fn spawn_uploads(mirror: &Arc<dyn CatalogMirror>, paths: &[PathBuf]) {
    if !mirror.is_configured() {
        return;
    }
    for path in paths {
        if !path.exists() {
            continue;
        }
        let fut = mirror.upload(path.clone());
        let path_display = path.display().to_string();
        tokio::spawn(async move {
            if let Err(e) = fut.await {
                tracing::warn!(path = %path_display, error = %e, "background mirror upload failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingMirror {
        configured: bool,
        uploads: Arc<AtomicUsize>,
    }

    impl CatalogMirror for CountingMirror {
        fn is_configured(&self) -> bool {
            self.configured
        }

        fn upload(&self, _path: PathBuf) -> BoxFuture<'static, Result<(), MirrorError>> {
            let uploads = Arc::clone(&self.uploads);
            async move {
                uploads.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn unconfigured_mirror_spawns_nothing() {
        let uploads = Arc::new(AtomicUsize::new(0));
        let mirror: Arc<dyn CatalogMirror> = Arc::new(CountingMirror {
            configured: false,
            uploads: Arc::clone(&uploads),
        });

        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("catalog.csv");
        std::fs::write(&file, b"data").expect("write file");

        spawn_uploads(&mirror, &[file]);
        tokio::task::yield_now().await;
        assert_eq!(uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn configured_mirror_uploads_existing_files_only() {
        let uploads = Arc::new(AtomicUsize::new(0));
        let mirror: Arc<dyn CatalogMirror> = Arc::new(CountingMirror {
            configured: true,
            uploads: Arc::clone(&uploads),
        });

        let dir = tempfile::tempdir().expect("tempdir");
        let present = dir.path().join("catalog.csv");
        std::fs::write(&present, b"data").expect("write file");
        let missing = dir.path().join("catalog.xlsx");

        spawn_uploads(&mirror, &[present, missing]);
        // Let the spawned task run.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(uploads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn noop_mirror_reports_unconfigured() {
        assert!(!NoopMirror.is_configured());
    }
}
