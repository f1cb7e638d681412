//! Product photo resolution: remote bucket probing, then the local
//! directory.

use std::path::PathBuf;
use std::time::Duration;

use mise_core::{PhotoRef, PhotoSource};
use reqwest::Client;

/// Filename suffixes probed in the remote bucket, in order.
const PHOTO_SUFFIXES: [&str; 3] = ["", "_mise", "_cosmos"];
/// Image extensions recognised by both tiers.
const PHOTO_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];
/// Key prefix photos live under in the bucket.
const REMOTE_PREFIX: &str = "fotos";

pub struct PhotoResolver {
    client: Client,
    remote_base: Option<String>,
    local_dir: PathBuf,
}

impl PhotoResolver {
    /// Creates a resolver. `remote_base` is the bucket's public base URL;
    /// when unset only the local directory is consulted.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the probe client cannot be
    /// constructed.
    pub fn new(
        remote_base: Option<String>,
        local_dir: PathBuf,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            remote_base: remote_base.map(|base| base.trim_end_matches('/').to_string()),
            local_dir,
        })
    }

    /// Resolves a photo for a normalized code: bucket first, local
    /// directory second, `None` when neither has one.
    pub async fn resolve(&self, codigo: &str) -> Option<PhotoRef> {
        if let Some(remote) = self.probe_remote(codigo).await {
            return Some(remote);
        }
        self.scan_local(codigo).await
    }

    /// Probes the bucket with HEAD requests across the suffix/extension
    /// cross-product; the first existing key wins.
    async fn probe_remote(&self, codigo: &str) -> Option<PhotoRef> {
        let base = self.remote_base.as_deref()?;

        for suffix in PHOTO_SUFFIXES {
            for ext in PHOTO_EXTENSIONS {
                let filename = format!("{codigo}{suffix}.{ext}");
                let url = format!("{base}/{REMOTE_PREFIX}/{filename}");
                match self.client.head(&url).send().await {
                    Ok(response) if response.status().is_success() => {
                        return Some(PhotoRef {
                            source: PhotoSource::Remote,
                            url,
                            filename,
                        });
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(codigo, url, error = %e, "remote photo probe failed");
                    }
                }
            }
        }
        None
    }

    /// Scans the local directory for any file starting with the code and
    /// carrying a recognised image extension. Dotfiles are ignored and the
    /// match is case-insensitive.
    async fn scan_local(&self, codigo: &str) -> Option<PhotoRef> {
        let mut entries = tokio::fs::read_dir(&self.local_dir).await.ok()?;
        let codigo_lower = codigo.to_lowercase();

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            let lower = name.to_lowercase();
            if lower.starts_with('.') || !lower.starts_with(&codigo_lower) {
                continue;
            }
            let has_image_ext = PHOTO_EXTENSIONS
                .iter()
                .any(|ext| lower.ends_with(&format!(".{ext}")));
            if has_image_ext {
                return Some(PhotoRef {
                    source: PhotoSource::Local,
                    url: format!("/fotos/{name}"),
                    filename: name,
                });
            }
        }
        None
    }

    /// Fetches a named photo's bytes from the bucket's public URL, for the
    /// proxy route. Returns the content type alongside the body.
    pub async fn fetch_remote(&self, filename: &str) -> Option<(String, Vec<u8>)> {
        let base = self.remote_base.as_deref()?;
        let url = format!("{base}/{REMOTE_PREFIX}/{filename}");
        let response = self.client.get(&url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response.bytes().await.ok()?.to_vec();
        Some((content_type, body))
    }

    /// Local photos directory, for the static photo route.
    #[must_use]
    pub fn local_dir(&self) -> &PathBuf {
        &self.local_dir
    }
}
