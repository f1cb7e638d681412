//! The adapter registry and concurrent first-result-wins fan-out.

use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use mise_core::OnlineProduct;
use reqwest::Client;

use crate::{cosmos, open_products, upcitemdb, Source, SourceError};

const OPEN_FOOD_FACTS_URL: &str = "https://world.openfoodfacts.org";
const OPEN_BEAUTY_FACTS_URL: &str = "https://world.openbeautyfacts.org";
const OPEN_PET_FOOD_FACTS_URL: &str = "https://world.openpetfoodfacts.org";
const UPCITEMDB_URL: &str = "https://api.upcitemdb.com";
const COSMOS_URL: &str = "https://cosmos.bluesoft.com.br";

/// Base URLs for every adapter, overridable so tests can point at a mock
/// server.
#[derive(Debug, Clone)]
pub struct SourceEndpoints {
    pub open_food_facts: String,
    pub open_beauty_facts: String,
    pub open_pet_food_facts: String,
    pub upcitemdb: String,
    pub cosmos: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            open_food_facts: OPEN_FOOD_FACTS_URL.to_string(),
            open_beauty_facts: OPEN_BEAUTY_FACTS_URL.to_string(),
            open_pet_food_facts: OPEN_PET_FOOD_FACTS_URL.to_string(),
            upcitemdb: UPCITEMDB_URL.to_string(),
            cosmos: COSMOS_URL.to_string(),
        }
    }
}

impl SourceEndpoints {
    /// Every adapter pointed at the same base URL (wiremock tests).
    #[must_use]
    pub fn all_at(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            open_food_facts: base.clone(),
            open_beauty_facts: base.clone(),
            open_pet_food_facts: base.clone(),
            upcitemdb: base.clone(),
            cosmos: base,
        }
    }
}

/// The set of external adapters the cascade consults.
pub struct SourceRegistry {
    client: Client,
    endpoints: SourceEndpoints,
    enabled: Vec<Source>,
    upcitemdb_api_key: Option<String>,
}

impl SourceRegistry {
    /// Creates a registry over the production endpoints with every adapter
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        upcitemdb_api_key: Option<String>,
    ) -> Result<Self, SourceError> {
        Self::with_endpoints(
            timeout_secs,
            user_agent,
            upcitemdb_api_key,
            SourceEndpoints::default(),
            Source::ALL.to_vec(),
        )
    }

    /// Creates a registry with explicit endpoints and adapter set (for
    /// tests, or to disable individual sources).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_endpoints(
        timeout_secs: u64,
        user_agent: &str,
        upcitemdb_api_key: Option<String>,
        endpoints: SourceEndpoints,
        enabled: Vec<Source>,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoints,
            enabled,
            upcitemdb_api_key,
        })
    }

    /// Queries a single source.
    ///
    /// Externally-sourced names pass through
    /// [`mise_core::clean_product_name`] before they are returned.
    ///
    /// # Errors
    ///
    /// Returns the adapter's [`SourceError`] on transport or parse failure;
    /// `Ok(None)` is the ordinary "not found" outcome.
    pub async fn lookup(
        &self,
        source: Source,
        code: &str,
    ) -> Result<Option<OnlineProduct>, SourceError> {
        let result = match source {
            Source::OpenFoodFacts => {
                open_products::lookup(
                    &self.client,
                    &self.endpoints.open_food_facts,
                    code,
                    source.as_str(),
                )
                .await?
            }
            Source::OpenBeautyFacts => {
                open_products::lookup(
                    &self.client,
                    &self.endpoints.open_beauty_facts,
                    code,
                    source.as_str(),
                )
                .await?
            }
            Source::OpenPetFoodFacts => {
                open_products::lookup(
                    &self.client,
                    &self.endpoints.open_pet_food_facts,
                    code,
                    source.as_str(),
                )
                .await?
            }
            Source::UpcItemDb => {
                upcitemdb::lookup(
                    &self.client,
                    &self.endpoints.upcitemdb,
                    code,
                    self.upcitemdb_api_key.as_deref(),
                )
                .await?
            }
            Source::Cosmos => {
                cosmos::lookup(&self.client, &self.endpoints.cosmos, code).await?
            }
        };

        Ok(result.map(|mut product| {
            product.nome = mise_core::clean_product_name(&product.nome);
            product
        }))
    }

    /// Fans the enabled adapters out concurrently; the first hit wins and
    /// the remaining in-flight calls are dropped.
    ///
    /// Each adapter failure is logged and treated as a miss for that
    /// source; the per-call client timeout bounds the whole tier. Returns
    /// `None` when every source misses.
    pub async fn lookup_first(&self, code: &str) -> Option<OnlineProduct> {
        let mut pending: FuturesUnordered<_> = self
            .enabled
            .iter()
            .map(|&source| async move { (source, self.lookup(source, code).await) })
            .collect();

        while let Some((source, result)) = pending.next().await {
            match result {
                Ok(Some(product)) => {
                    tracing::info!(code, source = %source, nome = %product.nome, "external source hit");
                    return Some(product);
                }
                Ok(None) => {
                    tracing::debug!(code, source = %source, "external source miss");
                }
                Err(e) => {
                    tracing::warn!(code, source = %source, error = %e, "external source failed");
                }
            }
        }

        None
    }

    /// Sources this registry consults, in registration order.
    #[must_use]
    pub fn enabled(&self) -> &[Source] {
        &self.enabled
    }
}
