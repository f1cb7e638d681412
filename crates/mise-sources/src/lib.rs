//! External product-data source adapters.
//!
//! Every adapter translates one third-party catalog's response shape into
//! the common [`mise_core::OnlineProduct`] result, or signals "not found".
//! [`SourceRegistry::lookup_first`] fans the adapters out concurrently with
//! first-result-wins semantics; a failing adapter is a miss, never an error
//! that reaches the caller.

mod cosmos;
mod open_products;
mod registry;
mod upcitemdb;

use thiserror::Error;

pub use registry::{SourceEndpoints, SourceRegistry};

/// Errors returned by a single source adapter.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered with a status the adapter does not handle.
    #[error("unexpected HTTP status: {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The external catalogs the cascade can consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    OpenFoodFacts,
    OpenBeautyFacts,
    OpenPetFoodFacts,
    UpcItemDb,
    Cosmos,
}

impl Source {
    /// Every source, in the order the sequential revisions consulted them.
    pub const ALL: [Source; 5] = [
        Source::OpenFoodFacts,
        Source::OpenBeautyFacts,
        Source::OpenPetFoodFacts,
        Source::UpcItemDb,
        Source::Cosmos,
    ];

    /// Tag stored in the `fonte` field of results this source produced.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::OpenFoodFacts => "openfoodfacts",
            Source::OpenBeautyFacts => "openbeautyfacts",
            Source::OpenPetFoodFacts => "openpetfoodfacts",
            Source::UpcItemDb => "upcitemdb",
            Source::Cosmos => "cosmos",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
