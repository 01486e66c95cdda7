pub mod fixture;
pub mod rest;

use std::future::Future;

use thiserror::Error;

use crate::model::{self, Category, GroupedCatalog, Training};

pub use fixture::FixtureSource;
pub use rest::{RestClient, RestOptions};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("category not found: {id}")]
    NotFound { id: String },

    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("request failed: {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read data file: {path}: {source}")]
    FixtureRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse data file: {path}: {source}")]
    FixtureParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read side of the catalog backend.
///
/// `fetch_trainings` returns the records of one category ordered by
/// `month_index` ascending.
pub trait CatalogSource {
    fn fetch_category(&self, id: &str)
        -> impl Future<Output = Result<Category, FetchError>> + Send;

    fn fetch_trainings(
        &self,
        category_id: &str,
    ) -> impl Future<Output = Result<Vec<Training>, FetchError>> + Send;
}

/// Fetches one category and its trainings and groups them by month.
///
/// Either lookup failing fails the whole load; no partial catalog is built.
pub async fn load_catalog<S>(
    source: &S,
    category_id: &str,
) -> Result<(Category, GroupedCatalog), FetchError>
where
    S: CatalogSource + Sync,
{
    let category = source.fetch_category(category_id).await?;
    let trainings = source.fetch_trainings(category_id).await?;
    let fetched = trainings.len();
    let catalog = model::group(&category.title, trainings);
    let dropped = fetched - catalog.total_trainings();
    if dropped > 0 {
        tracing::debug!(
            category = category_id,
            dropped,
            "skipped trainings without a valid month_index"
        );
    }
    tracing::info!(
        category = category_id,
        trainings = catalog.total_trainings(),
        "catalog loaded"
    );
    Ok((category, catalog))
}

/// Source picked at startup: the hosted API or a local data file.
#[derive(Clone, Debug)]
pub enum Backend {
    Rest(RestClient),
    Fixture(FixtureSource),
}

impl CatalogSource for Backend {
    async fn fetch_category(&self, id: &str) -> Result<Category, FetchError> {
        match self {
            Backend::Rest(client) => client.fetch_category(id).await,
            Backend::Fixture(fixture) => fixture.fetch_category(id).await,
        }
    }

    async fn fetch_trainings(&self, category_id: &str) -> Result<Vec<Training>, FetchError> {
        match self {
            Backend::Rest(client) => client.fetch_trainings(category_id).await,
            Backend::Fixture(fixture) => fixture.fetch_trainings(category_id).await,
        }
    }
}
