use std::path::Path;

use serde::Deserialize;

use super::{CatalogSource, FetchError};
use crate::model::{Category, Training};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FixtureDocument {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub trainings: Vec<Training>,
}

/// Catalog source backed by a local JSON document with the same record
/// shapes the hosted API returns.
#[derive(Clone, Debug, Default)]
pub struct FixtureSource {
    doc: FixtureDocument,
}

impl FixtureSource {
    pub fn new(doc: FixtureDocument) -> Self {
        Self { doc }
    }

    pub fn from_json_str(raw: &str, origin: &str) -> Result<Self, FetchError> {
        let doc = serde_json::from_str::<FixtureDocument>(raw).map_err(|e| {
            FetchError::FixtureParse {
                path: origin.to_string(),
                source: e,
            }
        })?;
        Ok(Self::new(doc))
    }

    pub async fn from_path(path: &Path) -> Result<Self, FetchError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FetchError::FixtureRead {
                path: path.display().to_string(),
                source: e,
            })?;
        Self::from_json_str(&raw, &path.display().to_string())
    }
}

impl CatalogSource for FixtureSource {
    async fn fetch_category(&self, id: &str) -> Result<Category, FetchError> {
        self.doc
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound { id: id.to_string() })
    }

    async fn fetch_trainings(&self, category_id: &str) -> Result<Vec<Training>, FetchError> {
        let mut rows: Vec<Training> = self
            .doc
            .trainings
            .iter()
            .filter(|t| t.category_id.as_deref() == Some(category_id))
            .cloned()
            .collect();
        // Same ordering the API applies: ascending, nulls last, stable.
        rows.sort_by_key(|t| (t.month_index.is_none(), t.month_index));
        Ok(rows)
    }
}
