mod classifier;
mod matcher;

use std::path::{Path, PathBuf};

use agro_core::CatalogEntry;
use thiserror::Error;

pub use classifier::{Classifier, PRICE_TERMS, SERIOUS_DISEASE_TERMS};
pub use matcher::{find_by_keywords, find_exact, fuzzy_match, DEFAULT_FUZZY_THRESHOLD};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed reading catalog file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The product catalog: an ordered, immutable list of entries loaded once at
/// startup. Catalog order is significant, first-match-wins strategies depend
/// on it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self { entries })
    }

    /// Degraded-mode loader: a missing or malformed catalog file is logged
    /// and yields an empty catalog instead of failing startup.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(catalog) => catalog,
            Err(error) => {
                tracing::warn!(
                    path = %path.as_ref().display(),
                    error = %error,
                    "catalog load failed, continuing with empty catalog"
                );
                Self::default()
            }
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
