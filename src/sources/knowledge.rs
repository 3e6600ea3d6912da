//! In-memory recommendation catalog.
//!
//! Entries are keyed by the rendered composite key. The catalog itself
//! does no fallback; callers walk [`super::CompositeKey::fallback_chain`]
//! and treat an exhausted chain as "no recommendation available".

use std::collections::HashMap;
use std::path::Path;

use super::{CompositeKey, KnowledgeBase, Recommendation};
use crate::error::SourceError;

/// The catalog shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../../data/knowledge.json");

/// HashMap-backed knowledge base.
#[derive(Debug, Clone, Default)]
pub struct CatalogKnowledgeBase {
    entries: HashMap<String, Recommendation>,
}

impl CatalogKnowledgeBase {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog bundled with the crate.
    ///
    /// The bundled file is validated by tests, so a parse failure here is
    /// a build defect rather than a runtime condition.
    pub fn builtin() -> Result<Self, SourceError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Parses a catalog from a JSON object of key -> recommendation.
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let entries: HashMap<String, Recommendation> =
            serde_json::from_str(json).map_err(|e| SourceError::CatalogUnavailable {
                message: e.to_string(),
            })?;
        Ok(Self { entries })
    }

    /// Reads a catalog from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SourceError::CatalogUnavailable {
                message: format!("{}: {e}", path.as_ref().display()),
            }
        })?;
        Self::from_json_str(&json)
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: &CompositeKey, recommendation: Recommendation) {
        self.entries.insert(key.render(), recommendation);
    }

    /// Number of catalog entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KnowledgeBase for CatalogKnowledgeBase {
    fn lookup(&self, key: &CompositeKey) -> Result<Option<Recommendation>, SourceError> {
        Ok(self.entries.get(&key.render()).cloned())
    }
}
