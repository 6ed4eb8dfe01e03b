use std::sync::Arc;
use std::time::Instant;

use tracing::info;
use wayfinder_core::{ContentCatalog, ContentEntry, Dataset, KeywordRegistry};

use crate::error::SearchError;
use crate::filter::filter;
use crate::interpreter::QueryInterpreter;
use crate::validator::validate;

/// interpret → validate → filter, as one future. The only suspension point is
/// the interpreter call.
#[derive(Clone)]
pub struct SearchPipeline {
    interpreter: Arc<dyn QueryInterpreter>,
    registry: Arc<KeywordRegistry>,
    catalog: Arc<ContentCatalog>,
}

impl SearchPipeline {
    pub fn new(
        interpreter: Arc<dyn QueryInterpreter>,
        registry: Arc<KeywordRegistry>,
        catalog: Arc<ContentCatalog>,
    ) -> Self {
        Self {
            interpreter,
            registry,
            catalog,
        }
    }

    pub fn from_dataset(interpreter: Arc<dyn QueryInterpreter>, dataset: &Dataset) -> Self {
        Self::new(
            interpreter,
            dataset.registry.clone(),
            dataset.catalog.clone(),
        )
    }

    /// Catalog entries matching the validated keywords, in catalog order.
    /// `limit` and `offset` are logged but not applied.
    pub async fn run(&self, search_term: &str) -> Result<Vec<ContentEntry>, SearchError> {
        let started = Instant::now();

        let parameters = self.interpreter.interpret(search_term).await?;
        let keywords = validate(&parameters.keywords, &self.registry);
        let results = filter(self.catalog.entries(), &keywords);

        info!(
            keywords = ?keywords,
            limit = parameters.limit,
            offset = parameters.offset,
            results = results.len(),
            took_ms = started.elapsed().as_millis() as u64,
            "Search complete"
        );

        Ok(results)
    }
}
