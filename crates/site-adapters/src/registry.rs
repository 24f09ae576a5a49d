use std::sync::Arc;

use tracing::debug;

use crate::adapter::SiteAdapter;
use crate::axol::axol_adapter;
use crate::heuristic::HeuristicAdapter;
use crate::keywords::KeywordTable;
use crate::signature::PageSignature;

/// Ordered adapters plus the heuristic default.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn SiteAdapter>>,
    fallback: Arc<HeuristicAdapter>,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtin(KeywordTable::builtin())
    }
}

impl AdapterRegistry {
    /// Only the heuristic default.
    pub fn new(fallback: HeuristicAdapter) -> Self {
        Self {
            adapters: Vec::new(),
            fallback: Arc::new(fallback),
        }
    }

    /// Built-in site adapters over `table`.
    pub fn with_builtin(table: KeywordTable) -> Self {
        let fallback = HeuristicAdapter::new(table);
        let mut registry = Self::new(fallback.clone());
        registry.register(axol_adapter(fallback));
        registry
    }

    pub fn register<A>(&mut self, adapter: A)
    where
        A: SiteAdapter + 'static,
    {
        self.adapters.push(Arc::new(adapter));
    }

    pub fn heuristic(&self) -> &HeuristicAdapter {
        &self.fallback
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters
            .iter()
            .map(|adapter| adapter.name())
            .chain(std::iter::once(self.fallback.name()))
            .collect()
    }

    /// First registered adapter claiming `signature`, else the heuristic one.
    pub fn select(&self, signature: &PageSignature) -> Arc<dyn SiteAdapter> {
        match self.adapters.iter().find(|adapter| adapter.matches(signature)) {
            Some(adapter) => {
                debug!(adapter = adapter.name(), url = %signature.url, "site adapter selected");
                Arc::clone(adapter)
            }
            None => {
                debug!(url = %signature.url, "no site adapter; using heuristics");
                let fallback: Arc<dyn SiteAdapter> = self.fallback.clone();
                fallback
            }
        }
    }
}
