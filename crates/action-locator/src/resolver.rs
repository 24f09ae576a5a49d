//! Locator resolution with fallback chain orchestration

use page_model::{NodeId, Page};
use tracing::debug;

use crate::strategies::{ClassStrategy, IdStrategy, NameStrategy, StructuralStrategy, Strategy};
use crate::types::{Locator, LocatorStrategy};

/// Controls a locator resolved to and the strategy that found them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub nodes: Vec<NodeId>,
    pub strategy: Option<LocatorStrategy>,
}

impl Resolution {
    pub fn unresolved() -> Self {
        Self {
            nodes: Vec::new(),
            strategy: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub struct LocatorResolver {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for LocatorResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LocatorResolver {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(IdStrategy),
                Box::new(NameStrategy),
                Box::new(ClassStrategy),
                Box::new(StructuralStrategy),
            ],
        }
    }

    fn get_strategy(&self, strategy_type: LocatorStrategy) -> Option<&dyn Strategy> {
        self.strategies
            .iter()
            .find(|s| s.strategy_type() == strategy_type)
            .map(|s| s.as_ref())
    }

    /// First recorded strategy that matches at least one control wins.
    pub fn resolve(&self, page: &dyn Page, locator: &Locator) -> Resolution {
        for strategy_type in LocatorStrategy::fallback_chain() {
            let Some(strategy) = self.get_strategy(strategy_type) else {
                continue;
            };
            match strategy.resolve(page, locator) {
                None => continue,
                Some(nodes) if nodes.is_empty() => {
                    debug!(locator = %locator, strategy = strategy.name(), "strategy matched nothing");
                }
                Some(nodes) => {
                    debug!(
                        locator = %locator,
                        strategy = strategy.name(),
                        count = nodes.len(),
                        "locator resolved"
                    );
                    return Resolution {
                        nodes,
                        strategy: Some(strategy_type),
                    };
                }
            }
        }
        Resolution::unresolved()
    }

    /// Resolves with a single strategy, ignoring the rest of the chain.
    pub fn resolve_with_strategy(
        &self,
        page: &dyn Page,
        locator: &Locator,
        strategy_type: LocatorStrategy,
    ) -> Vec<NodeId> {
        self.get_strategy(strategy_type)
            .and_then(|strategy| strategy.resolve(page, locator))
            .unwrap_or_default()
    }
}

/// Resolves through the default chain.
pub fn resolve(page: &dyn Page, locator: &Locator) -> Vec<NodeId> {
    LocatorResolver::new().resolve(page, locator).nodes
}
