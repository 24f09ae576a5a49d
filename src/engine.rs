//! The engine facade: learn, fill and inspect over the `Page` port.
//!
//! Performs no storage I/O; callers load profiles and patterns and persist
//! whatever comes back.

use std::sync::Arc;

use cascade_sequencer::CascadeSequencer;
use element_classifier::{collect, ControlSummary};
use entryfill_core_types::PageId;
use fill_engine::FillPolicy;
use learning_engine::{learn, LearnOptions, LearnReport, Pattern};
use page_model::Page;
use profile_model::Profile;
use site_adapters::{
    AdapterRegistry, FillContext, FillReport, KeywordTable, PageSignature, PatternAdapter, SiteAdapter,
};
use tracing::{info, instrument};

use crate::config::EntryfillConfig;

#[derive(Clone)]
pub struct AutofillEngine {
    learn_options: LearnOptions,
    context: FillContext,
    registry: AdapterRegistry,
}

impl Default for AutofillEngine {
    fn default() -> Self {
        Self::new(&EntryfillConfig::default(), KeywordTable::builtin())
    }
}

impl AutofillEngine {
    pub fn new(config: &EntryfillConfig, keywords: KeywordTable) -> Self {
        Self {
            learn_options: config.learn.clone(),
            context: FillContext::new(
                config.fill.clone(),
                CascadeSequencer::new(config.cascade.clone(), config.fill.clone()),
            ),
            registry: AdapterRegistry::with_builtin(keywords),
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn fill_policy(&self) -> &FillPolicy {
        &self.context.policy
    }

    /// Learns a pattern called `name` from a page a person has filled.
    pub fn learn(&self, page: &dyn Page, profile: &Profile, name: &str) -> LearnReport {
        let options = LearnOptions {
            pattern_name: name.to_string(),
            ..self.learn_options.clone()
        };
        learn(page, profile, &options)
    }

    /// Replays `pattern`; the heuristic-only pattern defers to whichever
    /// site adapter claims the page.
    #[instrument(skip_all, fields(pattern = %pattern.name()))]
    pub fn fill(&self, page: Arc<dyn Page>, profile: &Profile, pattern: &Pattern) -> FillReport {
        if pattern.is_heuristic_only() {
            return self.fill_site(page, profile);
        }
        let adapter = PatternAdapter::new(pattern.clone(), self.registry.heuristic().clone());
        adapter.fill(&page, profile, &self.context)
    }

    /// Fills with the adapter selected by the page's signature.
    pub fn fill_site(&self, page: Arc<dyn Page>, profile: &Profile) -> FillReport {
        let signature = PageSignature::of(page.as_ref());
        let adapter = self.registry.select(&signature);
        info!(adapter = adapter.name(), url = %signature.url, "filling page");
        adapter.fill(&page, profile, &self.context)
    }

    pub fn inspect(&self, page: &dyn Page) -> Vec<ControlSummary> {
        collect(page)
    }

    /// Stops the cascade running on `page`, if any.
    pub fn cancel_cascade(&self, page: &PageId) -> bool {
        self.context.sequencer.cancel(page)
    }
}
