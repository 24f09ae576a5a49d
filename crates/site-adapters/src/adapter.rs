use std::sync::Arc;

use cascade_sequencer::CascadeSequencer;
use fill_engine::FillPolicy;
use page_model::Page;
use profile_model::Profile;

use crate::report::FillReport;
use crate::signature::PageSignature;

/// Shared collaborators of one fill call.
#[derive(Clone, Default)]
pub struct FillContext {
    pub policy: FillPolicy,
    pub sequencer: CascadeSequencer,
}

impl FillContext {
    pub fn new(policy: FillPolicy, sequencer: CascadeSequencer) -> Self {
        Self { policy, sequencer }
    }
}

/// One strategy for filling a family of pages.
pub trait SiteAdapter: Send + Sync {
    fn name(&self) -> &str;

    fn matches(&self, signature: &PageSignature) -> bool;

    /// Writes `profile` into `page`. Never fails as a whole; per-field
    /// problems are returned as issues.
    fn fill(&self, page: &Arc<dyn Page>, profile: &Profile, ctx: &FillContext) -> FillReport;
}
