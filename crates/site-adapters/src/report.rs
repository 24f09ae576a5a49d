use cascade_sequencer::{CascadeHandle, CascadeReport};
use element_classifier::split_group;
use entryfill_core_types::{EngineIssue, FieldValue};
use fill_engine::{FillError, FillSession, FillTally};
use page_model::{NodeId, Page, PageExt};
use serde::Serialize;
use tracing::warn;

/// Outcome of one fill call.
#[derive(Clone, Debug)]
pub struct FillReport {
    pub adapter: String,
    pub pattern: Option<String>,
    /// Writes applied synchronously; a running cascade is not counted.
    pub filled_count: usize,
    pub tally: FillTally,
    pub issues: Vec<EngineIssue>,
    pub cascade: Option<CascadeHandle>,
}

impl FillReport {
    pub fn summary(&self) -> FillSummary {
        FillSummary {
            adapter: self.adapter.clone(),
            pattern: self.pattern.clone(),
            filled_count: self.filled_count,
            tally: self.tally,
            issues: self.issues.clone(),
            cascade: self.cascade.as_ref().map(CascadeHandle::report),
        }
    }

    /// Summary after the cascade (if any) has reached a terminal state.
    pub async fn settled_summary(&self) -> FillSummary {
        let mut summary = self.summary();
        if let Some(handle) = &self.cascade {
            let report = handle.finished().await;
            if let Some(issue) = report.issue() {
                summary.issues.push(issue);
            }
            summary.cascade = Some(report);
        }
        summary
    }
}

/// Serializable snapshot of a `FillReport`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FillSummary {
    pub adapter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub filled_count: usize,
    pub tally: FillTally,
    pub issues: Vec<EngineIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade: Option<CascadeReport>,
}

/// Per-call bookkeeping shared by the adapters.
pub(crate) struct FillRun {
    pub session: FillSession,
    pub issues: Vec<EngineIssue>,
    claimed: Vec<NodeId>,
}

impl FillRun {
    pub fn new(session: FillSession) -> Self {
        Self {
            session,
            issues: Vec::new(),
            claimed: Vec::new(),
        }
    }

    /// Controls already written (or offered a value) this run, including
    /// every member of a claimed split or radio group.
    pub fn claimed(&self) -> &[NodeId] {
        &self.claimed
    }

    pub fn is_claimed(&self, page: &dyn Page, node: NodeId) -> bool {
        self.claimed.contains(&node) || self.session.visited(page, node)
    }

    fn claim(&mut self, page: &dyn Page, node: NodeId) {
        if let Some(group) = split_group(page, node) {
            self.claimed.extend(group.members().iter().copied());
        }
        if let Some(name) = page
            .element(node)
            .filter(|el| el.input_type() == "radio")
            .and_then(|el| el.name().map(str::to_string))
        {
            self.claimed.extend(
                page.elements_where(|el| el.input_type() == "radio" && el.name() == Some(name.as_str())),
            );
        }
        self.claimed.push(node);
    }

    /// Applies `value` to `nodes`, logging instead of failing.
    pub fn apply(&mut self, page: &dyn Page, field: &str, nodes: &[NodeId], value: &FieldValue) -> FillTally {
        for node in nodes {
            self.claim(page, *node);
        }
        match self.session.apply_field(page, field, nodes, value) {
            Ok(tally) => tally,
            Err(FillError::Disabled) => FillTally::default(),
            Err(err) => {
                warn!(field, error = %err, "field write failed");
                FillTally::default()
            }
        }
    }

    pub fn unresolvable(&mut self, field: &str) {
        let issue = EngineIssue::UnresolvableLocator {
            field: field.to_string(),
        };
        warn!(%issue, "field skipped");
        self.issues.push(issue);
        self.session.record_unresolvable();
    }

    pub fn issue(&mut self, issue: EngineIssue) {
        self.issues.push(issue);
    }

    pub fn finish(self, adapter: &str, pattern: Option<String>, cascade: Option<CascadeHandle>) -> FillReport {
        let tally = self.session.tally();
        FillReport {
            adapter: adapter.to_string(),
            pattern,
            filled_count: tally.filled_count(),
            tally,
            issues: self.issues,
            cascade,
        }
    }
}
