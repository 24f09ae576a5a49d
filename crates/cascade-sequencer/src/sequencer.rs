use std::sync::Arc;

use dashmap::DashMap;
use entryfill_core_types::{PageId, RunId};
use fill_engine::FillPolicy;
use page_model::Page;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::model::{CascadeGroup, CascadeReport, CascadeState};
use crate::policy::CascadePolicy;
use crate::runner::{run, RunContext};
use crate::values::CascadeValues;

/// Observes (and can cancel) one armed cascade run.
#[derive(Clone, Debug)]
pub struct CascadeHandle {
    run_id: RunId,
    progress: watch::Receiver<CascadeReport>,
    cancel: CancellationToken,
}

impl CascadeHandle {
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Latest published progress.
    pub fn report(&self) -> CascadeReport {
        self.progress.borrow().clone()
    }

    pub fn state(&self) -> CascadeState {
        self.progress.borrow().state.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits until the run reaches `Done`, `Stalled` or `Cancelled`.
    pub async fn finished(&self) -> CascadeReport {
        let mut progress = self.progress.clone();
        loop {
            {
                let report = progress.borrow_and_update();
                if report.state.is_terminal() {
                    return report.clone();
                }
            }
            if progress.changed().await.is_err() {
                return progress.borrow().clone();
            }
        }
    }
}

/// Arms cascade runs, keeping at most one active per page.
#[derive(Clone, Default)]
pub struct CascadeSequencer {
    active: Arc<DashMap<PageId, (RunId, CancellationToken)>>,
    policy: CascadePolicy,
    fill_policy: FillPolicy,
}

impl CascadeSequencer {
    pub fn new(policy: CascadePolicy, fill_policy: FillPolicy) -> Self {
        Self {
            active: Arc::new(DashMap::new()),
            policy,
            fill_policy,
        }
    }

    pub fn policy(&self) -> &CascadePolicy {
        &self.policy
    }

    pub fn is_active(&self, page: &PageId) -> bool {
        self.active.contains_key(page)
    }

    /// Cancels the page's active run, if any.
    pub fn cancel(&self, page: &PageId) -> bool {
        match self.active.remove(page) {
            Some((_, (run_id, token))) => {
                token.cancel();
                info!(page = %page, run = %run_id.0, "cascade cancelled");
                true
            }
            None => false,
        }
    }

    /// Starts `group` on `page`, cancelling any run already active there.
    ///
    /// Must be called inside a tokio runtime; without one the returned
    /// handle is already `Stalled`.
    pub fn arm(&self, page: Arc<dyn Page>, group: CascadeGroup, values: CascadeValues) -> CascadeHandle {
        let page_id = page.page_id();
        self.cancel(&page_id);

        let run_id = RunId::new();
        let token = CancellationToken::new();
        let initial = CascadeReport {
            group: group.name.clone(),
            entry_index: values.entry_index,
            state: CascadeState::PendingPrereqs,
            selections: Vec::new(),
        };
        let (progress_tx, progress_rx) = watch::channel(initial);
        let handle = CascadeHandle {
            run_id: run_id.clone(),
            progress: progress_rx,
            cancel: token.clone(),
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(group = %group.name, error = %err, "cascade needs an async runtime");
                progress_tx.send_modify(|report| {
                    report.state = CascadeState::Stalled {
                        reason: "no async runtime to poll on".to_string(),
                    }
                });
                return handle;
            }
        };

        self.active
            .insert(page_id.clone(), (run_id.clone(), token.clone()));
        info!(page = %page_id, group = %group.name, run = %run_id.0, "cascade armed");

        let ctx = RunContext {
            page,
            group,
            values,
            policy: self.policy.clone(),
            fill_policy: self.fill_policy.clone(),
            cancel: token,
            progress: progress_tx,
        };
        let active = Arc::clone(&self.active);
        runtime.spawn(async move {
            let report = run(ctx).await;
            active.remove_if(&page_id, |_, (id, _)| *id == run_id);
            report
        });
        handle
    }
}
