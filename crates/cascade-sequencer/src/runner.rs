use std::sync::Arc;

use action_locator::resolve;
use element_classifier::resync_cosmetic;
use entryfill_core_types::FieldValue;
use fill_engine::{apply, write_text, FillPolicy};
use page_model::{DomEvent, NodeId, Page};
use tokio::sync::watch;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::model::{CascadeGroup, CascadeReport, CascadeState, SelectedBy, StageSelection};
use crate::policy::CascadePolicy;
use crate::search::{choose_option, find_search_button, option_count};
use crate::values::{CascadeValues, StageValue};

pub(crate) struct RunContext {
    pub page: Arc<dyn Page>,
    pub group: CascadeGroup,
    pub values: CascadeValues,
    pub policy: CascadePolicy,
    pub fill_policy: FillPolicy,
    pub cancel: CancellationToken,
    pub progress: watch::Sender<CascadeReport>,
}

struct Cancelled;

impl RunContext {
    fn transition(&self, report: &mut CascadeReport, state: CascadeState) {
        debug!(group = %self.group.name, ?state, "cascade transition");
        report.state = state;
        self.progress.send_replace(report.clone());
    }

    fn first_node(&self, stage: usize) -> Option<NodeId> {
        let locator = &self.group.stages.get(stage)?.select;
        resolve(self.page.as_ref(), locator).into_iter().next()
    }

    fn options_ready(&self, stage: usize) -> Option<NodeId> {
        let node = self.first_node(stage)?;
        (option_count(self.page.as_ref(), node) > self.policy.min_options).then_some(node)
    }

    fn fill_prereqs(&self) {
        for (field, value) in &self.values.prereqs {
            let nodes = resolve(self.page.as_ref(), &field.locator);
            if nodes.is_empty() {
                warn!(group = %self.group.name, field = %field.path, "prerequisite control not found");
                continue;
            }
            for node in nodes {
                if let Err(err) = apply(self.page.as_ref(), node, value, &self.fill_policy) {
                    warn!(field = %field.path, error = %err, "prerequisite write failed");
                }
            }
        }
    }

    /// Stage 0 clicks the page's search control; later stages re-fire
    /// `change` on the previous select.
    fn trigger(&self, stage: usize) {
        let page = self.page.as_ref();
        let target = if stage == 0 {
            find_search_button(page, &self.policy.search_phrases)
        } else {
            self.first_node(stage - 1)
        };
        let event = if stage == 0 { DomEvent::Click } else { DomEvent::Change };
        match target {
            Some(node) => {
                if let Err(err) = page.dispatch(node, event) {
                    warn!(stage, error = %err, "trigger dispatch failed");
                }
            }
            None => debug!(stage, "no trigger control on page"),
        }
    }

    async fn wait_for_options(&self, stage: usize) -> Result<Option<NodeId>, Cancelled> {
        let deadline = Instant::now() + self.policy.option_wait();
        let mut ticker = interval(self.policy.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(Cancelled),
                _ = sleep_until(deadline) => return Ok(self.options_ready(stage)),
                _ = ticker.tick() => {
                    if let Some(node) = self.options_ready(stage) {
                        return Ok(Some(node));
                    }
                }
            }
        }
    }

    async fn await_stage_options(&self, report: &mut CascadeReport, stage: usize) -> Result<Option<NodeId>, Cancelled> {
        if let Some(node) = self.options_ready(stage) {
            return Ok(Some(node));
        }
        for attempt in 1..=self.policy.max_search_attempts {
            self.trigger(stage);
            self.transition(report, CascadeState::SearchTriggered { stage, attempt });
            if let Some(node) = self.wait_for_options(stage).await? {
                return Ok(Some(node));
            }
            debug!(stage, attempt, "options still missing");
        }
        Ok(None)
    }

    fn select(&self, stage: usize, select: NodeId, wanted: &StageValue) -> Option<StageSelection> {
        let page = self.page.as_ref();
        let stage_def = self.group.stages.get(stage)?;
        let (value, by) = choose_option(page, select, wanted, &self.policy.not_in_list_phrases)?;
        if let Err(err) = write_text(page, select, &value, &self.fill_policy) {
            warn!(stage = %stage_def.name, error = %err, "stage write failed");
            return None;
        }
        if let Err(err) = resync_cosmetic(page, select) {
            debug!(error = %err, "cosmetic resync failed");
        }
        if by == SelectedBy::NotInList {
            let free = wanted.text.clone().or_else(|| wanted.code.clone()).unwrap_or_default();
            match stage_def.free_text.as_ref().map(|locator| resolve(page, locator)) {
                Some(nodes) if !nodes.is_empty() => {
                    for node in nodes {
                        if let Err(err) = apply(page, node, &FieldValue::text(free.clone()), &self.fill_policy) {
                            warn!(stage = %stage_def.name, error = %err, "free-text write failed");
                        }
                    }
                }
                _ => warn!(stage = %stage_def.name, "manual-entry option chosen but no free-text control"),
            }
        }
        Some(StageSelection {
            stage: stage_def.name.clone(),
            value,
            by,
        })
    }

    async fn drive(&self, report: &mut CascadeReport) -> Result<(), Cancelled> {
        self.fill_prereqs();
        self.transition(report, CascadeState::PrereqsSet);

        for (stage, wanted) in self.values.stages.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(Cancelled);
            }
            let Some(spec) = self.group.stages.get(stage) else {
                break;
            };
            let name = spec.name.clone();
            if wanted.is_empty() {
                debug!(stage = %name, "no value for stage; chain ends here");
                break;
            }

            if let Some(node) = self.first_node(stage) {
                let current = self.page.element(node).map(|el| el.value).unwrap_or_default();
                if !current.trim().is_empty() {
                    report.selections.push(StageSelection {
                        stage: name,
                        value: current,
                        by: SelectedBy::Existing,
                    });
                    self.transition(report, CascadeState::Selected { stage });
                    continue;
                }
            }

            let Some(select) = self.await_stage_options(report, stage).await? else {
                let reason = format!(
                    "stage '{name}' had no options after {} search attempts",
                    self.policy.max_search_attempts
                );
                self.transition(report, CascadeState::Stalled { reason });
                return Ok(());
            };
            self.transition(report, CascadeState::OptionsAvailable { stage });

            let Some(selection) = self.select(stage, select, wanted) else {
                let reason = format!("stage '{name}' has no option for the profile value");
                self.transition(report, CascadeState::Stalled { reason });
                return Ok(());
            };
            report.selections.push(selection);
            self.transition(report, CascadeState::Selected { stage });
        }

        self.transition(report, CascadeState::Done);
        Ok(())
    }
}

#[instrument(skip_all, fields(group = %ctx.group.name, page = %ctx.page.page_id()))]
pub(crate) async fn run(ctx: RunContext) -> CascadeReport {
    let mut report = ctx.progress.borrow().clone();
    if ctx.drive(&mut report).await.is_err() {
        ctx.transition(&mut report, CascadeState::Cancelled);
    }
    match report.issue() {
        Some(issue) => warn!(%issue, "cascade incomplete"),
        None => info!(state = ?report.state, selections = report.selections.len(), "cascade finished"),
    }
    report
}
