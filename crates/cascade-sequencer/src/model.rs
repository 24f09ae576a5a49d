use action_locator::Locator;
use entryfill_core_types::EngineIssue;
use serde::{Deserialize, Serialize};

/// A control plus the profile path (relative to the group root) it takes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeField {
    pub path: String,
    pub locator: Locator,
}

/// One dependent select of the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeStage {
    pub name: String,
    pub select: Locator,
    /// Path of the option value to pick (e.g. `dcd`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_path: Option<String>,
    /// Path of the visible option text to pick (e.g. `dname`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_path: Option<String>,
    /// Free-text control used after choosing the "not in list" option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text: Option<Locator>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeGroup {
    pub name: String,
    /// Profile path of the group; an array root means one entry per item.
    pub root: String,
    /// Single-value fields filled before the first search.
    #[serde(default)]
    pub prereqs: Vec<CascadeField>,
    pub stages: Vec<CascadeStage>,
}

/// Sequencer states. `Done`, `Stalled` and `Cancelled` are terminal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CascadeState {
    PendingPrereqs,
    PrereqsSet,
    SearchTriggered { stage: usize, attempt: u32 },
    OptionsAvailable { stage: usize },
    Selected { stage: usize },
    Done,
    Stalled { reason: String },
    Cancelled,
}

impl CascadeState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CascadeState::Done | CascadeState::Stalled { .. } | CascadeState::Cancelled
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectedBy {
    Code,
    Text,
    /// The page's manual-entry option plus its companion text box.
    NotInList,
    /// The select already held a value.
    Existing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSelection {
    pub stage: String,
    pub value: String,
    pub by: SelectedBy,
}

/// Where a cascade run ended up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub group: String,
    /// Which array entry of the group root supplied the values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<usize>,
    pub state: CascadeState,
    #[serde(default)]
    pub selections: Vec<StageSelection>,
}

impl CascadeReport {
    pub fn is_done(&self) -> bool {
        self.state == CascadeState::Done
    }

    pub fn issue(&self) -> Option<EngineIssue> {
        match &self.state {
            CascadeState::Stalled { reason } => Some(EngineIssue::CascadeStalled {
                group: self.group.clone(),
                reason: reason.clone(),
            }),
            _ => None,
        }
    }
}
