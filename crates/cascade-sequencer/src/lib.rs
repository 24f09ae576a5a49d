//! Cascade Sequencer
//!
//! Drives groups like school -> faculty -> department where each select is
//! only populated after the page answers a search or the previous choice.
//! Each run is an explicit state machine on its own tokio task, polling on
//! a fixed interval with a bounded retry budget. At most one run is active
//! per page; arming a new one cancels the previous run's timer.

pub mod model;
pub mod policy;
pub mod runner;
pub mod search;
pub mod sequencer;
pub mod values;

pub use model::{
    CascadeField, CascadeGroup, CascadeReport, CascadeStage, CascadeState, SelectedBy,
    StageSelection,
};
pub use policy::CascadePolicy;
pub use sequencer::{CascadeHandle, CascadeSequencer};
pub use values::{CascadeValues, StageValue};
