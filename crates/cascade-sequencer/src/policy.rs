use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadePolicy {
    pub max_search_attempts: u32,
    /// How long each attempt waits for options to appear.
    pub option_wait_ms: u64,
    pub poll_interval_ms: u64,
    /// Options are available once the select holds more than this many.
    pub min_options: usize,
    /// Visible labels of the page's search button.
    pub search_phrases: Vec<String>,
    /// Option texts that switch a select to manual entry.
    pub not_in_list_phrases: Vec<String>,
}

impl CascadePolicy {
    pub fn option_wait(&self) -> Duration {
        Duration::from_millis(self.option_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for CascadePolicy {
    fn default() -> Self {
        Self {
            max_search_attempts: 3,
            option_wait_ms: 5000,
            poll_interval_ms: 250,
            min_options: 1,
            search_phrases: vec!["検索".into(), "search".into()],
            not_in_list_phrases: vec!["リストにない".into(), "その他".into(), "not in list".into()],
        }
    }
}
