use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Outcome counters for a control, a group or a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillTally {
    /// Controls or groups a value was offered to.
    pub attempted: usize,
    /// Writes performed (a split group counts one per segment written).
    pub applied: usize,
    pub skipped_already_filled: usize,
    pub skipped_unresolvable: usize,
    /// Resolved, but no option, radio or segment accepted the value.
    pub unmatched: usize,
    /// The value's type does not suit the control.
    pub incompatible: usize,
}

impl FillTally {
    pub fn filled_count(&self) -> usize {
        self.applied
    }

    pub fn applied(count: usize) -> Self {
        Self {
            attempted: 1,
            applied: count,
            ..Self::default()
        }
    }

    pub fn already_filled() -> Self {
        Self {
            attempted: 1,
            skipped_already_filled: 1,
            ..Self::default()
        }
    }

    pub fn unresolvable() -> Self {
        Self {
            attempted: 1,
            skipped_unresolvable: 1,
            ..Self::default()
        }
    }

    pub fn unmatched() -> Self {
        Self {
            attempted: 1,
            unmatched: 1,
            ..Self::default()
        }
    }

    pub fn incompatible() -> Self {
        Self {
            attempted: 1,
            incompatible: 1,
            ..Self::default()
        }
    }
}

impl Add for FillTally {
    type Output = FillTally;

    fn add(self, other: FillTally) -> FillTally {
        FillTally {
            attempted: self.attempted + other.attempted,
            applied: self.applied + other.applied,
            skipped_already_filled: self.skipped_already_filled + other.skipped_already_filled,
            skipped_unresolvable: self.skipped_unresolvable + other.skipped_unresolvable,
            unmatched: self.unmatched + other.unmatched,
            incompatible: self.incompatible + other.incompatible,
        }
    }
}

impl AddAssign for FillTally {
    fn add_assign(&mut self, other: FillTally) {
        *self = *self + other;
    }
}
