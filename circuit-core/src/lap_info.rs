use std::collections::HashSet;

use crate::tracker::CrossingOutcome;
use crate::CheckpointIndex;

pub type LapNumber = u32;

// Where a single vehicle is on the course: the checkpoint it must cross next
// and every checkpoint it has legally crossed since its last reset
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VehicleProgress {
    next_expected: CheckpointIndex,
    passed: HashSet<CheckpointIndex>,
    laps_completed: LapNumber,
}

impl VehicleProgress {
    pub fn new() -> Self {
        VehicleProgress {
            next_expected: 0,
            passed: HashSet::new(),
            laps_completed: 0,
        }
    }

    pub fn next_expected(&self) -> CheckpointIndex {
        self.next_expected
    }

    pub fn passed(&self) -> &HashSet<CheckpointIndex> {
        &self.passed
    }

    pub fn laps_completed(&self) -> LapNumber {
        self.laps_completed
    }

    pub fn has_passed(&self, index: CheckpointIndex) -> bool {
        self.passed.contains(&index)
    }

    // strict in-order traversal: no skipping ahead, no re-triggering
    pub fn can_pass(&self, index: CheckpointIndex) -> bool {
        index == self.next_expected && !self.passed.contains(&index)
    }

    pub fn mark_passed(&mut self, index: CheckpointIndex) {
        self.passed.insert(index);
    }

    // returns true when the vehicle wrapped back around to the first checkpoint
    pub fn advance(&mut self, checkpoint_count: usize) -> bool {
        self.next_expected += 1;
        if self.next_expected >= checkpoint_count {
            self.next_expected = 0;
            self.laps_completed += 1;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.next_expected = 0;
        self.passed.clear();
        self.laps_completed = 0;
    }

    pub(crate) fn cross(&mut self, index: CheckpointIndex, checkpoint_count: usize) -> CrossingOutcome {
        if !self.can_pass(index) {
            return CrossingOutcome::Rejected {
                index,
                expected: self.next_expected,
                already_passed: self.has_passed(index),
            };
        }

        self.mark_passed(index);
        self.advance(checkpoint_count);

        CrossingOutcome::Advanced {
            index,
            completed_course: index == checkpoint_count - 1,
            lap: self.laps_completed,
        }
    }
}
