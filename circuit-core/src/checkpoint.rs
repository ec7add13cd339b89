use serde::{Deserialize, Serialize};

use crate::CheckpointIndex;

// A single waypoint on the track. It only knows where it sits in the
// sequence; all per-vehicle state lives in the tracker
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    index: CheckpointIndex,
}

impl Checkpoint {
    pub fn new(index: CheckpointIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> CheckpointIndex {
        self.index
    }

    // the dense sequence 0..count, in authoring order
    pub fn track(count: usize) -> Vec<Checkpoint> {
        (0..count).map(Checkpoint::new).collect()
    }
}
