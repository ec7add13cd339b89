use thiserror::Error;

use crate::vehicle::VehicleId;
use crate::CheckpointIndex;

// an illegal crossing is never an error, see CrossingOutcome::Rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("{vehicle} was never registered with the tracker")]
    UnknownVehicle { vehicle: VehicleId },

    #[error("next checkpoint {index} for {vehicle} is outside the track (0..{count})")]
    IndexOutOfRange {
        vehicle: VehicleId,
        index: CheckpointIndex,
        count: usize,
    },

    #[error("track has no checkpoints")]
    EmptyTrack,

    #[error("checkpoint at position {position} has index {index}")]
    MisplacedCheckpoint {
        position: usize,
        index: CheckpointIndex,
    },

    #[error("tracker lock poisoned by a panicking update")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, TrackerError>;
