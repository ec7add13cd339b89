use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::checkpoint::Checkpoint;
use crate::error::{Result, TrackerError};
use crate::lap_info::{LapNumber, VehicleProgress};
use crate::vehicle::VehicleId;
use crate::CheckpointIndex;

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrossingOutcome {
    Advanced {
        index: CheckpointIndex,
        completed_course: bool,
        lap: LapNumber,
    },
    // wrong checkpoint, or one this vehicle already crossed
    Rejected {
        index: CheckpointIndex,
        expected: CheckpointIndex,
        already_passed: bool,
    },
}

impl CrossingOutcome {
    pub fn is_legal(&self) -> bool {
        matches!(self, CrossingOutcome::Advanced { .. })
    }
}

// The tracker never acts on its own; the simulation reports crossings and
// asks whether they count
pub struct CheckpointTracker {
    checkpoints: Vec<Checkpoint>,
    progress_by_vehicle: HashMap<VehicleId, VehicleProgress>,
}

impl CheckpointTracker {
    pub fn new(checkpoints: Vec<Checkpoint>) -> Result<Self> {
        validate_track(&checkpoints)?;
        info!(count = checkpoints.len(), "checkpoints loaded");

        Ok(CheckpointTracker {
            checkpoints,
            progress_by_vehicle: HashMap::new(),
        })
    }

    pub fn with_checkpoint_count(count: usize) -> Result<Self> {
        Self::new(Checkpoint::track(count))
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn vehicles(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.progress_by_vehicle.keys().copied()
    }

    pub fn is_registered(&self, vehicle: VehicleId) -> bool {
        self.progress_by_vehicle.contains_key(&vehicle)
    }

    // registering twice keeps whatever progress the vehicle already made
    pub fn register(&mut self, vehicle: VehicleId) {
        self.progress_by_vehicle.entry(vehicle).or_insert_with(|| {
            debug!(%vehicle, "registered vehicle");
            VehicleProgress::new()
        });
    }

    pub fn reset(&mut self, vehicle: VehicleId) -> Result<()> {
        self.progress_mut(vehicle)?.reset();
        Ok(())
    }

    pub fn progress(&self, vehicle: VehicleId) -> Result<&VehicleProgress> {
        self.progress_by_vehicle
            .get(&vehicle)
            .ok_or(TrackerError::UnknownVehicle { vehicle })
    }

    pub fn next_expected_index(&self, vehicle: VehicleId) -> Result<CheckpointIndex> {
        Ok(self.progress(vehicle)?.next_expected())
    }

    pub fn next_checkpoint(&self, vehicle: VehicleId) -> Result<&Checkpoint> {
        let index = self.next_expected_index(vehicle)?;
        self.checkpoints
            .get(index)
            .ok_or(TrackerError::IndexOutOfRange {
                vehicle,
                index,
                count: self.checkpoints.len(),
            })
    }

    pub fn can_pass(&self, vehicle: VehicleId, index: CheckpointIndex) -> Result<bool> {
        Ok(self.progress(vehicle)?.can_pass(index))
    }

    // no legality check here, callers ask can_pass first
    pub fn mark_passed(&mut self, vehicle: VehicleId, index: CheckpointIndex) -> Result<()> {
        self.progress_mut(vehicle)?.mark_passed(index);
        Ok(())
    }

    // advancing past a checkpoint that was never passed still goes through
    pub fn advance(&mut self, vehicle: VehicleId) -> Result<()> {
        let count = self.checkpoint_count();
        let progress = self.progress_mut(vehicle)?;

        let skipped = progress.next_expected();
        if !progress.has_passed(skipped) {
            warn!(%vehicle, checkpoint = skipped, "advancing past a checkpoint that was never passed");
        }

        if progress.advance(count) {
            debug!(%vehicle, lap = progress.laps_completed(), "wrapped back to the first checkpoint");
        }
        Ok(())
    }

    // unknown vehicles simply haven't passed anything yet
    pub fn has_been_passed(&self, vehicle: VehicleId, index: CheckpointIndex) -> bool {
        self.progress_by_vehicle
            .get(&vehicle)
            .map_or(false, |progress| progress.has_passed(index))
    }

    pub fn is_last_checkpoint(&self, _vehicle: VehicleId, index: CheckpointIndex) -> bool {
        // construction guarantees at least one checkpoint
        index == self.checkpoint_count() - 1
    }

    // can_pass, mark_passed and advance as a single step
    pub fn on_checkpoint_crossed(
        &mut self,
        vehicle: VehicleId,
        index: CheckpointIndex,
    ) -> Result<CrossingOutcome> {
        let count = self.checkpoint_count();
        let outcome = self.progress_mut(vehicle)?.cross(index, count);
        debug!(%vehicle, checkpoint = index, ?outcome, "checkpoint crossed");
        Ok(outcome)
    }

    fn progress_mut(&mut self, vehicle: VehicleId) -> Result<&mut VehicleProgress> {
        self.progress_by_vehicle
            .get_mut(&vehicle)
            .ok_or(TrackerError::UnknownVehicle { vehicle })
    }
}

// checkpoints must be supplied as the dense sequence 0..N in order
pub(crate) fn validate_track(checkpoints: &[Checkpoint]) -> Result<()> {
    if checkpoints.is_empty() {
        return Err(TrackerError::EmptyTrack);
    }

    for (position, checkpoint) in checkpoints.iter().enumerate() {
        if checkpoint.index() != position {
            return Err(TrackerError::MisplacedCheckpoint {
                position,
                index: checkpoint.index(),
            });
        }
    }
    Ok(())
}
