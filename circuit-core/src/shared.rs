use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::checkpoint::Checkpoint;
use crate::error::{Result, TrackerError};
use crate::lap_info::VehicleProgress;
use crate::tracker::{validate_track, CrossingOutcome};
use crate::vehicle::VehicleId;
use crate::CheckpointIndex;

type ProgressEntry = Arc<Mutex<VehicleProgress>>;

// Each vehicle's progress has its own lock; the map is only write-locked
// while registering
pub struct SharedTracker {
    checkpoints: Vec<Checkpoint>,
    progress_by_vehicle: RwLock<HashMap<VehicleId, ProgressEntry>>,
}

impl SharedTracker {
    pub fn new(checkpoints: Vec<Checkpoint>) -> Result<Self> {
        validate_track(&checkpoints)?;
        Ok(SharedTracker {
            checkpoints,
            progress_by_vehicle: RwLock::new(HashMap::new()),
        })
    }

    pub fn register(&self, vehicle: VehicleId) -> Result<()> {
        let mut vehicles = self
            .progress_by_vehicle
            .write()
            .map_err(|_| TrackerError::Poisoned)?;
        vehicles.entry(vehicle).or_insert_with(|| {
            debug!(%vehicle, "registered vehicle");
            Arc::new(Mutex::new(VehicleProgress::new()))
        });
        Ok(())
    }

    pub fn reset(&self, vehicle: VehicleId) -> Result<()> {
        self.with_progress(vehicle, |progress| progress.reset())
    }

    pub fn next_expected_index(&self, vehicle: VehicleId) -> Result<CheckpointIndex> {
        self.with_progress(vehicle, |progress| progress.next_expected())
    }

    pub fn next_checkpoint(&self, vehicle: VehicleId) -> Result<Checkpoint> {
        let index = self.next_expected_index(vehicle)?;
        self.checkpoints
            .get(index)
            .copied()
            .ok_or(TrackerError::IndexOutOfRange {
                vehicle,
                index,
                count: self.checkpoints.len(),
            })
    }

    pub fn can_pass(&self, vehicle: VehicleId, index: CheckpointIndex) -> Result<bool> {
        self.with_progress(vehicle, |progress| progress.can_pass(index))
    }

    pub fn has_been_passed(&self, vehicle: VehicleId, index: CheckpointIndex) -> bool {
        self.with_progress(vehicle, |progress| progress.has_passed(index))
            .unwrap_or(false)
    }

    pub fn is_last_checkpoint(&self, _vehicle: VehicleId, index: CheckpointIndex) -> bool {
        index == self.checkpoints.len() - 1
    }

    pub fn on_checkpoint_crossed(
        &self,
        vehicle: VehicleId,
        index: CheckpointIndex,
    ) -> Result<CrossingOutcome> {
        let count = self.checkpoints.len();
        let outcome = self.with_progress(vehicle, |progress| progress.cross(index, count))?;
        debug!(%vehicle, checkpoint = index, ?outcome, "checkpoint crossed");
        Ok(outcome)
    }

    fn entry(&self, vehicle: VehicleId) -> Result<ProgressEntry> {
        let vehicles = self
            .progress_by_vehicle
            .read()
            .map_err(|_| TrackerError::Poisoned)?;
        vehicles
            .get(&vehicle)
            .cloned()
            .ok_or(TrackerError::UnknownVehicle { vehicle })
    }

    fn with_progress<T>(
        &self,
        vehicle: VehicleId,
        f: impl FnOnce(&mut VehicleProgress) -> T,
    ) -> Result<T> {
        let entry = self.entry(vehicle)?;
        let mut progress = entry.lock().map_err(|_| TrackerError::Poisoned)?;
        Ok(f(&mut progress))
    }
}
