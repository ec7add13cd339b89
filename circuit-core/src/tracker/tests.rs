use crate::checkpoint::Checkpoint;
use crate::error::TrackerError;
use crate::vehicle::VehicleId;

use super::{CheckpointTracker, CrossingOutcome};

fn get_track(count: usize) -> CheckpointTracker {
    CheckpointTracker::with_checkpoint_count(count).unwrap()
}

fn get_track_with_vehicle(count: usize, vehicle: VehicleId) -> CheckpointTracker {
    let mut tracker = get_track(count);
    tracker.register(vehicle);
    tracker
}

// drives a legal crossing the way the simulation layer does it by hand
fn pass(tracker: &mut CheckpointTracker, vehicle: VehicleId, index: usize) {
    assert!(tracker.can_pass(vehicle, index).unwrap());
    tracker.mark_passed(vehicle, index).unwrap();
    tracker.advance(vehicle).unwrap();
}

#[test]
fn test_empty_track_is_rejected() {
    assert_eq!(
        CheckpointTracker::new(Vec::new()).err(),
        Some(TrackerError::EmptyTrack)
    );
}

#[test]
fn test_checkpoints_must_be_in_authoring_order() {
    let checkpoints = vec![Checkpoint::new(0), Checkpoint::new(2), Checkpoint::new(1)];
    assert_eq!(
        CheckpointTracker::new(checkpoints).err(),
        Some(TrackerError::MisplacedCheckpoint {
            position: 1,
            index: 2
        })
    );
}

#[test]
fn test_registered_vehicle_starts_at_first_checkpoint() {
    let vehicle = VehicleId(7);
    let tracker = get_track_with_vehicle(4, vehicle);

    assert_eq!(tracker.next_expected_index(vehicle), Ok(0));
    assert_eq!(tracker.next_checkpoint(vehicle).unwrap().index(), 0);
    assert!(tracker.progress(vehicle).unwrap().passed().is_empty());
}

#[test]
fn test_can_pass_only_the_next_expected_checkpoint() {
    let vehicle = VehicleId(1);
    let mut tracker = get_track_with_vehicle(5, vehicle);
    pass(&mut tracker, vehicle, 0);
    pass(&mut tracker, vehicle, 1);

    for index in 0..5 {
        let expected = index == 2;
        assert_eq!(tracker.can_pass(vehicle, index), Ok(expected), "index {}", index);
    }
}

#[test]
fn test_next_expected_but_already_passed_is_not_legal() {
    let vehicle = VehicleId(1);
    let mut tracker = get_track_with_vehicle(3, vehicle);
    tracker.mark_passed(vehicle, 0).unwrap();

    assert_eq!(tracker.next_expected_index(vehicle), Ok(0));
    assert_eq!(tracker.can_pass(vehicle, 0), Ok(false));
}

#[test]
fn test_second_crossing_in_same_step_is_not_credited() {
    let vehicle = VehicleId(1);
    let mut tracker = get_track_with_vehicle(3, vehicle);

    pass(&mut tracker, vehicle, 0);
    assert_eq!(tracker.can_pass(vehicle, 0), Ok(false));
    assert_eq!(tracker.next_expected_index(vehicle), Ok(1));
}

#[test]
fn test_lap_wraps_to_first_checkpoint() {
    let vehicle = VehicleId(1);
    let mut tracker = get_track_with_vehicle(4, vehicle);
    for index in 0..4 {
        pass(&mut tracker, vehicle, index);
    }

    assert_eq!(tracker.next_expected_index(vehicle), Ok(0));
    assert_eq!(tracker.progress(vehicle).unwrap().laps_completed(), 1);
    // history sticks around until the next reset, so the start line can't be re-credited
    assert_eq!(tracker.can_pass(vehicle, 0), Ok(false));
}

#[test]
fn test_reset_clears_history() {
    let vehicle = VehicleId(1);
    let mut tracker = get_track_with_vehicle(4, vehicle);
    pass(&mut tracker, vehicle, 0);
    pass(&mut tracker, vehicle, 1);
    tracker.mark_passed(vehicle, 2).unwrap();

    tracker.reset(vehicle).unwrap();

    assert!(!tracker.has_been_passed(vehicle, 2));
    assert!(!tracker.has_been_passed(vehicle, 0));
    assert_eq!(tracker.next_expected_index(vehicle), Ok(0));
    assert_eq!(tracker.can_pass(vehicle, 0), Ok(true));
}

#[test]
fn test_register_twice_keeps_progress() {
    let vehicle = VehicleId(3);
    let mut tracker = get_track_with_vehicle(3, vehicle);
    pass(&mut tracker, vehicle, 0);

    tracker.register(vehicle);

    assert_eq!(tracker.next_expected_index(vehicle), Ok(1));
    assert!(tracker.has_been_passed(vehicle, 0));
}

#[test]
fn test_unknown_vehicle_fails_loudly() {
    let known = VehicleId(0);
    let unknown = VehicleId(42);
    let mut tracker = get_track_with_vehicle(3, known);
    let error = TrackerError::UnknownVehicle { vehicle: unknown };

    assert_eq!(tracker.can_pass(unknown, 0), Err(error.clone()));
    assert_eq!(tracker.reset(unknown), Err(error.clone()));
    assert_eq!(tracker.next_checkpoint(unknown).err(), Some(error.clone()));
    assert_eq!(tracker.mark_passed(unknown, 0), Err(error.clone()));
    assert_eq!(tracker.advance(unknown), Err(error.clone()));
    assert_eq!(tracker.on_checkpoint_crossed(unknown, 0), Err(error));
    assert!(!tracker.is_registered(unknown));
}

#[test]
fn test_has_been_passed_tolerates_unknown_vehicle() {
    let tracker = get_track(3);
    assert!(!tracker.has_been_passed(VehicleId(9), 0));
}

#[test]
fn test_unknown_vehicle_error_names_the_vehicle() {
    let tracker = get_track(3);
    let message = tracker.can_pass(VehicleId(5), 1).unwrap_err().to_string();
    assert!(message.contains("vehicle#5"), "{}", message);
}

#[test]
fn test_is_last_checkpoint_ignores_vehicle() {
    let tracker = get_track(3);
    assert!(tracker.is_last_checkpoint(VehicleId(0), 2));
    assert!(tracker.is_last_checkpoint(VehicleId(99), 2));
    assert!(!tracker.is_last_checkpoint(VehicleId(0), 1));
    assert!(!tracker.is_last_checkpoint(VehicleId(0), 3));
}

#[test]
fn test_is_last_checkpoint_never_fails_on_huge_index() {
    let tracker = get_track(3);
    assert_eq!(tracker.checkpoint_count(), 3);
    assert!(!tracker.is_last_checkpoint(VehicleId(0), usize::MAX));

    let single = get_track(1);
    assert!(single.is_last_checkpoint(VehicleId(0), 0));
    assert!(!single.is_last_checkpoint(VehicleId(0), usize::MAX));
}

#[test]
fn test_vehicles_progress_independently() {
    let first = VehicleId(1);
    let second = VehicleId(2);
    let mut tracker = get_track(3);
    tracker.register(first);
    tracker.register(second);

    pass(&mut tracker, first, 0);
    pass(&mut tracker, first, 1);

    assert_eq!(tracker.next_expected_index(first), Ok(2));
    assert_eq!(tracker.next_expected_index(second), Ok(0));
    assert!(!tracker.has_been_passed(second, 0));
    assert_eq!(tracker.can_pass(second, 0), Ok(true));

    tracker.reset(second).unwrap();
    assert_eq!(tracker.next_expected_index(first), Ok(2));
    assert_eq!(tracker.vehicles().count(), 2);
}

#[test]
fn test_advance_without_pass_still_moves_on() {
    let vehicle = VehicleId(1);
    let mut tracker = get_track_with_vehicle(3, vehicle);

    tracker.advance(vehicle).unwrap();

    assert_eq!(tracker.next_expected_index(vehicle), Ok(1));
    assert!(!tracker.has_been_passed(vehicle, 0));
}

#[test]
fn test_crossing_outcomes() {
    let vehicle = VehicleId(1);
    let mut tracker = get_track_with_vehicle(2, vehicle);

    assert_eq!(
        tracker.on_checkpoint_crossed(vehicle, 1),
        Ok(CrossingOutcome::Rejected {
            index: 1,
            expected: 0,
            already_passed: false
        })
    );
    assert_eq!(
        tracker.on_checkpoint_crossed(vehicle, 0),
        Ok(CrossingOutcome::Advanced {
            index: 0,
            completed_course: false,
            lap: 0
        })
    );
    assert_eq!(
        tracker.on_checkpoint_crossed(vehicle, 0),
        Ok(CrossingOutcome::Rejected {
            index: 0,
            expected: 1,
            already_passed: true
        })
    );

    let finish = tracker.on_checkpoint_crossed(vehicle, 1).unwrap();
    assert!(finish.is_legal());
    assert_eq!(
        finish,
        CrossingOutcome::Advanced {
            index: 1,
            completed_course: true,
            lap: 1
        }
    );
    assert_eq!(tracker.next_expected_index(vehicle), Ok(0));
}

#[test]
fn test_three_checkpoint_course() {
    let vehicle = VehicleId(1);
    let mut tracker = get_track(3);

    tracker.register(vehicle);
    assert_eq!(tracker.next_expected_index(vehicle), Ok(0));
    assert_eq!(tracker.can_pass(vehicle, 0), Ok(true));
    tracker.mark_passed(vehicle, 0).unwrap();
    tracker.advance(vehicle).unwrap();
    assert_eq!(tracker.next_expected_index(vehicle), Ok(1));

    assert_eq!(tracker.can_pass(vehicle, 0), Ok(false));
    assert_eq!(tracker.can_pass(vehicle, 1), Ok(true));
    tracker.mark_passed(vehicle, 1).unwrap();
    tracker.advance(vehicle).unwrap();
    assert_eq!(tracker.next_expected_index(vehicle), Ok(2));

    assert!(tracker.is_last_checkpoint(vehicle, 2));
    assert_eq!(tracker.can_pass(vehicle, 2), Ok(true));
    tracker.mark_passed(vehicle, 2).unwrap();
    tracker.advance(vehicle).unwrap();
    assert_eq!(tracker.next_expected_index(vehicle), Ok(0));
}
