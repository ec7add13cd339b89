use std::io::BufRead;

use circuit_core::error::TrackerError;
use circuit_core::vehicle::VehicleId;
use circuit_core::CheckpointIndex;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// SimEvents are what the simulation reports about a single vehicle; the
// physics engine decides when they happen, we only react to them
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    Moved { position: DVec3 },
    CheckpointCrossed { index: CheckpointIndex },
    WallHit,
    WallContact,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RecordedEvent {
    // seconds since the start of the recording
    pub time: f64,
    pub vehicle: VehicleId,
    pub event: SimEvent,
}

// a week of simulated driving; anything later is a corrupt recording
pub const MAX_EVENT_TIME_SECS: f64 = 7.0 * 24.0 * 60.0 * 60.0;

pub fn is_valid_time(time: f64) -> bool {
    time.is_finite() && (0.0..=MAX_EVENT_TIME_SECS).contains(&time)
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("failed to read event log: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed event on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("event on line {line} has unusable time {time}")]
    InvalidTime { line: usize, time: f64 },

    #[error("event on line {line} goes back in time ({time} < {previous})")]
    OutOfOrder { line: usize, time: f64, previous: f64 },

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

// one JSON object per line, blank lines ignored, times must never decrease
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<RecordedEvent>, ReplayError> {
    let mut events = Vec::new();
    let mut previous = 0.0;

    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event: RecordedEvent =
            serde_json::from_str(&line).map_err(|source| ReplayError::Parse {
                line: line_number,
                source,
            })?;

        if !is_valid_time(event.time) {
            return Err(ReplayError::InvalidTime {
                line: line_number,
                time: event.time,
            });
        }

        if event.time < previous {
            return Err(ReplayError::OutOfOrder {
                line: line_number,
                time: event.time,
                previous,
            });
        }
        previous = event.time;
        events.push(event);
    }

    Ok(events)
}
