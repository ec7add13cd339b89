use std::collections::BTreeMap;
use std::thread;
use std::time::{Duration, Instant};

use circuit_core::error::TrackerError;
use circuit_core::tracker::CheckpointTracker;
use circuit_core::vehicle::VehicleId;
use circuit_core::Settings;
use glam::DVec3;
use tracing::{debug, info, warn};

use crate::agent::{DriverAgent, EpisodeEnd, EpisodeSummary};
use crate::events::{is_valid_time, RecordedEvent, ReplayError, SimEvent};


// A TrainingSession replays what a simulation recorded, tick by tick, through
// one driver agent per vehicle that all share a single checkpoint tracker
pub struct TrainingSession {
    tracker: CheckpointTracker,
    agents: BTreeMap<VehicleId, DriverAgent>,
    positions: BTreeMap<VehicleId, DVec3>,
    summaries: Vec<EpisodeSummary>,
    tick_ms: u64,
    realtime: bool,
}

impl TrainingSession {
    pub fn new(settings: &Settings) -> Result<TrainingSession, TrackerError> {
        let mut tracker = CheckpointTracker::with_checkpoint_count(settings.checkpoint_count)?;
        let mut agents = BTreeMap::new();
        let mut positions = BTreeMap::new();

        for id in 0..settings.vehicle_amount {
            let vehicle = VehicleId(id);
            tracker.register(vehicle);

            let mut agent =
                DriverAgent::new(vehicle, settings.rewards.clone(), settings.stall.clone());
            agent.begin_episode(&mut tracker, 0.0, DVec3::ZERO)?;
            agents.insert(vehicle, agent);
            positions.insert(vehicle, DVec3::ZERO);
        }

        Ok(TrainingSession {
            tracker,
            agents,
            positions,
            summaries: Vec::new(),
            tick_ms: settings.server_tick_ms.max(1),
            realtime: settings.realtime,
        })
    }

    pub fn tracker(&self) -> &CheckpointTracker {
        &self.tracker
    }

    pub fn agents(&self) -> impl Iterator<Item = &DriverAgent> {
        self.agents.values()
    }

    pub fn summaries(&self) -> &[EpisodeSummary] {
        &self.summaries
    }

    // events have to be sorted by time, which read_events guarantees
    pub fn replay(&mut self, events: &[RecordedEvent]) -> Result<(), ReplayError> {
        let tick_length = Duration::from_millis(self.tick_ms);
        let tick_secs = tick_length.as_secs_f64();

        // events built in code skip read_events, so check times here too
        if let Some((i, event)) = events
            .iter()
            .enumerate()
            .find(|(_, event)| !is_valid_time(event.time))
        {
            return Err(ReplayError::InvalidTime {
                line: i + 1,
                time: event.time,
            });
        }

        let last_tick = match events.last() {
            Some(event) => (event.time / tick_secs).floor() as u64,
            None => return Ok(()),
        };

        let mut pending = events.iter().peekable();
        for tick in 0..=last_tick {
            let start_time = Instant::now();
            let tick_end = (tick + 1) as f64 * tick_secs;

            // handle every event of this tick in recorded order
            while let Some(event) = pending.next_if(|event| event.time < tick_end) {
                self.process_event(event)?;
            }

            self.step_agents(tick_end)?;

            if self.realtime {
                match tick_length.checked_sub(start_time.elapsed()) {
                    Some(remaining) => thread::sleep(remaining),
                    None => warn!(tick, "replay tick took longer than configured length"),
                }
            }
        }

        // events landing exactly on the final boundary
        for event in pending {
            self.process_event(event)?;
        }

        info!(
            ticks = last_tick + 1,
            episodes = self.summaries.len(),
            "replay finished"
        );
        Ok(())
    }

    fn process_event(&mut self, recorded: &RecordedEvent) -> Result<(), ReplayError> {
        let vehicle = recorded.vehicle;
        let agent = self
            .agents
            .get_mut(&vehicle)
            .ok_or(TrackerError::UnknownVehicle { vehicle })?;

        let end = match recorded.event {
            SimEvent::Moved { position } => {
                self.positions.insert(vehicle, position);
                None
            }
            SimEvent::CheckpointCrossed { index } => {
                agent.on_checkpoint_crossed(&mut self.tracker, index, recorded.time)?
            }
            SimEvent::WallHit => {
                agent.on_wall_hit();
                None
            }
            SimEvent::WallContact => {
                agent.on_wall_contact();
                None
            }
        };

        if let Some(end) = end {
            self.end_episode(vehicle, end, recorded.time)?;
        }
        Ok(())
    }

    fn step_agents(&mut self, now: f64) -> Result<(), TrackerError> {
        let mut ended = Vec::new();
        for (vehicle, agent) in self.agents.iter_mut() {
            let position = self.positions.get(vehicle).copied().unwrap_or(DVec3::ZERO);
            if let Some(end) = agent.on_step(now, position) {
                ended.push((*vehicle, end));
            }
        }

        for (vehicle, end) in ended {
            self.end_episode(vehicle, end, now)?;
        }
        Ok(())
    }

    // the next episode starts right away from wherever the vehicle is
    fn end_episode(&mut self, vehicle: VehicleId, end: EpisodeEnd, now: f64) -> Result<(), TrackerError> {
        let agent = self
            .agents
            .get_mut(&vehicle)
            .ok_or(TrackerError::UnknownVehicle { vehicle })?;

        let summary = agent.finish_episode(end);
        debug!(
            %vehicle,
            episode = summary.episode,
            reward = summary.reward,
            checkpoints = summary.checkpoints,
            ?end,
            "episode ended"
        );
        self.summaries.push(summary);

        let position = self.positions.get(&vehicle).copied().unwrap_or(DVec3::ZERO);
        agent.begin_episode(&mut self.tracker, now, position)
    }
}
