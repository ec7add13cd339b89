use circuit_core::checkpoint::Checkpoint;
use circuit_core::error::TrackerError;
use circuit_core::tracker::{CheckpointTracker, CrossingOutcome};
use circuit_core::vehicle::VehicleId;
use circuit_core::{CheckpointIndex, RewardSettings, StallSettings};
use glam::DVec3;
use tracing::{debug, info};


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeEnd {
    CourseCompleted,
    Stalled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub vehicle: VehicleId,
    pub episode: u32,
    pub reward: f64,
    pub end: EpisodeEnd,
    pub checkpoints: usize,
}

// DriverAgent is the per-vehicle training glue: it turns what the simulation
// reports into rewards and decides when an episode is over. Positions and
// times come from outside, it never runs any physics itself
pub struct DriverAgent {
    vehicle: VehicleId,
    rewards: RewardSettings,
    stall: StallSettings,

    episode: u32,
    episode_reward: f64,
    total_reward: f64,
    checkpoints_this_episode: usize,

    last_checkpoint_time: f64,
    last_move_time: f64,
    last_position: DVec3,
}

impl DriverAgent {
    pub fn new(vehicle: VehicleId, rewards: RewardSettings, stall: StallSettings) -> Self {
        DriverAgent {
            vehicle,
            rewards,
            stall,
            episode: 0,
            episode_reward: 0.0,
            total_reward: 0.0,
            checkpoints_this_episode: 0,
            last_checkpoint_time: 0.0,
            last_move_time: 0.0,
            last_position: DVec3::ZERO,
        }
    }

    pub fn vehicle(&self) -> VehicleId {
        self.vehicle
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn episode_reward(&self) -> f64 {
        self.episode_reward
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    pub fn next_checkpoint<'a>(&self, tracker: &'a CheckpointTracker) -> Result<&'a Checkpoint, TrackerError> {
        tracker.next_checkpoint(self.vehicle)
    }

    pub fn begin_episode(
        &mut self,
        tracker: &mut CheckpointTracker,
        now: f64,
        position: DVec3,
    ) -> Result<(), TrackerError> {
        tracker.reset(self.vehicle)?;

        self.episode += 1;
        self.episode_reward = 0.0;
        self.checkpoints_this_episode = 0;
        self.last_checkpoint_time = now;
        self.last_move_time = now;
        self.last_position = position;

        debug!(vehicle = %self.vehicle, episode = self.episode, "episode started");
        Ok(())
    }

    // called once per simulation tick with where the vehicle is now
    pub fn on_step(&mut self, now: f64, position: DVec3) -> Option<EpisodeEnd> {
        // time penalty to encourage faster laps
        self.add_reward(self.rewards.step_penalty);

        if position.distance(self.last_position) > self.stall.movement_threshold {
            self.last_move_time = now;
            self.last_position = position;
        }

        if now - self.last_move_time > self.stall.time_threshold_secs {
            self.add_reward(self.rewards.stall_penalty);
            info!(vehicle = %self.vehicle, episode = self.episode, "vehicle stalled, ending episode");
            return Some(EpisodeEnd::Stalled);
        }

        None
    }

    pub fn on_checkpoint_crossed(
        &mut self,
        tracker: &mut CheckpointTracker,
        index: CheckpointIndex,
        now: f64,
    ) -> Result<Option<EpisodeEnd>, TrackerError> {
        match tracker.on_checkpoint_crossed(self.vehicle, index)? {
            CrossingOutcome::Advanced {
                index,
                completed_course,
                ..
            } => {
                // time bonus scales with how long the leg took
                let elapsed = now - self.last_checkpoint_time;
                self.add_reward(elapsed / self.rewards.time_bonus_divisor);
                self.last_checkpoint_time = now;

                // later checkpoints are worth more
                self.add_reward(self.rewards.checkpoint_scale * (index + 1) as f64);
                self.checkpoints_this_episode += 1;

                if completed_course {
                    self.add_reward(self.rewards.course_bonus);
                    info!(vehicle = %self.vehicle, episode = self.episode, "course completed, ending episode");
                    return Ok(Some(EpisodeEnd::CourseCompleted));
                }
                Ok(None)
            }
            CrossingOutcome::Rejected { .. } => {
                self.add_reward(self.rewards.wrong_checkpoint_penalty);
                Ok(None)
            }
        }
    }

    pub fn on_wall_hit(&mut self) {
        self.add_reward(self.rewards.wall_hit_penalty);
    }

    // applied every tick the vehicle stays against a wall
    pub fn on_wall_contact(&mut self) {
        self.add_reward(self.rewards.wall_contact_penalty);
    }

    pub fn finish_episode(&self, end: EpisodeEnd) -> EpisodeSummary {
        EpisodeSummary {
            vehicle: self.vehicle,
            episode: self.episode,
            reward: self.episode_reward,
            end,
            checkpoints: self.checkpoints_this_episode,
        }
    }

    fn add_reward(&mut self, reward: f64) {
        self.episode_reward += reward;
        self.total_reward += reward;
    }
}
