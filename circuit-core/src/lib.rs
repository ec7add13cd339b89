pub mod checkpoint;
pub mod error;
pub mod lap_info;
pub mod shared;
pub mod tracker;
pub mod vehicle;
mod settings;

pub use settings::{RewardSettings, Settings, StallSettings, GLOBAL_CONFIG};

pub type CheckpointIndex = usize;
