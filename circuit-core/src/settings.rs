use std::path::Path;

use config::{Config, ConfigError, File, Source};
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server_tick_ms: u64,
    pub vehicle_amount: u32,
    pub checkpoint_count: usize,
    pub realtime: bool,
    pub log_filter: String,
    #[serde(default)]
    pub rewards: RewardSettings,
    #[serde(default)]
    pub stall: StallSettings,
}

// Reward constants handed to every driver agent; the defaults are the values
// the training runs were tuned against
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RewardSettings {
    pub step_penalty: f64,
    pub checkpoint_scale: f64,
    pub time_bonus_divisor: f64,
    pub course_bonus: f64,
    pub wrong_checkpoint_penalty: f64,
    pub wall_hit_penalty: f64,
    pub wall_contact_penalty: f64,
    pub stall_penalty: f64,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            step_penalty: -0.01,
            checkpoint_scale: 1.5,
            time_bonus_divisor: 5.0,
            course_bonus: 5.0,
            wrong_checkpoint_penalty: -0.5,
            wall_hit_penalty: -0.5,
            wall_contact_penalty: -0.01,
            stall_penalty: -5.0,
        }
    }
}

// A vehicle that hasn't moved `movement_threshold` units within
// `time_threshold_secs` is considered stuck
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct StallSettings {
    pub movement_threshold: f64,
    pub time_threshold_secs: f64,
}

impl Default for StallSettings {
    fn default() -> Self {
        Self {
            movement_threshold: 1.0,
            time_threshold_secs: 8.0,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Settings, ConfigError> {
        Self::build(File::with_name("config.yaml").required(false))
    }

    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        Self::build(File::from(path))
    }

    fn build<S: Source + Send + Sync + 'static>(source: S) -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .set_default("server_tick_ms", 30)?
            .set_default("vehicle_amount", 1)?
            .set_default("checkpoint_count", 0)?
            .set_default("realtime", false)?
            .set_default("log_filter", "info")?
            .add_source(source)
            .build()?;

        config.try_deserialize()
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings = Settings::new().expect("failed to read config file");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_from_yaml(name: &str, contents: &str) -> Settings {
        let path = std::env::temp_dir().join(format!(
            "circuit-settings-{}-{}.yaml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        let settings = Settings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        settings
    }

    #[test]
    fn defaults_apply_to_missing_keys() {
        let settings = load_from_yaml("defaults", "realtime: false\n");
        assert_eq!(settings.server_tick_ms, 30);
        assert_eq!(settings.vehicle_amount, 1);
        assert_eq!(settings.checkpoint_count, 0);
        assert_eq!(settings.log_filter, "info");
        assert_eq!(settings.rewards, RewardSettings::default());
        assert_eq!(settings.stall, StallSettings::default());
    }

    #[test]
    fn partial_reward_overrides_keep_other_defaults() {
        let settings = load_from_yaml(
            "overrides",
            "checkpoint_count: 12\nvehicle_amount: 4\nrewards:\n  course_bonus: 10.0\n",
        );

        assert_eq!(settings.checkpoint_count, 12);
        assert_eq!(settings.vehicle_amount, 4);
        assert_eq!(settings.rewards.course_bonus, 10.0);
        assert_eq!(settings.rewards.checkpoint_scale, 1.5);
        assert_eq!(settings.stall.time_threshold_secs, 8.0);
    }
}
