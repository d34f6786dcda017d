use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tuning for one player. Every field has a default, so a config file only needs what it
/// changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Virtual milliseconds covered by one step at 1x
    pub base_step_ms: f64,
    /// Real milliseconds between steps, the same at every speed
    pub tick_interval_ms: u64,
    pub default_speed: f64,
    /// What speed_up and slow_down move between, ascending
    pub speed_options: Vec<f64>,
    /// How far seek_relative moves per keypress
    pub seek_step_ms: i64,
    /// For trajectories that don't specify one
    pub default_color: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_step_ms: 100.0,
            tick_interval_ms: 100,
            default_speed: 1.0,
            speed_options: vec![0.5, 1.0, 2.0, 4.0, 8.0],
            seek_step_ms: 5000,
            default_color: ingest::DEFAULT_COLOR.to_string(),
        }
    }
}

impl PlayerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs_err::read_to_string(path)?;
        let mut config: PlayerConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Bad player config in {}", path.display()))?;
        config.check()?;
        config
            .speed_options
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        config.speed_options.dedup();
        Ok(config)
    }

    pub fn check(&self) -> Result<()> {
        if !(self.base_step_ms.is_finite() && self.base_step_ms > 0.0) {
            bail!("base_step_ms must be positive, not {}", self.base_step_ms);
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be positive");
        }
        if !is_valid_speed(self.default_speed) {
            bail!("default_speed must be positive, not {}", self.default_speed);
        }
        if let Some(x) = self.speed_options.iter().find(|x| !is_valid_speed(**x)) {
            bail!("speed_options must all be positive, not {}", x);
        }
        if self.seek_step_ms <= 0 {
            bail!("seek_step_ms must be positive, not {}", self.seek_step_ms);
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    pub fn seek_step(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.seek_step_ms)
    }
}

pub fn is_valid_speed(speed: f64) -> bool {
    speed.is_finite() && speed > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: PlayerConfig =
            serde_json::from_str(r#"{"tick_interval_ms": 50, "speed_options": [1, 16]}"#).unwrap();
        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.speed_options, vec![1.0, 16.0]);
        assert_eq!(config.base_step_ms, 100.0);
        assert_eq!(config.default_color, "#FF5722");
        assert!(config.check().is_ok());
    }

    #[test]
    fn rejects_nonsense() {
        let mut config = PlayerConfig::default();
        config.default_speed = 0.0;
        assert!(config.check().is_err());

        let mut config = PlayerConfig::default();
        config.speed_options.push(-2.0);
        assert!(config.check().is_err());

        let mut config = PlayerConfig::default();
        config.tick_interval_ms = 0;
        assert!(config.check().is_err());
    }

    #[test]
    fn load_sorts_speeds() {
        let path = std::env::temp_dir().join(format!("player-config-{}.json", std::process::id()));
        fs_err::write(&path, r#"{"speed_options": [4, 0.5, 2, 2]}"#).unwrap();
        let config = PlayerConfig::load(&path).unwrap();
        fs_err::remove_file(&path).unwrap();
        assert_eq!(config.speed_options, vec![0.5, 2.0, 4.0]);
    }
}
