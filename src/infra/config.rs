use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Neighbourhood used by the pathfinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

impl FromStr for Connectivity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "4" | "four" => Ok(Connectivity::Four),
            "8" | "eight" => Ok(Connectivity::Eight),
            _ => Err(()),
        }
    }
}

/// Whether roles stay as first assigned or are re-evaluated every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleMode {
    Sticky,
    Adaptive,
}

impl FromStr for RoleMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sticky" => Ok(RoleMode::Sticky),
            "adaptive" => Ok(RoleMode::Adaptive),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DangerConfig {
    pub enemy_los_base: u32,
    pub enemy_los_decay: u32,
    /// Cells painted along each sightline; 0 means one full toroidal cycle.
    pub enemy_los_range: usize,
    pub enemy_los_diagonals: bool,

    pub shell_base: u32,
    pub shell_decay: u32,
    pub shell_horizon: u16,
    pub shell_mark_passing: bool,

    pub wall_proximity: u32,
    pub wall_proximity_radius: i32,
}

impl Default for DangerConfig {
    fn default() -> Self {
        Self {
            enemy_los_base: 8,
            enemy_los_decay: 1,
            enemy_los_range: 10,
            enemy_los_diagonals: true,
            shell_base: 20,
            shell_decay: 6,
            shell_horizon: 2,
            shell_mark_passing: true,
            wall_proximity: 1,
            wall_proximity_radius: 1,
        }
    }
}

/// Tuning for one match. Built once and passed by reference into every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuningConfig {
    pub danger: DangerConfig,

    /// Cost added to cells a teammate has reserved.
    pub reservation_penalty: u32,
    /// Cost added to cells currently holding a friend.
    pub friend_penalty: u32,
    /// Cost added to cells inside a teammate's announced fire lane.
    pub shot_lane_penalty: u32,
    pub shot_lane_ttl: u8,

    /// Maximum steps in one compiled plan.
    pub plan_steps: usize,
    pub connectivity: Connectivity,
    /// Ray length for the clean-LOS fire override; 0 means `max(width, height)`.
    pub aim_range: usize,

    pub role_mode: RoleMode,
    /// Nearest-enemy distance at or below which a unit counts as threatened.
    pub threat_distance: i32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            danger: DangerConfig::default(),
            reservation_penalty: 50,
            friend_penalty: 1000,
            shot_lane_penalty: 40,
            shot_lane_ttl: 2,
            plan_steps: 4,
            connectivity: Connectivity::Eight,
            aim_range: 0,
            role_mode: RoleMode::Sticky,
            threat_distance: 5,
        }
    }
}

fn env_override<T: FromStr>(key: &str, slot: &mut T) -> Result<(), ConfigError> {
    if let Ok(value) = env::var(key) {
        *slot = value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        })?;
        tracing::debug!(key, "Applied config override");
    }
    Ok(())
}

impl TuningConfig {
    /// Defaults, overridden by `TANKBOT_*` variables from the process
    /// environment or a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = Self::default();
        let danger = &mut config.danger;
        env_override("TANKBOT_ENEMY_LOS_BASE", &mut danger.enemy_los_base)?;
        env_override("TANKBOT_ENEMY_LOS_DECAY", &mut danger.enemy_los_decay)?;
        env_override("TANKBOT_ENEMY_LOS_RANGE", &mut danger.enemy_los_range)?;
        env_override("TANKBOT_ENEMY_LOS_DIAGONALS", &mut danger.enemy_los_diagonals)?;
        env_override("TANKBOT_SHELL_BASE", &mut danger.shell_base)?;
        env_override("TANKBOT_SHELL_DECAY", &mut danger.shell_decay)?;
        env_override("TANKBOT_SHELL_HORIZON", &mut danger.shell_horizon)?;
        env_override("TANKBOT_SHELL_MARK_PASSING", &mut danger.shell_mark_passing)?;
        env_override("TANKBOT_WALL_PROXIMITY", &mut danger.wall_proximity)?;
        env_override("TANKBOT_WALL_PROXIMITY_RADIUS", &mut danger.wall_proximity_radius)?;

        env_override("TANKBOT_RESERVATION_PENALTY", &mut config.reservation_penalty)?;
        env_override("TANKBOT_FRIEND_PENALTY", &mut config.friend_penalty)?;
        env_override("TANKBOT_SHOT_LANE_PENALTY", &mut config.shot_lane_penalty)?;
        env_override("TANKBOT_SHOT_LANE_TTL", &mut config.shot_lane_ttl)?;
        env_override("TANKBOT_PLAN_STEPS", &mut config.plan_steps)?;
        env_override("TANKBOT_CONNECTIVITY", &mut config.connectivity)?;
        env_override("TANKBOT_AIM_RANGE", &mut config.aim_range)?;
        env_override("TANKBOT_ROLE_MODE", &mut config.role_mode)?;
        env_override("TANKBOT_THREAT_DISTANCE", &mut config.threat_distance)?;

        Ok(config)
    }
}
