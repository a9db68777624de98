//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::game::player::HOTBAR_SIZE;
use crate::util::rate_limit::JOIN_RATE_LIMIT;
use crate::util::time::DEFAULT_TICK_RATE_MS;

/// How the world's global step (projectiles + timeout sweep) is driven
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepMode {
    /// Independent fixed-rate task, one step per tick
    Fixed,
    /// One step per incoming `/update` request
    Request,
}

impl FromStr for StepMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "request" => Ok(Self::Request),
            _ => Err(ConfigError::Invalid("STEP_MODE")),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Tick length in milliseconds
    pub tick_rate_ms: u64,
    /// Inactivity window before a player is force-killed
    pub player_timeout_ms: u64,
    /// Items added to the shared pool per registered player
    pub items_per_player: usize,
    /// Edge length of the square terrain grid
    pub map_size: usize,
    /// Seed for terrain and world randomness
    pub map_seed: u64,
    pub step_mode: StepMode,
    /// Chebyshev radius of the snapshot view window
    pub view_radius: i32,

    /// Optional xkcd `rgb.txt` style identity list
    pub colors_file: Option<PathBuf>,
    /// Allowed client origins for CORS (any origin when empty)
    pub client_origin: Option<String>,
    /// Joins admitted per second
    pub join_rate_limit: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // PORT wins over SERVER_ADDR when both are present
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        };

        let config = Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            tick_rate_ms: parse_var("TICK_RATE_MS", DEFAULT_TICK_RATE_MS)?,
            player_timeout_ms: parse_var("PLAYER_TIMEOUT_MS", 10_000)?,
            items_per_player: parse_var("ITEMS_PER_PLAYER", 20)?,
            map_size: parse_var("MAP_SIZE", 100)?,
            map_seed: parse_var("MAP_SEED", rand::random())?,
            step_mode: parse_var("STEP_MODE", StepMode::Fixed)?,
            view_radius: parse_var("VIEW_RADIUS", 27)?,

            colors_file: env::var("COLORS_FILE").ok().map(PathBuf::from),
            client_origin: env::var("CLIENT_ORIGIN").ok(),
            join_rate_limit: parse_var("JOIN_RATE_LIMIT", JOIN_RATE_LIMIT)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Startup-time sanity checks. A world whose pool is smaller than one
    /// hotbar cannot satisfy a full pickup, so it is refused outright.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.items_per_player < HOTBAR_SIZE {
            return Err(ConfigError::ItemsPerPlayer {
                items_per_player: self.items_per_player,
                hotbar_size: HOTBAR_SIZE,
            });
        }
        if self.map_size < 2 {
            return Err(ConfigError::Invalid("MAP_SIZE"));
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid("TICK_RATE_MS"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: "info".to_string(),
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            player_timeout_ms: 10_000,
            items_per_player: 20,
            map_size: 100,
            map_seed: 0,
            step_mode: StepMode::Fixed,
            view_radius: 27,
            colors_file: None,
            client_origin: None,
            join_rate_limit: JOIN_RATE_LIMIT,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("ITEMS_PER_PLAYER ({items_per_player}) must be at least the hotbar size ({hotbar_size})")]
    ItemsPerPlayer {
        items_per_player: usize,
        hotbar_size: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn pool_smaller_than_hotbar_is_fatal() {
        let config = Config {
            items_per_player: HOTBAR_SIZE - 1,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ItemsPerPlayer { .. })
        ));
    }

    #[test]
    fn pool_equal_to_hotbar_is_allowed() {
        let config = Config {
            items_per_player: HOTBAR_SIZE,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn step_mode_parses_case_insensitively() {
        assert_eq!("Fixed".parse::<StepMode>().unwrap(), StepMode::Fixed);
        assert_eq!(" request ".parse::<StepMode>().unwrap(), StepMode::Request);
        assert!("sometimes".parse::<StepMode>().is_err());
    }
}
