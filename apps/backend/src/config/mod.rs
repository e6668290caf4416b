//! Engine configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::errors::GameError;

/// Tunable timings and limits for the session engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed betting window, armed by the first accepted bet of a round.
    pub betting_window: Duration,
    /// Per-player decision deadline; expiry defaults the move to stand.
    pub turn_timeout: Duration,
    /// Upper bound on a single payout collaborator call.
    pub payout_timeout: Duration,
    /// Seats at one table.
    pub max_players: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            betting_window: Duration::from_secs(60),
            turn_timeout: Duration::from_secs(60),
            payout_timeout: Duration::from_secs(10),
            max_players: 7,
        }
    }
}

impl EngineConfig {
    /// Read configuration from the environment, falling back to defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self, GameError> {
        Ok(Self {
            betting_window: secs_var("BETTING_WINDOW_SECS", 60)?,
            turn_timeout: secs_var("TURN_TIMEOUT_SECS", 60)?,
            payout_timeout: secs_var("PAYOUT_TIMEOUT_SECS", 10)?,
            max_players: parsed_var("MAX_PLAYERS_PER_ROOM", 7)?,
        })
    }
}

fn secs_var(name: &str, default: u64) -> Result<Duration, GameError> {
    parsed_var(name, default).map(Duration::from_secs)
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, GameError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| GameError::config(format!("invalid value for '{name}': '{raw}'"))),
        Err(_) => Ok(default),
    }
}
