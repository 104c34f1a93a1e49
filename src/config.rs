//! Game tunables and session configuration.

use thiserror::Error;

/// Every number that shapes a session. Defaults are the shipped balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub max_energy: u32,
    /// Paid after every swap, whether or not it matched.
    pub move_energy: u32,
    /// Per enemy the player shoots down.
    pub kill_energy: u32,
    /// Per player ship destroyed.
    pub die_energy: u32,
    /// Per step of a matched run (a run of 3 pays 2x).
    pub match_energy: u32,
    /// Passive drain every `energy_tick_secs`.
    pub tick_energy: u32,
    pub kill_score: u32,
    pub swap_secs: f32,
    pub drop_secs: f32,
    /// `None` disables the passive drain (relaxed play).
    pub energy_tick_secs: Option<f32>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_energy: 100,
            move_energy: 12,
            kill_energy: 25,
            die_energy: 35,
            match_energy: 3,
            tick_energy: 1,
            kill_score: 100,
            swap_secs: 0.1,
            drop_secs: 0.1,
            energy_tick_secs: Some(5.0),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max energy must be positive")]
    ZeroMaxEnergy,
    #[error("{name} must be a positive number of seconds, got {value}")]
    BadDuration { name: &'static str, value: f32 },
    #[error("tick energy {tick} exceeds max energy {max}")]
    TickAboveMax { tick: u32, max: u32 },
}

impl Rules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_energy == 0 {
            return Err(ConfigError::ZeroMaxEnergy);
        }
        check_secs("swap time", self.swap_secs)?;
        check_secs("drop time", self.drop_secs)?;
        if let Some(secs) = self.energy_tick_secs {
            check_secs("energy tick", secs)?;
        }
        if self.tick_energy > self.max_energy {
            return Err(ConfigError::TickAboveMax {
                tick: self.tick_energy,
                max: self.max_energy,
            });
        }
        Ok(())
    }
}

fn check_secs(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::BadDuration { name, value })
    }
}

/// Options derived from CLI that affect a session.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    pub rules: Rules,
    /// Fixed RNG seed; `None` seeds from the clock.
    pub seed: Option<u32>,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()
    }
}
