use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::piece::Color;
use crate::search::SearchConfig;

/// Who picks the moves for one side.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Engine,
}

/// Settings for a driven game, usually loaded from a JSON file.
/// Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    pub search: SearchConfig,
    /// Stop after this many plies even if the game is not over.
    pub max_moves: u32,
    pub white: PlayerKind,
    pub black: PlayerKind,
    /// Plies played at random before the engine takes over, for variety.
    pub random_opening_plies: u32,
    pub seed: Option<u64>,
    /// Linear model weights; the material evaluator is used when absent.
    pub weights: Option<PathBuf>,
}

impl Default for PlayConfig {
    fn default() -> Self {
        PlayConfig {
            search: SearchConfig::default(),
            max_moves: 200,
            white: PlayerKind::Engine,
            black: PlayerKind::Engine,
            random_opening_plies: 0,
            seed: None,
            weights: None,
        }
    }
}

impl PlayConfig {
    pub fn player(&self, color: Color) -> PlayerKind {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
