//! Error types for game-state updates, evaluation and search.

use thiserror::Error;

use crate::piece::Color;

/// Rejections from `GameState` for externally submitted input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GameError {
    /// The move is not in the current legal set. State is left untouched.
    #[error("illegal move: {notation}")]
    IllegalMove { notation: String },

    #[error("invalid coordinate notation: {0:?}")]
    InvalidNotation(String),

    #[error("no {0:?} king on the board")]
    MissingKing(Color),
}

/// Failures raised by an evaluator.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("evaluator weights invalid: expected {expected} weights, got {actual}")]
    InvalidWeights { expected: usize, actual: usize },

    #[error("evaluator produced {0}, outside [0, 1]")]
    ScoreOutOfRange(f64),

    #[error("failed to read evaluator weights: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse evaluator weights: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SearchError {
    /// No candidate ever improved on the root bound.
    #[error("search finished without choosing a move")]
    NoMoveChosen,

    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GameResult<T> = Result<T, GameError>;
pub type SearchResult<T> = Result<T, SearchError>;
