pub mod board;
pub mod config;
pub mod error;
pub mod eval;
pub mod game_state;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod render;
pub mod search;

pub use board::{Board, Square};
pub use error::{ConfigError, EvalError, GameError, SearchError};
pub use eval::{Evaluator, LinearEvaluator, MaterialEvaluator};
pub use game_state::{CastlingRights, GameState, Outcome};
pub use moves::Move;
pub use piece::{Color, Piece, PieceType};
pub use search::{SearchConfig, SearchOutcome, Searcher};
