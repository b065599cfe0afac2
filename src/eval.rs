// =============================================================================
// Position evaluation
//
// An evaluator maps a board to a score in [0, 1]: values near 1 favour White,
// values near 0 favour Black. The side to move is not part of the input, so
// two positions with the same pieces always score the same.
//
// The search relies on that range for its initial alpha/beta bounds, so any
// evaluator that can leave it must report an error rather than clamp.
// =============================================================================

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::EvalError;
use crate::piece::{Color, PieceType};

pub trait Evaluator {
    fn evaluate(&self, board: &Board) -> Result<f64, EvalError>;
}

impl<F> Evaluator for F
where
    F: Fn(&Board) -> Result<f64, EvalError>,
{
    fn evaluate(&self, board: &Board) -> Result<f64, EvalError> {
        self(board)
    }
}

// =============================================================================
// One-hot encoding
// =============================================================================

/// 12 planes: black p,N,B,R,Q,K then white p,N,B,R,Q,K.
pub const NUM_PLANES: usize = 12;

/// 8 × 8 × 12 = 768
pub const NUM_FEATURES: usize = 64 * NUM_PLANES;

pub type OneHotBoard = [[[f32; NUM_PLANES]; 8]; 8];

fn plane(color: Color, piece_type: PieceType) -> usize {
    let offset = match color {
        Color::Black => 0,
        Color::White => 6,
    };
    offset + piece_type.index()
}

/// Encode the board as rows of one-hot piece vectors, rank 1 first.
pub fn encode_one_hot(board: &Board) -> OneHotBoard {
    let mut encoded = [[[0.0f32; NUM_PLANES]; 8]; 8];
    for ((row, col), piece) in board.pieces() {
        encoded[7 - row][col][plane(piece.color, piece.piece_type)] = 1.0;
    }
    encoded
}

/// `encode_one_hot` flattened row, column, plane.
pub fn extract_features(board: &Board) -> Vec<f32> {
    encode_one_hot(board)
        .iter()
        .flat_map(|row| row.iter().flat_map(|cell| cell.iter().copied()))
        .collect()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

// =============================================================================
// Material evaluator
// =============================================================================

/// Standard piece values in pawns. The king carries none.
pub fn piece_value(pt: PieceType) -> f64 {
    match pt {
        PieceType::Pawn => 1.0,
        PieceType::Knight => 3.0,
        PieceType::Bishop => 3.0,
        PieceType::Rook => 5.0,
        PieceType::Queen => 9.0,
        PieceType::King => 0.0,
    }
}

/// Material balance squashed through a logistic curve. `scale` is the
/// balance (in pawns) that moves the score from 0.5 to about 0.73.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialEvaluator {
    pub scale: f64,
}

impl Default for MaterialEvaluator {
    fn default() -> Self {
        MaterialEvaluator { scale: 4.0 }
    }
}

impl MaterialEvaluator {
    /// White material minus Black material.
    pub fn balance(board: &Board) -> f64 {
        board
            .pieces()
            .map(|(_, p)| {
                let v = piece_value(p.piece_type);
                if p.color == Color::White { v } else { -v }
            })
            .sum()
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, board: &Board) -> Result<f64, EvalError> {
        Ok(sigmoid(Self::balance(board) / self.scale))
    }
}

// =============================================================================
// Linear model evaluator
// =============================================================================

/// Single-layer model over the one-hot features: sigmoid(w · x + b).
/// Weights are produced offline and loaded from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearEvaluator {
    weights: Vec<f32>,
    bias: f32,
}

impl LinearEvaluator {
    pub fn new(weights: Vec<f32>, bias: f32) -> Result<Self, EvalError> {
        if weights.len() != NUM_FEATURES {
            return Err(EvalError::InvalidWeights {
                expected: NUM_FEATURES,
                actual: weights.len(),
            });
        }
        Ok(LinearEvaluator { weights, bias })
    }

    /// Parse `{"weights": [...768 numbers...], "bias": 0.0}`.
    pub fn from_json_str(json: &str) -> Result<Self, EvalError> {
        let raw: LinearEvaluator = serde_json::from_str(json)?;
        LinearEvaluator::new(raw.weights, raw.bias)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EvalError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl Evaluator for LinearEvaluator {
    fn evaluate(&self, board: &Board) -> Result<f64, EvalError> {
        let features = extract_features(board);
        let dot: f64 = features
            .iter()
            .zip(&self.weights)
            .map(|(&x, &w)| f64::from(x) * f64::from(w))
            .sum();
        Ok(sigmoid(dot + f64::from(self.bias)))
    }
}
