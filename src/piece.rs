use serde::{Deserialize, Serialize};

/// The two sides. White starts on the high-index rows (rank 1 = row 7).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row a pawn of this color advances toward: -1 for White, +1 for Black.
    pub fn pawn_direction(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row the king and rooks of this color start on.
    pub fn back_rank(self) -> usize {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn pawn_start_row(self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn promotion_row(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Index in `ALL`, used for feature planes.
    pub fn index(self) -> usize {
        match self {
            PieceType::Pawn => 0,
            PieceType::Knight => 1,
            PieceType::Bishop => 2,
            PieceType::Rook => 3,
            PieceType::Queen => 4,
            PieceType::King => 5,
        }
    }

    /// Single letter used by the text renderer ('p' for pawn, uppercase otherwise).
    pub fn symbol(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Self {
        Piece { piece_type, color }
    }

    pub fn is(&self, piece_type: PieceType, color: Color) -> bool {
        self.piece_type == piece_type && self.color == color
    }

    /// Two-character code such as "wK" or "bp".
    pub fn code(&self) -> String {
        let side = match self.color {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!("{side}{}", self.piece_type.symbol())
    }
}
