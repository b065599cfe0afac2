use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::{Color, Piece, PieceType};

/// A square as (row, col). Row 0 is rank 8, col 0 is file a.
pub type Square = (usize, usize);

/// The 8×8 grid of cell contents. Pure data: rules live in `movegen` and
/// `game_state`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct Board {
    pub squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard starting layout: Black on rows 0-1, White on rows 6-7.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for (col, &pt) in BACK_RANK.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(pt, Color::Black));
            board.squares[1][col] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[6][col] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.squares[7][col] = Some(Piece::new(pt, Color::White));
        }
        board
    }

    pub fn in_bounds(row: i32, col: i32) -> bool {
        (0..8).contains(&row) && (0..8).contains(&col)
    }

    /// Square reached from `(row, col)` by `(dr, dc)`, if it is on the board.
    pub fn offset(row: usize, col: usize, dr: i32, dc: i32) -> Option<Square> {
        let r = row as i32 + dr;
        let c = col as i32 + dc;
        if Self::in_bounds(r, c) {
            Some((r as usize, c as usize))
        } else {
            None
        }
    }

    pub fn get(&self, (row, col): Square) -> Option<Piece> {
        self.squares[row][col]
    }

    pub fn set(&mut self, (row, col): Square, piece: Option<Piece>) {
        self.squares[row][col] = piece;
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// True if `sq` holds a piece of `color`.
    pub fn holds(&self, sq: Square, color: Color) -> bool {
        self.get(sq).map(|p| p.color == color).unwrap_or(false)
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        for r in 0..8 {
            for c in 0..8 {
                if let Some(p) = self.squares[r][c] {
                    if p.is(PieceType::King, color) {
                        return Some((r, c));
                    }
                }
            }
        }
        None
    }

    /// All occupied squares with their pieces, row-major.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        (0..8).flat_map(move |r| {
            (0..8).filter_map(move |c| self.squares[r][c].map(|p| ((r, c), p)))
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.squares {
            let line: Vec<String> = row
                .iter()
                .map(|sq| sq.map(|p| p.code()).unwrap_or_else(|| "--".to_string()))
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
