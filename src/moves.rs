use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::board::{Board, Square};
use crate::error::{GameError, GameResult};
use crate::piece::{Piece, PieceType};

/// A single transition from one board to the next.
///
/// `piece_moved` and `piece_captured` are read from the board the move was
/// generated against, so a move must not be replayed on a different board.
/// For en passant the captured piece is the enemy pawn beside the origin,
/// not the (empty) destination.
#[derive(Clone, Copy, Serialize, Deserialize, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece_moved: Piece,
    pub piece_captured: Option<Piece>,
    pub is_promotion: bool,
    pub is_en_passant: bool,
    pub is_castle: bool,
}

impl Move {
    /// Build a plain move or capture from whatever currently sits on `from`.
    /// Returns `None` if `from` is empty.
    pub fn new(from: Square, to: Square, board: &Board) -> Option<Move> {
        board.get(from).map(|piece| Move::with_piece(from, to, piece, board))
    }

    pub(crate) fn with_piece(from: Square, to: Square, piece: Piece, board: &Board) -> Move {
        Move {
            from,
            to,
            piece_moved: piece,
            piece_captured: board.get(to),
            is_promotion: piece.piece_type == PieceType::Pawn
                && to.0 == piece.color.promotion_row(),
            is_en_passant: false,
            is_castle: false,
        }
    }

    pub(crate) fn en_passant(from: Square, to: Square, piece: Piece) -> Move {
        Move {
            from,
            to,
            piece_moved: piece,
            piece_captured: Some(Piece::new(PieceType::Pawn, piece.color.opposite())),
            is_promotion: false,
            is_en_passant: true,
            is_castle: false,
        }
    }

    pub(crate) fn castle(from: Square, to: Square, piece: Piece) -> Move {
        Move {
            from,
            to,
            piece_moved: piece,
            piece_captured: None,
            is_promotion: false,
            is_en_passant: false,
            is_castle: true,
        }
    }

    /// Compact numeric id: from_row, from_col, to_row, to_col as decimal digits.
    pub fn id(&self) -> u16 {
        (self.from.0 * 1000 + self.from.1 * 100 + self.to.0 * 10 + self.to.1) as u16
    }

    pub fn is_double_pawn_push(&self) -> bool {
        self.piece_moved.piece_type == PieceType::Pawn && self.from.0.abs_diff(self.to.0) == 2
    }

    /// Square of the pawn removed by an en passant capture.
    pub fn en_passant_victim(&self) -> Square {
        (self.from.0, self.to.1)
    }

    /// Rook origin and destination for a castle move.
    pub fn castle_rook_squares(&self) -> (Square, Square) {
        let row = self.to.0;
        if self.to.1 > self.from.1 {
            ((row, 7), (row, self.to.1 - 1))
        } else {
            ((row, 0), (row, self.to.1 + 1))
        }
    }

    /// Coordinate notation such as "e2e4".
    pub fn notation(&self) -> String {
        format!("{}{}", square_name(self.from), square_name(self.to))
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.is_promotion == other.is_promotion
            && self.is_en_passant == other.is_en_passant
            && self.is_castle == other.is_castle
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
        (self.is_promotion, self.is_en_passant, self.is_castle).hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

/// File a-h maps to col 0-7, rank 1-8 maps to row 7-0.
pub fn square_name((row, col): Square) -> String {
    let file = (b'a' + col as u8) as char;
    let rank = (b'8' - row as u8) as char;
    format!("{file}{rank}")
}

pub fn parse_square(s: &str) -> GameResult<Square> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return Err(GameError::InvalidNotation(s.to_string()));
    }
    let (file, rank) = (bytes[0], bytes[1]);
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(GameError::InvalidNotation(s.to_string()));
    }
    Ok(((b'8' - rank) as usize, (file - b'a') as usize))
}

/// Split "e2e4" into its two squares.
pub fn parse_coordinates(s: &str) -> GameResult<(Square, Square)> {
    if s.len() != 4 || !s.is_ascii() {
        return Err(GameError::InvalidNotation(s.to_string()));
    }
    let from = parse_square(&s[..2]).map_err(|_| GameError::InvalidNotation(s.to_string()))?;
    let to = parse_square(&s[2..]).map_err(|_| GameError::InvalidNotation(s.to_string()))?;
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color;

    #[test]
    fn square_names_follow_rank_mapping() {
        assert_eq!(square_name((7, 0)), "a1");
        assert_eq!(square_name((0, 7)), "h8");
        assert_eq!(square_name((6, 4)), "e2");
        assert_eq!(parse_square("e2"), Ok((6, 4)));
        assert_eq!(parse_square("a8"), Ok((0, 0)));
        assert!(parse_square("i1").is_err());
        assert!(parse_square("a9").is_err());
        assert!(parse_square("a").is_err());
    }

    #[test]
    fn coordinates_parse_pairs() {
        assert_eq!(parse_coordinates("e2e4"), Ok(((6, 4), (4, 4))));
        assert_eq!(
            parse_coordinates("e2e"),
            Err(GameError::InvalidNotation("e2e".to_string()))
        );
    }

    #[test]
    fn move_records_board_contents() {
        let board = Board::new();
        let mv = Move::new((6, 4), (4, 4), &board).unwrap();
        assert_eq!(mv.piece_moved, Piece::new(PieceType::Pawn, Color::White));
        assert_eq!(mv.piece_captured, None);
        assert!(mv.is_double_pawn_push());
        assert_eq!(mv.notation(), "e2e4");
        assert_eq!(mv.id(), 6444);
        assert!(Move::new((4, 4), (3, 4), &board).is_none());
    }

    #[test]
    fn equality_ignores_captured_piece() {
        let board = Board::new();
        let mut empty = Board::empty();
        empty.set((6, 0), Some(Piece::new(PieceType::Pawn, Color::White)));
        empty.set((5, 1), Some(Piece::new(PieceType::Knight, Color::Black)));
        let quiet = Move::new((6, 0), (5, 1), &board).unwrap();
        let capture = Move::new((6, 0), (5, 1), &empty).unwrap();
        assert_eq!(quiet, capture);
        let castle = Move::castle((7, 4), (7, 6), Piece::new(PieceType::King, Color::White));
        let step = Move::with_piece((7, 4), (7, 6), castle.piece_moved, &board);
        assert_ne!(castle, step);
    }

    #[test]
    fn promotion_flag_on_far_rank() {
        let mut board = Board::empty();
        board.set((1, 2), Some(Piece::new(PieceType::Pawn, Color::White)));
        board.set((6, 2), Some(Piece::new(PieceType::Pawn, Color::Black)));
        assert!(Move::new((1, 2), (0, 2), &board).unwrap().is_promotion);
        assert!(Move::new((6, 2), (7, 2), &board).unwrap().is_promotion);
        assert!(!Move::new((6, 2), (5, 2), &board).unwrap().is_promotion);
    }

    #[test]
    fn castle_rook_squares_by_wing() {
        let king = Piece::new(PieceType::King, Color::Black);
        assert_eq!(Move::castle((0, 4), (0, 6), king).castle_rook_squares(), ((0, 7), (0, 5)));
        assert_eq!(Move::castle((0, 4), (0, 2), king).castle_rook_squares(), ((0, 0), (0, 3)));
    }
}
