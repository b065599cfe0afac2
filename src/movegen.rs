// Pseudo-legal move generation.
//
// Every generator takes the side to generate for explicitly instead of
// reading a turn flag, so attack queries never need to touch game state.
// None of them look at check; `GameState::legal_moves` filters afterwards.

use crate::board::{Board, Square};
use crate::game_state::CastlingRights;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};

const ROOK_DIRS: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];
const BISHOP_DIRS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (2, 1), (-2, 1), (-2, -1), (2, -1),
    (1, 2), (-1, 2), (-1, -2), (1, -2),
];
const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (-1, 1), (1, -1), (1, 1),
    (0, 1), (1, 0), (-1, 0), (0, -1),
];

/// All pseudo-legal moves for `side`, excluding castling.
pub fn pseudo_legal_moves(board: &Board, side: Color, en_passant: Option<Square>) -> Vec<Move> {
    let mut moves = Vec::new();
    for ((row, col), piece) in board.pieces() {
        if piece.color != side {
            continue;
        }
        match piece.piece_type {
            PieceType::Pawn => pawn_moves(row, col, board, side, en_passant, &mut moves),
            PieceType::Knight => knight_moves(row, col, board, side, &mut moves),
            PieceType::Bishop => bishop_moves(row, col, board, side, &mut moves),
            PieceType::Rook => rook_moves(row, col, board, side, &mut moves),
            PieceType::Queen => queen_moves(row, col, board, side, &mut moves),
            PieceType::King => king_moves(row, col, board, side, &mut moves),
        }
    }
    moves
}

/// True if any pseudo-legal move of `attacker` lands on `sq`.
///
/// Pawn pushes count too, so an empty square directly in front of an enemy
/// pawn reads as attacked. This only matters for castling transit squares.
pub fn is_square_attacked(board: &Board, sq: Square, attacker: Color) -> bool {
    pseudo_legal_moves(board, attacker, None)
        .iter()
        .any(|m| m.to == sq)
}

pub fn pawn_moves(
    row: usize,
    col: usize,
    board: &Board,
    side: Color,
    en_passant: Option<Square>,
    moves: &mut Vec<Move>,
) {
    let piece = Piece::new(PieceType::Pawn, side);
    let dir = side.pawn_direction();

    if let Some(one) = Board::offset(row, col, dir, 0) {
        if board.is_empty(one) {
            moves.push(Move::with_piece((row, col), one, piece, board));
            if row == side.pawn_start_row() {
                if let Some(two) = Board::offset(row, col, 2 * dir, 0) {
                    if board.is_empty(two) {
                        moves.push(Move::with_piece((row, col), two, piece, board));
                    }
                }
            }
        }
    }

    for dc in [-1, 1] {
        let Some(target) = Board::offset(row, col, dir, dc) else {
            continue;
        };
        if board.holds(target, side.opposite()) {
            moves.push(Move::with_piece((row, col), target, piece, board));
        } else if en_passant == Some(target) {
            moves.push(Move::en_passant((row, col), target, piece));
        }
    }
}

/// Walk each direction until the edge, a friendly piece (excluded) or an
/// enemy piece (included as a capture).
fn sliding_moves(
    row: usize,
    col: usize,
    board: &Board,
    piece: Piece,
    directions: &[(i32, i32)],
    moves: &mut Vec<Move>,
) {
    for &(dr, dc) in directions {
        let mut step = 1;
        while let Some(target) = Board::offset(row, col, dr * step, dc * step) {
            match board.get(target) {
                None => moves.push(Move::with_piece((row, col), target, piece, board)),
                Some(p) => {
                    if p.color != piece.color {
                        moves.push(Move::with_piece((row, col), target, piece, board));
                    }
                    break;
                }
            }
            step += 1;
        }
    }
}

fn step_moves(
    row: usize,
    col: usize,
    board: &Board,
    piece: Piece,
    offsets: &[(i32, i32)],
    moves: &mut Vec<Move>,
) {
    for &(dr, dc) in offsets {
        if let Some(target) = Board::offset(row, col, dr, dc) {
            if !board.holds(target, piece.color) {
                moves.push(Move::with_piece((row, col), target, piece, board));
            }
        }
    }
}

pub fn rook_moves(row: usize, col: usize, board: &Board, side: Color, moves: &mut Vec<Move>) {
    let piece = Piece::new(PieceType::Rook, side);
    sliding_moves(row, col, board, piece, &ROOK_DIRS, moves);
}

pub fn bishop_moves(row: usize, col: usize, board: &Board, side: Color, moves: &mut Vec<Move>) {
    let piece = Piece::new(PieceType::Bishop, side);
    sliding_moves(row, col, board, piece, &BISHOP_DIRS, moves);
}

pub fn queen_moves(row: usize, col: usize, board: &Board, side: Color, moves: &mut Vec<Move>) {
    let piece = Piece::new(PieceType::Queen, side);
    sliding_moves(row, col, board, piece, &ROOK_DIRS, moves);
    sliding_moves(row, col, board, piece, &BISHOP_DIRS, moves);
}

pub fn knight_moves(row: usize, col: usize, board: &Board, side: Color, moves: &mut Vec<Move>) {
    let piece = Piece::new(PieceType::Knight, side);
    step_moves(row, col, board, piece, &KNIGHT_OFFSETS, moves);
}

pub fn king_moves(row: usize, col: usize, board: &Board, side: Color, moves: &mut Vec<Move>) {
    let piece = Piece::new(PieceType::King, side);
    step_moves(row, col, board, piece, &KING_OFFSETS, moves);
}

/// Castle moves for the king standing on `(row, col)`.
///
/// Requires the right to be held, the squares between king and rook to be
/// empty, and the king's square plus the two squares it crosses to be safe.
/// The rook's own destination on the queen side (b-file) is not checked.
pub fn castle_moves(
    row: usize,
    col: usize,
    board: &Board,
    side: Color,
    rights: &CastlingRights,
    moves: &mut Vec<Move>,
) {
    let back = side.back_rank();
    if (row, col) != (back, 4) {
        return;
    }
    let enemy = side.opposite();
    if is_square_attacked(board, (row, col), enemy) {
        return;
    }
    let king = Piece::new(PieceType::King, side);
    let rook_home = |c: usize| {
        board
            .get((back, c))
            .map(|p| p.is(PieceType::Rook, side))
            .unwrap_or(false)
    };

    if rights.kingside(side)
        && rook_home(7)
        && board.is_empty((back, 5))
        && board.is_empty((back, 6))
        && !is_square_attacked(board, (back, 5), enemy)
        && !is_square_attacked(board, (back, 6), enemy)
    {
        moves.push(Move::castle((row, col), (back, 6), king));
    }

    if rights.queenside(side)
        && rook_home(0)
        && board.is_empty((back, 3))
        && board.is_empty((back, 2))
        && board.is_empty((back, 1))
        && !is_square_attacked(board, (back, 3), enemy)
        && !is_square_attacked(board, (back, 2), enemy)
    {
        moves.push(Move::castle((row, col), (back, 2), king));
    }
}
