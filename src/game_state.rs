use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, Square};
use crate::error::{GameError, GameResult};
use crate::movegen::{castle_moves, is_square_attacked, pseudo_legal_moves};
use crate::moves::{parse_coordinates, Move};
use crate::piece::{Color, Piece, PieceType};

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        CastlingRights {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    fn revoke_kingside(&mut self, color: Color) {
        match color {
            Color::White => self.white_kingside = false,
            Color::Black => self.black_kingside = false,
        }
    }

    fn revoke_queenside(&mut self, color: Color) {
        match color {
            Color::White => self.white_queenside = false,
            Color::Black => self.black_queenside = false,
        }
    }

    /// Revoke the right tied to a rook standing on `sq`, if `sq` is one of
    /// `color`'s rook home squares.
    fn revoke_for_rook_square(&mut self, color: Color, sq: Square) {
        let back = color.back_rank();
        if sq == (back, 0) {
            self.revoke_queenside(color);
        } else if sq == (back, 7) {
            self.revoke_kingside(color);
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
}

/// Authoritative state of one game.
///
/// `make_move`/`undo` are exact inverses, which lets the legality filter and
/// the search walk the tree on a single instance instead of cloning boards.
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    turn: Color,
    white_king: Square,
    black_king: Square,
    castling_rights: CastlingRights,
    /// One entry for the starting rights plus one per applied move.
    castle_rights_log: Vec<CastlingRights>,
    en_passant_target: Option<Square>,
    /// En passant target in force before each applied move.
    en_passant_log: Vec<Option<Square>>,
    move_log: Vec<Move>,
    checkmate: bool,
    stalemate: bool,
    /// Result of the last `legal_moves` call, dropped on any mutation.
    legal_cache: Option<Vec<Move>>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Equality covers the position and its history, not the derived terminal
/// flags or the legal-move cache.
impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.turn == other.turn
            && self.white_king == other.white_king
            && self.black_king == other.black_king
            && self.castling_rights == other.castling_rights
            && self.castle_rights_log == other.castle_rights_log
            && self.en_passant_target == other.en_passant_target
            && self.en_passant_log == other.en_passant_log
            && self.move_log == other.move_log
    }
}

impl GameState {
    /// Standard starting position, White to move.
    pub fn new() -> Self {
        let rights = CastlingRights::all();
        GameState {
            board: Board::new(),
            turn: Color::White,
            white_king: (7, 4),
            black_king: (0, 4),
            castling_rights: rights,
            castle_rights_log: vec![rights],
            en_passant_target: None,
            en_passant_log: Vec::new(),
            move_log: Vec::new(),
            checkmate: false,
            stalemate: false,
            legal_cache: None,
        }
    }

    /// Start from an arbitrary position. Both kings must be present.
    pub fn from_position(board: Board, turn: Color, rights: CastlingRights) -> GameResult<Self> {
        let white_king = board
            .find_king(Color::White)
            .ok_or(GameError::MissingKing(Color::White))?;
        let black_king = board
            .find_king(Color::Black)
            .ok_or(GameError::MissingKing(Color::Black))?;
        Ok(GameState {
            board,
            turn,
            white_king,
            black_king,
            castling_rights: rights,
            castle_rights_log: vec![rights],
            en_passant_target: None,
            en_passant_log: Vec::new(),
            move_log: Vec::new(),
            checkmate: false,
            stalemate: false,
            legal_cache: None,
        })
    }

    /// Throw the current game away and set up a new one.
    pub fn reset(&mut self) {
        *self = GameState::new();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn white_to_move(&self) -> bool {
        self.turn == Color::White
    }

    pub fn king_location(&self, color: Color) -> Square {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    pub fn move_log(&self) -> &[Move] {
        &self.move_log
    }

    pub fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.stalemate
    }

    /// Terminal result as of the last `legal_moves` call.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.checkmate {
            Some(Outcome::Checkmate {
                winner: self.turn.opposite(),
            })
        } else if self.stalemate {
            Some(Outcome::Stalemate)
        } else {
            None
        }
    }

    /// True if the side to move has its king attacked.
    pub fn in_check(&self) -> bool {
        self.king_attacked(self.turn)
    }

    /// True if the opponent of the side to move attacks `sq`.
    pub fn square_under_attack(&self, sq: Square) -> bool {
        is_square_attacked(&self.board, sq, self.turn.opposite())
    }

    fn king_attacked(&self, color: Color) -> bool {
        is_square_attacked(&self.board, self.king_location(color), color.opposite())
    }

    /// All legal moves for the side to move. Also refreshes the checkmate and
    /// stalemate flags.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let saved_en_passant = self.en_passant_target;
        let saved_rights = self.castling_rights;
        let mover = self.turn;

        let mut moves = pseudo_legal_moves(&self.board, mover, self.en_passant_target);
        let (kr, kc) = self.king_location(mover);
        castle_moves(kr, kc, &self.board, mover, &self.castling_rights, &mut moves);

        for i in (0..moves.len()).rev() {
            let mv = moves[i];
            self.make_move(&mv);
            let exposed = self.king_attacked(mover);
            self.undo();
            if exposed {
                moves.remove(i);
            }
        }

        self.en_passant_target = saved_en_passant;
        self.castling_rights = saved_rights;

        if moves.is_empty() {
            let in_check = self.in_check();
            self.checkmate = in_check;
            self.stalemate = !in_check;
        } else {
            self.checkmate = false;
            self.stalemate = false;
        }
        self.legal_cache = Some(moves.clone());
        moves
    }

    fn current_legal_moves(&mut self) -> &[Move] {
        if self.legal_cache.is_none() {
            self.legal_moves();
        }
        self.legal_cache.as_deref().unwrap_or(&[])
    }

    /// Look up the legal move written as "e2e4".
    pub fn find_move(&mut self, notation: &str) -> GameResult<Move> {
        let (from, to) = parse_coordinates(notation)?;
        self.current_legal_moves()
            .iter()
            .find(|m| m.from == from && m.to == to)
            .copied()
            .ok_or_else(|| GameError::IllegalMove {
                notation: notation.to_string(),
            })
    }

    /// Apply a move submitted from outside. It must match the current legal
    /// set; otherwise the state is left untouched.
    pub fn apply(&mut self, mv: &Move) -> GameResult<()> {
        let legal = self
            .current_legal_moves()
            .iter()
            .find(|m| *m == mv)
            .copied();
        match legal {
            Some(legal) => {
                debug!(mv = %legal, side = ?self.turn, "apply");
                self.make_move(&legal);
                Ok(())
            }
            None => Err(GameError::IllegalMove {
                notation: mv.notation(),
            }),
        }
    }

    /// Parse, validate and apply a move in coordinate notation.
    pub fn apply_notation(&mut self, notation: &str) -> GameResult<Move> {
        let mv = self.find_move(notation)?;
        self.apply(&mv)?;
        Ok(mv)
    }

    /// Undo the most recent move. With nothing to undo this does nothing.
    pub fn revert(&mut self) -> Option<Move> {
        let undone = self.undo();
        match &undone {
            Some(mv) => debug!(mv = %mv, "revert"),
            None => debug!("revert with empty move log ignored"),
        }
        undone
    }

    /// Apply without validation. Callers must pass a move generated against
    /// the current position.
    pub(crate) fn make_move(&mut self, mv: &Move) {
        let color = mv.piece_moved.color;
        self.board.set(mv.from, None);
        self.board.set(mv.to, Some(mv.piece_moved));

        if mv.piece_moved.piece_type == PieceType::King {
            match color {
                Color::White => self.white_king = mv.to,
                Color::Black => self.black_king = mv.to,
            }
        }

        if mv.is_promotion {
            self.board.set(mv.to, Some(Piece::new(PieceType::Queen, color)));
        }

        if mv.is_en_passant {
            self.board.set(mv.en_passant_victim(), None);
        }

        self.en_passant_log.push(self.en_passant_target);
        self.en_passant_target = if mv.is_double_pawn_push() {
            Some(((mv.from.0 + mv.to.0) / 2, mv.from.1))
        } else {
            None
        };

        if mv.is_castle {
            let (rook_from, rook_to) = mv.castle_rook_squares();
            let rook = self.board.get(rook_from);
            self.board.set(rook_to, rook);
            self.board.set(rook_from, None);
        }

        self.update_castling_rights(mv);
        self.castle_rights_log.push(self.castling_rights);
        self.move_log.push(*mv);
        self.turn = self.turn.opposite();
        self.checkmate = false;
        self.stalemate = false;
        self.legal_cache = None;
    }

    pub(crate) fn undo(&mut self) -> Option<Move> {
        let mv = self.move_log.pop()?;
        self.board.set(mv.from, Some(mv.piece_moved));
        self.board.set(mv.to, mv.piece_captured);
        self.turn = self.turn.opposite();

        if mv.piece_moved.piece_type == PieceType::King {
            match mv.piece_moved.color {
                Color::White => self.white_king = mv.from,
                Color::Black => self.black_king = mv.from,
            }
        }

        if mv.is_en_passant {
            self.board.set(mv.to, None);
            self.board.set(mv.en_passant_victim(), mv.piece_captured);
        }
        self.en_passant_target = self.en_passant_log.pop().flatten();

        self.castle_rights_log.pop();
        if let Some(&rights) = self.castle_rights_log.last() {
            self.castling_rights = rights;
        }

        if mv.is_castle {
            let (rook_from, rook_to) = mv.castle_rook_squares();
            let rook = self.board.get(rook_to);
            self.board.set(rook_from, rook);
            self.board.set(rook_to, None);
        }

        self.checkmate = false;
        self.stalemate = false;
        self.legal_cache = None;
        Some(mv)
    }

    fn update_castling_rights(&mut self, mv: &Move) {
        let color = mv.piece_moved.color;
        match mv.piece_moved.piece_type {
            PieceType::King => {
                self.castling_rights.revoke_kingside(color);
                self.castling_rights.revoke_queenside(color);
            }
            PieceType::Rook => self.castling_rights.revoke_for_rook_square(color, mv.from),
            _ => {}
        }
        if let Some(captured) = mv.piece_captured {
            if captured.piece_type == PieceType::Rook {
                self.castling_rights
                    .revoke_for_rook_square(captured.color, mv.to);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(board: &mut Board, sq: Square, pt: PieceType, color: Color) {
        board.set(sq, Some(Piece::new(pt, color)));
    }

    fn play(state: &mut GameState, moves: &[&str]) {
        for m in moves {
            state.apply_notation(m).unwrap();
        }
    }

    #[test]
    fn opening_has_twenty_legal_moves() {
        let mut state = GameState::new();
        assert_eq!(state.legal_moves().len(), 20);
        assert!(state.outcome().is_none());
    }

    #[test]
    fn apply_then_revert_restores_everything() {
        let mut state = GameState::new();
        play(&mut state, &["e2e4", "d7d5"]);
        let before = state.clone();
        let captures = state.find_move("e4d5").unwrap();
        assert_eq!(captures.piece_captured, Some(Piece::new(PieceType::Pawn, Color::Black)));
        state.apply(&captures).unwrap();
        assert_ne!(state, before);
        state.revert();
        assert_eq!(state, before);
        assert_eq!(state.en_passant_target(), Some((2, 3)));
    }

    #[test]
    fn revert_on_fresh_game_is_noop() {
        let mut state = GameState::new();
        assert!(state.revert().is_none());
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn illegal_move_leaves_state_untouched() {
        let mut state = GameState::new();
        let bogus = Move::new((7, 0), (5, 0), state.board()).unwrap();
        let before = state.clone();
        assert_eq!(
            state.apply(&bogus),
            Err(GameError::IllegalMove { notation: "a1a3".to_string() })
        );
        assert_eq!(state, before);
        assert!(state.find_move("e2e5").is_err());
        assert!(matches!(state.find_move("zz"), Err(GameError::InvalidNotation(_))));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let mut board = Board::empty();
        place(&mut board, (7, 4), PieceType::King, Color::White);
        place(&mut board, (5, 4), PieceType::Bishop, Color::White);
        place(&mut board, (0, 4), PieceType::Rook, Color::Black);
        place(&mut board, (0, 0), PieceType::King, Color::Black);
        let mut state = GameState::from_position(board, Color::White, CastlingRights::none()).unwrap();
        let moves = state.legal_moves();
        assert!(moves.iter().all(|m| m.from != (5, 4)));
        assert!(!moves.is_empty());
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut state = GameState::new();
        play(&mut state, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert!(state.in_check());
        assert!(state.legal_moves().is_empty());
        assert!(state.is_checkmate());
        assert!(!state.is_stalemate());
        assert_eq!(state.outcome(), Some(Outcome::Checkmate { winner: Color::Black }));

        state.revert();
        assert!(!state.is_checkmate());
        assert!(!state.legal_moves().is_empty());
    }

    #[test]
    fn cornered_king_is_stalemate() {
        let mut board = Board::empty();
        place(&mut board, (7, 0), PieceType::King, Color::White);
        place(&mut board, (6, 2), PieceType::Queen, Color::Black);
        place(&mut board, (0, 7), PieceType::King, Color::Black);
        let mut state = GameState::from_position(board, Color::White, CastlingRights::none()).unwrap();
        assert!(state.legal_moves().is_empty());
        assert!(state.is_stalemate());
        assert!(!state.is_checkmate());
        assert_eq!(state.outcome(), Some(Outcome::Stalemate));
    }

    #[test]
    fn kingside_castle_moves_rook_and_clears_rights() {
        let mut board = Board::new();
        board.set((7, 5), None);
        board.set((7, 6), None);
        let mut state = GameState::from_position(board, Color::White, CastlingRights::all()).unwrap();
        let castle = state
            .legal_moves()
            .into_iter()
            .find(|m| m.is_castle)
            .expect("castle should be offered");
        assert_eq!((castle.from, castle.to), ((7, 4), (7, 6)));
        let before = state.clone();

        state.apply(&castle).unwrap();
        assert_eq!(state.board().get((7, 5)), Some(Piece::new(PieceType::Rook, Color::White)));
        assert_eq!(state.board().get((7, 6)), Some(Piece::new(PieceType::King, Color::White)));
        assert!(state.board().is_empty((7, 7)));
        assert!(!state.castling_rights().white_kingside);
        assert!(!state.castling_rights().white_queenside);
        assert!(state.castling_rights().black_kingside);
        assert_eq!(state.king_location(Color::White), (7, 6));

        state.revert();
        assert_eq!(state, before);
        assert_eq!(state.board().get((7, 7)), Some(Piece::new(PieceType::Rook, Color::White)));
    }

    #[test]
    fn en_passant_capture_removes_pawn() {
        let mut board = Board::new();
        board.set((6, 4), None);
        place(&mut board, (3, 4), PieceType::Pawn, Color::White);
        let mut state = GameState::from_position(board, Color::Black, CastlingRights::all()).unwrap();
        state.apply_notation("d7d5").unwrap();
        assert_eq!(state.en_passant_target(), Some((2, 3)));

        let ep = state
            .legal_moves()
            .into_iter()
            .find(|m| m.is_en_passant)
            .expect("en passant should be offered");
        assert_eq!((ep.from, ep.to), ((3, 4), (2, 3)));
        let before = state.clone();
        state.apply(&ep).unwrap();
        assert!(state.board().is_empty((3, 3)));
        assert_eq!(state.board().get((2, 3)), Some(Piece::new(PieceType::Pawn, Color::White)));
        assert_eq!(state.en_passant_target(), None);

        state.revert();
        assert_eq!(state, before);
        assert_eq!(state.board().get((3, 3)), Some(Piece::new(PieceType::Pawn, Color::Black)));
    }

    #[test]
    fn en_passant_expires_after_one_move() {
        let mut board = Board::new();
        board.set((6, 4), None);
        place(&mut board, (3, 4), PieceType::Pawn, Color::White);
        let mut state = GameState::from_position(board, Color::Black, CastlingRights::all()).unwrap();
        play(&mut state, &["d7d5", "g1f3", "a7a6"]);
        assert!(state.legal_moves().iter().all(|m| !m.is_en_passant));
    }

    #[test]
    fn promotion_makes_a_queen_on_every_file() {
        for k in 0..8 {
            let mut board = Board::empty();
            place(&mut board, (7, 4), PieceType::King, Color::White);
            place(&mut board, (4, 7), PieceType::King, Color::Black);
            place(&mut board, (1, k), PieceType::Pawn, Color::White);
            let mut state = GameState::from_position(board, Color::White, CastlingRights::none()).unwrap();
            let promo = state
                .legal_moves()
                .into_iter()
                .find(|m| m.from == (1, k) && m.to == (0, k))
                .expect("push to last rank");
            assert!(promo.is_promotion);
            state.apply(&promo).unwrap();
            assert_eq!(state.board().get((0, k)), Some(Piece::new(PieceType::Queen, Color::White)));
            state.revert();
            assert_eq!(state.board().get((1, k)), Some(Piece::new(PieceType::Pawn, Color::White)));
            assert!(state.board().is_empty((0, k)));
        }
    }

    #[test]
    fn capturing_rook_on_home_square_revokes_right() {
        let mut board = Board::empty();
        place(&mut board, (7, 4), PieceType::King, Color::White);
        place(&mut board, (7, 7), PieceType::Rook, Color::White);
        place(&mut board, (0, 4), PieceType::King, Color::Black);
        place(&mut board, (0, 7), PieceType::Rook, Color::Black);
        let mut state = GameState::from_position(board, Color::White, CastlingRights::all()).unwrap();
        state.apply_notation("h1h8").unwrap();
        let rights = state.castling_rights();
        assert!(!rights.white_kingside);
        assert!(!rights.black_kingside);
        assert!(rights.white_queenside);
        assert!(rights.black_queenside);

        state.revert();
        assert_eq!(state.castling_rights(), CastlingRights::all());
    }

    #[test]
    fn missing_king_is_rejected() {
        let mut board = Board::empty();
        place(&mut board, (7, 4), PieceType::King, Color::White);
        assert_eq!(
            GameState::from_position(board, Color::White, CastlingRights::none()).unwrap_err(),
            GameError::MissingKing(Color::Black)
        );
    }

    #[test]
    fn reset_starts_over() {
        let mut state = GameState::new();
        play(&mut state, &["e2e4", "e7e5"]);
        state.reset();
        assert_eq!(state, GameState::new());
        assert!(state.move_log().is_empty());
    }
}
