//! Read-only view of a game for display layers.
//!
//! A renderer receives a `Snapshot` and draws it. Nothing flows back into the
//! game; input layers submit moves through `GameState::apply`.

use std::io::{self, Write};

use serde::Serialize;

use crate::board::{Board, Square};
use crate::game_state::GameState;
use crate::moves::{square_name, Move};

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub board: Board,
    pub white_to_move: bool,
    pub legal_moves: Vec<Move>,
    pub selected: Option<Square>,
    /// Destinations reachable from `selected`.
    pub highlights: Vec<Square>,
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub last_move: Option<String>,
}

impl Snapshot {
    pub fn capture(state: &GameState, legal: &[Move], selected: Option<Square>) -> Snapshot {
        Snapshot {
            board: *state.board(),
            white_to_move: state.white_to_move(),
            legal_moves: legal.to_vec(),
            selected,
            highlights: highlights(state, legal, selected),
            in_check: state.in_check(),
            checkmate: state.is_checkmate(),
            stalemate: state.is_stalemate(),
            last_move: state.move_log().last().map(|m| m.notation()),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Legal destinations from `selected`, or nothing if that square does not
/// hold a piece of the side to move.
pub fn highlights(state: &GameState, legal: &[Move], selected: Option<Square>) -> Vec<Square> {
    let Some(sq) = selected else {
        return Vec::new();
    };
    if !state.board().holds(sq, state.turn()) {
        return Vec::new();
    }
    legal.iter().filter(|m| m.from == sq).map(|m| m.to).collect()
}

pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()>;
}

/// Plain-text board, rank 8 at the top. Highlighted squares show `**`.
pub struct AsciiRenderer<W> {
    out: W,
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(out: W) -> Self {
        AsciiRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        for (row, cells) in snapshot.board.squares.iter().enumerate() {
            write!(self.out, "{} ", 8 - row)?;
            for (col, cell) in cells.iter().enumerate() {
                let text = match cell {
                    Some(p) => p.code(),
                    None if snapshot.highlights.contains(&(row, col)) => "**".to_string(),
                    None => "--".to_string(),
                };
                write!(self.out, " {text}")?;
            }
            writeln!(self.out)?;
        }
        writeln!(self.out, "   a  b  c  d  e  f  g  h")?;

        let side = if snapshot.white_to_move { "White" } else { "Black" };
        if snapshot.checkmate {
            let winner = if snapshot.white_to_move { "Black" } else { "White" };
            writeln!(self.out, "{winner} wins by checkmate")?;
        } else if snapshot.stalemate {
            writeln!(self.out, "Stalemate")?;
        } else if snapshot.in_check {
            writeln!(self.out, "{side} to move (in check)")?;
        } else {
            writeln!(self.out, "{side} to move")?;
        }
        if let Some(sq) = snapshot.selected {
            writeln!(self.out, "selected {}", square_name(sq))?;
        }
        Ok(())
    }
}

/// One JSON document per snapshot, newline separated.
pub struct JsonRenderer<W> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        JsonRenderer { out }
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, snapshot)?;
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_only_for_own_pieces() {
        let mut state = GameState::new();
        let legal = state.legal_moves();
        let mut knight = highlights(&state, &legal, Some((7, 6)));
        knight.sort();
        assert_eq!(knight, vec![(5, 5), (5, 7)]);
        assert!(highlights(&state, &legal, Some((0, 6))).is_empty());
        assert!(highlights(&state, &legal, Some((4, 4))).is_empty());
        assert!(highlights(&state, &legal, None).is_empty());
    }

    #[test]
    fn ascii_marks_highlighted_squares() {
        let mut state = GameState::new();
        let legal = state.legal_moves();
        let snapshot = Snapshot::capture(&state, &legal, Some((6, 4)));
        let mut renderer = AsciiRenderer::new(Vec::new());
        renderer.render(&snapshot).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  bR bN bB bQ bK bB bN bR");
        assert_eq!(lines[4], "4  -- -- -- -- ** -- -- --");
        assert_eq!(lines[5], "3  -- -- -- -- ** -- -- --");
        assert!(text.contains("White to move"));
        assert!(text.contains("selected e2"));
    }

    #[test]
    fn json_snapshot_reports_terminal_state() {
        let mut state = GameState::new();
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            state.apply_notation(m).unwrap();
        }
        let legal = state.legal_moves();
        let snapshot = Snapshot::capture(&state, &legal, None);
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["checkmate"], true);
        assert_eq!(value["white_to_move"], true);
        assert_eq!(value["last_move"], "d8h4");
        assert_eq!(value["legal_moves"].as_array().unwrap().len(), 0);

        let mut out = Vec::new();
        JsonRenderer::new(&mut out).render(&snapshot).unwrap();
        assert!(out.ends_with(b"\n"));
    }
}
