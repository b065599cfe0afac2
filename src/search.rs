// =============================================================================
// Search: fixed-depth minimax with alpha-beta pruning
//
// White maximises, Black minimises. Scores come from an `Evaluator` and live
// in [0, 1], so the root window starts at alpha = 0, beta = 1 rather than
// at ±infinity. If an evaluator's range ever changes, these bounds must
// change with it.
//
// The tree is explored on the caller's `GameState` through make/undo pairs,
// so memory stays proportional to the depth, not the branching factor.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{EvalError, SearchError, SearchResult};
use crate::eval::Evaluator;
use crate::game_state::GameState;
use crate::moves::Move;

/// Lowest score an evaluator may return; best for Black.
pub const MIN_SCORE: f64 = 0.0;
/// Highest score an evaluator may return; best for White.
pub const MAX_SCORE: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched below the root; each level alternates the mover.
    pub depth: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig { depth: 2 }
    }
}

/// The chosen move with its minimax score and the number of leaves evaluated.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub mv: Move,
    pub score: f64,
    pub nodes: u64,
}

pub struct Searcher<E> {
    evaluator: E,
    config: SearchConfig,
    nodes: u64,
}

impl<E: Evaluator> Searcher<E> {
    pub fn new(evaluator: E, config: SearchConfig) -> Self {
        Searcher {
            evaluator,
            config,
            nodes: 0,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Pick a move for the side to move from `legal`, searched in the given
    /// order. Ties keep the earliest move. Fails with `NoMoveChosen` when no
    /// candidate beats the starting bound (0 for White, 1 for Black).
    pub fn choose_move(&mut self, state: &mut GameState, legal: &[Move]) -> SearchResult<SearchOutcome> {
        self.run(state, legal, true)
    }

    /// Same as `choose_move` without pruning. Slower, same answer.
    pub fn choose_move_exhaustive(
        &mut self,
        state: &mut GameState,
        legal: &[Move],
    ) -> SearchResult<SearchOutcome> {
        self.run(state, legal, false)
    }

    fn run(&mut self, state: &mut GameState, legal: &[Move], prune: bool) -> SearchResult<SearchOutcome> {
        self.nodes = 0;
        let mut best = None;
        let white = state.white_to_move();
        let score = self.minimax(
            state,
            legal,
            MIN_SCORE,
            MAX_SCORE,
            self.config.depth,
            white,
            prune,
            &mut best,
        )?;
        match best {
            Some(mv) => {
                debug!(mv = %mv, score, nodes = self.nodes, "search chose move");
                Ok(SearchOutcome {
                    mv,
                    score,
                    nodes: self.nodes,
                })
            }
            None => Err(SearchError::NoMoveChosen),
        }
    }

    fn leaf_score(&mut self, state: &GameState) -> SearchResult<f64> {
        self.nodes += 1;
        let score = self.evaluator.evaluate(state.board())?;
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(EvalError::ScoreOutOfRange(score).into());
        }
        Ok(score)
    }

    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &mut self,
        state: &mut GameState,
        moves: &[Move],
        mut alpha: f64,
        mut beta: f64,
        depth: u32,
        white_to_move: bool,
        prune: bool,
        best: &mut Option<Move>,
    ) -> SearchResult<f64> {
        if depth == 0 {
            return self.leaf_score(state);
        }
        let root = depth == self.config.depth;
        let mut best_score = if white_to_move { MIN_SCORE } else { MAX_SCORE };

        for mv in moves {
            state.make_move(mv);
            // Replies are only needed if the child searches further.
            let replies = if depth > 1 { state.legal_moves() } else { Vec::new() };
            let score = self.minimax(state, &replies, alpha, beta, depth - 1, !white_to_move, prune, best);
            state.undo();
            let score = score?;

            if root {
                trace!(mv = %mv, score, "root candidate");
            }
            let improved = if white_to_move {
                score > best_score
            } else {
                score < best_score
            };
            if improved {
                best_score = score;
                if white_to_move {
                    alpha = alpha.max(score);
                } else {
                    beta = beta.min(score);
                }
                if root {
                    *best = Some(*mv);
                }
            }
            if prune && beta <= alpha {
                break;
            }
        }
        Ok(best_score)
    }
}
