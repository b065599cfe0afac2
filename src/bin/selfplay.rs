use std::error::Error;
use std::io;

use chess_ai::config::{PlayConfig, PlayerKind};
use chess_ai::eval::{Evaluator, LinearEvaluator, MaterialEvaluator};
use chess_ai::render::{AsciiRenderer, Renderer, Snapshot};
use chess_ai::{GameState, Outcome, Searcher};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Usage: selfplay [config.json]
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PlayConfig::from_file(path)?,
        None => PlayConfig::default(),
    };
    info!(?config, "starting game");

    match &config.weights {
        Some(path) => play(&config, LinearEvaluator::from_file(path)?),
        None => play(&config, MaterialEvaluator::default()),
    }
}

fn play<E: Evaluator>(config: &PlayConfig, evaluator: E) -> Result<(), Box<dyn Error>> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut searcher = Searcher::new(evaluator, config.search.clone());
    let mut state = GameState::new();
    let mut legal = state.legal_moves();

    for ply in 0..config.max_moves {
        if legal.is_empty() {
            break;
        }
        let side = state.turn();
        if config.player(side) == PlayerKind::Human {
            info!(?side, "human to move, stopping");
            break;
        }

        let random = if ply < config.random_opening_plies {
            legal.choose(&mut rng).copied()
        } else {
            None
        };
        let mv = match random {
            Some(mv) => mv,
            None => searcher.choose_move(&mut state, &legal)?.mv,
        };
        state.apply(&mv)?;
        info!(ply, mv = %mv, "played");
        legal = state.legal_moves();
    }

    let mut renderer = AsciiRenderer::new(io::stdout().lock());
    renderer.render(&Snapshot::capture(&state, &legal, None))?;

    let log: Vec<String> = state.move_log().iter().map(|m| m.notation()).collect();
    println!("{}", log.join(" "));

    match state.outcome() {
        Some(Outcome::Checkmate { winner }) => info!(?winner, plies = log.len(), "checkmate"),
        Some(Outcome::Stalemate) => info!(plies = log.len(), "stalemate"),
        None => info!(plies = log.len(), "game unfinished"),
    }
    Ok(())
}
