//! The engine boundary: the narrow contract the protocol layer talks to.
//!
//! A position arrives as a board-description string plus previously played
//! moves in long algebraic form; a search request carries a depth bound and
//! an optional restriction to a move subset. Malformed input is rejected
//! with an [`EngineError`], never silently substituted. A stop signal makes
//! the in-flight search return its best move so far.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::board::Board;
use crate::error::EngineError;
use crate::evaluate::EvalWeights;
use crate::search::{iterative_deepening, SearchControl};
use crate::tt::TranspositionTable;
use crate::types::Move;

/// A request to pick a move in the current position
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Maximum search depth in plies. Remaining clock time, if any, is
    /// translated into this bound (or into a stop signal) by the caller.
    pub depth: u8,
    /// Restrict the root to these moves, in long algebraic form
    pub restrict_moves: Option<Vec<String>>,
}

impl SearchRequest {
    pub fn with_depth(depth: u8) -> Self {
        Self {
            depth,
            restrict_moves: None,
        }
    }
}

/// The engine's answer to a search request
#[derive(Debug)]
pub struct SearchResponse {
    /// Chosen move in long algebraic form; `None` only when the position is
    /// already terminal
    pub best_move: Option<String>,
    /// Evaluation in centipawns (mate scores use the search's mate encoding)
    pub score_cp: i32,
    pub nodes: u64,
    pub nps: u64,
    pub depth_reached: u8,
    /// Per-root-move evaluation from the deepest completed iteration
    pub root_scores: Vec<(String, i32)>,
}

/// The search core behind a narrow request/response surface. Owns the board,
/// the transposition table and the stop flag; one engine serves one search
/// at a time.
pub struct Engine {
    board: Board,
    tt: TranspositionTable,
    weights: EvalWeights,
    stop: Arc<AtomicBool>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            tt: TranspositionTable::new(),
            weights: EvalWeights::default(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_weights(weights: EvalWeights) -> Self {
        Self {
            weights,
            ..Self::new()
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Reset for a new game: starting position, cold cache
    pub fn new_game(&mut self) {
        self.board = Board::new();
        self.tt.clear();
    }

    /// Validate and install a position: a board-description string plus the
    /// moves played from it. The first invalid move rejects the whole
    /// request and leaves the previous position in place.
    pub fn set_position(&mut self, fen: &str, moves: &[&str]) -> Result<(), EngineError> {
        let mut board = Board::from_fen(fen)?;
        for text in moves {
            let mv = board.find_move(text)?;
            let _undo = board.make_move(&mv);
        }
        self.board = board;
        Ok(())
    }

    /// Handle for the asynchronous stop signal, shareable with a protocol
    /// thread
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Ask the in-flight search to wind down and answer with its best move
    /// so far
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Run a search in the current position. Cancellation is not an error:
    /// a stopped search answers with the deepest completed iteration's move,
    /// or the first legal move if not even depth 1 finished.
    pub fn go(&mut self, request: &SearchRequest) -> Result<SearchResponse, EngineError> {
        let restrict: Option<Vec<Move>> = match &request.restrict_moves {
            Some(texts) => {
                let mut moves = Vec::with_capacity(texts.len());
                for text in texts {
                    moves.push(self.board.find_move(text)?);
                }
                Some(moves)
            }
            None => None,
        };

        self.stop.store(false, Ordering::Relaxed);
        let control = SearchControl::with_stop_flag(Arc::clone(&self.stop));
        let outcome = iterative_deepening(
            &mut self.board,
            request.depth,
            restrict.as_deref(),
            &self.weights,
            &mut self.tt,
            &control,
        );

        let best_move = outcome.best_move.or_else(|| {
            // Stopped before any iteration finished; a usable move must
            // still come back as long as the position has one.
            let mut moves = self.board.legal_moves().ok()?;
            if let Some(subset) = &restrict {
                moves.retain(|mv| subset.contains(mv));
            }
            moves.first().copied()
        });

        Ok(SearchResponse {
            best_move: best_move.map(|mv| mv.to_long_algebraic()),
            score_cp: outcome.score,
            nodes: outcome.nodes,
            nps: outcome.nps,
            depth_reached: outcome.depth_reached,
            root_scores: outcome
                .root_scores
                .iter()
                .map(|(mv, score)| (mv.to_long_algebraic(), *score))
                .collect(),
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
