//! Depth-limited alpha-beta search with move ordering and a transposition
//! cache.
//!
//! The search is negamax-shaped: one `Board` is shared down the whole
//! recursive call chain, mutated by `make_move` and restored by
//! `unmake_move` before every return. Cancellation is cooperative: the stop
//! flag is checked between node expansions, and an aborted search still
//! yields the deepest fully-searched iteration's result.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::board::Board;
use crate::evaluate::{evaluate_board, EvalWeights};
use crate::tt::{TTFlag, TranspositionTable};
use crate::types::{Color, Move, Status};

pub const MAX_SCORE: i32 = 10_000_000;
pub const MIN_SCORE: i32 = -MAX_SCORE;

/// Base score for checkmate. A mate found at ply `p` scores
/// `MATE_SCORE - p`, so faster mates score higher and slower losses score
/// less negative.
pub const MATE_SCORE: i32 = 1_000_000;

/// Scores beyond this are mate announcements, not centipawns
const MATE_THRESHOLD: i32 = MATE_SCORE - 1000;

pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_THRESHOLD
}

/// Plies until mate encoded in a mate score, signed like the score
pub fn mate_distance(score: i32) -> Option<i32> {
    if score >= MATE_THRESHOLD {
        Some(MATE_SCORE - score)
    } else if score <= -MATE_THRESHOLD {
        Some(-(MATE_SCORE + score))
    } else {
        None
    }
}

/// Marker returned when the stop signal interrupted a search mid-depth
#[derive(Debug, PartialEq, Eq)]
pub struct SearchAborted;

/// Shared stop flag and node counter for a search invocation. The core never
/// enforces a timeout itself; callers bound the depth or flip the stop flag
/// from another thread.
#[derive(Debug)]
pub struct SearchControl {
    pub start_time: Instant,
    pub stop: Arc<AtomicBool>,
    pub nodes_searched: AtomicU64,
}

impl SearchControl {
    pub fn new() -> Self {
        Self::with_stop_flag(Arc::new(AtomicBool::new(false)))
    }

    /// Share an externally owned stop flag (e.g. flipped by a protocol
    /// thread)
    pub fn with_stop_flag(stop: Arc<AtomicBool>) -> Self {
        Self {
            start_time: Instant::now(),
            stop,
            nodes_searched: AtomicU64::new(0),
        }
    }

    /// Count a node expansion and check for the stop signal
    #[inline]
    pub fn should_stop(&self) -> bool {
        self.nodes_searched.fetch_add(1, Ordering::Relaxed);
        self.stop.load(Ordering::Relaxed)
    }

    /// Signal the search to stop
    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn nodes(&self) -> u64 {
        self.nodes_searched.load(Ordering::Relaxed)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }
}

impl Default for SearchControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one fixed-depth search
#[derive(Debug)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub best_score: i32,
    /// Evaluation of every root move searched, in search order
    pub root_scores: Vec<(Move, i32)>,
}

/// Final outcome of an iterative-deepening run
#[derive(Debug)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth_reached: u8,
    pub nodes: u64,
    pub nps: u64,
    pub elapsed_ms: u64,
    pub root_scores: Vec<(Move, i32)>,
}

/// Capture-value heuristic for move ordering: most valuable victim minus
/// least valuable attacker, with the promotion piece counted as a bonus.
pub fn guess_move_value(weights: &EvalWeights, mv: &Move) -> i32 {
    let mut score = 0;
    if let Some(victim) = mv.captured {
        score += 10 * weights.piece_value(victim) - weights.piece_value(mv.piece.piece_type);
    }
    if let Some(promoted) = mv.promotion() {
        score += weights.piece_value(promoted);
    }
    score
}

/// Order moves best-first: the previous principal-variation move, then the
/// transposition-table move, then captures by MVV-LVA.
fn order_moves(
    moves: &mut [Move],
    weights: &EvalWeights,
    tt_move: Option<Move>,
    pv_move: Option<Move>,
) {
    moves.sort_by_key(|mv| {
        let score = if pv_move.is_some_and(|pv| pv == *mv) {
            2_000_000
        } else if tt_move.is_some_and(|tt| tt == *mv) {
            1_000_000
        } else {
            guess_move_value(weights, mv)
        };
        std::cmp::Reverse(score)
    });
}

/// Evaluation from the side to move's perspective, as negamax needs it
fn side_relative_eval(board: &Board, weights: &EvalWeights) -> i32 {
    let score = evaluate_board(board, weights);
    match board.get_active_color() {
        Color::White => score,
        Color::Black => -score,
    }
}

fn negamax(
    board: &mut Board,
    depth: u8,
    mut alpha: i32,
    beta: i32,
    ply: u8,
    weights: &EvalWeights,
    tt: &mut TranspositionTable,
    control: &SearchControl,
) -> Result<i32, SearchAborted> {
    if control.should_stop() {
        return Err(SearchAborted);
    }

    // Fifty-move exhaustion is a draw regardless of material
    if board.halfmove_clock() >= 100 {
        return Ok(0);
    }

    if let Some((score, _)) = tt.probe(board.zobrist_hash, depth, alpha, beta) {
        return Ok(score);
    }

    let original_alpha = alpha;

    // The terminal check must run before the depth check so that mates and
    // stalemates at the horizon score as terminals, not as material counts.
    let mut moves = match board.legal_moves() {
        Ok(moves) => moves,
        Err(Status::Checkmate(_)) => return Ok(-(MATE_SCORE - ply as i32)),
        Err(Status::Stalemate) => return Ok(0),
        Err(other) => panic!("legal_moves reported non-terminal status {other:?}"),
    };

    if depth == 0 {
        return Ok(side_relative_eval(board, weights));
    }

    order_moves(&mut moves, weights, tt.get_best_move(board.zobrist_hash), None);

    let mut best_score = MIN_SCORE;
    let mut best_move = moves[0];
    for mv in &moves {
        let undo = board.make_move(mv);
        let result = negamax(board, depth - 1, -beta, -alpha, ply + 1, weights, tt, control);
        board.unmake_move(undo);
        let score = -result?;

        if score > best_score {
            best_score = score;
            best_move = *mv;
        }
        if score > alpha {
            alpha = score;
        }
        if beta <= alpha {
            if !is_mate_score(best_score) {
                tt.store(board.zobrist_hash, depth, best_score, TTFlag::LowerBound, Some(best_move));
            }
            return Ok(best_score);
        }
    }

    // Mate scores are ply-relative and must not be cached: the same position
    // reached at another ply would read back a wrong distance.
    if !is_mate_score(best_score) {
        let flag = if best_score <= original_alpha {
            TTFlag::UpperBound
        } else {
            TTFlag::Exact
        };
        tt.store(board.zobrist_hash, depth, best_score, flag, Some(best_move));
    }

    Ok(best_score)
}

/// One fixed-depth search from the root, reporting a score for every root
/// move. `restrict` limits the root to a caller-supplied move subset;
/// `pv_move` is promoted to the front of the list to stabilize iterative
/// deepening.
pub fn search_root(
    board: &mut Board,
    depth: u8,
    restrict: Option<&[Move]>,
    pv_move: Option<Move>,
    weights: &EvalWeights,
    tt: &mut TranspositionTable,
    control: &SearchControl,
) -> Result<SearchResult, SearchAborted> {
    let mut moves = match board.legal_moves() {
        Ok(moves) => moves,
        Err(Status::Checkmate(_)) => {
            return Ok(SearchResult {
                best_move: None,
                best_score: -MATE_SCORE,
                root_scores: Vec::new(),
            })
        }
        Err(Status::Stalemate) => {
            return Ok(SearchResult {
                best_move: None,
                best_score: 0,
                root_scores: Vec::new(),
            })
        }
        Err(other) => panic!("legal_moves reported non-terminal status {other:?}"),
    };
    if let Some(subset) = restrict {
        moves.retain(|mv| subset.contains(mv));
        debug_assert!(!moves.is_empty(), "restriction excluded every legal move");
    }

    order_moves(&mut moves, weights, tt.get_best_move(board.zobrist_hash), pv_move);

    let mut alpha = MIN_SCORE;
    let beta = MAX_SCORE;
    let mut best_move = moves[0];
    let mut root_scores = Vec::with_capacity(moves.len());

    for mv in &moves {
        let undo = board.make_move(mv);
        let result = negamax(board, depth - 1, -beta, -alpha, 1, weights, tt, control);
        board.unmake_move(undo);
        let score = -result?;

        root_scores.push((*mv, score));
        if score > alpha {
            alpha = score;
            best_move = *mv;
        }
    }

    Ok(SearchResult {
        best_move: Some(best_move),
        best_score: alpha,
        root_scores,
    })
}

/// Iterative deepening up to `max_depth` plies. On cancellation the deepest
/// fully-searched iteration's result is returned rather than an error; a
/// search stopped before depth 1 completes reports no move.
pub fn iterative_deepening(
    board: &mut Board,
    max_depth: u8,
    restrict: Option<&[Move]>,
    weights: &EvalWeights,
    tt: &mut TranspositionTable,
    control: &SearchControl,
) -> SearchOutcome {
    let mut outcome = SearchOutcome {
        best_move: None,
        score: 0,
        depth_reached: 0,
        nodes: 0,
        nps: 0,
        elapsed_ms: 0,
        root_scores: Vec::new(),
    };

    let mut pv_move = None;
    for depth in 1..=max_depth {
        match search_root(board, depth, restrict, pv_move, weights, tt, control) {
            Ok(result) => {
                pv_move = result.best_move;
                outcome.best_move = result.best_move;
                outcome.score = result.best_score;
                outcome.depth_reached = depth;
                outcome.root_scores = result.root_scores;
                if result.best_move.is_none() {
                    break; // terminal root, deeper searches repeat it
                }
            }
            Err(SearchAborted) => break,
        }
    }

    outcome.nodes = control.nodes();
    outcome.elapsed_ms = control.elapsed_ms();
    outcome.nps = if outcome.elapsed_ms > 0 {
        outcome.nodes * 1000 / outcome.elapsed_ms
    } else {
        outcome.nodes * 1000
    };
    outcome
}

/// Unpruned full-width minimax, used as the reference implementation in
/// tests: alpha-beta must choose the same move and score.
pub fn minimax(
    board: &mut Board,
    depth: u8,
    weights: &EvalWeights,
) -> (i32, Option<Move>) {
    fn minimax_score(board: &mut Board, depth: u8, ply: u8, weights: &EvalWeights) -> i32 {
        if board.halfmove_clock() >= 100 {
            return 0;
        }
        let moves = match board.legal_moves() {
            Ok(moves) => moves,
            Err(Status::Checkmate(_)) => return -(MATE_SCORE - ply as i32),
            Err(Status::Stalemate) => return 0,
            Err(other) => panic!("legal_moves reported non-terminal status {other:?}"),
        };
        if depth == 0 {
            return side_relative_eval(board, weights);
        }
        let mut best = MIN_SCORE;
        for mv in &moves {
            let undo = board.make_move(mv);
            let score = -minimax_score(board, depth - 1, ply + 1, weights);
            board.unmake_move(undo);
            best = best.max(score);
        }
        best
    }

    let moves = match board.legal_moves() {
        Ok(moves) => moves,
        Err(Status::Checkmate(_)) => return (-MATE_SCORE, None),
        Err(Status::Stalemate) => return (0, None),
        Err(other) => panic!("legal_moves reported non-terminal status {other:?}"),
    };
    let mut best_score = MIN_SCORE;
    let mut best_move = None;
    for mv in &moves {
        let undo = board.make_move(mv);
        let score = -minimax_score(board, depth - 1, 1, weights);
        board.unmake_move(undo);
        if score > best_score {
            best_score = score;
            best_move = Some(*mv);
        }
    }
    (best_score, best_move)
}
