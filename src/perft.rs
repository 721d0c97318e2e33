//! Perft: move-generator correctness testing by counting leaf nodes of the
//! legal move tree at a fixed depth and comparing against independently
//! published tables.

use rayon::prelude::*;

use crate::board::Board;
use crate::types::Move;

/// Count leaf nodes of the legal move tree, sharing one board via
/// make/unmake.
pub fn perft(board: &mut Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = match board.legal_moves() {
        Ok(moves) => moves,
        Err(_) => return 0,
    };
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in &moves {
        let undo = board.make_move(mv);
        nodes += perft(board, depth - 1);
        board.unmake_move(undo);
    }
    nodes
}

/// Perft with the root children fanned out in parallel. Each child owns a
/// freshly cloned board, so the workers never share mutable state.
pub fn perft_parallel(board: &Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut root = board.clone();
    let moves = match root.legal_moves() {
        Ok(moves) => moves,
        Err(_) => return 0,
    };

    moves
        .par_iter()
        .map(|mv| {
            let mut child = board.clone();
            let _undo = child.make_move(mv);
            perft(&mut child, depth - 1)
        })
        .sum()
}

/// Per-root-move node counts ("divide"), the standard debugging view for
/// hunting a generator discrepancy.
pub fn perft_divide(board: &mut Board, depth: u8) -> Vec<(Move, u64)> {
    let moves = match board.legal_moves() {
        Ok(moves) => moves,
        Err(_) => return Vec::new(),
    };

    let mut counts = Vec::with_capacity(moves.len());
    for mv in &moves {
        let undo = board.make_move(mv);
        let nodes = if depth > 1 { perft(board, depth - 1) } else { 1 };
        board.unmake_move(undo);
        counts.push((*mv, nodes));
    }
    counts
}

/// Expected node counts from the starting position
///
/// https://www.chessprogramming.org/Perft_Results
///
/// | Depth | Nodes       |
/// | ----- | ----------- |
/// | 0     | 1           |
/// | 1     | 20          |
/// | 2     | 400         |
/// | 3     | 8,902       |
/// | 4     | 197,281     |
/// | 5     | 4,865,609   |
/// | 6     | 119,060,324 |
pub fn perft_expected_node_count(depth: u8) -> u64 {
    match depth {
        0 => 1,
        1 => 20,
        2 => 400,
        3 => 8_902,
        4 => 197_281,
        5 => 4_865_609,
        6 => 119_060_324,
        _ => panic!("No expected node count for depth {}", depth),
    }
}
