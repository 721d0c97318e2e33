//! Self-play driver: the engine plays both sides to a fixed depth, mostly
//! useful for smoke-testing search quality and producing PGN records.

use chrono::prelude::*;
use std::time::Instant;

use crate::board::{Board, STARTING_POSITION_FEN};
use crate::error::EngineError;
use crate::evaluate::EvalWeights;
use crate::search::{iterative_deepening, SearchControl};
use crate::tt::TranspositionTable;
use crate::types::{Move, Status};

pub struct Game {
    board: Board,
    moves: Vec<Move>,
    max_depth: u8,
    start_fen: String,
    game_start_time: DateTime<Local>,
    silent: bool,
    tt: TranspositionTable,
    weights: EvalWeights,
}

impl Game {
    pub fn new_from_fen(max_depth: u8, start_fen: String) -> Result<Self, EngineError> {
        Ok(Self {
            board: Board::from_fen(start_fen.as_str())?,
            moves: Vec::new(),
            max_depth,
            start_fen,
            game_start_time: Local::now(),
            silent: false,
            tt: TranspositionTable::new(),
            weights: EvalWeights::default(),
        })
    }

    pub fn new(max_depth: u8) -> Self {
        Game::new_from_fen(max_depth, STARTING_POSITION_FEN.to_string())
            .expect("starting position FEN is valid")
    }

    pub fn new_silent(max_depth: u8) -> Self {
        let mut game = Game::new(max_depth);
        game.silent = true;
        game
    }

    /// Play until the game ends or `max_moves` full moves have been made.
    /// Returns the terminal status if one was reached.
    pub fn play(&mut self, max_moves: u32) -> Option<Status> {
        let max_moves_in_ply = 2 * max_moves;

        for i in 1..=max_moves_in_ply {
            if let Some(status) = self.board.status() {
                if !self.silent {
                    println!("game over: {status:?}");
                }
                return Some(status);
            }

            let now = Instant::now();
            let control = SearchControl::new();
            let outcome = iterative_deepening(
                &mut self.board,
                self.max_depth,
                None,
                &self.weights,
                &mut self.tt,
                &control,
            );
            let elapsed = now.elapsed().as_secs_f32();

            let selected_move = outcome
                .best_move
                .expect("non-terminal position must yield a move");
            if !self.silent {
                println!(
                    "move {}: {} ({} - depth {} score {} nodes {} elapsed: {:.6}s)",
                    (i + 1) / 2,
                    selected_move.to_human(),
                    selected_move.to_long_algebraic(),
                    outcome.depth_reached,
                    outcome.score,
                    outcome.nodes,
                    elapsed
                );
            }
            let _undo = self.board.make_move(&selected_move);
            self.moves.push(selected_move);
            if !self.silent {
                self.board.draw_to_terminal();
                println!();
            }
        }
        None
    }

    pub fn to_pgn(&self) -> String {
        let mut pgn = String::new();
        pgn.push_str("[Event \"sable_chess self-play\"]\n");
        pgn.push_str("[Site \"local\"]\n");
        pgn.push_str(format!("[Date \"{}\"]\n", self.game_start_time.format("%Y.%m.%d")).as_str());
        pgn.push_str("[Round \"1\"]\n");
        pgn.push_str("[White \"sable_chess\"]\n");
        pgn.push_str("[Black \"sable_chess\"]\n");
        pgn.push_str("[Result \"*\"]\n");
        if self.start_fen != STARTING_POSITION_FEN {
            pgn.push_str(format!("[FEN \"{}\"]\n", self.start_fen).as_str());
        }
        pgn.push('\n');

        for (i, mv) in self.moves.iter().enumerate() {
            if i % 2 == 0 {
                pgn.push_str(&format!("{}. ", (i + 2) / 2));
            }
            pgn.push_str(&mv.to_long_algebraic());
            pgn.push(' ');
        }
        pgn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_self_play_game() {
        let mut game = Game::new_silent(2);
        game.play(3);
        assert_eq!(game.moves.len(), 6);
        let pgn = game.to_pgn();
        assert!(pgn.contains("[Event"));
        assert!(pgn.contains("1. "));
    }

    #[test]
    fn test_play_stops_at_terminal() {
        // immediate stalemate: no moves are played
        let mut game =
            Game::new_from_fen(2, "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".to_string()).unwrap();
        game.silent = true;
        let status = game.play(10);
        assert_eq!(status, Some(Status::Stalemate));
        assert!(game.moves.is_empty());
    }
}
