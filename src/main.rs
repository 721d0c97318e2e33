//! Command-line driver: fixed-depth search, perft runs and self-play.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::time::Instant;

use sable_chess::bitboard::init_tables;
use sable_chess::board::{Board, STARTING_POSITION_FEN};
use sable_chess::engine::{Engine, SearchRequest};
use sable_chess::game::Game;
use sable_chess::perft::{perft, perft_divide, perft_parallel};

#[derive(Parser)]
#[command(name = "sable_chess", about = "A magic-bitboard chess engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search a position to a fixed depth and print the chosen move
    Search {
        /// Position as a FEN string
        #[arg(long, default_value = STARTING_POSITION_FEN)]
        fen: String,
        /// Moves played from the position, in long algebraic form
        #[arg(long, num_args = 0.., value_delimiter = ' ')]
        moves: Vec<String>,
        /// Maximum search depth in plies
        #[arg(long, default_value_t = 6)]
        depth: u8,
    },
    /// Count leaf nodes of the legal move tree
    Perft {
        #[arg(long, default_value = STARTING_POSITION_FEN)]
        fen: String,
        #[arg(long, default_value_t = 5)]
        depth: u8,
        /// Fan the root out over all cores
        #[arg(long)]
        parallel: bool,
        /// Print per-root-move node counts
        #[arg(long)]
        divide: bool,
    },
    /// Let the engine play itself
    Play {
        #[arg(long, default_value_t = 4)]
        depth: u8,
        /// Maximum number of full moves before adjourning
        #[arg(long, default_value_t = 40)]
        max_moves: u32,
        /// Print the PGN record afterwards
        #[arg(long)]
        pgn: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tables();

    match Cli::parse().command {
        Command::Search { fen, moves, depth } => {
            let mut engine = Engine::new();
            let played: Vec<&str> = moves.iter().map(String::as_str).collect();
            engine.set_position(&fen, &played)?;
            let response = engine.go(&SearchRequest::with_depth(depth))?;
            match response.best_move {
                Some(best) => println!(
                    "bestmove {best} score {} depth {} nodes {} nps {}",
                    response.score_cp, response.depth_reached, response.nodes, response.nps
                ),
                None => println!("position is terminal, no move"),
            }
        }
        Command::Perft {
            fen,
            depth,
            parallel,
            divide,
        } => {
            let mut board = Board::from_fen(&fen)?;
            if divide {
                let mut total = 0;
                for (mv, nodes) in perft_divide(&mut board, depth) {
                    println!("{}: {}", mv.to_long_algebraic(), nodes);
                    total += nodes;
                }
                println!("total: {total}");
            } else {
                let start = Instant::now();
                let nodes = if parallel {
                    perft_parallel(&board, depth)
                } else {
                    perft(&mut board, depth)
                };
                let elapsed = start.elapsed().as_secs_f64();
                println!(
                    "perft({depth}) = {nodes} in {elapsed:.3}s ({:.0} nodes/s)",
                    nodes as f64 / elapsed.max(1e-9)
                );
            }
        }
        Command::Play {
            depth,
            max_moves,
            pgn,
        } => {
            let mut game = Game::new(depth);
            game.play(max_moves);
            if pgn {
                println!("{}", game.to_pgn());
            }
        }
    }
    Ok(())
}
