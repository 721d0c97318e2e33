//! UCI (Universal Chess Interface) protocol adapter.
//!
//! This binary serializes the engine's request/response contract to the
//! line-oriented UCI command syntax. The protocol thread owns stdin and the
//! stop flag; searches run on a worker thread so a `stop` command is
//! observed without blocking on search completion. Clock time is translated
//! into a depth bound plus a timer-driven stop signal out here, never inside
//! the core.
//!
//! Example session:
//!   > uci
//!   < id name sable_chess
//!   < uciok
//!   > position startpos moves e2e4 e7e5
//!   > go depth 6
//!   < info depth 6 score cp 34 nodes 193419 nps 240815 pv g1f3
//!   < bestmove g1f3

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use sable_chess::bitboard::init_tables;
use sable_chess::engine::{Engine, SearchRequest, SearchResponse};
use sable_chess::search::mate_distance;
use sable_chess::types::Color;

const ENGINE_NAME: &str = "sable_chess";
const ENGINE_AUTHOR: &str = "sable_chess developers";

/// Commands sent from the protocol thread to the search thread
#[derive(Debug, Clone)]
enum UciCommand {
    Go {
        depth: Option<u8>,
        movetime: Option<u64>,
        wtime: Option<u64>,
        btime: Option<u64>,
        winc: u64,
        binc: u64,
        infinite: bool,
        searchmoves: Vec<String>,
    },
    NewGame,
    Quit,
}

fn main() {
    init_tables();

    let stdin = io::stdin();
    let engine = Arc::new(Mutex::new(Engine::new()));
    let stop = engine.lock().unwrap().stop_handle();

    let (cmd_tx, cmd_rx) = mpsc::channel::<UciCommand>();
    let search_engine = Arc::clone(&engine);
    let search_handle = thread::spawn(move || search_thread(search_engine, cmd_rx));

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        match tokens[0] {
            "uci" => {
                println!("id name {}", ENGINE_NAME);
                println!("id author {}", ENGINE_AUTHOR);
                println!("uciok");
                let _ = io::stdout().flush();
            }

            "isready" => {
                println!("readyok");
                let _ = io::stdout().flush();
            }

            "ucinewgame" => {
                let _ = cmd_tx.send(UciCommand::NewGame);
            }

            "position" => {
                // Applied directly on the protocol thread; searches are not
                // in flight while GUIs send position updates.
                if let Err(err) = parse_position(&tokens, &engine) {
                    eprintln!("info string rejected position: {err}");
                }
            }

            "go" => {
                if cmd_tx.send(parse_go_command(&tokens)).is_err() {
                    break;
                }
            }

            "stop" => {
                stop.store(true, Ordering::Relaxed);
            }

            "d" | "display" => {
                engine.lock().unwrap().board().draw_to_terminal();
            }

            "quit" => {
                stop.store(true, Ordering::Relaxed);
                let _ = cmd_tx.send(UciCommand::Quit);
                break;
            }

            _ => {
                // Unknown command, ignore
            }
        }
    }

    let _ = search_handle.join();
}

/// Search thread main loop
fn search_thread(engine: Arc<Mutex<Engine>>, cmd_rx: mpsc::Receiver<UciCommand>) {
    loop {
        let cmd = match cmd_rx.recv() {
            Ok(cmd) => cmd,
            Err(_) => break,
        };

        match cmd {
            UciCommand::Quit => break,

            UciCommand::NewGame => {
                engine.lock().unwrap().new_game();
            }

            UciCommand::Go {
                depth,
                movetime,
                wtime,
                btime,
                winc,
                binc,
                infinite,
                searchmoves,
            } => {
                let mut engine = engine.lock().unwrap();

                // Translate the clock into a budget for this move and arm a
                // timer that flips the stop flag; the core itself never
                // watches the clock.
                let budget_ms = if infinite {
                    None
                } else if let Some(ms) = movetime {
                    Some(ms)
                } else {
                    let is_white = engine.board().get_active_color() == Color::White;
                    let (time_left, increment) = if is_white {
                        (wtime, winc)
                    } else {
                        (btime, binc)
                    };
                    time_left.map(|left| allocate_time(left, increment))
                };

                let mut timer_cancel: Option<Arc<AtomicBool>> = None;
                if let Some(ms) = budget_ms {
                    let stop = engine.stop_handle();
                    let cancel = Arc::new(AtomicBool::new(false));
                    timer_cancel = Some(Arc::clone(&cancel));
                    thread::spawn(move || {
                        let step = Duration::from_millis(10);
                        let mut waited = 0u64;
                        while waited < ms {
                            if cancel.load(Ordering::Relaxed) {
                                return;
                            }
                            thread::sleep(step);
                            waited += 10;
                        }
                        stop.store(true, Ordering::Relaxed);
                    });
                }

                let request = SearchRequest {
                    depth: depth.unwrap_or(64),
                    restrict_moves: if searchmoves.is_empty() {
                        None
                    } else {
                        Some(searchmoves)
                    },
                };

                match engine.go(&request) {
                    Ok(response) => {
                        println!("{}", format_info(&response));
                        match &response.best_move {
                            Some(best) => println!("bestmove {best}"),
                            None => println!("bestmove 0000"),
                        }
                        let _ = io::stdout().flush();
                    }
                    Err(err) => {
                        eprintln!("info string rejected go: {err}");
                        println!("bestmove 0000");
                        let _ = io::stdout().flush();
                    }
                }

                if let Some(cancel) = timer_cancel {
                    cancel.store(true, Ordering::Relaxed);
                }
            }
        }
    }
}

fn parse_position(tokens: &[&str], engine: &Arc<Mutex<Engine>>) -> Result<(), String> {
    let mut idx = 1;
    let fen;

    if idx < tokens.len() && tokens[idx] == "startpos" {
        fen = sable_chess::board::STARTING_POSITION_FEN.to_string();
        idx += 1;
    } else if idx < tokens.len() && tokens[idx] == "fen" {
        idx += 1;
        let mut fen_parts = Vec::new();
        while idx < tokens.len() && tokens[idx] != "moves" {
            fen_parts.push(tokens[idx]);
            idx += 1;
        }
        fen = fen_parts.join(" ");
    } else {
        return Err("expected 'startpos' or 'fen'".to_string());
    }

    let mut moves = Vec::new();
    if idx < tokens.len() && tokens[idx] == "moves" {
        idx += 1;
        while idx < tokens.len() {
            moves.push(tokens[idx]);
            idx += 1;
        }
    }

    engine
        .lock()
        .unwrap()
        .set_position(&fen, &moves)
        .map_err(|err| err.to_string())
}

fn parse_go_command(tokens: &[&str]) -> UciCommand {
    let mut depth: Option<u8> = None;
    let mut movetime: Option<u64> = None;
    let mut wtime: Option<u64> = None;
    let mut btime: Option<u64> = None;
    let mut winc: u64 = 0;
    let mut binc: u64 = 0;
    let mut infinite = false;
    let mut searchmoves = Vec::new();

    let mut idx = 1;
    while idx < tokens.len() {
        match tokens[idx] {
            "depth" => {
                idx += 1;
                depth = tokens.get(idx).and_then(|s| s.parse().ok());
            }
            "movetime" => {
                idx += 1;
                movetime = tokens.get(idx).and_then(|s| s.parse().ok());
            }
            "wtime" => {
                idx += 1;
                wtime = tokens.get(idx).and_then(|s| s.parse().ok());
            }
            "btime" => {
                idx += 1;
                btime = tokens.get(idx).and_then(|s| s.parse().ok());
            }
            "winc" => {
                idx += 1;
                winc = tokens.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0);
            }
            "binc" => {
                idx += 1;
                binc = tokens.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0);
            }
            "infinite" => {
                infinite = true;
            }
            "searchmoves" => {
                // every remaining token is a move
                while let Some(mv) = tokens.get(idx + 1) {
                    searchmoves.push(mv.to_string());
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }

    UciCommand::Go {
        depth,
        movetime,
        wtime,
        btime,
        winc,
        binc,
        infinite,
        searchmoves,
    }
}

/// Budget for one move given remaining clock time, mirroring the usual
/// "remaining time over expected moves plus most of the increment" rule
fn allocate_time(time_left_ms: u64, increment_ms: u64) -> u64 {
    let base = time_left_ms / 30;
    (base + increment_ms * 3 / 4).min(time_left_ms / 3).max(50)
}

fn format_info(response: &SearchResponse) -> String {
    let score_str = match mate_distance(response.score_cp) {
        Some(plies) if plies >= 0 => format!("mate {}", (plies + 1) / 2),
        Some(plies) => format!("mate -{}", (-plies + 1) / 2),
        None => format!("cp {}", response.score_cp),
    };
    format!(
        "info depth {} score {} nodes {} nps {} pv {}",
        response.depth_reached,
        score_str,
        response.nodes,
        response.nps,
        response.best_move.as_deref().unwrap_or("")
    )
}
