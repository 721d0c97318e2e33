//! Integration tests at the engine boundary: positions arrive as FEN plus
//! long algebraic move lists, searches answer with a move and statistics,
//! and a stop signal ends an in-flight search with a usable result.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use sable_chess::engine::{Engine, SearchRequest};
use sable_chess::error::EngineError;
use sable_chess::search::is_mate_score;

#[test]
fn position_round_trip_through_boundary() {
    let mut engine = Engine::new();
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    engine.set_position(fen, &[]).unwrap();
    assert_eq!(engine.board().to_fen(), fen);
}

#[test]
fn played_moves_advance_the_position() {
    let mut engine = Engine::new();
    engine
        .set_position(
            sable_chess::board::STARTING_POSITION_FEN,
            &["e2e4", "c7c5", "g1f3"],
        )
        .unwrap();
    assert_eq!(
        engine.board().to_fen(),
        "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
    );
}

#[test]
fn malformed_positions_are_rejected() {
    let mut engine = Engine::new();
    let rejected = [
        "not a fen at all",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPP/RNBQKBNR w KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR z KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KX - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e5 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - abc 1",
    ];
    for fen in rejected {
        assert!(engine.set_position(fen, &[]).is_err(), "accepted {fen:?}");
    }
    // a rejected request leaves the engine on its previous position
    assert_eq!(
        engine.board().to_fen(),
        sable_chess::board::STARTING_POSITION_FEN
    );
}

#[test]
fn illegal_move_text_is_rejected_not_substituted() {
    let mut engine = Engine::new();
    let err = engine
        .set_position(
            sable_chess::board::STARTING_POSITION_FEN,
            &["e2e4", "e7e5", "e1e3"],
        )
        .map(|_| ())
        .unwrap_err();
    assert_eq!(err, EngineError::IllegalMove("e1e3".to_string()));
}

#[test]
fn search_from_start_is_sane() {
    let mut engine = Engine::new();
    let response = engine.go(&SearchRequest::with_depth(4)).unwrap();
    let best = response.best_move.expect("start position has moves");
    assert_eq!(best.len(), 4);
    assert_eq!(response.depth_reached, 4);
    assert!(response.nodes > 100);
    assert!(!is_mate_score(response.score_cp));
    assert_eq!(response.root_scores.len(), 20);
}

#[test]
fn search_finds_back_rank_mate() {
    let mut engine = Engine::new();
    engine
        .set_position("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", &[])
        .unwrap();
    let response = engine.go(&SearchRequest::with_depth(4)).unwrap();
    assert_eq!(response.best_move.as_deref(), Some("a1a8"));
    assert!(is_mate_score(response.score_cp));
}

#[test]
fn restriction_to_move_subset_is_honored() {
    let mut engine = Engine::new();
    let request = SearchRequest {
        depth: 3,
        restrict_moves: Some(vec!["b1c3".to_string(), "b1a3".to_string()]),
    };
    let response = engine.go(&request).unwrap();
    let best = response.best_move.unwrap();
    assert!(best == "b1c3" || best == "b1a3");
    assert_eq!(response.root_scores.len(), 2);
}

#[test]
fn stop_signal_ends_search_with_a_usable_move() {
    let mut engine = Engine::new();
    let stop = engine.stop_handle();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        stop.store(true, Ordering::Relaxed);
    });

    let start = Instant::now();
    // depth 64 would take effectively forever without the stop signal
    let response = engine.go(&SearchRequest::with_depth(64)).unwrap();
    stopper.join().unwrap();

    assert!(response.best_move.is_some());
    assert!(response.depth_reached < 64);
    assert!(
        start.elapsed() < Duration::from_secs(30),
        "stop signal was not observed promptly"
    );
}

#[test]
fn consecutive_searches_reuse_the_engine() {
    let mut engine = Engine::new();
    engine
        .set_position(sable_chess::board::STARTING_POSITION_FEN, &[])
        .unwrap();
    let first = engine.go(&SearchRequest::with_depth(3)).unwrap();
    let first_move = first.best_move.unwrap();

    let played = [first_move.as_str()];
    engine
        .set_position(sable_chess::board::STARTING_POSITION_FEN, &played)
        .unwrap();
    let second = engine.go(&SearchRequest::with_depth(3)).unwrap();
    assert!(second.best_move.is_some());
}

#[test]
fn deterministic_for_fixed_depth() {
    let fen = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3";
    let mut first_engine = Engine::new();
    first_engine.set_position(fen, &[]).unwrap();
    let first = first_engine.go(&SearchRequest::with_depth(4)).unwrap();

    let mut second_engine = Engine::new();
    second_engine.set_position(fen, &[]).unwrap();
    let second = second_engine.go(&SearchRequest::with_depth(4)).unwrap();

    assert_eq!(first.best_move, second.best_move);
    assert_eq!(first.score_cp, second.score_cp);
}
