use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sable_chess::board::Board;
use sable_chess::evaluate::EvalWeights;
use sable_chess::perft::perft;
use sable_chess::search::{search_root, SearchControl};
use sable_chess::tt::TranspositionTable;

const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

pub fn bench_legal_moves_from_start(c: &mut Criterion) {
    let mut board = Board::new();
    c.bench_function("legal moves from start", |b| {
        b.iter(|| black_box(&mut board).legal_moves())
    });
}

pub fn bench_legal_moves_from_kiwipete(c: &mut Criterion) {
    let mut board = Board::from_fen(KIWIPETE_FEN).unwrap();
    c.bench_function("legal moves from kiwipete", |b| {
        b.iter(|| black_box(&mut board).legal_moves())
    });
}

pub fn bench_perft_4(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat-sampling");
    group.sample_size(10);
    let mut board = Board::new();
    group.bench_function("perft 4 from start", |b| {
        b.iter(|| perft(black_box(&mut board), 4))
    });
    group.finish();
}

pub fn bench_search_4(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    let weights = EvalWeights::default();

    let mut board = Board::new();
    group.bench_function("search from start 4 ply", |b| {
        b.iter(|| {
            let mut tt = TranspositionTable::new();
            let control = SearchControl::new();
            search_root(
                black_box(&mut board),
                4,
                None,
                None,
                &weights,
                &mut tt,
                &control,
            )
        })
    });

    let mut kiwipete = Board::from_fen(KIWIPETE_FEN).unwrap();
    group.bench_function("search from kiwipete 3 ply", |b| {
        b.iter(|| {
            let mut tt = TranspositionTable::new();
            let control = SearchControl::new();
            search_root(
                black_box(&mut kiwipete),
                3,
                None,
                None,
                &weights,
                &mut tt,
                &control,
            )
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_legal_moves_from_start,
    bench_legal_moves_from_kiwipete,
    bench_perft_4,
    bench_search_4,
);
criterion_main!(benches);
