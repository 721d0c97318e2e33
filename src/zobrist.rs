use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::types::{Color, PieceType, Square};

/// Zobrist hashing keys for chess positions.
/// These are pseudo-random u64 values XORed together to create a unique hash
/// for each position.
pub struct ZobristKeys {
    /// Keys for each (color, piece_type, square) combination: 2 * 6 * 64 = 768 keys,
    /// indexed as `pieces[color][piece_type][square]`
    pub pieces: [[[u64; 64]; 6]; 2],
    /// Key for side to move (XORed when it's black's turn)
    pub side_to_move: u64,
    /// Keys for castling rights, one per held right
    pub castle_kingside_white: u64,
    pub castle_queenside_white: u64,
    pub castle_kingside_black: u64,
    pub castle_queenside_black: u64,
    /// Keys for en passant file (0-7 for files a-h)
    pub en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Initialize Zobrist keys with deterministic pseudo-random values.
    /// Uses a simple PRNG seeded with a fixed value for reproducibility.
    /// Duplicate or zero draws are discarded and redrawn, so the key set is
    /// collision-free by construction.
    pub fn new() -> Self {
        let mut rng = XorShift64::new(0x1234567890ABCDEF);
        let mut seen = HashSet::with_capacity(781);
        let mut draw = move || loop {
            let key = rng.next();
            if key != 0 && seen.insert(key) {
                return key;
            }
        };

        let mut pieces = [[[0u64; 64]; 6]; 2];
        for color in 0..2 {
            for piece in 0..6 {
                for square in 0..64 {
                    pieces[color][piece][square] = draw();
                }
            }
        }

        let side_to_move = draw();

        let castle_kingside_white = draw();
        let castle_queenside_white = draw();
        let castle_kingside_black = draw();
        let castle_queenside_black = draw();

        let mut en_passant = [0u64; 8];
        for file in 0..8 {
            en_passant[file] = draw();
        }

        ZobristKeys {
            pieces,
            side_to_move,
            castle_kingside_white,
            castle_queenside_white,
            castle_kingside_black,
            castle_queenside_black,
            en_passant,
        }
    }

    /// Get the key for a piece at a square
    #[inline]
    pub fn piece_key(&self, color: Color, piece_type: PieceType, sq: Square) -> u64 {
        self.pieces[color.index()][piece_type.index()][sq.index()]
    }

    /// Get the key for an en-passant target square (keyed by file)
    #[inline]
    pub fn en_passant_key(&self, sq: Square) -> u64 {
        self.en_passant[sq.file() as usize]
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple XorShift64 PRNG for deterministic key generation
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        XorShift64 { state: seed }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Global static Zobrist keys (initialized once)
pub static ZOBRIST_KEYS: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);
