//! Error types for the engine boundary.
//!
//! Recoverable failures (malformed board-description strings, unparseable or
//! illegal move text) surface as [`EngineError`]; internal invariant
//! violations inside the search are bugs and panic instead of returning a
//! plausible-looking result.

use thiserror::Error;

/// Unified error type for requests crossing the engine boundary.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The board-description string does not have the six space-delimited
    /// fields (placement, color, castling, en passant, halfmove, fullmove).
    #[error("board description must have 6 space-delimited fields, got {0}")]
    BadFieldCount(usize),

    /// The placement field does not describe exactly 8 ranks.
    #[error("placement field must have 8 ranks separated by '/', got {0}")]
    BadRankCount(usize),

    /// A rank of the placement field does not sum to exactly 8 files.
    #[error("rank {rank} of placement field covers {files} files, expected 8")]
    BadRankSum { rank: usize, files: u8 },

    /// A character in the placement field is neither a piece letter nor a
    /// run length.
    #[error("invalid character {0:?} in placement field")]
    BadPieceChar(char),

    /// The active-color field is not `w` or `b`.
    #[error("active color must be 'w' or 'b', got {0:?}")]
    BadActiveColor(char),

    /// The castling field is not `-` or a duplicate-free subset of `KQkq`.
    #[error("castling field must be '-' or a subset of \"KQkq\", got {0:?}")]
    BadCastlingField(String),

    /// The en-passant field is not `-` or a passable target square.
    #[error("en passant field must be '-' or a square on rank 3 or 6, got {0:?}")]
    BadEnPassantField(String),

    /// A move-counter field failed to parse as a number.
    #[error("cannot parse {field} counter from {value:?}")]
    BadClockField { field: &'static str, value: String },

    /// Square text outside `a1`..`h8`.
    #[error("invalid square {0:?}")]
    InvalidSquare(String),

    /// Move text that is not long algebraic `<from><to>[promotion]`.
    #[error("cannot parse move {0:?}")]
    UnparseableMove(String),

    /// A syntactically valid move that is not legal in the current position.
    #[error("move {0:?} is not legal in this position")]
    IllegalMove(String),

    /// The bounded magic-multiplier search gave up. Only reachable from the
    /// regeneration utility; the shipped tables never trigger it.
    #[error("no collision-free magic multiplier found for square {square} after {attempts} attempts")]
    MagicSearchExhausted { square: u8, attempts: u32 },
}

pub type EngineResult<T> = Result<T, EngineError>;
