//! Transposition table: a bounded cache from Zobrist hash to search results.
//!
//! Keys are the raw 64-bit position hashes; collisions across different
//! positions are accepted as a rare, bounded-impact risk and are not resolved
//! by secondary verification. When the configured capacity is exceeded the
//! oldest-inserted entry is evicted; capacity 0 means unbounded.

use std::collections::{HashMap, VecDeque};

use crate::types::Move;

/// Transposition table entry flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TTFlag {
    /// Exact score (PV node)
    Exact,
    /// Score is a lower bound (cut node - failed high)
    LowerBound,
    /// Score is an upper bound (all node - failed low)
    UpperBound,
}

/// A single entry in the transposition table
#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    /// Depth of the search when this entry was stored
    pub depth: u8,
    /// Score of the position
    pub score: i32,
    /// Type of node/bound
    pub flag: TTFlag,
    /// Best move found (for move ordering)
    pub best_move: Option<Move>,
}

/// Transposition table for caching search results
pub struct TranspositionTable {
    entries: HashMap<u64, TTEntry>,
    /// Keys in the order they were first inserted, for oldest-first eviction
    insertion_order: VecDeque<u64>,
    /// Maximum number of entries; 0 means unbounded
    capacity: usize,
    /// Statistics
    pub hits: u64,
    pub stores: u64,
    pub evictions: u64,
}

/// Default capacity: enough for a few deep middlegame searches
const DEFAULT_CAPACITY: usize = 1 << 20;

impl TranspositionTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a table holding at most `capacity` entries; 0 means unbounded
    /// (memory is then bounded only by the caller's restraint).
    pub fn with_capacity(capacity: usize) -> Self {
        TranspositionTable {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity,
            hits: 0,
            stores: 0,
            evictions: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Probe the table for a position.
    /// Returns `Some((score, best_move))` if the cached result is usable at
    /// this depth and bound window.
    pub fn probe(
        &mut self,
        hash: u64,
        depth: u8,
        alpha: i32,
        beta: i32,
    ) -> Option<(i32, Option<Move>)> {
        let entry = *self.entries.get(&hash)?;

        // Only use if searched to at least this depth
        if entry.depth < depth {
            return None;
        }

        let usable = match entry.flag {
            TTFlag::Exact => true,
            TTFlag::LowerBound => entry.score >= beta,
            TTFlag::UpperBound => entry.score <= alpha,
        };
        if usable {
            self.hits += 1;
            Some((entry.score, entry.best_move))
        } else {
            None
        }
    }

    /// Get the best move from a previous search (for move ordering)
    pub fn get_best_move(&self, hash: u64) -> Option<Move> {
        self.entries.get(&hash).and_then(|entry| entry.best_move)
    }

    /// Store a search result. A re-store of a known position updates the
    /// entry in place and keeps its original insertion age.
    pub fn store(&mut self, hash: u64, depth: u8, score: i32, flag: TTFlag, best_move: Option<Move>) {
        let entry = TTEntry {
            depth,
            score,
            flag,
            best_move,
        };
        self.stores += 1;

        if self.entries.insert(hash, entry).is_none() {
            self.insertion_order.push_back(hash);
            if self.capacity > 0 && self.entries.len() > self.capacity {
                if let Some(oldest) = self.insertion_order.pop_front() {
                    self.entries.remove(&oldest);
                    self.evictions += 1;
                }
            }
        }
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
        self.hits = 0;
        self.stores = 0;
        self.evictions = 0;
    }

    /// Get table size info
    pub fn info(&self) -> String {
        format!(
            "TT: {} entries (capacity {}), {} hits, {} stores, {} evictions",
            self.entries.len(),
            if self.capacity == 0 {
                "unbounded".to_string()
            } else {
                self.capacity.to_string()
            },
            self.hits,
            self.stores,
            self.evictions
        )
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}
