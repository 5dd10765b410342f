//! Universal hashing for vector-keyed maps and pattern deduplication.
//!
//! Hashing is multilinear over 32-bit input chunks (Lemire & Kaser 2014,
//! theorem 3.1 with K = 64, L = 32): `h(s) = (m0 + Σ m(i+1)·s(i)) mod 2^64`,
//! keeping the upper 32 bits. Two lanes with independent multipliers are
//! combined into a 64-bit output so the full hash is usable by `HashMap`.
//!
//! # Lifecycle
//!
//! A [`MultiplierTable`] is filled once at construction and is read-only
//! afterward. The process-wide table ([`MultiplierTable::global`]) is seeded
//! from OS entropy on first use; tests and benchmarks that need reproducible
//! iteration order build their own with [`MultiplierTable::seeded`].
//!
//! Hashing is purely a performance aid. Every map keyed through it compares
//! keys by exact equality.

use crate::point::{vectorize, Point};
use crate::DEFAULT_MULTIPLIER_COUNT;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasher, Hasher};
use std::sync::Arc;

/// Map keyed by vectors (or patterns) using universal hashing.
pub type UniversalMap<K, V> = HashMap<K, V, UniversalState>;

/// Set using universal hashing.
pub type UniversalSet<K> = HashSet<K, UniversalState>;

static GLOBAL_TABLE: Lazy<Arc<MultiplierTable>> = Lazy::new(|| {
    let mut rng = StdRng::from_entropy();
    Arc::new(MultiplierTable::from_rng(&mut rng, DEFAULT_MULTIPLIER_COUNT))
});

// =============================================================================
// MULTIPLIER TABLE
// =============================================================================

/// Immutable table of random 64-bit multipliers, one sequence per lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplierTable {
    low: Vec<u64>,
    high: Vec<u64>,
}

impl MultiplierTable {
    /// The process-wide table, seeded once on first use.
    pub fn global() -> Arc<MultiplierTable> {
        Arc::clone(&GLOBAL_TABLE)
    }

    /// A reproducible table with `len` multipliers per lane.
    pub fn seeded(seed: u64, len: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::from_rng(&mut rng, len)
    }

    fn from_rng(rng: &mut impl Rng, len: usize) -> Self {
        // m0 plus at least one chunk multiplier.
        let len = len.max(2);
        Self {
            low: (0..len).map(|_| rng.gen()).collect(),
            high: (0..len).map(|_| rng.gen()).collect(),
        }
    }

    /// Multipliers per lane.
    pub fn len(&self) -> usize {
        self.low.len()
    }

    /// Always false; a table holds at least two multipliers per lane.
    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    /// Multiplier pair for chunk position `i` (1-based after the offset term).
    #[inline]
    fn multipliers(&self, i: usize) -> (u64, u64) {
        // Chunk multipliers cycle over indices 1..len; index 0 is the offset.
        let idx = 1 + (i % (self.low.len() - 1));
        (self.low[idx], self.high[idx])
    }
}

// =============================================================================
// HASHER
// =============================================================================

/// `BuildHasher` that shares one [`MultiplierTable`].
#[derive(Debug, Clone)]
pub struct UniversalState {
    table: Arc<MultiplierTable>,
}

impl UniversalState {
    pub fn new(table: Arc<MultiplierTable>) -> Self {
        Self { table }
    }

    /// Reproducible state for deterministic iteration order.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(MultiplierTable::seeded(seed, DEFAULT_MULTIPLIER_COUNT)))
    }
}

impl Default for UniversalState {
    fn default() -> Self {
        Self::new(MultiplierTable::global())
    }
}

impl BuildHasher for UniversalState {
    type Hasher = UniversalHasher;

    fn build_hasher(&self) -> UniversalHasher {
        UniversalHasher {
            low: self.table.low[0],
            high: self.table.high[0],
            chunk: 0,
            table: Arc::clone(&self.table),
        }
    }
}

/// Multilinear hasher over 32-bit chunks.
#[derive(Debug, Clone)]
pub struct UniversalHasher {
    low: u64,
    high: u64,
    chunk: usize,
    table: Arc<MultiplierTable>,
}

impl UniversalHasher {
    #[inline]
    fn absorb(&mut self, chunk: u32) {
        let (m_low, m_high) = self.table.multipliers(self.chunk);
        self.low = self.low.wrapping_add(m_low.wrapping_mul(chunk as u64));
        self.high = self.high.wrapping_add(m_high.wrapping_mul(chunk as u64));
        self.chunk += 1;
    }
}

impl Hasher for UniversalHasher {
    fn finish(&self) -> u64 {
        (self.high & 0xFFFF_FFFF_0000_0000) | (self.low >> 32)
    }

    fn write(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(4) {
            let mut buf = [0u8; 4];
            buf[..chunk.len()].copy_from_slice(chunk);
            self.absorb(u32::from_le_bytes(buf));
        }
    }

    fn write_u64(&mut self, value: u64) {
        self.absorb(value as u32);
        self.absorb((value >> 32) as u32);
    }

    fn write_usize(&mut self, value: usize) {
        self.write_u64(value as u64);
    }
}

// =============================================================================
// PATTERN
// =============================================================================

/// The translation-invariant shape of a point sequence.
///
/// Holds the consecutive difference vectors of the pattern, so two patterns
/// compare equal exactly when one is a translation of the other (in the same
/// point order).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pattern {
    shape: Vec<Point>,
}

impl Pattern {
    /// Shape of an ordered point sequence.
    pub fn of(points: &[Point]) -> Self {
        Self {
            shape: vectorize(points),
        }
    }

    /// Wrap an already vectorised shape.
    pub fn from_shape(shape: Vec<Point>) -> Self {
        Self { shape }
    }

    /// The difference vectors.
    pub fn shape(&self) -> &[Point] {
        &self.shape
    }

    /// Number of difference vectors (pattern size minus one).
    pub fn len(&self) -> usize {
        self.shape.len()
    }

    /// True for the shape of a single-point pattern.
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::Hash;

    fn hash_with(state: &UniversalState, value: &impl Hash) -> u64 {
        let mut hasher = state.build_hasher();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn seeded_tables_are_reproducible() {
        let a = MultiplierTable::seeded(7, 16);
        let b = MultiplierTable::seeded(7, 16);
        let c = MultiplierTable::seeded(8, 16);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn equal_points_hash_identically() {
        let state = UniversalState::seeded(42);
        let a = Point::from([1.0, -0.0]);
        let b = Point::from([1.0, 0.0]);
        assert_eq!(hash_with(&state, &a), hash_with(&state, &b));
    }

    #[test]
    fn distinct_points_usually_differ() {
        let state = UniversalState::seeded(42);
        let a = hash_with(&state, &Point::from([1.0, 2.0]));
        let b = hash_with(&state, &Point::from([2.0, 1.0]));
        assert_ne!(a, b);
    }

    #[test]
    fn long_inputs_cycle_multipliers() {
        let state = UniversalState::new(Arc::new(MultiplierTable::seeded(1, 2)));
        let long: Vec<Point> = (0..50).map(|i| Point::from([i as f64, 1.0])).collect();
        // Must not panic when the input outgrows the table.
        let _ = hash_with(&state, &long);
    }

    #[test]
    fn translated_patterns_share_a_shape() {
        let a = [Point::from([1.0, 1.0]), Point::from([2.0, 1.0])];
        let b = [Point::from([1.0, 3.0]), Point::from([2.0, 3.0])];
        assert_eq!(Pattern::of(&a), Pattern::of(&b));

        let mut seen: UniversalSet<Pattern> = UniversalSet::with_hasher(UniversalState::seeded(3));
        assert!(seen.insert(Pattern::of(&a)));
        assert!(!seen.insert(Pattern::of(&b)));
    }

    #[test]
    fn single_point_shape_is_empty() {
        assert!(Pattern::of(&[Point::from([4.0, 2.0])]).is_empty());
    }
}
