//! The BIGSI data structure itself: a build phase that accepts per-colour
//! Bloom filters, a one-time freeze that pivots them into row-major storage,
//! and a query phase that ANDs rows together to resolve colour membership.
//!
//! A [`Bigsi`] owns its build-phase state (`id_checker`, `colour_table`,
//! `build_rows`) until [`Bigsi::freeze`], after which that state is dropped
//! and every operation is served from the [`bigsi_store::Store`] handle
//! instead. A BIGSI obtained via [`Bigsi::load`] starts directly in that
//! post-freeze state, so the two never diverge in observable behavior.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};
use thiserror::Error;

use bigsi_bitvec::BitVector;
use bigsi_bloom::BloomFilter;
use bigsi_store::{Metadata, Store};

/// Largest colour id a capacity-`u32` bit vector index can address.
pub const MAX_COLOURS: u32 = i32::MAX as u32;

#[derive(Error, Debug)]
pub enum Error {
    #[error("a required sizing parameter was absent or zero")]
    NullArgument,
    #[error("operation requires a frozen index")]
    IndexUnfrozen,
    #[error("index is already frozen")]
    AlreadyFrozen,
    #[error("cannot freeze an index with zero colours")]
    NoColours,
    #[error("query supplied {actual} hash values, expected {expected}")]
    HashCountMismatch { expected: u32, actual: usize },
    #[error("result vector capacity {actual} does not match colour count {expected}")]
    CapacityMismatch { expected: u32, actual: u32 },
    #[error("sequence id {0:?} is already present")]
    DuplicateSequenceId(String),
    #[error(
        "bloom filter for {sequence_id:?} is incompatible: expected numHashes={expected_hashes}/numBits={expected_bits}, found {actual_hashes}/{actual_bits}"
    )]
    IncompatibleBloomFilter {
        sequence_id: String,
        expected_hashes: u32,
        expected_bits: u32,
        actual_hashes: u32,
        actual_bits: u32,
    },
    #[error("bloom filter for {0:?} has popcount 0")]
    EmptyBloomFilter(String),
    #[error("colour limit ({limit}) reached")]
    ColourLimitExceeded { limit: u32 },
    #[error("add() accepted {actual} pairs, expected {expected}")]
    UnexpectedCount { expected: usize, actual: usize },
    #[error("colour {0} not found (colourIterator={1})")]
    ColourNotFound(u32, u32),
    #[error("expected {kind} entry {key} missing from storage; index may be corrupt")]
    MissingEntry { kind: &'static str, key: u32 },
    #[error(transparent)]
    Storage(#[from] bigsi_store::Error),
    #[error(transparent)]
    BitVector(#[from] bigsi_bitvec::Error),
}

/// An inverted-Bloom-filter index over a set of sequence colours.
pub struct Bigsi {
    num_bits: u32,
    num_hashes: u32,
    colour_iterator: u32,
    frozen: bool,
    storage_dir: PathBuf,
    id_checker: HashMap<String, u32>,
    colour_table: Vec<String>,
    build_rows: Vec<BitVector>,
    store: Option<Store>,
}

impl Bigsi {
    /// Creates an empty, unfrozen BIGSI that will freeze into `storage_dir`.
    pub fn init(num_bits: u32, num_hashes: u32, storage_dir: impl AsRef<Path>) -> Result<Self, Error> {
        if num_bits == 0 || num_hashes == 0 {
            return Err(Error::NullArgument);
        }
        Ok(Self {
            num_bits,
            num_hashes,
            colour_iterator: 0,
            frozen: false,
            storage_dir: storage_dir.as_ref().to_path_buf(),
            id_checker: HashMap::new(),
            colour_table: Vec::new(),
            build_rows: Vec::new(),
            store: None,
        })
    }

    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    pub fn colour_iterator(&self) -> u32 {
        self.colour_iterator
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Adds a batch of (sequence id, Bloom filter) pairs, in the iteration
    /// order supplied by `pairs`. Rejects the whole batch on the first
    /// incompatible or duplicate entry, or if the number accepted does not
    /// equal `expected_count`. Colours already accepted before a rejection
    /// remain in the index; the caller is expected to `destroy` it.
    pub fn add(&mut self, pairs: IndexMap<String, BloomFilter>, expected_count: usize) -> Result<(), Error> {
        let mut accepted = 0usize;
        for (sequence_id, bf) in pairs {
            if self.id_checker.contains_key(&sequence_id) {
                return Err(Error::DuplicateSequenceId(sequence_id));
            }
            if bf.popcount() == 0 {
                return Err(Error::EmptyBloomFilter(sequence_id));
            }
            if bf.num_hashes() != self.num_hashes || bf.capacity() != self.num_bits {
                return Err(Error::IncompatibleBloomFilter {
                    expected_hashes: self.num_hashes,
                    expected_bits: self.num_bits,
                    actual_hashes: bf.num_hashes(),
                    actual_bits: bf.capacity(),
                    sequence_id,
                });
            }

            let colour = self.colour_iterator;
            self.build_rows.push(bf.into_bits());
            self.id_checker.insert(sequence_id.clone(), colour);
            self.colour_table.push(sequence_id);
            self.colour_iterator += 1;
            accepted += 1;

            if self.colour_iterator >= MAX_COLOURS {
                return Err(Error::ColourLimitExceeded { limit: MAX_COLOURS });
            }
        }

        if accepted != expected_count {
            return Err(Error::UnexpectedCount {
                expected: expected_count,
                actual: accepted,
            });
        }
        debug!("added {accepted} colours, colourIterator now {}", self.colour_iterator);
        Ok(())
    }

    /// Pivots the per-colour build rows into per-bit-position index rows and
    /// persists everything, releasing build-phase memory.
    pub fn freeze(&mut self) -> Result<(), Error> {
        if self.frozen {
            return Err(Error::AlreadyFrozen);
        }
        if self.colour_iterator < 1 {
            return Err(Error::NoColours);
        }

        let store = Store::create(&self.storage_dir)?;
        for i in 0..self.num_bits {
            let mut row = BitVector::new(self.colour_iterator);
            for c in 0..self.colour_iterator {
                if self.build_rows[c as usize].get(i)? {
                    row.set(c, true)?;
                }
            }
            store.put_row(i, &row.to_bytes())?;
        }
        for (colour, sequence_id) in self.colour_table.iter().enumerate() {
            store.put_colour(colour as u32, sequence_id)?;
        }

        let metadata = Metadata {
            row_store_filename: bigsi_store::ROW_STORE_FILENAME.to_string(),
            colour_store_filename: bigsi_store::COLOUR_STORE_FILENAME.to_string(),
            num_bits: self.num_bits,
            num_hashes: self.num_hashes,
            colour_iterator: self.colour_iterator,
        };
        metadata.write(&self.storage_dir)?;

        self.build_rows = Vec::new();
        self.id_checker = HashMap::new();
        self.colour_table = Vec::new();
        self.store = Some(store);
        self.frozen = true;
        info!(
            "froze bigsi at {:?}: {} colours, {} bits",
            self.storage_dir, self.colour_iterator, self.num_bits
        );
        Ok(())
    }

    /// ANDs together the index rows addressed by `hash_values`, writing the
    /// surviving colours into `result`.
    pub fn query(&self, hash_values: &[u64], result: &mut BitVector) -> Result<(), Error> {
        if !self.frozen {
            return Err(Error::IndexUnfrozen);
        }
        if hash_values.len() != self.num_hashes as usize {
            return Err(Error::HashCountMismatch {
                expected: self.num_hashes,
                actual: hash_values.len(),
            });
        }
        if result.capacity() != self.colour_iterator {
            return Err(Error::CapacityMismatch {
                expected: self.colour_iterator,
                actual: result.capacity(),
            });
        }
        let store = self.store.as_ref().ok_or(Error::IndexUnfrozen)?;

        for (i, hash) in hash_values.iter().enumerate() {
            let pos = (*hash % self.num_bits as u64) as u32;
            let bytes = store
                .get_row(pos)?
                .ok_or(Error::MissingEntry { kind: "row", key: pos })?;
            let row = BitVector::from_bytes(&bytes)?;

            if row.popcount() == 0 {
                clear(result);
                return Ok(());
            }
            if i == 0 {
                *result = row;
            } else {
                result.and_in_place(&row)?;
                if result.popcount() == 0 {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Resolves a colour id to its owned sequence-ID string.
    pub fn lookup_colour(&self, colour: u32) -> Result<String, Error> {
        if !self.frozen {
            return Err(Error::IndexUnfrozen);
        }
        if colour >= self.colour_iterator {
            return Err(Error::ColourNotFound(colour, self.colour_iterator));
        }
        let store = self.store.as_ref().ok_or(Error::IndexUnfrozen)?;
        store
            .get_colour(colour)?
            .ok_or(Error::MissingEntry { kind: "colour", key: colour })
    }

    /// Refreshes the metadata sidecar without consuming the index.
    pub fn persist(&self) -> Result<(), Error> {
        if !self.frozen {
            return Err(Error::IndexUnfrozen);
        }
        let metadata = Metadata {
            row_store_filename: bigsi_store::ROW_STORE_FILENAME.to_string(),
            colour_store_filename: bigsi_store::COLOUR_STORE_FILENAME.to_string(),
            num_bits: self.num_bits,
            num_hashes: self.num_hashes,
            colour_iterator: self.colour_iterator,
        };
        metadata.write(&self.storage_dir)?;
        Ok(())
    }

    /// Consumes the index. If frozen, persists metadata and closes the
    /// store (flushing durability); if unfrozen, just releases build memory.
    pub fn destroy(mut self) -> Result<(), Error> {
        if self.frozen {
            self.persist()?;
            if let Some(store) = self.store.take() {
                store.close()?;
            }
        }
        Ok(())
    }

    /// Opens an existing, frozen BIGSI directory, running the load-time
    /// self-check (a query against the highest `numHashes` hash positions).
    pub fn load(storage_dir: impl AsRef<Path>) -> Result<Self, Error> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        let store = Store::open(&storage_dir)?;
        let metadata = Metadata::read(&storage_dir)?;

        let bigsi = Self {
            num_bits: metadata.num_bits,
            num_hashes: metadata.num_hashes,
            colour_iterator: metadata.colour_iterator,
            frozen: true,
            storage_dir,
            id_checker: HashMap::new(),
            colour_table: Vec::new(),
            build_rows: Vec::new(),
            store: Some(store),
        };

        let probe: Vec<u64> = (0..bigsi.num_hashes)
            .map(|i| bigsi.num_bits.saturating_sub(1 + i) as u64)
            .collect();
        let mut result = BitVector::new(bigsi.colour_iterator);
        bigsi.query(&probe, &mut result)?;

        Ok(bigsi)
    }

    /// Row occupancy statistics for the `shrink` maintenance subcommand.
    /// Read-only: never mutates the frozen index.
    pub fn occupancy_stats(&self) -> Result<OccupancyStats, Error> {
        if !self.frozen {
            return Err(Error::IndexUnfrozen);
        }
        let store = self.store.as_ref().ok_or(Error::IndexUnfrozen)?;

        let mut empty_rows = 0u32;
        let mut total_popcount = 0u64;
        for pos in 0..self.num_bits {
            let bytes = store
                .get_row(pos)?
                .ok_or(Error::MissingEntry { kind: "row", key: pos })?;
            let popcount = BitVector::from_bytes(&bytes)?.popcount();
            if popcount == 0 {
                empty_rows += 1;
            }
            total_popcount += popcount as u64;
        }

        Ok(OccupancyStats {
            num_bits: self.num_bits,
            empty_rows,
            mean_popcount: total_popcount as f64 / self.num_bits as f64,
        })
    }
}

/// Row occupancy statistics over a frozen index, as reported by `shrink`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyStats {
    pub num_bits: u32,
    /// Rows with no colour set; these never contribute to a query result.
    pub empty_rows: u32,
    /// Mean number of colours set per row, across all `num_bits` rows.
    pub mean_popcount: f64,
}

/// Sets every bit in `bv` to 0 without changing its capacity.
fn clear(bv: &mut BitVector) {
    for i in 0..bv.capacity() {
        bv.set(i, false).ok();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn bf_with_bits(num_bits: u32, num_hashes: u32, bits: &[u32]) -> BloomFilter {
        let mut bv = BitVector::new(num_bits);
        for &b in bits {
            bv.set(b, true).unwrap();
        }
        BloomFilter::from_bitvector(bv, num_hashes)
    }

    // S1: build two colours, query a shared bit.
    #[test]
    fn s1_build_two_colours_query_shared_bit() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(16, 2, dir.path()).unwrap();
        let mut pairs = IndexMap::new();
        pairs.insert("A".to_string(), bf_with_bits(16, 2, &[3, 11]));
        pairs.insert("B".to_string(), bf_with_bits(16, 2, &[3, 7]));
        bigsi.add(pairs, 2).unwrap();
        bigsi.freeze().unwrap();

        let mut result = BitVector::new(2);
        bigsi.query(&[3, 3], &mut result).unwrap();
        assert!(result.get(0).unwrap());
        assert!(result.get(1).unwrap());
        assert_eq!(result.popcount(), 2);
    }

    // S2: query that excludes via AND.
    #[test]
    fn s2_query_excludes_via_and() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(16, 2, dir.path()).unwrap();
        let mut pairs = IndexMap::new();
        pairs.insert("A".to_string(), bf_with_bits(16, 2, &[3, 11]));
        pairs.insert("B".to_string(), bf_with_bits(16, 2, &[3, 7]));
        bigsi.add(pairs, 2).unwrap();
        bigsi.freeze().unwrap();

        let mut result = BitVector::new(2);
        bigsi.query(&[11, 7], &mut result).unwrap();
        assert_eq!(result.popcount(), 0);
    }

    // S3: empty row early exit.
    #[test]
    fn s3_empty_row_early_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(8, 1, dir.path()).unwrap();
        let mut pairs = IndexMap::new();
        pairs.insert("A".to_string(), bf_with_bits(8, 1, &[0]));
        bigsi.add(pairs, 1).unwrap();
        bigsi.freeze().unwrap();

        let mut result = BitVector::new(1);
        bigsi.query(&[5], &mut result).unwrap();
        assert_eq!(result.popcount(), 0);
    }

    // S4: duplicate rejection across two add() batches.
    #[test]
    fn s4_duplicate_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(8, 1, dir.path()).unwrap();
        let mut first = IndexMap::new();
        first.insert("A".to_string(), bf_with_bits(8, 1, &[0]));
        bigsi.add(first, 1).unwrap();

        let mut second = IndexMap::new();
        second.insert("A".to_string(), bf_with_bits(8, 1, &[2]));
        let err = bigsi.add(second, 1).unwrap_err();
        assert!(matches!(err, Error::DuplicateSequenceId(ref s) if s == "A"));
        assert_eq!(bigsi.colour_iterator(), 1);
    }

    // S5: round-trip on disk.
    #[test]
    fn s5_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut bigsi = Bigsi::init(16, 2, dir.path()).unwrap();
            let mut pairs = IndexMap::new();
            pairs.insert("A".to_string(), bf_with_bits(16, 2, &[3, 11]));
            pairs.insert("B".to_string(), bf_with_bits(16, 2, &[3, 7]));
            bigsi.add(pairs, 2).unwrap();
            bigsi.freeze().unwrap();
            bigsi.destroy().unwrap();
        }

        let loaded = Bigsi::load(dir.path()).unwrap();
        let mut result = BitVector::new(2);
        loaded.query(&[3, 3], &mut result).unwrap();
        assert!(result.get(0).unwrap());
        assert!(result.get(1).unwrap());
    }

    // S6: capacity check.
    #[test]
    fn s6_capacity_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(16, 2, dir.path()).unwrap();
        let mut pairs = IndexMap::new();
        pairs.insert("A".to_string(), bf_with_bits(16, 2, &[3, 11]));
        pairs.insert("B".to_string(), bf_with_bits(16, 2, &[3, 7]));
        bigsi.add(pairs, 2).unwrap();
        bigsi.freeze().unwrap();

        let mut result = BitVector::new(1);
        let err = bigsi.query(&[3, 3], &mut result).unwrap_err();
        assert!(matches!(
            err,
            Error::CapacityMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn occupancy_stats_counts_empty_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(4, 1, dir.path()).unwrap();
        let mut pairs = IndexMap::new();
        pairs.insert("A".to_string(), bf_with_bits(4, 1, &[0, 2]));
        bigsi.add(pairs, 1).unwrap();
        bigsi.freeze().unwrap();

        let stats = bigsi.occupancy_stats().unwrap();
        assert_eq!(stats.num_bits, 4);
        assert_eq!(stats.empty_rows, 2);
        assert_eq!(stats.mean_popcount, 0.5);
    }

    // P1: after add() returns ok, idChecker contains the id and
    // colourTable[colourIterator-1] is that id.
    #[test]
    fn p1_add_then_colour_table_matches() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(8, 1, dir.path()).unwrap();
        let mut pairs = IndexMap::new();
        pairs.insert("A".to_string(), bf_with_bits(8, 1, &[0]));
        bigsi.add(pairs, 1).unwrap();
        assert_eq!(bigsi.colour_iterator(), 1);

        let mut again = IndexMap::new();
        again.insert("A".to_string(), bf_with_bits(8, 1, &[1]));
        assert!(matches!(bigsi.add(again, 1), Err(Error::DuplicateSequenceId(_))));

        bigsi.freeze().unwrap();
        assert_eq!(bigsi.lookup_colour(0).unwrap(), "A");
    }

    // P2: transposition correctness, checked against several hand-built grids.
    #[qcheck_macros::quickcheck]
    fn p2_transposition_correctness(colours: Vec<Vec<u8>>) -> bool {
        const NUM_BITS: u32 = 32;
        const NUM_HASHES: u32 = 1;

        let colours: Vec<Vec<u8>> = colours.into_iter().take(6).collect();
        if colours.is_empty() {
            return true;
        }

        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(_) => return true,
        };
        let mut bigsi = Bigsi::init(NUM_BITS, NUM_HASHES, dir.path()).unwrap();
        let mut pairs = IndexMap::new();
        let mut expected: Vec<Vec<bool>> = Vec::new();
        for (idx, bits) in colours.iter().enumerate() {
            let mut bv = BitVector::new(NUM_BITS);
            for &b in bits {
                bv.set((b as u32) % NUM_BITS, true).ok();
            }
            if bv.popcount() == 0 {
                bv.set(0, true).unwrap();
            }
            expected.push((0..NUM_BITS).map(|i| bv.get(i).unwrap()).collect());
            pairs.insert(format!("seq-{idx}"), BloomFilter::from_bitvector(bv, NUM_HASHES));
        }
        let count = pairs.len();
        if bigsi.add(pairs, count).is_err() {
            return true;
        }
        bigsi.freeze().unwrap();

        for (colour, row) in expected.iter().enumerate() {
            for (i, &bit) in row.iter().enumerate() {
                let mut result = BitVector::new(bigsi.colour_iterator());
                if bigsi.query(&[i as u64], &mut result).is_err() {
                    return false;
                }
                if result.get(colour as u32).unwrap() != bit {
                    return false;
                }
            }
        }
        true
    }

    // P4: freeze, destroy, load, assert identical query results.
    #[test]
    fn p4_persist_then_load_same_query_result() {
        let dir = tempfile::tempdir().unwrap();
        let hashes = [2u64, 9, 14];
        let expected = {
            let mut bigsi = Bigsi::init(16, 3, dir.path()).unwrap();
            let mut pairs = IndexMap::new();
            pairs.insert("A".to_string(), bf_with_bits(16, 3, &[2, 9, 14]));
            pairs.insert("B".to_string(), bf_with_bits(16, 3, &[2, 9, 1]));
            bigsi.add(pairs, 2).unwrap();
            bigsi.freeze().unwrap();
            let mut result = BitVector::new(2);
            bigsi.query(&hashes, &mut result).unwrap();
            bigsi.destroy().unwrap();
            result
        };

        let loaded = Bigsi::load(dir.path()).unwrap();
        let mut result = BitVector::new(2);
        loaded.query(&hashes, &mut result).unwrap();
        assert_eq!(result, expected);
    }

    // P5: query monotonicity -- more hash positions never match more colours.
    #[qcheck_macros::quickcheck]
    fn p5_query_monotonicity(raw_hashes: Vec<u16>) -> bool {
        const NUM_BITS: u32 = 16;
        const COLOUR_A: &[u32] = &[1, 3, 5, 7, 9, 11, 13, 15];
        const COLOUR_B: &[u32] = &[2, 3, 5, 8, 9, 13];

        let hash_values: Vec<u64> = raw_hashes.into_iter().take(6).map(|h| h as u64).collect();
        if hash_values.len() < 2 {
            return true;
        }

        let mut previous_popcount: Option<u32> = None;
        for n in 1..=hash_values.len() {
            let dir = match tempfile::tempdir() {
                Ok(d) => d,
                Err(_) => return true,
            };
            let mut bigsi = Bigsi::init(NUM_BITS, n as u32, dir.path()).unwrap();
            let mut pairs = IndexMap::new();
            pairs.insert("A".to_string(), bf_with_bits(NUM_BITS, n as u32, COLOUR_A));
            pairs.insert("B".to_string(), bf_with_bits(NUM_BITS, n as u32, COLOUR_B));
            bigsi.add(pairs, 2).unwrap();
            bigsi.freeze().unwrap();

            let mut result = BitVector::new(2);
            bigsi.query(&hash_values[..n], &mut result).unwrap();
            if let Some(prev) = previous_popcount {
                if result.popcount() > prev {
                    return false;
                }
            }
            previous_popcount = Some(result.popcount());
        }
        true
    }

    // P6: two consecutive identical queries return identical results.
    #[test]
    fn p6_repeated_query_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(16, 2, dir.path()).unwrap();
        let mut pairs = IndexMap::new();
        pairs.insert("A".to_string(), bf_with_bits(16, 2, &[3, 11]));
        pairs.insert("B".to_string(), bf_with_bits(16, 2, &[3, 7]));
        bigsi.add(pairs, 2).unwrap();
        bigsi.freeze().unwrap();

        let mut first = BitVector::new(2);
        bigsi.query(&[3, 3], &mut first).unwrap();
        let mut second = BitVector::new(2);
        bigsi.query(&[3, 3], &mut second).unwrap();
        assert_eq!(first, second);
    }

    // P7: reject duplicates, state unchanged before/after the failed call.
    #[test]
    fn p7_reject_duplicate_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(8, 1, dir.path()).unwrap();
        let mut first = IndexMap::new();
        first.insert("X".to_string(), bf_with_bits(8, 1, &[0]));
        bigsi.add(first, 1).unwrap();
        let before = bigsi.colour_iterator();

        let mut second = IndexMap::new();
        second.insert("X".to_string(), bf_with_bits(8, 1, &[4]));
        let err = bigsi.add(second, 1).unwrap_err();
        assert!(matches!(err, Error::DuplicateSequenceId(ref s) if s == "X"));
        assert_eq!(bigsi.colour_iterator(), before);
    }

    #[test]
    fn unexpected_count_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(8, 1, dir.path()).unwrap();
        let mut pairs = IndexMap::new();
        pairs.insert("A".to_string(), bf_with_bits(8, 1, &[0]));
        let err = bigsi.add(pairs, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedCount {
                expected: 2,
                actual: 1
            }
        ));
        // The one accepted colour is retained despite the rejection.
        assert_eq!(bigsi.colour_iterator(), 1);
    }

    #[test]
    fn incompatible_bloom_filter_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(8, 1, dir.path()).unwrap();
        let mut pairs = IndexMap::new();
        pairs.insert("A".to_string(), bf_with_bits(16, 1, &[0]));
        let err = bigsi.add(pairs, 1).unwrap_err();
        assert!(matches!(err, Error::IncompatibleBloomFilter { .. }));
    }

    #[test]
    fn query_before_freeze_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let bigsi = Bigsi::init(8, 1, dir.path()).unwrap();
        let mut result = BitVector::new(0);
        assert!(matches!(bigsi.query(&[0], &mut result), Err(Error::IndexUnfrozen)));
    }

    #[test]
    fn freeze_with_no_colours_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut bigsi = Bigsi::init(8, 1, dir.path()).unwrap();
        assert!(matches!(bigsi.freeze(), Err(Error::NoColours)));
    }
}
