//! A Bloom filter over a fixed-capacity [`bigsi_bitvec::BitVector`], plus the
//! k-mer sketching routine used by the `sketch` CLI subcommand to turn a
//! sequence file into one.
//!
//! `bigsi-core` treats [`BloomFilter`] as an external collaborator: it only
//! ever reads `num_hashes()`, `bits()` and `popcount()` off of it (see
//! `bigsi-core`'s `add`). The hashing and sketching in this crate is not on
//! BIGSI's critical path.

pub mod kmer;
pub mod sketch;

use thiserror::Error;

use bigsi_bitvec::BitVector;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    BitVector(#[from] bigsi_bitvec::Error),
    #[error("i/o error reading sequence file: {0}")]
    Io(#[from] std::io::Error),
}

/// The `i`-th (of some `num_hashes`) seeded hash position for `key`, modulo
/// `num_bits`. Exposed standalone so callers that only have a raw key (e.g.
/// a query k-mer) can compute the same positions a [`BloomFilter`] would,
/// without needing a filter instance.
pub fn hash_position(key: &[u8], i: u32, num_bits: u32) -> u32 {
    let h = xxhash_rust::xxh3::xxh3_64_with_seed(key, i as u64);
    (h % num_bits as u64) as u32
}

/// A Bloom filter: `num_hashes` seeded XXH3 hashes over a packed bit vector.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    num_hashes: u32,
    bits: BitVector,
}

impl BloomFilter {
    /// Creates an empty filter with `num_bits` bits and `num_hashes` hash
    /// functions.
    pub fn new(num_bits: u32, num_hashes: u32) -> Self {
        Self {
            num_hashes,
            bits: BitVector::new(num_bits),
        }
    }

    /// Wraps an existing bit vector as a filter, without copying it.
    pub fn from_bitvector(bits: BitVector, num_hashes: u32) -> Self {
        Self { num_hashes, bits }
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    pub fn bits(&self) -> &BitVector {
        &self.bits
    }

    pub fn into_bits(self) -> BitVector {
        self.bits
    }

    pub fn capacity(&self) -> u32 {
        self.bits.capacity()
    }

    pub fn popcount(&self) -> u32 {
        self.bits.popcount()
    }

    /// The `i`-th (of `num_hashes`) bit position for `key`, modulo capacity.
    fn hash_position(&self, key: &[u8], i: u32) -> u32 {
        hash_position(key, i, self.capacity())
    }

    /// Sets all `num_hashes` bit positions for `key`.
    pub fn insert(&mut self, key: &[u8]) -> Result<(), Error> {
        for i in 0..self.num_hashes {
            let pos = self.hash_position(key, i);
            self.bits.set(pos, true)?;
        }
        Ok(())
    }

    /// True iff every one of `num_hashes` hash positions for `key` is set.
    pub fn may_contain(&self, key: &[u8]) -> Result<bool, Error> {
        for i in 0..self.num_hashes {
            let pos = self.hash_position(key, i);
            if !self.bits.get(pos)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_contains() {
        let mut bf = BloomFilter::new(512, 4);
        bf.insert(b"ATGT").unwrap();
        assert!(bf.may_contain(b"ATGT").unwrap());
    }

    #[test]
    fn absent_key_usually_rejected() {
        let mut bf = BloomFilter::new(4096, 4);
        bf.insert(b"ATGT").unwrap();
        // Not a guarantee (false positives are allowed), but with this
        // capacity/hash-count it is true for this fixed input.
        assert!(!bf.may_contain(b"CCCCCCCCCCCC").unwrap());
    }
}
