//! Runtime-mode ingestion: a worker hands this a freshly-seen file, it
//! sketches every k-mer and queries the already-frozen index, aggregating
//! the colours any k-mer matched.
//!
//! Building a BIGSI from scratch is an offline, single-threaded concern (see
//! `bigsi_core::Bigsi::add`'s own non-interleaving requirement); this module
//! only ever queries, which the persistence layer allows concurrently. The
//! `Bigsi` handle is still behind a mutex so a single daemon process can
//! share one `Ingest` across every worker thread without requiring `Bigsi`
//! itself to be `Sync`.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;

use bigsi_bitvec::BitVector;
use bigsi_bloom::sketch::read_sequence_file;
use bigsi_config::ConfigRecord;
use bigsi_core::Bigsi;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] bigsi_core::Error),
    #[error("i/o error reading {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of sketching and querying a single file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub kmers_processed: usize,
    /// Sequence IDs that matched at least one k-mer in the file.
    pub matched_sequence_ids: Vec<String>,
}

/// Shared context a worker uses to turn a file into query results.
pub struct Ingest {
    bigsi: Mutex<Bigsi>,
    ksize: u8,
}

impl Ingest {
    /// Loads the frozen index named by `config.index_directory`.
    pub fn open(config: &ConfigRecord) -> Result<Self, Error> {
        let bigsi = Bigsi::load(&config.index_directory)?;
        Ok(Self {
            bigsi: Mutex::new(bigsi),
            ksize: config.kmer_size,
        })
    }

    /// Sketches every k-mer in `path` and queries it against the index,
    /// returning the union of colours any k-mer matched.
    pub fn ingest_file(&self, path: &Path) -> Result<IngestOutcome, Error> {
        let sequence = read_sequence_file(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source: match source {
                bigsi_bloom::Error::Io(io) => io,
                other => std::io::Error::other(other.to_string()),
            },
        })?;

        let bigsi = self.bigsi.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let num_bits = bigsi.num_bits();
        let num_hashes = bigsi.num_hashes();
        let colour_iterator = bigsi.colour_iterator();

        let mut matched = BTreeSet::new();
        let mut kmers_processed = 0usize;

        for kmer in sequence.windows(self.ksize as usize) {
            kmers_processed += 1;
            let hash_values: Vec<u64> = (0..num_hashes)
                .map(|i| bigsi_bloom::hash_position(kmer, i, num_bits) as u64)
                .collect();

            let mut result = BitVector::new(colour_iterator);
            bigsi.query(&hash_values, &mut result)?;
            for colour in 0..colour_iterator {
                if result.get(colour).unwrap_or(false) {
                    matched.insert(colour);
                }
            }
        }

        let mut matched_sequence_ids = Vec::with_capacity(matched.len());
        for colour in matched {
            matched_sequence_ids.push(bigsi.lookup_colour(colour)?);
        }

        Ok(IngestOutcome {
            kmers_processed,
            matched_sequence_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use bigsi_bloom::BloomFilter;
    use indexmap::IndexMap;

    #[test]
    fn ingest_matches_seeded_colour() {
        let dir = tempfile::tempdir().unwrap();
        let index_dir = dir.path().join("index");

        let mut bigsi = Bigsi::init(4096, 2, &index_dir).unwrap();
        let mut pairs = IndexMap::new();
        let mut bf = BloomFilter::new(4096, 2);
        for kmer in b"ATGTCATGTC".windows(3) {
            bf.insert(kmer).unwrap();
        }
        pairs.insert("A".to_string(), bf);
        bigsi.add(pairs, 1).unwrap();
        bigsi.freeze().unwrap();
        bigsi.destroy().unwrap();

        let mut config = ConfigRecord::new(
            dir.path().join("bigsi.json"),
            dir.path().join("watch"),
            dir.path().to_path_buf(),
            &index_dir,
        );
        config.kmer_size = 3;
        let ingest = Ingest::open(&config).unwrap();

        let seq_path = dir.path().join("query.fa");
        std::fs::write(&seq_path, ">q\nATGTCATGTC\n").unwrap();

        let outcome = ingest.ingest_file(&seq_path).unwrap();
        assert_eq!(outcome.kmers_processed, 8);
        assert_eq!(outcome.matched_sequence_ids, vec!["A".to_string()]);
    }
}
