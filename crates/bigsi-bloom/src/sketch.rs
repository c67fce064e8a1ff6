//! Builds a [`BloomFilter`] sketch from a single sequence file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::kmer::kmers;
use crate::{BloomFilter, Error};

/// Parameters shared by the `sketch` CLI subcommand and [`bigsi-config`]'s
/// `ConfigRecord`.
#[derive(Clone, Copy, Debug)]
pub struct SketchParams {
    pub ksize: u8,
    pub num_bits: u32,
    pub num_hashes: u32,
}

impl SketchParams {
    /// Derives `num_bits`/`num_hashes` from an expected element count and a
    /// target false positive rate, using the standard Bloom filter sizing
    /// formulas.
    pub fn for_expected_elements(ksize: u8, expected_elements: usize, fp_rate: f64) -> Self {
        let num_bits = optimal_bits(expected_elements, fp_rate);
        let num_hashes = optimal_hashes(num_bits, expected_elements);
        Self {
            ksize,
            num_bits,
            num_hashes,
        }
    }
}

/// `m = ceil(-n * ln(p) / ln(2)^2)`.
pub fn optimal_bits(expected_elements: usize, fp_rate: f64) -> u32 {
    if expected_elements == 0 {
        return 8;
    }
    let n = expected_elements as f64;
    let m = -(n * fp_rate.ln()) / std::f64::consts::LN_2.powi(2);
    m.ceil().max(8.0) as u32
}

/// `k = round((m / n) * ln(2))`, clamped to at least 1.
pub fn optimal_hashes(num_bits: u32, expected_elements: usize) -> u32 {
    if expected_elements == 0 {
        return 1;
    }
    let k = (num_bits as f64 / expected_elements as f64) * std::f64::consts::LN_2;
    k.round().max(1.0) as u32
}

/// Reads a FASTA-like sequence file: lines starting with `>` are headers and
/// are skipped, everything else is concatenated (whitespace stripped) into
/// one contiguous byte buffer.
pub fn read_sequence_file(path: impl AsRef<Path>) -> Result<Vec<u8>, Error> {
    let reader = BufReader::new(File::open(path)?);
    let mut sequence = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('>') {
            continue;
        }
        sequence.extend(
            line.bytes()
                .filter(|b| !b.is_ascii_whitespace())
                .map(|b| b.to_ascii_uppercase()),
        );
    }
    Ok(sequence)
}

/// Builds a Bloom filter sketch of every k-mer in `sequence`.
pub fn sketch_sequence(sequence: &[u8], params: &SketchParams) -> Result<BloomFilter, Error> {
    let mut filter = BloomFilter::new(params.num_bits, params.num_hashes);
    for kmer in kmers(sequence, params.ksize as usize) {
        filter.insert(kmer)?;
    }
    Ok(filter)
}

/// Reads `path` and sketches it in one step.
pub fn sketch_file(path: impl AsRef<Path>, params: &SketchParams) -> Result<BloomFilter, Error> {
    let sequence = read_sequence_file(path)?;
    sketch_sequence(&sequence, params)
}
