//! The `metadata.json` sidecar: everything needed to reopen a frozen BIGSI
//! without recomputing its sizing parameters.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, METADATA_FILENAME};

/// Mirrors spec's `ConfigRecord` persistence fields that are intrinsic to a
/// particular BIGSI (as opposed to daemon runtime configuration).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub row_store_filename: String,
    pub colour_store_filename: String,
    pub num_bits: u32,
    pub num_hashes: u32,
    pub colour_iterator: u32,
}

impl Metadata {
    pub fn write(&self, dir: &Path) -> Result<(), Error> {
        let path = dir.join(METADATA_FILENAME);
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn read(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(METADATA_FILENAME);
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
