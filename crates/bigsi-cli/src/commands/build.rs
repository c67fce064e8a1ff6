use std::path::Path;

use indexmap::IndexMap;

use bigsi_bloom::sketch::{sketch_file, SketchParams};
use bigsi_core::Bigsi;

use super::Error;

/// Sketches every file directly under `input_dir`, builds a fresh BIGSI at
/// `index_dir` from the results, and freezes it. `input_dir` is read
/// non-recursively; entries are sketched in sorted filename order so a
/// rerun against an unchanged directory assigns colours identically.
pub fn run(
    input_dir: &Path,
    index_dir: &Path,
    ksize: u8,
    sketch_size: usize,
    fp_rate: f64,
) -> Result<(), Error> {
    let mut paths: Vec<_> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(Error::EmptyInputDirectory(input_dir.to_path_buf()));
    }

    let params = SketchParams::for_expected_elements(ksize, sketch_size, fp_rate);
    log::info!(
        "sketching {} file(s) from {:?} with {} bits / {} hashes",
        paths.len(),
        input_dir,
        params.num_bits,
        params.num_hashes
    );

    let mut pairs = IndexMap::new();
    for path in &paths {
        let sequence_id = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let filter = sketch_file(path, &params)?;
        log::debug!("sketched {:?}: popcount={}", path, filter.popcount());
        pairs.insert(sequence_id, filter);
    }
    let expected_count = pairs.len();

    let mut bigsi = Bigsi::init(params.num_bits, params.num_hashes, index_dir)?;
    bigsi.add(pairs, expected_count)?;
    bigsi.freeze()?;
    let colours = bigsi.colour_iterator();
    bigsi.destroy()?;

    println!(
        "built index at {:?}: {} colours, {} bits, {} hashes",
        index_dir, colours, params.num_bits, params.num_hashes
    );
    Ok(())
}
