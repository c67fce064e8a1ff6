use std::path::Path;

use bigsi_bloom::sketch::{sketch_file, SketchParams};

use super::Error;

pub fn run(
    ksize: u8,
    sketch_size: usize,
    fp_rate: f64,
    out: Option<&Path>,
    file: &Path,
) -> Result<(), Error> {
    let params = SketchParams::for_expected_elements(ksize, sketch_size, fp_rate);
    log::info!(
        "sketching {:?} with {} bits / {} hashes",
        file,
        params.num_bits,
        params.num_hashes
    );

    let filter = sketch_file(file, &params)?;
    println!(
        "bits={} hashes={} popcount={} fill={:.4}",
        filter.capacity(),
        filter.num_hashes(),
        filter.popcount(),
        filter.popcount() as f64 / filter.capacity() as f64
    );

    if let Some(out) = out {
        std::fs::write(out, filter.bits().to_bytes())?;
        log::info!("wrote sketch to {out:?}");
    }
    Ok(())
}
