use std::path::Path;

use bigsi_core::Bigsi;

use super::Error;

/// Reports row occupancy statistics for a frozen index. Read-only: this
/// never deletes rows or re-indexes anything.
pub fn run(index_dir: &Path) -> Result<(), Error> {
    let bigsi = Bigsi::load(index_dir)?;
    let stats = bigsi.occupancy_stats()?;

    let empty_fraction = stats.empty_rows as f64 / stats.num_bits as f64;
    println!("rows            {}", stats.num_bits);
    println!(
        "empty rows      {} ({:.2}%)",
        stats.empty_rows,
        empty_fraction * 100.0
    );
    println!("mean popcount   {:.4}", stats.mean_popcount);

    if empty_fraction > 0.5 {
        log::warn!(
            "{:.0}% of rows are empty; consider a larger numBits on the next build",
            empty_fraction * 100.0
        );
    }
    Ok(())
}
