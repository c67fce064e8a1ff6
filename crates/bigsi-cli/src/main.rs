//! `bigsi`: start/stop the watch daemon, inspect its configuration, build
//! offline sketches, and report index occupancy statistics.

mod commands;
mod logger;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::Level;

/// `~/.bigsi/config.json`, matching this corpus's own `~/.<name>` home
/// directory convention when no `--config` is given.
fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".bigsi")
        .join("config.json")
}

#[derive(Parser)]
#[command(name = "bigsi", version, about = "BIGSI index daemon and tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (overrides RUST_LOG and the config file's own setting).
    #[arg(long, global = true)]
    log_level: Option<Level>,
}

#[derive(Subcommand)]
enum Command {
    /// Detach and begin watching the configured directory.
    #[cfg(unix)]
    Start {
        /// Config file to use.
        #[arg(long, default_value_os_t = default_config_path())]
        config: PathBuf,

        /// Stay attached to the terminal instead of daemonizing.
        #[arg(long)]
        foreground: bool,
    },

    /// Signal a running daemon to stop and wait for it to exit.
    #[cfg(unix)]
    Stop {
        #[arg(long, default_value_os_t = default_config_path())]
        config: PathBuf,

        /// Seconds to wait for the running flag to clear.
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },

    /// Print the daemon's configuration record.
    Info {
        #[arg(long, default_value_os_t = default_config_path())]
        config: PathBuf,

        /// Print as JSON instead of a human-readable summary.
        #[arg(long)]
        json: bool,
    },

    /// Sketch every file in a directory and freeze them into a new index.
    Build {
        /// Directory of sequence files to index, read non-recursively.
        input: PathBuf,

        /// Directory the frozen index is written to.
        #[arg(long, default_value = "index")]
        index: PathBuf,

        /// K-mer size.
        #[arg(long, default_value_t = bigsi_config::DEFAULT_KMER_SIZE)]
        ksize: u8,

        /// Expected number of distinct k-mers per file, used to size each filter.
        #[arg(long, default_value_t = bigsi_config::DEFAULT_SKETCH_SIZE)]
        sketch_size: usize,

        /// Target false-positive rate.
        #[arg(long, default_value_t = bigsi_config::DEFAULT_BLOOM_FP_RATE)]
        fp_rate: f64,
    },

    /// Build a Bloom filter sketch of one sequence file.
    Sketch {
        /// K-mer size.
        #[arg(long, default_value_t = bigsi_config::DEFAULT_KMER_SIZE)]
        ksize: u8,

        /// Expected number of distinct k-mers, used to size the filter.
        #[arg(long, default_value_t = bigsi_config::DEFAULT_SKETCH_SIZE)]
        sketch_size: usize,

        /// Target false-positive rate.
        #[arg(long, default_value_t = bigsi_config::DEFAULT_BLOOM_FP_RATE)]
        fp_rate: f64,

        /// Where to write the packed bit vector (stdout summary only if omitted).
        #[arg(long)]
        out: Option<PathBuf>,

        file: PathBuf,
    },

    /// Report row occupancy statistics for a frozen index, without mutating it.
    Shrink {
        #[arg(long, default_value = "index")]
        index: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = cli
        .log_level
        .or_else(logger::env_level)
        .unwrap_or(Level::Info);
    logger::Logger::init(level);

    let result = match cli.command {
        #[cfg(unix)]
        Command::Start { config, foreground } => commands::start::run(&config, foreground),
        #[cfg(unix)]
        Command::Stop { config, timeout } => commands::stop::run(&config, timeout),
        Command::Info { config, json } => commands::info::run(&config, json),
        Command::Build {
            input,
            index,
            ksize,
            sketch_size,
            fp_rate,
        } => commands::build::run(&input, &index, ksize, sketch_size, fp_rate),
        Command::Sketch {
            ksize,
            sketch_size,
            fp_rate,
            out,
            file,
        } => commands::sketch::run(ksize, sketch_size, fp_rate, out.as_deref(), &file),
        Command::Shrink { index } => commands::shrink::run(&index),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bigsi: {err}");
            ExitCode::FAILURE
        }
    }
}
