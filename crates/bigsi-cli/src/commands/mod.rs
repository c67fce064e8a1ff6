#[cfg(unix)]
pub mod start;
#[cfg(unix)]
pub mod stop;

pub mod build;
pub mod info;
pub mod shrink;
pub mod sketch;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] bigsi_config::Error),
    #[error(transparent)]
    Core(#[from] bigsi_core::Error),
    #[error(transparent)]
    Bloom(#[from] bigsi_bloom::Error),
    #[cfg(unix)]
    #[error(transparent)]
    Daemon(#[from] bigsi_daemon::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("daemon at pid {0} did not stop within the timeout")]
    StopTimedOut(u32),
    #[error("config at {0:?} has no recorded pid")]
    NoPid(std::path::PathBuf),
    #[error("{0:?} contains no files to sketch")]
    EmptyInputDirectory(std::path::PathBuf),
}
