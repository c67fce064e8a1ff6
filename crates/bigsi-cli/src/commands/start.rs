use std::path::Path;

use bigsi_config::ConfigRecord;
use bigsi_daemon::Daemon;

use super::Error;

pub fn run(config_path: &Path, foreground: bool) -> Result<(), Error> {
    let config = ConfigRecord::load(config_path)?;
    log::info!(
        "starting bigsi daemon, watching {:?}",
        config.watch_directory
    );
    Daemon::new(config).run(foreground)?;
    Ok(())
}
