use std::path::Path;
use std::time::{Duration, Instant};

use bigsi_config::ConfigRecord;

use super::Error;

pub fn run(config_path: &Path, timeout_secs: u64) -> Result<(), Error> {
    let config = ConfigRecord::load(config_path)?;
    let pid = config.pid.ok_or_else(|| Error::NoPid(config_path.to_path_buf()))?;

    if !config.running {
        log::info!("bigsi daemon at pid {pid} is already stopped");
        return Ok(());
    }

    if unsafe { libc::kill(pid as i32, libc::SIGTERM) } != 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }
    log::info!("sent SIGTERM to pid {pid}, waiting for shutdown");

    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    while Instant::now() < deadline {
        let current = ConfigRecord::load(config_path)?;
        if !current.running {
            log::info!("bigsi daemon at pid {pid} stopped");
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    Err(Error::StopTimedOut(pid))
}
