//! Double-fork/setsid daemonization, redirecting standard streams via
//! explicit `dup2` calls against freshly opened target files rather than
//! reassigning the standard-stream globals (which is not portable and can
//! corrupt them on some runtimes).

use std::fs::OpenOptions;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("fork failed: {0}")]
    Fork(std::io::Error),
    #[error("setsid failed: {0}")]
    Setsid(std::io::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Forks twice (so the daemon can never reacquire a controlling terminal),
/// detaches from the session, changes to `working_directory`, and redirects
/// fds 0/1/2 to `/dev/null`, `stdout_log`, and `stderr_log` respectively.
///
/// Returns in the final (grandchild) process only; the original process and
/// the intermediate child both exit(0) inside this call.
pub fn daemonize(
    working_directory: &Path,
    stdout_log: &Path,
    stderr_log: &Path,
) -> Result<(), Error> {
    fork_and_exit_parent()?;

    if unsafe { libc::setsid() } == -1 {
        return Err(Error::Setsid(std::io::Error::last_os_error()));
    }

    fork_and_exit_parent()?;

    std::env::set_current_dir(working_directory)?;
    redirect_standard_streams(stdout_log, stderr_log)?;

    Ok(())
}

fn fork_and_exit_parent() -> Result<(), Error> {
    match unsafe { libc::fork() } {
        -1 => Err(Error::Fork(std::io::Error::last_os_error())),
        0 => Ok(()),
        _child_pid => std::process::exit(0),
    }
}

fn redirect_standard_streams(stdout_log: &Path, stderr_log: &Path) -> Result<(), Error> {
    let devnull = OpenOptions::new().read(true).write(true).open("/dev/null")?;
    let out = OpenOptions::new().create(true).append(true).open(stdout_log)?;
    let err = OpenOptions::new().create(true).append(true).open(stderr_log)?;

    dup2_or_err(devnull.as_raw_fd(), libc::STDIN_FILENO)?;
    dup2_or_err(out.as_raw_fd(), libc::STDOUT_FILENO)?;
    dup2_or_err(err.as_raw_fd(), libc::STDERR_FILENO)?;

    Ok(())
}

fn dup2_or_err(src: i32, dst: i32) -> Result<(), Error> {
    if unsafe { libc::dup2(src, dst) } == -1 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }
    Ok(())
}
