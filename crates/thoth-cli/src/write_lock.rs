//! Cross-process guard for index writers.
//!
//! `GraphIndex` serializes writers inside one process; this lock file extends
//! that to concurrent `thoth` invocations on the same project.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_FILE: &str = "index.write.lock";
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Removes the lock file on drop.
#[derive(Debug)]
pub struct WriteLockGuard {
    path: PathBuf,
}

impl Drop for WriteLockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LockState {
    HeldBy(u32),
    Stale,
    Unreadable,
}

/// Take the project's writer lock, waiting up to `timeout` for a live holder.
///
/// A lock left behind by a dead process is removed and retaken.
pub async fn acquire(project_root: &Path, timeout: Duration) -> anyhow::Result<WriteLockGuard> {
    let lock_path = project_root.join(".thoth").join(LOCK_FILE);
    let started = Instant::now();

    loop {
        match try_acquire(&lock_path) {
            Ok(guard) => return Ok(guard),
            Err(LockState::Stale) => {
                tracing::warn!(path = %lock_path.display(), "removing stale write lock");
                let _ = std::fs::remove_file(&lock_path);
                continue;
            }
            Err(state) if started.elapsed() >= timeout => {
                return Err(match state {
                    LockState::HeldBy(pid) => anyhow::anyhow!(
                        "another thoth writer is running (pid {pid}); try again after it finishes"
                    ),
                    _ => anyhow::anyhow!(
                        "could not acquire write lock at {}; remove it if no thoth process is running",
                        lock_path.display()
                    ),
                });
            }
            Err(_) => tokio::time::sleep(LOCK_RETRY_DELAY).await,
        }
    }
}

fn try_acquire(lock_path: &Path) -> Result<WriteLockGuard, LockState> {
    if let Some(parent) = lock_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(lock_path)
    {
        Ok(mut file) => {
            let _ = writeln!(file, "{}", std::process::id());
            Ok(WriteLockGuard {
                path: lock_path.to_path_buf(),
            })
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            let mut contents = String::new();
            if OpenOptions::new()
                .read(true)
                .open(lock_path)
                .and_then(|mut file| file.read_to_string(&mut contents))
                .is_err()
            {
                return Err(LockState::Unreadable);
            }
            match contents.trim().parse::<u32>() {
                Ok(pid) if is_process_running(pid) => Err(LockState::HeldBy(pid)),
                Ok(_) => Err(LockState::Stale),
                Err(_) => Err(LockState::Unreadable),
            }
        }
        Err(_) => Err(LockState::Unreadable),
    }
}

fn is_process_running(pid: u32) -> bool {
    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .status()
        .is_ok_and(|status| status.success())
}
