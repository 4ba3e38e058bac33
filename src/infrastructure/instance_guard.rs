use std::{
    env,
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    process, thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, System};

const LOCK_FILENAME: &str = ".link-guard.lock";
const WAIT_INTERVAL: Duration = Duration::from_millis(500);
const MAX_WAIT: Duration = Duration::from_secs(20);

/// Exclusive ownership of the data directory.
///
/// The submission store has no protocol for concurrent writers, so only one
/// process may host the pipeline for a given data directory.
#[derive(Debug)]
pub struct InstanceGuard {
    file: Option<File>,
    path: PathBuf,
}

impl InstanceGuard {
    pub fn acquire(data_dir: &Path) -> Result<Self> {
        let lock_path = data_dir.join(LOCK_FILENAME);
        if skip_guard() {
            tracing::warn!(
                target: "lifecycle",
                "data directory lock skipped because SKIP_PROCESS_GUARD=1"
            );
            return Ok(Self {
                file: None,
                path: lock_path,
            });
        }

        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to ensure data dir {}", data_dir.display()))?;

        let start = Instant::now();
        loop {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&lock_path)
                .with_context(|| format!("failed to open lock file {}", lock_path.display()))?;

            match file.try_lock_exclusive() {
                Ok(()) => {
                    write_lock_info(&mut file, process::id())?;
                    tracing::info!(
                        target: "lifecycle",
                        pid = process::id(),
                        path = %lock_path.display(),
                        "acquired data directory lock"
                    );
                    return Ok(Self {
                        file: Some(file),
                        path: lock_path,
                    });
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    check_existing_owner(&lock_path)?;
                }
                Err(err) => return Err(err.into()),
            }

            if start.elapsed() > MAX_WAIT {
                return Err(anyhow!(
                    "data directory lock {} still held after {:?}",
                    lock_path.display(),
                    MAX_WAIT
                ));
            }

            drop(file);
            thread::sleep(WAIT_INTERVAL);
        }
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        let _ = file.unlock();
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != ErrorKind::NotFound {
                tracing::warn!(
                    target: "lifecycle",
                    path = %self.path.display(),
                    error = %err,
                    "failed to remove lock file on shutdown"
                );
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    started_at: i64,
}

fn write_lock_info(file: &mut File, pid: u32) -> Result<()> {
    let info = LockInfo {
        pid,
        started_at: Utc::now().timestamp_millis(),
    };
    let payload = serde_json::to_vec(&info)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&payload)?;
    file.sync_all()?;
    Ok(())
}

/// Fails if a live process owns the lock; clears a stale file otherwise.
fn check_existing_owner(lock_path: &Path) -> Result<()> {
    match read_lock_info(lock_path)? {
        Some(info) if info.pid == process::id() => Err(anyhow!(
            "data directory is already locked by this process (pid {})",
            info.pid
        )),
        Some(info) if is_process_alive(info.pid) => Err(anyhow!(
            "another link-guard instance (pid {}) owns {}",
            info.pid,
            lock_path.display()
        )),
        Some(info) => {
            tracing::warn!(
                target: "lifecycle",
                pid = info.pid,
                "removing stale lock left by a dead process"
            );
            let _ = fs::remove_file(lock_path);
            Ok(())
        }
        // Owner is still writing its metadata; retry.
        None => Ok(()),
    }
}

fn read_lock_info(lock_path: &Path) -> Result<Option<LockInfo>> {
    match fs::read_to_string(lock_path) {
        Ok(contents) => {
            if contents.trim().is_empty() {
                return Ok(None);
            }
            match serde_json::from_str(&contents) {
                Ok(info) => Ok(Some(info)),
                Err(err) => {
                    tracing::warn!(
                        target: "lifecycle",
                        path = %lock_path.display(),
                        error = %err,
                        "failed to parse lock file metadata"
                    );
                    Ok(None)
                }
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn is_process_alive(pid: u32) -> bool {
    let sys_pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_process(sys_pid);
    system.process(sys_pid).is_some()
}

fn skip_guard() -> bool {
    matches!(
        env::var("SKIP_PROCESS_GUARD")
            .ok()
            .map(|v| v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true")),
        Some(true)
    )
}
