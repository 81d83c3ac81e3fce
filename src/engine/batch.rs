//! External engine run as a batch process.

use std::fs::{self, File};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::{Builder, TempDir};
use tracing::{debug, info, warn};

use super::{CancelToken, SimulationEngine};
use crate::config::EngineConfig;
use crate::error::{NetdeckError, Result};

/// Deck file name inside the working directory.
const DECK_FILE: &str = "deck.cir";

/// Combined stdout/stderr capture inside the working directory.
const LOG_FILE: &str = "engine.log";

/// Default interval between exit checks.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Invokes `<executable> <args…> <deck path>` in a fresh temporary directory.
///
/// stdout and stderr go to one file in that directory, so a chatty engine can
/// never block on a full pipe. The directory is removed when `run` returns,
/// whatever the outcome.
#[derive(Debug, Clone)]
pub struct BatchEngine {
    config: EngineConfig,
    poll_interval: Duration,
}

impl BatchEngine {
    /// Create an engine from its configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set how often the child is checked for exit, timeout and cancellation.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn spawn(&self, workdir: &Path, deck_path: &Path, log: File) -> Result<Child> {
        let stderr = log.try_clone()?;
        Command::new(&self.config.executable)
            .args(&self.config.args)
            .arg(deck_path)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| NetdeckError::EngineNotFound {
                executable: self.config.executable.clone(),
                message: e.to_string(),
            })
    }

    /// Wait for exit, killing the child on timeout or cancellation.
    fn wait(&self, child: &mut Child, cancel: &CancelToken) -> Result<ExitStatus> {
        let timeout = self.config.timeout();
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {}
                Err(e) => {
                    reap(child);
                    return Err(e.into());
                }
            }

            if cancel.is_cancelled() {
                warn!("engine run cancelled");
                reap(child);
                return Err(NetdeckError::Cancelled);
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                warn!(seconds = timeout.as_secs_f64(), "engine timed out");
                reap(child);
                return Err(NetdeckError::EngineTimeout {
                    seconds: timeout.as_secs_f64(),
                });
            }
            thread::sleep(self.poll_interval.min(timeout - elapsed));
        }
    }
}

impl Default for BatchEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SimulationEngine for BatchEngine {
    fn run(&self, deck: &str, cancel: &CancelToken) -> Result<String> {
        let workdir: TempDir = Builder::new().prefix("netdeck-").tempdir()?;
        let deck_path = workdir.path().join(DECK_FILE);
        let log_path = workdir.path().join(LOG_FILE);
        fs::write(&deck_path, deck)?;

        let mut child = self.spawn(workdir.path(), &deck_path, File::create(&log_path)?)?;
        info!(
            executable = %self.config.executable,
            pid = child.id(),
            "engine started"
        );

        let status = self.wait(&mut child, cancel)?;
        let output = String::from_utf8_lossy(&fs::read(&log_path)?).into_owned();
        debug!(%status, bytes = output.len(), "engine exited");

        if !status.success() {
            return Err(NetdeckError::engine_failed(status.to_string(), output));
        }
        Ok(output)
    }
}

/// Kill and collect the child; it may already have exited.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "kill failed");
    }
    if let Err(e) = child.wait() {
        debug!(error = %e, "wait after kill failed");
    }
}
