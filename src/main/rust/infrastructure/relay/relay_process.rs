use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::domain::errors::RelayError;
use crate::domain::ports::RelayHandle;

/// How much relay output is kept for diagnostics
const OUTPUT_TAIL_BYTES: usize = 16 * 1024;

/// Upper bound for collecting output after an early exit
const OUTPUT_COLLECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Program and arguments of a relay
#[derive(Debug, Clone, PartialEq)]
pub struct RelayCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl RelayCommand {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl fmt::Display for RelayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Rolling buffer of the last bytes written by the relay
#[derive(Debug, Default)]
struct OutputTail {
    bytes: Vec<u8>,
}

impl OutputTail {
    fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
        if self.bytes.len() > OUTPUT_TAIL_BYTES {
            let excess = self.bytes.len() - OUTPUT_TAIL_BYTES;
            self.bytes.drain(..excess);
        }
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).trim().to_string()
    }
}

/// One relay subprocess.
///
/// stdout and stderr are drained continuously so the child never blocks on
/// a full pipe. The child is killed if the handle is dropped without `stop`.
pub struct RelayProcess {
    child: Child,
    port: u16,
    stop_timeout: Duration,
    output: Arc<Mutex<OutputTail>>,
    drains: Vec<JoinHandle<()>>,
}

impl RelayProcess {
    /// Launch the command, then wait up to `startup_grace` for it to die.
    /// A process still alive after the grace period is considered started.
    pub async fn spawn(
        command: RelayCommand,
        port: u16,
        startup_grace: Duration,
        stop_timeout: Duration,
    ) -> Result<Self, RelayError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RelayError::SpawnFailed(format!("{}: {}", command.program.display(), e)))?;

        let output = Arc::new(Mutex::new(OutputTail::default()));
        let mut drains = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            drains.push(tokio::spawn(drain(stdout, output.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            drains.push(tokio::spawn(drain(stderr, output.clone())));
        }

        let mut process = Self {
            child,
            port,
            stop_timeout,
            output,
            drains,
        };

        tracing::debug!(pid = ?process.pid(), port, "Relay spawned, waiting for startup grace");

        match timeout(startup_grace, process.child.wait()).await {
            Err(_) => {
                tracing::info!(pid = ?process.pid(), port, "Relay running");
                Ok(process)
            }
            Ok(Ok(status)) => {
                let output = process.collect_output().await;
                tracing::error!(port, %status, output = %output, "Relay exited during startup");
                Err(RelayError::ExitedEarly {
                    status: status.to_string(),
                    output,
                })
            }
            Ok(Err(e)) => {
                let _ = process.child.kill().await;
                Err(RelayError::SpawnFailed(format!("failed to poll relay: {}", e)))
            }
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Snapshot of the most recent output
    pub fn output(&self) -> String {
        self.output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .text()
    }

    /// SIGTERM, wait up to the stop timeout, then SIGKILL. The child is always reaped.
    pub async fn stop(&mut self) -> Result<(), RelayError> {
        if let Ok(Some(status)) = self.child.try_wait() {
            tracing::debug!(port = self.port, %status, "Relay already exited");
            return Ok(());
        }

        self.request_termination();

        match timeout(self.stop_timeout, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(port = self.port, %status, "Relay stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(RelayError::StopFailed(e.to_string())),
            Err(_) => {
                tracing::warn!(
                    port = self.port,
                    timeout_ms = self.stop_timeout.as_millis() as u64,
                    "Relay ignored termination, killing"
                );
                self.child
                    .kill()
                    .await
                    .map_err(|e| RelayError::StopFailed(e.to_string()))
            }
        }
    }

    #[cfg(unix)]
    fn request_termination(&mut self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.child.id() else {
            return;
        };
        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            tracing::warn!(pid, "SIGTERM failed ({}), killing instead", e);
            let _ = self.child.start_kill();
        }
    }

    #[cfg(not(unix))]
    fn request_termination(&mut self) {
        let _ = self.child.start_kill();
    }

    async fn collect_output(&mut self) -> String {
        for drain in self.drains.drain(..) {
            let _ = timeout(OUTPUT_COLLECT_TIMEOUT, drain).await;
        }
        self.output()
    }
}

impl Drop for RelayProcess {
    fn drop(&mut self) {
        for drain in &self.drains {
            drain.abort();
        }
    }
}

#[async_trait]
impl RelayHandle for RelayProcess {
    fn pid(&self) -> Option<u32> {
        RelayProcess::pid(self)
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn is_alive(&mut self) -> bool {
        RelayProcess::is_alive(self)
    }

    async fn stop(&mut self) -> Result<(), RelayError> {
        RelayProcess::stop(self).await
    }
}

async fn drain<R>(mut reader: R, output: Arc<Mutex<OutputTail>>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => output
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(&buf[..n]),
        }
    }
}
