use std::io::{ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use super::errors::{classify_io_error, ProbeError};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Grace period for the stdout reader once the child has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
}

impl CommandOutput {
    /// Fail with a transient error unless the command exited with status 0.
    pub fn require_success(self, program: &str) -> Result<Self, ProbeError> {
        if self.status.success() {
            return Ok(self);
        }
        let detail = match self.status.code() {
            Some(code) => format!("exit code {code}"),
            None => "termination by signal".to_string(),
        };
        Err(ProbeError::Transient(format!("{program} failed with {detail}")))
    }
}

/// Run `program` with `args`, killing it if it has not exited within `timeout`.
pub fn run_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<CommandOutput, ProbeError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => ProbeError::Unavailable(format!("{program} command not found")),
            _ => classify_io_error(&format!("spawn {program}"), &e),
        })?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| ProbeError::Transient(format!("{program} stdout not captured")))?;
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("port-finder-probe-io".into())
        .spawn(move || {
            let mut buf = Vec::new();
            let res = stdout.read_to_end(&mut buf).map(|_| buf);
            let _ = tx.send(res);
        })
        .map_err(|e| classify_io_error("spawn reader thread", &e))?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                reap(&mut child);
                return Err(ProbeError::Transient(format!(
                    "{program} timed out after {}ms",
                    timeout.as_millis()
                )));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                reap(&mut child);
                return Err(classify_io_error(&format!("wait {program}"), &e));
            }
        }
    };

    let drain = deadline
        .saturating_duration_since(Instant::now())
        .max(DRAIN_GRACE);
    let bytes = match rx.recv_timeout(drain) {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => return Err(classify_io_error(&format!("read {program} output"), &e)),
        Err(_) => {
            return Err(ProbeError::Transient(format!(
                "{program} output still open after exit"
            )))
        }
    };

    Ok(CommandOutput {
        status,
        stdout: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

// Kill errors only mean the child already exited; wait() collects it either way.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
