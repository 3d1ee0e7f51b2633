//! Live analyzer process handling: stderr capture, polling wait, kill-on-drop.

use std::io::Read;
use std::process::{Child, ExitStatus};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::cancel::CancelToken;

/// How a single analyzer process ended.
pub(crate) enum ProcessExit {
    Exited { status: ExitStatus, stderr: String },
    Killed,
    WaitFailed(String),
}

/// Owns a spawned child. Killed and reaped on drop unless it already exited.
pub(crate) struct ChildGuard {
    child: Child,
    reaped: bool,
    stderr_reader: Option<JoinHandle<Vec<u8>>>,
}

impl ChildGuard {
    /// Take ownership of `child` and start draining its stderr so a chatty analyzer never
    /// blocks on a full pipe.
    pub(crate) fn new(mut child: Child) -> Self {
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf);
                buf
            })
        });
        Self {
            child,
            reaped: false,
            stderr_reader,
        }
    }

    /// Block until the process exits, polling every `poll` so cancellation is seen promptly.
    /// On cancellation the process is killed and its stderr reader is detached. On exit, any
    /// process left in its group is killed before the captured stderr is collected.
    pub(crate) fn wait_or_kill(mut self, token: &CancelToken, poll: Duration) -> ProcessExit {
        loop {
            if token.is_cancelled() {
                self.kill();
                return ProcessExit::Killed;
            }
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    self.reaped = true;
                    // Leftover group members would hold the stderr pipe open.
                    kill_process_group(&self.child);
                    let stderr = self
                        .stderr_reader
                        .take()
                        .and_then(|h| h.join().ok())
                        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                        .unwrap_or_default();
                    return ProcessExit::Exited { status, stderr };
                }
                Ok(None) => thread::sleep(poll),
                Err(e) => {
                    self.kill();
                    return ProcessExit::WaitFailed(format!("Failed to wait for process: {e}"));
                }
            }
        }
    }

    fn kill(&mut self) {
        if self.reaped {
            return;
        }
        kill_process_group(&self.child);
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.reaped = true;
        // A grandchild may still hold the pipe; do not wait for it.
        self.stderr_reader.take();
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Analyzers are started in their own process group (see `AnalyzerCommand`); kill the whole
/// group so wrapper scripts do not leave their children running. The group id stays valid
/// after the leader is reaped for as long as any member lives.
#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let Ok(pid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    unsafe {
        libc::kill(-pid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}
