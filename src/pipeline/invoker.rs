//! Worker invoker: run the analyzer on one file, retrying failed exits.

use log::{debug, warn};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use crate::types::{AnalyzerSpec, AttemptResult, WorkItem};
use crate::utils::config::PipelineDefaults;

use super::cancel::CancelToken;
use super::process::{ChildGuard, ProcessExit};

/// Builds the analyzer command for one file. The invoker sets stdio and process group.
pub trait AnalyzerCommand: Send + Sync {
    fn command(&self, file: &Path) -> Command;
}

impl AnalyzerCommand for AnalyzerSpec {
    fn command(&self, file: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(jar) = &self.jar {
            cmd.arg("-jar").arg(jar);
        }
        cmd.args(&self.args);
        if let Some(config) = &self.config {
            cmd.arg(&self.config_flag).arg(config);
        }
        cmd.arg(file);
        cmd
    }
}

impl<F> AnalyzerCommand for F
where
    F: Fn(&Path) -> Command + Send + Sync,
{
    fn command(&self, file: &Path) -> Command {
        self(file)
    }
}

/// Runs one [`WorkItem`] to a terminal [`AttemptResult`]. Holds no shared pipeline state.
pub struct Invoker {
    analyzer: Arc<dyn AnalyzerCommand>,
    max_retries: u32,
    poll_interval: Duration,
}

impl Invoker {
    pub fn new(analyzer: Arc<dyn AnalyzerCommand>, max_retries: u32) -> Self {
        Self {
            analyzer,
            max_retries,
            poll_interval: PipelineDefaults::POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run the analyzer on `item` up to `max_retries + 1` times.
    ///
    /// - spawn error: terminal on the first occurrence, never retried
    /// - non-zero exit: retried; after the last attempt the final stderr becomes `Failure`
    /// - cancellation before an attempt, or while one runs (process is killed): `Cancelled`
    pub fn invoke(&self, item: &WorkItem, token: &CancelToken) -> AttemptResult {
        let file = item.path();
        let mut last_output = String::new();

        for attempt in 0..=self.max_retries {
            let spawned = token.spawn_unless_cancelled(|| self.prepare(file).spawn());
            let child = match spawned {
                None => return AttemptResult::Cancelled,
                Some(Err(e)) => {
                    warn!("Failed to spawn process for {}: {}", file.display(), e);
                    return AttemptResult::SpawnError(format!("Failed to spawn process: {e}"));
                }
                Some(Ok(child)) => ChildGuard::new(child),
            };

            match child.wait_or_kill(token, self.poll_interval) {
                ProcessExit::Killed => return AttemptResult::Cancelled,
                ProcessExit::Exited { status, .. } if status.success() => {
                    return AttemptResult::Success;
                }
                ProcessExit::Exited { status, stderr } => {
                    debug!(
                        "{} exited with {} (attempt {}/{})",
                        file.display(),
                        status,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_output = stderr;
                }
                ProcessExit::WaitFailed(msg) => {
                    debug!("{}: {}", file.display(), msg);
                    last_output = msg;
                }
            }
        }

        warn!(
            "Failed to process {} after {} attempts",
            file.display(),
            self.max_retries + 1
        );
        AttemptResult::Failure(last_output)
    }

    fn prepare(&self, file: &Path) -> Command {
        let mut cmd = self.analyzer.command(file);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    fn invoker<F>(f: F, retries: u32) -> Invoker
    where
        F: Fn(&Path) -> Command + Send + Sync + 'static,
    {
        Invoker::new(Arc::new(f), retries).with_poll_interval(Duration::from_millis(5))
    }

    #[test]
    fn default_analyzer_runs_checkstyle_jar_with_config() {
        let analyzer = crate::Opts::default().analyzer;
        let cmd = analyzer.command(Path::new("src/A.java"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "java");
        assert_eq!(
            args,
            ["-jar", "checkstyle.jar", "-c", "checkstyle.xml", "src/A.java"]
        );
    }

    #[test]
    fn exit_with_background_child_holding_stderr_returns_promptly() {
        let inv = invoker(|_| sh("sleep 30 & echo done >&2; exit 1"), 0);
        let started = std::time::Instant::now();
        let result = inv.invoke(&WorkItem::new("a.java"), &CancelToken::new());
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(result, AttemptResult::Failure("done\n".to_string()));
    }

    #[test]
    fn success_on_first_attempt() {
        let inv = invoker(|_| sh("exit 0"), 3);
        let result = inv.invoke(&WorkItem::new("a.java"), &CancelToken::new());
        assert_eq!(result, AttemptResult::Success);
    }

    #[test]
    fn failure_keeps_final_attempt_output() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let inv = invoker(
            move |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                sh(&format!("echo attempt-{n} >&2; exit 1"))
            },
            3,
        );
        let result = inv.invoke(&WorkItem::new("a.java"), &CancelToken::new());
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(result, AttemptResult::Failure("attempt-4\n".to_string()));
    }

    #[test]
    fn retry_success_discards_earlier_output() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let inv = invoker(
            move |_| match counter.fetch_add(1, Ordering::SeqCst) {
                0 => sh("echo broken >&2; exit 2"),
                _ => sh("exit 0"),
            },
            3,
        );
        let result = inv.invoke(&WorkItem::new("a.java"), &CancelToken::new());
        assert_eq!(result, AttemptResult::Success);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn spawn_error_is_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let inv = invoker(
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Command::new("/nonexistent/lintpipe-analyzer")
            },
            3,
        );
        let result = inv.invoke(&WorkItem::new("a.java"), &CancelToken::new());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        match result {
            AttemptResult::SpawnError(msg) => assert!(msg.starts_with("Failed to spawn process")),
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_token_spawns_nothing() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let inv = invoker(
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                sh("exit 0")
            },
            3,
        );
        let token = CancelToken::new();
        token.cancel();
        let result = inv.invoke(&WorkItem::new("a.java"), &token);
        assert_eq!(result, AttemptResult::Cancelled);
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancel_kills_running_process() {
        let inv = invoker(|_| sh("exec sleep 30"), 3);
        let token = CancelToken::new();
        let canceller = token.clone();
        let started = std::time::Instant::now();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            canceller.cancel();
        });
        let result = inv.invoke(&WorkItem::new("a.java"), &token);
        handle.join().unwrap();
        assert_eq!(result, AttemptResult::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
