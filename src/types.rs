//! Public and internal types for the lintpipe API and pipeline.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::config::PipelineDefaults;

/// One file to analyze. Immutable once enqueued; retries reuse the same item.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkItem(PathBuf);

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for WorkItem {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Terminal outcome of running the analyzer on one [`WorkItem`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptResult {
    /// Some attempt exited successfully.
    Success,
    /// Every attempt exited with an error; holds the final attempt's stderr.
    Failure(String),
    /// The analyzer could not be started at all. Never retried.
    SpawnError(String),
    /// Cancellation was observed before or during an attempt.
    Cancelled,
}

impl AttemptResult {
    /// Issues text for the error log, or `None` when this outcome records no finding.
    pub fn issues(&self) -> Option<&str> {
        match self {
            AttemptResult::Failure(output) | AttemptResult::SpawnError(output) => Some(output),
            AttemptResult::Success | AttemptResult::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AttemptResult::Cancelled)
    }
}

/// A recorded analysis problem for one file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub file: PathBuf,
    pub issues: String,
}

/// Progress after a completion. Derived state; rebuilt on every completion.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    /// 0.0 ..= 100.0
    pub percentage: f64,
    pub eta_millis: u64,
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Cancelled,
}

/// Result of [`Pipeline::analyze`](crate::pipeline::Pipeline::analyze).
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisReport {
    pub status: RunStatus,
    /// Completed items (success or exhausted failure). Cancelled-in-flight items are not counted.
    pub processed: usize,
    pub total: usize,
    /// Findings in completion order.
    pub findings: Vec<Finding>,
}

impl AnalysisReport {
    /// True when the run stopped early; `findings` then covers only the items that finished.
    pub fn is_partial(&self) -> bool {
        self.status == RunStatus::Cancelled
    }
}

/// External analyzer invocation: `program [-jar jar] args... [config_flag config] <file>`.
#[derive(Clone, Debug)]
pub struct AnalyzerSpec {
    pub program: PathBuf,
    /// Run `program -jar <jar>`; the jar must exist at setup.
    pub jar: Option<PathBuf>,
    pub args: Vec<String>,
    pub config_flag: String,
    pub config: Option<PathBuf>,
}

impl AnalyzerSpec {
    /// Checkstyle through `java -jar <jar> -c <config>`.
    pub fn checkstyle(jar: impl Into<PathBuf>, config: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from(PipelineDefaults::JAVA),
            jar: Some(jar.into()),
            args: Vec::new(),
            config_flag: PipelineDefaults::CONFIG_FLAG.to_string(),
            config: Some(config.into()),
        }
    }
}

/// Pipeline tuning for [`Pipeline`](crate::pipeline::Pipeline).
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    /// Maximum number of analyzer processes alive at once.
    pub concurrency: usize,
    /// Additional attempts after the first failed one.
    pub max_retries: u32,
    /// How often a waiting worker checks for process exit and cancellation.
    pub poll_interval: Duration,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            concurrency: PipelineDefaults::CONCURRENCY,
            max_retries: PipelineDefaults::MAX_RETRIES,
            poll_interval: PipelineDefaults::POLL_INTERVAL,
        }
    }
}

/// Full options (CLI and config file). Use [`PipelineOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Directory to analyze. Ignored when `repo_url` is set.
    pub dir: PathBuf,
    /// Clone this repository into a temporary checkout and analyze that instead.
    pub repo_url: Option<String>,
    pub analyzer: AnalyzerSpec,
    /// File extensions to analyze (without the dot).
    pub extensions: Vec<String>,
    /// Exclude patterns (glob syntax).
    pub exclude: Vec<String>,
    pub pipeline: PipelineOpts,
    /// Apply mechanical fixes for the findings.
    pub fix: bool,
    /// Commit (and push when the checkout has a remote) after fixing.
    pub push: bool,
    pub commit_message: String,
    /// Write the report as JSON to this path.
    pub report_path: Option<PathBuf>,
    /// Show progress bar and debug logging.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            repo_url: None,
            analyzer: AnalyzerSpec::checkstyle(
                PipelineDefaults::CHECKSTYLE_JAR,
                PipelineDefaults::CHECKSTYLE_CONFIG,
            ),
            extensions: vec![PipelineDefaults::EXTENSION.to_string()],
            exclude: Vec::new(),
            pipeline: PipelineOpts::default(),
            fix: false,
            push: false,
            commit_message: PipelineDefaults::COMMIT_MESSAGE.to_string(),
            report_path: None,
            verbose: false,
        }
    }
}
