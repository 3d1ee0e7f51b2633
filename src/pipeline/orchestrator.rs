//! Pipeline facade: setup checks, one scoped run per `analyze` call, partial reports on cancel.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::engine::tools::resolve_program;
use crate::types::{
    AnalysisReport, AnalyzerSpec, PipelineOpts, ProgressSnapshot, RunStatus, WorkItem,
};
use crate::utils::fd_limit::cap_concurrency;

use super::aggregator::FindingLog;
use super::cancel::CancelToken;
use super::invoker::{AnalyzerCommand, Invoker};
use super::scheduler::{self, Completion};
use super::tracker::ProgressTracker;

/// Entry point for analysis: `analyze(worklist) -> report`, plus `cancel()`.
///
/// Cancelling is permanent for this pipeline: later `analyze` calls return an empty
/// cancelled report. Build a new pipeline to run again.
pub struct Pipeline {
    invoker: Arc<Invoker>,
    concurrency: usize,
    token: CancelToken,
}

impl Pipeline {
    /// Pipeline for an external analyzer. Fails when the program cannot be found on `PATH`,
    /// the jar or config file is missing, or `concurrency` is 0.
    pub fn new(analyzer: AnalyzerSpec, opts: &PipelineOpts) -> Result<Self> {
        let program = resolve_program(&analyzer.program)
            .with_context(|| format!("resolve analyzer {}", analyzer.program.display()))?;
        if let Some(jar) = &analyzer.jar
            && !jar.is_file()
        {
            anyhow::bail!("analyzer jar not found: {}", jar.display());
        }
        if let Some(config) = &analyzer.config
            && !config.is_file()
        {
            anyhow::bail!("analyzer config not found: {}", config.display());
        }
        debug!("Analyzer: {}", program.display());
        let analyzer = AnalyzerSpec {
            program,
            ..analyzer
        };
        Self::with_command(Arc::new(analyzer), opts)
    }

    /// Pipeline for any [`AnalyzerCommand`]. No program lookup is done.
    pub fn with_command(analyzer: Arc<dyn AnalyzerCommand>, opts: &PipelineOpts) -> Result<Self> {
        if opts.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        let invoker =
            Invoker::new(analyzer, opts.max_retries).with_poll_interval(opts.poll_interval);
        Ok(Self {
            invoker: Arc::new(invoker),
            concurrency: cap_concurrency(opts.concurrency),
            token: CancelToken::new(),
        })
    }

    /// Also stop when `parent` is cancelled (e.g. a token owned by a Ctrl+C handler).
    pub fn with_parent_token(mut self, parent: &CancelToken) -> Self {
        self.token = parent.child();
        self
    }

    /// Handle for cancelling from another thread or from the progress observer.
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Stop admitting files and kill running analyzers. Idempotent; does not block on exits.
    pub fn cancel(&self) {
        if self.token.cancel() {
            warn!("Cancellation requested; stopping analyzer processes");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Analyze `worklist` without progress reporting.
    pub fn analyze(&self, worklist: Vec<WorkItem>) -> Result<AnalysisReport> {
        self.analyze_with_progress(worklist, |_| {})
    }

    /// Analyze `worklist`, calling `observer` after every counted completion.
    ///
    /// Completions are handled one at a time on the calling thread: tracker, then observer,
    /// then finding log. Errors only when a worker thread panicked.
    pub fn analyze_with_progress<F>(
        &self,
        worklist: Vec<WorkItem>,
        mut observer: F,
    ) -> Result<AnalysisReport>
    where
        F: FnMut(&ProgressSnapshot),
    {
        let mut run = PipelineRun::new(worklist.len(), self.token.child());
        let handles = scheduler::run(
            worklist,
            self.concurrency,
            &run.token,
            Arc::clone(&self.invoker),
        );
        for completion in handles.completion_rx.iter() {
            run.handle_completion(completion, &mut observer);
        }
        handles.join()?;
        Ok(run.finish())
    }
}

/// State for one `analyze` call. Dropping it cancels its token, so an unwinding caller
/// still gets its analyzer processes killed.
struct PipelineRun {
    token: CancelToken,
    tracker: ProgressTracker,
    findings: FindingLog,
}

impl PipelineRun {
    fn new(total: usize, token: CancelToken) -> Self {
        Self {
            token,
            tracker: ProgressTracker::new(total),
            findings: FindingLog::new(),
        }
    }

    fn handle_completion<F>(&mut self, completion: Completion, observer: &mut F)
    where
        F: FnMut(&ProgressSnapshot),
    {
        let Completion {
            item,
            result,
            elapsed,
        } = completion;
        if result.is_cancelled() {
            debug!("{} cancelled in flight", item.path().display());
            return;
        }
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let snapshot = self.tracker.on_completion(millis);
        observer(&snapshot);
        self.findings.record(&item, &result);
    }

    fn finish(mut self) -> AnalysisReport {
        let processed = self.tracker.processed();
        let total = self.tracker.total();
        let status = if processed < total && self.token.is_cancelled() {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };
        let findings = std::mem::take(&mut self.findings).finalize();
        match status {
            RunStatus::Completed => info!(
                "Analyzed {} files, {} with findings",
                processed,
                findings.len()
            ),
            RunStatus::Cancelled => warn!(
                "Analysis stopped after {}/{} files, {} with findings",
                processed,
                total,
                findings.len()
            ),
        }
        AnalysisReport {
            status,
            processed,
            total,
            findings,
        }
    }
}

impl Drop for PipelineRun {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
