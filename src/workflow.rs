//! Fetch → analyze → fix → publish.

use anyhow::{Context, Result};
use log::{info, warn};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::engine::progress::ProgressDisplay;
use crate::fix::{FixSummary, apply_fixes};
use crate::pipeline::{CancelToken, Pipeline};
use crate::repo::{PublishOutcome, clone_repository, commit_and_push};
use crate::source::collect_work_items;
use crate::utils::config::PackagePaths;
use crate::{AnalysisReport, AnalyzerSpec, Opts};

/// How [`run_workflow`] ended.
#[derive(Debug)]
pub enum WorkflowOutcome {
    /// Analysis ran to completion; fixes and publishing ran as configured.
    Finished {
        report: AnalysisReport,
        fixes: Option<FixSummary>,
        published: Option<PublishOutcome>,
    },
    /// Cancelled during analysis. Nothing was fixed or published.
    Stopped { report: AnalysisReport },
}

/// Fresh checkout location for one `--repo` run: `<tmp>/.lintpipe_checkoutXXXXXX`.
/// Removed when the returned [`TempDir`] is dropped or closed.
pub fn create_checkout_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(PackagePaths::get().checkout_dir_name())
        .tempdir()
        .context("create checkout directory")
}

/// A relative path that names a file inside `work_dir` resolves there; anything else is kept.
fn resolve_in(path: &Path, work_dir: &Path) -> PathBuf {
    if path.is_relative() {
        let in_dir = work_dir.join(path);
        if in_dir.is_file() {
            return in_dir;
        }
    }
    path.to_path_buf()
}

/// Resolve the analyzer's relative jar and config against the analyzed directory.
fn resolve_config(analyzer: &AnalyzerSpec, work_dir: &Path) -> AnalyzerSpec {
    let mut analyzer = analyzer.clone();
    analyzer.jar = analyzer.jar.as_deref().map(|j| resolve_in(j, work_dir));
    analyzer.config = analyzer.config.as_deref().map(|c| resolve_in(c, work_dir));
    analyzer
}

fn write_report(path: &Path, report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    std::fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}

/// Analyze `dir` and, when complete, fix and publish as `opts` asks.
fn run_in(dir: &Path, opts: &Opts, cancel: &CancelToken) -> Result<WorkflowOutcome> {
    let worklist = collect_work_items(dir, &opts.extensions, &opts.exclude)?;
    let pipeline = Pipeline::new(resolve_config(&opts.analyzer, dir), &opts.pipeline)?
        .with_parent_token(cancel);

    info!("Starting issue identification on {} files", worklist.len());
    let show_bar = opts.verbose || std::io::stderr().is_terminal();
    let report = if show_bar {
        let mut display = ProgressDisplay::new(worklist.len());
        let report = pipeline.analyze_with_progress(worklist, |s| display.observe(s))?;
        display.finish();
        report
    } else {
        pipeline.analyze(worklist)?
    };

    if let Some(path) = &opts.report_path {
        write_report(path, &report)?;
    }
    if report.is_partial() {
        return Ok(WorkflowOutcome::Stopped { report });
    }

    let fixes = opts.fix.then(|| apply_fixes(&report.findings));
    let published = if opts.push {
        Some(commit_and_push(dir, &opts.commit_message, true)?)
    } else {
        None
    };
    Ok(WorkflowOutcome::Finished {
        report,
        fixes,
        published,
    })
}

/// Full workflow. With `repo_url` set the repository is cloned into a fresh
/// [`create_checkout_dir`] and the checkout is removed afterwards, whatever the outcome.
pub fn run_workflow(opts: &Opts, cancel: &CancelToken) -> Result<WorkflowOutcome> {
    let Some(url) = &opts.repo_url else {
        return run_in(&opts.dir, opts, cancel);
    };
    let checkout = create_checkout_dir()?;
    let dir = checkout.path().join("repo");
    let outcome = clone_repository(url, &dir).and_then(|()| run_in(&dir, opts, cancel));
    if let Err(e) = checkout.close() {
        warn!("Failed to clean up checkout: {:#}", e);
    }
    outcome
}
