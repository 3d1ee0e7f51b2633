//! lintpipe: run an external static analyzer over many files with bounded parallelism,
//! retries, progress/ETA and clean cancellation; then fix and publish.

pub mod engine;
pub mod fix;
pub mod pipeline;
pub mod repo;
pub mod source;
pub mod types;
pub mod utils;
pub mod workflow;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::Path;

/// Result alias used by public lintpipe API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: analyze every file under `root` with one of `extensions`.
///
/// - **`on_progress: None`**: no progress reporting.
/// - **`on_progress: Some(f)`**: `f` is called after every completed file, on the calling
///   thread. Keep it fast; the next completion waits for it.
///
/// Setup problems (unreadable tree, analyzer not found) are the only errors; per-file
/// failures end up in [`AnalysisReport::findings`]. To cancel from elsewhere, build a
/// [`Pipeline`](pipeline::Pipeline) yourself and use its [`cancel_token`](pipeline::Pipeline::cancel_token).
pub fn analyze_dir<F>(
    root: &Path,
    extensions: &[String],
    analyzer: AnalyzerSpec,
    opts: &PipelineOpts,
    on_progress: Option<F>,
) -> Result<AnalysisReport>
where
    F: FnMut(&ProgressSnapshot),
{
    debug!(
        "{} CONFIG: {:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    let worklist = source::collect_work_items(root, extensions, &[])?;
    let pipeline = pipeline::Pipeline::new(analyzer, opts)?;
    match on_progress {
        None => pipeline.analyze(worklist),
        Some(f) => pipeline.analyze_with_progress(worklist, f),
    }
}
