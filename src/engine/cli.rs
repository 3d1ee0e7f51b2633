//! CLI command handler: merge defaults, `.lintpipe.toml` and flags, then run the workflow.

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::pipeline::CancelToken;
use crate::utils::lintpipe_toml::{apply_file_to_opts, load_lintpipe_toml};
use crate::utils::setup_logging;
use crate::workflow::{WorkflowOutcome, run_workflow};

/// Defaults, then the settings file in DIR, then command-line flags.
pub fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts {
        dir: cli.dir.clone(),
        ..Opts::default()
    };
    if let Some(file) = load_lintpipe_toml(&cli.dir) {
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_to_opts(cli, &mut opts);
    opts
}

fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) {
    if cli.repo.is_some() {
        opts.repo_url = cli.repo.clone();
    }
    if let Some(ref p) = cli.analyzer {
        opts.analyzer.program = p.clone();
        opts.analyzer.jar = None;
    }
    if cli.jar.is_some() {
        opts.analyzer.jar = cli.jar.clone();
    }
    if !cli.analyzer_args.is_empty() {
        opts.analyzer.args = cli.analyzer_args.clone();
    }
    if cli.config.is_some() {
        opts.analyzer.config = cli.config.clone();
    }
    if let Some(ref flag) = cli.config_flag {
        opts.analyzer.config_flag = flag.clone();
    }
    if !cli.extensions.is_empty() {
        opts.extensions = cli.extensions.clone();
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if let Some(n) = cli.concurrency {
        opts.pipeline.concurrency = n;
    }
    if let Some(n) = cli.retries {
        opts.pipeline.max_retries = n;
    }
    if let Some(v) = cli.fix {
        opts.fix = v;
    }
    if let Some(v) = cli.push {
        opts.push = v;
    }
    if let Some(ref m) = cli.message {
        opts.commit_message = m.clone();
    }
    if cli.report.is_some() {
        opts.report_path = cli.report.clone();
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
}

/// Run the workflow with Ctrl+C wired to cancellation.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    setup_logging(opts.verbose);
    debug!("{} CONFIG: {:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);

    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        if handler_token.cancel() {
            log::warn!("Ctrl+C received; stopping analysis");
        }
    })
    .context("set Ctrl+C handler")?;

    run_until_stopped(&opts, &token)
}

/// Run the workflow under `token`. A user stop is logged, not returned as an error.
fn run_until_stopped(opts: &Opts, token: &CancelToken) -> Result<()> {
    conclude(&run_workflow(opts, token)?);
    Ok(())
}

fn conclude(outcome: &WorkflowOutcome) {
    match outcome {
        WorkflowOutcome::Stopped { report } => warn!(
            "Analysis stopped by user after {}/{} files; nothing was fixed or published",
            report.processed, report.total
        ),
        WorkflowOutcome::Finished {
            report,
            fixes,
            published,
        } => {
            debug!(
                "Finished: {} findings, fixes {:?}, published {:?}",
                report.findings.len(),
                fixes,
                published
            );
        }
    }
}
