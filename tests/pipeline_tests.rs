//! Pipeline tests against real `sh` processes: scenarios, counting, retries, cancellation.
#![cfg(unix)]

use lintpipe::pipeline::Pipeline;
use lintpipe::{AnalyzerSpec, AttemptResult, PipelineOpts, ProgressSnapshot, RunStatus, WorkItem};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn sh(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    cmd
}

fn opts(concurrency: usize, max_retries: u32) -> PipelineOpts {
    PipelineOpts {
        concurrency,
        max_retries,
        poll_interval: Duration::from_millis(5),
    }
}

fn items(n: usize) -> Vec<WorkItem> {
    (1..=n).map(|i| WorkItem::new(format!("f{i}"))).collect()
}

fn name(file: &Path) -> String {
    file.to_string_lossy().into_owned()
}

/// Per-file attempt counter shared with the command builder.
#[derive(Clone, Default)]
struct Attempts(Arc<Mutex<HashMap<String, u32>>>);

impl Attempts {
    fn bump(&self, file: &Path) -> u32 {
        let mut map = self.0.lock().unwrap();
        let n = map.entry(name(file)).or_insert(0);
        *n += 1;
        *n
    }

    fn get(&self, file: &str) -> u32 {
        self.0.lock().unwrap().get(file).copied().unwrap_or(0)
    }
}

// --- Scenario A: all succeed ---

#[test]
fn test_all_succeed_no_findings_and_final_snapshot() {
    let pipeline = Pipeline::with_command(Arc::new(|_: &Path| sh("exit 0")), &opts(10, 3)).unwrap();
    let mut snapshots: Vec<ProgressSnapshot> = Vec::new();
    let report = pipeline
        .analyze_with_progress(items(10), |s| snapshots.push(s.clone()))
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert!(!report.is_partial());
    assert!(report.findings.is_empty());
    assert_eq!(report.processed, 10);
    assert_eq!(snapshots.len(), 10);
    let last = snapshots.last().unwrap();
    assert_eq!(last.processed, 10);
    assert_eq!(last.total, 10);
    assert_eq!(last.percentage, 100.0);
    assert_eq!(last.eta_millis, 0);
}

// --- Scenario B: retries ---

#[test]
fn test_retry_exhaustion_records_final_output_and_late_success_records_nothing() {
    let attempts = Attempts::default();
    let counter = attempts.clone();
    let analyzer = move |file: &Path| {
        let n = counter.bump(file);
        match (name(file).as_str(), n) {
            ("f1", n) => sh(&format!("echo f1-attempt-{n} >&2; exit 1")),
            ("f2", 1) => sh("echo transient >&2; exit 3"),
            _ => sh("exit 0"),
        }
    };
    let pipeline = Pipeline::with_command(Arc::new(analyzer), &opts(10, 3)).unwrap();
    let report = pipeline.analyze(items(2)).unwrap();

    assert_eq!(attempts.get("f1"), 4);
    assert_eq!(attempts.get("f2"), 2);
    assert_eq!(report.processed, 2);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].file, PathBuf::from("f1"));
    assert_eq!(report.findings[0].issues, "f1-attempt-4\n");
}

#[test]
fn test_zero_retries_means_single_attempt() {
    let attempts = Attempts::default();
    let counter = attempts.clone();
    let analyzer = move |file: &Path| {
        counter.bump(file);
        sh("exit 1")
    };
    let pipeline = Pipeline::with_command(Arc::new(analyzer), &opts(2, 0)).unwrap();
    let report = pipeline.analyze(items(3)).unwrap();
    assert_eq!(report.findings.len(), 3);
    for f in ["f1", "f2", "f3"] {
        assert_eq!(attempts.get(f), 1);
    }
}

// --- Scenario C: cancellation mid-run ---

#[test]
fn test_cancel_after_three_completions_returns_partial_and_spawns_nothing_more() {
    let spawned = Arc::new(AtomicUsize::new(0));
    let spawn_counter = Arc::clone(&spawned);
    let analyzer = move |file: &Path| {
        spawn_counter.fetch_add(1, Ordering::SeqCst);
        match name(file).as_str() {
            "f1" | "f2" | "f3" => sh("echo broken >&2; exit 1"),
            _ => sh("exec sleep 30"),
        }
    };
    let pipeline = Pipeline::with_command(Arc::new(analyzer), &opts(3, 3)).unwrap();
    let token = pipeline.cancel_token();
    let mut spawned_at_cancel = None;

    let started = Instant::now();
    let report = pipeline
        .analyze_with_progress(items(10), |s| {
            if s.processed == 3 {
                token.cancel();
                spawned_at_cancel = Some(spawned.load(Ordering::SeqCst));
            }
        })
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(report.status, RunStatus::Cancelled);
    assert!(report.is_partial());
    assert_eq!(report.processed, 3);
    assert_eq!(report.total, 10);
    let mut files: Vec<_> = report.findings.iter().map(|f| name(&f.file)).collect();
    files.sort();
    assert_eq!(files, vec!["f1", "f2", "f3"]);
    assert_eq!(Some(spawned.load(Ordering::SeqCst)), spawned_at_cancel);
}

#[test]
fn test_cancel_before_run_spawns_nothing() {
    let spawned = Arc::new(AtomicUsize::new(0));
    let spawn_counter = Arc::clone(&spawned);
    let analyzer = move |_: &Path| {
        spawn_counter.fetch_add(1, Ordering::SeqCst);
        sh("exit 0")
    };
    let pipeline = Pipeline::with_command(Arc::new(analyzer), &opts(4, 3)).unwrap();
    pipeline.cancel();
    pipeline.cancel();
    assert!(pipeline.is_cancelled());

    let report = pipeline.analyze(items(5)).unwrap();
    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(report.processed, 0);
    assert!(report.findings.is_empty());
    assert_eq!(spawned.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancel_from_other_thread_kills_running_analyzers() {
    let pipeline =
        Pipeline::with_command(Arc::new(|_: &Path| sh("exec sleep 30")), &opts(4, 3)).unwrap();
    let token = pipeline.cancel_token();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        token.cancel();
    });
    let started = Instant::now();
    let report = pipeline.analyze(items(8)).unwrap();
    canceller.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(report.processed, 0);
    assert!(report.findings.is_empty());
}

// --- Scenario D: spawn failure ---

#[test]
fn test_spawn_failure_recorded_without_retry() {
    let attempts = Attempts::default();
    let counter = attempts.clone();
    let analyzer = move |file: &Path| {
        counter.bump(file);
        if name(file) == "f3" {
            Command::new("/nonexistent/lintpipe-analyzer")
        } else {
            sh("exit 0")
        }
    };
    let pipeline = Pipeline::with_command(Arc::new(analyzer), &opts(2, 3)).unwrap();
    let report = pipeline.analyze(items(4)).unwrap();

    assert_eq!(attempts.get("f3"), 1);
    assert_eq!(report.processed, 4);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].file, PathBuf::from("f3"));
    assert!(
        report.findings[0]
            .issues
            .starts_with("Failed to spawn process")
    );
}

// --- Counting and progress properties ---

#[test]
fn test_every_item_reaches_one_terminal_outcome() {
    for (n, ceiling) in [(0, 1), (1, 1), (7, 3), (12, 5), (5, 50)] {
        let analyzer = |file: &Path| {
            let idx: usize = name(file)[1..].parse().unwrap();
            if idx % 2 == 0 { sh("exit 1") } else { sh("exit 0") }
        };
        let pipeline = Pipeline::with_command(Arc::new(analyzer), &opts(ceiling, 0)).unwrap();
        let mut seen = Vec::new();
        let report = pipeline
            .analyze_with_progress(items(n), |s| seen.push(s.processed))
            .unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.processed, n);
        assert_eq!(report.findings.len(), n / 2);
        assert_eq!(seen, (1..=n).collect::<Vec<_>>());
    }
}

#[test]
fn test_eta_non_negative_and_zero_at_end() {
    let pipeline = Pipeline::with_command(Arc::new(|_: &Path| sh("exit 0")), &opts(2, 0)).unwrap();
    let mut snapshots = Vec::new();
    pipeline
        .analyze_with_progress(items(6), |s| snapshots.push(s.clone()))
        .unwrap();
    for s in &snapshots {
        assert!(s.processed <= s.total);
        assert!(s.percentage >= 0.0 && s.percentage <= 100.0);
    }
    assert_eq!(snapshots.last().unwrap().eta_millis, 0);
}

#[test]
fn test_stderr_is_decoded_lossily() {
    let pipeline = Pipeline::with_command(
        Arc::new(|_: &Path| sh("printf 'bad \\377 byte' >&2; exit 1")),
        &opts(1, 0),
    )
    .unwrap();
    let report = pipeline.analyze(items(1)).unwrap();
    assert_eq!(report.findings.len(), 1);
    assert!(report.findings[0].issues.starts_with("bad "));
    assert!(report.findings[0].issues.ends_with(" byte"));
}

// --- Setup errors ---

#[test]
fn test_zero_concurrency_is_setup_error() {
    assert!(Pipeline::with_command(Arc::new(|_: &Path| sh("exit 0")), &opts(0, 3)).is_err());
}

#[test]
fn test_missing_analyzer_program_is_setup_error() {
    let spec = AnalyzerSpec {
        program: PathBuf::from("lintpipe-no-such-analyzer"),
        jar: None,
        args: Vec::new(),
        config_flag: "-c".to_string(),
        config: None,
    };
    assert!(Pipeline::new(spec, &PipelineOpts::default()).is_err());
}

#[test]
fn test_missing_config_is_setup_error() {
    let spec = AnalyzerSpec {
        program: PathBuf::from("sh"),
        jar: None,
        args: Vec::new(),
        config_flag: "-c".to_string(),
        config: Some(PathBuf::from("/nonexistent/checkstyle.xml")),
    };
    assert!(Pipeline::new(spec, &PipelineOpts::default()).is_err());
}

#[test]
fn test_missing_jar_is_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("checkstyle.xml");
    std::fs::write(&config, "<module name=\"Checker\"/>").unwrap();
    let mut spec = AnalyzerSpec::checkstyle(dir.path().join("checkstyle.jar"), &config);
    spec.program = PathBuf::from("sh");
    let err = Pipeline::new(spec, &PipelineOpts::default()).err().unwrap();
    assert!(format!("{err:#}").contains("jar not found"));
}

// --- Analyzer leaves a background process behind ---

#[test]
fn test_cancel_is_prompt_after_analyzer_leaves_background_child() {
    let analyzer = |file: &Path| match name(file).as_str() {
        "f1" => sh("sleep 30 & echo done >&2; exit 1"),
        _ => sh("exec sleep 30"),
    };
    let pipeline = Pipeline::with_command(Arc::new(analyzer), &opts(1, 0)).unwrap();
    let token = pipeline.cancel_token();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(300));
        token.cancel();
    });
    let started = Instant::now();
    let report = pipeline.analyze(items(2)).unwrap();
    let elapsed = started.elapsed();
    canceller.join().unwrap();

    assert!(elapsed < Duration::from_secs(10), "run took {elapsed:?}");
    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(report.processed, 1);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].issues, "done\n");
}

#[test]
fn test_analyzer_runs_program_with_config_then_file() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("analyzer.sh");
    // $1 = config flag, $2 = config, $3 = file
    std::fs::write(&script, "[ \"$1\" = \"--rules\" ] || exit 9\necho \"$2|$3\" >&2\nexit 1\n")
        .unwrap();
    let config = dir.path().join("rules.xml");
    std::fs::write(&config, "<rules/>").unwrap();

    let spec = AnalyzerSpec {
        program: PathBuf::from("sh"),
        jar: None,
        args: vec![script.display().to_string()],
        config_flag: "--rules".to_string(),
        config: Some(config.clone()),
    };
    let pipeline = Pipeline::new(spec, &opts(1, 0)).unwrap();
    let report = pipeline.analyze(vec![WorkItem::new("A.java")]).unwrap();
    assert_eq!(
        report.findings[0].issues,
        format!("{}|A.java\n", config.display())
    );
    assert!(AttemptResult::Failure(String::new()).issues().is_some());
}
