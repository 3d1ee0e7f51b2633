//! Load `.lintpipe.toml` from a directory (CLI only). Lib callers pass [`PipelineOpts`](crate::PipelineOpts) directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LintpipeToml {
    #[serde(default)]
    settings: SettingsSection,
    #[serde(default)]
    analyzer: AnalyzerSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    extensions: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    concurrency: Option<usize>,
    retries: Option<u32>,
    fix: Option<bool>,
    push: Option<bool>,
    message: Option<String>,
    report: Option<String>,
    verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzerSection {
    program: Option<String>,
    jar: Option<String>,
    args: Option<Vec<String>>,
    config: Option<String>,
    config_flag: Option<String>,
}

/// Load `.lintpipe.toml` from `dir` if present. Returns None if file missing or unreadable.
pub(crate) fn load_lintpipe_toml(dir: &Path) -> Option<LintpipeToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_lintpipe_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_lintpipe_toml(s: &str) -> Result<LintpipeToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $target:expr, $field:ident => $opts_field:ident) => {
        if let Some(v) = $section.$field.clone() {
            $target.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &LintpipeToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, extensions => extensions);
    apply_file_opt!(s, opts, exclude => exclude);
    apply_file_opt!(s, opts.pipeline, concurrency => concurrency);
    apply_file_opt!(s, opts.pipeline, retries => max_retries);
    apply_file_opt!(s, opts, fix => fix);
    apply_file_opt!(s, opts, push => push);
    apply_file_opt!(s, opts, message => commit_message);
    apply_file_opt!(s, opts, verbose => verbose);
    if let Some(ref p) = s.report {
        opts.report_path = Some(PathBuf::from(p));
    }

    let a = &file.analyzer;
    if let Some(ref p) = a.program {
        opts.analyzer.program = PathBuf::from(p);
        opts.analyzer.jar = None;
    }
    if let Some(ref j) = a.jar {
        opts.analyzer.jar = Some(PathBuf::from(j));
    }
    apply_file_opt!(a, opts.analyzer, args => args);
    apply_file_opt!(a, opts.analyzer, config_flag => config_flag);
    if let Some(ref c) = a.config {
        opts.analyzer.config = Some(PathBuf::from(c));
    }
}
