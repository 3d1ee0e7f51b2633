//! Fix applier: mechanical rewrites driven by findings.

use log::{debug, info, warn};
use regex::Regex;
use std::sync::LazyLock;

use crate::Finding;

/// Checkstyle check name that marks a file for import removal.
pub const UNUSED_IMPORTS: &str = "UnusedImports";

static IMPORT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*import\s+[\w.]+\s*;[ \t]*\r?\n").unwrap());

/// Counts from one [`apply_fixes`] pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixSummary {
    pub files_changed: usize,
    pub files_skipped: usize,
}

/// Drop single-type import lines. Static and wildcard imports are left alone.
pub fn remove_imports(source: &str) -> String {
    IMPORT_LINE.replace_all(source, "").into_owned()
}

/// Rewrite the file behind each finding whose issues name a rule we can fix. Files that do
/// not change are not written; unreadable or unwritable files are logged and skipped.
pub fn apply_fixes(findings: &[Finding]) -> FixSummary {
    let mut summary = FixSummary::default();
    for finding in findings {
        if !finding.issues.contains(UNUSED_IMPORTS) {
            continue;
        }
        debug!("Applying fixes to {}", finding.file.display());
        let content = match std::fs::read_to_string(&finding.file) {
            Ok(c) => c,
            Err(e) => {
                warn!("Cannot read {}: {}", finding.file.display(), e);
                summary.files_skipped += 1;
                continue;
            }
        };
        let fixed = remove_imports(&content);
        if fixed == content {
            continue;
        }
        match std::fs::write(&finding.file, fixed) {
            Ok(()) => summary.files_changed += 1,
            Err(e) => {
                warn!("Cannot write {}: {}", finding.file.display(), e);
                summary.files_skipped += 1;
            }
        }
    }
    info!("Applied fixes to {} files", summary.files_changed);
    summary
}
