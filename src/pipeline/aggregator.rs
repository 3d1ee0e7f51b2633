//! Result aggregator: the ordered log of failed files.

use crate::types::{AttemptResult, Finding, WorkItem};

/// Ordered error log. Only `Failure` and `SpawnError` outcomes produce a [`Finding`].
#[derive(Debug, Default)]
pub struct FindingLog {
    findings: Vec<Finding>,
}

impl FindingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, item: &WorkItem, result: &AttemptResult) {
        if let Some(issues) = result.issues() {
            self.findings.push(Finding {
                file: item.path().to_path_buf(),
                issues: issues.to_string(),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings in the order they were recorded.
    pub fn finalize(self) -> Vec<Finding> {
        self.findings
    }
}
