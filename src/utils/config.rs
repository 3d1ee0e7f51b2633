//! Application configuration constants.
//! Defaults and derived file names in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    checkout_dir_name: String,
    report_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                checkout_dir_name: format!(".{pkg}_checkout"),
                report_filename: format!("{pkg}.report.json"),
            }
        })
    }

    /// Per-directory settings file, e.g. `.lintpipe.toml`.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Prefix of the per-run directory a `--repo` clone is placed in (under the system temp dir).
    pub fn checkout_dir_name(&self) -> &str {
        &self.checkout_dir_name
    }

    pub fn report_filename(&self) -> &str {
        &self.report_filename
    }

    /// Names excluded from source enumeration by default.
    pub fn default_exclude_patterns(&self) -> Vec<String> {
        vec![
            ".git".to_string(),
            format!("{}*", self.checkout_dir_name()),
            self.report_filename().to_string(),
        ]
    }
}

// ---- Pipeline ----

/// Defaults for the analysis pipeline and workflow.
pub struct PipelineDefaults;

impl PipelineDefaults {
    /// Analyzer processes alive at once.
    pub const CONCURRENCY: usize = 10;
    /// Extra attempts after a failed one.
    pub const MAX_RETRIES: u32 = 3;
    /// Worker wake-up interval while an analyzer runs.
    pub const POLL_INTERVAL: Duration = Duration::from_millis(20);
    /// Flag placed before the analyzer config path.
    pub const CONFIG_FLAG: &'static str = "-c";
    pub const JAVA: &'static str = "java";
    /// Checkstyle jar; a relative path is looked up in the analyzed directory first.
    pub const CHECKSTYLE_JAR: &'static str = "checkstyle.jar";
    /// Checkstyle rules; a relative path is looked up in the analyzed directory first.
    pub const CHECKSTYLE_CONFIG: &'static str = "checkstyle.xml";
    pub const EXTENSION: &'static str = "java";
    pub const COMMIT_MESSAGE: &'static str = "Automated fixes for identified errors";
}
