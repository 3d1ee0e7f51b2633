use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Run a static analyzer over every source file, fix what can be fixed, and publish.
#[derive(Clone, Parser)]
#[command(name = "lintpipe")]
#[command(about = "Analyze source files with bounded parallelism; optionally fix, commit and push.")]
pub struct Cli {
    /// Directory to analyze. Default: current directory. Ignored with --repo.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Clone this repository URL into a temporary checkout and work there.
    #[arg(long, short = 'r', value_name = "URL")]
    pub repo: Option<String>,

    /// Analyzer executable (looked up on PATH). Default: java -jar checkstyle.jar.
    /// Without --jar, a custom analyzer runs without the Checkstyle jar.
    #[arg(long, short = 'a', value_name = "PROGRAM")]
    pub analyzer: Option<PathBuf>,

    /// Jar run with `-jar`. Default: checkstyle.jar, looked up in DIR (or the checkout) first.
    #[arg(long, value_name = "FILE")]
    pub jar: Option<PathBuf>,

    /// Argument placed before the config and file arguments. Repeat for several: -A -jar -A checkstyle.jar
    #[arg(long = "analyzer-arg", short = 'A', value_name = "ARG", allow_hyphen_values = true)]
    pub analyzer_args: Vec<String>,

    /// Analyzer configuration file. Default: checkstyle.xml. Relative paths resolve against the
    /// analyzed directory.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Flag that precedes the config file. Default: -c.
    #[arg(long, value_name = "FLAG", allow_hyphen_values = true)]
    pub config_flag: Option<String>,

    /// File extensions to analyze. Can specify multiple: --ext java kt
    #[arg(long = "ext", num_args = 1..)]
    pub extensions: Vec<String>,

    /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2 pattern3
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Maximum analyzer processes running at once. Default: 10.
    #[arg(long, short = 'j', value_parser = clap::value_parser!(usize))]
    pub concurrency: Option<usize>,

    /// Extra attempts for a file whose analyzer run fails. Default: 3.
    #[arg(long, value_parser = clap::value_parser!(u32))]
    pub retries: Option<u32>,

    /// Apply mechanical fixes for the findings.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub fix: Option<bool>,

    /// Commit changes and push the current branch to origin.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub push: Option<bool>,

    /// Commit message used with --push.
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Write the analysis report as JSON to FILE.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Verbose output and progress bar.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
