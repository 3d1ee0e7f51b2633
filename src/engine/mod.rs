//! Engine module: CLI parsing and handling, progress display, path helpers

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{handle_run, setup_opts};
pub use progress::ProgressDisplay;
pub use tools::{format_eta, glob_match, has_extension, is_excluded, resolve_program};
