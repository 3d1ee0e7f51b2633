pub mod config;
pub mod fd_limit;
pub mod lintpipe_toml;
pub mod logger;

pub use config::*;
pub use fd_limit::{FDS_PER_ANALYZER, cap_concurrency, max_concurrency_by_fd_limit, max_open_fds};
pub use logger::setup_logging;
