use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Install the global logger: our crate at Info (Debug when `verbose`), dependencies at Warn.
/// `RUST_LOG` directives are parsed last, so they override these defaults.
pub fn setup_logging(verbose: bool) {
    let env_filters = std::env::var(env_logger::DEFAULT_FILTER_ENV).ok();
    let _ = log_builder(verbose, env_filters.as_deref()).try_init();
}

fn log_builder(verbose: bool, env_filters: Option<&str>) -> Builder {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level);
    if let Some(filters) = env_filters {
        builder.parse_filters(filters);
    }
    builder.format(|buf, record| {
        let name = env!("CARGO_PKG_NAME");
        let line = match record.level() {
            Level::Error | Level::Warn => {
                let level_str = match record.level() {
                    Level::Warn => "WARN".yellow(),
                    _ => "ERROR".red(),
                };
                let path = record.target().to_string().white();
                format!("[{} {} {}] {}", name.cyan(), level_str, path, record.args())
            }
            Level::Debug | Level::Trace => {
                format!("[{}] {}", name.cyan(), record.args().to_string().dimmed())
            }
            Level::Info => format!("[{}] {}", name.cyan(), record.args()),
        };
        writeln!(buf, "{}", line)
    });
    builder
}
