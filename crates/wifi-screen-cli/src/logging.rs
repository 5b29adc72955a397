//! Subscriber setup from the `logging` config section.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use wifi_screen_core::config::LoggingConfig;

/// Filter directives when `RUST_LOG` is unset: base level, then per-crate overrides.
fn filter_directives(verbose: bool, logging: Option<&LoggingConfig>) -> String {
    let level = match logging.and_then(|l| l.level.as_deref()) {
        _ if verbose => "debug",
        Some(level) => level,
        None => "info",
    };

    let mut directives = vec![level.to_string()];
    if let Some(logging) = logging {
        directives.extend(logging.filters.iter().cloned());
    }
    directives.join(",")
}

pub fn init(verbose: bool, logging: Option<&LoggingConfig>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(verbose, logging)));

    let json = logging.is_some_and(|l| l.format == "json");
    let stdout = logging.is_some_and(|l| l.output == "stdout");

    let layer = match (json, stdout) {
        (true, true) => fmt::layer().json().with_writer(std::io::stdout).boxed(),
        (true, false) => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        (false, true) => fmt::layer().with_writer(std::io::stdout).boxed(),
        (false, false) => fmt::layer().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
}
