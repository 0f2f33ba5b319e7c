//! Construction of the tracing dispatcher handed to `SubtitleFixer`.

use tracing::Dispatch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Builds a stderr subscriber. `RUST_LOG` wins over the `verbose` default.
pub fn dispatch(verbose: bool) -> Dispatch {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter);
    Dispatch::new(subscriber)
}

/// Subscriber for tests: captured by the test harness, warnings and above.
#[cfg(test)]
pub fn test_dispatch() -> Dispatch {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .finish();
    Dispatch::new(subscriber)
}
