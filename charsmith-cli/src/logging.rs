//! Log output for one CLI invocation.

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Build the filter: `RUST_LOG` when set and valid, else `default_level`.
fn filter(default_level: &str, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(default_level).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

/// Install a stderr subscriber for the current thread.
///
/// Logging stays active until the returned guard is dropped, so stdout
/// carries only prompts and the rendered character.
#[must_use = "logging stops when the guard is dropped"]
pub fn init(default_level: &str) -> DefaultGuard {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let subscriber = tracing_subscriber::registry()
        .with(filter(default_level, rust_log.as_deref()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false));
    tracing::subscriber::set_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn configured_level_applies() {
        assert_eq!(filter("debug", None).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn rust_log_wins() {
        assert_eq!(filter("debug", Some("error")).max_level_hint(), Some(LevelFilter::ERROR));
    }
}
