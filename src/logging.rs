// 🪵 Logging
// tracing subscriber for the CLI and the server

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when RUST_LOG is unset.
pub const DEFAULT_FILTER: &str = "info,registrant_chart=info";

/// Installs the fmt subscriber on stderr so stdout stays free for program output.
/// Calling it twice is harmless; the second call is ignored.
pub fn init() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init();
        init();
        tracing::info!("logging initialised");
    }
}
