//! Tracing subscriber setup for the `aap` binary.
use tracing_subscriber::EnvFilter;

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "AAP_LOG";

/// Install a stderr `fmt` subscriber.
///
/// The filter comes from `AAP_LOG`, then `RUST_LOG`, and defaults to `warn` so
/// merger warnings reach the user while per-request chatter stays hidden.
/// `debug` forces this crate to the debug level regardless of the environment.
pub fn init(debug: bool) {
    let directives = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let mut filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));
    if debug {
        if let Ok(directive) = format!("{}=debug", env!("CARGO_CRATE_NAME")).parse() {
            filter = filter.add_directive(directive);
        }
    }

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}
