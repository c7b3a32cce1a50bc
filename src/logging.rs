use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize logging for the CLI.
///
/// Defaults to `info` level unless overridden by `CAPGEN_LOG`. Pipeline
/// progress goes through this stream; the final one-line outcome is printed
/// separately by the frontend.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_env_var("CAPGEN_LOG")
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
