//! Telemetry helpers for structured logging.

/// Install a default `tracing` subscriber if none is set.
///
/// Filtering follows `RUST_LOG`; use `RUST_LOG=prometheus_admission=debug`
/// to see per-sweep summaries. Applications with their own subscriber do
/// not need to call this.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_names(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_repeatable() {
        init_tracing();
        init_tracing();
        tracing::debug!("telemetry initialised");
    }
}
