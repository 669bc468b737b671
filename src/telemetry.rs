//! Opt-in tracing setup for hosts embedding the cache.
//!
//! The library itself only emits `tracing` events (cache hits, gap fetches,
//! degraded storage); it never installs a subscriber. The `telemetry`
//! feature adds a convenience initializer for tools and quick diagnostics.

/// Installs a compact global `tracing` subscriber filtered by `RUST_LOG`,
/// defaulting to the `info` level.
///
/// Returns whether this call installed the subscriber: `false` when the
/// `telemetry` feature is disabled or the host already set one.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
