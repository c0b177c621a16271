//! Tracing subscriber setup for applications embedding the engine.

/// Install a fmt subscriber honoring `RUST_LOG`, defaulting to quiet GPU
/// internals so engine-level traces stay readable.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wgpu_core=warn,wgpu_hal=warn,naga=warn".into()),
        )
        .init();
}
