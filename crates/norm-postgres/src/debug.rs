//! Debug trace gate controlled by the `NORM_DEBUG` environment variable.
//!
//! When `NORM_DEBUG` is `true`, `1` or `on` (case-insensitive), the router and
//! the cache layer print one trace line per decision to standard output.
//! Anything else, or an unset variable, keeps them silent. Error logs go
//! through `tracing` unconditionally and are not affected by this gate.

use once_cell::sync::Lazy;

static ENABLED: Lazy<bool> = Lazy::new(|| {
    match std::env::var("NORM_DEBUG") {
        Ok(v) => matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "on"),
        Err(_) => false,
    }
});

/// Whether debug tracing is on for this process.
pub fn enabled() -> bool {
    *ENABLED
}

/// Emit one routing trace line.
pub(crate) fn trace_route(table: &str, kind: &str, pool: &str) {
    if enabled() {
        println!("norm: route {} {} -> {}", kind, table, pool);
    }
}

/// Emit one join-plan trace line.
pub(crate) fn trace_plan(left: &str, right: &str, strategy: &str) {
    if enabled() {
        println!("norm: join {} x {} -> {}", left, right, strategy);
    }
}

/// Emit one cache trace line.
pub(crate) fn trace_cache(event: &str, key: &str) {
    if enabled() {
        println!("norm: cache {} {}", event, key);
    }
}
