//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet.

/// Emit one line per (symbol, timeframe) as the scanner works through them.
pub const PRINT_SCAN_PROGRESS: bool = false;

/// Emit every divergence candidate considered (current swing, chosen reference, verdict).
pub const PRINT_DIVERGENCE_CANDIDATES: bool = false;

/// Emit each cluster as it closes during the confluence walk.
pub const PRINT_CLUSTER_WALK: bool = false;

/// Emit provider request details (pages fetched, rate-limit headroom).
pub const PRINT_PROVIDER_CALLS: bool = false;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_off_by_default() {
        let flags = [
            PRINT_SCAN_PROGRESS,
            PRINT_DIVERGENCE_CANDIDATES,
            PRINT_CLUSTER_WALK,
            PRINT_PROVIDER_CALLS,
        ];
        assert!(flags.iter().all(|on| !on));
    }
}
