//! Rate Limiting for the Form-Generation Endpoint
//!
//! GCRA-based limiting via tower_governor, keyed by peer IP. Form links
//! are cheap to mint but each one allocates a session, so the endpoint is
//! throttled to keep the in-memory store bounded.

use crate::settings::RateLimitSettings;
use governor::middleware::StateInformationMiddleware;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config with X-RateLimit-* response headers enabled
pub type FormGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Build the governor config for form generation
///
/// Requires the service to be started with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the peer IP
/// is available to the key extractor.
pub fn create_governor_config(settings: &RateLimitSettings) -> Arc<FormGovernorConfig> {
    Arc::new(
        GovernorConfigBuilder::default()
            .per_second(settings.per_second)
            .burst_size(settings.burst_size)
            .use_headers()
            .finish()
            .expect("rate limit settings must be non-zero"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_default_settings() {
        let governor = create_governor_config(&RateLimitSettings::default());
        assert!(Arc::strong_count(&governor) > 0);
    }
}
