//! Validation for the presence, realtime, sequencer, and records sections.

use crate::schema::KingdomConfig;

use super::helpers::{validate_non_empty, validate_range};

/// Validate presence constraints.
pub(crate) fn validate_presence(errors: &mut Vec<String>, config: &KingdomConfig) {
    validate_non_empty(errors, "presence.collection", &config.presence.collection);
    if config.presence.collection.contains('/') {
        errors.push("presence.collection must be a single path segment".into());
    }
    validate_range(errors, "presence.ttl_secs", config.presence.ttl_secs, 10, 86_400);
    validate_range(
        errors,
        "presence.sweep_interval_secs",
        config.presence.sweep_interval_secs,
        1,
        3_600,
    );
}

/// Validate realtime connection constraints.
pub(crate) fn validate_realtime(errors: &mut Vec<String>, config: &KingdomConfig) {
    let rt = &config.realtime;
    validate_range(errors, "realtime.heartbeat_interval", rt.heartbeat_interval, 5, 120);
    validate_range(errors, "realtime.reconnect_delay", rt.reconnect_delay, 1, 60);
    validate_range(
        errors,
        "realtime.max_reconnect_delay",
        rt.max_reconnect_delay,
        1,
        600,
    );
    if rt.max_reconnect_delay < rt.reconnect_delay {
        errors.push(format!(
            "realtime.max_reconnect_delay = {} is below realtime.reconnect_delay = {}",
            rt.max_reconnect_delay, rt.reconnect_delay
        ));
    }
}

/// Validate sequencer constraints.
pub(crate) fn validate_sequencer(errors: &mut Vec<String>, config: &KingdomConfig) {
    validate_range(
        errors,
        "sequencer.transition_delay_ms",
        config.sequencer.transition_delay_ms,
        0,
        5_000,
    );
}

/// Validate record source constraints.
pub(crate) fn validate_records(errors: &mut Vec<String>, config: &KingdomConfig) {
    validate_non_empty(
        errors,
        "records.fallback_image",
        &config.records.fallback_image,
    );
}
