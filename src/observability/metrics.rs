//! Metrics collection.
//!
//! # Responsibilities
//! - Define bridge metrics (dispatch outcomes, latency, in-flight work)
//! - Record through the `metrics` facade; the host installs the exporter
//!
//! # Metrics
//! - `bridge_dispatch_total` (counter): dispatches by outcome
//! - `bridge_dispatch_duration_seconds` (histogram): dispatch latency
//! - `bridge_in_flight` (gauge): dispatches currently running in the service
//! - `bridge_frames_rejected_total` (counter): undecodable frames by reason
//!
//! # Design Decisions
//! - Low-overhead metric updates (no-ops until a recorder is installed)
//! - Labels are fixed strings; route names are not used as labels because
//!   unknown routes come from the peer

use std::time::Duration;

/// Record one finished dispatch.
pub fn record_dispatch(outcome: &'static str, elapsed: Duration) {
    ::metrics::counter!("bridge_dispatch_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("bridge_dispatch_duration_seconds").record(elapsed.as_secs_f64());
}

/// Update the number of dispatches currently running.
pub fn record_in_flight(count: usize) {
    ::metrics::gauge!("bridge_in_flight").set(count as f64);
}

/// Record a frame the line codec could not accept.
pub fn record_frame_rejected(reason: &'static str) {
    ::metrics::counter!("bridge_frames_rejected_total", "reason" => reason).increment(1);
}
