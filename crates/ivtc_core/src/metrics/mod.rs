//! Intake of per-frame metrics from decode workers.
//!
//! Decoding runs on worker threads, but the project may only be touched from
//! one thread. Workers push [`FrameMetrics`] through cloneable
//! [`MetricsSink`]s into a bounded channel; the control thread drains it with
//! [`MetricsCollector::apply_pending`] or [`MetricsCollector::finish`].
//!
//! Frames can arrive in any order. Cancelling stops further submissions and
//! discards whatever is still queued; frames already applied stay applied.

mod collector;

pub use collector::{
    CancelHandle, FrameMetrics, IntakeReport, MetricsCollector, MetricsSink, SubmitError,
};
