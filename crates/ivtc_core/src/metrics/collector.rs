use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, SendTimeoutError, Sender};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Match, Mics};
use crate::project::{Project, ProjectResult};

/// How long a blocked submit waits before checking for cancellation again.
const SUBMIT_POLL: Duration = Duration::from_millis(50);

/// Everything measured on one decoded frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameMetrics {
    pub frame: usize,
    pub mics: Option<Mics>,
    /// Match chosen by the field matcher.
    pub original_match: Option<Match>,
    pub decimate_metric: Option<i32>,
    pub combed: bool,
    /// The decimation filter dropped this frame.
    pub decimated: bool,
}

impl FrameMetrics {
    pub fn new(frame: usize) -> Self {
        Self {
            frame,
            ..Default::default()
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("metrics gathering was cancelled")]
    Cancelled,

    #[error("metrics collector is gone")]
    Disconnected,
}

/// Frames applied to and discarded from the project by one drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntakeReport {
    pub applied: usize,
    pub discarded: usize,
}

impl std::ops::AddAssign for IntakeReport {
    fn add_assign(&mut self, other: Self) {
        self.applied += other.applied;
        self.discarded += other.discarded;
    }
}

/// Handle to cancel metrics gathering from another thread.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Sinks refuse further submissions and queued results get discarded.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Worker side of the intake queue.
#[derive(Clone)]
pub struct MetricsSink {
    tx: Sender<FrameMetrics>,
    cancelled: Arc<AtomicBool>,
}

impl MetricsSink {
    /// Queue one frame's metrics, blocking while the queue is full.
    pub fn submit(&self, mut metrics: FrameMetrics) -> Result<(), SubmitError> {
        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                return Err(SubmitError::Cancelled);
            }
            match self.tx.send_timeout(metrics, SUBMIT_POLL) {
                Ok(()) => return Ok(()),
                Err(SendTimeoutError::Timeout(returned)) => metrics = returned,
                Err(SendTimeoutError::Disconnected(_)) => return Err(SubmitError::Disconnected),
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Control-thread side of the intake queue.
pub struct MetricsCollector {
    tx: Sender<FrameMetrics>,
    rx: Receiver<FrameMetrics>,
    cancelled: Arc<AtomicBool>,
}

impl MetricsCollector {
    /// Create a collector holding at most `capacity` unapplied frames.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = channel::bounded(capacity.max(1));
        Self {
            tx,
            rx,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a sink for a worker thread.
    pub fn sink(&self) -> MetricsSink {
        MetricsSink {
            tx: self.tx.clone(),
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Apply everything queued right now without waiting for more.
    pub fn apply_pending(&self, project: &mut Project) -> ProjectResult<IntakeReport> {
        let mut report = IntakeReport::default();
        for metrics in self.rx.try_iter() {
            report += apply_frame(project, &self.cancelled, metrics)?;
        }
        if report.applied + report.discarded > 0 {
            debug!(
                "Applied {} frames of metrics, discarded {}",
                report.applied, report.discarded
            );
        }
        Ok(report)
    }

    /// Apply results until every sink has been dropped.
    pub fn finish(self, project: &mut Project) -> ProjectResult<IntakeReport> {
        let Self { tx, rx, cancelled } = self;
        drop(tx);

        let collector_cancelled = cancelled.load(Ordering::SeqCst);
        let mut report = IntakeReport::default();
        for metrics in rx.iter() {
            report += apply_frame(project, &cancelled, metrics)?;
        }

        if collector_cancelled || cancelled.load(Ordering::SeqCst) {
            warn!(
                "Metrics gathering cancelled after {} frames ({} discarded)",
                report.applied, report.discarded
            );
        } else {
            info!("Metrics gathering finished: {} frames applied", report.applied);
        }
        Ok(report)
    }
}

fn apply_frame(
    project: &mut Project,
    cancelled: &AtomicBool,
    metrics: FrameMetrics,
) -> ProjectResult<IntakeReport> {
    let discarded = IntakeReport {
        applied: 0,
        discarded: 1,
    };
    if cancelled.load(Ordering::SeqCst) {
        return Ok(discarded);
    }
    if metrics.frame >= project.frame_count() {
        warn!(
            "Discarding metrics for frame {} (project has {} frames)",
            metrics.frame,
            project.frame_count()
        );
        return Ok(discarded);
    }

    let frame = metrics.frame;
    if let Some(mics) = metrics.mics {
        project.set_mics(frame, mics)?;
    }
    if let Some(m) = metrics.original_match {
        project.set_original_match(frame, m)?;
    }
    if let Some(metric) = metrics.decimate_metric {
        project.set_decimate_metric(frame, metric)?;
    }
    if metrics.combed {
        project.add_combed_frame(frame)?;
    }
    if metrics.decimated {
        project.add_decimated_frame(frame)?;
    }

    Ok(IntakeReport {
        applied: 1,
        discarded: 0,
    })
}
