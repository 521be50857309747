//! Telemetry seam for repeated kernel failures.

use std::cell::RefCell;

use guide_kernel::KernelOp;

/// Receives an event for every failed kernel attempt worth reporting.
pub trait Telemetry {
    /// `op` failed on its `attempt`-th try (1-based).
    fn kernel_failure(&self, op: KernelOp, attempt: u32, detail: &str);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTelemetry;

impl Telemetry for NoTelemetry {
    fn kernel_failure(&self, _op: KernelOp, _attempt: u32, _detail: &str) {}
}

/// One recorded kernel failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEvent {
    /// The failing operation.
    pub op: KernelOp,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Failure detail.
    pub detail: String,
}

/// Keeps every event in memory, in order.
///
/// # Example
///
/// ```
/// use guide_kernel::KernelOp;
/// use guide_repair::{Telemetry, TelemetryLog};
///
/// let log = TelemetryLog::new();
/// log.kernel_failure(KernelOp::QualityPreservingReduce, 1, "no mesh");
/// assert_eq!(log.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TelemetryLog {
    events: RefCell<Vec<TelemetryEvent>>,
}

impl TelemetryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.borrow().clone()
    }
}

impl Telemetry for TelemetryLog {
    fn kernel_failure(&self, op: KernelOp, attempt: u32, detail: &str) {
        self.events.borrow_mut().push(TelemetryEvent {
            op,
            attempt,
            detail: detail.to_owned(),
        });
    }
}
