//! Quality-control boundary for failed barrels.

use std::cell::RefCell;

use guide_types::ScrewId;

/// Receives failed barrels once a guide-creation run has ended.
///
/// The creator calls [`flag_barrel_error`](Self::flag_barrel_error) and
/// then [`recheck_screw`](Self::recheck_screw) for every barrel that took
/// the degraded path, whether the run succeeded or not.
pub trait QcReporter {
    /// Persist a guide-creation-error flag on the barrel of `screw`.
    fn flag_barrel_error(&self, screw: ScrewId);

    /// Re-run the barrel-type dependent checks of `screw`.
    fn recheck_screw(&self, screw: ScrewId);
}

/// Ignores every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQc;

impl QcReporter for NoQc {
    fn flag_barrel_error(&self, _screw: ScrewId) {}

    fn recheck_screw(&self, _screw: ScrewId) {}
}

/// A recorded QC call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QcEvent {
    /// [`QcReporter::flag_barrel_error`] was called.
    BarrelFlagged(ScrewId),
    /// [`QcReporter::recheck_screw`] was called.
    ScrewRechecked(ScrewId),
}

/// Records QC calls in order.
///
/// # Example
///
/// ```
/// use guide_assembly::{QcEvent, QcLog, QcReporter};
/// use guide_types::ScrewId;
///
/// let log = QcLog::new();
/// log.flag_barrel_error(ScrewId(2));
/// log.recheck_screw(ScrewId(2));
///
/// assert_eq!(log.flagged(), vec![ScrewId(2)]);
/// assert_eq!(log.events()[1], QcEvent::ScrewRechecked(ScrewId(2)));
/// ```
#[derive(Debug, Default)]
pub struct QcLog {
    events: RefCell<Vec<QcEvent>>,
}

impl QcLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call.
    #[must_use]
    pub fn events(&self) -> Vec<QcEvent> {
        self.events.borrow().clone()
    }

    /// Screws whose barrel was flagged, in call order.
    #[must_use]
    pub fn flagged(&self) -> Vec<ScrewId> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                QcEvent::BarrelFlagged(screw) => Some(*screw),
                QcEvent::ScrewRechecked(_) => None,
            })
            .collect()
    }
}

impl QcReporter for QcLog {
    fn flag_barrel_error(&self, screw: ScrewId) {
        self.events.borrow_mut().push(QcEvent::BarrelFlagged(screw));
    }

    fn recheck_screw(&self, screw: ScrewId) {
        self.events.borrow_mut().push(QcEvent::ScrewRechecked(screw));
    }
}
