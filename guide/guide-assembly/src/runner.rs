//! Case-level guide creation.

use guide_cache::BuildingBlockStore;
use tracing::{error, info};

use crate::creation::GuideCreation;
use crate::creator::GuideCreator;
use crate::qc::QcReporter;

/// Creates every guide of a case, one after another.
///
/// Each guide gets a fresh cache that is disposed before the next guide
/// starts, so no two runs ever touch the store at the same time.
///
/// # Example
///
/// ```
/// use guide_assembly::{CaseGuideRunner, CreationOptions, GuideCreator, NoQc};
/// use guide_cache::MemoryStore;
/// use guide_kernel::StubKernel;
/// use guide_types::GuideParameters;
///
/// let store = MemoryStore::new();
/// let kernel = StubKernel::new();
/// let params = GuideParameters::default();
/// let Ok(creator) = GuideCreator::new(&kernel, &params, CreationOptions::default()) else {
///     return;
/// };
///
/// let creations = CaseGuideRunner::new(creator, &NoQc).run(&store, 0..2);
/// assert_eq!(creations.len(), 2);
/// assert!(creations.iter().all(|c| !c.is_success()));
/// ```
pub struct CaseGuideRunner<'a> {
    creator: GuideCreator<'a>,
    qc: &'a dyn QcReporter,
}

impl<'a> CaseGuideRunner<'a> {
    /// Create a runner.
    #[must_use]
    pub const fn new(creator: GuideCreator<'a>, qc: &'a dyn QcReporter) -> Self {
        Self { creator, qc }
    }

    /// The creator used for every guide.
    #[must_use]
    pub const fn creator(&self) -> &GuideCreator<'a> {
        &self.creator
    }

    /// Create each guide in `guides`, in order.
    pub fn run(
        &self,
        store: &dyn BuildingBlockStore,
        guides: impl IntoIterator<Item = usize>,
    ) -> Vec<GuideCreation> {
        let creations: Vec<GuideCreation> = guides
            .into_iter()
            .map(|guide| {
                let creation = self.creator.create(store, guide, self.qc);
                if !creation.is_success() {
                    error!("{}", creation.summary());
                }
                creation
            })
            .collect();

        let created = creations.iter().filter(|c| c.is_success()).count();
        info!(
            guides = creations.len(),
            created,
            failed = creations.len() - created,
            "Case guides processed"
        );
        creations
    }
}
