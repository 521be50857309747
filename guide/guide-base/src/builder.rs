//! Base-surface builder.

use guide_kernel::GeometryKernel;
use guide_types::{GuideParameters, IndexedMesh};
use tracing::{debug, info, warn};

use crate::error::{BaseSurfaceError, BaseSurfaceResult};

/// Result of a base-surface build.
#[derive(Debug, Clone)]
pub struct BaseSurface {
    /// The lightweight lattice shell everything else is unioned onto.
    pub lattice: IndexedMesh,
    /// The compensated, reduced surface the lattice was swept along.
    pub compact: IndexedMesh,
    /// Pieces that survived noise removal.
    pub pieces: usize,
    /// Shells dropped as noise.
    pub noise_shells_removed: usize,
    /// Reduction passes that succeeded.
    pub reduction_passes: u32,
}

/// Turns raw, possibly disjoint guide surface patches into one lattice
/// shell.
///
/// 1. Shells below the noise threshold are dropped.
/// 2. Every remaining piece is compensated to the isocurve spacing. Any
///    failure aborts the build.
/// 3. Up to `reduction.passes` quality-preserving reductions run. A failed
///    pass ends reduction and keeps the current mesh.
/// 4. The compact surface is swept into a lightweight lattice.
///
/// # Example
///
/// ```
/// use guide_base::GuideBaseSurfaceBuilder;
/// use guide_kernel::StubKernel;
/// use guide_types::{GuideParameters, IndexedMesh, Point3};
///
/// let patch = IndexedMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(4.0, 0.0, 0.0),
///         Point3::new(0.0, 4.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
///
/// let kernel = StubKernel::new();
/// let params = GuideParameters::default();
/// let base = GuideBaseSurfaceBuilder::new(&kernel, &params).build(&[patch]);
/// assert!(base.is_ok());
/// ```
pub struct GuideBaseSurfaceBuilder<'a> {
    kernel: &'a dyn GeometryKernel,
    params: &'a GuideParameters,
}

impl<'a> GuideBaseSurfaceBuilder<'a> {
    /// Create a builder.
    #[must_use]
    pub const fn new(kernel: &'a dyn GeometryKernel, params: &'a GuideParameters) -> Self {
        Self { kernel, params }
    }

    /// Build the base shell from the guide surfaces.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to build from, if compensation
    /// fails for any piece, or if the lattice sweep fails.
    pub fn build(&self, surfaces: &[IndexedMesh]) -> BaseSurfaceResult<BaseSurface> {
        let combined = IndexedMesh::concat(surfaces);
        if combined.is_empty() {
            return Err(BaseSurfaceError::EmptyInput);
        }

        let threshold = self.params.noise_shell_threshold;
        let shells = self.kernel.split_disjoint(&combined);
        let total = shells.len();
        let pieces: Vec<IndexedMesh> = shells
            .into_iter()
            .filter(|s| s.surface_area() >= threshold)
            .collect();
        let noise_shells_removed = total - pieces.len();
        if pieces.is_empty() {
            return Err(BaseSurfaceError::OnlyNoise { threshold });
        }
        debug!(pieces = pieces.len(), noise_shells_removed, "Guide surface pieces");

        let compensated = pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| {
                self.kernel
                    .compensate_surface(piece, self.params.isocurve_spacing)
                    .ok_or(BaseSurfaceError::CompensationFailed {
                        piece: i,
                        pieces: pieces.len(),
                    })
            })
            .collect::<BaseSurfaceResult<Vec<_>>>()?;

        let (compact, reduction_passes) = self.reduce(IndexedMesh::concat(&compensated));

        let lattice = self
            .kernel
            .lightweight_lattice(&compact, &self.params.lattice)
            .filter(|m| !m.is_empty())
            .ok_or(BaseSurfaceError::LatticeFailed)?;

        info!(
            pieces = pieces.len(),
            reduction_passes,
            faces = lattice.face_count(),
            "Built guide base surface"
        );
        Ok(BaseSurface {
            lattice,
            compact,
            pieces: pieces.len(),
            noise_shells_removed,
            reduction_passes,
        })
    }

    fn reduce(&self, mut mesh: IndexedMesh) -> (IndexedMesh, u32) {
        let passes = self.params.reduction.passes;
        for pass in 0..passes {
            match self
                .kernel
                .quality_preserving_reduce(&mesh, &self.params.reduction)
            {
                Some(reduced) => mesh = reduced,
                None => {
                    warn!(pass, passes, "Reduction pass failed, keeping the current surface");
                    return (mesh, pass);
                }
            }
        }
        (mesh, passes)
    }
}
