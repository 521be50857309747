//! Wrap operation parameters.

/// Parameters for [`GeometryKernel::wrap`](crate::GeometryKernel::wrap).
///
/// A wrap reconstructs a closed, manifold envelope around its inputs,
/// closing gaps up to `gap_closing_distance` and offsetting the result by
/// `offset` (negative values shrink it).
///
/// # Example
///
/// ```
/// use guide_kernel::WrapParams;
///
/// let params = WrapParams::new(0.2, 0.5)
///     .with_offset(-0.05)
///     .preserving_surfaces();
/// assert!(params.preserve_surfaces);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WrapParams {
    /// Smallest detail kept by the wrap, in mm.
    pub smallest_detail: f64,
    /// Largest gap that is closed, in mm.
    pub gap_closing_distance: f64,
    /// Offset of the envelope, in mm.
    pub offset: f64,
    /// Avoid collapsing walls thinner than the detail size.
    pub protect_thin_walls: bool,
    /// Reduce the triangle count of the result.
    pub reduce_triangles: bool,
    /// Keep sharp features of the input.
    pub preserve_sharp_features: bool,
    /// Keep flat input surfaces intact.
    pub preserve_surfaces: bool,
}

impl WrapParams {
    /// Wrap with the given detail and gap-closing distance, no offset.
    #[must_use]
    pub const fn new(smallest_detail: f64, gap_closing_distance: f64) -> Self {
        Self {
            smallest_detail,
            gap_closing_distance,
            offset: 0.0,
            protect_thin_walls: false,
            reduce_triangles: true,
            preserve_sharp_features: false,
            preserve_surfaces: false,
        }
    }

    /// Set the envelope offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Keep thin walls from collapsing.
    #[must_use]
    pub const fn protecting_thin_walls(mut self) -> Self {
        self.protect_thin_walls = true;
        self
    }

    /// Keep sharp features.
    #[must_use]
    pub const fn preserving_sharp_features(mut self) -> Self {
        self.preserve_sharp_features = true;
        self
    }

    /// Keep flat surfaces.
    #[must_use]
    pub const fn preserving_surfaces(mut self) -> Self {
        self.preserve_surfaces = true;
        self
    }
}
