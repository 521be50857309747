//! Guide-creation parameters.
//!
//! [`GuideParameters`] is loaded once per guide-creation run and passed by
//! reference to every stage; nothing mutates it mid-pipeline.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParamsError, ParamsResult};

/// Lightweight lattice sweep settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatticeParams {
    /// Radius of the swept lattice segments in mm.
    pub segment_radius: f64,
    /// Target triangle edge length as a fraction of the segment spacing.
    /// Must lie in `(0, 1]`.
    pub edge_length_fraction: f64,
}

impl Default for LatticeParams {
    fn default() -> Self {
        Self {
            segment_radius: 0.4,
            edge_length_fraction: 0.6,
        }
    }
}

/// Remesh thresholds used when rebuilding link protection volumes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemeshParams {
    /// Minimum edge length in mm.
    pub min_edge_length: f64,
    /// Maximum edge length in mm.
    pub max_edge_length: f64,
    /// Maximum allowed growth between neighbouring edges.
    pub growth_threshold: f64,
    /// Maximum geometric deviation in mm.
    pub geometric_error: f64,
    /// Minimum triangle quality in `[0, 1]`.
    pub quality_threshold: f64,
    /// Keep sharp edges during remeshing.
    pub preserve_sharp_edges: bool,
    /// Number of remesh iterations.
    pub iterations: u32,
}

impl Default for RemeshParams {
    fn default() -> Self {
        Self {
            min_edge_length: 0.1,
            max_edge_length: 0.6,
            growth_threshold: 0.2,
            geometric_error: 0.05,
            quality_threshold: 0.3,
            preserve_sharp_edges: true,
            iterations: 3,
        }
    }
}

/// Smoothing settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmoothParams {
    /// Smoothing factor per iteration in `[0, 1]`.
    pub factor: f64,
    /// Number of smoothing iterations.
    pub iterations: u32,
    /// Keep border vertices fixed.
    pub preserve_borders: bool,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self {
            factor: 0.7,
            iterations: 3,
            preserve_borders: true,
        }
    }
}

/// Quality-preserving triangle reduction settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReductionParams {
    /// Target triangle quality in `[0, 1]`.
    pub quality: f64,
    /// Maximum geometric error introduced by a pass, in mm.
    pub max_geometric_error: f64,
    /// Whether to cap edge lengths.
    pub check_max_edge: bool,
    /// Maximum edge length when `check_max_edge` is set.
    pub max_edge_length: f64,
    /// Kernel iterations inside one reduction call.
    pub iterations: u32,
    /// Skip edges the kernel flags as bad instead of failing on them.
    pub skip_bad_edges: bool,
    /// Keep open borders fixed.
    pub preserve_borders: bool,
    /// Number of reduction passes during base-surface construction.
    pub passes: u32,
}

impl Default for ReductionParams {
    fn default() -> Self {
        Self {
            quality: 0.5,
            max_geometric_error: 0.05,
            check_max_edge: true,
            max_edge_length: 1.0,
            iterations: 10,
            skip_bad_edges: false,
            preserve_borders: true,
            passes: 3,
        }
    }
}

/// Optional smooth transition between barrels/eyes and the lattice.
///
/// Disabled unless both values are positive.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransitionParams {
    /// Transition fillet radius in mm.
    pub radius: f64,
    /// Gap-closing distance of the region-of-interest wrap, in mm.
    pub gap_closing_distance: f64,
}

impl TransitionParams {
    /// Whether transitions should be synthesized.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.radius > 0.0 && self.gap_closing_distance > 0.0
    }
}

/// Floating-entity connector settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectorParams {
    /// Search radius around an entity centroid, in mm.
    pub search_radius: f64,
    /// Radius of the swept connector tube, in mm.
    pub tube_radius: f64,
}

impl Default for ConnectorParams {
    fn default() -> Self {
        Self {
            search_radius: 2.0,
            tube_radius: 0.4,
        }
    }
}

/// Fillet applied where a marking barrel meets the guide.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BarrelFilletParams {
    /// Fillet radius in mm.
    pub radius: f64,
    /// Fillet tolerance in mm.
    pub tolerance: f64,
}

impl Default for BarrelFilletParams {
    fn default() -> Self {
        Self {
            radius: 0.3,
            tolerance: 0.01,
        }
    }
}

/// Complete parameter set for one guide-creation run.
///
/// # Example
///
/// ```
/// use guide_types::GuideParameters;
///
/// let params = GuideParameters::default()
///     .with_isocurve_spacing(0.8)
///     .with_transition(0.5, 1.0);
///
/// assert!(params.validate().is_ok());
/// assert!(params.transition.is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GuideParameters {
    /// Spacing of interior isocurves on compensated guide surfaces, in mm.
    pub isocurve_spacing: f64,
    /// Shells with surface area below this are treated as noise.
    pub noise_shell_threshold: f64,
    /// Lattice sweep settings.
    pub lattice: LatticeParams,
    /// Remesh thresholds.
    pub remesh: RemeshParams,
    /// Smoothing settings.
    pub smooth: SmoothParams,
    /// Reduction settings.
    pub reduction: ReductionParams,
    /// Optional barrel/eye transitions.
    pub transition: TransitionParams,
    /// Connector settings.
    pub connector: ConnectorParams,
    /// Marking-barrel fillet settings.
    pub barrel_fillet: BarrelFilletParams,
    /// Extra margin added to the link protection offset, in mm.
    pub link_protection_margin: f64,
    /// Offset applied when wrapping teeth blocks before splitting bridges.
    /// Negative values sit the wrap slightly inside the block.
    pub teeth_wrap_offset: f64,
    /// Inward offset of the solid-surface union subtracted at the seam, in mm.
    pub solid_seam_offset: f64,
    /// Smallest detail preserved by wrap operations, in mm.
    pub wrap_smallest_detail: f64,
    /// Gap-closing distance of general-purpose wraps, in mm.
    pub wrap_gap_closing_distance: f64,
}

impl Default for GuideParameters {
    fn default() -> Self {
        Self {
            isocurve_spacing: 0.5,
            noise_shell_threshold: 1.0,
            lattice: LatticeParams::default(),
            remesh: RemeshParams::default(),
            smooth: SmoothParams::default(),
            reduction: ReductionParams::default(),
            transition: TransitionParams::default(),
            connector: ConnectorParams::default(),
            barrel_fillet: BarrelFilletParams::default(),
            link_protection_margin: 0.5,
            teeth_wrap_offset: -0.05,
            solid_seam_offset: 0.2,
            wrap_smallest_detail: 0.2,
            wrap_gap_closing_distance: 0.2,
        }
    }
}

impl GuideParameters {
    /// Parameters tuned for fast previews: a single reduction pass and a
    /// single remesh iteration.
    #[must_use]
    pub fn preview() -> Self {
        let mut params = Self::default();
        params.reduction.passes = 1;
        params.remesh.iterations = 1;
        params.smooth.iterations = 1;
        params
    }

    /// Set the isocurve spacing.
    #[must_use]
    pub const fn with_isocurve_spacing(mut self, spacing: f64) -> Self {
        self.isocurve_spacing = spacing;
        self
    }

    /// Set the lattice segment radius and edge-length fraction.
    #[must_use]
    pub const fn with_lattice(mut self, segment_radius: f64, edge_length_fraction: f64) -> Self {
        self.lattice.segment_radius = segment_radius;
        self.lattice.edge_length_fraction = edge_length_fraction;
        self
    }

    /// Enable barrel/eye transitions.
    #[must_use]
    pub const fn with_transition(mut self, radius: f64, gap_closing_distance: f64) -> Self {
        self.transition.radius = radius;
        self.transition.gap_closing_distance = gap_closing_distance;
        self
    }

    /// Set the number of base-surface reduction passes.
    #[must_use]
    pub const fn with_reduction_passes(mut self, passes: u32) -> Self {
        self.reduction.passes = passes;
        self
    }

    /// Set the connector search radius.
    #[must_use]
    pub const fn with_connector_search_radius(mut self, radius: f64) -> Self {
        self.connector.search_radius = radius;
        self
    }

    /// Offset that shields link surfaces from cut slots:
    /// `2 × lattice radius + margin`.
    #[must_use]
    pub fn link_protection_offset(&self) -> f64 {
        2.0f64.mul_add(self.lattice.segment_radius, self.link_protection_margin)
    }

    /// Check every value for physical plausibility.
    ///
    /// # Errors
    ///
    /// Returns the first offending parameter.
    pub fn validate(&self) -> ParamsResult<()> {
        positive("isocurve_spacing", self.isocurve_spacing)?;
        positive("lattice.segment_radius", self.lattice.segment_radius)?;
        in_range(
            "lattice.edge_length_fraction",
            self.lattice.edge_length_fraction,
            f64::MIN_POSITIVE,
            1.0,
        )?;
        non_negative("noise_shell_threshold", self.noise_shell_threshold)?;
        positive("remesh.max_edge_length", self.remesh.max_edge_length)?;
        if self.remesh.min_edge_length > self.remesh.max_edge_length {
            return Err(ParamsError::Inconsistent {
                details: format!(
                    "remesh.min_edge_length {} exceeds remesh.max_edge_length {}",
                    self.remesh.min_edge_length, self.remesh.max_edge_length
                ),
            });
        }
        in_range("remesh.quality_threshold", self.remesh.quality_threshold, 0.0, 1.0)?;
        in_range("smooth.factor", self.smooth.factor, 0.0, 1.0)?;
        in_range("reduction.quality", self.reduction.quality, 0.0, 1.0)?;
        non_negative("reduction.max_geometric_error", self.reduction.max_geometric_error)?;
        non_negative("transition.radius", self.transition.radius)?;
        non_negative(
            "transition.gap_closing_distance",
            self.transition.gap_closing_distance,
        )?;
        positive("connector.search_radius", self.connector.search_radius)?;
        positive("connector.tube_radius", self.connector.tube_radius)?;
        positive("barrel_fillet.radius", self.barrel_fillet.radius)?;
        non_negative("barrel_fillet.tolerance", self.barrel_fillet.tolerance)?;
        non_negative("link_protection_margin", self.link_protection_margin)?;
        non_negative("solid_seam_offset", self.solid_seam_offset)?;
        positive("wrap_smallest_detail", self.wrap_smallest_detail)?;
        non_negative("wrap_gap_closing_distance", self.wrap_gap_closing_distance)?;
        if !self.teeth_wrap_offset.is_finite() {
            return Err(ParamsError::NotFinite {
                name: "teeth_wrap_offset",
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> ParamsResult<()> {
    if !value.is_finite() {
        return Err(ParamsError::NotFinite { name });
    }
    if value <= 0.0 {
        return Err(ParamsError::NotPositive { name, value });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> ParamsResult<()> {
    if !value.is_finite() {
        return Err(ParamsError::NotFinite { name });
    }
    if value < 0.0 {
        return Err(ParamsError::Negative { name, value });
    }
    Ok(())
}

fn in_range(name: &'static str, value: f64, min: f64, max: f64) -> ParamsResult<()> {
    if !value.is_finite() {
        return Err(ParamsError::NotFinite { name });
    }
    if value < min || value > max {
        return Err(ParamsError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_validate() {
        assert!(GuideParameters::default().validate().is_ok());
        assert!(GuideParameters::preview().validate().is_ok());
    }

    #[test]
    fn transition_disabled_by_default() {
        let params = GuideParameters::default();
        assert!(!params.transition.is_enabled());
        assert!(!params.clone().with_transition(0.5, 0.0).transition.is_enabled());
        assert!(params.with_transition(0.5, 1.0).transition.is_enabled());
    }

    #[test]
    fn link_protection_offset_uses_lattice_radius() {
        let params = GuideParameters::default().with_lattice(0.4, 0.5);
        assert_relative_eq!(params.link_protection_offset(), 1.3, epsilon = 1e-12);
    }

    #[test]
    fn rejects_bad_lattice() {
        let err = GuideParameters::default().with_lattice(0.0, 0.5).validate();
        assert!(matches!(
            err,
            Err(ParamsError::NotPositive {
                name: "lattice.segment_radius",
                ..
            })
        ));

        let err = GuideParameters::default().with_lattice(0.4, 1.5).validate();
        assert!(matches!(err, Err(ParamsError::OutOfRange { .. })));

        let err = GuideParameters::default().with_lattice(0.4, 0.0).validate();
        assert!(matches!(err, Err(ParamsError::OutOfRange { .. })));
    }

    #[test]
    fn rejects_non_finite_and_inconsistent_values() {
        let err = GuideParameters::default()
            .with_isocurve_spacing(f64::NAN)
            .validate();
        assert!(matches!(err, Err(ParamsError::NotFinite { .. })));

        let mut params = GuideParameters::default();
        params.remesh.min_edge_length = 2.0;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::Inconsistent { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn parameters_load_from_preferences_json() {
        let json = serde_json::to_string(&GuideParameters::preview()).unwrap_or_default();
        let loaded: Option<GuideParameters> = serde_json::from_str(&json).ok();
        assert_eq!(loaded, Some(GuideParameters::preview()));
    }
}
