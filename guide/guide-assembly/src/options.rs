//! Per-run creation options.

use guide_repair::RepairParams;

/// Switches that differ between production guides and previews.
///
/// # Example
///
/// ```
/// use guide_assembly::CreationOptions;
///
/// let production = CreationOptions::default();
/// assert!(production.filter_disjoint_pieces && production.fix_stl);
///
/// let preview = CreationOptions::preview();
/// assert!(!preview.filter_disjoint_pieces && !preview.fix_stl);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CreationOptions {
    /// Keep only the largest connected piece. Manufacturing needs one
    /// solid; previews may show several.
    pub filter_disjoint_pieces: bool,
    /// Run mesh repair. When off, the filtered shell must already be valid.
    pub fix_stl: bool,
    /// Repair settings.
    pub repair: RepairParams,
}

impl Default for CreationOptions {
    fn default() -> Self {
        Self {
            filter_disjoint_pieces: true,
            fix_stl: true,
            repair: RepairParams::default(),
        }
    }
}

impl CreationOptions {
    /// Options for previews: every piece kept, no repair.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            filter_disjoint_pieces: false,
            fix_stl: false,
            ..Self::default()
        }
    }

    /// Replace the repair settings.
    #[must_use]
    pub fn with_repair(mut self, repair: RepairParams) -> Self {
        self.repair = repair;
        self
    }

    /// Set whether only the largest piece is kept.
    #[must_use]
    pub const fn with_filter_disjoint_pieces(mut self, filter: bool) -> Self {
        self.filter_disjoint_pieces = filter;
        self
    }

    /// Set whether mesh repair runs.
    #[must_use]
    pub const fn with_fix_stl(mut self, fix: bool) -> Self {
        self.fix_stl = fix;
        self
    }
}
