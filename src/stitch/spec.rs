//! Join configuration.

use crate::image::BLACK;
use crate::seam::SeamSearch;

/// Direction in which fragments are stacked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Top to bottom; fragments share their width.
    #[default]
    Vertical,
    /// Left to right; fragments share their height.
    Horizontal,
}

/// Pixels shared by adjacent fragments.
///
/// Only the larger amount takes effect. A winning forward overlap draws the
/// later fragment back over the earlier one; a winning reverse overlap keeps
/// the earlier fragment's tail and clips the later fragment's head instead.
/// Either way each seam removes the same number of pixels from the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Overlap {
    pub forward: usize,
    pub reverse: usize,
}

impl Overlap {
    /// Forward-only overlap.
    pub fn forward(amount: usize) -> Self {
        Self {
            forward: amount,
            reverse: 0,
        }
    }

    /// Reverse-only overlap.
    pub fn reverse(amount: usize) -> Self {
        Self {
            forward: 0,
            reverse: amount,
        }
    }

    /// Pixels removed per seam.
    pub fn winning(&self) -> usize {
        self.forward.max(self.reverse)
    }

    /// True when the reverse amount is strictly larger.
    pub fn reverse_wins(&self) -> bool {
        self.reverse > self.forward
    }
}

/// Geometry of one stitch operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JoinSpec {
    /// Stacking direction.
    pub orientation: Orientation,
    /// Overlap between adjacent fragments.
    pub overlap: Overlap,
    /// Shift across the seam applied to every fragment after the first.
    pub offset: i64,
    /// Filler pixels inserted between adjacent fragments.
    pub spacing: usize,
    /// Color of spacing bands and uncovered canvas.
    pub fill: [u8; 3],
    /// Center fragments whose cross dimension differs instead of failing.
    pub force: bool,
    /// Trim each later fragment at the seam found by this search.
    pub seam_search: Option<SeamSearch>,
}

impl Default for JoinSpec {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            overlap: Overlap::default(),
            offset: 0,
            spacing: 0,
            fill: BLACK,
            force: false,
            seam_search: None,
        }
    }
}

impl JoinSpec {
    /// Top-to-bottom join with no adjustments.
    pub fn vertical() -> Self {
        Self::default()
    }

    /// Left-to-right join with no adjustments.
    pub fn horizontal() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            ..Self::default()
        }
    }

    /// Sets the stacking direction.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets both overlap amounts.
    pub fn with_overlap(mut self, overlap: Overlap) -> Self {
        self.overlap = overlap;
        self
    }

    /// Sets the shift across the seam.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the spacing between fragments.
    pub fn with_spacing(mut self, spacing: usize) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets the fill color.
    pub fn with_fill(mut self, fill: [u8; 3]) -> Self {
        self.fill = fill;
        self
    }

    /// Enables or disables force-fit centering.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Enables seam trimming.
    pub fn with_seam_search(mut self, search: SeamSearch) -> Self {
        self.seam_search = Some(search);
        self
    }
}
