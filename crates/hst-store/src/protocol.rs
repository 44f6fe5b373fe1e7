//! Axis configuration protocol.
//!
//! A `D`-dimensional histogram is configured by exactly `D` axis
//! definitions. The protocol counts them down: the k-th accepted
//! definition (0-based) configures axis k, so callers always define X
//! first, then Y, then Z. Every definition resizes the histogram's
//! storage to the product of the cell counts of the axes configured so
//! far and zeroes it, which is why configuration has to be finished before
//! the first fill.

use hst_hist::{total_cells, AxisSpec, HistError, HistResult, Histogram};
use tracing::{debug, trace};

/// Initialization counter for a `D`-dimensional histogram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxisProtocol<const D: usize> {
    remaining: usize,
}

impl<const D: usize> Default for AxisProtocol<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> AxisProtocol<D> {
    /// A fresh counter expecting `D` definitions.
    pub fn new() -> Self {
        Self { remaining: D }
    }

    /// Number of axis definitions still expected.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Returns `true` once all `D` axes are defined.
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Index of the axis the next definition applies to.
    pub fn next_axis(&self) -> Option<usize> {
        (self.remaining > 0).then(|| D - self.remaining)
    }

    /// Apply `spec` to the next undefined axis of `hist`.
    ///
    /// Returns `Ok(false)` without touching `hist` when every axis is
    /// already defined.
    pub fn define(&mut self, hist: &mut Histogram<D>, spec: &AxisSpec) -> HistResult<bool> {
        let Some(index) = self.next_axis() else {
            trace!(title = %hist.title(), "histogram already configured; axis definition ignored");
            return Ok(false);
        };

        let cells = total_cells(&hist.axes()[..index])?
            .checked_mul(spec.cells())
            .ok_or(HistError::TooManyCells)?;
        hist.set_axis(index, spec)?;
        hist.set_bins_length(cells);
        hist.reset();
        self.remaining -= 1;

        debug!(
            title = %hist.title(),
            axis = index,
            bins = spec.bins(),
            cells,
            remaining = self.remaining,
            "axis defined"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hst_hist::Axis;

    fn uniform(bins: u32) -> AxisSpec {
        AxisSpec::uniform(bins, 0.0, 1.0, "").unwrap()
    }

    #[test]
    fn counts_down_from_dimensions() {
        let mut protocol = AxisProtocol::<3>::new();
        let mut hist = Histogram::<3>::new();
        assert_eq!(protocol.remaining(), 3);
        assert_eq!(protocol.next_axis(), Some(0));

        assert!(protocol.define(&mut hist, &uniform(4)).unwrap());
        assert_eq!(protocol.next_axis(), Some(1));
        assert!(protocol.define(&mut hist, &uniform(5)).unwrap());
        assert_eq!(protocol.next_axis(), Some(2));
        assert!(!protocol.is_complete());
        assert!(protocol.define(&mut hist, &uniform(6)).unwrap());

        assert!(protocol.is_complete());
        assert_eq!(protocol.next_axis(), None);
    }

    #[test]
    fn axes_are_configured_x_then_y_then_z() {
        let mut protocol = AxisProtocol::<3>::new();
        let mut hist = Histogram::<3>::new();
        for bins in [2, 3, 4] {
            protocol.define(&mut hist, &uniform(bins)).unwrap();
        }
        let bins: Vec<usize> = hist.axes().iter().map(Axis::bins).collect();
        assert_eq!(bins, vec![2, 3, 4]);
    }

    #[test]
    fn storage_tracks_configured_axes() {
        let mut protocol = AxisProtocol::<2>::new();
        let mut hist = Histogram::<2>::new();

        protocol.define(&mut hist, &uniform(10)).unwrap();
        assert_eq!(hist.cell_count(), 12);

        protocol.define(&mut hist, &uniform(3)).unwrap();
        assert_eq!(hist.cell_count(), 12 * 5);
        assert_eq!(hist.cell_count(), hist.expected_cell_count().unwrap());
    }

    #[test]
    fn overflowing_cell_count_is_rejected() {
        let huge = AxisSpec::uniform(u32::MAX, 0.0, 1.0, "").unwrap();
        // X already defined, without allocating its storage
        let mut hist = Histogram::<2>::new();
        hist.set_axis(0, &huge).unwrap();
        let mut protocol = AxisProtocol::<2> { remaining: 1 };

        assert_eq!(protocol.define(&mut hist, &huge), Err(HistError::TooManyCells));
        assert_eq!(protocol.remaining(), 1);
        assert_eq!(hist.axis(1).unwrap().bins(), 1);
        assert_eq!(hist.cell_count(), 0);
    }

    #[test]
    fn extra_definition_is_a_no_op() {
        let mut protocol = AxisProtocol::<1>::new();
        let mut hist = Histogram::<1>::new();
        protocol.define(&mut hist, &uniform(10)).unwrap();
        let before = hist.clone();

        assert!(!protocol.define(&mut hist, &uniform(99)).unwrap());
        assert_eq!(hist, before);
        assert_eq!(protocol.remaining(), 0);
    }

    #[test]
    fn definition_resets_contents() {
        let mut protocol = AxisProtocol::<2>::new();
        let mut hist = Histogram::<2>::new();
        protocol.define(&mut hist, &uniform(2)).unwrap();
        hist.set_bins_length(hist.expected_cell_count().unwrap());
        hist.fill([0.5, 0.5], 1.0);
        assert_eq!(hist.entries(), 1);

        protocol.define(&mut hist, &uniform(2)).unwrap();
        assert_eq!(hist.entries(), 0);
        assert_eq!(hist.integral(), 0.0);
    }
}
