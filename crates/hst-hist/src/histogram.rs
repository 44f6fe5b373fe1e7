use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::{total_cells, Axis, AxisSpec};
use crate::error::{HistError, HistResult};

/// Running totals over all in-range fills.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of fill calls, under/overflow included.
    pub entries: u64,
    pub sum_w: f64,
    pub sum_w2: f64,
    /// Per-axis sum of `w * x`.
    pub sum_wx: Vec<f64>,
    /// Per-axis sum of `w * x * x`.
    pub sum_wx2: Vec<f64>,
}

impl Stats {
    fn zeroed(dims: usize) -> Self {
        Self {
            sum_wx: vec![0.0; dims],
            sum_wx2: vec![0.0; dims],
            ..Self::default()
        }
    }
}

/// A `D`-dimensional weighted histogram (`D` in `1..=3`).
///
/// Freshly created histograms are *unconfigured*: their axes hold the
/// single-bin placeholder and their cell storage is empty. Storage is
/// sized with [`set_bins_length`](Self::set_bins_length) once axes are set;
/// [`with_axes`](Self::with_axes) does both in one step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram<const D: usize> {
    title: String,
    axes: Vec<Axis>,
    contents: Vec<f64>,
    /// Sum of squared weights per cell; allocated on the first weighted
    /// fill or by [`enable_sumw2`](Self::enable_sumw2).
    sumw2: Option<Vec<f64>>,
    stats: Stats,
}

impl<const D: usize> Default for Histogram<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> Histogram<D> {
    const SUPPORTED: () = assert!(D >= 1 && D <= 3, "histograms support 1 to 3 dimensions");

    /// An unconfigured histogram with an empty title.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SUPPORTED;
        Self {
            title: String::new(),
            axes: vec![Axis::default(); D],
            contents: Vec::new(),
            sumw2: None,
            stats: Stats::zeroed(D),
        }
    }

    /// A fully configured histogram, storage sized and zeroed.
    ///
    /// # Panics
    ///
    /// If the total cell count overflows `usize`.
    pub fn with_axes(title: impl Into<String>, specs: [AxisSpec; D]) -> Self {
        match Self::try_with_axes(title, specs) {
            Ok(hist) => hist,
            Err(e) => panic!("cannot allocate histogram: {e}"),
        }
    }

    pub fn try_with_axes(title: impl Into<String>, specs: [AxisSpec; D]) -> HistResult<Self> {
        let mut hist = Self::new();
        hist.title = title.into();
        for (axis, spec) in hist.axes.iter_mut().zip(specs.iter()) {
            *axis = Axis::from(spec);
        }
        let cells = hist.expected_cell_count()?;
        hist.set_bins_length(cells);
        Ok(hist)
    }

    pub const fn dimensions(&self) -> usize {
        D
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Axis `index` (0 = X, 1 = Y, 2 = Z).
    pub fn axis(&self, index: usize) -> HistResult<&Axis> {
        self.axes.get(index).ok_or(HistError::AxisOutOfRange {
            index,
            dims: D,
        })
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Replace axis `index` with `spec`. Storage is left untouched.
    pub fn set_axis(&mut self, index: usize, spec: &AxisSpec) -> HistResult<()> {
        let axis = self
            .axes
            .get_mut(index)
            .ok_or(HistError::AxisOutOfRange { index, dims: D })?;
        *axis = Axis::from(spec);
        Ok(())
    }

    /// Number of allocated cells.
    pub fn cell_count(&self) -> usize {
        self.contents.len()
    }

    /// Number of cells the current axes call for.
    pub fn expected_cell_count(&self) -> HistResult<usize> {
        total_cells(&self.axes)
    }

    /// Check the structure of a histogram built outside this crate's
    /// constructors, e.g. by deserialization.
    ///
    /// Storage may be empty (an unconfigured histogram); otherwise it has to
    /// match the axes exactly.
    pub fn validate(&self) -> HistResult<()> {
        if self.axes.len() != D {
            return Err(HistError::Inconsistent(format!(
                "{} axes for a {D}-dimensional histogram",
                self.axes.len()
            )));
        }
        for axis in &self.axes {
            axis.validate()?;
        }
        let expected = self.expected_cell_count()?;
        if !self.contents.is_empty() && self.contents.len() != expected {
            return Err(HistError::Inconsistent(format!(
                "{} cells, axes need {expected}",
                self.contents.len()
            )));
        }
        if let Some(sumw2) = &self.sumw2 {
            if sumw2.len() != self.contents.len() {
                return Err(HistError::Inconsistent(format!(
                    "sumw2 has {} cells, contents {}",
                    sumw2.len(),
                    self.contents.len()
                )));
            }
        }
        if self.stats.sum_wx.len() != D || self.stats.sum_wx2.len() != D {
            return Err(HistError::Inconsistent("per-axis sums do not match dimensions".into()));
        }
        Ok(())
    }

    /// Resize cell storage (and sumw2, when tracked) to `cells`.
    pub fn set_bins_length(&mut self, cells: usize) {
        self.contents.resize(cells, 0.0);
        if let Some(sumw2) = &mut self.sumw2 {
            sumw2.resize(cells, 0.0);
        }
    }

    /// Zero every cell and all running totals. Axes and title are kept.
    pub fn reset(&mut self) {
        self.contents.iter_mut().for_each(|c| *c = 0.0);
        if let Some(sumw2) = &mut self.sumw2 {
            sumw2.iter_mut().for_each(|c| *c = 0.0);
        }
        self.stats = Stats::zeroed(D);
    }

    /// Start tracking squared weights. Existing contents seed the storage,
    /// which is exact as long as all earlier fills had unit weight.
    pub fn enable_sumw2(&mut self) {
        if self.sumw2.is_none() {
            debug!(title = %self.title, cells = self.contents.len(), "enabling sumw2 storage");
            self.sumw2 = Some(self.contents.clone());
        }
    }

    pub fn has_sumw2(&self) -> bool {
        self.sumw2.is_some()
    }

    /// Global cell index of per-axis bins. Bins past the overflow cell are
    /// clamped to it.
    pub fn cell_index(&self, bins: [usize; D]) -> usize {
        let clamped = |d: usize| bins[d].min(self.axes[d].bins() + 1);
        let mut index = clamped(D - 1);
        for d in (0..D - 1).rev() {
            index = index * self.axes[d].cells() + clamped(d);
        }
        index
    }

    /// Per-axis bins of a global cell index.
    pub fn cell_bins(&self, mut cell: usize) -> [usize; D] {
        let mut bins = [0usize; D];
        for (d, bin) in bins.iter_mut().enumerate() {
            let cells = self.axes[d].cells();
            *bin = cell % cells;
            cell /= cells;
        }
        bins
    }

    /// Returns `true` if `cell` is an under- or overflow cell on any axis.
    pub fn is_flow_cell(&self, cell: usize) -> bool {
        self.cell_bins(cell)
            .iter()
            .zip(&self.axes)
            .any(|(bin, axis)| *bin == 0 || *bin == axis.bins() + 1)
    }

    /// Add `weight` at `coords`; returns the global cell index filled.
    ///
    /// Storage must match the axes, which a configured histogram guarantees.
    pub fn fill(&mut self, coords: [f64; D], weight: f64) -> usize {
        let mut bins = [0usize; D];
        let mut in_range = true;
        for (d, bin) in bins.iter_mut().enumerate() {
            let axis = &self.axes[d];
            *bin = axis.find_bin(coords[d]);
            in_range &= *bin != 0 && *bin != axis.bins() + 1;
        }
        let cell = self.cell_index(bins);

        if self.sumw2.is_none() && weight != 1.0 {
            self.enable_sumw2();
        }
        self.contents[cell] += weight;
        if let Some(sumw2) = &mut self.sumw2 {
            sumw2[cell] += weight * weight;
        }

        self.stats.entries += 1;
        if in_range {
            self.stats.sum_w += weight;
            self.stats.sum_w2 += weight * weight;
            for (d, x) in coords.iter().enumerate() {
                self.stats.sum_wx[d] += weight * x;
                self.stats.sum_wx2[d] += weight * x * x;
            }
        }
        cell
    }

    pub fn bin_content(&self, bins: [usize; D]) -> f64 {
        self.contents
            .get(self.cell_index(bins))
            .copied()
            .unwrap_or(0.0)
    }

    /// Statistical error of a cell: `sqrt(sumw2)`, or `sqrt(|content|)`
    /// when squared weights are not tracked.
    pub fn bin_error(&self, bins: [usize; D]) -> f64 {
        let cell = self.cell_index(bins);
        match &self.sumw2 {
            Some(sumw2) => sumw2.get(cell).copied().unwrap_or(0.0).sqrt(),
            None => self.contents.get(cell).copied().unwrap_or(0.0).abs().sqrt(),
        }
    }

    /// Raw cell storage, flow cells included.
    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    pub fn sumw2(&self) -> Option<&[f64]> {
        self.sumw2.as_deref()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of fill calls.
    pub fn entries(&self) -> u64 {
        self.stats.entries
    }

    /// Sum of in-range weights.
    pub fn sum_of_weights(&self) -> f64 {
        self.stats.sum_w
    }

    /// Sum of all in-range cell contents.
    pub fn integral(&self) -> f64 {
        self.contents
            .iter()
            .enumerate()
            .filter(|(cell, _)| !self.is_flow_cell(*cell))
            .map(|(_, content)| content)
            .sum()
    }

    /// Weighted mean of in-range fills along `axis`.
    pub fn mean(&self, axis: usize) -> f64 {
        if self.stats.sum_w == 0.0 || axis >= D {
            return 0.0;
        }
        self.stats.sum_wx[axis] / self.stats.sum_w
    }

    /// Weighted standard deviation of in-range fills along `axis`.
    pub fn std_dev(&self, axis: usize) -> f64 {
        if self.stats.sum_w == 0.0 || axis >= D {
            return 0.0;
        }
        let mean = self.mean(axis);
        let variance = self.stats.sum_wx2[axis] / self.stats.sum_w - mean * mean;
        variance.max(0.0).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(bins: u32, min: f64, max: f64) -> AxisSpec {
        AxisSpec::uniform(bins, min, max, "").unwrap()
    }

    fn pt_hist() -> Histogram<1> {
        Histogram::with_axes("pt", [uniform(10, 0.0, 100.0)])
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn new_histogram_is_empty() {
        let hist = Histogram::<2>::new();
        assert_eq!(hist.dimensions(), 2);
        assert_eq!(hist.cell_count(), 0);
        assert_eq!(hist.entries(), 0);
        assert!(!hist.has_sumw2());
    }

    #[test]
    fn with_axes_sizes_storage() {
        let hist: Histogram<3> = Histogram::with_axes(
            "xyz",
            [uniform(4, 0.0, 1.0), uniform(2, 0.0, 1.0), uniform(3, 0.0, 1.0)],
        );
        assert_eq!(hist.cell_count(), 6 * 4 * 5);
        assert_eq!(hist.cell_count(), hist.expected_cell_count().unwrap());
        assert_eq!(hist.title(), "xyz");
    }

    #[test]
    fn try_with_axes_rejects_overflow() {
        let huge = uniform(u32::MAX, 0.0, 1.0);
        let result = Histogram::<3>::try_with_axes("big", [huge.clone(), huge.clone(), huge]);
        assert_eq!(result.unwrap_err(), HistError::TooManyCells);
    }

    #[test]
    fn axis_out_of_range() {
        let mut hist = Histogram::<1>::new();
        assert!(matches!(
            hist.axis(1),
            Err(HistError::AxisOutOfRange { index: 1, dims: 1 })
        ));
        assert!(hist.set_axis(2, &uniform(1, 0.0, 1.0)).is_err());
    }

    // -----------------------------------------------------------------------
    // Filling
    // -----------------------------------------------------------------------

    #[test]
    fn fill_1d() {
        let mut hist = pt_hist();
        hist.fill([5.0], 1.0);
        hist.fill([50.0], 1.0);
        assert_eq!(hist.entries(), 2);
        assert_eq!(hist.bin_content([1]), 1.0);
        assert_eq!(hist.bin_content([6]), 1.0);
        assert_eq!(hist.integral(), 2.0);
        assert_eq!(hist.mean(0), 27.5);
        assert!(!hist.has_sumw2());
    }

    #[test]
    fn overflow_counts_entries_but_not_stats() {
        let mut hist = pt_hist();
        hist.fill([-3.0], 1.0);
        hist.fill([1000.0], 1.0);
        assert_eq!(hist.entries(), 2);
        assert_eq!(hist.bin_content([0]), 1.0);
        assert_eq!(hist.bin_content([11]), 1.0);
        assert_eq!(hist.integral(), 0.0);
        assert_eq!(hist.sum_of_weights(), 0.0);
        assert_eq!(hist.mean(0), 0.0);
    }

    #[test]
    fn weighted_fill_enables_sumw2() {
        let mut hist = pt_hist();
        hist.fill([15.0], 1.0);
        hist.fill([15.0], 2.0);
        assert!(hist.has_sumw2());
        assert_eq!(hist.bin_content([2]), 3.0);
        // 1^2 seeded from contents, plus 2^2
        assert_eq!(hist.sumw2().unwrap()[2], 5.0);
        assert_eq!(hist.bin_error([2]), 5.0f64.sqrt());
    }

    #[test]
    fn error_without_sumw2_is_poisson() {
        let mut hist = pt_hist();
        for _ in 0..4 {
            hist.fill([42.0], 1.0);
        }
        assert_eq!(hist.bin_error([5]), 2.0);
    }

    #[test]
    fn fill_2d_cell_layout() {
        let mut hist: Histogram<2> =
            Histogram::with_axes("xy", [uniform(3, 0.0, 3.0), uniform(2, 0.0, 2.0)]);
        let cell = hist.fill([1.5, 1.5], 1.0);
        // bx = 2, by = 2, nx + 2 = 5
        assert_eq!(cell, 2 + 5 * 2);
        assert_eq!(hist.bin_content([2, 2]), 1.0);
        assert_eq!(hist.cell_bins(cell), [2, 2]);
    }

    #[test]
    fn fill_3d_cell_layout() {
        let mut hist: Histogram<3> = Histogram::with_axes(
            "xyz",
            [uniform(2, 0.0, 2.0), uniform(2, 0.0, 2.0), uniform(2, 0.0, 2.0)],
        );
        let cell = hist.fill([0.5, 1.5, 1.5], 1.0);
        assert_eq!(cell, 1 + 4 * (2 + 4 * 2));
        assert_eq!(hist.cell_bins(cell), [1, 2, 2]);
        assert_eq!(hist.integral(), 1.0);
    }

    #[test]
    fn out_of_range_bins_clamp_to_overflow() {
        let mut hist: Histogram<2> =
            Histogram::with_axes("xy", [uniform(3, 0.0, 3.0), uniform(3, 0.0, 3.0)]);
        hist.fill([0.5, 1.5], 1.0);
        assert_eq!(hist.bin_content([1, 2]), 1.0);

        // x = 6 would otherwise wrap into row y = 2
        assert_eq!(hist.bin_content([6, 1]), 0.0);
        assert_eq!(hist.cell_index([6, 1]), hist.cell_index([4, 1]));
        assert_eq!(hist.cell_index([1, 9]), hist.cell_index([1, 4]));
        assert_eq!(hist.bin_error([6, 1]), 0.0);

        hist.fill([99.0, 0.5], 1.0);
        assert_eq!(hist.bin_content([100, 1]), 1.0);
    }

    #[test]
    fn partial_overflow_is_flow_cell() {
        let mut hist: Histogram<2> =
            Histogram::with_axes("xy", [uniform(2, 0.0, 2.0), uniform(2, 0.0, 2.0)]);
        let cell = hist.fill([0.5, 9.0], 1.0);
        assert!(hist.is_flow_cell(cell));
        assert_eq!(hist.integral(), 0.0);
        assert_eq!(hist.entries(), 1);
    }

    #[test]
    fn std_dev_of_two_points() {
        let mut hist = pt_hist();
        hist.fill([10.0], 1.0);
        hist.fill([30.0], 1.0);
        assert_eq!(hist.mean(0), 20.0);
        assert!((hist.std_dev(0) - 10.0).abs() < 1e-12);
    }

    // -----------------------------------------------------------------------
    // Storage management
    // -----------------------------------------------------------------------

    #[test]
    fn reset_zeroes_everything() {
        let mut hist = pt_hist();
        hist.fill([5.0], 3.0);
        hist.reset();
        assert_eq!(hist.entries(), 0);
        assert_eq!(hist.integral(), 0.0);
        assert!(hist.sumw2().unwrap().iter().all(|w| *w == 0.0));
        assert_eq!(hist.stats().sum_wx, vec![0.0]);
    }

    #[test]
    fn set_bins_length_resizes_sumw2() {
        let mut hist = pt_hist();
        hist.enable_sumw2();
        hist.set_bins_length(20);
        assert_eq!(hist.cell_count(), 20);
        assert_eq!(hist.sumw2().unwrap().len(), 20);
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    const EMPTY_STATS: &str = r#""stats":{"entries":0,"sum_w":0.0,"sum_w2":0.0,"sum_wx":[0.0],"sum_wx2":[0.0]}"#;

    fn from_json(axes: &str, contents: &str, sumw2: &str) -> Histogram<1> {
        let json = format!(
            r#"{{"title":"","axes":{axes},"contents":{contents},"sumw2":{sumw2},{EMPTY_STATS}}}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    const ONE_BIN: &str = r#"[{"binning":{"Uniform":{"bins":1,"min":0.0,"max":1.0}},"title":""}]"#;

    #[test]
    fn constructed_histograms_validate() {
        let mut hist = pt_hist();
        hist.fill([5.0], 2.0);
        assert!(hist.validate().is_ok());
        assert!(Histogram::<3>::new().validate().is_ok());
        assert!(from_json(ONE_BIN, "[0.0,1.0,0.0]", "null").validate().is_ok());
    }

    #[test]
    fn reject_missing_axes() {
        let hist = from_json("[]", "[0.0,0.0,0.0]", "null");
        assert!(matches!(hist.validate(), Err(HistError::Inconsistent(_))));
    }

    #[test]
    fn reject_empty_edges() {
        let axes = r#"[{"binning":{"Variable":{"edges":[]}},"title":""}]"#;
        let hist = from_json(axes, "[]", "null");
        assert_eq!(hist.validate(), Err(HistError::TooFewEdges(0)));
    }

    #[test]
    fn reject_cell_count_mismatch() {
        let hist = from_json(ONE_BIN, "[0.0,0.0,0.0,0.0,0.0]", "null");
        assert!(matches!(hist.validate(), Err(HistError::Inconsistent(_))));
    }

    #[test]
    fn reject_sumw2_mismatch() {
        let hist = from_json(ONE_BIN, "[0.0,0.0,0.0]", "[0.0]");
        assert!(matches!(hist.validate(), Err(HistError::Inconsistent(_))));
    }

    #[test]
    fn reject_stats_dimension_mismatch() {
        let json = format!(
            r#"{{"title":"","axes":{ONE_BIN},"contents":[],"sumw2":null,"stats":{{"entries":0,"sum_w":0.0,"sum_w2":0.0,"sum_wx":[],"sum_wx2":[]}}}}"#
        );
        let hist: Histogram<1> = serde_json::from_str(&json).unwrap();
        assert!(matches!(hist.validate(), Err(HistError::Inconsistent(_))));
    }

    #[test]
    fn bincode_roundtrip() {
        let mut hist = pt_hist();
        hist.fill([33.0], 0.5);
        let bytes = bincode::serialize(&hist).unwrap();
        let decoded: Histogram<1> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, hist);
    }
}
