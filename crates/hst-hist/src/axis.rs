use serde::{Deserialize, Serialize};

use crate::error::{HistError, HistResult};

/// How an axis divides its range into bins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Binning {
    /// `bins` equal-width bins covering `[min, max)`.
    Uniform { bins: u32, min: f64, max: f64 },
    /// Explicit, strictly increasing bin edges; `edges.len() - 1` bins.
    Variable { edges: Vec<f64> },
}

impl Binning {
    fn bins(&self) -> usize {
        match self {
            Self::Uniform { bins, .. } => *bins as usize,
            Self::Variable { edges } => edges.len().saturating_sub(1),
        }
    }
}

// ---------------------------------------------------------------------------
// AxisSpec
// ---------------------------------------------------------------------------

/// A validated axis definition.
///
/// The only way to build one is through [`AxisSpec::uniform`] or
/// [`AxisSpec::variable`], so every `AxisSpec` describes at least one bin
/// over a finite, non-empty range.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisSpec {
    binning: Binning,
    label: String,
}

impl AxisSpec {
    /// Fixed-range binning: `bins` equal bins over `[min, max)`.
    pub fn uniform(bins: u32, min: f64, max: f64, label: impl Into<String>) -> HistResult<Self> {
        if bins == 0 {
            return Err(HistError::ZeroBins);
        }
        // max - min must be finite too, or every value lands in bin 1
        if !(min.is_finite() && max.is_finite() && min < max && (max - min).is_finite()) {
            return Err(HistError::InvalidRange { min, max });
        }
        Ok(Self {
            binning: Binning::Uniform { bins, min, max },
            label: label.into(),
        })
    }

    /// Explicit bin edges. Needs at least two strictly increasing, finite edges.
    pub fn variable(edges: &[f64], label: impl Into<String>) -> HistResult<Self> {
        if edges.len() < 2 {
            return Err(HistError::TooFewEdges(edges.len()));
        }
        for (index, edge) in edges.iter().enumerate() {
            if !edge.is_finite() {
                return Err(HistError::NonFiniteEdge { index });
            }
            if index > 0 && *edge <= edges[index - 1] {
                return Err(HistError::NonIncreasingEdges { index });
            }
        }
        Ok(Self {
            binning: Binning::Variable {
                edges: edges.to_vec(),
            },
            label: label.into(),
        })
    }

    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of in-range bins this definition produces.
    pub fn bins(&self) -> usize {
        self.binning.bins()
    }

    /// Number of cells including the two overflow cells.
    pub fn cells(&self) -> usize {
        self.bins() + 2
    }
}

/// Product of the cell counts of `axes`.
pub fn total_cells(axes: &[Axis]) -> HistResult<usize> {
    axes.iter()
        .try_fold(1usize, |acc, axis| acc.checked_mul(axis.cells()))
        .ok_or(HistError::TooManyCells)
}

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// One dimension of a histogram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    binning: Binning,
    title: String,
}

impl Default for Axis {
    /// Placeholder axis of an unconfigured histogram: one bin on `[0, 1)`.
    fn default() -> Self {
        Self {
            binning: Binning::Uniform {
                bins: 1,
                min: 0.0,
                max: 1.0,
            },
            title: String::new(),
        }
    }
}

impl From<&AxisSpec> for Axis {
    fn from(spec: &AxisSpec) -> Self {
        Self {
            binning: spec.binning.clone(),
            title: spec.label.clone(),
        }
    }
}

impl Axis {
    /// Check the binning as [`AxisSpec`] would have on construction.
    pub fn validate(&self) -> HistResult<()> {
        match &self.binning {
            Binning::Uniform { bins, min, max } => AxisSpec::uniform(*bins, *min, *max, "").map(|_| ()),
            Binning::Variable { edges } => AxisSpec::variable(edges, "").map(|_| ()),
        }
    }

    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Number of in-range bins.
    pub fn bins(&self) -> usize {
        self.binning.bins()
    }

    /// Number of cells, under/overflow included.
    pub fn cells(&self) -> usize {
        self.bins() + 2
    }

    /// Lower edge of the first in-range bin.
    pub fn lower(&self) -> f64 {
        match &self.binning {
            Binning::Uniform { min, .. } => *min,
            Binning::Variable { edges } => edges[0],
        }
    }

    /// Upper edge of the last in-range bin.
    pub fn upper(&self) -> f64 {
        match &self.binning {
            Binning::Uniform { max, .. } => *max,
            Binning::Variable { edges } => edges[edges.len() - 1],
        }
    }

    /// All `bins + 1` bin edges.
    pub fn edges(&self) -> Vec<f64> {
        (1..=self.bins() + 1).map(|bin| self.bin_low_edge(bin)).collect()
    }

    /// Lower edge of `bin` (1-based; `bins + 1` gives the upper edge).
    pub fn bin_low_edge(&self, bin: usize) -> f64 {
        match &self.binning {
            Binning::Uniform { bins, min, max } => {
                min + (bin as f64 - 1.0) * (max - min) / *bins as f64
            }
            Binning::Variable { edges } => {
                let idx = bin.clamp(1, edges.len()) - 1;
                edges[idx]
            }
        }
    }

    pub fn bin_width(&self, bin: usize) -> f64 {
        self.bin_low_edge(bin + 1) - self.bin_low_edge(bin)
    }

    pub fn bin_center(&self, bin: usize) -> f64 {
        self.bin_low_edge(bin) + 0.5 * self.bin_width(bin)
    }

    /// Cell that `x` falls into: `0` below range, `bins + 1` at or above
    /// the upper edge. NaN lands in the overflow cell.
    pub fn find_bin(&self, x: f64) -> usize {
        let bins = self.bins();
        if x < self.lower() {
            return 0;
        }
        if !(x < self.upper()) {
            return bins + 1;
        }
        match &self.binning {
            Binning::Uniform { min, max, .. } => {
                let offset = ((x - min) / (max - min) * bins as f64) as usize;
                1 + offset.min(bins - 1)
            }
            Binning::Variable { edges } => edges.partition_point(|edge| *edge <= x),
        }
    }
}
