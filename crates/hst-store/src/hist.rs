//! Typed accumulator wrapper.
//!
//! [`StorableHist`] pairs a [`Histogram`] with its [`AxisProtocol`] so the
//! store hands out histograms that refuse fills until every axis is defined.

use std::any::Any;

use hst_hist::{AsNative, AxisSpec, Histogram, NativeRef};

use crate::error::StoreResult;
use crate::protocol::AxisProtocol;
use crate::storable::Storable;

/// A store-owned histogram guarded by the axis configuration protocol.
///
/// Created empty by [`ObjectStore::get`](crate::ObjectStore::get). Call
/// [`axis`](Self::axis) or [`axis_edges`](Self::axis_edges) once per
/// dimension, in X, Y, Z order, then fill:
///
/// ```
/// use hst_store::Hist2D;
///
/// let mut h = Hist2D::new();
/// h.title("eta vs phi")
///     .axis(20, -2.5, 2.5, "eta")
///     .axis_edges(&[-3.2, -1.0, 0.0, 1.0, 3.2], "phi");
/// h.fill([0.3, 0.5]);
/// assert_eq!(h.histogram().axis(1).unwrap().bins(), 4);
/// ```
///
/// Histograms support neither [`Combine`](crate::Combine) nor `Clone`:
/// they accumulate through fills only.
#[derive(Debug)]
pub struct StorableHist<const D: usize> {
    hist: Histogram<D>,
    protocol: AxisProtocol<D>,
}

pub type Hist1D = StorableHist<1>;
pub type Hist2D = StorableHist<2>;
pub type Hist3D = StorableHist<3>;

impl<const D: usize> Default for StorableHist<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> StorableHist<D> {
    pub fn new() -> Self {
        Self {
            hist: Histogram::new(),
            protocol: AxisProtocol::new(),
        }
    }

    /// Set the histogram title. Consumes no axis slot; ignored once the
    /// histogram is configured.
    pub fn title(&mut self, title: &str) -> &mut Self {
        if !self.protocol.is_complete() {
            self.hist.set_title(title);
        }
        self
    }

    /// Define the next axis with `bins` equal bins over `[min, max)`.
    ///
    /// Ignored once the histogram is configured.
    ///
    /// # Panics
    ///
    /// If `bins == 0` or `min >= max`.
    pub fn axis(&mut self, bins: u32, min: f64, max: f64, label: &str) -> &mut Self {
        if self.protocol.is_complete() {
            return self;
        }
        match AxisSpec::uniform(bins, min, max, label) {
            Ok(spec) => self.apply(&spec),
            Err(e) => panic!("invalid axis definition for {:?}: {e}", self.hist.title()),
        }
    }

    /// Define the next axis by explicit bin edges.
    ///
    /// Ignored once the histogram is configured.
    ///
    /// # Panics
    ///
    /// If fewer than two edges are given or they are not strictly increasing.
    pub fn axis_edges(&mut self, edges: &[f64], label: &str) -> &mut Self {
        if self.protocol.is_complete() {
            return self;
        }
        match AxisSpec::variable(edges, label) {
            Ok(spec) => self.apply(&spec),
            Err(e) => panic!("invalid axis definition for {:?}: {e}", self.hist.title()),
        }
    }

    /// Define the next axis from a validated spec.
    pub fn try_axis(&mut self, spec: &AxisSpec) -> StoreResult<&mut Self> {
        self.protocol.define(&mut self.hist, spec)?;
        Ok(self)
    }

    fn apply(&mut self, spec: &AxisSpec) -> &mut Self {
        if let Err(e) = self.protocol.define(&mut self.hist, spec) {
            panic!("axis definition failed for {:?}: {e}", self.hist.title());
        }
        self
    }

    /// Returns `true` once all axes are defined.
    pub fn is_configured(&self) -> bool {
        self.protocol.is_complete()
    }

    /// Number of axis definitions still expected.
    pub fn remaining(&self) -> usize {
        self.protocol.remaining()
    }

    /// Fill with unit weight.
    #[inline]
    pub fn fill(&mut self, coords: [f64; D]) {
        self.fill_weighted(coords, 1.0);
    }

    /// Fill with `weight`.
    ///
    /// # Panics
    ///
    /// If the histogram is not fully configured.
    #[inline]
    pub fn fill_weighted(&mut self, coords: [f64; D], weight: f64) {
        assert!(
            self.protocol.is_complete(),
            "fill on unconfigured histogram {:?}: {} of {} axes undefined",
            self.hist.title(),
            self.protocol.remaining(),
            D
        );
        self.hist.fill(coords, weight);
    }

    pub fn histogram(&self) -> &Histogram<D> {
        &self.hist
    }
}

impl<const D: usize> StorableHist<D>
where
    Histogram<D>: AsNative,
{
    /// Native, dimension-erased view of the histogram.
    pub fn native(&self) -> NativeRef<'_> {
        self.hist.as_native()
    }
}

impl<const D: usize> Storable for StorableHist<D>
where
    Histogram<D>: AsNative,
{
    fn kind_name(&self) -> &'static str {
        "histogram"
    }

    fn as_native(&self) -> Option<NativeRef<'_>> {
        Some(self.native())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
