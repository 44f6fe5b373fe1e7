//! Fixed-dimension histograms for the histogram store.
//!
//! This crate is the numeric layer: it knows how to bin values, track
//! weights and keep running statistics. It knows nothing about keys,
//! stores or containers.
//!
//! # Layout
//!
//! A `D`-dimensional histogram keeps one flat `Vec<f64>` of cells. Every
//! axis contributes `bins + 2` cells: cell `0` is the underflow, cells
//! `1..=bins` are the in-range bins and cell `bins + 1` is the overflow.
//! The global cell index of per-axis bins `(bx, by, bz)` is
//! `bx + (nx + 2) * (by + (ny + 2) * bz)`.
//!
//! # Key Types
//!
//! - [`Axis`] / [`AxisSpec`] — binning of one dimension, and its validated definition
//! - [`Histogram`] — the accumulator, generic over its dimension count
//! - [`NativeHistogram`] / [`NativeRef`] — dimension-erased form used for persistence

pub mod axis;
pub mod error;
pub mod histogram;
pub mod native;

pub use axis::{total_cells, Axis, AxisSpec, Binning};
pub use error::{HistError, HistResult};
pub use histogram::{Histogram, Stats};
pub use native::{AsNative, NativeHistogram, NativeRef};
