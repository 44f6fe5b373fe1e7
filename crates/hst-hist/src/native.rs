//! Dimension-erased histogram handles.
//!
//! Containers hold histograms of any dimensionality side by side, so they
//! deal in [`NativeHistogram`] (owned) and [`NativeRef`] (borrowed) rather
//! than in `Histogram<D>` directly.

use serde::{Deserialize, Serialize};

use hst_types::ObjectKind;

use crate::error::HistResult;

use crate::histogram::Histogram;

/// Owned histogram of any supported dimensionality.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NativeHistogram {
    H1(Histogram<1>),
    H2(Histogram<2>),
    H3(Histogram<3>),
}

/// Borrowed view of a histogram of any supported dimensionality.
#[derive(Clone, Copy, Debug)]
pub enum NativeRef<'a> {
    H1(&'a Histogram<1>),
    H2(&'a Histogram<2>),
    H3(&'a Histogram<3>),
}

macro_rules! dispatch {
    ($value:expr, $hist:ident => $body:expr) => {
        match $value {
            Self::H1($hist) => $body,
            Self::H2($hist) => $body,
            Self::H3($hist) => $body,
        }
    };
}

impl NativeHistogram {
    pub fn kind(&self) -> ObjectKind {
        self.as_native_ref().kind()
    }

    pub fn title(&self) -> &str {
        dispatch!(self, h => h.title())
    }

    pub fn entries(&self) -> u64 {
        dispatch!(self, h => h.entries())
    }

    pub fn dimensions(&self) -> usize {
        dispatch!(self, h => h.dimensions())
    }

    /// See [`Histogram::validate`].
    pub fn validate(&self) -> HistResult<()> {
        dispatch!(self, h => h.validate())
    }

    pub fn as_native_ref(&self) -> NativeRef<'_> {
        match self {
            Self::H1(h) => NativeRef::H1(h),
            Self::H2(h) => NativeRef::H2(h),
            Self::H3(h) => NativeRef::H3(h),
        }
    }

    pub fn as_h1(&self) -> Option<&Histogram<1>> {
        match self {
            Self::H1(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_h2(&self) -> Option<&Histogram<2>> {
        match self {
            Self::H2(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_h3(&self) -> Option<&Histogram<3>> {
        match self {
            Self::H3(h) => Some(h),
            _ => None,
        }
    }
}

impl NativeRef<'_> {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::H1(_) => ObjectKind::Hist1D,
            Self::H2(_) => ObjectKind::Hist2D,
            Self::H3(_) => ObjectKind::Hist3D,
        }
    }

    pub fn title(&self) -> &str {
        dispatch!(self, h => h.title())
    }

    pub fn entries(&self) -> u64 {
        dispatch!(self, h => h.entries())
    }

    /// Copy into an owned histogram.
    pub fn to_native(&self) -> NativeHistogram {
        match self {
            Self::H1(h) => NativeHistogram::H1((*h).clone()),
            Self::H2(h) => NativeHistogram::H2((*h).clone()),
            Self::H3(h) => NativeHistogram::H3((*h).clone()),
        }
    }
}

/// Histograms whose dimensionality has a native representation.
pub trait AsNative {
    fn as_native(&self) -> NativeRef<'_>;
}

impl AsNative for Histogram<1> {
    fn as_native(&self) -> NativeRef<'_> {
        NativeRef::H1(self)
    }
}

impl AsNative for Histogram<2> {
    fn as_native(&self) -> NativeRef<'_> {
        NativeRef::H2(self)
    }
}

impl AsNative for Histogram<3> {
    fn as_native(&self) -> NativeRef<'_> {
        NativeRef::H3(self)
    }
}

impl From<Histogram<1>> for NativeHistogram {
    fn from(hist: Histogram<1>) -> Self {
        Self::H1(hist)
    }
}

impl From<Histogram<2>> for NativeHistogram {
    fn from(hist: Histogram<2>) -> Self {
        Self::H2(hist)
    }
}

impl From<Histogram<3>> for NativeHistogram {
    fn from(hist: Histogram<3>) -> Self {
        Self::H3(hist)
    }
}
