use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of entry held in a container directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A directory node; carries no payload.
    Directory,
    /// One-dimensional histogram.
    Hist1D,
    /// Two-dimensional histogram.
    Hist2D,
    /// Three-dimensional histogram.
    Hist3D,
}

impl ObjectKind {
    /// Serialize to a type byte for the container format.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::Directory => 1,
            Self::Hist1D => 2,
            Self::Hist2D => 3,
            Self::Hist3D => 4,
        }
    }

    /// Parse from a type byte.
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Directory),
            2 => Some(Self::Hist1D),
            3 => Some(Self::Hist2D),
            4 => Some(Self::Hist3D),
            _ => None,
        }
    }

    /// Returns `true` for histogram kinds.
    pub fn is_histogram(&self) -> bool {
        !matches!(self, Self::Directory)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "dir"),
            Self::Hist1D => write!(f, "hist1d"),
            Self::Hist2D => write!(f, "hist2d"),
            Self::Hist3D => write!(f, "hist3d"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_byte_roundtrip() {
        for kind in [
            ObjectKind::Directory,
            ObjectKind::Hist1D,
            ObjectKind::Hist2D,
            ObjectKind::Hist3D,
        ] {
            assert_eq!(ObjectKind::from_type_byte(kind.type_byte()), Some(kind));
        }
    }

    #[test]
    fn from_type_byte_unknown() {
        assert!(ObjectKind::from_type_byte(0).is_none());
        assert!(ObjectKind::from_type_byte(5).is_none());
        assert!(ObjectKind::from_type_byte(255).is_none());
    }

    #[test]
    fn directory_is_not_a_histogram() {
        assert!(!ObjectKind::Directory.is_histogram());
        assert!(ObjectKind::Hist3D.is_histogram());
    }

    #[test]
    fn display() {
        assert_eq!(ObjectKind::Directory.to_string(), "dir");
        assert_eq!(ObjectKind::Hist1D.to_string(), "hist1d");
    }
}
