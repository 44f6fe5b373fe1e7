//! Foundation types for the histogram store.
//!
//! Every other `hst` crate depends on `hst-types`.
//!
//! # Key Types
//!
//! - [`KeyPath`] — a storage key split into its directory path and leaf name
//! - [`ObjectKind`] — type tag for entries written into a container

pub mod key;
pub mod kind;

pub use key::{split_key, KeyPath, KEY_SEPARATOR};
pub use kind::ObjectKind;
