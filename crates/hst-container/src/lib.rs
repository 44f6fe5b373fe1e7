//! Hierarchical container files for histogram stores.
//!
//! A container is a tree of named directories holding 1-, 2- and 3-D
//! histograms, serialized as a single checksummed file. Stores are mapped
//! into containers by splitting their keys into directory path and object
//! name; see [`persist`].

pub mod config;
pub mod container;
pub mod dir;
pub mod error;
pub mod format;
pub mod persist;

pub use config::{ContainerConfig, SyncMode};
pub use container::Container;
pub use dir::{Directory, Node};
pub use error::{ContainerError, ContainerResult};
pub use persist::{write_store, write_to_container, write_to_file, PersistReport, SkipReason, SkippedEntry};
