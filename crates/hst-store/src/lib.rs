//! Key-addressed object store for histograms and metadata.
//!
//! Client code asks the store for an object by key and type; the first
//! request creates it empty. Histograms then go through a one-shot
//! configuration protocol (one axis definition per dimension, X then Y
//! then Z) before they accept fills.
//!
//! ```
//! use hst_store::{Hist1D, ObjectStore};
//!
//! let mut store = ObjectStore::new();
//! let pt = store.get::<Hist1D>("hist/pt").unwrap();
//! pt.axis(10, 0.0, 100.0, "p_T [GeV]").fill([42.0]);
//! assert_eq!(pt.histogram().entries(), 1);
//! ```
//!
//! # Capabilities
//!
//! Everything in the store implements [`Storable`]. Objects that can be
//! written to a container expose a native histogram through
//! [`Storable::as_native`]; the others ([`Record`], [`Counter`]) return
//! `None` and are skipped at persistence time. Arithmetic combination is a
//! separate capability, [`Combine`], which histograms do not implement.
//!
//! # Design Rules
//!
//! 1. A histogram is either unconfigured or fully configured; fills on an
//!    unconfigured histogram panic.
//! 2. Configuration calls after completion are silently ignored.
//! 3. Invalid axis parameters are programmer errors and panic, unless the
//!    caller validates first through the `try_*` entry points.
//! 4. The store is single-threaded: every mutation takes `&mut self`.

pub mod error;
pub mod hist;
pub mod protocol;
pub mod record;
pub mod storable;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use hist::{Hist1D, Hist2D, Hist3D, StorableHist};
pub use protocol::AxisProtocol;
pub use record::{Counter, Record};
pub use storable::{Combine, Storable};
pub use store::ObjectStore;
