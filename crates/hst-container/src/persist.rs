//! Persisting an [`ObjectStore`] into a container.
//!
//! Every store key is split at its last `/`: the path part names a
//! directory (created on demand), the remainder names the histogram inside
//! it. Objects without a native histogram form are reported and skipped,
//! as are keys that cannot be placed in the tree. Nothing is written to a
//! file until the whole store has been mapped.

use std::fmt;
use std::path::Path;

use hst_store::{ObjectStore, Storable};
use hst_types::split_key;
use tracing::{debug, info, warn};

use crate::config::ContainerConfig;
use crate::container::Container;
use crate::dir::Directory;
use crate::error::{ContainerError, ContainerResult};

/// Why a store entry was not persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The object has no native histogram form.
    NotNative { kind: &'static str },
    /// The key ends in a separator, leaving no object name.
    EmptyName,
    /// The key collides with an existing node of another type.
    Conflict(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotNative { kind } => write!(f, "{kind} cannot be stored natively"),
            Self::EmptyName => write!(f, "empty object name"),
            Self::Conflict(reason) => write!(f, "{reason}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntry {
    pub key: String,
    pub reason: SkipReason,
}

/// Outcome of a persistence run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistReport {
    /// Keys written, in store iteration order.
    pub written: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
}

impl PersistReport {
    fn skip(&mut self, key: &str, reason: SkipReason) {
        warn!(key, reason = %reason, "store entry not persisted");
        self.skipped.push(SkippedEntry {
            key: key.to_string(),
            reason,
        });
    }
}

/// Map every native object of `store` into the tree below `target`.
pub fn write_store(store: &ObjectStore, target: &mut Directory) -> PersistReport {
    let mut report = PersistReport::default();

    for (key, object) in store.iter() {
        let Some(native) = object.as_native() else {
            report.skip(
                key,
                SkipReason::NotNative {
                    kind: object.kind_name(),
                },
            );
            continue;
        };

        let key_path = split_key(key);
        if key_path.name.is_empty() {
            report.skip(key, SkipReason::EmptyName);
            continue;
        }

        match target
            .mkdir_all(key_path.segments())
            .and_then(|dir| dir.write_object(&key_path.name, native.to_native()))
        {
            Ok(()) => {
                debug!(key, kind = %native.kind(), entries = native.entries(), "persisted");
                report.written.push(key.to_string());
            }
            Err(e) => report.skip(key, SkipReason::Conflict(e.to_string())),
        }
    }

    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "store mapped"
    );
    report
}

/// Write `store` into a fresh container at `path`, replacing any file
/// already there.
pub fn write_to_file(
    store: &ObjectStore,
    path: impl AsRef<Path>,
    config: ContainerConfig,
) -> ContainerResult<PersistReport> {
    let mut container = Container::create(path, config)?;
    let report = write_store(store, container.root_mut()?);
    container.commit()?;
    Ok(report)
}

/// Write `store` below the current directory of an already open container.
pub fn write_to_container(
    store: &ObjectStore,
    container: &mut Container,
) -> ContainerResult<PersistReport> {
    if !container.is_writable() {
        return Err(ContainerError::ReadOnly);
    }
    let report = write_store(store, container.current_mut()?);
    container.commit()?;
    Ok(report)
}
