use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, ContainerResult};

/// Flush/sync strategy applied on every commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// `fsync` after every commit.
    EveryCommit,
    /// Flush to the OS and rely on its page cache.
    OsDefault,
}

impl Default for SyncMode {
    fn default() -> Self {
        Self::EveryCommit
    }
}

/// Settings for reading and writing containers.
///
/// Loadable from TOML; missing keys take their defaults:
///
/// ```toml
/// compression_level = 9
/// sync_mode = "os-default"
/// verify_checksum = true
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// zstd level for histogram payloads.
    pub compression_level: i32,
    /// Durability of [`Container::commit`](crate::Container::commit).
    pub sync_mode: SyncMode,
    /// Check the trailing BLAKE3 checksum when opening a container.
    pub verify_checksum: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            compression_level: 3,
            sync_mode: SyncMode::default(),
            verify_checksum: true,
        }
    }
}

impl ContainerConfig {
    pub fn from_toml_str(text: &str) -> ContainerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ContainerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file.
    pub fn load(path: &Path) -> ContainerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> ContainerResult<()> {
        let levels = zstd::compression_level_range();
        if !levels.contains(&self.compression_level) {
            return Err(ContainerError::Config(format!(
                "compression_level {} outside {}..={}",
                self.compression_level,
                levels.start(),
                levels.end()
            )));
        }
        Ok(())
    }
}
