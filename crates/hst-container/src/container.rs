use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use hst_types::KEY_SEPARATOR;
use tracing::{debug, info};

use crate::config::{ContainerConfig, SyncMode};
use crate::dir::Directory;
use crate::error::{ContainerError, ContainerResult};
use crate::format;

/// An open container: a directory tree plus a current-directory cursor.
///
/// File-backed containers keep their file handle for the container's
/// lifetime and rewrite it on every [`commit`](Self::commit).
pub struct Container {
    path: Option<PathBuf>,
    file: Option<File>,
    root: Directory,
    cwd: Vec<String>,
    writable: bool,
    config: ContainerConfig,
    checksum: Option<[u8; 32]>,
}

impl Container {
    /// Create (or truncate) a container file and open it for writing.
    pub fn create(path: impl AsRef<Path>, config: ContainerConfig) -> ContainerResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        info!(path = %path.display(), "created container");
        Ok(Self {
            path: Some(path.to_path_buf()),
            file: Some(file),
            root: Directory::new(),
            cwd: Vec::new(),
            writable: true,
            config,
            checksum: None,
        })
    }

    /// Open an existing container read-only.
    pub fn open(path: impl AsRef<Path>, config: ContainerConfig) -> ContainerResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mut container = Self::from_bytes(&data, config)?;
        container.path = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            objects = container.root.object_count(),
            "opened container"
        );
        Ok(container)
    }

    /// Open an existing container for reading and writing.
    pub fn open_update(path: impl AsRef<Path>, config: ContainerConfig) -> ContainerResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let data = std::fs::read(path)?;
        let mut container = Self::from_bytes(&data, config)?;
        container.path = Some(path.to_path_buf());
        container.file = Some(file);
        container.writable = true;
        info!(path = %path.display(), "opened container for update");
        Ok(container)
    }

    /// A writable container with no backing file.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            file: None,
            root: Directory::new(),
            cwd: Vec::new(),
            writable: true,
            config: ContainerConfig::default(),
            checksum: None,
        }
    }

    /// Decode a read-only container from raw bytes.
    pub fn from_bytes(data: &[u8], config: ContainerConfig) -> ContainerResult<Self> {
        let root = format::decode(data, config.verify_checksum)?;
        Ok(Self {
            path: None,
            file: None,
            root,
            cwd: Vec::new(),
            writable: false,
            checksum: format::checksum(data),
            config,
        })
    }

    /// Encode the current tree.
    pub fn to_bytes(&self) -> ContainerResult<Vec<u8>> {
        format::encode(&self.root, self.config.compression_level)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// BLAKE3 checksum as of the last load or commit.
    pub fn checksum(&self) -> Option<[u8; 32]> {
        self.checksum
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    pub fn root_mut(&mut self) -> ContainerResult<&mut Directory> {
        if !self.writable {
            return Err(ContainerError::ReadOnly);
        }
        Ok(&mut self.root)
    }

    /// Current directory as an absolute path (`"/"` for the root).
    pub fn pwd(&self) -> String {
        format!("{KEY_SEPARATOR}{}", self.cwd.join("/"))
    }

    /// Move the cursor. Paths starting with `/` are absolute; `..` goes
    /// up one level. Writable containers create missing directories.
    pub fn cd(&mut self, path: &str) -> ContainerResult<()> {
        let mut target = if path.starts_with(KEY_SEPARATOR) {
            Vec::new()
        } else {
            self.cwd.clone()
        };
        for segment in path.split(KEY_SEPARATOR).filter(|s| !s.is_empty()) {
            match segment {
                "." => {}
                ".." => {
                    target.pop();
                }
                name => target.push(name.to_string()),
            }
        }

        let joined = target.join("/");
        if self.writable {
            self.root.mkdirs(&joined)?;
        } else if self.root.get_directory(&joined).is_none() {
            return Err(ContainerError::NotFound(joined));
        }
        self.cwd = target;
        debug!(cwd = %self.pwd(), "changed directory");
        Ok(())
    }

    /// Directory under the cursor.
    pub fn current(&self) -> &Directory {
        self.root
            .get_directory(&self.cwd.join("/"))
            .unwrap_or(&self.root)
    }

    /// Directory under the cursor, for writing.
    pub fn current_mut(&mut self) -> ContainerResult<&mut Directory> {
        if !self.writable {
            return Err(ContainerError::ReadOnly);
        }
        self.root.mkdirs(&self.cwd.join("/"))
    }

    /// Write the tree to the backing file, honoring the sync mode.
    ///
    /// In-memory containers only refresh their checksum.
    pub fn commit(&mut self) -> ContainerResult<()> {
        if !self.writable {
            return Err(ContainerError::ReadOnly);
        }
        let data = self.to_bytes()?;
        self.checksum = format::checksum(&data);

        if let Some(file) = self.file.as_mut() {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            let mut writer = BufWriter::new(&*file);
            writer.write_all(&data)?;
            writer.flush()?;
            drop(writer);
            if self.config.sync_mode == SyncMode::EveryCommit {
                file.sync_all()?;
            }
        }
        info!(
            path = ?self.path,
            bytes = data.len(),
            objects = self.root.object_count(),
            "container committed"
        );
        Ok(())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("path", &self.path)
            .field("writable", &self.writable)
            .field("cwd", &self.pwd())
            .field("objects", &self.root.object_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hst_hist::{AxisSpec, Histogram, NativeHistogram};

    fn hist() -> NativeHistogram {
        let mut h = Histogram::<1>::with_axes("h", [AxisSpec::uniform(2, 0.0, 2.0, "x").unwrap()]);
        h.fill([0.5], 1.0);
        h.into()
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    #[test]
    fn cd_relative_and_absolute() {
        let mut c = Container::in_memory();
        assert_eq!(c.pwd(), "/");
        c.cd("run1").unwrap();
        c.cd("muons").unwrap();
        assert_eq!(c.pwd(), "/run1/muons");
        c.cd("..").unwrap();
        assert_eq!(c.pwd(), "/run1");
        c.cd("/other/sub").unwrap();
        assert_eq!(c.pwd(), "/other/sub");
        c.cd("/").unwrap();
        assert_eq!(c.pwd(), "/");
        assert!(c.root().get_directory("run1/muons").is_some());
    }

    #[test]
    fn current_mut_writes_under_cursor() {
        let mut c = Container::in_memory();
        c.cd("a/b").unwrap();
        c.current_mut().unwrap().write_object("h", hist()).unwrap();
        assert!(c.root().get_object("a/b/h").is_some());
        assert_eq!(c.current().len(), 1);
    }

    // -----------------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------------

    #[test]
    fn create_commit_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.hst");

        let mut c = Container::create(&path, ContainerConfig::default()).unwrap();
        c.root_mut().unwrap().mkdirs("d").unwrap().write_object("h", hist()).unwrap();
        c.commit().unwrap();
        let written = c.checksum().unwrap();

        let reopened = Container::open(&path, ContainerConfig::default()).unwrap();
        assert!(!reopened.is_writable());
        assert_eq!(reopened.checksum(), Some(written));
        assert_eq!(reopened.root(), c.root());
        assert_eq!(reopened.path(), Some(path.as_path()));
    }

    #[test]
    fn create_truncates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.hst");
        std::fs::write(&path, b"stale contents").unwrap();

        let c = Container::create(&path, ContainerConfig::default()).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        drop(c);
    }

    #[test]
    fn commit_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.hst");
        let mut c = Container::create(&path, ContainerConfig::default()).unwrap();
        for name in ["a", "b", "c"] {
            c.root_mut().unwrap().mkdirs(name).unwrap();
        }
        c.commit().unwrap();
        c.commit().unwrap();
        let reopened = Container::open(&path, ContainerConfig::default()).unwrap();
        assert_eq!(reopened.root().directory_count(), 3);
    }

    #[test]
    fn open_update_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.hst");
        let mut c = Container::create(&path, ContainerConfig::default()).unwrap();
        c.root_mut().unwrap().write_object("first", hist()).unwrap();
        c.commit().unwrap();
        drop(c);

        let mut c = Container::open_update(&path, ContainerConfig::default()).unwrap();
        c.root_mut().unwrap().write_object("second", hist()).unwrap();
        c.commit().unwrap();

        let reopened = Container::open(&path, ContainerConfig::default()).unwrap();
        assert_eq!(reopened.root().object_count(), 2);
    }

    #[test]
    fn read_only_rejects_writes() {
        let bytes = Container::in_memory().to_bytes().unwrap();
        let mut c = Container::from_bytes(&bytes, ContainerConfig::default()).unwrap();
        assert!(matches!(c.root_mut(), Err(ContainerError::ReadOnly)));
        assert!(matches!(c.current_mut(), Err(ContainerError::ReadOnly)));
        assert!(matches!(c.commit(), Err(ContainerError::ReadOnly)));
        assert!(matches!(c.cd("missing"), Err(ContainerError::NotFound(_))));
        assert_eq!(c.pwd(), "/");
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Container::open(dir.path().join("nope"), ContainerConfig::default()).unwrap_err();
        assert!(matches!(err, ContainerError::Io(_)));
    }

    #[test]
    fn os_default_sync_still_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.hst");
        let config = ContainerConfig {
            sync_mode: SyncMode::OsDefault,
            ..ContainerConfig::default()
        };
        let mut c = Container::create(&path, config).unwrap();
        c.root_mut().unwrap().write_object("h", hist()).unwrap();
        c.commit().unwrap();
        let reopened = Container::open(&path, ContainerConfig::default()).unwrap();
        assert!(reopened.root().get_object("h").is_some());
    }
}
