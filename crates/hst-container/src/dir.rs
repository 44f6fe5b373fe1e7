//! In-memory directory tree of a container.

use std::collections::BTreeMap;

use hst_hist::NativeHistogram;
use hst_types::{split_key, KeyPath, ObjectKind, KEY_SEPARATOR};
use tracing::debug;

use crate::error::{ContainerError, ContainerResult};

/// A child of a [`Directory`].
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Dir(Directory),
    Object(NativeHistogram),
}

impl Node {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Dir(_) => ObjectKind::Directory,
            Self::Object(hist) => hist.kind(),
        }
    }
}

/// A named collection of subdirectories and histograms, ordered by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Directory {
    children: BTreeMap<String, Node>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the direct subdirectory `name`.
    ///
    /// `name` must be non-empty and free of separators.
    pub fn mkdir(&mut self, name: &str) -> ContainerResult<&mut Directory> {
        check_name(name)?;
        let node = self.children.entry(name.to_string()).or_insert_with(|| {
            debug!(name, "creating directory");
            Node::Dir(Directory::new())
        });
        match node {
            Node::Dir(dir) => Ok(dir),
            Node::Object(_) => Err(ContainerError::NotADirectory(name.to_string())),
        }
    }

    /// Get or create every directory along `path`, returning the last one.
    ///
    /// Empty segments are skipped, so `""` is this directory and `"a//b"`
    /// is `"a/b"`. Fails if a segment names an existing object.
    pub fn mkdirs(&mut self, path: &str) -> ContainerResult<&mut Directory> {
        self.mkdir_all(path.split(KEY_SEPARATOR))
    }

    /// [`mkdirs`](Self::mkdirs) over pre-split segments, such as
    /// [`KeyPath::segments`]. Empty segments are skipped.
    pub fn mkdir_all<'a>(
        &mut self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> ContainerResult<&mut Directory> {
        let mut dir = self;
        let mut walked = String::new();
        for segment in segments.into_iter().filter(|s| !s.is_empty()) {
            if !walked.is_empty() {
                walked.push(KEY_SEPARATOR);
            }
            walked.push_str(segment);
            dir = dir.mkdir(segment).map_err(|e| match e {
                ContainerError::NotADirectory(_) => ContainerError::NotADirectory(walked.clone()),
                other => other,
            })?;
        }
        Ok(dir)
    }

    /// Look up the directory at `path` without creating anything.
    pub fn get_directory(&self, path: &str) -> Option<&Directory> {
        let mut dir = self;
        for segment in path.split(KEY_SEPARATOR).filter(|s| !s.is_empty()) {
            match dir.children.get(segment) {
                Some(Node::Dir(child)) => dir = child,
                _ => return None,
            }
        }
        Some(dir)
    }

    /// Store `hist` under `name`, replacing any object of that name.
    pub fn write_object(&mut self, name: &str, hist: NativeHistogram) -> ContainerResult<()> {
        check_name(name)?;
        if let Some(Node::Dir(_)) = self.children.get(name) {
            return Err(ContainerError::NameConflict(name.to_string()));
        }
        debug!(name, kind = %hist.kind(), "writing object");
        self.children.insert(name.to_string(), Node::Object(hist));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Look up the histogram at key `path` (`"dir/sub/name"`).
    pub fn get_object(&self, path: &str) -> Option<&NativeHistogram> {
        let KeyPath { path, name } = split_key(path);
        match self.get_directory(&path)?.children.get(&name) {
            Some(Node::Object(hist)) => Some(hist),
            _ => None,
        }
    }

    /// Direct children in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Every node below this directory with its full path, parents first.
    pub fn walk(&self) -> Vec<(String, &Node)> {
        let mut out = Vec::new();
        self.walk_into("", &mut out);
        out
    }

    fn walk_into<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Node)>) {
        for (name, node) in &self.children {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}{KEY_SEPARATOR}{name}")
            };
            out.push((path.clone(), node));
            if let Node::Dir(dir) = node {
                dir.walk_into(&path, out);
            }
        }
    }

    /// Histograms anywhere below this directory.
    pub fn object_count(&self) -> usize {
        self.walk()
            .iter()
            .filter(|(_, node)| matches!(node, Node::Object(_)))
            .count()
    }

    /// Subdirectories anywhere below this directory.
    pub fn directory_count(&self) -> usize {
        self.walk()
            .iter()
            .filter(|(_, node)| matches!(node, Node::Dir(_)))
            .count()
    }
}

fn check_name(name: &str) -> ContainerResult<()> {
    if name.is_empty() || name.contains(KEY_SEPARATOR) {
        return Err(ContainerError::InvalidName(name.to_string()));
    }
    Ok(())
}
