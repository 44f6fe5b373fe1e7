//! Hierarchical key mapping.
//!
//! Store keys are opaque, slash-delimited strings such as `"hist/muon/pt"`.
//! When an object is persisted, its key is split once at the *last*
//! separator: everything before it names the directory the object lives
//! in, everything after it is the object's name inside that directory.
//!
//! No validation of the key's content happens here. Empty segments
//! (`"a//b"`, `"/a"`, `"a/"`) are passed through untouched; deciding what
//! to do with them is the job of the directory-creation step.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between directory segments in a store key.
pub const KEY_SEPARATOR: char = '/';

/// A store key split into `(path, name)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPath {
    /// Directory part of the key; empty when the key has no separator.
    pub path: String,
    /// Leaf name: the text after the last separator.
    pub name: String,
}

impl KeyPath {
    /// Split `key` at its last separator.
    ///
    /// ```
    /// use hst_types::KeyPath;
    ///
    /// let kp = KeyPath::split("a/b/c");
    /// assert_eq!((kp.path.as_str(), kp.name.as_str()), ("a/b", "c"));
    ///
    /// let kp = KeyPath::split("leaf");
    /// assert_eq!((kp.path.as_str(), kp.name.as_str()), ("", "leaf"));
    /// ```
    pub fn split(key: &str) -> Self {
        match key.rfind(KEY_SEPARATOR) {
            None => Self {
                path: String::new(),
                name: key.to_string(),
            },
            Some(idx) => Self {
                path: key[..idx].to_string(),
                name: key[idx + KEY_SEPARATOR.len_utf8()..].to_string(),
            },
        }
    }

    /// Directory segments of the path, in order, empty ones included.
    ///
    /// A top-level key yields no segments at all.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        let path = if self.path.is_empty() {
            None
        } else {
            Some(self.path.split(KEY_SEPARATOR))
        };
        path.into_iter().flatten()
    }

    /// Reassemble the key.
    ///
    /// Lossless for every key except those with a single leading separator
    /// (`"/a"`), which split to the same parts as `"a"`.
    pub fn join(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}{}{}", self.path, KEY_SEPARATOR, self.name)
        }
    }
}

/// Split a store key into `(path, name)`. See [`KeyPath::split`].
pub fn split_key(key: &str) -> KeyPath {
    KeyPath::split(key)
}
