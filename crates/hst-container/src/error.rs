use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("invalid container magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported container version: {0}")]
    UnsupportedVersion(u32),

    #[error("container checksum mismatch")]
    ChecksumMismatch,

    #[error("CRC32 mismatch for entry {path}")]
    CrcMismatch { path: String },

    #[error("corrupt container entry at offset {offset}: {reason}")]
    CorruptEntry { offset: u64, reason: String },

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("name already used by a directory: {0}")]
    NameConflict(String),

    #[error("invalid object name: {0:?}")]
    InvalidName(String),

    #[error("no such directory: {0}")]
    NotFound(String),

    #[error("container is not writable")]
    ReadOnly,

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type ContainerResult<T> = Result<T, ContainerError>;
