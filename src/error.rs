use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("short read of {expected} bytes at offset {offset}")]
    ShortRead { offset: u64, expected: usize },
    #[error("malformed metadata: {0}")]
    Format(#[from] FormatError),
    #[error("inode {0} does not exist")]
    NotFound(u32),
    #[error("inode {inode} maps to group {group}, but only {groups} groups exist")]
    OutOfRange { inode: u32, group: u32, groups: u32 },
    #[error("directory {path} at depth {depth} looks like a cycle")]
    CycleSuspected { path: String, depth: usize },
    #[error("invalid data identifier: {0}")]
    InvalidIdentifier(String),
}

/// Structural inconsistencies found while decoding on-disk records
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("bad superblock magic {0:#06x}")]
    BadMagic(u16),
    #[error("record needs {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("unsupported block size exponent {0}")]
    UnsupportedBlockSize(u32),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),
    #[error("invalid inode record size {0}")]
    InodeSize(u16),
    #[error("directory entry at offset {offset} has invalid length {length}")]
    EntryLength { offset: usize, length: u16 },
    #[error("block {0} is outside the filesystem")]
    BlockOutOfRange(u32),
    #[error("inode {0} is not a directory")]
    NotADirectory(u32),
}

impl Error {
    /// Errors that only concern a subtree or a single file
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::InvalidIdentifier(_))
    }
}
