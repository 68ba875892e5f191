mod block_pointers;
mod matcher;
mod walker;

use std::collections::VecDeque;

use crate::{
    error::FormatError,
    filesystem::Filesystem,
    structs::{Block, DirectoryEntry, FileType, BLOCK_POINTERS},
};

pub use block_pointers::Blocks;
pub use matcher::find_match;

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Restartable cursor over the data blocks an inode owns, direct pointers
/// first, then the single, double and triple indirect tiers.
#[derive(Debug, Clone)]
pub struct BlockPointers {
    pub(crate) pointers: [u32; BLOCK_POINTERS],
    pub(crate) slot: usize,
    pub(crate) levels: Vec<PointerLevel>,
}

/// A loaded indirect block and the next pointer slot to visit in it.
/// `depth` counts the indirect levels still below its entries.
#[derive(Debug, Clone)]
pub(crate) struct PointerLevel {
    pub(crate) block: Block,
    pub(crate) position: usize,
    pub(crate) depth: usize,
}

/// One visible directory entry, as emitted by [`DirectoryWalker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    /// Absolute path of the entry
    pub path: String,
    pub file_type: FileType,
    pub inode: u32,
    /// Nesting level of the directory holding the entry, root is 0
    pub depth: usize,
}

#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) inode: u32,
    pub(crate) path: String,
    pub(crate) depth: usize,
    pub(crate) blocks: BlockPointers,
    pub(crate) entries: VecDeque<Result<DirectoryEntry, FormatError>>,
}

/// Depth-first, pre-order traversal of the directory tree rooted at inode 2.
/// Yields `Err` items for local failures and keeps going.
#[derive(Debug)]
pub struct DirectoryWalker<'a> {
    pub(crate) fs: &'a mut Filesystem,
    pub(crate) stack: Vec<Frame>,
    pub(crate) max_depth: usize,
    pub(crate) pending: Option<crate::Error>,
}
