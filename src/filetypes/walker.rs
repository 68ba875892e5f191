use std::collections::VecDeque;

use log::{debug, warn};

use super::{BlockPointers, DirectoryWalker, Entry, Frame};
use crate::error::{Error, FormatError};
use crate::filesystem::Filesystem;
use crate::structs::{DirectoryEntries, DirectoryEntry, FileType, ROOT_INODE};

/// Append `name` to a directory path
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

impl<'a> DirectoryWalker<'a> {
    /// Start a walk at the root directory. Failing to load the root is fatal.
    pub fn new(fs: &'a mut Filesystem, max_depth: usize) -> Result<Self, Error> {
        let root = fs.load_inode(ROOT_INODE)?;
        if !root.is_directory() {
            return Err(FormatError::NotADirectory(ROOT_INODE).into());
        }
        let frame = Frame {
            inode: ROOT_INODE,
            path: "/".to_owned(),
            depth: 0,
            blocks: BlockPointers::new(&root),
            entries: VecDeque::new(),
        };
        Ok(Self {
            fs,
            stack: vec![frame],
            max_depth,
            pending: None,
        })
    }

    /// Filesystem being walked, for reads between two steps of the walk
    pub fn filesystem(&mut self) -> &mut Filesystem {
        self.fs
    }

    /// Push the frame of a child directory so its entries come next
    fn descend(&mut self, inode: u32, path: String, depth: usize) -> Result<(), Error> {
        if depth > self.max_depth || self.stack.iter().any(|frame| frame.inode == inode) {
            return Err(Error::CycleSuspected { path, depth });
        }
        let child = self.fs.load_inode(inode)?;
        if !child.is_directory() {
            return Err(FormatError::NotADirectory(inode).into());
        }
        debug!("Descend into {path} (inode {inode})");
        self.stack.push(Frame {
            inode,
            path,
            depth,
            blocks: BlockPointers::new(&child),
            entries: VecDeque::new(),
        });
        Ok(())
    }

    /// Turn a decoded entry into a visible record, descending into directories
    fn visit(&mut self, entry: DirectoryEntry, path: String, depth: usize) -> Entry {
        let mut file_type = entry.file_type;
        if file_type == FileType::Unknown {
            match self.fs.load_inode(entry.inode) {
                Ok(inode) => file_type = inode.file_type(),
                Err(e) => {
                    warn!("Cannot determine type of {path}: {e}");
                    self.pending = Some(e);
                }
            }
        }
        if file_type == FileType::Directory && !entry.is_dot() {
            if let Err(e) = self.descend(entry.inode, path.clone(), depth + 1) {
                warn!("Skipping subtree {path}: {e}");
                self.pending = Some(e);
            }
        }
        Entry {
            name: entry.name(),
            path,
            file_type,
            inode: entry.inode,
            depth,
        }
    }
}

impl Iterator for DirectoryWalker<'_> {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending.take() {
            return Some(Err(e));
        }
        loop {
            let frame = self.stack.last_mut()?;
            match frame.entries.pop_front() {
                Some(Ok(entry)) if entry.inode == 0 => continue,
                Some(Ok(entry)) => {
                    let path = join_path(&frame.path, &entry.name());
                    let depth = frame.depth;
                    return Some(Ok(self.visit(entry, path, depth)));
                }
                Some(Err(e)) => {
                    warn!("Malformed entry in {}: {e}", frame.path);
                    return Some(Err(e.into()));
                }
                None => {}
            }
            let block = match frame.blocks.next_block(self.fs) {
                Some(Ok(index)) => self.fs.load_block(index),
                Some(Err(e)) => Err(e),
                None => {
                    self.stack.pop();
                    continue;
                }
            };
            match block {
                Ok(block) => {
                    let has_file_type = self.fs.superblock().has_file_type();
                    frame
                        .entries
                        .extend(DirectoryEntries::new(&block.data, has_file_type));
                }
                Err(e) => {
                    warn!("Abandoning directory {}: {e}", frame.path);
                    self.stack.pop();
                    return Some(Err(e));
                }
            }
        }
    }
}
