use log::debug;

use super::{BlockPointers, PointerLevel};
use crate::error::Error;
use crate::filesystem::Filesystem;
use crate::structs::{Inode, BLOCK_POINTERS, DIRECT_BLOCKS, SINGLE_INDIRECT};

impl BlockPointers {
    pub fn new(inode: &Inode) -> Self {
        Self {
            pointers: inode.blocks,
            slot: 0,
            levels: Vec::new(),
        }
    }

    /// Next data block number, loading indirect blocks as they are reached.
    /// A zero entry inside an indirect block ends its tier, and so does a
    /// failure to load one of the tier's indirect blocks.
    pub fn next_block(&mut self, fs: &mut Filesystem) -> Option<Result<u32, Error>> {
        loop {
            if let Some(level) = self.levels.last_mut() {
                if level.position >= level.block.pointer_count() {
                    self.levels.pop();
                    continue;
                }
                let pointer = match level.block.pointer(level.position) {
                    Ok(pointer) => pointer,
                    Err(e) => {
                        self.levels.clear();
                        return Some(Err(e.into()));
                    }
                };
                level.position += 1;
                if pointer == 0 {
                    debug!("End of tier in indirect block {}", level.block.index);
                    self.levels.clear();
                    continue;
                }
                if level.depth == 0 {
                    return Some(Ok(pointer));
                }
                let depth = level.depth - 1;
                if let Err(e) = self.descend(fs, pointer, depth) {
                    self.levels.clear();
                    return Some(Err(e));
                }
                continue;
            }
            if self.slot >= BLOCK_POINTERS {
                return None;
            }
            let slot = self.slot;
            let pointer = self.pointers[slot];
            self.slot += 1;
            if pointer == 0 {
                continue;
            }
            if slot < DIRECT_BLOCKS {
                return Some(Ok(pointer));
            }
            if let Err(e) = self.descend(fs, pointer, slot - SINGLE_INDIRECT) {
                return Some(Err(e));
            }
        }
    }

    fn descend(&mut self, fs: &mut Filesystem, pointer: u32, depth: usize) -> Result<(), Error> {
        let block = fs.load_block(pointer)?;
        self.levels.push(PointerLevel {
            block,
            position: 0,
            depth,
        });
        Ok(())
    }

    /// Iterate the blocks from the start without consuming this cursor
    pub fn iter<'a>(&self, fs: &'a mut Filesystem) -> Blocks<'a> {
        Blocks {
            pointers: Self {
                pointers: self.pointers,
                slot: 0,
                levels: Vec::new(),
            },
            fs,
        }
    }
}

/// [`BlockPointers`] bound to a filesystem
#[derive(Debug)]
pub struct Blocks<'a> {
    pointers: BlockPointers,
    fs: &'a mut Filesystem,
}

impl Iterator for Blocks<'_> {
    type Item = Result<u32, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pointers.next_block(self.fs)
    }
}
