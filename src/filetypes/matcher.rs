use log::debug;

use super::BlockPointers;
use crate::error::Error;
use crate::filesystem::Filesystem;
use crate::identifier::check_length;
use crate::structs::Inode;

/// First block of `inode` whose leading bytes equal `pattern`.
/// Comparison is anchored at offset 0 of every block.
pub fn find_match(fs: &mut Filesystem, inode: &Inode, pattern: &[u8]) -> Result<Option<u32>, Error> {
    check_length(pattern, fs.block_size())?;
    let mut prefix = vec![0u8; pattern.len()];
    let mut blocks = BlockPointers::new(inode);
    while let Some(block) = blocks.next_block(fs) {
        let block = block?;
        fs.read_block_prefix(block, &mut prefix)?;
        if prefix == pattern {
            debug!("Identifier matched block {block} of inode {}", inode.index);
            return Ok(Some(block));
        }
    }
    Ok(None)
}
