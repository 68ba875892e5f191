use std::fmt::Display;
use std::io::{Read, Seek, SeekFrom};

use super::helpers::*;
use super::*;
use crate::error::Error;

impl Decode for GroupDescriptor {
    const SIZE: usize = GROUP_DESCRIPTOR_SIZE;

    fn decode(bytes: &[u8]) -> Result<Self, Error> {
        // bytes 18..32 are padding and reserved words
        Ok(Self {
            block_bitmap: u32_at(bytes, 0)?,
            inode_bitmap: u32_at(bytes, 4)?,
            inode_table: u32_at(bytes, 8)?,
            blocks_free: u16_at(bytes, 12)?,
            inodes_free: u16_at(bytes, 14)?,
            used_dirs: u16_at(bytes, 16)?,
        })
    }
}

impl GroupDescriptor {
    /// Load the whole block group descriptor table
    pub fn load_table<D: Read + Seek + ?Sized>(
        device: &mut D,
        superblock: &Superblock,
    ) -> Result<Vec<Self>, Error> {
        let position = superblock.group_table_position();
        let length = superblock.group_count() as u64 * Self::SIZE as u64;
        let available = device.seek(SeekFrom::End(0))?;
        if position + length > available {
            return Err(Error::ShortRead {
                offset: position,
                expected: length as usize,
            });
        }
        let mut raw = vec![0u8; length as usize];
        read_exact_at(device, position, &mut raw)?;
        raw.chunks_exact(Self::SIZE).map(Self::decode).collect()
    }
}

impl Display for GroupDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "block bitmap {}, inode bitmap {}, inode table {}, {} free blocks, {} free inodes, {} directories",
            self.block_bitmap,
            self.inode_bitmap,
            self.inode_table,
            self.blocks_free,
            self.inodes_free,
            self.used_dirs
        )
    }
}
