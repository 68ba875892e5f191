use std::fmt::Display;
use std::io::{Read, Seek};

use log::debug;

use super::helpers::*;
use super::*;
use crate::error::{Error, FormatError};

impl Decode for Superblock {
    const SIZE: usize = SUPERBLOCK_SIZE;

    fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let rev_level = u32_at(bytes, 76)?;
        let inode_size = if rev_level == 0 {
            GOOD_OLD_INODE_SIZE
        } else {
            u16_at(bytes, 88)?
        };
        let volume_name = bytes_at(bytes, 120, 16)?;
        let volume_name = volume_name.split(|&b| b == 0).next().unwrap_or_default();
        Ok(Self {
            inode_count: u32_at(bytes, 0)?,
            block_count: u32_at(bytes, 4)?,
            blocks_free: u32_at(bytes, 12)?,
            inodes_free: u32_at(bytes, 16)?,
            first_data_block: u32_at(bytes, 20)?,
            log_block_size: u32_at(bytes, 24)?,
            blocks_per_group: u32_at(bytes, 32)?,
            inodes_per_group: u32_at(bytes, 40)?,
            magic: u16_at(bytes, 56)?,
            state: u16_at(bytes, 58)?,
            rev_level,
            inode_size,
            feature_compat: u32_at(bytes, 92)?,
            feature_incompat: u32_at(bytes, 96)?,
            feature_ro_compat: u32_at(bytes, 100)?,
            volume_name: String::from_utf8_lossy(volume_name).into_owned(),
        })
    }
}

impl Superblock {
    /// Load and validate the superblock of an ext2 image
    pub fn load<D: Read + Seek + ?Sized>(device: &mut D) -> Result<Self, Error> {
        let superblock: Self = read_record(device, SUPERBLOCK_OFFSET)?;
        superblock.validate()?;
        debug!(
            "Superblock: {} blocks of {} bytes, {} inodes, {} groups",
            superblock.block_count,
            superblock.block_size(),
            superblock.inode_count,
            superblock.group_count()
        );
        Ok(superblock)
    }

    /// Reject geometry every later offset computation would trip over
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.magic != MAGIC_SIGNATURE {
            return Err(FormatError::BadMagic(self.magic));
        }
        if self.log_block_size > MAX_LOG_BLOCK_SIZE {
            return Err(FormatError::UnsupportedBlockSize(self.log_block_size));
        }
        if self.blocks_per_group == 0 {
            return Err(FormatError::InvalidGeometry("zero blocks per group"));
        }
        if self.inodes_per_group == 0 {
            return Err(FormatError::InvalidGeometry("zero inodes per group"));
        }
        if self.block_count <= self.first_data_block {
            return Err(FormatError::InvalidGeometry("no data blocks"));
        }
        let inode_size = self.inode_size;
        if inode_size < GOOD_OLD_INODE_SIZE
            || !inode_size.is_power_of_two()
            || inode_size as u32 > self.block_size()
        {
            return Err(FormatError::InodeSize(inode_size));
        }
        Ok(())
    }

    /// Block size in bytes
    pub fn block_size(&self) -> u32 {
        BASE_BLOCK_SIZE << self.log_block_size
    }

    /// Byte offset of block `index`
    pub fn block_position(&self, index: u32) -> u64 {
        index as u64 * self.block_size() as u64
    }

    /// Length of the block group descriptor table
    pub fn group_count(&self) -> u32 {
        self.block_count.div_ceil(self.blocks_per_group)
    }

    /// The descriptor table starts in the block following the superblock
    pub fn group_table_position(&self) -> u64 {
        self.block_position(self.first_data_block + 1)
    }

    /// Number of 32-bit pointers held by one indirect block
    pub fn pointers_per_block(&self) -> usize {
        self.block_size() as usize / std::mem::size_of::<u32>()
    }

    /// Directory entries carry a type tag and an 8-bit name length
    pub fn has_file_type(&self) -> bool {
        self.feature_incompat & FEATURE_INCOMPAT_FILETYPE != 0
    }
}

impl Display for Superblock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "volume name:       {:?}", self.volume_name)?;
        writeln!(f, "magic:             {:#06x}", self.magic)?;
        writeln!(f, "revision:          {}", self.rev_level)?;
        writeln!(f, "block size:        {}", self.block_size())?;
        writeln!(f, "blocks:            {} ({} free)", self.block_count, self.blocks_free)?;
        writeln!(f, "inodes:            {} ({} free)", self.inode_count, self.inodes_free)?;
        writeln!(f, "first data block:  {}", self.first_data_block)?;
        writeln!(f, "blocks per group:  {}", self.blocks_per_group)?;
        writeln!(f, "inodes per group:  {}", self.inodes_per_group)?;
        writeln!(f, "inode size:        {}", self.inode_size)?;
        writeln!(f, "groups:            {}", self.group_count())?;
        write!(
            f,
            "features:          compat {:#x}, incompat {:#x}, ro_compat {:#x}",
            self.feature_compat, self.feature_incompat, self.feature_ro_compat
        )
    }
}
