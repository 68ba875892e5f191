use std::fmt::Debug;
use std::io::{Read, Seek, SeekFrom};

use log::{debug, info};

use crate::error::{Error, FormatError};
use crate::structs::*;

pub trait BlockDevice: Read + Seek + Debug {}

impl BlockDevice for std::fs::File {}

/// A read-only ext2 image with its metadata loaded
#[derive(Debug)]
pub struct Filesystem {
    pub(crate) superblock: Superblock,
    pub(crate) groups: Vec<GroupDescriptor>,
    pub(crate) device: Box<dyn BlockDevice>,
    pub(crate) device_size: u64,
}

impl Filesystem {
    /// Load superblock and group descriptor table from a block device
    pub fn load(device: Box<dyn BlockDevice>) -> Result<Self, Error> {
        let mut device = device;
        let device_size = device.seek(SeekFrom::End(0))?;
        let superblock = Superblock::load(&mut device)?;
        let groups = GroupDescriptor::load_table(&mut device, &superblock)?;
        info!(
            "Loaded ext2 image of {device_size} bytes with {} groups of {} inodes",
            groups.len(),
            superblock.inodes_per_group
        );
        Ok(Self {
            superblock,
            groups,
            device,
            device_size,
        })
    }

    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    pub fn groups(&self) -> &[GroupDescriptor] {
        &self.groups
    }

    pub fn block_size(&self) -> u32 {
        self.superblock.block_size()
    }

    /// Split an inode number into its group and index within that group
    pub fn inode_location(&self, number: u32) -> Result<(u32, u32), Error> {
        if number == 0 {
            return Err(Error::NotFound(number));
        }
        let group = (number - 1) / self.superblock.inodes_per_group;
        let index = (number - 1) % self.superblock.inodes_per_group;
        if number > self.superblock.inode_count || group as usize >= self.groups.len() {
            return Err(Error::OutOfRange {
                inode: number,
                group,
                groups: self.groups.len() as u32,
            });
        }
        Ok((group, index))
    }

    /// Byte offset of the inode record for `number`
    pub fn inode_position(&self, number: u32) -> Result<u64, Error> {
        let (group, index) = self.inode_location(number)?;
        let table = self.groups[group as usize].inode_table;
        Ok(self.superblock.block_position(table)
            + index as u64 * self.superblock.inode_size as u64)
    }

    /// Load inode with number
    pub fn load_inode(&mut self, number: u32) -> Result<Inode, Error> {
        let position = self.inode_position(number)?;
        debug!("Load inode {number} at {position}");
        let mut raw = vec![0u8; self.superblock.inode_size as usize];
        self.read_at(position, &mut raw)?;
        Inode::decode(number, &raw)
    }

    fn check_block(&self, index: u32) -> Result<(), Error> {
        if index == 0 || index >= self.superblock.block_count {
            return Err(FormatError::BlockOutOfRange(index).into());
        }
        Ok(())
    }

    /// Load block with index
    pub fn load_block(&mut self, index: u32) -> Result<Block, Error> {
        self.check_block(index)?;
        debug!("Load block {index}");
        let mut data = vec![0u8; self.block_size() as usize];
        self.read_at(self.superblock.block_position(index), &mut data)?;
        Ok(Block { index, data })
    }

    /// Read the first `buffer.len()` bytes of block `index`
    pub fn read_block_prefix(&mut self, index: u32, buffer: &mut [u8]) -> Result<(), Error> {
        self.check_block(index)?;
        if buffer.len() > self.block_size() as usize {
            return Err(FormatError::Truncated {
                needed: buffer.len(),
                available: self.block_size() as usize,
            }
            .into());
        }
        self.read_at(self.superblock.block_position(index), buffer)
    }

    /// Every read is a seek to an absolute offset followed by a full read
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<(), Error> {
        if offset + buffer.len() as u64 > self.device_size {
            return Err(Error::ShortRead {
                offset,
                expected: buffer.len(),
            });
        }
        read_exact_at(&mut self.device, offset, buffer)
    }
}
