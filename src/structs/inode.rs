use std::fmt::Display;

use super::helpers::*;
use super::*;
use crate::error::Error;

impl Inode {
    /// Decode one inode table record
    pub fn decode(index: u32, bytes: &[u8]) -> Result<Self, Error> {
        let mode = u16_at(bytes, 0)?;
        let mut blocks = [0u32; BLOCK_POINTERS];
        for (slot, pointer) in blocks.iter_mut().enumerate() {
            *pointer = u32_at(bytes, 40 + slot * 4)?;
        }
        let mut size = u32_at(bytes, 4)? as u64;
        // upper half of the size lives in i_dir_acl for regular files
        if FileType::from_mode(mode) == FileType::RegularFile {
            size |= (u32_at(bytes, 108)? as u64) << 32;
        }
        Ok(Self {
            index,
            mode,
            uid: u16_at(bytes, 2)?,
            gid: u16_at(bytes, 24)?,
            size,
            atime: u32_at(bytes, 8)?,
            ctime: u32_at(bytes, 12)?,
            mtime: u32_at(bytes, 16)?,
            dtime: u32_at(bytes, 20)?,
            links_count: u16_at(bytes, 26)?,
            sectors: u32_at(bytes, 28)?,
            flags: u32_at(bytes, 32)?,
            blocks,
        })
    }

    pub fn file_type(&self) -> FileType {
        FileType::from_mode(self.mode)
    }

    pub fn is_directory(&self) -> bool {
        self.file_type() == FileType::Directory
    }

    pub fn is_regular_file(&self) -> bool {
        self.file_type() == FileType::RegularFile
    }

    /// Permission bits
    pub fn permissions(&self) -> u16 {
        self.mode & 0o7777
    }

    pub fn direct_blocks(&self) -> &[u32] {
        &self.blocks[..DIRECT_BLOCKS]
    }
}

impl Display for Inode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "inode:     {}", self.index)?;
        writeln!(f, "type:      {} ({:04o})", self.file_type(), self.permissions())?;
        writeln!(f, "size:      {}", self.size)?;
        writeln!(f, "owner:     {}:{}", self.uid, self.gid)?;
        writeln!(f, "links:     {}", self.links_count)?;
        writeln!(f, "sectors:   {}", self.sectors)?;
        writeln!(
            f,
            "times:     atime {} ctime {} mtime {} dtime {}",
            self.atime, self.ctime, self.mtime, self.dtime
        )?;
        writeln!(f, "direct:    {:?}", self.direct_blocks())?;
        write!(
            f,
            "indirect:  {} / {} / {}",
            self.blocks[SINGLE_INDIRECT], self.blocks[DOUBLE_INDIRECT], self.blocks[TRIPLE_INDIRECT]
        )
    }
}
