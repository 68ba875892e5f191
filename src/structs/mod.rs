mod block;
mod directory_entry;
mod group_descriptor;
mod helpers;
mod inode;
mod superblock;

pub use directory_entry::DirectoryEntries;
pub(crate) use helpers::read_exact_at;

pub const SUPERBLOCK_OFFSET: u64 = 1024;
pub const SUPERBLOCK_SIZE: usize = 1024;
pub const MAGIC_SIGNATURE: u16 = 0xEF53;
pub const BASE_BLOCK_SIZE: u32 = 1024;
pub const MAX_LOG_BLOCK_SIZE: u32 = 6;
pub const GOOD_OLD_INODE_SIZE: u16 = 128;
pub const GROUP_DESCRIPTOR_SIZE: usize = 32;
pub const ROOT_INODE: u32 = 2;
pub const DIRECT_BLOCKS: usize = 12;
pub const SINGLE_INDIRECT: usize = 12;
pub const DOUBLE_INDIRECT: usize = 13;
pub const TRIPLE_INDIRECT: usize = 14;
pub const BLOCK_POINTERS: usize = 15;
pub const DIRECTORY_ENTRY_HEADER: usize = 8;
pub const FEATURE_INCOMPAT_FILETYPE: u32 = 0x0002;

/// Fixed-layout on-disk record decoded field by field
pub(crate) trait Decode: Sized {
    /// Bytes the record occupies on disk
    const SIZE: usize;
    fn decode(bytes: &[u8]) -> Result<Self, crate::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superblock {
    /// Total count of inodes in the filesystem
    pub inode_count: u32,
    /// Total count of blocks in the filesystem
    pub block_count: u32,
    /// Count of free blocks in the filesystem
    pub blocks_free: u32,
    /// Count of free inodes in the filesystem
    pub inodes_free: u32,
    /// Block holding the superblock (1 for 1 KiB blocks, 0 otherwise)
    pub first_data_block: u32,
    /// Block size is `1024 << log_block_size`
    pub log_block_size: u32,
    pub blocks_per_group: u32,
    pub inodes_per_group: u32,
    /// Magic signature
    pub magic: u16,
    pub state: u16,
    pub rev_level: u32,
    /// Size of one inode table record in bytes
    pub inode_size: u16,
    pub feature_compat: u32,
    pub feature_incompat: u32,
    pub feature_ro_compat: u32,
    pub volume_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub block_bitmap: u32,
    pub inode_bitmap: u32,
    /// First block of this group's inode table
    pub inode_table: u32,
    pub blocks_free: u16,
    pub inodes_free: u16,
    pub used_dirs: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    /// Inode's number (1-based)
    pub index: u32,
    /// File type and permission bits
    pub mode: u16,
    pub uid: u16,
    pub gid: u16,
    /// File size in bytes
    pub size: u64,
    pub atime: u32,
    pub ctime: u32,
    pub mtime: u32,
    /// Deletion timestamp (zero if undeleted)
    pub dtime: u32,
    pub links_count: u16,
    /// Occupied 512-byte sectors
    pub sectors: u32,
    pub flags: u32,
    /// Direct pointers followed by single, double and triple indirect ones
    pub blocks: [u32; BLOCK_POINTERS],
}

#[derive(Debug, Clone)]
pub struct Block {
    /// Block's index
    pub index: u32,
    /// Raw data as bytes
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Referenced inode, zero for an unused slot
    pub inode: u32,
    /// Distance to the next entry in the block
    pub rec_len: u16,
    pub file_type: FileType,
    pub name: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Unknown,
    RegularFile,
    Directory,
    CharDevice,
    BlockDevice,
    NamedPipe,
    Socket,
    Symlink,
}

impl FileType {
    /// Type tag stored in a directory entry
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            1 => Self::RegularFile,
            2 => Self::Directory,
            3 => Self::CharDevice,
            4 => Self::BlockDevice,
            5 => Self::NamedPipe,
            6 => Self::Socket,
            7 => Self::Symlink,
            _ => Self::Unknown,
        }
    }

    /// Type bits of an inode's mode
    pub fn from_mode(mode: u16) -> Self {
        match mode & 0xF000 {
            0x8000 => Self::RegularFile,
            0x4000 => Self::Directory,
            0x2000 => Self::CharDevice,
            0x6000 => Self::BlockDevice,
            0x1000 => Self::NamedPipe,
            0xC000 => Self::Socket,
            0xA000 => Self::Symlink,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::RegularFile => "file",
            Self::Directory => "directory",
            Self::CharDevice => "char device",
            Self::BlockDevice => "block device",
            Self::NamedPipe => "fifo",
            Self::Socket => "socket",
            Self::Symlink => "symlink",
        };
        write!(f, "{name}")
    }
}
