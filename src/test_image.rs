//! Synthetic ext2 images for tests

use std::collections::BTreeMap;
use std::io::Cursor;

use crate::filesystem::{BlockDevice, Filesystem};
use crate::structs::{FEATURE_INCOMPAT_FILETYPE, MAGIC_SIGNATURE, ROOT_INODE};

impl BlockDevice for Cursor<Vec<u8>> {}

pub const FIRST_INODE: u32 = 11;
pub const MODE_DIRECTORY: u16 = 0x4000 | 0o755;
pub const MODE_REGULAR: u16 = 0x8000 | 0o644;
pub const MODE_FIFO: u16 = 0x1000 | 0o644;

#[derive(Debug, Clone)]
pub struct Geometry {
    pub log_block_size: u32,
    pub block_count: u32,
    pub blocks_per_group: u32,
    pub inodes_per_group: u32,
    pub inode_size: u16,
    pub file_type: bool,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            log_block_size: 0,
            block_count: 2048,
            blocks_per_group: 1024,
            inodes_per_group: 32,
            inode_size: 128,
            file_type: true,
        }
    }
}

impl Geometry {
    pub fn block_size(&self) -> u32 {
        1024 << self.log_block_size
    }

    pub fn first_data_block(&self) -> u32 {
        if self.log_block_size == 0 {
            1
        } else {
            0
        }
    }

    pub fn group_count(&self) -> u32 {
        self.block_count.div_ceil(self.blocks_per_group)
    }
}

pub fn superblock_bytes(geometry: &Geometry) -> Vec<u8> {
    let mut raw = vec![0u8; 1024];
    let mut put = |offset: usize, bytes: &[u8]| raw[offset..offset + bytes.len()].copy_from_slice(bytes);
    put(0, &(geometry.inodes_per_group * geometry.group_count()).to_le_bytes());
    put(4, &geometry.block_count.to_le_bytes());
    put(20, &geometry.first_data_block().to_le_bytes());
    put(24, &geometry.log_block_size.to_le_bytes());
    put(28, &geometry.log_block_size.to_le_bytes());
    put(32, &geometry.blocks_per_group.to_le_bytes());
    put(36, &geometry.blocks_per_group.to_le_bytes());
    put(40, &geometry.inodes_per_group.to_le_bytes());
    put(56, &MAGIC_SIGNATURE.to_le_bytes());
    put(58, &1u16.to_le_bytes());
    put(76, &1u32.to_le_bytes());
    put(84, &FIRST_INODE.to_le_bytes());
    put(88, &geometry.inode_size.to_le_bytes());
    let incompat = if geometry.file_type {
        FEATURE_INCOMPAT_FILETYPE
    } else {
        0
    };
    put(96, &incompat.to_le_bytes());
    put(120, b"scope");
    raw
}

#[derive(Debug, Clone)]
struct Node {
    mode: u16,
    data: Vec<u8>,
    children: Vec<(u32, u8, Vec<u8>)>,
    parent: u32,
}

/// A built image plus the data blocks assigned to every inode
#[derive(Debug, Clone)]
pub struct TestImage {
    pub bytes: Vec<u8>,
    pub geometry: Geometry,
    pub blocks: BTreeMap<u32, Vec<u32>>,
    pub inode_tables: Vec<u32>,
}

impl TestImage {
    pub fn filesystem(&self) -> Filesystem {
        Filesystem::load(Box::new(Cursor::new(self.bytes.clone()))).unwrap()
    }

    /// Mutable view of data block `index`
    pub fn block_mut(&mut self, index: u32) -> &mut [u8] {
        let size = self.geometry.block_size() as usize;
        let start = index as usize * size;
        &mut self.bytes[start..start + size]
    }

    /// Mutable view of the raw inode record of `inode`
    pub fn inode_mut(&mut self, inode: u32) -> &mut [u8] {
        let group = (inode - 1) / self.geometry.inodes_per_group;
        let index = (inode - 1) % self.geometry.inodes_per_group;
        let size = self.geometry.inode_size as usize;
        let start = self.inode_tables[group as usize] as usize * self.geometry.block_size() as usize
            + index as usize * size;
        &mut self.bytes[start..start + size]
    }
}

#[derive(Debug)]
pub struct ImageBuilder {
    geometry: Geometry,
    bytes: Vec<u8>,
    next_block: u32,
    next_inode: u32,
    inode_tables: Vec<u32>,
    nodes: BTreeMap<u32, Node>,
}

impl ImageBuilder {
    pub fn new(geometry: Geometry) -> Self {
        let block_size = geometry.block_size();
        let mut bytes = vec![0u8; (geometry.block_count * block_size) as usize];
        bytes[1024..2048].copy_from_slice(&superblock_bytes(&geometry));
        let table_blocks = (geometry.group_count() * 32).div_ceil(block_size);
        let mut next_block = geometry.first_data_block() + 1 + table_blocks;
        let inode_table_blocks =
            (geometry.inodes_per_group * geometry.inode_size as u32).div_ceil(block_size);
        let mut inode_tables = Vec::new();
        let table_start = ((geometry.first_data_block() + 1) * block_size) as usize;
        for group in 0..geometry.group_count() {
            let descriptor = table_start + group as usize * 32;
            let block_bitmap = next_block;
            let inode_bitmap = next_block + 1;
            let inode_table = next_block + 2;
            next_block += 2 + inode_table_blocks;
            bytes[descriptor..descriptor + 4].copy_from_slice(&block_bitmap.to_le_bytes());
            bytes[descriptor + 4..descriptor + 8].copy_from_slice(&inode_bitmap.to_le_bytes());
            bytes[descriptor + 8..descriptor + 12].copy_from_slice(&inode_table.to_le_bytes());
            inode_tables.push(inode_table);
        }
        let mut nodes = BTreeMap::new();
        nodes.insert(
            ROOT_INODE,
            Node {
                mode: MODE_DIRECTORY,
                data: Vec::new(),
                children: Vec::new(),
                parent: ROOT_INODE,
            },
        );
        Self {
            geometry,
            bytes,
            next_block,
            next_inode: FIRST_INODE,
            inode_tables,
            nodes,
        }
    }

    /// Continue inode allocation at the first inode of `group`
    pub fn skip_to_group(&mut self, group: u32) -> &mut Self {
        self.next_inode = group * self.geometry.inodes_per_group + 1;
        self
    }

    fn allocate_inode(&mut self) -> u32 {
        let inode = self.next_inode;
        self.next_inode += 1;
        inode
    }

    fn allocate_block(&mut self) -> u32 {
        let block = self.next_block;
        assert!(block < self.geometry.block_count, "test image is full");
        self.next_block += 1;
        block
    }

    pub fn directory(&mut self, parent: u32, name: &str) -> u32 {
        let inode = self.allocate_inode();
        self.nodes.insert(
            inode,
            Node {
                mode: MODE_DIRECTORY,
                data: Vec::new(),
                children: Vec::new(),
                parent,
            },
        );
        self.link(parent, name, inode, 2);
        inode
    }

    pub fn file(&mut self, parent: u32, name: &str, data: &[u8]) -> u32 {
        self.node(parent, name, MODE_REGULAR, 1, data)
    }

    pub fn node(&mut self, parent: u32, name: &str, mode: u16, tag: u8, data: &[u8]) -> u32 {
        let inode = self.allocate_inode();
        self.nodes.insert(
            inode,
            Node {
                mode,
                data: data.to_vec(),
                children: Vec::new(),
                parent,
            },
        );
        self.link(parent, name, inode, tag);
        inode
    }

    /// Add a directory entry without creating an inode
    pub fn link(&mut self, parent: u32, name: &str, inode: u32, tag: u8) {
        let node = self.nodes.get_mut(&parent).expect("parent exists");
        node.children.push((inode, tag, name.as_bytes().to_vec()));
    }

    pub fn build(mut self) -> TestImage {
        let mut assigned = BTreeMap::new();
        let inodes: Vec<u32> = self.nodes.keys().copied().collect();
        for inode in inodes {
            let node = self.nodes[&inode].clone();
            let data = if node.mode & 0xF000 == 0x4000 {
                self.directory_data(inode, &node)
            } else {
                node.data.clone()
            };
            let blocks = self.write_data(&data);
            let pointers = self.map_blocks(&blocks);
            self.write_inode(inode, node.mode, data.len() as u64, &pointers, &blocks);
            assigned.insert(inode, blocks);
        }
        TestImage {
            bytes: self.bytes,
            geometry: self.geometry,
            blocks: assigned,
            inode_tables: self.inode_tables,
        }
    }

    fn directory_data(&self, inode: u32, node: &Node) -> Vec<u8> {
        let block_size = self.geometry.block_size() as usize;
        let mut entries = vec![(inode, 2u8, b".".to_vec()), (node.parent, 2u8, b"..".to_vec())];
        entries.extend(node.children.iter().cloned());
        let mut data = Vec::new();
        let mut block = Vec::new();
        let mut last_entry = 0;
        for (child, tag, name) in entries {
            let length = (8 + name.len()).next_multiple_of(4);
            if block.len() + length > block_size {
                Self::close_directory_block(&mut block, last_entry, block_size);
                data.append(&mut block);
            }
            last_entry = block.len();
            block.extend_from_slice(&child.to_le_bytes());
            block.extend_from_slice(&(length as u16).to_le_bytes());
            if self.geometry.file_type {
                block.push(name.len() as u8);
                block.push(tag);
            } else {
                block.extend_from_slice(&(name.len() as u16).to_le_bytes());
            }
            block.extend_from_slice(&name);
            block.resize(last_entry + length, 0);
        }
        Self::close_directory_block(&mut block, last_entry, block_size);
        data.append(&mut block);
        data
    }

    /// Stretch the last entry over the rest of the block
    fn close_directory_block(block: &mut Vec<u8>, last_entry: usize, block_size: usize) {
        let length = (block_size - last_entry) as u16;
        block[last_entry + 4..last_entry + 6].copy_from_slice(&length.to_le_bytes());
        block.resize(block_size, 0);
    }

    fn write_data(&mut self, data: &[u8]) -> Vec<u32> {
        let block_size = self.geometry.block_size() as usize;
        let mut blocks = Vec::new();
        for chunk in data.chunks(block_size) {
            let block = self.allocate_block();
            let start = block as usize * block_size;
            self.bytes[start..start + chunk.len()].copy_from_slice(chunk);
            blocks.push(block);
        }
        blocks
    }

    fn write_pointers(&mut self, pointers: &[u32]) -> u32 {
        let block = self.allocate_block();
        let start = block as usize * self.geometry.block_size() as usize;
        for (i, pointer) in pointers.iter().enumerate() {
            self.bytes[start + i * 4..start + i * 4 + 4].copy_from_slice(&pointer.to_le_bytes());
        }
        block
    }

    fn map_blocks(&mut self, blocks: &[u32]) -> [u32; 15] {
        let per_block = self.geometry.block_size() as usize / 4;
        let mut pointers = [0u32; 15];
        for (slot, block) in blocks.iter().take(12).enumerate() {
            pointers[slot] = *block;
        }
        let rest = blocks.get(12..).unwrap_or_default();
        if rest.is_empty() {
            return pointers;
        }
        let (single, rest) = rest.split_at(rest.len().min(per_block));
        pointers[12] = self.write_pointers(single);
        if rest.is_empty() {
            return pointers;
        }
        assert!(rest.len() <= per_block * per_block, "triple indirection unsupported");
        let second_level: Vec<u32> = rest
            .chunks(per_block)
            .map(|chunk| self.write_pointers(chunk))
            .collect();
        pointers[13] = self.write_pointers(&second_level);
        pointers
    }

    fn write_inode(&mut self, inode: u32, mode: u16, size: u64, pointers: &[u32; 15], blocks: &[u32]) {
        let group = (inode - 1) / self.geometry.inodes_per_group;
        let index = (inode - 1) % self.geometry.inodes_per_group;
        let start = self.inode_tables[group as usize] as usize * self.geometry.block_size() as usize
            + index as usize * self.geometry.inode_size as usize;
        let raw = &mut self.bytes[start..start + self.geometry.inode_size as usize];
        raw[0..2].copy_from_slice(&mode.to_le_bytes());
        raw[4..8].copy_from_slice(&(size as u32).to_le_bytes());
        raw[26..28].copy_from_slice(&1u16.to_le_bytes());
        let sectors = blocks.len() as u32 * (self.geometry.block_size() / 512);
        raw[28..32].copy_from_slice(&sectors.to_le_bytes());
        for (i, pointer) in pointers.iter().enumerate() {
            raw[40 + i * 4..44 + i * 4].copy_from_slice(&pointer.to_le_bytes());
        }
    }
}
