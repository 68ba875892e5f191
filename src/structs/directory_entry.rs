use super::helpers::*;
use super::*;
use crate::error::FormatError;

impl DirectoryEntry {
    /// Decode the entry starting at `offset` of a directory block
    pub fn decode(block: &[u8], offset: usize, has_file_type: bool) -> Result<Self, FormatError> {
        let header = bytes_at(block, offset, DIRECTORY_ENTRY_HEADER)?;
        let inode = u32_at(header, 0)?;
        let rec_len = u16_at(header, 4)?;
        let (name_len, file_type) = if has_file_type {
            (u8_at(header, 6)? as usize, FileType::from_tag(u8_at(header, 7)?))
        } else {
            (u16_at(header, 6)? as usize, FileType::Unknown)
        };
        let length = rec_len as usize;
        if length < DIRECTORY_ENTRY_HEADER
            || offset + length > block.len()
            || DIRECTORY_ENTRY_HEADER + name_len > length
        {
            return Err(FormatError::EntryLength {
                offset,
                length: rec_len,
            });
        }
        let name = bytes_at(block, offset + DIRECTORY_ENTRY_HEADER, name_len)?.to_vec();
        Ok(Self {
            inode,
            rec_len,
            file_type,
            name,
        })
    }

    /// Name with invalid UTF-8 replaced
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    pub fn is_dot(&self) -> bool {
        self.name == b"." || self.name == b".."
    }
}

/// Entries packed in one directory block, in on-disk order.
/// Iteration ends at the block boundary or after the first malformed entry.
#[derive(Debug, Clone)]
pub struct DirectoryEntries<'a> {
    block: &'a [u8],
    offset: usize,
    has_file_type: bool,
    failed: bool,
}

impl<'a> DirectoryEntries<'a> {
    pub fn new(block: &'a [u8], has_file_type: bool) -> Self {
        Self {
            block,
            offset: 0,
            has_file_type,
            failed: false,
        }
    }
}

impl Iterator for DirectoryEntries<'_> {
    type Item = Result<DirectoryEntry, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.block.len() {
            return None;
        }
        match DirectoryEntry::decode(self.block, self.offset, self.has_file_type) {
            Ok(entry) => {
                self.offset += entry.rec_len as usize;
                Some(Ok(entry))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
