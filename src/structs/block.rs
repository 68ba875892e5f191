use std::fmt::Display;

use super::helpers::*;
use super::*;
use crate::error::FormatError;

const BYTES_PER_LINE: usize = 16;

impl Block {
    /// Interpret the block as an array of little-endian block pointers
    pub fn pointer(&self, slot: usize) -> Result<u32, FormatError> {
        u32_at(&self.data, slot * std::mem::size_of::<u32>())
    }

    pub fn pointer_count(&self) -> usize {
        self.data.len() / std::mem::size_of::<u32>()
    }

    /// Block contains only zero bytes
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "block {} ({} bytes)", self.index, self.data.len())?;
        let mut skipped = false;
        for (line, chunk) in self.data.chunks(BYTES_PER_LINE).enumerate() {
            if chunk.iter().all(|&b| b == 0) {
                if !skipped {
                    writeln!(f, "*")?;
                    skipped = true;
                }
                continue;
            }
            skipped = false;
            write!(f, "{:08x} ", line * BYTES_PER_LINE)?;
            for byte in chunk {
                write!(f, " {byte:02x}")?;
            }
            write!(f, "  |")?;
            for &byte in chunk {
                let c = if byte.is_ascii_graphic() || byte == b' ' {
                    byte as char
                } else {
                    '.'
                };
                write!(f, "{c}")?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}
