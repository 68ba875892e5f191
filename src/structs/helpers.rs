use std::io::{ErrorKind, Read, Seek, SeekFrom};

use bytemuck::Pod;

use super::Decode;
use crate::error::{Error, FormatError};

fn field<T: Pod>(bytes: &[u8], offset: usize) -> Result<T, FormatError> {
    let needed = offset + std::mem::size_of::<T>();
    if bytes.len() < needed {
        return Err(FormatError::Truncated {
            needed,
            available: bytes.len(),
        });
    }
    Ok(bytemuck::pod_read_unaligned(&bytes[offset..needed]))
}

pub fn u8_at(bytes: &[u8], offset: usize) -> Result<u8, FormatError> {
    field(bytes, offset)
}

pub fn u16_at(bytes: &[u8], offset: usize) -> Result<u16, FormatError> {
    field(bytes, offset).map(u16::from_le)
}

pub fn u32_at(bytes: &[u8], offset: usize) -> Result<u32, FormatError> {
    field(bytes, offset).map(u32::from_le)
}

/// Borrow `length` bytes starting at `offset`
pub fn bytes_at(bytes: &[u8], offset: usize, length: usize) -> Result<&[u8], FormatError> {
    let needed = offset + length;
    bytes.get(offset..needed).ok_or(FormatError::Truncated {
        needed,
        available: bytes.len(),
    })
}

/// Seek to an absolute position and fill `buffer` completely
pub fn read_exact_at<D: Read + Seek + ?Sized>(
    device: &mut D,
    offset: u64,
    buffer: &mut [u8],
) -> Result<(), Error> {
    device.seek(SeekFrom::Start(offset))?;
    device.read_exact(buffer).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => Error::ShortRead {
            offset,
            expected: buffer.len(),
        },
        _ => Error::Io(e),
    })
}

/// Read and decode one fixed-size record
pub fn read_record<T: Decode, D: Read + Seek + ?Sized>(
    device: &mut D,
    offset: u64,
) -> Result<T, Error> {
    let mut raw = vec![0u8; T::SIZE];
    read_exact_at(device, offset, &mut raw)?;
    T::decode(&raw)
}
