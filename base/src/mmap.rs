// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Memory mappings of device and anonymous memory.

use std::cmp::min;
use std::mem::size_of;
use std::ptr::copy_nonoverlapping;
use std::ptr::null_mut;
use std::ptr::read_unaligned;
use std::ptr::write_unaligned;

use libc::c_int;
use libc::PROT_READ;
use libc::PROT_WRITE;
use remain::sorted;
use zerocopy::FromBytes;
use zerocopy::IntoBytes;

use crate::errno::Error as ErrnoError;
use crate::AsRawDescriptor;
use crate::RawDescriptor;

#[sorted]
#[derive(Debug, thiserror::Error)]
pub enum MmapError {
    #[error("requested memory out of range")]
    InvalidAddress,
    #[error("requested offset is out of range of off_t")]
    InvalidOffset,
    #[error("mmap system call failed: {0}")]
    SystemCallFailed(#[source] ErrnoError),
}

pub type MmapResult<T> = std::result::Result<T, MmapError>;

/// Memory access type for a mapping.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Protection {
    read: bool,
    write: bool,
}

impl Protection {
    /// Returns Protection allowing read/write access.
    pub fn read_write() -> Protection {
        Protection {
            read: true,
            write: true,
        }
    }

    /// Returns Protection allowing read access.
    pub fn read() -> Protection {
        Protection {
            read: true,
            write: false,
        }
    }
}

impl From<Protection> for c_int {
    fn from(p: Protection) -> Self {
        let mut value = 0;
        if p.read {
            value |= PROT_READ;
        }
        if p.write {
            value |= PROT_WRITE;
        }
        value
    }
}

/// Wraps an anonymous or descriptor-backed shared memory mapping into the
/// current process. Unmaps the memory when dropped.
#[derive(Debug)]
pub struct MemoryMapping {
    addr: *mut u8,
    size: usize,
}

// SAFETY: the mapped region is owned exclusively by this struct for its whole
// lifetime.
unsafe impl Send for MemoryMapping {}
// SAFETY: see above.
unsafe impl Sync for MemoryMapping {}

impl MemoryMapping {
    /// Creates an anonymous shared mapping of `size` bytes.
    pub fn new(size: usize) -> MmapResult<MemoryMapping> {
        // SAFETY: this does not touch any address of the existing address
        // space and the result is checked.
        unsafe { MemoryMapping::try_mmap(size, Protection::read_write().into(), None) }
    }

    /// Maps `size` bytes of `descriptor` starting at `offset`.
    pub fn from_descriptor_offset(
        descriptor: &dyn AsRawDescriptor,
        size: usize,
        offset: u64,
    ) -> MmapResult<MemoryMapping> {
        MemoryMapping::from_descriptor_offset_protection(
            descriptor,
            size,
            offset,
            Protection::read_write(),
        )
    }

    /// Maps `size` bytes of `descriptor` starting at `offset` with the given
    /// protection.
    pub fn from_descriptor_offset_protection(
        descriptor: &dyn AsRawDescriptor,
        size: usize,
        offset: u64,
        prot: Protection,
    ) -> MmapResult<MemoryMapping> {
        if offset > libc::off_t::MAX as u64 {
            return Err(MmapError::InvalidOffset);
        }
        // SAFETY: this does not touch any address of the existing address
        // space and the result is checked.
        unsafe {
            MemoryMapping::try_mmap(
                size,
                prot.into(),
                Some((descriptor.as_raw_descriptor(), offset)),
            )
        }
    }

    unsafe fn try_mmap(
        size: usize,
        prot: c_int,
        descriptor: Option<(RawDescriptor, u64)>,
    ) -> MmapResult<MemoryMapping> {
        let mut flags = libc::MAP_SHARED;
        if descriptor.is_none() {
            flags |= libc::MAP_ANONYMOUS;
        }
        let (fd, offset) = descriptor.unwrap_or((-1, 0));

        let addr = libc::mmap(null_mut(), size, prot, flags, fd, offset as libc::off_t);
        if addr == libc::MAP_FAILED {
            return Err(MmapError::SystemCallFailed(ErrnoError::last()));
        }

        Ok(MemoryMapping {
            addr: addr as *mut u8,
            size,
        })
    }

    /// Returns a pointer to the start of the mapping.
    ///
    /// Calls into the kernel fill and read mapped memory through this pointer;
    /// everything else should go through the checked accessors below.
    pub fn as_ptr(&self) -> *mut u8 {
        self.addr
    }

    /// Returns the length of the mapping in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    fn range_end(&self, offset: usize, count: usize) -> MmapResult<()> {
        let end = offset.checked_add(count).ok_or(MmapError::InvalidAddress)?;
        if end > self.size {
            return Err(MmapError::InvalidAddress);
        }
        Ok(())
    }

    /// Copies `buf` into the mapping starting at `offset`, truncating at the
    /// end of the mapping. Returns the number of bytes copied.
    pub fn write_slice(&self, buf: &[u8], offset: usize) -> MmapResult<usize> {
        match self.size.checked_sub(offset) {
            Some(size_past_offset) => {
                let bytes_copied = min(size_past_offset, buf.len());
                // SAFETY: the equation above keeps the copy in range of both
                // buffers, which cannot overlap.
                unsafe {
                    copy_nonoverlapping(buf.as_ptr(), self.addr.add(offset), bytes_copied);
                }
                Ok(bytes_copied)
            }
            None => Err(MmapError::InvalidAddress),
        }
    }

    /// Copies from the mapping starting at `offset` into `buf`, truncating at
    /// the end of the mapping. Returns the number of bytes copied.
    pub fn read_slice(&self, buf: &mut [u8], offset: usize) -> MmapResult<usize> {
        match self.size.checked_sub(offset) {
            Some(size_past_offset) => {
                let bytes_copied = min(size_past_offset, buf.len());
                // SAFETY: the equation above keeps the copy in range of both
                // buffers, which cannot overlap.
                unsafe {
                    copy_nonoverlapping(self.addr.add(offset), buf.as_mut_ptr(), bytes_copied);
                }
                Ok(bytes_copied)
            }
            None => Err(MmapError::InvalidAddress),
        }
    }

    /// Writes an object to the mapping at `offset`. Fails if it would extend
    /// past the end.
    pub fn write_obj<T: IntoBytes>(&self, val: T, offset: usize) -> MmapResult<()> {
        self.range_end(offset, size_of::<T>())?;
        // SAFETY: bounds checked above; unaligned writes are permitted.
        unsafe {
            write_unaligned(self.addr.add(offset) as *mut T, val);
        }
        Ok(())
    }

    /// Reads an object from the mapping at `offset`. Fails if it would extend
    /// past the end.
    pub fn read_obj<T: FromBytes>(&self, offset: usize) -> MmapResult<T> {
        self.range_end(offset, size_of::<T>())?;
        // SAFETY: bounds checked above and T admits any bit pattern.
        unsafe { Ok(read_unaligned(self.addr.add(offset) as *const T)) }
    }

    /// Fills the whole mapping with `value`.
    pub fn fill(&self, value: u8) {
        // SAFETY: the write covers exactly the owned region.
        unsafe {
            std::ptr::write_bytes(self.addr, value, self.size);
        }
    }
}

impl Drop for MemoryMapping {
    fn drop(&mut self) {
        // SAFETY: this mapping was obtained from mmap with the stored size and
        // nothing else unmaps it.
        unsafe {
            libc::munmap(self.addr as *mut libc::c_void, self.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_map() {
        let m = MemoryMapping::new(1024).unwrap();
        assert_eq!(1024, m.size());
    }

    #[test]
    fn obj_round_trip() {
        let m = MemoryMapping::new(1024).unwrap();
        m.write_obj(0xdead_beefu32, 16).unwrap();
        assert_eq!(0xdead_beefu32, m.read_obj::<u32>(16).unwrap());
    }

    #[test]
    fn slice_truncated() {
        let m = MemoryMapping::new(16).unwrap();
        assert_eq!(4, m.write_slice(&[1, 2, 3, 4, 5, 6], 12).unwrap());
        let mut buf = [0u8; 6];
        assert_eq!(4, m.read_slice(&mut buf, 12).unwrap());
        assert_eq!([1, 2, 3, 4, 0, 0], buf);
    }

    #[test]
    fn obj_out_of_range() {
        let m = MemoryMapping::new(16).unwrap();
        assert!(m.write_obj(0u64, 12).is_err());
        assert!(m.read_obj::<u64>(usize::MAX).is_err());
    }

    #[test]
    fn fill_then_read() {
        let m = MemoryMapping::new(32).unwrap();
        m.fill(0xab);
        assert_eq!(0xabab_abab_u32, m.read_obj::<u32>(28).unwrap());
    }
}
