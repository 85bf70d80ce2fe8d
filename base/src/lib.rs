// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! OS plumbing shared by the device-control crates: ioctl request codes and
//! wrappers, errno-backed results, descriptor ownership and memory mappings.

#![cfg(unix)]

mod descriptor;
mod errno;
pub mod ioctl;
mod mmap;

pub use descriptor::AsRawDescriptor;
pub use descriptor::Descriptor;
pub use descriptor::FromRawDescriptor;
pub use descriptor::IntoRawDescriptor;
pub use descriptor::RawDescriptor;
pub use descriptor::SafeDescriptor;
pub use errno::errno_result;
pub use errno::Error;
pub use errno::Result;
pub use ioctl::ioctl;
pub use ioctl::ioctl_with_mut_ptr;
pub use ioctl::ioctl_with_mut_ref;
pub use ioctl::ioctl_with_ptr;
pub use ioctl::ioctl_with_ref;
pub use ioctl::ioctl_with_val;
pub use ioctl::IoctlNr;
pub use mmap::MemoryMapping;
pub use mmap::MmapError;
pub use mmap::MmapResult;
pub use mmap::Protection;

/// Returns the system page size in bytes.
pub fn pagesize() -> usize {
    // SAFETY: trivially safe, sysconf does not touch memory.
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}
