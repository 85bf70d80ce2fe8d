// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::fs::File;
use std::mem;
use std::os::unix::io::AsRawFd;
use std::os::unix::io::FromRawFd;
use std::os::unix::io::IntoRawFd;
use std::os::unix::io::RawFd;

use crate::errno_result;
use crate::Result;

pub type RawDescriptor = RawFd;

/// Trait for returning the underlying raw descriptor without giving up
/// ownership of it.
pub trait AsRawDescriptor {
    fn as_raw_descriptor(&self) -> RawDescriptor;
}

/// Trait for forfeiting ownership of the current raw descriptor and returning
/// it.
pub trait IntoRawDescriptor {
    fn into_raw_descriptor(self) -> RawDescriptor;
}

pub trait FromRawDescriptor {
    /// # Safety
    /// Safe only if the caller ensures nothing else has access to the
    /// descriptor after passing it to `from_raw_descriptor`.
    unsafe fn from_raw_descriptor(descriptor: RawDescriptor) -> Self;
}

/// Wraps a RawDescriptor and safely closes it when self falls out of scope.
#[derive(Debug, PartialEq, Eq)]
pub struct SafeDescriptor {
    descriptor: RawDescriptor,
}

impl SafeDescriptor {
    /// Clones this descriptor, internally creating a new descriptor.
    ///
    /// The new descriptor refers to the same underlying kernel object as the
    /// original.
    pub fn try_clone(&self) -> Result<SafeDescriptor> {
        // SAFETY: self.descriptor is valid for the lifetime of &self and
        // fcntl does not retain it.
        let descriptor = unsafe { libc::fcntl(self.descriptor, libc::F_DUPFD_CLOEXEC, 0) };
        if descriptor < 0 {
            return errno_result();
        }
        Ok(SafeDescriptor { descriptor })
    }
}

impl Drop for SafeDescriptor {
    fn drop(&mut self) {
        // SAFETY: the descriptor is owned by this struct and not closed
        // anywhere else.
        let _ = unsafe { libc::close(self.descriptor) };
    }
}

impl AsRawDescriptor for SafeDescriptor {
    fn as_raw_descriptor(&self) -> RawDescriptor {
        self.descriptor
    }
}

impl IntoRawDescriptor for SafeDescriptor {
    fn into_raw_descriptor(self) -> RawDescriptor {
        let descriptor = self.descriptor;
        mem::forget(self);
        descriptor
    }
}

impl FromRawDescriptor for SafeDescriptor {
    unsafe fn from_raw_descriptor(descriptor: RawDescriptor) -> Self {
        SafeDescriptor { descriptor }
    }
}

impl From<File> for SafeDescriptor {
    fn from(f: File) -> SafeDescriptor {
        // SAFETY: we own the File and forfeit its descriptor here.
        unsafe { SafeDescriptor::from_raw_descriptor(f.into_raw_fd()) }
    }
}

impl From<SafeDescriptor> for File {
    fn from(s: SafeDescriptor) -> File {
        // SAFETY: the descriptor's sole owner is converted into the File.
        unsafe { File::from_raw_fd(s.into_raw_descriptor()) }
    }
}

impl AsRawDescriptor for File {
    fn as_raw_descriptor(&self) -> RawDescriptor {
        self.as_raw_fd()
    }
}

impl IntoRawDescriptor for File {
    fn into_raw_descriptor(self) -> RawDescriptor {
        self.into_raw_fd()
    }
}

/// A simple wrapper around a RawDescriptor that does not manage its lifetime.
///
/// Most usages should prefer SafeDescriptor.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Descriptor(pub RawDescriptor);

impl AsRawDescriptor for Descriptor {
    fn as_raw_descriptor(&self) -> RawDescriptor {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_clone_yields_new_descriptor() {
        let descriptor = SafeDescriptor::from(tempfile::tempfile().unwrap());
        let cloned = descriptor.try_clone().unwrap();
        assert_ne!(descriptor.as_raw_descriptor(), cloned.as_raw_descriptor());
    }
}
