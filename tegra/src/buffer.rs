// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use base::MemoryMapping;
use drm::execute;
use drm::Control;
use log::warn;
use tegra_sys::*;

use crate::Result;

/// A GPU-addressable kernel-backed memory object.
///
/// The kernel handle is owned by this struct; `close` (and drop) unmaps any
/// live process mapping before releasing the handle, and a second close is a
/// no-op.
pub struct BufferObject<'a> {
    dev: &'a dyn Control,
    handle: Option<u32>,
    size: u64,
    mapping: Option<MemoryMapping>,
}

impl<'a> BufferObject<'a> {
    pub(crate) fn create(dev: &'a dyn Control, size: u64, flags: u32) -> Result<BufferObject<'a>> {
        let mut args = drm_tegra_gem_create {
            size,
            flags,
            ..Default::default()
        };
        // SAFETY: the argument matches the request layout.
        unsafe { execute(dev, DRM_IOCTL_TEGRA_GEM_CREATE(), &mut args)? };
        Ok(BufferObject {
            dev,
            handle: Some(args.handle),
            size: args.size,
            mapping: None,
        })
    }

    /// The kernel handle, while the object is open.
    pub fn handle(&self) -> Option<u32> {
        self.handle
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Maps the object into the process, lazily obtaining the kernel-side
    /// mapping offset. A second call returns the existing mapping.
    pub fn map(&mut self) -> Result<&MemoryMapping> {
        if self.mapping.is_none() {
            let handle = self.handle.ok_or(crate::Error::BufferClosed)?;
            let mut args = drm_tegra_gem_mmap {
                handle,
                ..Default::default()
            };
            // SAFETY: the argument matches the request layout.
            unsafe { execute(self.dev, DRM_IOCTL_TEGRA_GEM_MMAP(), &mut args)? };
            self.mapping = Some(self.dev.map(args.offset, self.size as usize)?);
        }
        Ok(self.mapping.as_ref().unwrap())
    }

    /// Drops the process mapping, if any.
    pub fn unmap(&mut self) {
        self.mapping = None;
    }

    /// Unmaps and releases the object. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        // The mapping must go before the handle it was derived from.
        self.mapping = None;
        if let Some(handle) = self.handle.take() {
            let mut args = drm_sys::drm_gem_close {
                handle,
                ..Default::default()
            };
            // SAFETY: the argument matches the request layout.
            unsafe { execute(self.dev, drm_sys::DRM_IOCTL_GEM_CLOSE(), &mut args)? };
        }
        Ok(())
    }
}

impl Drop for BufferObject<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to close buffer object: {}", e);
        }
    }
}
