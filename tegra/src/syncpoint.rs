// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use drm::execute;
use drm::Control;
use log::warn;
use tegra_sys::*;

use crate::Result;

/// A kernel-allocated hardware counter used to fence command-stream
/// completion.
pub struct Syncpoint<'a> {
    dev: &'a dyn Control,
    id: Option<u32>,
}

impl<'a> Syncpoint<'a> {
    pub(crate) fn allocate(dev: &'a dyn Control) -> Result<Syncpoint<'a>> {
        let mut args = drm_tegra_syncpoint_allocate::default();
        // SAFETY: the argument matches the request layout.
        unsafe { execute(dev, DRM_IOCTL_TEGRA_SYNCPOINT_ALLOCATE(), &mut args)? };
        Ok(Syncpoint {
            dev,
            id: Some(args.id),
        })
    }

    /// The counter id, while allocated.
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// Returns the counter to the kernel. Safe to call more than once.
    pub fn free(&mut self) -> Result<()> {
        if let Some(id) = self.id.take() {
            let mut args = drm_tegra_syncpoint_free {
                id,
                ..Default::default()
            };
            // SAFETY: the argument matches the request layout.
            unsafe { execute(self.dev, DRM_IOCTL_TEGRA_SYNCPOINT_FREE(), &mut args)? };
        }
        Ok(())
    }
}

impl Drop for Syncpoint<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.free() {
            warn!("failed to free syncpoint: {}", e);
        }
    }
}
