// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use drm::Control;

use crate::buffer::BufferObject;
use crate::channel::Channel;
use crate::channel::EngineClass;
use crate::syncpoint::Syncpoint;
use crate::Result;

/// The Tegra-specific face of an open control node.
///
/// Thin entry point for the vendor request set; the underlying node is the
/// same descriptor the generic display protocol runs on.
pub struct Tegra<'a> {
    dev: &'a dyn Control,
}

impl<'a> Tegra<'a> {
    pub fn new(dev: &'a dyn Control) -> Tegra<'a> {
        Tegra { dev }
    }

    /// Allocates a kernel-backed memory object of at least `size` bytes.
    pub fn create_gem(&self, size: u64, flags: u32) -> Result<BufferObject<'a>> {
        BufferObject::create(self.dev, size, flags)
    }

    /// Opens a logical channel to one engine class.
    pub fn open_channel(&self, class: EngineClass, flags: u32) -> Result<Channel<'a>> {
        Channel::open(self.dev, class, flags)
    }

    /// Allocates a hardware syncpoint.
    pub fn allocate_syncpoint(&self) -> Result<Syncpoint<'a>> {
        Syncpoint::allocate(self.dev)
    }
}
