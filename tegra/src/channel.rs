// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use drm::execute;
use drm::Control;
use enumn::N;
use libc::ENODEV;
use log::warn;
use tegra_sys::*;

use crate::buffer::BufferObject;
use crate::job::Job;
use crate::Error;
use crate::Result;

/// Hardware engine classes a channel can be bound to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum EngineClass {
    Host1x = 0x01,
    Gr2d = 0x51,
    Gr2dSb = 0x52,
    Vic = 0x5d,
    Gr3d = 0x60,
    Nvdec = 0xf0,
}

/// Hardware generations the channel-open request can negotiate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, N)]
#[repr(u32)]
pub enum SocVersion {
    Tegra20 = 0x20,
    Tegra30 = 0x30,
    Tegra114 = 0x35,
    Tegra124 = 0x40,
    Tegra210 = 0x21,
    Tegra186 = 0x18,
    Tegra194 = 0x19,
    Tegra234 = 0x23,
}

impl SocVersion {
    /// The bit shift of the condition field in the inline wait-condition
    /// opcode for this generation, where known.
    ///
    /// Generations outside the table make job creation fail; they are never
    /// defaulted.
    pub fn cond_shift(self) -> Option<u32> {
        match self {
            SocVersion::Tegra20
            | SocVersion::Tegra30
            | SocVersion::Tegra114
            | SocVersion::Tegra124
            | SocVersion::Tegra210 => Some(8),
            SocVersion::Tegra186 | SocVersion::Tegra194 => Some(10),
            SocVersion::Tegra234 => None,
        }
    }
}

/// Capability flags negotiated at channel open.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelCapabilities(pub u32);

impl ChannelCapabilities {
    pub fn cache_coherent(self) -> bool {
        self.0 & DRM_TEGRA_CHANNEL_CAP_CACHE_COHERENT != 0
    }
}

/// Access flags for mapping a memory object into a channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum MapFlags {
    Read = DRM_TEGRA_CHANNEL_MAP_READ,
    Write = DRM_TEGRA_CHANNEL_MAP_WRITE,
    ReadWrite = DRM_TEGRA_CHANNEL_MAP_READ_WRITE,
}

/// An open logical command path to one engine class.
///
/// Closing is idempotent once the context id is cleared. The channel is
/// single-threaded by design; the mapped-handle table uses `Rc`/`RefCell`
/// accordingly and is shared with the `Mapping`s created from it.
pub struct Channel<'a> {
    dev: &'a dyn Control,
    class: EngineClass,
    context: Option<u32>,
    version: SocVersion,
    capabilities: ChannelCapabilities,
    mapped: Rc<RefCell<BTreeSet<u32>>>,
}

impl<'a> Channel<'a> {
    /// Opens a channel bound to `class`. A class no hardware implements
    /// reports `EngineNotPresent` and leaves no partial state.
    pub(crate) fn open(dev: &'a dyn Control, class: EngineClass, flags: u32) -> Result<Channel<'a>> {
        let mut args = drm_tegra_channel_open {
            host1x_class: class as u32,
            flags,
            ..Default::default()
        };
        // SAFETY: the argument matches the request layout.
        match unsafe { execute(dev, DRM_IOCTL_TEGRA_CHANNEL_OPEN(), &mut args) } {
            Ok(()) => {}
            Err(drm::Error::Ioctl(_, e)) if e.errno() == ENODEV => {
                return Err(Error::EngineNotPresent(class as u32));
            }
            Err(e) => return Err(e.into()),
        }

        let version = match SocVersion::n(args.version) {
            Some(version) => version,
            None => {
                // The context is open kernel-side; do not leak it on the
                // error path.
                let mut close = drm_tegra_channel_close {
                    context: args.context,
                    ..Default::default()
                };
                // SAFETY: the argument matches the request layout.
                if let Err(e) = unsafe { execute(dev, DRM_IOCTL_TEGRA_CHANNEL_CLOSE(), &mut close) }
                {
                    warn!("failed to close channel with unknown version: {}", e);
                }
                return Err(Error::UnknownVersion(args.version));
            }
        };

        Ok(Channel {
            dev,
            class,
            context: Some(args.context),
            version,
            capabilities: ChannelCapabilities(args.capabilities),
            mapped: Rc::new(RefCell::new(BTreeSet::new())),
        })
    }

    pub fn class(&self) -> EngineClass {
        self.class
    }

    /// The kernel context id, while open.
    pub fn context(&self) -> Option<u32> {
        self.context
    }

    /// The protocol version negotiated at open.
    pub fn version(&self) -> SocVersion {
        self.version
    }

    pub fn capabilities(&self) -> ChannelCapabilities {
        self.capabilities
    }

    /// Maps `bo` into this channel's address space.
    ///
    /// A given (channel, object) pair maps at most once; a second map is a
    /// reported caller error, not fatal.
    pub fn map(&self, bo: &BufferObject, flags: MapFlags) -> Result<Mapping<'a>> {
        let context = self.context.ok_or(Error::ChannelClosed)?;
        let handle = bo.handle().ok_or(Error::BufferClosed)?;
        if self.mapped.borrow().contains(&handle) {
            return Err(Error::AlreadyMapped(handle));
        }
        let mut args = drm_tegra_channel_map {
            context,
            handle,
            flags: flags as u32,
            ..Default::default()
        };
        // SAFETY: the argument matches the request layout.
        unsafe { execute(self.dev, DRM_IOCTL_TEGRA_CHANNEL_MAP(), &mut args)? };
        self.mapped.borrow_mut().insert(handle);
        Ok(Mapping {
            dev: self.dev,
            context,
            id: Some(args.mapping),
            handle,
            registry: Rc::clone(&self.mapped),
        })
    }

    /// Starts an empty job against this channel.
    ///
    /// Fails on a closed channel, and on generations with no known
    /// wait-condition shift.
    pub fn create_job(&self) -> Result<Job<'a>> {
        let context = self.context.ok_or(Error::ChannelClosed)?;
        let cond_shift = self
            .version
            .cond_shift()
            .ok_or(Error::UnknownVersionShift(self.version))?;
        Ok(Job::new(self.dev, context, cond_shift))
    }

    /// Closes the channel. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        if let Some(context) = self.context.take() {
            let mut args = drm_tegra_channel_close {
                context,
                ..Default::default()
            };
            // SAFETY: the argument matches the request layout.
            unsafe { execute(self.dev, DRM_IOCTL_TEGRA_CHANNEL_CLOSE(), &mut args)? };
        }
        Ok(())
    }
}

impl Drop for Channel<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to close channel: {}", e);
        }
    }
}

/// One memory object bound into one channel's address space.
pub struct Mapping<'a> {
    dev: &'a dyn Control,
    context: u32,
    id: Option<u32>,
    handle: u32,
    registry: Rc<RefCell<BTreeSet<u32>>>,
}

impl Mapping<'_> {
    /// The kernel-assigned mapping id, while mapped.
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// The handle of the mapped memory object.
    pub fn handle(&self) -> u32 {
        self.handle
    }

    /// Unbinds the object from the channel. Safe to call more than once.
    pub fn unmap(&mut self) -> Result<()> {
        if let Some(id) = self.id.take() {
            self.registry.borrow_mut().remove(&self.handle);
            let mut args = drm_tegra_channel_unmap {
                context: self.context,
                mapping: id,
            };
            // SAFETY: the argument matches the request layout.
            unsafe { execute(self.dev, DRM_IOCTL_TEGRA_CHANNEL_UNMAP(), &mut args)? };
        }
        Ok(())
    }
}

impl Drop for Mapping<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.unmap() {
            warn!("failed to unmap channel mapping: {}", e);
        }
    }
}
