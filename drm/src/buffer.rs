// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Dumb buffers and framebuffer creation.

use base::MemoryMapping;
use drm_sys::*;
use log::warn;

use crate::device::execute;
use crate::resources::Framebuffer;
use crate::Control;
use crate::Error;
use crate::Format;
use crate::Modifier;
use crate::Result;

/// A simple, CPU-mappable, linear memory surface usable as display scanout.
///
/// The kernel handle is owned by this struct: dropping it (or calling
/// `close`) unmaps any live mapping first, then releases the handle. A
/// second `close` is a no-op.
pub struct DumbBuffer<'a> {
    dev: &'a dyn Control,
    handle: Option<u32>,
    width: u32,
    height: u32,
    pitch: u32,
    size: u64,
    mapping: Option<MemoryMapping>,
}

impl<'a> DumbBuffer<'a> {
    /// Allocates a `width` x `height` buffer at `bpp` bits per pixel.
    pub fn create(
        dev: &'a dyn Control,
        width: u32,
        height: u32,
        bpp: u32,
        flags: u32,
    ) -> Result<DumbBuffer<'a>> {
        let mut args = drm_mode_create_dumb {
            width,
            height,
            bpp,
            flags,
            ..Default::default()
        };
        // SAFETY: the argument matches the request layout.
        unsafe { execute(dev, DRM_IOCTL_MODE_CREATE_DUMB(), &mut args)? };
        Ok(DumbBuffer {
            dev,
            handle: Some(args.handle),
            width,
            height,
            pitch: args.pitch,
            size: args.size,
            mapping: None,
        })
    }

    /// The kernel handle, while the buffer is open.
    pub fn handle(&self) -> Option<u32> {
        self.handle
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row, as computed by the kernel at allocation.
    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Maps the buffer into the process, lazily obtaining the kernel-side
    /// mapping offset. A second call returns the existing mapping.
    pub fn map(&mut self) -> Result<&MemoryMapping> {
        if self.mapping.is_none() {
            let handle = self.handle.ok_or(Error::Ioctl(
                DRM_IOCTL_MODE_MAP_DUMB(),
                base::Error::new(libc::EBADF),
            ))?;
            let mut args = drm_mode_map_dumb {
                handle,
                ..Default::default()
            };
            // SAFETY: the argument matches the request layout.
            unsafe { execute(self.dev, DRM_IOCTL_MODE_MAP_DUMB(), &mut args)? };
            self.mapping = Some(self.dev.map(args.offset, self.size as usize)?);
        }
        Ok(self.mapping.as_ref().unwrap())
    }

    /// Writes one packed pixel at `(x, y)`.
    pub fn write_pixel(&mut self, x: u32, y: u32, pixel: &[u8]) -> Result<()> {
        let offset = y as usize * self.pitch as usize + x as usize * pixel.len();
        self.map()?.write_slice(pixel, offset)?;
        Ok(())
    }

    /// Unmaps and releases the buffer. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        // Unmap before the handle goes away.
        self.mapping = None;
        if let Some(handle) = self.handle.take() {
            let mut args = drm_mode_destroy_dumb { handle };
            // SAFETY: the argument matches the request layout.
            unsafe { execute(self.dev, DRM_IOCTL_MODE_DESTROY_DUMB(), &mut args)? };
        }
        Ok(())
    }
}

impl Drop for DumbBuffer<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to destroy dumb buffer: {}", e);
        }
    }
}

/// One plane of a framebuffer: a memory object with its layout.
#[derive(Copy, Clone, Debug)]
pub struct FramebufferPlane {
    pub handle: u32,
    pub pitch: u32,
    pub offset: u32,
    pub modifier: Modifier,
}

/// Composes up to 4 plane descriptors into one framebuffer.
pub fn add_framebuffer(
    dev: &dyn Control,
    width: u32,
    height: u32,
    format: Format,
    flags: u32,
    planes: &[FramebufferPlane],
) -> Result<Framebuffer> {
    if planes.len() > 4 {
        return Err(Error::ExcessPlanes(planes.len()));
    }
    let mut args = drm_mode_fb_cmd2 {
        width,
        height,
        pixel_format: format.fourcc(),
        flags,
        ..Default::default()
    };
    for (i, plane) in planes.iter().enumerate() {
        args.handles[i] = plane.handle;
        args.pitches[i] = plane.pitch;
        args.offsets[i] = plane.offset;
        args.modifier[i] = plane.modifier.0;
    }
    // SAFETY: the argument matches the request layout.
    unsafe { execute(dev, DRM_IOCTL_MODE_ADDFB2(), &mut args)? };
    Ok(Framebuffer { id: args.fb_id })
}
