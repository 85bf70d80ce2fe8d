// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Tegra host1x control-interface bindings.
//!
//! The vendor-specific request set layered on the generic DRM interface:
//! GEM objects, logical channels, job submission and syncpoints. Vendor
//! request numbers start at `DRM_COMMAND_BASE`.

#![allow(non_camel_case_types)]

use base::ioctl_iowr_nr;
use drm_sys::DRM_COMMAND_BASE;
use drm_sys::DRM_IOCTL_BASE;
use static_assertions::const_assert_eq;

pub const DRM_TEGRA_CHANNEL_MAP_READ: u32 = 1 << 0;
pub const DRM_TEGRA_CHANNEL_MAP_WRITE: u32 = 1 << 1;
pub const DRM_TEGRA_CHANNEL_MAP_READ_WRITE: u32 =
    DRM_TEGRA_CHANNEL_MAP_READ | DRM_TEGRA_CHANNEL_MAP_WRITE;

pub const DRM_TEGRA_CHANNEL_CAP_CACHE_COHERENT: u32 = 1 << 0;

pub const DRM_TEGRA_SUBMIT_RELOC_SECTOR_LAYOUT: u32 = 1 << 0;

pub const DRM_TEGRA_SUBMIT_COMMAND_GATHER_UPTR: u32 = 0;
pub const DRM_TEGRA_SUBMIT_COMMAND_WAIT_SYNCPT: u32 = 1;

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_gem_create {
    pub size: u64,
    pub flags: u32,
    pub handle: u32,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_gem_create>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_gem_mmap {
    pub handle: u32,
    pub pad: u32,
    pub offset: u64,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_gem_mmap>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_channel_open {
    pub host1x_class: u32,
    pub flags: u32,
    pub context: u32,
    pub version: u32,
    pub capabilities: u32,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_channel_open>(), 20);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_channel_close {
    pub context: u32,
    pub padding: u32,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_channel_close>(), 8);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_channel_map {
    pub context: u32,
    pub handle: u32,
    pub flags: u32,
    pub mapping: u32,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_channel_map>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_channel_unmap {
    pub context: u32,
    pub mapping: u32,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_channel_unmap>(), 8);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_submit_reloc {
    pub target_offset: u64,
    pub gather_offset_words: u32,
    pub shift: u32,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_submit_reloc>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_submit_buffer {
    pub mapping: u32,
    pub flags: u32,
    pub reloc: drm_tegra_submit_reloc,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_submit_buffer>(), 24);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_submit_syncpt {
    pub id: u32,
    pub flags: u32,
    pub increments: u32,
    pub value: u32,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_submit_syncpt>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_submit_gather_uptr {
    pub words: u32,
    pub reserved: [u32; 3],
}
const_assert_eq!(std::mem::size_of::<drm_tegra_submit_gather_uptr>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_submit_wait_syncpt {
    pub id: u32,
    pub value: u32,
    pub reserved: [u32; 2],
}
const_assert_eq!(std::mem::size_of::<drm_tegra_submit_wait_syncpt>(), 16);

#[repr(C)]
#[derive(Copy, Clone)]
pub union drm_tegra_submit_command_data {
    pub gather_uptr: drm_tegra_submit_gather_uptr,
    pub wait_syncpt: drm_tegra_submit_wait_syncpt,
    pub reserved: [u32; 4],
}
const_assert_eq!(std::mem::size_of::<drm_tegra_submit_command_data>(), 16);

impl Default for drm_tegra_submit_command_data {
    fn default() -> Self {
        drm_tegra_submit_command_data { reserved: [0; 4] }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_submit_command {
    pub type_: u32,
    pub flags: u32,
    pub data: drm_tegra_submit_command_data,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_submit_command>(), 24);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_channel_submit {
    pub context: u32,
    pub num_bufs: u32,
    pub num_cmds: u32,
    pub gather_data_words: u32,
    pub bufs_ptr: u64,
    pub cmds_ptr: u64,
    pub gather_data_ptr: u64,
    pub syncobj_in: u32,
    pub syncobj_out: u32,
    pub syncpt: drm_tegra_submit_syncpt,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_channel_submit>(), 64);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_syncpoint_allocate {
    pub id: u32,
    pub padding: u32,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_syncpoint_allocate>(), 8);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_syncpoint_free {
    pub id: u32,
    pub padding: u32,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_syncpoint_free>(), 8);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_tegra_syncpoint_wait {
    pub timeout_ns: i64,
    pub id: u32,
    pub threshold: u32,
    pub value: u32,
    pub padding: u32,
}
const_assert_eq!(std::mem::size_of::<drm_tegra_syncpoint_wait>(), 24);

ioctl_iowr_nr!(
    DRM_IOCTL_TEGRA_GEM_CREATE,
    DRM_IOCTL_BASE,
    DRM_COMMAND_BASE,
    drm_tegra_gem_create
);
ioctl_iowr_nr!(
    DRM_IOCTL_TEGRA_GEM_MMAP,
    DRM_IOCTL_BASE,
    DRM_COMMAND_BASE + 0x01,
    drm_tegra_gem_mmap
);
ioctl_iowr_nr!(
    DRM_IOCTL_TEGRA_CHANNEL_OPEN,
    DRM_IOCTL_BASE,
    DRM_COMMAND_BASE + 0x10,
    drm_tegra_channel_open
);
ioctl_iowr_nr!(
    DRM_IOCTL_TEGRA_CHANNEL_CLOSE,
    DRM_IOCTL_BASE,
    DRM_COMMAND_BASE + 0x11,
    drm_tegra_channel_close
);
ioctl_iowr_nr!(
    DRM_IOCTL_TEGRA_CHANNEL_MAP,
    DRM_IOCTL_BASE,
    DRM_COMMAND_BASE + 0x12,
    drm_tegra_channel_map
);
ioctl_iowr_nr!(
    DRM_IOCTL_TEGRA_CHANNEL_UNMAP,
    DRM_IOCTL_BASE,
    DRM_COMMAND_BASE + 0x13,
    drm_tegra_channel_unmap
);
ioctl_iowr_nr!(
    DRM_IOCTL_TEGRA_CHANNEL_SUBMIT,
    DRM_IOCTL_BASE,
    DRM_COMMAND_BASE + 0x14,
    drm_tegra_channel_submit
);
ioctl_iowr_nr!(
    DRM_IOCTL_TEGRA_SYNCPOINT_ALLOCATE,
    DRM_IOCTL_BASE,
    DRM_COMMAND_BASE + 0x20,
    drm_tegra_syncpoint_allocate
);
ioctl_iowr_nr!(
    DRM_IOCTL_TEGRA_SYNCPOINT_FREE,
    DRM_IOCTL_BASE,
    DRM_COMMAND_BASE + 0x21,
    drm_tegra_syncpoint_free
);
ioctl_iowr_nr!(
    DRM_IOCTL_TEGRA_SYNCPOINT_WAIT,
    DRM_IOCTL_BASE,
    DRM_COMMAND_BASE + 0x22,
    drm_tegra_syncpoint_wait
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_codes() {
        assert_eq!(0xc0106440, DRM_IOCTL_TEGRA_GEM_CREATE());
        assert_eq!(0xc0106441, DRM_IOCTL_TEGRA_GEM_MMAP());
        assert_eq!(0xc0146450, DRM_IOCTL_TEGRA_CHANNEL_OPEN());
        assert_eq!(0xc0086451, DRM_IOCTL_TEGRA_CHANNEL_CLOSE());
        assert_eq!(0xc0106452, DRM_IOCTL_TEGRA_CHANNEL_MAP());
        assert_eq!(0xc0086453, DRM_IOCTL_TEGRA_CHANNEL_UNMAP());
        assert_eq!(0xc0406454, DRM_IOCTL_TEGRA_CHANNEL_SUBMIT());
        assert_eq!(0xc0086460, DRM_IOCTL_TEGRA_SYNCPOINT_ALLOCATE());
        assert_eq!(0xc0086461, DRM_IOCTL_TEGRA_SYNCPOINT_FREE());
        assert_eq!(0xc0186462, DRM_IOCTL_TEGRA_SYNCPOINT_WAIT());
    }
}
