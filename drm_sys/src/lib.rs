// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Generic DRM control-interface bindings.
//!
//! Fixed-layout request structures and their request codes. User pointers
//! embedded in requests are carried as `u64`, matching the 64-bit interface
//! layout. Every structure's size is pinned at compile time so that a layout
//! change cannot silently truncate an exchange.

#![allow(non_camel_case_types)]

use base::ioctl_io_nr;
use base::ioctl_iow_nr;
use base::ioctl_iowr_nr;
use static_assertions::const_assert_eq;

pub const DRM_IOCTL_BASE: u32 = 0x64;
pub const DRM_COMMAND_BASE: u32 = 0x40;

pub const DRM_CAP_DUMB_BUFFER: u64 = 0x1;
pub const DRM_CAP_VBLANK_HIGH_CRTC: u64 = 0x2;
pub const DRM_CAP_DUMB_PREFERRED_DEPTH: u64 = 0x3;
pub const DRM_CAP_DUMB_PREFER_SHADOW: u64 = 0x4;
pub const DRM_CAP_PRIME: u64 = 0x5;
pub const DRM_CAP_TIMESTAMP_MONOTONIC: u64 = 0x6;
pub const DRM_CAP_ASYNC_PAGE_FLIP: u64 = 0x7;
pub const DRM_CAP_CURSOR_WIDTH: u64 = 0x8;
pub const DRM_CAP_CURSOR_HEIGHT: u64 = 0x9;
pub const DRM_CAP_ADDFB2_MODIFIERS: u64 = 0x10;
pub const DRM_CAP_PAGE_FLIP_TARGET: u64 = 0x11;
pub const DRM_CAP_CRTC_IN_VBLANK_EVENT: u64 = 0x12;
pub const DRM_CAP_SYNCOBJ: u64 = 0x13;

pub const DRM_PRIME_CAP_IMPORT: u64 = 0x1;
pub const DRM_PRIME_CAP_EXPORT: u64 = 0x2;

pub const DRM_CLIENT_CAP_STEREO_3D: u64 = 0x1;
pub const DRM_CLIENT_CAP_UNIVERSAL_PLANES: u64 = 0x2;
pub const DRM_CLIENT_CAP_ATOMIC: u64 = 0x3;
pub const DRM_CLIENT_CAP_ASPECT_RATIO: u64 = 0x4;
pub const DRM_CLIENT_CAP_WRITEBACK_CONNECTORS: u64 = 0x5;

pub const DRM_MODE_FLAG_PHSYNC: u32 = 1 << 0;
pub const DRM_MODE_FLAG_NHSYNC: u32 = 1 << 1;
pub const DRM_MODE_FLAG_PVSYNC: u32 = 1 << 2;
pub const DRM_MODE_FLAG_NVSYNC: u32 = 1 << 3;
pub const DRM_MODE_FLAG_INTERLACE: u32 = 1 << 4;
pub const DRM_MODE_FLAG_DBLSCAN: u32 = 1 << 5;
pub const DRM_MODE_FLAG_CSYNC: u32 = 1 << 6;
pub const DRM_MODE_FLAG_PCSYNC: u32 = 1 << 7;
pub const DRM_MODE_FLAG_NCSYNC: u32 = 1 << 8;
pub const DRM_MODE_FLAG_HSKEW: u32 = 1 << 9;
pub const DRM_MODE_FLAG_BCAST: u32 = 1 << 10;
pub const DRM_MODE_FLAG_PIXMUX: u32 = 1 << 11;
pub const DRM_MODE_FLAG_DBLCLK: u32 = 1 << 12;
pub const DRM_MODE_FLAG_CLKDIV2: u32 = 1 << 13;

pub const DRM_MODE_TYPE_BUILTIN: u32 = 1 << 0;
pub const DRM_MODE_TYPE_CLOCK_C: u32 = (1 << 1) | DRM_MODE_TYPE_BUILTIN;
pub const DRM_MODE_TYPE_CRTC_C: u32 = (1 << 2) | DRM_MODE_TYPE_BUILTIN;
pub const DRM_MODE_TYPE_PREFERRED: u32 = 1 << 3;
pub const DRM_MODE_TYPE_DEFAULT: u32 = 1 << 4;
pub const DRM_MODE_TYPE_USERDEF: u32 = 1 << 5;
pub const DRM_MODE_TYPE_DRIVER: u32 = 1 << 6;

pub const DRM_MODE_PROP_PENDING: u32 = 1 << 0;
pub const DRM_MODE_PROP_RANGE: u32 = 1 << 1;
pub const DRM_MODE_PROP_IMMUTABLE: u32 = 1 << 2;
pub const DRM_MODE_PROP_ENUM: u32 = 1 << 3;
pub const DRM_MODE_PROP_BLOB: u32 = 1 << 4;
pub const DRM_MODE_PROP_BITMASK: u32 = 1 << 5;
pub const DRM_MODE_PROP_EXTENDED_TYPE: u32 = 0x0000ffc0;
pub const DRM_MODE_PROP_OBJECT: u32 = 1 << 6;
pub const DRM_MODE_PROP_SIGNED_RANGE: u32 = 2 << 6;
pub const DRM_MODE_PROP_ATOMIC: u32 = 0x8000_0000;

pub const DRM_MODE_OBJECT_CRTC: u32 = 0xcccccccc;
pub const DRM_MODE_OBJECT_CONNECTOR: u32 = 0xc0c0c0c0;
pub const DRM_MODE_OBJECT_ENCODER: u32 = 0xe0e0e0e0;
pub const DRM_MODE_OBJECT_MODE: u32 = 0xdededede;
pub const DRM_MODE_OBJECT_PROPERTY: u32 = 0xb0b0b0b0;
pub const DRM_MODE_OBJECT_FB: u32 = 0xfbfbfbfb;
pub const DRM_MODE_OBJECT_BLOB: u32 = 0xbbbbbbbb;
pub const DRM_MODE_OBJECT_PLANE: u32 = 0xeeeeeeee;
pub const DRM_MODE_OBJECT_ANY: u32 = 0;

pub const DRM_MODE_CONNECTED: u32 = 1;
pub const DRM_MODE_DISCONNECTED: u32 = 2;
pub const DRM_MODE_UNKNOWNCONNECTION: u32 = 3;

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_version {
    pub version_major: i32,
    pub version_minor: i32,
    pub version_patchlevel: i32,
    pub name_len: u64,
    pub name: u64,
    pub date_len: u64,
    pub date: u64,
    pub desc_len: u64,
    pub desc: u64,
}
const_assert_eq!(std::mem::size_of::<drm_version>(), 64);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_gem_close {
    pub handle: u32,
    pub pad: u32,
}
const_assert_eq!(std::mem::size_of::<drm_gem_close>(), 8);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_get_cap {
    pub capability: u64,
    pub value: u64,
}
const_assert_eq!(std::mem::size_of::<drm_get_cap>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_set_client_cap {
    pub capability: u64,
    pub value: u64,
}
const_assert_eq!(std::mem::size_of::<drm_set_client_cap>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_prime_handle {
    pub handle: u32,
    pub flags: u32,
    pub fd: i32,
}
const_assert_eq!(std::mem::size_of::<drm_prime_handle>(), 12);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_card_res {
    pub fb_id_ptr: u64,
    pub crtc_id_ptr: u64,
    pub connector_id_ptr: u64,
    pub encoder_id_ptr: u64,
    pub count_fbs: u32,
    pub count_crtcs: u32,
    pub count_connectors: u32,
    pub count_encoders: u32,
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}
const_assert_eq!(std::mem::size_of::<drm_mode_card_res>(), 64);

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct drm_mode_modeinfo {
    pub clock: u32,
    pub hdisplay: u16,
    pub hsync_start: u16,
    pub hsync_end: u16,
    pub htotal: u16,
    pub hskew: u16,
    pub vdisplay: u16,
    pub vsync_start: u16,
    pub vsync_end: u16,
    pub vtotal: u16,
    pub vscan: u16,
    pub vrefresh: u32,
    pub flags: u32,
    pub type_: u32,
    pub name: [u8; 32],
}
const_assert_eq!(std::mem::size_of::<drm_mode_modeinfo>(), 68);

impl Default for drm_mode_modeinfo {
    fn default() -> Self {
        // SAFETY: all fields are plain integers for which zero is valid.
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_crtc {
    pub set_connectors_ptr: u64,
    pub count_connectors: u32,
    pub crtc_id: u32,
    pub fb_id: u32,
    pub x: u32,
    pub y: u32,
    pub gamma_size: u32,
    pub mode_valid: u32,
    pub mode: drm_mode_modeinfo,
}
const_assert_eq!(std::mem::size_of::<drm_mode_crtc>(), 104);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_get_encoder {
    pub encoder_id: u32,
    pub encoder_type: u32,
    pub crtc_id: u32,
    pub possible_crtcs: u32,
    pub possible_clones: u32,
}
const_assert_eq!(std::mem::size_of::<drm_mode_get_encoder>(), 20);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_get_connector {
    pub encoders_ptr: u64,
    pub modes_ptr: u64,
    pub props_ptr: u64,
    pub prop_values_ptr: u64,
    pub count_modes: u32,
    pub count_props: u32,
    pub count_encoders: u32,
    pub encoder_id: u32,
    pub connector_id: u32,
    pub connector_type: u32,
    pub connector_type_id: u32,
    pub connection: u32,
    pub mm_width: u32,
    pub mm_height: u32,
    pub subpixel: u32,
    pub pad: u32,
}
const_assert_eq!(std::mem::size_of::<drm_mode_get_connector>(), 80);

#[repr(C)]
#[derive(Copy, Clone)]
pub struct drm_mode_get_property {
    pub values_ptr: u64,
    pub enum_blob_ptr: u64,
    pub prop_id: u32,
    pub flags: u32,
    pub name: [u8; 32],
    pub count_values: u32,
    pub count_enum_blobs: u32,
}
const_assert_eq!(std::mem::size_of::<drm_mode_get_property>(), 64);

impl Default for drm_mode_get_property {
    fn default() -> Self {
        // SAFETY: all fields are plain integers for which zero is valid.
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct drm_mode_property_enum {
    pub value: u64,
    pub name: [u8; 32],
}
const_assert_eq!(std::mem::size_of::<drm_mode_property_enum>(), 40);

impl Default for drm_mode_property_enum {
    fn default() -> Self {
        // SAFETY: all fields are plain integers for which zero is valid.
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_get_blob {
    pub blob_id: u32,
    pub length: u32,
    pub data: u64,
}
const_assert_eq!(std::mem::size_of::<drm_mode_get_blob>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_obj_get_properties {
    pub props_ptr: u64,
    pub prop_values_ptr: u64,
    pub count_props: u32,
    pub obj_id: u32,
    pub obj_type: u32,
}
const_assert_eq!(std::mem::size_of::<drm_mode_obj_get_properties>(), 32);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_create_dumb {
    pub height: u32,
    pub width: u32,
    pub bpp: u32,
    pub flags: u32,
    pub handle: u32,
    pub pitch: u32,
    pub size: u64,
}
const_assert_eq!(std::mem::size_of::<drm_mode_create_dumb>(), 32);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_map_dumb {
    pub handle: u32,
    pub pad: u32,
    pub offset: u64,
}
const_assert_eq!(std::mem::size_of::<drm_mode_map_dumb>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_destroy_dumb {
    pub handle: u32,
}
const_assert_eq!(std::mem::size_of::<drm_mode_destroy_dumb>(), 4);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_get_plane_res {
    pub plane_id_ptr: u64,
    pub count_planes: u32,
}
const_assert_eq!(std::mem::size_of::<drm_mode_get_plane_res>(), 16);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_get_plane {
    pub plane_id: u32,
    pub crtc_id: u32,
    pub fb_id: u32,
    pub possible_crtcs: u32,
    pub gamma_size: u32,
    pub count_format_types: u32,
    pub format_type_ptr: u64,
}
const_assert_eq!(std::mem::size_of::<drm_mode_get_plane>(), 32);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_set_plane {
    pub plane_id: u32,
    pub crtc_id: u32,
    pub fb_id: u32,
    pub flags: u32,
    pub crtc_x: i32,
    pub crtc_y: i32,
    pub crtc_w: u32,
    pub crtc_h: u32,
    pub src_x: u32,
    pub src_y: u32,
    pub src_h: u32,
    pub src_w: u32,
}
const_assert_eq!(std::mem::size_of::<drm_mode_set_plane>(), 48);

#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct drm_mode_fb_cmd2 {
    pub fb_id: u32,
    pub width: u32,
    pub height: u32,
    pub pixel_format: u32,
    pub flags: u32,
    pub handles: [u32; 4],
    pub pitches: [u32; 4],
    pub offsets: [u32; 4],
    pub modifier: [u64; 4],
}
const_assert_eq!(std::mem::size_of::<drm_mode_fb_cmd2>(), 104);

ioctl_iowr_nr!(DRM_IOCTL_VERSION, DRM_IOCTL_BASE, 0x00, drm_version);
ioctl_iow_nr!(DRM_IOCTL_GEM_CLOSE, DRM_IOCTL_BASE, 0x09, drm_gem_close);
ioctl_iowr_nr!(DRM_IOCTL_GET_CAP, DRM_IOCTL_BASE, 0x0c, drm_get_cap);
ioctl_iow_nr!(
    DRM_IOCTL_SET_CLIENT_CAP,
    DRM_IOCTL_BASE,
    0x0d,
    drm_set_client_cap
);
ioctl_io_nr!(DRM_IOCTL_SET_MASTER, DRM_IOCTL_BASE, 0x1e);
ioctl_io_nr!(DRM_IOCTL_DROP_MASTER, DRM_IOCTL_BASE, 0x1f);
ioctl_iowr_nr!(
    DRM_IOCTL_PRIME_HANDLE_TO_FD,
    DRM_IOCTL_BASE,
    0x2d,
    drm_prime_handle
);
ioctl_iowr_nr!(
    DRM_IOCTL_PRIME_FD_TO_HANDLE,
    DRM_IOCTL_BASE,
    0x2e,
    drm_prime_handle
);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_GETRESOURCES,
    DRM_IOCTL_BASE,
    0xa0,
    drm_mode_card_res
);
ioctl_iowr_nr!(DRM_IOCTL_MODE_GETCRTC, DRM_IOCTL_BASE, 0xa1, drm_mode_crtc);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_GETENCODER,
    DRM_IOCTL_BASE,
    0xa6,
    drm_mode_get_encoder
);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_GETCONNECTOR,
    DRM_IOCTL_BASE,
    0xa7,
    drm_mode_get_connector
);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_GETPROPERTY,
    DRM_IOCTL_BASE,
    0xaa,
    drm_mode_get_property
);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_GETPROPBLOB,
    DRM_IOCTL_BASE,
    0xac,
    drm_mode_get_blob
);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_CREATE_DUMB,
    DRM_IOCTL_BASE,
    0xb2,
    drm_mode_create_dumb
);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_MAP_DUMB,
    DRM_IOCTL_BASE,
    0xb3,
    drm_mode_map_dumb
);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_DESTROY_DUMB,
    DRM_IOCTL_BASE,
    0xb4,
    drm_mode_destroy_dumb
);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_GETPLANERESOURCES,
    DRM_IOCTL_BASE,
    0xb5,
    drm_mode_get_plane_res
);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_GETPLANE,
    DRM_IOCTL_BASE,
    0xb6,
    drm_mode_get_plane
);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_SETPLANE,
    DRM_IOCTL_BASE,
    0xb7,
    drm_mode_set_plane
);
ioctl_iowr_nr!(DRM_IOCTL_MODE_ADDFB2, DRM_IOCTL_BASE, 0xb8, drm_mode_fb_cmd2);
ioctl_iowr_nr!(
    DRM_IOCTL_MODE_OBJ_GETPROPERTIES,
    DRM_IOCTL_BASE,
    0xb9,
    drm_mode_obj_get_properties
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_codes() {
        assert_eq!(0xc0406400, DRM_IOCTL_VERSION());
        assert_eq!(0x40086409, DRM_IOCTL_GEM_CLOSE());
        assert_eq!(0xc010640c, DRM_IOCTL_GET_CAP());
        assert_eq!(0x4010640d, DRM_IOCTL_SET_CLIENT_CAP());
        assert_eq!(0x0000641e, DRM_IOCTL_SET_MASTER());
        assert_eq!(0x0000641f, DRM_IOCTL_DROP_MASTER());
        assert_eq!(0xc00c642d, DRM_IOCTL_PRIME_HANDLE_TO_FD());
        assert_eq!(0xc04064a0, DRM_IOCTL_MODE_GETRESOURCES());
        assert_eq!(0xc06864a1, DRM_IOCTL_MODE_GETCRTC());
        assert_eq!(0xc01464a6, DRM_IOCTL_MODE_GETENCODER());
        assert_eq!(0xc05064a7, DRM_IOCTL_MODE_GETCONNECTOR());
        assert_eq!(0xc04064aa, DRM_IOCTL_MODE_GETPROPERTY());
        assert_eq!(0xc01064ac, DRM_IOCTL_MODE_GETPROPBLOB());
        assert_eq!(0xc02064b2, DRM_IOCTL_MODE_CREATE_DUMB());
        assert_eq!(0xc01064b3, DRM_IOCTL_MODE_MAP_DUMB());
        assert_eq!(0xc00464b4, DRM_IOCTL_MODE_DESTROY_DUMB());
        assert_eq!(0xc01064b5, DRM_IOCTL_MODE_GETPLANERESOURCES());
        assert_eq!(0xc02064b6, DRM_IOCTL_MODE_GETPLANE());
        assert_eq!(0xc03064b7, DRM_IOCTL_MODE_SETPLANE());
        assert_eq!(0xc06864b8, DRM_IOCTL_MODE_ADDFB2());
        assert_eq!(0xc02064b9, DRM_IOCTL_MODE_OBJ_GETPROPERTIES());
    }
}
