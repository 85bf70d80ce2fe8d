// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Decoding of object-attached properties and their blobs.

use drm_sys::*;

use crate::device::execute;
use crate::Control;
use crate::Error;
use crate::Result;

/// An immutable byte sequence with its kernel-assigned id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub id: u32,
    pub data: Vec<u8>,
}

/// The decoded value of a property, tagged by kind.
///
/// Kinds the library does not decode (pending, bitmask, object reference,
/// signed range) never construct a `Property`; they surface as
/// `Error::UnsupportedProperty` carrying the raw flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Range {
        min: u64,
        max: u64,
        value: u64,
    },
    Enum {
        entries: Vec<(String, u64)>,
        value: u64,
    },
    Blob {
        blob: Option<Blob>,
    },
}

/// A property attached to a display object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub id: u32,
    pub name: String,
    pub flags: u32,
    pub kind: PropertyKind,
}

impl Property {
    pub fn immutable(&self) -> bool {
        self.flags & DRM_MODE_PROP_IMMUTABLE != 0
    }

    pub fn atomic(&self) -> bool {
        self.flags & DRM_MODE_PROP_ATOMIC != 0
    }
}

/// Decodes a nul-padded fixed-size name field.
pub(crate) fn fixed_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Fetches and classifies the property `id`, with `value` as the current
/// value reported by the owning object.
pub fn get_property(dev: &dyn Control, id: u32, value: u64) -> Result<Property> {
    let mut args = drm_mode_get_property {
        prop_id: id,
        ..Default::default()
    };
    // SAFETY: the argument matches the request layout.
    unsafe { execute(dev, DRM_IOCTL_MODE_GETPROPERTY(), &mut args)? };

    let mut values = vec![0u64; args.count_values as usize];
    if !values.is_empty() {
        args.values_ptr = values.as_mut_ptr() as u64;
    }
    let mut enums =
        vec![drm_mode_property_enum::default(); args.count_enum_blobs as usize];
    if !enums.is_empty() && args.flags & (DRM_MODE_PROP_ENUM | DRM_MODE_PROP_BITMASK) != 0 {
        args.enum_blob_ptr = enums.as_mut_ptr() as u64;
    }
    // SAFETY: the attached arrays are sized to the counts the kernel
    // reported and outlive the call.
    unsafe { execute(dev, DRM_IOCTL_MODE_GETPROPERTY(), &mut args)? };

    let flags = args.flags;
    let unsupported = move || Error::UnsupportedProperty { id, flags };
    let name = fixed_name(&args.name);

    if args.flags & DRM_MODE_PROP_PENDING != 0 {
        return Err(unsupported());
    }

    if args.flags & DRM_MODE_PROP_RANGE != 0 {
        if values.len() < 2 {
            return Err(unsupported());
        }
        return Ok(Property {
            id,
            name,
            flags: args.flags,
            kind: PropertyKind::Range {
                min: values[0],
                max: values[1],
                value,
            },
        });
    }

    if args.flags & DRM_MODE_PROP_ENUM != 0 {
        let entries = enums
            .iter()
            .map(|e| (fixed_name(&e.name), e.value))
            .collect();
        return Ok(Property {
            id,
            name,
            flags: args.flags,
            kind: PropertyKind::Enum { entries, value },
        });
    }

    if args.flags & DRM_MODE_PROP_BLOB != 0 {
        // Blob properties carrying enum entries are a layout this library
        // does not interpret.
        if args.count_enum_blobs > 0 {
            return Err(unsupported());
        }
        let blob = if value > 0 {
            Some(get_blob(dev, value as u32)?)
        } else {
            None
        };
        return Ok(Property {
            id,
            name,
            flags: args.flags,
            kind: PropertyKind::Blob { blob },
        });
    }

    // Bitmask, object-reference and signed-range properties, and anything
    // with no recognized flag at all, fail loudly.
    Err(unsupported())
}

/// Fetches the blob `id` with the usual two-phase length-then-data exchange.
pub fn get_blob(dev: &dyn Control, id: u32) -> Result<Blob> {
    let mut args = drm_mode_get_blob {
        blob_id: id,
        ..Default::default()
    };
    // SAFETY: the argument matches the request layout.
    unsafe { execute(dev, DRM_IOCTL_MODE_GETPROPBLOB(), &mut args)? };

    let mut data = vec![0u8; args.length as usize];
    if !data.is_empty() {
        args.data = data.as_mut_ptr() as u64;
        // SAFETY: the buffer is sized to the length the kernel reported and
        // outlives the call.
        unsafe { execute(dev, DRM_IOCTL_MODE_GETPROPBLOB(), &mut args)? };
        data.truncate(args.length as usize);
    }
    Ok(Blob { id, data })
}
