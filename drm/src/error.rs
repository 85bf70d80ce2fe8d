// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::io;
use std::path::PathBuf;

use base::IoctlNr;
use base::MmapError;
use remain::sorted;
use thiserror::Error;

use crate::Format;

#[sorted]
#[derive(Error, Debug)]
pub enum Error {
    /// A framebuffer was described with more planes than the request can
    /// carry.
    #[error("framebuffer has {0} planes, at most 4 are supported")]
    ExcessPlanes(usize),
    /// The control call itself failed; carries the request code and the
    /// system error.
    #[error("ioctl {0:#x} failed: {1}")]
    Ioctl(IoctlNr, base::Error),
    /// A connector referenced an encoder id missing from the resource list.
    #[error("no encoder with id {0}")]
    MissingEncoder(u32),
    #[error("memory mapping failed: {0}")]
    Mmap(#[from] MmapError),
    /// A format without a component layout cannot pack pixels.
    #[error("format {0:?} has no component layout")]
    NoComponentLayout(Format),
    #[error("failed to open {0}: {1}")]
    OpenDevice(PathBuf, base::Error),
    #[error("failed to read device directory: {0}")]
    ReadDeviceDirectory(io::Error),
    /// The property's flag combination is one this library does not decode:
    /// pending, bitmask, object and signed-range properties, and blob
    /// properties carrying enum entries. The raw flags are kept for
    /// diagnostics.
    #[error("property {id} has unsupported flags {flags:#x}")]
    UnsupportedProperty { id: u32, flags: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
