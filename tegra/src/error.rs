// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use base::MmapError;
use remain::sorted;
use thiserror::Error;

use crate::channel::SocVersion;
use crate::vic::PixelFormat;

#[sorted]
#[derive(Error, Debug)]
pub enum Error {
    /// The memory object is already mapped into this channel; a (channel,
    /// object) pair maps at most once.
    #[error("handle {0} is already mapped into this channel")]
    AlreadyMapped(u32),
    /// The job was already submitted and its command stream is immutable.
    #[error("job has already been submitted")]
    AlreadySubmitted,
    /// The buffer object's kernel handle has been released.
    #[error("buffer object is closed")]
    BufferClosed,
    /// The channel's context has been closed.
    #[error("channel is closed")]
    ChannelClosed,
    /// Transport or protocol failure from the underlying control interface.
    #[error(transparent)]
    Control(#[from] drm::Error),
    /// No hardware implements the requested engine class; distinguishable
    /// from generic transport failure so callers can skip gracefully.
    #[error("engine class {0:#x} is not present")]
    EngineNotPresent(u32),
    /// The mapping was unmapped and its id released.
    #[error("mapping is closed")]
    MappingClosed,
    #[error("memory mapping failed: {0}")]
    Mmap(#[from] MmapError),
    /// Waiting is only valid once the job has a fence, after submit.
    #[error("job has not been submitted")]
    NotSubmitted,
    /// The syncpoint's kernel id has been released.
    #[error("syncpoint is freed")]
    SyncpointFreed,
    /// A job accumulates increments on exactly one syncpoint.
    #[error("job already uses syncpoint {job}, cannot push syncpoint {pushed}")]
    SyncpointMismatch { job: u32, pushed: u32 },
    /// The kernel negotiated a protocol version this library does not know.
    #[error("unknown channel version {0:#x}")]
    UnknownVersion(u32),
    /// No condition-field shift is defined for this hardware generation.
    #[error("no wait-condition shift known for {0:?}")]
    UnknownVersionShift(SocVersion),
    /// The negotiated generation has no engine configuration backend.
    #[error("no engine configuration backend for {0:?}")]
    UnsupportedEngineVersion(SocVersion),
    #[error("unsupported pixel format {0:?}")]
    UnsupportedPixelFormat(PixelFormat),
}

pub type Result<T> = std::result::Result<T, Error>;
