// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! A safe wrapper around the Tegra host1x command-submission interface.
//!
//! Layered on the generic `drm` crate: buffer objects, logical channels to
//! hardware engine classes, job submission with relocations and syncpoint
//! fencing, and the video image compositor configuration layer.

#![cfg(unix)]

mod buffer;
mod channel;
mod device;
mod error;
mod job;
mod syncpoint;
pub mod vic;
pub mod vic42;

pub use buffer::BufferObject;
pub use channel::Channel;
pub use channel::ChannelCapabilities;
pub use channel::EngineClass;
pub use channel::MapFlags;
pub use channel::Mapping;
pub use channel::SocVersion;
pub use device::Tegra;
pub use error::Error;
pub use error::Result;
pub use job::host1x_opcode_incr;
pub use job::host1x_opcode_nonincr;
pub use job::Fence;
pub use job::Job;
pub use job::SyncCond;
pub use job::WaitResult;
pub use syncpoint::Syncpoint;
