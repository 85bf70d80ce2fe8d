// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! A safe wrapper around the generic DRM control interface.
//!
//! Covers device discovery and handles, capability negotiation, display
//! resource-graph discovery, property and blob decoding, pixel formats and
//! dumb-buffer management. The vendor-specific submission interface for
//! Tegra lives in the `tegra` crate on top of this one.

#![cfg(unix)]

mod buffer;
mod device;
mod error;
mod format;
mod property;
mod resources;

pub use buffer::add_framebuffer;
pub use buffer::DumbBuffer;
pub use buffer::FramebufferPlane;
pub use device::devices;
pub use device::execute;
pub use device::Capability;
pub use device::CapabilityValue;
pub use device::ClientCapability;
pub use device::Control;
pub use device::Device;
pub use device::DeviceNode;
pub use device::NodeKind;
pub use device::Version;
pub use device::DEVICE_DIRECTORY;
pub use error::Error;
pub use error::Result;
pub use format::Component;
pub use format::Format;
pub use format::Modifier;
pub use format::RgbaLayout;
pub use format::Vendor;
pub use property::get_blob;
pub use property::get_property;
pub use property::Blob;
pub use property::Property;
pub use property::PropertyKind;
pub use resources::query_object_properties;
pub use resources::Connector;
pub use resources::ConnectorKind;
pub use resources::ConnectorStatus;
pub use resources::Crtc;
pub use resources::Encoder;
pub use resources::EncoderKind;
pub use resources::Framebuffer;
pub use resources::Mode;
pub use resources::Plane;
pub use resources::Resolution;
pub use resources::Resources;
