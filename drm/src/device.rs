// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::CString;
use std::fs;
use std::os::raw::c_void;
use std::os::unix::prelude::OsStrExt;
use std::path::Path;
use std::path::PathBuf;

use base::ioctl_with_mut_ptr;
use base::AsRawDescriptor;
use base::FromRawDescriptor;
use base::IoctlNr;
use base::MemoryMapping;
use base::RawDescriptor;
use base::SafeDescriptor;
use drm_sys::*;
use libc::open64;
use libc::EINTR;
use libc::O_CLOEXEC;
use libc::O_RDWR;

use crate::buffer::DumbBuffer;
use crate::buffer::FramebufferPlane;
use crate::property;
use crate::resources::Framebuffer;
use crate::resources::Resources;
use crate::Blob;
use crate::Error;
use crate::Format;
use crate::Property;
use crate::Result;

/// Access to one device control node: request execution and device memory
/// mapping.
///
/// `Device` is the kernel-backed implementation; everything above this layer
/// is written against the trait so tests can stand in for the kernel.
pub trait Control {
    /// Executes the request identified by `nr`, reading and/or writing the
    /// argument according to the request's direction.
    ///
    /// # Safety
    /// `arg` must point to a live, properly initialized instance of exactly
    /// the structure type `nr` was derived from.
    unsafe fn execute(&self, nr: IoctlNr, arg: *mut c_void) -> Result<()>;

    /// Maps `len` bytes of device memory starting at `offset` into the
    /// process.
    fn map(&self, offset: u64, len: usize) -> Result<MemoryMapping>;
}

/// Executes `nr` with a typed request structure.
///
/// # Safety
/// `arg` must be the structure type `nr` was derived from.
pub unsafe fn execute<T>(dev: &dyn Control, nr: IoctlNr, arg: &mut T) -> Result<()> {
    dev.execute(nr, arg as *mut T as *mut c_void)
}

/// Capability identifiers understood by the control interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum Capability {
    DumbBuffer = DRM_CAP_DUMB_BUFFER,
    VblankHighCrtc = DRM_CAP_VBLANK_HIGH_CRTC,
    DumbPreferredDepth = DRM_CAP_DUMB_PREFERRED_DEPTH,
    DumbPreferShadow = DRM_CAP_DUMB_PREFER_SHADOW,
    Prime = DRM_CAP_PRIME,
    TimestampMonotonic = DRM_CAP_TIMESTAMP_MONOTONIC,
    AsyncPageFlip = DRM_CAP_ASYNC_PAGE_FLIP,
    CursorWidth = DRM_CAP_CURSOR_WIDTH,
    CursorHeight = DRM_CAP_CURSOR_HEIGHT,
    Addfb2Modifiers = DRM_CAP_ADDFB2_MODIFIERS,
    PageFlipTarget = DRM_CAP_PAGE_FLIP_TARGET,
    CrtcInVblankEvent = DRM_CAP_CRTC_IN_VBLANK_EVENT,
    Syncobj = DRM_CAP_SYNCOBJ,
}

impl Capability {
    /// The capabilities defined to carry a boolean value. All others are raw
    /// integers (cursor dimensions, preferred depth, the PRIME import/export
    /// mask).
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            Capability::DumbBuffer
                | Capability::VblankHighCrtc
                | Capability::DumbPreferShadow
                | Capability::TimestampMonotonic
                | Capability::AsyncPageFlip
                | Capability::Addfb2Modifiers
                | Capability::PageFlipTarget
                | Capability::CrtcInVblankEvent
                | Capability::Syncobj
        )
    }
}

/// The value of a queried capability, coerced according to
/// `Capability::is_boolean`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CapabilityValue {
    Boolean(bool),
    Integer(u64),
}

/// Client capability identifiers advertised to the kernel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum ClientCapability {
    Stereo3d = DRM_CLIENT_CAP_STEREO_3D,
    UniversalPlanes = DRM_CLIENT_CAP_UNIVERSAL_PLANES,
    Atomic = DRM_CLIENT_CAP_ATOMIC,
    AspectRatio = DRM_CLIENT_CAP_ASPECT_RATIO,
    WritebackConnectors = DRM_CLIENT_CAP_WRITEBACK_CONNECTORS,
}

/// Driver identification, fetched with the two-phase string variant of the
/// version request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Version {
    pub major: i32,
    pub minor: i32,
    pub patchlevel: i32,
    pub name: String,
    pub date: String,
    pub desc: String,
}

/// An open control node.
pub struct Device {
    fd: SafeDescriptor,
    path: PathBuf,
}

impl Device {
    /// Opens the device node at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Device> {
        let path = path.as_ref();
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| Error::OpenDevice(path.to_owned(), base::Error::new(libc::EINVAL)))?;
        // SAFETY: the path is nul-terminated and the result is checked before
        // ownership is assumed.
        let ret = unsafe { open64(c_path.as_ptr(), O_RDWR | O_CLOEXEC) };
        if ret < 0 {
            return Err(Error::OpenDevice(path.to_owned(), base::Error::last()));
        }
        Ok(Device {
            // SAFETY: we verified the descriptor and nothing else owns it.
            fd: unsafe { SafeDescriptor::from_raw_descriptor(ret) },
            path: path.to_owned(),
        })
    }

    /// The path this device was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queries the driver name, dates and version numbers.
    pub fn version(&self) -> Result<Version> {
        let mut args = drm_version::default();
        // SAFETY: the argument matches the request layout.
        unsafe { execute(self, DRM_IOCTL_VERSION(), &mut args)? };

        let mut name = vec![0u8; args.name_len as usize];
        let mut date = vec![0u8; args.date_len as usize];
        let mut desc = vec![0u8; args.desc_len as usize];
        args.name = name.as_mut_ptr() as u64;
        args.date = date.as_mut_ptr() as u64;
        args.desc = desc.as_mut_ptr() as u64;
        // SAFETY: the buffers are sized to the lengths the kernel reported
        // and outlive the call.
        unsafe { execute(self, DRM_IOCTL_VERSION(), &mut args)? };

        name.truncate(args.name_len as usize);
        date.truncate(args.date_len as usize);
        desc.truncate(args.desc_len as usize);
        Ok(Version {
            major: args.version_major,
            minor: args.version_minor,
            patchlevel: args.version_patchlevel,
            name: String::from_utf8_lossy(&name).into_owned(),
            date: String::from_utf8_lossy(&date).into_owned(),
            desc: String::from_utf8_lossy(&desc).into_owned(),
        })
    }

    /// Queries a capability, coercing the boolean-valued subset.
    pub fn get_capability(&self, cap: Capability) -> Result<CapabilityValue> {
        let mut args = drm_get_cap {
            capability: cap as u64,
            ..Default::default()
        };
        // SAFETY: the argument matches the request layout.
        unsafe { execute(self, DRM_IOCTL_GET_CAP(), &mut args)? };
        if cap.is_boolean() {
            Ok(CapabilityValue::Boolean(args.value != 0))
        } else {
            Ok(CapabilityValue::Integer(args.value))
        }
    }

    /// Advertises a client capability to the kernel.
    pub fn set_client_capability(&self, cap: ClientCapability, value: u64) -> Result<()> {
        let mut args = drm_set_client_cap {
            capability: cap as u64,
            value,
        };
        // SAFETY: the argument matches the request layout.
        unsafe { execute(self, DRM_IOCTL_SET_CLIENT_CAP(), &mut args) }
    }

    /// Acquires the exclusive display-master role on this node.
    ///
    /// The role is global to the device node; losing it to another process
    /// surfaces as an error on the next master-only request.
    pub fn set_master(&self) -> Result<()> {
        // SAFETY: the request carries no data.
        unsafe { Control::execute(self, DRM_IOCTL_SET_MASTER(), std::ptr::null_mut()) }
    }

    /// Releases the exclusive display-master role.
    pub fn drop_master(&self) -> Result<()> {
        // SAFETY: the request carries no data.
        unsafe { Control::execute(self, DRM_IOCTL_DROP_MASTER(), std::ptr::null_mut()) }
    }

    /// Exports a memory-object handle as a descriptor that can cross a
    /// process boundary.
    pub fn handle_to_fd(&self, handle: u32, flags: u32) -> Result<SafeDescriptor> {
        let mut args = drm_prime_handle {
            handle,
            flags,
            fd: -1,
        };
        // SAFETY: the argument matches the request layout.
        unsafe { execute(self, DRM_IOCTL_PRIME_HANDLE_TO_FD(), &mut args)? };
        // SAFETY: the kernel returned a fresh descriptor that we now own.
        Ok(unsafe { SafeDescriptor::from_raw_descriptor(args.fd) })
    }

    /// Imports a descriptor exported by `handle_to_fd` and returns the local
    /// handle. The descriptor stays owned by the caller.
    pub fn fd_to_handle(&self, fd: &dyn AsRawDescriptor) -> Result<u32> {
        let mut args = drm_prime_handle {
            fd: fd.as_raw_descriptor(),
            ..Default::default()
        };
        // SAFETY: the argument matches the request layout.
        unsafe { execute(self, DRM_IOCTL_PRIME_FD_TO_HANDLE(), &mut args)? };
        Ok(args.handle)
    }

    /// Builds the display resource graph for this device.
    pub fn resources(&self) -> Result<Resources> {
        Resources::discover(self)
    }

    /// Decodes the property `id` attached to some object with the given
    /// current value.
    pub fn get_property(&self, id: u32, value: u64) -> Result<Property> {
        property::get_property(self, id, value)
    }

    /// Fetches the blob with the given id.
    pub fn get_blob(&self, id: u32) -> Result<Blob> {
        property::get_blob(self, id)
    }

    /// Allocates a dumb buffer suitable for display scanout.
    pub fn create_dumb(&self, width: u32, height: u32, bpp: u32, flags: u32) -> Result<DumbBuffer> {
        DumbBuffer::create(self, width, height, bpp, flags)
    }

    /// Composes up to four plane descriptors into a framebuffer.
    pub fn add_framebuffer(
        &self,
        width: u32,
        height: u32,
        format: Format,
        flags: u32,
        planes: &[FramebufferPlane],
    ) -> Result<Framebuffer> {
        crate::buffer::add_framebuffer(self, width, height, format, flags, planes)
    }
}

impl Control for Device {
    unsafe fn execute(&self, nr: IoctlNr, arg: *mut c_void) -> Result<()> {
        loop {
            let ret = ioctl_with_mut_ptr(self, nr, arg);
            if ret == 0 {
                return Ok(());
            }
            let err = base::Error::last();
            if err.errno() != EINTR {
                return Err(Error::Ioctl(nr, err));
            }
        }
    }

    fn map(&self, offset: u64, len: usize) -> Result<MemoryMapping> {
        Ok(MemoryMapping::from_descriptor_offset(&self.fd, len, offset)?)
    }
}

impl AsRawDescriptor for Device {
    fn as_raw_descriptor(&self) -> RawDescriptor {
        self.fd.as_raw_descriptor()
    }
}

/// The directory device nodes are published in.
pub const DEVICE_DIRECTORY: &str = "/dev/dri";

/// The flavor of a device node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Display-capable node; supports the display-master role.
    Card,
    /// Compute-only render node; no display-master concept.
    Render,
}

/// A discovered but not yet opened device node.
#[derive(Clone, Debug)]
pub struct DeviceNode {
    path: PathBuf,
    kind: NodeKind,
}

impl DeviceNode {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn open(&self) -> Result<Device> {
        Device::open(&self.path)
    }
}

/// Lists the device nodes present on this system.
pub fn devices() -> Result<Vec<DeviceNode>> {
    devices_in(Path::new(DEVICE_DIRECTORY))
}

fn devices_in(dir: &Path) -> Result<Vec<DeviceNode>> {
    let mut result = Vec::new();
    for entry in fs::read_dir(dir).map_err(Error::ReadDeviceDirectory)? {
        let entry = entry.map_err(Error::ReadDeviceDirectory)?;
        let name = entry.file_name();
        let kind = match name.to_string_lossy() {
            n if n.starts_with("card") => NodeKind::Card,
            n if n.starts_with("render") => NodeKind::Render,
            _ => continue,
        };
        result.push(DeviceNode {
            path: entry.path(),
            kind,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn capability_boolean_subset() {
        assert!(Capability::DumbBuffer.is_boolean());
        assert!(Capability::Syncobj.is_boolean());
        assert!(!Capability::CursorWidth.is_boolean());
        assert!(!Capability::CursorHeight.is_boolean());
        assert!(!Capability::DumbPreferredDepth.is_boolean());
        assert!(!Capability::Prime.is_boolean());
    }

    #[test]
    fn open_missing_node() {
        match Device::open("/nonexistent/card0") {
            Err(Error::OpenDevice(path, _)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/card0"))
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn execute_on_non_device() {
        // A plain file accepts open but refuses control requests; the error
        // must surface as a transport failure, not a panic.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-node");
        File::create(&path).unwrap();
        let device = Device::open(&path).unwrap();
        match device.version() {
            Err(Error::Ioctl(nr, _)) => assert_eq!(nr, DRM_IOCTL_VERSION()),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn node_discovery() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("card0")).unwrap();
        File::create(dir.path().join("renderD128")).unwrap();
        File::create(dir.path().join("by-path")).unwrap();
        let mut nodes = devices_in(dir.path()).unwrap();
        nodes.sort_by(|a, b| a.path().cmp(b.path()));
        assert_eq!(2, nodes.len());
        assert_eq!(NodeKind::Card, nodes[0].kind());
        assert_eq!(NodeKind::Render, nodes[1].kind());
    }
}
