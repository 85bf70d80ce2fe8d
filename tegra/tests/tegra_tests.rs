// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Submission-protocol tests against an in-memory kernel.

#![cfg(unix)]

use std::cell::Cell;
use std::cell::RefCell;
use std::os::raw::c_void;
use std::time::Duration;

use base::IoctlNr;
use base::MemoryMapping;
use drm::Control;
use libc::ENODEV;
use libc::ETIMEDOUT;
use tegra::host1x_opcode_nonincr;
use tegra::vic::BlockKind;
use tegra::vic::Color;
use tegra::vic::PixelFormat;
use tegra::vic::Vic;
use tegra::EngineClass;
use tegra::Error;
use tegra::MapFlags;
use tegra::SocVersion;
use tegra::SyncCond;
use tegra::Tegra;
use tegra::WaitResult;
use tegra_sys::*;

const CONTEXT: u32 = 0xc0de;

struct CapturedSubmit {
    context: u32,
    gather: Vec<u32>,
    buffers: Vec<drm_tegra_submit_buffer>,
    commands: Vec<drm_tegra_submit_command>,
    syncpt: drm_tegra_submit_syncpt,
}

struct FakeKernel {
    version: u32,
    capabilities: u32,
    engine_absent: bool,
    fence_value: u32,
    wait_signals: bool,
    next_id: Cell<u32>,
    closed_channels: RefCell<Vec<u32>>,
    closed_gems: RefCell<Vec<u32>>,
    unmapped: RefCell<Vec<u32>>,
    freed_syncpoints: RefCell<Vec<u32>>,
    submits: RefCell<Vec<CapturedSubmit>>,
}

impl FakeKernel {
    fn new(version: SocVersion) -> FakeKernel {
        FakeKernel {
            version: version as u32,
            capabilities: DRM_TEGRA_CHANNEL_CAP_CACHE_COHERENT,
            engine_absent: false,
            fence_value: 7,
            wait_signals: false,
            next_id: Cell::new(1),
            closed_channels: RefCell::new(Vec::new()),
            closed_gems: RefCell::new(Vec::new()),
            unmapped: RefCell::new(Vec::new()),
            freed_syncpoints: RefCell::new(Vec::new()),
            submits: RefCell::new(Vec::new()),
        }
    }

    fn assign_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

fn ioctl_err(nr: IoctlNr, errno: i32) -> drm::Error {
    drm::Error::Ioctl(nr, base::Error::new(errno))
}

impl Control for FakeKernel {
    unsafe fn execute(&self, nr: IoctlNr, arg: *mut c_void) -> drm::Result<()> {
        if nr == DRM_IOCTL_TEGRA_CHANNEL_OPEN() {
            let args = &mut *(arg as *mut drm_tegra_channel_open);
            if self.engine_absent {
                return Err(ioctl_err(nr, ENODEV));
            }
            args.context = CONTEXT;
            args.version = self.version;
            args.capabilities = self.capabilities;
            Ok(())
        } else if nr == DRM_IOCTL_TEGRA_CHANNEL_CLOSE() {
            let args = &mut *(arg as *mut drm_tegra_channel_close);
            self.closed_channels.borrow_mut().push(args.context);
            Ok(())
        } else if nr == DRM_IOCTL_TEGRA_CHANNEL_MAP() {
            let args = &mut *(arg as *mut drm_tegra_channel_map);
            args.mapping = self.assign_id();
            Ok(())
        } else if nr == DRM_IOCTL_TEGRA_CHANNEL_UNMAP() {
            let args = &mut *(arg as *mut drm_tegra_channel_unmap);
            self.unmapped.borrow_mut().push(args.mapping);
            Ok(())
        } else if nr == DRM_IOCTL_TEGRA_GEM_CREATE() {
            let args = &mut *(arg as *mut drm_tegra_gem_create);
            args.handle = self.assign_id();
            Ok(())
        } else if nr == DRM_IOCTL_TEGRA_GEM_MMAP() {
            let args = &mut *(arg as *mut drm_tegra_gem_mmap);
            args.offset = args.handle as u64 * 0x1000;
            Ok(())
        } else if nr == drm_sys::DRM_IOCTL_GEM_CLOSE() {
            let args = &mut *(arg as *mut drm_sys::drm_gem_close);
            self.closed_gems.borrow_mut().push(args.handle);
            Ok(())
        } else if nr == DRM_IOCTL_TEGRA_SYNCPOINT_ALLOCATE() {
            let args = &mut *(arg as *mut drm_tegra_syncpoint_allocate);
            args.id = 0x20 + self.assign_id();
            Ok(())
        } else if nr == DRM_IOCTL_TEGRA_SYNCPOINT_FREE() {
            let args = &mut *(arg as *mut drm_tegra_syncpoint_free);
            self.freed_syncpoints.borrow_mut().push(args.id);
            Ok(())
        } else if nr == DRM_IOCTL_TEGRA_CHANNEL_SUBMIT() {
            let args = &mut *(arg as *mut drm_tegra_channel_submit);
            unsafe fn read_array<T: Copy>(ptr: u64, count: u32) -> Vec<T> {
                if ptr == 0 {
                    return Vec::new();
                }
                std::slice::from_raw_parts(ptr as *const T, count as usize).to_vec()
            }
            let gather: Vec<u32> = read_array(args.gather_data_ptr, args.gather_data_words);
            let buffers: Vec<drm_tegra_submit_buffer> = read_array(args.bufs_ptr, args.num_bufs);
            let commands: Vec<drm_tegra_submit_command> = read_array(args.cmds_ptr, args.num_cmds);
            args.syncpt.value = self.fence_value;
            self.submits.borrow_mut().push(CapturedSubmit {
                context: args.context,
                gather,
                buffers,
                commands,
                syncpt: args.syncpt,
            });
            Ok(())
        } else if nr == DRM_IOCTL_TEGRA_SYNCPOINT_WAIT() {
            if self.wait_signals {
                Ok(())
            } else {
                Err(ioctl_err(nr, ETIMEDOUT))
            }
        } else {
            Err(ioctl_err(nr, libc::ENOTTY))
        }
    }

    fn map(&self, _offset: u64, len: usize) -> drm::Result<MemoryMapping> {
        Ok(MemoryMapping::new(len)?)
    }
}

#[test]
fn channel_negotiation() {
    let kernel = FakeKernel::new(SocVersion::Tegra194);
    let tegra = Tegra::new(&kernel);
    let channel = tegra.open_channel(EngineClass::Vic, 0).unwrap();
    assert_eq!(Some(CONTEXT), channel.context());
    assert_eq!(SocVersion::Tegra194, channel.version());
    assert!(channel.capabilities().cache_coherent());
    assert_eq!(EngineClass::Vic, channel.class());
}

#[test]
fn absent_engine_is_distinguishable() {
    let mut kernel = FakeKernel::new(SocVersion::Tegra194);
    kernel.engine_absent = true;
    let tegra = Tegra::new(&kernel);
    match tegra.open_channel(EngineClass::Nvdec, 0) {
        Err(Error::EngineNotPresent(class)) => assert_eq!(EngineClass::Nvdec as u32, class),
        other => panic!("unexpected result: {:?}", other.err()),
    };
}

#[test]
fn unknown_negotiated_version_closes_channel() {
    let mut kernel = FakeKernel::new(SocVersion::Tegra194);
    kernel.version = 0x99;
    let tegra = Tegra::new(&kernel);
    match tegra.open_channel(EngineClass::Vic, 0) {
        Err(Error::UnknownVersion(0x99)) => {}
        other => panic!("unexpected result: {:?}", other.err()),
    }
    // The kernel-side context does not leak on the error path.
    assert_eq!(vec![CONTEXT], *kernel.closed_channels.borrow());
}

#[test]
fn channel_close_is_idempotent() {
    let kernel = FakeKernel::new(SocVersion::Tegra194);
    let tegra = Tegra::new(&kernel);
    let mut channel = tegra.open_channel(EngineClass::Vic, 0).unwrap();
    channel.close().unwrap();
    channel.close().unwrap();
    assert!(channel.context().is_none());
    drop(channel);
    assert_eq!(vec![CONTEXT], *kernel.closed_channels.borrow());
}

#[test]
fn buffer_close_is_idempotent() {
    let kernel = FakeKernel::new(SocVersion::Tegra194);
    let tegra = Tegra::new(&kernel);
    let mut bo = tegra.create_gem(0x1000, 0).unwrap();
    let handle = bo.handle().unwrap();
    bo.close().unwrap();
    bo.close().unwrap();
    drop(bo);
    assert_eq!(vec![handle], *kernel.closed_gems.borrow());
}

#[test]
fn double_map_is_refused() {
    let kernel = FakeKernel::new(SocVersion::Tegra194);
    let tegra = Tegra::new(&kernel);
    let channel = tegra.open_channel(EngineClass::Vic, 0).unwrap();
    let bo = tegra.create_gem(0x1000, 0).unwrap();

    let mut mapping = channel.map(&bo, MapFlags::ReadWrite).unwrap();
    let mapping_id = mapping.id().unwrap();
    match channel.map(&bo, MapFlags::Read) {
        Err(Error::AlreadyMapped(handle)) => assert_eq!(bo.handle().unwrap(), handle),
        other => panic!("unexpected result: {:?}", other.err().map(|e| e.to_string())),
    }

    // Unmapping frees the pair for a fresh mapping.
    mapping.unmap().unwrap();
    mapping.unmap().unwrap();
    assert_eq!(vec![mapping_id], *kernel.unmapped.borrow());
    channel.map(&bo, MapFlags::Read).unwrap();
}

#[test]
fn job_lifecycle() {
    let kernel = FakeKernel::new(SocVersion::Tegra194);
    let tegra = Tegra::new(&kernel);
    let channel = tegra.open_channel(EngineClass::Vic, 0).unwrap();
    let bo = tegra.create_gem(0x1000, 0).unwrap();
    let mapping = channel.map(&bo, MapFlags::ReadWrite).unwrap();
    let syncpt = tegra.allocate_syncpoint().unwrap();
    let syncpt_id = syncpt.id().unwrap();

    let mut job = channel.create_job().unwrap();
    job.push_begin().unwrap();
    job.push_buffer(&mapping, 0x40, 8, 0).unwrap();
    job.push_sync_cond(&syncpt, SyncCond::OpDone).unwrap();
    job.push_end().unwrap();

    assert!(job.fence().is_none());
    match job.wait(Duration::ZERO) {
        Err(Error::NotSubmitted) => {}
        other => panic!("unexpected result: {:?}", other.ok()),
    }

    let fence = job.submit().unwrap();
    assert_eq!(syncpt_id, fence.syncpoint);
    assert_eq!(7, fence.threshold);
    assert_eq!(Some(fence), job.fence());

    // The job is immutable once submitted.
    match job.push(0) {
        Err(Error::AlreadySubmitted) => {}
        other => panic!("unexpected result: {:?}", other.ok()),
    }
    match job.submit() {
        Err(Error::AlreadySubmitted) => {}
        other => panic!("unexpected result: {:?}", other.ok()),
    }

    // The mock kernel never signals; a zero timeout reports, not crashes.
    assert_eq!(WaitResult::TimedOut, job.wait(Duration::ZERO).unwrap());

    let submits = kernel.submits.borrow();
    let submit = &submits[0];
    assert_eq!(CONTEXT, submit.context);
    // One relocation placeholder and the two wait-condition words.
    assert_eq!(3, submit.gather.len());
    assert_eq!(0xdead_beef, submit.gather[0]);
    assert_eq!(host1x_opcode_nonincr(0x0, 0x1), submit.gather[1]);
    // Tegra194 encodes the wait condition at bit 10.
    assert_eq!((SyncCond::OpDone as u32) << 10 | syncpt_id, submit.gather[2]);

    assert_eq!(1, submit.buffers.len());
    assert_eq!(mapping.id().unwrap(), submit.buffers[0].mapping);
    assert_eq!(0x40, submit.buffers[0].reloc.target_offset);
    assert_eq!(0, submit.buffers[0].reloc.gather_offset_words);
    assert_eq!(8, submit.buffers[0].reloc.shift);

    assert_eq!(1, submit.commands.len());
    assert_eq!(DRM_TEGRA_SUBMIT_COMMAND_GATHER_UPTR, submit.commands[0].type_);
    // SAFETY: the command was built as a gather.
    assert_eq!(3, unsafe { submit.commands[0].data.gather_uptr.words });

    assert_eq!(syncpt_id, submit.syncpt.id);
    assert_eq!(1, submit.syncpt.increments);
}

#[test]
fn earlier_generations_use_shift_8() {
    let kernel = FakeKernel::new(SocVersion::Tegra210);
    let tegra = Tegra::new(&kernel);
    let channel = tegra.open_channel(EngineClass::Gr2d, 0).unwrap();
    let syncpt = tegra.allocate_syncpoint().unwrap();
    let syncpt_id = syncpt.id().unwrap();

    let mut job = channel.create_job().unwrap();
    job.push_begin().unwrap();
    job.push_sync_cond(&syncpt, SyncCond::OpDone).unwrap();
    job.push_end().unwrap();
    job.submit().unwrap();

    let submits = kernel.submits.borrow();
    assert_eq!(
        (SyncCond::OpDone as u32) << 8 | syncpt_id,
        submits[0].gather[1]
    );
}

#[test]
fn unlisted_generation_shift_is_fatal() {
    let kernel = FakeKernel::new(SocVersion::Tegra234);
    let tegra = Tegra::new(&kernel);
    // The channel opens; building jobs against it is what needs the shift.
    let channel = tegra.open_channel(EngineClass::Vic, 0).unwrap();
    match channel.create_job() {
        Err(Error::UnknownVersionShift(SocVersion::Tegra234)) => {}
        other => panic!("unexpected result: {:?}", other.err()),
    }
}

#[test]
fn syncpoint_mixing_is_refused() {
    let kernel = FakeKernel::new(SocVersion::Tegra194);
    let tegra = Tegra::new(&kernel);
    let channel = tegra.open_channel(EngineClass::Vic, 0).unwrap();
    let first = tegra.allocate_syncpoint().unwrap();
    let second = tegra.allocate_syncpoint().unwrap();

    let mut job = channel.create_job().unwrap();
    job.push_sync(&first, 1).unwrap();
    job.push_sync(&first, 2).unwrap();
    match job.push_sync(&second, 1) {
        Err(Error::SyncpointMismatch { job: j, pushed }) => {
            assert_eq!(first.id().unwrap(), j);
            assert_eq!(second.id().unwrap(), pushed);
        }
        other => panic!("unexpected result: {:?}", other.ok()),
    }

    job.submit().unwrap();
    // Increments accumulated on the one syncpoint only.
    assert_eq!(3, kernel.submits.borrow()[0].syncpt.increments);
}

#[test]
fn syncpoint_free_is_idempotent() {
    let kernel = FakeKernel::new(SocVersion::Tegra194);
    let tegra = Tegra::new(&kernel);
    let mut syncpt = tegra.allocate_syncpoint().unwrap();
    let id = syncpt.id().unwrap();
    syncpt.free().unwrap();
    syncpt.free().unwrap();
    drop(syncpt);
    assert_eq!(vec![id], *kernel.freed_syncpoints.borrow());
}

#[test]
fn wait_signaled() {
    let mut kernel = FakeKernel::new(SocVersion::Tegra194);
    kernel.wait_signals = true;
    let tegra = Tegra::new(&kernel);
    let channel = tegra.open_channel(EngineClass::Vic, 0).unwrap();
    let syncpt = tegra.allocate_syncpoint().unwrap();
    let mut job = channel.create_job().unwrap();
    job.push_sync(&syncpt, 1).unwrap();
    job.submit().unwrap();
    assert_eq!(
        WaitResult::Signaled,
        job.wait(Duration::from_millis(250)).unwrap()
    );
}

#[test]
fn vic_clear_and_execute() {
    let kernel = FakeKernel::new(SocVersion::Tegra194);
    let mut vic = Vic::new(&kernel).unwrap();

    let color = Color::new(PixelFormat::A8R8G8B8, 1.0, 0.0, 0.0, 1.0).unwrap();
    let mut output = vic
        .image(4, 4, color.format, BlockKind::Pitch)
        .unwrap();
    assert_eq!(8, output.stride);
    assert_eq!(32, output.pitch);

    output.fill(0xff).unwrap();
    assert_eq!(0xffff_ffff, output.pixel(0, 0).unwrap());

    vic.clear(&output, &color).unwrap();
    // The mock never signals the syncpoint.
    assert_eq!(WaitResult::TimedOut, vic.execute(&output, &[]).unwrap());

    let submits = kernel.submits.borrow();
    let submit = &submits[0];
    // Config, filter, histogram and the output surface are relocated.
    assert_eq!(4, submit.buffers.len());
    assert_eq!(1, submit.syncpt.increments);
    // Application id, control params, 4 buffer methods, execute, wait
    // condition: 3 words each for the methods, 2 for the condition.
    assert_eq!(7 * 3 + 2, submit.gather.len());
}

#[test]
fn vic_requires_known_generation() {
    let kernel = FakeKernel::new(SocVersion::Tegra186);
    match Vic::new(&kernel) {
        Err(Error::UnsupportedEngineVersion(SocVersion::Tegra186)) => {}
        other => panic!("unexpected result: {:?}", other.err()),
    };
}
