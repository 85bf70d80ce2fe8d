// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::time::Duration;

use drm::execute;
use drm::Control;
use libc::CLOCK_MONOTONIC;
use libc::EAGAIN;
use libc::ETIMEDOUT;
use tegra_sys::*;

use crate::syncpoint::Syncpoint;
use crate::Error;
use crate::Mapping;
use crate::Result;

/// Builds a host1x opcode addressing `count` consecutive registers starting
/// at `offset`.
pub fn host1x_opcode_incr(offset: u32, count: u32) -> u32 {
    (0x1 << 28) | ((offset & 0xfff) << 16) | (count & 0xffff)
}

/// Builds a host1x opcode addressing the single register at `offset` `count`
/// times.
pub fn host1x_opcode_nonincr(offset: u32, count: u32) -> u32 {
    (0x2 << 28) | ((offset & 0xfff) << 16) | (count & 0xffff)
}

/// Wait conditions for the inline wait-condition opcode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum SyncCond {
    Immediate = 0,
    OpDone = 1,
    RdDone = 2,
    WrSafe = 3,
}

/// The fence a submitted job signals: a syncpoint id and the threshold value
/// it reaches when the job completes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fence {
    pub syncpoint: u32,
    pub threshold: u32,
}

/// The outcome of a bounded wait.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaitResult {
    Signaled,
    TimedOut,
}

// The placeholder word reserved for each relocation; the kernel patches it
// with the mapped address at execution time.
const RELOC_PLACEHOLDER: u32 = 0xdead_beef;

/// A mutable, append-only command stream with relocations and an optional
/// syncpoint, submitted atomically to one channel.
///
/// A job is built with the `push_*` methods, becomes immutable at `submit`,
/// and may be waited on afterwards.
pub struct Job<'a> {
    dev: &'a dyn Control,
    context: u32,
    cond_shift: u32,
    gather: Vec<u32>,
    gather_start: usize,
    commands: Vec<drm_tegra_submit_command>,
    buffers: Vec<drm_tegra_submit_buffer>,
    syncpt: Option<(u32, u32)>,
    fence: Option<Fence>,
}

impl<'a> Job<'a> {
    pub(crate) fn new(dev: &'a dyn Control, context: u32, cond_shift: u32) -> Job<'a> {
        Job {
            dev,
            context,
            cond_shift,
            gather: Vec::new(),
            gather_start: 0,
            commands: Vec::new(),
            buffers: Vec::new(),
            syncpt: None,
            fence: None,
        }
    }

    fn building(&self) -> Result<()> {
        if self.fence.is_some() {
            return Err(Error::AlreadySubmitted);
        }
        Ok(())
    }

    /// Appends one raw command word.
    pub fn push(&mut self, word: u32) -> Result<()> {
        self.building()?;
        self.gather.push(word);
        Ok(())
    }

    /// Opens a gather segment; words pushed until `push_end` belong to it.
    pub fn push_begin(&mut self) -> Result<()> {
        self.building()?;
        self.gather_start = self.gather.len();
        Ok(())
    }

    /// Closes the current gather segment and records its word count as one
    /// gather command.
    pub fn push_end(&mut self) -> Result<()> {
        self.building()?;
        let words = (self.gather.len() - self.gather_start) as u32;
        let mut command = drm_tegra_submit_command {
            type_: DRM_TEGRA_SUBMIT_COMMAND_GATHER_UPTR,
            ..Default::default()
        };
        command.data.gather_uptr.words = words;
        self.commands.push(command);
        Ok(())
    }

    /// Appends a command making the engine wait until `syncpt` reaches
    /// `value` before the following gathers run.
    pub fn push_wait(&mut self, syncpt: &Syncpoint, value: u32) -> Result<()> {
        self.building()?;
        let id = syncpt.id().ok_or(Error::SyncpointFreed)?;
        let mut command = drm_tegra_submit_command {
            type_: DRM_TEGRA_SUBMIT_COMMAND_WAIT_SYNCPT,
            ..Default::default()
        };
        command.data.wait_syncpt.id = id;
        command.data.wait_syncpt.value = value;
        self.commands.push(command);
        Ok(())
    }

    /// Appends one relocation entry against `target` and reserves its
    /// placeholder word in the stream. The kernel patches the word at
    /// execution time.
    pub fn push_buffer(
        &mut self,
        target: &Mapping,
        offset: u64,
        shift: u32,
        flags: u32,
    ) -> Result<()> {
        self.building()?;
        let mapping = target.id().ok_or(Error::MappingClosed)?;
        self.buffers.push(drm_tegra_submit_buffer {
            mapping,
            flags,
            reloc: drm_tegra_submit_reloc {
                target_offset: offset,
                gather_offset_words: self.gather.len() as u32,
                shift,
            },
        });
        self.gather.push(RELOC_PLACEHOLDER);
        Ok(())
    }

    /// Accounts `count` increments of `syncpt` to this job. All increments
    /// of one job go to the same syncpoint.
    pub fn push_sync(&mut self, syncpt: &Syncpoint, count: u32) -> Result<()> {
        self.building()?;
        let id = syncpt.id().ok_or(Error::SyncpointFreed)?;
        match &mut self.syncpt {
            None => self.syncpt = Some((id, count)),
            Some((job_id, increments)) => {
                if *job_id != id {
                    return Err(Error::SyncpointMismatch {
                        job: *job_id,
                        pushed: id,
                    });
                }
                *increments += count;
            }
        }
        Ok(())
    }

    /// Pushes an inline opcode incrementing `syncpt` when `cond` is met, and
    /// accounts the increment. The condition field's position depends on the
    /// channel's hardware generation.
    pub fn push_sync_cond(&mut self, syncpt: &Syncpoint, cond: SyncCond) -> Result<()> {
        self.building()?;
        let id = syncpt.id().ok_or(Error::SyncpointFreed)?;
        self.push(host1x_opcode_nonincr(0x0, 0x1))?;
        self.push((cond as u32) << self.cond_shift | id)?;
        self.push_sync(syncpt, 1)
    }

    /// Submits the stream, relocations and commands in one atomic exchange.
    /// On success the job is immutable and carries its fence.
    pub fn submit(&mut self) -> Result<Fence> {
        self.building()?;
        let mut args = drm_tegra_channel_submit {
            context: self.context,
            num_bufs: self.buffers.len() as u32,
            num_cmds: self.commands.len() as u32,
            gather_data_words: self.gather.len() as u32,
            ..Default::default()
        };
        if !self.buffers.is_empty() {
            args.bufs_ptr = self.buffers.as_ptr() as u64;
        }
        if !self.commands.is_empty() {
            args.cmds_ptr = self.commands.as_ptr() as u64;
        }
        if !self.gather.is_empty() {
            args.gather_data_ptr = self.gather.as_ptr() as u64;
        }
        if let Some((id, increments)) = self.syncpt {
            args.syncpt.id = id;
            args.syncpt.increments = increments;
        }
        // SAFETY: the argument matches the request layout and the attached
        // arrays live across the call.
        unsafe { execute(self.dev, DRM_IOCTL_TEGRA_CHANNEL_SUBMIT(), &mut args)? };

        let fence = Fence {
            syncpoint: args.syncpt.id,
            threshold: args.syncpt.value,
        };
        self.fence = Some(fence);
        Ok(fence)
    }

    /// The fence recorded at submit.
    pub fn fence(&self) -> Option<Fence> {
        self.fence
    }

    /// Blocks until the job's syncpoint reaches the fence threshold or
    /// `timeout` passes. Only valid after submit. Timeout is a normal
    /// outcome, not an error.
    pub fn wait(&self, timeout: Duration) -> Result<WaitResult> {
        let fence = self.fence.ok_or(Error::NotSubmitted)?;
        let mut now = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: the timespec outlives the call.
        unsafe { libc::clock_gettime(CLOCK_MONOTONIC, &mut now) };
        let deadline_ns = (now.tv_sec as i64 * 1_000_000_000 + now.tv_nsec as i64)
            .saturating_add(timeout.as_nanos().min(i64::MAX as u128) as i64);

        let mut args = drm_tegra_syncpoint_wait {
            timeout_ns: deadline_ns,
            id: fence.syncpoint,
            threshold: fence.threshold,
            ..Default::default()
        };
        // SAFETY: the argument matches the request layout.
        match unsafe { execute(self.dev, DRM_IOCTL_TEGRA_SYNCPOINT_WAIT(), &mut args) } {
            Ok(()) => Ok(WaitResult::Signaled),
            Err(drm::Error::Ioctl(_, e)) if e.errno() == ETIMEDOUT || e.errno() == EAGAIN => {
                Ok(WaitResult::TimedOut)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_packing() {
        assert_eq!(0x1001_0002, host1x_opcode_incr(0x1, 2));
        assert_eq!(0x2000_0001, host1x_opcode_nonincr(0x0, 1));
        // Fields are masked to their widths.
        assert_eq!(0x1fff_ffff, host1x_opcode_incr(0xffff, 0xf_ffff));
    }
}
