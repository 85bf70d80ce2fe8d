// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The video image compositor engine: a consumer of the channel/job
//! submission layer that drives the fixed-function compositing block through
//! opaque configuration records.

use std::collections::BTreeMap;
use std::time::Duration;

use drm::Control;
use log::debug;

use crate::buffer::BufferObject;
use crate::channel::Channel;
use crate::channel::EngineClass;
use crate::channel::MapFlags;
use crate::channel::SocVersion;
use crate::job::host1x_opcode_incr;
use crate::job::Job;
use crate::job::SyncCond;
use crate::job::WaitResult;
use crate::syncpoint::Syncpoint;
use crate::vic42;
use crate::Error;
use crate::Result;

/// Register offset the method address/data pair is written through.
const METHOD_OFFSET: u32 = 0x10;

/// Rounds `value` up to a multiple of `alignment` (a power of two).
pub(crate) fn align(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) & !(alignment - 1)
}

/// Pixel formats of the compositor's surface descriptors.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum PixelFormat {
    A8 = 0,
    L8 = 1,
    A4L4 = 2,
    L4A4 = 3,
    R8 = 4,
    A8L8 = 5,
    L8A8 = 6,
    R8G8 = 7,
    G8R8 = 8,
    B5G6R5 = 9,
    R5G6B5 = 10,
    B6G5R5 = 11,
    R5G5B6 = 12,
    A1B5G5R5 = 13,
    A1R5G5B5 = 14,
    B5G5B5A1 = 15,
    R5G5B5A1 = 16,
    A5B5G5R1 = 17,
    A5R1G5B5 = 18,
    B5G5R1A5 = 19,
    R1G5B5A5 = 20,
    X1B5G5R5 = 21,
    X1R5G5B5 = 22,
    B5G5R5X1 = 23,
    R5G5B5X1 = 24,
    A4B4G4R4 = 25,
    A4R4G4B4 = 26,
    B4G4R4A4 = 27,
    R4G4B4A4 = 28,
    B8_G8_R8 = 29,
    R8_G8_B8 = 30,
    A8B8G8R8 = 31,
    A8R8G8B8 = 32,
    B8G8R8A8 = 33,
    R8G8B8A8 = 34,
    X8G8B8R8 = 35,
    X8R8G8B8 = 36,
    B8G8R8X8 = 37,
    R8G8B8X8 = 38,
    A2B10G10R10 = 39,
    A2R10G10B10 = 40,
    B10G10R10A2 = 41,
    R10G10B10A2 = 42,
    A4P4 = 43,
    P4A4 = 44,
    P8A8 = 45,
    A8P8 = 46,
    P8 = 47,
    P1 = 48,
    U8V8 = 49,
    V8U8 = 50,
    A8Y8U8V8 = 51,
    V8U8Y8A8 = 52,
    Y8_U8_V8 = 53,
    Y8_V8_U8 = 54,
    U8_V8_Y8 = 55,
    V8_U8_Y8 = 56,
    Y8_U8__Y8_V8 = 57,
    Y8_V8__Y8_U8 = 58,
    U8_Y8__V8_Y8 = 59,
    V8_Y8__U8_Y8 = 60,
    Y8___U8V8_N444 = 61,
    Y8___V8U8_N444 = 62,
    Y8___U8V8_N422 = 63,
    Y8___V8U8_N422 = 64,
    Y8___U8V8_N422R = 65,
    Y8___V8U8_N422R = 66,
    Y8___U8V8_N420 = 67,
    Y8___V8U8_N420 = 68,
    Y8___U8___V8_N444 = 69,
    Y8___U8___V8_N422 = 70,
    Y8___U8___V8_N422R = 71,
    Y8___U8___V8_N420 = 72,
    U8 = 73,
    V8 = 74,
    Y10___U10V10_N444 = 75,
    Y10___V10U10_N444 = 76,
    Y10___U10V10_N422 = 77,
    Y10___V10U10_N422 = 78,
    Y10___U10V10_N422R = 79,
    Y10___V10U10_N422R = 80,
    Y10___U10V10_N420 = 81,
    Y10___V10U10_N420 = 82,
    Y10___U10___V10_N444 = 83,
    Y10___U10___V10_N422 = 84,
    Y10___U10___V10_N422R = 85,
    Y10___U10___V10_N420 = 86,
    U10 = 87,
    V10 = 88,
    L10 = 89,
    U10V10 = 90,
    V10U10 = 91,
    Y12___U12V12_N444 = 92,
    Y12___V12U12_N444 = 93,
    Y12___U12V12_N422 = 94,
    Y12___V12U12_N422 = 95,
    Y12___U12V12_N422R = 96,
    Y12___V12U12_N422R = 97,
    Y12___U12V12_N420 = 98,
    Y12___V12U12_N420 = 99,
    Y12___U12___V12_N444 = 100,
    Y12___U12___V12_N422 = 101,
    Y12___U12___V12_N422R = 102,
    Y12___U12___V12_N420 = 103,
    U12 = 104,
    V12 = 105,
    L12 = 106,
    U12V12 = 107,
    V12U12 = 108,
    L16 = 109,
    A16B16G16R16 = 110,
    A16Y16U16V16 = 111,
    R16 = 112,
    Y16___V8U8_N444 = 113,
    Y16___V8U8_N422 = 114,
    Y16___V8U8_N420 = 115,
    Y16___V16U16_N444 = 116,
    Y16___V16U16_N422 = 117,
    Y16___V16U16_N420 = 118,
    U16V16 = 119,
    V16U16 = 120,
}

/// Memory layouts of a compositor surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum BlockKind {
    Pitch = 0,
    Generic16Bx2 = 1,
    BlNaive = 2,
    BlKeplerXbarRaw = 3,
    Vp2Tiled = 15,
}

/// How the output alpha channel is produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum AlphaFillMode {
    Opaque = 0,
    Background = 1,
    Destination = 2,
    Composited = 4,
    SourceAlpha = 5,
}

/// A fill color with its packed pixel value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub format: PixelFormat,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
    pub value: u32,
}

impl Color {
    pub fn new(format: PixelFormat, red: f32, green: f32, blue: f32, alpha: f32) -> Result<Color> {
        let channel = |v: f32| (v * 255.0) as u32;
        let value = match format {
            PixelFormat::A8R8G8B8 => {
                channel(alpha) << 24 | channel(red) << 16 | channel(green) << 8 | channel(blue)
            }
            PixelFormat::R8G8B8A8 => {
                channel(red) << 24 | channel(green) << 16 | channel(blue) << 8 | channel(alpha)
            }
            _ => return Err(Error::UnsupportedPixelFormat(format)),
        };
        Ok(Color {
            format,
            red,
            green,
            blue,
            alpha,
            value,
        })
    }
}

fn bytes_per_pixel(format: PixelFormat) -> Result<u32> {
    match format {
        PixelFormat::A8R8G8B8 | PixelFormat::R8G8B8A8 => Ok(4),
        _ => Err(Error::UnsupportedPixelFormat(format)),
    }
}

/// Computes (stride in pixels, pitch in bytes) for a surface. Pure function,
/// no kernel interaction.
pub fn surface_geometry(width: u32, format: PixelFormat, kind: BlockKind) -> Result<(u32, u32)> {
    let bpp = bytes_per_pixel(format)?;
    // The pitch layout operates on 8x8 pixel macroblocks; the block-linear
    // kinds keep the same horizontal alignment.
    let alignment = match kind {
        BlockKind::Pitch => 8,
        _ => 8,
    };
    let stride = align(width, alignment);
    Ok((stride, stride * bpp))
}

/// A compositor surface backed by a buffer object.
pub struct Image<'a> {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub kind: BlockKind,
    /// Row length in pixels, padded to the block alignment.
    pub stride: u32,
    /// Row length in bytes.
    pub pitch: u32,
    buffer: BufferObject<'a>,
}

impl<'a> Image<'a> {
    fn new(
        dev: &'a dyn Control,
        width: u32,
        height: u32,
        format: PixelFormat,
        kind: BlockKind,
    ) -> Result<Image<'a>> {
        let (stride, pitch) = surface_geometry(width, format, kind)?;
        let size = pitch as u64 * height as u64;
        let buffer = BufferObject::create(dev, size, 0)?;
        Ok(Image {
            width,
            height,
            format,
            kind,
            stride,
            pitch,
            buffer,
        })
    }

    /// The memory object backing this surface.
    pub fn buffer(&self) -> &BufferObject<'a> {
        &self.buffer
    }

    /// Fills the whole backing store, padding included, with `byte`.
    pub fn fill(&mut self, byte: u8) -> Result<()> {
        self.buffer.map()?.fill(byte);
        Ok(())
    }

    /// Reads back the packed pixel at `(x, y)`.
    pub fn pixel(&mut self, x: u32, y: u32) -> Result<u32> {
        let bpp = bytes_per_pixel(self.format)?;
        let offset = y as usize * self.pitch as usize + x as usize * bpp as usize;
        Ok(self.buffer.map()?.read_obj(offset)?)
    }
}

/// A video image compositor bound to one channel.
///
/// Only the Tegra194 generation of the engine has a configuration backend.
pub struct Vic<'a> {
    dev: &'a dyn Control,
    channel: Channel<'a>,
    syncpt: Syncpoint<'a>,
    config: BufferObject<'a>,
    filter: BufferObject<'a>,
    histogram: BufferObject<'a>,
    mappings: BTreeMap<u32, crate::Mapping<'a>>,
}

impl<'a> Vic<'a> {
    /// Opens the compositor engine and allocates its fixed work buffers.
    pub fn new(dev: &'a dyn Control) -> Result<Vic<'a>> {
        let channel = Channel::open(dev, EngineClass::Vic, 0)?;
        if channel.version() != SocVersion::Tegra194 {
            return Err(Error::UnsupportedEngineVersion(channel.version()));
        }
        let syncpt = Syncpoint::allocate(dev)?;
        let config = BufferObject::create(dev, 16 * 1024, 0)?;
        let filter = BufferObject::create(dev, 16 * 1024, 0)?;
        let histogram = BufferObject::create(dev, 4 * 1024, 0)?;

        let mut mappings = BTreeMap::new();
        for (bo, flags) in [
            (&config, MapFlags::Read),
            (&filter, MapFlags::Read),
            (&histogram, MapFlags::ReadWrite),
        ] {
            let handle = bo.handle().ok_or(Error::BufferClosed)?;
            mappings.insert(handle, channel.map(bo, flags)?);
        }
        Ok(Vic {
            dev,
            channel,
            syncpt,
            config,
            filter,
            histogram,
            mappings,
        })
    }

    /// Creates a surface for this compositor.
    pub fn image(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        kind: BlockKind,
    ) -> Result<Image<'a>> {
        Image::new(self.dev, width, height, format, kind)
    }

    /// Maps `bo` into the engine channel, once; repeated maps of the same
    /// object are accepted and keep the original mapping.
    fn map_buffer(&mut self, bo: &BufferObject<'a>, flags: MapFlags) -> Result<()> {
        let handle = bo.handle().ok_or(Error::BufferClosed)?;
        if self.mappings.contains_key(&handle) {
            debug!("buffer {} is already mapped to the compositor", handle);
            return Ok(());
        }
        let mapping = self.channel.map(bo, flags)?;
        self.mappings.insert(handle, mapping);
        Ok(())
    }

    fn mapping(&self, bo: &BufferObject<'a>) -> Result<&crate::Mapping<'a>> {
        let handle = bo.handle().ok_or(Error::BufferClosed)?;
        self.mappings.get(&handle).ok_or(Error::MappingClosed)
    }

    fn push_method(&self, job: &mut Job<'a>, method: u32, value: u32) -> Result<()> {
        job.push(host1x_opcode_incr(METHOD_OFFSET, 2))?;
        job.push(method >> 2)?;
        job.push(value)
    }

    fn push_buffer(
        &self,
        job: &mut Job<'a>,
        method: u32,
        bo: &BufferObject<'a>,
        offset: u64,
        flags: u32,
    ) -> Result<()> {
        job.push(host1x_opcode_incr(METHOD_OFFSET, 2))?;
        job.push(method >> 2)?;
        // Buffer addresses are programmed in 256-byte units, hence the
        // 8-bit relocation shift.
        job.push_buffer(self.mapping(bo)?, offset, 8, flags)
    }

    /// Programs the configuration record to fill `image` with `color`.
    pub fn clear(&mut self, image: &Image, color: &Color) -> Result<()> {
        let config = vic42::clear_config(
            image.width,
            image.height,
            image.stride,
            image.format,
            image.kind,
            color,
        );
        self.config.map()?.write_obj(config, 0)?;
        Ok(())
    }

    /// Runs one compositing pass into `output`, reading from `inputs`.
    pub fn execute(&mut self, output: &Image<'a>, inputs: &[&Image<'a>]) -> Result<WaitResult> {
        self.map_buffer(output.buffer(), MapFlags::Write)?;
        for input in inputs {
            self.map_buffer(input.buffer(), MapFlags::Read)?;
        }

        let mut job = self.channel.create_job()?;
        job.push_begin()?;
        self.push_method(&mut job, vic42::SET_APPLICATION_ID, 1)?;
        self.push_method(&mut job, vic42::SET_CONTROL_PARAMS, vic42::control_params())?;
        self.push_buffer(&mut job, vic42::SET_CONFIG_STRUCT_OFFSET, &self.config, 0, 0)?;
        self.push_buffer(&mut job, vic42::SET_FILTER_STRUCT_OFFSET, &self.filter, 0, 0)?;
        self.push_buffer(&mut job, vic42::SET_HIST_OFFSET, &self.histogram, 0, 0)?;
        self.push_buffer(
            &mut job,
            vic42::SET_OUTPUT_SURFACE_LUMA_OFFSET,
            output.buffer(),
            0,
            0,
        )?;
        for (slot, input) in inputs.iter().enumerate() {
            self.push_buffer(
                &mut job,
                vic42::set_surface_luma_offset(0, slot as u32),
                input.buffer(),
                0,
                0,
            )?;
        }
        self.push_method(&mut job, vic42::EXECUTE, 1 << 8)?;
        job.push_sync_cond(&self.syncpt, SyncCond::OpDone)?;
        job.push_end()?;

        job.submit()?;
        job.wait(Duration::from_millis(250))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_is_macroblock_aligned() {
        // A 4x4 ARGB surface pads its rows to the 8-pixel macroblock.
        let (stride, pitch) =
            surface_geometry(4, PixelFormat::A8R8G8B8, BlockKind::Pitch).unwrap();
        assert_eq!(8, stride);
        assert_eq!(32, pitch);
        assert_eq!(128, pitch as u64 * 4);

        let (stride, pitch) =
            surface_geometry(1920, PixelFormat::A8R8G8B8, BlockKind::Pitch).unwrap();
        assert_eq!(1920, stride);
        assert_eq!(7680, pitch);
    }

    #[test]
    fn geometry_rejects_unsupported_formats() {
        assert!(matches!(
            surface_geometry(4, PixelFormat::Y8_U8_V8, BlockKind::Pitch),
            Err(Error::UnsupportedPixelFormat(PixelFormat::Y8_U8_V8))
        ));
    }

    #[test]
    fn color_packing() {
        let argb = Color::new(PixelFormat::A8R8G8B8, 1.0, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(0xffff_0000, argb.value);
        let rgba = Color::new(PixelFormat::R8G8B8A8, 1.0, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(0xff00_00ff, rgba.value);
        let half = Color::new(PixelFormat::A8R8G8B8, 0.0, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(0x0000_ff00, half.value);
        assert!(Color::new(PixelFormat::A8, 1.0, 1.0, 1.0, 1.0).is_err());
    }
}
