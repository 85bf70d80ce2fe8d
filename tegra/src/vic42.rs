// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Configuration records for the Tegra194 generation of the compositor.
//!
//! The engine consumes these as an opaque blob; only the structural layout
//! matters here. Sub-word fields are packed into explicit 64-bit words with
//! shift/width constants, and the record sizes are pinned so the
//! control-parameter word derived from them stays in step.

use std::mem::size_of;

use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;

use crate::vic::AlphaFillMode;
use crate::vic::BlockKind;
use crate::vic::Color;
use crate::vic::PixelFormat;

pub const SET_APPLICATION_ID: u32 = 0x0200;
pub const EXECUTE: u32 = 0x0300;
pub const SET_CONTROL_PARAMS: u32 = 0x0704;
pub const SET_CONFIG_STRUCT_OFFSET: u32 = 0x0708;
pub const SET_FILTER_STRUCT_OFFSET: u32 = 0x070c;
pub const SET_HIST_OFFSET: u32 = 0x0714;
pub const SET_OUTPUT_SURFACE_LUMA_OFFSET: u32 = 0x0720;

/// Method address of the luma plane of input `surface` in `slot`.
pub fn set_surface_luma_offset(slot: u32, surface: u32) -> u32 {
    0x1200 + slot * 0x60 + surface * 0x0c
}

/// Method address of the chroma-U plane of input `surface` in `slot`.
pub fn set_surface_chroma_u_offset(slot: u32, surface: u32) -> u32 {
    set_surface_luma_offset(slot, surface) + 0x04
}

/// Method address of the chroma-V plane of input `surface` in `slot`.
pub fn set_surface_chroma_v_offset(slot: u32, surface: u32) -> u32 {
    set_surface_luma_offset(slot, surface) + 0x08
}

/// Replaces the `width`-bit field at `shift` in `word`.
fn set_field(word: &mut u64, shift: u32, width: u32, value: u64) {
    let mask = ((1u64 << width) - 1) << shift;
    *word = (*word & !mask) | ((value << shift) & mask);
}

#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct PipeConfig {
    pub words: [u64; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct OutputConfig {
    word0: u64,
    word1: u64,
}

impl OutputConfig {
    pub fn set_alpha_fill_mode(&mut self, mode: AlphaFillMode) {
        set_field(&mut self.word0, 0, 3, mode as u64);
    }

    /// Background color: 8-bit alpha, 10-bit color channels.
    pub fn set_background(&mut self, alpha: u64, red: u64, green: u64, blue: u64) {
        set_field(&mut self.word0, 8, 8, alpha);
        set_field(&mut self.word0, 16, 10, red);
        set_field(&mut self.word0, 26, 10, green);
        set_field(&mut self.word0, 36, 10, blue);
    }

    /// Target rectangle corners, inclusive.
    pub fn set_target_rect(&mut self, left: u64, top: u64, right: u64, bottom: u64) {
        set_field(&mut self.word1, 0, 14, left);
        set_field(&mut self.word1, 16, 14, right);
        set_field(&mut self.word1, 32, 14, top);
        set_field(&mut self.word1, 48, 14, bottom);
    }
}

#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct OutputSurfaceConfig {
    word0: u64,
    word1: u64,
}

impl OutputSurfaceConfig {
    pub fn set_pixel_format(&mut self, format: PixelFormat) {
        set_field(&mut self.word0, 0, 7, format as u64);
    }

    pub fn set_block_kind(&mut self, kind: BlockKind, block_height_log2: u64) {
        set_field(&mut self.word0, 11, 4, kind as u64);
        set_field(&mut self.word0, 15, 4, block_height_log2);
    }

    /// Visible surface dimensions, minus one.
    pub fn set_surface_size(&mut self, width: u64, height: u64) {
        set_field(&mut self.word0, 32, 14, width);
        set_field(&mut self.word0, 46, 14, height);
    }

    /// Luma plane dimensions, minus one.
    pub fn set_luma_size(&mut self, width: u64, height: u64) {
        set_field(&mut self.word1, 0, 14, width);
        set_field(&mut self.word1, 14, 14, height);
    }

    /// Chroma plane dimensions, minus one.
    pub fn set_chroma_size(&mut self, width: u64, height: u64) {
        set_field(&mut self.word1, 32, 14, width);
        set_field(&mut self.word1, 46, 14, height);
    }
}

#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct MatrixStruct {
    pub words: [u64; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct ClearRectStruct {
    pub words: [u64; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct SlotConfig {
    pub words: [u64; 8],
}

#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct SlotSurfaceConfig {
    pub words: [u64; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct LumaKeyStruct {
    pub words: [u64; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct BlendingSlotStruct {
    pub words: [u64; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct SlotStruct {
    pub config: SlotConfig,
    pub surface_config: SlotSurfaceConfig,
    pub luma_key: LumaKeyStruct,
    pub color_matrix: MatrixStruct,
    pub gamut_matrix: MatrixStruct,
    pub blending: BlendingSlotStruct,
}

/// The whole configuration record the engine reads at `EXECUTE`.
#[repr(C)]
#[derive(Copy, Clone, Default, FromBytes, Immutable, IntoBytes)]
pub struct ConfigStruct {
    pub pipe: PipeConfig,
    pub output: OutputConfig,
    pub output_surface: OutputSurfaceConfig,
    pub out_color_matrix: MatrixStruct,
    pub clear_rects: [ClearRectStruct; 4],
    pub slots: [SlotStruct; 16],
}

/// The `SET_CONTROL_PARAMS` value: the configuration size in 16-byte units,
/// in the upper halfword.
pub fn control_params() -> u32 {
    ((size_of::<ConfigStruct>() / 16) as u32) << 16
}

/// Builds the configuration for a background-color fill of the whole target
/// surface.
pub fn clear_config(
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
    kind: BlockKind,
    color: &Color,
) -> ConfigStruct {
    let mut config = ConfigStruct::default();

    let channel10 = |v: f32| (v * 1023.0) as u64;
    config.output.set_alpha_fill_mode(AlphaFillMode::Background);
    config.output.set_background(
        (color.alpha * 255.0) as u64,
        channel10(color.red),
        channel10(color.green),
        channel10(color.blue),
    );
    config
        .output
        .set_target_rect(0, 0, width as u64 - 1, height as u64 - 1);

    config.output_surface.set_pixel_format(format);
    config.output_surface.set_block_kind(kind, 0);
    config
        .output_surface
        .set_surface_size(width as u64 - 1, height as u64 - 1);
    config
        .output_surface
        .set_luma_size(stride as u64 - 1, height as u64 - 1);
    config.output_surface.set_chroma_size(16383, 16383);

    config
}

#[cfg(test)]
mod tests {
    use static_assertions::const_assert_eq;

    use super::*;

    // The engine's record sizes are fixed by the hardware interface; a drift
    // here would skew every offset the blob is addressed with.
    const_assert_eq!(size_of::<SlotStruct>(), 176);
    const_assert_eq!(size_of::<ConfigStruct>(), 2960);

    #[test]
    fn control_params_counts_16_byte_units() {
        assert_eq!((2960 / 16) << 16, control_params());
    }

    #[test]
    fn surface_method_addresses() {
        assert_eq!(0x1200, set_surface_luma_offset(0, 0));
        assert_eq!(0x120c, set_surface_luma_offset(0, 1));
        assert_eq!(0x1260, set_surface_luma_offset(1, 0));
        assert_eq!(0x1204, set_surface_chroma_u_offset(0, 0));
        assert_eq!(0x1208, set_surface_chroma_v_offset(0, 0));
    }

    #[test]
    fn field_packing() {
        let mut word = 0u64;
        set_field(&mut word, 8, 8, 0xff);
        set_field(&mut word, 16, 10, 1023);
        assert_eq!(0x03ff_ff00, word);
        // Overwriting a field clears its old bits.
        set_field(&mut word, 16, 10, 1);
        assert_eq!(0x0001_ff00, word);
        // Values are truncated to the field width.
        set_field(&mut word, 0, 3, 0xff);
        assert_eq!(0x0001_ff07, word);
    }

    #[test]
    fn clear_config_packs_output_words() {
        let color = Color::new(PixelFormat::A8R8G8B8, 1.0, 0.0, 0.0, 1.0).unwrap();
        let config = clear_config(4, 4, 8, PixelFormat::A8R8G8B8, BlockKind::Pitch, &color);

        // AlphaFillMode::Background, full alpha, red at 1023.
        let expected_word0 = 1u64 | (255 << 8) | (1023 << 16);
        assert_eq!(expected_word0, config.output.word0);
        // Target rect right = bottom = 3.
        assert_eq!((3 << 16) | (3u64 << 48), config.output.word1);
        // Pixel format 32, surface 3x3 (inclusive), luma width from stride.
        let surface_word0 = 32u64 | (3 << 32) | (3 << 46);
        assert_eq!(surface_word0, config.output_surface.word0);
        let surface_word1 = 7u64 | (3 << 14) | (16383 << 32) | (16383u64 << 46);
        assert_eq!(surface_word1, config.output_surface.word1);
    }
}
