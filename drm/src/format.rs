// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Pixel formats and framebuffer modifiers.

use crate::Error;
use crate::Result;

/// One color component inside a packed pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Component {
    pub shift: u32,
    pub width: u32,
}

const fn comp(shift: u32, width: u32) -> Component {
    Component { shift, width }
}

/// Bit layout of the red, green, blue and alpha components of a single-plane
/// RGB format. A zero-width component is absent from the format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RgbaLayout {
    pub red: Component,
    pub green: Component,
    pub blue: Component,
    pub alpha: Component,
}

struct FormatInfo {
    fourcc: [u8; 4],
    num_planes: u32,
    cpp: [u32; 3],
    hsub: u32,
    vsub: u32,
    components: Option<RgbaLayout>,
}

macro_rules! format_info {
    ($a:expr, $b:expr, $c:expr, $d:expr, $planes:expr, $cpp:expr, $hsub:expr, $vsub:expr) => {
        FormatInfo {
            fourcc: [$a as u8, $b as u8, $c as u8, $d as u8],
            num_planes: $planes,
            cpp: $cpp,
            hsub: $hsub,
            vsub: $vsub,
            components: None,
        }
    };
    ($a:expr, $b:expr, $c:expr, $d:expr, $planes:expr, $cpp:expr, $hsub:expr, $vsub:expr,
     $r:expr, $g:expr, $bl:expr, $al:expr) => {
        FormatInfo {
            fourcc: [$a as u8, $b as u8, $c as u8, $d as u8],
            num_planes: $planes,
            cpp: $cpp,
            hsub: $hsub,
            vsub: $vsub,
            components: Some(RgbaLayout {
                red: $r,
                green: $g,
                blue: $bl,
                alpha: $al,
            }),
        }
    };
}

/// A pixel format identified by its 4-character code.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Format {
    C8,
    Abgr4444,
    Xrgb1555,
    Xbgr1555,
    Rgbx5551,
    Bgrx5551,
    Argb1555,
    Abgr1555,
    Rgba5551,
    Bgra5551,
    Rgb565,
    Bgr565,
    Xrgb8888,
    Xbgr8888,
    Argb8888,
    Abgr8888,
    Yuyv,
    Uyvy,
    Yuv420,
    Yuv422,
}

impl Format {
    const ALL: [Format; 20] = [
        Format::C8,
        Format::Abgr4444,
        Format::Xrgb1555,
        Format::Xbgr1555,
        Format::Rgbx5551,
        Format::Bgrx5551,
        Format::Argb1555,
        Format::Abgr1555,
        Format::Rgba5551,
        Format::Bgra5551,
        Format::Rgb565,
        Format::Bgr565,
        Format::Xrgb8888,
        Format::Xbgr8888,
        Format::Argb8888,
        Format::Abgr8888,
        Format::Yuyv,
        Format::Uyvy,
        Format::Yuv420,
        Format::Yuv422,
    ];

    fn info(self) -> FormatInfo {
        match self {
            Format::C8 => format_info!('C', '8', ' ', ' ', 1, [1, 0, 0], 1, 1),
            Format::Abgr4444 => format_info!(
                'A', 'B', '1', '2', 1, [2, 0, 0], 1, 1,
                comp(0, 4), comp(4, 4), comp(8, 4), comp(12, 4)
            ),
            Format::Xrgb1555 => format_info!(
                'X', 'R', '1', '5', 1, [2, 0, 0], 1, 1,
                comp(10, 5), comp(5, 5), comp(0, 5), comp(15, 1)
            ),
            Format::Xbgr1555 => format_info!(
                'X', 'B', '1', '5', 1, [2, 0, 0], 1, 1,
                comp(0, 5), comp(5, 5), comp(10, 5), comp(15, 1)
            ),
            Format::Rgbx5551 => format_info!(
                'R', 'X', '1', '5', 1, [2, 0, 0], 1, 1,
                comp(11, 5), comp(6, 5), comp(1, 5), comp(0, 1)
            ),
            Format::Bgrx5551 => format_info!(
                'B', 'X', '1', '5', 1, [2, 0, 0], 1, 1,
                comp(1, 5), comp(6, 5), comp(11, 5), comp(0, 1)
            ),
            Format::Argb1555 => format_info!(
                'A', 'R', '1', '5', 1, [2, 0, 0], 1, 1,
                comp(10, 5), comp(5, 5), comp(0, 5), comp(15, 1)
            ),
            Format::Abgr1555 => format_info!(
                'A', 'B', '1', '5', 1, [2, 0, 0], 1, 1,
                comp(0, 5), comp(5, 5), comp(10, 5), comp(15, 1)
            ),
            Format::Rgba5551 => format_info!(
                'R', 'A', '1', '5', 1, [2, 0, 0], 1, 1,
                comp(11, 5), comp(6, 5), comp(1, 5), comp(0, 1)
            ),
            Format::Bgra5551 => format_info!(
                'B', 'A', '1', '5', 1, [2, 0, 0], 1, 1,
                comp(1, 5), comp(6, 5), comp(11, 5), comp(0, 1)
            ),
            Format::Rgb565 => format_info!(
                'R', 'G', '1', '6', 1, [2, 0, 0], 1, 1,
                comp(11, 5), comp(5, 6), comp(0, 5), comp(0, 0)
            ),
            Format::Bgr565 => format_info!(
                'B', 'G', '1', '6', 1, [2, 0, 0], 1, 1,
                comp(0, 5), comp(5, 6), comp(11, 5), comp(0, 0)
            ),
            Format::Xrgb8888 => format_info!(
                'X', 'R', '2', '4', 1, [4, 0, 0], 1, 1,
                comp(16, 8), comp(8, 8), comp(0, 8), comp(24, 8)
            ),
            Format::Xbgr8888 => format_info!(
                'X', 'B', '2', '4', 1, [4, 0, 0], 1, 1,
                comp(0, 8), comp(8, 8), comp(16, 8), comp(24, 8)
            ),
            Format::Argb8888 => format_info!(
                'A', 'R', '2', '4', 1, [4, 0, 0], 1, 1,
                comp(16, 8), comp(8, 8), comp(0, 8), comp(24, 8)
            ),
            Format::Abgr8888 => format_info!(
                'A', 'B', '2', '4', 1, [4, 0, 0], 1, 1,
                comp(0, 8), comp(8, 8), comp(16, 8), comp(24, 8)
            ),
            Format::Yuyv => format_info!('Y', 'U', 'Y', 'V', 3, [1, 1, 1], 2, 2),
            Format::Uyvy => format_info!('U', 'Y', 'V', 'Y', 3, [1, 1, 1], 2, 2),
            Format::Yuv420 => format_info!('Y', 'U', '1', '2', 3, [1, 1, 1], 2, 2),
            Format::Yuv422 => format_info!('Y', 'U', '1', '6', 3, [1, 1, 1], 2, 1),
        }
    }

    /// The 4-character code packed into a little-endian 32-bit integer.
    pub fn fourcc(self) -> u32 {
        u32::from_le_bytes(self.info().fourcc)
    }

    /// The 4 characters of the code, including any space padding.
    pub fn fourcc_chars(self) -> [u8; 4] {
        self.info().fourcc
    }

    /// Looks up the format with the given packed code.
    pub fn from_fourcc(fourcc: u32) -> Option<Format> {
        Format::ALL.into_iter().find(|f| f.fourcc() == fourcc)
    }

    /// Number of planes the format stores its samples in.
    pub fn num_planes(self) -> u32 {
        self.info().num_planes
    }

    /// Bytes per sample for each plane.
    pub fn cpp(self) -> [u32; 3] {
        self.info().cpp
    }

    /// Horizontal chroma subsampling factor.
    pub fn hsub(self) -> u32 {
        self.info().hsub
    }

    /// Vertical chroma subsampling factor.
    pub fn vsub(self) -> u32 {
        self.info().vsub
    }

    /// The RGBA component layout, if the format has one.
    pub fn components(self) -> Option<RgbaLayout> {
        self.info().components
    }

    /// Packs one pixel from normalized color values into the format's
    /// little-endian byte representation.
    ///
    /// Components absent from the format (zero width) take no bits, so the
    /// corresponding inputs are ignored.
    pub fn pixel(self, red: f32, green: f32, blue: f32, alpha: f32) -> Result<Vec<u8>> {
        let info = self.info();
        let layout = info.components.ok_or(Error::NoComponentLayout(self))?;
        let mut value: u64 = 0;
        for (component, input) in [
            (layout.red, red),
            (layout.green, green),
            (layout.blue, blue),
            (layout.alpha, alpha),
        ] {
            let mask = (1u64 << component.width) - 1;
            value |= ((input as f64 * mask as f64) as u64) << component.shift;
        }
        Ok(value.to_le_bytes()[..info.cpp[0] as usize].to_vec())
    }
}

/// Vendor tag in the upper byte of a framebuffer modifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Vendor {
    None = 0,
    Intel = 1,
    Amd = 2,
    Nvidia = 3,
    Samsung = 4,
    Qcom = 5,
    Vivante = 6,
    Broadcom = 7,
    Arm = 8,
}

/// A framebuffer layout modifier: an 8-bit vendor tag and a 56-bit
/// vendor-specific code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Modifier(pub u64);

impl Modifier {
    pub const INVALID: Modifier = Modifier::new(Vendor::None, 0x00ff_ffff_ffff_ffff);
    pub const LINEAR: Modifier = Modifier::new(Vendor::None, 0);

    pub const fn new(vendor: Vendor, code: u64) -> Modifier {
        Modifier(((vendor as u64) << 56) | (code & 0x00ff_ffff_ffff_ffff))
    }

    pub fn code(self) -> u64 {
        self.0 & 0x00ff_ffff_ffff_ffff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourcc_round_trip() {
        for format in Format::ALL {
            assert_eq!(Some(format), Format::from_fourcc(format.fourcc()));
        }
    }

    #[test]
    fn fourcc_space_padding() {
        // 2-character codes keep their space padding through packing.
        assert_eq!(*b"C8  ", Format::C8.fourcc_chars());
        let packed = Format::C8.fourcc();
        assert_eq!(*b"C8  ", packed.to_le_bytes());
        assert_eq!(*b"RG16", Format::Rgb565.fourcc_chars());
    }

    #[test]
    fn rgb565_red_pixel() {
        // Only the red field at maximum; the format has no alpha bits, so
        // alpha does not influence the packing.
        let pixel = Format::Rgb565.pixel(1.0, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(vec![0x00, 0xf8], pixel);
        let ignored_alpha = Format::Rgb565.pixel(1.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(pixel, ignored_alpha);
    }

    #[test]
    fn xrgb8888_pixels() {
        assert_eq!(
            vec![0x00, 0x00, 0xff, 0xff],
            Format::Xrgb8888.pixel(1.0, 0.0, 0.0, 1.0).unwrap()
        );
        assert_eq!(
            vec![0xff, 0xff, 0xff, 0xff],
            Format::Xrgb8888.pixel(1.0, 1.0, 1.0, 1.0).unwrap()
        );
    }

    #[test]
    fn planar_formats_do_not_pack() {
        assert!(matches!(
            Format::Yuv420.pixel(0.5, 0.5, 0.5, 1.0),
            Err(Error::NoComponentLayout(Format::Yuv420))
        ));
    }

    #[test]
    fn modifier_split() {
        assert_eq!(0, Modifier::LINEAR.0);
        assert_eq!(0x00ff_ffff_ffff_ffff, Modifier::INVALID.0);
        let m = Modifier::new(Vendor::Nvidia, 0x15);
        assert_eq!(0x0300_0000_0000_0015, m.0);
        assert_eq!(0x15, m.code());
    }
}
