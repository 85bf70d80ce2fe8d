// Copyright 2025 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Display topology discovery.
//!
//! Every variable-length query follows the same two-phase exchange: the first
//! pass with no arrays attached fills only the count fields, the second pass
//! fills arrays allocated to exactly those counts. If the kernel reports more
//! items on the second pass the topology changed in between; the whole
//! sequence is retried. The kernel never fills more entries than the counts
//! passed in, so arrays are never overrun.
//!
//! CRTCs, encoders and planes carry their zero-based position in the
//! discovery order; that ordinal index is the only key the 32-bit
//! `possible_*` relationship masks are decoded against.

use enumn::N;
use drm_sys::*;

use crate::device::execute;
use crate::property;
use crate::Control;
use crate::Error;
use crate::Format;
use crate::Property;
use crate::Result;

/// A display mode: one fixed-size timing descriptor.
///
/// Equality is exact field-wise comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mode {
    pub clock: u32,
    pub hdisplay: u16,
    pub hsync_start: u16,
    pub hsync_end: u16,
    pub htotal: u16,
    pub hskew: u16,
    pub vdisplay: u16,
    pub vsync_start: u16,
    pub vsync_end: u16,
    pub vtotal: u16,
    pub vscan: u16,
    pub vrefresh: u32,
    pub flags: u32,
    pub type_: u32,
    pub name: String,
}

impl Mode {
    fn from_info(info: &drm_mode_modeinfo) -> Mode {
        Mode {
            clock: info.clock,
            hdisplay: info.hdisplay,
            hsync_start: info.hsync_start,
            hsync_end: info.hsync_end,
            htotal: info.htotal,
            hskew: info.hskew,
            vdisplay: info.vdisplay,
            vsync_start: info.vsync_start,
            vsync_end: info.vsync_end,
            vtotal: info.vtotal,
            vscan: info.vscan,
            vrefresh: info.vrefresh,
            flags: info.flags,
            type_: info.type_,
            name: property::fixed_name(&info.name),
        }
    }

    /// Names of the set timing flags.
    pub fn flag_names(&self) -> Vec<&'static str> {
        const FLAGS: [(u32, &str); 14] = [
            (DRM_MODE_FLAG_PHSYNC, "phsync"),
            (DRM_MODE_FLAG_NHSYNC, "nhsync"),
            (DRM_MODE_FLAG_PVSYNC, "pvsync"),
            (DRM_MODE_FLAG_NVSYNC, "nvsync"),
            (DRM_MODE_FLAG_INTERLACE, "interlace"),
            (DRM_MODE_FLAG_DBLSCAN, "dblscan"),
            (DRM_MODE_FLAG_CSYNC, "csync"),
            (DRM_MODE_FLAG_PCSYNC, "pcsync"),
            (DRM_MODE_FLAG_NCSYNC, "ncsync"),
            (DRM_MODE_FLAG_HSKEW, "hskew"),
            (DRM_MODE_FLAG_BCAST, "bcast"),
            (DRM_MODE_FLAG_PIXMUX, "pixmux"),
            (DRM_MODE_FLAG_DBLCLK, "dblclk"),
            (DRM_MODE_FLAG_CLKDIV2, "clkdiv2"),
        ];
        FLAGS
            .iter()
            .filter(|(bit, _)| self.flags & bit != 0)
            .map(|(_, name)| *name)
            .collect()
    }

    /// Names of the set type bits.
    pub fn type_names(&self) -> Vec<&'static str> {
        const TYPES: [(u32, &str); 7] = [
            (DRM_MODE_TYPE_BUILTIN, "builtin"),
            (DRM_MODE_TYPE_CLOCK_C, "clock-c"),
            (DRM_MODE_TYPE_CRTC_C, "crtc-c"),
            (DRM_MODE_TYPE_PREFERRED, "preferred"),
            (DRM_MODE_TYPE_DEFAULT, "default"),
            (DRM_MODE_TYPE_USERDEF, "userdef"),
            (DRM_MODE_TYPE_DRIVER, "driver"),
        ];
        TYPES
            .iter()
            .filter(|(bits, _)| self.type_ & bits == *bits)
            .map(|(_, name)| *name)
            .collect()
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}-{}", self.hdisplay, self.vdisplay, self.vrefresh)
    }
}

/// A framebuffer known to the kernel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pub id: u32,
}

/// A display pipeline stage driving timing and scanout for one output.
#[derive(Clone, Debug)]
pub struct Crtc {
    pub index: usize,
    pub id: u32,
    /// The currently programmed mode, if any.
    pub mode: Option<Mode>,
}

/// Encoder types reported by the kernel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, N)]
#[repr(u32)]
pub enum EncoderKind {
    None = 0,
    Dac = 1,
    Tmds = 2,
    Lvds = 3,
    Tvdac = 4,
    Virtual = 5,
    Dsi = 6,
    Dpmst = 7,
    Dpi = 8,
}

impl EncoderKind {
    pub fn name(self) -> &'static str {
        match self {
            EncoderKind::None => "NONE",
            EncoderKind::Dac => "DAC",
            EncoderKind::Tmds => "TMDS",
            EncoderKind::Lvds => "LVDS",
            EncoderKind::Tvdac => "TVDAC",
            EncoderKind::Virtual => "VIRTUAL",
            EncoderKind::Dsi => "DSI",
            EncoderKind::Dpmst => "DPMST",
            EncoderKind::Dpi => "DPI",
        }
    }
}

/// A signal encoder between a CRTC and a connector.
#[derive(Clone, Debug)]
pub struct Encoder {
    pub index: usize,
    pub id: u32,
    pub kind: Option<EncoderKind>,
    pub(crate) crtc: Option<usize>,
    pub(crate) possible_crtcs: Vec<usize>,
    pub(crate) possible_clones: Vec<usize>,
}

impl Encoder {
    pub fn name(&self) -> &'static str {
        self.kind.map_or("UNKNOWN", EncoderKind::name)
    }
}

/// Connection state of a connector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, N)]
#[repr(u32)]
pub enum ConnectorStatus {
    Connected = DRM_MODE_CONNECTED,
    Disconnected = DRM_MODE_DISCONNECTED,
    Unknown = DRM_MODE_UNKNOWNCONNECTION,
}

/// Connector types reported by the kernel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, N)]
#[repr(u32)]
pub enum ConnectorKind {
    Unknown = 0,
    Vga = 1,
    DviI = 2,
    DviD = 3,
    DviA = 4,
    Composite = 5,
    SVideo = 6,
    Lvds = 7,
    Component = 8,
    Din9Pin = 9,
    DisplayPort = 10,
    HdmiA = 11,
    HdmiB = 12,
    Tv = 13,
    Edp = 14,
    Virtual = 15,
    Dsi = 16,
    Dpi = 17,
    Writeback = 18,
    Spi = 19,
    Usb = 20,
}

impl ConnectorKind {
    pub fn name(self) -> &'static str {
        match self {
            ConnectorKind::Unknown => "unknown",
            ConnectorKind::Vga => "VGA",
            ConnectorKind::DviI => "DVI-I",
            ConnectorKind::DviD => "DVI-D",
            ConnectorKind::DviA => "DVI-A",
            ConnectorKind::Composite => "composite",
            ConnectorKind::SVideo => "s-video",
            ConnectorKind::Lvds => "LVDS",
            ConnectorKind::Component => "component",
            ConnectorKind::Din9Pin => "9-pin DIN",
            ConnectorKind::DisplayPort => "DP",
            ConnectorKind::HdmiA => "HDMI-A",
            ConnectorKind::HdmiB => "HDMI-B",
            ConnectorKind::Tv => "TV",
            ConnectorKind::Edp => "eDP",
            ConnectorKind::Virtual => "Virtual",
            ConnectorKind::Dsi => "DSI",
            ConnectorKind::Dpi => "DPI",
            ConnectorKind::Writeback => "Writeback",
            ConnectorKind::Spi => "SPI",
            ConnectorKind::Usb => "USB",
        }
    }
}

/// A physical display output.
#[derive(Clone, Debug)]
pub struct Connector {
    pub id: u32,
    pub kind: ConnectorKind,
    /// Type-derived display name, e.g. `HDMI-A-1`.
    pub name: String,
    pub status: ConnectorStatus,
    /// Physical dimensions in millimeters.
    pub mm_width: u32,
    pub mm_height: u32,
    pub modes: Vec<Mode>,
    pub properties: Vec<Property>,
    pub(crate) encoders: Vec<usize>,
    pub(crate) encoder: Option<usize>,
}

/// A compositing layer a CRTC scans out from a memory surface.
#[derive(Clone, Debug)]
pub struct Plane {
    pub index: usize,
    pub id: u32,
    pub framebuffer: Option<u32>,
    pub formats: Vec<Format>,
    pub properties: Vec<Property>,
    pub(crate) crtc: Option<usize>,
    pub(crate) possible_crtcs: Vec<usize>,
}

impl Plane {
    /// Moves this plane onto `crtc`, scanning out of `fb`. Source
    /// coordinates are in pixels; the interface carries them as 16.16
    /// fixed-point.
    #[allow(clippy::too_many_arguments)]
    pub fn set(
        &self,
        dev: &dyn Control,
        crtc: &Crtc,
        fb: &Framebuffer,
        flags: u32,
        crtc_x: i32,
        crtc_y: i32,
        crtc_w: u32,
        crtc_h: u32,
        src_x: u32,
        src_y: u32,
        src_w: u32,
        src_h: u32,
    ) -> Result<()> {
        let mut args = drm_mode_set_plane {
            plane_id: self.id,
            crtc_id: crtc.id,
            fb_id: fb.id,
            flags,
            crtc_x,
            crtc_y,
            crtc_w,
            crtc_h,
            src_x: src_x << 16,
            src_y: src_y << 16,
            src_w: src_w << 16,
            src_h: src_h << 16,
        };
        // SAFETY: the argument matches the request layout.
        unsafe { execute(dev, DRM_IOCTL_MODE_SETPLANE(), &mut args) }
    }
}

/// Display dimensions in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// The display topology of one device at discovery time.
pub struct Resources {
    pub framebuffers: Vec<Framebuffer>,
    pub crtcs: Vec<Crtc>,
    pub encoders: Vec<Encoder>,
    pub connectors: Vec<Connector>,
    pub planes: Vec<Plane>,
    pub min_resolution: Resolution,
    pub max_resolution: Resolution,
}

/// Yields the indices of the set bits in `mask`.
fn set_bits(mask: u32) -> impl Iterator<Item = usize> {
    (0..32).filter(move |bit| mask & (1 << bit) != 0)
}

/// Decodes an ordinal-index bitmask against a table of `len` constructed
/// objects. Bits beyond the table are ignored.
fn resolve_mask(mask: u32, len: usize) -> Vec<usize> {
    set_bits(mask).filter(|&index| index < len).collect()
}

impl Resources {
    /// Runs the resource queries against `dev` and builds the typed graph.
    pub fn discover(dev: &dyn Control) -> Result<Resources> {
        let (args, fb_ids, crtc_ids, connector_ids, encoder_ids) = query_resources(dev)?;

        let framebuffers = fb_ids.into_iter().map(|id| Framebuffer { id }).collect();

        let mut crtcs = Vec::with_capacity(crtc_ids.len());
        for (index, id) in crtc_ids.into_iter().enumerate() {
            crtcs.push(query_crtc(dev, index, id)?);
        }

        // Encoders resolve their CRTC masks against the finished CRTC table;
        // clone masks can only be resolved once every encoder exists, so they
        // are decoded from the raw structs in a second pass.
        let mut raw_encoders = Vec::with_capacity(encoder_ids.len());
        for id in &encoder_ids {
            raw_encoders.push(query_encoder(dev, *id)?);
        }
        let mut encoders: Vec<Encoder> = raw_encoders
            .iter()
            .enumerate()
            .map(|(index, raw)| Encoder {
                index,
                id: raw.encoder_id,
                kind: EncoderKind::n(raw.encoder_type),
                crtc: crtcs.iter().position(|c| c.id == raw.crtc_id),
                possible_crtcs: resolve_mask(raw.possible_crtcs, crtcs.len()),
                possible_clones: Vec::new(),
            })
            .collect();
        let encoder_count = encoders.len();
        for (encoder, raw) in encoders.iter_mut().zip(&raw_encoders) {
            encoder.possible_clones = resolve_mask(raw.possible_clones, encoder_count);
        }

        let mut connectors = Vec::with_capacity(connector_ids.len());
        for id in connector_ids {
            connectors.push(query_connector(dev, id, &encoders)?);
        }

        let mut planes = Vec::new();
        for (index, id) in query_plane_resources(dev)?.into_iter().enumerate() {
            planes.push(query_plane(dev, index, id, &crtcs)?);
        }

        Ok(Resources {
            framebuffers,
            crtcs,
            encoders,
            connectors,
            planes,
            min_resolution: Resolution {
                width: args.min_width,
                height: args.min_height,
            },
            max_resolution: Resolution {
                width: args.max_width,
                height: args.max_height,
            },
        })
    }

    /// The CRTCs `encoder` can drive, per its possible-CRTC mask.
    pub fn possible_crtcs<'a>(&'a self, encoder: &'a Encoder) -> impl Iterator<Item = &'a Crtc> {
        encoder.possible_crtcs.iter().map(move |&i| &self.crtcs[i])
    }

    /// The encoders `encoder` can clone, per its possible-clone mask.
    pub fn possible_clones<'a>(&'a self, encoder: &'a Encoder) -> impl Iterator<Item = &'a Encoder> {
        encoder.possible_clones.iter().map(move |&i| &self.encoders[i])
    }

    /// The CRTC currently feeding `encoder`, if any.
    pub fn encoder_crtc(&self, encoder: &Encoder) -> Option<&Crtc> {
        encoder.crtc.map(|i| &self.crtcs[i])
    }

    /// The encoders that can drive `connector`.
    pub fn candidate_encoders<'a>(
        &'a self,
        connector: &'a Connector,
    ) -> impl Iterator<Item = &'a Encoder> {
        connector.encoders.iter().map(move |&i| &self.encoders[i])
    }

    /// The candidate encoder currently driving `connector`, if any.
    pub fn active_encoder(&self, connector: &Connector) -> Option<&Encoder> {
        connector.encoder.map(|i| &self.encoders[i])
    }

    /// The CRTCs `plane` can be shown on, per its possible-CRTC mask.
    pub fn plane_crtcs<'a>(&'a self, plane: &'a Plane) -> impl Iterator<Item = &'a Crtc> {
        plane.possible_crtcs.iter().map(move |&i| &self.crtcs[i])
    }

    /// The CRTC `plane` is currently bound to, if any.
    pub fn plane_crtc(&self, plane: &Plane) -> Option<&Crtc> {
        plane.crtc.map(|i| &self.crtcs[i])
    }
}

type ResourceIds = (drm_mode_card_res, Vec<u32>, Vec<u32>, Vec<u32>, Vec<u32>);

fn query_resources(dev: &dyn Control) -> Result<ResourceIds> {
    loop {
        let mut args = drm_mode_card_res::default();
        // SAFETY: the argument matches the request layout; no arrays are
        // attached on the first pass.
        unsafe { execute(dev, DRM_IOCTL_MODE_GETRESOURCES(), &mut args)? };

        let counts = (
            args.count_fbs,
            args.count_crtcs,
            args.count_connectors,
            args.count_encoders,
        );
        let mut fbs = vec![0u32; args.count_fbs as usize];
        let mut crtcs = vec![0u32; args.count_crtcs as usize];
        let mut connectors = vec![0u32; args.count_connectors as usize];
        let mut encoders = vec![0u32; args.count_encoders as usize];
        if !fbs.is_empty() {
            args.fb_id_ptr = fbs.as_mut_ptr() as u64;
        }
        if !crtcs.is_empty() {
            args.crtc_id_ptr = crtcs.as_mut_ptr() as u64;
        }
        if !connectors.is_empty() {
            args.connector_id_ptr = connectors.as_mut_ptr() as u64;
        }
        if !encoders.is_empty() {
            args.encoder_id_ptr = encoders.as_mut_ptr() as u64;
        }
        // SAFETY: the attached arrays are sized to the counts from the first
        // pass and outlive the call; the kernel fills at most that many.
        unsafe { execute(dev, DRM_IOCTL_MODE_GETRESOURCES(), &mut args)? };

        let grew = args.count_fbs > counts.0
            || args.count_crtcs > counts.1
            || args.count_connectors > counts.2
            || args.count_encoders > counts.3;
        if grew {
            // Topology grew between the passes; run the sequence again.
            continue;
        }
        fbs.truncate(args.count_fbs as usize);
        crtcs.truncate(args.count_crtcs as usize);
        connectors.truncate(args.count_connectors as usize);
        encoders.truncate(args.count_encoders as usize);
        return Ok((args, fbs, crtcs, connectors, encoders));
    }
}

fn query_crtc(dev: &dyn Control, index: usize, id: u32) -> Result<Crtc> {
    let mut args = drm_mode_crtc {
        crtc_id: id,
        ..Default::default()
    };
    // SAFETY: the argument matches the request layout.
    unsafe { execute(dev, DRM_IOCTL_MODE_GETCRTC(), &mut args)? };
    Ok(Crtc {
        index,
        id,
        mode: (args.mode_valid != 0).then(|| Mode::from_info(&args.mode)),
    })
}

fn query_encoder(dev: &dyn Control, id: u32) -> Result<drm_mode_get_encoder> {
    let mut args = drm_mode_get_encoder {
        encoder_id: id,
        ..Default::default()
    };
    // SAFETY: the argument matches the request layout.
    unsafe { execute(dev, DRM_IOCTL_MODE_GETENCODER(), &mut args)? };
    Ok(args)
}

fn query_connector(dev: &dyn Control, id: u32, encoders: &[Encoder]) -> Result<Connector> {
    loop {
        let mut args = drm_mode_get_connector {
            connector_id: id,
            ..Default::default()
        };
        // SAFETY: the argument matches the request layout; no arrays are
        // attached on the first pass.
        unsafe { execute(dev, DRM_IOCTL_MODE_GETCONNECTOR(), &mut args)? };

        let counts = (args.count_encoders, args.count_modes, args.count_props);
        let mut encoder_ids = vec![0u32; args.count_encoders as usize];
        let mut modes = vec![drm_mode_modeinfo::default(); args.count_modes as usize];
        let mut prop_ids = vec![0u32; args.count_props as usize];
        let mut prop_values = vec![0u64; args.count_props as usize];
        if !encoder_ids.is_empty() {
            args.encoders_ptr = encoder_ids.as_mut_ptr() as u64;
        }
        if !modes.is_empty() {
            args.modes_ptr = modes.as_mut_ptr() as u64;
        }
        if !prop_ids.is_empty() {
            args.props_ptr = prop_ids.as_mut_ptr() as u64;
            args.prop_values_ptr = prop_values.as_mut_ptr() as u64;
        }
        // SAFETY: the attached arrays are sized to the counts from the first
        // pass and outlive the call.
        unsafe { execute(dev, DRM_IOCTL_MODE_GETCONNECTOR(), &mut args)? };

        let grew = args.count_encoders > counts.0
            || args.count_modes > counts.1
            || args.count_props > counts.2;
        if grew {
            continue;
        }
        encoder_ids.truncate(args.count_encoders as usize);
        modes.truncate(args.count_modes as usize);
        prop_ids.truncate(args.count_props as usize);
        prop_values.truncate(args.count_props as usize);

        let candidates = encoder_ids
            .iter()
            .map(|&encoder_id| {
                encoders
                    .iter()
                    .position(|e| e.id == encoder_id)
                    .ok_or(Error::MissingEncoder(encoder_id))
            })
            .collect::<Result<Vec<usize>>>()?;
        let active = candidates
            .iter()
            .copied()
            .find(|&i| encoders[i].id == args.encoder_id);

        let mut properties = Vec::with_capacity(prop_ids.len());
        for (&prop_id, &value) in prop_ids.iter().zip(&prop_values) {
            properties.push(property::get_property(dev, prop_id, value)?);
        }

        let kind = ConnectorKind::n(args.connector_type).unwrap_or(ConnectorKind::Unknown);
        return Ok(Connector {
            id,
            kind,
            name: format!("{}-{}", kind.name(), args.connector_type_id),
            status: ConnectorStatus::n(args.connection).unwrap_or(ConnectorStatus::Unknown),
            mm_width: args.mm_width,
            mm_height: args.mm_height,
            modes: modes.iter().map(Mode::from_info).collect(),
            properties,
            encoders: candidates,
            encoder: active,
        });
    }
}

fn query_plane_resources(dev: &dyn Control) -> Result<Vec<u32>> {
    loop {
        let mut args = drm_mode_get_plane_res::default();
        // SAFETY: the argument matches the request layout; no array is
        // attached on the first pass.
        unsafe { execute(dev, DRM_IOCTL_MODE_GETPLANERESOURCES(), &mut args)? };

        let count = args.count_planes;
        let mut planes = vec![0u32; count as usize];
        if !planes.is_empty() {
            args.plane_id_ptr = planes.as_mut_ptr() as u64;
        }
        // SAFETY: the attached array is sized to the count from the first
        // pass and outlives the call.
        unsafe { execute(dev, DRM_IOCTL_MODE_GETPLANERESOURCES(), &mut args)? };

        if args.count_planes > count {
            continue;
        }
        planes.truncate(args.count_planes as usize);
        return Ok(planes);
    }
}

fn query_plane(dev: &dyn Control, index: usize, id: u32, crtcs: &[Crtc]) -> Result<Plane> {
    let (args, format_ids) = loop {
        let mut args = drm_mode_get_plane {
            plane_id: id,
            ..Default::default()
        };
        // SAFETY: the argument matches the request layout; no array is
        // attached on the first pass.
        unsafe { execute(dev, DRM_IOCTL_MODE_GETPLANE(), &mut args)? };

        let count = args.count_format_types;
        let mut formats = vec![0u32; count as usize];
        if !formats.is_empty() {
            args.format_type_ptr = formats.as_mut_ptr() as u64;
        }
        // SAFETY: the attached array is sized to the count from the first
        // pass and outlives the call.
        unsafe { execute(dev, DRM_IOCTL_MODE_GETPLANE(), &mut args)? };

        if args.count_format_types > count {
            continue;
        }
        formats.truncate(args.count_format_types as usize);
        break (args, formats);
    };

    let formats = format_ids
        .iter()
        .filter_map(|&fourcc| {
            let format = Format::from_fourcc(fourcc);
            if format.is_none() {
                log::warn!("plane {}: unknown format {:#010x}", id, fourcc);
            }
            format
        })
        .collect();

    let possible_crtcs = resolve_mask(args.possible_crtcs, crtcs.len());
    let crtc = possible_crtcs
        .iter()
        .copied()
        .find(|&i| crtcs[i].id == args.crtc_id);

    let properties = query_object_properties(dev, id, DRM_MODE_OBJECT_PLANE)?;

    Ok(Plane {
        index,
        id,
        framebuffer: (args.fb_id != 0).then_some(args.fb_id),
        formats,
        properties,
        crtc,
        possible_crtcs,
    })
}

/// Fetches and decodes the properties attached to one object.
pub fn query_object_properties(
    dev: &dyn Control,
    obj_id: u32,
    obj_type: u32,
) -> Result<Vec<Property>> {
    loop {
        let mut args = drm_mode_obj_get_properties {
            obj_id,
            obj_type,
            ..Default::default()
        };
        // SAFETY: the argument matches the request layout; no arrays are
        // attached on the first pass.
        unsafe { execute(dev, DRM_IOCTL_MODE_OBJ_GETPROPERTIES(), &mut args)? };

        let count = args.count_props;
        let mut prop_ids = vec![0u32; count as usize];
        let mut prop_values = vec![0u64; count as usize];
        if !prop_ids.is_empty() {
            args.props_ptr = prop_ids.as_mut_ptr() as u64;
            args.prop_values_ptr = prop_values.as_mut_ptr() as u64;
        }
        // SAFETY: the attached arrays are sized to the count from the first
        // pass and outlive the call.
        unsafe { execute(dev, DRM_IOCTL_MODE_OBJ_GETPROPERTIES(), &mut args)? };

        if args.count_props > count {
            continue;
        }
        prop_ids.truncate(args.count_props as usize);
        prop_values.truncate(args.count_props as usize);

        let mut properties = Vec::with_capacity(prop_ids.len());
        for (&prop_id, &value) in prop_ids.iter().zip(&prop_values) {
            properties.push(property::get_property(dev, prop_id, value)?);
        }
        return Ok(properties);
    }
}
