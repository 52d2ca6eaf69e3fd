//! Per-frame video format descriptor.
//!
//! A [`VideoFormatInfo`] is built by the decoder during format negotiation
//! and attached read-only to every decoded frame it publishes. It carries the
//! aligned plane geometry, the visible region, the sample aspect ratio, and
//! the color metadata the render stage needs.

use crate::chroma::FourCc;
use crate::rational::Rational;

/// Maximum number of planes a video frame can have.
pub const MAX_PLANES: usize = 4;

/// Color space of the YUV data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    #[default]
    Unspecified,
    Bt601,
    Bt709,
    Bt2020,
}

/// Transfer function of the coded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferFunc {
    #[default]
    Unspecified,
    Linear,
    Srgb,
    Bt709,
    Bt2020,
    /// Hybrid log-gamma (ARIB STD-B67).
    AribB67,
    /// Perceptual quantizer (SMPTE ST 2084).
    SmpteSt2084,
    Smpte240,
    Bt470Bg,
}

/// Color primaries of the coded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorPrimaries {
    #[default]
    Unspecified,
    Bt709,
    Bt601_525,
    Bt601_625,
    Bt2020,
}

/// Chroma sample position relative to the luma samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChromaLocation {
    #[default]
    Unspecified,
    Left,
    Center,
    TopLeft,
}

/// Geometry of one plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanePitch {
    /// Bytes per line in the aligned buffer. Always a multiple of 16.
    pub pitch: u32,
    /// Bytes per line covered by visible pixels.
    pub visible_pitch: u32,
    /// Line count of the aligned buffer.
    pub lines: u32,
    /// Line count covered by visible pixels.
    pub visible_lines: u32,
    /// Bytes per sample.
    pub pixel_pitch: u32,
}

/// Handle to a hardware decode surface shared with the render stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwSurfaceInfo {
    /// Chroma family of the surface.
    pub chroma: FourCc,
    /// Backend surface handle.
    pub handle: u64,
}

/// Layout and color description of decoded frames.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFormatInfo {
    pub chroma: FourCc,
    /// Aligned width in pixels.
    pub width: u32,
    /// Aligned height in pixels.
    pub height: u32,
    pub visible_width: u32,
    pub visible_height: u32,
    pub plane_count: usize,
    pub planes: [PlanePitch; MAX_PLANES],
    /// Sample aspect ratio, 1/1 when the stream carried none.
    pub sar: Rational,
    pub color_range_full: bool,
    pub space: ColorSpace,
    pub transfer: TransferFunc,
    pub primaries: ColorPrimaries,
    pub chroma_location: ChromaLocation,
    /// Present when a hardware surface backs the frame.
    pub hw_surface: Option<HwSurfaceInfo>,
}

impl VideoFormatInfo {
    pub fn new(chroma: FourCc) -> Self {
        Self {
            chroma,
            width: 0,
            height: 0,
            visible_width: 0,
            visible_height: 0,
            plane_count: 0,
            planes: [PlanePitch::default(); MAX_PLANES],
            sar: Rational::one(),
            color_range_full: false,
            space: ColorSpace::default(),
            transfer: TransferFunc::default(),
            primaries: ColorPrimaries::default(),
            chroma_location: ChromaLocation::default(),
            hw_surface: None,
        }
    }

    pub fn plane(&self, index: usize) -> Option<&PlanePitch> {
        self.planes.get(index).filter(|_| index < self.plane_count)
    }

    pub fn is_hw(&self) -> bool {
        self.hw_surface.is_some()
    }

    /// Ratio of visible to aligned luma pitch, in (0, 1]. 1.0 for hardware
    /// surfaces and degenerate descriptors.
    pub fn valid_width_ratio(&self) -> f64 {
        match self.plane(0) {
            Some(p) if p.pitch > 0 && !self.is_hw() => {
                p.visible_pitch as f64 / p.pitch as f64
            }
            _ => 1.0,
        }
    }
}
