//! Codec engine contract.
//!
//! The codec library is an external collaborator. This module defines the
//! types the core exchanges with it: the decoding context, the callbacks the
//! engine invokes during decoding, and the pure layout helpers that mirror
//! the engine's default behaviors.
//!
//! The engine's C ABI would force an opaque `void*` back-pointer for
//! callbacks; here the callback receiver is passed explicitly as
//! `&mut dyn CodecCallbacks` on every engine call instead.

use crate::error::{CodecError, Result};
use std::fmt;
use std::sync::Arc;
use vidplay_core::frame::{Frame, PlaneBuffer};
use vidplay_core::packet::Packet;
use vidplay_core::pixel::PixelFormat;

/// Bytes of zeroed padding the engine requires after input buffers.
pub const INPUT_BUFFER_PADDING: usize = 64;

/// Line size alignment the layout helpers produce.
pub const STRIDE_ALIGN: usize = 32;

/// Codec engine library version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl EngineVersion {
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }

    /// Packed integer form used for range comparisons.
    pub const fn int(&self) -> u32 {
        (self.major << 16) | (self.minor << 8) | self.micro
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// Video codec identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecId {
    H264,
    Hevc,
    Vp8,
    Vp9,
    Av1,
    Mpeg2,
    Mjpeg,
}

impl CodecId {
    pub fn name(&self) -> &'static str {
        match self {
            CodecId::H264 => "h264",
            CodecId::Hevc => "hevc",
            CodecId::Vp8 => "vp8",
            CodecId::Vp9 => "vp9",
            CodecId::Av1 => "av1",
            CodecId::Mpeg2 => "mpeg2video",
            CodecId::Mjpeg => "mjpeg",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Color range as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecColorRange {
    #[default]
    Unspecified,
    /// Limited / TV range.
    Mpeg,
    /// Full / PC range.
    Jpeg,
}

/// Color space as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecColorSpace {
    #[default]
    Unspecified,
    Bt709,
    Smpte170m,
    Bt470bg,
    Bt2020Ncl,
    Bt2020Cl,
}

/// Transfer characteristic as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecTransfer {
    #[default]
    Unspecified,
    Linear,
    Gamma22,
    Gamma28,
    Bt709,
    Smpte170m,
    Smpte240m,
    Bt2020_10,
    Bt2020_12,
    AribStdB67,
    Smpte2084,
}

/// Color primaries as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecPrimaries {
    #[default]
    Unspecified,
    Bt709,
    Bt470bg,
    Smpte170m,
    Smpte240m,
    Bt2020,
}

/// Chroma sample location as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecChromaLocation {
    #[default]
    Unspecified,
    Left,
    Center,
    TopLeft,
}

/// Decoding context shared between the core and the engine.
#[derive(Debug, Clone)]
pub struct CodecContext {
    pub codec_id: CodecId,
    /// Full coded dimensions, including cropping the container hides.
    pub coded_width: i32,
    pub coded_height: i32,
    /// Visible dimensions.
    pub width: i32,
    pub height: i32,
    pub profile: i32,
    pub level: i32,
    /// Format negotiated through the `get_format` callback.
    pub pix_fmt: PixelFormat,
    pub sample_aspect_ratio: (i32, i32),
    pub color_range: CodecColorRange,
    pub colorspace: CodecColorSpace,
    pub color_trc: CodecTransfer,
    pub color_primaries: CodecPrimaries,
    pub chroma_sample_location: CodecChromaLocation,
    pub thread_count: i32,
    pub thread_type: i32,
    /// Threading mode the engine actually activated.
    pub active_thread_type: i32,
    pub thread_safe_callbacks: bool,
    pub refcounted_frames: bool,
    pub extradata: Vec<u8>,
    /// Engine-side horizontal band drawing callback; cleared for HW decode.
    pub draw_horiz_band: bool,
    pub opened: bool,
}

impl CodecContext {
    pub fn new(codec_id: CodecId) -> Self {
        Self {
            codec_id,
            coded_width: 0,
            coded_height: 0,
            width: 0,
            height: 0,
            profile: 0,
            level: 0,
            pix_fmt: PixelFormat::Invalid,
            sample_aspect_ratio: (0, 1),
            color_range: CodecColorRange::default(),
            colorspace: CodecColorSpace::default(),
            color_trc: CodecTransfer::default(),
            color_primaries: CodecPrimaries::default(),
            chroma_sample_location: CodecChromaLocation::default(),
            thread_count: 0,
            thread_type: 0,
            active_thread_type: 0,
            thread_safe_callbacks: false,
            refcounted_frames: false,
            extradata: Vec::new(),
            draw_horiz_band: true,
            opened: false,
        }
    }
}

/// Callbacks the engine invokes back into the decoder while decoding.
pub trait CodecCallbacks {
    /// Pick the output pixel format from the engine's candidate list.
    fn get_format(&mut self, ctx: &mut CodecContext, candidates: &[PixelFormat]) -> PixelFormat;

    /// Populate the frame's buffers before the engine writes into them.
    fn get_buffer(&mut self, ctx: &CodecContext, frame: &mut Frame) -> Result<()>;
}

/// The opaque codec engine.
pub trait CodecEngine: Send {
    fn version(&self) -> EngineVersion;

    /// Whether a decoder exists for the codec.
    fn find_decoder(&self, id: CodecId) -> bool;

    fn open(&mut self, ctx: &mut CodecContext, cb: &mut dyn CodecCallbacks) -> Result<()>;

    fn send_packet(
        &mut self,
        ctx: &mut CodecContext,
        cb: &mut dyn CodecCallbacks,
        packet: &Packet,
    ) -> Result<()>;

    /// Fetch the next decoded frame. Returns [`CodecError::TryAgain`] when
    /// more input is needed and [`CodecError::EndOfStream`] when drained.
    fn receive_frame(
        &mut self,
        ctx: &mut CodecContext,
        cb: &mut dyn CodecCallbacks,
        frame: &mut Frame,
    ) -> Result<()>;

    /// Drop all buffered frames.
    fn flush(&mut self, ctx: &mut CodecContext);

    fn close(&mut self, ctx: &mut CodecContext);
}

/// The engine-default format choice: the first software candidate.
pub fn default_get_format(candidates: &[PixelFormat]) -> PixelFormat {
    candidates
        .iter()
        .copied()
        .find(|f| f.is_valid() && !f.is_hw_accelerated())
        .unwrap_or(PixelFormat::Invalid)
}

/// The engine's dimension alignment rules: luma lines padded so every plane
/// line meets [`STRIDE_ALIGN`], heights padded for macroblock overread.
pub fn align_dimensions(format: PixelFormat, width: i32, height: i32) -> (i32, i32, [usize; 4]) {
    let _ = format;
    let w = (width + 63) & !63;
    let h = (height + 31) & !31;
    (w, h, [STRIDE_ALIGN; 4])
}

/// Line sizes of every plane for the given luma width.
pub fn fill_linesizes(format: PixelFormat, width: i32) -> [usize; 4] {
    let mut linesize = [0usize; 4];
    for (plane, ls) in linesize.iter_mut().enumerate() {
        *ls = format.bytes_per_line(width, plane as i32).max(0) as usize;
    }
    linesize
}

/// The engine-default buffer allocation: aligned, zeroed plane buffers
/// matching the frame's format and dimensions.
pub fn default_get_buffer(frame: &mut Frame) -> Result<()> {
    let format = frame.format;
    if !format.is_valid() || format.is_hw_accelerated() {
        return Err(CodecError::Transient(format!(
            "cannot allocate buffers for {}",
            format
        )));
    }
    let (w, h, _) = align_dimensions(format, frame.width, frame.height);
    let linesize = fill_linesizes(format, w);
    for plane in 0..format.plane_count().max(0) as usize {
        let lines = format.plane_height(h, plane as i32).max(1) as usize;
        frame.set_plane(
            plane,
            Arc::new(PlaneBuffer::new(linesize[plane] * lines)),
            linesize[plane],
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_int_ordering() {
        assert!(EngineVersion::new(57, 83, 101).int() > EngineVersion::new(57, 83, 100).int());
        assert!(EngineVersion::new(58, 0, 0).int() > EngineVersion::new(57, 107, 100).int());
    }

    #[test]
    fn test_default_get_format_skips_hw() {
        let candidates = [
            PixelFormat::Vaapi,
            PixelFormat::Yuv420P,
            PixelFormat::Yuv420P10Le,
        ];
        assert_eq!(default_get_format(&candidates), PixelFormat::Yuv420P);
        assert_eq!(
            default_get_format(&[PixelFormat::Vaapi]),
            PixelFormat::Invalid
        );
        assert_eq!(default_get_format(&[]), PixelFormat::Invalid);
    }

    #[test]
    fn test_align_dimensions() {
        let (w, h, aligns) = align_dimensions(PixelFormat::Yuv420P, 1920, 1080);
        assert_eq!(w, 1920);
        assert_eq!(h, 1088);
        assert_eq!(aligns, [STRIDE_ALIGN; 4]);
        let (w, _, _) = align_dimensions(PixelFormat::Yuv420P, 1917, 1080);
        assert_eq!(w, 1920);
    }

    #[test]
    fn test_fill_linesizes() {
        let ls = fill_linesizes(PixelFormat::Nv12, 1920);
        assert_eq!(ls, [1920, 1920, 0, 0]);
        let ls = fill_linesizes(PixelFormat::Yuv420P10Le, 1920);
        assert_eq!(ls, [3840, 1920, 1920, 0]);
    }

    #[test]
    fn test_default_get_buffer() {
        let mut frame = Frame::new();
        frame.format = PixelFormat::Yuv420P;
        frame.width = 1920;
        frame.height = 1080;
        default_get_buffer(&mut frame).unwrap();
        assert_eq!(frame.plane_count(), 3);
        assert_eq!(frame.linesize(0), 1920);
        assert_eq!(frame.linesize(1), 960);
        // aligned height covers 1088 lines
        assert_eq!(frame.plane(0).unwrap().len(), 1920 * 1088);

        let mut hw = Frame::new();
        hw.format = PixelFormat::Vaapi;
        assert!(default_get_buffer(&mut hw).is_err());
    }
}
