//! Decode lifecycle.
//!
//! [`SimpleDecoder`] drives the codec engine: it installs the format and
//! buffer callbacks, owns the optional video acceleration context, and
//! publishes the most recent good frame into a locked output slot that the
//! render actor reads.

use crate::accel::{self, AccelFactory, VideoAcceleration};
use crate::engine::{
    self, CodecCallbacks, CodecContext, CodecEngine, CodecId, CodecColorRange, CodecColorSpace,
    CodecChromaLocation, CodecPrimaries, CodecTransfer, EngineVersion, INPUT_BUFFER_PADDING,
};
use crate::error::{CodecError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use vidplay_core::chroma;
use vidplay_core::error::CoreError;
use vidplay_core::frame::Frame;
use vidplay_core::packet::Packet;
use vidplay_core::pixel::PixelFormat;
use vidplay_core::rational::Rational;
use vidplay_core::video_format::{
    ChromaLocation, ColorPrimaries, ColorSpace, TransferFunc, VideoFormatInfo,
};

/// Decoder configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderOptions {
    /// Enables the hardware acceleration path during format negotiation.
    pub use_hw: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self { use_hw: true }
    }
}

/// The parameters a previous negotiation is valid for. Kept bundled so the
/// reuse decision stays a pure comparison.
#[derive(Debug, Clone, Copy)]
struct ReuseState {
    pix_fmt: PixelFormat,
    profile: i32,
    level: i32,
    width: i32,
    height: i32,
}

impl Default for ReuseState {
    fn default() -> Self {
        Self {
            pix_fmt: PixelFormat::Invalid,
            profile: 0,
            level: 0,
            width: 0,
            height: 0,
        }
    }
}

/// Format negotiation state; the callback receiver the engine talks to.
struct Negotiator {
    reuse: ReuseState,
    va: Option<Box<dyn VideoAcceleration>>,
    use_hw: bool,
    engine_version: EngineVersion,
    accel_factory: AccelFactory,
    video_format: Option<Arc<VideoFormatInfo>>,
}

impl Negotiator {
    fn new(engine_version: EngineVersion, options: &DecoderOptions) -> Self {
        Self {
            reuse: ReuseState::default(),
            va: None,
            use_hw: options.use_hw,
            engine_version,
            accel_factory: accel::create_acceleration,
            video_format: None,
        }
    }

    fn close_va(&mut self) {
        if let Some(mut va) = self.va.take() {
            va.close();
        }
    }

    fn build_video_format(
        &mut self,
        ctx: &CodecContext,
        pix_fmt: PixelFormat,
        sw_pix_fmt: PixelFormat,
    ) -> Result<()> {
        let info = build_video_format_info(ctx, pix_fmt, sw_pix_fmt, self.va.as_deref())?;
        self.video_format = Some(Arc::new(info));
        Ok(())
    }

    fn select_software(&mut self, ctx: &CodecContext, sw_fmt: PixelFormat) -> PixelFormat {
        if let Err(err) = self.build_video_format(ctx, sw_fmt, sw_fmt) {
            warn!(error = %err, "software format info rejected");
        }
        self.reuse.pix_fmt = sw_fmt;
        sw_fmt
    }

    /// Threading inside the engine breaks the acceleration callbacks on a
    /// known-buggy release range.
    fn threaded_decode_restricted(&self, ctx: &CodecContext) -> bool {
        self.engine_version.micro >= 100
            && self.engine_version.int() < EngineVersion::new(57, 83, 101).int()
            && ctx.active_thread_type != 0
    }
}

impl CodecCallbacks for Negotiator {
    fn get_format(&mut self, ctx: &mut CodecContext, candidates: &[PixelFormat]) -> PixelFormat {
        let sw_fmt = engine::default_get_format(candidates);
        let can_hwaccel = candidates.iter().any(|f| f.is_hw_accelerated());

        // Reuse path: parameters unchanged and the old choice still offered.
        if self.reuse.pix_fmt.is_valid()
            && self.reuse.width == ctx.coded_width
            && self.reuse.height == ctx.coded_height
            && ctx.profile == self.reuse.profile
            && ctx.level <= self.reuse.level
            && candidates.contains(&self.reuse.pix_fmt)
            && self.build_video_format(ctx, self.reuse.pix_fmt, sw_fmt).is_ok()
        {
            return self.reuse.pix_fmt;
        }

        self.close_va();
        self.reuse.profile = ctx.profile;
        self.reuse.level = ctx.level;
        self.reuse.width = ctx.coded_width;
        self.reuse.height = ctx.coded_height;

        if !can_hwaccel {
            return self.select_software(ctx, sw_fmt);
        }

        if !self.use_hw {
            return self.select_software(ctx, sw_fmt);
        }

        if self.threaded_decode_restricted(ctx) {
            debug!(
                thread_type = ctx.active_thread_type,
                "threaded decode active, disabling hardware acceleration"
            );
            return self.select_software(ctx, sw_fmt);
        }

        for &hw_fmt in accel::hw_format_priority() {
            if !candidates.contains(&hw_fmt) {
                continue;
            }
            if hw_fmt == PixelFormat::Vdpau && !accel::vdpau_supported(self.engine_version) {
                continue;
            }
            // Unknown brand of hardware acceleration for this stream.
            if accel::chroma_for(hw_fmt, sw_fmt).is_none() {
                continue;
            }
            if ctx.width == 0 || ctx.height == 0 {
                continue;
            }
            let Some(mut va) = (self.accel_factory)(ctx, hw_fmt) else {
                continue;
            };
            if let Err(err) = va.open() {
                warn!(format = %hw_fmt, error = %err, "hardware open failed");
                continue;
            }
            self.va = Some(va);
            self.reuse.pix_fmt = hw_fmt;
            ctx.draw_horiz_band = false;
            if let Err(err) = self.build_video_format(ctx, hw_fmt, sw_fmt) {
                warn!(error = %err, "hardware format info rejected");
            }
            info!(format = %hw_fmt, "hardware decode enabled");
            return hw_fmt;
        }

        self.select_software(ctx, sw_fmt)
    }

    fn get_buffer(&mut self, _ctx: &CodecContext, frame: &mut Frame) -> Result<()> {
        frame.clear_data();
        match &mut self.va {
            None => engine::default_get_buffer(frame),
            Some(va) => va.get_frame(frame),
        }
    }
}

/// Derive the per-frame format descriptor from the codec context.
pub(crate) fn build_video_format_info(
    ctx: &CodecContext,
    pix_fmt: PixelFormat,
    sw_pix_fmt: PixelFormat,
    va: Option<&dyn VideoAcceleration>,
) -> Result<VideoFormatInfo> {
    let software = pix_fmt == sw_pix_fmt;

    let (chroma_tag, mut width, height, aligns) = if software {
        let (w, h, aligns) = engine::align_dimensions(sw_pix_fmt, ctx.coded_width, ctx.coded_height);
        let tag = chroma::chroma_from_pixel(pix_fmt).ok_or_else(|| {
            CodecError::FormatNegotiationFailed(format!("no chroma for {}", pix_fmt))
        })?;
        (tag, w, h, aligns)
    } else {
        let tag =
            accel::chroma_for(pix_fmt, sw_pix_fmt).ok_or(CodecError::HwAccelUnavailable)?;
        (tag, ctx.coded_width, ctx.coded_height, [0usize; 4])
    };

    if width <= 0
        || height <= 0
        || width > 8192
        || height > 8192
        || width < ctx.width
        || height < ctx.height
    {
        return Err(CoreError::InvalidDisplaySize { width, height }.into());
    }

    let desc = chroma::chroma_description(chroma_tag)
        .ok_or(CoreError::UnknownChroma(chroma_tag))?;

    let mut tw = ctx.coded_width;
    if software {
        // Grow the width until every plane's line size meets the engine's
        // alignment. Line sizes are filled jointly; aligning them one by one
        // would break pitch ratio assumptions between planes.
        loop {
            let linesize = engine::fill_linesizes(sw_pix_fmt, width);
            let unaligned = (0..4).any(|i| aligns[i] != 0 && linesize[i] % aligns[i] != 0);
            if !unaligned {
                tw = (linesize[0] / desc.pixel_size.max(1) as usize) as i32;
                break;
            }
            width += width & width.wrapping_neg();
        }
    }

    let width_aligned = tw as u32;
    let height_aligned = ctx.coded_height as u32;

    let mut info = VideoFormatInfo::new(chroma_tag);
    info.width = width_aligned;
    info.height = height_aligned;
    info.visible_width = ctx.width as u32;
    info.visible_height = ctx.height as u32;

    let (sar_num, sar_den) = ctx.sample_aspect_ratio;
    info.sar = if sar_num == 0 || sar_den == 0 {
        Rational::one()
    } else {
        Rational::new(sar_num as i64, sar_den as i64)
    };

    for i in 0..desc.plane_count as usize {
        let (rw, rh) = desc.p[i];
        let plane = &mut info.planes[i];
        plane.lines = height_aligned * rh.num / rh.den;
        plane.visible_lines = (info.visible_height + rh.den - 1) / rh.den * rh.num;
        plane.pitch = width_aligned * rw.num / rw.den * desc.pixel_size as u32;
        plane.visible_pitch =
            (info.visible_width + rw.den - 1) / rw.den * rw.num * desc.pixel_size as u32;
        plane.pixel_pitch = desc.pixel_size as u32;
        debug_assert_eq!(plane.pitch % 16, 0);
    }
    info.plane_count = desc.plane_count as usize;

    info.color_range_full = match ctx.color_range {
        CodecColorRange::Jpeg => true,
        CodecColorRange::Unspecified => !chroma::is_yuv(chroma_tag),
        CodecColorRange::Mpeg => false,
    };

    info.space = match ctx.colorspace {
        CodecColorSpace::Bt709 => ColorSpace::Bt709,
        CodecColorSpace::Smpte170m | CodecColorSpace::Bt470bg => ColorSpace::Bt601,
        CodecColorSpace::Bt2020Ncl | CodecColorSpace::Bt2020Cl => ColorSpace::Bt2020,
        CodecColorSpace::Unspecified => ColorSpace::Unspecified,
    };

    info.transfer = match ctx.color_trc {
        CodecTransfer::Linear => TransferFunc::Linear,
        CodecTransfer::Gamma22 => TransferFunc::Srgb,
        CodecTransfer::Bt709 => TransferFunc::Bt709,
        CodecTransfer::Smpte170m | CodecTransfer::Bt2020_10 | CodecTransfer::Bt2020_12 => {
            TransferFunc::Bt2020
        }
        CodecTransfer::AribStdB67 => TransferFunc::AribB67,
        CodecTransfer::Smpte2084 => TransferFunc::SmpteSt2084,
        CodecTransfer::Smpte240m => TransferFunc::Smpte240,
        CodecTransfer::Gamma28 => TransferFunc::Bt470Bg,
        CodecTransfer::Unspecified => TransferFunc::Unspecified,
    };

    info.primaries = match ctx.color_primaries {
        CodecPrimaries::Bt709 => ColorPrimaries::Bt709,
        CodecPrimaries::Bt470bg => ColorPrimaries::Bt601_625,
        CodecPrimaries::Smpte170m | CodecPrimaries::Smpte240m => ColorPrimaries::Bt601_525,
        CodecPrimaries::Bt2020 => ColorPrimaries::Bt2020,
        CodecPrimaries::Unspecified => ColorPrimaries::Unspecified,
    };

    info.chroma_location = match ctx.chroma_sample_location {
        CodecChromaLocation::Left => ChromaLocation::Left,
        CodecChromaLocation::Center => ChromaLocation::Center,
        CodecChromaLocation::TopLeft => ChromaLocation::TopLeft,
        CodecChromaLocation::Unspecified => ChromaLocation::Unspecified,
    };

    if let Some(va) = va {
        info.hw_surface = va.extra_info_for_render();
    }

    Ok(info)
}

/// Shared handle to the decoder's output slot, for the render actor.
#[derive(Clone)]
pub struct RenderSlot {
    output: Arc<Mutex<Option<Frame>>>,
}

impl RenderSlot {
    /// Run the callback with the current output frame under the lock.
    ///
    /// The callback must not block: the decode actor is held off while it
    /// runs.
    pub fn render<F>(&self, cb: F, fbo: u32)
    where
        F: FnOnce(Option<&Frame>, u32),
    {
        let guard = self.output.lock();
        cb(guard.as_ref(), fbo);
    }
}

/// Drives one codec engine instance and publishes decoded frames.
pub struct SimpleDecoder<E: CodecEngine> {
    engine: E,
    ctx: Option<CodecContext>,
    nego: Negotiator,
    decoded: Frame,
    output: Arc<Mutex<Option<Frame>>>,
}

impl<E: CodecEngine> SimpleDecoder<E> {
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, DecoderOptions::default())
    }

    pub fn with_options(engine: E, options: DecoderOptions) -> Self {
        let version = engine.version();
        Self {
            engine,
            ctx: None,
            nego: Negotiator::new(version, &options),
            decoded: Frame::new(),
            output: Arc::new(Mutex::new(None)),
        }
    }

    /// Swap the backend factory consulted during hardware negotiation.
    pub fn set_accel_factory(&mut self, factory: AccelFactory) {
        self.nego.accel_factory = factory;
    }

    pub fn enable_hw_decoder(&mut self, enable: bool) {
        self.nego.use_hw = enable;
    }

    /// Resolve the decoder, set up the context and install the callbacks.
    pub fn open(&mut self, codec_id: CodecId, extradata: &[u8]) -> Result<()> {
        if !self.engine.find_decoder(codec_id) {
            return Err(CodecError::DecoderInitFailed(format!(
                "no decoder for {}",
                codec_id
            )));
        }
        let mut ctx = CodecContext::new(codec_id);
        // Engine threading is incompatible with the acceleration callbacks
        // on affected releases; decode single threaded.
        ctx.thread_count = 1;
        ctx.thread_safe_callbacks = true;
        ctx.thread_type = 0;
        ctx.refcounted_frames = true;
        let mut extra = Vec::with_capacity(extradata.len() + INPUT_BUFFER_PADDING);
        extra.extend_from_slice(extradata);
        extra.resize(extradata.len() + INPUT_BUFFER_PADDING, 0);
        ctx.extradata = extra;

        self.engine
            .open(&mut ctx, &mut self.nego)
            .map_err(|err| CodecError::DecoderInitFailed(err.to_string()))?;
        ctx.opened = true;
        self.ctx = Some(ctx);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.ctx.is_some()
    }

    pub fn close(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            self.engine.close(&mut ctx);
        }
        self.decoded.reset();
        *self.output.lock() = None;
        self.nego.close_va();
    }

    /// Forward a packet to the engine. The packet is consumed regardless of
    /// the engine's verdict.
    pub fn send_packet(&mut self, packet: Packet) -> Result<()> {
        let ctx = self
            .ctx
            .as_mut()
            .ok_or_else(|| CodecError::DecoderInitFailed("decoder not open".into()))?;
        let status = self.engine.send_packet(ctx, &mut self.nego, &packet);
        drop(packet);
        status
    }

    /// Pull the next decoded frame and publish it to the output slot.
    ///
    /// Frames carrying error or special flags are dropped without
    /// publication. EOF clears the slot and flushes the engine.
    pub fn receive(&mut self) -> Result<()> {
        let ctx = self
            .ctx
            .as_mut()
            .ok_or_else(|| CodecError::DecoderInitFailed("decoder not open".into()))?;
        match self
            .engine
            .receive_frame(ctx, &mut self.nego, &mut self.decoded)
        {
            Err(err) if err.is_eof() => {
                *self.output.lock() = None;
                self.engine.flush(ctx);
                Err(err)
            }
            Err(err) => Err(err),
            Ok(()) => {
                if self.decoded.decode_error_flags != 0 || !self.decoded.flags.is_empty() {
                    debug!(
                        pts = self.decoded.pts,
                        error_flags = self.decoded.decode_error_flags,
                        "dropping flagged frame"
                    );
                    return Ok(());
                }
                let mut published = self.decoded.clone();
                published.opaque = self.nego.video_format.clone();
                *self.output.lock() = Some(published);
                Ok(())
            }
        }
    }

    /// Run the render callback with the output frame under the lock.
    pub fn render<F>(&self, cb: F, fbo: u32)
    where
        F: FnOnce(Option<&Frame>, u32),
    {
        let guard = self.output.lock();
        cb(guard.as_ref(), fbo);
    }

    /// Handle the render actor can hold without borrowing the decoder.
    pub fn render_slot(&self) -> RenderSlot {
        RenderSlot {
            output: self.output.clone(),
        }
    }

    /// Format descriptor of the current negotiation, if one succeeded.
    pub fn video_format(&self) -> Option<Arc<VideoFormatInfo>> {
        self.nego.video_format.clone()
    }

    pub fn negotiated_format(&self) -> PixelFormat {
        self.nego.reuse.pix_fmt
    }

    pub fn has_acceleration(&self) -> bool {
        self.nego.va.is_some()
    }

    /// Mutable access to the engine, for engines that expose stream control.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: CodecEngine> Drop for SimpleDecoder<E> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{StreamParams, StubEngine};
    use crate::vaapi::VaapiAcceleration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn sw_candidates() -> Vec<PixelFormat> {
        vec![PixelFormat::Yuv420P]
    }

    fn hw_candidates() -> Vec<PixelFormat> {
        vec![PixelFormat::Vaapi, PixelFormat::Yuv420P]
    }

    fn open_decoder(
        candidates: Vec<PixelFormat>,
        params: StreamParams,
    ) -> SimpleDecoder<StubEngine> {
        let mut decoder = SimpleDecoder::new(StubEngine::new(candidates, params));
        decoder.open(CodecId::H264, &[0x42, 0x00, 0x1f]).unwrap();
        decoder
    }

    fn decode_one(decoder: &mut SimpleDecoder<StubEngine>, pts: i64) {
        decoder.send_packet(Packet::new(vec![0u8; 128], pts)).unwrap();
        decoder.receive().unwrap();
    }

    #[test]
    fn test_software_decode_publishes_frame() {
        let mut decoder = open_decoder(sw_candidates(), StreamParams::default());
        decode_one(&mut decoder, 1);
        assert_eq!(decoder.negotiated_format(), PixelFormat::Yuv420P);
        assert!(!decoder.has_acceleration());
        decoder.render(
            |frame, fbo| {
                let frame = frame.expect("frame published");
                assert_eq!(frame.pts, 1);
                assert!(frame.opaque.is_some());
                assert_eq!(fbo, 3);
            },
            3,
        );
    }

    #[test]
    fn test_eof_clears_output_and_flushes() {
        let mut decoder = open_decoder(sw_candidates(), StreamParams::default());
        decode_one(&mut decoder, 1);
        decoder.send_packet(Packet::empty()).unwrap();
        assert!(decoder.receive().unwrap_err().is_eof());
        decoder.render(|frame, _| assert!(frame.is_none()), 0);
    }

    #[test]
    fn test_flagged_frames_are_dropped() {
        use vidplay_core::packet::PacketFlags;
        let mut decoder = open_decoder(sw_candidates(), StreamParams::default());
        let mut pkt = Packet::new(vec![0u8; 16], 9);
        pkt.flags.insert(PacketFlags::CORRUPT);
        decoder.send_packet(pkt).unwrap();
        decoder.receive().unwrap();
        decoder.render(|frame, _| assert!(frame.is_none()), 0);
    }

    #[test]
    fn test_send_packet_requires_open() {
        let mut decoder = SimpleDecoder::new(StubEngine::new(
            sw_candidates(),
            StreamParams::default(),
        ));
        assert!(matches!(
            decoder.send_packet(Packet::new(vec![0], 0)),
            Err(CodecError::DecoderInitFailed(_))
        ));
    }

    // scenario: HW negotiation success, then reuse without a new context

    static ACCEPT_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn accepting_factory(
        ctx: &CodecContext,
        hw: PixelFormat,
    ) -> Option<Box<dyn VideoAcceleration>> {
        assert_eq!(hw, PixelFormat::Vaapi);
        ACCEPT_CALLS.fetch_add(1, Ordering::SeqCst);
        VaapiAcceleration::create(ctx)
    }

    #[test]
    fn test_hw_negotiation_and_reuse() {
        ACCEPT_CALLS.store(0, Ordering::SeqCst);
        let mut decoder = open_decoder(hw_candidates(), StreamParams::default());
        decoder.set_accel_factory(accepting_factory);

        decode_one(&mut decoder, 1);
        assert_eq!(decoder.negotiated_format(), PixelFormat::Vaapi);
        assert!(decoder.has_acceleration());
        assert_eq!(ACCEPT_CALLS.load(Ordering::SeqCst), 1);
        let info = decoder.video_format().unwrap();
        assert!(info.is_hw());

        // the callback fires again with identical parameters: reuse path
        decoder.engine_mut().renegotiate();
        decode_one(&mut decoder, 2);
        assert_eq!(decoder.negotiated_format(), PixelFormat::Vaapi);
        assert_eq!(ACCEPT_CALLS.load(Ordering::SeqCst), 1, "no new context");
    }

    #[test]
    fn test_hw_reuse_rejected_on_level_increase() {
        ACCEPT_CALLS.store(0, Ordering::SeqCst);
        let params = StreamParams::default();
        let mut decoder = open_decoder(hw_candidates(), params.clone());
        decoder.set_accel_factory(accepting_factory);
        decode_one(&mut decoder, 1);
        assert_eq!(ACCEPT_CALLS.load(Ordering::SeqCst), 1);

        // a level increase invalidates the reuse path, a decrease does not
        let mut higher = params.clone();
        higher.level = params.level + 10;
        decoder.engine_mut().set_stream_params(higher);
        decode_one(&mut decoder, 2);
        assert_eq!(ACCEPT_CALLS.load(Ordering::SeqCst), 2);

        let mut lower = params;
        lower.level -= 10;
        decoder.engine_mut().set_stream_params(lower);
        decode_one(&mut decoder, 3);
        assert_eq!(ACCEPT_CALLS.load(Ordering::SeqCst), 2, "reuse on lower level");
    }

    // scenario: every HW candidate refuses, fall back to software

    fn refusing_factory(
        _ctx: &CodecContext,
        _hw: PixelFormat,
    ) -> Option<Box<dyn VideoAcceleration>> {
        None
    }

    #[test]
    fn test_hw_rejected_falls_back_to_software() {
        let mut decoder = open_decoder(hw_candidates(), StreamParams::default());
        decoder.set_accel_factory(refusing_factory);
        decode_one(&mut decoder, 1);
        assert_eq!(decoder.negotiated_format(), PixelFormat::Yuv420P);
        assert!(!decoder.has_acceleration(), "no context leaks");
    }

    #[test]
    fn test_hw_disabled_by_option() {
        let mut decoder = open_decoder(hw_candidates(), StreamParams::default());
        decoder.set_accel_factory(accepting_factory);
        decoder.enable_hw_decoder(false);
        decode_one(&mut decoder, 1);
        assert_eq!(decoder.negotiated_format(), PixelFormat::Yuv420P);
        assert!(!decoder.has_acceleration());
    }

    // scenario: dimension violation falls back to the software path

    #[test]
    fn test_invalid_display_size() {
        let params = StreamParams {
            coded_width: 0,
            coded_height: 0,
            width: 0,
            height: 0,
            ..StreamParams::default()
        };
        let mut ctx = CodecContext::new(CodecId::H264);
        ctx.coded_width = params.coded_width;
        ctx.coded_height = params.coded_height;
        let err = build_video_format_info(&ctx, PixelFormat::Yuv420P, PixelFormat::Yuv420P, None)
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Core(CoreError::InvalidDisplaySize { .. })
        ));

        let mut decoder = open_decoder(hw_candidates(), params);
        decoder.set_accel_factory(accepting_factory);
        decode_one(&mut decoder, 1);
        // zero visible dims skip every hardware candidate
        assert_eq!(decoder.negotiated_format(), PixelFormat::Yuv420P);
        assert!(!decoder.has_acceleration());
    }

    // scenario: NV12 software decode, 1920x1080, SAR 1/1

    #[test]
    fn test_nv12_format_info() {
        let mut ctx = CodecContext::new(CodecId::H264);
        ctx.coded_width = 1920;
        ctx.coded_height = 1080;
        ctx.width = 1920;
        ctx.height = 1080;
        ctx.sample_aspect_ratio = (0, 0);
        let info =
            build_video_format_info(&ctx, PixelFormat::Nv12, PixelFormat::Nv12, None).unwrap();
        assert_eq!(info.chroma, chroma::CHROMA_NV12);
        assert_eq!(info.plane_count, 2);
        assert_eq!(info.sar, Rational::one());
        assert_eq!(info.planes[0].pitch, 1920);
        assert_eq!(info.planes[0].lines, 1080);
        assert_eq!(info.planes[1].pitch, 1920);
        assert_eq!(info.planes[1].lines, 540);
        for i in 0..info.plane_count {
            assert_eq!(info.planes[i].pitch % 16, 0);
            assert!(info.planes[i].visible_pitch <= info.planes[i].pitch);
        }
    }

    #[test]
    fn test_format_info_color_mapping() {
        let mut ctx = CodecContext::new(CodecId::H264);
        ctx.coded_width = 1280;
        ctx.coded_height = 720;
        ctx.width = 1280;
        ctx.height = 720;
        ctx.color_range = CodecColorRange::Unspecified;
        ctx.colorspace = CodecColorSpace::Bt709;
        ctx.color_trc = CodecTransfer::Bt709;
        ctx.color_primaries = CodecPrimaries::Bt709;
        ctx.chroma_sample_location = CodecChromaLocation::Left;
        let info =
            build_video_format_info(&ctx, PixelFormat::Yuv420P, PixelFormat::Yuv420P, None)
                .unwrap();
        // unspecified range defaults to limited for YUV chromas
        assert!(!info.color_range_full);
        assert_eq!(info.space, ColorSpace::Bt709);
        assert_eq!(info.transfer, TransferFunc::Bt709);
        assert_eq!(info.primaries, ColorPrimaries::Bt709);
        assert_eq!(info.chroma_location, ChromaLocation::Left);

        ctx.color_range = CodecColorRange::Unspecified;
        let info = build_video_format_info(&ctx, PixelFormat::Rgb24, PixelFormat::Rgb24, None)
            .unwrap();
        assert!(info.color_range_full, "non-YUV defaults to full range");
    }

    #[test]
    fn test_format_info_aligns_odd_width() {
        let mut ctx = CodecContext::new(CodecId::H264);
        ctx.coded_width = 1917;
        ctx.coded_height = 1080;
        ctx.width = 1917;
        ctx.height = 1080;
        let info =
            build_video_format_info(&ctx, PixelFormat::Yuv420P, PixelFormat::Yuv420P, None)
                .unwrap();
        assert!(info.width >= 1917);
        assert_eq!(info.planes[0].pitch % 16, 0);
        assert_eq!(info.planes[1].pitch % 16, 0);
        assert!(info.planes[0].visible_pitch <= info.planes[0].pitch);
        assert!((info.valid_width_ratio() - 1917.0 / info.width as f64).abs() < 1e-9);
    }

    // scenario: render under decoder pressure

    #[test]
    fn test_concurrent_receive_and_render() {
        let mut decoder = open_decoder(sw_candidates(), StreamParams::default());
        let slot = decoder.render_slot();

        let render = thread::spawn(move || {
            let mut seen = 0u32;
            for _ in 0..100 {
                slot.render(
                    |frame, _| {
                        if let Some(frame) = frame {
                            // published frames always carry the descriptor
                            let info = frame.opaque.as_ref().expect("format info stamped");
                            assert_eq!(info.visible_width, 1920);
                            assert!(frame.has_data());
                            assert!(frame.pts >= 1);
                            seen += 1;
                        }
                    },
                    0,
                );
                thread::yield_now();
            }
            seen
        });

        for pts in 1..=100 {
            decode_one(&mut decoder, pts);
        }
        render.join().unwrap();
    }
}
