//! Deterministic software codec engine.
//!
//! Behaves like the real engine at the contract level: it negotiates a
//! format through `get_format` on the first frame and on parameter changes,
//! requests buffers through `get_buffer`, and reports drain/EOF statuses.
//! Used by the decode tests and as a reference for the engine contract.

use crate::engine::{
    CodecCallbacks, CodecContext, CodecEngine, CodecId, EngineVersion,
};
use crate::error::{CodecError, Result};
use std::collections::VecDeque;
use vidplay_core::frame::{Frame, FrameFlags};
use vidplay_core::packet::{Packet, PacketFlags};
use vidplay_core::pixel::PixelFormat;

/// Stream-level parameters the engine parses out of the bitstream.
#[derive(Debug, Clone)]
pub struct StreamParams {
    pub coded_width: i32,
    pub coded_height: i32,
    pub width: i32,
    pub height: i32,
    pub profile: i32,
    pub level: i32,
    pub sample_aspect_ratio: (i32, i32),
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            coded_width: 1920,
            coded_height: 1080,
            width: 1920,
            height: 1080,
            profile: 100,
            level: 40,
            sample_aspect_ratio: (1, 1),
        }
    }
}

struct PendingFrame {
    pts: i64,
    decode_error_flags: u32,
    flags: FrameFlags,
}

/// Scripted codec engine.
pub struct StubEngine {
    version: EngineVersion,
    candidates: Vec<PixelFormat>,
    params: StreamParams,
    pending: VecDeque<PendingFrame>,
    draining: bool,
    negotiated: PixelFormat,
    renegotiate: bool,
}

impl StubEngine {
    pub fn new(candidates: Vec<PixelFormat>, params: StreamParams) -> Self {
        Self {
            version: EngineVersion::new(58, 54, 100),
            candidates,
            params,
            pending: VecDeque::new(),
            draining: false,
            negotiated: PixelFormat::Invalid,
            renegotiate: false,
        }
    }

    pub fn with_version(mut self, version: EngineVersion) -> Self {
        self.version = version;
        self
    }

    /// Re-run format selection before the next frame, keeping the current
    /// stream parameters.
    pub fn renegotiate(&mut self) {
        self.renegotiate = true;
    }

    /// Switch mid-stream to new parameters; format selection re-runs.
    pub fn set_stream_params(&mut self, params: StreamParams) {
        self.params = params;
        self.renegotiate = true;
    }

    fn sync_context(&self, ctx: &mut CodecContext) {
        ctx.coded_width = self.params.coded_width;
        ctx.coded_height = self.params.coded_height;
        ctx.width = self.params.width;
        ctx.height = self.params.height;
        ctx.profile = self.params.profile;
        ctx.level = self.params.level;
        ctx.sample_aspect_ratio = self.params.sample_aspect_ratio;
    }
}

impl CodecEngine for StubEngine {
    fn version(&self) -> EngineVersion {
        self.version
    }

    fn find_decoder(&self, id: CodecId) -> bool {
        let _ = id;
        true
    }

    fn open(&mut self, ctx: &mut CodecContext, _cb: &mut dyn CodecCallbacks) -> Result<()> {
        self.sync_context(ctx);
        Ok(())
    }

    fn send_packet(
        &mut self,
        _ctx: &mut CodecContext,
        _cb: &mut dyn CodecCallbacks,
        packet: &Packet,
    ) -> Result<()> {
        if packet.is_empty() {
            self.draining = true;
            return Ok(());
        }
        if self.draining {
            return Err(CodecError::Transient("packet after drain".into()));
        }
        self.pending.push_back(PendingFrame {
            pts: packet.pts,
            decode_error_flags: if packet.flags.contains(PacketFlags::CORRUPT) {
                1
            } else {
                0
            },
            flags: FrameFlags::empty(),
        });
        Ok(())
    }

    fn receive_frame(
        &mut self,
        ctx: &mut CodecContext,
        cb: &mut dyn CodecCallbacks,
        frame: &mut Frame,
    ) -> Result<()> {
        if self.pending.is_empty() {
            return if self.draining {
                Err(CodecError::EndOfStream)
            } else {
                Err(CodecError::TryAgain)
            };
        }

        if !self.negotiated.is_valid() || self.renegotiate {
            self.sync_context(ctx);
            let chosen = cb.get_format(ctx, &self.candidates);
            if !chosen.is_valid() {
                return Err(CodecError::FormatNegotiationFailed(
                    "callback returned no format".into(),
                ));
            }
            self.negotiated = chosen;
            ctx.pix_fmt = chosen;
            self.renegotiate = false;
        }

        let pending = match self.pending.pop_front() {
            Some(p) => p,
            None => return Err(CodecError::TryAgain),
        };

        frame.clear_data();
        frame.format = self.negotiated;
        frame.width = self.params.coded_width;
        frame.height = self.params.coded_height;
        frame.pts = pending.pts;
        frame.flags = pending.flags;
        frame.decode_error_flags = pending.decode_error_flags;
        cb.get_buffer(ctx, frame)?;
        Ok(())
    }

    fn flush(&mut self, _ctx: &mut CodecContext) {
        self.pending.clear();
        self.draining = false;
    }

    fn close(&mut self, ctx: &mut CodecContext) {
        self.flush(ctx);
        self.negotiated = PixelFormat::Invalid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::default_get_buffer;

    struct PassthroughCallbacks;

    impl CodecCallbacks for PassthroughCallbacks {
        fn get_format(
            &mut self,
            _ctx: &mut CodecContext,
            candidates: &[PixelFormat],
        ) -> PixelFormat {
            crate::engine::default_get_format(candidates)
        }

        fn get_buffer(&mut self, _ctx: &CodecContext, frame: &mut Frame) -> Result<()> {
            default_get_buffer(frame)
        }
    }

    #[test]
    fn test_drain_sequence() {
        let mut engine = StubEngine::new(vec![PixelFormat::Yuv420P], StreamParams::default());
        let mut ctx = CodecContext::new(CodecId::H264);
        let mut cb = PassthroughCallbacks;
        let mut frame = Frame::new();

        assert!(engine
            .receive_frame(&mut ctx, &mut cb, &mut frame)
            .unwrap_err()
            .is_again());

        engine.send_packet(&mut ctx, &mut cb, &Packet::new(vec![0], 1)).unwrap();
        engine.receive_frame(&mut ctx, &mut cb, &mut frame).unwrap();
        assert_eq!(frame.pts, 1);
        assert_eq!(frame.format, PixelFormat::Yuv420P);

        engine.send_packet(&mut ctx, &mut cb, &Packet::empty()).unwrap();
        assert!(engine
            .receive_frame(&mut ctx, &mut cb, &mut frame)
            .unwrap_err()
            .is_eof());
    }

    #[test]
    fn test_corrupt_packet_flags_frame() {
        let mut engine = StubEngine::new(vec![PixelFormat::Yuv420P], StreamParams::default());
        let mut ctx = CodecContext::new(CodecId::H264);
        let mut cb = PassthroughCallbacks;
        let mut frame = Frame::new();

        let mut pkt = Packet::new(vec![0], 5);
        pkt.flags.insert(PacketFlags::CORRUPT);
        engine.send_packet(&mut ctx, &mut cb, &pkt).unwrap();
        engine.receive_frame(&mut ctx, &mut cb, &mut frame).unwrap();
        assert_ne!(frame.decode_error_flags, 0);
    }
}
