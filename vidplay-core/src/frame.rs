//! Decoded frame buffers.
//!
//! A [`Frame`] is a set of reference-counted plane buffers plus metadata.
//! Cloning a frame is cheap: the planes are shared, only the refcount moves.
//! This mirrors the codec engine's refcounted frame semantics - the decoder's
//! output slot holds one strong reference and render callbacks borrow it.

use crate::pixel::PixelFormat;
use crate::video_format::VideoFormatInfo;
use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

/// Number of data pointers a frame carries.
pub const FRAME_DATA_POINTERS: usize = 4;

bitflags! {
    /// Frame status flags set by the codec engine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FrameFlags: u32 {
        /// Frame data is corrupted or incomplete.
        const CORRUPT = 0x0001;
        /// Frame was decoded for reference only and must not be shown.
        const DISCARD = 0x0002;
    }
}

/// One reference-counted plane buffer.
#[derive(Clone)]
pub struct PlaneBuffer {
    data: Vec<u8>,
}

impl PlaneBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size],
        }
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A decoded video frame.
#[derive(Clone, Default)]
pub struct Frame {
    pub format: PixelFormat,
    pub width: i32,
    pub height: i32,
    pub pts: i64,
    pub flags: FrameFlags,
    /// Non-zero when the engine flagged decode errors on this frame.
    pub decode_error_flags: u32,
    planes: [Option<Arc<PlaneBuffer>>; FRAME_DATA_POINTERS],
    linesize: [usize; FRAME_DATA_POINTERS],
    /// Hardware surface handle for opaque HW frames.
    pub surface: Option<u64>,
    /// Format descriptor stamped onto published frames by the decoder.
    pub opaque: Option<Arc<VideoFormatInfo>>,
}

impl Frame {
    pub fn new() -> Self {
        Self {
            format: PixelFormat::Invalid,
            ..Default::default()
        }
    }

    /// Reset every data pointer, line size and the opaque slot. Metadata is
    /// kept; the engine rewrites it on the next decode.
    pub fn clear_data(&mut self) {
        for p in &mut self.planes {
            *p = None;
        }
        self.linesize = [0; FRAME_DATA_POINTERS];
        self.surface = None;
        self.opaque = None;
    }

    /// Full reset back to an empty frame.
    pub fn reset(&mut self) {
        *self = Frame::new();
    }

    pub fn set_plane(&mut self, index: usize, buffer: Arc<PlaneBuffer>, linesize: usize) {
        if index < FRAME_DATA_POINTERS {
            self.planes[index] = Some(buffer);
            self.linesize[index] = linesize;
        }
    }

    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes
            .get(index)
            .and_then(|p| p.as_ref())
            .map(|p| p.as_slice())
    }

    pub fn plane_count(&self) -> usize {
        self.planes.iter().filter(|p| p.is_some()).count()
    }

    pub fn linesize(&self, index: usize) -> usize {
        self.linesize.get(index).copied().unwrap_or(0)
    }

    pub fn has_data(&self) -> bool {
        self.planes[0].is_some() || self.surface.is_some()
    }

    pub fn is_hw(&self) -> bool {
        self.surface.is_some()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pts", &self.pts)
            .field("flags", &self.flags)
            .field("planes", &self.plane_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_planes() {
        let mut frame = Frame::new();
        let buf = Arc::new(PlaneBuffer::new(1024));
        frame.set_plane(0, buf.clone(), 1024);
        let copy = frame.clone();
        assert_eq!(Arc::strong_count(&buf), 3);
        assert_eq!(copy.plane(0).unwrap().len(), 1024);
        assert_eq!(copy.linesize(0), 1024);
    }

    #[test]
    fn test_clear_data() {
        let mut frame = Frame::new();
        frame.set_plane(0, Arc::new(PlaneBuffer::new(16)), 16);
        frame.pts = 42;
        frame.clear_data();
        assert!(!frame.has_data());
        assert_eq!(frame.linesize(0), 0);
        assert_eq!(frame.pts, 42);
    }

    #[test]
    fn test_plane_out_of_range() {
        let frame = Frame::new();
        assert!(frame.plane(3).is_none());
        assert!(frame.plane(99).is_none());
        assert_eq!(frame.linesize(99), 0);
    }
}
