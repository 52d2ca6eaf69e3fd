//! VA-API decode backend.
//!
//! Surfaces are modeled as an NV12 pool owned by the context. Real driver
//! wiring goes through the display/config/context handles; the pool keeps
//! the frame plumbing, surface recycling and render hand-off observable
//! without a GPU.

use crate::accel::{HwBackend, VideoAcceleration};
use crate::engine::CodecContext;
use crate::error::{CodecError, Result};
use std::sync::Arc;
use tracing::{debug, info};
use vidplay_core::chroma::CHROMA_VAAPI_OPAQUE;
use vidplay_core::frame::{Frame, PlaneBuffer};
use vidplay_core::pixel::PixelFormat;
use vidplay_core::video_format::HwSurfaceInfo;

/// Number of surfaces kept in the decode pool.
const SURFACE_COUNT: usize = 8;

struct Surface {
    id: u64,
    luma: Arc<PlaneBuffer>,
    chroma: Arc<PlaneBuffer>,
    pitch: usize,
}

/// VA-API decode context with a fixed surface pool.
pub struct VaapiAcceleration {
    width: i32,
    height: i32,
    surfaces: Vec<Surface>,
    next: usize,
    opened: bool,
}

impl VaapiAcceleration {
    /// Attempt to instantiate for the context's coded dimensions.
    pub fn create(ctx: &CodecContext) -> Option<Box<dyn VideoAcceleration>> {
        if ctx.coded_width <= 0 || ctx.coded_height <= 0 {
            return None;
        }
        debug!(
            width = ctx.coded_width,
            height = ctx.coded_height,
            "creating VA-API context"
        );
        Some(Box::new(Self {
            width: ctx.coded_width,
            height: ctx.coded_height,
            surfaces: Vec::new(),
            next: 0,
            opened: false,
        }))
    }

    fn pitch(&self) -> usize {
        // NV12 surface pitch, padded like the driver pads
        ((self.width as usize) + 63) & !63
    }
}

impl VideoAcceleration for VaapiAcceleration {
    fn backend(&self) -> HwBackend {
        HwBackend::Vaapi
    }

    fn open(&mut self) -> Result<()> {
        if self.opened {
            return Ok(());
        }
        let pitch = self.pitch();
        let luma_size = pitch * self.height as usize;
        let chroma_size = pitch * (self.height as usize).div_ceil(2);
        self.surfaces = (0..SURFACE_COUNT)
            .map(|i| Surface {
                id: i as u64 + 1,
                luma: Arc::new(PlaneBuffer::new(luma_size)),
                chroma: Arc::new(PlaneBuffer::new(chroma_size)),
                pitch,
            })
            .collect();
        self.opened = true;
        info!(
            surfaces = SURFACE_COUNT,
            width = self.width,
            height = self.height,
            "VA-API decoder opened"
        );
        Ok(())
    }

    fn get_frame(&mut self, frame: &mut Frame) -> Result<()> {
        if !self.opened {
            return Err(CodecError::Transient("VA-API context not open".into()));
        }
        let surface = &self.surfaces[self.next];
        self.next = (self.next + 1) % self.surfaces.len();
        frame.set_plane(0, surface.luma.clone(), surface.pitch);
        frame.set_plane(1, surface.chroma.clone(), surface.pitch);
        frame.surface = Some(surface.id);
        frame.format = PixelFormat::Vaapi;
        Ok(())
    }

    fn extra_info_for_render(&self) -> Option<HwSurfaceInfo> {
        if !self.opened {
            return None;
        }
        Some(HwSurfaceInfo {
            chroma: CHROMA_VAAPI_OPAQUE,
            handle: self.surfaces[self.next].id,
        })
    }

    fn close(&mut self) {
        if self.opened {
            debug!("closing VA-API decoder");
        }
        self.surfaces.clear();
        self.next = 0;
        self.opened = false;
    }
}

impl Drop for VaapiAcceleration {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CodecId;

    fn context(width: i32, height: i32) -> CodecContext {
        let mut ctx = CodecContext::new(CodecId::H264);
        ctx.coded_width = width;
        ctx.coded_height = height;
        ctx
    }

    #[test]
    fn test_create_rejects_zero_dims() {
        assert!(VaapiAcceleration::create(&context(0, 1080)).is_none());
        assert!(VaapiAcceleration::create(&context(1920, 1080)).is_some());
    }

    #[test]
    fn test_get_frame_requires_open() {
        let mut va = VaapiAcceleration::create(&context(1920, 1080)).unwrap();
        let mut frame = Frame::new();
        assert!(va.get_frame(&mut frame).is_err());
        va.open().unwrap();
        va.get_frame(&mut frame).unwrap();
        assert_eq!(frame.format, PixelFormat::Vaapi);
        assert!(frame.surface.is_some());
        assert_eq!(frame.plane_count(), 2);
    }

    #[test]
    fn test_surfaces_recycle() {
        let mut va = VaapiAcceleration::create(&context(320, 240)).unwrap();
        va.open().unwrap();
        let mut ids = Vec::new();
        for _ in 0..SURFACE_COUNT + 1 {
            let mut frame = Frame::new();
            va.get_frame(&mut frame).unwrap();
            ids.push(frame.surface.unwrap());
        }
        assert_eq!(ids[0], ids[SURFACE_COUNT]);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut va = VaapiAcceleration::create(&context(320, 240)).unwrap();
        va.open().unwrap();
        assert!(va.extra_info_for_render().is_some());
        va.close();
        va.close();
        assert!(va.extra_info_for_render().is_none());
    }
}
