//! Video acceleration capability.
//!
//! A [`VideoAcceleration`] wraps one platform decode backend behind a uniform
//! contract: it maps (hw format, sw format) pairs to a chroma family,
//! allocates GPU frame buffers, and exposes the extra info the render stage
//! needs to address the decoded surfaces.

use crate::engine::{CodecContext, EngineVersion};
use crate::error::Result;
use vidplay_core::chroma::{
    FourCc, CHROMA_D3D11_OPAQUE, CHROMA_D3D11_OPAQUE_10, CHROMA_DXVA2_OPAQUE,
    CHROMA_VAAPI_OPAQUE, CHROMA_VAAPI_OPAQUE_10, CHROMA_VDPAU_OPAQUE,
};
use vidplay_core::frame::Frame;
use vidplay_core::pixel::PixelFormat;
use vidplay_core::video_format::HwSurfaceInfo;

/// Hardware decode backend identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HwBackend {
    D3d11va,
    Dxva2,
    Vaapi,
    Vdpau,
}

impl HwBackend {
    pub fn name(&self) -> &'static str {
        match self {
            HwBackend::D3d11va => "D3D11VA",
            HwBackend::Dxva2 => "DXVA2",
            HwBackend::Vaapi => "VA-API",
            HwBackend::Vdpau => "VDPAU",
        }
    }

    pub fn pixel_format(&self) -> PixelFormat {
        match self {
            HwBackend::D3d11va => PixelFormat::D3d11,
            HwBackend::Dxva2 => PixelFormat::Dxva2,
            HwBackend::Vaapi => PixelFormat::Vaapi,
            HwBackend::Vdpau => PixelFormat::Vdpau,
        }
    }

    pub fn from_pixel_format(format: PixelFormat) -> Option<Self> {
        match format {
            PixelFormat::D3d11 => Some(HwBackend::D3d11va),
            PixelFormat::Dxva2 => Some(HwBackend::Dxva2),
            PixelFormat::Vaapi => Some(HwBackend::Vaapi),
            PixelFormat::Vdpau => Some(HwBackend::Vdpau),
            _ => None,
        }
    }
}

/// One instantiated hardware decode context.
pub trait VideoAcceleration: Send {
    fn backend(&self) -> HwBackend;

    /// Final setup after creation; must succeed before the context is used.
    fn open(&mut self) -> Result<()>;

    /// Populate the frame with backend surfaces. Semantics mirror the
    /// engine's default buffer allocation.
    fn get_frame(&mut self, frame: &mut Frame) -> Result<()>;

    /// Render-side handle to the shared GPU surface, if the backend exports
    /// one.
    fn extra_info_for_render(&self) -> Option<HwSurfaceInfo>;

    /// Release all GPU resources. Idempotent.
    fn close(&mut self);
}

/// Factory signature the decoder consults to instantiate a backend.
pub type AccelFactory = fn(&CodecContext, PixelFormat) -> Option<Box<dyn VideoAcceleration>>;

fn is_420(format: PixelFormat) -> bool {
    format
        .descriptor()
        .is_some_and(|d| d.log2_chroma_w == 1 && d.log2_chroma_h == 1)
}

/// Map a (hw format, sw format) pair to the chroma family the backend
/// decodes into. `None` means this brand of acceleration cannot produce the
/// stream's layout.
pub fn chroma_for(hw_format: PixelFormat, sw_format: PixelFormat) -> Option<FourCc> {
    if !is_420(sw_format) {
        return None;
    }
    let depth = sw_format.bits_per_component();
    match (hw_format, depth) {
        (PixelFormat::Vaapi, 8) => Some(CHROMA_VAAPI_OPAQUE),
        (PixelFormat::Vaapi, 10) => Some(CHROMA_VAAPI_OPAQUE_10),
        (PixelFormat::D3d11, 8) => Some(CHROMA_D3D11_OPAQUE),
        (PixelFormat::D3d11, 10) => Some(CHROMA_D3D11_OPAQUE_10),
        (PixelFormat::Dxva2, 8) => Some(CHROMA_DXVA2_OPAQUE),
        (PixelFormat::Vdpau, 8) => Some(CHROMA_VDPAU_OPAQUE),
        _ => None,
    }
}

/// Preferred hardware formats, best first, filtered by platform.
#[cfg(target_os = "windows")]
pub fn hw_format_priority() -> &'static [PixelFormat] {
    &[
        PixelFormat::D3d11,
        PixelFormat::Dxva2,
        PixelFormat::Vaapi,
        PixelFormat::Vdpau,
    ]
}

/// Preferred hardware formats, best first, filtered by platform.
#[cfg(not(target_os = "windows"))]
pub fn hw_format_priority() -> &'static [PixelFormat] {
    &[PixelFormat::Vaapi, PixelFormat::Vdpau]
}

/// VDPAU needs a codec library new enough to expose the surface type.
pub fn vdpau_supported(version: EngineVersion) -> bool {
    version.int() >= EngineVersion::new(52, 4, 0).int()
}

/// Default backend factory: instantiate the platform backend for the
/// requested format, or `None` when the platform cannot provide it.
pub fn create_acceleration(
    ctx: &CodecContext,
    hw_format: PixelFormat,
) -> Option<Box<dyn VideoAcceleration>> {
    if ctx.coded_width <= 0 || ctx.coded_height <= 0 {
        return None;
    }
    match HwBackend::from_pixel_format(hw_format)? {
        #[cfg(target_os = "linux")]
        HwBackend::Vaapi => crate::vaapi::VaapiAcceleration::create(ctx),
        other => {
            tracing::debug!(backend = other.name(), "no backend available");
            None
        }
    }
}
