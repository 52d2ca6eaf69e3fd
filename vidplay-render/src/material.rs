//! Render state derived from the current video frame.
//!
//! A [`VideoMaterial`] owns everything the shader needs per frame: plane
//! textures, the channel map that routes sampled components into (Y, U, V, A)
//! or (R, G, B, A) order, the combined color matrix, texel geometry, and the
//! material type that keys the shader cache.

use crate::color::{self, VideoEq};
use crate::gl::{GlApi, GlCaps, TextureId, TextureTarget};
use glam::{Mat4, Vec2};
use vidplay_core::frame::Frame;
use vidplay_core::pixel::PixelFormat;
use vidplay_core::video_format::{ColorSpace, VideoFormatInfo, MAX_PLANES};
use std::sync::Arc;

/// Axis-aligned rectangle in f64 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Texture coordinate normalization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    /// Normalize unless the target is a rectangle texture.
    Auto,
    No,
    Yes,
}

/// Layout family a shader program is built for. Formats in the same family
/// share a program; their differences live in uniforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    PlanarYuv = 0,
    SemiPlanar = 1,
    Packed422 = 2,
    /// Single full-resolution plane: RGB, packed 4:4:4 YUV, grey, XYZ.
    Single = 3,
    HwSurface = 4,
}

fn family_of(format: PixelFormat, hw: bool) -> Family {
    if hw {
        return Family::HwSurface;
    }
    match format.plane_count() {
        3 | 4 => Family::PlanarYuv,
        2 => Family::SemiPlanar,
        _ => {
            if format.descriptor().is_some_and(|d| d.log2_chroma_w > 0) {
                Family::Packed422
            } else {
                Family::Single
            }
        }
    }
}

/// Component swizzle taking sampled texels to logical (Y, U, V, A) or
/// (R, G, B, A) order.
fn channel_map_matrix(format: PixelFormat) -> Mat4 {
    use PixelFormat as P;
    fn rows(rows: [[f32; 4]; 4]) -> Mat4 {
        Mat4::from_cols_array_2d(&rows).transpose()
    }
    match format {
        // packed 4:2:2: one RGBA texel carries two pixels; luma is the
        // average of the two Y samples
        P::Uyvy => rows([
            [0.0, 0.5, 0.0, 0.5],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]),
        P::Yuyv => rows([
            [0.5, 0.0, 0.5, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, 1.0],
        ]),
        P::Vyuy => rows([
            [0.0, 0.5, 0.0, 0.5],
            [0.0, 0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]),
        P::Yvyu => rows([
            [0.5, 0.0, 0.5, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]),
        // semi-planar: chroma plane sampled into (y, z)
        P::Nv21 => rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]),
        // planar with swapped chroma planes
        P::Yv12 | P::Imc1 | P::Imc2 => rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]),
        // RGB layouts, sampled in memory byte order
        P::Bgra32 | P::Bgr24 | P::Rgb32 | P::Bgr48 | P::Bgr48Le | P::Bgr48Be | P::Bgra64
        | P::Bgra64Le | P::Bgra64Be => rows([
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]),
        P::Argb32 => rows([
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 0.0],
        ]),
        P::Abgr32 => rows([
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
        ]),
        // AYUV: route to (Y, U, V, A)
        P::Ayuv444 => rows([
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 0.0],
        ]),
        // VYU packed triplets
        P::Vyu => rows([
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]),
        // grey: replicate luma into RGB
        P::Y8 | P::Y16 => rows([
            [1.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]),
        _ => Mat4::IDENTITY,
    }
}

/// Component count per texel uploaded for one plane.
fn upload_channels(format: PixelFormat, plane: usize) -> u8 {
    match family_of(format, false) {
        Family::SemiPlanar => {
            if plane == 0 {
                1
            } else {
                2
            }
        }
        Family::PlanarYuv => 1,
        // one RGBA texel covers two packed pixels
        Family::Packed422 | Family::HwSurface => 4,
        Family::Single => format.channels().clamp(1, 4) as u8,
    }
}

/// Storage bytes one texel occupies in the plane buffer.
fn bytes_per_texel(format: PixelFormat, plane: usize) -> u32 {
    match family_of(format, false) {
        Family::Packed422 | Family::HwSurface => 4,
        Family::SemiPlanar => {
            if plane == 0 {
                1
            } else {
                2
            }
        }
        Family::PlanarYuv => {
            if format.bits_per_component() > 8 {
                2
            } else {
                1
            }
        }
        Family::Single => {
            let step = format
                .descriptor()
                .map(|d| d.step_bits[0] as u32)
                .unwrap_or(8);
            (step + 7) / 8
        }
    }
}

/// Per-surface render state derived from the current frame.
pub struct VideoMaterial {
    caps: GlCaps,
    frame: Option<Frame>,
    info: Option<Arc<VideoFormatInfo>>,
    format: PixelFormat,
    hw: bool,
    planes: usize,
    bpc: i32,
    target: TextureTarget,
    split_16bit: bool,
    channel_map: Mat4,
    to8: Vec2,
    eq: VideoEq,
    space: ColorSpace,
    full_range: bool,
    valid_width: f64,
    texture_size: [(u32, u32); MAX_PLANES],
    textures: Vec<TextureId>,
    dirty: bool,
}

impl VideoMaterial {
    pub fn new(caps: GlCaps) -> Self {
        Self {
            caps,
            frame: None,
            info: None,
            format: PixelFormat::Invalid,
            hw: false,
            planes: 0,
            bpc: 0,
            target: TextureTarget::Tex2D,
            split_16bit: false,
            channel_map: Mat4::IDENTITY,
            to8: Vec2::ZERO,
            eq: VideoEq::default(),
            space: ColorSpace::Unspecified,
            full_range: false,
            valid_width: 1.0,
            texture_size: [(0, 0); MAX_PLANES],
            textures: Vec::new(),
            dirty: false,
        }
    }

    /// Adopt a decoded frame. The frame is ref-counted; holding it past the
    /// render lock is safe.
    pub fn set_current_frame(&mut self, frame: &Frame) {
        let old_type = self.material_type();

        let hw = frame.format.is_hw_accelerated() || frame.is_hw();
        // unknown layouts fall back to the safest program
        let format = if !hw && frame.format.descriptor().is_none() {
            PixelFormat::Yuv420P
        } else {
            frame.format
        };

        self.info = frame.opaque.clone();
        self.format = format;
        self.hw = hw;
        self.planes = if hw {
            1
        } else {
            format.plane_count().max(1) as usize
        };
        self.bpc = if hw { 8 } else { format.bits_per_component() };
        self.split_16bit = self.bpc > 8 && !self.caps.texture_16bit;
        self.target = if hw && self.caps.external_oes {
            TextureTarget::ExternalOes
        } else if self.caps.rectangle_required && !format.is_planar() && !hw {
            TextureTarget::Rectangle
        } else {
            TextureTarget::Tex2D
        };
        self.channel_map = channel_map_matrix(format);
        self.to8 = if self.bpc > 8 {
            let scale = ((1u32 << self.bpc) - 1) as f32;
            if format.is_big_endian() {
                Vec2::new(256.0, 1.0) * 255.0 / scale
            } else {
                Vec2::new(1.0, 256.0) * 255.0 / scale
            }
        } else {
            Vec2::ZERO
        };

        if let Some(info) = &self.info {
            self.space = info.space;
            self.full_range = info.color_range_full;
            self.valid_width = info.valid_width_ratio();
            for i in 0..self.planes.min(MAX_PLANES) {
                let texel = bytes_per_texel(format, i).max(1);
                self.texture_size[i] = match info.plane(i) {
                    Some(p) if p.pitch > 0 => (p.pitch / texel, p.lines),
                    _ => (info.width, info.height),
                };
            }
        } else {
            self.valid_width = 1.0;
            for i in 0..self.planes.min(MAX_PLANES) {
                let texel = bytes_per_texel(format, i).max(1);
                let linesize = format.bytes_per_line(frame.width.max(0), i as i32).max(0) as u32;
                let h = format.plane_height(frame.height.max(0), i as i32).max(0) as u32;
                self.texture_size[i] = (linesize / texel, h);
            }
        }

        self.frame = Some(frame.clone());
        if self.material_type() != old_type {
            self.textures.clear();
            self.dirty = true;
        }
    }

    pub fn current_format(&self) -> PixelFormat {
        self.format
    }

    /// Integer fingerprint of the render configuration; the shader cache
    /// key. Formats that share a program share a type: endianness and
    /// channel order differences live in uniforms.
    pub fn material_type(&self) -> i32 {
        if !self.format.is_valid() && !self.hw {
            return -1;
        }
        let family = family_of(self.format, self.hw) as i32;
        let target = match self.target {
            TextureTarget::Tex2D => 0,
            TextureTarget::Rectangle => 1,
            TextureTarget::ExternalOes => 2,
        };
        (family << 8) | (self.bpc << 3) | ((self.split_16bit as i32) << 2) | target
    }

    /// Human readable form of a material type, for logs.
    pub fn type_name(material_type: i32) -> String {
        if material_type < 0 {
            return "invalid".to_string();
        }
        let family = match material_type >> 8 {
            0 => "planar",
            1 => "semiplanar",
            2 => "packed422",
            3 => "single",
            4 => "hw",
            _ => "unknown",
        };
        let bpc = (material_type >> 3) & 0x1f;
        let target = match material_type & 0x3 {
            1 => "rect",
            2 => "oes",
            _ => "2d",
        };
        format!("{}_{}bit_{}", family, bpc, target)
    }

    pub fn plane_count(&self) -> usize {
        self.planes
    }

    pub fn bits_per_component(&self) -> i32 {
        self.bpc
    }

    /// Scale vector assembling a >8-bit value from two 8-bit components.
    pub fn vector_to_8bit(&self) -> Vec2 {
        self.to8
    }

    /// Whether >8-bit planes are uploaded as two 8-bit channels because the
    /// platform lacks 16-bit textures.
    pub fn split_16bit(&self) -> bool {
        self.split_16bit
    }

    pub fn texture_target(&self) -> TextureTarget {
        self.target
    }

    pub fn channel_map(&self) -> Mat4 {
        self.channel_map
    }

    /// Combined color conversion matrix for the current frame and equalizer.
    pub fn color_matrix(&self) -> Mat4 {
        let rgb_input = self.format.is_rgb()
            || self.format.is_xyz()
            || matches!(self.format, PixelFormat::Y8 | PixelFormat::Y16);
        color::color_matrix(self.space, self.full_range, rgb_input, &self.eq)
    }

    /// Normalized valid width of the luma plane, in (0, 1]. Padding columns
    /// at the end of each line fall outside this ratio.
    pub fn valid_texture_width(&self) -> f64 {
        self.valid_width
    }

    pub fn frame_size(&self) -> (u32, u32) {
        match &self.info {
            Some(info) => (info.width, info.height),
            None => self
                .frame
                .as_ref()
                .map(|f| (f.width.max(0) as u32, f.height.max(0) as u32))
                .unwrap_or((0, 0)),
        }
    }

    pub fn texture_size(&self, plane: usize) -> (u32, u32) {
        if plane < self.planes.min(MAX_PLANES) {
            self.texture_size[plane]
        } else {
            (0, 0)
        }
    }

    /// (1/w, 1/h) of one plane texture; (1, 1) for rectangle textures.
    pub fn texel_size(&self, plane: usize) -> Vec2 {
        if self.target == TextureTarget::Rectangle {
            return Vec2::ONE;
        }
        let (w, h) = self.texture_size(plane);
        if w == 0 || h == 0 {
            return Vec2::ZERO;
        }
        Vec2::new(1.0 / w as f32, 1.0 / h as f32)
    }

    pub fn texel_sizes(&self) -> Vec<Vec2> {
        (0..self.planes).map(|p| self.texel_size(p)).collect()
    }

    pub fn texture_sizes(&self) -> Vec<Vec2> {
        (0..self.planes)
            .map(|p| {
                let (w, h) = self.texture_size(p);
                Vec2::new(w as f32, h as f32)
            })
            .collect()
    }

    /// Map a frame-relative rect in [0, 1] to valid texture coordinates.
    pub fn normalized_roi(&self, roi: RectF) -> RectF {
        let vh = match self.info.as_ref().and_then(|i| i.plane(0)) {
            Some(p) if p.lines > 0 => p.visible_lines as f64 / p.lines as f64,
            _ => 1.0,
        };
        RectF::new(
            roi.x * self.valid_width,
            roi.y * vh,
            roi.width * self.valid_width,
            roi.height * vh,
        )
    }

    /// Map a rect in frame pixel coordinates to texture coordinates of one
    /// plane, normalized per `normalize`.
    pub fn map_to_texture(&self, plane: usize, rect: RectF, normalize: Normalize) -> RectF {
        let nw = self.format.normalized_width(plane as i32);
        let nh = self.format.normalized_height(plane as i32);
        let mut out = RectF::new(
            rect.x * nw,
            rect.y * nh,
            rect.width * nw,
            rect.height * nh,
        );
        let do_norm = match normalize {
            Normalize::Yes => true,
            Normalize::No => false,
            Normalize::Auto => self.target != TextureTarget::Rectangle,
        };
        if do_norm {
            let (w, h) = self.texture_size(plane);
            if w > 0 && h > 0 {
                out.x /= w as f64;
                out.width /= w as f64;
                out.y /= h as f64;
                out.height /= h as f64;
            }
        }
        out
    }

    pub fn brightness(&self) -> f64 {
        self.eq.brightness
    }

    pub fn set_brightness(&mut self, value: f64) {
        self.eq.brightness = value.clamp(-1.0, 1.0);
        self.dirty = true;
    }

    pub fn contrast(&self) -> f64 {
        self.eq.contrast
    }

    pub fn set_contrast(&mut self, value: f64) {
        self.eq.contrast = value.clamp(-1.0, 1.0);
        self.dirty = true;
    }

    pub fn hue(&self) -> f64 {
        self.eq.hue
    }

    pub fn set_hue(&mut self, value: f64) {
        self.eq.hue = value.clamp(-1.0, 1.0);
        self.dirty = true;
    }

    pub fn saturation(&self) -> f64 {
        self.eq.saturation
    }

    pub fn set_saturation(&mut self, value: f64) {
        self.eq.saturation = value.clamp(-1.0, 1.0);
        self.dirty = true;
    }

    /// True when the shader must re-derive state before the next draw.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear after the frame is rendered.
    pub fn set_dirty(&mut self, value: bool) {
        self.dirty = value;
    }

    /// Ordering between materials sharing a cache, coarse type compare.
    pub fn compare(&self, other: &VideoMaterial) -> i32 {
        self.material_type() - other.material_type()
    }

    /// Create textures on demand and upload the current frame's planes,
    /// binding them to texture units 0..planes.
    pub fn bind(&mut self, gl: &mut dyn GlApi) -> bool {
        let Some(frame) = self.frame.clone() else {
            return false;
        };

        if self.hw {
            let Some(handle) = frame.surface.or_else(|| {
                self.info
                    .as_ref()
                    .and_then(|i| i.hw_surface.as_ref())
                    .map(|s| s.handle)
            }) else {
                return false;
            };
            let texture = gl.import_hw_surface(handle);
            if self.textures.len() != 1 {
                self.textures = vec![texture];
            } else {
                self.textures[0] = texture;
            }
            gl.bind_texture(0, self.target, texture);
            return true;
        }

        if self.textures.len() != self.planes {
            self.textures = (0..self.planes)
                .map(|_| gl.create_texture(self.target))
                .collect();
        }
        for plane in 0..self.planes {
            let Some(data) = frame.plane(plane) else {
                return false;
            };
            let (w, h) = self.texture_size(plane);
            gl.upload_texture(
                self.textures[plane],
                self.target,
                w,
                h,
                upload_channels(self.format, plane),
                data,
            );
            gl.bind_texture(plane as u32, self.target, self.textures[plane]);
        }
        true
    }

    pub fn unbind(&self) {}

    /// Release owned textures. Call on the GL thread.
    pub fn release(&mut self, gl: &mut dyn GlApi) {
        for texture in self.textures.drain(..) {
            gl.delete_texture(texture);
        }
    }
}
