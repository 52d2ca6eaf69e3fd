//! Pixel format catalogue.
//!
//! Every supported pixel format is described by one row of a static
//! descriptor table; all layout queries derive from descriptor fields.
//! Invalid inputs return sentinel values (-1 / 0 / [`PixelFormat::Invalid`])
//! rather than failing loudly.

use bitflags::bitflags;
use std::fmt;

/// Codec-engine native pixel format tags.
///
/// The codec engine identifies pixel formats by integer. These constants are
/// the engine side of the bidirectional [`PixelFormat::from_native`] /
/// [`PixelFormat::to_native`] mapping.
pub mod native {
    /// No engine mapping exists.
    pub const NONE: i32 = -1;
    pub const YUV420P: i32 = 0;
    pub const YUYV422: i32 = 1;
    pub const RGB24: i32 = 2;
    pub const BGR24: i32 = 3;
    pub const YUV422P: i32 = 4;
    pub const YUV444P: i32 = 5;
    pub const YUV410P: i32 = 6;
    pub const YUV411P: i32 = 7;
    pub const GRAY8: i32 = 8;
    pub const MONOWHITE: i32 = 9;
    pub const MONOBLACK: i32 = 10;
    pub const PAL8: i32 = 11;
    pub const YUVJ420P: i32 = 12;
    pub const UYVY422: i32 = 13;
    pub const YVYU422: i32 = 14;
    pub const NV12: i32 = 15;
    pub const NV21: i32 = 16;
    pub const ARGB: i32 = 17;
    pub const RGBA: i32 = 18;
    pub const ABGR: i32 = 19;
    pub const BGRA: i32 = 20;
    pub const GRAY16LE: i32 = 21;
    pub const RGB565LE: i32 = 22;
    pub const BGR565LE: i32 = 23;
    pub const RGB555LE: i32 = 24;
    pub const BGR555LE: i32 = 25;
    pub const AYUV: i32 = 26;
    pub const YUV420P9LE: i32 = 27;
    pub const YUV420P9BE: i32 = 28;
    pub const YUV422P9LE: i32 = 29;
    pub const YUV422P9BE: i32 = 30;
    pub const YUV444P9LE: i32 = 31;
    pub const YUV444P9BE: i32 = 32;
    pub const YUV420P10LE: i32 = 33;
    pub const YUV420P10BE: i32 = 34;
    pub const YUV422P10LE: i32 = 35;
    pub const YUV422P10BE: i32 = 36;
    pub const YUV444P10LE: i32 = 37;
    pub const YUV444P10BE: i32 = 38;
    pub const YUV420P12LE: i32 = 39;
    pub const YUV420P12BE: i32 = 40;
    pub const YUV422P12LE: i32 = 41;
    pub const YUV422P12BE: i32 = 42;
    pub const YUV444P12LE: i32 = 43;
    pub const YUV444P12BE: i32 = 44;
    pub const YUV420P14LE: i32 = 45;
    pub const YUV420P14BE: i32 = 46;
    pub const YUV422P14LE: i32 = 47;
    pub const YUV422P14BE: i32 = 48;
    pub const YUV444P14LE: i32 = 49;
    pub const YUV444P14BE: i32 = 50;
    pub const YUV420P16LE: i32 = 51;
    pub const YUV420P16BE: i32 = 52;
    pub const YUV422P16LE: i32 = 53;
    pub const YUV422P16BE: i32 = 54;
    pub const YUV444P16LE: i32 = 55;
    pub const YUV444P16BE: i32 = 56;
    pub const RGB48LE: i32 = 57;
    pub const RGB48BE: i32 = 58;
    pub const BGR48LE: i32 = 59;
    pub const BGR48BE: i32 = 60;
    pub const RGBA64LE: i32 = 61;
    pub const RGBA64BE: i32 = 62;
    pub const BGRA64LE: i32 = 63;
    pub const BGRA64BE: i32 = 64;
    pub const XYZ12LE: i32 = 65;
    pub const XYZ12BE: i32 = 66;
    pub const DXVA2_VLD: i32 = 67;
    pub const D3D11VA_VLD: i32 = 68;
    pub const VAAPI_VLD: i32 = 69;
    pub const VDPAU: i32 = 70;
}

bitflags! {
    /// Layout and capability flags of a pixel format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatFlags: u16 {
        /// Samples are stored big-endian.
        const BIG_ENDIAN = 0x0001;
        /// Format carries a palette in an extra data block.
        const PALETTE = 0x0002;
        /// Format can be interpreted through a fixed pseudo palette (grey).
        const PSEUDO_PALETTE = 0x0004;
        /// Component values are bit-wise packed end to end.
        const BITSTREAM = 0x0008;
        /// Opaque hardware surface format; no CPU-visible layout.
        const HW_ACCEL = 0x0010;
        /// Planar or semi-planar layout.
        const PLANAR = 0x0020;
        /// RGB family.
        const RGB = 0x0040;
        /// CIE XYZ family.
        const XYZ = 0x0080;
        /// Has an alpha channel.
        const ALPHA = 0x0100;
    }
}

/// Closed enumeration of every pixel format the playback core understands.
///
/// The 32-bit RGB names describe channel layout in memory byte order;
/// `Rgb32`/`Bgr32` (and the `48`/`64`-bit and `Xyz12` base names) are
/// native-endian aliases that resolve to a concrete little-endian variant on
/// the engine side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Argb32,
    Bgra32,
    Abgr32,
    Rgba32,
    /// 0xAARRGGBB in a native-endian machine word.
    Rgb32,
    /// 0xAABBGGRR in a native-endian machine word.
    Bgr32,
    Rgb24,
    Bgr24,
    Rgb565,
    Bgr565,
    Rgb555,
    Bgr555,
    Ayuv444,
    Yuv444P,
    Yuv422P,
    Yuv420P,
    Yuv411P,
    Yuv410P,
    /// Planar 4:2:0 with swapped U/V planes.
    Yv12,
    Uyvy,
    Vyuy,
    Yuyv,
    Yvyu,
    Nv12,
    Nv21,
    Imc1,
    Imc2,
    /// Same as IMC1 with U and V swapped.
    Imc3,
    /// Same as IMC2 with U and V swapped.
    Imc4,
    /// Single 8-bit luma plane (grey).
    Y8,
    /// Single 16-bit luma plane, little-endian.
    Y16,
    /// Full-range JPEG 4:2:0.
    Jpeg,
    Pal8,
    MonoWhite,
    MonoBlack,
    Yuv420P9Le,
    Yuv422P9Le,
    Yuv444P9Le,
    Yuv420P10Le,
    Yuv422P10Le,
    Yuv444P10Le,
    Yuv420P12Le,
    Yuv422P12Le,
    Yuv444P12Le,
    Yuv420P14Le,
    Yuv422P14Le,
    Yuv444P14Le,
    Yuv420P16Le,
    Yuv422P16Le,
    Yuv444P16Le,
    Yuv420P9Be,
    Yuv422P9Be,
    Yuv444P9Be,
    Yuv420P10Be,
    Yuv422P10Be,
    Yuv444P10Be,
    Yuv420P12Be,
    Yuv422P12Be,
    Yuv444P12Be,
    Yuv420P14Be,
    Yuv422P14Be,
    Yuv444P14Be,
    Yuv420P16Be,
    Yuv422P16Be,
    Yuv444P16Be,
    /// Native-endian alias of the 48-bit RGB variants.
    Rgb48,
    Rgb48Le,
    Rgb48Be,
    Bgr48,
    Bgr48Le,
    Bgr48Be,
    Rgba64,
    Rgba64Le,
    Rgba64Be,
    Bgra64,
    Bgra64Le,
    Bgra64Be,
    /// Packed (V, Y, U) triplets, rgb24-like layout.
    Vyu,
    Xyz12,
    Xyz12Le,
    Xyz12Be,
    /// Direct3D 11 opaque decode surface.
    D3d11,
    /// DXVA2 opaque decode surface.
    Dxva2,
    /// VA-API opaque decode surface.
    Vaapi,
    /// VDPAU opaque decode surface.
    Vdpau,
    Invalid,
    /// Sentinel for application-defined formats.
    User,
}

/// Invariant per-format layout description.
#[derive(Debug, Clone, Copy)]
pub struct PixelFormatDescriptor {
    pub name: &'static str,
    /// Total component count (e.g. RGBA: 4, NV12: 3).
    pub channels: u8,
    pub planes: u8,
    /// Components stored in each plane.
    pub channels_per_plane: [u8; 4],
    /// Sum of component depths per plane (NV12 chroma plane: 16).
    pub depth_per_plane: [u8; 4],
    /// Storage bits advanced per plane-resolution pixel; drives line sizes.
    pub step_bits: [u8; 4],
    /// Global bits per pixel, chroma subsampling applied.
    pub bpp: u8,
    /// Bits per pixel counting storage padding.
    pub bpp_padded: u8,
    /// Bits per component, 0 when components have uneven depths.
    pub bpc: u8,
    pub log2_chroma_w: u8,
    pub log2_chroma_h: u8,
    pub flags: FormatFlags,
    /// Codec-engine tag, [`native::NONE`] when not expressible.
    pub native: i32,
}

const fn packed(
    name: &'static str,
    channels: u8,
    depth: u8,
    step: u8,
    bpp: u8,
    bpp_padded: u8,
    bpc: u8,
    log2_chroma_w: u8,
    flags: FormatFlags,
    nat: i32,
) -> PixelFormatDescriptor {
    PixelFormatDescriptor {
        name,
        channels,
        planes: 1,
        channels_per_plane: [channels, 0, 0, 0],
        depth_per_plane: [depth, 0, 0, 0],
        step_bits: [step, 0, 0, 0],
        bpp,
        bpp_padded,
        bpc,
        log2_chroma_w,
        log2_chroma_h: 0,
        flags,
        native: nat,
    }
}

const fn planar3(
    name: &'static str,
    depth: u8,
    bpp: u8,
    bpp_padded: u8,
    log2_chroma_w: u8,
    log2_chroma_h: u8,
    flags: FormatFlags,
    nat: i32,
) -> PixelFormatDescriptor {
    let step = if depth > 8 { 16 } else { 8 };
    PixelFormatDescriptor {
        name,
        channels: 3,
        planes: 3,
        channels_per_plane: [1, 1, 1, 0],
        depth_per_plane: [depth, depth, depth, 0],
        step_bits: [step, step, step, 0],
        bpp,
        bpp_padded,
        bpc: depth,
        log2_chroma_w,
        log2_chroma_h,
        flags,
        native: nat,
    }
}

const fn semi_planar(name: &'static str, nat: i32) -> PixelFormatDescriptor {
    PixelFormatDescriptor {
        name,
        channels: 3,
        planes: 2,
        channels_per_plane: [1, 2, 0, 0],
        depth_per_plane: [8, 16, 0, 0],
        step_bits: [8, 16, 0, 0],
        bpp: 12,
        bpp_padded: 12,
        bpc: 8,
        log2_chroma_w: 1,
        log2_chroma_h: 1,
        flags: FormatFlags::PLANAR,
        native: nat,
    }
}

const fn hw_surface(name: &'static str, nat: i32) -> PixelFormatDescriptor {
    PixelFormatDescriptor {
        name,
        channels: 0,
        planes: 0,
        channels_per_plane: [0; 4],
        depth_per_plane: [0; 4],
        step_bits: [0; 4],
        bpp: 0,
        bpp_padded: 0,
        bpc: 0,
        log2_chroma_w: 0,
        log2_chroma_h: 0,
        flags: FormatFlags::HW_ACCEL,
        native: nat,
    }
}

const RGBA_FLAGS: FormatFlags = FormatFlags::RGB.union(FormatFlags::ALPHA);
const PLANAR_BE: FormatFlags = FormatFlags::PLANAR.union(FormatFlags::BIG_ENDIAN);
const RGB_BE: FormatFlags = FormatFlags::RGB.union(FormatFlags::BIG_ENDIAN);
const RGBA_BE: FormatFlags = RGBA_FLAGS.union(FormatFlags::BIG_ENDIAN);
const XYZ_BE: FormatFlags = FormatFlags::XYZ.union(FormatFlags::BIG_ENDIAN);
const NONE: FormatFlags = FormatFlags::empty();

/// One row per [`PixelFormat`] variant, indexed by discriminant.
/// `Invalid` and `User` deliberately have no row.
static FORMAT_TABLE: [PixelFormatDescriptor; 85] = [
    packed("argb32", 4, 32, 32, 32, 32, 8, 0, RGBA_FLAGS, native::ARGB),
    packed("bgra32", 4, 32, 32, 32, 32, 8, 0, RGBA_FLAGS, native::BGRA),
    packed("abgr32", 4, 32, 32, 32, 32, 8, 0, RGBA_FLAGS, native::ABGR),
    packed("rgba32", 4, 32, 32, 32, 32, 8, 0, RGBA_FLAGS, native::RGBA),
    packed("rgb32", 4, 32, 32, 32, 32, 8, 0, RGBA_FLAGS, native::NONE),
    packed("bgr32", 4, 32, 32, 32, 32, 8, 0, RGBA_FLAGS, native::NONE),
    packed("rgb24", 3, 24, 24, 24, 24, 8, 0, FormatFlags::RGB, native::RGB24),
    packed("bgr24", 3, 24, 24, 24, 24, 8, 0, FormatFlags::RGB, native::BGR24),
    packed("rgb565", 3, 16, 16, 16, 16, 0, 0, FormatFlags::RGB, native::RGB565LE),
    packed("bgr565", 3, 16, 16, 16, 16, 0, 0, FormatFlags::RGB, native::BGR565LE),
    packed("rgb555", 3, 15, 16, 15, 16, 5, 0, FormatFlags::RGB, native::RGB555LE),
    packed("bgr555", 3, 15, 16, 15, 16, 5, 0, FormatFlags::RGB, native::BGR555LE),
    packed("ayuv444", 4, 32, 32, 32, 32, 8, 0, FormatFlags::ALPHA, native::AYUV),
    planar3("yuv444p", 8, 24, 24, 0, 0, FormatFlags::PLANAR, native::YUV444P),
    planar3("yuv422p", 8, 16, 16, 1, 0, FormatFlags::PLANAR, native::YUV422P),
    planar3("yuv420p", 8, 12, 12, 1, 1, FormatFlags::PLANAR, native::YUV420P),
    planar3("yuv411p", 8, 12, 12, 2, 0, FormatFlags::PLANAR, native::YUV411P),
    planar3("yuv410p", 8, 9, 9, 2, 2, FormatFlags::PLANAR, native::YUV410P),
    planar3("yv12", 8, 12, 12, 1, 1, FormatFlags::PLANAR, native::NONE),
    packed("uyvy", 3, 24, 16, 16, 16, 8, 1, NONE, native::UYVY422),
    packed("vyuy", 3, 24, 16, 16, 16, 8, 1, NONE, native::NONE),
    packed("yuyv", 3, 24, 16, 16, 16, 8, 1, NONE, native::YUYV422),
    packed("yvyu", 3, 24, 16, 16, 16, 8, 1, NONE, native::YVYU422),
    semi_planar("nv12", native::NV12),
    semi_planar("nv21", native::NV21),
    planar3("imc1", 8, 12, 12, 1, 1, FormatFlags::PLANAR, native::NONE),
    planar3("imc2", 8, 12, 12, 1, 1, FormatFlags::PLANAR, native::NONE),
    planar3("imc3", 8, 12, 12, 1, 1, FormatFlags::PLANAR, native::NONE),
    planar3("imc4", 8, 12, 12, 1, 1, FormatFlags::PLANAR, native::NONE),
    packed("y8", 1, 8, 8, 8, 8, 8, 0, FormatFlags::PSEUDO_PALETTE, native::GRAY8),
    packed("y16", 1, 16, 16, 16, 16, 16, 0, NONE, native::GRAY16LE),
    planar3("yuvj420p", 8, 12, 12, 1, 1, FormatFlags::PLANAR, native::YUVJ420P),
    packed("pal8", 1, 8, 8, 8, 8, 8, 0, FormatFlags::PALETTE, native::PAL8),
    packed("monowhite", 1, 1, 1, 1, 1, 1, 0, FormatFlags::BITSTREAM, native::MONOWHITE),
    packed("monoblack", 1, 1, 1, 1, 1, 1, 0, FormatFlags::BITSTREAM, native::MONOBLACK),
    planar3("yuv420p9le", 9, 13, 24, 1, 1, FormatFlags::PLANAR, native::YUV420P9LE),
    planar3("yuv422p9le", 9, 18, 32, 1, 0, FormatFlags::PLANAR, native::YUV422P9LE),
    planar3("yuv444p9le", 9, 27, 48, 0, 0, FormatFlags::PLANAR, native::YUV444P9LE),
    planar3("yuv420p10le", 10, 15, 24, 1, 1, FormatFlags::PLANAR, native::YUV420P10LE),
    planar3("yuv422p10le", 10, 20, 32, 1, 0, FormatFlags::PLANAR, native::YUV422P10LE),
    planar3("yuv444p10le", 10, 30, 48, 0, 0, FormatFlags::PLANAR, native::YUV444P10LE),
    planar3("yuv420p12le", 12, 18, 24, 1, 1, FormatFlags::PLANAR, native::YUV420P12LE),
    planar3("yuv422p12le", 12, 24, 32, 1, 0, FormatFlags::PLANAR, native::YUV422P12LE),
    planar3("yuv444p12le", 12, 36, 48, 0, 0, FormatFlags::PLANAR, native::YUV444P12LE),
    planar3("yuv420p14le", 14, 21, 24, 1, 1, FormatFlags::PLANAR, native::YUV420P14LE),
    planar3("yuv422p14le", 14, 28, 32, 1, 0, FormatFlags::PLANAR, native::YUV422P14LE),
    planar3("yuv444p14le", 14, 42, 48, 0, 0, FormatFlags::PLANAR, native::YUV444P14LE),
    planar3("yuv420p16le", 16, 24, 24, 1, 1, FormatFlags::PLANAR, native::YUV420P16LE),
    planar3("yuv422p16le", 16, 32, 32, 1, 0, FormatFlags::PLANAR, native::YUV422P16LE),
    planar3("yuv444p16le", 16, 48, 48, 0, 0, FormatFlags::PLANAR, native::YUV444P16LE),
    planar3("yuv420p9be", 9, 13, 24, 1, 1, PLANAR_BE, native::YUV420P9BE),
    planar3("yuv422p9be", 9, 18, 32, 1, 0, PLANAR_BE, native::YUV422P9BE),
    planar3("yuv444p9be", 9, 27, 48, 0, 0, PLANAR_BE, native::YUV444P9BE),
    planar3("yuv420p10be", 10, 15, 24, 1, 1, PLANAR_BE, native::YUV420P10BE),
    planar3("yuv422p10be", 10, 20, 32, 1, 0, PLANAR_BE, native::YUV422P10BE),
    planar3("yuv444p10be", 10, 30, 48, 0, 0, PLANAR_BE, native::YUV444P10BE),
    planar3("yuv420p12be", 12, 18, 24, 1, 1, PLANAR_BE, native::YUV420P12BE),
    planar3("yuv422p12be", 12, 24, 32, 1, 0, PLANAR_BE, native::YUV422P12BE),
    planar3("yuv444p12be", 12, 36, 48, 0, 0, PLANAR_BE, native::YUV444P12BE),
    planar3("yuv420p14be", 14, 21, 24, 1, 1, PLANAR_BE, native::YUV420P14BE),
    planar3("yuv422p14be", 14, 28, 32, 1, 0, PLANAR_BE, native::YUV422P14BE),
    planar3("yuv444p14be", 14, 42, 48, 0, 0, PLANAR_BE, native::YUV444P14BE),
    planar3("yuv420p16be", 16, 24, 24, 1, 1, PLANAR_BE, native::YUV420P16BE),
    planar3("yuv422p16be", 16, 32, 32, 1, 0, PLANAR_BE, native::YUV422P16BE),
    planar3("yuv444p16be", 16, 48, 48, 0, 0, PLANAR_BE, native::YUV444P16BE),
    packed("rgb48", 3, 48, 48, 48, 48, 16, 0, FormatFlags::RGB, native::NONE),
    packed("rgb48le", 3, 48, 48, 48, 48, 16, 0, FormatFlags::RGB, native::RGB48LE),
    packed("rgb48be", 3, 48, 48, 48, 48, 16, 0, RGB_BE, native::RGB48BE),
    packed("bgr48", 3, 48, 48, 48, 48, 16, 0, FormatFlags::RGB, native::NONE),
    packed("bgr48le", 3, 48, 48, 48, 48, 16, 0, FormatFlags::RGB, native::BGR48LE),
    packed("bgr48be", 3, 48, 48, 48, 48, 16, 0, RGB_BE, native::BGR48BE),
    packed("rgba64", 4, 64, 64, 64, 64, 16, 0, RGBA_FLAGS, native::NONE),
    packed("rgba64le", 4, 64, 64, 64, 64, 16, 0, RGBA_FLAGS, native::RGBA64LE),
    packed("rgba64be", 4, 64, 64, 64, 64, 16, 0, RGBA_BE, native::RGBA64BE),
    packed("bgra64", 4, 64, 64, 64, 64, 16, 0, RGBA_FLAGS, native::NONE),
    packed("bgra64le", 4, 64, 64, 64, 64, 16, 0, RGBA_FLAGS, native::BGRA64LE),
    packed("bgra64be", 4, 64, 64, 64, 64, 16, 0, RGBA_BE, native::BGRA64BE),
    packed("vyu", 3, 24, 24, 24, 24, 8, 0, NONE, native::NONE),
    packed("xyz12", 3, 36, 48, 36, 48, 12, 0, FormatFlags::XYZ, native::NONE),
    packed("xyz12le", 3, 36, 48, 36, 48, 12, 0, FormatFlags::XYZ, native::XYZ12LE),
    packed("xyz12be", 3, 36, 48, 36, 48, 12, 0, XYZ_BE, native::XYZ12BE),
    hw_surface("d3d11", native::D3D11VA_VLD),
    hw_surface("dxva2", native::DXVA2_VLD),
    hw_surface("vaapi", native::VAAPI_VLD),
    hw_surface("vdpau", native::VDPAU),
];

/// All catalogued formats in table order, for iteration in tests and tools.
pub static ALL_FORMATS: [PixelFormat; 85] = [
    PixelFormat::Argb32,
    PixelFormat::Bgra32,
    PixelFormat::Abgr32,
    PixelFormat::Rgba32,
    PixelFormat::Rgb32,
    PixelFormat::Bgr32,
    PixelFormat::Rgb24,
    PixelFormat::Bgr24,
    PixelFormat::Rgb565,
    PixelFormat::Bgr565,
    PixelFormat::Rgb555,
    PixelFormat::Bgr555,
    PixelFormat::Ayuv444,
    PixelFormat::Yuv444P,
    PixelFormat::Yuv422P,
    PixelFormat::Yuv420P,
    PixelFormat::Yuv411P,
    PixelFormat::Yuv410P,
    PixelFormat::Yv12,
    PixelFormat::Uyvy,
    PixelFormat::Vyuy,
    PixelFormat::Yuyv,
    PixelFormat::Yvyu,
    PixelFormat::Nv12,
    PixelFormat::Nv21,
    PixelFormat::Imc1,
    PixelFormat::Imc2,
    PixelFormat::Imc3,
    PixelFormat::Imc4,
    PixelFormat::Y8,
    PixelFormat::Y16,
    PixelFormat::Jpeg,
    PixelFormat::Pal8,
    PixelFormat::MonoWhite,
    PixelFormat::MonoBlack,
    PixelFormat::Yuv420P9Le,
    PixelFormat::Yuv422P9Le,
    PixelFormat::Yuv444P9Le,
    PixelFormat::Yuv420P10Le,
    PixelFormat::Yuv422P10Le,
    PixelFormat::Yuv444P10Le,
    PixelFormat::Yuv420P12Le,
    PixelFormat::Yuv422P12Le,
    PixelFormat::Yuv444P12Le,
    PixelFormat::Yuv420P14Le,
    PixelFormat::Yuv422P14Le,
    PixelFormat::Yuv444P14Le,
    PixelFormat::Yuv420P16Le,
    PixelFormat::Yuv422P16Le,
    PixelFormat::Yuv444P16Le,
    PixelFormat::Yuv420P9Be,
    PixelFormat::Yuv422P9Be,
    PixelFormat::Yuv444P9Be,
    PixelFormat::Yuv420P10Be,
    PixelFormat::Yuv422P10Be,
    PixelFormat::Yuv444P10Be,
    PixelFormat::Yuv420P12Be,
    PixelFormat::Yuv422P12Be,
    PixelFormat::Yuv444P12Be,
    PixelFormat::Yuv420P14Be,
    PixelFormat::Yuv422P14Be,
    PixelFormat::Yuv444P14Be,
    PixelFormat::Yuv420P16Be,
    PixelFormat::Yuv422P16Be,
    PixelFormat::Yuv444P16Be,
    PixelFormat::Rgb48,
    PixelFormat::Rgb48Le,
    PixelFormat::Rgb48Be,
    PixelFormat::Bgr48,
    PixelFormat::Bgr48Le,
    PixelFormat::Bgr48Be,
    PixelFormat::Rgba64,
    PixelFormat::Rgba64Le,
    PixelFormat::Rgba64Be,
    PixelFormat::Bgra64,
    PixelFormat::Bgra64Le,
    PixelFormat::Bgra64Be,
    PixelFormat::Vyu,
    PixelFormat::Xyz12,
    PixelFormat::Xyz12Le,
    PixelFormat::Xyz12Be,
    PixelFormat::D3d11,
    PixelFormat::Dxva2,
    PixelFormat::Vaapi,
    PixelFormat::Vdpau,
];

impl PixelFormat {
    /// Descriptor row for this format, `None` for `Invalid` / `User`.
    pub fn descriptor(&self) -> Option<&'static PixelFormatDescriptor> {
        let idx = *self as usize;
        FORMAT_TABLE.get(idx)
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, PixelFormat::Invalid | PixelFormat::User)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PixelFormat::Invalid => "invalid",
            PixelFormat::User => "user",
            f => f.descriptor().map(|d| d.name).unwrap_or("invalid"),
        }
    }

    /// Total component count, 0 for invalid formats.
    pub fn channels(&self) -> i32 {
        self.descriptor().map(|d| d.channels as i32).unwrap_or(0)
    }

    /// Component count in one plane, 0 for out-of-range planes.
    pub fn plane_channels(&self, plane: i32) -> i32 {
        match self.descriptor() {
            Some(d) if (0..d.planes as i32).contains(&plane) => {
                d.channels_per_plane[plane as usize] as i32
            }
            _ => 0,
        }
    }

    /// Plane count, -1 for invalid formats.
    pub fn plane_count(&self) -> i32 {
        self.descriptor().map(|d| d.planes as i32).unwrap_or(-1)
    }

    /// Global bits per pixel with chroma subsampling applied
    /// (e.g. YUV420P: 12, NV12: 12, UYVY: 16).
    pub fn bits_per_pixel(&self) -> i32 {
        self.descriptor().map(|d| d.bpp as i32).unwrap_or(0)
    }

    /// Sum of component depths stored in one plane
    /// (e.g. NV12 plane 1: 16, UYVY plane 0: 24).
    pub fn plane_bits_per_pixel(&self, plane: i32) -> i32 {
        match self.descriptor() {
            Some(d) if (0..d.planes as i32).contains(&plane) => {
                d.depth_per_plane[plane as usize] as i32
            }
            _ => 0,
        }
    }

    /// Bits per pixel counting storage padding (e.g. yuv420p10le: 24).
    pub fn bits_per_pixel_padded(&self) -> i32 {
        self.descriptor().map(|d| d.bpp_padded as i32).unwrap_or(0)
    }

    pub fn bytes_per_pixel(&self) -> i32 {
        self.bits_per_pixel() / 8
    }

    pub fn plane_bytes_per_pixel(&self, plane: i32) -> i32 {
        self.plane_bits_per_pixel(plane) / 8
    }

    /// Bits per component, 0 when components have uneven depths.
    pub fn bits_per_component(&self) -> i32 {
        self.descriptor().map(|d| d.bpc as i32).unwrap_or(0)
    }

    /// Line size in bytes of one plane for the given luma width.
    pub fn bytes_per_line(&self, width: i32, plane: i32) -> i32 {
        let Some(d) = self.descriptor() else { return 0 };
        if !(0..d.planes as i32).contains(&plane) || width <= 0 {
            return 0;
        }
        let w = self.plane_width(width, plane) as i64;
        ((w * d.step_bits[plane as usize] as i64 + 7) / 8) as i32
    }

    /// Chroma sample count for the given luma width.
    pub fn chroma_width(&self, luma_width: i32) -> i32 {
        match self.descriptor() {
            Some(d) => luma_width >> d.log2_chroma_w,
            None => 0,
        }
    }

    pub fn chroma_height(&self, luma_height: i32) -> i32 {
        match self.descriptor() {
            Some(d) => luma_height >> d.log2_chroma_h,
            None => 0,
        }
    }

    /// Plane width for the given luma width; the luma width itself for
    /// plane <= 0.
    pub fn plane_width(&self, luma_width: i32, plane: i32) -> i32 {
        if plane <= 0 {
            luma_width
        } else {
            self.chroma_width(luma_width)
        }
    }

    pub fn plane_height(&self, luma_height: i32, plane: i32) -> i32 {
        if plane <= 0 {
            luma_height
        } else {
            self.chroma_height(luma_height)
        }
    }

    /// Plane width as a fraction of the luma width; 1.0 for plane <= 0.
    pub fn normalized_width(&self, plane: i32) -> f64 {
        if plane <= 0 {
            return 1.0;
        }
        match self.descriptor() {
            Some(d) => 1.0 / (1 << d.log2_chroma_w) as f64,
            None => 0.0,
        }
    }

    pub fn normalized_height(&self, plane: i32) -> f64 {
        if plane <= 0 {
            return 1.0;
        }
        match self.descriptor() {
            Some(d) => 1.0 / (1 << d.log2_chroma_h) as f64,
            None => 0.0,
        }
    }

    fn has_flag(&self, flag: FormatFlags) -> bool {
        self.descriptor().is_some_and(|d| d.flags.contains(flag))
    }

    pub fn is_big_endian(&self) -> bool {
        self.has_flag(FormatFlags::BIG_ENDIAN)
    }

    pub fn has_palette(&self) -> bool {
        self.has_flag(FormatFlags::PALETTE)
    }

    pub fn is_pseudo_paletted(&self) -> bool {
        self.has_flag(FormatFlags::PSEUDO_PALETTE)
    }

    /// All values of a component are bit-wise packed end to end.
    pub fn is_bit_stream(&self) -> bool {
        self.has_flag(FormatFlags::BITSTREAM)
    }

    /// Opaque hardware surface format.
    pub fn is_hw_accelerated(&self) -> bool {
        self.has_flag(FormatFlags::HW_ACCEL)
    }

    /// True for planar and semi-planar layouts.
    pub fn is_planar(&self) -> bool {
        self.has_flag(FormatFlags::PLANAR)
    }

    pub fn is_rgb(&self) -> bool {
        self.has_flag(FormatFlags::RGB)
    }

    pub fn is_xyz(&self) -> bool {
        self.has_flag(FormatFlags::XYZ)
    }

    pub fn has_alpha(&self) -> bool {
        self.has_flag(FormatFlags::ALPHA)
    }

    /// Map a codec-engine tag to a pixel format; unknown tags yield
    /// [`PixelFormat::Invalid`].
    pub fn from_native(tag: i32) -> PixelFormat {
        if tag == native::NONE {
            return PixelFormat::Invalid;
        }
        for (i, d) in FORMAT_TABLE.iter().enumerate() {
            if d.native == tag {
                return ALL_FORMATS[i];
            }
        }
        PixelFormat::Invalid
    }

    /// Map to the codec-engine tag. Native-endian alias formats resolve to
    /// their little-endian variant; unmapped formats yield [`native::NONE`].
    pub fn to_native(self) -> i32 {
        match self {
            PixelFormat::Rgb32 => native::BGRA,
            PixelFormat::Bgr32 => native::RGBA,
            PixelFormat::Rgb48 => native::RGB48LE,
            PixelFormat::Bgr48 => native::BGR48LE,
            PixelFormat::Rgba64 => native::RGBA64LE,
            PixelFormat::Bgra64 => native::BGRA64LE,
            PixelFormat::Xyz12 => native::XYZ12LE,
            f => f.descriptor().map(|d| d.native).unwrap_or(native::NONE),
        }
    }

    /// Look up a format by its catalogue name (`"nv12"`, `"yuv420p10le"`).
    pub fn from_name(name: &str) -> PixelFormat {
        for (i, d) in FORMAT_TABLE.iter().enumerate() {
            if d.name == name {
                return ALL_FORMATS[i];
            }
        }
        PixelFormat::Invalid
    }

    /// Every format the codec engine can express directly.
    pub fn native_formats() -> Vec<PixelFormat> {
        ALL_FORMATS
            .iter()
            .copied()
            .filter(|f| f.descriptor().map(|d| d.native).unwrap_or(native::NONE) != native::NONE)
            .collect()
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat::Invalid
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_counts() {
        assert_eq!(PixelFormat::Yuv420P.plane_count(), 3);
        assert_eq!(PixelFormat::Nv12.plane_count(), 2);
        assert_eq!(PixelFormat::Rgb24.plane_count(), 1);
        assert_eq!(PixelFormat::Vaapi.plane_count(), 0);
        assert_eq!(PixelFormat::Invalid.plane_count(), -1);
        assert_eq!(PixelFormat::User.plane_count(), -1);
    }

    #[test]
    fn test_bits_per_pixel() {
        assert_eq!(PixelFormat::Yuv420P.bits_per_pixel(), 12);
        assert_eq!(PixelFormat::Nv12.bits_per_pixel(), 12);
        assert_eq!(PixelFormat::Uyvy.bits_per_pixel(), 16);
        assert_eq!(PixelFormat::Yuv420P10Le.bits_per_pixel(), 15);
        assert_eq!(PixelFormat::Rgba32.bits_per_pixel(), 32);
        // per-plane depth sums
        assert_eq!(PixelFormat::Nv12.plane_bits_per_pixel(1), 16);
        assert_eq!(PixelFormat::Uyvy.plane_bits_per_pixel(0), 24);
        assert_eq!(PixelFormat::Yuv420P.plane_bits_per_pixel(2), 8);
    }

    #[test]
    fn test_bits_per_component() {
        assert_eq!(PixelFormat::Yuv420P.bits_per_component(), 8);
        assert_eq!(PixelFormat::Yuv420P10Le.bits_per_component(), 10);
        assert_eq!(PixelFormat::Rgb565.bits_per_component(), 0);
        assert_eq!(PixelFormat::Xyz12Le.bits_per_component(), 12);
    }

    #[test]
    fn test_bytes_per_line() {
        assert_eq!(PixelFormat::Yuv420P.bytes_per_line(1920, 0), 1920);
        assert_eq!(PixelFormat::Yuv420P.bytes_per_line(1920, 1), 960);
        // NV12 chroma plane: half width, 16 bits per pixel
        assert_eq!(PixelFormat::Nv12.bytes_per_line(1920, 1), 1920);
        assert_eq!(PixelFormat::Uyvy.bytes_per_line(1920, 0), 3840);
        assert_eq!(PixelFormat::Yuv420P10Le.bytes_per_line(1920, 0), 3840);
        assert_eq!(PixelFormat::MonoWhite.bytes_per_line(17, 0), 3);
        assert_eq!(PixelFormat::Rgb24.bytes_per_line(1920, 3), 0);
    }

    #[test]
    fn test_chroma_dimensions() {
        assert_eq!(PixelFormat::Yuv420P.chroma_width(1920), 960);
        assert_eq!(PixelFormat::Yuv420P.chroma_height(1080), 540);
        assert_eq!(PixelFormat::Yuv422P.chroma_height(1080), 1080);
        assert_eq!(PixelFormat::Yuv410P.chroma_width(1920), 480);
        assert_eq!(PixelFormat::Yuv444P.chroma_width(1920), 1920);
    }

    #[test]
    fn test_normalized_dimensions() {
        assert_eq!(PixelFormat::Yuv420P.normalized_width(0), 1.0);
        assert_eq!(PixelFormat::Yuv420P.normalized_width(1), 0.5);
        assert_eq!(PixelFormat::Yuv420P.normalized_height(2), 0.5);
        assert_eq!(PixelFormat::Yuv444P.normalized_width(1), 1.0);
    }

    #[test]
    fn test_flags() {
        assert!(PixelFormat::Nv12.is_planar());
        assert!(PixelFormat::Yuv420P.is_planar());
        assert!(!PixelFormat::Uyvy.is_planar());
        assert!(PixelFormat::Rgba32.is_rgb());
        assert!(PixelFormat::Rgba32.has_alpha());
        assert!(!PixelFormat::Rgb24.has_alpha());
        assert!(PixelFormat::Yuv420P10Be.is_big_endian());
        assert!(!PixelFormat::Yuv420P10Le.is_big_endian());
        assert!(PixelFormat::Vaapi.is_hw_accelerated());
        assert!(PixelFormat::Pal8.has_palette());
        assert!(PixelFormat::Y8.is_pseudo_paletted());
        assert!(PixelFormat::MonoWhite.is_bit_stream());
        assert!(PixelFormat::Xyz12Le.is_xyz());
    }

    #[test]
    fn test_hw_formats_have_no_layout() {
        for f in [
            PixelFormat::D3d11,
            PixelFormat::Dxva2,
            PixelFormat::Vaapi,
            PixelFormat::Vdpau,
        ] {
            assert!(f.is_hw_accelerated());
            assert_eq!(f.plane_count(), 0);
            assert_eq!(f.bits_per_pixel(), 0);
        }
    }

    #[test]
    fn test_native_round_trip() {
        for f in PixelFormat::native_formats() {
            let tag = f.to_native();
            assert_ne!(tag, native::NONE);
            assert_eq!(PixelFormat::from_native(tag), f, "round trip for {}", f);
        }
    }

    #[test]
    fn test_native_endian_aliases() {
        // aliases resolve to a concrete variant on the engine side
        assert_eq!(PixelFormat::Rgb32.to_native(), native::BGRA);
        assert_eq!(PixelFormat::Rgb48.to_native(), native::RGB48LE);
        assert_eq!(PixelFormat::from_native(native::BGRA), PixelFormat::Bgra32);
        assert_eq!(PixelFormat::from_native(native::NONE), PixelFormat::Invalid);
        assert_eq!(PixelFormat::from_native(9999), PixelFormat::Invalid);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(PixelFormat::from_name("nv12"), PixelFormat::Nv12);
        assert_eq!(
            PixelFormat::from_name("yuv420p10le"),
            PixelFormat::Yuv420P10Le
        );
        assert_eq!(PixelFormat::from_name("nope"), PixelFormat::Invalid);
    }

    #[test]
    fn test_channels_sum() {
        for f in ALL_FORMATS {
            let d = f.descriptor().unwrap();
            let sum: u8 = d.channels_per_plane.iter().sum();
            assert_eq!(sum, d.channels, "channel sum for {}", f);
        }
    }
}
