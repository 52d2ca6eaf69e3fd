//! FourCC chroma tags and per-chroma plane layout descriptions.
//!
//! A chroma tag identifies a pixel layout family. It is narrower than
//! [`PixelFormat`](crate::pixel::PixelFormat): endianness variants of the
//! same layout collapse onto one tag, and opaque hardware surfaces get a tag
//! of their own.

use crate::pixel::PixelFormat;
use std::fmt;

/// A four-character layout family tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub u32);

impl FourCc {
    pub const fn new(tag: &[u8; 4]) -> Self {
        FourCc(u32::from_le_bytes([tag[0], tag[1], tag[2], tag[3]]))
    }

    /// The all-zero tag marking "no chroma".
    pub const NULL: FourCc = FourCc(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn bytes(&self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({})", self)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.bytes() {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

pub const CHROMA_I420: FourCc = FourCc::new(b"I420");
pub const CHROMA_YV12: FourCc = FourCc::new(b"YV12");
pub const CHROMA_I422: FourCc = FourCc::new(b"I422");
pub const CHROMA_I444: FourCc = FourCc::new(b"I444");
pub const CHROMA_I411: FourCc = FourCc::new(b"I411");
pub const CHROMA_I410: FourCc = FourCc::new(b"I410");
pub const CHROMA_NV12: FourCc = FourCc::new(b"NV12");
pub const CHROMA_NV21: FourCc = FourCc::new(b"NV21");
pub const CHROMA_UYVY: FourCc = FourCc::new(b"UYVY");
pub const CHROMA_YUYV: FourCc = FourCc::new(b"YUY2");
pub const CHROMA_VYUY: FourCc = FourCc::new(b"VYUY");
pub const CHROMA_YVYU: FourCc = FourCc::new(b"YVYU");
pub const CHROMA_GREY: FourCc = FourCc::new(b"GREY");
pub const CHROMA_Y16: FourCc = FourCc::new(b"Y16 ");
pub const CHROMA_RGB24: FourCc = FourCc::new(b"RV24");
pub const CHROMA_RGB32: FourCc = FourCc::new(b"RV32");
pub const CHROMA_RGBA: FourCc = FourCc::new(b"RGBA");
pub const CHROMA_BGRA: FourCc = FourCc::new(b"BGRA");
pub const CHROMA_RGB48: FourCc = FourCc::new(b"RV48");
pub const CHROMA_RGBA64: FourCc = FourCc::new(b"RV64");
pub const CHROMA_XYZ12: FourCc = FourCc::new(b"XY12");
/// 9-bit planar 4:2:0 / 4:2:2 / 4:4:4.
pub const CHROMA_I420_9: FourCc = FourCc::new(b"I09L");
pub const CHROMA_I422_9: FourCc = FourCc::new(b"I29L");
pub const CHROMA_I444_9: FourCc = FourCc::new(b"I49L");
/// 10-bit planar.
pub const CHROMA_I420_10: FourCc = FourCc::new(b"I0AL");
pub const CHROMA_I422_10: FourCc = FourCc::new(b"I2AL");
pub const CHROMA_I444_10: FourCc = FourCc::new(b"I4AL");
/// 12-bit planar.
pub const CHROMA_I420_12: FourCc = FourCc::new(b"I0CL");
pub const CHROMA_I422_12: FourCc = FourCc::new(b"I2CL");
pub const CHROMA_I444_12: FourCc = FourCc::new(b"I4CL");
/// 14-bit planar.
pub const CHROMA_I420_14: FourCc = FourCc::new(b"I0EL");
pub const CHROMA_I422_14: FourCc = FourCc::new(b"I2EL");
pub const CHROMA_I444_14: FourCc = FourCc::new(b"I4EL");
/// 16-bit planar.
pub const CHROMA_I420_16: FourCc = FourCc::new(b"I0FL");
pub const CHROMA_I422_16: FourCc = FourCc::new(b"I2FL");
pub const CHROMA_I444_16: FourCc = FourCc::new(b"I4FL");
/// Opaque hardware surfaces.
pub const CHROMA_D3D11_OPAQUE: FourCc = FourCc::new(b"DX11");
pub const CHROMA_D3D11_OPAQUE_10: FourCc = FourCc::new(b"DX10");
pub const CHROMA_DXVA2_OPAQUE: FourCc = FourCc::new(b"DXA9");
pub const CHROMA_VAAPI_OPAQUE: FourCc = FourCc::new(b"VAOP");
pub const CHROMA_VAAPI_OPAQUE_10: FourCc = FourCc::new(b"VA10");
pub const CHROMA_VDPAU_OPAQUE: FourCc = FourCc::new(b"VDPA");

/// Width or height of a plane as a fraction of the frame dimension.
#[derive(Debug, Clone, Copy)]
pub struct PlaneRatio {
    pub num: u32,
    pub den: u32,
}

const fn ratio(num: u32, den: u32) -> PlaneRatio {
    PlaneRatio { num, den }
}

/// Memory layout of one chroma family.
#[derive(Debug, Clone, Copy)]
pub struct ChromaDescription {
    pub fourcc: FourCc,
    pub plane_count: u8,
    /// Per-plane (width, height) ratios relative to the frame.
    pub p: [(PlaneRatio, PlaneRatio); 4],
    /// Bytes per sample.
    pub pixel_size: u8,
    pub pixel_bits: u8,
    /// Whether this family carries YUV data (drives the default color range).
    pub yuv: bool,
}

const FULL: (PlaneRatio, PlaneRatio) = (ratio(1, 1), ratio(1, 1));
const HALF: (PlaneRatio, PlaneRatio) = (ratio(1, 2), ratio(1, 2));
const HALF_W: (PlaneRatio, PlaneRatio) = (ratio(1, 2), ratio(1, 1));
const QUARTER_W: (PlaneRatio, PlaneRatio) = (ratio(1, 4), ratio(1, 1));
const QUARTER: (PlaneRatio, PlaneRatio) = (ratio(1, 4), ratio(1, 4));
const HALF_H: (PlaneRatio, PlaneRatio) = (ratio(1, 1), ratio(1, 2));
const UNUSED: (PlaneRatio, PlaneRatio) = (ratio(0, 1), ratio(0, 1));

const fn planar_desc(
    fourcc: FourCc,
    chroma: (PlaneRatio, PlaneRatio),
    pixel_size: u8,
    pixel_bits: u8,
) -> ChromaDescription {
    ChromaDescription {
        fourcc,
        plane_count: 3,
        p: [FULL, chroma, chroma, UNUSED],
        pixel_size,
        pixel_bits,
        yuv: true,
    }
}

const fn packed_desc(fourcc: FourCc, pixel_size: u8, yuv: bool) -> ChromaDescription {
    ChromaDescription {
        fourcc,
        plane_count: 1,
        p: [FULL, UNUSED, UNUSED, UNUSED],
        pixel_size,
        pixel_bits: pixel_size * 8,
        yuv,
    }
}

const fn opaque_desc(fourcc: FourCc) -> ChromaDescription {
    ChromaDescription {
        fourcc,
        plane_count: 0,
        p: [UNUSED; 4],
        pixel_size: 0,
        pixel_bits: 0,
        yuv: true,
    }
}

static CHROMA_TABLE: [ChromaDescription; 36] = [
    planar_desc(CHROMA_I420, HALF, 1, 8),
    planar_desc(CHROMA_YV12, HALF, 1, 8),
    planar_desc(CHROMA_I422, HALF_W, 1, 8),
    planar_desc(CHROMA_I444, FULL, 1, 8),
    planar_desc(CHROMA_I411, QUARTER_W, 1, 8),
    planar_desc(CHROMA_I410, QUARTER, 1, 8),
    planar_desc(CHROMA_I420_9, HALF, 2, 9),
    planar_desc(CHROMA_I422_9, HALF_W, 2, 9),
    planar_desc(CHROMA_I444_9, FULL, 2, 9),
    planar_desc(CHROMA_I420_10, HALF, 2, 10),
    planar_desc(CHROMA_I422_10, HALF_W, 2, 10),
    planar_desc(CHROMA_I444_10, FULL, 2, 10),
    planar_desc(CHROMA_I420_12, HALF, 2, 12),
    planar_desc(CHROMA_I422_12, HALF_W, 2, 12),
    planar_desc(CHROMA_I444_12, FULL, 2, 12),
    planar_desc(CHROMA_I420_14, HALF, 2, 14),
    planar_desc(CHROMA_I422_14, HALF_W, 2, 14),
    planar_desc(CHROMA_I444_14, FULL, 2, 14),
    planar_desc(CHROMA_I420_16, HALF, 2, 16),
    planar_desc(CHROMA_I422_16, HALF_W, 2, 16),
    planar_desc(CHROMA_I444_16, FULL, 2, 16),
    ChromaDescription {
        fourcc: CHROMA_NV12,
        plane_count: 2,
        p: [FULL, HALF_H, UNUSED, UNUSED],
        pixel_size: 1,
        pixel_bits: 8,
        yuv: true,
    },
    ChromaDescription {
        fourcc: CHROMA_NV21,
        plane_count: 2,
        p: [FULL, HALF_H, UNUSED, UNUSED],
        pixel_size: 1,
        pixel_bits: 8,
        yuv: true,
    },
    packed_desc(CHROMA_UYVY, 2, true),
    packed_desc(CHROMA_YUYV, 2, true),
    packed_desc(CHROMA_VYUY, 2, true),
    packed_desc(CHROMA_YVYU, 2, true),
    packed_desc(CHROMA_GREY, 1, true),
    packed_desc(CHROMA_Y16, 2, true),
    packed_desc(CHROMA_RGB24, 3, false),
    packed_desc(CHROMA_RGB32, 4, false),
    packed_desc(CHROMA_RGBA, 4, false),
    packed_desc(CHROMA_BGRA, 4, false),
    packed_desc(CHROMA_RGB48, 6, false),
    packed_desc(CHROMA_RGBA64, 8, false),
    packed_desc(CHROMA_XYZ12, 6, false),
];

static HW_CHROMA_TABLE: [ChromaDescription; 6] = [
    opaque_desc(CHROMA_D3D11_OPAQUE),
    opaque_desc(CHROMA_D3D11_OPAQUE_10),
    opaque_desc(CHROMA_DXVA2_OPAQUE),
    opaque_desc(CHROMA_VAAPI_OPAQUE),
    opaque_desc(CHROMA_VAAPI_OPAQUE_10),
    opaque_desc(CHROMA_VDPAU_OPAQUE),
];

/// Look up the layout description for a chroma tag.
pub fn chroma_description(fourcc: FourCc) -> Option<&'static ChromaDescription> {
    CHROMA_TABLE
        .iter()
        .chain(HW_CHROMA_TABLE.iter())
        .find(|d| d.fourcc == fourcc)
}

/// Whether this chroma family carries YUV data. Unknown tags count as RGB,
/// matching the "full range by default" rule for non-YUV content.
pub fn is_yuv(fourcc: FourCc) -> bool {
    chroma_description(fourcc).map(|d| d.yuv).unwrap_or(false)
}

/// Software chroma tag for a pixel format, `None` when the format has no
/// CPU-visible layout family (HW surfaces, palette, bitstream formats).
pub fn chroma_from_pixel(format: PixelFormat) -> Option<FourCc> {
    use PixelFormat as P;
    let fourcc = match format {
        P::Yuv420P | P::Jpeg => CHROMA_I420,
        P::Yv12 | P::Imc1 | P::Imc2 | P::Imc3 | P::Imc4 => CHROMA_YV12,
        P::Yuv422P => CHROMA_I422,
        P::Yuv444P => CHROMA_I444,
        P::Yuv411P => CHROMA_I411,
        P::Yuv410P => CHROMA_I410,
        P::Nv12 => CHROMA_NV12,
        P::Nv21 => CHROMA_NV21,
        P::Uyvy => CHROMA_UYVY,
        P::Yuyv => CHROMA_YUYV,
        P::Vyuy => CHROMA_VYUY,
        P::Yvyu => CHROMA_YVYU,
        P::Y8 => CHROMA_GREY,
        P::Y16 => CHROMA_Y16,
        P::Yuv420P9Le | P::Yuv420P9Be => CHROMA_I420_9,
        P::Yuv422P9Le | P::Yuv422P9Be => CHROMA_I422_9,
        P::Yuv444P9Le | P::Yuv444P9Be => CHROMA_I444_9,
        P::Yuv420P10Le | P::Yuv420P10Be => CHROMA_I420_10,
        P::Yuv422P10Le | P::Yuv422P10Be => CHROMA_I422_10,
        P::Yuv444P10Le | P::Yuv444P10Be => CHROMA_I444_10,
        P::Yuv420P12Le | P::Yuv420P12Be => CHROMA_I420_12,
        P::Yuv422P12Le | P::Yuv422P12Be => CHROMA_I422_12,
        P::Yuv444P12Le | P::Yuv444P12Be => CHROMA_I444_12,
        P::Yuv420P14Le | P::Yuv420P14Be => CHROMA_I420_14,
        P::Yuv422P14Le | P::Yuv422P14Be => CHROMA_I422_14,
        P::Yuv444P14Le | P::Yuv444P14Be => CHROMA_I444_14,
        P::Yuv420P16Le | P::Yuv420P16Be => CHROMA_I420_16,
        P::Yuv422P16Le | P::Yuv422P16Be => CHROMA_I422_16,
        P::Yuv444P16Le | P::Yuv444P16Be => CHROMA_I444_16,
        P::Rgb24 | P::Bgr24 | P::Vyu => CHROMA_RGB24,
        P::Rgb32 | P::Bgr32 => CHROMA_RGB32,
        P::Rgba32 | P::Abgr32 | P::Argb32 | P::Ayuv444 => CHROMA_RGBA,
        P::Bgra32 => CHROMA_BGRA,
        P::Rgb48 | P::Rgb48Le | P::Rgb48Be | P::Bgr48 | P::Bgr48Le | P::Bgr48Be => CHROMA_RGB48,
        P::Rgba64 | P::Rgba64Le | P::Rgba64Be | P::Bgra64 | P::Bgra64Le | P::Bgra64Be => {
            CHROMA_RGBA64
        }
        P::Xyz12 | P::Xyz12Le | P::Xyz12Be => CHROMA_XYZ12,
        _ => return None,
    };
    Some(fourcc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_display() {
        assert_eq!(CHROMA_I420.to_string(), "I420");
        assert_eq!(CHROMA_Y16.to_string(), "Y16 ");
    }

    #[test]
    fn test_chroma_description_lookup() {
        let d = chroma_description(CHROMA_I420).unwrap();
        assert_eq!(d.plane_count, 3);
        assert_eq!(d.pixel_size, 1);
        let d = chroma_description(CHROMA_NV12).unwrap();
        assert_eq!(d.plane_count, 2);
        // chroma plane of NV12 covers the full width in bytes
        assert_eq!(d.p[1].0.num, 1);
        assert_eq!(d.p[1].0.den, 1);
        assert_eq!(d.p[1].1.den, 2);
        assert!(chroma_description(FourCc::new(b"????")).is_none());
    }

    #[test]
    fn test_hw_chromas_are_opaque() {
        for tag in [CHROMA_VAAPI_OPAQUE, CHROMA_D3D11_OPAQUE, CHROMA_VDPAU_OPAQUE] {
            let d = chroma_description(tag).unwrap();
            assert_eq!(d.plane_count, 0);
            assert!(d.yuv);
        }
    }

    #[test]
    fn test_is_yuv() {
        assert!(is_yuv(CHROMA_I420));
        assert!(is_yuv(CHROMA_UYVY));
        assert!(!is_yuv(CHROMA_RGB24));
        assert!(!is_yuv(CHROMA_XYZ12));
        assert!(!is_yuv(FourCc::NULL));
    }

    #[test]
    fn test_chroma_from_pixel_collapses_endianness() {
        assert_eq!(
            chroma_from_pixel(PixelFormat::Yuv420P10Le),
            chroma_from_pixel(PixelFormat::Yuv420P10Be)
        );
        assert_eq!(chroma_from_pixel(PixelFormat::Nv12), Some(CHROMA_NV12));
        assert_eq!(chroma_from_pixel(PixelFormat::Vaapi), None);
        assert_eq!(chroma_from_pixel(PixelFormat::Invalid), None);
    }
}
