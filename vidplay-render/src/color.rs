//! Color conversion matrices.
//!
//! The fragment shader receives one combined 4x4 matrix: equalizer
//! adjustment in YUV space, range expansion, then the YUV to RGB transform
//! for the stream's color space. RGB-family inputs get the equalizer applied
//! directly in RGB.

use glam::Mat4;
use serde::{Deserialize, Serialize};
use vidplay_core::video_format::ColorSpace;

/// Picture equalizer parameters, each in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct VideoEq {
    pub brightness: f64,
    pub contrast: f64,
    pub hue: f64,
    pub saturation: f64,
}

impl VideoEq {
    pub fn clamped(&self) -> Self {
        let c = |v: f64| v.clamp(-1.0, 1.0);
        Self {
            brightness: c(self.brightness),
            contrast: c(self.contrast),
            hue: c(self.hue),
            saturation: c(self.saturation),
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

fn mat4_rows(rows: [[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(&rows).transpose()
}

/// YUV (centered chroma) to RGB for the given color space. BT.601 is the
/// fallback for unspecified metadata.
pub fn yuv_to_rgb_matrix(space: ColorSpace) -> Mat4 {
    let (rv, gu, gv, bu) = match space {
        ColorSpace::Bt709 => (1.5748, 0.1873, 0.4681, 1.8556),
        ColorSpace::Bt2020 => (1.4746, 0.16455, 0.57135, 1.8814),
        ColorSpace::Bt601 | ColorSpace::Unspecified => (1.402, 0.344136, 0.714136, 1.772),
    };
    mat4_rows([
        [1.0, 0.0, rv, 0.0],
        [1.0, -gu, -gv, 0.0],
        [1.0, bu, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Expand sampled values into centered-chroma YUV. Limited range rescales
/// the 16-235 / 16-240 window; full range only centers the chroma.
pub fn range_expansion_matrix(full_range: bool) -> Mat4 {
    if full_range {
        mat4_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, -0.5],
            [0.0, 0.0, 1.0, -0.5],
            [0.0, 0.0, 0.0, 1.0],
        ])
    } else {
        let ys = 255.0 / 219.0;
        let cs = 255.0 / 224.0;
        mat4_rows([
            [ys, 0.0, 0.0, -16.0 / 219.0],
            [0.0, cs, 0.0, -128.0 / 224.0],
            [0.0, 0.0, cs, -128.0 / 224.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

/// Equalizer adjustment operating on centered-chroma YUV.
pub fn eq_matrix_yuv(eq: &VideoEq) -> Mat4 {
    let eq = eq.clamped();
    let c = (1.0 + eq.contrast) as f32;
    let s = (1.0 + eq.saturation) as f32;
    let b = eq.brightness as f32;
    let (sin_h, cos_h) = ((std::f64::consts::PI * eq.hue) as f32).sin_cos();
    mat4_rows([
        [c, 0.0, 0.0, b],
        [0.0, c * s * cos_h, -c * s * sin_h, 0.0],
        [0.0, c * s * sin_h, c * s * cos_h, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Equalizer adjustment operating on RGB; hue is ignored for RGB sources.
pub fn eq_matrix_rgb(eq: &VideoEq) -> Mat4 {
    let eq = eq.clamped();
    let c = (1.0 + eq.contrast) as f32;
    let s = (1.0 + eq.saturation) as f32;
    let b = eq.brightness as f32;
    // saturation mixes toward BT.601 luma
    let (lr, lg, lb) = (0.299f32, 0.587f32, 0.114f32);
    mat4_rows([
        [(lr * (1.0 - s) + s) * c, lg * (1.0 - s) * c, lb * (1.0 - s) * c, b],
        [lr * (1.0 - s) * c, (lg * (1.0 - s) + s) * c, lb * (1.0 - s) * c, b],
        [lr * (1.0 - s) * c, lg * (1.0 - s) * c, (lb * (1.0 - s) + s) * c, b],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// The combined color conversion matrix the shader applies after the
/// channel map.
pub fn color_matrix(space: ColorSpace, full_range: bool, rgb_input: bool, eq: &VideoEq) -> Mat4 {
    if rgb_input {
        eq_matrix_rgb(eq)
    } else {
        yuv_to_rgb_matrix(space) * eq_matrix_yuv(eq) * range_expansion_matrix(full_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_bt709_coefficients() {
        let m = yuv_to_rgb_matrix(ColorSpace::Bt709);
        // red channel picks up 1.5748 * V
        let red = m * Vec4::new(0.0, 0.0, 1.0, 0.0);
        assert!((red.x - 1.5748).abs() < 1e-6);
        let m601 = yuv_to_rgb_matrix(ColorSpace::Bt601);
        assert_ne!(m, m601);
        assert_eq!(yuv_to_rgb_matrix(ColorSpace::Unspecified), m601);
    }

    #[test]
    fn test_limited_range_expands_black_level() {
        let m = range_expansion_matrix(false);
        // studio black (16/255, 128/255, 128/255) maps to the origin
        let black = m * Vec4::new(16.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0, 1.0);
        assert!(black.x.abs() < 1e-5);
        assert!(black.y.abs() < 1e-5);
        assert!(black.z.abs() < 1e-5);
        // studio white maps to 1.0
        let white = m * Vec4::new(235.0 / 255.0, 0.5, 0.5, 1.0);
        assert!((white.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_full_range_centers_chroma() {
        let m = range_expansion_matrix(true);
        let v = m * Vec4::new(0.5, 0.5, 0.5, 1.0);
        assert!((v.x - 0.5).abs() < 1e-6);
        assert!(v.y.abs() < 1e-6);
        assert!(v.z.abs() < 1e-6);
    }

    #[test]
    fn test_neutral_eq_is_identity() {
        let eq = VideoEq::default();
        assert_eq!(eq_matrix_yuv(&eq), Mat4::IDENTITY);
        let rgb = eq_matrix_rgb(&eq);
        let v = rgb * Vec4::new(0.25, 0.5, 0.75, 1.0);
        assert!((v.x - 0.25).abs() < 1e-6);
        assert!((v.y - 0.5).abs() < 1e-6);
        assert!((v.z - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_limited_yuv_gray_maps_to_gray() {
        let m = color_matrix(ColorSpace::Bt709, false, false, &VideoEq::default());
        // mid gray, neutral chroma, limited range
        let g = m * Vec4::new(126.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0, 1.0);
        let expected = (126.0 - 16.0) / 219.0;
        assert!((g.x - expected as f32).abs() < 1e-4);
        assert!((g.x - g.y).abs() < 1e-5);
        assert!((g.y - g.z).abs() < 1e-5);
    }

    #[test]
    fn test_eq_clamping() {
        let eq = VideoEq {
            brightness: 4.0,
            contrast: -3.0,
            hue: 0.0,
            saturation: 0.0,
        }
        .clamped();
        assert_eq!(eq.brightness, 1.0);
        assert_eq!(eq.contrast, -1.0);
    }
}
