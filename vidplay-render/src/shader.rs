//! Shader program generation and the material-keyed cache.
//!
//! A [`VideoShader`] turns material state into a GLSL program: the templates
//! are parameterized by `%planes%` and the `sample2d` body, uniforms are
//! resolved exactly once at link time, and [`ShaderManager`] caches built
//! shaders keyed by material type.

use crate::error::{RenderError, Result};
use crate::gl::{GlApi, ProgramId, ShaderStage, TextureTarget, UniformLocation};
use crate::material::VideoMaterial;
use glam::Mat4;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, warn};

const VERTEX_TEMPLATE: &str = "\
uniform mat4 u_Matrix;
attribute vec4 a_Position;
%texcoords_in%
void main() {
    gl_Position = u_Matrix * a_Position;
%texcoords_out%
}
";

const FRAGMENT_TEMPLATE: &str = "\
%header%
uniform vec2 u_texelSize[%planes%];
uniform vec2 u_textureSize[%planes%];
uniform float u_opacity;
uniform mat4 u_c;
uniform mat4 u_colorMatrix;
uniform vec2 u_to8;
%samplers%
%varyings%
%sample_func%
void main() {
%assemble%
    vec4 c = u_c * raw;
%alpha_fixup%
    c = u_colorMatrix * c;
    c.a *= u_opacity;
%post_process%
    gl_FragColor = c;
}
";

const DEFAULT_SAMPLE_FUNC: &str = "\
vec4 sample2d(%sampler% tex, vec2 pos, int plane) {
    return %lookup%(tex, pos);
}
";

/// Sample body assembling one >8-bit component from two 8-bit channels.
const SPLIT16_SAMPLE_FUNC: &str = "\
vec4 sample2d(%sampler% tex, vec2 pos, int plane) {
    vec4 t = %lookup%(tex, pos);
    float v = dot(t.rg, u_to8);
    return vec4(v, v, v, 1.0);
}
";

/// Replace the template keywords a user shader may rely on.
fn substitute(template: &str, planes: usize, target: TextureTarget) -> String {
    template
        .replace("%planes%", &planes.to_string())
        .replace("%sampler%", target.sampler())
        .replace("%lookup%", target.lookup())
}

/// A linked program with every uniform resolved.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub id: ProgramId,
    pub u_matrix: UniformLocation,
    pub u_textures: Vec<UniformLocation>,
    pub u_texel_size: UniformLocation,
    pub u_texture_size: UniformLocation,
    pub u_opacity: UniformLocation,
    pub u_c: UniformLocation,
    pub u_color_matrix: UniformLocation,
    pub u_to8: UniformLocation,
}

/// Generates, builds and drives one video shader program.
#[derive(Debug)]
pub struct VideoShader {
    material_type: i32,
    planes: usize,
    target: TextureTarget,
    split_16bit: bool,
    has_alpha: bool,
    program: Option<ShaderProgram>,
    rebuild: bool,
    matrix: Mat4,
    opacity: f32,
    user_sample: Option<String>,
    user_post_process: Option<String>,
}

impl VideoShader {
    /// Shape a shader for the material's current configuration.
    pub fn from_material(material: &VideoMaterial) -> Self {
        Self {
            material_type: material.material_type(),
            planes: material.plane_count().max(1),
            target: material.texture_target(),
            split_16bit: material.split_16bit(),
            has_alpha: material.current_format().has_alpha(),
            program: None,
            rebuild: false,
            matrix: Mat4::IDENTITY,
            opacity: 1.0,
            user_sample: None,
            user_post_process: None,
        }
    }

    pub fn material_type(&self) -> i32 {
        self.material_type
    }

    /// Attribute names in binding order: `a_Position` is location 0, the
    /// per-plane texture coordinates follow.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names = vec!["a_Position".to_string()];
        for plane in 0..self.planes {
            names.push(format!("a_TexCoords{}", plane));
        }
        names
    }

    pub fn vertex_shader_source(&self) -> String {
        let mut texcoords_in = String::new();
        let mut texcoords_out = String::new();
        for plane in 0..self.planes {
            texcoords_in.push_str(&format!(
                "attribute vec2 a_TexCoords{p};\nvarying vec2 v_TexCoords{p};\n",
                p = plane
            ));
            texcoords_out.push_str(&format!(
                "    v_TexCoords{p} = a_TexCoords{p};\n",
                p = plane
            ));
        }
        substitute(VERTEX_TEMPLATE, self.planes, self.target)
            .replace("%texcoords_in%", texcoords_in.trim_end())
            .replace("%texcoords_out%", texcoords_out.trim_end())
    }

    pub fn fragment_shader_source(&self) -> String {
        let header = match self.target {
            TextureTarget::ExternalOes => "#extension GL_OES_EGL_image_external : require",
            TextureTarget::Rectangle => "#extension GL_ARB_texture_rectangle : enable",
            TextureTarget::Tex2D => "",
        };

        let mut samplers = String::new();
        let mut varyings = String::new();
        for plane in 0..self.planes {
            samplers.push_str(&format!(
                "uniform {} u_Texture{};\n",
                self.target.sampler(),
                plane
            ));
            varyings.push_str(&format!("varying vec2 v_TexCoords{};\n", plane));
        }

        let sample_func = match &self.user_sample {
            Some(body) => body.clone(),
            None if self.split_16bit => SPLIT16_SAMPLE_FUNC.to_string(),
            None => DEFAULT_SAMPLE_FUNC.to_string(),
        };

        let assemble = match self.planes {
            1 => "    vec4 raw = sample2d(u_Texture0, v_TexCoords0, 0);".to_string(),
            2 => "    vec4 raw = vec4(sample2d(u_Texture0, v_TexCoords0, 0).r, \
                   sample2d(u_Texture1, v_TexCoords1, 1).rg, 1.0);"
                .to_string(),
            _ => "    vec4 raw = vec4(sample2d(u_Texture0, v_TexCoords0, 0).r, \
                  sample2d(u_Texture1, v_TexCoords1, 1).r, \
                  sample2d(u_Texture2, v_TexCoords2, 2).r, 1.0);"
                .to_string(),
        };

        let alpha_fixup = if self.has_alpha { "" } else { "    c.a = 1.0;" };
        let post_process = self.user_post_process.as_deref().unwrap_or("");

        let source = FRAGMENT_TEMPLATE
            .replace("%header%", header)
            .replace("%samplers%", samplers.trim_end())
            .replace("%varyings%", varyings.trim_end())
            .replace("%sample_func%", sample_func.trim_end())
            .replace("%assemble%", &assemble)
            .replace("%alpha_fixup%", alpha_fixup)
            .replace("%post_process%", post_process);
        substitute(&source, self.planes, self.target)
    }

    /// Install a custom `sample2d` body; takes effect at the next rebuild.
    pub fn set_user_sample(&mut self, glsl: impl Into<String>) {
        self.user_sample = Some(glsl.into());
        self.rebuild_later();
    }

    /// Install an RGB post-process snippet; takes effect at the next
    /// rebuild.
    pub fn set_user_post_process(&mut self, glsl: impl Into<String>) {
        self.user_post_process = Some(glsl.into());
        self.rebuild_later();
    }

    /// Rebuild the program before the next update. Call after changing
    /// shader code.
    pub fn rebuild_later(&mut self) {
        self.rebuild = true;
    }

    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
    }

    /// Fragment output alpha multiplier in [0, 1].
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    pub fn texture_location_count(&self) -> usize {
        self.planes
    }

    /// Compile both stages, bind attributes in declared order, link, and
    /// resolve every uniform location exactly once.
    pub fn build(&mut self, gl: &mut dyn GlApi) -> Result<()> {
        let vertex = gl
            .compile_shader(ShaderStage::Vertex, &self.vertex_shader_source())
            .map_err(RenderError::ShaderCompileFailed)?;
        let fragment = gl
            .compile_shader(ShaderStage::Fragment, &self.fragment_shader_source())
            .map_err(RenderError::ShaderCompileFailed)?;

        let id = gl.create_program();
        gl.attach_shader(id, vertex);
        gl.attach_shader(id, fragment);
        for (index, name) in self.attribute_names().iter().enumerate() {
            gl.bind_attribute(id, index as u32, name);
        }
        gl.link_program(id).map_err(RenderError::ShaderLinkFailed)?;

        let u_textures = (0..self.planes)
            .map(|plane| gl.uniform_location(id, &format!("u_Texture{}", plane)))
            .collect();
        self.program = Some(ShaderProgram {
            id,
            u_matrix: gl.uniform_location(id, "u_Matrix"),
            u_textures,
            u_texel_size: gl.uniform_location(id, "u_texelSize"),
            u_texture_size: gl.uniform_location(id, "u_textureSize"),
            u_opacity: gl.uniform_location(id, "u_opacity"),
            u_c: gl.uniform_location(id, "u_c"),
            u_color_matrix: gl.uniform_location(id, "u_colorMatrix"),
            u_to8: gl.uniform_location(id, "u_to8"),
        });
        debug!(material_type = self.material_type, "shader program linked");
        self.program_ready();
        Ok(())
    }

    /// Hook invoked when the program is linked and all uniforms resolved.
    fn program_ready(&mut self) {}

    /// Upload textures and uniforms for the material before drawing.
    ///
    /// The caller clears the material's dirty flag after a successful
    /// update.
    pub fn update(&mut self, gl: &mut dyn GlApi, material: &mut VideoMaterial) -> Result<()> {
        if material.material_type() != self.material_type {
            return Err(RenderError::InvalidMaterial(format!(
                "material {} does not fit shader {}",
                VideoMaterial::type_name(material.material_type()),
                VideoMaterial::type_name(self.material_type)
            )));
        }
        if self.rebuild || self.program.is_none() {
            self.build(gl)?;
            self.rebuild = false;
        }
        let program = self
            .program
            .clone()
            .ok_or_else(|| RenderError::InvalidMaterial("no program".into()))?;

        gl.use_program(program.id);
        if !material.bind(gl) {
            return Err(RenderError::InvalidMaterial("frame has no data".into()));
        }
        for (plane, loc) in program.u_textures.iter().enumerate() {
            gl.set_uniform_i32(*loc, plane as i32);
        }
        gl.set_uniform_mat4(program.u_matrix, &self.matrix);
        gl.set_uniform_mat4(program.u_c, &material.channel_map());
        gl.set_uniform_mat4(program.u_color_matrix, &material.color_matrix());
        gl.set_uniform_f32(program.u_opacity, self.opacity);
        gl.set_uniform_vec2(program.u_to8, material.vector_to_8bit());
        gl.set_uniform_vec2_array(program.u_texel_size, &material.texel_sizes());
        gl.set_uniform_vec2_array(program.u_texture_size, &material.texture_sizes());
        Ok(())
    }
}

/// Owns one shader program per material type, for the lifetime of the
/// render surface.
#[derive(Default)]
pub struct ShaderManager {
    cache: HashMap<i32, VideoShader>,
}

impl ShaderManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shader for the material's effective type, built on first use.
    ///
    /// On compile or link failure nothing is cached and the material stays
    /// dirty; the caller renders a blank frame and may retry.
    pub fn prepare_material(
        &mut self,
        gl: &mut dyn GlApi,
        material: &VideoMaterial,
        type_override: Option<i32>,
    ) -> Result<&mut VideoShader> {
        let key = type_override.unwrap_or_else(|| material.material_type());
        match self.cache.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let mut shader = VideoShader::from_material(material);
                if let Err(err) = shader.build(gl) {
                    warn!(error = %err, "shader build failed");
                    return Err(err);
                }
                Ok(entry.insert(shader))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Delete every cached program. Call on the GL thread before the
    /// context goes away.
    pub fn release(&mut self, gl: &mut dyn GlApi) {
        for (_, shader) in self.cache.drain() {
            if let Some(program) = shader.program {
                gl.delete_program(program.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCaps, HeadlessGl};
    use std::sync::Arc;
    use vidplay_core::frame::{Frame, PlaneBuffer};
    use vidplay_core::pixel::PixelFormat;

    fn frame_with(format: PixelFormat, width: i32, height: i32) -> Frame {
        let mut frame = Frame::new();
        frame.format = format;
        frame.width = width;
        frame.height = height;
        for plane in 0..format.plane_count().max(0) {
            let linesize = format.bytes_per_line(width, plane).max(0) as usize;
            let lines = format.plane_height(height, plane).max(1) as usize;
            frame.set_plane(
                plane as usize,
                Arc::new(PlaneBuffer::new(linesize * lines)),
                linesize,
            );
        }
        frame
    }

    fn material_for(format: PixelFormat) -> VideoMaterial {
        let mut material = VideoMaterial::new(GlCaps::default());
        material.set_current_frame(&frame_with(format, 64, 64));
        material
    }

    #[test]
    fn test_planes_substitution() {
        let shader = VideoShader::from_material(&material_for(PixelFormat::Nv12));
        let frag = shader.fragment_shader_source();
        assert!(frag.contains("uniform vec2 u_texelSize[2];"));
        assert!(frag.contains("uniform sampler2D u_Texture1;"));
        assert!(!frag.contains("%planes%"));
        assert!(!frag.contains("u_Texture2"));
        // chroma plane routes r and g into U and V
        assert!(frag.contains("sample2d(u_Texture1, v_TexCoords1, 1).rg"));

        let three = VideoShader::from_material(&material_for(PixelFormat::Yuv420P));
        let frag = three.fragment_shader_source();
        assert!(frag.contains("uniform vec2 u_texelSize[3];"));
        assert!(frag.contains("sample2d(u_Texture2, v_TexCoords2, 2).r"));
    }

    #[test]
    fn test_attribute_order() {
        let shader = VideoShader::from_material(&material_for(PixelFormat::Yuv420P));
        assert_eq!(
            shader.attribute_names(),
            vec!["a_Position", "a_TexCoords0", "a_TexCoords1", "a_TexCoords2"]
        );
        let mut gl = HeadlessGl::new();
        let mut shader = shader;
        shader.build(&mut gl).unwrap();
        assert_eq!(gl.attributes[0].1, 0);
        assert_eq!(gl.attributes[0].2, "a_Position");
        assert_eq!(gl.attributes[1].1, 1);
        assert_eq!(gl.attributes[1].2, "a_TexCoords0");
    }

    #[test]
    fn test_build_resolves_uniforms() {
        let mut gl = HeadlessGl::new();
        let mut shader = VideoShader::from_material(&material_for(PixelFormat::Nv12));
        shader.build(&mut gl).unwrap();
        let program = shader.program().unwrap();
        assert_eq!(program.u_textures.len(), 2);
        assert_ne!(program.u_matrix, program.u_color_matrix);
        assert_ne!(program.u_c, program.u_to8);
    }

    #[test]
    fn test_update_uploads_uniforms() {
        let mut gl = HeadlessGl::new();
        let mut material = material_for(PixelFormat::Nv12);
        let mut shader = VideoShader::from_material(&material);
        shader.set_opacity(0.75);
        shader.update(&mut gl, &mut material).unwrap();
        material.set_dirty(false);
        let id = shader.program().unwrap().id;
        assert_eq!(gl.active_program, Some(id));
        assert_eq!(
            gl.uniform(id, "u_opacity"),
            Some(&crate::gl::UniformValue::F32(0.75))
        );
        assert_eq!(
            gl.uniform(id, "u_Texture1"),
            Some(&crate::gl::UniformValue::I32(1))
        );
        assert!(!material.is_dirty());
    }

    #[test]
    fn test_compile_failure_keeps_material_dirty() {
        let mut gl = HeadlessGl::new();
        gl.fail_compile = Some("bad source".into());
        let mut material = material_for(PixelFormat::Yuv420P);
        assert!(material.is_dirty());
        let mut manager = ShaderManager::new();
        let err = manager
            .prepare_material(&mut gl, &material, None)
            .unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompileFailed(_)));
        assert!(material.is_dirty());
        assert!(manager.is_empty());
        // retry succeeds once the driver recovers
        assert!(manager.prepare_material(&mut gl, &material, None).is_ok());
    }

    #[test]
    fn test_manager_caches_by_type() {
        let mut gl = HeadlessGl::new();
        let manager = &mut ShaderManager::new();
        let material_a = material_for(PixelFormat::Nv12);
        let id_a = {
            let shader = manager.prepare_material(&mut gl, &material_a, None).unwrap();
            shader.program().unwrap().id
        };
        // a second frame with identical configuration hits the cache
        let material_b = material_for(PixelFormat::Nv12);
        let id_b = {
            let shader = manager.prepare_material(&mut gl, &material_b, None).unwrap();
            shader.program().unwrap().id
        };
        assert_eq!(id_a, id_b);
        assert_eq!(manager.len(), 1);

        let ten_bit = material_for(PixelFormat::Yuv420P10Le);
        let id_c = {
            let shader = manager.prepare_material(&mut gl, &ten_bit, None).unwrap();
            shader.program().unwrap().id
        };
        assert_ne!(id_a, id_c);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_user_sample_triggers_rebuild() {
        let mut gl = HeadlessGl::new();
        let mut material = material_for(PixelFormat::Yuv420P);
        let mut shader = VideoShader::from_material(&material);
        shader.update(&mut gl, &mut material).unwrap();
        let first = shader.program().unwrap().id;
        shader.set_user_sample(
            "vec4 sample2d(sampler2D tex, vec2 pos, int plane) { return texture2D(tex, pos).rrra; }",
        );
        shader.update(&mut gl, &mut material).unwrap();
        let second = shader.program().unwrap().id;
        assert_ne!(first, second);
        assert!(gl
            .last_fragment_source()
            .unwrap()
            .contains("texture2D(tex, pos).rrra"));
    }

    #[test]
    fn test_material_type_mismatch_rejected() {
        let mut gl = HeadlessGl::new();
        let mut shader = VideoShader::from_material(&material_for(PixelFormat::Nv12));
        let mut planar = material_for(PixelFormat::Yuv420P);
        assert!(matches!(
            shader.update(&mut gl, &mut planar),
            Err(RenderError::InvalidMaterial(_))
        ));
    }
}
