//! GL context contract.
//!
//! The GL context is an external collaborator: the render stage talks to it
//! through [`GlApi`] only. [`HeadlessGl`] is an in-tree implementation that
//! records every call; it backs the render tests and keeps the shader and
//! material plumbing observable without a window system.

use glam::{Mat4, Vec2};
use std::collections::HashMap;

pub type ProgramId = u32;
pub type ShaderId = u32;
pub type TextureId = u32;
/// Resolved uniform location; -1 means the uniform is absent.
pub type UniformLocation = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Texture target a material samples through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Tex2D,
    /// Non-normalized texel coordinates.
    Rectangle,
    /// Imported hardware surface.
    ExternalOes,
}

impl TextureTarget {
    /// GLSL sampler type for this target.
    pub fn sampler(&self) -> &'static str {
        match self {
            TextureTarget::Tex2D => "sampler2D",
            TextureTarget::Rectangle => "sampler2DRect",
            TextureTarget::ExternalOes => "samplerExternalOES",
        }
    }

    /// GLSL lookup function for this target.
    pub fn lookup(&self) -> &'static str {
        match self {
            TextureTarget::Rectangle => "texture2DRect",
            _ => "texture2D",
        }
    }
}

/// Capabilities of the platform GL context.
#[derive(Debug, Clone, Copy)]
pub struct GlCaps {
    /// Platform can sample 16-bit single channel textures directly.
    pub texture_16bit: bool,
    /// Packed formats must go through rectangle textures with
    /// non-normalized coordinates.
    pub rectangle_required: bool,
    /// External OES sampling is available for hardware surfaces.
    pub external_oes: bool,
}

impl Default for GlCaps {
    fn default() -> Self {
        Self {
            texture_16bit: true,
            rectangle_required: false,
            external_oes: true,
        }
    }
}

/// The subset of GL the render stage uses.
pub trait GlApi {
    fn caps(&self) -> GlCaps;

    fn create_program(&mut self) -> ProgramId;
    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> std::result::Result<ShaderId, String>;
    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId);
    /// Bind an attribute name to a location before linking.
    fn bind_attribute(&mut self, program: ProgramId, index: u32, name: &str);
    fn link_program(&mut self, program: ProgramId) -> std::result::Result<(), String>;
    fn use_program(&mut self, program: ProgramId);
    fn delete_program(&mut self, program: ProgramId);

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> UniformLocation;
    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32);
    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32);
    fn set_uniform_vec2(&mut self, location: UniformLocation, value: Vec2);
    fn set_uniform_vec2_array(&mut self, location: UniformLocation, values: &[Vec2]);
    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);

    fn create_texture(&mut self, target: TextureTarget) -> TextureId;
    /// Upload one plane. `channels` is the component count per texel.
    fn upload_texture(
        &mut self,
        texture: TextureId,
        target: TextureTarget,
        width: u32,
        height: u32,
        channels: u8,
        data: &[u8],
    );
    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: TextureId);
    /// Import a hardware decode surface as an external texture.
    fn import_hw_surface(&mut self, handle: u64) -> TextureId;
    fn delete_texture(&mut self, texture: TextureId);
}

/// Recorded uniform value.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    I32(i32),
    F32(f32),
    Vec2(Vec2),
    Vec2Array(Vec<Vec2>),
    Mat4(Mat4),
}

#[derive(Debug, Clone)]
pub struct TextureUpload {
    pub texture: TextureId,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub bytes: usize,
}

/// Call-recording GL double.
#[derive(Default)]
pub struct HeadlessGl {
    caps: GlCaps,
    next_id: u32,
    /// Force the next compile to fail with this log.
    pub fail_compile: Option<String>,
    pub compiled: Vec<(ShaderStage, String)>,
    pub linked: Vec<ProgramId>,
    pub attributes: Vec<(ProgramId, u32, String)>,
    pub uniforms: HashMap<UniformLocation, UniformValue>,
    pub uploads: Vec<TextureUpload>,
    pub bound: Vec<(u32, TextureId)>,
    pub active_program: Option<ProgramId>,
    locations: HashMap<(ProgramId, String), UniformLocation>,
    next_location: UniformLocation,
}

impl HeadlessGl {
    pub fn new() -> Self {
        Self {
            caps: GlCaps::default(),
            next_location: 1,
            ..Default::default()
        }
    }

    pub fn with_caps(caps: GlCaps) -> Self {
        Self {
            caps,
            next_location: 1,
            ..Default::default()
        }
    }

    fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Recorded value of a named uniform in a program.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<&UniformValue> {
        let loc = self.locations.get(&(program, name.to_string()))?;
        self.uniforms.get(loc)
    }

    /// Fragment source of the last compiled fragment stage.
    pub fn last_fragment_source(&self) -> Option<&str> {
        self.compiled
            .iter()
            .rev()
            .find(|(stage, _)| *stage == ShaderStage::Fragment)
            .map(|(_, src)| src.as_str())
    }
}

impl GlApi for HeadlessGl {
    fn caps(&self) -> GlCaps {
        self.caps
    }

    fn create_program(&mut self) -> ProgramId {
        self.alloc_id()
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> std::result::Result<ShaderId, String> {
        if let Some(log) = self.fail_compile.take() {
            return Err(log);
        }
        self.compiled.push((stage, source.to_string()));
        Ok(self.alloc_id())
    }

    fn attach_shader(&mut self, _program: ProgramId, _shader: ShaderId) {}

    fn bind_attribute(&mut self, program: ProgramId, index: u32, name: &str) {
        self.attributes.push((program, index, name.to_string()));
    }

    fn link_program(&mut self, program: ProgramId) -> std::result::Result<(), String> {
        self.linked.push(program);
        Ok(())
    }

    fn use_program(&mut self, program: ProgramId) {
        self.active_program = Some(program);
    }

    fn delete_program(&mut self, _program: ProgramId) {}

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> UniformLocation {
        let key = (program, name.to_string());
        if let Some(loc) = self.locations.get(&key) {
            return *loc;
        }
        let loc = self.next_location;
        self.next_location += 1;
        self.locations.insert(key, loc);
        loc
    }

    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32) {
        self.uniforms.insert(location, UniformValue::I32(value));
    }

    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32) {
        self.uniforms.insert(location, UniformValue::F32(value));
    }

    fn set_uniform_vec2(&mut self, location: UniformLocation, value: Vec2) {
        self.uniforms.insert(location, UniformValue::Vec2(value));
    }

    fn set_uniform_vec2_array(&mut self, location: UniformLocation, values: &[Vec2]) {
        self.uniforms
            .insert(location, UniformValue::Vec2Array(values.to_vec()));
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.uniforms.insert(location, UniformValue::Mat4(*value));
    }

    fn create_texture(&mut self, _target: TextureTarget) -> TextureId {
        self.alloc_id()
    }

    fn upload_texture(
        &mut self,
        texture: TextureId,
        _target: TextureTarget,
        width: u32,
        height: u32,
        channels: u8,
        data: &[u8],
    ) {
        self.uploads.push(TextureUpload {
            texture,
            width,
            height,
            channels,
            bytes: data.len(),
        });
    }

    fn bind_texture(&mut self, unit: u32, _target: TextureTarget, texture: TextureId) {
        self.bound.push((unit, texture));
    }

    fn import_hw_surface(&mut self, _handle: u64) -> TextureId {
        self.alloc_id()
    }

    fn delete_texture(&mut self, _texture: TextureId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_locations_are_stable() {
        let mut gl = HeadlessGl::new();
        let prog = gl.create_program();
        let a = gl.uniform_location(prog, "u_Matrix");
        let b = gl.uniform_location(prog, "u_opacity");
        assert_ne!(a, b);
        assert_eq!(gl.uniform_location(prog, "u_Matrix"), a);
    }

    #[test]
    fn test_compile_failure_is_one_shot() {
        let mut gl = HeadlessGl::new();
        gl.fail_compile = Some("syntax error".into());
        assert!(gl.compile_shader(ShaderStage::Vertex, "void main(){}").is_err());
        assert!(gl.compile_shader(ShaderStage::Vertex, "void main(){}").is_ok());
    }

    #[test]
    fn test_uniform_recording() {
        let mut gl = HeadlessGl::new();
        let prog = gl.create_program();
        let loc = gl.uniform_location(prog, "u_opacity");
        gl.set_uniform_f32(loc, 0.5);
        assert_eq!(gl.uniform(prog, "u_opacity"), Some(&UniformValue::F32(0.5)));
    }
}
