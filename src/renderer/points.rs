//! Point-sprite renderer for particle pools
//!
//! Each population gets its own vertex array with one buffer per SoA field,
//! so pool arrays are uploaded as-is every frame without repacking.

use glam::Mat4;
use glow::HasContext;

use super::blend::BlendConfig;
use super::shaders;
use super::sprites;
use crate::config::render;
use crate::error::{RenderError, RenderResult};
use crate::params::Population;
use crate::sim::ParticlePool;

/// Per-frame values shared by both populations
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    /// Converts world size at unit depth into pixels
    pub point_scale: f32,
    pub time: f32,
}

struct Uniforms {
    view: Option<glow::NativeUniformLocation>,
    projection: Option<glow::NativeUniformLocation>,
    point_scale: Option<glow::NativeUniformLocation>,
    min_point_size: Option<glow::NativeUniformLocation>,
    sprite: Option<glow::NativeUniformLocation>,
    time: Option<glow::NativeUniformLocation>,
    flicker: Option<glow::NativeUniformLocation>,
}

struct PointBatch {
    vao: glow::NativeVertexArray,
    /// position, color, size, alpha
    buffers: [glow::NativeBuffer; 4],
    sprite: glow::NativeTexture,
}

pub struct PointRenderer {
    program: glow::NativeProgram,
    uniforms: Uniforms,
    smoke: PointBatch,
    fire: PointBatch,
}

impl PointRenderer {
    pub fn new(gl: &glow::Context) -> RenderResult<Self> {
        let program = create_program(gl, shaders::POINT_VERTEX, shaders::POINT_FRAGMENT)?;
        let uniforms = unsafe {
            Uniforms {
                view: gl.get_uniform_location(program, "u_view"),
                projection: gl.get_uniform_location(program, "u_projection"),
                point_scale: gl.get_uniform_location(program, "u_point_scale"),
                min_point_size: gl.get_uniform_location(program, "u_min_point_size"),
                sprite: gl.get_uniform_location(program, "u_sprite"),
                time: gl.get_uniform_location(program, "u_time"),
                flicker: gl.get_uniform_location(program, "u_flicker"),
            }
        };
        let smoke = create_batch(gl, Population::Smoke)?;
        let fire = create_batch(gl, Population::Fire)?;
        log::info!("Point renderer ready");
        Ok(Self {
            program,
            uniforms,
            smoke,
            fire,
        })
    }

    /// Draw one pool with its population's sprite and blend state
    pub fn draw(&self, gl: &glow::Context, pool: &ParticlePool, frame: &FrameUniforms) {
        if pool.is_empty() {
            return;
        }
        let batch = match pool.population() {
            Population::Smoke => &self.smoke,
            Population::Fire => &self.fire,
        };

        unsafe {
            gl.use_program(Some(self.program));
            gl.uniform_matrix_4_f32_slice(self.uniforms.view.as_ref(), false, &frame.view.to_cols_array());
            gl.uniform_matrix_4_f32_slice(
                self.uniforms.projection.as_ref(),
                false,
                &frame.projection.to_cols_array(),
            );
            gl.uniform_1_f32(self.uniforms.point_scale.as_ref(), frame.point_scale);
            gl.uniform_1_f32(self.uniforms.min_point_size.as_ref(), render::MIN_POINT_SIZE);
            gl.uniform_1_f32(self.uniforms.time.as_ref(), frame.time);
            let flicker = if pool.population().is_fire() { 1.0 } else { 0.0 };
            gl.uniform_1_f32(self.uniforms.flicker.as_ref(), flicker);

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(batch.sprite));
            gl.uniform_1_i32(self.uniforms.sprite.as_ref(), 0);

            gl.enable(glow::PROGRAM_POINT_SIZE);
            gl.disable(glow::DEPTH_TEST);
            gl.depth_mask(false);
            BlendConfig::for_mode(pool.config().blend_mode).apply(gl);

            gl.bind_vertex_array(Some(batch.vao));
            let fields: [&[f32]; 4] = [pool.positions(), pool.colors(), pool.sizes(), pool.alphas()];
            for (buffer, data) in batch.buffers.iter().zip(fields) {
                gl.bind_buffer(glow::ARRAY_BUFFER, Some(*buffer));
                gl.buffer_data_u8_slice(
                    glow::ARRAY_BUFFER,
                    bytemuck::cast_slice(data),
                    glow::STREAM_DRAW,
                );
            }

            gl.draw_arrays(glow::POINTS, 0, pool.len() as i32);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.use_program(None);
            gl.blend_equation(glow::FUNC_ADD);
        }
    }

    /// Free every GL object owned by the renderer
    pub fn release(self, gl: &glow::Context) {
        unsafe {
            for batch in [self.smoke, self.fire] {
                for buffer in batch.buffers {
                    gl.delete_buffer(buffer);
                }
                gl.delete_vertex_array(batch.vao);
                gl.delete_texture(batch.sprite);
            }
            gl.delete_program(self.program);
        }
        log::info!("Point renderer released");
    }
}

fn create_batch(gl: &glow::Context, population: Population) -> RenderResult<PointBatch> {
    unsafe {
        let vao = gl.create_vertex_array().map_err(RenderError::Resource)?;
        gl.bind_vertex_array(Some(vao));

        let components = [3, 3, 1, 1];
        let mut buffers = Vec::with_capacity(components.len());
        for (location, size) in components.iter().enumerate() {
            let buffer = gl.create_buffer().map_err(RenderError::Resource)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.vertex_attrib_pointer_f32(location as u32, *size, glow::FLOAT, false, 0, 0);
            gl.enable_vertex_attrib_array(location as u32);
            buffers.push(buffer);
        }
        gl.bind_vertex_array(None);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);

        let buffers: [glow::NativeBuffer; 4] = buffers
            .try_into()
            .map_err(|_| RenderError::Resource("vertex buffer setup".to_string()))?;
        let sprite = upload_sprite(gl, &sprites::sprite_for(population, render::SPRITE_SIZE))?;
        Ok(PointBatch { vao, buffers, sprite })
    }
}

fn upload_sprite(gl: &glow::Context, image: &sprites::SpriteImage) -> RenderResult<glow::NativeTexture> {
    unsafe {
        let texture = gl.create_texture().map_err(RenderError::Resource)?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA8 as i32,
            image.width as i32,
            image.height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            Some(image.pixels.as_slice()),
        );
        gl.bind_texture(glow::TEXTURE_2D, None);
        Ok(texture)
    }
}

fn create_program(gl: &glow::Context, vertex: &str, fragment: &str) -> RenderResult<glow::NativeProgram> {
    unsafe {
        let program = gl.create_program().map_err(RenderError::Resource)?;
        let mut shaders = Vec::with_capacity(2);
        for (kind, source) in [(glow::VERTEX_SHADER, vertex), (glow::FRAGMENT_SHADER, fragment)] {
            let shader = gl.create_shader(kind).map_err(RenderError::Resource)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                gl.delete_program(program);
                return Err(RenderError::ShaderCompile(log));
            }
            gl.attach_shader(program, shader);
            shaders.push(shader);
        }

        gl.link_program(program);
        let linked = gl.get_program_link_status(program);
        for shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
        if !linked {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(RenderError::ProgramLink(log));
        }
        Ok(program)
    }
}
