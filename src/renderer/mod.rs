//! Frame composition: point sprites on raw GL, HUD overlay with femtovg

pub mod blend;
mod fonts;
mod hud;
pub mod points;
mod shaders;
pub mod sprites;

use femtovg::Canvas;
use glow::HasContext;

use crate::error::{RenderError, RenderResult};
use crate::params::Population;
use crate::sim::SimulationStage;

use hud::Hud;
use points::{FrameUniforms, PointRenderer};

pub struct Renderer {
    gl: glow::Context,
    points: Option<PointRenderer>,
    hud: Option<Hud>,
    width: f32,
    height: f32,
    scale: f32,
}

impl Renderer {
    pub fn new(
        gl: glow::Context,
        canvas_renderer: femtovg::renderer::OpenGl,
        width: f32,
        height: f32,
        scale: f32,
    ) -> RenderResult<Self> {
        let points = PointRenderer::new(&gl)?;
        let canvas =
            Canvas::new(canvas_renderer).map_err(|err| RenderError::Canvas(format!("{err:?}")))?;
        let hud = Hud::new(canvas);

        Ok(Self {
            gl,
            points: Some(points),
            hud,
            width,
            height,
            scale,
        })
    }

    pub fn resize(&mut self, width: f32, height: f32, scale: f32) {
        self.width = width;
        self.height = height;
        self.scale = scale;
    }

    /// Draw both populations then the overlay. Smoke goes first so additive
    /// fire composites over it.
    pub fn render(&mut self, stage: &SimulationStage, hud_lines: &[String]) {
        let Some(points) = &self.points else {
            return;
        };
        let background = stage.scene().background;
        let camera = &stage.scene().camera;
        let projection = camera.projection_matrix();
        let frame = FrameUniforms {
            view: camera.view_matrix(),
            projection,
            point_scale: projection.y_axis.y * self.height * 0.5,
            time: stage.time(),
        };

        unsafe {
            self.gl.viewport(0, 0, self.width as i32, self.height as i32);
            self.gl.clear_color(background.0, background.1, background.2, 1.0);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }

        for population in [Population::Smoke, Population::Fire] {
            points.draw(&self.gl, stage.pool(population), &frame);
        }

        if let Some(hud) = &mut self.hud {
            hud.draw(hud_lines, self.width, self.height, self.scale);
        }
    }

    /// Release GL resources. Rendering is a no-op afterwards.
    pub fn release(&mut self) {
        if let Some(points) = self.points.take() {
            points.release(&self.gl);
        }
        self.hud = None;
    }
}
