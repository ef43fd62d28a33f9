//! Application state and coordination
//!
//! The app pairs the renderer with a [`Session`], which owns the simulation
//! stage and the pending parameter edits. Input handlers mutate [`Controls`];
//! [`App::tick`] flushes edits once their debounce window has passed;
//! [`App::render`] advances and draws one frame.

mod action;
mod debounce;
mod keybindings;
mod session;
mod state;

use std::time::Instant;

use crate::error::RenderResult;
use crate::params::{Population, SimParams};
use crate::persistence;
use crate::renderer::Renderer;
use crate::sim::Camera;

pub use action::Action;
pub use debounce::Debouncer;
pub use keybindings::{Key, KeyEvent, Modifiers, resolve};
pub use session::Session;
pub use state::{AppResult, Controls, FpsCounter};

pub struct App {
    renderer: Renderer,
    session: Session,
    fps: FpsCounter,
    last_frame: Instant,
    width: f32,
    height: f32,
}

impl App {
    pub fn new(
        gl: glow::Context,
        canvas_renderer: femtovg::renderer::OpenGl,
        width: f32,
        height: f32,
        scale: f32,
    ) -> RenderResult<Self> {
        let renderer = Renderer::new(gl, canvas_renderer, width, height, scale)?;
        let params = persistence::load_settings().unwrap_or_else(|err| {
            log::warn!("Ignoring unreadable settings: {err}");
            SimParams::default()
        });

        let mut camera = Camera::default();
        camera.set_viewport(width, height);
        let now = Instant::now();

        Ok(Self {
            renderer,
            session: Session::new(params, camera),
            fps: FpsCounter::new(now),
            last_frame: now,
            width,
            height,
        })
    }

    pub fn text_editing(&self) -> bool {
        self.session.controls.text_editing
    }

    /// Flush pending edits whose time has come
    pub fn tick(&mut self, now: Instant) -> AppResult {
        self.session.tick(now);
        // The simulation animates continuously
        AppResult::Redraw
    }

    pub fn render(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.session.stage.advance(dt);
        self.fps.record(now);

        let controls = &self.session.controls;
        let lines = if controls.hud_visible {
            status_lines(&controls.pending, self.fps.fps(), controls.text_editing)
        } else {
            Vec::new()
        };
        self.renderer.render(&self.session.stage, &lines);
    }

    pub fn resize(&mut self, width: f32, height: f32, scale: f32) {
        self.width = width;
        self.height = height;
        self.session.stage.scene_mut().camera.set_viewport(width, height);
        self.renderer.resize(width, height, scale);
    }

    /// Pointer position in physical pixels
    pub fn handle_mouse_move(&mut self, x: f32, y: f32) {
        let world = self
            .session
            .stage
            .scene()
            .camera
            .screen_to_world(x, y, self.width, self.height);
        self.session.stage.scene_mut().mouse = world;
    }

    /// Cancel pending work and release GPU resources. The GL context must
    /// still be current.
    pub fn shutdown(&mut self) {
        self.session.controls.cancel_all();
        self.renderer.release();
        log::info!("Shut down");
    }

    fn save_settings(&self) {
        match persistence::save_settings(&self.session.controls.pending) {
            Ok(path) => log::info!("Saved settings to {}", path.display()),
            Err(err) => log::warn!("Failed to save settings: {err}"),
        }
    }

    fn reset(&mut self) {
        self.session.reset();
    }
}

/// HUD readout of the pending parameters
pub fn status_lines(params: &SimParams, fps: f32, text_editing: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(6);
    let state = if params.scene.playing { "" } else { "  [paused]" };
    lines.push(format!("{fps:5.1} fps{state}"));

    for population in [Population::Smoke, Population::Fire] {
        let p = params.population(population);
        lines.push(format!(
            "{:<5} {:>5}  {:<11} {:<6}  turb {:.1}",
            population.label(),
            p.count,
            p.blend_mode.label(),
            p.source.label(),
            p.turbulence
        ));
    }

    lines.push(format!(
        "wind {:+.1} x {:.2}",
        params.scene.wind_direction, params.scene.wind_strength
    ));

    let persist = if params.scene.persist_text_shape { "on" } else { "off" };
    if text_editing {
        lines.push(format!("text> {}_", params.scene.text));
    } else {
        lines.push(format!("text \"{}\"  persist {persist}", params.scene.text));
    }

    lines.push(
        "space play  b/B blend  s/S source  \u{2191}\u{2193} count  \u{2190}\u{2192} wind  tab text  h hud"
            .to_string(),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines_show_pause_and_counts() {
        let mut params = SimParams::default();
        params.scene.playing = false;
        let lines = status_lines(&params, 59.9, false);

        assert!(lines[0].contains("59.9"));
        assert!(lines[0].contains("paused"));
        assert!(lines[1].starts_with("smoke"));
        assert!(lines[1].contains("4000"));
        assert!(lines[2].contains("additive"));
    }

    #[test]
    fn test_status_lines_text_edit_cursor() {
        let mut params = SimParams::default();
        params.scene.text = "HOT".to_string();
        let lines = status_lines(&params, 0.0, true);
        assert!(lines.iter().any(|line| line == "text> HOT_"));
    }
}
