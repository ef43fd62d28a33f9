//! Parameter readout drawn over the particles with femtovg

use femtovg::{Canvas, Color, FontId, Paint, Path, renderer::OpenGl};

use crate::config::render;

pub struct Hud {
    canvas: Canvas<OpenGl>,
    fonts: Vec<FontId>,
}

impl Hud {
    /// `None` when no usable font exists
    pub fn new(mut canvas: Canvas<OpenGl>) -> Option<Self> {
        let fonts = super::fonts::load_fonts(&mut canvas);
        if fonts.is_empty() {
            return None;
        }
        Some(Self { canvas, fonts })
    }

    pub fn draw(&mut self, lines: &[String], width: f32, height: f32, scale: f32) {
        self.canvas.set_size(width as u32, height as u32, 1.0);
        if lines.is_empty() {
            self.canvas.flush();
            return;
        }

        let padding = render::HUD_PADDING * scale;
        let line_height = render::HUD_LINE_HEIGHT * scale;

        let mut paint = Paint::color(Color::rgbf(1.0, 0.9, 0.8));
        paint.set_font(&self.fonts);
        paint.set_font_size(render::HUD_FONT_SIZE * scale);

        let text_width = lines
            .iter()
            .filter_map(|line| self.canvas.measure_text(0.0, 0.0, line, &paint).ok())
            .map(|metrics| metrics.width())
            .fold(0.0, f32::max);

        let mut backdrop = Path::new();
        backdrop.rounded_rect(
            padding * 0.5,
            padding * 0.5,
            text_width + padding,
            lines.len() as f32 * line_height + padding,
            4.0 * scale,
        );
        self.canvas
            .fill_path(&backdrop, &Paint::color(Color::rgbaf(0.0, 0.0, 0.0, 0.55)));

        for (i, line) in lines.iter().enumerate() {
            let y = (padding + (i as f32 + 0.8) * line_height).round();
            let _ = self.canvas.fill_text(padding.round(), y, line, &paint);
        }

        self.canvas.flush();
    }
}
