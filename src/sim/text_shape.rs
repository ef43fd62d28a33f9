//! Text-shape sampling
//!
//! A string is rendered into a fixed-size alpha bitmap with a bold font, then
//! scanned on a regular stride. Covered pixels are kept at random so the
//! resulting cloud has roughly the configured density, and converted to world
//! coordinates centred on the bitmap midpoint.

use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache, Weight};
use glam::Vec2;
use rand::Rng;

use crate::config::text;

/// Ordered sample points of a rasterized string, empty when no text is set
pub type TextPointCloud = Vec<Vec2>;

/// Single-channel coverage bitmap, row-major
#[derive(Debug, Clone)]
pub struct AlphaBitmap {
    pub width: u32,
    pub height: u32,
    pub alpha: Vec<u8>,
}

impl AlphaBitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.alpha[y as usize * self.width as usize + x as usize]
    }

    /// Accumulate coverage, keeping the stronger value. Out-of-bounds writes
    /// are ignored.
    #[inline]
    pub fn cover(&mut self, x: i32, y: i32, alpha: u8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.alpha[index] = self.alpha[index].max(alpha);
    }
}

/// Renders a string into an off-screen coverage bitmap
pub trait TextRasterizer {
    fn rasterize(&mut self, text: &str, width: u32, height: u32) -> AlphaBitmap;
}

/// Rasterizer backed by cosmic-text's shaping and swash glyph cache
pub struct CosmicTextRasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl CosmicTextRasterizer {
    /// Loads the system font database; this is slow, construct once.
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }
}

impl Default for CosmicTextRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CosmicTextRasterizer {
    fn layout(&mut self, input: &str, scale: f32) -> Buffer {
        let metrics = Metrics::new(text::FONT_SIZE * scale, text::LINE_HEIGHT * scale);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        // Unbounded width keeps the string on one line
        buffer.set_size(&mut self.font_system, None, None);
        let attrs = Attrs::new().family(Family::SansSerif).weight(Weight::BOLD);
        buffer.set_text(&mut self.font_system, input, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }
}

/// Extent of a laid-out block: widest line and line count
fn block_extent(buffer: &Buffer) -> (f32, usize) {
    buffer
        .layout_runs()
        .fold((0.0f32, 0usize), |(width, lines), run| (width.max(run.line_w), lines + 1))
}

/// Font scale that fits a line of `line_width` pixels into `bitmap_width`
pub fn fit_scale(line_width: f32, bitmap_width: f32) -> f32 {
    let usable = bitmap_width * text::FIT_MARGIN;
    if !line_width.is_finite() || line_width <= usable {
        1.0
    } else {
        usable / line_width
    }
}

impl TextRasterizer for CosmicTextRasterizer {
    fn rasterize(&mut self, input: &str, width: u32, height: u32) -> AlphaBitmap {
        let mut bitmap = AlphaBitmap::new(width, height);

        let mut buffer = self.layout(input, 1.0);
        let (natural_width, _) = block_extent(&buffer);
        let scale = fit_scale(natural_width, width as f32);
        if scale < 1.0 {
            buffer = self.layout(input, scale);
        }

        // Centre the laid-out block inside the bitmap
        let (block_width, lines) = block_extent(&buffer);
        let block_height = lines as f32 * text::LINE_HEIGHT * scale;
        let offset_x = ((width as f32 - block_width) * 0.5).round() as i32;
        let offset_y = ((height as f32 - block_height) * 0.5).round() as i32;

        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            Color::rgb(255, 255, 255),
            |x, y, w, h, color| {
                let alpha = color.a();
                if alpha == 0 {
                    return;
                }
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        bitmap.cover(x + dx + offset_x, y + dy + offset_y, alpha);
                    }
                }
            },
        );

        bitmap
    }
}

/// Scan stride for a target density: `max(1, floor(1 / sqrt(density)))`
pub fn sample_step(density: f32) -> u32 {
    if !density.is_finite() || density <= 0.0 {
        return 1;
    }
    ((1.0 / density.sqrt()).floor() as u32).max(1)
}

/// Convert covered pixels of `bitmap` into world-space sample points
pub fn sample_bitmap<R: Rng + ?Sized>(
    bitmap: &AlphaBitmap,
    density: f32,
    rng: &mut R,
) -> TextPointCloud {
    let density = if density.is_finite() && density > 0.0 {
        density
    } else {
        text::SAMPLE_DENSITY
    };
    let step = sample_step(density);
    let keep_probability = (density * (step * step) as f32).min(1.0);
    let half_w = bitmap.width as f32 * 0.5;
    let half_h = bitmap.height as f32 * 0.5;

    let mut points = Vec::new();
    for y in (0..bitmap.height).step_by(step as usize) {
        for x in (0..bitmap.width).step_by(step as usize) {
            if bitmap.get(x, y) <= text::COVERAGE_THRESHOLD {
                continue;
            }
            if rng.r#gen::<f32>() >= keep_probability {
                continue;
            }
            points.push(Vec2::new(
                (x as f32 - half_w) * text::WORLD_UNITS_PER_PIXEL,
                (half_h - y as f32) * text::WORLD_UNITS_PER_PIXEL,
            ));
        }
    }
    points
}

/// Stateless text-to-point-cloud conversion over a rasterizer
pub struct TextShapeSampler<T: TextRasterizer> {
    rasterizer: T,
}

impl<T: TextRasterizer> TextShapeSampler<T> {
    pub fn new(rasterizer: T) -> Self {
        Self { rasterizer }
    }

    /// Rasterize `input` and sample it. Empty or whitespace-only text yields an
    /// empty cloud without touching the rasterizer.
    pub fn sample<R: Rng + ?Sized>(&mut self, input: &str, rng: &mut R) -> TextPointCloud {
        if input.trim().is_empty() {
            return Vec::new();
        }
        let bitmap = self
            .rasterizer
            .rasterize(input, text::BITMAP_WIDTH, text::BITMAP_HEIGHT);
        sample_bitmap(&bitmap, text::SAMPLE_DENSITY, rng)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Fills a fixed rectangle for any non-empty string
    #[derive(Default)]
    pub(crate) struct BlockRasterizer {
        pub calls: usize,
    }

    impl TextRasterizer for BlockRasterizer {
        fn rasterize(&mut self, _text: &str, width: u32, height: u32) -> AlphaBitmap {
            self.calls += 1;
            let mut bitmap = AlphaBitmap::new(width, height);
            for y in 100..150 {
                for x in 500..540 {
                    bitmap.cover(x, y, 255);
                }
            }
            bitmap
        }
    }

    #[test]
    fn test_fit_scale_shrinks_only_wide_lines() {
        let width = text::BITMAP_WIDTH as f32;
        assert_eq!(fit_scale(300.0, width), 1.0);
        assert_eq!(fit_scale(f32::NAN, width), 1.0);
        let scale = fit_scale(4000.0, width);
        assert!(scale < 1.0);
        assert!((4000.0 * scale - width * text::FIT_MARGIN).abs() < 1e-2);
    }

    #[test]
    fn test_long_string_fits_inside_bitmap() {
        let mut rasterizer = CosmicTextRasterizer::new();
        let bitmap = rasterizer.rasterize(
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            text::BITMAP_WIDTH,
            text::BITMAP_HEIGHT,
        );
        let covered: Vec<u32> = (0..bitmap.height)
            .flat_map(|y| (0..bitmap.width).map(move |x| (x, y)))
            .filter(|&(x, y)| bitmap.get(x, y) > 0)
            .map(|(x, _)| x)
            .collect();
        // No system font means nothing to check
        if covered.is_empty() {
            return;
        }
        let left = covered.iter().copied().min().unwrap_or(0);
        let right = covered.iter().copied().max().unwrap_or(0);
        assert!(left > 0 && right < bitmap.width - 1, "span {left}..{right}");
        // The last letter is drawn, not wrapped away
        assert!(right as f32 > bitmap.width as f32 * 0.75, "right edge {right}");
    }

    #[test]
    fn test_sample_step() {
        assert_eq!(sample_step(1.0), 1);
        assert_eq!(sample_step(0.25), 2);
        assert_eq!(sample_step(0.15), 2);
        assert_eq!(sample_step(0.01), 10);
        assert_eq!(sample_step(f32::NAN), 1);
        assert_eq!(sample_step(4.0), 1);
    }

    #[test]
    fn test_whitespace_yields_empty_cloud() {
        let mut sampler = TextShapeSampler::new(BlockRasterizer { calls: 0 });
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sampler.sample("", &mut rng).is_empty());
        assert!(sampler.sample("  \t\n", &mut rng).is_empty());
        assert_eq!(sampler.rasterizer.calls, 0);
    }

    #[test]
    fn test_points_map_into_block_world_rect() {
        let mut sampler = TextShapeSampler::new(BlockRasterizer { calls: 0 });
        let mut rng = StdRng::seed_from_u64(2);
        let points = sampler.sample("A", &mut rng);
        assert!(!points.is_empty());

        let s = text::WORLD_UNITS_PER_PIXEL;
        let half_w = text::BITMAP_WIDTH as f32 * 0.5;
        let half_h = text::BITMAP_HEIGHT as f32 * 0.5;
        for p in &points {
            assert!(p.x >= (500.0 - half_w) * s && p.x < (540.0 - half_w) * s);
            assert!(p.y <= (half_h - 100.0) * s && p.y > (half_h - 150.0) * s);
        }
    }

    #[test]
    fn test_full_density_keeps_every_covered_pixel() {
        let mut bitmap = AlphaBitmap::new(8, 8);
        bitmap.cover(1, 1, 200);
        bitmap.cover(2, 2, 255);
        bitmap.cover(3, 3, 100); // below threshold
        bitmap.cover(-1, 20, 255); // ignored
        let mut rng = StdRng::seed_from_u64(3);
        let points = sample_bitmap(&bitmap, 1.0, &mut rng);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], Vec2::new(-3.0 * 0.02, 3.0 * 0.02));
    }

    #[test]
    fn test_density_thins_samples() {
        let mut bitmap = AlphaBitmap::new(100, 100);
        for y in 0..100 {
            for x in 0..100 {
                bitmap.cover(x, y, 255);
            }
        }
        let mut rng = StdRng::seed_from_u64(4);
        let points = sample_bitmap(&bitmap, 0.15, &mut rng);
        // Expect roughly 15% of 10_000
        assert!(points.len() > 1000 && points.len() < 2000, "{}", points.len());
    }
}
