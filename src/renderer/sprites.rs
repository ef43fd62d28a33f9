//! Procedural sprite textures for point particles
//!
//! Both sprites are generated once on the CPU as RGBA8 images and uploaded by
//! the point renderer; they survive pool recreation.

use crate::params::Population;

pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl SpriteImage {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }
}

pub fn sprite_for(population: Population, size: u32) -> SpriteImage {
    match population {
        Population::Smoke => smoke_sprite(size),
        Population::Fire => fire_sprite(size),
    }
}

/// Soft radial puff: white, alpha falls off smoothly to zero at the rim
pub fn smoke_sprite(size: u32) -> SpriteImage {
    generate(size, |d, _angle| {
        let falloff = (1.0 - d).max(0.0);
        let alpha = falloff * falloff * (3.0 - 2.0 * falloff);
        [1.0, 1.0, 1.0, alpha * 0.8]
    })
}

/// Hot core fading through yellow to a dim rim, with faint streak rays
pub fn fire_sprite(size: u32) -> SpriteImage {
    generate(size, |d, angle| {
        let falloff = (1.0 - d).max(0.0);
        let core = falloff.powf(1.5);
        let rays = (angle * 6.0).cos().max(0.0).powi(8) * falloff * 0.15;
        let alpha = (core + rays).min(1.0);
        // White-yellow center cooling to orange
        let g = 0.55 + 0.45 * falloff;
        let b = 0.25 * falloff * falloff;
        [1.0, g, b, alpha]
    })
}

fn generate(size: u32, shade: impl Fn(f32, f32) -> [f32; 4]) -> SpriteImage {
    let size = size.max(2);
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    let half = size as f32 * 0.5;
    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 + 0.5 - half) / half;
            let dy = (y as f32 + 0.5 - half) / half;
            let d = (dx * dx + dy * dy).sqrt();
            let rgba = shade(d, dy.atan2(dx));
            pixels.extend(rgba.iter().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
        }
    }
    SpriteImage {
        width: size,
        height: size,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke_center_opaque_corner_clear() {
        let sprite = smoke_sprite(64);
        assert_eq!(sprite.pixels.len(), 64 * 64 * 4);
        assert!(sprite.pixel(32, 32)[3] > 180);
        assert_eq!(sprite.pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_fire_hotter_in_center() {
        let sprite = fire_sprite(64);
        let center = sprite.pixel(32, 32);
        let edge = sprite.pixel(32, 4);
        assert!(center[1] > edge[1]);
        assert!(center[3] > edge[3]);
        assert_eq!(sprite.pixel(0, 63)[3], 0);
    }

    #[test]
    fn test_degenerate_size() {
        let sprite = sprite_for(Population::Smoke, 0);
        assert_eq!(sprite.width, 2);
    }
}
