//! Base/accent color resolution

use rand::Rng;

/// Linear RGB triple in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    /// Parse `#rrggbb`, `rrggbb` or `#rgb`. Returns `None` for anything else.
    pub fn parse_hex(input: &str) -> Option<Self> {
        let hex = input.trim().trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match hex.len() {
            6 if hex.is_ascii() => Some(Self(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 if hex.is_ascii() => {
                let short = |s: &str| channel(&s.repeat(2));
                Some(Self(short(&hex[0..1])?, short(&hex[1..2])?, short(&hex[2..3])?))
            }
            _ => None,
        }
    }

    /// Parse or fall back to `fallback` (malformed input is never an error)
    pub fn parse_or(input: &str, fallback: Rgb) -> Self {
        match Self::parse_hex(input) {
            Some(color) => color,
            None => {
                log::warn!("Malformed color {:?}, using fallback", input);
                fallback
            }
        }
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        Rgb(
            self.0 + (other.0 - self.0) * t,
            self.1 + (other.1 - self.1) * t,
            self.2 + (other.2 - self.2) * t,
        )
    }
}

pub const SMOKE_FALLBACK: Rgb = Rgb(0.5, 0.5, 0.5);
pub const FIRE_FALLBACK: Rgb = Rgb(1.0, 0.4, 0.0);
pub const BACKGROUND_FALLBACK: Rgb = Rgb(0.0, 0.0, 0.0);

/// A base/accent pair resolved once per pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRamp {
    pub base: Rgb,
    pub accent: Rgb,
}

impl ColorRamp {
    pub fn new(base: &str, accent: &str, fallback: Rgb) -> Self {
        Self {
            base: Rgb::parse_or(base, fallback),
            accent: Rgb::parse_or(accent, fallback),
        }
    }

    /// Random point between base and accent
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        self.base.lerp(self.accent, rng.gen_range(0.0..1.0))
    }
}
