//! Centralized configuration constants for Fire Smoke
//!
//! All magic numbers and tunable parameters should be defined here.
//! World units follow the camera in [`crate::sim::camera`]: the scene is viewed
//! from `camera::DISTANCE` units in front of the z=0 plane.

/// Hard per-population capacity limits
pub mod limits {
    /// Maximum number of smoke particles
    pub const MAX_SMOKE_PARTICLES: usize = 8000;
    /// Maximum number of fire particles
    pub const MAX_FIRE_PARTICLES: usize = 5000;
    /// Maximum length of the free-text string (in chars)
    pub const MAX_TEXT_CHARS: usize = 32;
}

/// Camera defaults
pub mod camera {
    /// Vertical field of view in degrees
    pub const FOV_Y_DEGREES: f32 = 75.0;
    /// Distance from the camera to the z=0 plane
    pub const DISTANCE: f32 = 10.0;
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 1000.0;
}

/// Per-step simulation constants
pub mod sim {
    /// Largest time step a single frame may integrate (seconds)
    pub const MAX_DT: f32 = 1.0 / 30.0;
    /// Reference frame rate used to make per-frame damping rate-independent
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Base lifespans in abstract time units
    pub const BASE_SMOKE_LIFESPAN: f32 = 6.0;
    pub const BASE_FIRE_LIFESPAN: f32 = 2.0;
    /// Lifespan variance: `base * (LIFESPAN_MIN_FACTOR + r * LIFESPAN_RANGE_FACTOR)`
    pub const LIFESPAN_MIN_FACTOR: f32 = 0.5;
    pub const LIFESPAN_RANGE_FACTOR: f32 = 0.8;
    /// Initial life fraction range drawn at every spawn
    pub const INITIAL_LIFE_MIN: f32 = 0.01;
    pub const INITIAL_LIFE_MAX: f32 = 1.0;

    /// Life decay rates (units per second)
    pub const SMOKE_BASE_DISSIPATION: f32 = 0.5;
    pub const DISSIPATION_SCALE: f32 = 1.0;
    pub const FIRE_DISSIPATION: f32 = 1.0;

    /// Respawn ceiling as a fraction of the visible half-height above center
    pub const SMOKE_CEILING_FRACTION: f32 = 0.6;
    pub const FIRE_CEILING_FRACTION: f32 = 0.55;

    /// Turbulence noise: `sin(pos * SCALE + time * TIME_SCALE + phase) * AMPLITUDE * turbulence`
    pub const SMOKE_TURBULENCE_SCALE: f32 = 0.5;
    pub const SMOKE_TURBULENCE_TIME_SCALE: f32 = 0.8;
    pub const SMOKE_TURBULENCE_AMPLITUDE: f32 = 0.6;
    pub const FIRE_TURBULENCE_SCALE: f32 = 1.2;
    pub const FIRE_TURBULENCE_TIME_SCALE: f32 = 2.0;
    pub const FIRE_TURBULENCE_AMPLITUDE: f32 = 1.0;

    /// Per-frame velocity retention at `REFERENCE_FPS`
    pub const SMOKE_DAMPING_X: f32 = 0.98;
    pub const SMOKE_DAMPING_Y: f32 = 0.99;
    pub const FIRE_DAMPING_X: f32 = 0.98;
    pub const FIRE_DAMPING_Y: f32 = 0.995;

    /// Wind multipliers per population
    pub const SMOKE_WIND_FACTOR: f32 = 1.0;
    pub const FIRE_WIND_FACTOR: f32 = 0.3;

    /// Respawn impulse horizontal scale (multiplied by spread)
    pub const SMOKE_HORIZONTAL_IMPULSE: f32 = 0.3;
    pub const FIRE_HORIZONTAL_IMPULSE: f32 = 0.2;
    pub const DEPTH_IMPULSE: f32 = 0.1;

    /// Base sprite sizes in world units
    pub const SMOKE_BASE_SIZE: f32 = 1.2;
    pub const FIRE_BASE_SIZE: f32 = 0.6;
    /// Size variance: `base * (SIZE_MIN_FACTOR + r * SIZE_RANGE_FACTOR)`
    pub const SIZE_MIN_FACTOR: f32 = 0.6;
    pub const SIZE_RANGE_FACTOR: f32 = 0.8;
    /// Alpha variance: `opacity * (ALPHA_MIN_FACTOR + r * (1 - ALPHA_MIN_FACTOR))`
    pub const ALPHA_MIN_FACTOR: f32 = 0.7;
    /// Hard floor on particle size
    pub const MIN_SIZE: f32 = 0.01;

    /// Fire alpha exponent on the life ratio
    pub const FIRE_ALPHA_EXPONENT: f32 = 1.8;
    /// Fraction of the base size fire shrinks to at end of life
    pub const FIRE_SIZE_FLOOR: f32 = 0.2;
    /// Smoke alpha fade-in / fade-out boundaries (fraction of age)
    pub const SMOKE_FADE_IN_END: f32 = 0.1;
    pub const SMOKE_FADE_OUT_START: f32 = 0.6;
    /// Smoke growth phase and peak scale
    pub const SMOKE_GROW_END: f32 = 0.3;
    pub const SMOKE_PEAK_SCALE: f32 = 1.5;
    pub const SMOKE_SIZE_FLOOR: f32 = 0.3;

    /// Persist-text attractor pull per second
    pub const PERSIST_PULL: f32 = 3.0;
    /// Persist-text jitter amplitude (world units, total span)
    pub const PERSIST_JITTER: f32 = 0.01;
    /// Life fraction held while attracted to text
    pub const PERSIST_LIFE_FRACTION: f32 = 0.99;
}

/// Emission source constants
pub mod emission {
    /// Half-width of the bottom emission band (world units)
    pub const BOTTOM_HALF_WIDTH: f32 = 8.0;
    /// Upward jitter above the viewport bottom
    pub const SMOKE_BOTTOM_JITTER: f32 = 0.5;
    pub const FIRE_BOTTOM_JITTER: f32 = 0.2;
    /// Depth jitter span for the bottom band (multiplied by spread)
    pub const BOTTOM_DEPTH_JITTER: f32 = 0.5;
    /// Spread multipliers for center emission
    pub const SMOKE_CENTER_SPREAD: f32 = 1.0;
    pub const FIRE_CENTER_SPREAD: f32 = 0.6;
    /// Spread multiplier for mouse emission relative to center
    pub const MOUSE_SPREAD: f32 = 0.5;
    /// Vertical jitter span around the center line
    pub const CENTER_VERTICAL_JITTER: f32 = 0.2;
    /// Jitter span around text sample points (multiplied by spread)
    pub const TEXT_JITTER: f32 = 0.1;
    /// Viewport height used when the camera reports a degenerate value
    pub const FALLBACK_VIEWPORT_HEIGHT: f32 = 10.0;
}

/// Text-shape sampling constants
pub mod text {
    /// Off-screen bitmap dimensions (pixels)
    pub const BITMAP_WIDTH: u32 = 1024;
    pub const BITMAP_HEIGHT: u32 = 256;
    /// Bold font size used to rasterize the string. Text is kept on one
    /// line and shrunk below this size when it would overflow the bitmap.
    pub const FONT_SIZE: f32 = 180.0;
    /// Fraction of the bitmap width a shrunk line may occupy
    pub const FIT_MARGIN: f32 = 0.95;
    pub const LINE_HEIGHT: f32 = 200.0;
    /// Target fraction of covered pixels to keep as samples
    pub const SAMPLE_DENSITY: f32 = 0.15;
    /// Minimum alpha (0-255) for a pixel to count as covered
    pub const COVERAGE_THRESHOLD: u8 = 128;
    /// World units per bitmap pixel
    pub const WORLD_UNITS_PER_PIXEL: f32 = 0.02;
}

/// Rendering constants
pub mod render {
    /// Sprite texture edge length (pixels)
    pub const SPRITE_SIZE: u32 = 64;
    /// Smallest on-screen point size (pixels)
    pub const MIN_POINT_SIZE: f32 = 1.0;
    /// HUD font size in logical pixels
    pub const HUD_FONT_SIZE: f32 = 14.0;
    pub const HUD_LINE_HEIGHT: f32 = 18.0;
    pub const HUD_PADDING: f32 = 12.0;
}

/// Timing constants (in milliseconds)
pub mod timing {
    /// Coalescing window for count/color/source edits
    pub const STRUCTURAL_DEBOUNCE_MS: u64 = 300;
    /// Coalescing window for text edits
    pub const TEXT_DEBOUNCE_MS: u64 = 400;
    /// FPS readout refresh interval
    pub const FPS_SAMPLE_MS: u64 = 500;
}

/// Keyboard step sizes for the parameter controls
pub mod controls {
    pub const COUNT_STEP: usize = 500;
    pub const WIND_DIRECTION_STEP: f32 = 0.1;
    pub const WIND_STRENGTH_STEP: f32 = 0.25;
    pub const TURBULENCE_STEP: f32 = 0.1;
}
