//! Spawn-position policies for respawning particles

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::config::emission;
use crate::params::{EmissionKind, Population};

/// Read-only scene inputs the emission policies depend on
#[derive(Debug, Clone, Copy)]
pub struct EmissionContext<'a> {
    /// Visible world height at z=0
    pub viewport_height: f32,
    /// Last known pointer position on the z=0 plane
    pub mouse: Vec2,
    /// Current text point cloud, empty when no text is configured
    pub text_points: &'a [Vec2],
}

impl EmissionContext<'_> {
    fn safe_viewport_height(&self) -> f32 {
        if self.viewport_height.is_finite() && self.viewport_height > 0.0 {
            self.viewport_height
        } else {
            emission::FALLBACK_VIEWPORT_HEIGHT
        }
    }

    /// y coordinate of the viewport's bottom edge
    pub fn baseline(&self) -> f32 {
        -self.safe_viewport_height() * 0.5
    }
}

/// Produce a spawn position for one particle. Never returns non-finite
/// components: a NaN anywhere falls back to a point on the baseline.
pub fn spawn<R: Rng + ?Sized>(
    population: Population,
    kind: EmissionKind,
    spread: f32,
    ctx: &EmissionContext<'_>,
    rng: &mut R,
) -> Vec3 {
    let spread = if spread.is_finite() { spread.max(0.0) } else { 1.0 };
    let is_fire = population.is_fire();

    let position = match kind {
        EmissionKind::Bottom => bottom(is_fire, spread, ctx, rng),
        EmissionKind::Center => around(is_fire, spread, Vec2::ZERO, 1.0, rng),
        EmissionKind::Mouse => {
            let mouse = if ctx.mouse.is_finite() { ctx.mouse } else { Vec2::ZERO };
            around(is_fire, spread, mouse, emission::MOUSE_SPREAD, rng)
        }
        EmissionKind::Text => {
            if ctx.text_points.is_empty() {
                around(is_fire, spread, Vec2::ZERO, 1.0, rng)
            } else {
                let point = ctx.text_points[rng.gen_range(0..ctx.text_points.len())];
                let jitter = spread * emission::TEXT_JITTER;
                Vec3::new(
                    point.x + centered(rng) * jitter,
                    point.y + centered(rng) * jitter,
                    centered(rng) * jitter,
                )
            }
        }
    };

    if position.is_finite() {
        position
    } else {
        Vec3::new(0.0, ctx.baseline(), 0.0)
    }
}

fn bottom<R: Rng + ?Sized>(
    is_fire: bool,
    spread: f32,
    ctx: &EmissionContext<'_>,
    rng: &mut R,
) -> Vec3 {
    let jitter = if is_fire {
        emission::FIRE_BOTTOM_JITTER
    } else {
        emission::SMOKE_BOTTOM_JITTER
    };
    Vec3::new(
        centered(rng) * 2.0 * emission::BOTTOM_HALF_WIDTH,
        ctx.baseline() + rng.r#gen::<f32>() * jitter,
        centered(rng) * spread * emission::BOTTOM_DEPTH_JITTER,
    )
}

fn around<R: Rng + ?Sized>(
    is_fire: bool,
    spread: f32,
    origin: Vec2,
    multiplier: f32,
    rng: &mut R,
) -> Vec3 {
    let population_scale = if is_fire {
        emission::FIRE_CENTER_SPREAD
    } else {
        emission::SMOKE_CENTER_SPREAD
    };
    let half = spread * population_scale * multiplier;
    Vec3::new(
        origin.x + centered(rng) * 2.0 * half,
        origin.y + centered(rng) * emission::CENTER_VERTICAL_JITTER,
        centered(rng) * 2.0 * half,
    )
}

/// Uniform in [-0.5, 0.5)
#[inline]
fn centered<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.r#gen::<f32>() - 0.5
}
