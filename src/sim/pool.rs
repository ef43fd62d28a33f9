//! Fixed-capacity structure-of-arrays particle storage
//!
//! All per-particle fields live in parallel arrays indexed by particle id.
//! Vector fields are packed `xyz xyz ...`. A pool is allocated in one go from
//! a [`PoolConfig`] and never grows or shrinks; structural changes replace the
//! whole pool.

use glam::{Vec2, Vec3};

use crate::params::{BlendMode, EmissionKind, Population, PopulationParams};
use crate::sim::color::{ColorRamp, FIRE_FALLBACK, SMOKE_FALLBACK};

/// Static configuration snapshot used at (re)spawn time
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub population: Population,
    pub count: usize,
    pub ramp: ColorRamp,
    pub blend_mode: BlendMode,
    pub source: EmissionKind,
}

impl PoolConfig {
    pub fn from_params(population: Population, params: &PopulationParams) -> Self {
        let fallback = if population.is_fire() {
            FIRE_FALLBACK
        } else {
            SMOKE_FALLBACK
        };
        Self {
            population,
            count: params.count.min(population.capacity()),
            ramp: ColorRamp::new(&params.base_color, &params.accent_color, fallback),
            blend_mode: params.blend_mode,
            source: params.source,
        }
    }
}

pub struct ParticlePool {
    config: PoolConfig,
    pub(crate) positions: Vec<f32>,
    pub(crate) velocities: Vec<f32>,
    pub(crate) colors: Vec<f32>,
    pub(crate) alphas: Vec<f32>,
    pub(crate) sizes: Vec<f32>,
    pub(crate) lives: Vec<f32>,
    pub(crate) max_lives: Vec<f32>,
    /// (phase x, phase y, time shift)
    pub(crate) turbulence_offsets: Vec<f32>,
    pub(crate) targets: Vec<f32>,
    pub(crate) random_factors: Vec<f32>,
}

impl ParticlePool {
    /// Allocate every array for `config.count` particles. Slots start dead
    /// (`life == 0`) and are spawned by the simulator on its first pass.
    pub fn allocate(config: PoolConfig) -> Self {
        let n = config.count;
        Self {
            config,
            positions: vec![0.0; n * 3],
            velocities: vec![0.0; n * 3],
            colors: vec![0.0; n * 3],
            alphas: vec![0.0; n],
            sizes: vec![crate::config::sim::MIN_SIZE; n],
            lives: vec![0.0; n],
            max_lives: vec![1.0; n],
            turbulence_offsets: vec![0.0; n * 3],
            targets: vec![0.0; n * 3],
            random_factors: vec![0.0; n * 3],
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn population(&self) -> Population {
        self.config.population
    }

    pub fn len(&self) -> usize {
        self.lives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lives.is_empty()
    }

    /// Blend mode only affects compositing, so it is swapped in place
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.config.blend_mode = mode;
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn alphas(&self) -> &[f32] {
        &self.alphas
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn lives(&self) -> &[f32] {
        &self.lives
    }

    pub fn max_lives(&self) -> &[f32] {
        &self.max_lives
    }

    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
    }

    pub fn velocity(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.velocities[i * 3..i * 3 + 3])
    }

    pub fn color(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.colors[i * 3..i * 3 + 3])
    }

    pub fn target(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.targets[i * 3..i * 3 + 3])
    }

    pub fn set_position(&mut self, i: usize, p: Vec3) {
        p.write_to_slice(&mut self.positions[i * 3..i * 3 + 3]);
    }

    pub(crate) fn set_velocity(&mut self, i: usize, v: Vec3) {
        v.write_to_slice(&mut self.velocities[i * 3..i * 3 + 3]);
    }

    pub(crate) fn set_target(&mut self, i: usize, t: Vec3) {
        t.write_to_slice(&mut self.targets[i * 3..i * 3 + 3]);
    }

    /// Target for slot `i`: the i-th text sample (wrapping), or `fallback`
    pub(crate) fn target_for(i: usize, cloud: &[Vec2], fallback: Vec3) -> Vec3 {
        if cloud.is_empty() {
            fallback
        } else {
            cloud[i % cloud.len()].extend(0.0)
        }
    }

    /// Reassign every target after the text point cloud changed. With an
    /// empty cloud targets collapse onto the current positions.
    pub fn retarget(&mut self, cloud: &[Vec2]) {
        for i in 0..self.len() {
            let target = Self::target_for(i, cloud, self.position(i));
            self.set_target(i, target);
        }
    }

    /// Cap every alpha at `max` so a lowered opacity holds before the next step
    pub fn clamp_alphas(&mut self, max: f32) {
        for alpha in &mut self.alphas {
            *alpha = alpha.clamp(0.0, max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_alphas() {
        let mut pool = ParticlePool::allocate(config(3));
        pool.alphas.copy_from_slice(&[0.9, 0.05, 0.4]);
        pool.clamp_alphas(0.3);
        assert_eq!(pool.alphas(), &[0.3, 0.05, 0.3]);
    }

    fn config(count: usize) -> PoolConfig {
        PoolConfig::from_params(
            Population::Smoke,
            &PopulationParams {
                count,
                ..PopulationParams::smoke_defaults()
            },
        )
    }

    #[test]
    fn test_allocate_sizes_all_arrays_together() {
        let pool = ParticlePool::allocate(config(100));
        assert_eq!(pool.len(), 100);
        assert_eq!(pool.positions().len(), 300);
        assert_eq!(pool.colors().len(), 300);
        assert_eq!(pool.alphas().len(), 100);
        assert_eq!(pool.turbulence_offsets.len(), 300);
        assert_eq!(pool.random_factors.len(), 300);
    }

    #[test]
    fn test_count_capped_by_population() {
        let pool = ParticlePool::allocate(config(usize::MAX));
        assert_eq!(pool.len(), Population::Smoke.capacity());
    }

    #[test]
    fn test_bad_colors_fall_back() {
        let cfg = PoolConfig::from_params(
            Population::Fire,
            &PopulationParams {
                base_color: "oops".into(),
                ..PopulationParams::fire_defaults()
            },
        );
        assert_eq!(cfg.ramp.base, FIRE_FALLBACK);
    }

    #[test]
    fn test_retarget_wraps_cloud() {
        let mut pool = ParticlePool::allocate(config(5));
        let cloud = [Vec2::new(1.0, 2.0), Vec2::new(-1.0, -2.0)];
        pool.retarget(&cloud);
        assert_eq!(pool.target(0), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(pool.target(3), Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(pool.target(4), Vec3::new(1.0, 2.0, 0.0));

        pool.set_position(2, Vec3::new(7.0, 8.0, 9.0));
        pool.retarget(&[]);
        assert_eq!(pool.target(2), Vec3::new(7.0, 8.0, 9.0));
    }
}
