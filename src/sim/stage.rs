//! Orchestrates the smoke and fire populations
//!
//! The stage owns the shared clock, the scene inputs (camera, pointer, wind,
//! background) and the current text point cloud, and hands them by reference
//! to each population's step. Populations never interact, so they are
//! stepped one after the other.

use glam::Vec2;

use crate::params::{Population, PopulationParams, SimParams, StructuralKey};
use crate::sim::camera::Camera;
use crate::sim::color::{BACKGROUND_FALLBACK, Rgb};
use crate::sim::emission::EmissionContext;
use crate::sim::pool::{ParticlePool, PoolConfig};
use crate::sim::simulator::{ParticleSimulator, StepContext, StepStats, clamp_dt};
use crate::sim::text_shape::TextPointCloud;

/// Scene inputs mutated by input handlers and read by the step
#[derive(Debug, Clone)]
pub struct SceneState {
    pub camera: Camera,
    /// Last pointer position on the z=0 plane
    pub mouse: Vec2,
    pub background: Rgb,
}

impl SceneState {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            mouse: Vec2::ZERO,
            background: BACKGROUND_FALLBACK,
        }
    }
}

/// Which pools a reconfiguration replaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconfigured {
    pub smoke: bool,
    pub fire: bool,
}

struct PopulationSlot {
    pool: ParticlePool,
    simulator: ParticleSimulator,
    key: StructuralKey,
}

pub struct SimulationStage {
    params: SimParams,
    scene: SceneState,
    text_points: TextPointCloud,
    smoke: PopulationSlot,
    fire: PopulationSlot,
    time: f32,
}

impl SimulationStage {
    pub fn new(params: &SimParams, camera: Camera) -> Self {
        Self::build(params, camera, ParticleSimulator::new(), ParticleSimulator::new())
    }

    /// Deterministic stage for tests and benchmarks
    pub fn seeded(params: &SimParams, camera: Camera, seed: u64) -> Self {
        Self::build(
            params,
            camera,
            ParticleSimulator::seeded(seed),
            ParticleSimulator::seeded(seed.wrapping_add(1)),
        )
    }

    fn build(
        params: &SimParams,
        camera: Camera,
        smoke_sim: ParticleSimulator,
        fire_sim: ParticleSimulator,
    ) -> Self {
        let params = params.sanitized();
        let mut scene = SceneState::new(camera);
        scene.background = Rgb::parse_or(&params.scene.background, BACKGROUND_FALLBACK);
        let empty = PopulationParams { count: 0, ..PopulationParams::default() };

        let mut stage = Self {
            smoke: PopulationSlot {
                pool: ParticlePool::allocate(PoolConfig::from_params(Population::Smoke, &empty)),
                simulator: smoke_sim,
                key: empty.structural_key(),
            },
            fire: PopulationSlot {
                pool: ParticlePool::allocate(PoolConfig::from_params(Population::Fire, &empty)),
                simulator: fire_sim,
                key: empty.structural_key(),
            },
            params,
            scene,
            text_points: Vec::new(),
            time: 0.0,
        };
        stage.recreate(Population::Smoke);
        stage.recreate(Population::Fire);
        stage
    }

    // =========================================================================
    // Per-frame entry point
    // =========================================================================

    /// Advance both populations by one frame. `dt` is clamped to
    /// `config::sim::MAX_DT`; nothing moves while paused.
    pub fn advance(&mut self, dt: f32) -> StepStats {
        if !self.params.scene.playing {
            return StepStats::default();
        }
        let dt = clamp_dt(dt);
        self.time += dt;

        let mut total = StepStats::default();
        for population in [Population::Smoke, Population::Fire] {
            let stats = self.step_population(population, dt);
            if stats.faults > 0 {
                log::warn!(
                    "{} {} particles hit a non-finite state and were respawned",
                    stats.faults,
                    population.label()
                );
            }
            total.respawned += stats.respawned;
            total.faults += stats.faults;
        }
        total
    }

    fn step_population(&mut self, population: Population, dt: f32) -> StepStats {
        let persist_text = self.persist_active();
        let Self {
            params,
            scene,
            text_points,
            smoke,
            fire,
            time,
        } = self;
        let slot = match population {
            Population::Smoke => smoke,
            Population::Fire => fire,
        };
        let ctx = StepContext {
            dt,
            time: *time,
            params: params.population(population),
            wind_direction: params.scene.wind_direction,
            wind_strength: params.scene.wind_strength,
            emission: EmissionContext {
                viewport_height: scene.camera.visible_height(),
                mouse: scene.mouse,
                text_points,
            },
            persist_text,
        };
        slot.simulator.step(&mut slot.pool, &ctx)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Apply a full parameter set. Pools whose count, colors or emission
    /// source changed are recreated and freshly spawned; every other change,
    /// blend mode included, is applied in place. Safe to call at any cadence.
    pub fn reconfigure(&mut self, params: &SimParams) -> Reconfigured {
        let params = params.sanitized();
        let smoke_changed = params.smoke.structural_key() != self.smoke.key;
        let fire_changed = params.fire.structural_key() != self.fire.key;
        self.params = params;
        self.apply_scene();

        if smoke_changed {
            self.recreate(Population::Smoke);
        }
        if fire_changed {
            self.recreate(Population::Fire);
        }
        self.apply_pool_settings();

        Reconfigured {
            smoke: smoke_changed,
            fire: fire_changed,
        }
    }

    /// Apply only the live-readable fields of `params` (scalars, blend mode,
    /// scene values). Structural fields keep their current values until the
    /// next [`reconfigure`](Self::reconfigure).
    pub fn apply_live(&mut self, params: &SimParams) {
        let params = params.sanitized();
        for population in [Population::Smoke, Population::Fire] {
            let incoming = params.population(population);
            let current = self.params.population_mut(population);
            *current = PopulationParams {
                count: current.count,
                base_color: std::mem::take(&mut current.base_color),
                accent_color: std::mem::take(&mut current.accent_color),
                source: current.source,
                ..incoming.clone()
            };
        }
        self.params.scene = params.scene;
        self.apply_scene();
        self.apply_pool_settings();
    }

    /// Push blend mode and opacity bound into the existing pools
    fn apply_pool_settings(&mut self) {
        for (slot, params) in [
            (&mut self.smoke, &self.params.smoke),
            (&mut self.fire, &self.params.fire),
        ] {
            slot.pool.set_blend_mode(params.blend_mode);
            slot.pool.clamp_alphas(params.opacity);
        }
    }

    fn apply_scene(&mut self) {
        self.scene.background = Rgb::parse_or(&self.params.scene.background, BACKGROUND_FALLBACK);
    }

    fn recreate(&mut self, population: Population) {
        let persist_text = self.persist_active();
        let params = self.params.population(population).clone();
        let viewport_height = self.scene.camera.visible_height();
        let slot = match population {
            Population::Smoke => &mut self.smoke,
            Population::Fire => &mut self.fire,
        };

        slot.pool = ParticlePool::allocate(PoolConfig::from_params(population, &params));
        slot.key = params.structural_key();
        let ctx = StepContext {
            dt: 0.0,
            time: self.time,
            params: &params,
            wind_direction: self.params.scene.wind_direction,
            wind_strength: self.params.scene.wind_strength,
            emission: EmissionContext {
                viewport_height,
                mouse: self.scene.mouse,
                text_points: &self.text_points,
            },
            persist_text,
        };
        slot.simulator.spawn_all(&mut slot.pool, &ctx);
        log::info!(
            "Recreated {} pool with {} particles",
            population.label(),
            slot.pool.len()
        );
    }

    /// Replace the text point cloud and retarget every particle
    pub fn set_text_points(&mut self, points: TextPointCloud) {
        log::debug!("Text point cloud now has {} samples", points.len());
        self.text_points = points;
        self.smoke.pool.retarget(&self.text_points);
        self.fire.pool.retarget(&self.text_points);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn pool(&self, population: Population) -> &ParticlePool {
        match population {
            Population::Smoke => &self.smoke.pool,
            Population::Fire => &self.fire.pool,
        }
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneState {
        &mut self.scene
    }

    pub fn text_points(&self) -> &[Vec2] {
        &self.text_points
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Particles are attracted to the text shape instead of simulated
    pub fn persist_active(&self) -> bool {
        self.params.scene.persist_text_shape
            && !self.params.scene.text.trim().is_empty()
            && !self.text_points.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn pool_mut(&mut self, population: Population) -> &mut ParticlePool {
        match population {
            Population::Smoke => &mut self.smoke.pool,
            Population::Fire => &mut self.fire.pool,
        }
    }
}
