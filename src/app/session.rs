//! Simulation side of the app, free of any GL state
//!
//! Holds the stage together with the pending edits and flushes them on
//! [`Session::tick`]. Generic over the text rasterizer so the full edit to
//! debounce to stage path runs without fonts or a window.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::params::SimParams;
use crate::sim::text_shape::TextRasterizer;
use crate::sim::{Camera, CosmicTextRasterizer, SimulationStage, TextShapeSampler};

use super::state::Controls;

pub struct Session<T: TextRasterizer + Default = CosmicTextRasterizer> {
    pub stage: SimulationStage,
    pub controls: Controls,
    /// Created on first non-empty text; font discovery is slow
    sampler: Option<TextShapeSampler<T>>,
    rng: StdRng,
}

impl<T: TextRasterizer + Default> Session<T> {
    pub fn new(params: SimParams, camera: Camera) -> Self {
        Self::with_stage(SimulationStage::new(&params, camera), params, StdRng::from_entropy())
    }

    /// Deterministic session for tests
    pub fn seeded(params: SimParams, camera: Camera, seed: u64) -> Self {
        let stage = SimulationStage::seeded(&params, camera, seed);
        Self::with_stage(stage, params, StdRng::seed_from_u64(seed))
    }

    fn with_stage(stage: SimulationStage, params: SimParams, rng: StdRng) -> Self {
        let mut session = Self {
            stage,
            controls: Controls::new(params),
            sampler: None,
            rng,
        };
        session.resample_text();
        session
    }

    /// Flush pending edits whose time has come. Text is resampled before a
    /// rebuild so freshly spawned pools see the newest cloud.
    pub fn tick(&mut self, now: Instant) {
        if self.controls.take_live() {
            self.stage.apply_live(&self.controls.pending);
        }
        if self.controls.text.poll(now) {
            self.resample_text();
        }
        if self.controls.structural.poll(now) {
            log::debug!("Applying debounced reconfiguration");
            self.stage.reconfigure(&self.controls.pending);
        }
    }

    /// Restore defaults and rebuild both pools at once
    pub fn reset(&mut self) {
        self.controls.reset();
        self.stage.reconfigure(&self.controls.pending);
        self.resample_text();
    }

    fn resample_text(&mut self) {
        let text = &self.controls.pending.scene.text;
        let cloud = if text.trim().is_empty() {
            Vec::new()
        } else {
            let sampler = self
                .sampler
                .get_or_insert_with(|| TextShapeSampler::new(T::default()));
            sampler.sample(text, &mut self.rng)
        };
        self.stage.set_text_points(cloud);
    }
}
