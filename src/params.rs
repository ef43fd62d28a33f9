//! Live-tunable simulation parameters
//!
//! This is the data model of the configuration surface: a flat set of bounded
//! values per population plus scene-level values. Every consumer reads
//! parameters through [`SimParams::sanitized`] so out-of-range or non-finite
//! input is clamped or replaced before it reaches the simulator.

use serde::{Deserialize, Serialize};

use crate::config::limits;

/// One of the two independently configured particle sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Population {
    Smoke,
    Fire,
}

impl Population {
    pub fn is_fire(self) -> bool {
        matches!(self, Population::Fire)
    }

    /// Hard cap on the particle count for this population
    pub fn capacity(self) -> usize {
        match self {
            Population::Smoke => limits::MAX_SMOKE_PARTICLES,
            Population::Fire => limits::MAX_FIRE_PARTICLES,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Population::Smoke => "smoke",
            Population::Fire => "fire",
        }
    }
}

/// Logical compositing mode for a population
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Subtractive,
    Multiply,
}

impl BlendMode {
    pub const ALL: [BlendMode; 4] = [
        BlendMode::Normal,
        BlendMode::Additive,
        BlendMode::Subtractive,
        BlendMode::Multiply,
    ];

    /// Next mode in cycling order
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Additive => "additive",
            BlendMode::Subtractive => "subtractive",
            BlendMode::Multiply => "multiply",
        }
    }
}

/// Where a respawning particle's new position is drawn from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionKind {
    #[default]
    Bottom,
    Center,
    Mouse,
    Text,
}

impl EmissionKind {
    pub const ALL: [EmissionKind; 4] = [
        EmissionKind::Bottom,
        EmissionKind::Center,
        EmissionKind::Mouse,
        EmissionKind::Text,
    ];

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            EmissionKind::Bottom => "bottom",
            EmissionKind::Center => "center",
            EmissionKind::Mouse => "mouse",
            EmissionKind::Text => "text",
        }
    }
}

/// Parameters of one population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationParams {
    pub count: usize,
    pub base_color: String,
    pub accent_color: String,
    pub speed: f32,
    pub spread: f32,
    pub blend_mode: BlendMode,
    pub source: EmissionKind,
    pub opacity: f32,
    pub turbulence: f32,
    /// Smoke only; fire uses a fixed decay rate
    pub dissipation: f32,
    /// Smoke only
    pub buoyancy: f32,
}

/// Fields whose change invalidates and recreates a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralKey {
    pub count: usize,
    pub base_color: String,
    pub accent_color: String,
    pub source: EmissionKind,
}

impl PopulationParams {
    pub fn smoke_defaults() -> Self {
        Self {
            count: 4000,
            base_color: "#555555".to_string(),
            accent_color: "#aaaaaa".to_string(),
            speed: 1.0,
            spread: 2.0,
            blend_mode: BlendMode::Normal,
            source: EmissionKind::Bottom,
            opacity: 0.35,
            turbulence: 1.0,
            dissipation: 0.3,
            buoyancy: 0.5,
        }
    }

    pub fn fire_defaults() -> Self {
        Self {
            count: 2500,
            base_color: "#ff4400".to_string(),
            accent_color: "#ffcc00".to_string(),
            speed: 1.0,
            spread: 1.5,
            blend_mode: BlendMode::Additive,
            source: EmissionKind::Bottom,
            opacity: 0.8,
            turbulence: 1.0,
            dissipation: 0.0,
            buoyancy: 0.0,
        }
    }

    pub fn defaults_for(population: Population) -> Self {
        match population {
            Population::Smoke => Self::smoke_defaults(),
            Population::Fire => Self::fire_defaults(),
        }
    }

    /// Clamp every field into its documented range, replacing non-finite
    /// values with the population default.
    pub fn sanitized(&self, population: Population) -> Self {
        let defaults = Self::defaults_for(population);
        Self {
            count: self.count.min(population.capacity()),
            base_color: self.base_color.clone(),
            accent_color: self.accent_color.clone(),
            speed: clamp_or(self.speed, 0.0, 5.0, defaults.speed),
            spread: clamp_or(self.spread, 0.0, 10.0, defaults.spread),
            blend_mode: self.blend_mode,
            source: self.source,
            opacity: clamp_or(self.opacity, 0.0, 1.0, defaults.opacity),
            turbulence: clamp_or(self.turbulence, 0.0, 5.0, defaults.turbulence),
            dissipation: clamp_or(self.dissipation, 0.0, 2.0, defaults.dissipation),
            buoyancy: clamp_or(self.buoyancy, 0.0, 5.0, defaults.buoyancy),
        }
    }

    pub fn structural_key(&self) -> StructuralKey {
        StructuralKey {
            count: self.count,
            base_color: self.base_color.clone(),
            accent_color: self.accent_color.clone(),
            source: self.source,
        }
    }
}

impl Default for PopulationParams {
    fn default() -> Self {
        Self::smoke_defaults()
    }
}

/// Scene-wide parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    pub background: String,
    /// Horizontal wind direction in [-1, 1]
    pub wind_direction: f32,
    pub wind_strength: f32,
    pub playing: bool,
    pub text: String,
    pub persist_text_shape: bool,
}

impl SceneParams {
    pub fn sanitized(&self) -> Self {
        Self {
            background: self.background.clone(),
            wind_direction: clamp_or(self.wind_direction, -1.0, 1.0, 0.0),
            wind_strength: clamp_or(self.wind_strength, 0.0, 5.0, 0.0),
            playing: self.playing,
            text: self.text.chars().take(limits::MAX_TEXT_CHARS).collect(),
            persist_text_shape: self.persist_text_shape,
        }
    }
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            background: "#000000".to_string(),
            wind_direction: 0.0,
            wind_strength: 0.0,
            playing: true,
            text: String::new(),
            persist_text_shape: false,
        }
    }
}

/// The complete parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    #[serde(default = "PopulationParams::smoke_defaults")]
    pub smoke: PopulationParams,
    #[serde(default = "PopulationParams::fire_defaults")]
    pub fire: PopulationParams,
    #[serde(default)]
    pub scene: SceneParams,
}

impl SimParams {
    pub fn sanitized(&self) -> Self {
        Self {
            smoke: self.smoke.sanitized(Population::Smoke),
            fire: self.fire.sanitized(Population::Fire),
            scene: self.scene.sanitized(),
        }
    }

    pub fn population(&self, population: Population) -> &PopulationParams {
        match population {
            Population::Smoke => &self.smoke,
            Population::Fire => &self.fire,
        }
    }

    pub fn population_mut(&mut self, population: Population) -> &mut PopulationParams {
        match population {
            Population::Smoke => &mut self.smoke,
            Population::Fire => &mut self.fire,
        }
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            smoke: PopulationParams::smoke_defaults(),
            fire: PopulationParams::fire_defaults(),
            scene: SceneParams::default(),
        }
    }
}

/// Clamp a finite value into `[min, max]`, or return `fallback` for NaN/inf
#[inline]
pub fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_non_finite() {
        let mut params = PopulationParams::smoke_defaults();
        params.speed = f32::NAN;
        params.spread = f32::INFINITY;
        params.opacity = -3.0;
        let clean = params.sanitized(Population::Smoke);
        assert_eq!(clean.speed, 1.0);
        assert_eq!(clean.spread, 2.0);
        assert_eq!(clean.opacity, 0.0);
    }

    #[test]
    fn test_sanitize_caps_count() {
        let mut params = PopulationParams::fire_defaults();
        params.count = 1_000_000;
        assert_eq!(params.sanitized(Population::Fire).count, limits::MAX_FIRE_PARTICLES);
        params.count = 1_000_000;
        assert_eq!(params.sanitized(Population::Smoke).count, limits::MAX_SMOKE_PARTICLES);
    }

    #[test]
    fn test_scene_text_truncated() {
        let scene = SceneParams {
            text: "x".repeat(100),
            wind_direction: 4.0,
            ..SceneParams::default()
        };
        let clean = scene.sanitized();
        assert_eq!(clean.text.chars().count(), limits::MAX_TEXT_CHARS);
        assert_eq!(clean.wind_direction, 1.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: SimParams =
            serde_json::from_str(r#"{"smoke": {"count": 10}, "scene": {"text": "hi"}}"#).unwrap();
        assert_eq!(params.smoke.count, 10);
        assert_eq!(params.smoke.opacity, 0.35);
        assert_eq!(params.fire, PopulationParams::fire_defaults());
        assert_eq!(params.scene.text, "hi");
        assert!(params.scene.playing);
    }

    #[test]
    fn test_blend_mode_cycle() {
        let mut mode = BlendMode::Normal;
        for _ in 0..BlendMode::ALL.len() {
            mode = mode.next();
        }
        assert_eq!(mode, BlendMode::Normal);
        assert_eq!(BlendMode::Multiply.next(), BlendMode::Normal);
    }

    #[test]
    fn test_structural_key_ignores_scalars() {
        let a = PopulationParams::smoke_defaults();
        let mut b = a.clone();
        b.speed = 3.0;
        b.blend_mode = BlendMode::Additive;
        assert_eq!(a.structural_key(), b.structural_key());
        b.count += 1;
        assert_ne!(a.structural_key(), b.structural_key());
    }
}
