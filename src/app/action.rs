//! Centralized action system
//!
//! Every user-triggerable action is defined here. Parameter edits are applied
//! to [`Controls`] without touching the stage; [`App::execute`] handles the
//! actions that reach outside it (save, reset, quit).

use std::time::Instant;

use crate::config::{controls as step, limits};
use crate::params::{Population, clamp_or};

use super::App;
use super::state::{AppResult, Controls};

/// All actions that can be triggered by keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // =========================================================================
    // Playback
    // =========================================================================
    TogglePlay,
    Reset,

    // =========================================================================
    // Per-population edits
    // =========================================================================
    CycleBlend(Population),
    CycleSource(Population),
    IncreaseCount(Population),
    DecreaseCount(Population),

    // =========================================================================
    // Scene edits
    // =========================================================================
    WindLeft,
    WindRight,
    WindStronger,
    WindWeaker,
    TurbulenceUp,
    TurbulenceDown,
    TogglePersist,

    // =========================================================================
    // Text editing
    // =========================================================================
    ToggleTextEdit,
    InsertChar(char),
    Backspace,

    // =========================================================================
    // App
    // =========================================================================
    ToggleHud,
    Save,
    Quit,
}

impl Controls {
    /// Apply a parameter edit. Returns false for actions that are not
    /// parameter edits.
    pub fn apply(&mut self, action: Action, now: Instant) -> bool {
        let scene = &mut self.pending.scene;
        match action {
            Action::TogglePlay => {
                scene.playing = !scene.playing;
                self.mark_live();
            }
            Action::TogglePersist => {
                scene.persist_text_shape = !scene.persist_text_shape;
                self.mark_live();
            }
            Action::WindLeft | Action::WindRight => {
                let delta = if action == Action::WindLeft {
                    -step::WIND_DIRECTION_STEP
                } else {
                    step::WIND_DIRECTION_STEP
                };
                scene.wind_direction = clamp_or(scene.wind_direction + delta, -1.0, 1.0, 0.0);
                self.mark_live();
            }
            Action::WindStronger | Action::WindWeaker => {
                let delta = if action == Action::WindStronger {
                    step::WIND_STRENGTH_STEP
                } else {
                    -step::WIND_STRENGTH_STEP
                };
                scene.wind_strength = clamp_or(scene.wind_strength + delta, 0.0, 5.0, 0.0);
                self.mark_live();
            }
            Action::TurbulenceUp | Action::TurbulenceDown => {
                let delta = if action == Action::TurbulenceUp {
                    step::TURBULENCE_STEP
                } else {
                    -step::TURBULENCE_STEP
                };
                for population in [Population::Smoke, Population::Fire] {
                    let params = self.pending.population_mut(population);
                    params.turbulence = clamp_or(params.turbulence + delta, 0.0, 5.0, 1.0);
                }
                self.mark_live();
            }
            Action::CycleBlend(population) => {
                let params = self.pending.population_mut(population);
                params.blend_mode = params.blend_mode.next();
                self.mark_live();
            }
            Action::CycleSource(population) => {
                let params = self.pending.population_mut(population);
                params.source = params.source.next();
                self.structural.schedule(now);
            }
            Action::IncreaseCount(population) => {
                let params = self.pending.population_mut(population);
                params.count = (params.count + step::COUNT_STEP).min(population.capacity());
                self.structural.schedule(now);
            }
            Action::DecreaseCount(population) => {
                let params = self.pending.population_mut(population);
                params.count = params.count.saturating_sub(step::COUNT_STEP);
                self.structural.schedule(now);
            }
            Action::ToggleTextEdit => {
                self.text_editing = !self.text_editing;
            }
            Action::InsertChar(ch) => {
                if ch.is_control() || scene.text.chars().count() >= limits::MAX_TEXT_CHARS {
                    return true;
                }
                scene.text.push(ch);
                self.mark_live();
                self.text.schedule(now);
            }
            Action::Backspace => {
                if scene.text.pop().is_some() {
                    self.mark_live();
                    self.text.schedule(now);
                }
            }
            Action::ToggleHud => {
                self.hud_visible = !self.hud_visible;
            }
            Action::Reset | Action::Save | Action::Quit => return false,
        }
        true
    }
}

impl App {
    /// Execute an action
    pub fn execute(&mut self, action: Action, now: Instant) -> AppResult {
        match action {
            Action::Save => {
                self.save_settings();
                AppResult::Redraw
            }
            Action::Reset => {
                self.reset();
                AppResult::Redraw
            }
            Action::Quit => AppResult::Exit,
            _ => {
                if self.session.controls.apply(action, now) {
                    AppResult::Redraw
                } else {
                    AppResult::Ok
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{BlendMode, EmissionKind, SimParams};

    fn controls() -> Controls {
        Controls::new(SimParams::default())
    }

    #[test]
    fn test_blend_cycle_is_live() {
        let mut controls = controls();
        assert!(controls.apply(Action::CycleBlend(Population::Smoke), Instant::now()));
        assert_eq!(controls.pending.smoke.blend_mode, BlendMode::Additive);
        assert!(controls.take_live());
        assert!(!controls.structural.is_pending());
    }

    #[test]
    fn test_source_cycle_is_structural() {
        let mut controls = controls();
        controls.apply(Action::CycleSource(Population::Fire), Instant::now());
        assert_eq!(controls.pending.fire.source, EmissionKind::Center);
        assert!(controls.structural.is_pending());
        assert!(!controls.take_live());
    }

    #[test]
    fn test_count_respects_capacity() {
        let mut controls = controls();
        for _ in 0..20 {
            controls.apply(Action::IncreaseCount(Population::Fire), Instant::now());
        }
        assert_eq!(controls.pending.fire.count, limits::MAX_FIRE_PARTICLES);

        for _ in 0..20 {
            controls.apply(Action::DecreaseCount(Population::Smoke), Instant::now());
        }
        assert_eq!(controls.pending.smoke.count, 0);
    }

    #[test]
    fn test_wind_clamped() {
        let mut controls = controls();
        for _ in 0..30 {
            controls.apply(Action::WindLeft, Instant::now());
            controls.apply(Action::WindWeaker, Instant::now());
        }
        assert_eq!(controls.pending.scene.wind_direction, -1.0);
        assert_eq!(controls.pending.scene.wind_strength, 0.0);
    }

    #[test]
    fn test_text_edit_limits_length() {
        let mut controls = controls();
        for _ in 0..(limits::MAX_TEXT_CHARS + 5) {
            controls.apply(Action::InsertChar('a'), Instant::now());
        }
        assert_eq!(controls.pending.scene.text.chars().count(), limits::MAX_TEXT_CHARS);
        assert!(controls.text.is_pending());

        controls.apply(Action::Backspace, Instant::now());
        assert_eq!(controls.pending.scene.text.chars().count(), limits::MAX_TEXT_CHARS - 1);
    }

    #[test]
    fn test_control_chars_ignored() {
        let mut controls = controls();
        controls.apply(Action::InsertChar('\n'), Instant::now());
        assert!(controls.pending.scene.text.is_empty());
        assert!(!controls.text.is_pending());
    }

    #[test]
    fn test_outer_actions_not_handled() {
        let mut controls = controls();
        assert!(!controls.apply(Action::Save, Instant::now()));
        assert!(!controls.apply(Action::Quit, Instant::now()));
    }
}
