//! Application state types

use std::time::{Duration, Instant};

use crate::config::timing;
use crate::params::SimParams;

use super::debounce::Debouncer;

/// Result type for application actions
#[must_use = "Handle the AppResult so quit requests reach the event loop"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppResult {
    /// No action needed
    Ok,
    /// Something visible changed
    Redraw,
    /// The user asked to leave
    Exit,
}

impl AppResult {
    pub fn needs_redraw(&self) -> bool {
        matches!(self, AppResult::Redraw)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, AppResult::Exit)
    }
}

/// Parameter edits waiting to reach the stage
///
/// Live-readable edits are flushed on the next tick. Structural edits (count,
/// colors, source) and text edits wait for their debounce window so a burst of
/// key presses rebuilds the pools or resamples the text once.
pub struct Controls {
    pub pending: SimParams,
    pub structural: Debouncer,
    pub text: Debouncer,
    pub text_editing: bool,
    pub hud_visible: bool,
    live_dirty: bool,
}

impl Controls {
    pub fn new(params: SimParams) -> Self {
        Self {
            pending: params.sanitized(),
            structural: Debouncer::from_millis(timing::STRUCTURAL_DEBOUNCE_MS),
            text: Debouncer::from_millis(timing::TEXT_DEBOUNCE_MS),
            text_editing: false,
            hud_visible: true,
            live_dirty: false,
        }
    }

    pub fn mark_live(&mut self) {
        self.live_dirty = true;
    }

    /// Returns true once per batch of live edits
    pub fn take_live(&mut self) -> bool {
        std::mem::take(&mut self.live_dirty)
    }

    pub fn cancel_all(&mut self) {
        self.structural.cancel();
        self.text.cancel();
        self.live_dirty = false;
    }

    /// Restore default parameters, dropping anything still queued
    pub fn reset(&mut self) {
        self.cancel_all();
        self.pending = SimParams::default();
        self.text_editing = false;
    }
}

/// Frames-per-second readout averaged over a short window
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Count one frame; the readout refreshes every `FPS_SAMPLE_MS`
    pub fn record(&mut self, now: Instant) {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Duration::from_millis(timing::FPS_SAMPLE_MS) {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = now;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}
