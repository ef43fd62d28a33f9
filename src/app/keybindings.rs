//! Keyboard shortcut registry
//!
//! Maps keyboard input to Actions. All keybindings are defined in one place.
//! Shift selects the fire population for per-population shortcuts. While the
//! text field is being edited, printable keys type into it instead.

use super::action::Action;
use crate::params::Population;

/// Modifier key state
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }
}

/// Represents a key that can be pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Enter,
    Tab,
    Backspace,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
}

/// A keyboard input event (key + modifiers)
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// Resolve a key event to an action
///
/// Returns None if the key event doesn't map to any action.
pub fn resolve(event: &KeyEvent, text_editing: bool) -> Option<Action> {
    if text_editing {
        return resolve_text_edit(event);
    }

    let KeyEvent { key, modifiers } = event;
    let Modifiers { ctrl, shift, alt } = *modifiers;
    let target = if shift { Population::Fire } else { Population::Smoke };

    match key {
        Key::Escape => Some(Action::Quit),
        Key::Tab => Some(Action::ToggleTextEdit),
        Key::Space if !ctrl && !alt => Some(Action::TogglePlay),

        // =================================================================
        // Arrows: counts vertically, wind direction horizontally
        // =================================================================
        Key::ArrowUp => Some(Action::IncreaseCount(target)),
        Key::ArrowDown => Some(Action::DecreaseCount(target)),
        Key::ArrowLeft => Some(Action::WindLeft),
        Key::ArrowRight => Some(Action::WindRight),

        Key::Char(c) => resolve_char(*c, ctrl, shift, alt),
        _ => None,
    }
}

/// Resolve character key shortcuts
fn resolve_char(c: char, ctrl: bool, shift: bool, alt: bool) -> Option<Action> {
    if alt {
        return None;
    }
    let lower = c.to_ascii_lowercase();
    // Some layouts report the shifted character without the shift flag
    let target = if shift || c.is_ascii_uppercase() {
        Population::Fire
    } else {
        Population::Smoke
    };

    match lower {
        's' if ctrl => Some(Action::Save),
        _ if ctrl => None,

        'b' => Some(Action::CycleBlend(target)),
        's' => Some(Action::CycleSource(target)),
        't' => Some(Action::TogglePersist),
        'h' => Some(Action::ToggleHud),
        'r' => Some(Action::Reset),
        '+' | '=' => Some(Action::WindStronger),
        '-' | '_' => Some(Action::WindWeaker),
        ']' | '}' => Some(Action::TurbulenceUp),
        '[' | '{' => Some(Action::TurbulenceDown),
        _ => None,
    }
}

fn resolve_text_edit(event: &KeyEvent) -> Option<Action> {
    let KeyEvent { key, modifiers } = event;
    match key {
        Key::Escape | Key::Enter | Key::Tab => Some(Action::ToggleTextEdit),
        Key::Backspace => Some(Action::Backspace),
        Key::Space => Some(Action::InsertChar(' ')),
        Key::Char(c) if modifiers.ctrl && c.eq_ignore_ascii_case(&'s') => Some(Action::Save),
        Key::Char(c) if !modifiers.ctrl && !modifiers.alt => Some(Action::InsertChar(*c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_s_save() {
        let event = KeyEvent::new(Key::Char('s'), Modifiers::ctrl());
        assert_eq!(resolve(&event, false), Some(Action::Save));
        assert_eq!(resolve(&event, true), Some(Action::Save));
    }

    #[test]
    fn test_shift_targets_fire() {
        let event = KeyEvent::new(Key::Char('B'), Modifiers::shift());
        assert_eq!(resolve(&event, false), Some(Action::CycleBlend(Population::Fire)));

        let event = KeyEvent::new(Key::Char('b'), Modifiers::none());
        assert_eq!(resolve(&event, false), Some(Action::CycleBlend(Population::Smoke)));

        let event = KeyEvent::new(Key::ArrowUp, Modifiers::shift());
        assert_eq!(resolve(&event, false), Some(Action::IncreaseCount(Population::Fire)));
    }

    #[test]
    fn test_space_toggles_play() {
        let event = KeyEvent::new(Key::Space, Modifiers::none());
        assert_eq!(resolve(&event, false), Some(Action::TogglePlay));
    }

    #[test]
    fn test_text_edit_mode_types() {
        let event = KeyEvent::new(Key::Char('b'), Modifiers::none());
        assert_eq!(resolve(&event, true), Some(Action::InsertChar('b')));

        let event = KeyEvent::new(Key::Space, Modifiers::none());
        assert_eq!(resolve(&event, true), Some(Action::InsertChar(' ')));

        let event = KeyEvent::new(Key::Escape, Modifiers::none());
        assert_eq!(resolve(&event, true), Some(Action::ToggleTextEdit));
    }

    #[test]
    fn test_escape_quits_outside_text_edit() {
        let event = KeyEvent::new(Key::Escape, Modifiers::none());
        assert_eq!(resolve(&event, false), Some(Action::Quit));
    }
}
