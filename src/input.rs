//! Input translation: key codes and timer pulses become engine actions
//!
//! Bindings are fixed. Rotation is edge-triggered, so auto-repeated rotate
//! events are dropped; every other key may repeat.

use crate::game::Action;

/// Keys the engine responds to, named after DOM `KeyboardEvent.code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Down,
    Rotate,
    Restart,
    Hold,
}

impl Key {
    /// Parse a key code such as `KeyA` or `Space`
    pub fn parse(code: &str) -> Option<Key> {
        match code {
            "KeyA" => Some(Key::Left),
            "KeyD" => Some(Key::Right),
            "KeyS" => Some(Key::Down),
            "KeyW" => Some(Key::Rotate),
            "Space" => Some(Key::Restart),
            "KeyC" => Some(Key::Hold),
            _ => None,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Key::Left => Action::LEFT,
            Key::Right => Action::RIGHT,
            Key::Down => Action::DOWN,
            Key::Rotate => Action::Rotate,
            Key::Restart => Action::Restart,
            Key::Hold => Action::Store,
        }
    }

    /// Whether holding the key may emit repeated actions
    pub fn repeats(&self) -> bool {
        !matches!(self, Key::Rotate)
    }
}

/// Maps raw key-down events to actions
#[derive(Debug, Clone, Copy, Default)]
pub struct InputFilter;

impl InputFilter {
    pub fn new() -> Self {
        Self
    }

    /// Action for a key-down event, or `None` for unknown codes and
    /// suppressed repeats
    pub fn map(&self, code: &str, repeat: bool) -> Option<Action> {
        let key = Key::parse(code)?;
        if repeat && !key.repeats() {
            return None;
        }
        Some(key.action())
    }
}

/// Produces `Tick` actions with a strictly increasing counter
#[derive(Debug, Clone, Default)]
pub struct Ticker {
    elapsed: u64,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks emitted so far
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}

impl Iterator for Ticker {
    type Item = Action;

    fn next(&mut self) -> Option<Action> {
        let action = Action::Tick {
            elapsed: self.elapsed,
        };
        self.elapsed += 1;
        Some(action)
    }
}
