//! Input state for pointer, wheel and keyboard events from the host.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Ctrl or Cmd, the platform command key.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Any modifier that turns a click into a selection toggle.
    pub fn toggles_selection(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Pointer event in client coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Wheel {
        position: Point,
        delta: Vec2,
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Wheel { position, .. } => *position,
        }
    }
}

/// A key press with its context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    /// Key name as reported by the host (`"a"`, `"Delete"`, `" "`).
    pub key: String,
    pub modifiers: Modifiers,
    /// Whether a text input currently has focus.
    pub text_field_focused: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
            text_field_focused: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn in_text_field(mut self) -> Self {
        self.text_field_focused = true;
        self
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(KeyPress),
    Released(String),
}

/// Whether the key name is the space bar.
pub fn is_space(key: &str) -> bool {
    key == " " || key.eq_ignore_ascii_case("space")
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Tracks the pointer and held keys between events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last pointer position in screen coordinates.
    pub pointer_position: Point,
    pressed_keys: HashSet<String>,
    pub modifiers: Modifiers,
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
    double_click_detected: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        self.double_click_detected = false;
        match *event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => {
                self.pointer_position = position;
                self.modifiers = modifiers;
                if button == MouseButton::Left {
                    self.register_click(position, Instant::now());
                }
            }
            PointerEvent::Up { position, .. } => {
                self.pointer_position = position;
            }
            PointerEvent::Move { position } => {
                self.pointer_position = position;
            }
            PointerEvent::Wheel {
                position, modifiers, ..
            } => {
                self.pointer_position = position;
                self.modifiers = modifiers;
            }
        }
    }

    /// Record a left click at `now`, flagging a double-click when it follows
    /// the previous click closely in time and space.
    pub fn register_click(&mut self, position: Point, now: Instant) {
        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position) {
            let elapsed = now.duration_since(last_time).as_millis();
            let distance = (position - last_pos).hypot();
            if elapsed < DOUBLE_CLICK_TIME_MS && distance < DOUBLE_CLICK_DISTANCE {
                self.double_click_detected = true;
                // Reset so a triple click is not a second double-click
                self.last_click_time = None;
                self.last_click_position = None;
                return;
            }
        }
        self.last_click_time = Some(now);
        self.last_click_position = Some(position);
    }

    /// Process a key event.
    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        match event {
            KeyEvent::Pressed(press) => {
                self.modifiers = press.modifiers;
                self.pressed_keys.insert(press.key.clone());
            }
            KeyEvent::Released(key) => {
                self.pressed_keys.remove(key);
            }
        }
    }

    /// Whether the space bar is held (arms panning).
    pub fn is_space_held(&self) -> bool {
        self.pressed_keys.iter().any(|k| is_space(k))
    }

    /// Whether the last pointer-down completed a double-click.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }
}
