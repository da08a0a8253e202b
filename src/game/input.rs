//! Movement Input
//!
//! The capability a player's input source provides to the simulation, plus
//! the input sources that ship with the crate. Device capture lives with the
//! host: keyboard input reads from a shared [`KeyState`] the host updates.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use serde::{Deserialize, Serialize};

use crate::core::vec2::Vec2;
use crate::error::SimError;

/// Source of movement, heading and switch input for one player.
pub trait MoveSet {
    /// Movement request, each axis in `[-1, 1]`. Up the board is -y.
    fn move_input(&self) -> Vec2;

    /// Facing direction. Never zero: falls back to the last nonzero
    /// movement, initially +x.
    fn heading_input(&self) -> Vec2;

    /// State of a named auxiliary control such as a weapon trigger.
    fn switch(&self, id: &str) -> bool;

    /// Registry discriminant.
    fn variant(&self) -> &'static str;

    /// Variant-specific payload for [`serialize_move_set`].
    fn serialize(&self) -> Result<String, SimError>;
}

fn clamp_axis(n: f64) -> f64 {
    if n.is_finite() {
        n.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

// =============================================================================
// IDLE
// =============================================================================

/// Input source that never moves.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdleInput;

impl IdleInput {
    /// Registry id
    pub const VARIANT: &'static str = "Idle";
}

impl MoveSet for IdleInput {
    fn move_input(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn heading_input(&self) -> Vec2 {
        Vec2::RIGHT
    }

    fn switch(&self, _id: &str) -> bool {
        false
    }

    fn variant(&self) -> &'static str {
        Self::VARIANT
    }

    fn serialize(&self) -> Result<String, SimError> {
        Ok(String::new())
    }
}

// =============================================================================
// SCRIPTED
// =============================================================================

#[derive(Debug)]
struct ScriptState {
    movement: Vec2,
    last_nonzero: Vec2,
    switches: HashSet<String>,
}

/// Input driven programmatically: bots, replays and tests.
///
/// Clones share state, so the host keeps one clone and hands another to the
/// player configuration.
#[derive(Clone, Debug)]
pub struct ScriptedInput {
    state: Rc<RefCell<ScriptState>>,
}

impl Default for ScriptedInput {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedInput {
    /// Registry id
    pub const VARIANT: &'static str = "Scripted";

    /// Idle scripted input.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ScriptState {
                movement: Vec2::ZERO,
                last_nonzero: Vec2::RIGHT,
                switches: HashSet::new(),
            })),
        }
    }

    /// Set the movement request; each axis is clamped to `[-1, 1]` and a
    /// non-finite axis reads as zero.
    pub fn set_move(&self, movement: Vec2) {
        let movement = movement.map(clamp_axis);
        let mut state = self.state.borrow_mut();
        state.movement = movement;
        if !movement.is_zero() {
            state.last_nonzero = movement;
        }
    }

    /// Hold a switch down.
    pub fn press(&self, id: &str) {
        self.state.borrow_mut().switches.insert(id.to_string());
    }

    /// Let a switch go.
    pub fn release(&self, id: &str) {
        self.state.borrow_mut().switches.remove(id);
    }
}

impl MoveSet for ScriptedInput {
    fn move_input(&self) -> Vec2 {
        self.state.borrow().movement
    }

    fn heading_input(&self) -> Vec2 {
        self.state.borrow().last_nonzero
    }

    fn switch(&self, id: &str) -> bool {
        self.state.borrow().switches.contains(id)
    }

    fn variant(&self) -> &'static str {
        Self::VARIANT
    }

    fn serialize(&self) -> Result<String, SimError> {
        Ok(String::new())
    }
}

// =============================================================================
// KEYBOARD
// =============================================================================

/// Set of currently pressed key names, shared between the host's event loop
/// and every keyboard input reading from it.
#[derive(Clone, Debug, Default)]
pub struct KeyState {
    pressed: Rc<RefCell<HashSet<String>>>,
}

impl KeyState {
    /// Empty key state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press.
    pub fn press(&self, key: &str) {
        self.pressed.borrow_mut().insert(key.to_string());
    }

    /// Record a key release.
    pub fn release(&self, key: &str) {
        self.pressed.borrow_mut().remove(key);
    }

    /// True while `key` is held.
    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.borrow().contains(key)
    }
}

/// Key names for each keyboard control.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keybinds {
    /// Move up / jump
    pub up: String,
    /// Move left
    pub left: String,
    /// Move down
    pub down: String,
    /// Move right
    pub right: String,
    /// Primary switch
    pub primary: String,
    /// Secondary switch
    pub secondary: String,
}

impl Keybinds {
    /// Bind `up, left, down, right, primary, secondary` in that order.
    pub fn new(keys: [&str; 6]) -> Self {
        let [up, left, down, right, primary, secondary] = keys.map(str::to_string);
        Self { up, left, down, right, primary, secondary }
    }

    /// WASD with V and B.
    pub fn wasd() -> Self {
        Self::new(["w", "a", "s", "d", "v", "b"])
    }

    /// Arrow keys with L and K.
    pub fn arrows() -> Self {
        Self::new(["ArrowUp", "ArrowLeft", "ArrowDown", "ArrowRight", "l", "k"])
    }
}

/// Keyboard-driven input.
pub struct KeyboardInput {
    keys: Keybinds,
    state: KeyState,
    last_nonzero: Cell<Vec2>,
}

impl KeyboardInput {
    /// Registry id
    pub const VARIANT: &'static str = "KeyboardPlayer-0";

    /// Read `keys` from `state`.
    pub fn new(keys: Keybinds, state: KeyState) -> Self {
        Self { keys, state, last_nonzero: Cell::new(Vec2::RIGHT) }
    }

    /// Bound keys.
    pub fn keys(&self) -> &Keybinds {
        &self.keys
    }

    fn axis(&self, negative: &str, positive: &str) -> f64 {
        let mut value = 0.0;
        if self.state.is_pressed(negative) {
            value -= 1.0;
        }
        if self.state.is_pressed(positive) {
            value += 1.0;
        }
        value
    }
}

impl MoveSet for KeyboardInput {
    fn move_input(&self) -> Vec2 {
        let movement = Vec2::new(
            self.axis(&self.keys.left, &self.keys.right),
            self.axis(&self.keys.up, &self.keys.down),
        );
        if !movement.is_zero() {
            self.last_nonzero.set(movement);
        }
        movement
    }

    fn heading_input(&self) -> Vec2 {
        self.move_input();
        self.last_nonzero.get()
    }

    fn switch(&self, id: &str) -> bool {
        match id {
            "primary" => self.state.is_pressed(&self.keys.primary),
            "secondary" => self.state.is_pressed(&self.keys.secondary),
            _ => false,
        }
    }

    fn variant(&self) -> &'static str {
        Self::VARIANT
    }

    fn serialize(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string(&self.keys)?)
    }
}

impl fmt::Display for KeyboardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Keybinds { up, left, down, right, primary, secondary } = &self.keys;
        write!(f, "{up}/{left}/{down}/{right}, {primary} & {secondary}")
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

type ParseFn = fn(&str, &KeyState) -> Result<Box<dyn MoveSet>, SimError>;

const VARIANTS: &[(&str, ParseFn)] = &[
    (KeyboardInput::VARIANT, |data, keys| {
        let binds: Keybinds = serde_json::from_str(data)?;
        Ok(Box::new(KeyboardInput::new(binds, keys.clone())))
    }),
    (ScriptedInput::VARIANT, |_, _| Ok(Box::new(ScriptedInput::new()))),
    (IdleInput::VARIANT, |_, _| Ok(Box::new(IdleInput))),
];

/// Encode an input source as the JSON pair `[variant, payload]`.
pub fn serialize_move_set(move_set: &dyn MoveSet) -> Result<String, SimError> {
    Ok(serde_json::to_string(&(move_set.variant(), move_set.serialize()?))?)
}

/// Decode the output of [`serialize_move_set`]. Keyboard sources read from `keys`.
pub fn parse_move_set(text: &str, keys: &KeyState) -> Result<Box<dyn MoveSet>, SimError> {
    let (variant, data): (String, String) = serde_json::from_str(text)?;
    let (_, parse) = VARIANTS
        .iter()
        .find(|(id, _)| *id == variant)
        .ok_or_else(|| SimError::UnknownInputVariant(variant.clone()))?;
    parse(&data, keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_movement() {
        let keys = KeyState::new();
        let input = KeyboardInput::new(Keybinds::wasd(), keys.clone());
        assert_eq!(input.move_input(), Vec2::ZERO);

        keys.press("a");
        keys.press("w");
        assert_eq!(input.move_input(), Vec2::new(-1.0, -1.0));

        // Opposing keys cancel
        keys.press("d");
        assert_eq!(input.move_input(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_keyboard_heading_remembers_last_direction() {
        let keys = KeyState::new();
        let input = KeyboardInput::new(Keybinds::arrows(), keys.clone());
        assert_eq!(input.heading_input(), Vec2::RIGHT);

        keys.press("ArrowLeft");
        assert_eq!(input.heading_input(), Vec2::LEFT);
        keys.release("ArrowLeft");
        assert_eq!(input.move_input(), Vec2::ZERO);
        assert_eq!(input.heading_input(), Vec2::LEFT);
    }

    #[test]
    fn test_keyboard_switches() {
        let keys = KeyState::new();
        let input = KeyboardInput::new(Keybinds::wasd(), keys.clone());
        keys.press("v");
        assert!(input.switch("primary"));
        assert!(!input.switch("secondary"));
        assert!(!input.switch("tertiary"));
    }

    #[test]
    fn test_scripted_input_clamps_and_shares_state() {
        let script = ScriptedInput::new();
        let player_side: Box<dyn MoveSet> = Box::new(script.clone());
        script.set_move(Vec2::new(3.0, -0.5));
        assert_eq!(player_side.move_input(), Vec2::new(1.0, -0.5));

        script.set_move(Vec2::ZERO);
        assert_eq!(player_side.heading_input(), Vec2::new(1.0, -0.5));

        script.press("primary");
        assert!(player_side.switch("primary"));
        script.release("primary");
        assert!(!player_side.switch("primary"));
    }

    #[test]
    fn test_non_finite_axis_reads_as_zero() {
        assert_eq!(clamp_axis(f64::NAN), 0.0);
        assert_eq!(clamp_axis(f64::INFINITY), 0.0);
        assert_eq!(clamp_axis(f64::NEG_INFINITY), 0.0);
        assert_eq!(clamp_axis(-7.0), -1.0);
        assert_eq!(clamp_axis(0.25), 0.25);
    }

    #[test]
    fn test_registry_round_trip() {
        let keys = KeyState::new();
        let input = KeyboardInput::new(Keybinds::arrows(), keys.clone());
        let text = serialize_move_set(&input).unwrap();

        let parsed = parse_move_set(&text, &keys).unwrap();
        assert_eq!(parsed.variant(), KeyboardInput::VARIANT);
        keys.press("ArrowDown");
        assert_eq!(parsed.move_input(), Vec2::new(0.0, 1.0));

        let idle = parse_move_set(&serialize_move_set(&IdleInput).unwrap(), &keys).unwrap();
        assert_eq!(idle.variant(), IdleInput::VARIANT);
    }

    #[test]
    fn test_registry_rejects_unknown_variant() {
        let err = parse_move_set(r#"["Joystick", ""]"#, &KeyState::new());
        assert!(matches!(err, Err(SimError::UnknownInputVariant(v)) if v == "Joystick"));
    }
}
