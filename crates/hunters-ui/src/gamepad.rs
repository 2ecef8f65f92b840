//! Joystick polling through gilrs, flattened into the indexed button/hat/axis
//! layout the core bindings refer to.

use gilrs::{Axis, Button, Event as GilrsEvent, EventType, GamepadId, Gilrs};
use hunters_core::input::{HAT_DOWN, HAT_LEFT, HAT_RIGHT, HAT_UP, JoystickState};
use log::{info, warn};

/// Button indices as stored in joystick bindings. The D-pad is reported as
/// hat 0 instead.
pub const BUTTON_ORDER: [Button; 13] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
];

pub const AXIS_ORDER: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

pub fn axis_to_raw(axis: Axis, value: f32) -> i16 {
    // gilrs reports stick up as positive; bindings expect down-positive.
    let value = match axis {
        Axis::LeftStickY | Axis::RightStickY => -value,
        _ => value,
    };
    (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

pub fn dpad_hat(pressed: impl Fn(Button) -> bool) -> u8 {
    [
        (Button::DPadUp, HAT_UP),
        (Button::DPadRight, HAT_RIGHT),
        (Button::DPadDown, HAT_DOWN),
        (Button::DPadLeft, HAT_LEFT),
    ]
    .into_iter()
    .filter(|(button, _)| pressed(*button))
    .fold(0, |hat, (_, bit)| hat | bit)
}

pub fn snapshot(pressed: impl Fn(Button) -> bool, value: impl Fn(Axis) -> f32) -> JoystickState {
    JoystickState {
        buttons: BUTTON_ORDER.iter().map(|b| pressed(*b)).collect(),
        hats: vec![dpad_hat(&pressed)],
        axes: AXIS_ORDER.iter().map(|a| axis_to_raw(*a, value(*a))).collect(),
    }
}

/// Follows the first connected gamepad, switching when it goes away.
pub struct GamepadPoller {
    gilrs: Option<Gilrs>,
    active: Option<GamepadId>,
}

impl Default for GamepadPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl GamepadPoller {
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => {
                for (_, gamepad) in gilrs.gamepads() {
                    info!("Gamepad found: {}", gamepad.name());
                }
                Some(gilrs)
            }
            Err(e) => {
                warn!("Gamepad support unavailable: {e}");
                None
            }
        };
        Self {
            gilrs,
            active: None,
        }
    }

    /// Drain pending events and read the active pad.
    pub fn poll(&mut self) -> Option<JoystickState> {
        let gilrs = self.gilrs.as_mut()?;

        while let Some(GilrsEvent { id, event, .. }) = gilrs.next_event() {
            match event {
                EventType::Connected if self.active.is_none() => {
                    info!("Gamepad connected: {}", gilrs.gamepad(id).name());
                    self.active = Some(id);
                }
                EventType::Disconnected if self.active == Some(id) => {
                    info!("Gamepad disconnected");
                    self.active = None;
                }
                _ => {}
            }
        }

        if self.active.is_none() {
            self.active = gilrs
                .gamepads()
                .find(|(_, gamepad)| gamepad.is_connected())
                .map(|(id, _)| id);
        }

        let gamepad = gilrs.connected_gamepad(self.active?)?;
        Some(snapshot(|b| gamepad.is_pressed(b), |a| gamepad.value(a)))
    }
}
