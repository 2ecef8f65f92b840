//! Bridge between the egui thread, which owns the window and the devices, and
//! the emulator thread, which polls [`HostInput`] once per tick.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eframe::egui::{self, Pos2, ViewportCommand};
use hunters_core::input::{HostInput, JoystickState, KeyboardSample};

use crate::keybinds::KeyBindings;

#[derive(Debug, Default)]
struct Shared {
    keyboard: KeyboardSample,
    joystick: Option<JoystickState>,
    focused: bool,
    cursor: (i32, i32),
    center: (i32, i32),
    /// Warp asked for by the worker, applied on the next UI frame.
    warp: Option<(i32, i32)>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One UI frame's view of the devices, in window coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostFrame {
    pub keyboard: KeyboardSample,
    pub joystick: Option<JoystickState>,
    pub focused: bool,
    pub pointer: Option<(i32, i32)>,
    pub center: (i32, i32),
}

/// UI-thread half: feeds device state in, carries cursor warps out.
pub struct InputFeed {
    shared: Arc<Mutex<Shared>>,
    bindings: KeyBindings,
}

impl InputFeed {
    /// The feed and the [`HostInput`] to hand to the emulator thread.
    pub fn new(bindings: KeyBindings) -> (Self, DesktopHost) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let host = DesktopHost {
            shared: shared.clone(),
        };
        (Self { shared, bindings }, host)
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
    }

    /// Sample egui's input for this frame and apply any pending warp.
    pub fn update(&self, ctx: &egui::Context, joystick: Option<JoystickState>) {
        let frame = ctx.input(|i| {
            let center = i.screen_rect().center();
            HostFrame {
                keyboard: self.bindings.sample(|t| t.is_down(i)),
                joystick,
                focused: i.focused,
                pointer: i.pointer.latest_pos().map(to_pixel),
                center: to_pixel(center),
            }
        });

        if let Some((x, y)) = self.push(frame) {
            ctx.send_viewport_cmd(ViewportCommand::CursorPosition(Pos2::new(
                x as f32, y as f32,
            )));
        }
    }

    /// Publish a frame; returns the warp target if the worker asked for one.
    ///
    /// The pointer position is stale on the frame a warp is issued, so the
    /// warp target stands in for it until the window reports movement.
    pub fn push(&self, frame: HostFrame) -> Option<(i32, i32)> {
        let mut s = lock(&self.shared);
        s.keyboard = frame.keyboard;
        s.joystick = frame.joystick;
        s.focused = frame.focused;
        s.center = frame.center;

        let warp = s.warp.take();
        match (warp, frame.pointer) {
            (Some(target), _) => s.cursor = target,
            (None, Some(pointer)) => s.cursor = pointer,
            (None, None) => {}
        }
        warp
    }
}

fn to_pixel(pos: Pos2) -> (i32, i32) {
    (pos.x.round() as i32, pos.y.round() as i32)
}

/// Emulator-thread half.
#[derive(Clone)]
pub struct DesktopHost {
    shared: Arc<Mutex<Shared>>,
}

impl HostInput for DesktopHost {
    fn keyboard(&self) -> KeyboardSample {
        let s = lock(&self.shared);
        if s.focused {
            s.keyboard
        } else {
            KeyboardSample::default()
        }
    }

    fn poll_joystick(&mut self) -> Option<JoystickState> {
        lock(&self.shared).joystick.clone()
    }

    fn is_focused(&self) -> bool {
        lock(&self.shared).focused
    }

    fn cursor_position(&self) -> (i32, i32) {
        lock(&self.shared).cursor
    }

    fn window_center(&self) -> (i32, i32) {
        lock(&self.shared).center
    }

    fn warp_cursor(&mut self, x: i32, y: i32) {
        let mut s = lock(&self.shared);
        s.cursor = (x, y);
        s.warp = Some((x, y));
    }
}
