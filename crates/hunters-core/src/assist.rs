//! Per-tick game assist: mouse aim, the virtual stylus, and hotkey gestures.
//!
//! Every guest read and write here goes through the session's resolved
//! addresses. Without them (unknown build) only key-mask remapping and the
//! virtual stylus are active.

use crate::console::{Console, GuestMemory};
use crate::input::{HostInput, Hotkey, InputState, NdsButton};
use crate::overlay::CursorOverlay;
use crate::pacing::Clock;
use crate::pump::FramePump;
use crate::resolver::ResolvedAddresses;
use crate::session::SessionContext;
use crate::touch_macro::{
    self, MORPH_BALL, MacroHost, UI_LEFT, UI_OK, UI_RIGHT, Weapon, menu_open, scan_visor,
    switch_weapon,
};

/// Touch held on the bottom screen while aiming; the game only reads aim
/// deltas while the screen is touched.
pub const AIM_TOUCH: (u16, u16) = (128, 96);

/// Vertical aim gain relative to horizontal.
pub const AIM_ASPECT: f32 = 1.5;

/// Alt-form byte value while in morph ball form.
pub const ALT_FORM_BALL: u8 = 0x02;

/// Map the movement hotkeys onto the D-pad.
pub fn apply_movement(input: &mut InputState) {
    for (hotkey, button) in [
        (Hotkey::MoveForward, NdsButton::Up),
        (Hotkey::MoveBack, NdsButton::Down),
        (Hotkey::MoveLeft, NdsButton::Left),
        (Hotkey::MoveRight, NdsButton::Right),
    ] {
        let held = input.hotkey_down(hotkey);
        input.hold(button, held);
    }
}

fn shooting(input: &InputState) -> bool {
    input.hotkey_down(Hotkey::ShootScan) || input.hotkey_down(Hotkey::ScanShoot)
}

/// Truncate toward zero and store as the game's two's-complement word.
fn aim_word(value: f32) -> u32 {
    value as i32 as u32
}

pub fn tick<C, H, K>(pump: &mut FramePump<C, H, K>, session: &mut SessionContext)
where
    C: Console,
    H: HostInput,
    K: Clock,
{
    let (dx, dy) = session.mouse.sample(pump.host_mut());
    let focused = pump.host().is_focused();

    let in_game = match session.resolver.as_mut() {
        Some(resolver) => {
            resolver.update(pump);
            resolver.in_game()
        }
        None => false,
    };
    let addrs = session.addresses();

    let auto_stylus = session.auto_stylus.update(in_game)
        && pump.settings().auto_virtual_stylus
        && addrs.is_some();

    let mut cursor = CursorOverlay::HIDDEN;
    if focused && (pump.input().hotkey_down(Hotkey::VirtualStylus) || auto_stylus) {
        // Keeps the aim touch from landing on the tick the stylus is let go.
        session.enable_aim = false;

        if shooting(pump.input()) {
            let (x, y) = session.stylus_position();
            pump.touch(x, y);
        } else {
            pump.release();
        }

        let sensitivity = pump.settings().virtual_stylus_sensitivity;
        session.move_stylus(dx, dy, sensitivity);
        cursor = session.stylus_cursor();
    } else if focused {
        if let Some(addrs) = &addrs {
            gestures(pump, session, addrs);
        }
        apply_movement(pump.input_mut());
        if let Some(addrs) = &addrs {
            aim(pump, session, addrs, dx, dy);
        }
        buttons(pump, session);
    }

    if let Some(addrs) = &addrs {
        let in_ball = pump.arm9_read8(addrs.alt_form) == ALT_FORM_BALL;
        if !in_ball && session.enable_aim {
            pump.touch(AIM_TOUCH.0, AIM_TOUCH.1);
        }
    }

    pump.apply_key_mask();
    pump.set_cursor(cursor);
    pump.advance_once();
}

fn gestures<C, H, K>(
    pump: &mut FramePump<C, H, K>,
    session: &mut SessionContext,
    addrs: &ResolvedAddresses,
) where
    C: Console,
    H: HostInput,
    K: Clock,
{
    // Gestures advance frames and re-poll input; act on this tick's edges.
    let pressed = pump.input().snapshot().pressed;

    if pressed.contains(Hotkey::MorphBall) {
        // The alt-form byte lags the gesture by a few frames.
        session.enable_aim = false;
        touch_macro::run(pump, &MORPH_BALL);
    }

    if pressed.contains(Hotkey::ScanVisor) {
        scan_visor(pump, addrs);
    }

    for (hotkey, steps) in [
        (Hotkey::UiOk, &UI_OK),
        (Hotkey::UiLeft, &UI_LEFT),
        (Hotkey::UiRight, &UI_RIGHT),
    ] {
        if pressed.contains(hotkey) {
            touch_macro::run(pump, steps);
        }
    }

    if pressed.contains(Hotkey::WeaponBeam) {
        switch_weapon(pump, addrs, Weapon::PowerBeam);
    }
    if pressed.contains(Hotkey::WeaponMissile) {
        switch_weapon(pump, addrs, Weapon::Missile);
    }
    for (hotkey, weapon) in Hotkey::WEAPON_SLOTS.into_iter().zip(Weapon::WHEEL) {
        if pressed.contains(hotkey) {
            switch_weapon(pump, addrs, weapon);
        }
    }
}

fn aim<C, H, K>(
    pump: &mut FramePump<C, H, K>,
    session: &mut SessionContext,
    addrs: &ResolvedAddresses,
    dx: i32,
    dy: i32,
) where
    C: Console,
    H: HostInput,
    K: Clock,
{
    if (dx == 0 && dy == 0) || menu_open(pump, addrs) {
        return;
    }

    let gain = pump.settings().aim_sensitivity * 0.01;
    if dx != 0 {
        pump.arm9_write32(addrs.aim_x, aim_word(dx as f32 * gain));
        session.enable_aim = true;
    }
    if dy != 0 {
        pump.arm9_write32(addrs.aim_y, aim_word(dy as f32 * AIM_ASPECT * gain));
        session.enable_aim = true;
    }
}

fn buttons<C, H, K>(pump: &mut FramePump<C, H, K>, session: &mut SessionContext)
where
    C: Console,
    H: HostInput,
    K: Clock,
{
    let boost = pump.input().hotkey_down(Hotkey::MorphBallBoost);
    if boost {
        // Boosting needs the screen free.
        session.enable_aim = false;
        pump.release();
    }

    let shoot = shooting(pump.input());
    let jump = pump.input().hotkey_down(Hotkey::Jump);
    let menu = pump.input().hotkey_down(Hotkey::Menu);

    let input = pump.input_mut();
    input.hold(NdsButton::R, boost);
    input.hold(NdsButton::L, shoot);
    input.hold(NdsButton::B, jump);
    input.hold(NdsButton::Start, menu);
}
