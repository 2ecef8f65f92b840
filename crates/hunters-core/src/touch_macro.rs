//! Scripted touchscreen gestures.
//!
//! The game polls the touchscreen through its own debounce, so every gesture
//! releases first, waits, touches, and waits again. The frame counts below are
//! what the game needs to see a distinct tap; shortening them makes taps drop.

use log::debug;

use crate::console::GuestMemory;
use crate::resolver::ResolvedAddresses;

/// Frames between a release and the next touch, and between a touch and the
/// next step, for the game to register one tap.
pub const TAP_FRAMES: u32 = 2;

/// Frames the visor button must stay held to bring the scan visor up.
pub const VISOR_HOLD_FRAMES: u32 = 30;

/// Transform bit of the jump flag; set while the game is already mid-change.
pub const JUMP_TRANSFORM_BIT: u8 = 0x10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacroStep {
    Touch { x: u16, y: u16 },
    Release,
    Advance(u32),
    /// Advance single frames while still forwarding the movement keys.
    AdvanceWithMovement(u32),
}

use MacroStep::{Advance, AdvanceWithMovement, Release, Touch};

/// What a gesture needs from the frame pump.
pub trait MacroHost: GuestMemory {
    fn touch(&mut self, x: u16, y: u16);
    fn release(&mut self);
    fn advance_frame(&mut self);
    /// Apply the movement hotkeys to the key mask, forward it, then advance.
    fn advance_frame_with_movement(&mut self);
}

/// Run a gesture to completion.
pub fn run<H: MacroHost + ?Sized>(host: &mut H, steps: &[MacroStep]) {
    for step in steps {
        match *step {
            Touch { x, y } => host.touch(x, y),
            Release => host.release(),
            Advance(n) => {
                for _ in 0..n {
                    host.advance_frame();
                }
            }
            AdvanceWithMovement(n) => {
                for _ in 0..n {
                    host.advance_frame_with_movement();
                }
            }
        }
    }
}

/// Tap the morph ball icon. The release is repeated because the boost ball
/// only arms once the touch has been gone long enough.
pub const MORPH_BALL: [MacroStep; 11] = [
    Release,
    Advance(TAP_FRAMES),
    Touch { x: 231, y: 167 },
    Advance(TAP_FRAMES),
    Release,
    Advance(TAP_FRAMES),
    Release,
    Advance(TAP_FRAMES),
    Release,
    Advance(TAP_FRAMES),
    Release,
];

pub const UI_OK: [MacroStep; 6] = tap(128, 142);
pub const UI_LEFT: [MacroStep; 6] = tap(71, 141);
pub const UI_RIGHT: [MacroStep; 6] = tap(185, 141);

pub const BEAM: [MacroStep; 6] = tap(85, 32);
pub const MISSILE: [MacroStep; 6] = tap(125, 32);

/// Weapon wheel: open it, then tap the slot.
pub const SUB_WEAPONS: [[MacroStep; 8]; 6] = [
    wheel(0),
    wheel(1),
    wheel(2),
    wheel(3),
    wheel(4),
    wheel(5),
];

const fn tap(x: u16, y: u16) -> [MacroStep; 6] {
    [
        Release,
        Advance(TAP_FRAMES),
        Touch { x, y },
        Advance(TAP_FRAMES),
        Release,
        Advance(TAP_FRAMES),
    ]
}

const fn wheel(slot: u16) -> [MacroStep; 8] {
    [
        Release,
        Advance(TAP_FRAMES),
        Touch { x: 232, y: 34 },
        Advance(TAP_FRAMES),
        Touch {
            x: 93 + 25 * slot,
            y: 48 + 25 * slot,
        },
        Advance(TAP_FRAMES),
        Release,
        Advance(TAP_FRAMES),
    ]
}

/// Toggle the scan visor.
///
/// Lowering it is a plain tap; raising it needs the button held through the
/// visor animation, during which the player can keep moving.
pub fn scan_visor<H: MacroHost + ?Sized>(host: &mut H, addrs: &ResolvedAddresses) {
    run(host, &[Release, Advance(TAP_FRAMES)]);
    let in_visor = host.arm9_read8(addrs.visor) == 0x01;
    host.touch(128, 173);
    if in_visor {
        run(host, &[Advance(TAP_FRAMES)]);
    } else {
        run(host, &[AdvanceWithMovement(VISOR_HOLD_FRAMES)]);
    }
    run(host, &[Release, Advance(TAP_FRAMES)]);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
/// Weapon ids as stored in the selected-weapon byte.
pub enum Weapon {
    PowerBeam = 0,
    VoltDriver = 1,
    Missile = 2,
    BattleHammer = 3,
    Imperialist = 4,
    Judicator = 5,
    Magmaul = 6,
    ShockCoil = 7,
    OmegaCannon = 8,
}

impl Weapon {
    /// Sub-weapons in weapon wheel order.
    pub const WHEEL: [Weapon; 6] = [
        Weapon::VoltDriver,
        Weapon::BattleHammer,
        Weapon::Imperialist,
        Weapon::Judicator,
        Weapon::Magmaul,
        Weapon::ShockCoil,
    ];

    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => Weapon::PowerBeam,
            1 => Weapon::VoltDriver,
            2 => Weapon::Missile,
            3 => Weapon::BattleHammer,
            4 => Weapon::Imperialist,
            5 => Weapon::Judicator,
            6 => Weapon::Magmaul,
            7 => Weapon::ShockCoil,
            8 => Weapon::OmegaCannon,
            _ => return None,
        })
    }

    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Gesture that equips this weapon. The Omega Cannon is a pickup and has
    /// no button.
    pub fn switch_macro(self) -> Option<&'static [MacroStep]> {
        match self {
            Weapon::PowerBeam => Some(&BEAM),
            Weapon::Missile => Some(&MISSILE),
            Weapon::OmegaCannon => None,
            sub => Self::WHEEL
                .iter()
                .position(|w| *w == sub)
                .map(|i| &SUB_WEAPONS[i][..]),
        }
    }
}

/// Whether the adventure-mode map or a user-action pause is up.
pub fn menu_open<M: GuestMemory + ?Sized>(mem: &mut M, addrs: &ResolvedAddresses) -> bool {
    mem.arm9_read8(addrs.adventure) == 0x02 && mem.arm9_read8(addrs.paused) == 0x01
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    AlreadySelected,
    MenuOpen,
    Unavailable,
    Switched,
}

/// Equip `weapon`, doing nothing when it is already equipped.
///
/// The game's switch routine also reads the jump flag; with its low nibble at
/// 0 outside a transform the touch is eaten, so the nibble is forced to 1 for
/// the gesture and put back afterwards.
pub fn switch_weapon<H: MacroHost + ?Sized>(
    host: &mut H,
    addrs: &ResolvedAddresses,
    weapon: Weapon,
) -> SwitchOutcome {
    if host.arm9_read8(addrs.selected_weapon) == weapon.id() {
        return SwitchOutcome::AlreadySelected;
    }
    if menu_open(host, addrs) {
        return SwitchOutcome::MenuOpen;
    }
    let Some(steps) = weapon.switch_macro() else {
        return SwitchOutcome::Unavailable;
    };

    let jump = host.arm9_read8(addrs.jump_flag);
    let forced = jump & JUMP_TRANSFORM_BIT == 0 && jump & 0x0F == 0;
    if forced {
        host.arm9_write8(addrs.jump_flag, (jump & 0xF0) | 0x01);
    }

    run(host, steps);

    if forced {
        let current = host.arm9_read8(addrs.jump_flag);
        host.arm9_write8(addrs.jump_flag, (current & 0xF0) | (jump & 0x0F));
    }

    debug!("Switched to {weapon:?}");
    SwitchOutcome::Switched
}
