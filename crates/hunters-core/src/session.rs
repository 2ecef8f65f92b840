use log::{info, warn};

use crate::console::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::input::RelativeMouse;
use crate::overlay::CursorOverlay;
use crate::profile::{RomRevision, select_profile};
use crate::resolver::{AddressResolver, ResolvedAddresses};

/// Extra vertical stylus gain so a mouse sweep covers the 4:3 screen evenly.
pub const STYLUS_ASPECT: f32 = SCREEN_WIDTH as f32 / SCREEN_HEIGHT as f32;

/// Mouse as a stylus while no match is running.
///
/// Decides from the in-game flag sampled on the previous tick, so the mouse
/// switches roles one tick after a match starts or ends.
#[derive(Debug, Default)]
pub struct AutoStylus {
    armed: bool,
}

impl AutoStylus {
    pub fn update(&mut self, in_game: bool) -> bool {
        let active = self.armed;
        self.armed = !in_game;
        active
    }
}

/// Assist-layer state for one emulator session.
#[derive(Debug)]
pub struct SessionContext {
    /// Session lifetime. `None` for a build without an address table; every
    /// guest read, write, and gesture is skipped then.
    pub resolver: Option<AddressResolver>,
    /// Per tick: hold the aim touch at the end of the tick. Cleared by
    /// gestures and the virtual stylus, set again by mouse aim.
    pub enable_aim: bool,
    /// Session lifetime, in DS screen pixels.
    pub stylus_x: f32,
    pub stylus_y: f32,
    pub mouse: RelativeMouse,
    pub auto_stylus: AutoStylus,
}

impl SessionContext {
    pub fn new(checksum: Option<u32>) -> Self {
        let profile = checksum.and_then(select_profile);
        match (profile, checksum) {
            (Some(profile), _) => info!("Detected Metroid Prime Hunters {}", profile.revision),
            (None, Some(checksum)) => match RomRevision::from_checksum(checksum) {
                Some(revision) => {
                    warn!("No address table for Metroid Prime Hunters {revision}; assist disabled")
                }
                None => warn!("Unknown cartridge checksum {checksum:#010X}; assist disabled"),
            },
            (None, None) => warn!("No cartridge inserted; assist disabled"),
        }

        Self {
            resolver: profile.map(AddressResolver::new),
            enable_aim: true,
            stylus_x: (SCREEN_WIDTH / 2) as f32,
            stylus_y: (SCREEN_HEIGHT / 2) as f32,
            mouse: RelativeMouse::default(),
            auto_stylus: AutoStylus::default(),
        }
    }

    pub fn addresses(&self) -> Option<ResolvedAddresses> {
        self.resolver.as_ref().map(|r| *r.addresses())
    }

    pub fn move_stylus(&mut self, dx: i32, dy: i32, sensitivity: f32) {
        let gain = sensitivity * 0.01;
        if dx != 0 {
            self.stylus_x += dx as f32 * gain;
        }
        if dy != 0 {
            self.stylus_y += dy as f32 * STYLUS_ASPECT * gain;
        }
        self.stylus_x = self.stylus_x.clamp(0.0, (SCREEN_WIDTH - 1) as f32);
        self.stylus_y = self.stylus_y.clamp(0.0, (SCREEN_HEIGHT - 1) as f32);
    }

    pub fn stylus_position(&self) -> (u16, u16) {
        (self.stylus_x as u16, self.stylus_y as u16)
    }

    pub fn stylus_cursor(&self) -> CursorOverlay {
        let (x, y) = self.stylus_position();
        CursorOverlay::at(x, y)
    }
}
