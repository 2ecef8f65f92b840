use std::fmt;

use log::{debug, info};

use crate::console::GuestMemory;
use crate::profile::{AIM_STRIDE, HUNTER_STRIDE, PLAYER_STRIDE, RevisionProfile};

/// Shift `base` to the given player's copy of a field.
///
/// Slot 0 is the local-player layout and always maps to `base`. A result that
/// leaves the 32-bit address space falls back to `base`.
pub fn calculate_player_address(base: u32, slot: u8, increment: i32) -> u32 {
    if slot == 0 {
        return base;
    }

    let addr = i64::from(base) + i64::from(slot) * i64::from(increment);
    if !(0..=i64::from(u32::MAX)).contains(&addr) {
        debug!("Player address {base:#010X} + {slot} * {increment:#X} out of range; using base");
        return base;
    }
    addr as u32
}

/// Guest addresses of the local player for the current match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedAddresses {
    pub slot: u8,
    pub aim_x: u32,
    pub aim_y: u32,
    pub alt_form: u32,
    pub weapon_change: u32,
    pub selected_weapon: u32,
    pub chosen_hunter: u32,
    pub jump_flag: u32,
    pub in_game: u32,
    pub player_pos: u32,
    pub visor: u32,
    pub adventure: u32,
    pub paused: u32,
}

pub fn resolve(profile: &RevisionProfile, slot: u8) -> ResolvedAddresses {
    let player = |base| calculate_player_address(base, slot, PLAYER_STRIDE);
    ResolvedAddresses {
        slot,
        aim_x: calculate_player_address(profile.aim_x, slot, AIM_STRIDE),
        aim_y: calculate_player_address(profile.aim_y, slot, AIM_STRIDE),
        alt_form: player(profile.alt_form),
        weapon_change: player(profile.weapon_change),
        selected_weapon: player(profile.selected_weapon),
        chosen_hunter: calculate_player_address(profile.chosen_hunter, slot, HUNTER_STRIDE),
        jump_flag: player(profile.jump_flag),
        in_game: profile.in_game,
        player_pos: profile.player_pos,
        visor: profile.visor,
        adventure: profile.adventure,
        paused: profile.paused,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Playable characters, by the id the game stores for the chosen hunter.
pub enum Hunter {
    Samus,
    Kanden,
    Trace,
    Sylux,
    Noxus,
    Spire,
    Weavel,
    Guardian,
}

impl Hunter {
    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => Hunter::Samus,
            1 => Hunter::Kanden,
            2 => Hunter::Trace,
            3 => Hunter::Sylux,
            4 => Hunter::Noxus,
            5 => Hunter::Spire,
            6 => Hunter::Weavel,
            7 => Hunter::Guardian,
            _ => return None,
        })
    }
}

impl fmt::Display for Hunter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Reported once per match, on the tick the in-game flag comes up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchEntry {
    pub slot: u8,
    pub hunter: Option<Hunter>,
}

/// Tracks the in-game flag and keeps [`ResolvedAddresses`] in step with the
/// local player's slot.
#[derive(Debug)]
pub struct AddressResolver {
    profile: &'static RevisionProfile,
    addresses: ResolvedAddresses,
    in_game: bool,
}

impl AddressResolver {
    pub fn new(profile: &'static RevisionProfile) -> Self {
        Self {
            profile,
            addresses: resolve(profile, 0),
            in_game: false,
        }
    }

    pub fn profile(&self) -> &'static RevisionProfile {
        self.profile
    }

    pub fn addresses(&self) -> &ResolvedAddresses {
        &self.addresses
    }

    pub fn in_game(&self) -> bool {
        self.in_game
    }

    /// Sample the in-game flag; re-resolve only on the edge into a match.
    pub fn update<M: GuestMemory + ?Sized>(&mut self, mem: &mut M) -> Option<MatchEntry> {
        let in_game = mem.arm9_read16(self.profile.in_game) == 0x0001;
        let entered = in_game && !self.in_game;
        self.in_game = in_game;
        if !entered {
            return None;
        }

        let slot = mem.arm9_read8(self.profile.player_pos);
        self.addresses = resolve(self.profile, slot);
        let hunter = Hunter::from_id(mem.arm9_read8(self.addresses.chosen_hunter));

        match hunter {
            Some(hunter) => info!("Entered match as {hunter} in slot {slot}"),
            None => info!("Entered match in slot {slot}"),
        }
        Some(MatchEntry { slot, hunter })
    }
}
