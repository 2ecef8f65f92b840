//! Per-tick host input sampling.
//!
//! Keyboard and mouse-button state arrives from the UI thread already resolved
//! to logical ids (see [`KeyboardSample`]); joystick state is probed here and
//! resolved through [`InputBindings`]. Everything that depends on the previous
//! tick lives in [`InputSnapshot::advance`] so edge detection stays a pure
//! function of two masks.

/// Number of physical DS buttons carried in the key mask.
pub const BUTTON_COUNT: usize = 12;

/// Key mask with every button released (the mask is active-low).
pub const BUTTONS_RELEASED: u16 = (1 << BUTTON_COUNT) - 1;

/// Raw axis magnitude past which an axis binding counts as held.
pub const AXIS_THRESHOLD: i16 = 16384;

pub const HAT_UP: u8 = 0x1;
pub const HAT_RIGHT: u8 = 0x2;
pub const HAT_DOWN: u8 = 0x4;
pub const HAT_LEFT: u8 = 0x8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
/// Physical DS buttons in key-mask bit order.
pub enum NdsButton {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Right = 4,
    Left = 5,
    Up = 6,
    Down = 7,
    R = 8,
    L = 9,
    X = 10,
    Y = 11,
}

impl NdsButton {
    pub const ALL: [NdsButton; BUTTON_COUNT] = [
        NdsButton::A,
        NdsButton::B,
        NdsButton::Select,
        NdsButton::Start,
        NdsButton::Right,
        NdsButton::Left,
        NdsButton::Up,
        NdsButton::Down,
        NdsButton::R,
        NdsButton::L,
        NdsButton::X,
        NdsButton::Y,
    ];

    #[inline]
    pub const fn bit(self) -> u16 {
        1 << self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            NdsButton::A => "a",
            NdsButton::B => "b",
            NdsButton::Select => "select",
            NdsButton::Start => "start",
            NdsButton::Right => "right",
            NdsButton::Left => "left",
            NdsButton::Up => "up",
            NdsButton::Down => "down",
            NdsButton::R => "r",
            NdsButton::L => "l",
            NdsButton::X => "x",
            NdsButton::Y => "y",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// Logical frontend and game-assist actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Hotkey {
    Pause,
    Reset,
    FastForward,
    FastForwardToggle,
    FullscreenToggle,
    SwapScreens,
    SwapScreenEmphasis,
    FrameStep,
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Jump,
    MorphBall,
    MorphBallBoost,
    ShootScan,
    ScanShoot,
    ScanVisor,
    UiOk,
    UiLeft,
    UiRight,
    WeaponBeam,
    WeaponMissile,
    Weapon1,
    Weapon2,
    Weapon3,
    Weapon4,
    Weapon5,
    Weapon6,
    Menu,
    VirtualStylus,
}

pub const HOTKEY_COUNT: usize = Hotkey::ALL.len();

impl Hotkey {
    pub const ALL: [Hotkey; 31] = [
        Hotkey::Pause,
        Hotkey::Reset,
        Hotkey::FastForward,
        Hotkey::FastForwardToggle,
        Hotkey::FullscreenToggle,
        Hotkey::SwapScreens,
        Hotkey::SwapScreenEmphasis,
        Hotkey::FrameStep,
        Hotkey::MoveForward,
        Hotkey::MoveBack,
        Hotkey::MoveLeft,
        Hotkey::MoveRight,
        Hotkey::Jump,
        Hotkey::MorphBall,
        Hotkey::MorphBallBoost,
        Hotkey::ShootScan,
        Hotkey::ScanShoot,
        Hotkey::ScanVisor,
        Hotkey::UiOk,
        Hotkey::UiLeft,
        Hotkey::UiRight,
        Hotkey::WeaponBeam,
        Hotkey::WeaponMissile,
        Hotkey::Weapon1,
        Hotkey::Weapon2,
        Hotkey::Weapon3,
        Hotkey::Weapon4,
        Hotkey::Weapon5,
        Hotkey::Weapon6,
        Hotkey::Menu,
        Hotkey::VirtualStylus,
    ];

    /// Sub-weapon slots of the weapon wheel, in wheel order.
    pub const WEAPON_SLOTS: [Hotkey; 6] = [
        Hotkey::Weapon1,
        Hotkey::Weapon2,
        Hotkey::Weapon3,
        Hotkey::Weapon4,
        Hotkey::Weapon5,
        Hotkey::Weapon6,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Hotkey::Pause => "pause",
            Hotkey::Reset => "reset",
            Hotkey::FastForward => "fast_forward",
            Hotkey::FastForwardToggle => "fast_forward_toggle",
            Hotkey::FullscreenToggle => "fullscreen",
            Hotkey::SwapScreens => "swap_screens",
            Hotkey::SwapScreenEmphasis => "swap_emphasis",
            Hotkey::FrameStep => "frame_step",
            Hotkey::MoveForward => "move_forward",
            Hotkey::MoveBack => "move_back",
            Hotkey::MoveLeft => "move_left",
            Hotkey::MoveRight => "move_right",
            Hotkey::Jump => "jump",
            Hotkey::MorphBall => "morph_ball",
            Hotkey::MorphBallBoost => "morph_ball_boost",
            Hotkey::ShootScan => "shoot_scan",
            Hotkey::ScanShoot => "scan_shoot",
            Hotkey::ScanVisor => "scan_visor",
            Hotkey::UiOk => "ui_ok",
            Hotkey::UiLeft => "ui_left",
            Hotkey::UiRight => "ui_right",
            Hotkey::WeaponBeam => "weapon_beam",
            Hotkey::WeaponMissile => "weapon_missile",
            Hotkey::Weapon1 => "weapon_1",
            Hotkey::Weapon2 => "weapon_2",
            Hotkey::Weapon3 => "weapon_3",
            Hotkey::Weapon4 => "weapon_4",
            Hotkey::Weapon5 => "weapon_5",
            Hotkey::Weapon6 => "weapon_6",
            Hotkey::Menu => "menu",
            Hotkey::VirtualStylus => "virtual_stylus",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }
}

/// Set of hotkeys, one bit per [`Hotkey`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HotkeySet(u64);

impl HotkeySet {
    pub const EMPTY: HotkeySet = HotkeySet(0);

    #[inline]
    pub const fn contains(self, hotkey: Hotkey) -> bool {
        self.0 & (1 << hotkey as u8) != 0
    }

    #[inline]
    pub fn insert(&mut self, hotkey: Hotkey) {
        self.0 |= 1 << hotkey as u8;
    }

    #[inline]
    pub fn remove(&mut self, hotkey: Hotkey) {
        self.0 &= !(1 << hotkey as u8);
    }

    #[inline]
    pub const fn union(self, other: HotkeySet) -> HotkeySet {
        HotkeySet(self.0 | other.0)
    }

    /// Hotkeys in `self` that are not in `other`.
    #[inline]
    pub const fn difference(self, other: HotkeySet) -> HotkeySet {
        HotkeySet(self.0 & !other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Hotkey> {
        Hotkey::ALL.into_iter().filter(move |h| self.contains(*h))
    }
}

impl FromIterator<Hotkey> for HotkeySet {
    fn from_iter<I: IntoIterator<Item = Hotkey>>(iter: I) -> Self {
        let mut set = HotkeySet::EMPTY;
        for hotkey in iter {
            set.insert(hotkey);
        }
        set
    }
}

/// Raw state of the selected joystick at poll time.
///
/// Missing entries read as released/centred, so a binding that refers to a
/// control the current device lacks is simply never pressed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoystickState {
    pub buttons: Vec<bool>,
    /// One `HAT_*` bitmask per hat.
    pub hats: Vec<u8>,
    pub axes: Vec<i16>,
}

impl JoystickState {
    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    pub fn hat(&self, index: usize) -> u8 {
        self.hats.get(index).copied().unwrap_or(0)
    }

    pub fn axis(&self, index: usize) -> i16 {
        self.axes.get(index).copied().unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoyDigital {
    Button(u16),
    Hat { hat: u8, direction: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisDirection {
    Positive,
    Negative,
    Trigger,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JoyAxis {
    pub axis: u8,
    pub direction: AxisDirection,
}

/// A joystick binding: a button or hat direction, an axis, or both.
///
/// Bindings are stored in config files in a packed integer form:
///
/// - `-1`: unbound
/// - bits 0-15: button index, or `0xFFFF` for no button
/// - bit 8 set: hat binding instead, bits 4-7 hat number, bits 0-3 direction
/// - bit 16 set: axis binding, bits 24-27 axis number, bits 20-23 direction
///   (0 positive, 1 negative, 2 trigger)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JoyMapping {
    pub digital: Option<JoyDigital>,
    pub axis: Option<JoyAxis>,
}

impl JoyMapping {
    pub fn from_raw(raw: i32) -> Option<Self> {
        if raw == -1 {
            return None;
        }

        let digital = if raw & 0xFFFF != 0xFFFF {
            if raw & 0x100 != 0 {
                Some(JoyDigital::Hat {
                    hat: ((raw >> 4) & 0xF) as u8,
                    direction: (raw & 0xF) as u8,
                })
            } else {
                Some(JoyDigital::Button((raw & 0xFFFF) as u16))
            }
        } else {
            None
        };

        let axis = if raw & 0x10000 != 0 {
            let direction = match (raw >> 20) & 0xF {
                0 => Some(AxisDirection::Positive),
                1 => Some(AxisDirection::Negative),
                2 => Some(AxisDirection::Trigger),
                _ => None,
            };
            direction.map(|direction| JoyAxis {
                axis: ((raw >> 24) & 0xF) as u8,
                direction,
            })
        } else {
            None
        };

        if digital.is_none() && axis.is_none() {
            return None;
        }
        Some(Self { digital, axis })
    }

    pub fn to_raw(&self) -> i32 {
        let mut raw = match self.digital {
            Some(JoyDigital::Button(button)) => i32::from(button),
            Some(JoyDigital::Hat { hat, direction }) => {
                0x100 | (i32::from(hat & 0xF) << 4) | i32::from(direction & 0xF)
            }
            None => 0xFFFF,
        };
        if let Some(axis) = self.axis {
            let dir = match axis.direction {
                AxisDirection::Positive => 0,
                AxisDirection::Negative => 1,
                AxisDirection::Trigger => 2,
            };
            raw |= 0x10000 | (i32::from(axis.axis & 0xF) << 24) | (dir << 20);
        }
        raw
    }

    pub fn is_down(&self, joystick: &JoystickState) -> bool {
        let digital = match self.digital {
            Some(JoyDigital::Button(button)) => joystick.button(usize::from(button)),
            Some(JoyDigital::Hat { hat, direction }) => {
                let value = joystick.hat(usize::from(hat));
                matches!(direction, HAT_UP | HAT_RIGHT | HAT_DOWN | HAT_LEFT)
                    && value & direction != 0
            }
            None => false,
        };
        if digital {
            return true;
        }

        match self.axis {
            Some(JoyAxis { axis, direction }) => {
                let value = joystick.axis(usize::from(axis));
                match direction {
                    AxisDirection::Positive => value > AXIS_THRESHOLD,
                    AxisDirection::Negative => value < -AXIS_THRESHOLD,
                    AxisDirection::Trigger => value > 0,
                }
            }
            None => false,
        }
    }

    /// Position of the bound axis in [-1, 1], or 0 without an axis binding.
    pub fn analog_value(&self, joystick: &JoystickState) -> f32 {
        match self.axis {
            Some(JoyAxis { axis, .. }) => {
                let raw = joystick.axis(usize::from(axis));
                (f32::from(raw) / f32::from(i16::MAX)).clamp(-1.0, 1.0)
            }
            None => 0.0,
        }
    }
}

/// Joystick bindings for buttons and hotkeys.
///
/// Keyboard and mouse bindings are resolved by the host before they reach
/// the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputBindings {
    pub buttons: [Option<JoyMapping>; BUTTON_COUNT],
    pub hotkeys: [Option<JoyMapping>; HOTKEY_COUNT],
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            buttons: [None; BUTTON_COUNT],
            hotkeys: [None; HOTKEY_COUNT],
        }
    }
}

impl InputBindings {
    pub fn bind_button(&mut self, button: NdsButton, mapping: Option<JoyMapping>) {
        self.buttons[button as usize] = mapping;
    }

    pub fn bind_hotkey(&mut self, hotkey: Hotkey, mapping: Option<JoyMapping>) {
        self.hotkeys[hotkey.index()] = mapping;
    }

    pub fn hotkey(&self, hotkey: Hotkey) -> Option<&JoyMapping> {
        self.hotkeys[hotkey.index()].as_ref()
    }
}

/// Keyboard and mouse-button state as resolved by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyboardSample {
    /// Held buttons, one bit per [`NdsButton`] (active-high).
    pub buttons: u16,
    pub hotkeys: HotkeySet,
}

/// Host devices the frame pump polls.
pub trait HostInput {
    fn keyboard(&self) -> KeyboardSample;

    /// Re-probe the configured joystick. `None` when no device is attached.
    fn poll_joystick(&mut self) -> Option<JoystickState>;

    fn is_focused(&self) -> bool;

    /// Cursor position in screen coordinates.
    fn cursor_position(&self) -> (i32, i32);

    /// Centre of the emulator window in screen coordinates.
    fn window_center(&self) -> (i32, i32);

    fn warp_cursor(&mut self, x: i32, y: i32);
}

/// Hotkey state for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputSnapshot {
    pub down: HotkeySet,
    pub pressed: HotkeySet,
    pub released: HotkeySet,
    /// Active-low physical button mask.
    pub buttons: u16,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            down: HotkeySet::EMPTY,
            pressed: HotkeySet::EMPTY,
            released: HotkeySet::EMPTY,
            buttons: BUTTONS_RELEASED,
        }
    }
}

impl InputSnapshot {
    /// Build the next tick's snapshot from this one.
    pub fn advance(&self, down: HotkeySet, buttons: u16) -> InputSnapshot {
        InputSnapshot {
            down,
            pressed: down.difference(self.down),
            released: self.down.difference(down),
            buttons: buttons & BUTTONS_RELEASED,
        }
    }
}

/// Input state owned by the frame pump.
#[derive(Debug, Default)]
pub struct InputState {
    bindings: InputBindings,
    snapshot: InputSnapshot,
    joystick: Option<JoystickState>,
    /// Active-low mask forwarded to the console; starts from the physical
    /// mask each poll and is then edited by the assist layer.
    input_mask: u16,
}

impl InputState {
    pub fn new(bindings: InputBindings) -> Self {
        Self {
            bindings,
            snapshot: InputSnapshot::default(),
            joystick: None,
            input_mask: BUTTONS_RELEASED,
        }
    }

    pub fn set_bindings(&mut self, bindings: InputBindings) {
        self.bindings = bindings;
    }

    pub fn process<H: HostInput + ?Sized>(&mut self, host: &mut H) {
        let keyboard = host.keyboard();
        self.joystick = host.poll_joystick();

        let mut joy_mask = BUTTONS_RELEASED;
        let mut joy_hotkeys = HotkeySet::EMPTY;
        if let Some(joystick) = &self.joystick {
            for button in NdsButton::ALL {
                if let Some(mapping) = &self.bindings.buttons[button as usize]
                    && mapping.is_down(joystick)
                {
                    joy_mask &= !button.bit();
                }
            }
            for hotkey in Hotkey::ALL {
                if let Some(mapping) = self.bindings.hotkey(hotkey)
                    && mapping.is_down(joystick)
                {
                    joy_hotkeys.insert(hotkey);
                }
            }
        }

        let key_mask = !keyboard.buttons & BUTTONS_RELEASED;
        self.input_mask = key_mask & joy_mask;
        self.snapshot = self
            .snapshot
            .advance(keyboard.hotkeys.union(joy_hotkeys), self.input_mask);
    }

    pub fn snapshot(&self) -> &InputSnapshot {
        &self.snapshot
    }

    #[inline]
    pub fn hotkey_down(&self, hotkey: Hotkey) -> bool {
        self.snapshot.down.contains(hotkey)
    }

    #[inline]
    pub fn hotkey_pressed(&self, hotkey: Hotkey) -> bool {
        self.snapshot.pressed.contains(hotkey)
    }

    #[inline]
    pub fn hotkey_released(&self, hotkey: Hotkey) -> bool {
        self.snapshot.released.contains(hotkey)
    }

    pub fn hotkey_analog_value(&self, hotkey: Hotkey) -> f32 {
        match (self.bindings.hotkey(hotkey), &self.joystick) {
            (Some(mapping), Some(joystick)) => mapping.analog_value(joystick),
            _ => 0.0,
        }
    }

    pub fn press(&mut self, button: NdsButton) {
        self.input_mask &= !button.bit();
    }

    pub fn release(&mut self, button: NdsButton) {
        self.input_mask |= button.bit();
    }

    /// Press `button` while `held`, release it otherwise.
    pub fn hold(&mut self, button: NdsButton, held: bool) {
        if held {
            self.press(button);
        } else {
            self.release(button);
        }
    }

    pub fn input_mask(&self) -> u32 {
        u32::from(self.input_mask)
    }
}

/// Turns absolute cursor positions into per-tick deltas by recentring the
/// host cursor every focused tick.
#[derive(Debug, Default)]
pub struct RelativeMouse {
    focused_last_tick: bool,
}

impl RelativeMouse {
    pub fn sample<H: HostInput + ?Sized>(&mut self, host: &mut H) -> (i32, i32) {
        let focused = host.is_focused();
        let mut delta = (0, 0);

        if focused {
            let (cx, cy) = host.window_center();
            // On the tick focus is gained the cursor is wherever it was left
            // outside the window; only recentre.
            if self.focused_last_tick {
                let (x, y) = host.cursor_position();
                delta = (x - cx, y - cy);
            }
            host.warp_cursor(cx, cy);
        }

        self.focused_last_tick = focused;
        delta
    }
}
