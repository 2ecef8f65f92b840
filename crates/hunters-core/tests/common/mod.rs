use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel as cb;
use hunters_core::console::{
    Console, ConsoleFactory, ConsoleType, GuestMemory, Renderer3d, SCREEN_HEIGHT, SCREEN_WIDTH,
    Screen,
};
use hunters_core::display::DisplayShare;
use hunters_core::error::ConsoleError;
use hunters_core::input::{HostInput, Hotkey, HotkeySet, JoystickState, KeyboardSample};
use hunters_core::lifecycle::EmuControl;
use hunters_core::pacing::Clock;
use hunters_core::pump::{FramePump, FrontendEvent};
use hunters_core::rtc::RtcState;
use hunters_core::settings::Settings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchEvent {
    Touch(u16, u16),
    Release,
}

/// Console double: flat byte RAM plus a log of everything the pump asked for.
pub struct MockConsole {
    pub ram: HashMap<u32, u8>,
    pub reads: Cell<usize>,
    pub writes: Vec<(u32, u32)>,
    pub touches: Vec<TouchEvent>,
    pub key_mask: u32,
    /// Key mask in effect for each emulated frame.
    pub frame_masks: Vec<u32>,
    pub frames: u32,
    pub lines: u32,
    pub renderers: Vec<Renderer3d>,
    pub framebuffers: [[Vec<u32>; 2]; 2],
    pub front: usize,
    pub main_on_top: Vec<bool>,
    main_on_top_index: Cell<usize>,
    pub flushes: u32,
    pub rtc: RtcState,
    pub checksum: Option<u32>,
}

impl MockConsole {
    pub fn new(checksum: Option<u32>) -> Self {
        let screen = || vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
        Self {
            ram: HashMap::new(),
            reads: Cell::new(0),
            writes: Vec::new(),
            touches: Vec::new(),
            key_mask: 0x0FFF,
            frame_masks: Vec::new(),
            frames: 0,
            lines: 263,
            renderers: Vec::new(),
            framebuffers: [[screen(), screen()], [screen(), screen()]],
            front: 0,
            main_on_top: Vec::new(),
            main_on_top_index: Cell::new(0),
            flushes: 0,
            rtc: RtcState::default(),
            checksum,
        }
    }

    #[allow(dead_code)]
    pub fn poke8(&mut self, addr: u32, value: u8) {
        self.ram.insert(addr, value);
    }

    #[allow(dead_code)]
    pub fn poke16(&mut self, addr: u32, value: u16) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.ram.insert(addr + i as u32, b);
        }
    }

    pub fn peek8(&self, addr: u32) -> u8 {
        self.ram.get(&addr).copied().unwrap_or(0)
    }

    #[allow(dead_code)]
    pub fn touch_count(&self) -> usize {
        self.touches
            .iter()
            .filter(|t| matches!(t, TouchEvent::Touch(..)))
            .count()
    }

    fn read_le(&self, addr: u32, len: u32) -> u32 {
        self.reads.set(self.reads.get() + 1);
        (0..len).fold(0, |acc, i| acc | u32::from(self.peek8(addr + i)) << (8 * i))
    }

    fn write_le(&mut self, addr: u32, value: u32, len: u32) {
        self.writes.push((addr, value));
        for i in 0..len {
            self.ram.insert(addr + i, (value >> (8 * i)) as u8);
        }
    }
}

impl GuestMemory for MockConsole {
    fn arm9_read8(&mut self, addr: u32) -> u8 {
        self.read_le(addr, 1) as u8
    }

    fn arm9_read16(&mut self, addr: u32) -> u16 {
        self.read_le(addr, 2) as u16
    }

    fn arm9_read32(&mut self, addr: u32) -> u32 {
        self.read_le(addr, 4)
    }

    fn arm9_write8(&mut self, addr: u32, value: u8) {
        self.write_le(addr, u32::from(value), 1);
    }

    fn arm9_write16(&mut self, addr: u32, value: u16) {
        self.write_le(addr, u32::from(value), 2);
    }

    fn arm9_write32(&mut self, addr: u32, value: u32) {
        self.write_le(addr, value, 4);
    }
}

impl Console for MockConsole {
    fn console_type(&self) -> ConsoleType {
        ConsoleType::Ds
    }

    fn reset(&mut self) {
        self.frames = 0;
    }

    fn run_frame(&mut self) -> u32 {
        self.frames += 1;
        self.frame_masks.push(self.key_mask);
        self.front ^= 1;
        self.lines
    }

    fn touch_screen(&mut self, x: u16, y: u16) {
        self.touches.push(TouchEvent::Touch(x, y));
    }

    fn release_screen(&mut self) {
        self.touches.push(TouchEvent::Release);
    }

    fn set_key_mask(&mut self, mask: u32) {
        self.key_mask = mask;
    }

    fn set_renderer_3d(&mut self, renderer: Renderer3d) {
        self.renderers.push(renderer);
    }

    fn is_renderer_accelerated(&self) -> bool {
        self.renderers.last().is_some_and(|r| r.is_accelerated())
    }

    fn front_buffer(&self) -> usize {
        self.front
    }

    fn framebuffer_mut(&mut self, buffer: usize, screen: Screen) -> &mut [u32] {
        &mut self.framebuffers[buffer][screen.index()]
    }

    fn main_screen_on_top(&self) -> bool {
        let i = self.main_on_top_index.get();
        self.main_on_top_index.set(i + 1);
        self.main_on_top.get(i).copied().unwrap_or(true)
    }

    fn flush_saves(&mut self) {
        self.flushes += 1;
    }

    fn rtc_state(&self) -> RtcState {
        self.rtc
    }

    fn set_rtc_state(&mut self, state: RtcState) {
        self.rtc = state;
    }

    fn cart_checksum(&self) -> Option<u32> {
        self.checksum
    }
}

#[allow(dead_code)]
pub struct MockFactory {
    pub fail: Option<fn() -> ConsoleError>,
    pub checksum: Option<u32>,
}

impl ConsoleFactory for MockFactory {
    type Output = MockConsole;

    fn create(&self, _console_type: ConsoleType) -> Result<MockConsole, ConsoleError> {
        match self.fail {
            Some(error) => Err(error()),
            None => Ok(MockConsole::new(self.checksum)),
        }
    }
}

#[derive(Debug)]
pub struct MockHost {
    pub keyboard: KeyboardSample,
    pub joystick: Option<JoystickState>,
    pub focused: bool,
    pub cursor: (i32, i32),
    pub center: (i32, i32),
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            keyboard: KeyboardSample::default(),
            joystick: None,
            focused: true,
            cursor: (400, 300),
            center: (400, 300),
        }
    }
}

#[allow(dead_code)]
impl MockHost {
    pub fn hold(&mut self, hotkey: Hotkey) {
        self.keyboard.hotkeys.insert(hotkey);
    }

    pub fn let_go(&mut self, hotkey: Hotkey) {
        self.keyboard.hotkeys.remove(hotkey);
    }

    pub fn let_go_all(&mut self) {
        self.keyboard.hotkeys = HotkeySet::EMPTY;
    }

    /// Move the cursor relative to the window centre.
    pub fn nudge(&mut self, dx: i32, dy: i32) {
        self.cursor = (self.center.0 + dx, self.center.1 + dy);
    }
}

impl HostInput for MockHost {
    fn keyboard(&self) -> KeyboardSample {
        self.keyboard
    }

    fn poll_joystick(&mut self) -> Option<JoystickState> {
        self.joystick.clone()
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn cursor_position(&self) -> (i32, i32) {
        self.cursor
    }

    fn window_center(&self) -> (i32, i32) {
        self.center
    }

    fn warp_cursor(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
    }
}

/// Time only moves when the pump sleeps.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct MockClock {
    pub now: Cell<Duration>,
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

#[allow(dead_code)]
pub type TestPump = FramePump<MockConsole, MockHost, MockClock>;

#[allow(dead_code)]
pub struct Harness {
    pub pump: TestPump,
    pub control: Arc<EmuControl>,
    pub display: Arc<DisplayShare>,
    pub events: cb::Receiver<FrontendEvent>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(console: MockConsole, settings: Settings) -> Self {
        let control = Arc::new(EmuControl::new());
        let display = Arc::new(DisplayShare::default());
        let (tx, rx) = cb::unbounded();
        let pump = FramePump::new(
            console,
            MockHost::default(),
            MockClock::default(),
            control.clone(),
            tx,
            display.clone(),
            settings,
        );
        Self {
            pump,
            control,
            display,
            events: rx,
        }
    }

    pub fn running(console: MockConsole) -> Self {
        let harness = Self::new(console, Settings::default());
        harness.control.run();
        harness
    }

    pub fn console(&self) -> &MockConsole {
        self.pump.console()
    }

    pub fn console_mut(&mut self) -> &mut MockConsole {
        self.pump.console_mut()
    }

    pub fn host(&mut self) -> &mut MockHost {
        self.pump.host_mut()
    }

    pub fn drain_events(&self) -> Vec<FrontendEvent> {
        self.events.try_iter().collect()
    }
}
