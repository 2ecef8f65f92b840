//! The emulator thread's frame loop.
//!
//! [`FramePump::advance_once`] is the single-frame primitive everything else
//! is built on: the per-tick assist logic calls it once per tick, and gestures
//! call it once per frame they wait. Control requests from the UI are polled at
//! the top of every call.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel as cb;
use log::{debug, info, warn};

use crate::assist;
use crate::console::{Console, GuestMemory};
use crate::display::{DisplayShare, GlScreen};
use crate::input::{HostInput, Hotkey, InputState};
use crate::lifecycle::{ContextRequest, EmuControl, EmuStatus};
use crate::overlay::{self, CursorOverlay};
use crate::pacing::{Clock, FpsReport, FrameLimiter, frame_time_step};
use crate::rtc::{load_rtc_state, save_rtc_state};
use crate::session::SessionContext;
use crate::settings::{ScreenSizing, Settings};
use crate::touch_macro::MacroHost;

/// Sleep per advance while paused.
pub const PAUSED_SLEEP: Duration = Duration::from_millis(75);

/// Requests from the emulator thread to the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrontendEvent {
    ToggleLimitFps,
    Pause,
    Reset,
    FrameStep,
    ToggleFullscreen,
    SwapScreens,
    SwapScreenEmphasis,
    /// Repaint the software-rendered screens.
    WindowUpdate,
    ScreenLayoutChanged(ScreenSizing),
    TitleChanged(String),
    Stopped,
}

/// Hotkeys the UI acts on, forwarded on their press edge.
const HOTKEY_EVENTS: [(Hotkey, FrontendEvent); 7] = [
    (Hotkey::FastForwardToggle, FrontendEvent::ToggleLimitFps),
    (Hotkey::Pause, FrontendEvent::Pause),
    (Hotkey::Reset, FrontendEvent::Reset),
    (Hotkey::FrameStep, FrontendEvent::FrameStep),
    (Hotkey::FullscreenToggle, FrontendEvent::ToggleFullscreen),
    (Hotkey::SwapScreens, FrontendEvent::SwapScreens),
    (Hotkey::SwapScreenEmphasis, FrontendEvent::SwapScreenEmphasis),
];

/// Guess the layout from the last three main-screen-on-top samples, newest
/// first. A main screen that flips every frame means 3D on both screens.
pub fn guess_screen_sizing(history: [bool; 3]) -> ScreenSizing {
    if history[0] == history[2] && history[0] != history[1] {
        ScreenSizing::Even
    } else if history[0] {
        ScreenSizing::EmphasizeTop
    } else {
        ScreenSizing::EmphasizeBottom
    }
}

pub struct FramePump<C, H, K> {
    console: C,
    host: H,
    clock: K,
    control: Arc<EmuControl>,
    events: cb::Sender<FrontendEvent>,
    display: Arc<DisplayShare>,
    gl: Option<Box<dyn GlScreen>>,
    settings: Settings,
    input: InputState,
    limiter: FrameLimiter,
    video_dirty: bool,
    win_update_count: u32,
    win_update_freq: u32,
    main_screen_history: [bool; 3],
    auto_sizing: Option<ScreenSizing>,
    cursor: CursorOverlay,
    frames: u64,
}

impl<C, H, K> FramePump<C, H, K>
where
    C: Console,
    H: HostInput,
    K: Clock,
{
    pub fn new(
        console: C,
        host: H,
        clock: K,
        control: Arc<EmuControl>,
        events: cb::Sender<FrontendEvent>,
        display: Arc<DisplayShare>,
        settings: Settings,
    ) -> Self {
        let limiter = FrameLimiter::new(clock.now());
        let input = InputState::new(settings.bindings.clone());
        Self {
            console,
            host,
            clock,
            control,
            events,
            display,
            gl: None,
            settings,
            input,
            limiter,
            video_dirty: true,
            win_update_count: 0,
            win_update_freq: 1,
            main_screen_history: [false; 3],
            auto_sizing: None,
            cursor: CursorOverlay::HIDDEN,
            frames: 0,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn control(&self) -> &Arc<EmuControl> {
        &self.control
    }

    /// Emulated frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Cursor drawn over the next frame.
    pub fn set_cursor(&mut self, cursor: CursorOverlay) {
        self.cursor = cursor;
    }

    /// Forward the assist layer's key mask to the console.
    pub fn apply_key_mask(&mut self) {
        self.console.set_key_mask(self.input.input_mask());
    }

    fn emit(&self, event: FrontendEvent) {
        // A closed receiver means the UI is shutting down and will stop us.
        let _ = self.events.send(event);
    }

    fn title(&self, report: Option<FpsReport>) -> String {
        let base = &self.settings.window_title;
        let instance = self.settings.instance_id;
        let version = env!("CARGO_PKG_VERSION");
        match (report, instance) {
            (Some(r), 0) => format!("[{}/{:.0}] {base} {version}", r.fps, r.target),
            (Some(r), n) => format!("[{}/{:.0}] {base} ({})", r.fps, r.target, n + 1),
            (None, 0) => format!("{base} {version}"),
            (None, n) => format!("{base} ({})", n + 1),
        }
    }

    fn apply_renderer(&mut self) {
        if let Some(gl) = self.gl.as_mut() {
            gl.set_swap_interval(self.settings.swap_interval());
        }
        let renderer = self.settings.renderer_3d(self.gl.is_some());
        debug!("Applying 3D renderer {renderer:?}");
        self.console.set_renderer_3d(renderer);
        self.video_dirty = false;
    }

    fn update_screen_sizing(&mut self) {
        self.main_screen_history = [
            self.console.main_screen_on_top(),
            self.main_screen_history[0],
            self.main_screen_history[1],
        ];
        let guess = guess_screen_sizing(self.main_screen_history);
        if self.auto_sizing != Some(guess) {
            self.auto_sizing = Some(guess);
            self.emit(FrontendEvent::ScreenLayoutChanged(guess));
        }
    }

    fn publish_frame(&mut self) {
        let front = self.console.front_buffer();
        match self.gl.as_mut() {
            Some(gl) => gl.draw_screen(front, &self.cursor),
            None => self.display.publish(front, self.cursor),
        }
    }

    /// Poll input and control requests, then emulate one frame or, while
    /// paused, idle for one paused interval.
    pub fn advance_once(&mut self) {
        let requested = self.control.requested();
        if requested == EmuStatus::Exit {
            return;
        }

        self.input.process(&mut self.host);
        for (hotkey, event) in &HOTKEY_EVENTS {
            if self.input.hotkey_pressed(*hotkey) {
                self.emit(event.clone());
            }
        }

        match requested {
            EmuStatus::Running | EmuStatus::FrameStep => self.run_frame(),
            _ => self.idle_paused(),
        }
    }

    pub fn advance(&mut self, frames: u32) {
        for _ in 0..frames {
            self.advance_once();
        }
    }

    fn run_frame(&mut self) {
        self.control.begin_frame();

        if let Some(settings) = self.control.take_settings() {
            self.input.set_bindings(settings.bindings.clone());
            self.settings = settings;
            self.video_dirty = true;
        }
        // Fast-forward turns vsync off; put it back once released.
        if self.video_dirty || self.input.hotkey_released(Hotkey::FastForward) {
            self.apply_renderer();
        }

        if self.settings.screen_sizing == ScreenSizing::Auto {
            self.update_screen_sizing();
        }

        let lines = self.console.run_frame();
        self.frames += 1;
        self.console.flush_saves();

        overlay::draw(&mut self.console, &self.cursor);
        self.publish_frame();

        if self.control.requested() == EmuStatus::Exit {
            return;
        }

        self.win_update_count += 1;
        if self.win_update_count >= self.win_update_freq && self.gl.is_none() {
            self.emit(FrontendEvent::WindowUpdate);
            self.win_update_count = 0;
        }

        let fast_forward = self.input.hotkey_down(Hotkey::FastForward);
        if fast_forward
            && self.settings.vsync
            && let Some(gl) = self.gl.as_mut()
        {
            gl.set_swap_interval(0);
        }

        let step = frame_time_step(lines);
        self.limiter
            .throttle(&self.clock, step, self.settings.limit_fps && !fast_forward);

        if let Some(report) = self.limiter.count_frame(self.clock.now(), step) {
            self.win_update_freq = report.window_update_freq();
            self.emit(FrontendEvent::TitleChanged(self.title(Some(report))));
        }
    }

    fn idle_paused(&mut self) {
        self.limiter.reset(self.clock.now());
        self.emit(FrontendEvent::WindowUpdate);
        self.control.acknowledge();
        self.emit(FrontendEvent::TitleChanged(self.title(None)));

        self.clock.sleep(PAUSED_SLEEP);

        if let Some(gl) = self.gl.as_mut() {
            gl.draw_screen(self.console.front_buffer(), &self.cursor);
        }

        match self.control.take_context_request() {
            ContextRequest::InitGl(mut screen) => {
                screen.init_gl();
                self.gl = Some(screen);
                self.video_dirty = true;
                self.control.complete_context_request();
                info!("GL context attached");
            }
            ContextRequest::DeinitGl => {
                if let Some(mut gl) = self.gl.take() {
                    gl.deinit_gl();
                }
                self.video_dirty = true;
                self.control.complete_context_request();
                info!("GL context detached");
            }
            ContextRequest::None | ContextRequest::InProgress => {}
        }
    }

    /// One assist tick: game logic, then one frame advance.
    pub fn tick(&mut self, session: &mut SessionContext) {
        assist::tick(self, session);
    }

    /// Run the session until the UI asks to stop.
    pub fn run(&mut self) {
        if let Some(state) = load_rtc_state(&self.settings.rtc_path) {
            self.console.set_rtc_state(state);
        }
        self.apply_renderer();

        let mut session = SessionContext::new(self.console.cart_checksum());
        while self.control.requested() != EmuStatus::Exit {
            self.tick(&mut session);
        }

        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Err(e) = save_rtc_state(&self.settings.rtc_path, &self.console.rtc_state()) {
            warn!(
                "Failed to save RTC state to {}: {e}",
                self.settings.rtc_path.display()
            );
        }
        self.console.flush_saves();
        self.control.publish_exit();
        self.emit(FrontendEvent::Stopped);
        info!("Emulator stopped after {} frames", self.frames);
    }
}

impl<C, H, K> GuestMemory for FramePump<C, H, K>
where
    C: Console,
{
    fn arm9_read8(&mut self, addr: u32) -> u8 {
        self.console.arm9_read8(addr)
    }

    fn arm9_read16(&mut self, addr: u32) -> u16 {
        self.console.arm9_read16(addr)
    }

    fn arm9_read32(&mut self, addr: u32) -> u32 {
        self.console.arm9_read32(addr)
    }

    fn arm9_write8(&mut self, addr: u32, value: u8) {
        self.console.arm9_write8(addr, value);
    }

    fn arm9_write16(&mut self, addr: u32, value: u16) {
        self.console.arm9_write16(addr, value);
    }

    fn arm9_write32(&mut self, addr: u32, value: u32) {
        self.console.arm9_write32(addr, value);
    }
}

impl<C, H, K> MacroHost for FramePump<C, H, K>
where
    C: Console,
    H: HostInput,
    K: Clock,
{
    fn touch(&mut self, x: u16, y: u16) {
        #[cfg(feature = "touch-trace")]
        log::trace!("touch {x},{y} at frame {}", self.frames);
        self.console.touch_screen(x, y);
    }

    fn release(&mut self) {
        #[cfg(feature = "touch-trace")]
        log::trace!("release at frame {}", self.frames);
        self.console.release_screen();
    }

    fn advance_frame(&mut self) {
        self.advance_once();
    }

    fn advance_frame_with_movement(&mut self) {
        assist::apply_movement(&mut self.input);
        self.apply_key_mask();
        self.advance_once();
    }
}
