use crate::error::ConsoleError;
use crate::rtc::RtcState;

/// Visible width of one DS screen in pixels.
pub const SCREEN_WIDTH: usize = 256;
/// Visible height of one DS screen in pixels.
pub const SCREEN_HEIGHT: usize = 192;

/// Scanlines in a nominal DS video frame.
pub const LINES_PER_FRAME: u32 = 263;
/// Nominal DS refresh rate.
pub const REFRESH_RATE: f64 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
/// Console model the core was created as.
pub enum ConsoleType {
    #[default]
    Ds,
    Dsi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Which of the two DS screens a framebuffer slice belongs to.
pub enum Screen {
    Top,
    Bottom,
}

impl Screen {
    pub const fn index(self) -> usize {
        match self {
            Screen::Top => 0,
            Screen::Bottom => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// 3D renderer backend selection handed to the console.
pub enum Renderer3d {
    Software { threaded: bool },
    OpenGl { better_polygons: bool, scale_factor: u32 },
}

impl Renderer3d {
    pub const fn is_accelerated(self) -> bool {
        matches!(self, Renderer3d::OpenGl { .. })
    }
}

/// ARM9 view of guest memory.
///
/// Reads take `&mut self` because the emulator core may have to service
/// memory-mapped I/O side effects on access.
pub trait GuestMemory {
    fn arm9_read8(&mut self, addr: u32) -> u8;
    fn arm9_read16(&mut self, addr: u32) -> u16;
    fn arm9_read32(&mut self, addr: u32) -> u32;
    fn arm9_write8(&mut self, addr: u32, value: u8);
    fn arm9_write16(&mut self, addr: u32, value: u16);
    fn arm9_write32(&mut self, addr: u32, value: u32);
}

/// The emulated console as seen by the frame pump.
///
/// This is the public surface of an external emulator core. The pump thread is
/// its only caller once the pump has started.
pub trait Console: GuestMemory + Send {
    fn console_type(&self) -> ConsoleType;

    fn reset(&mut self);

    /// Emulate one video frame and return the number of scanlines it took.
    fn run_frame(&mut self) -> u32;

    fn touch_screen(&mut self, x: u16, y: u16);
    fn release_screen(&mut self);

    /// Set the active-low mask of the 12 physical buttons.
    fn set_key_mask(&mut self, mask: u32);

    fn set_renderer_3d(&mut self, renderer: Renderer3d);
    fn is_renderer_accelerated(&self) -> bool;

    /// Index of the framebuffer copy that was completed last.
    fn front_buffer(&self) -> usize;

    /// Pixels of one screen in one of the two software framebuffer copies,
    /// [`SCREEN_WIDTH`] pixels per row.
    fn framebuffer_mut(&mut self, buffer: usize, screen: Screen) -> &mut [u32];

    /// Whether the engine A output currently drives the top screen
    /// (POWCNT1 bit 15).
    fn main_screen_on_top(&self) -> bool;

    /// Give cartridge, GBA slot and firmware saves a chance to hit disk.
    fn flush_saves(&mut self);

    fn rtc_state(&self) -> RtcState;
    fn set_rtc_state(&mut self, state: RtcState);

    /// Checksum identifying the inserted game build, if a cartridge is loaded.
    fn cart_checksum(&self) -> Option<u32>;
}

/// Builds a console from whatever system files the emulator core needs.
///
/// Failing here is the only error that ends a session before it starts; the
/// frame pump never runs on a partially constructed console.
pub trait ConsoleFactory {
    type Output: Console;

    fn create(&self, console_type: ConsoleType) -> Result<Self::Output, ConsoleError>;
}
