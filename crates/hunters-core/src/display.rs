use std::sync::{Mutex, PoisonError};

use crate::overlay::CursorOverlay;

/// Accelerated presentation surface owned by the UI.
///
/// Handed to the emulator thread through [`EmuControl::init_context`] and
/// driven from there; every call happens on the emulator thread.
///
/// [`EmuControl::init_context`]: crate::lifecycle::EmuControl::init_context
pub trait GlScreen: Send {
    fn init_gl(&mut self);
    fn deinit_gl(&mut self);
    fn set_swap_interval(&mut self, interval: u32);
    fn draw_screen(&mut self, front_buffer: usize, cursor: &CursorOverlay);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayFrame {
    /// Framebuffer copy the UI should present.
    pub front_buffer: usize,
    pub cursor: CursorOverlay,
    /// Frames published so far.
    pub serial: u64,
}

/// Front buffer handoff for the software presentation path.
#[derive(Debug, Default)]
pub struct DisplayShare {
    frame: Mutex<DisplayFrame>,
}

impl DisplayShare {
    pub fn publish(&self, front_buffer: usize, cursor: CursorOverlay) {
        let mut frame = self.frame.lock().unwrap_or_else(PoisonError::into_inner);
        frame.front_buffer = front_buffer;
        frame.cursor = cursor;
        frame.serial += 1;
    }

    pub fn latest(&self) -> DisplayFrame {
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
