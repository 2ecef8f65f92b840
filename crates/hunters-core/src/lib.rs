//! Frame pump and game assist for playing Metroid Prime Hunters on a DS
//! emulator with mouse and keyboard.
//!
//! The emulator core itself is an external collaborator reached through the
//! [`console::Console`] trait. This crate drives it one frame at a time from a
//! dedicated thread, remaps host input onto the touchscreen and buttons, and
//! pokes the game's RAM for aiming. Frontends live in separate crates and talk
//! to the worker through [`lifecycle::EmuControl`] and [`pump::FrontendEvent`].

/// Per-tick game logic: aim, virtual stylus, hotkey gestures.
pub mod assist;

/// Collaborator traits for the emulated console.
pub mod console;

/// Front buffer handoff and the accelerated presentation surface.
pub mod display;

/// Emulator worker thread.
pub mod emu_thread;

pub mod error;

/// Host input sampling, bindings and edge detection.
pub mod input;

/// Run/pause handshake between the UI and the worker.
pub mod lifecycle;

/// Virtual stylus cursor overlay.
pub mod overlay;

/// Frame limiter and FPS measurement.
pub mod pacing;

/// Known game builds and their guest addresses.
pub mod profile;

/// The per-frame loop.
pub mod pump;

/// Per-player address resolution.
pub mod resolver;

/// Real-time clock persistence.
pub mod rtc;

pub mod session;

pub mod settings;

/// Scripted touchscreen gestures.
pub mod touch_macro;
