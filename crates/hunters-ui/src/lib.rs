//! Desktop glue for the Hunters frame pump: keyboard and mouse bindings,
//! gamepads, the persisted UI config, and the handling of worker events on
//! the egui thread.

pub mod frontend;
#[cfg(not(target_os = "android"))]
pub mod gamepad;
pub mod host;
pub mod keybinds;
pub mod ui_config;

/// Log at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
