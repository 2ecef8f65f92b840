use std::path::PathBuf;

use crate::console::{ConsoleType, Renderer3d};
use crate::input::InputBindings;
use crate::rtc::RTC_FILE_NAME;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    Software,
    OpenGl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
/// How the two screens share the window.
pub enum ScreenSizing {
    #[default]
    Even,
    EmphasizeTop,
    EmphasizeBottom,
    /// Follow whichever screen the game draws its main view on.
    Auto,
}

/// Everything the emulator thread reads from the frontend configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub console_type: ConsoleType,
    pub limit_fps: bool,
    pub vsync: bool,
    pub vsync_interval: u32,
    pub renderer: RendererKind,
    pub threaded_3d: bool,
    pub gl_better_polygons: bool,
    pub gl_scale_factor: u32,
    pub screen_sizing: ScreenSizing,
    /// Percent; 100 turns one pixel of mouse travel into one unit of aim.
    pub aim_sensitivity: f32,
    /// Percent; 100 moves the virtual stylus one DS pixel per mouse pixel.
    pub virtual_stylus_sensitivity: f32,
    /// Use the mouse as a stylus whenever no match is running.
    pub auto_virtual_stylus: bool,
    /// Zero for the first running copy of the frontend.
    pub instance_id: u32,
    pub window_title: String,
    pub bindings: InputBindings,
    pub rtc_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console_type: ConsoleType::Ds,
            limit_fps: true,
            vsync: true,
            vsync_interval: 1,
            renderer: RendererKind::Software,
            threaded_3d: true,
            gl_better_polygons: false,
            gl_scale_factor: 1,
            screen_sizing: ScreenSizing::Even,
            aim_sensitivity: 100.0,
            virtual_stylus_sensitivity: 100.0,
            auto_virtual_stylus: true,
            instance_id: 0,
            window_title: String::from("Hunters"),
            bindings: InputBindings::default(),
            rtc_path: PathBuf::from(RTC_FILE_NAME),
        }
    }
}

impl Settings {
    /// Renderer to install; OpenGL needs a GL surface to draw into.
    pub fn renderer_3d(&self, gl_available: bool) -> Renderer3d {
        match self.renderer {
            RendererKind::OpenGl if gl_available => Renderer3d::OpenGl {
                better_polygons: self.gl_better_polygons,
                scale_factor: self.gl_scale_factor.max(1),
            },
            _ => Renderer3d::Software {
                threaded: self.threaded_3d,
            },
        }
    }

    pub fn swap_interval(&self) -> u32 {
        if self.vsync { self.vsync_interval } else { 0 }
    }
}
