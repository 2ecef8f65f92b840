use std::sync::Arc;

use crossbeam_channel as cb;
use eframe::egui::ViewportCommand;
use hunters_core::lifecycle::EmuControl;
use hunters_core::pump::FrontendEvent;
use hunters_core::settings::{ScreenSizing, Settings};
use log::{debug, info};

/// What the window has to do in response to the worker.
#[derive(Debug)]
pub enum UiAction {
    Viewport(ViewportCommand),
    Repaint,
    /// Tear the worker down and start a fresh one.
    Relaunch,
    Closed,
}

/// UI-side state driven by [`FrontendEvent`]s.
pub struct Frontend {
    control: Arc<EmuControl>,
    events: cb::Receiver<FrontendEvent>,
    settings: Settings,
    fullscreen: bool,
    swapped: bool,
    layout: ScreenSizing,
}

impl Frontend {
    pub fn new(
        control: Arc<EmuControl>,
        events: cb::Receiver<FrontendEvent>,
        settings: Settings,
    ) -> Self {
        let layout = match settings.screen_sizing {
            ScreenSizing::Auto => ScreenSizing::Even,
            other => other,
        };
        Self {
            control,
            events,
            settings,
            fullscreen: false,
            swapped: false,
            layout,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Layout to draw with right now; resolves `Auto` to the last guess.
    pub fn layout(&self) -> ScreenSizing {
        self.layout
    }

    pub fn screens_swapped(&self) -> bool {
        self.swapped
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        if settings.screen_sizing != ScreenSizing::Auto {
            self.layout = settings.screen_sizing;
        }
        self.settings = settings.clone();
        self.control.update_settings(settings);
    }

    /// Handle everything the worker sent since the last UI frame.
    pub fn drain(&mut self) -> Vec<UiAction> {
        let events: Vec<_> = self.events.try_iter().collect();
        events.into_iter().filter_map(|e| self.handle(e)).collect()
    }

    pub fn handle(&mut self, event: FrontendEvent) -> Option<UiAction> {
        match event {
            FrontendEvent::ToggleLimitFps => {
                let mut settings = self.settings.clone();
                settings.limit_fps = !settings.limit_fps;
                info!("Frame limiter {}", if settings.limit_fps { "on" } else { "off" });
                self.apply_settings(settings);
                None
            }
            FrontendEvent::Pause => {
                if self.control.is_paused() {
                    self.control.unpause();
                } else {
                    self.control.pause();
                }
                None
            }
            FrontendEvent::Reset => Some(UiAction::Relaunch),
            FrontendEvent::FrameStep => {
                self.control.frame_step();
                None
            }
            FrontendEvent::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                Some(UiAction::Viewport(ViewportCommand::Fullscreen(
                    self.fullscreen,
                )))
            }
            FrontendEvent::SwapScreens => {
                self.swapped = !self.swapped;
                Some(UiAction::Repaint)
            }
            FrontendEvent::SwapScreenEmphasis => {
                self.layout = match self.layout {
                    ScreenSizing::EmphasizeTop => ScreenSizing::EmphasizeBottom,
                    ScreenSizing::EmphasizeBottom => ScreenSizing::EmphasizeTop,
                    other => other,
                };
                Some(UiAction::Repaint)
            }
            FrontendEvent::WindowUpdate => Some(UiAction::Repaint),
            FrontendEvent::ScreenLayoutChanged(layout) => {
                debug!("Auto layout picked {layout:?}");
                self.layout = layout;
                Some(UiAction::Repaint)
            }
            FrontendEvent::TitleChanged(title) => {
                Some(UiAction::Viewport(ViewportCommand::Title(title)))
            }
            FrontendEvent::Stopped => Some(UiAction::Closed),
        }
    }
}
