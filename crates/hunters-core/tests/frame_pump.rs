mod common;

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use common::{Harness, MockConsole};
use hunters_core::console::Renderer3d;
use hunters_core::display::GlScreen;
use hunters_core::input::Hotkey;
use hunters_core::lifecycle::EmuStatus;
use hunters_core::overlay::CursorOverlay;
use hunters_core::pacing::Clock;
use hunters_core::pump::{FrontendEvent, PAUSED_SLEEP};
use hunters_core::rtc::{RTC_FILE_NAME, RtcState, load_rtc_state, save_rtc_state};
use hunters_core::settings::{RendererKind, ScreenSizing, Settings};

#[test]
fn hotkey_pressed_only_on_rising_tick() {
    let mut h = Harness::running(MockConsole::new(None));
    let mut seen = Vec::new();

    for held in [false, true, true, true, false, true] {
        if held {
            h.host().hold(Hotkey::Jump);
        } else {
            h.host().let_go(Hotkey::Jump);
        }
        h.pump.advance_once();
        seen.push(h.pump.input().hotkey_pressed(Hotkey::Jump));
    }

    assert_eq!(seen, [false, true, false, false, false, true]);
}

#[test]
fn ui_hotkeys_are_forwarded_once_per_press() {
    let mut h = Harness::running(MockConsole::new(None));
    h.host().hold(Hotkey::SwapScreens);
    h.pump.advance(3);
    h.host().let_go(Hotkey::SwapScreens);
    h.pump.advance_once();
    h.host().hold(Hotkey::SwapScreens);
    h.host().hold(Hotkey::FastForwardToggle);
    h.pump.advance_once();

    let events = h.drain_events();
    let swaps = events
        .iter()
        .filter(|e| **e == FrontendEvent::SwapScreens)
        .count();
    assert_eq!(swaps, 2);
    assert!(events.contains(&FrontendEvent::ToggleLimitFps));
}

#[test]
fn paused_pump_idles_without_emulating() {
    let mut h = Harness::new(MockConsole::new(None), Settings::default());
    let before = h.pump.clock().now();

    h.pump.advance_once();

    assert_eq!(h.console().frames, 0);
    assert_eq!(h.control.status(), EmuStatus::Paused);
    assert_eq!(h.pump.clock().now() - before, PAUSED_SLEEP);

    let events = h.drain_events();
    assert!(events.contains(&FrontendEvent::WindowUpdate));
    let title = events.iter().find_map(|e| match e {
        FrontendEvent::TitleChanged(t) => Some(t.clone()),
        _ => None,
    });
    let title = title.expect("paused title");
    assert!(title.starts_with("Hunters "));
    assert!(!title.starts_with('['));
}

#[test]
fn running_frame_flushes_and_publishes() {
    let mut h = Harness::running(MockConsole::new(None));
    h.pump.advance_once();

    assert_eq!(h.console().frames, 1);
    assert_eq!(h.console().flushes, 1);
    assert_eq!(h.control.status(), EmuStatus::Running);
    assert_eq!(
        h.console().renderers,
        [Renderer3d::Software { threaded: true }]
    );

    let frame = h.display.latest();
    assert_eq!(frame.serial, 1);
    assert_eq!(frame.front_buffer, h.console().front);
}

#[test]
fn frame_step_runs_exactly_one_frame() {
    let mut h = Harness::running(MockConsole::new(None));
    h.control.frame_step();

    h.pump.advance(4);

    assert_eq!(h.console().frames, 1);
    assert_eq!(h.control.requested(), EmuStatus::Paused);
    assert_eq!(h.control.status(), EmuStatus::Paused);
}

#[test]
fn stop_request_ends_advancing() {
    let mut h = Harness::running(MockConsole::new(None));
    h.pump.advance_once();
    h.control.stop();
    h.pump.advance(10);
    assert_eq!(h.console().frames, 1);
}

#[test]
fn fps_title_after_a_full_window() {
    let mut h = Harness::running(MockConsole::new(None));
    h.pump.advance(30);

    let titles: Vec<String> = h
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            FrontendEvent::TitleChanged(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(titles.len(), 1);
    assert!(titles[0].starts_with("[60/60] Hunters "), "{}", titles[0]);
}

#[test]
fn secondary_instance_title_carries_number() {
    let settings = Settings {
        instance_id: 1,
        ..Default::default()
    };
    let mut h = Harness::new(MockConsole::new(None), settings);
    h.pump.advance_once();
    assert!(
        h.drain_events()
            .contains(&FrontendEvent::TitleChanged("Hunters (2)".into()))
    );
}

#[test]
fn limiter_paces_to_sixty_hertz() {
    let mut h = Harness::running(MockConsole::new(None));
    h.pump.advance(60);
    let elapsed = h.pump.clock().now();
    assert!(
        elapsed >= Duration::from_millis(990) && elapsed <= Duration::from_millis(1010),
        "{elapsed:?}"
    );
}

#[test]
fn fast_forward_skips_limiting_and_reapplies_renderer_on_release() {
    let mut h = Harness::running(MockConsole::new(None));
    h.pump.advance_once();
    let start = h.pump.clock().now();

    h.host().hold(Hotkey::FastForward);
    h.pump.advance(10);
    assert!(h.pump.clock().now() - start <= Duration::from_millis(10));
    assert_eq!(h.console().renderers.len(), 1);

    h.host().let_go(Hotkey::FastForward);
    h.pump.advance_once();
    assert_eq!(h.console().renderers.len(), 2);
}

#[test]
fn settings_update_is_applied_next_frame() {
    let mut h = Harness::running(MockConsole::new(None));
    h.pump.advance_once();

    h.control.update_settings(Settings {
        threaded_3d: false,
        window_title: "Other".into(),
        ..Default::default()
    });
    h.pump.advance_once();

    assert_eq!(
        h.console().renderers.last(),
        Some(&Renderer3d::Software { threaded: false })
    );
    assert_eq!(h.pump.settings().window_title, "Other");
}

#[test]
fn auto_layout_follows_main_screen() {
    let settings = Settings {
        screen_sizing: ScreenSizing::Auto,
        ..Default::default()
    };
    let mut console = MockConsole::new(None);
    console.main_on_top = vec![true, false, true, true, true];
    let mut h = Harness::new(console, settings);
    h.control.run();
    h.pump.advance(5);

    let layouts: Vec<ScreenSizing> = h
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            FrontendEvent::ScreenLayoutChanged(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(
        layouts,
        [
            ScreenSizing::EmphasizeTop,
            ScreenSizing::Even,
            ScreenSizing::EmphasizeTop
        ]
    );
}

#[test]
fn run_restores_and_saves_rtc() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(RTC_FILE_NAME);
    let saved = RtcState {
        date_time: [0x25, 0x01, 0x02, 0x04, 0x10, 0x20, 0x30],
        clock_count: 77,
        ..Default::default()
    };
    save_rtc_state(&path, &saved).expect("seed rtc");

    let settings = Settings {
        rtc_path: path.clone(),
        ..Default::default()
    };
    let mut h = Harness::new(MockConsole::new(None), settings);
    h.control.stop();
    h.pump.run();

    assert_eq!(h.console().rtc, saved);
    assert_eq!(load_rtc_state(&path), Some(saved));
    assert_eq!(h.control.status(), EmuStatus::Exit);
    assert!(h.drain_events().contains(&FrontendEvent::Stopped));
}

#[derive(Clone, Default)]
struct GlLog(Arc<Mutex<Vec<String>>>);

impl GlLog {
    fn entries(&self) -> Vec<String> {
        self.0.lock().expect("gl log").clone()
    }
}

struct MockGl(GlLog);

impl GlScreen for MockGl {
    fn init_gl(&mut self) {
        self.0.0.lock().expect("gl log").push("init".into());
    }

    fn deinit_gl(&mut self) {
        self.0.0.lock().expect("gl log").push("deinit".into());
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.0.0.lock().expect("gl log").push(format!("swap {interval}"));
    }

    fn draw_screen(&mut self, front_buffer: usize, cursor: &CursorOverlay) {
        self.0
            .0
            .lock()
            .expect("gl log")
            .push(format!("draw {front_buffer} {}", cursor.visible));
    }
}

#[test]
fn gl_context_is_attached_while_paused() {
    let settings = Settings {
        renderer: RendererKind::OpenGl,
        ..Default::default()
    };
    let mut h = Harness::new(MockConsole::new(None), settings);
    let log = GlLog::default();

    let requester = {
        let control = h.control.clone();
        let screen = MockGl(log.clone());
        thread::spawn(move || control.init_context(Box::new(screen)))
    };
    for _ in 0..500 {
        h.pump.advance_once();
        if log.entries().iter().any(|e| e == "init") {
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }
    requester.join().expect("init_context");

    h.control.run();
    h.drain_events();
    h.pump.advance_once();

    let entries = log.entries();
    assert!(entries.contains(&"swap 1".to_string()));
    assert!(entries.iter().any(|e| e.starts_with("draw ")));
    assert!(matches!(
        h.console().renderers.last(),
        Some(Renderer3d::OpenGl { .. })
    ));
    // GL presents directly; no software repaint requests.
    assert!(!h.drain_events().contains(&FrontendEvent::WindowUpdate));
}
