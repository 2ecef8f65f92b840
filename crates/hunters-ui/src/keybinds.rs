use eframe::egui::{self, Key, PointerButton};
use hunters_core::input::{Hotkey, KeyboardSample, NdsButton};
use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ui_config::config_path;

pub fn default_keybinds_path() -> PathBuf {
    config_path("keybinds.toml")
}

/// Anything on the keyboard or mouse that can be bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Key(Key),
    Mouse(PointerButton),
    // egui reports modifiers as flags, not keys.
    Ctrl,
    Shift,
    Alt,
}

impl Trigger {
    pub fn is_down(self, input: &egui::InputState) -> bool {
        match self {
            Trigger::Key(key) => input.key_down(key),
            Trigger::Mouse(button) => input.pointer.button_down(button),
            Trigger::Ctrl => input.modifiers.ctrl,
            Trigger::Shift => input.modifiers.shift,
            Trigger::Alt => input.modifiers.alt,
        }
    }
}

#[derive(Clone, Debug)]
pub struct KeyBindings {
    buttons: HashMap<NdsButton, Trigger>,
    hotkeys: HashMap<Hotkey, Trigger>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl KeyBindings {
    pub fn defaults() -> Self {
        let buttons = HashMap::from([
            (NdsButton::Up, Trigger::Key(Key::ArrowUp)),
            (NdsButton::Down, Trigger::Key(Key::ArrowDown)),
            (NdsButton::Left, Trigger::Key(Key::ArrowLeft)),
            (NdsButton::Right, Trigger::Key(Key::ArrowRight)),
            (NdsButton::A, Trigger::Key(Key::K)),
            (NdsButton::B, Trigger::Key(Key::J)),
            (NdsButton::X, Trigger::Key(Key::I)),
            (NdsButton::Y, Trigger::Key(Key::U)),
            (NdsButton::L, Trigger::Key(Key::H)),
            (NdsButton::R, Trigger::Key(Key::L)),
            (NdsButton::Start, Trigger::Key(Key::Enter)),
            (NdsButton::Select, Trigger::Key(Key::Backspace)),
        ]);

        let hotkeys = HashMap::from([
            (Hotkey::Pause, Trigger::Key(Key::P)),
            (Hotkey::Reset, Trigger::Key(Key::F5)),
            (Hotkey::FastForward, Trigger::Key(Key::Backtick)),
            (Hotkey::FastForwardToggle, Trigger::Key(Key::F4)),
            (Hotkey::FullscreenToggle, Trigger::Key(Key::F11)),
            (Hotkey::SwapScreens, Trigger::Key(Key::F10)),
            (Hotkey::SwapScreenEmphasis, Trigger::Key(Key::F9)),
            (Hotkey::FrameStep, Trigger::Key(Key::N)),
            (Hotkey::MoveForward, Trigger::Key(Key::W)),
            (Hotkey::MoveBack, Trigger::Key(Key::S)),
            (Hotkey::MoveLeft, Trigger::Key(Key::A)),
            (Hotkey::MoveRight, Trigger::Key(Key::D)),
            (Hotkey::Jump, Trigger::Key(Key::Space)),
            (Hotkey::MorphBall, Trigger::Ctrl),
            (Hotkey::MorphBallBoost, Trigger::Shift),
            (Hotkey::ShootScan, Trigger::Mouse(PointerButton::Primary)),
            (Hotkey::ScanShoot, Trigger::Mouse(PointerButton::Secondary)),
            (Hotkey::ScanVisor, Trigger::Key(Key::C)),
            (Hotkey::UiOk, Trigger::Key(Key::F)),
            (Hotkey::UiLeft, Trigger::Key(Key::Q)),
            (Hotkey::UiRight, Trigger::Key(Key::E)),
            (Hotkey::WeaponBeam, Trigger::Mouse(PointerButton::Extra2)),
            (Hotkey::WeaponMissile, Trigger::Mouse(PointerButton::Extra1)),
            (Hotkey::Weapon1, Trigger::Key(Key::Num1)),
            (Hotkey::Weapon2, Trigger::Key(Key::Num2)),
            (Hotkey::Weapon3, Trigger::Key(Key::Num3)),
            (Hotkey::Weapon4, Trigger::Key(Key::Num4)),
            (Hotkey::Weapon5, Trigger::Key(Key::Num5)),
            (Hotkey::Weapon6, Trigger::Key(Key::Num6)),
            (Hotkey::Menu, Trigger::Key(Key::V)),
            (Hotkey::VirtualStylus, Trigger::Key(Key::Tab)),
        ]);

        Self { buttons, hotkeys }
    }

    pub fn load_from_file(path: &Path) -> Self {
        let Ok(text) = std::fs::read_to_string(path) else {
            warn!(
                "Failed to read keybinds file {}; using defaults",
                path.display()
            );
            return Self::defaults();
        };
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Self {
        let mut bindings = Self::defaults();

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((name, value)) = line.split_once('=') else {
                warn!(
                    "Ignoring invalid keybinds line {}:{} (expected name = value)",
                    path.display(),
                    line_no + 1
                );
                continue;
            };

            let name = name.trim();
            let value = value.trim();
            let Some(trigger) = parse_trigger(value) else {
                warn!(
                    "Ignoring keybinds line {}:{} (unknown key '{value}')",
                    path.display(),
                    line_no + 1
                );
                continue;
            };

            if let Some(button) = NdsButton::from_name(name) {
                bindings.bind_button(button, trigger);
            } else if let Some(hotkey) = Hotkey::from_name(name) {
                bindings.bind_hotkey(hotkey, trigger);
            } else {
                warn!(
                    "Ignoring unknown keybind name '{name}' in {}:{}",
                    path.display(),
                    line_no + 1
                );
            }
        }

        bindings
    }

    pub fn button(&self, button: NdsButton) -> Option<Trigger> {
        self.buttons.get(&button).copied()
    }

    pub fn hotkey(&self, hotkey: Hotkey) -> Option<Trigger> {
        self.hotkeys.get(&hotkey).copied()
    }

    pub fn bind_button(&mut self, button: NdsButton, trigger: Trigger) {
        self.buttons.retain(|_, t| *t != trigger);
        self.buttons.insert(button, trigger);
    }

    /// Several hotkeys may share a trigger; the Metroid layout reuses keys
    /// across menus and gameplay.
    pub fn bind_hotkey(&mut self, hotkey: Hotkey, trigger: Trigger) {
        self.hotkeys.insert(hotkey, trigger);
    }

    pub fn unbind_hotkey(&mut self, hotkey: Hotkey) {
        self.hotkeys.remove(&hotkey);
    }

    /// Resolve bindings against whatever reports trigger state.
    pub fn sample(&self, is_down: impl Fn(Trigger) -> bool) -> KeyboardSample {
        let mut sample = KeyboardSample::default();
        for (button, trigger) in &self.buttons {
            if is_down(*trigger) {
                sample.buttons |= button.bit();
            }
        }
        for (hotkey, trigger) in &self.hotkeys {
            if is_down(*trigger) {
                sample.hotkeys.insert(*hotkey);
            }
        }
        sample
    }

    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut lines = Vec::new();
        lines.push("# Hunters keybinds configuration".to_string());
        lines.push(String::new());

        for button in NdsButton::ALL {
            if let Some(trigger) = self.button(button) {
                lines.push(format!("{} = {}", button.name(), trigger_to_string(trigger)));
            }
        }

        lines.push(String::new());
        for hotkey in Hotkey::ALL {
            if let Some(trigger) = self.hotkey(hotkey) {
                lines.push(format!("{} = {}", hotkey.name(), trigger_to_string(trigger)));
            }
        }

        let content = lines.join("\n");
        std::fs::write(path, content)?;
        info!("Saved keybinds to {}", path.display());
        Ok(())
    }
}

fn trigger_to_string(trigger: Trigger) -> String {
    match trigger {
        Trigger::Key(key) => key_to_string(key),
        Trigger::Mouse(PointerButton::Primary) => "MouseLeft".to_string(),
        Trigger::Mouse(PointerButton::Secondary) => "MouseRight".to_string(),
        Trigger::Mouse(PointerButton::Middle) => "MouseMiddle".to_string(),
        Trigger::Mouse(PointerButton::Extra1) => "Mouse4".to_string(),
        Trigger::Mouse(PointerButton::Extra2) => "Mouse5".to_string(),
        Trigger::Ctrl => "Ctrl".to_string(),
        Trigger::Shift => "Shift".to_string(),
        Trigger::Alt => "Alt".to_string(),
    }
}

fn key_to_string(key: Key) -> String {
    match key {
        Key::ArrowUp => "Up".to_string(),
        Key::ArrowDown => "Down".to_string(),
        Key::ArrowLeft => "Left".to_string(),
        Key::ArrowRight => "Right".to_string(),
        other => other.name().to_string(),
    }
}

fn parse_trigger(raw: &str) -> Option<Trigger> {
    let s = raw.trim();

    match s {
        "MouseLeft" | "Mouse1" => Some(Trigger::Mouse(PointerButton::Primary)),
        "MouseRight" | "Mouse2" => Some(Trigger::Mouse(PointerButton::Secondary)),
        "MouseMiddle" | "Mouse3" => Some(Trigger::Mouse(PointerButton::Middle)),
        "Mouse4" => Some(Trigger::Mouse(PointerButton::Extra1)),
        "Mouse5" => Some(Trigger::Mouse(PointerButton::Extra2)),
        "Ctrl" | "Control" => Some(Trigger::Ctrl),
        "Shift" => Some(Trigger::Shift),
        "Alt" => Some(Trigger::Alt),
        _ => parse_key(s).map(Trigger::Key),
    }
}

fn parse_key(s: &str) -> Option<Key> {
    if s.len() == 1 {
        let c = s.chars().next()?;
        if c.is_ascii_alphabetic() {
            return Key::from_name(&c.to_ascii_uppercase().to_string());
        }
    }
    Key::from_name(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> KeyBindings {
        KeyBindings::parse(text, Path::new("keybinds.toml"))
    }

    #[test]
    fn defaults_cover_every_hotkey() {
        let bindings = KeyBindings::defaults();
        for hotkey in Hotkey::ALL {
            assert!(bindings.hotkey(hotkey).is_some(), "{hotkey:?} unbound");
        }
        for button in NdsButton::ALL {
            assert!(bindings.button(button).is_some(), "{button:?} unbound");
        }
    }

    #[test]
    fn lines_rebind_buttons_and_hotkeys() {
        let bindings = parse(
            "# comment\n\
             a = z\n\
             jump = MouseRight   # trailing\n\
             morph_ball = Alt\n\
             bogus line\n\
             nonsense = Q\n\
             menu = NotAKey\n",
        );

        assert_eq!(bindings.button(NdsButton::A), Some(Trigger::Key(Key::Z)));
        assert_eq!(
            bindings.hotkey(Hotkey::Jump),
            Some(Trigger::Mouse(PointerButton::Secondary))
        );
        assert_eq!(bindings.hotkey(Hotkey::MorphBall), Some(Trigger::Alt));
        assert_eq!(bindings.hotkey(Hotkey::Menu), Some(Trigger::Key(Key::V)));
    }

    #[test]
    fn a_key_drives_one_button() {
        let mut bindings = KeyBindings::defaults();
        bindings.bind_button(NdsButton::B, Trigger::Key(Key::K));
        assert_eq!(bindings.button(NdsButton::A), None);
        assert_eq!(bindings.button(NdsButton::B), Some(Trigger::Key(Key::K)));
    }

    #[test]
    fn sample_sets_buttons_active_high() {
        let bindings = KeyBindings::defaults();
        let sample = bindings.sample(|t| {
            matches!(
                t,
                Trigger::Key(Key::ArrowUp) | Trigger::Key(Key::W) | Trigger::Shift
            )
        });

        assert_eq!(sample.buttons, NdsButton::Up.bit());
        assert!(sample.hotkeys.contains(Hotkey::MoveForward));
        assert!(sample.hotkeys.contains(Hotkey::MorphBallBoost));
        assert!(!sample.hotkeys.contains(Hotkey::Jump));
    }

    #[test]
    fn saved_file_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("keybinds.toml");

        let mut bindings = KeyBindings::defaults();
        bindings.bind_hotkey(Hotkey::ScanVisor, Trigger::Mouse(PointerButton::Middle));
        bindings.bind_button(NdsButton::Start, Trigger::Key(Key::Escape));
        bindings.save_to_file(&path).expect("save");

        let loaded = KeyBindings::load_from_file(&path);
        assert_eq!(
            loaded.hotkey(Hotkey::ScanVisor),
            Some(Trigger::Mouse(PointerButton::Middle))
        );
        assert_eq!(
            loaded.button(NdsButton::Start),
            Some(Trigger::Key(Key::Escape))
        );
        assert_eq!(loaded.button(NdsButton::Up), Some(Trigger::Key(Key::ArrowUp)));
        assert_eq!(loaded.hotkey(Hotkey::Weapon4), Some(Trigger::Key(Key::Num4)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let bindings = KeyBindings::load_from_file(Path::new("/nonexistent/keybinds.toml"));
        assert_eq!(bindings.hotkey(Hotkey::Jump), Some(Trigger::Key(Key::Space)));
    }
}
