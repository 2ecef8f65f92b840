use hunters_core::console::ConsoleType;
use hunters_core::input::{Hotkey, InputBindings, JoyMapping, NdsButton};
use hunters_core::rtc::RTC_FILE_NAME;
use hunters_core::settings::{RendererKind, ScreenSizing, Settings};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConsoleMode {
    #[default]
    Ds,
    Dsi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Renderer {
    #[default]
    Software,
    #[serde(rename = "opengl")]
    OpenGl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    #[default]
    Even,
    EmphasizeTop,
    EmphasizeBottom,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WindowSize {
    #[serde(rename = "1x")]
    X1,
    #[serde(rename = "2x")]
    #[default]
    X2,
    #[serde(rename = "3x")]
    X3,
    #[serde(rename = "4x")]
    X4,
    #[serde(rename = "fullscreen")]
    Fullscreen,
}

impl WindowSize {
    pub fn scale_factor_px(&self) -> Option<u32> {
        match self {
            Self::X1 => Some(1),
            Self::X2 => Some(2),
            Self::X3 => Some(3),
            Self::X4 => Some(4),
            Self::Fullscreen => None,
        }
    }

    pub fn is_fullscreen(self) -> bool {
        matches!(self, Self::Fullscreen)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UiConfig {
    pub console: ConsoleMode,
    pub limit_fps: bool,
    pub vsync: bool,
    pub vsync_interval: u32,
    pub renderer: Renderer,
    pub threaded_3d: bool,
    pub gl_better_polygons: bool,
    pub gl_scale_factor: u32,
    pub screen_layout: Layout,
    pub window_size: WindowSize,
    pub aim_sensitivity: f32,
    pub virtual_stylus_sensitivity: f32,
    pub auto_virtual_stylus: bool,
    pub rtc_path: Option<PathBuf>,
    /// Joystick bindings by button or hotkey name, in the raw packed form
    /// (`-1` unbinds).
    pub joystick: BTreeMap<String, i32>,
}

impl Default for UiConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            console: ConsoleMode::Ds,
            limit_fps: settings.limit_fps,
            vsync: settings.vsync,
            vsync_interval: settings.vsync_interval,
            renderer: Renderer::Software,
            threaded_3d: settings.threaded_3d,
            gl_better_polygons: settings.gl_better_polygons,
            gl_scale_factor: settings.gl_scale_factor,
            screen_layout: Layout::Even,
            window_size: WindowSize::default(),
            aim_sensitivity: settings.aim_sensitivity,
            virtual_stylus_sensitivity: settings.virtual_stylus_sensitivity,
            auto_virtual_stylus: settings.auto_virtual_stylus,
            rtc_path: None,
            joystick: BTreeMap::new(),
        }
    }
}

impl UiConfig {
    /// Worker settings for the given frontend instance.
    pub fn to_settings(&self, instance_id: u32) -> Settings {
        Settings {
            console_type: match self.console {
                ConsoleMode::Ds => ConsoleType::Ds,
                ConsoleMode::Dsi => ConsoleType::Dsi,
            },
            limit_fps: self.limit_fps,
            vsync: self.vsync,
            vsync_interval: self.vsync_interval.max(1),
            renderer: match self.renderer {
                Renderer::Software => RendererKind::Software,
                Renderer::OpenGl => RendererKind::OpenGl,
            },
            threaded_3d: self.threaded_3d,
            gl_better_polygons: self.gl_better_polygons,
            gl_scale_factor: self.gl_scale_factor.max(1),
            screen_sizing: match self.screen_layout {
                Layout::Even => ScreenSizing::Even,
                Layout::EmphasizeTop => ScreenSizing::EmphasizeTop,
                Layout::EmphasizeBottom => ScreenSizing::EmphasizeBottom,
                Layout::Auto => ScreenSizing::Auto,
            },
            aim_sensitivity: self.aim_sensitivity,
            virtual_stylus_sensitivity: self.virtual_stylus_sensitivity,
            auto_virtual_stylus: self.auto_virtual_stylus,
            instance_id,
            bindings: self.joystick_bindings(),
            rtc_path: self
                .rtc_path
                .clone()
                .unwrap_or_else(|| config_path(RTC_FILE_NAME)),
            ..Settings::default()
        }
    }

    pub fn joystick_bindings(&self) -> InputBindings {
        let mut bindings = InputBindings::default();
        for (name, &raw) in &self.joystick {
            let mapping = JoyMapping::from_raw(raw);
            if let Some(button) = NdsButton::from_name(name) {
                bindings.bind_button(button, mapping);
            } else if let Some(hotkey) = Hotkey::from_name(name) {
                bindings.bind_hotkey(hotkey, mapping);
            } else {
                warn!("Ignoring joystick binding for unknown name '{name}'");
            }
        }
        bindings
    }
}

/// Per-user config location for `file`.
pub fn config_path(file: &str) -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("hunters").join(file);
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("hunters").join(file);
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".config").join("hunters").join(file);
    }

    PathBuf::from(file)
}

pub fn default_ui_config_path() -> PathBuf {
    config_path("ui.toml")
}

pub fn load_from_file(path: &Path) -> UiConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return UiConfig::default(),
    };

    match toml::from_str::<UiConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse UI config {}: {e}; using defaults",
                path.display()
            );
            UiConfig::default()
        }
    }
}

pub fn save_to_file(path: &Path, cfg: &UiConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let text = toml::to_string_pretty(cfg).map_err(std::io::Error::other)?;
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: UiConfig = toml::from_str(
            r#"
            renderer = "opengl"
            screen-layout = "emphasize-bottom"
            aim-sensitivity = 250.0
            "#,
        )
        .expect("parse");

        assert_eq!(cfg.renderer, Renderer::OpenGl);
        assert_eq!(cfg.screen_layout, Layout::EmphasizeBottom);
        assert_eq!(cfg.aim_sensitivity, 250.0);
        assert!(cfg.limit_fps);
        assert!(cfg.auto_virtual_stylus);
        assert_eq!(cfg.window_size, WindowSize::X2);
    }

    #[test]
    fn settings_carry_config_and_instance() {
        let cfg = UiConfig {
            console: ConsoleMode::Dsi,
            vsync_interval: 0,
            rtc_path: Some(PathBuf::from("/tmp/rtc.bin")),
            ..Default::default()
        };
        let settings = cfg.to_settings(2);

        assert_eq!(settings.console_type, ConsoleType::Dsi);
        assert_eq!(settings.vsync_interval, 1);
        assert_eq!(settings.instance_id, 2);
        assert_eq!(settings.rtc_path, PathBuf::from("/tmp/rtc.bin"));
        assert_eq!(settings.window_title, Settings::default().window_title);
    }

    #[test]
    fn joystick_table_maps_names() {
        let cfg: UiConfig = toml::from_str(
            r#"
            [joystick]
            a = 1
            jump = 0
            menu = -1
            nonsense = 4
            "#,
        )
        .expect("parse");
        let bindings = cfg.joystick_bindings();

        assert_eq!(
            bindings.buttons[NdsButton::A as usize],
            JoyMapping::from_raw(1)
        );
        assert_eq!(bindings.hotkey(Hotkey::Jump), JoyMapping::from_raw(0).as_ref());
        assert_eq!(bindings.hotkey(Hotkey::Menu), None);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ui.toml");
        std::fs::write(&path, "limit-fps = \"maybe\"").expect("write");
        assert_eq!(load_from_file(&path), UiConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cfg").join("ui.toml");
        let mut cfg = UiConfig {
            screen_layout: Layout::Auto,
            window_size: WindowSize::Fullscreen,
            ..Default::default()
        };
        cfg.joystick.insert("shoot_scan".into(), 5);

        save_to_file(&path, &cfg).expect("save");
        assert_eq!(load_from_file(&path), cfg);
    }
}
