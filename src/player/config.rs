use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use super::clock::{ClockMode, DEFAULT_STEP, MAX_FIXED_STEP};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Seconds the clock advances per frame in fixed-step mode.
    #[serde(default = "default_frame_step")]
    pub frame_step: f32,
    /// Advance by measured wall-clock time instead of `frame_step`.
    #[serde(default)]
    pub realtime: bool,
    /// World units covered by one terminal row.
    #[serde(default = "default_world_units_per_cell")]
    pub world_units_per_cell: f32,
    #[serde(default)]
    pub key_bindings: KeyBindings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_toggle_pause")]
    pub toggle_pause: String,
    #[serde(default = "default_restart")]
    pub restart: String,
    #[serde(default = "default_quit")]
    pub quit: String,
}

fn default_frame_step() -> f32 { DEFAULT_STEP }
fn default_world_units_per_cell() -> f32 { 0.5 }
fn default_toggle_pause() -> String { "Space".into() }
fn default_restart() -> String { "r".into() }
fn default_quit() -> String { "q".into() }

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            toggle_pause: default_toggle_pause(),
            restart: default_restart(),
            quit: default_quit(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            frame_step: default_frame_step(),
            realtime: false,
            world_units_per_cell: default_world_units_per_cell(),
            key_bindings: KeyBindings::default(),
        }
    }
}

impl PlayerConfig {
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(json) => Self::from_json(&json),
            Err(_) => Self::default(),
        }
    }

    /// Parse a config document, falling back to defaults when it is invalid.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<PlayerConfig>(json) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                log::warn!("Invalid player config ({e}), using defaults");
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        if !(self.frame_step.is_finite() && self.frame_step > 0.0) {
            log::warn!("Invalid frame_step {}, using {DEFAULT_STEP}", self.frame_step);
            self.frame_step = DEFAULT_STEP;
        } else if self.frame_step > MAX_FIXED_STEP {
            log::warn!("frame_step {} is too large, using {MAX_FIXED_STEP}", self.frame_step);
            self.frame_step = MAX_FIXED_STEP;
        }
        if !(self.world_units_per_cell.is_finite() && self.world_units_per_cell > 0.0) {
            self.world_units_per_cell = default_world_units_per_cell();
        }
        self
    }

    pub fn clock_mode(&self) -> ClockMode {
        if self.realtime {
            ClockMode::RealTime
        } else {
            ClockMode::Fixed(self.frame_step)
        }
    }

    fn config_path() -> std::path::PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = std::path::PathBuf::from(home);
        path.push(".config");
        path.push("scene-animator");
        path.push("player.json");
        path
    }
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(ch) = binding.strip_prefix("Ctrl-") {
        if !event.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        return match ch.chars().next() {
            Some(c) => event.code == KeyCode::Char(c),
            None => false,
        };
    }

    // Plain bindings never fire while Ctrl or Alt is held.
    if event.modifiers.contains(KeyModifiers::CONTROL)
        || event.modifiers.contains(KeyModifiers::ALT)
    {
        return false;
    }

    match binding {
        "Right" => event.code == KeyCode::Right,
        "Left" => event.code == KeyCode::Left,
        "Enter" => event.code == KeyCode::Enter,
        "Esc" => event.code == KeyCode::Esc,
        "Space" => event.code == KeyCode::Char(' '),
        "Home" => event.code == KeyCode::Home,
        s => {
            if let Some(rest) = s.strip_prefix('F') {
                if let Ok(n) = rest.parse::<u8>() {
                    return event.code == KeyCode::F(n);
                }
            }
            match s.chars().next() {
                Some(c) => event.code == KeyCode::Char(c),
                None => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = PlayerConfig::from_json(r#"{"realtime": true}"#);
        assert!(config.realtime);
        assert_eq!(config.frame_step, DEFAULT_STEP);
        assert_eq!(config.key_bindings.quit, "q");
        assert_eq!(config.clock_mode(), ClockMode::RealTime);
    }

    #[test]
    fn invalid_config_falls_back() {
        let config = PlayerConfig::from_json("{ not json");
        assert!(!config.realtime);
        let config = PlayerConfig::from_json(r#"{"frame_step": 0}"#);
        assert_eq!(config.frame_step, DEFAULT_STEP);
    }

    #[test]
    fn oversized_frame_step_is_capped() {
        let config = PlayerConfig::from_json(r#"{"frame_step": 1e30}"#);
        assert_eq!(config.frame_step, MAX_FIXED_STEP);
        assert_eq!(config.clock_mode(), ClockMode::Fixed(MAX_FIXED_STEP));
        // The interactive loop turns the step into a `Duration`.
        let _ = std::time::Duration::from_secs_f32(config.frame_step);
    }

    #[test]
    fn bindings_respect_modifiers() {
        assert!(matches_binding("Space", &key(KeyCode::Char(' '), KeyModifiers::NONE)));
        assert!(matches_binding("q", &key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(!matches_binding("q", &key(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        assert!(matches_binding("Ctrl-c", &key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(matches_binding("F5", &key(KeyCode::F(5), KeyModifiers::NONE)));
    }
}
