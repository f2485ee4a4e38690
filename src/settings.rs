use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const MIN_ROUND_LIMIT_SECS: u64 = 5;
const MAX_ROUND_LIMIT_SECS: u64 = 3_600;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    /// Hold the pointer down and sweep across tiles.
    #[default]
    Drag,
    /// Tap tiles one by one; the input layer synthesizes the gesture.
    Click,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameplaySettings {
    pub arithmetic_tiles: bool,
    pub input_mode: InputMode,
    pub round_limit_secs: u64,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            arithmetic_tiles: true,
            input_mode: InputMode::Drag,
            round_limit_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub gameplay: GameplaySettings,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            gameplay: GameplaySettings::default(),
        }
    }
}

impl PlayerSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.gameplay.round_limit_secs = self
            .gameplay
            .round_limit_secs
            .clamp(MIN_ROUND_LIMIT_SECS, MAX_ROUND_LIMIT_SECS);
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("NULLSUM_SETTINGS_PATH") {
            return Self {
                path: PathBuf::from(explicit),
            };
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("nullsum");
        path.push("settings.json");
        Self { path }
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> PlayerSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return PlayerSettings::default();
        };
        serde_json::from_slice::<PlayerSettings>(&bytes)
            .map(PlayerSettings::sanitized)
            .unwrap_or_else(|_| PlayerSettings::default())
    }

    pub fn save(&self, settings: &PlayerSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}
