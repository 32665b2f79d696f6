//! Game settings and preferences
//!
//! Persisted separately from scores in LocalStorage. Loading never fails:
//! a missing record yields defaults and a damaged field falls back to its
//! own default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::DEFAULT_ROUND_SECONDS;
use crate::persistence::{self, SETTINGS_KEY, Storage, StorageError};
use crate::tuning::{LevelingRule, RoundConfig};

/// Default player name
pub const DEFAULT_PLAYER_NAME: &str = "Pemain";

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Capybara artwork shown for collectibles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Avatar {
    #[default]
    #[serde(rename = "capybara1")]
    Bakpao,
    #[serde(rename = "capybara2")]
    Hi,
    #[serde(rename = "capybara3")]
    Sleep,
    #[serde(rename = "capybara4")]
    Stretching,
}

impl Avatar {
    pub const ALL: [Avatar; 4] = [Avatar::Bakpao, Avatar::Hi, Avatar::Sleep, Avatar::Stretching];

    /// Persisted key
    pub fn key(&self) -> &'static str {
        match self {
            Avatar::Bakpao => "capybara1",
            Avatar::Hi => "capybara2",
            Avatar::Sleep => "capybara3",
            Avatar::Stretching => "capybara4",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key.trim())
    }

    /// Image file served next to the page
    pub fn image_file(&self) -> &'static str {
        match self {
            Avatar::Bakpao => "bakpao capybara.png",
            Avatar::Hi => "Hi capybara.png",
            Avatar::Sleep => "sleep capybara.png",
            Avatar::Stretching => "streching capybara.png",
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub player_name: String,
    /// Round length in seconds (always > 0)
    pub game_duration: u32,
    pub difficulty: Difficulty,
    pub sound_enabled: bool,
    #[serde(rename = "capybaraImage")]
    pub avatar: Avatar,
    pub leveling_rule: LevelingRule,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            game_duration: DEFAULT_ROUND_SECONDS,
            difficulty: Difficulty::Medium,
            sound_enabled: true,
            avatar: Avatar::Bakpao,
            leveling_rule: LevelingRule::Score,
        }
    }
}

impl Settings {
    /// Build settings from a stored JSON record, field by field.
    /// Returns `None` only when the record is not a JSON object.
    pub fn from_record(record: &Value) -> Option<Self> {
        let obj = record.as_object()?;
        let defaults = Self::default();

        let player_name = obj
            .get("playerName")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.player_name);

        let game_duration = obj
            .get("gameDuration")
            .and_then(parse_duration)
            .unwrap_or(defaults.game_duration);

        let difficulty = obj
            .get("difficulty")
            .and_then(Value::as_str)
            .and_then(Difficulty::from_str)
            .unwrap_or(defaults.difficulty);

        let sound_enabled = obj
            .get("soundEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.sound_enabled);

        let avatar = obj
            .get("capybaraImage")
            .and_then(Value::as_str)
            .and_then(Avatar::from_key)
            .unwrap_or(defaults.avatar);

        let leveling_rule = obj
            .get("levelingRule")
            .and_then(Value::as_str)
            .and_then(LevelingRule::from_str)
            .unwrap_or(defaults.leveling_rule);

        Some(Self {
            player_name,
            game_duration,
            difficulty,
            sound_enabled,
            avatar,
            leveling_rule,
        })
    }

    /// Round parameters derived from these settings
    pub fn round_config(&self) -> RoundConfig {
        RoundConfig::from_settings(self)
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &dyn Storage) -> Self {
        let settings = persistence::load_json::<Value>(storage, SETTINGS_KEY)
            .and_then(|record| Self::from_record(&record));

        match settings {
            Some(settings) => {
                log::info!("Loaded settings for {}", settings.player_name);
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings
    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        persistence::save_json(storage, SETTINGS_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Drop the stored record and persist defaults
    pub fn reset(storage: &mut dyn Storage) -> Self {
        if let Err(e) = storage.remove_item(SETTINGS_KEY) {
            log::warn!("Could not clear settings: {}", e);
        }
        let settings = Self::default();
        if let Err(e) = settings.save(storage) {
            log::warn!("Could not save default settings: {}", e);
        }
        settings
    }
}

/// Accept a positive integer, or a string holding one (form inputs store text)
fn parse_duration(value: &Value) -> Option<u32> {
    let secs = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(secs).ok().filter(|&s| s > 0)
}
