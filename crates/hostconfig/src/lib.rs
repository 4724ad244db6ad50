//! Host configuration for the gemelo runner.
//!
//! ```toml
//! version = 1
//!
//! [surface]
//! width = 720
//! height = 1280
//! density_dpi = 320
//! asset_root = "/usr/share/gemelo"
//!
//! [player]
//! name = "Zamenhof"
//! language = "eo"
//!
//! [replay]
//! event_interval = "16ms"
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostConfig {
    pub version: u32,
    #[serde(default)]
    pub surface: SurfaceSection,
    #[serde(default)]
    pub player: PlayerSection,
    #[serde(default)]
    pub replay: ReplaySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SurfaceSection {
    pub width: u32,
    pub height: u32,
    pub density_dpi: u32,
    pub asset_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    pub name: Option<String>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplaySection {
    /// Pause between replayed touch events.
    #[serde(
        default = "default_event_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub event_interval: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            surface: SurfaceSection::default(),
            player: PlayerSection::default(),
            replay: ReplaySection::default(),
        }
    }
}

impl Default for SurfaceSection {
    fn default() -> Self {
        Self {
            width: 720,
            height: 1280,
            density_dpi: 160,
            asset_root: PathBuf::from("assets"),
        }
    }
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            name: None,
            language: default_language(),
        }
    }
}

impl Default for ReplaySection {
    fn default() -> Self {
        Self {
            event_interval: default_event_interval(),
        }
    }
}

fn default_language() -> String {
    "eo".into()
}

fn default_event_interval() -> Duration {
    Duration::from_millis(16)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() || !v.is_finite() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl HostConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: HostConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "surface size {}x{} must be non-zero in both dimensions",
                self.surface.width, self.surface.height
            )));
        }

        if self.surface.density_dpi == 0 {
            return Err(ConfigError::Invalid(
                "surface.density_dpi must be greater than zero".into(),
            ));
        }

        if self.player.language.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "player.language may not be empty".into(),
            ));
        }

        if let Some(name) = &self.player.name {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "player.name may not be blank; omit it instead".into(),
                ));
            }
        }

        Ok(())
    }
}
