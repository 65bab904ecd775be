// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

use crate::filename::pattern::{Pattern, PatternError};
use crate::filename::FilenameParser;
use crate::zones::{DuplicatePolicy, MixedVelocityPolicy, Spread, ZoneOptions};

pub mod error;

pub use self::error::ConfigError;

/// Default octave number whose C is MIDI note 60.
pub const DEFAULT_MIDDLE_OCTAVE: i32 = 3;

/// Default number of keys the edge roots may reach past themselves.
pub const DEFAULT_SPREAD: u8 = 12;

/// Audio file extensions picked up from a folder by default.
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &["wav", "aif", "aiff", "flac", "ogg"];

/// A YAML representation of the generator settings.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// The octave number whose C maps to MIDI note 60.
    #[serde(default = "default_middle_octave")]
    pub middle_octave: i32,

    /// How many keys below the lowest root are mapped. `null` maps down to key 0.
    #[serde(default = "default_spread")]
    pub low_spread: Option<u8>,

    /// How many keys above the highest root are mapped. `null` maps up to key 127.
    #[serde(default = "default_spread")]
    pub high_spread: Option<u8>,

    /// What to do when two samples share a root and velocity.
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,

    /// What to do when a root mixes layered and unlayered samples.
    #[serde(default)]
    pub mixed_velocity: MixedVelocityPolicy,

    /// Optional file name template using {note} and {vel}. Auto-detect is used when unset.
    #[serde(default)]
    pub pattern: Option<String>,

    /// Copy samples next to the preset instead of referencing them in place.
    #[serde(default)]
    pub copy_samples: bool,

    /// File extensions (without the dot, case-insensitive) considered audio samples.
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,
}

fn default_middle_octave() -> i32 {
    DEFAULT_MIDDLE_OCTAVE
}

fn default_spread() -> Option<u8> {
    Some(DEFAULT_SPREAD)
}

fn default_audio_extensions() -> Vec<String> {
    DEFAULT_AUDIO_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            middle_octave: default_middle_octave(),
            low_spread: default_spread(),
            high_spread: default_spread(),
            on_duplicate: DuplicatePolicy::default(),
            mixed_velocity: MixedVelocityPolicy::default(),
            pattern: None,
            copy_samples: false,
            audio_extensions: default_audio_extensions(),
        }
    }
}

impl Settings {
    /// Reads settings from a YAML file.
    pub fn deserialize(path: &Path) -> Result<Settings, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks settings that deserialize fine but can't be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio_extensions.is_empty() {
            return Err(ConfigError::Invalid {
                field: "audio_extensions",
                reason: "at least one extension is required".to_string(),
            });
        }
        if let Some(ext) = self.audio_extensions.iter().find(|ext| ext.starts_with('.')) {
            return Err(ConfigError::Invalid {
                field: "audio_extensions",
                reason: format!("'{}' should be given without the leading dot", ext),
            });
        }
        Ok(())
    }

    /// Removes both spread bounds so the edge roots reach the ends of the keyboard.
    pub fn full_range(&mut self) {
        self.low_spread = None;
        self.high_spread = None;
    }

    /// The zone assembly options described by these settings.
    pub fn zone_options(&self) -> ZoneOptions {
        ZoneOptions {
            spread: Spread::new(self.low_spread, self.high_spread),
            on_duplicate: self.on_duplicate,
            mixed_velocity: self.mixed_velocity,
        }
    }

    /// Builds the file name parser, compiling the template once if one is set.
    pub fn filename_parser(&self) -> Result<FilenameParser, PatternError> {
        Ok(match &self.pattern {
            Some(template) => {
                FilenameParser::template(Pattern::compile(template)?, self.middle_octave)
            }
            None => FilenameParser::auto(self.middle_octave),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use config::{Config, File, FileFormat};

    use super::*;

    fn from_yaml(yaml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = from_yaml("{}");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.middle_octave, 3);
        assert_eq!(settings.low_spread, Some(12));
        assert_eq!(settings.high_spread, Some(12));
        assert_eq!(settings.on_duplicate, DuplicatePolicy::KeepLast);
        assert_eq!(settings.mixed_velocity, MixedVelocityPolicy::Error);
        assert!(!settings.copy_samples);
    }

    #[test]
    fn test_full_settings() {
        let settings = from_yaml(
            r#"
            middle_octave: 4
            low_spread: 5
            high_spread: 24
            on_duplicate: keep-first
            mixed_velocity: drop-unlayered
            pattern: "Piano_{note}_{vel}"
            copy_samples: true
            audio_extensions:
              - wav
              - flac
        "#,
        );

        assert_eq!(settings.middle_octave, 4);
        assert_eq!(
            settings.zone_options(),
            ZoneOptions {
                spread: Spread::new(Some(5), Some(24)),
                on_duplicate: DuplicatePolicy::KeepFirst,
                mixed_velocity: MixedVelocityPolicy::DropUnlayered,
            }
        );
        assert_eq!(settings.pattern.as_deref(), Some("Piano_{note}_{vel}"));
        assert!(settings.copy_samples);
        assert_eq!(settings.audio_extensions, vec!["wav", "flac"]);
    }

    #[test]
    fn test_full_range() {
        let mut settings = Settings::default();
        settings.full_range();
        assert_eq!(settings.zone_options().spread, Spread::unbounded());
    }

    #[test]
    fn test_deserialize_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zonemap.yaml");
        fs::write(&path, "on_duplicate: error\nmiddle_octave: 5\n").unwrap();

        let settings = Settings::deserialize(&path).unwrap();
        assert_eq!(settings.on_duplicate, DuplicatePolicy::Error);
        assert_eq!(settings.middle_octave, 5);
    }

    #[test]
    fn test_invalid_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zonemap.yaml");
        fs::write(&path, "audio_extensions:\n  - .wav\n").unwrap();

        assert!(matches!(
            Settings::deserialize(&path),
            Err(ConfigError::Invalid {
                field: "audio_extensions",
                ..
            })
        ));
    }

    #[test]
    fn test_filename_parser_template_error() {
        let settings = Settings {
            pattern: Some("no placeholders".to_string()),
            ..Settings::default()
        };
        assert!(settings.filename_parser().is_err());
    }
}
