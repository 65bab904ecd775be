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
use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::util::filename_display;

use super::{SampleEntry, ZoneError};

/// What to do when two samples share the same root and velocity.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Abort the whole run.
    Error,
    /// Keep the earliest sample.
    KeepFirst,
    /// Keep the latest sample.
    #[default]
    KeepLast,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DuplicatePolicy::Error => "error",
            DuplicatePolicy::KeepFirst => "keep-first",
            DuplicatePolicy::KeepLast => "keep-last",
        };
        write!(f, "{}", name)
    }
}

/// Builds the velocity layers for one root, keyed by velocity. `samples` must all share
/// `root` and carry a velocity; entries without one are ignored. Encounter order is the
/// order of `samples`.
pub fn resolve_layers<'a>(
    root: u8,
    samples: &[&'a SampleEntry],
    policy: DuplicatePolicy,
) -> Result<BTreeMap<u8, &'a SampleEntry>, ZoneError> {
    let mut layers: BTreeMap<u8, &'a SampleEntry> = BTreeMap::new();

    for &sample in samples {
        let Some(velocity) = sample.velocity() else {
            continue;
        };

        match layers.get(&velocity) {
            None => {
                layers.insert(velocity, sample);
            }
            Some(&existing) => match policy {
                DuplicatePolicy::Error => {
                    return Err(ZoneError::DuplicateVelocity { root, velocity });
                }
                DuplicatePolicy::KeepFirst => {
                    debug!(
                        root,
                        velocity,
                        kept = filename_display(existing.source()),
                        dropped = filename_display(sample.source()),
                        "Duplicate velocity layer"
                    );
                }
                DuplicatePolicy::KeepLast => {
                    debug!(
                        root,
                        velocity,
                        kept = filename_display(sample.source()),
                        dropped = filename_display(existing.source()),
                        "Duplicate velocity layer"
                    );
                    layers.insert(velocity, sample);
                }
            },
        }
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;

    fn entry(name: &str, velocity: u8) -> SampleEntry {
        SampleEntry::new(PathBuf::from(name), 60, Some(velocity))
    }

    fn picked(layers: &BTreeMap<u8, &SampleEntry>, velocity: u8) -> PathBuf {
        layers[&velocity].source().to_path_buf()
    }

    #[test]
    fn test_no_duplicates() {
        let a = entry("a.wav", 40);
        let b = entry("b.wav", 90);
        let layers = resolve_layers(60, &[&a, &b], DuplicatePolicy::Error).unwrap();
        assert_eq!(layers.keys().copied().collect::<Vec<_>>(), vec![40, 90]);
    }

    #[test]
    fn test_error_policy() {
        let a = entry("a.wav", 40);
        let b = entry("b.wav", 40);
        let err = resolve_layers(60, &[&a, &b], DuplicatePolicy::Error).unwrap_err();
        assert!(matches!(
            err,
            ZoneError::DuplicateVelocity {
                root: 60,
                velocity: 40
            }
        ));
    }

    #[test]
    fn test_keep_first_and_keep_last() {
        let a = entry("a.wav", 40);
        let b = entry("b.wav", 40);

        let first = resolve_layers(60, &[&a, &b], DuplicatePolicy::KeepFirst).unwrap();
        assert_eq!(picked(&first, 40), Path::new("a.wav"));

        let last = resolve_layers(60, &[&a, &b], DuplicatePolicy::KeepLast).unwrap();
        assert_eq!(picked(&last, 40), Path::new("b.wav"));
    }

    #[test]
    fn test_reversed_order_selects_differently() {
        let a = entry("a.wav", 40);
        let b = entry("b.wav", 40);

        let first = resolve_layers(60, &[&b, &a], DuplicatePolicy::KeepFirst).unwrap();
        let last = resolve_layers(60, &[&a, &b], DuplicatePolicy::KeepLast).unwrap();
        assert_eq!(picked(&first, 40), picked(&last, 40));

        let first = resolve_layers(60, &[&a, &b], DuplicatePolicy::KeepFirst).unwrap();
        let first_reversed = resolve_layers(60, &[&b, &a], DuplicatePolicy::KeepFirst).unwrap();
        assert_ne!(picked(&first, 40), picked(&first_reversed, 40));

        let last = resolve_layers(60, &[&a, &b], DuplicatePolicy::KeepLast).unwrap();
        assert_ne!(picked(&first, 40), picked(&last, 40));
    }

    #[test]
    fn test_unlayered_entries_ignored() {
        let a = entry("a.wav", 40);
        let plain = SampleEntry::new(PathBuf::from("plain.wav"), 60, None);
        let layers = resolve_layers(60, &[&plain, &a], DuplicatePolicy::Error).unwrap();
        assert_eq!(layers.len(), 1);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(DuplicatePolicy::default(), DuplicatePolicy::KeepLast);
        assert_eq!(DuplicatePolicy::KeepFirst.to_string(), "keep-first");
    }
}
