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

//! Mapping parsed samples onto the keyboard.
//!
//! This module provides:
//! - Key range partitioning across roots and velocity partitioning within a root
//! - Duplicate (root, velocity) resolution
//! - Assembly of the final, ordered zone list
//!
//! Assembly is a pure function of its inputs: it either returns every zone or an error,
//! never a partial list.

pub mod duplicates;
pub mod partition;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::note::MAX_NOTE;
use crate::util::filename_display;

pub use duplicates::DuplicatePolicy;
pub use partition::{Span, Spread};

use self::duplicates::resolve_layers;
use self::partition::{key_ranges, velocity_ranges, MAX_VELOCITY};

/// A sample file with the pitch and velocity parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEntry {
    /// Where the sample came from.
    source: PathBuf,
    /// The MIDI note the sample plays unshifted.
    root: u8,
    /// The top of the velocity layer this sample belongs to, if any.
    velocity: Option<u8>,
}

impl SampleEntry {
    /// `root` must be a MIDI note (0-127) and `velocity`, when present, 1-127.
    pub fn new(source: PathBuf, root: u8, velocity: Option<u8>) -> SampleEntry {
        debug_assert!(root <= MAX_NOTE, "root {} is not a MIDI note", root);
        debug_assert!(
            velocity.map_or(true, |v| (1..=MAX_VELOCITY).contains(&v)),
            "velocity {:?} is outside 1-127",
            velocity
        );
        SampleEntry {
            source,
            root,
            velocity,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn velocity(&self) -> Option<u8> {
        self.velocity
    }
}

/// One key range by velocity range assignment of a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    sample: PathBuf,
    root: u8,
    keys: Span,
    velocities: Span,
}

impl Zone {
    pub fn new(sample: PathBuf, root: u8, keys: Span, velocities: Span) -> Zone {
        Zone {
            sample,
            root,
            keys,
            velocities,
        }
    }

    /// The sample this zone plays.
    pub fn sample(&self) -> &Path {
        &self.sample
    }

    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn keys(&self) -> Span {
        self.keys
    }

    pub fn velocities(&self) -> Span {
        self.velocities
    }

    /// Returns the same zone pointing at a different sample reference.
    pub fn with_sample(self, sample: PathBuf) -> Zone {
        Zone { sample, ..self }
    }

    /// Whether two zones claim any of the same key and velocity pairs.
    pub fn overlaps(&self, other: &Zone) -> bool {
        self.keys.overlaps(&other.keys) && self.velocities.overlaps(&other.velocities)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "root {:>3}  keys {:>7}  velocity {:>7}  {}",
            self.root,
            self.keys.to_string(),
            self.velocities.to_string(),
            self.sample.display()
        )
    }
}

/// What to do with a root that has both velocity-layered and unlayered samples.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MixedVelocityPolicy {
    /// Refuse to build the instrument.
    #[default]
    Error,
    /// Build the layers from the velocity-bearing samples and drop the rest.
    DropUnlayered,
}

/// Errors that stop zone assembly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ZoneError {
    #[error("no samples to map")]
    EmptyInput,

    #[error("duplicate velocity {velocity} for root note {root}")]
    DuplicateVelocity { root: u8, velocity: u8 },

    #[error(
        "root note {root} mixes velocity layers with {unlayered} sample(s) that have no velocity"
    )]
    MixedVelocity { root: u8, unlayered: usize },
}

/// Options for zone assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneOptions {
    pub spread: Spread,
    pub on_duplicate: DuplicatePolicy,
    pub mixed_velocity: MixedVelocityPolicy,
}

/// Maps samples onto the keyboard. Zones come out ordered by root, then by velocity.
/// Samples are grouped by root in input order, which is also the encounter order for
/// duplicate resolution.
pub fn assemble(entries: &[SampleEntry], options: &ZoneOptions) -> Result<Vec<Zone>, ZoneError> {
    if entries.is_empty() {
        return Err(ZoneError::EmptyInput);
    }

    let mut groups: BTreeMap<u8, Vec<&SampleEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.root()).or_default().push(entry);
    }

    let roots: Vec<u8> = groups.keys().copied().collect();
    let key_spans = key_ranges(&roots, options.spread);

    let mut zones = Vec::with_capacity(entries.len());
    for ((&root, samples), keys) in groups.iter().zip(key_spans) {
        let layered = samples.iter().filter(|s| s.velocity().is_some()).count();

        if layered == 0 {
            // No layering: the first sample for the root covers every velocity.
            let first = samples[0];
            zones.push(Zone::new(
                first.source().to_path_buf(),
                root,
                keys,
                Span::full(),
            ));
            continue;
        }

        let unlayered = samples.len() - layered;
        if unlayered > 0 {
            match options.mixed_velocity {
                MixedVelocityPolicy::Error => {
                    return Err(ZoneError::MixedVelocity { root, unlayered });
                }
                MixedVelocityPolicy::DropUnlayered => {
                    for sample in samples.iter().filter(|s| s.velocity().is_none()) {
                        warn!(
                            root,
                            file = filename_display(sample.source()),
                            "Dropping sample without velocity from a layered root"
                        );
                    }
                }
            }
        }

        let layers = resolve_layers(root, samples, options.on_duplicate)?;
        let velocities: Vec<u8> = layers.keys().copied().collect();
        for (sample, velocity_span) in layers.values().zip(velocity_ranges(&velocities)) {
            zones.push(Zone::new(
                sample.source().to_path_buf(),
                root,
                keys,
                velocity_span,
            ));
        }
    }

    info!(
        samples = entries.len(),
        roots = roots.len(),
        zones = zones.len(),
        "Assembled zones"
    );
    Ok(zones)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, root: u8, velocity: Option<u8>) -> SampleEntry {
        SampleEntry::new(PathBuf::from(name), root, velocity)
    }

    fn spans(zones: &[Zone]) -> Vec<(u8, Span, Span)> {
        zones
            .iter()
            .map(|z| (z.root(), z.keys(), z.velocities()))
            .collect()
    }

    #[test]
    fn test_roots_without_velocity() {
        let entries = vec![
            entry("c4.wav", 72, None),
            entry("c2.wav", 48, None),
            entry("c3.wav", 60, None),
        ];
        let zones = assemble(&entries, &ZoneOptions::default()).unwrap();

        assert_eq!(
            spans(&zones),
            vec![
                (48, Span::new(0, 54), Span::full()),
                (60, Span::new(55, 66), Span::full()),
                (72, Span::new(67, 127), Span::full()),
            ]
        );
        assert_eq!(zones[0].sample(), Path::new("c2.wav"));
    }

    #[test]
    fn test_velocity_layers_single_root() {
        let entries = vec![
            entry("hard.wav", 60, Some(127)),
            entry("soft.wav", 60, Some(40)),
            entry("medium.wav", 60, Some(90)),
        ];
        let zones = assemble(&entries, &ZoneOptions::default()).unwrap();

        assert_eq!(
            spans(&zones),
            vec![
                (60, Span::full(), Span::new(0, 40)),
                (60, Span::full(), Span::new(41, 90)),
                (60, Span::full(), Span::new(91, 127)),
            ]
        );
        let samples: Vec<&Path> = zones.iter().map(Zone::sample).collect();
        assert_eq!(
            samples,
            vec![
                Path::new("soft.wav"),
                Path::new("medium.wav"),
                Path::new("hard.wav")
            ]
        );
    }

    #[test]
    fn test_unlayered_root_uses_first_sample() {
        let entries = vec![entry("a.wav", 60, None), entry("b.wav", 60, None)];
        let zones = assemble(&entries, &ZoneOptions::default()).unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].sample(), Path::new("a.wav"));
        assert_eq!(zones[0].velocities(), Span::full());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            assemble(&[], &ZoneOptions::default()),
            Err(ZoneError::EmptyInput)
        );
    }

    #[test]
    fn test_duplicate_error_aborts_everything() {
        let entries = vec![
            entry("c2.wav", 48, Some(100)),
            entry("c3a.wav", 60, Some(40)),
            entry("c3b.wav", 60, Some(40)),
            entry("c4.wav", 72, None),
        ];
        let options = ZoneOptions {
            on_duplicate: DuplicatePolicy::Error,
            ..ZoneOptions::default()
        };
        assert_eq!(
            assemble(&entries, &options),
            Err(ZoneError::DuplicateVelocity {
                root: 60,
                velocity: 40
            })
        );
    }

    #[test]
    fn test_duplicate_default_keeps_last() {
        let entries = vec![entry("a.wav", 60, Some(40)), entry("b.wav", 60, Some(40))];
        let zones = assemble(&entries, &ZoneOptions::default()).unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].sample(), Path::new("b.wav"));
        assert_eq!(zones[0].velocities(), Span::full());
    }

    #[test]
    fn test_mixed_velocity_rejected_by_default() {
        let entries = vec![entry("a.wav", 60, Some(40)), entry("plain.wav", 60, None)];
        assert_eq!(
            assemble(&entries, &ZoneOptions::default()),
            Err(ZoneError::MixedVelocity {
                root: 60,
                unlayered: 1
            })
        );
    }

    #[test]
    fn test_mixed_velocity_drop_unlayered() {
        let entries = vec![
            entry("plain.wav", 60, None),
            entry("soft.wav", 60, Some(40)),
            entry("loud.wav", 60, Some(100)),
        ];
        let options = ZoneOptions {
            mixed_velocity: MixedVelocityPolicy::DropUnlayered,
            ..ZoneOptions::default()
        };
        let zones = assemble(&entries, &options).unwrap();
        assert_eq!(zones.len(), 2);
        assert!(zones.iter().all(|z| z.sample() != Path::new("plain.wav")));
        assert_eq!(zones[1].velocities(), Span::new(41, 127));
    }

    #[test]
    fn test_spread_applies_to_every_layer() {
        let entries = vec![
            entry("soft.wav", 60, Some(64)),
            entry("loud.wav", 60, Some(127)),
        ];
        let options = ZoneOptions {
            spread: Spread::new(Some(12), Some(7)),
            ..ZoneOptions::default()
        };
        let zones = assemble(&entries, &options).unwrap();
        assert!(zones.iter().all(|z| z.keys() == Span::new(48, 67)));
    }

    #[test]
    fn test_zones_never_overlap() {
        let entries = vec![
            entry("a.wav", 36, Some(30)),
            entry("b.wav", 36, Some(90)),
            entry("c.wav", 37, None),
            entry("d.wav", 64, Some(127)),
            entry("e.wav", 64, Some(1)),
            entry("f.wav", 100, None),
        ];
        let zones = assemble(&entries, &ZoneOptions::default()).unwrap();
        for (i, a) in zones.iter().enumerate() {
            for b in zones.iter().skip(i + 1) {
                assert!(!a.overlaps(b), "{} overlaps {}", a, b);
            }
        }

        // Every key/velocity cell is covered by exactly one zone.
        for key in 0..=127u8 {
            for velocity in 0..=127u8 {
                let owners = zones
                    .iter()
                    .filter(|z| z.keys().contains(key) && z.velocities().contains(velocity))
                    .count();
                assert_eq!(owners, 1, "key {} velocity {}", key, velocity);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let entries = vec![
            entry("a.wav", 50, Some(20)),
            entry("b.wav", 50, Some(20)),
            entry("c.wav", 70, None),
        ];
        let first = assemble(&entries, &ZoneOptions::default());
        let second = assemble(&entries, &ZoneOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_with_sample_keeps_ranges() {
        let zone = Zone::new(PathBuf::from("a.wav"), 60, Span::new(55, 66), Span::full());
        let moved = zone.clone().with_sample(PathBuf::from("Samples/a.wav"));
        assert_eq!(moved.sample(), Path::new("Samples/a.wav"));
        assert_eq!(moved.keys(), zone.keys());
        assert_eq!(moved.velocities(), zone.velocities());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not a MIDI note")]
    fn test_entry_rejects_root_above_127() {
        entry("C12.wav", 200, None);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "outside 1-127")]
    fn test_entry_rejects_zero_velocity() {
        entry("C3_v0.wav", 60, Some(0));
    }
}
