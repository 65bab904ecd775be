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

//! Rewrites zone sample references relative to the preset, optionally copying the
//! samples next to it first.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{self, Path, PathBuf};

use tracing::{debug, info};

use crate::util::{filename_display, normalize_path, relative_path};
use crate::zones::Zone;

/// Folder, next to the preset, that copied samples go into.
pub const SAMPLES_DIR: &str = "Samples";

#[derive(Debug, thiserror::Error)]
pub enum RelocateError {
    #[error("unable to copy {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to resolve {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} and {} would both be copied to {name}", first.display(), second.display())]
    NameCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Points zones at their samples from the preset's point of view.
pub struct Relocator {
    preset_dir: PathBuf,
    copy_samples: bool,
}

impl Relocator {
    /// Creates a relocator for a preset written into `preset_dir`.
    pub fn new(preset_dir: &Path, copy_samples: bool) -> Result<Relocator, RelocateError> {
        let preset_dir = absolute(preset_dir)?;
        Ok(Relocator {
            preset_dir,
            copy_samples,
        })
    }

    /// The directory copied samples are written to.
    pub fn samples_dir(&self) -> PathBuf {
        self.preset_dir.join(SAMPLES_DIR)
    }

    /// Returns the zones with references relative to the preset directory. When copying,
    /// every distinct sample is copied once and nothing is copied if any two samples
    /// would collide.
    pub fn relocate(&self, zones: Vec<Zone>) -> Result<Vec<Zone>, RelocateError> {
        let mut locations: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
        for zone in &zones {
            let source = absolute(zone.sample())?;
            if !locations.contains_key(&source) {
                let target = self.target_for(&source);
                locations.insert(source, target);
            }
        }

        if self.copy_samples {
            self.check_collisions(&locations)?;
            self.copy_all(&locations)?;
        }

        zones
            .into_iter()
            .map(|zone| {
                let source = absolute(zone.sample())?;
                let target = locations.get(&source).cloned().unwrap_or(source);
                Ok(zone.with_sample(relative_path(&self.preset_dir, &target)))
            })
            .collect()
    }

    fn target_for(&self, source: &Path) -> PathBuf {
        match (self.copy_samples, source.file_name()) {
            (true, Some(name)) => self.samples_dir().join(name),
            _ => source.to_path_buf(),
        }
    }

    fn check_collisions(
        &self,
        locations: &BTreeMap<PathBuf, PathBuf>,
    ) -> Result<(), RelocateError> {
        let mut claimed: BTreeMap<&Path, &Path> = BTreeMap::new();
        for (source, target) in locations {
            if let Some(first) = claimed.insert(target.as_path(), source.as_path()) {
                return Err(RelocateError::NameCollision {
                    name: filename_display(target).to_string(),
                    first: first.to_path_buf(),
                    second: source.clone(),
                });
            }
        }
        Ok(())
    }

    fn copy_all(&self, locations: &BTreeMap<PathBuf, PathBuf>) -> Result<(), RelocateError> {
        let samples_dir = self.samples_dir();
        fs::create_dir_all(&samples_dir).map_err(|source| RelocateError::Io {
            path: samples_dir.clone(),
            source,
        })?;

        for (source, target) in locations {
            if source == target {
                debug!(path = ?source, "Sample already in place");
                continue;
            }
            fs::copy(source, target).map_err(|e| RelocateError::Io {
                path: source.clone(),
                source: e,
            })?;
            debug!(from = ?source, to = ?target, "Copied sample");
        }
        info!(
            count = locations.len(),
            dir = ?samples_dir,
            "Copied samples"
        );
        Ok(())
    }
}

/// Makes a path absolute with `.` and `..` resolved, so references compare and
/// relativize correctly.
fn absolute(path: &Path) -> Result<PathBuf, RelocateError> {
    path::absolute(path)
        .map(|path| normalize_path(&path))
        .map_err(|source| RelocateError::Resolve {
            path: path.to_path_buf(),
            source,
        })
}
