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

//! The end to end flow: locate samples, parse their names, map them onto the
//! keyboard, and write the preset.

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Settings;
use crate::filename::pattern::PatternError;
use crate::filename::{FilenameParser, ParsedSamples};
use crate::locate::{Locator, SampleSource};
use crate::preset::{self, PresetError};
use crate::relocate::{RelocateError, Relocator};
use crate::zones::{self, Zone, ZoneError};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("no sample files found")]
    NoSamples,

    #[error("unable to list samples: {0}")]
    Locate(#[from] io::Error),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Zones(#[from] ZoneError),

    #[error(transparent)]
    Relocate(#[from] RelocateError),

    #[error(transparent)]
    Preset(#[from] PresetError),
}

/// Everything worked out before anything is written.
#[derive(Debug, Clone)]
pub struct Plan {
    /// The files that were considered, in encounter order.
    pub files: Vec<PathBuf>,
    /// The parse results, including skipped files.
    pub parsed: ParsedSamples,
    /// The assembled zones, with references still pointing at the source files.
    pub zones: Vec<Zone>,
}

/// Builds instruments from sample files with one set of settings.
pub struct Generator {
    settings: Settings,
    locator: Locator,
    parser: FilenameParser,
}

impl Generator {
    /// Creates a generator. Fails if the file name template doesn't compile.
    pub fn new(settings: Settings) -> Result<Generator, GenerateError> {
        let parser = settings.filename_parser()?;
        let locator = Locator::new(settings.audio_extensions.as_slice());
        Ok(Generator {
            settings,
            locator,
            parser,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Locates, parses and assembles without touching the filesystem beyond listing.
    pub fn plan(&self, source: &SampleSource) -> Result<Plan, GenerateError> {
        let files = self.locator.locate(source)?;
        if files.is_empty() {
            return Err(GenerateError::NoSamples);
        }

        let parsed = self.parser.parse_all(files.as_slice());
        info!(
            files = files.len(),
            parsed = parsed.entries.len(),
            excluded = parsed.excluded_count(),
            "Parsed sample names"
        );

        let zones = zones::assemble(&parsed.entries, &self.settings.zone_options())?;
        Ok(Plan {
            files,
            parsed,
            zones,
        })
    }

    /// Generates the preset and returns where it was written.
    pub fn generate(
        &self,
        source: &SampleSource,
        output: Option<&Path>,
    ) -> Result<PathBuf, GenerateError> {
        let plan = self.plan(source)?;
        let (preset_path, zones) = self.place(plan, output)?;
        preset::write(&zones, &preset_path)?;
        Ok(preset_path)
    }

    /// Resolves the preset path and relocates the zone references to it.
    fn place(
        &self,
        plan: Plan,
        output: Option<&Path>,
    ) -> Result<(PathBuf, Vec<Zone>), GenerateError> {
        // The plan always has at least one file here.
        let first = plan.files.first().ok_or(GenerateError::NoSamples)?;
        let preset_path = preset::output_path(output, first)?;
        let preset_dir = preset_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let relocator = Relocator::new(preset_dir, self.settings.copy_samples)?;
        let zones = relocator.relocate(plan.zones)?;
        Ok((preset_path, zones))
    }
}
