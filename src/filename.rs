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

//! Pitch and velocity extraction from sample file names.
//!
//! Two strategies are supported:
//! - Auto-detect, which scans the name for a separator-bounded note token and an
//!   optional `vel`/`v` tag.
//! - A user template (see [`pattern::Pattern`]) that must match the whole file stem.
//!
//! Files whose root can't be resolved are excluded rather than treated as errors, and
//! every exclusion is kept for diagnostics.

pub mod pattern;

use std::fmt;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::note::{self, NoteError};
use crate::util::filename_display;
use crate::zones::SampleEntry;

use self::pattern::Pattern;

/// Lowest velocity accepted from a file name.
pub const MIN_VELOCITY: u32 = 1;

/// Highest velocity accepted from a file name.
pub const MAX_VELOCITY: u32 = 127;

lazy_static! {
    // Underscore counts as a word character, so separators are spelled out instead of \b.
    static ref NOTE_TOKEN: Regex =
        Regex::new(r"(?:^|[^A-Za-z0-9])([A-Ga-g])([#bB]?)(-?\d+)(?:$|[^A-Za-z0-9])").unwrap();
    static ref VELOCITY_TAG: Regex = Regex::new(r"(?i)(?:vel|v)[ _\-]?(\d{1,3})").unwrap();
}

/// The raw result of matching a file name, before any note lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMatch {
    /// Whether the name matched at all.
    pub matched: bool,
    /// The note token, e.g. `C#3`.
    pub note: Option<String>,
    /// The velocity digits, if present.
    pub velocity: Option<u32>,
}

/// Why a file didn't produce a sample entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Auto-detect found no note token.
    NoNoteToken,
    /// The file stem didn't match the template.
    PatternMismatch,
    /// The note token isn't a known pitch class.
    UnknownNote(String),
    /// The note resolved to something outside 0-127.
    OutOfRange(String, i32),
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::NoNoteToken => write!(f, "no note name found"),
            ExclusionReason::PatternMismatch => write!(f, "does not match the pattern"),
            ExclusionReason::UnknownNote(note) => write!(f, "unknown note '{}'", note),
            ExclusionReason::OutOfRange(note, midi) => {
                write!(f, "note '{}' resolves to {}, outside 0-127", note, midi)
            }
        }
    }
}

/// A file that was left out of the instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub path: PathBuf,
    pub reason: ExclusionReason,
}

/// The outcome of parsing a list of files.
#[derive(Debug, Clone, Default)]
pub struct ParsedSamples {
    /// Successfully parsed entries, in input order.
    pub entries: Vec<SampleEntry>,
    /// Files that were skipped, in input order.
    pub excluded: Vec<Exclusion>,
}

impl ParsedSamples {
    /// Number of files skipped.
    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }
}

enum Strategy {
    Auto,
    Template(Pattern),
}

/// Parses file names into sample entries using one strategy for the whole run.
pub struct FilenameParser {
    strategy: Strategy,
    middle_octave: i32,
}

impl FilenameParser {
    /// Creates a parser that scans names for note and velocity tokens.
    pub fn auto(middle_octave: i32) -> FilenameParser {
        FilenameParser {
            strategy: Strategy::Auto,
            middle_octave,
        }
    }

    /// Creates a parser driven by a compiled template.
    pub fn template(pattern: Pattern, middle_octave: i32) -> FilenameParser {
        FilenameParser {
            strategy: Strategy::Template(pattern),
            middle_octave,
        }
    }

    /// Matches a file stem with the configured strategy.
    pub fn match_name(&self, stem: &str) -> NameMatch {
        match &self.strategy {
            Strategy::Auto => auto_detect(stem),
            Strategy::Template(pattern) => pattern.match_stem(stem),
        }
    }

    /// Parses a single file into a sample entry.
    pub fn parse(&self, path: &Path) -> Result<SampleEntry, ExclusionReason> {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name_match = self.match_name(&stem);

        if !name_match.matched {
            return Err(match self.strategy {
                Strategy::Auto => ExclusionReason::NoNoteToken,
                Strategy::Template(_) => ExclusionReason::PatternMismatch,
            });
        }
        let token = name_match.note.ok_or(ExclusionReason::NoNoteToken)?;
        let root = match note::note_to_midi(&token, self.middle_octave) {
            Ok(root) => root,
            Err(NoteError::OutOfRange(midi)) => {
                return Err(ExclusionReason::OutOfRange(token, midi))
            }
            Err(_) => return Err(ExclusionReason::UnknownNote(token)),
        };

        let velocity = name_match.velocity.and_then(valid_velocity);
        Ok(SampleEntry::new(path.to_path_buf(), root, velocity))
    }

    /// Parses every file, keeping input order and recording exclusions.
    pub fn parse_all<P: AsRef<Path>>(&self, paths: &[P]) -> ParsedSamples {
        let mut parsed = ParsedSamples::default();

        for path in paths {
            let path = path.as_ref();
            match self.parse(path) {
                Ok(entry) => {
                    debug!(
                        file = filename_display(path),
                        root = entry.root(),
                        velocity = ?entry.velocity(),
                        "Parsed sample"
                    );
                    parsed.entries.push(entry);
                }
                Err(reason) => {
                    warn!(file = filename_display(path), %reason, "Skipping sample");
                    parsed.excluded.push(Exclusion {
                        path: path.to_path_buf(),
                        reason,
                    });
                }
            }
        }

        parsed
    }
}

/// Scans a name for the first separator-bounded note token and a velocity tag.
pub fn auto_detect(name: &str) -> NameMatch {
    let note = NOTE_TOKEN
        .captures(name)
        .map(|captures| format!("{}{}{}", &captures[1], &captures[2], &captures[3]));
    let velocity = VELOCITY_TAG
        .captures(name)
        .and_then(|captures| captures[1].parse::<u32>().ok());

    NameMatch {
        matched: note.is_some(),
        note,
        velocity,
    }
}

/// Out of range velocities are treated as absent.
fn valid_velocity(velocity: u32) -> Option<u8> {
    if (MIN_VELOCITY..=MAX_VELOCITY).contains(&velocity) {
        Some(velocity as u8)
    } else {
        None
    }
}
