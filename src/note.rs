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

//! Note name to MIDI note conversion.

use lazy_static::lazy_static;
use regex::Regex;

/// The MIDI note that the configured middle octave's C maps to.
pub const MIDDLE_C: i32 = 60;

/// The highest valid MIDI note.
pub const MAX_NOTE: u8 = 127;

/// Semitone offsets from C. Flats resolve to the same offset as the
/// enharmonic sharp. Keys are upper-cased letter + accidental.
const SEMITONES: [(&str, i32); 17] = [
    ("C", 0),
    ("C#", 1),
    ("DB", 1),
    ("D", 2),
    ("D#", 3),
    ("EB", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("GB", 6),
    ("G", 7),
    ("G#", 8),
    ("AB", 8),
    ("A", 9),
    ("A#", 10),
    ("BB", 10),
    ("B", 11),
];

lazy_static! {
    static ref NOTE_NAME: Regex = Regex::new(r"^([A-Ga-g])([#bB]?)(-?\d+)$").unwrap();
}

/// Why a note name could not be turned into a MIDI note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    /// The name isn't shaped like letter + accidental + octave.
    Malformed,
    /// The letter/accidental pair isn't in the semitone table (e.g. "E#").
    UnknownPitchClass,
    /// The computed note falls outside 0-127.
    OutOfRange(i32),
}

/// Looks up the semitone offset of a letter and accidental pair.
pub fn semitone(letter: &str, accidental: &str) -> Option<i32> {
    let key = format!("{}{}", letter.to_uppercase(), accidental.to_uppercase());
    SEMITONES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, offset)| *offset)
}

/// Converts a note name such as `C#3` or `Bb-1` to a MIDI note number.
/// `middle_octave` is the octave number whose C is MIDI note 60.
pub fn note_to_midi(name: &str, middle_octave: i32) -> Result<u8, NoteError> {
    let captures = NOTE_NAME.captures(name).ok_or(NoteError::Malformed)?;
    let offset = semitone(&captures[1], &captures[2]).ok_or(NoteError::UnknownPitchClass)?;
    let octave: i32 = captures[3].parse().map_err(|_| NoteError::Malformed)?;

    let note = octave
        .checked_sub(middle_octave)
        .and_then(|delta| delta.checked_mul(12))
        .and_then(|delta| delta.checked_add(MIDDLE_C + offset))
        .ok_or(NoteError::Malformed)?;

    if (0..=MAX_NOTE as i32).contains(&note) {
        Ok(note as u8)
    } else {
        Err(NoteError::OutOfRange(note))
    }
}
