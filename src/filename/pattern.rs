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

//! Compiles user filename templates such as `Piano_{note}_{vel}` into a
//! reusable whole-string matcher.

use regex::Regex;

use super::NameMatch;

/// Placeholder that captures a note name.
pub const NOTE_PLACEHOLDER: &str = "{note}";

/// Placeholder that captures a velocity value.
pub const VELOCITY_PLACEHOLDER: &str = "{vel}";

const NOTE_GROUP: &str = "note";
const VELOCITY_GROUP: &str = "vel";

/// Errors raised while compiling a template.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("pattern '{0}' has no {{note}} placeholder")]
    MissingNote(String),

    #[error("pattern '{pattern}' uses {placeholder} more than once")]
    RepeatedPlaceholder {
        pattern: String,
        placeholder: &'static str,
    },

    #[error("pattern '{0}' could not be compiled: {1}")]
    Regex(String, #[source] regex::Error),
}

/// One piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Note,
    Velocity,
}

impl Segment {
    fn to_regex(&self) -> String {
        match self {
            Segment::Literal(text) => regex::escape(text),
            Segment::Note => format!(r"(?P<{}>[A-Ga-g][#bB]?-?\d+)", NOTE_GROUP),
            Segment::Velocity => format!(r"(?P<{}>\d+)", VELOCITY_GROUP),
        }
    }
}

/// A compiled filename template.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
    regex: Regex,
}

impl Pattern {
    /// Compiles the template. Everything outside the placeholders is matched literally,
    /// and the whole file stem must match.
    pub fn compile(template: &str) -> Result<Pattern, PatternError> {
        let segments = split(template);

        for (segment, placeholder) in [
            (Segment::Note, NOTE_PLACEHOLDER),
            (Segment::Velocity, VELOCITY_PLACEHOLDER),
        ] {
            if segments.iter().filter(|s| **s == segment).count() > 1 {
                return Err(PatternError::RepeatedPlaceholder {
                    pattern: template.to_string(),
                    placeholder,
                });
            }
        }
        if !segments.contains(&Segment::Note) {
            return Err(PatternError::MissingNote(template.to_string()));
        }

        let body: String = segments.iter().map(Segment::to_regex).collect();
        let regex = Regex::new(&format!("^{}$", body))
            .map_err(|e| PatternError::Regex(template.to_string(), e))?;

        Ok(Pattern {
            source: template.to_string(),
            segments,
            regex,
        })
    }

    /// The template this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The ordered segments of the template.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Matches a file stem against the pattern.
    pub fn match_stem(&self, stem: &str) -> NameMatch {
        match self.regex.captures(stem) {
            Some(captures) => NameMatch {
                matched: true,
                note: captures.name(NOTE_GROUP).map(|m| m.as_str().to_string()),
                velocity: captures
                    .name(VELOCITY_GROUP)
                    .and_then(|m| m.as_str().parse::<u32>().ok()),
            },
            None => NameMatch::default(),
        }
    }
}

/// Splits a template into literal runs and placeholders, in order.
fn split(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = template;

    loop {
        let next = [
            (rest.find(NOTE_PLACEHOLDER), NOTE_PLACEHOLDER, Segment::Note),
            (
                rest.find(VELOCITY_PLACEHOLDER),
                VELOCITY_PLACEHOLDER,
                Segment::Velocity,
            ),
        ]
        .into_iter()
        .filter_map(|(pos, text, segment)| pos.map(|pos| (pos, text, segment)))
        .min_by_key(|(pos, _, _)| *pos);

        match next {
            Some((pos, text, segment)) => {
                if pos > 0 {
                    segments.push(Segment::Literal(rest[..pos].to_string()));
                }
                segments.push(segment);
                rest = &rest[pos + text.len()..];
            }
            None => {
                if !rest.is_empty() {
                    segments.push(Segment::Literal(rest.to_string()));
                }
                return segments;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_segments() {
        let pattern = Pattern::compile("Piano {note} v{vel}.final").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("Piano ".to_string()),
                Segment::Note,
                Segment::Literal(" v".to_string()),
                Segment::Velocity,
                Segment::Literal(".final".to_string()),
            ]
        );
        assert_eq!(pattern.source(), "Piano {note} v{vel}.final");
    }

    #[test]
    fn test_match_note_and_velocity() {
        let pattern = Pattern::compile("Piano_{note}_{vel}").unwrap();

        let m = pattern.match_stem("Piano_C#3_100");
        assert!(m.matched);
        assert_eq!(m.note.as_deref(), Some("C#3"));
        assert_eq!(m.velocity, Some(100));
    }

    #[test]
    fn test_literals_are_not_regex() {
        let pattern = Pattern::compile("a.b_{note}").unwrap();
        assert!(pattern.match_stem("a.b_C3").matched);
        assert!(!pattern.match_stem("axb_C3").matched);
    }

    #[test]
    fn test_whole_string_match() {
        let pattern = Pattern::compile("{note}").unwrap();
        assert!(pattern.match_stem("C3").matched);
        assert!(!pattern.match_stem("Piano_C3").matched);
        assert!(!pattern.match_stem("C3_extra").matched);
    }

    #[test]
    fn test_note_only_has_no_velocity() {
        let pattern = Pattern::compile("Bass-{note}").unwrap();
        let m = pattern.match_stem("Bass-Eb1");
        assert!(m.matched);
        assert_eq!(m.note.as_deref(), Some("Eb1"));
        assert_eq!(m.velocity, None);
    }

    #[test]
    fn test_no_match() {
        let pattern = Pattern::compile("Piano_{note}_{vel}").unwrap();
        assert_eq!(pattern.match_stem("Guitar_C3_100"), NameMatch::default());
    }

    #[test]
    fn test_invalid_templates() {
        assert!(matches!(
            Pattern::compile("Piano_{vel}"),
            Err(PatternError::MissingNote(_))
        ));
        assert!(matches!(
            Pattern::compile("{note}_{note}"),
            Err(PatternError::RepeatedPlaceholder {
                placeholder: NOTE_PLACEHOLDER,
                ..
            })
        ));
        assert!(matches!(
            Pattern::compile("{note}_{vel}_{vel}"),
            Err(PatternError::RepeatedPlaceholder {
                placeholder: VELOCITY_PLACEHOLDER,
                ..
            })
        ));
    }
}
