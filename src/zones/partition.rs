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

//! Key and velocity range partitioning.

use std::fmt;

use crate::note::MAX_NOTE;

/// Highest MIDI velocity.
pub const MAX_VELOCITY: u8 = 127;

/// An inclusive range of MIDI keys or velocities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub low: u8,
    pub high: u8,
}

impl Span {
    pub fn new(low: u8, high: u8) -> Span {
        Span { low, high }
    }

    /// The full 0-127 range.
    pub fn full() -> Span {
        Span::new(0, MAX_NOTE)
    }

    pub fn contains(&self, value: u8) -> bool {
        self.low <= value && value <= self.high
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.low <= other.high && other.low <= self.high
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// How far the lowest and highest roots may reach past themselves. `None` extends
/// the edge root to the end of the keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spread {
    pub low: Option<u8>,
    pub high: Option<u8>,
}

impl Spread {
    pub fn new(low: Option<u8>, high: Option<u8>) -> Spread {
        Spread { low, high }
    }

    /// No bounds: the edge roots cover the whole keyboard.
    pub fn unbounded() -> Spread {
        Spread::default()
    }
}

/// Splits the keyboard between sorted, distinct roots. Every key goes to its nearest root,
/// with keys exactly between two roots going to the lower one. Returns one span per root
/// in the same order.
pub fn key_ranges(roots: &[u8], spread: Spread) -> Vec<Span> {
    let last = roots.len().saturating_sub(1);

    roots
        .iter()
        .enumerate()
        .map(|(i, &root)| {
            let low = if i == 0 {
                match spread.low {
                    Some(low_spread) => root.saturating_sub(low_spread),
                    None => 0,
                }
            } else {
                midpoint(roots[i - 1], root) + 1
            };

            let high = if i == last {
                match spread.high {
                    Some(high_spread) => root.saturating_add(high_spread).min(MAX_NOTE),
                    None => MAX_NOTE,
                }
            } else {
                midpoint(root, roots[i + 1])
            };

            Span::new(low, high)
        })
        .collect()
}

/// Splits 0-127 between sorted, distinct velocity layer tops. Each layer starts just above
/// the previous one, and the top layer always reaches 127.
pub fn velocity_ranges(velocities: &[u8]) -> Vec<Span> {
    let mut ranges: Vec<Span> = Vec::with_capacity(velocities.len());
    let mut low = 0;

    for &velocity in velocities {
        ranges.push(Span::new(low, velocity));
        low = velocity.saturating_add(1);
    }
    if let Some(top) = ranges.last_mut() {
        top.high = MAX_VELOCITY;
    }

    ranges
}

fn midpoint(a: u8, b: u8) -> u8 {
    ((a as u16 + b as u16) / 2) as u8
}
