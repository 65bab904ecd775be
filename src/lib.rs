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

//! Builds sampler instrument presets from folders of multisampled audio files.
//!
//! Each file's root note (and optional velocity layer) is read from its name, then the
//! keyboard and velocity range are split into non-overlapping zones, each served by the
//! nearest sample.

pub mod config;
pub mod filename;
pub mod generator;
pub mod locate;
pub mod note;
pub mod preset;
pub mod relocate;
pub mod util;
pub mod zones;
