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

//! TAL Sampler preset (`.talsmpl`) encoding.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tracing::info;

use crate::util::slash_path;
use crate::zones::Zone;

/// The preset file extension.
pub const PRESET_EXTENSION: &str = "talsmpl";

/// File name used when only a folder (or nothing) is given for the output.
pub const DEFAULT_PRESET_NAME: &str = "instrument.talsmpl";

/// The preset format version written into the header.
pub const FORMAT_VERSION: &str = "11";

/// Program name written into the header.
pub const PROGRAM_NAME: &str = "auto";

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("unable to write preset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Works out where the preset goes. With no output, it lands next to the first sample. An
/// output ending in `.talsmpl` is used as is; anything else is a folder that is created
/// and gets the default preset name.
pub fn output_path(output: Option<&Path>, first_sample: &Path) -> Result<PathBuf, PresetError> {
    match output {
        None => {
            let dir = first_sample.parent().unwrap_or(Path::new(""));
            Ok(dir.join(DEFAULT_PRESET_NAME))
        }
        Some(path) if is_preset_file(path) => Ok(path.to_path_buf()),
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|source| PresetError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            Ok(dir.join(DEFAULT_PRESET_NAME))
        }
    }
}

fn is_preset_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(PRESET_EXTENSION))
}

/// Writes the zones as a TAL Sampler preset document.
pub fn encode<W: Write>(zones: &[Zone], out: W) -> io::Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("tal").with_attributes([("curprogram", "0"), ("version", FORMAT_VERSION)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("programs")))?;
    writer.write_event(Event::Start(
        BytesStart::new("program").with_attributes([("programname", PROGRAM_NAME)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("samplelayer0")))?;
    writer.write_event(Event::Start(BytesStart::new("multisamples")))?;

    for zone in zones {
        let url = slash_path(zone.sample());
        let root = zone.root().to_string();
        let keys = zone.keys();
        let velocities = zone.velocities();
        let (low_key, high_key) = (keys.low.to_string(), keys.high.to_string());
        let (low_velocity, high_velocity) =
            (velocities.low.to_string(), velocities.high.to_string());

        writer.write_event(Event::Empty(BytesStart::new("multisample").with_attributes([
            ("url", url.as_str()),
            ("urlRelativeToPresetDirectory", url.as_str()),
            ("rootkey", root.as_str()),
            ("lowkey", low_key.as_str()),
            ("highkey", high_key.as_str()),
            ("velocitystart", low_velocity.as_str()),
            ("velocityend", high_velocity.as_str()),
        ])))?;
    }

    for name in ["multisamples", "samplelayer0", "program", "programs", "tal"] {
        writer.write_event(Event::End(BytesEnd::new(name)))?;
    }
    writer.into_inner().write_all(b"\n")
}

/// Encodes the zones and writes them to `path`, creating parent folders as needed.
pub fn write(zones: &[Zone], path: &Path) -> Result<(), PresetError> {
    let io_error = |source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut buffer = Vec::new();
    encode(zones, &mut buffer).map_err(io_error)?;
    fs::write(path, buffer).map_err(io_error)?;

    info!(path = ?path, zones = zones.len(), "Wrote preset");
    Ok(())
}
