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

//! Finds the sample files an instrument is built from.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Where the samples come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSource {
    /// Every audio file under a folder, recursively, sorted by full path string.
    Folder(PathBuf),
    /// An explicit list of files, kept in the given order.
    Files(Vec<PathBuf>),
}

/// Resolves sample sources into an ordered file list.
pub struct Locator {
    extensions: Vec<String>,
}

impl Locator {
    /// Creates a locator that accepts files with the given extensions (case-insensitive,
    /// without the dot).
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Locator {
        Locator {
            extensions: extensions
                .iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether the path has one of the accepted extensions.
    pub fn is_audio(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Lists the files for a source. Explicit files are taken as given, without any
    /// extension filtering.
    pub fn locate(&self, source: &SampleSource) -> io::Result<Vec<PathBuf>> {
        match source {
            SampleSource::Folder(folder) => {
                let mut files = Vec::new();
                self.walk(folder, &mut files)?;
                // Whole path string order, so `a-b/` comes before `a/`.
                files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
                info!(folder = ?folder, count = files.len(), "Found samples");
                Ok(files)
            }
            SampleSource::Files(files) => Ok(files.clone()),
        }
    }

    /// Symlinked folders are not descended into. Symlinked files are kept.
    fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                self.walk(&path, files)?;
            } else if file_type.is_symlink() && path.is_dir() {
                debug!(path = ?path, "Not following folder symlink");
            } else if self.is_audio(&path) {
                files.push(path);
            } else {
                debug!(path = ?path, "Ignoring non-audio file");
            }
        }
        Ok(())
    }
}
