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

use std::path::{Component, Path, PathBuf};

/// Extracts a displayable file name from a path, returning a fallback if the name is unreadable.
pub fn filename_display(path: &Path) -> &str {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("unreadable file name")
}

/// Expresses `target` relative to the directory `base`. Both paths should be absolute.
/// If they share no common root (e.g. different drives), `target` is returned as is.
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base: Vec<Component> = base.components().collect();
    let target_components: Vec<Component> = target.components().collect();

    let common = base
        .iter()
        .zip(target_components.iter())
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return target.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target_components[common..] {
        relative.push(component.as_os_str());
    }
    relative
}

/// Resolves `.` and `..` components without touching the filesystem. A `..` that would
/// climb above the root is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Renders a path with forward slashes regardless of platform.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use crate::util::{filename_display, normalize_path, relative_path, slash_path};

    #[test]
    fn test_filename_display() {
        assert_eq!("C3.wav", filename_display(Path::new("/samples/piano/C3.wav")));
        assert_eq!("unreadable file name", filename_display(Path::new("/")));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            PathBuf::from("C3.wav"),
            relative_path(Path::new("/a/b"), Path::new("/a/b/C3.wav"))
        );
        assert_eq!(
            PathBuf::from("Samples/C3.wav"),
            relative_path(Path::new("/a/b"), Path::new("/a/b/Samples/C3.wav"))
        );
        assert_eq!(
            PathBuf::from("../../x/C3.wav"),
            relative_path(Path::new("/a/b/c"), Path::new("/a/x/C3.wav"))
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            PathBuf::from("/tmp/out"),
            normalize_path(Path::new("/tmp/work/../out"))
        );
        assert_eq!(
            PathBuf::from("/tmp/work/C3.wav"),
            normalize_path(Path::new("/tmp/./work/samples/../C3.wav"))
        );
        assert_eq!(PathBuf::from("/"), normalize_path(Path::new("/../..")));
        assert_eq!(PathBuf::from("../x"), normalize_path(Path::new("a/../../x")));
    }

    #[test]
    fn test_slash_path() {
        let path: PathBuf = ["..", "Samples", "C3.wav"].iter().collect();
        assert_eq!("../Samples/C3.wav", slash_path(&path));
    }
}
