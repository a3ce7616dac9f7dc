// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Candidate source files.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::{Error, Result};

/// Find the files under `root` with the given extension.
///
/// Directories named in `exclude_dirs` are skipped when they sit
/// directly under `root`; deeper directories with the same name are
/// scanned. The paths are relative to `root` and sorted by name
/// within each directory, so two runs over the same tree agree.
pub fn find_sources(root: &Path, extension: &str, exclude_dirs: &[String]) -> Result<Vec<PathBuf>> {
    let is_excluded = |entry: &DirEntry| {
        entry.depth() == 1
            && entry.file_type().is_dir()
            && exclude_dirs
                .iter()
                .any(|dir| entry.file_name() == dir.as_str())
    };

    let mut sources = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry))
    {
        let entry = entry.map_err(|source| Error::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension() != Some(extension.as_ref()) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        sources.push(relative.to_path_buf());
    }
    Ok(sources)
}
