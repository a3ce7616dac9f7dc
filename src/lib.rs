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

//! Helpers for translating C code bases which use `MSG_HASH` headers.
//!
//! The application looks up every user visible string with a call
//! like `msg_hash_to_str(MENU_ENUM_LABEL_VALUE_QUIT)`. The English
//! text lives in a header full of
//!
//! ```c
//! MSG_HASH(
//!    MENU_ENUM_LABEL_VALUE_QUIT,
//!    "Quit"
//!    )
//! ```
//!
//! blocks, and every other language has a header of the same shape.
//! The functions here find the lookups and the definitions in the
//! un-preprocessed C text, reconcile them, and move the literals in
//! and out of GNU Gettext PO files so the translations can be
//! maintained with standard tooling.

use std::fmt;
use std::path::{Path, PathBuf};

pub mod catalog;
pub mod config;
pub mod definitions;
pub mod diagnostics;
pub mod error;
pub mod files;
pub mod header;
pub mod literal;
pub mod reconcile;
pub mod scan;
pub mod usage;

pub use error::{Error, Result};

/// A line in a source file.
///
/// Line numbers are 1-based. The position of a multi-line call is
/// the line where its token starts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePosition {
    pub path: PathBuf,
    pub line: usize,
}

impl SourcePosition {
    pub fn new<P: Into<PathBuf>>(path: P, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// Read a text file, dropping a leading UTF-8 byte-order mark.
///
/// Some locale headers are stored with a BOM. It is not part of the
/// C text and would otherwise end up glued to the first token.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => String::from(stripped),
        None => text,
    })
}

/// Wrap `#:` source references so they fit on a PO line.
///
/// The references are separated by newlines or spaces on input. They
/// are packed greedily onto lines of at most 76 characters, which is
/// what `msgmerge` does. A single reference is never split.
///
/// # Examples
///
/// ```
/// use msg_hash_i18n::wrap_sources;
///
/// assert_eq!(wrap_sources("menu.c:10\nmenu.c:20"), "menu.c:10 menu.c:20");
/// ```
pub fn wrap_sources(sources: &str) -> String {
    let joined = sources.split_whitespace().collect::<Vec<_>>().join(" ");
    let options = textwrap::Options::new(76).break_words(false);
    textwrap::wrap(&joined, options).join("\n")
}
