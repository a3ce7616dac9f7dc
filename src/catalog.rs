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

//! Move entries in and out of GNU Gettext PO catalogs.
//!
//! Each symbol becomes one message: the symbol is the `msgctxt`, the
//! original-language literal is the `msgid` and the translation is
//! the `msgstr`. The lookup sites are stored as `#:` references.

use std::fs;
use std::path::Path;

use polib::catalog::Catalog;
use polib::message::{Message, MessageFlags, MessageView};
use polib::metadata::CatalogMetadata;
use polib::po_file;

use crate::diagnostics::Diagnostics;
use crate::{wrap_sources, Error, Result, SourcePosition};

/// One symbol with its literals, as stored in a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    pub symbol: String,
    /// The original-language literal.
    pub source: String,
    /// The translated literal, empty when untranslated.
    pub translation: String,
    pub occurrences: Vec<SourcePosition>,
    /// The translation needs review.
    pub fuzzy: bool,
    pub comment: String,
}

impl CatalogEntry {
    /// Whether the source literal is a `printf` format string.
    ///
    /// This is a heuristic: any `%` counts.
    pub fn is_c_format(&self) -> bool {
        self.source.contains('%')
    }
}

/// A confirmed translation read back from a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub symbol: String,
    pub text: String,
}

impl Translation {
    pub fn new<S: Into<String>, T: Into<String>>(symbol: S, text: T) -> Self {
        Self {
            symbol: symbol.into(),
            text: text.into(),
        }
    }
}

/// Build the catalog header.
pub fn generate_catalog_metadata(project: &str, language: &str) -> CatalogMetadata {
    let mut metadata = CatalogMetadata::new();
    metadata.project_id_version = String::from(project);
    metadata.language = String::from(language);
    let now = chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    metadata.pot_creation_date = now.clone();
    metadata.po_revision_date = now;
    metadata.mime_version = String::from("1.0");
    metadata.content_type = String::from("text/plain; charset=UTF-8");
    metadata.content_transfer_encoding = String::from("8bit");
    metadata
}

/// Format lookup sites as `path:line` references.
fn build_sources(occurrences: &[SourcePosition]) -> String {
    let mut lines = occurrences
        .iter()
        .map(SourcePosition::to_string)
        .collect::<Vec<_>>();
    lines.dedup();
    wrap_sources(&lines.join("\n"))
}

/// Parse `path:line` references. References without a line number
/// are dropped.
fn parse_sources(sources: &str) -> Vec<SourcePosition> {
    sources
        .split_whitespace()
        .filter_map(|source| {
            let (path, lineno) = source.rsplit_once(':')?;
            Some(SourcePosition::new(path, lineno.parse().ok()?))
        })
        .collect()
}

fn build_message(entry: &CatalogEntry) -> Message {
    let mut flags = MessageFlags::new();
    if entry.is_c_format() {
        flags.add_flag("c-format");
    }
    if entry.fuzzy {
        flags.add_flag("fuzzy");
    }
    Message::build_singular()
        .with_msgctxt(entry.symbol.clone())
        .with_msgid(entry.source.clone())
        .with_msgstr(entry.translation.clone())
        .with_source(build_sources(&entry.occurrences))
        .with_comments(entry.comment.clone())
        .with_flags(flags)
        .done()
}

/// Create a catalog holding `entries` in the given order.
pub fn create_catalog(metadata: CatalogMetadata, entries: &[CatalogEntry]) -> Catalog {
    let mut catalog = Catalog::new(metadata);
    for entry in entries {
        catalog.append_or_update(build_message(entry));
    }
    catalog
}

/// Convert every message with a context back into an entry.
pub fn catalog_entries(catalog: &Catalog) -> Vec<CatalogEntry> {
    catalog
        .messages()
        .filter(|message| !message.msgctxt().is_empty())
        .map(|message| CatalogEntry {
            symbol: String::from(message.msgctxt()),
            source: String::from(message.msgid()),
            translation: String::from(message.msgstr().unwrap_or_default()),
            occurrences: parse_sources(message.source()),
            fuzzy: message.is_fuzzy(),
            comment: String::from(message.comments()),
        })
        .collect()
}

/// The confirmed translations of `catalog`, in file order.
///
/// Untranslated and fuzzy messages are left out so a generated header
/// only ever holds reviewed text. Messages without a context cannot
/// be tied to a symbol; they are reported against `path`.
pub fn read_translations(
    catalog: &Catalog,
    path: &Path,
    diagnostics: &mut Diagnostics,
) -> Vec<Translation> {
    let mut translations = Vec::new();
    for message in catalog.messages() {
        if message.msgctxt().is_empty() {
            diagnostics.file_warning(
                path,
                format!("message {:?} has no msgctxt, skipping it", message.msgid()),
            );
            continue;
        }
        if !message.is_translated() || message.is_fuzzy() {
            continue;
        }
        let msgstr = message.msgstr().unwrap_or_default();
        if msgstr.is_empty() {
            continue;
        }
        translations.push(Translation::new(message.msgctxt(), msgstr));
    }
    translations
}

/// Parse the PO file at `path`.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        return Err(Error::MissingCatalog {
            path: path.to_path_buf(),
        });
    }
    po_file::parse(path).map_err(|err| Error::CatalogParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Write `catalog` to `path`, creating the directory as needed.
pub fn save_catalog(catalog: &Catalog, path: &Path) -> Result<()> {
    let write_error = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    po_file::write(catalog, path).map_err(write_error)
}
