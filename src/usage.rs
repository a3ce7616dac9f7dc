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

//! Where the application looks up each symbol.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use crate::diagnostics::Diagnostics;
use crate::scan::{scan_calls, ScanOptions};
use crate::{read_source, Result, SourcePosition};

/// Upper-case letters, digits and underscores, with at least one
/// letter.
pub const DEFAULT_SYMBOL_PATTERN: &str = "^[A-Z0-9_]*[A-Z][A-Z0-9_]*$";

/// Decides which lookup arguments are translation symbols.
///
/// Lookups are also made with computed arguments like
/// `msg_hash_to_str(idx)` or `msg_hash_to_str(MSG_A + i)`. These
/// must not end up in the index.
#[derive(Debug, Clone)]
pub struct SymbolFilter {
    pattern: Regex,
}

impl SymbolFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn accepts(&self, candidate: &str) -> bool {
        self.pattern.is_match(candidate)
    }
}

/// Symbol name to lookup sites.
///
/// The sites of a symbol are kept in scan order: file order first,
/// then line order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolUsageIndex {
    symbols: BTreeMap<String, Vec<SourcePosition>>,
}

impl SymbolUsageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every file in `paths`, in order.
    ///
    /// The paths are relative to `root` and are recorded as given.
    /// Files which cannot be read are recorded in `diagnostics` and
    /// skipped.
    pub fn build<P: AsRef<Path>>(
        root: &Path,
        paths: &[P],
        token: &str,
        filter: &SymbolFilter,
        options: ScanOptions,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut index = Self::new();
        for path in paths {
            let path = path.as_ref();
            match read_source(root.join(path)) {
                Ok(text) => index.add_file(path, &text, token, filter, options, diagnostics),
                Err(err) => diagnostics.file_error(path, err.to_string()),
            }
        }
        index
    }

    /// Add the lookups found in one file.
    pub fn add_file(
        &mut self,
        path: &Path,
        text: &str,
        token: &str,
        filter: &SymbolFilter,
        options: ScanOptions,
        diagnostics: &mut Diagnostics,
    ) {
        for call in scan_calls(path, text, token, options, diagnostics) {
            let symbol = call
                .arguments()
                .trim_matches(|ch: char| ch.is_whitespace() || ch == '(' || ch == ')');
            if filter.accepts(symbol) {
                self.symbols
                    .entry(String::from(symbol))
                    .or_default()
                    .push(SourcePosition::new(path, call.line));
            }
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&[SourcePosition]> {
        self.symbols.get(symbol).map(Vec::as_slice)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    /// Symbols in alphabetical order with their sites.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SourcePosition])> {
        self.symbols
            .iter()
            .map(|(symbol, positions)| (symbol.as_str(), positions.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn default_filter() -> SymbolFilter {
        SymbolFilter::new(DEFAULT_SYMBOL_PATTERN).unwrap()
    }

    fn index_of(files: &[(&str, &str)]) -> (SymbolUsageIndex, Diagnostics) {
        let mut index = SymbolUsageIndex::new();
        let mut diagnostics = Diagnostics::new();
        for (path, text) in files {
            index.add_file(
                Path::new(path),
                text,
                "msg_hash_to_str",
                &default_filter(),
                ScanOptions::default(),
                &mut diagnostics,
            );
        }
        (index, diagnostics)
    }

    #[test]
    fn test_default_filter() {
        let filter = default_filter();
        assert!(filter.accepts("MSG_QUIT"));
        assert!(filter.accepts("MENU_ENUM_LABEL_VALUE_4_3"));
        assert!(!filter.accepts(""));
        assert!(!filter.accepts("_123"));
        assert!(!filter.accepts("idx"));
        assert!(!filter.accepts("MSG_A + i"));
        assert!(!filter.accepts("(enum msg_hash_enums)type"));
    }

    #[test]
    fn test_prefix_filter() -> anyhow::Result<()> {
        let filter = SymbolFilter::new("^MENU_ENUM_LABEL_VALUE_[A-Z0-9_]+$")?;
        assert!(filter.accepts("MENU_ENUM_LABEL_VALUE_QUIT"));
        assert!(!filter.accepts("MSG_QUIT"));
        Ok(())
    }

    #[test]
    fn test_index_orders_sites_by_scan() {
        let (index, diagnostics) = index_of(&[
            (
                "menu.c",
                "msg_hash_to_str(MSG_B);\n\
                 msg_hash_to_str( (MSG_A) );\n\
                 msg_hash_to_str(idx);\n",
            ),
            ("retroarch.c", "x = msg_hash_to_str(\n      MSG_A);\n"),
        ]);
        assert!(diagnostics.is_empty());
        assert_eq!(
            index.iter().collect::<Vec<_>>(),
            vec![
                (
                    "MSG_A",
                    &[
                        SourcePosition::new("menu.c", 2),
                        SourcePosition::new("retroarch.c", 1),
                    ][..]
                ),
                ("MSG_B", &[SourcePosition::new("menu.c", 1)][..]),
            ]
        );
    }

    #[test]
    fn test_index_keeps_duplicate_sites() {
        let (index, _) = index_of(&[(
            "menu.c",
            "f(msg_hash_to_str(MSG_A), msg_hash_to_str(MSG_A));",
        )]);
        assert_eq!(index.get("MSG_A").map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_index_continues_after_broken_file() {
        let (index, diagnostics) = index_of(&[
            ("broken.c", "msg_hash_to_str(MSG_A;\nmsg_hash_to_str(MSG_B);\n"),
            ("fine.c", "msg_hash_to_str(MSG_C);\n"),
        ]);
        assert_eq!(diagnostics.error_count(), 1);
        assert!(!index.contains("MSG_A"));
        assert!(!index.contains("MSG_B"));
        assert!(index.contains("MSG_C"));
    }

    #[test]
    fn test_build_reads_files() -> anyhow::Result<()> {
        let tmpdir = tempfile::tempdir()?;
        std::fs::create_dir(tmpdir.path().join("menu"))?;
        std::fs::write(
            tmpdir.path().join("menu/menu.c"),
            "msg_hash_to_str(MSG_QUIT);\n",
        )?;

        let mut diagnostics = Diagnostics::new();
        let index = SymbolUsageIndex::build(
            tmpdir.path(),
            &["menu/menu.c", "missing.c"],
            "msg_hash_to_str",
            &default_filter(),
            ScanOptions::default(),
            &mut diagnostics,
        );
        assert_eq!(
            index.get("MSG_QUIT"),
            Some(&[SourcePosition::new("menu/menu.c", 1)][..])
        );
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.issues()[0].path, Path::new("missing.c"));
        Ok(())
    }
}
