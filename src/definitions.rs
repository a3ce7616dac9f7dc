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

//! The literals defined by a locale header.

use std::collections::BTreeMap;
use std::path::Path;

use crate::diagnostics::Diagnostics;
use crate::literal::fold_literals;
use crate::scan::{scan_calls, ScanOptions};
use crate::{read_source, Error, Result, SourcePosition};

/// The literal bound to a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralDefinition {
    pub position: SourcePosition,
    /// The decoded text, with adjacent literals folded.
    pub text: String,
}

/// Symbol name to literal, for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralDefinitionIndex {
    locale: String,
    definitions: BTreeMap<String, LiteralDefinition>,
}

/// Split `SYMBOL, "literal"` at the first top-level comma.
///
/// Commas nested in parentheses or inside quotes do not count.
/// Returns `None` when there is no such comma.
///
/// # Examples
///
/// ```
/// use msg_hash_i18n::definitions::split_definition;
///
/// assert_eq!(
///     split_definition("\n   MSG_A,\n   \"a, b\"\n   "),
///     Some(("\n   MSG_A", "\n   \"a, b\"\n   "))
/// );
/// assert_eq!(split_definition("MSG_A"), None);
/// ```
pub fn split_definition(arguments: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (idx, ch) in arguments.char_indices() {
        if let Some(delimiter) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == delimiter {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some((&arguments[..idx], &arguments[idx + 1..])),
            _ => {}
        }
    }
    None
}

impl LiteralDefinitionIndex {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: String::from(locale),
            definitions: BTreeMap::new(),
        }
    }

    /// Read and index the headers of `locale`.
    ///
    /// The paths are relative to `root`. Unlike source files, a header
    /// which cannot be read is an error: an index missing a header
    /// would make every key look untranslated.
    pub fn build<P: AsRef<Path>>(
        locale: &str,
        root: &Path,
        paths: &[P],
        token: &str,
        options: ScanOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let mut index = Self::new(locale);
        for path in paths {
            let path = path.as_ref();
            let text = read_source(root.join(path))?;
            index.add_file(path, &text, token, options, diagnostics)?;
        }
        Ok(index)
    }

    /// Add the definitions found in one header.
    ///
    /// Returns [`Error::DuplicateLiteral`] when a symbol is defined a
    /// second time, in this file or in a file added earlier.
    pub fn add_file(
        &mut self,
        path: &Path,
        text: &str,
        token: &str,
        options: ScanOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        for call in scan_calls(path, text, token, options, diagnostics) {
            let position = SourcePosition::new(path, call.line);
            let Some((symbol, literal)) = split_definition(call.arguments()) else {
                diagnostics.warning(position, format!("malformed {token} call: missing literal"));
                continue;
            };
            let symbol = symbol.trim();
            if symbol.is_empty() {
                diagnostics.warning(position, format!("malformed {token} call: missing symbol"));
                continue;
            }
            let text = match fold_literals(literal) {
                Ok(text) => text,
                Err(err) => {
                    diagnostics.warning(position, format!("malformed {token} call: {err}"));
                    continue;
                }
            };

            if let Some(first) = self.definitions.get(symbol) {
                return Err(Error::DuplicateLiteral {
                    symbol: String::from(symbol),
                    file: path.to_path_buf(),
                    line: call.line,
                    first_file: first.position.path.clone(),
                    first_line: first.position.line,
                });
            }
            self.definitions
                .insert(String::from(symbol), LiteralDefinition { position, text });
        }
        Ok(())
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn get(&self, symbol: &str) -> Option<&LiteralDefinition> {
        self.definitions.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.definitions.contains_key(symbol)
    }

    /// Definitions in alphabetical symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LiteralDefinition)> {
        self.definitions
            .iter()
            .map(|(symbol, definition)| (symbol.as_str(), definition))
    }

    /// Definitions in the order they appear in the headers.
    pub fn in_declaration_order(&self) -> Vec<(&str, &LiteralDefinition)> {
        let mut definitions = self.iter().collect::<Vec<_>>();
        definitions.sort_by(|(a_symbol, a), (b_symbol, b)| {
            (&a.position, a_symbol).cmp(&(&b.position, b_symbol))
        });
        definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index_of(text: &str) -> (Result<LiteralDefinitionIndex>, Diagnostics) {
        let mut index = LiteralDefinitionIndex::new("us");
        let mut diagnostics = Diagnostics::new();
        let result = index
            .add_file(
                Path::new("intl/msg_hash_us.h"),
                text,
                "MSG_HASH",
                ScanOptions::default(),
                &mut diagnostics,
            )
            .map(|()| index);
        (result, diagnostics)
    }

    #[track_caller]
    fn assert_literals(text: &str, expected: &[(&str, &str)]) {
        let (index, diagnostics) = index_of(text);
        let index = index.unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(
            index
                .in_declaration_order()
                .into_iter()
                .map(|(symbol, definition)| (symbol, definition.text.as_str()))
                .collect::<Vec<_>>(),
            expected
        );
    }

    #[test]
    fn test_split_definition_nested() {
        assert_eq!(
            split_definition("F(a, b), \"x\""),
            Some(("F(a, b)", " \"x\""))
        );
        assert_eq!(split_definition("A \"no comma\""), None);
    }

    #[test]
    fn test_single_line() {
        assert_literals(
            "MSG_HASH(MSG_QUIT, \"Quit\")\n",
            &[("MSG_QUIT", "Quit")],
        );
    }

    #[test]
    fn test_retroarch_layout() {
        assert_literals(
            r#"#if defined(_MSC_VER) && !defined(_XBOX)
#pragma warning(disable:4566)
#endif

MSG_HASH(
   MENU_ENUM_LABEL_VALUE_QUIT_RETROARCH,
   "Quit"
   )
MSG_HASH(
   MENU_ENUM_LABEL_VALUE_ABOUT,
   "About, and \"more\""
   )
MSG_HASH(MSG_PROGRAM, "RetroArch")
"#,
            &[
                ("MENU_ENUM_LABEL_VALUE_QUIT_RETROARCH", "Quit"),
                ("MENU_ENUM_LABEL_VALUE_ABOUT", "About, and \"more\""),
                ("MSG_PROGRAM", "RetroArch"),
            ],
        );
    }

    #[test]
    fn test_folds_multi_part_literals() {
        assert_literals(
            "MSG_HASH(KEY, \"Hello \" \"World\")",
            &[("KEY", "Hello World")],
        );
        assert_literals(
            "MSG_HASH(\n   KEY,\n   \"First line.\\n\"\n   \"Second line.\"\n   )\n",
            &[("KEY", "First line.\nSecond line.")],
        );
    }

    #[test]
    fn test_declaration_order_is_not_alphabetical() {
        assert_literals(
            "MSG_HASH(ZEBRA, \"z\")\nMSG_HASH(APPLE, \"a\")\n",
            &[("ZEBRA", "z"), ("APPLE", "a")],
        );
    }

    #[test]
    fn test_missing_literal_is_a_warning() {
        let (index, diagnostics) = index_of("MSG_HASH(KEY)\nMSG_HASH(OTHER, \"o\")\n");
        let index = index.unwrap();
        assert!(!index.contains("KEY"));
        assert!(index.contains("OTHER"));
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(
            diagnostics.issues()[0].to_string(),
            "intl/msg_hash_us.h:1: malformed MSG_HASH call: missing literal"
        );
    }

    #[test]
    fn test_non_literal_argument_is_a_warning() {
        let (index, diagnostics) = index_of("MSG_HASH(KEY, some_variable)\n");
        assert!(index.unwrap().is_empty());
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_longer_macro_names_are_skipped() {
        let (index, diagnostics) =
            index_of("MSG_HASH_EXTRA(KEY, \"x\")\nMSG_HASH(KEY, \"y\")\n");
        assert!(diagnostics.is_empty());
        assert_eq!(index.unwrap().get("KEY").unwrap().text, "y");
    }

    #[test]
    fn test_escaped_utf8() {
        assert_literals(
            "MSG_HASH(A, \"caf\\u00e9\")\nMSG_HASH(B, \"caf\\xc3\\xa9\")\n",
            &[("A", "café"), ("B", "café")],
        );
    }

    #[test]
    fn test_invalid_utf8_is_a_warning() {
        let (index, diagnostics) = index_of("MSG_HASH(A, \"caf\\xe9\")\n");
        assert!(index.unwrap().is_empty());
        assert_eq!(
            diagnostics.issues()[0].to_string(),
            "intl/msg_hash_us.h:1: malformed MSG_HASH call: string literal is not valid UTF-8"
        );
    }

    #[test]
    fn test_token_inside_literal() {
        let mut index = LiteralDefinitionIndex::new("us");
        let mut diagnostics = Diagnostics::new();
        index
            .add_file(
                Path::new("intl/msg_hash_us.h"),
                "MSG_HASH(A, \"See MSG_HASH(A, x)\")\n\
                 MSG_HASH(B, \"Use MSG_HASH(B, \\\"b\\\")\")\n",
                "MSG_HASH",
                ScanOptions {
                    skip_string_literals: true,
                },
                &mut diagnostics,
            )
            .unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(index.get("A").unwrap().text, "See MSG_HASH(A, x)");
        assert_eq!(index.get("B").unwrap().text, "Use MSG_HASH(B, \"b\")");
    }

    #[test]
    fn test_duplicate_definition() {
        let (index, _) = index_of(
            "MSG_HASH(KEY, \"a\")\n\
             MSG_HASH(OTHER, \"o\")\n\
             MSG_HASH(KEY, \"b\")\n",
        );
        match index {
            Err(Error::DuplicateLiteral {
                symbol,
                line,
                first_file,
                first_line,
                ..
            }) => {
                assert_eq!(symbol, "KEY");
                assert_eq!(line, 3);
                assert_eq!(first_file, Path::new("intl/msg_hash_us.h"));
                assert_eq!(first_line, 1);
            }
            other => panic!("expected a duplicate literal, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_across_files() {
        let mut index = LiteralDefinitionIndex::new("us");
        let mut diagnostics = Diagnostics::new();
        index
            .add_file(
                Path::new("a.h"),
                "MSG_HASH(KEY, \"a\")",
                "MSG_HASH",
                ScanOptions::default(),
                &mut diagnostics,
            )
            .unwrap();
        let result = index.add_file(
            Path::new("b.h"),
            "\nMSG_HASH(KEY, \"b\")",
            "MSG_HASH",
            ScanOptions::default(),
            &mut diagnostics,
        );
        assert_eq!(
            result.unwrap_err().to_string(),
            "b.h:2: duplicate literal for KEY (first defined at a.h:1)"
        );
    }

    #[test]
    fn test_build_missing_header() {
        let mut diagnostics = Diagnostics::new();
        let result = LiteralDefinitionIndex::build(
            "fr",
            Path::new("/nonexistent"),
            &["intl/msg_hash_fr.h"],
            "MSG_HASH",
            ScanOptions::default(),
            &mut diagnostics,
        );
        assert!(matches!(result, Err(Error::Read { .. })));
    }
}
