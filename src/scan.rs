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

//! Find call-like constructs in un-preprocessed C text.
//!
//! This is not a C parser. We look for a fixed token with a plain
//! substring search and then match parentheses to find the argument
//! list which follows it. Calls can span any number of lines.

use std::path::Path;
use std::str::Chars;

use crate::diagnostics::Diagnostics;
use crate::SourcePosition;

/// Knobs for the parenthesis matcher.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Ignore parentheses inside `"..."` and `'...'` spans.
    ///
    /// When unset, every parenthesis counts, even in a string
    /// argument like `"Quit :)"`. When set, the spans of calls are
    /// reliable and occurrences inside the arguments of a previous
    /// call are not extracted again.
    pub skip_string_literals: bool,
}

/// Outcome of matching the parentheses after one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The call, from the opening parenthesis through the matching
    /// closing parenthesis. Line breaks inside the call are kept as
    /// `\n`.
    Call(String),
    /// The token is the prefix of a longer identifier.
    Skip,
    /// The occurrence is not followed by an argument list.
    Warning(String),
    /// The end of the file was reached while scanning. Nothing after
    /// this point in the file can be trusted.
    Fatal(String),
}

impl Extraction {
    /// The text between the outer parentheses of a [`Extraction::Call`].
    pub fn arguments(&self) -> Option<&str> {
        match self {
            Extraction::Call(call) => call_arguments(call),
            _ => None,
        }
    }
}

fn call_arguments(call: &str) -> Option<&str> {
    call.strip_prefix('(')?.strip_suffix(')')
}

/// A call found by [`scan_calls`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// 1-based line of the token.
    pub line: usize,
    /// The call text including the outer parentheses.
    pub text: String,
}

impl Call {
    pub fn arguments(&self) -> &str {
        call_arguments(&self.text).unwrap_or_default()
    }
}

/// Find every place where `token` starts.
///
/// Returns 0-based `(line, column)` pairs in file order, the column
/// being a byte offset into the line. This is a plain substring
/// search, so matches inside comments or longer identifiers are
/// included.
///
/// # Examples
///
/// ```
/// use msg_hash_i18n::scan::find_occurrences;
///
/// let lines = ["foo(A); foo(B);", "", "bar(foo(C));"];
/// assert_eq!(find_occurrences(&lines, "foo"), vec![(0, 0), (0, 8), (2, 4)]);
/// ```
pub fn find_occurrences(lines: &[&str], token: &str) -> Vec<(usize, usize)> {
    if token.is_empty() {
        return Vec::new();
    }
    lines
        .iter()
        .enumerate()
        .flat_map(|(idx, line)| {
            line.match_indices(token)
                .map(move |(column, _)| (idx, column))
        })
        .collect()
}

/// Characters after the end of the current line, continuing on the
/// following lines. Line breaks are reported as `\n`.
struct Cursor<'a> {
    lines: &'a [&'a str],
    line: usize,
    chars: Chars<'a>,
}

impl<'a> Cursor<'a> {
    fn new(lines: &'a [&'a str], line: usize, column: usize) -> Self {
        let rest = lines
            .get(line)
            .and_then(|text| text.get(column..))
            .unwrap_or_default();
        Self {
            lines,
            line,
            chars: rest.chars(),
        }
    }

    /// 0-based line and byte column of the next character.
    fn position(&self) -> (usize, usize) {
        let length = self.lines.get(self.line).map_or(0, |text| text.len());
        (self.line, length - self.chars.as_str().len())
    }
}

impl Iterator for Cursor<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        if let Some(ch) = self.chars.next() {
            return Some(ch);
        }
        let next_line = self.lines.get(self.line + 1)?;
        self.line += 1;
        self.chars = next_line.chars();
        Some('\n')
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

/// Extract the parenthesized argument list which starts after
/// `(line, column)`.
///
/// The position must be just after the matched token. Only spaces,
/// tabs and line breaks may come between the token and the opening
/// parenthesis.
///
/// # Examples
///
/// ```
/// use msg_hash_i18n::scan::{extract_call, Extraction, ScanOptions};
///
/// let lines = ["x = msg_hash_to_str(", "   MSG_QUIT);"];
/// let extraction = extract_call(&lines, 0, 19, ScanOptions::default());
/// assert_eq!(extraction, Extraction::Call(String::from("(\n   MSG_QUIT)")));
/// assert_eq!(extraction.arguments(), Some("\n   MSG_QUIT"));
///
/// // A longer identifier is skipped silently.
/// let lines = ["msg_hash_to_str_us(MSG_QUIT);"];
/// assert_eq!(
///     extract_call(&lines, 0, 15, ScanOptions::default()),
///     Extraction::Skip
/// );
/// ```
pub fn extract_call(
    lines: &[&str],
    line: usize,
    column: usize,
    options: ScanOptions,
) -> Extraction {
    extract_from(&mut Cursor::new(lines, line, column), options)
}

fn extract_from(cursor: &mut Cursor, options: ScanOptions) -> Extraction {

    let mut first = true;
    loop {
        let Some(ch) = cursor.next() else {
            return Extraction::Fatal(String::from(
                "reached end of file while looking for an opening parenthesis",
            ));
        };
        if first && is_identifier_char(ch) {
            return Extraction::Skip;
        }
        first = false;
        match ch {
            ' ' | '\t' | '\r' | '\n' => continue,
            '(' => break,
            _ => return Extraction::Warning(String::from("no opening parenthesis found")),
        }
    }

    let mut call = String::from("(");
    let mut depth = 1;
    let mut quote = None;
    let mut escaped = false;
    while depth > 0 {
        let Some(ch) = cursor.next() else {
            return Extraction::Fatal(String::from(
                "reached end of file and didn't find matching closing parenthesis",
            ));
        };
        call.push(ch);

        if let Some(delimiter) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == delimiter || ch == '\n' {
                // An unterminated literal ends at the line break.
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' if options.skip_string_literals => quote = Some(ch),
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }

    Extraction::Call(call)
}

/// Find and extract all calls to `token` in `text`.
///
/// Warnings drop a single occurrence. A fatal parse error abandons the
/// rest of the file. Both are recorded in `diagnostics` against
/// `path`.
pub fn scan_calls(
    path: &Path,
    text: &str,
    token: &str,
    options: ScanOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<Call> {
    let lines = text.lines().collect::<Vec<_>>();
    let mut calls = Vec::new();
    let mut end = (0, 0);
    for (idx, column) in find_occurrences(&lines, token) {
        if options.skip_string_literals && (idx, column) < end {
            continue;
        }
        let mut cursor = Cursor::new(&lines, idx, column + token.len());
        match extract_from(&mut cursor, options) {
            Extraction::Call(text) => {
                end = cursor.position();
                calls.push(Call {
                    line: idx + 1,
                    text,
                });
            }
            Extraction::Skip => {}
            Extraction::Warning(reason) => {
                diagnostics.warning(SourcePosition::new(path, idx + 1), reason);
            }
            Extraction::Fatal(reason) => {
                diagnostics.error(SourcePosition::new(path, idx + 1), reason);
                break;
            }
        }
    }
    calls
}
