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

//! C string literals.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    /// There is no string literal at all.
    Missing,
    /// Something other than a string literal, whitespace or a comment.
    Unexpected(char),
    /// The closing quote is missing.
    Unterminated,
    /// An escape sequence names a value which is not a byte or not a
    /// Unicode scalar value.
    InvalidEscape(String),
    /// The decoded bytes are not UTF-8.
    InvalidUtf8,
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LiteralError::Missing => write!(f, "missing string literal"),
            LiteralError::Unexpected(ch) => write!(f, "unexpected {ch:?} in string literal"),
            LiteralError::Unterminated => write!(f, "unterminated string literal"),
            LiteralError::InvalidEscape(escape) => write!(f, "invalid escape sequence \\{escape}"),
            LiteralError::InvalidUtf8 => write!(f, "string literal is not valid UTF-8"),
        }
    }
}

impl std::error::Error for LiteralError {}

/// Decode a sequence of adjacent C string literals.
///
/// C concatenates string literals separated only by whitespace. The
/// segments are decoded and joined without a separator. Comments
/// between the segments are ignored.
///
/// Octal and `\x` escapes are bytes, so a UTF-8 sequence can be spelled
/// out byte by byte, even across segments. The result must be UTF-8.
///
/// # Examples
///
/// ```
/// use msg_hash_i18n::literal::fold_literals;
///
/// assert_eq!(fold_literals(r#""Hello " "World""#).unwrap(), "Hello World");
/// assert_eq!(
///     fold_literals("\"Line one\\n\"\n   \"Line \\\"two\\\"\"").unwrap(),
///     "Line one\nLine \"two\""
/// );
/// ```
pub fn fold_literals(source: &str) -> Result<String, LiteralError> {
    let mut chars = source.chars().peekable();
    let mut text = Vec::new();
    let mut segments = 0;

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                decode_segment(&mut chars, &mut text)?;
                segments += 1;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for ch in chars.by_ref() {
                    if previous == '*' && ch == '/' {
                        break;
                    }
                    previous = ch;
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for ch in chars.by_ref() {
                    if ch == '\n' {
                        break;
                    }
                }
            }
            ch if ch.is_whitespace() => {}
            ch => return Err(LiteralError::Unexpected(ch)),
        }
    }

    if segments == 0 {
        return Err(LiteralError::Missing);
    }
    String::from_utf8(text).map_err(|_| LiteralError::InvalidUtf8)
}

fn push_char(text: &mut Vec<u8>, ch: char) {
    let mut buffer = [0; 4];
    text.extend_from_slice(ch.encode_utf8(&mut buffer).as_bytes());
}

fn push_byte(text: &mut Vec<u8>, escape: String, value: u32) -> Result<(), LiteralError> {
    let byte = u8::try_from(value).map_err(|_| LiteralError::InvalidEscape(escape))?;
    text.push(byte);
    Ok(())
}

/// Read the `\u` or `\U` escape whose `letter` was just consumed.
fn decode_universal(
    chars: &mut Peekable<Chars>,
    letter: char,
    digits: usize,
) -> Result<char, LiteralError> {
    let mut escape = String::from(letter);
    let mut value = 0u32;
    for _ in 0..digits {
        let ch = chars.next().ok_or(LiteralError::Unterminated)?;
        escape.push(ch);
        let Some(digit) = ch.to_digit(16) else {
            return Err(LiteralError::InvalidEscape(escape));
        };
        value = value.saturating_mul(16).saturating_add(digit);
    }
    char::from_u32(value).ok_or(LiteralError::InvalidEscape(escape))
}

/// Decode one literal up to and including its closing quote.
fn decode_segment(chars: &mut Peekable<Chars>, text: &mut Vec<u8>) -> Result<(), LiteralError> {
    loop {
        let ch = chars.next().ok_or(LiteralError::Unterminated)?;
        match ch {
            '"' => return Ok(()),
            '\\' => {
                let escape = chars.next().ok_or(LiteralError::Unterminated)?;
                match escape {
                    'n' => text.push(b'\n'),
                    't' => text.push(b'\t'),
                    'r' => text.push(b'\r'),
                    'a' => text.push(0x07),
                    'b' => text.push(0x08),
                    'f' => text.push(0x0c),
                    'v' => text.push(0x0b),
                    // A backslash at the end of a line continues the
                    // literal on the next line.
                    '\n' => {}
                    '0'..='7' => {
                        let mut spelled = String::from(escape);
                        let mut value = escape.to_digit(8).unwrap_or_default();
                        for _ in 0..2 {
                            match chars.peek().and_then(|ch| ch.to_digit(8)) {
                                Some(digit) => {
                                    value = value * 8 + digit;
                                    spelled.extend(chars.next());
                                }
                                None => break,
                            }
                        }
                        push_byte(text, spelled, value)?;
                    }
                    'x' => {
                        let mut spelled = String::from(escape);
                        let mut value = 0u32;
                        while let Some(digit) = chars.peek().and_then(|ch| ch.to_digit(16)) {
                            value = value.saturating_mul(16).saturating_add(digit);
                            spelled.extend(chars.next());
                        }
                        if spelled.len() == 1 {
                            return Err(LiteralError::InvalidEscape(spelled));
                        }
                        push_byte(text, spelled, value)?;
                    }
                    'u' => push_char(text, decode_universal(chars, escape, 4)?),
                    'U' => push_char(text, decode_universal(chars, escape, 8)?),
                    // This covers \\, \", \' and \? as well.
                    other => push_char(text, other),
                }
            }
            ch => push_char(text, ch),
        }
    }
}

/// Escape `text` for use inside a C string literal.
///
/// Control characters without a short escape are written as three
/// octal digits, which cannot swallow the characters which follow.
///
/// # Examples
///
/// ```
/// use msg_hash_i18n::literal::escape_literal;
///
/// assert_eq!(escape_literal("Say \"hi\"\n"), r#"Say \"hi\"\n"#);
/// assert_eq!(escape_literal("C:\\retroarch"), r"C:\\retroarch");
/// ```
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            ch if ch.is_ascii_control() => {
                escaped.push_str(&format!("\\{:03o}", u32::from(ch)));
            }
            ch => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[track_caller]
    fn assert_folds(source: &str, expected: &str) {
        assert_eq!(fold_literals(source).as_deref(), Ok(expected));
    }

    #[test]
    fn test_fold_single() {
        assert_folds(r#""Quit RetroArch""#, "Quit RetroArch");
        assert_folds(r#""""#, "");
    }

    #[test]
    fn test_fold_multiple_segments() {
        assert_folds(r#""Hello " "World""#, "Hello World");
        assert_folds("\"a\"\n   \"b\"\n\t\"c\"", "abc");
        assert_folds("\"a\"\"b\"", "ab");
    }

    #[test]
    fn test_fold_with_comments() {
        assert_folds("\"a\" /* (b) */ \"c\"", "ac");
        assert_folds("\"a\" // trailing\n  \"c\"", "ac");
    }

    #[test]
    fn test_fold_escapes() {
        assert_folds(r#""tab\there""#, "tab\there");
        assert_folds(r#""\\\"\'\?""#, "\\\"'?");
        assert_folds(r#""\101\x42\0""#, "AB\0");
        assert_folds(r#""\033[0m""#, "\u{1b}[0m");
        assert_folds("\"one \\\ntwo\"", "one two");
        assert_folds(r#""caf\u00e9""#, "café");
        assert_folds(r#""\U0001F600!""#, "\u{1f600}!");
        assert_folds(r#""caf\xc3\xa9""#, "café");
        assert_folds(r#""caf\303\251""#, "café");
        assert_folds(r#""caf\xc3" "\xa9""#, "café");
    }

    #[test]
    fn test_fold_utf8() {
        assert_folds(r#""Salir de RetroArch ""ñ""#, "Salir de RetroArch ñ");
        assert_folds(r#""終了""#, "終了");
    }

    #[test]
    fn test_fold_errors() {
        assert_eq!(fold_literals(""), Err(LiteralError::Missing));
        assert_eq!(fold_literals("  \n "), Err(LiteralError::Missing));
        assert_eq!(
            fold_literals("\"a\" STRINGIFY(b)"),
            Err(LiteralError::Unexpected('S'))
        );
        assert_eq!(fold_literals("\"abc"), Err(LiteralError::Unterminated));
        assert_eq!(fold_literals("\"abc\\"), Err(LiteralError::Unterminated));
        assert_eq!(fold_literals(r#""caf\xe9""#), Err(LiteralError::InvalidUtf8));
        assert_eq!(
            fold_literals(r#""\x100""#),
            Err(LiteralError::InvalidEscape(String::from("x100")))
        );
        assert_eq!(
            fold_literals(r#""\xg""#),
            Err(LiteralError::InvalidEscape(String::from("x")))
        );
        assert_eq!(
            fold_literals(r#""\u00g9""#),
            Err(LiteralError::InvalidEscape(String::from("u00g")))
        );
        assert_eq!(
            fold_literals(r#""\ud800""#),
            Err(LiteralError::InvalidEscape(String::from("ud800")))
        );
    }

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape_literal("\u{1b}[0m"), "\\033[0m");
        assert_eq!(escape_literal("a\0b"), "a\\000b");
        assert_eq!(escape_literal("\u{7f}1"), "\\1771");
    }

    #[test]
    fn test_escape_then_fold() {
        for text in [
            "plain",
            "",
            "\"quoted\" and \\backslash\\",
            "multi\nline\r\n\ttext",
            "bell\u{7}\u{1}7 then digits",
            "%s: %d%%",
            "日本語 ✓",
        ] {
            let source = format!("\"{}\"", escape_literal(text));
            assert_eq!(fold_literals(&source).as_deref(), Ok(text), "{source}");
        }
    }
}
