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

//! Generate locale headers.

use std::fs;
use std::path::Path;

use crate::catalog::Translation;
use crate::literal::escape_literal;
use crate::{Error, Result};

/// First line of every generated header.
pub const DISCLAIMER: &str =
    "/* This file is generated from a PO catalog. Do not edit it by hand, edit the catalog instead. */";

/// Render a header with one `token(SYMBOL, "text")` block per
/// translation.
///
/// # Examples
///
/// ```
/// use msg_hash_i18n::catalog::Translation;
/// use msg_hash_i18n::header::{render_header, DISCLAIMER};
///
/// let header = render_header(
///     "MSG_HASH",
///     &[Translation::new("MSG_QUIT", "Quitter \"RetroArch\"")],
/// );
/// assert_eq!(
///     header,
///     format!(
///         "{DISCLAIMER}\n\
///          \n\
///          MSG_HASH(\n   MSG_QUIT,\n   \"Quitter \\\"RetroArch\\\"\"\n   )\n"
///     )
/// );
/// ```
pub fn render_header(token: &str, translations: &[Translation]) -> String {
    let mut header = String::from(DISCLAIMER);
    header.push_str("\n\n");
    for translation in translations {
        header.push_str(&format!(
            "{token}(\n   {},\n   \"{}\"\n   )\n",
            translation.symbol,
            escape_literal(&translation.text)
        ));
    }
    header
}

/// Write a rendered header, prefixed with a UTF-8 byte-order mark when
/// `bom` is set.
pub fn write_header(path: &Path, header: &str, bom: bool) -> Result<()> {
    let write_error = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let contents = if bom {
        format!("\u{feff}{header}")
    } else {
        String::from(header)
    };
    fs::write(path, contents).map_err(write_error)
}
