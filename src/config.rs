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

//! Project layout and scanning policy.
//!
//! The defaults describe the RetroArch tree: sources under the
//! current directory, locale headers at `intl/msg_hash_<locale>.h`
//! and catalogs at `intl/po/<locale>.po`. Everything can be changed
//! with a JSON file using the same kebab-case keys:
//!
//! ```json
//! {
//!   "source-root": "../RetroArch",
//!   "catalog-dir": "po",
//!   "symbol-pattern": "^MENU_ENUM_LABEL_VALUE_[A-Z0-9_]+$"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::scan::ScanOptions;
use crate::usage::{SymbolFilter, DEFAULT_SYMBOL_PATTERN};
use crate::{read_source, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Root of the C source tree. Other paths are relative to it.
    pub source_root: PathBuf,
    /// Top-level directories which are not scanned for lookups.
    pub exclude_dirs: Vec<String>,
    /// Extension of the files scanned for lookups.
    pub source_extension: String,
    /// Locale header path, `{locale}` is replaced by the locale name.
    pub header_template: String,
    /// Directory holding `<locale>.po`.
    pub catalog_dir: PathBuf,
    /// The locale whose header is the source of truth.
    pub original_locale: String,
    /// Name of the lookup function.
    pub usage_token: String,
    /// Name of the definition macro.
    pub definition_token: String,
    /// Regular expression a lookup argument must match to count as a
    /// symbol.
    pub symbol_pattern: String,
    /// Ignore parentheses in quotes when scanning sources. Headers
    /// are always scanned this way.
    pub skip_string_literals: bool,
    /// Locales whose header is written with a UTF-8 byte-order mark.
    pub bom_locales: Vec<String>,
    pub project_name: String,
    /// Treat a translation identical to its source as untranslated.
    pub reset_identical: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            exclude_dirs: vec![String::from("intl")],
            source_extension: String::from("c"),
            header_template: String::from("intl/msg_hash_{locale}.h"),
            catalog_dir: PathBuf::from("intl/po"),
            original_locale: String::from("us"),
            usage_token: String::from("msg_hash_to_str"),
            definition_token: String::from("MSG_HASH"),
            symbol_pattern: String::from(DEFAULT_SYMBOL_PATTERN),
            skip_string_literals: false,
            bom_locales: ["chs", "cht", "ja", "ko"].map(String::from).to_vec(),
            project_name: String::from("RetroArch"),
            reset_identical: true,
        }
    }
}

impl Config {
    /// Load a configuration file. Missing keys keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let text = read_source(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The header defining the literals of `locale`, relative to the
    /// source root.
    pub fn header_file(&self, locale: &str) -> PathBuf {
        PathBuf::from(self.header_template.replace("{locale}", locale))
    }

    /// The header defining the literals of `locale`.
    pub fn header_path(&self, locale: &str) -> PathBuf {
        self.source_root.join(self.header_file(locale))
    }

    /// The PO catalog of `locale`.
    pub fn catalog_path(&self, locale: &str) -> PathBuf {
        self.source_root
            .join(&self.catalog_dir)
            .join(format!("{locale}.po"))
    }

    pub fn needs_bom(&self, locale: &str) -> bool {
        self.bom_locales.iter().any(|bom_locale| bom_locale == locale)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            skip_string_literals: self.skip_string_literals,
        }
    }

    pub fn symbol_filter(&self) -> Result<SymbolFilter> {
        SymbolFilter::new(&self.symbol_pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.header_file("us"), Path::new("intl/msg_hash_us.h"));
        assert_eq!(
            config.header_path("us"),
            Path::new("./intl/msg_hash_us.h")
        );
        assert_eq!(config.catalog_path("fr"), Path::new("./intl/po/fr.po"));
    }

    #[test]
    fn test_needs_bom() {
        let config = Config::default();
        assert!(config.needs_bom("ja"));
        assert!(!config.needs_bom("fr"));
    }

    #[test]
    fn test_load_partial() -> anyhow::Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let path = tmpdir.path().join("intl.json");
        std::fs::write(
            &path,
            r#"{
                 "source-root": "/src/retroarch",
                 "header-template": "lang/{locale}.h",
                 "skip-string-literals": true
               }"#,
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.source_root, Path::new("/src/retroarch"));
        assert!(config.skip_string_literals);
        assert_eq!(config.usage_token, "msg_hash_to_str");
        assert_eq!(
            config.header_path("de"),
            Path::new("/src/retroarch/lang/de.h")
        );
        Ok(())
    }

    #[test]
    fn test_load_unknown_key() -> anyhow::Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let path = tmpdir.path().join("intl.json");
        std::fs::write(&path, r#"{"catalog-directory": "po"}"#)?;
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
        Ok(())
    }

    #[test]
    fn test_invalid_symbol_pattern() {
        let config = Config {
            symbol_pattern: String::from("^[A-Z"),
            ..Config::default()
        };
        assert!(matches!(
            config.symbol_filter(),
            Err(Error::SymbolPattern(_))
        ));
    }
}
