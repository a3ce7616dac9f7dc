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

//! Reconcile lookups, definitions and catalogs.
//!
//! A run has two phases. [`Collect`] reads the source tree, the locale
//! headers and the catalog a command needs. It turns into a
//! [`Reconciled`] value which answers the questions of the command:
//! which symbols are undefined, what the catalog of a locale should
//! hold, or what its header should hold.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::info;
use polib::catalog::Catalog;

use crate::catalog::{
    catalog_entries, create_catalog, generate_catalog_metadata, load_catalog, read_translations,
    CatalogEntry, Translation,
};
use crate::config::Config;
use crate::definitions::LiteralDefinitionIndex;
use crate::diagnostics::Diagnostics;
use crate::files::find_sources;
use crate::header::render_header;
use crate::scan::ScanOptions;
use crate::usage::SymbolUsageIndex;
use crate::{read_source, Error, Result, SourcePosition};

/// The collect phase of a run.
///
/// Issues are recorded in the caller's [`Diagnostics`], so they are
/// still available when a later step of the run fails.
pub struct Collect<'a> {
    config: &'a Config,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Collect<'a> {
    pub fn new(config: &'a Config, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            config,
            diagnostics,
        }
    }

    /// Scan the source tree for lookups.
    ///
    /// When `strict` is set, a source file which cannot be read is an
    /// error. Otherwise it is recorded in the diagnostics and skipped.
    pub fn scan_usage(&mut self, strict: bool) -> Result<SymbolUsageIndex> {
        let config = self.config;
        let root = config.source_root.as_path();
        let sources = find_sources(root, &config.source_extension, &config.exclude_dirs)?;
        info!("Scanning {} files under {}", sources.len(), root.display());

        let filter = config.symbol_filter()?;
        let options = config.scan_options();
        if !strict {
            return Ok(SymbolUsageIndex::build(
                root,
                &sources,
                &config.usage_token,
                &filter,
                options,
                self.diagnostics,
            ));
        }

        let mut index = SymbolUsageIndex::new();
        for path in &sources {
            let text = read_source(root.join(path))?;
            index.add_file(
                path,
                &text,
                &config.usage_token,
                &filter,
                options,
                self.diagnostics,
            );
        }
        Ok(index)
    }

    /// Index the header of `locale`.
    ///
    /// Definitions always take a string literal, so parentheses in
    /// quotes are ignored regardless of the configuration.
    pub fn read_definitions(&mut self, locale: &str) -> Result<LiteralDefinitionIndex> {
        let config = self.config;
        LiteralDefinitionIndex::build(
            locale,
            &config.source_root,
            &[config.header_file(locale)],
            &config.definition_token,
            ScanOptions {
                skip_string_literals: true,
            },
            self.diagnostics,
        )
    }

    fn read_existing_definitions(&mut self, locale: &str) -> Result<Option<LiteralDefinitionIndex>> {
        let path = self.config.header_path(locale);
        if !path.exists() {
            info!("No header at {}, starting without translations", path.display());
            return Ok(None);
        }
        self.read_definitions(locale).map(Some)
    }

    fn read_existing_catalog(&self, locale: &str) -> Result<Option<Catalog>> {
        let path = self.config.catalog_path(locale);
        if !path.exists() {
            return Ok(None);
        }
        load_catalog(&path).map(Some)
    }

    /// Collect what a consistency check needs.
    pub fn for_check(mut self) -> Result<Reconciled<'a>> {
        let config = self.config;
        let usage = self.scan_usage(false)?;
        let original = self.read_definitions(&config.original_locale)?;
        Ok(self.finish(&config.original_locale, usage, original))
    }

    /// Collect what the catalog of `locale` is built from.
    ///
    /// The header and the catalog of `locale` are optional, a new
    /// locale has neither.
    pub fn for_export(mut self, locale: &str) -> Result<Reconciled<'a>> {
        let config = self.config;
        let usage = self.scan_usage(true)?;
        let original = self.read_definitions(&config.original_locale)?;
        let target = self.read_existing_definitions(locale)?;
        let catalog = self.read_existing_catalog(locale)?;
        let mut reconciled = self.finish(locale, usage, original);
        reconciled.target = target;
        reconciled.catalog = catalog;
        Ok(reconciled)
    }

    /// Collect what the header of `locale` is built from.
    pub fn for_import(mut self, locale: &str) -> Result<Reconciled<'a>> {
        let config = self.config;
        let catalog = load_catalog(&config.catalog_path(locale))?;
        let original = self.read_definitions(&config.original_locale)?;
        let mut reconciled = self.finish(locale, SymbolUsageIndex::new(), original);
        reconciled.catalog = Some(catalog);
        Ok(reconciled)
    }

    fn finish(
        self,
        locale: &str,
        usage: SymbolUsageIndex,
        original: LiteralDefinitionIndex,
    ) -> Reconciled<'a> {
        Reconciled {
            config: self.config,
            locale: String::from(locale),
            usage,
            original,
            target: None,
            catalog: None,
            diagnostics: self.diagnostics,
        }
    }
}

/// The reconcile phase of a run.
pub struct Reconciled<'a> {
    config: &'a Config,
    locale: String,
    usage: SymbolUsageIndex,
    original: LiteralDefinitionIndex,
    target: Option<LiteralDefinitionIndex>,
    catalog: Option<Catalog>,
    diagnostics: &'a mut Diagnostics,
}

/// Symbols whose lookups and definitions disagree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub original_locale: String,
    /// Symbols looked up but not defined, with every lookup site.
    pub undefined: Vec<(String, Vec<SourcePosition>)>,
    /// Symbols defined but never looked up.
    pub unused: Vec<String>,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.undefined.is_empty() && self.unused.is_empty()
    }
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (symbol, positions) in &self.undefined {
            writeln!(
                f,
                "{symbol} is used but not defined for {}:",
                self.original_locale
            )?;
            for position in positions {
                writeln!(f, "    {position}")?;
            }
        }
        for symbol in &self.unused {
            writeln!(f, "{symbol} is defined but never used")?;
        }
        Ok(())
    }
}

impl Reconciled<'_> {
    /// Compare the lookups with the original definitions.
    ///
    /// Unused definitions are informational: symbols can be looked up
    /// with computed arguments which the scanner cannot follow.
    pub fn consistency(&self) -> ConsistencyReport {
        let undefined = self
            .usage
            .iter()
            .filter(|(symbol, _)| !self.original.contains(symbol))
            .map(|(symbol, positions)| (String::from(symbol), positions.to_vec()))
            .collect();
        let unused = self
            .original
            .iter()
            .filter(|(symbol, _)| !self.usage.contains(symbol))
            .map(|(symbol, _)| String::from(symbol))
            .collect();
        ConsistencyReport {
            original_locale: self.original.locale().to_string(),
            undefined,
            unused,
        }
    }

    /// The catalog entries of the locale, in the declaration order of
    /// the original header.
    ///
    /// A translation comes from the header of the locale when it
    /// defines the symbol, and from the existing catalog otherwise.
    /// A catalog translation made for another source text is kept but
    /// marked fuzzy.
    pub fn export_entries(&mut self) -> Vec<CatalogEntry> {
        let previous = self
            .catalog
            .as_ref()
            .map(catalog_entries)
            .unwrap_or_default()
            .into_iter()
            .map(|entry| (entry.symbol.clone(), entry))
            .collect::<HashMap<_, _>>();

        if let Some(target) = &self.target {
            for (symbol, definition) in target.in_declaration_order() {
                if !self.original.contains(symbol) {
                    self.diagnostics.warning(
                        definition.position.clone(),
                        format!(
                            "{symbol} is not defined for {}, dropping it",
                            self.original.locale()
                        ),
                    );
                }
            }
        }

        let mut entries = Vec::new();
        for (symbol, definition) in self.original.in_declaration_order() {
            if definition.text.is_empty() {
                self.diagnostics.warning(
                    definition.position.clone(),
                    format!("{symbol} has an empty literal, not exporting it"),
                );
                continue;
            }

            let mut entry = CatalogEntry {
                symbol: String::from(symbol),
                source: definition.text.clone(),
                occurrences: self.usage.get(symbol).map(<[_]>::to_vec).unwrap_or_default(),
                ..CatalogEntry::default()
            };
            let previous = previous.get(symbol);
            if let Some(previous) = previous {
                entry.comment = previous.comment.clone();
            }
            match (self.target.as_ref().and_then(|target| target.get(symbol)), previous) {
                (Some(translated), _) => entry.translation = translated.text.clone(),
                (None, Some(previous)) => {
                    entry.translation = previous.translation.clone();
                    entry.fuzzy = previous.fuzzy
                        || (!previous.translation.is_empty() && previous.source != entry.source);
                }
                (None, None) => {}
            }

            if self.config.reset_identical
                && !entry.translation.is_empty()
                && entry.translation == entry.source
            {
                entry.translation.clear();
                entry.fuzzy = true;
            }
            entries.push(entry);
        }
        entries
    }

    /// The catalog of the locale, with fresh metadata.
    pub fn export_catalog(&mut self) -> Catalog {
        let metadata = generate_catalog_metadata(&self.config.project_name, &self.locale);
        create_catalog(metadata, &self.export_entries())
    }

    /// The confirmed translations of the catalog, in catalog order.
    ///
    /// Symbols the original header does not define are dropped, and
    /// so are repeated symbols after their first translation.
    pub fn import_translations(&mut self) -> Result<Vec<Translation>> {
        let path = self.config.catalog_path(&self.locale);
        let Some(catalog) = &self.catalog else {
            return Err(Error::MissingCatalog { path });
        };

        let mut seen = HashSet::new();
        let mut translations = Vec::new();
        for translation in read_translations(catalog, &path, self.diagnostics) {
            if !self.original.contains(&translation.symbol) {
                self.diagnostics.file_warning(
                    &path,
                    format!(
                        "{} is not defined for {}, skipping it",
                        translation.symbol,
                        self.original.locale()
                    ),
                );
                continue;
            }
            if !seen.insert(translation.symbol.clone()) {
                self.diagnostics.file_warning(
                    &path,
                    format!("{} is translated more than once, keeping the first", translation.symbol),
                );
                continue;
            }
            translations.push(translation);
        }
        Ok(translations)
    }

    /// The header of the locale, rendered from its catalog.
    pub fn import_header(&mut self) -> Result<String> {
        let translations = self.import_translations()?;
        info!(
            "Importing {} translations for {}",
            translations.len(),
            self.locale
        );
        Ok(render_header(&self.config.definition_token, &translations))
    }
}
