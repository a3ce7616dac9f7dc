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

//! Keep `MSG_HASH` locale headers and PO catalogs in sync.
//!
//! Run it from the root of the source tree, or point `--root` at it.
//! Warnings found while scanning are printed at the end of the run.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use msg_hash_i18n::catalog::save_catalog;
use msg_hash_i18n::config::Config;
use msg_hash_i18n::diagnostics::Diagnostics;
use msg_hash_i18n::header::write_header;
use msg_hash_i18n::reconcile::Collect;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// JSON file with the project layout.
    #[arg(short, long, global = true, value_name = "intl.json")]
    config: Option<PathBuf>,
    /// Root of the source tree, overriding the configuration.
    #[arg(short, long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every symbol looked up in the sources with its call sites.
    Symbols,
    /// Report symbols which are used but not defined, or defined but
    /// not used.
    Check,
    /// Write the PO catalog of a locale from the headers.
    Export {
        /// Locale name, as in `msg_hash_<locale>.h`.
        locale: String,
    },
    /// Write the header of a locale from its PO catalog.
    Import {
        /// Locale name, as in `msg_hash_<locale>.h`.
        locale: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Could not load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(root) = &cli.root {
        config.source_root = root.clone();
    }
    Ok(config)
}

#[allow(clippy::print_stdout)]
fn symbols(config: &Config, diagnostics: &mut Diagnostics) -> anyhow::Result<()> {
    let usage = Collect::new(config, diagnostics).scan_usage(false)?;
    for (symbol, positions) in usage.iter() {
        println!("{symbol}");
        for position in positions {
            println!("    {position}");
        }
    }
    info!("Found {} symbols", usage.len());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn check(config: &Config, diagnostics: &mut Diagnostics) -> anyhow::Result<()> {
    let report = Collect::new(config, diagnostics)
        .for_check()
        .context("Could not collect symbols")?
        .consistency();
    if report.is_clean() {
        info!("Every symbol used is defined and every definition is used");
        return Ok(());
    }
    print!("{report}");
    info!(
        "{} undefined and {} unused symbols",
        report.undefined.len(),
        report.unused.len()
    );
    Ok(())
}

fn export(config: &Config, locale: &str, diagnostics: &mut Diagnostics) -> anyhow::Result<()> {
    let catalog = Collect::new(config, diagnostics)
        .for_export(locale)
        .with_context(|| format!("Could not collect the literals for {locale}"))?
        .export_catalog();
    let path = config.catalog_path(locale);
    save_catalog(&catalog, &path)?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn import(config: &Config, locale: &str, diagnostics: &mut Diagnostics) -> anyhow::Result<()> {
    let header = Collect::new(config, diagnostics)
        .for_import(locale)
        .with_context(|| format!("Could not collect the translations for {locale}"))?
        .import_header()?;
    let path = config.header_path(locale);
    write_header(&path, &header, config.needs_bom(locale))?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Issues found before a failure are reported too.
    let mut diagnostics = Diagnostics::new();
    let result = match &cli.command {
        Command::Symbols => symbols(&config, &mut diagnostics),
        Command::Check => check(&config, &mut diagnostics),
        Command::Export { locale } => export(&config, locale, &mut diagnostics),
        Command::Import { locale } => import(&config, locale, &mut diagnostics),
    };
    diagnostics.report();
    result
}
