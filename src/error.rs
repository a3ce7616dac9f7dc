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

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error(
        "{}:{line}: duplicate literal for {symbol} (first defined at {}:{first_line})",
        file.display(),
        first_file.display()
    )]
    DuplicateLiteral {
        symbol: String,
        file: PathBuf,
        line: usize,
        first_file: PathBuf,
        first_line: usize,
    },
    #[error("Could not parse {} as PO file: {message}", path.display())]
    CatalogParse { path: PathBuf, message: String },
    #[error("Catalog {} does not exist", path.display())]
    MissingCatalog { path: PathBuf },
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Invalid symbol pattern: {0}")]
    SymbolPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
