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

//! Non-fatal problems found while scanning.
//!
//! Warnings and parse errors are collected while the indexes are
//! built and reported together once the run is over, so the
//! maintainer gets one consolidated list instead of messages
//! interleaved with the progress output.

use std::fmt;
use std::path::PathBuf;

use log::{error, warn};

use crate::SourcePosition;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    /// A single occurrence was dropped.
    Warning,
    /// The rest of a file was abandoned.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub path: PathBuf,
    /// Unset when the issue concerns the whole file.
    pub line: Option<usize>,
    pub message: String,
}

impl Issue {
    pub fn position(&self) -> Option<SourcePosition> {
        self.line
            .map(|line| SourcePosition::new(self.path.clone(), line))
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}: {}", self.path.display(), self.message),
            None => write!(f, "{}: {}", self.path.display(), self.message),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning<S: Into<String>>(&mut self, position: SourcePosition, message: S) {
        self.push(Severity::Warning, position.path, Some(position.line), message);
    }

    pub fn error<S: Into<String>>(&mut self, position: SourcePosition, message: S) {
        self.push(Severity::Error, position.path, Some(position.line), message);
    }

    /// Record a problem which concerns a whole file.
    pub fn file_warning<P: Into<PathBuf>, S: Into<String>>(&mut self, path: P, message: S) {
        self.push(Severity::Warning, path.into(), None, message);
    }

    /// Record a file which could not be processed at all.
    pub fn file_error<P: Into<PathBuf>, S: Into<String>>(&mut self, path: P, message: S) {
        self.push(Severity::Error, path.into(), None, message);
    }

    fn push<S: Into<String>>(
        &mut self,
        severity: Severity,
        path: PathBuf,
        line: Option<usize>,
        message: S,
    ) {
        self.issues.push(Issue {
            severity,
            path,
            line,
            message: message.into(),
        });
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }

    /// Log every issue followed by a summary line.
    pub fn report(&self) {
        for issue in &self.issues {
            match issue.severity {
                Severity::Warning => warn!("{issue}"),
                Severity::Error => error!("{issue}"),
            }
        }
        if !self.is_empty() {
            warn!(
                "{} warning(s), {} error(s)",
                self.warning_count(),
                self.error_count()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counts() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        diagnostics.warning(SourcePosition::new("a.c", 1), "no opening parenthesis found");
        diagnostics.error(SourcePosition::new("a.c", 9), "unbalanced parentheses");
        diagnostics.warning(SourcePosition::new("b.c", 2), "missing literal");
        diagnostics.file_error("c.c", "permission denied");
        assert_eq!(diagnostics.warning_count(), 2);
        assert_eq!(diagnostics.error_count(), 2);
    }

    #[test]
    fn test_display() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warning(SourcePosition::new("a.c", 1), "one");
        diagnostics.file_error("c.c", "two");
        assert_eq!(
            diagnostics
                .issues()
                .iter()
                .map(|issue| issue.to_string())
                .collect::<Vec<_>>(),
            vec!["a.c:1: one", "c.c: two"]
        );
    }
}
