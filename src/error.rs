// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

/// The crate-wide error type: a human-readable message, plus the
/// underlying error where there is one.
#[derive(Debug)]
pub struct ErrorReport {
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

/// The crate-wide result type.
pub type Fallible<T> = Result<T, ErrorReport>;

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    fn wrap(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Shorthand for returning an error from a fallible function.
pub fn fail<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::new(message))
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ErrorReport {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(e: std::io::Error) -> Self {
        ErrorReport::wrap(format!("I/O error: {e}"), e)
    }
}

impl From<rusqlite::Error> for ErrorReport {
    fn from(e: rusqlite::Error) -> Self {
        ErrorReport::wrap(format!("database error: {e}"), e)
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(e: serde_json::Error) -> Self {
        ErrorReport::wrap(format!("JSON error: {e}"), e)
    }
}

impl From<toml::de::Error> for ErrorReport {
    fn from(e: toml::de::Error) -> Self {
        ErrorReport::wrap(format!("TOML error: {e}"), e)
    }
}

impl From<walkdir::Error> for ErrorReport {
    fn from(e: walkdir::Error) -> Self {
        ErrorReport::wrap(format!("directory walk error: {e}"), e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_returns_err() {
        let result: Fallible<()> = fail("something went wrong");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().to_string(), "something went wrong");
    }

    #[test]
    fn wrapped_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let report: ErrorReport = io.into();
        assert!(report.source().is_some());
    }
}
