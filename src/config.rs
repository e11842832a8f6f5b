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

use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;

/// Optional per-directory configuration, read from `certdrill.toml` in
/// the study directory. Every field has a default, and the file itself
/// is optional.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The database file name, relative to the study directory.
    #[serde(default = "default_database")]
    pub database: String,
    /// The address the drill server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Restrict drilling and stats to one exam id.
    #[serde(default)]
    pub exam: Option<String>,
}

fn default_database() -> String {
    "certdrill.db".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            bind: default_bind(),
            exam: None,
        }
    }
}

impl Config {
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join("certdrill.toml");
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.database, "certdrill.db");
        assert_eq!(config.bind, "127.0.0.1:8000");
        assert!(config.exam.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = toml::from_str("exam = \"net-plus\"").unwrap();
        assert_eq!(config.exam.as_deref(), Some("net-plus"));
        assert_eq!(config.database, "certdrill.db");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Config, _> = toml::from_str("databse = \"typo.db\"");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.database, "certdrill.db");
    }
}
