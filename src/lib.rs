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

//! certdrill: an offline exam preparation tool. Exam content is
//! authored as TOML files; progress (spaced-repetition schedules,
//! quiz score histories, the study streak) is tracked in a local
//! SQLite database.

pub mod catalog;
pub mod cli;
pub mod cmd;
pub mod collection;
pub mod config;
pub mod db;
pub mod drill;
pub mod error;
pub mod markdown;
pub mod placement;
pub mod progress;
pub mod quiz;
pub mod readiness;
pub mod scoring;
pub mod srs;
pub mod streak;
pub mod types;
