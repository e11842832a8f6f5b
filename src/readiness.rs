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

//! Aggregation of quiz score histories into per-domain scores, and of
//! per-domain scores into a single weighted readiness percentage.

use std::collections::BTreeMap;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// Mean quiz score at or above which an objective counts as mastered.
const MASTERY_THRESHOLD: f64 = 80.0;

/// How far along the learner is on one objective. Derived from the
/// quiz score history; stored values are a cache, never the truth.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mastery {
    NotStarted,
    InProgress,
    Mastered,
}

impl Mastery {
    fn as_str(self) -> &'static str {
        match self {
            Mastery::NotStarted => "not_started",
            Mastery::InProgress => "in_progress",
            Mastery::Mastered => "mastered",
        }
    }
}

impl TryFrom<String> for Mastery {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "not_started" => Ok(Mastery::NotStarted),
            "in_progress" => Ok(Mastery::InProgress),
            "mastered" => Ok(Mastery::Mastered),
            _ => fail(format!("Invalid mastery level: {}", value)),
        }
    }
}

impl ToSql for Mastery {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Mastery {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Mastery::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Classify an objective's quiz score history.
pub fn mastery(scores: &[f64]) -> Mastery {
    if scores.is_empty() {
        return Mastery::NotStarted;
    }
    if mean(scores) >= MASTERY_THRESHOLD {
        Mastery::Mastered
    } else {
        Mastery::InProgress
    }
}

/// The score of one domain: the mean of the per-objective mean scores,
/// over the objectives that have at least one recorded quiz score.
/// Untouched objectives are excluded from the average rather than
/// dragging it down as zeroes. Zero when nothing has been recorded.
pub fn domain_score(score_histories: &[Vec<f64>]) -> u32 {
    let means: Vec<f64> = score_histories
        .iter()
        .filter(|scores| !scores.is_empty())
        .map(|scores| mean(scores))
        .collect();
    if means.is_empty() {
        return 0;
    }
    mean(&means).round() as u32
}

/// The overall readiness percentage: the weighted mean of the domain
/// scores, weighted by each domain's share of the exam. Domains absent
/// from `scores` count as zero. The result is normalized by the weight
/// sum, so it stays in `[0, 100]` even if the catalog's weights do not
/// add up to 100. Zero total weight yields zero.
pub fn readiness_score(scores: &BTreeMap<String, u32>, weights: &BTreeMap<String, u32>) -> u32 {
    let total_weight: u32 = weights.values().sum();
    if total_weight == 0 {
        return 0;
    }
    let weighted_sum: f64 = weights
        .iter()
        .map(|(domain, weight)| {
            let score = scores.get(domain).copied().unwrap_or(0);
            score as f64 * *weight as f64
        })
        .sum();
    (weighted_sum / total_weight as f64).round() as u32
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
