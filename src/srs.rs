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

//! The SM-2 scheduler. Pure functions from (schedule, quality) to the
//! next schedule; the caller persists the returned snapshot.

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
use crate::types::timestamp::Timestamp;

/// The ease factor of a card never drops below this.
const MIN_EASE_FACTOR: f64 = 1.3;

/// The ease factor assigned to a card on its first review.
const INITIAL_EASE_FACTOR: f64 = 2.5;

/// How the learner rated a flashcard recall attempt.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ReviewQuality {
    /// Total failure to recall.
    Again,
    /// Recalled with serious difficulty.
    Hard,
    /// Recalled with some hesitation.
    Good,
    /// Recalled effortlessly.
    Easy,
}

impl ReviewQuality {
    /// The quality value `q` plugged into the SM-2 ease formula.
    pub fn value(self) -> f64 {
        match self {
            ReviewQuality::Again => 0.0,
            ReviewQuality::Hard => 2.0,
            ReviewQuality::Good => 3.0,
            ReviewQuality::Easy => 5.0,
        }
    }

    /// A successful review keeps the repetition run going; anything
    /// below `Good` is a lapse.
    pub fn is_success(self) -> bool {
        matches!(self, ReviewQuality::Good | ReviewQuality::Easy)
    }

    fn as_str(self) -> &'static str {
        match self {
            ReviewQuality::Again => "again",
            ReviewQuality::Hard => "hard",
            ReviewQuality::Good => "good",
            ReviewQuality::Easy => "easy",
        }
    }
}

impl TryFrom<String> for ReviewQuality {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "again" => Ok(ReviewQuality::Again),
            "hard" => Ok(ReviewQuality::Hard),
            "good" => Ok(ReviewQuality::Good),
            "easy" => Ok(ReviewQuality::Easy),
            _ => fail(format!("Invalid review quality: {}", value)),
        }
    }
}

impl ToSql for ReviewQuality {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ReviewQuality {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        ReviewQuality::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// One scheduling snapshot for a flashcard. The scheduler never
/// mutates a schedule in place; each review produces a new snapshot,
/// and the history of snapshots for a card is append-only.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSchedule {
    pub card_id: String,
    /// Interval growth multiplier. Invariant: `>= 1.3`.
    pub ease_factor: f64,
    /// Days until the next review. Zero only for a never-reviewed
    /// card; `>= 1` once `repetitions >= 1`.
    pub interval_days: i64,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
    pub next_review: Timestamp,
    pub last_review: Timestamp,
}

impl CardSchedule {
    /// The schedule of a card at the moment it is first seen, before
    /// any rating has been applied.
    pub fn new(card_id: impl Into<String>, now: Timestamp) -> Self {
        Self {
            card_id: card_id.into(),
            ease_factor: INITIAL_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
            next_review: now,
            last_review: now,
        }
    }
}

/// Compute the schedule that follows `prev` after a review rated
/// `quality` at time `now`.
///
/// The ease factor is updated first (and floored at 1.3), then the
/// interval: a lapse (`Again` or `Hard`) resets repetitions and forces
/// a one-day interval; a success walks the 1-day, 6-day,
/// `round(interval * ease)` ladder, with the updated ease factor
/// applied to the previous interval.
///
/// Note that `Hard` resets exactly like `Again`. Standard SM-2 usually
/// gives `Hard` a reduced-but-nonzero interval; the threshold at
/// `Good` is carried over deliberately and is not a stable contract.
pub fn next_schedule(prev: &CardSchedule, quality: ReviewQuality, now: Timestamp) -> CardSchedule {
    let q = quality.value();
    // EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
    let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    let ease_factor = (prev.ease_factor + ease_delta).max(MIN_EASE_FACTOR);

    let (repetitions, interval_days) = if quality.is_success() {
        let repetitions = prev.repetitions + 1;
        let interval_days = match repetitions {
            1 => 1,
            2 => 6,
            _ => (prev.interval_days as f64 * ease_factor).round() as i64,
        };
        (repetitions, interval_days)
    } else {
        (0, 1)
    };

    CardSchedule {
        card_id: prev.card_id.clone(),
        ease_factor,
        interval_days,
        repetitions,
        next_review: now.plus_days(interval_days),
        last_review: now,
    }
}

/// A card is due when its next review time has arrived.
pub fn is_due(schedule: &CardSchedule, now: Timestamp) -> bool {
    schedule.next_review <= now
}
