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

use serde::Deserialize;
use serde::Serialize;

use crate::readiness::Mastery;
use crate::readiness::mastery;
use crate::types::timestamp::Timestamp;

/// The learner's progress on one (exam, objective) pair.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveProgress {
    pub exam_id: String,
    pub objective_id: String,
    /// Cached classification of `quiz_scores`. Recomputed on every
    /// write; readers must treat it as a cache, not a source of truth.
    pub mastery: Mastery,
    /// Historical quiz percentages, oldest first. Append-only.
    pub quiz_scores: Vec<f64>,
    pub flashcards_reviewed: u32,
    pub last_studied: Timestamp,
}

impl ObjectiveProgress {
    pub fn new(exam_id: impl Into<String>, objective_id: impl Into<String>, now: Timestamp) -> Self {
        Self {
            exam_id: exam_id.into(),
            objective_id: objective_id.into(),
            mastery: Mastery::NotStarted,
            quiz_scores: Vec::new(),
            flashcards_reviewed: 0,
            last_studied: now,
        }
    }
}

/// Append a quiz percentage to an objective's history, recomputing the
/// mastery classification from the full history.
pub fn record_quiz_score(prev: &ObjectiveProgress, percent: f64, now: Timestamp) -> ObjectiveProgress {
    let mut quiz_scores = prev.quiz_scores.clone();
    quiz_scores.push(percent);
    ObjectiveProgress {
        exam_id: prev.exam_id.clone(),
        objective_id: prev.objective_id.clone(),
        mastery: mastery(&quiz_scores),
        quiz_scores,
        flashcards_reviewed: prev.flashcards_reviewed,
        last_studied: now,
    }
}

/// Count one flashcard review against an objective.
pub fn record_flashcard_review(prev: &ObjectiveProgress, now: Timestamp) -> ObjectiveProgress {
    ObjectiveProgress {
        flashcards_reviewed: prev.flashcards_reviewed + 1,
        last_studied: now,
        ..prev.clone()
    }
}
