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

//! Scoring of answered questions. Deterministic and side-effect free,
//! so a quiz summary can be recomputed from stored results at any
//! time.

use serde::Deserialize;
use serde::Serialize;

/// The outcome of one answered question. Built once by the quiz flow
/// and never mutated afterwards.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionResult {
    MultipleChoice {
        /// The option key the learner picked; empty if the question
        /// was left unanswered.
        selected: String,
        correct: bool,
    },
    Matching {
        /// The left-to-right associations the learner made.
        selected_pairs: Vec<(String, String)>,
        /// How many of those associations match the answer key.
        correct_pairs: usize,
        total_pairs: usize,
    },
}

impl QuestionResult {
    /// Whether the question was answered fully correctly.
    pub fn is_correct(&self) -> bool {
        match self {
            QuestionResult::MultipleChoice { correct, .. } => *correct,
            QuestionResult::Matching {
                correct_pairs,
                total_pairs,
                ..
            } => *total_pairs > 0 && correct_pairs == total_pairs,
        }
    }
}

/// Score an answered question in `[0, 1]`.
///
/// Multiple-choice questions are all or nothing. Matching questions
/// earn partial credit proportional to the correctly matched pairs; a
/// degenerate question with no pairs scores zero rather than dividing
/// by zero.
pub fn score(result: &QuestionResult) -> f64 {
    match result {
        QuestionResult::MultipleChoice { correct, .. } => {
            if *correct {
                1.0
            } else {
                0.0
            }
        }
        QuestionResult::Matching {
            correct_pairs,
            total_pairs,
            ..
        } => {
            if *total_pairs == 0 {
                0.0
            } else {
                *correct_pairs as f64 / *total_pairs as f64
            }
        }
    }
}

/// The percentage summary of a finished quiz: the mean of the question
/// scores, scaled to `[0, 100]`. An empty quiz scores zero.
pub fn quiz_percentage(results: &[QuestionResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results.iter().map(score).sum();
    100.0 * total / results.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(correct: bool) -> QuestionResult {
        QuestionResult::MultipleChoice {
            selected: if correct { "a" } else { "b" }.to_string(),
            correct,
        }
    }

    fn matching(correct_pairs: usize, total_pairs: usize) -> QuestionResult {
        QuestionResult::Matching {
            selected_pairs: Vec::new(),
            correct_pairs,
            total_pairs,
        }
    }

    #[test]
    fn multiple_choice_all_or_nothing() {
        assert_eq!(score(&mc(true)), 1.0);
        assert_eq!(score(&mc(false)), 0.0);
    }

    #[test]
    fn unanswered_multiple_choice_scores_zero() {
        let result = QuestionResult::MultipleChoice {
            selected: String::new(),
            correct: false,
        };
        assert_eq!(score(&result), 0.0);
    }

    #[test]
    fn matching_partial_credit() {
        assert_eq!(score(&matching(3, 4)), 0.75);
        assert_eq!(score(&matching(0, 4)), 0.0);
        assert_eq!(score(&matching(4, 4)), 1.0);
    }

    #[test]
    fn matching_zero_pairs_is_zero_not_nan() {
        let s = score(&matching(0, 0));
        assert_eq!(s, 0.0);
        assert!(s.is_finite());
    }

    #[test]
    fn matching_correct_only_when_all_pairs_match() {
        assert!(matching(4, 4).is_correct());
        assert!(!matching(3, 4).is_correct());
        assert!(!matching(0, 0).is_correct());
    }

    #[test]
    fn scoring_is_deterministic() {
        let result = matching(2, 3);
        assert_eq!(score(&result), score(&result));
    }

    #[test]
    fn quiz_percentage_mean_of_scores() {
        let results = vec![mc(true), mc(false), matching(1, 2)];
        // (1 + 0 + 0.5) / 3 = 0.5
        assert_eq!(quiz_percentage(&results), 50.0);
    }

    #[test]
    fn empty_quiz_percentage_is_zero() {
        assert_eq!(quiz_percentage(&[]), 0.0);
    }
}
