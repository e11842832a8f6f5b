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

//! The diagnostic placement heuristic. This seeds a brand-new
//! learner's score histories from a short one-question-per-domain
//! diagnostic, so the dashboard is not a wall of zeroes on day one.
//!
//! This is a bootstrap heuristic, separate from the question scorer on
//! purpose: it guesses a plausible starting percentage, it does not
//! measure anything.

/// The assumed starting score for a domain the diagnostic has no
/// signal about.
const BASELINE: f64 = 70.0;

/// How far one diagnostic answer moves the seed away from the
/// baseline.
const ADJUSTMENT: f64 = 15.0;

/// The seed percentage for an objective whose domain's diagnostic
/// question was answered correctly (85) or incorrectly (55).
pub fn placement_score(correct: bool) -> f64 {
    if correct {
        BASELINE + ADJUSTMENT
    } else {
        BASELINE - ADJUSTMENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_straddle_the_baseline() {
        assert_eq!(placement_score(true), 85.0);
        assert_eq!(placement_score(false), 55.0);
    }

    #[test]
    fn incorrect_seed_stays_below_mastery_threshold() {
        assert!(placement_score(false) < 80.0);
    }
}
