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

use crate::types::date::Date;

/// The learner's study streak. One record per learner, updated at most
/// once per calendar day.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakData {
    pub current_streak: u32,
    /// Invariant: `longest_streak >= current_streak`, and it never
    /// decreases across updates.
    pub longest_streak: u32,
    pub last_study_date: Date,
}

/// Fold a study action on `today` into the streak state.
///
/// Repeated calls within the same day are idempotent, so any number of
/// study actions on one day count once. A gap of two or more days
/// resets the current streak; so does a clock running backwards, which
/// is treated as a gap rather than an error.
pub fn update_streak(prev: Option<&StreakData>, today: Date) -> StreakData {
    let Some(prev) = prev else {
        return StreakData {
            current_streak: 1,
            longest_streak: 1,
            last_study_date: today,
        };
    };
    match prev.last_study_date.days_until(today) {
        0 => *prev,
        1 => {
            let current_streak = prev.current_streak + 1;
            StreakData {
                current_streak,
                longest_streak: prev.longest_streak.max(current_streak),
                last_study_date: today,
            }
        }
        _ => StreakData {
            current_streak: 1,
            longest_streak: prev.longest_streak,
            last_study_date: today,
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn first_study_action() {
        let streak = update_streak(None, date(2025, 6, 1));
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 1);
        assert_eq!(streak.last_study_date, date(2025, 6, 1));
    }

    #[test]
    fn same_day_is_idempotent() {
        let first = update_streak(None, date(2025, 6, 1));
        let second = update_streak(Some(&first), date(2025, 6, 1));
        assert_eq!(second, first);
        let third = update_streak(Some(&second), date(2025, 6, 1));
        assert_eq!(third, first);
    }

    #[test]
    fn consecutive_day_increments() {
        let day1 = update_streak(None, date(2025, 6, 1));
        let day2 = update_streak(Some(&day1), date(2025, 6, 2));
        assert_eq!(day2.current_streak, 2);
        assert_eq!(day2.longest_streak, 2);
        assert_eq!(day2.last_study_date, date(2025, 6, 2));
    }

    #[test]
    fn gap_resets_current_but_not_longest() {
        let mut streak = update_streak(None, date(2025, 6, 1));
        streak = update_streak(Some(&streak), date(2025, 6, 2));
        streak = update_streak(Some(&streak), date(2025, 6, 3));
        assert_eq!(streak.current_streak, 3);
        streak = update_streak(Some(&streak), date(2025, 6, 10));
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 3);
    }

    #[test]
    fn clock_skew_resets_rather_than_panicking() {
        let streak = StreakData {
            current_streak: 5,
            longest_streak: 5,
            last_study_date: date(2025, 6, 10),
        };
        let after = update_streak(Some(&streak), date(2025, 6, 8));
        assert_eq!(after.current_streak, 1);
        assert_eq!(after.longest_streak, 5);
        assert_eq!(after.last_study_date, date(2025, 6, 8));
    }

    #[test]
    fn longest_is_monotone_over_any_sequence() {
        let days = [
            date(2025, 6, 1),
            date(2025, 6, 2),
            date(2025, 6, 3),
            date(2025, 6, 3),
            date(2025, 6, 9),
            date(2025, 6, 10),
            date(2025, 6, 5),
            date(2025, 6, 6),
        ];
        let mut streak: Option<StreakData> = None;
        let mut longest_seen = 0;
        for day in days {
            let next = update_streak(streak.as_ref(), day);
            assert!(next.longest_streak >= longest_seen);
            assert!(next.longest_streak >= next.current_streak);
            longest_seen = next.longest_streak;
            streak = Some(next);
        }
    }
}
