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

use crate::cmd::export::Export;
use crate::collection::Collection;
use crate::db::Database;
use crate::error::Fallible;

/// Restore progress state from a JSON export file into the study
/// directory's database.
pub fn import_progress(directory: Option<String>, file: &str) -> Fallible<()> {
    let coll = Collection::open(directory)?;
    let contents = std::fs::read_to_string(file)?;
    let export: Export = serde_json::from_str(&contents)?;
    restore_export(&coll.db, &export)?;
    println!(
        "Imported {} schedule snapshots, {} progress records, {} sessions.",
        export.schedules.len(),
        export.progress.len(),
        export.sessions.len()
    );
    Ok(())
}

pub fn restore_export(db: &Database, export: &Export) -> Fallible<()> {
    for schedule in &export.schedules {
        db.insert_schedule(schedule)?;
    }
    for progress in &export.progress {
        db.upsert_progress(progress)?;
    }
    if let Some(streak) = &export.streak {
        db.set_streak(streak)?;
    }
    for session in &export.sessions {
        let results: Vec<_> = session
            .results
            .iter()
            .map(|r| (r.question_id.clone(), r.result.clone(), r.score))
            .collect();
        db.save_session(&session.kind, session.started_at, session.ended_at, &results)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::cmd::export::gather_export;
    use crate::progress::ObjectiveProgress;
    use crate::progress::record_quiz_score;
    use crate::scoring::QuestionResult;
    use crate::srs::CardSchedule;
    use crate::srs::ReviewQuality;
    use crate::srs::next_schedule;
    use crate::streak::update_streak;
    use crate::types::timestamp::Timestamp;

    fn noon(d: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 6, d, 12, 0, 0).unwrap())
    }

    #[test]
    fn export_round_trips_into_a_fresh_database() {
        let db = Database::in_memory().unwrap();

        let schedule = next_schedule(
            &CardSchedule::new("card-1", noon(1)),
            ReviewQuality::Good,
            noon(1),
        );
        db.insert_schedule(&schedule).unwrap();

        let progress = record_quiz_score(
            &ObjectiveProgress::new("net-plus", "1.1", noon(1)),
            75.0,
            noon(1),
        );
        db.upsert_progress(&progress).unwrap();

        let streak = update_streak(None, noon(1).local_date());
        db.set_streak(&streak).unwrap();

        let result = QuestionResult::MultipleChoice {
            selected: "a".to_string(),
            correct: false,
        };
        db.save_session("quiz", noon(1), noon(1), &[("q1".to_string(), result, 0.0)])
            .unwrap();

        let export = gather_export(&db).unwrap();
        let json = serde_json::to_string_pretty(&export).unwrap();
        let parsed: Export = serde_json::from_str(&json).unwrap();

        let restored = Database::in_memory().unwrap();
        restore_export(&restored, &parsed).unwrap();

        assert_eq!(
            restored.latest_schedule("card-1").unwrap().unwrap(),
            schedule
        );
        assert_eq!(
            restored.get_progress("net-plus", "1.1").unwrap().unwrap(),
            progress
        );
        assert_eq!(restored.get_streak().unwrap().unwrap(), streak);
        let sessions = restored.all_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        let results = restored.session_results(sessions[0].session_id).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].question_id, "q1");
    }
}
