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

//! End-to-end flow over a real study directory: load content, review
//! flashcards, take a quiz, check the aggregated stats, and round-trip
//! the progress state through export and import.

use std::path::Path;

use certdrill::cmd::export::gather_export;
use certdrill::cmd::import::restore_export;
use certdrill::cmd::stats::exam_domain_scores;
use certdrill::collection::Collection;
use certdrill::db::Database;
use certdrill::drill::due_drill_cards;
use certdrill::progress::ObjectiveProgress;
use certdrill::progress::record_flashcard_review;
use certdrill::progress::record_quiz_score;
use certdrill::readiness::Mastery;
use certdrill::readiness::readiness_score;
use certdrill::scoring::QuestionResult;
use certdrill::scoring::quiz_percentage;
use certdrill::srs::CardSchedule;
use certdrill::srs::ReviewQuality;
use certdrill::srs::next_schedule;
use certdrill::streak::update_streak;
use certdrill::types::timestamp::Timestamp;

const EXAM: &str = r#"
id = "net-plus"
name = "Networking Fundamentals"

[[domain]]
id = "1.0"
name = "Networking Concepts"
weight = 40

[[domain.objective]]
id = "1.1"
title = "The OSI model"

[[domain.objective.flashcard]]
id = "osi-layers"
front = "How many layers does the OSI model have?"
back = "Seven."

[[domain.objective.flashcard]]
id = "osi-l3"
front = "Which OSI layer handles routing?"
back = "Layer 3, the network layer."

[[domain.objective.question]]
kind = "multiple-choice"
id = "q-osi-1"
prompt = "Which layer handles routing?"
options = { a = "Layer 2", b = "Layer 3" }
answer = "b"

[[domain.objective.question]]
kind = "matching"
id = "q-osi-2"
prompt = "Match the protocol to its layer."

[[domain.objective.question.pair]]
left = "TCP"
right = "Transport"

[[domain.objective.question.pair]]
left = "IP"
right = "Network"

[[domain]]
id = "2.0"
name = "Network Implementations"
weight = 60

[[domain.objective]]
id = "2.1"
title = "Routing technologies"

[[domain.objective.flashcard]]
id = "ospf"
front = "What kind of routing protocol is OSPF?"
back = "A link-state interior gateway protocol."
"#;

fn write_study_directory(dir: &Path) {
    std::fs::write(dir.join("exam.toml"), EXAM).unwrap();
}

#[test]
fn full_study_flow() {
    let dir = tempfile::tempdir().unwrap();
    write_study_directory(dir.path());
    let coll = Collection::open(Some(dir.path().display().to_string())).unwrap();
    assert_eq!(coll.catalog.exams.len(), 1);

    let now = Timestamp::now();

    // Every card is new, so every card is due.
    let due = due_drill_cards(&coll, now).unwrap();
    assert_eq!(due.len(), 3);

    // Review each due card with Good, the way the drill does.
    for card in &due {
        let prev = coll
            .db
            .latest_schedule(&card.card.id)
            .unwrap()
            .unwrap_or_else(|| CardSchedule::new(&card.card.id, now));
        let next = next_schedule(&prev, ReviewQuality::Good, now);
        coll.db.insert_schedule(&next).unwrap();

        let progress = coll
            .db
            .get_progress(&card.exam_id, &card.objective_id)
            .unwrap()
            .unwrap_or_else(|| ObjectiveProgress::new(&card.exam_id, &card.objective_id, now));
        coll.db
            .upsert_progress(&record_flashcard_review(&progress, now))
            .unwrap();

        let streak = update_streak(coll.db.get_streak().unwrap().as_ref(), now.local_date());
        coll.db.set_streak(&streak).unwrap();
    }

    // Everything just reviewed is scheduled a day out, so nothing is
    // due any more.
    assert!(due_drill_cards(&coll, now).unwrap().is_empty());
    let streak = coll.db.get_streak().unwrap().unwrap();
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.longest_streak, 1);

    // A perfect quiz on objective 1.1 and a mediocre one on 2.1.
    let perfect = vec![
        QuestionResult::MultipleChoice {
            selected: "b".to_string(),
            correct: true,
        },
        QuestionResult::Matching {
            selected_pairs: vec![
                ("TCP".to_string(), "Transport".to_string()),
                ("IP".to_string(), "Network".to_string()),
            ],
            correct_pairs: 2,
            total_pairs: 2,
        },
    ];
    let percent = quiz_percentage(&perfect);
    assert_eq!(percent, 100.0);
    let progress = coll.db.get_progress("net-plus", "1.1").unwrap().unwrap();
    let progress = record_quiz_score(&progress, percent, now);
    coll.db.upsert_progress(&progress).unwrap();

    let progress = coll.db.get_progress("net-plus", "2.1").unwrap().unwrap();
    let progress = record_quiz_score(&progress, 50.0, now);
    coll.db.upsert_progress(&progress).unwrap();

    // Mastery classifications come back recomputed from the history.
    let progress = coll.db.get_progress("net-plus", "1.1").unwrap().unwrap();
    assert_eq!(progress.mastery, Mastery::Mastered);
    let progress = coll.db.get_progress("net-plus", "2.1").unwrap().unwrap();
    assert_eq!(progress.mastery, Mastery::InProgress);

    // Domain scores and readiness.
    let exam = coll.catalog.find_exam("net-plus").unwrap();
    let records = coll.db.exam_progress("net-plus").unwrap();
    let scores = exam_domain_scores(exam, &records);
    assert_eq!(scores.get("1.0"), Some(&100));
    assert_eq!(scores.get("2.0"), Some(&50));
    // (100 * 40 + 50 * 60) / 100 = 70.
    assert_eq!(readiness_score(&scores, &exam.domain_weights()), 70);

    // The whole state survives an export/import round trip.
    let export = gather_export(&coll.db).unwrap();
    let json = serde_json::to_string_pretty(&export).unwrap();
    let parsed = serde_json::from_str(&json).unwrap();
    let other = Database::new(
        dir.path()
            .join("restored.db")
            .to_str()
            .unwrap(),
    )
    .unwrap();
    restore_export(&other, &parsed).unwrap();
    assert_eq!(other.all_schedules().unwrap().len(), 3);
    assert_eq!(other.all_progress().unwrap().len(), 2);
    assert_eq!(other.get_streak().unwrap().unwrap(), streak);
}

#[test]
fn reopening_the_collection_preserves_progress() {
    let dir = tempfile::tempdir().unwrap();
    write_study_directory(dir.path());
    let now = Timestamp::now();

    {
        let coll = Collection::open(Some(dir.path().display().to_string())).unwrap();
        let schedule = next_schedule(
            &CardSchedule::new("osi-layers", now),
            ReviewQuality::Easy,
            now,
        );
        coll.db.insert_schedule(&schedule).unwrap();
    }

    let coll = Collection::open(Some(dir.path().display().to_string())).unwrap();
    let schedule = coll.db.latest_schedule("osi-layers").unwrap().unwrap();
    assert_eq!(schedule.repetitions, 1);
    assert_eq!(schedule.interval_days, 1);
}
