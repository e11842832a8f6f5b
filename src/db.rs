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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;

use crate::error::Fallible;
use crate::progress::ObjectiveProgress;
use crate::readiness::mastery;
use crate::scoring::QuestionResult;
use crate::srs::CardSchedule;
use crate::streak::StreakData;
use crate::types::timestamp::Timestamp;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn in_memory() -> Fallible<Self> {
        Self::new(":memory:")
    }

    /// The current schedule of a card: the latest snapshot in its
    /// append-only history. None for a card never reviewed.
    pub fn latest_schedule(&self, card_id: &str) -> Fallible<Option<CardSchedule>> {
        let conn = self.acquire();
        let sql = "select card_id, ease_factor, interval_days, repetitions, last_review, next_review from schedules where card_id = ? order by schedule_id desc limit 1;";
        let mut stmt = conn.prepare(sql)?;
        let schedule = stmt
            .query_row([card_id], |row| {
                Ok(CardSchedule {
                    card_id: row.get(0)?,
                    ease_factor: row.get(1)?,
                    interval_days: row.get(2)?,
                    repetitions: row.get(3)?,
                    last_review: row.get(4)?,
                    next_review: row.get(5)?,
                })
            })
            .optional()?;
        Ok(schedule)
    }

    /// Append a schedule snapshot to a card's history. Earlier
    /// snapshots are never modified.
    pub fn insert_schedule(&self, schedule: &CardSchedule) -> Fallible<()> {
        log::debug!(
            "Recording schedule for card {}: interval {} days.",
            schedule.card_id,
            schedule.interval_days
        );
        let conn = self.acquire();
        let sql = "insert into schedules (card_id, ease_factor, interval_days, repetitions, last_review, next_review) values (?, ?, ?, ?, ?, ?);";
        conn.execute(
            sql,
            (
                &schedule.card_id,
                schedule.ease_factor,
                schedule.interval_days,
                schedule.repetitions,
                schedule.last_review,
                schedule.next_review,
            ),
        )?;
        Ok(())
    }

    /// The full schedule history, oldest snapshot first.
    pub fn all_schedules(&self) -> Fallible<Vec<CardSchedule>> {
        let conn = self.acquire();
        let sql = "select card_id, ease_factor, interval_days, repetitions, last_review, next_review from schedules order by schedule_id;";
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(CardSchedule {
                card_id: row.get(0)?,
                ease_factor: row.get(1)?,
                interval_days: row.get(2)?,
                repetitions: row.get(3)?,
                last_review: row.get(4)?,
                next_review: row.get(5)?,
            })
        })?;
        let mut schedules = Vec::new();
        for row in rows {
            schedules.push(row?);
        }
        Ok(schedules)
    }

    /// Progress on one objective. The stored mastery column is a
    /// cache: the value handed back is always recomputed from the
    /// score history.
    pub fn get_progress(
        &self,
        exam_id: &str,
        objective_id: &str,
    ) -> Fallible<Option<ObjectiveProgress>> {
        let conn = self.acquire();
        let sql = "select exam_id, objective_id, quiz_scores, flashcards_reviewed, last_studied from objective_progress where exam_id = ? and objective_id = ?;";
        let mut stmt = conn.prepare(sql)?;
        let row = stmt
            .query_row([exam_id, objective_id], read_progress_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(row.into_progress()?)),
            None => Ok(None),
        }
    }

    /// All recorded progress for one exam.
    pub fn exam_progress(&self, exam_id: &str) -> Fallible<Vec<ObjectiveProgress>> {
        let conn = self.acquire();
        let sql = "select exam_id, objective_id, quiz_scores, flashcards_reviewed, last_studied from objective_progress where exam_id = ? order by objective_id;";
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([exam_id], read_progress_row)?;
        let mut progress = Vec::new();
        for row in rows {
            progress.push(row?.into_progress()?);
        }
        Ok(progress)
    }

    pub fn all_progress(&self) -> Fallible<Vec<ObjectiveProgress>> {
        let conn = self.acquire();
        let sql = "select exam_id, objective_id, quiz_scores, flashcards_reviewed, last_studied from objective_progress order by exam_id, objective_id;";
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], read_progress_row)?;
        let mut progress = Vec::new();
        for row in rows {
            progress.push(row?.into_progress()?);
        }
        Ok(progress)
    }

    pub fn upsert_progress(&self, progress: &ObjectiveProgress) -> Fallible<()> {
        let conn = self.acquire();
        let quiz_scores = serde_json::to_string(&progress.quiz_scores)?;
        let sql = "insert into objective_progress (exam_id, objective_id, mastery, quiz_scores, flashcards_reviewed, last_studied) values (?, ?, ?, ?, ?, ?) on conflict (exam_id, objective_id) do update set mastery = excluded.mastery, quiz_scores = excluded.quiz_scores, flashcards_reviewed = excluded.flashcards_reviewed, last_studied = excluded.last_studied;";
        conn.execute(
            sql,
            (
                &progress.exam_id,
                &progress.objective_id,
                progress.mastery,
                quiz_scores,
                progress.flashcards_reviewed,
                progress.last_studied,
            ),
        )?;
        Ok(())
    }

    pub fn get_streak(&self) -> Fallible<Option<StreakData>> {
        let conn = self.acquire();
        let sql =
            "select current_streak, longest_streak, last_study_date from streak where streak_id = 1;";
        let mut stmt = conn.prepare(sql)?;
        let streak = stmt
            .query_row([], |row| {
                Ok(StreakData {
                    current_streak: row.get(0)?,
                    longest_streak: row.get(1)?,
                    last_study_date: row.get(2)?,
                })
            })
            .optional()?;
        Ok(streak)
    }

    pub fn set_streak(&self, streak: &StreakData) -> Fallible<()> {
        let conn = self.acquire();
        let sql = "insert into streak (streak_id, current_streak, longest_streak, last_study_date) values (1, ?, ?, ?) on conflict (streak_id) do update set current_streak = excluded.current_streak, longest_streak = excluded.longest_streak, last_study_date = excluded.last_study_date;";
        conn.execute(
            sql,
            (
                streak.current_streak,
                streak.longest_streak,
                streak.last_study_date,
            ),
        )?;
        Ok(())
    }

    /// Save a finished study session and its question results.
    pub fn save_session(
        &self,
        kind: &str,
        started_at: Timestamp,
        ended_at: Timestamp,
        results: &[(String, QuestionResult, f64)],
    ) -> Fallible<()> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let session_id = insert_session(&tx, kind, started_at, ended_at)?;
        for (question_id, result, score) in results {
            insert_question_result(&tx, session_id, question_id, result, *score)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn all_sessions(&self) -> Fallible<Vec<SessionRow>> {
        let conn = self.acquire();
        let sql = "select session_id, kind, started_at, ended_at from sessions order by session_id;";
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(SessionRow {
                session_id: row.get(0)?,
                kind: row.get(1)?,
                started_at: row.get(2)?,
                ended_at: row.get(3)?,
            })
        })?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    pub fn session_results(&self, session_id: SessionId) -> Fallible<Vec<ResultRow>> {
        let conn = self.acquire();
        let sql = "select question_id, result, score from question_results where session_id = ? order by result_id;";
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([session_id], |row| {
            let question_id: String = row.get(0)?;
            let result: String = row.get(1)?;
            let score: f64 = row.get(2)?;
            Ok((question_id, result, score))
        })?;
        let mut results = Vec::new();
        for row in rows {
            let (question_id, result, score) = row?;
            let result: QuestionResult = serde_json::from_str(&result)?;
            results.push(ResultRow {
                question_id,
                result,
                score,
            });
        }
        Ok(results)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

pub type SessionId = i64;

pub struct SessionRow {
    pub session_id: SessionId,
    pub kind: String,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
}

pub struct ResultRow {
    pub question_id: String,
    pub result: QuestionResult,
    pub score: f64,
}

struct ProgressRow {
    exam_id: String,
    objective_id: String,
    quiz_scores: String,
    flashcards_reviewed: u32,
    last_studied: Timestamp,
}

impl ProgressRow {
    fn into_progress(self) -> Fallible<ObjectiveProgress> {
        let quiz_scores: Vec<f64> = serde_json::from_str(&self.quiz_scores)?;
        Ok(ObjectiveProgress {
            exam_id: self.exam_id,
            objective_id: self.objective_id,
            mastery: mastery(&quiz_scores),
            quiz_scores,
            flashcards_reviewed: self.flashcards_reviewed,
            last_studied: self.last_studied,
        })
    }
}

fn read_progress_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProgressRow> {
    Ok(ProgressRow {
        exam_id: row.get(0)?,
        objective_id: row.get(1)?,
        quiz_scores: row.get(2)?,
        flashcards_reviewed: row.get(3)?,
        last_studied: row.get(4)?,
    })
}

fn insert_session(
    tx: &Transaction,
    kind: &str,
    started_at: Timestamp,
    ended_at: Timestamp,
) -> Fallible<SessionId> {
    let sql = "insert into sessions (kind, started_at, ended_at) values (?, ?, ?) returning session_id;";
    let session_id: SessionId =
        tx.query_row(sql, (kind, started_at, ended_at), |row| row.get(0))?;
    Ok(session_id)
}

fn insert_question_result(
    tx: &Transaction,
    session_id: SessionId,
    question_id: &str,
    result: &QuestionResult,
    score: f64,
) -> Fallible<()> {
    let result = serde_json::to_string(result)?;
    let sql = "insert into question_results (session_id, question_id, result, score) values (?, ?, ?, ?);";
    tx.execute(sql, (session_id, question_id, result, score))?;
    Ok(())
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["schedules"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::progress::record_quiz_score;
    use crate::readiness::Mastery;
    use crate::srs::ReviewQuality;
    use crate::srs::next_schedule;
    use crate::streak::update_streak;

    fn noon(d: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 6, d, 12, 0, 0).unwrap())
    }

    #[test]
    fn schedule_history_is_append_only() {
        let db = Database::in_memory().unwrap();
        assert!(db.latest_schedule("card-1").unwrap().is_none());

        let s0 = CardSchedule::new("card-1", noon(1));
        let s1 = next_schedule(&s0, ReviewQuality::Good, noon(1));
        db.insert_schedule(&s1).unwrap();
        let s2 = next_schedule(&s1, ReviewQuality::Good, noon(2));
        db.insert_schedule(&s2).unwrap();

        let latest = db.latest_schedule("card-1").unwrap().unwrap();
        assert_eq!(latest, s2);
        assert_eq!(db.all_schedules().unwrap().len(), 2);
    }

    #[test]
    fn progress_round_trips_and_recomputes_mastery() {
        let db = Database::in_memory().unwrap();
        let progress = ObjectiveProgress::new("net-plus", "1.1", noon(1));
        let progress = record_quiz_score(&progress, 90.0, noon(1));
        db.upsert_progress(&progress).unwrap();

        let loaded = db.get_progress("net-plus", "1.1").unwrap().unwrap();
        assert_eq!(loaded, progress);
        assert_eq!(loaded.mastery, Mastery::Mastered);

        // A second write replaces the row.
        let progress = record_quiz_score(&progress, 40.0, noon(2));
        db.upsert_progress(&progress).unwrap();
        let loaded = db.get_progress("net-plus", "1.1").unwrap().unwrap();
        assert_eq!(loaded.quiz_scores, vec![90.0, 40.0]);
        assert_eq!(loaded.mastery, Mastery::InProgress);
        assert_eq!(db.exam_progress("net-plus").unwrap().len(), 1);
    }

    #[test]
    fn streak_singleton() {
        let db = Database::in_memory().unwrap();
        assert!(db.get_streak().unwrap().is_none());

        let streak = update_streak(None, noon(1).local_date());
        db.set_streak(&streak).unwrap();
        assert_eq!(db.get_streak().unwrap().unwrap(), streak);

        let streak = update_streak(Some(&streak), noon(2).local_date());
        db.set_streak(&streak).unwrap();
        let loaded = db.get_streak().unwrap().unwrap();
        assert_eq!(loaded.current_streak, 2);
    }

    #[test]
    fn sessions_and_results_round_trip() {
        let db = Database::in_memory().unwrap();
        let result = QuestionResult::MultipleChoice {
            selected: "b".to_string(),
            correct: true,
        };
        let results = vec![("q1".to_string(), result.clone(), 1.0)];
        db.save_session("quiz", noon(1), noon(1), &results).unwrap();

        let sessions = db.all_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].kind, "quiz");
        let stored = db.session_results(sessions[0].session_id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].question_id, "q1");
        assert_eq!(stored[0].result, result);
        assert_eq!(stored[0].score, 1.0);
    }
}
