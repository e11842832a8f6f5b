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

//! Export of the full progress state as one JSON document, for manual
//! transfer between machines. Everything the tool ever persists
//! round-trips through this format without loss.

use serde::Deserialize;
use serde::Serialize;

use crate::collection::Collection;
use crate::db::Database;
use crate::error::Fallible;
use crate::progress::ObjectiveProgress;
use crate::scoring::QuestionResult;
use crate::srs::CardSchedule;
use crate::streak::StreakData;
use crate::types::timestamp::Timestamp;

pub fn export_progress(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::open(directory)?;
    let export = gather_export(&coll.db)?;
    let json = serde_json::to_string_pretty(&export)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    /// Full schedule history, oldest snapshot first.
    pub schedules: Vec<CardSchedule>,
    pub progress: Vec<ObjectiveProgress>,
    pub streak: Option<StreakData>,
    pub sessions: Vec<SessionExport>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub kind: String,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub results: Vec<ResultExport>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultExport {
    pub question_id: String,
    pub result: QuestionResult,
    pub score: f64,
}

pub fn gather_export(db: &Database) -> Fallible<Export> {
    let schedules = db.all_schedules()?;
    let progress = db.all_progress()?;
    let streak = db.get_streak()?;
    let mut sessions = Vec::new();
    for session in db.all_sessions()? {
        let results = db
            .session_results(session.session_id)?
            .into_iter()
            .map(|row| ResultExport {
                question_id: row.question_id,
                result: row.result,
                score: row.score,
            })
            .collect();
        sessions.push(SessionExport {
            kind: session.kind,
            started_at: session.started_at,
            ended_at: session.ended_at,
            results,
        });
    }
    Ok(Export {
        schedules,
        progress,
        streak,
        sessions,
    })
}
