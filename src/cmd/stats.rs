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

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::catalog::Exam;
use crate::collection::Collection;
use crate::drill::due_drill_cards;
use crate::error::Fallible;
use crate::progress::ObjectiveProgress;
use crate::readiness::Mastery;
use crate::readiness::domain_score;
use crate::readiness::readiness_score;
use crate::streak::StreakData;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// JSON output.
    Json,
    /// Plain-text output.
    Text,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Json => write!(f, "json"),
            StatsFormat::Text => write!(f, "text"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    exams: Vec<ExamStats>,
    due_card_count: usize,
    streak: Option<StreakData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamStats {
    exam_id: String,
    exam_name: String,
    readiness: u32,
    domain_scores: BTreeMap<String, u32>,
    mastered_count: usize,
    in_progress_count: usize,
    not_started_count: usize,
}

/// Per-domain scores for one exam, from the recorded progress. Each
/// domain's score folds the score histories of its own objectives.
pub fn exam_domain_scores(exam: &Exam, progress: &[ObjectiveProgress]) -> BTreeMap<String, u32> {
    let mut scores = BTreeMap::new();
    for domain in &exam.domains {
        let histories: Vec<Vec<f64>> = domain
            .objectives
            .iter()
            .filter_map(|objective| {
                progress
                    .iter()
                    .find(|p| p.objective_id == objective.id)
                    .map(|p| p.quiz_scores.clone())
            })
            .collect();
        scores.insert(domain.id.clone(), domain_score(&histories));
    }
    scores
}

fn exam_stats(exam: &Exam, progress: &[ObjectiveProgress]) -> ExamStats {
    let domain_scores = exam_domain_scores(exam, progress);
    let readiness = readiness_score(&domain_scores, &exam.domain_weights());
    // Progress rows can outlive their objective when an exam file is
    // edited after studying; stale rows are not part of the breakdown.
    let objective_ids: HashSet<&str> = exam
        .domains
        .iter()
        .flat_map(|d| &d.objectives)
        .map(|o| o.id.as_str())
        .collect();
    let total_objectives = objective_ids.len();
    let mastered_count = progress
        .iter()
        .filter(|p| objective_ids.contains(p.objective_id.as_str()))
        .filter(|p| p.mastery == Mastery::Mastered)
        .count();
    let in_progress_count = progress
        .iter()
        .filter(|p| objective_ids.contains(p.objective_id.as_str()))
        .filter(|p| p.mastery == Mastery::InProgress)
        .count();
    ExamStats {
        exam_id: exam.id.clone(),
        exam_name: exam.name.clone(),
        readiness,
        domain_scores,
        mastered_count,
        in_progress_count,
        not_started_count: total_objectives - mastered_count - in_progress_count,
    }
}

pub fn print_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let coll = Collection::open(directory)?;

    let mut exams = Vec::new();
    for exam in &coll.catalog.exams {
        if let Some(wanted) = &coll.config.exam {
            if &exam.id != wanted {
                continue;
            }
        }
        let progress = coll.db.exam_progress(&exam.id)?;
        exams.push(exam_stats(exam, &progress));
    }
    let stats = Stats {
        exams,
        due_card_count: due_drill_cards(&coll, Timestamp::now())?.len(),
        streak: coll.db.get_streak()?,
    };

    match format {
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
        StatsFormat::Text => {
            for exam in &stats.exams {
                println!("{} ({})", exam.exam_name, exam.exam_id);
                println!("  Readiness: {}%", exam.readiness);
                for (domain_id, score) in &exam.domain_scores {
                    println!("  Domain {domain_id}: {score}%");
                }
                println!(
                    "  Objectives: {} mastered, {} in progress, {} not started",
                    exam.mastered_count, exam.in_progress_count, exam.not_started_count
                );
            }
            println!("Cards due: {}", stats.due_card_count);
            match &stats.streak {
                Some(streak) => println!(
                    "Streak: {} days (longest {})",
                    streak.current_streak, streak.longest_streak
                ),
                None => println!("Streak: no study recorded yet"),
            }
        }
    }
    Ok(())
}
