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

//! Terminal quiz and diagnostic modes.

use std::io::Write;

use crate::catalog::MatchPair;
use crate::catalog::Question;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::placement::placement_score;
use crate::progress::ObjectiveProgress;
use crate::progress::record_quiz_score;
use crate::scoring::QuestionResult;
use crate::scoring::quiz_percentage;
use crate::scoring::score;
use crate::streak::update_streak;
use crate::types::timestamp::Timestamp;

/// Build the result of a multiple-choice answer. An empty selection
/// means the question was skipped, and is never correct.
pub fn evaluate_multiple_choice(answer_key: &str, selected: &str) -> QuestionResult {
    QuestionResult::MultipleChoice {
        selected: selected.to_string(),
        correct: !selected.is_empty() && selected == answer_key,
    }
}

/// Build the result of a matching answer: count how many of the
/// learner's associations appear in the answer key.
pub fn evaluate_matching(key: &[MatchPair], selected: &[(String, String)]) -> QuestionResult {
    let correct_pairs = selected
        .iter()
        .filter(|(left, right)| {
            key.iter()
                .any(|pair| &pair.left == left && &pair.right == right)
        })
        .count();
    QuestionResult::Matching {
        selected_pairs: selected.to_vec(),
        correct_pairs,
        total_pairs: key.len(),
    }
}

/// Run a terminal quiz over one objective's questions, then record
/// the summary percentage against the objective and update the streak.
pub fn run_quiz(coll: &Collection, exam_id: &str, objective_id: &str) -> Fallible<()> {
    let exam = coll.catalog.find_exam(exam_id)?;
    let objective = exam.find_objective(objective_id)?;
    if objective.questions.is_empty() {
        return fail(format!("objective {objective_id} has no questions."));
    }

    println!("{}: {}", objective.id, objective.title);
    let started_at = Timestamp::now();
    let mut results: Vec<(String, QuestionResult, f64)> = Vec::new();
    for question in &objective.questions {
        let result = ask_question(question)?;
        let question_score = score(&result);
        if result.is_correct() {
            println!("Correct.");
        } else {
            println!("Incorrect.");
            if let Question::MultipleChoice {
                explanation: Some(explanation),
                ..
            } = question
            {
                println!("{explanation}");
            }
        }
        println!();
        results.push((question.id().to_string(), result, question_score));
    }
    let ended_at = Timestamp::now();

    let answers: Vec<QuestionResult> = results.iter().map(|(_, r, _)| r.clone()).collect();
    let percent = quiz_percentage(&answers);
    println!("Score: {percent:.0}%");

    let prev = coll
        .db
        .get_progress(exam_id, objective_id)?
        .unwrap_or_else(|| ObjectiveProgress::new(exam_id, objective_id, started_at));
    let progress = record_quiz_score(&prev, percent, ended_at);
    coll.db.upsert_progress(&progress)?;

    let streak = update_streak(coll.db.get_streak()?.as_ref(), ended_at.local_date());
    coll.db.set_streak(&streak)?;

    coll.db.save_session("quiz", started_at, ended_at, &results)?;
    Ok(())
}

/// Run the one-question-per-domain diagnostic and seed score
/// histories via the placement heuristic. Objectives that already
/// have quiz history are left alone.
pub fn run_diagnostic(coll: &Collection, exam_id: &str) -> Fallible<()> {
    let exam = coll.catalog.find_exam(exam_id)?;
    let started_at = Timestamp::now();
    let mut results: Vec<(String, QuestionResult, f64)> = Vec::new();
    let mut seeded = 0;
    for domain in &exam.domains {
        // The first multiple-choice question in the domain stands in
        // for the whole domain.
        let Some((objective, question)) = domain.objectives.iter().find_map(|objective| {
            objective
                .questions
                .iter()
                .find(|q| matches!(q, Question::MultipleChoice { .. }))
                .map(|q| (objective, q))
        }) else {
            log::info!(
                "Domain {} has no multiple-choice questions; skipping.",
                domain.id
            );
            continue;
        };

        println!("[{}] {}", domain.id, domain.name);
        let result = ask_question(question)?;
        let question_score = score(&result);
        println!();
        results.push((question.id().to_string(), result.clone(), question_score));

        let now = Timestamp::now();
        match coll.db.get_progress(exam_id, &objective.id)? {
            Some(existing) if !existing.quiz_scores.is_empty() => {
                log::info!(
                    "Objective {} already has quiz history; not seeding.",
                    objective.id
                );
            }
            _ => {
                let seed = placement_score(result.is_correct());
                let fresh = ObjectiveProgress::new(exam_id, &objective.id, now);
                let progress = record_quiz_score(&fresh, seed, now);
                coll.db.upsert_progress(&progress)?;
                seeded += 1;
            }
        }
    }
    let ended_at = Timestamp::now();
    if results.is_empty() {
        return fail("the exam has no multiple-choice questions to diagnose with.");
    }
    println!("Seeded {seeded} objectives.");

    let streak = update_streak(coll.db.get_streak()?.as_ref(), ended_at.local_date());
    coll.db.set_streak(&streak)?;
    coll.db
        .save_session("diagnostic", started_at, ended_at, &results)?;
    Ok(())
}

fn ask_question(question: &Question) -> Fallible<QuestionResult> {
    match question {
        Question::MultipleChoice {
            prompt,
            options,
            answer,
            ..
        } => {
            println!("{prompt}");
            for (key, text) in options {
                println!("  {key}) {text}");
            }
            let selected = read_answer("Answer (blank to skip): ")?;
            Ok(evaluate_multiple_choice(answer, &selected))
        }
        Question::Matching { prompt, pairs, .. } => {
            println!("{prompt}");
            let mut rights: Vec<&str> = pairs.iter().map(|p| p.right.as_str()).collect();
            rights.sort_unstable();
            for (i, right) in rights.iter().enumerate() {
                let label = (b'a' + i as u8) as char;
                println!("  {label}) {right}");
            }
            let mut selected = Vec::new();
            for pair in pairs {
                let choice = read_answer(&format!("Match '{}': ", pair.left))?;
                let index = choice
                    .bytes()
                    .next()
                    .map(|b| b.wrapping_sub(b'a') as usize);
                if let Some(index) = index {
                    if let Some(right) = rights.get(index) {
                        selected.push((pair.left.clone(), right.to_string()));
                    }
                }
            }
            Ok(evaluate_matching(pairs, &selected))
        }
    }
}

fn read_answer(prompt: &str) -> Fallible<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_lowercase())
}
