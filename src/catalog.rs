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

//! The static content catalog: exams authored as TOML files in the
//! study directory. The catalog is read-only at runtime; progress
//! lives in the database, keyed by the ids declared here.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::Fallible;
use crate::error::fail;

/// The name of the optional config file, which is not an exam file.
const CONFIG_FILE: &str = "certdrill.toml";

#[derive(Clone, Debug, Deserialize)]
pub struct Exam {
    pub id: String,
    pub name: String,
    #[serde(rename = "domain", default)]
    pub domains: Vec<Domain>,
    #[serde(rename = "glossary", default)]
    pub glossary: Vec<GlossaryTerm>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Domain {
    pub id: String,
    pub name: String,
    /// This domain's share of the exam. Weights are expected to sum
    /// to 100 across an exam's domains.
    pub weight: u32,
    #[serde(rename = "objective", default)]
    pub objectives: Vec<Objective>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Objective {
    pub id: String,
    pub title: String,
    #[serde(rename = "flashcard", default)]
    pub flashcards: Vec<Flashcard>,
    #[serde(rename = "question", default)]
    pub questions: Vec<Question>,
}

/// Flashcard text is Markdown; the drill renders it to HTML.
#[derive(Clone, Debug, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Question {
    MultipleChoice {
        id: String,
        prompt: String,
        /// Option key to option text. Keys are what the learner
        /// selects and what `answer` names.
        options: BTreeMap<String, String>,
        answer: String,
        #[serde(default)]
        explanation: Option<String>,
    },
    Matching {
        id: String,
        prompt: String,
        #[serde(rename = "pair", default)]
        pairs: Vec<MatchPair>,
    },
}

impl Question {
    pub fn id(&self) -> &str {
        match self {
            Question::MultipleChoice { id, .. } => id,
            Question::Matching { id, .. } => id,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GlossaryTerm {
    pub term: String,
    pub definition: String,
}

/// A flashcard together with the exam and objective it belongs to.
#[derive(Clone, Debug)]
pub struct DrillCard {
    pub exam_id: String,
    pub objective_id: String,
    pub card: Flashcard,
}

pub struct Catalog {
    pub exams: Vec<Exam>,
}

impl Catalog {
    /// Load every exam file under `directory`. Every `*.toml` file
    /// other than the config file is an exam file.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let mut exams = Vec::new();
        for entry in WalkDir::new(directory) {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().is_none_or(|ext| ext != "toml") {
                continue;
            }
            if path.file_name().is_some_and(|name| name == CONFIG_FILE) {
                continue;
            }
            log::debug!("Loading exam file: {}", path.display());
            let contents = std::fs::read_to_string(path)?;
            let exam = parse_exam(&contents)?;
            exams.push(exam);
        }
        exams.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(Self { exams })
    }

    pub fn find_exam(&self, exam_id: &str) -> Fallible<&Exam> {
        self.exams
            .iter()
            .find(|exam| exam.id == exam_id)
            .ok_or_else(|| crate::error::ErrorReport::new(format!("no such exam: {exam_id}")))
    }

    /// All flashcards across all exams, tagged with their exam and
    /// objective ids.
    pub fn drill_cards(&self) -> Vec<DrillCard> {
        let mut cards = Vec::new();
        for exam in &self.exams {
            for domain in &exam.domains {
                for objective in &domain.objectives {
                    for card in &objective.flashcards {
                        cards.push(DrillCard {
                            exam_id: exam.id.clone(),
                            objective_id: objective.id.clone(),
                            card: card.clone(),
                        });
                    }
                }
            }
        }
        cards
    }
}

impl Exam {
    /// Domain id to weight, as declared in the exam file.
    pub fn domain_weights(&self) -> BTreeMap<String, u32> {
        self.domains
            .iter()
            .map(|domain| (domain.id.clone(), domain.weight))
            .collect()
    }

    pub fn find_objective(&self, objective_id: &str) -> Fallible<&Objective> {
        for domain in &self.domains {
            for objective in &domain.objectives {
                if objective.id == objective_id {
                    return Ok(objective);
                }
            }
        }
        fail(format!("no such objective: {objective_id}"))
    }
}

/// Parse one exam file and validate its invariants: unique ids, a
/// multiple-choice answer key that names one of its options, matching
/// questions with at least one pair. Weights not summing to 100 are
/// logged but tolerated, since the readiness score normalizes by the
/// weight sum anyway.
pub fn parse_exam(contents: &str) -> Fallible<Exam> {
    let exam: Exam = toml::from_str(contents)?;
    let weight_sum: u32 = exam.domains.iter().map(|d| d.weight).sum();
    if weight_sum != 100 {
        log::warn!(
            "Exam {}: domain weights sum to {weight_sum}, not 100.",
            exam.id
        );
    }
    let mut domain_ids = HashSet::new();
    let mut objective_ids = HashSet::new();
    let mut content_ids = HashSet::new();
    for domain in &exam.domains {
        if !domain_ids.insert(&domain.id) {
            return fail(format!("duplicate domain id: {}", domain.id));
        }
        for objective in &domain.objectives {
            if !objective_ids.insert(&objective.id) {
                return fail(format!("duplicate objective id: {}", objective.id));
            }
            for card in &objective.flashcards {
                if !content_ids.insert(card.id.as_str()) {
                    return fail(format!("duplicate flashcard id: {}", card.id));
                }
            }
            for question in &objective.questions {
                if !content_ids.insert(question.id()) {
                    return fail(format!("duplicate question id: {}", question.id()));
                }
                match question {
                    Question::MultipleChoice {
                        id,
                        options,
                        answer,
                        ..
                    } => {
                        if !options.contains_key(answer) {
                            return fail(format!(
                                "question {id}: answer key '{answer}' is not an option"
                            ));
                        }
                    }
                    Question::Matching { id, pairs, .. } => {
                        if pairs.is_empty() {
                            return fail(format!("question {id}: matching question has no pairs"));
                        }
                        // The quiz labels the right-hand column a..z.
                        if pairs.len() > 26 {
                            return fail(format!(
                                "question {id}: matching question has more than 26 pairs"
                            ));
                        }
                    }
                }
            }
        }
    }
    Ok(exam)
}
