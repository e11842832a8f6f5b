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

use crate::collection::Collection;
use crate::error::Fallible;

/// Load and validate a study directory, printing a short inventory.
/// Fails if any exam file is malformed.
pub fn check_directory(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::open(directory)?;
    for exam in &coll.catalog.exams {
        let domains = exam.domains.len();
        let objectives: usize = exam.domains.iter().map(|d| d.objectives.len()).sum();
        let flashcards: usize = exam
            .domains
            .iter()
            .flat_map(|d| &d.objectives)
            .map(|o| o.flashcards.len())
            .sum();
        let questions: usize = exam
            .domains
            .iter()
            .flat_map(|d| &d.objectives)
            .map(|o| o.questions.len())
            .sum();
        println!(
            "{}: {domains} domains, {objectives} objectives, {flashcards} flashcards, {questions} questions, {} glossary terms",
            exam.id,
            exam.glossary.len()
        );
    }
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonexistent_directory_fails() {
        let result = check_directory(Some("./derpherp".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_directory(Some(dir.path().display().to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn valid_directory_passes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("exam.toml"),
            "id = \"x\"\nname = \"X\"\n\n[[domain]]\nid = \"1.0\"\nname = \"D\"\nweight = 100\n",
        )
        .unwrap();
        let result = check_directory(Some(dir.path().display().to_string()));
        assert!(result.is_ok());
    }
}
