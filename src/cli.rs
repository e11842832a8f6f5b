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

use clap::Parser;

use crate::cmd::check::check_directory;
use crate::cmd::export::export_progress;
use crate::cmd::import::import_progress;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::collection::Collection;
use crate::drill::drill;
use crate::error::Fallible;
use crate::quiz::run_diagnostic;
use crate::quiz::run_quiz;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Review due flashcards in the browser.
    Drill {
        /// Optional path to the study directory.
        directory: Option<String>,
    },
    /// Answer one objective's questions in the terminal.
    Quiz {
        /// The exam id.
        exam: String,
        /// The objective id.
        objective: String,
        /// Optional path to the study directory.
        directory: Option<String>,
    },
    /// Take a short diagnostic to seed initial progress.
    Diagnose {
        /// The exam id.
        exam: String,
        /// Optional path to the study directory.
        directory: Option<String>,
    },
    /// Show readiness, domain scores, and streak.
    Stats {
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
        /// Optional path to the study directory.
        directory: Option<String>,
    },
    /// Validate the exam files in a study directory.
    Check {
        /// Optional path to the study directory.
        directory: Option<String>,
    },
    /// Write all progress state to stdout as JSON.
    Export {
        /// Optional path to the study directory.
        directory: Option<String>,
    },
    /// Restore progress state from a JSON export.
    Import {
        /// Path to the export file.
        file: String,
        /// Optional path to the study directory.
        directory: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill { directory } => {
            let coll = Collection::open(directory)?;
            drill(coll).await
        }
        Command::Quiz {
            exam,
            objective,
            directory,
        } => {
            let coll = Collection::open(directory)?;
            run_quiz(&coll, &exam, &objective)
        }
        Command::Diagnose { exam, directory } => {
            let coll = Collection::open(directory)?;
            run_diagnostic(&coll, &exam)
        }
        Command::Stats { format, directory } => print_stats(directory, format),
        Command::Check { directory } => check_directory(directory),
        Command::Export { directory } => export_progress(directory),
        Command::Import { file, directory } => import_progress(directory, &file),
    }
}
