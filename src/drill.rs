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

//! The web drill: a localhost server that walks the learner through
//! the flashcards due today, grading each with the SM-2 scheduler.

use std::sync::Arc;
use std::sync::Mutex;

use axum::Form;
use axum::Router;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use maud::DOCTYPE;
use maud::Markup;
use maud::PreEscaped;
use maud::html;
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::catalog::DrillCard;
use crate::collection::Collection;
use crate::db::Database;
use crate::error::Fallible;
use crate::markdown::markdown_to_html;
use crate::progress::ObjectiveProgress;
use crate::progress::record_flashcard_review;
use crate::srs::CardSchedule;
use crate::srs::ReviewQuality;
use crate::srs::is_due;
use crate::srs::next_schedule;
use crate::streak::update_streak;
use crate::types::timestamp::Timestamp;

#[derive(Clone)]
struct ServerState {
    mutable: Arc<Mutex<MutableState>>,
}

struct MutableState {
    db: Database,
    queue: Vec<DrillCard>,
    reveal: bool,
    reviewed: usize,
}

/// Collect the cards due for review: never-reviewed cards, plus cards
/// whose latest schedule snapshot has come due.
pub fn due_drill_cards(coll: &Collection, now: Timestamp) -> Fallible<Vec<DrillCard>> {
    let mut due = Vec::new();
    for card in coll.catalog.drill_cards() {
        if let Some(exam_id) = &coll.config.exam {
            if &card.exam_id != exam_id {
                continue;
            }
        }
        match coll.db.latest_schedule(&card.card.id)? {
            None => due.push(card),
            Some(schedule) => {
                if is_due(&schedule, now) {
                    due.push(card);
                }
            }
        }
    }
    Ok(due)
}

pub async fn drill(coll: Collection) -> Fallible<()> {
    let queue = due_drill_cards(&coll, Timestamp::now())?;
    if queue.is_empty() {
        println!("No cards due today.");
        return Ok(());
    }
    println!("{} cards due.", queue.len());

    let bind = coll.config.bind.clone();
    let state = ServerState {
        mutable: Arc::new(Mutex::new(MutableState {
            db: coll.db.clone(),
            queue,
            reveal: false,
            reviewed: 0,
        })),
    };
    let app = Router::new();
    let app = app.route("/", get(root));
    let app = app.route("/", post(action));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    let url = format!("http://{bind}/");
    if let Err(e) = open::that(&url) {
        log::warn!("Could not open browser: {e}");
        println!("Drill running at {url}");
    }
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    render_page(state, None)
}

#[derive(Debug, Deserialize)]
enum Action {
    Reveal,
    Again,
    Hard,
    Good,
    Easy,
}

#[derive(Deserialize)]
struct FormData {
    action: Action,
}

async fn action(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> (StatusCode, Html<String>) {
    render_page(state, Some(form.action))
}

fn render_page(state: ServerState, action: Option<Action>) -> (StatusCode, Html<String>) {
    let mut mutable = state.mutable.lock().unwrap();

    if let Some(action) = action {
        if mutable.queue.is_empty() {
            // A stray POST after the session finished.
            log::error!("Action {action:?} with no card on the queue.");
        } else {
            match action {
                Action::Reveal => {
                    if mutable.reveal {
                        log::error!("Revealing a card that is already revealed.");
                    } else {
                        mutable.reveal = true;
                    }
                }
                _ => {
                    if !mutable.reveal {
                        log::error!("Grading a card that is not revealed.");
                    } else {
                        let quality = match action {
                            Action::Again => ReviewQuality::Again,
                            Action::Hard => ReviewQuality::Hard,
                            Action::Good => ReviewQuality::Good,
                            Action::Easy => ReviewQuality::Easy,
                            Action::Reveal => unreachable!(),
                        };
                        let card = mutable.queue.remove(0);
                        if let Err(e) = apply_review(&mutable.db, &card, quality) {
                            log::error!("Failed to record review: {e}");
                        }
                        mutable.reviewed += 1;
                        // Was the card forgotten? Put it at the back.
                        if quality == ReviewQuality::Again {
                            mutable.queue.push(card);
                        }
                        mutable.reveal = false;
                    }
                }
            }
        }
    }

    let body = if mutable.queue.is_empty() {
        html! {
            div.root {
                p { "Finished! " (mutable.reviewed) " reviews." }
            }
        }
    } else {
        let card = mutable.queue[0].clone();
        let front = markdown_to_html(&card.card.front);
        let back = markdown_to_html(&card.card.back);
        let card_content: Markup = if mutable.reveal {
            html! {
                div.question {
                    (PreEscaped(front))
                }
                div.answer {
                    (PreEscaped(back))
                }
            }
        } else {
            html! {
                div.question {
                    (PreEscaped(front))
                }
                div.answer {}
            }
        };
        let card_controls = if mutable.reveal {
            html! {
                form action="/" method="post" {
                    input id="again" type="submit" name="action" value="Again";
                    input id="hard" type="submit" name="action" value="Hard";
                    input id="good" type="submit" name="action" value="Good";
                    input id="easy" type="submit" name="action" value="Easy";
                }
            }
        } else {
            html! {
                form action="/" method="post" {
                    input id="reveal" type="submit" name="action" value="Reveal";
                }
            }
        };
        html! {
            div.root {
                div.card {
                    div.objective {
                        h1 {
                            (card.exam_id) " / " (card.objective_id)
                        }
                    }
                    (card_content)
                    div.controls {
                        (card_controls)
                    }
                    div.remaining {
                        (mutable.queue.len()) " remaining"
                    }
                }
            }
        }
    };
    let html = page_template(body);
    (StatusCode::OK, Html(html.into_string()))
}

/// The read-compute-write sequence around one graded card: a new
/// schedule snapshot, a flashcard count against the objective, and a
/// streak update. Idempotence of the streak makes repeated grades
/// within a day safe.
fn apply_review(db: &Database, card: &DrillCard, quality: ReviewQuality) -> Fallible<()> {
    let now = Timestamp::now();
    let prev = db
        .latest_schedule(&card.card.id)?
        .unwrap_or_else(|| CardSchedule::new(&card.card.id, now));
    let next = next_schedule(&prev, quality, now);
    db.insert_schedule(&next)?;

    let progress = db
        .get_progress(&card.exam_id, &card.objective_id)?
        .unwrap_or_else(|| ObjectiveProgress::new(&card.exam_id, &card.objective_id, now));
    let progress = record_flashcard_review(&progress, now);
    db.upsert_progress(&progress)?;

    let streak = update_streak(db.get_streak()?.as_ref(), now.local_date());
    db.set_streak(&streak)?;
    Ok(())
}

fn page_template(body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "certdrill" }
                link rel="stylesheet" href="/style.css";
            }
            body {
                (body)
            }
        }
    }
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
