//! REST endpoint handlers for the Livepoll server.
//!
//! All handlers are read-only views of the session. Every mutation goes
//! through the `WebSocket` protocol so that it is broadcast.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/status` | Question count and active question id |
//! | `GET` | `/api/questions` | All questions in insertion order |
//! | `GET` | `/api/questions/{id}` | Single question with its tally |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use livepoll_types::{QuestionId, Scope};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the session status and endpoints.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.lock().await;
    let question_count = session.questions().len();
    let active = session
        .active_question()
        .map_or_else(|| String::from("none"), |q| escape_html(&q.title));
    let operators = session.audience().receiver_count(Scope::Operator);
    let viewers = session.audience().receiver_count(Scope::Viewer);
    let respondents = session.audience().receiver_count(Scope::Respondent);
    drop(session);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Livepoll</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Livepoll</h1>
    <p class="subtitle">Live polling session server</p>

    <div>
        <div class="metric">
            <div class="label">Questions</div>
            <div class="value">{question_count}</div>
        </div>
        <div class="metric">
            <div class="label">Active</div>
            <div class="value">{active}</div>
        </div>
        <div class="metric">
            <div class="label">Operators</div>
            <div class="value">{operators}</div>
        </div>
        <div class="metric">
            <div class="label">Viewers</div>
            <div class="value">{viewers}</div>
        </div>
        <div class="metric">
            <div class="label">Respondents</div>
            <div class="value">{respondents}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li><a href="/api/status">/api/status</a> -- Session status</li>
        <li><a href="/api/questions">/api/questions</a> -- All questions</li>
        <li>/api/questions/:id -- Single question</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws?role=operator|viewer|respondent</code></li>
    </ul>
</body>
</html>"#
    ))
}

/// Escape the five HTML-significant characters so titles render as text.
fn escape_html(text: &str) -> String {
    text.chars().fold(String::with_capacity(text.len()), |mut out, c| {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
        out
    })
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Return the number of questions and the active question id (or `null`).
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(serde_json::json!({
        "questions": session.questions().len(),
        "activeQuestionId": session.state().id(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/questions
// ---------------------------------------------------------------------------

/// List all questions in insertion order, tallies included.
pub async fn list_questions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let questions = state.session.lock().await.questions().to_vec();
    Json(questions)
}

// ---------------------------------------------------------------------------
// GET /api/questions/{id}
// ---------------------------------------------------------------------------

/// Return a single question by id.
pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let question_id: QuestionId = id
        .parse()
        .map_err(|e| ApiError::InvalidUuid(format!("{id}: {e}")))?;

    let question = state
        .session
        .lock()
        .await
        .question(question_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("question {question_id}")))?;

    Ok(Json(question))
}
