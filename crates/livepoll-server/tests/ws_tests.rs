//! End-to-end `WebSocket` tests.
//!
//! Each test serves the real router on an ephemeral `127.0.0.1` port and
//! drives it with `tokio-tungstenite` clients, one per audience scope.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unreachable,
    clippy::arithmetic_side_effects
)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use livepoll_server::{AppState, serve};
use livepoll_types::{ClientEvent, NewQuestion, QuestionId, QuestionKind, RawAnswer, ServerEvent};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::default());
    tokio::spawn(serve(listener, state));
    addr
}

async fn connect(addr: SocketAddr, role: Option<&str>) -> Client {
    let url = role.map_or_else(
        || format!("ws://{addr}/ws"),
        |role| format!("ws://{addr}/ws?role={role}"),
    );
    let (client, _) = connect_async(url).await.expect("WebSocket handshake failed");
    client
}

async fn send(client: &mut Client, event: &ClientEvent) {
    let json = serde_json::to_string(event).unwrap();
    client.send(Message::Text(json.into())).await.unwrap();
}

async fn next_event(client: &mut Client) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for event")
            .expect("connection closed")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("undecodable server event");
        }
    }
}

/// Skip events until one satisfies `pred`.
async fn wait_for(client: &mut Client, pred: impl Fn(&ServerEvent) -> bool) -> ServerEvent {
    loop {
        let event = next_event(client).await;
        if pred(&event) {
            return event;
        }
    }
}

/// Create a question as operator and return its id from the list update.
async fn create(
    operator: &mut Client,
    title: &str,
    kind: QuestionKind,
    options: &[&str],
) -> QuestionId {
    send(
        operator,
        &ClientEvent::CreateQuestion(NewQuestion {
            title: title.to_owned(),
            kind,
            options: options.iter().map(|o| (*o).to_owned()).collect(),
        }),
    )
    .await;
    let event = wait_for(operator, |e| match e {
        ServerEvent::QuestionsUpdated { questions } => questions.iter().any(|q| q.title == title),
        _ => false,
    })
    .await;
    let ServerEvent::QuestionsUpdated { questions } = event else {
        unreachable!();
    };
    questions.iter().find(|q| q.title == title).unwrap().id
}

async fn activate(operator: &mut Client, id: QuestionId) {
    send(operator, &ClientEvent::ActivateQuestion { question_id: id }).await;
    wait_for(operator, |e| {
        matches!(e, ServerEvent::QuestionActivated { question } if question.id == id)
    })
    .await;
}

#[tokio::test]
async fn operator_receives_question_list_on_connect() {
    let addr = spawn_server().await;
    let mut operator = connect(addr, Some("operator")).await;

    let first = next_event(&mut operator).await;
    assert!(matches!(first, ServerEvent::QuestionsUpdated { questions } if questions.is_empty()));
}

#[tokio::test]
async fn color_poll_end_to_end() {
    let addr = spawn_server().await;
    let mut operator = connect(addr, Some("operator")).await;
    let id = create(&mut operator, "Color?", QuestionKind::SingleChoice, &["Red", "Blue"]).await;
    activate(&mut operator, id).await;

    // Joining after activation: both late joiners are caught up first.
    let mut viewer = connect(addr, Some("viewer")).await;
    let mut respondent = connect(addr, None).await;
    assert!(matches!(
        next_event(&mut viewer).await,
        ServerEvent::QuestionActivated { question } if question.id == id
    ));
    assert!(matches!(
        next_event(&mut viewer).await,
        ServerEvent::ResultsUpdated(results) if results.question_id == id
    ));
    assert!(matches!(
        next_event(&mut respondent).await,
        ServerEvent::QuestionActivated { question } if question.id == id
    ));

    for answer in ["Red", "Red", "Blue"] {
        send(
            &mut respondent,
            &ClientEvent::SubmitAnswer {
                question_id: id,
                answer: RawAnswer::from(answer),
            },
        )
        .await;
    }

    let event = wait_for(&mut viewer, |e| {
        matches!(e, ServerEvent::ResultsUpdated(r) if r.total_responses == 3)
    })
    .await;
    let ServerEvent::ResultsUpdated(results) = event else {
        unreachable!();
    };
    assert_eq!(results.answers.get("Red"), Some(&2));
    assert_eq!(results.answers.get("Blue"), Some(&1));

    // The operator sees the same totals.
    wait_for(&mut operator, |e| {
        matches!(e, ServerEvent::ResultsUpdated(r) if r.total_responses == 3)
    })
    .await;

    // Respondents never see tallies: the next thing they get is the
    // deactivation.
    send(&mut operator, &ClientEvent::DeactivateQuestion).await;
    assert_eq!(next_event(&mut respondent).await, ServerEvent::QuestionDeactivated);
    assert!(matches!(
        wait_for(&mut viewer, |e| !matches!(e, ServerEvent::ResultsUpdated(_))).await,
        ServerEvent::QuestionDeactivated
    ));
}

#[tokio::test]
async fn concurrent_submissions_are_each_counted_once() {
    const RESPONDENTS: u64 = 24;

    let addr = spawn_server().await;
    let mut operator = connect(addr, Some("operator")).await;
    let id = create(&mut operator, "Left?", QuestionKind::SingleChoice, &["L", "R"]).await;
    activate(&mut operator, id).await;

    let mut viewer = connect(addr, Some("viewer")).await;
    assert!(matches!(next_event(&mut viewer).await, ServerEvent::QuestionActivated { .. }));
    assert!(matches!(next_event(&mut viewer).await, ServerEvent::ResultsUpdated(_)));

    let mut tasks = Vec::new();
    for n in 0..RESPONDENTS {
        tasks.push(tokio::spawn(async move {
            let mut respondent = connect(addr, None).await;
            // Catch-up arrives once the connection is subscribed.
            next_event(&mut respondent).await;
            let choice = if n % 2 == 0 { "L" } else { "R" };
            send(
                &mut respondent,
                &ClientEvent::SubmitAnswer {
                    question_id: id,
                    answer: RawAnswer::from(choice),
                },
            )
            .await;
            respondent.close(None).await.ok();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let mut last_total = 0;
    let results = loop {
        let ServerEvent::ResultsUpdated(results) = next_event(&mut viewer).await else {
            continue;
        };
        let sum: u64 = results.answers.values().sum();
        assert_eq!(sum, results.total_responses, "partial tally broadcast: {results:?}");
        assert!(results.total_responses > last_total, "totals went backwards");
        last_total = results.total_responses;
        if results.total_responses == RESPONDENTS {
            break results;
        }
    };

    assert_eq!(results.answers.get("L"), Some(&(RESPONDENTS / 2)));
    assert_eq!(results.answers.get("R"), Some(&(RESPONDENTS / 2)));
}

#[tokio::test]
async fn multiple_choice_results_reach_operator() {
    let addr = spawn_server().await;
    let mut operator = connect(addr, Some("admin")).await;
    let id = create(&mut operator, "Pick", QuestionKind::MultipleChoice, &["A", "B", "C"]).await;

    let mut respondent = connect(addr, Some("respondent")).await;
    send(
        &mut respondent,
        &ClientEvent::SubmitAnswer {
            question_id: id,
            answer: RawAnswer::from(vec!["A", "A", "B"]),
        },
    )
    .await;

    let event = wait_for(&mut operator, |e| matches!(e, ServerEvent::ResultsUpdated(_))).await;
    let ServerEvent::ResultsUpdated(results) = event else {
        unreachable!();
    };
    assert_eq!(results.question_id, id);
    assert_eq!(results.answers.get("A"), Some(&2));
    assert_eq!(results.answers.get("B"), Some(&1));
    assert_eq!(results.total_responses, 1);
}

#[tokio::test]
async fn refused_actions_are_reported_to_the_caller() {
    let addr = spawn_server().await;
    let mut respondent = connect(addr, None).await;

    respondent
        .send(Message::Text("{\"event\":\"submit-answer\"}".into()))
        .await
        .unwrap();
    assert!(matches!(
        next_event(&mut respondent).await,
        ServerEvent::ActionRejected { action, .. } if action == "submit-answer"
    ));

    send(&mut respondent, &ClientEvent::DeactivateQuestion).await;
    assert!(matches!(
        next_event(&mut respondent).await,
        ServerEvent::ActionRejected { action, .. } if action == "deactivate-question"
    ));

    let unknown = QuestionId::new();
    send(
        &mut respondent,
        &ClientEvent::SubmitAnswer {
            question_id: unknown,
            answer: RawAnswer::from("x"),
        },
    )
    .await;
    assert!(matches!(
        next_event(&mut respondent).await,
        ServerEvent::ActionRejected { reason, .. } if reason.contains(&unknown.to_string())
    ));
}

#[tokio::test]
async fn deleting_active_question_deactivates_everyone() {
    let addr = spawn_server().await;
    let mut operator = connect(addr, Some("operator")).await;
    let id = create(&mut operator, "Why?", QuestionKind::FreeText, &[]).await;
    activate(&mut operator, id).await;

    let mut viewer = connect(addr, Some("viewer")).await;
    assert!(matches!(next_event(&mut viewer).await, ServerEvent::QuestionActivated { .. }));
    assert!(matches!(next_event(&mut viewer).await, ServerEvent::ResultsUpdated(_)));

    send(&mut operator, &ClientEvent::DeleteQuestion { question_id: id }).await;

    assert_eq!(next_event(&mut viewer).await, ServerEvent::QuestionDeactivated);
    let event =
        wait_for(&mut operator, |e| matches!(e, ServerEvent::QuestionsUpdated { .. })).await;
    assert!(matches!(event, ServerEvent::QuestionsUpdated { questions } if questions.is_empty()));
}

#[tokio::test]
async fn unknown_role_is_refused_at_upgrade() {
    let addr = spawn_server().await;
    let result = connect_async(format!("ws://{addr}/ws?role=superuser")).await;
    assert!(result.is_err());
}
