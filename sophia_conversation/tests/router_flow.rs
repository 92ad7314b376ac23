//! End-to-end conversation flows through `MessageRouter` with a scripted
//! completion client and a recording responder.

use async_trait::async_trait;
use sophia_conversation::{
    Inbound, MessageRouter, Responder, SessionState, SessionStore, replies,
};
use sophia_core::{CompletionClient, CompletionError, Role, Turn};
use std::collections::VecDeque;
use std::sync::Mutex;

const USER: u64 = 1001;

/// Returns queued results in order and records every prompt it receives.
#[derive(Default)]
struct ScriptedClient {
    results: Mutex<VecDeque<Result<String, CompletionError>>>,
    prompts: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedClient {
    fn with(results: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            prompts: Mutex::default(),
        }
    }

    fn prompts(&self) -> Vec<Vec<Turn>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(turns.to_vec());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))
    }

    fn model(&self) -> &'static str {
        "scripted"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    Typing,
    Text(String),
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Sent>>);

impl Recorder {
    fn texts(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Text(t) => Some(t.clone()),
                Sent::Typing => None,
            })
            .collect()
    }

    fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#[async_trait]
impl Responder for Recorder {
    async fn typing(&self) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(Sent::Typing);
        Ok(())
    }

    async fn reply(&self, text: &str) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(Sent::Text(text.to_string()));
        Ok(())
    }
}

fn text(s: &str) -> Inbound {
    Inbound::Text(s.to_string())
}

async fn named_router(
    results: Vec<Result<String, CompletionError>>,
) -> MessageRouter<ScriptedClient> {
    let router = MessageRouter::new(SessionStore::default(), ScriptedClient::with(results));
    router
        .dispatch(USER, text("Marie"), &Recorder::default())
        .await
        .unwrap();
    router
}

#[tokio::test]
async fn first_text_becomes_name_and_is_not_relayed() {
    let router = MessageRouter::new(SessionStore::default(), ScriptedClient::default());
    let out = Recorder::default();

    router.dispatch(USER, text("Marie"), &out).await.unwrap();

    let session = router.store().get(USER).await.unwrap();
    assert_eq!(session.name.as_deref(), Some("Marie"));
    assert_eq!(session.state(), SessionState::Chatting);
    assert!(session.history.is_empty());
    assert_eq!(out.texts(), [replies::name_ack("Marie")]);
    assert!(out.texts()[0].contains("Marie"));
    assert!(router.client().prompts().is_empty());
}

#[tokio::test]
async fn start_before_name_leaves_state_untouched() {
    let router = MessageRouter::new(SessionStore::default(), ScriptedClient::default());
    let out = Recorder::default();

    router.dispatch(USER, Inbound::Start, &out).await.unwrap();
    router.dispatch(USER, Inbound::Start, &out).await.unwrap();

    assert!(router.store().get(USER).await.is_none());
    assert_eq!(router.store().state(USER).await, SessionState::AwaitingName);
    assert_eq!(
        out.texts(),
        [replies::greeting_new(), replies::greeting_new()]
    );
}

#[tokio::test]
async fn repeated_start_while_chatting_is_stable() {
    let router = named_router(vec![]).await;
    let before = router.store().get(USER).await;
    let out = Recorder::default();

    for _ in 0..3 {
        router.dispatch(USER, Inbound::Start, &out).await.unwrap();
    }

    let expected = replies::greeting_known("Marie");
    assert_eq!(out.texts(), [expected.clone(), expected.clone(), expected]);
    assert_eq!(router.store().get(USER).await, before);
}

#[tokio::test]
async fn whitespace_is_ignored_in_both_states() {
    let router = MessageRouter::new(SessionStore::default(), ScriptedClient::default());
    let out = Recorder::default();

    router.dispatch(USER, text("   \t\n"), &out).await.unwrap();
    router.dispatch(USER, text(""), &out).await.unwrap();
    assert!(out.take().is_empty());
    assert!(router.store().get(USER).await.is_none());

    router.dispatch(USER, text("Marie"), &out).await.unwrap();
    out.take();
    let before = router.store().get(USER).await;

    router.dispatch(USER, text("  "), &out).await.unwrap();
    assert!(out.take().is_empty());
    assert_eq!(router.store().get(USER).await, before);
    assert!(router.client().prompts().is_empty());
}

#[tokio::test]
async fn successful_turn_is_recorded() {
    let router = named_router(vec![Ok("Salut !".to_string())]).await;
    let out = Recorder::default();

    router.dispatch(USER, text("  Bonjour "), &out).await.unwrap();

    assert_eq!(
        out.take(),
        [Sent::Typing, Sent::Text("Salut !".to_string())]
    );
    let history = router.store().get(USER).await.unwrap().history;
    assert_eq!(
        history,
        [Turn::user("Bonjour"), Turn::assistant("Salut !")]
    );

    let prompts = router.client().prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].len(), 2);
    assert_eq!(prompts[0][0].role, Role::System);
    assert!(prompts[0][0].content.contains("Marie"));
    assert_eq!(prompts[0][1], Turn::user("Bonjour"));
}

#[tokio::test]
async fn failure_keeps_user_turn_and_reports_error() {
    let router = named_router(vec![
        Err(CompletionError::Upstream {
            status: 500,
            body: "internal failure".to_string(),
        }),
        Ok("Je suis là.".to_string()),
    ])
    .await;
    let out = Recorder::default();

    router.dispatch(USER, text("Bonjour"), &out).await.unwrap();

    let replies = out.texts();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Erreur"));
    assert!(replies[0].contains("500"));
    assert!(replies[0].contains("internal failure"));
    assert_eq!(
        router.store().get(USER).await.unwrap().history,
        [Turn::user("Bonjour")]
    );

    // The unanswered message is carried as context into the next turn.
    router.dispatch(USER, text("Tu es là ?"), &out).await.unwrap();
    let prompts = router.client().prompts();
    assert_eq!(
        &prompts[1][1..],
        [Turn::user("Bonjour"), Turn::user("Tu es là ?")]
    );
    assert_eq!(
        router.store().get(USER).await.unwrap().history,
        [
            Turn::user("Bonjour"),
            Turn::user("Tu es là ?"),
            Turn::assistant("Je suis là.")
        ]
    );
}

#[tokio::test]
async fn every_failure_kind_is_surfaced_as_text() {
    let router = named_router(vec![
        Err(CompletionError::Transport("timeout".to_string())),
        Err(CompletionError::MalformedResponse("missing content".to_string())),
    ])
    .await;
    let out = Recorder::default();

    router.dispatch(USER, text("un"), &out).await.unwrap();
    router.dispatch(USER, text("deux"), &out).await.unwrap();

    let replies = out.texts();
    assert_eq!(replies.len(), 2);
    assert!(replies.iter().all(|r| r.starts_with("Erreur: ")));
    assert!(replies[0].contains("timeout"));
    assert!(replies[1].contains("missing content"));
}

#[tokio::test]
async fn history_stays_bounded_over_long_conversation() {
    let store = SessionStore::new(2);
    let router = MessageRouter::new(store, ScriptedClient::default());
    let out = Recorder::default();
    router.dispatch(USER, text("Marie"), &out).await.unwrap();

    for i in 0..10 {
        router
            .dispatch(USER, text(&format!("message {i}")), &out)
            .await
            .unwrap();
        assert!(router.store().get(USER).await.unwrap().history.len() <= 4);
    }

    // Prompt = system + at most 2*max_history - 1 prior turns + new message.
    let last = router.client().prompts().pop().unwrap();
    assert_eq!(last.len(), 5);
    assert_eq!(last.last().unwrap(), &Turn::user("message 9"));
}

#[tokio::test]
async fn users_do_not_share_history() {
    let router = named_router(vec![Ok("Salut Marie".to_string())]).await;
    let out = Recorder::default();

    router.dispatch(USER, text("Bonjour"), &out).await.unwrap();
    router.dispatch(2002, text("Paul"), &out).await.unwrap();
    router.dispatch(2002, text("Hello"), &out).await.unwrap();

    let prompts = router.client().prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1][0].content.contains("Paul"));
    assert_eq!(&prompts[1][1..], [Turn::user("Hello")]);
}
