// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dialogue scenarios against mock collaborators.
//!
//! Uses a recording mock gateway and a scriptable mock fetcher with a
//! real `JobSupervisor`, driving the engine through the exact event
//! sequences a user would produce.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use mixdown_core::types::{ChatEvent, ChatId, MessageId, TrackInfo, UserId};
use mixdown_core::{MediaFetcher, MessagingGateway, MixdownError};
use mixdown_dialogue::engine::{
    self, CMD_CANCEL, CMD_GRAB, CMD_SET_HELP, DialogueEngine,
};
use mixdown_dialogue::session::SessionState;
use mixdown_jobs::JobSupervisor;
use mixdown_jobs::runner::{STATUS_CANCELLED, STATUS_DONE};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Text(ChatId, String),
    Edit(ChatId, MessageId, String),
    Choice(ChatId, String, Vec<(String, String)>),
    Document(ChatId, PathBuf, String),
}

struct MockGateway {
    calls: Mutex<Vec<Call>>,
    next_message_id: AtomicI32,
    admin: bool,
}

impl MockGateway {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            next_message_id: AtomicI32::new(100),
            admin: false,
        })
    }

    fn admin() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            next_message_id: AtomicI32::new(100),
            admin: true,
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn last_text(&self) -> Option<String> {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|c| match c {
                Call::Text(_, text) => Some(text),
                _ => None,
            })
    }
}

#[async_trait]
impl MessagingGateway for MockGateway {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageId, MixdownError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Text(chat, text.to_string()));
        Ok(MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), MixdownError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Edit(chat, message, text.to_string()));
        Ok(())
    }

    async fn prompt_choice(
        &self,
        chat: ChatId,
        text: &str,
        choices: &[(&str, &str)],
    ) -> Result<MessageId, MixdownError> {
        self.calls.lock().unwrap().push(Call::Choice(
            chat,
            text.to_string(),
            choices
                .iter()
                .map(|(l, d)| (l.to_string(), d.to_string()))
                .collect(),
        ));
        Ok(MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        filename: &str,
    ) -> Result<(), MixdownError> {
        self.calls.lock().unwrap().push(Call::Document(
            chat,
            path.to_path_buf(),
            filename.to_string(),
        ));
        Ok(())
    }

    async fn is_admin(&self, _chat: ChatId, _user: UserId) -> Result<bool, MixdownError> {
        Ok(self.admin)
    }
}

struct MockFetcher {
    /// When set, fetch blocks until notified.
    stall: Option<Arc<Notify>>,
}

impl MockFetcher {
    fn instant() -> Arc<Self> {
        Arc::new(Self { stall: None })
    }

    fn stalling(notify: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            stall: Some(notify),
        })
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn fetch(&self, _url: &str) -> Result<TrackInfo, MixdownError> {
        if let Some(ref notify) = self.stall {
            notify.notified().await;
        }
        Ok(TrackInfo {
            path: PathBuf::from("/tmp/downloads/Fetched Title.mp3"),
            title: "Fetched Title".into(),
        })
    }
}

const USER: UserId = UserId(7);
const GROUP: ChatId = ChatId(-100);

fn command(name: &str) -> ChatEvent {
    ChatEvent::Command {
        name: name.into(),
        sender: USER,
        chat: GROUP,
    }
}

fn text(body: &str) -> ChatEvent {
    ChatEvent::Text {
        body: body.into(),
        sender: USER,
        chat: GROUP,
    }
}

fn selection(data: &str, message: MessageId) -> ChatEvent {
    ChatEvent::Selection {
        data: data.into(),
        sender: USER,
        chat: GROUP,
        message,
    }
}

async fn wait_until_idle(supervisor: &JobSupervisor) {
    for _ in 0..200 {
        if !supervisor.is_busy() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("supervisor never became idle");
}

/// Drives a fresh session to the delivery prompt and returns the prompt
/// message id.
async fn drive_to_target_prompt(
    engine: &DialogueEngine<MockGateway, MockFetcher>,
    gateway: &MockGateway,
    sender: UserId,
    name_reply: &str,
) -> MessageId {
    engine
        .handle_event(ChatEvent::Command {
            name: CMD_GRAB.into(),
            sender,
            chat: GROUP,
        })
        .await
        .unwrap();
    engine
        .handle_event(ChatEvent::Text {
            body: "https://example.com/watch?v=abc".into(),
            sender,
            chat: GROUP,
        })
        .await
        .unwrap();
    engine
        .handle_event(ChatEvent::Text {
            body: name_reply.into(),
            sender,
            chat: GROUP,
        })
        .await
        .unwrap();

    let calls = gateway.calls();
    let Some(Call::Choice(_, _, _)) = calls.last() else {
        panic!("expected delivery prompt, got {:?}", calls.last());
    };
    // prompt_choice handed out the last-allocated message id
    MessageId(gateway.next_message_id.load(Ordering::SeqCst) - 1)
}

/// Scenario A: full happy path ending with a private delivery named
/// after the fetched title.
#[tokio::test]
async fn scenario_a_happy_path_private_delivery() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::new();
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::instant(),
        Arc::clone(&supervisor),
    );

    let prompt = drive_to_target_prompt(&engine, &gateway, USER, "No").await;
    engine.handle_event(selection("dm", prompt)).await.unwrap();
    wait_until_idle(&supervisor).await;

    let calls = gateway.calls();
    assert!(calls.contains(&Call::Document(
        ChatId(USER.0),
        PathBuf::from("/tmp/downloads/Fetched Title.mp3"),
        "Fetched Title.mp3".into()
    )));
    assert!(
        calls
            .iter()
            .any(|c| matches!(c, Call::Edit(_, _, t) if t == STATUS_DONE))
    );
    // Session is gone after submission.
    assert_eq!(engine.session_state(USER), None);
}

/// Scenario B: a collection link ends the session immediately; the slot
/// is never requested.
#[tokio::test]
async fn scenario_b_collection_link_rejected() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::new();
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::instant(),
        Arc::clone(&supervisor),
    );

    engine.handle_event(command(CMD_GRAB)).await.unwrap();
    engine
        .handle_event(text("https://example.com/watch?v=abc&list=PL123"))
        .await
        .unwrap();

    assert_eq!(gateway.last_text().as_deref(), Some(engine::MSG_BAD_LINK));
    assert_eq!(engine.session_state(USER), None);
    assert!(!supervisor.is_busy());
}

/// Scenario C: two sessions race to submit; exactly one gets the slot,
/// the other ends with the busy notice and no queued job.
#[tokio::test]
async fn scenario_c_second_submission_sees_busy() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::new();
    let release = Arc::new(Notify::new());
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::stalling(Arc::clone(&release)),
        Arc::clone(&supervisor),
    );

    let first_prompt = drive_to_target_prompt(&engine, &gateway, USER, "No").await;
    let rival = UserId(8);
    let rival_prompt = drive_to_target_prompt(&engine, &gateway, rival, "No").await;

    engine
        .handle_event(selection("dm", first_prompt))
        .await
        .unwrap();
    engine
        .handle_event(ChatEvent::Selection {
            data: "origin".into(),
            sender: rival,
            chat: GROUP,
            message: rival_prompt,
        })
        .await
        .unwrap();

    // The rival's prompt was edited to the busy notice and its session ended.
    let calls = gateway.calls();
    assert!(calls.contains(&Call::Edit(GROUP, rival_prompt, engine::MSG_BUSY.into())));
    assert_eq!(engine.session_state(rival), None);

    release.notify_one();
    wait_until_idle(&supervisor).await;

    // Only one document was ever delivered.
    let documents = gateway
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Document(..)))
        .count();
    assert_eq!(documents, 1);
}

/// Scenario D: the owner cancels mid-fetch; the job reports cancelled,
/// the slot frees, and a third session can immediately acquire it.
#[tokio::test]
async fn scenario_d_owner_cancels_mid_fetch() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::new();
    let release = Arc::new(Notify::new());
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::stalling(Arc::clone(&release)),
        Arc::clone(&supervisor),
    );

    let prompt = drive_to_target_prompt(&engine, &gateway, USER, "No").await;
    engine.handle_event(selection("dm", prompt)).await.unwrap();
    assert!(supervisor.is_busy());

    engine.handle_event(command(CMD_CANCEL)).await.unwrap();
    assert_eq!(
        gateway.last_text().as_deref(),
        Some(engine::MSG_JOB_CANCELLED)
    );

    release.notify_one();
    wait_until_idle(&supervisor).await;

    assert!(
        gateway
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Edit(_, _, t) if t == STATUS_CANCELLED))
    );
    // Slot immediately reusable.
    assert!(supervisor.try_acquire(UserId(9), GROUP).is_some());
}

/// A non-owner's cancel is refused while the owner's job runs.
#[tokio::test]
async fn cancel_by_non_owner_is_refused() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::new();
    let release = Arc::new(Notify::new());
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::stalling(Arc::clone(&release)),
        Arc::clone(&supervisor),
    );

    let prompt = drive_to_target_prompt(&engine, &gateway, USER, "No").await;
    engine.handle_event(selection("dm", prompt)).await.unwrap();

    engine
        .handle_event(ChatEvent::Command {
            name: CMD_CANCEL.into(),
            sender: UserId(99),
            chat: GROUP,
        })
        .await
        .unwrap();
    assert_eq!(gateway.last_text().as_deref(), Some(engine::MSG_NOT_OWNER));
    assert!(supervisor.is_busy());

    release.notify_one();
    wait_until_idle(&supervisor).await;
}

/// Re-entry policy: a second /grab discards the stale session silently
/// and restarts from AwaitingLink.
#[tokio::test]
async fn re_entry_discards_stale_session() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::new();
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::instant(),
        Arc::clone(&supervisor),
    );

    engine.handle_event(command(CMD_GRAB)).await.unwrap();
    engine
        .handle_event(text("https://example.com/watch?v=abc"))
        .await
        .unwrap();
    assert!(matches!(
        engine.session_state(USER),
        Some(SessionState::AwaitingOutputName { .. })
    ));

    engine.handle_event(command(CMD_GRAB)).await.unwrap();
    assert_eq!(engine.session_state(USER), Some(SessionState::AwaitingLink));
}

/// The custom output name flows through to the delivered filename.
#[tokio::test]
async fn custom_name_used_for_delivery() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::new();
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::instant(),
        Arc::clone(&supervisor),
    );

    let prompt = drive_to_target_prompt(&engine, &gateway, USER, "Late Night Mix").await;
    engine
        .handle_event(selection("origin", prompt))
        .await
        .unwrap();
    wait_until_idle(&supervisor).await;

    assert!(gateway.calls().iter().any(|c| matches!(
        c,
        Call::Document(chat, _, name) if *chat == GROUP && name == "Late Night Mix.mp3"
    )));
}

/// Admin sub-flow: trigger and reply are collected, then free text equal
/// to the trigger produces the stored reply.
#[tokio::test]
async fn sethelp_round_trip_for_admin() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::admin();
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::instant(),
        Arc::clone(&supervisor),
    );

    engine.handle_event(command(CMD_SET_HELP)).await.unwrap();
    assert_eq!(
        gateway.last_text().as_deref(),
        Some(engine::MSG_ASK_TRIGGER)
    );
    engine.handle_event(text("rules")).await.unwrap();
    engine.handle_event(text("Be kind.")).await.unwrap();
    assert_eq!(engine.session_state(USER), None);

    engine.handle_event(text("rules")).await.unwrap();
    assert_eq!(gateway.last_text().as_deref(), Some("Be kind."));

    // Unmatched free text stays silent.
    let before = gateway.calls().len();
    engine.handle_event(text("unrelated")).await.unwrap();
    assert_eq!(gateway.calls().len(), before);
}

/// Non-admins are turned away from the shortcut sub-flow.
#[tokio::test]
async fn sethelp_refused_for_non_admin() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::new();
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::instant(),
        Arc::clone(&supervisor),
    );

    engine.handle_event(command(CMD_SET_HELP)).await.unwrap();
    assert_eq!(gateway.last_text().as_deref(), Some(engine::MSG_ADMIN_ONLY));
    assert_eq!(engine.session_state(USER), None);
}

/// A stale button press leaves a dialogue in another state untouched.
#[tokio::test]
async fn stale_selection_does_not_disturb_live_dialogue() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::new();
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::instant(),
        Arc::clone(&supervisor),
    );

    engine.handle_event(command(CMD_GRAB)).await.unwrap();
    engine
        .handle_event(selection("dm", MessageId(12)))
        .await
        .unwrap();

    assert_eq!(engine.session_state(USER), Some(SessionState::AwaitingLink));
    assert!(!supervisor.is_busy());
}

/// A link without a scheme is rejected before any further step.
#[tokio::test]
async fn scheme_less_link_rejected() {
    let supervisor = JobSupervisor::new();
    let gateway = MockGateway::new();
    let engine = DialogueEngine::new(
        Arc::clone(&gateway),
        MockFetcher::instant(),
        Arc::clone(&supervisor),
    );

    engine.handle_event(command(CMD_GRAB)).await.unwrap();
    engine.handle_event(text("example.com/watch?v=abc")).await.unwrap();
    assert_eq!(gateway.last_text().as_deref(), Some(engine::MSG_BAD_LINK));
    assert_eq!(engine.session_state(USER), None);
}
