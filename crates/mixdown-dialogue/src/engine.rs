// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation state machine.
//!
//! One engine instance serves the whole process. Events arrive one at a
//! time from the transport loop; each handler consumes exactly one event,
//! updates the session map under its mutex, releases the lock, and only
//! then awaits gateway calls. Granted jobs are handed off to a detached
//! task so the loop stays responsive to the cancel command.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use mixdown_core::types::{ChatEvent, ChatId, DeliveryTarget, MessageId, OutputName, UserId};
use mixdown_core::{MediaFetcher, MessagingGateway, MixdownError, link};
use mixdown_jobs::{CancelOutcome, JobDescriptor, JobSupervisor, run_job};

use crate::help::HelpRegistry;
use crate::session::{Session, SessionState};

/// Entry command starting the conversion dialogue.
pub const CMD_GRAB: &str = "grab";
/// Greeting command.
pub const CMD_START: &str = "start";
/// Cancel command; valid in any state and outside a dialogue.
pub const CMD_CANCEL: &str = "cancel";
/// Admin-only entry command for the shortcut sub-flow.
pub const CMD_SET_HELP: &str = "sethelp";

pub const MSG_GREETING: &str = "mixdown audio bot\n\n\
    /grab - convert a media link to an audio file\n\
    /cancel - cancel the running job or the current dialogue\n\
    /sethelp - define a help shortcut (chat admins only)\n\
    Admin-defined shortcuts answer to their plain trigger text.";
pub const MSG_ASK_LINK: &str = "Send the media link (single item, no playlists).";
pub const MSG_BAD_LINK: &str =
    "That doesn't look like a single-item http(s) link. Start over with /grab.";
pub const MSG_ASK_NAME: &str =
    "What should the file be called? Reply No to keep the source title.";
pub const MSG_ASK_TARGET: &str = "Where should the file go?";
pub const BTN_DIRECT: &str = "Send privately";
pub const BTN_ORIGIN: &str = "Send here";
pub const MSG_BUSY: &str = "Another job is already running. Try again once it finishes.";
pub const MSG_ADMIN_ONLY: &str = "Only chat admins can set shortcuts.";
pub const MSG_ASK_TRIGGER: &str = "What trigger text should the shortcut answer to?";
pub const MSG_JOB_CANCELLED: &str = "Cancel signal sent to the running job.";
pub const MSG_NOT_OWNER: &str = "Only the job owner can cancel it.";
pub const MSG_DIALOGUE_CANCELLED: &str = "Dialogue cancelled.";
pub const MSG_NOTHING_TO_CANCEL: &str = "Nothing to cancel.";

/// The single process-wide dialogue engine.
pub struct DialogueEngine<G, F> {
    gateway: Arc<G>,
    fetcher: Arc<F>,
    supervisor: Arc<JobSupervisor>,
    sessions: Mutex<HashMap<UserId, Session>>,
    help: HelpRegistry,
}

impl<G, F> DialogueEngine<G, F>
where
    G: MessagingGateway,
    F: MediaFetcher,
{
    pub fn new(gateway: Arc<G>, fetcher: Arc<F>, supervisor: Arc<JobSupervisor>) -> Self {
        Self {
            gateway,
            fetcher,
            supervisor,
            sessions: Mutex::new(HashMap::new()),
            help: HelpRegistry::new(),
        }
    }

    /// The shortcut registry, exposed for startup seeding and tests.
    pub fn help(&self) -> &HelpRegistry {
        &self.help
    }

    /// Dispatches one inbound chat event.
    pub async fn handle_event(&self, event: ChatEvent) -> Result<(), MixdownError> {
        match event {
            ChatEvent::Command { name, sender, chat } => match name.as_str() {
                CMD_START => {
                    self.gateway.send_text(chat, MSG_GREETING).await?;
                    Ok(())
                }
                CMD_GRAB => self.start_dialogue(sender, chat).await,
                CMD_SET_HELP => self.start_help_flow(sender, chat).await,
                CMD_CANCEL => self.handle_cancel(sender, chat).await,
                other => {
                    debug!(command = other, "ignoring unknown command");
                    Ok(())
                }
            },
            ChatEvent::Text { body, sender, chat } => self.handle_text(sender, chat, body).await,
            ChatEvent::Selection {
                data,
                sender,
                chat,
                message,
            } => self.handle_selection(sender, chat, message, data).await,
        }
    }

    /// Entry command: begin (or restart) the dialogue at AwaitingLink.
    ///
    /// A second entry command while a dialogue is live silently discards
    /// the stale session and starts over.
    async fn start_dialogue(&self, sender: UserId, chat: ChatId) -> Result<(), MixdownError> {
        let stale = {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.insert(sender, Session::new(chat))
        };
        if stale.is_some() {
            debug!(user = sender.0, "stale session discarded on re-entry");
        }
        self.gateway.send_text(chat, MSG_ASK_LINK).await?;
        Ok(())
    }

    /// Admin-only entry into the shortcut sub-flow. Fails closed when the
    /// gateway cannot confirm administrator status.
    async fn start_help_flow(&self, sender: UserId, chat: ChatId) -> Result<(), MixdownError> {
        let admin = match self.gateway.is_admin(chat, sender).await {
            Ok(admin) => admin,
            Err(e) => {
                warn!(error = %e, "admin check failed, refusing shortcut sub-flow");
                false
            }
        };
        if !admin {
            self.gateway.send_text(chat, MSG_ADMIN_ONLY).await?;
            return Ok(());
        }

        {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.insert(
                sender,
                Session {
                    chat,
                    state: SessionState::AwaitingHelpTrigger,
                },
            );
        }
        self.gateway.send_text(chat, MSG_ASK_TRIGGER).await?;
        Ok(())
    }

    /// Cancel command: ends any live dialogue and requests job
    /// cancellation; the reply reflects the job-cancel outcome.
    async fn handle_cancel(&self, sender: UserId, chat: ChatId) -> Result<(), MixdownError> {
        let had_session = {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.remove(&sender).is_some()
        };

        let reply = match self.supervisor.request_cancel(sender) {
            CancelOutcome::Cancelled => MSG_JOB_CANCELLED,
            CancelOutcome::NotOwner => MSG_NOT_OWNER,
            CancelOutcome::NoActiveJob if had_session => MSG_DIALOGUE_CANCELLED,
            CancelOutcome::NoActiveJob => MSG_NOTHING_TO_CANCEL,
        };
        self.gateway.send_text(chat, reply).await?;
        Ok(())
    }

    /// Free text drives whichever state the sender's session is in; with
    /// no session it falls through to the shortcut lookup.
    async fn handle_text(
        &self,
        sender: UserId,
        chat: ChatId,
        body: String,
    ) -> Result<(), MixdownError> {
        let session = {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.remove(&sender)
        };

        let Some(session) = session else {
            if let Some(reply) = self.help.lookup(&body) {
                self.gateway.send_text(chat, &reply).await?;
            }
            return Ok(());
        };

        match session.state {
            SessionState::AwaitingLink => {
                let url = body.trim();
                if !link::is_well_formed(url) || !link::is_single_item(url) {
                    // Terminal rejection: session stays removed.
                    info!(user = sender.0, "link rejected");
                    self.gateway.send_text(chat, MSG_BAD_LINK).await?;
                    return Ok(());
                }
                self.put_session(
                    sender,
                    session.chat,
                    SessionState::AwaitingOutputName {
                        link: url.to_string(),
                    },
                );
                self.gateway.send_text(chat, MSG_ASK_NAME).await?;
            }
            SessionState::AwaitingOutputName { link } => {
                let output_name = OutputName::parse(&body);
                self.put_session(
                    sender,
                    session.chat,
                    SessionState::AwaitingDeliveryTarget { link, output_name },
                );
                let dm_data = DeliveryTarget::DirectMessage.to_string();
                let origin_data = DeliveryTarget::OriginChat.to_string();
                self.gateway
                    .prompt_choice(
                        chat,
                        MSG_ASK_TARGET,
                        &[
                            (BTN_DIRECT, dm_data.as_str()),
                            (BTN_ORIGIN, origin_data.as_str()),
                        ],
                    )
                    .await?;
            }
            SessionState::AwaitingDeliveryTarget { .. } => {
                // A button is expected; free text falls through to the
                // shortcut lookup like any other message.
                self.put_session(sender, session.chat, session.state);
                if let Some(reply) = self.help.lookup(&body) {
                    self.gateway.send_text(chat, &reply).await?;
                }
            }
            SessionState::AwaitingHelpTrigger => {
                self.put_session(
                    sender,
                    session.chat,
                    SessionState::AwaitingHelpReply {
                        trigger: body.trim().to_string(),
                    },
                );
                self.gateway
                    .send_text(chat, &format!("And what should '{}' reply with?", body.trim()))
                    .await?;
            }
            SessionState::AwaitingHelpReply { trigger } => {
                self.help.set(trigger.clone(), body.trim().to_string());
                info!(trigger = trigger.as_str(), "shortcut saved");
                self.gateway
                    .send_text(chat, &format!("Shortcut '{trigger}' saved."))
                    .await?;
            }
        }
        Ok(())
    }

    /// A delivery-target button was pressed: the terminal send step.
    async fn handle_selection(
        &self,
        sender: UserId,
        chat: ChatId,
        message: MessageId,
        data: String,
    ) -> Result<(), MixdownError> {
        let session = {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.remove(&sender)
        };

        let Some(Session {
            chat: origin_chat,
            state,
        }) = session
        else {
            debug!(user = sender.0, "selection without a matching prompt, ignored");
            return Ok(());
        };

        let SessionState::AwaitingDeliveryTarget { link, output_name } = state else {
            // Stale button press; the live dialogue continues unaffected.
            debug!(user = sender.0, "selection in a non-selection state, ignored");
            self.put_session(sender, origin_chat, state);
            return Ok(());
        };

        let Ok(target) = DeliveryTarget::from_str(&data) else {
            warn!(data = data.as_str(), "unrecognized selection payload");
            return Ok(());
        };

        let Some(grant) = self.supervisor.try_acquire(sender, origin_chat) else {
            // Terminal busy: the attempt is dropped, not queued.
            self.gateway.edit_text(chat, message, MSG_BUSY).await?;
            return Ok(());
        };

        let job = JobDescriptor {
            owner: sender,
            origin_chat,
            link,
            output_name,
            target,
            status_chat: chat,
            status_message: message,
        };
        info!(owner = sender.0, target = %target, "job submitted");
        tokio::spawn(run_job(
            Arc::clone(&self.gateway),
            Arc::clone(&self.fetcher),
            job,
            grant,
        ));
        Ok(())
    }

    fn put_session(&self, sender: UserId, chat: ChatId, state: SessionState) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.insert(sender, Session { chat, state });
    }

    /// Current dialogue state for a user, exposed for tests.
    pub fn session_state(&self, user: UserId) -> Option<SessionState> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user)
            .map(|s| s.state.clone())
    }
}
