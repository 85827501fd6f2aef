// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging gateway trait for the chat transport.

use std::path::Path;

use async_trait::async_trait;

use crate::error::MixdownError;
use crate::types::{ChatId, MessageId, UserId};

/// Abstract capability set consumed from the chat transport.
///
/// Covers everything the dialogue and job runner need: plain replies,
/// editable status messages, a two-choice interactive prompt, file
/// delivery, and the chat-administrator query gating the help sub-flow.
#[async_trait]
pub trait MessagingGateway: Send + Sync + 'static {
    /// Sends a plain text message and returns its id for later edits.
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageId, MixdownError>;

    /// Edits a previously sent message in place.
    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), MixdownError>;

    /// Sends an interactive prompt with `(label, callback data)` buttons.
    async fn prompt_choice(
        &self,
        chat: ChatId,
        text: &str,
        choices: &[(&str, &str)],
    ) -> Result<MessageId, MixdownError>;

    /// Delivers a local file to a chat under the given filename.
    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        filename: &str,
    ) -> Result<(), MixdownError>;

    /// Reports whether the user is an administrator or creator of the chat.
    async fn is_admin(&self, chat: ChatId, user: UserId) -> Result<bool, MixdownError>;
}
