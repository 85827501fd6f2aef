// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the mixdown workspace.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifies a chat user across gateway events and job ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Identifies a chat (private or group) on the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Identifies a single message within a chat, used for status edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i32);

impl UserId {
    /// The user's private chat shares its numeric id with the user itself.
    pub fn private_chat(self) -> ChatId {
        ChatId(self.0)
    }
}

/// Where a finished file should be delivered.
///
/// The string forms double as interactive-button callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum DeliveryTarget {
    /// The job owner's private chat.
    #[strum(serialize = "dm")]
    DirectMessage,
    /// The chat the dialogue started in.
    #[strum(serialize = "origin")]
    OriginChat,
}

/// The desired output file name collected during the dialogue.
///
/// The literal reply `No` (any casing) is the sentinel for "keep the
/// title reported by the source".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputName {
    SourceTitle,
    Custom(String),
}

impl OutputName {
    /// Parses a free-text reply into an output name.
    ///
    /// Blank input falls back to the source title, matching the sentinel.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("no") {
            OutputName::SourceTitle
        } else {
            OutputName::Custom(trimmed.to_string())
        }
    }

    /// Resolves the display name given the title the fetcher reported.
    pub fn resolve<'a>(&'a self, fetched_title: &'a str) -> &'a str {
        match self {
            OutputName::SourceTitle => fetched_title,
            OutputName::Custom(name) => name,
        }
    }
}

/// A fetched and transcoded track on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Path to the converted audio file.
    pub path: PathBuf,
    /// Title reported by the media source.
    pub title: String,
}

/// An inbound chat event, tagged with sender and chat ids.
///
/// Two delivery shapes exist on the wire -- direct messages and
/// interactive callback selections -- and every variant answers the same
/// identify-sender/identify-chat contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A slash command, with the leading `/` and bot mention stripped.
    Command {
        name: String,
        sender: UserId,
        chat: ChatId,
    },
    /// Free text that is not a command.
    Text {
        body: String,
        sender: UserId,
        chat: ChatId,
    },
    /// An interactive button selection, carrying the message it was
    /// attached to so the prompt can be edited in place.
    Selection {
        data: String,
        sender: UserId,
        chat: ChatId,
        message: MessageId,
    },
}

impl ChatEvent {
    /// The user who produced this event.
    pub fn sender(&self) -> UserId {
        match self {
            ChatEvent::Command { sender, .. }
            | ChatEvent::Text { sender, .. }
            | ChatEvent::Selection { sender, .. } => *sender,
        }
    }

    /// The chat this event originated in.
    pub fn chat(&self) -> ChatId {
        match self {
            ChatEvent::Command { chat, .. }
            | ChatEvent::Text { chat, .. }
            | ChatEvent::Selection { chat, .. } => *chat,
        }
    }
}
