// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping Telegram updates into transport-agnostic [`ChatEvent`]s.

use teloxide::types::{CallbackQuery, Message};

use mixdown_core::types::{ChatEvent, ChatId, MessageId, UserId};

/// Parses a leading bot command out of message text.
///
/// Strips the slash and any `@BotName` mention suffix, lowercases the
/// name. Returns `None` when the text is not a command.
pub fn parse_command(text: &str) -> Option<String> {
    let rest = text.trim().strip_prefix('/')?;
    let token = rest.split_whitespace().next()?;
    let name = token.split('@').next()?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

/// Converts an incoming Telegram message to a chat event.
///
/// Messages without a sender or without text (stickers, media, channel
/// posts) are dropped here.
pub fn event_from_message(msg: &Message) -> Option<ChatEvent> {
    let sender = UserId(msg.from.as_ref()?.id.0 as i64);
    let chat = ChatId(msg.chat.id.0);
    let text = msg.text()?;

    if let Some(name) = parse_command(text) {
        return Some(ChatEvent::Command { name, sender, chat });
    }
    Some(ChatEvent::Text {
        body: text.to_string(),
        sender,
        chat,
    })
}

/// Converts a pressed inline button to a selection event.
///
/// Queries whose originating message is gone or inaccessible carry no
/// chat to report into, so they are dropped.
pub fn event_from_callback(query: &CallbackQuery) -> Option<ChatEvent> {
    let data = query.data.clone()?;
    let message = query.message.as_ref()?;
    Some(ChatEvent::Selection {
        data,
        sender: UserId(query.from.id.0 as i64),
        chat: ChatId(message.chat().id.0),
        message: MessageId(message.id().0),
    })
}
