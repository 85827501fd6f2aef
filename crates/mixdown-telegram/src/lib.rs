// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for mixdown.
//!
//! Implements [`MessagingGateway`] over the Telegram Bot API via
//! teloxide. Long polling runs on a spawned dispatcher that converts
//! updates into [`ChatEvent`]s and hands them to the serve loop through
//! a channel.

pub mod events;

use std::path::Path;

use async_trait::async_trait;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{
    ChatMemberKind, InlineKeyboardButton, InlineKeyboardMarkup, InputFile,
    MessageId as TgMessageId, UserId as TgUserId,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use mixdown_config::model::TelegramConfig;
use mixdown_core::types::{ChatEvent, ChatId, MessageId, UserId};
use mixdown_core::{MessagingGateway, MixdownError};

/// Telegram gateway implementing [`MessagingGateway`].
///
/// One instance serves the whole process; [`TelegramGateway::connect`]
/// starts long polling and [`TelegramGateway::next_event`] feeds the
/// serve loop.
pub struct TelegramGateway {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<ChatEvent>>,
    inbound_tx: mpsc::Sender<ChatEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramGateway {
    /// Creates the gateway. Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, MixdownError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            MixdownError::Config("telegram.bot_token is required".into())
        })?;
        if token.is_empty() {
            return Err(MixdownError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Starts long polling. Idempotent.
    pub fn connect(&mut self) {
        if self.polling_handle.is_some() {
            return;
        }

        let bot = self.bot.clone();
        let message_tx = self.inbound_tx.clone();
        let callback_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = dptree::entry()
                .branch(Update::filter_message().endpoint(move |msg: Message| {
                    let tx = message_tx.clone();
                    async move {
                        match events::event_from_message(&msg) {
                            Some(event) => {
                                if tx.send(event).await.is_err() {
                                    warn!("inbound channel closed, dropping message");
                                }
                            }
                            None => {
                                debug!(msg_id = msg.id.0, "ignoring unsupported message");
                            }
                        }
                        respond(())
                    }
                }))
                .branch(Update::filter_callback_query().endpoint(
                    move |bot: Bot, query: CallbackQuery| {
                        let tx = callback_tx.clone();
                        async move {
                            // Stop the client-side spinner regardless of
                            // whether the payload is usable.
                            if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                                warn!(error = %e, "failed to answer callback query");
                            }
                            match events::event_from_callback(&query) {
                                Some(event) => {
                                    if tx.send(event).await.is_err() {
                                        warn!("inbound channel closed, dropping selection");
                                    }
                                }
                                None => {
                                    debug!("ignoring callback query without usable payload");
                                }
                            }
                            respond(())
                        }
                    },
                ));

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
    }

    /// Blocks until the next inbound chat event arrives.
    pub async fn next_event(&self) -> Result<ChatEvent, MixdownError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| MixdownError::channel("Telegram inbound channel closed"))
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageId, MixdownError> {
        let sent = self
            .bot
            .send_message(teloxide::types::ChatId(chat.0), text)
            .await
            .map_err(|e| MixdownError::Channel {
                message: format!("failed to send message: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(MessageId(sent.id.0))
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), MixdownError> {
        let result = self
            .bot
            .edit_message_text(teloxide::types::ChatId(chat.0), TgMessageId(message.0), text)
            .await;
        match result {
            Ok(_) => Ok(()),
            // Re-sending identical status text is not worth failing over.
            Err(e) if e.to_string().contains("message is not modified") => Ok(()),
            Err(e) => Err(MixdownError::Channel {
                message: format!("failed to edit message: {e}"),
                source: Some(Box::new(e)),
            }),
        }
    }

    async fn prompt_choice(
        &self,
        chat: ChatId,
        text: &str,
        choices: &[(&str, &str)],
    ) -> Result<MessageId, MixdownError> {
        let row: Vec<InlineKeyboardButton> = choices
            .iter()
            .map(|(label, data)| {
                InlineKeyboardButton::callback(label.to_string(), data.to_string())
            })
            .collect();
        let markup = InlineKeyboardMarkup::new([row]);

        let sent = self
            .bot
            .send_message(teloxide::types::ChatId(chat.0), text)
            .reply_markup(markup)
            .await
            .map_err(|e| MixdownError::Channel {
                message: format!("failed to send prompt: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(MessageId(sent.id.0))
    }

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        filename: &str,
    ) -> Result<(), MixdownError> {
        let file = InputFile::file(path.to_path_buf()).file_name(filename.to_string());
        self.bot
            .send_document(teloxide::types::ChatId(chat.0), file)
            .await
            .map_err(|e| MixdownError::Channel {
                message: format!("failed to send document: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn is_admin(&self, chat: ChatId, user: UserId) -> Result<bool, MixdownError> {
        // Everyone administers their own private chat.
        if chat.0 == user.0 {
            return Ok(true);
        }

        let member = self
            .bot
            .get_chat_member(teloxide::types::ChatId(chat.0), TgUserId(user.0 as u64))
            .await
            .map_err(|e| MixdownError::Channel {
                message: format!("failed to look up chat member: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(matches!(
            member.kind,
            ChatMemberKind::Owner(_) | ChatMemberKind::Administrator(_)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_bot_token() {
        let config = TelegramConfig { bot_token: None };
        assert!(TelegramGateway::new(&config).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = TelegramConfig {
            bot_token: Some(String::new()),
        };
        assert!(TelegramGateway::new(&config).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11".into()),
        };
        assert!(TelegramGateway::new(&config).is_ok());
    }
}
