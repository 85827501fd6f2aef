// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the mixdown conversion bot.
//!
//! Provides the shared error type, identifier newtypes, the inbound
//! chat-event model, and the trait seams for the two external
//! collaborators: the messaging gateway and the media fetcher.

pub mod error;
pub mod link;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MixdownError;
pub use traits::{MediaFetcher, MessagingGateway};
pub use types::{ChatEvent, ChatId, DeliveryTarget, MessageId, OutputName, TrackInfo, UserId};
