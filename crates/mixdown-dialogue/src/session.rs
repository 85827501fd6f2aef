// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user dialogue session state.

use mixdown_core::types::{ChatId, OutputName};

/// Where a session currently sits in the dialogue.
///
/// Each state holds only the fields validated by the previous steps;
/// the handler for a state consumes exactly one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Entry command received; waiting for the media link.
    AwaitingLink,
    /// Link validated; waiting for the output name (or the `No` sentinel).
    AwaitingOutputName { link: String },
    /// Name collected; waiting for one of the two delivery buttons.
    AwaitingDeliveryTarget {
        link: String,
        output_name: OutputName,
    },
    /// Admin sub-flow: waiting for the shortcut trigger text.
    AwaitingHelpTrigger,
    /// Admin sub-flow: waiting for the shortcut reply text.
    AwaitingHelpReply { trigger: String },
}

/// One user's in-progress dialogue.
///
/// Owned by exactly one user and destroyed on any terminal outcome
/// (submit, reject, busy, cancel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The chat the dialogue started in; jobs report back here.
    pub chat: ChatId,
    pub state: SessionState,
}

impl Session {
    pub fn new(chat: ChatId) -> Self {
        Self {
            chat,
            state: SessionState::AwaitingLink,
        }
    }
}
