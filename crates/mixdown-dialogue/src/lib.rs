// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation handling for mixdown.
//!
//! [`DialogueEngine`] walks one user at a time through the
//! link -> output name -> delivery target dialogue, submits granted jobs
//! to the supervisor, and hosts the admin-gated help-shortcut sub-flow.
//! All transport and download access goes through the core traits, so
//! the whole engine is testable with mocks.

pub mod engine;
pub mod help;
pub mod session;

pub use engine::DialogueEngine;
pub use help::HelpRegistry;
pub use session::{Session, SessionState};
