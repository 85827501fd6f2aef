// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for the external collaborators.
//!
//! The conversation engine and the job runner only ever talk to the chat
//! transport and the download tool through these traits, so both can be
//! mocked in tests.

pub mod fetcher;
pub mod gateway;

pub use fetcher::MediaFetcher;
pub use gateway::MessagingGateway;
