// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media fetching backed by the `yt-dlp` binary.
//!
//! [`YtDlpFetcher`] shells out to `yt-dlp`, asking it to extract audio,
//! transcode to the configured format, and print the final title and
//! file path on stdout. The subprocess runs to completion once started;
//! cancellation is handled at the job level around, not inside, a fetch.

pub mod cookies;
pub mod invocation;
pub mod ytdlp;

pub use invocation::FetchOptions;
pub use ytdlp::YtDlpFetcher;
