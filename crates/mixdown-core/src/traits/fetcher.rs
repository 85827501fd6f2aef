// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media fetcher trait for the fetch-and-transcode step.

use async_trait::async_trait;

use crate::error::MixdownError;
use crate::types::TrackInfo;

/// Resolves a link to a converted audio file on local disk.
///
/// Implementations carry their own retry bounds, target format/quality,
/// and optional authentication material; callers only supply the link.
#[async_trait]
pub trait MediaFetcher: Send + Sync + 'static {
    /// Fetches the single item behind `url` and converts it to the
    /// configured audio format.
    async fn fetch(&self, url: &str) -> Result<TrackInfo, MixdownError>;
}
