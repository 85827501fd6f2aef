// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Link validation predicates shared by the dialogue and the fetcher.
//!
//! The dialogue rejects bad links up front; the fetcher re-checks the
//! collection predicate defensively before spawning the download tool.

/// Returns `true` when the input carries an explicit HTTP(S) scheme.
pub fn is_well_formed(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Returns `true` when the link denotes a single item rather than a
/// collection.
///
/// A `list=` query parameter or a `playlist` path segment marks a
/// collection.
pub fn is_single_item(url: &str) -> bool {
    !(url.contains("playlist") || url.contains("list="))
}
