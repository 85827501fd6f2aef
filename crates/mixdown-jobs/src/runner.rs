// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Executes one granted job: fetch, deliver, report.
//!
//! The runner is spawned as a detached task so the event loop stays
//! responsive while a job is in flight. It observes the cancellation
//! token cooperatively at step boundaries (before the fetch and before
//! delivery) and never aborts fetch I/O that is already in progress.
//! Every exit path edits the status message first and releases the slot
//! after, so a successor is only admitted once the outcome is visible.

use std::sync::Arc;

use tracing::{error, info, warn};

use mixdown_core::types::{ChatId, DeliveryTarget, MessageId, OutputName, UserId};
use mixdown_core::{MediaFetcher, MessagingGateway};

use crate::supervisor::JobGrant;

/// Status text while the fetch is running.
pub const STATUS_WORKING: &str = "Working on it, this can take a while...";
/// Status text after successful delivery.
pub const STATUS_DONE: &str = "Done, enjoy!";
/// Status text after an observed cancel signal.
pub const STATUS_CANCELLED: &str = "Job cancelled.";

/// Everything the runner needs to execute one job.
#[derive(Debug, Clone)]
pub struct JobDescriptor {
    /// The user the job belongs to; the only one allowed to cancel it.
    pub owner: UserId,
    /// The chat the dialogue ran in.
    pub origin_chat: ChatId,
    /// The validated single-item link.
    pub link: String,
    /// Output naming choice collected during the dialogue.
    pub output_name: OutputName,
    /// Where the finished file goes.
    pub target: DeliveryTarget,
    /// The editable status message, already sent by the dialogue.
    pub status_chat: ChatId,
    pub status_message: MessageId,
}

impl JobDescriptor {
    /// The chat the finished file is delivered to.
    pub fn delivery_chat(&self) -> ChatId {
        match self.target {
            DeliveryTarget::DirectMessage => self.owner.private_chat(),
            DeliveryTarget::OriginChat => self.origin_chat,
        }
    }
}

/// How a job terminated. Every variant has already been reported to the
/// user by the time the runner returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed,
    Cancelled,
}

/// Runs one granted job to completion.
///
/// Failures in the fetch or delivery steps are caught here, logged, and
/// surfaced as an edited status message; they never propagate. The slot
/// is released when `grant` drops, strictly after the terminal status
/// edit.
pub async fn run_job<G, F>(
    gateway: Arc<G>,
    fetcher: Arc<F>,
    job: JobDescriptor,
    grant: JobGrant,
) -> JobOutcome
where
    G: MessagingGateway,
    F: MediaFetcher,
{
    let cancel = grant.cancel.clone();
    let outcome = drive(gateway.as_ref(), fetcher.as_ref(), &job, &cancel).await;
    info!(owner = job.owner.0, outcome = ?outcome, "job finished");
    // The terminal status edit has happened; only now may the slot open.
    drop(grant);
    outcome
}

async fn drive<G, F>(
    gateway: &G,
    fetcher: &F,
    job: &JobDescriptor,
    cancel: &tokio_util::sync::CancellationToken,
) -> JobOutcome
where
    G: MessagingGateway,
    F: MediaFetcher,
{
    edit_status(gateway, job, STATUS_WORKING).await;

    if cancel.is_cancelled() {
        edit_status(gateway, job, STATUS_CANCELLED).await;
        return JobOutcome::Cancelled;
    }

    let track = match fetcher.fetch(&job.link).await {
        Ok(track) => track,
        Err(e) => {
            error!(error = %e, link = job.link.as_str(), "fetch failed");
            edit_status(gateway, job, &format!("Failed: {e}")).await;
            return JobOutcome::Failed;
        }
    };

    // Checkpoint: a cancel raised mid-fetch is observed here, before
    // delivery starts.
    if cancel.is_cancelled() {
        edit_status(gateway, job, STATUS_CANCELLED).await;
        return JobOutcome::Cancelled;
    }

    let display_name = job.output_name.resolve(&track.title);
    let extension = track
        .path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp3");
    let filename = format!("{display_name}.{extension}");

    if let Err(e) = gateway
        .send_document(job.delivery_chat(), &track.path, &filename)
        .await
    {
        error!(error = %e, filename = filename.as_str(), "delivery failed");
        edit_status(gateway, job, &format!("Failed: {e}")).await;
        return JobOutcome::Failed;
    }

    edit_status(gateway, job, STATUS_DONE).await;
    JobOutcome::Completed
}

/// Best-effort status edit; a transport hiccup here must not kill the job.
async fn edit_status<G: MessagingGateway>(gateway: &G, job: &JobDescriptor, text: &str) {
    if let Err(e) = gateway
        .edit_text(job.status_chat, job.status_message, text)
        .await
    {
        warn!(error = %e, "status edit failed");
    }
}
