// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The global single-slot job registry.
//!
//! Exactly one job may run at a time. Acquisition is an atomic
//! check-and-set behind one mutex; release is tied to a guard's `Drop`
//! so it runs on success, failure, panic, and cancellation alike.
//! Signalling cancellation never clears the slot itself -- only the
//! running job's guard does, which prevents a successor from being
//! admitted while the cancelled job is still tearing down.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use mixdown_core::types::{ChatId, UserId};

/// The descriptor held in the slot while a job is running.
#[derive(Debug)]
struct ActiveJob {
    owner: UserId,
    origin_chat: ChatId,
    cancel: CancellationToken,
}

/// Outcome of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The requester owned the job; the cancel signal was raised.
    Cancelled,
    /// The slot is empty.
    NoActiveJob,
    /// A job is running but belongs to someone else.
    NotOwner,
}

/// Permission to run one job.
///
/// Carries the cooperative cancellation token and the guard that clears
/// the slot when dropped. Keep it alive for the job's whole lifetime.
pub struct JobGrant {
    /// Signalled when the owner requests cancellation.
    pub cancel: CancellationToken,
    _guard: SlotGuard,
}

/// Clears the slot on drop -- the guaranteed-release path.
struct SlotGuard {
    supervisor: Arc<JobSupervisor>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.supervisor.release();
    }
}

/// Process-wide single-slot job supervisor.
///
/// The slot is the only shared mutable state here and is guarded by a
/// single `std::sync::Mutex`; it is never held across an await.
#[derive(Debug, Default)]
pub struct JobSupervisor {
    slot: Mutex<Option<ActiveJob>>,
}

impl JobSupervisor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Attempts to claim the job slot for `owner`.
    ///
    /// Returns `None` when a job is already running. The check and the
    /// set happen under one lock acquisition, so concurrent callers can
    /// never both see an empty slot.
    pub fn try_acquire(self: &Arc<Self>, owner: UserId, origin_chat: ChatId) -> Option<JobGrant> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            debug!(owner = owner.0, "job slot busy, acquisition refused");
            return None;
        }

        let cancel = CancellationToken::new();
        *slot = Some(ActiveJob {
            owner,
            origin_chat,
            cancel: cancel.clone(),
        });
        info!(owner = owner.0, origin_chat = origin_chat.0, "job slot granted");

        Some(JobGrant {
            cancel,
            _guard: SlotGuard {
                supervisor: Arc::clone(self),
            },
        })
    }

    /// Requests cancellation of the active job.
    ///
    /// Only the job's owner may cancel it. The cancel token is signalled
    /// but the slot stays occupied until the job's guard drops.
    pub fn request_cancel(&self, requester: UserId) -> CancelOutcome {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            None => CancelOutcome::NoActiveJob,
            Some(job) if job.owner != requester => {
                debug!(
                    requester = requester.0,
                    owner = job.owner.0,
                    "cancel refused: not the job owner"
                );
                CancelOutcome::NotOwner
            }
            Some(job) => {
                info!(owner = job.owner.0, "cancel signal raised");
                job.cancel.cancel();
                CancelOutcome::Cancelled
            }
        }
    }

    /// Whether a job currently holds the slot.
    pub fn is_busy(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// The origin chat of the active job, if any. Used for diagnostics.
    pub fn active_origin(&self) -> Option<ChatId> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|job| job.origin_chat)
    }

    /// Clears the slot unconditionally. Called exactly once per granted
    /// job, from the guard's `Drop`.
    fn release(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.take().is_some() {
            debug!("job slot released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: i64) -> (UserId, ChatId) {
        (UserId(n), ChatId(n * 100))
    }

    #[test]
    fn grant_then_busy_then_free_after_drop() {
        let supervisor = JobSupervisor::new();
        let (owner, chat) = ids(1);

        let grant = supervisor.try_acquire(owner, chat).expect("slot is empty");
        assert!(supervisor.is_busy());
        assert!(supervisor.try_acquire(UserId(2), ChatId(200)).is_none());

        drop(grant);
        assert!(!supervisor.is_busy());
        assert!(supervisor.try_acquire(UserId(2), ChatId(200)).is_some());
    }

    #[test]
    fn cancel_requires_ownership() {
        let supervisor = JobSupervisor::new();
        let (owner, chat) = ids(1);

        assert_eq!(
            supervisor.request_cancel(owner),
            CancelOutcome::NoActiveJob
        );

        let grant = supervisor.try_acquire(owner, chat).expect("slot is empty");
        assert_eq!(supervisor.request_cancel(UserId(99)), CancelOutcome::NotOwner);
        assert!(!grant.cancel.is_cancelled());

        assert_eq!(supervisor.request_cancel(owner), CancelOutcome::Cancelled);
        assert!(grant.cancel.is_cancelled());
    }

    #[test]
    fn cancel_signal_does_not_clear_the_slot() {
        let supervisor = JobSupervisor::new();
        let (owner, chat) = ids(1);

        let grant = supervisor.try_acquire(owner, chat).expect("slot is empty");
        assert_eq!(supervisor.request_cancel(owner), CancelOutcome::Cancelled);

        // The cancelled job is still tearing down; no successor admitted.
        assert!(supervisor.is_busy());
        assert!(supervisor.try_acquire(UserId(2), ChatId(200)).is_none());

        drop(grant);
        assert!(!supervisor.is_busy());
    }

    #[test]
    fn active_origin_reports_running_job() {
        let supervisor = JobSupervisor::new();
        assert_eq!(supervisor.active_origin(), None);

        let _grant = supervisor
            .try_acquire(UserId(1), ChatId(42))
            .expect("slot is empty");
        assert_eq!(supervisor.active_origin(), Some(ChatId(42)));
    }

    /// N concurrent acquisition attempts yield exactly 1 grant and N-1
    /// refusals, even when all tasks start at the same instant.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_acquires_grant_exactly_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        const ATTEMPTS: usize = 32;

        let supervisor = JobSupervisor::new();
        let grants = Arc::new(AtomicUsize::new(0));
        let busy = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(tokio::sync::Barrier::new(ATTEMPTS));

        let mut handles = Vec::new();
        for n in 0..ATTEMPTS {
            let supervisor = Arc::clone(&supervisor);
            let grants = Arc::clone(&grants);
            let busy = Arc::clone(&busy);
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                match supervisor.try_acquire(UserId(n as i64), ChatId(n as i64)) {
                    Some(grant) => {
                        grants.fetch_add(1, Ordering::SeqCst);
                        // Hold the grant until every attempt has resolved.
                        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                        drop(grant);
                    }
                    None => {
                        busy.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }));
        }

        for handle in handles {
            handle.await.expect("task should not panic");
        }

        assert_eq!(grants.load(Ordering::SeqCst), 1);
        assert_eq!(busy.load(Ordering::SeqCst), ATTEMPTS - 1);
        assert!(!supervisor.is_busy());
    }

    /// The guard releases the slot even when the owning task panics.
    #[tokio::test]
    async fn slot_released_on_task_panic() {
        let supervisor = JobSupervisor::new();
        let inner = Arc::clone(&supervisor);

        let handle = tokio::spawn(async move {
            let _grant = inner
                .try_acquire(UserId(1), ChatId(1))
                .expect("slot is empty");
            panic!("job blew up");
        });

        assert!(handle.await.is_err());
        assert!(!supervisor.is_busy());
    }
}
