// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-slot job supervision for mixdown.
//!
//! [`JobSupervisor`] guarantees at most one conversion job runs
//! system-wide and gates cancellation on job ownership. [`run_job`]
//! executes one granted job against the gateway and fetcher traits,
//! reporting progress through an editable status message and releasing
//! the slot on every exit path.

pub mod runner;
pub mod supervisor;

pub use runner::{JobDescriptor, JobOutcome, run_job};
pub use supervisor::{CancelOutcome, JobGrant, JobSupervisor};
