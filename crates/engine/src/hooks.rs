// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional observer callbacks, invoked only from the scheduler's thread.
//!
//! Cross-thread observers must not register hooks; they poll the shared
//! state and drain its error/log queues instead.

use crate::status::OrchestrationStatus;
use vmir_core::{Chunk, CopyOutcome, ProfileResult};

pub type ProgressHook = Box<dyn Fn(&OrchestrationStatus) + Send>;
pub type ChunkCompleteHook = Box<dyn Fn(&Chunk, &CopyOutcome) + Send>;
pub type ProfileCompleteHook = Box<dyn Fn(&ProfileResult) + Send>;

/// Callbacks fired at the end of a tick (progress), after each reap
/// (chunk complete) and at each profile boundary.
#[derive(Default)]
pub struct ObserverHooks {
    pub on_progress: Option<ProgressHook>,
    pub on_chunk_complete: Option<ChunkCompleteHook>,
    pub on_profile_complete: Option<ProfileCompleteHook>,
}

impl ObserverHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress(mut self, hook: impl Fn(&OrchestrationStatus) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(hook));
        self
    }

    pub fn on_chunk_complete(
        mut self,
        hook: impl Fn(&Chunk, &CopyOutcome) + Send + 'static,
    ) -> Self {
        self.on_chunk_complete = Some(Box::new(hook));
        self
    }

    pub fn on_profile_complete(
        mut self,
        hook: impl Fn(&ProfileResult) + Send + 'static,
    ) -> Self {
        self.on_profile_complete = Some(Box::new(hook));
        self
    }

    pub(crate) fn fire_progress(&self, status: &OrchestrationStatus) {
        if let Some(hook) = &self.on_progress {
            hook(status);
        }
    }

    pub(crate) fn fire_chunk_complete(&self, chunk: &Chunk, outcome: &CopyOutcome) {
        if let Some(hook) = &self.on_chunk_complete {
            hook(chunk, outcome);
        }
    }

    pub(crate) fn fire_profile_complete(&self, result: &ProfileResult) {
        if let Some(hook) = &self.on_profile_complete {
            hook(result);
        }
    }
}
