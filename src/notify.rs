//! User-visible notices.
//!
//! The coordinator does its work silently; the one thing it ever tells
//! the seller is that they were logged out. Notices are queued here and
//! drained by whichever shell is rendering, with per-id deduplication
//! so a burst of identical events surfaces a single message.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// A message for the seller, identified for deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: &'static str,
    pub text: String,
}

/// Pending notices, deduplicated by id until drained.
#[derive(Debug, Default)]
pub struct Noticeboard {
    pending: Mutex<VecDeque<Notice>>,
}

impl Noticeboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notice. A notice whose id is already pending is dropped,
    /// so repeated triggers in quick succession show at most one.
    pub fn push(&self, id: &'static str, text: impl Into<String>) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.iter().any(|n| n.id == id) {
            return;
        }
        pending.push_back(Notice {
            id,
            text: text.into(),
        });
    }

    /// Take everything pending, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.drain(..).collect()
    }
}
