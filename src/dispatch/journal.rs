//! Journal dispatcher.
//!
//! Used by the operator CLI, where the ledger runs detached from the targets:
//! each approved invocation is appended to a JSON Lines journal that a relayer
//! replays against the real endpoint. Only endpoints listed as callable are
//! accepted.
//!
//! `invoke` only stages the invocation. The caller persists the ledger first
//! and then calls `commit` to append the staged lines, so a ledger that failed
//! to save never leaves a journaled invocation behind.

use super::traits::*;
use crate::primitives::Address;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::AsyncWriteExt;

/// Appends invocations to a journal file.
#[derive(Debug, Clone)]
pub struct JournalDispatcher {
    callable: BTreeSet<Address>,
    journal_path: PathBuf,
    staged: Arc<Mutex<Vec<Invocation>>>,
}

impl JournalDispatcher {
    pub fn new<I: IntoIterator<Item = Address>>(callable: I, journal_path: PathBuf) -> Self {
        Self {
            callable: callable.into_iter().collect(),
            journal_path,
            staged: Arc::default(),
        }
    }

    pub fn journal_path(&self) -> &PathBuf {
        &self.journal_path
    }

    /// Invocations accepted by `invoke` but not yet written.
    pub fn staged(&self) -> Vec<Invocation> {
        self.staged_lock().clone()
    }

    /// Append every staged invocation to the journal, returning how many
    /// were written. Staged entries are kept if the write fails.
    pub async fn commit(&self) -> DispatchResult<usize> {
        let pending = self.staged();
        if pending.is_empty() {
            return Ok(0);
        }

        let mut lines = String::new();
        for call in &pending {
            lines.push_str(
                &serde_json::to_string(call)
                    .map_err(|e| DispatchError::Transport(e.to_string()))?,
            );
            lines.push('\n');
        }

        if let Some(parent) = self.journal_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DispatchError::Transport(e.to_string()))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.journal_path)
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        file.write_all(lines.as_bytes())
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let mut staged = self.staged_lock();
        *staged = staged.split_off(pending.len());
        drop(staged);
        tracing::debug!(count = pending.len(), "invocations journaled");
        Ok(pending.len())
    }

    /// Read back every journaled invocation, oldest first.
    pub async fn read_journal(&self) -> DispatchResult<Vec<Invocation>> {
        let contents = match tokio::fs::read_to_string(&self.journal_path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DispatchError::Transport(e.to_string())),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| DispatchError::Transport(e.to_string()))
            })
            .collect()
    }

    fn staged_lock(&self) -> MutexGuard<'_, Vec<Invocation>> {
        self.staged.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Dispatcher for JournalDispatcher {
    async fn is_callable(&self, endpoint: &Address) -> bool {
        self.callable.contains(endpoint)
    }

    async fn invoke(&self, call: &Invocation) -> DispatchResult<CallOutcome> {
        if !self.callable.contains(&call.endpoint) {
            return Err(DispatchError::Unreachable(call.endpoint));
        }

        self.staged_lock().push(call.clone());
        tracing::debug!(endpoint = %call.endpoint, "invocation staged");
        Ok(CallOutcome::success(Vec::new()))
    }
}
