//! Shared state for the tool handlers.
//!
//! A [`TranslationSession`] is created once at startup and handed to every
//! handler. It owns the provider handle (immutable after construction) and a
//! single mutex guarding both the operation history and the usage cache, so
//! concurrent tool calls cannot interleave an append or a cache refresh.
//!
//! The lock is never held across an `.await`. Usage refreshes are serialised
//! separately by an async lock, so concurrent cache misses share one fetch.

use crate::analysis::{self, UsageAnalysis};
use crate::config::SessionSettings;
use crate::history::{HistoryEntry, OperationHistory};
use crate::provider::TranslationProvider;
use crate::usage_cache::UsageCache;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

/// Mutable part of the session, guarded by one lock.
#[derive(Debug)]
struct SessionState {
    history: OperationHistory,
    usage_cache: UsageCache,
}

/// Context object passed to every tool handler.
pub struct TranslationSession {
    provider: Arc<dyn TranslationProvider>,
    settings: SessionSettings,
    state: Mutex<SessionState>,
    usage_refresh: AsyncMutex<()>,
}

impl TranslationSession {
    /// Session with default settings.
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self::with_settings(provider, SessionSettings::default())
    }

    pub fn with_settings(provider: Arc<dyn TranslationProvider>, settings: SessionSettings) -> Self {
        let state = SessionState {
            history: OperationHistory::with_limit(settings.history_limit),
            usage_cache: UsageCache::new(settings.usage_cache_ttl),
        };
        Self {
            provider,
            settings,
            state: Mutex::new(state),
            usage_refresh: AsyncMutex::new(()),
        }
    }

    pub fn provider(&self) -> &dyn TranslationProvider {
        self.provider.as_ref()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Append an operation to the history.
    pub fn record(&self, operation: &str, details: Value) {
        self.lock().history.record(operation, details);
    }

    /// Copy of the history, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock().history.snapshot()
    }

    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    /// Aggregate statistics over the current history.
    pub fn analyze_history(&self) -> Option<UsageAnalysis> {
        let state = self.lock();
        let result = analysis::analyze(state.history.entries());
        drop(state);
        result
    }

    /// Cached usage payload, if still fresh.
    pub fn cached_usage(&self) -> Option<Value> {
        self.lock().usage_cache.get().cloned()
    }

    /// Exclusive right to fetch and store a fresh usage payload.
    ///
    /// Holders must re-check [`cached_usage`](Self::cached_usage) after
    /// acquiring it: another caller may have refreshed the cache meanwhile.
    pub async fn lock_usage_refresh(&self) -> AsyncMutexGuard<'_, ()> {
        self.usage_refresh.lock().await
    }

    /// Replace the cached usage payload.
    pub fn store_usage(&self, payload: Value) {
        self.lock().usage_cache.store(payload);
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // State stays consistent even if a holder panicked: every mutation is a single call.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
