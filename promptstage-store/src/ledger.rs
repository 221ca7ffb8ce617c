//! Usage ledger.
//!
//! Appends one record per attempted generation call, keeps session totals in
//! memory, folds records into per-day aggregates, and persists both the
//! session records and the daily history to disk. Observable via watch
//! channels for UI updates.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use promptstage_core::tokens::{estimate_cost, estimate_tokens, prompt_preview};
use promptstage_core::{DailyUsage, GenerationKind, SessionStats, UsageRecord};

use crate::error::StoreError;
use crate::persistence::{default_ledger_path, load_json_or_default, save_json};

// ============================================================================
// Persisted Shape
// ============================================================================

/// On-disk form of the ledger. Both the running session and the daily
/// history are written, so a restart resumes the session where it left off.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    session: Vec<UsageRecord>,
    #[serde(default)]
    daily: HashMap<String, DailyUsage>,
}

// ============================================================================
// Inner State
// ============================================================================

#[derive(Default)]
struct LedgerInner {
    /// Records for the current session, in insertion order.
    session: Vec<UsageRecord>,
    /// Daily aggregates keyed by ISO date.
    daily: HashMap<String, DailyUsage>,
}

// ============================================================================
// Usage Ledger
// ============================================================================

/// Session and daily usage accounting with JSON persistence.
pub struct UsageLedger {
    inner: Arc<RwLock<LedgerInner>>,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
    path: Option<PathBuf>,
}

impl UsageLedger {
    /// Creates a ledger persisted at the given path, without loading it.
    ///
    /// Use [`open`](Self::open) to pick up existing history.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(LedgerInner::default())),
            notify,
            version: Arc::new(RwLock::new(0)),
            path: Some(path.into()),
        }
    }

    /// Creates an in-memory ledger that never touches disk.
    pub fn in_memory() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(LedgerInner::default())),
            notify,
            version: Arc::new(RwLock::new(0)),
            path: None,
        }
    }

    /// Opens the ledger at the given path, loading any existing session
    /// records and daily history. A missing or unreadable file starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let ledger = Self::new(path);
        ledger.reload().await;
        ledger
    }

    /// Opens the ledger at the platform default path.
    pub async fn open_default() -> Self {
        Self::open(default_ledger_path()).await
    }

    /// Reloads session records and daily history from disk, replacing the
    /// in-memory copies.
    pub async fn reload(&self) {
        let Some(path) = &self.path else { return };
        let file: LedgerFile = load_json_or_default(path).await;
        {
            let mut inner = self.inner.write().await;
            inner.session = file.session;
            inner.daily = file.daily;
        }
        debug!(path = %path.display(), "Ledger history loaded");
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Records one generation call.
    ///
    /// Token counts are estimated from the text heuristically; cost is the
    /// total token count at the model's input rate. Prompt and response are
    /// stored as truncated previews only, never in full. The record is
    /// appended to the session, folded into today's aggregate, and both are
    /// persisted before subscribers are notified.
    pub async fn record(
        &self,
        model: &str,
        kind: GenerationKind,
        prompt: &str,
        response: Option<&str>,
    ) -> Result<UsageRecord, StoreError> {
        let prompt_tokens = estimate_tokens(prompt);
        let completion_tokens = response.map_or(0, estimate_tokens);
        let total_tokens = prompt_tokens + completion_tokens;

        let record = UsageRecord {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            model: model.to_string(),
            kind,
            prompt_tokens,
            completion_tokens,
            total_tokens,
            cost: estimate_cost(model, total_tokens),
            truncated_prompt: prompt_preview(prompt),
            truncated_response: response.map(prompt_preview),
        };

        {
            let mut inner = self.inner.write().await;
            inner.session.push(record.clone());

            let date = record.timestamp.format("%Y-%m-%d").to_string();
            inner
                .daily
                .entry(date.clone())
                .or_insert_with(|| DailyUsage::new(date))
                .add(record.clone());
        }

        self.persist().await?;
        self.notify_change().await;

        debug!(
            model = model,
            kind = %kind,
            tokens = total_tokens,
            "Usage recorded"
        );
        Ok(record)
    }

    /// Clears the current session's records and persists the empty session.
    /// Daily history is kept.
    pub async fn clear_session(&self) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write().await;
            inner.session.clear();
        }
        self.persist().await?;
        self.notify_change().await;
        info!("Session usage cleared");
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns the session's records in insertion order.
    pub async fn session_records(&self) -> Vec<UsageRecord> {
        self.inner.read().await.session.clone()
    }

    /// Aggregates the current session's records.
    pub async fn session_stats(&self) -> SessionStats {
        let inner = self.inner.read().await;
        let mut stats = SessionStats::default();
        for record in &inner.session {
            stats.total_calls += 1;
            stats.total_tokens += u64::from(record.total_tokens);
            stats.total_cost += record.cost;
            *stats.calls_by_kind.entry(record.kind).or_insert(0) += 1;
            *stats
                .calls_by_model
                .entry(record.model.clone())
                .or_insert(0) += 1;
        }
        stats
    }

    /// Returns one day's aggregate, if any calls were recorded that day.
    pub async fn daily_usage(&self, date: &str) -> Option<DailyUsage> {
        self.inner.read().await.daily.get(date).cloned()
    }

    /// Returns the full daily history.
    pub async fn all_daily(&self) -> HashMap<String, DailyUsage> {
        self.inner.read().await.daily.clone()
    }

    /// Returns the last `days` days of aggregates ending today, oldest first.
    /// Days with no recorded calls are skipped.
    pub async fn daily_stats(&self, days: u32) -> Vec<DailyUsage> {
        let inner = self.inner.read().await;
        let today = Utc::now().date_naive();
        let mut window: Vec<DailyUsage> = (0..days)
            .filter_map(|back| {
                let date = today - chrono::Days::new(u64::from(back));
                inner
                    .daily
                    .get(&date.format("%Y-%m-%d").to_string())
                    .cloned()
            })
            .collect();
        window.reverse();
        window
    }

    // ========================================================================
    // Observable
    // ========================================================================

    /// Subscribes to ledger changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Notifies subscribers of a change.
    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }

    /// Writes the session records and daily history to disk, if the ledger
    /// has a path.
    async fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = {
            let inner = self.inner.read().await;
            LedgerFile {
                session: inner.session.clone(),
                daily: inner.daily.clone(),
            }
        };
        save_json(path, &file).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_appends_to_session_and_daily() {
        let ledger = UsageLedger::in_memory();

        let record = ledger
            .record("dall-e-3", GenerationKind::Image, "a cat on a roof", None)
            .await
            .unwrap();
        assert_eq!(record.prompt_tokens, 4);
        assert_eq!(record.completion_tokens, 0);
        assert!((record.cost).abs() < f64::EPSILON); // dall-e-3 bills per call

        let session = ledger.session_records().await;
        assert_eq!(session.len(), 1);

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let day = ledger.daily_usage(&today).await.unwrap();
        assert_eq!(day.calls.len(), 1);
        assert_eq!(day.total_tokens, 4);
    }

    #[tokio::test]
    async fn test_response_contributes_completion_tokens() {
        let ledger = UsageLedger::in_memory();

        let record = ledger
            .record(
                "claude-3-sonnet-20240229",
                GenerationKind::Text,
                "describe a cat",
                Some("A small striped cat sits on a red roof."),
            )
            .await
            .unwrap();
        assert!(record.completion_tokens > 0);
        assert_eq!(
            record.total_tokens,
            record.prompt_tokens + record.completion_tokens
        );
        assert!(record.truncated_response.is_some());
    }

    #[tokio::test]
    async fn test_long_prompt_is_truncated_in_record() {
        let ledger = UsageLedger::in_memory();
        let long_prompt = "x".repeat(500);

        let record = ledger
            .record("gemini-2.5-flash", GenerationKind::Text, &long_prompt, None)
            .await
            .unwrap();
        assert!(record.truncated_prompt.chars().count() < 500);
        assert!(record.truncated_prompt.ends_with("..."));
    }

    #[tokio::test]
    async fn test_session_stats_aggregate() {
        let ledger = UsageLedger::in_memory();
        ledger
            .record("dall-e-3", GenerationKind::Image, "one", None)
            .await
            .unwrap();
        ledger
            .record("dall-e-3", GenerationKind::Image, "two", None)
            .await
            .unwrap();
        ledger
            .record("kling-v1", GenerationKind::Video, "three", None)
            .await
            .unwrap();

        let stats = ledger.session_stats().await;
        assert_eq!(stats.total_calls, 3);
        assert_eq!(stats.calls_by_kind[&GenerationKind::Image], 2);
        assert_eq!(stats.calls_by_kind[&GenerationKind::Video], 1);
        assert_eq!(stats.calls_by_model["dall-e-3"], 2);
    }

    #[tokio::test]
    async fn test_clear_session_keeps_daily_history() {
        let ledger = UsageLedger::in_memory();
        ledger
            .record("dall-e-3", GenerationKind::Image, "a cat", None)
            .await
            .unwrap();

        ledger.clear_session().await.unwrap();
        assert!(ledger.session_records().await.is_empty());

        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert!(ledger.daily_usage(&today).await.is_some());
    }

    #[tokio::test]
    async fn test_session_and_daily_survive_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("usage_ledger.json");

        {
            let ledger = UsageLedger::open(&path).await;
            ledger
                .record("gemini-2.5-flash", GenerationKind::Text, "persist me", None)
                .await
                .unwrap();
        }

        let reopened = UsageLedger::open(&path).await;
        let session = reopened.session_records().await;
        assert_eq!(session.len(), 1);
        assert_eq!(session[0].truncated_prompt, "persist me");

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let day = reopened.daily_usage(&today).await.unwrap();
        assert_eq!(day.calls.len(), 1);
        assert_eq!(day.calls[0].truncated_prompt, "persist me");
    }

    #[tokio::test]
    async fn test_clear_session_is_persisted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("usage_ledger.json");

        {
            let ledger = UsageLedger::open(&path).await;
            ledger
                .record("dall-e-3", GenerationKind::Image, "a cat", None)
                .await
                .unwrap();
            ledger.clear_session().await.unwrap();
        }

        let reopened = UsageLedger::open(&path).await;
        assert!(reopened.session_records().await.is_empty());

        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert!(reopened.daily_usage(&today).await.is_some());
    }

    #[tokio::test]
    async fn test_daily_stats_window_excludes_old_days() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("usage_ledger.json");

        let mut daily = HashMap::new();
        daily.insert(
            "2000-01-01".to_string(),
            DailyUsage::new("2000-01-01".to_string()),
        );
        save_json(
            &path,
            &LedgerFile {
                session: Vec::new(),
                daily,
            },
        )
        .await
        .unwrap();

        let ledger = UsageLedger::open(&path).await;
        ledger
            .record("dall-e-3", GenerationKind::Image, "today", None)
            .await
            .unwrap();

        let window = ledger.daily_stats(7).await;
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].date, Utc::now().format("%Y-%m-%d").to_string());

        // The old day is still in the full history, just outside the window.
        assert_eq!(ledger.all_daily().await.len(), 2);
        assert!(ledger.daily_stats(0).await.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let ledger = UsageLedger::in_memory();
        let mut rx = ledger.subscribe();

        ledger
            .record("dall-e-3", GenerationKind::Image, "notify", None)
            .await
            .unwrap();

        assert!(rx.changed().await.is_ok());
        assert_eq!(*rx.borrow(), 1);
    }
}
