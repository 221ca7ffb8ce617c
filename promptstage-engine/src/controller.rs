//! The generation controller.
//!
//! One controller instance owns provider selection for the whole process. It
//! moves through a small state machine (`Idle -> Initializing -> Ready <->
//! Switching`, with `Error` reachable from anywhere), dispatches generation
//! calls to the selected adapter, and attributes every call to the usage
//! ledger.
//!
//! Concurrency: the controller never queues or cancels. Each dispatch
//! captures the selected provider and an epoch counter; a provider switch
//! bumps the epoch, so a call that completes after a mid-flight switch keeps
//! its ledger attribution but does not clobber the new selection's state.
//! The `busy` flag is advisory for UI.

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tracing::{debug, info, instrument, warn};

use promptstage_core::{
    GenerationError, GenerationKind, GenerationOptions, GenerationRequest, GenerationResult,
    ProviderFeatures, ProviderKind, StructuredSettings,
};
use promptstage_prompt::CompiledPrompt;
use promptstage_providers::{catalog, AdapterRegistry, ProviderAdapter};
use promptstage_store::{CredentialStore, SettingsStore, UsageLedger};

use crate::error::ControllerError;
use crate::notify::{Notification, NotificationSink, TracingSink};

// ============================================================================
// State
// ============================================================================

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Constructed, not yet initialized.
    Idle,
    /// Looking for a usable provider.
    Initializing,
    /// A provider is selected and usable.
    Ready,
    /// A provider switch is in flight.
    Switching,
    /// The last lifecycle action failed; see `last_error`.
    Error,
}

struct ControllerInner {
    state: ControllerState,
    selected: Option<ProviderKind>,
    busy: bool,
    epoch: u64,
    last_error: Option<String>,
}

impl Default for ControllerInner {
    fn default() -> Self {
        Self {
            state: ControllerState::Idle,
            selected: None,
            busy: false,
            epoch: 0,
            last_error: None,
        }
    }
}

/// What a kind-dispatched [`generate`](GenerationController::generate)
/// call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// A compiled prompt (text operations).
    Prompt(CompiledPrompt),
    /// Generated media (image or video operations).
    Media(GenerationResult),
}

// ============================================================================
// Controller
// ============================================================================

/// Orchestrates provider selection, dispatch, and usage accounting.
pub struct GenerationController {
    registry: AdapterRegistry,
    credentials: Arc<dyn CredentialStore>,
    ledger: Arc<UsageLedger>,
    settings: Arc<SettingsStore>,
    sink: Arc<dyn NotificationSink>,
    inner: Arc<RwLock<ControllerInner>>,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl GenerationController {
    /// Creates a controller over the given stores.
    pub fn new(
        registry: AdapterRegistry,
        credentials: Arc<dyn CredentialStore>,
        ledger: Arc<UsageLedger>,
        settings: Arc<SettingsStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            registry,
            credentials,
            ledger,
            settings,
            sink,
            inner: Arc::new(RwLock::new(ControllerInner::default())),
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Creates a controller with the default tracing notification sink.
    pub fn with_tracing_sink(
        registry: AdapterRegistry,
        credentials: Arc<dyn CredentialStore>,
        ledger: Arc<UsageLedger>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self::new(registry, credentials, ledger, settings, Arc::new(TracingSink))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Selects the first provider with a stored, well-formed credential.
    ///
    /// Providers are tried in catalog order; ones whose credential fails the
    /// shape check are skipped with a warning. Ends in `Ready`, or `Error`
    /// when no provider is usable.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), ControllerError> {
        self.set_state(ControllerState::Initializing).await;

        for &provider in ProviderKind::all() {
            let Some(credential) = self.credentials.get(provider) else {
                continue;
            };
            match self.registry.create_adapter(provider, &credential) {
                Ok(_) => {
                    {
                        let mut inner = self.inner.write().await;
                        inner.selected = Some(provider);
                        inner.state = ControllerState::Ready;
                        inner.last_error = None;
                    }
                    self.notify_change().await;
                    self.remember_selection(provider).await;
                    info!(provider = ?provider, "Controller initialized");
                    return Ok(());
                }
                Err(e) => {
                    warn!(provider = ?provider, error = %e, "Skipping provider with unusable credential");
                }
            }
        }

        let err = ControllerError::NoCredentials;
        self.fail(err.to_string()).await;
        Err(err)
    }

    /// Switches the selection to another provider.
    ///
    /// A no-op when the provider is already selected. On failure the previous
    /// selection and its cached adapter are untouched; on success the epoch
    /// advances so in-flight calls against the old selection cannot clobber
    /// state when they land.
    #[instrument(skip(self))]
    pub async fn switch_provider(&self, provider: ProviderKind) -> Result<(), ControllerError> {
        if self.inner.read().await.selected == Some(provider) {
            debug!(provider = ?provider, "Provider already selected");
            return Ok(());
        }

        self.set_state(ControllerState::Switching).await;

        match self.probe_provider(provider).await {
            Ok(()) => {
                {
                    let mut inner = self.inner.write().await;
                    inner.selected = Some(provider);
                    inner.state = ControllerState::Ready;
                    inner.epoch += 1;
                    inner.busy = false;
                    inner.last_error = None;
                }
                self.notify_change().await;
                self.remember_selection(provider).await;
                info!(provider = ?provider, "Provider switched");
                self.sink.notify(Notification::success(
                    "Provider switched",
                    format!("{provider} is now active"),
                ));
                Ok(())
            }
            Err(err) => {
                self.fail(err.to_string()).await;
                Err(err)
            }
        }
    }

    /// Constructs the adapter for a provider and probes its availability.
    async fn probe_provider(&self, provider: ProviderKind) -> Result<(), ControllerError> {
        let credential = self.credentials.get(provider).ok_or(
            ControllerError::Construction(GenerationError::CredentialMissing { provider }),
        )?;
        let adapter = self
            .registry
            .create_adapter(provider, &credential)
            .map_err(ControllerError::Construction)?;

        if adapter.is_available().await {
            Ok(())
        } else {
            Err(ControllerError::Construction(GenerationError::Network {
                provider,
                detail: "availability probe failed".to_string(),
            }))
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Compiles a prompt for the selected provider and records the text call.
    pub async fn optimize_prompt(&self, base: &str) -> Result<CompiledPrompt, ControllerError> {
        let settings = self.settings.structured().await;
        self.optimize_with(base, &settings).await
    }

    /// Generates an image with the selected provider.
    ///
    /// The prompt is compiled with the stored structured settings first.
    pub async fn generate_image(&self, prompt: &str) -> Result<GenerationResult, ControllerError> {
        let settings = self.settings.structured().await;
        self.generate_image_with(prompt, &settings).await
    }

    /// Generates a video with the selected provider.
    pub async fn generate_video(&self, prompt: &str) -> Result<GenerationResult, ControllerError> {
        let settings = self.settings.structured().await;
        self.generate_video_with(prompt, &settings).await
    }

    /// Dispatches a request by its generation kind, using the request's own
    /// settings instead of the stored defaults.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, ControllerError> {
        match request.kind {
            GenerationKind::Text => self
                .optimize_with(&request.prompt, &request.settings)
                .await
                .map(GenerationOutcome::Prompt),
            GenerationKind::Image => self
                .generate_image_with(&request.prompt, &request.settings)
                .await
                .map(GenerationOutcome::Media),
            GenerationKind::Video => self
                .generate_video_with(&request.prompt, &request.settings)
                .await
                .map(GenerationOutcome::Media),
        }
    }

    async fn optimize_with(
        &self,
        base: &str,
        settings: &StructuredSettings,
    ) -> Result<CompiledPrompt, ControllerError> {
        let (adapter, provider, epoch) = self.begin_dispatch().await?;

        let compiled = adapter.optimize_prompt(base, settings);
        self.record_usage(
            prompt_model(provider),
            GenerationKind::Text,
            base,
            Some(&compiled.text),
        )
        .await;

        self.settle(epoch, provider, None).await;
        Ok(compiled)
    }

    async fn generate_image_with(
        &self,
        prompt: &str,
        settings: &StructuredSettings,
    ) -> Result<GenerationResult, ControllerError> {
        let (adapter, provider, epoch) = self.begin_dispatch().await?;

        let compiled = adapter.optimize_prompt(prompt, settings);
        let options = build_options(&compiled.text, settings, None);
        let dispatch_model = adapter
            .features()
            .default_image_model
            .unwrap_or("unknown")
            .to_string();

        let outcome = adapter.generate_image(&options).await;
        self.finish_media_call(
            outcome,
            GenerationKind::Image,
            &compiled.text,
            dispatch_model,
            provider,
            epoch,
        )
        .await
    }

    async fn generate_video_with(
        &self,
        prompt: &str,
        settings: &StructuredSettings,
    ) -> Result<GenerationResult, ControllerError> {
        let (adapter, provider, epoch) = self.begin_dispatch().await?;

        let compiled = adapter.optimize_prompt(prompt, settings);
        let options = build_options(&compiled.text, settings, None);
        let dispatch_model = adapter
            .features()
            .default_video_model
            .unwrap_or("unknown")
            .to_string();

        let outcome = adapter.generate_video(&options).await;
        self.finish_media_call(
            outcome,
            GenerationKind::Video,
            &compiled.text,
            dispatch_model,
            provider,
            epoch,
        )
        .await
    }

    /// Records the call in the ledger and settles controller state. Both
    /// successes and failures are recorded; the attribution is the
    /// dispatch-time provider and model even after a mid-flight switch.
    async fn finish_media_call(
        &self,
        outcome: Result<GenerationResult, GenerationError>,
        kind: GenerationKind,
        prompt: &str,
        dispatch_model: String,
        provider: ProviderKind,
        epoch: u64,
    ) -> Result<GenerationResult, ControllerError> {
        match outcome {
            Ok(result) => {
                self.record_usage(&result.model, kind, prompt, None).await;
                self.settle(epoch, provider, None).await;
                Ok(result)
            }
            Err(err) => {
                self.record_usage(&dispatch_model, kind, prompt, None).await;
                self.settle(epoch, provider, Some(&err)).await;
                Err(ControllerError::Call(err))
            }
        }
    }

    // ========================================================================
    // Dispatch plumbing
    // ========================================================================

    /// Checks readiness, resolves the selected adapter, and marks the
    /// controller busy. Returns the dispatch-time provider and epoch.
    ///
    /// Credential and construction failures here go through [`settle`]
    /// like call failures, so they set `last_error` and emit one error
    /// notification.
    async fn begin_dispatch(
        &self,
    ) -> Result<(Arc<dyn ProviderAdapter>, ProviderKind, u64), ControllerError> {
        let (provider, epoch) = {
            let inner = self.inner.read().await;
            if inner.state != ControllerState::Ready {
                return Err(ControllerError::NotReady);
            }
            let Some(provider) = inner.selected else {
                return Err(ControllerError::NotReady);
            };
            (provider, inner.epoch)
        };

        let credential = match self.credentials.get(provider) {
            Some(credential) => credential,
            None => {
                let err = GenerationError::CredentialMissing { provider };
                self.settle(epoch, provider, Some(&err)).await;
                return Err(ControllerError::Construction(err));
            }
        };
        let adapter = match self.registry.create_adapter(provider, &credential) {
            Ok(adapter) => adapter,
            Err(err) => {
                self.settle(epoch, provider, Some(&err)).await;
                return Err(ControllerError::Construction(err));
            }
        };

        {
            let mut inner = self.inner.write().await;
            inner.busy = true;
        }
        self.notify_change().await;

        Ok((adapter, provider, epoch))
    }

    /// Applies a dispatch outcome to controller state.
    ///
    /// Skipped entirely when the epoch no longer matches: the result was
    /// raced by a provider switch and must not touch the new selection.
    /// A credential failure for the still-selected provider clears the
    /// selection and drops the cached adapter. Every failure emits exactly
    /// one notification.
    async fn settle(&self, epoch: u64, provider: ProviderKind, error: Option<&GenerationError>) {
        let stale = {
            let mut inner = self.inner.write().await;
            if inner.epoch != epoch {
                true
            } else {
                inner.busy = false;
                match error {
                    None => inner.last_error = None,
                    Some(e) => {
                        inner.last_error = Some(e.to_string());
                        if e.is_credential_failure() && inner.selected == Some(provider) {
                            inner.selected = None;
                            inner.state = ControllerState::Error;
                        }
                    }
                }
                false
            }
        };

        if stale {
            debug!(provider = ?provider, epoch, "Discarding stale dispatch outcome");
            return;
        }

        self.notify_change().await;
        if let Some(e) = error {
            if e.is_credential_failure() {
                self.registry.invalidate(Some(provider));
            }
            self.sink.notify(Notification::error(
                format!("{provider} call failed"),
                e.to_string(),
            ));
        }
    }

    async fn record_usage(
        &self,
        model: &str,
        kind: GenerationKind,
        prompt: &str,
        response: Option<&str>,
    ) {
        if let Err(e) = self.ledger.record(model, kind, prompt, response).await {
            warn!(error = %e, "Failed to record usage");
        }
    }

    async fn remember_selection(&self, provider: ProviderKind) {
        if let Err(e) = self
            .settings
            .set_last_selected_provider(Some(provider))
            .await
        {
            warn!(error = %e, "Failed to persist provider selection");
        }
    }

    async fn set_state(&self, state: ControllerState) {
        {
            let mut inner = self.inner.write().await;
            inner.state = state;
        }
        self.notify_change().await;
    }

    /// Moves to `Error` with a message and emits one error notification.
    /// The current selection is left alone.
    async fn fail(&self, message: String) {
        {
            let mut inner = self.inner.write().await;
            inner.state = ControllerState::Error;
            inner.last_error = Some(message.clone());
        }
        self.notify_change().await;
        self.sink
            .notify(Notification::error("Provider unavailable", message));
    }

    // ========================================================================
    // Exposed state
    // ========================================================================

    /// The current lifecycle state.
    pub async fn state(&self) -> ControllerState {
        self.inner.read().await.state
    }

    /// The selected provider, if any.
    pub async fn selected_provider(&self) -> Option<ProviderKind> {
        self.inner.read().await.selected
    }

    /// All providers the registry can construct.
    pub fn available_providers(&self) -> &'static [ProviderKind] {
        self.registry.available_providers()
    }

    /// Whether a dispatch is currently in flight. Advisory only.
    pub async fn is_busy(&self) -> bool {
        self.inner.read().await.busy
    }

    /// The last error message, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.inner.read().await.last_error.clone()
    }

    /// Clears the last error. Recovers `Error` back to `Ready` when a
    /// provider is still selected, otherwise to `Idle`.
    pub async fn clear_error(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.last_error = None;
            if inner.state == ControllerState::Error {
                inner.state = if inner.selected.is_some() {
                    ControllerState::Ready
                } else {
                    ControllerState::Idle
                };
            }
        }
        self.notify_change().await;
    }

    /// The capability descriptor of the selected provider.
    pub async fn supported_features(&self) -> Option<&'static ProviderFeatures> {
        self.inner.read().await.selected.map(catalog::features)
    }

    /// Subscribes to controller state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Builds adapter options from a compiled prompt and structured settings.
fn build_options(
    prompt: &str,
    settings: &StructuredSettings,
    duration_secs: Option<u32>,
) -> GenerationOptions {
    let mut options = GenerationOptions::new(prompt);
    if let Some(ratio) = settings.aspect_ratio {
        options.aspect_ratio = ratio;
    }
    if let Some(quality) = settings.quality {
        options.quality = quality;
    }
    options.style = settings.style.clone();
    options.duration_secs = duration_secs;
    options
}

/// The model text operations are attributed to per provider.
fn prompt_model(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Google => "gemini-2.5-flash",
        ProviderKind::ChatGpt => "gpt-4o-mini",
        ProviderKind::Anthropic => "claude-3-sonnet-20240229",
        ProviderKind::Kling => "kling-v1",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::notify::NotificationKind;
    use promptstage_providers::Credential;
    use promptstage_store::MemoryCredentialStore;

    /// Test sink that records every notification.
    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<Notification>>,
    }

    impl RecordingSink {
        fn notifications(&self) -> Vec<Notification> {
            self.delivered
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn notify(&self, notification: Notification) {
            self.delivered
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(notification);
        }
    }

    struct Harness {
        controller: GenerationController,
        ledger: Arc<UsageLedger>,
        sink: Arc<RecordingSink>,
        credentials: Arc<MemoryCredentialStore>,
    }

    fn harness(credentials: MemoryCredentialStore) -> Harness {
        let credentials = Arc::new(credentials);
        let ledger = Arc::new(UsageLedger::in_memory());
        let sink = Arc::new(RecordingSink::default());
        let controller = GenerationController::new(
            AdapterRegistry::new(),
            Arc::clone(&credentials) as Arc<dyn CredentialStore>,
            Arc::clone(&ledger),
            Arc::new(SettingsStore::in_memory()),
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
        );
        Harness {
            controller,
            ledger,
            sink,
            credentials,
        }
    }

    fn kling_only() -> MemoryCredentialStore {
        let store = MemoryCredentialStore::new();
        store
            .set(ProviderKind::Kling, &Credential::key_pair("access", "secret"))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_initialize_selects_first_provider_with_credential() {
        let h = harness(kling_only());

        h.controller.initialize().await.unwrap();
        assert_eq!(h.controller.state().await, ControllerState::Ready);
        assert_eq!(
            h.controller.selected_provider().await,
            Some(ProviderKind::Kling)
        );
    }

    #[tokio::test]
    async fn test_initialize_without_credentials_fails() {
        let h = harness(MemoryCredentialStore::new());

        let err = h.controller.initialize().await.unwrap_err();
        assert!(matches!(err, ControllerError::NoCredentials));
        assert_eq!(h.controller.state().await, ControllerState::Error);
        assert!(h.controller.last_error().await.is_some());
        // Exactly one error notification
        assert_eq!(h.sink.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_initialize_skips_malformed_credentials() {
        let store = kling_only();
        // ChatGPT comes before Kling in catalog order, but its key is garbage
        store
            .set(ProviderKind::ChatGpt, &Credential::api_key("not-a-key"))
            .unwrap();
        let h = harness(store);

        h.controller.initialize().await.unwrap();
        assert_eq!(
            h.controller.selected_provider().await,
            Some(ProviderKind::Kling)
        );
    }

    #[tokio::test]
    async fn test_switch_to_same_provider_is_noop() {
        let h = harness(kling_only());
        h.controller.initialize().await.unwrap();
        let before = h.sink.notifications().len();

        h.controller
            .switch_provider(ProviderKind::Kling)
            .await
            .unwrap();
        assert_eq!(h.controller.state().await, ControllerState::Ready);
        assert_eq!(h.sink.notifications().len(), before);
    }

    #[tokio::test]
    async fn test_failed_switch_keeps_previous_selection() {
        let h = harness(kling_only());
        h.controller.initialize().await.unwrap();

        let err = h
            .controller
            .switch_provider(ProviderKind::Google)
            .await
            .unwrap_err();
        assert!(err.is_credential_failure());
        assert_eq!(h.controller.state().await, ControllerState::Error);
        assert_eq!(
            h.controller.selected_provider().await,
            Some(ProviderKind::Kling)
        );

        h.controller.clear_error().await;
        assert_eq!(h.controller.state().await, ControllerState::Ready);
    }

    #[tokio::test]
    async fn test_successful_switch_emits_success_notification() {
        let store = kling_only();
        store
            .set(ProviderKind::ChatGpt, &Credential::api_key("sk-proj-test"))
            .unwrap();
        let h = harness(store);
        h.controller.initialize().await.unwrap();
        assert_eq!(
            h.controller.selected_provider().await,
            Some(ProviderKind::ChatGpt)
        );

        // Kling's availability probe is a local shape check, so this switch
        // stays offline.
        h.controller
            .switch_provider(ProviderKind::Kling)
            .await
            .unwrap();
        assert_eq!(
            h.controller.selected_provider().await,
            Some(ProviderKind::Kling)
        );
        assert!(h
            .sink
            .notifications()
            .iter()
            .any(|n| n.kind == NotificationKind::Success));
    }

    #[tokio::test]
    async fn test_dispatch_before_initialize_is_not_ready() {
        let h = harness(kling_only());
        let err = h.controller.generate_image("a cat").await.unwrap_err();
        assert!(matches!(err, ControllerError::NotReady));
    }

    #[tokio::test]
    async fn test_unsupported_operation_short_circuits_and_is_recorded() {
        let store = MemoryCredentialStore::new();
        store
            .set(ProviderKind::ChatGpt, &Credential::api_key("sk-proj-test"))
            .unwrap();
        let h = harness(store);
        h.controller.initialize().await.unwrap();

        // DALL-E has no video endpoint; this fails locally without traffic.
        let err = h.controller.generate_video("waves").await.unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Call(GenerationError::UnsupportedOperation { .. })
        ));

        // Selection survives a non-credential failure
        assert_eq!(
            h.controller.selected_provider().await,
            Some(ProviderKind::ChatGpt)
        );
        assert!(h.controller.last_error().await.is_some());
        assert!(!h.controller.is_busy().await);

        // The attempt is still in the ledger
        let stats = h.ledger.session_stats().await;
        assert_eq!(stats.total_calls, 1);
        assert_eq!(stats.calls_by_kind[&GenerationKind::Video], 1);
    }

    #[tokio::test]
    async fn test_dispatch_credential_loss_sets_last_error_and_notifies() {
        let h = harness(kling_only());
        h.controller.initialize().await.unwrap();
        h.credentials.delete(ProviderKind::Kling).unwrap();
        let before = h.sink.notifications().len();

        let err = h.controller.generate_image("a cat").await.unwrap_err();
        assert!(err.is_credential_failure());

        // The failure lands like any call failure: last error recorded, the
        // dead selection dropped, exactly one error notification.
        assert!(h.controller.last_error().await.is_some());
        assert_eq!(h.controller.state().await, ControllerState::Error);
        assert_eq!(h.controller.selected_provider().await, None);
        assert!(!h.controller.is_busy().await);
        let after = h.sink.notifications();
        assert_eq!(after.len(), before + 1);
        assert_eq!(after[before].kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_stale_outcome_does_not_clobber_new_selection() {
        let store = kling_only();
        store
            .set(ProviderKind::ChatGpt, &Credential::api_key("sk-proj-test"))
            .unwrap();
        let h = harness(store);
        h.controller.initialize().await.unwrap();

        let (_, provider, epoch) = h.controller.begin_dispatch().await.unwrap();
        assert_eq!(provider, ProviderKind::ChatGpt);

        // The switch bumps the epoch while the call is still in flight.
        h.controller
            .switch_provider(ProviderKind::Kling)
            .await
            .unwrap();
        let before = h.sink.notifications().len();

        // The late call keeps its dispatch-time attribution in the ledger...
        h.controller
            .record_usage("dall-e-3", GenerationKind::Image, "late", None)
            .await;
        let err = GenerationError::CredentialMissing { provider };
        h.controller.settle(epoch, provider, Some(&err)).await;

        // ...but must not touch the new selection's state.
        assert_eq!(
            h.controller.selected_provider().await,
            Some(ProviderKind::Kling)
        );
        assert_eq!(h.controller.state().await, ControllerState::Ready);
        assert!(h.controller.last_error().await.is_none());
        assert!(!h.controller.is_busy().await);
        assert_eq!(h.sink.notifications().len(), before);

        let stats = h.ledger.session_stats().await;
        assert_eq!(stats.calls_by_model["dall-e-3"], 1);
    }

    #[tokio::test]
    async fn test_optimize_prompt_records_text_usage() {
        let h = harness(kling_only());
        h.controller.initialize().await.unwrap();

        let compiled = h.controller.optimize_prompt("a cat on a roof").await.unwrap();
        assert!(!compiled.text.is_empty());
        assert_eq!(compiled.provider, ProviderKind::Kling);

        let stats = h.ledger.session_stats().await;
        assert_eq!(stats.total_calls, 1);
        assert_eq!(stats.calls_by_kind[&GenerationKind::Text], 1);
        assert_eq!(stats.calls_by_model["kling-v1"], 1);
    }

    #[tokio::test]
    async fn test_generate_dispatches_text_by_kind() {
        let h = harness(kling_only());
        h.controller.initialize().await.unwrap();

        let request = GenerationRequest::new(GenerationKind::Text, "a cat on a roof");
        let outcome = h.controller.generate(&request).await.unwrap();
        assert!(matches!(outcome, GenerationOutcome::Prompt(_)));
    }

    #[tokio::test]
    async fn test_supported_features_follow_selection() {
        let h = harness(kling_only());
        assert!(h.controller.supported_features().await.is_none());

        h.controller.initialize().await.unwrap();
        let features = h.controller.supported_features().await.unwrap();
        assert_eq!(features.id, ProviderKind::Kling);
        assert!(features.video_generation);
    }

    #[tokio::test]
    async fn test_subscribers_see_lifecycle_changes() {
        let h = harness(kling_only());
        let mut rx = h.controller.subscribe();

        h.controller.initialize().await.unwrap();
        assert!(rx.changed().await.is_ok());
    }
}
