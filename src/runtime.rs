use crate::page::PageConfig;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Reset issued to a loaded widget. `config: None` with `reload: false`
/// releases the thread and the handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    pub reload: bool,
    pub config: Option<PageConfig>,
}

impl ResetRequest {
    pub fn reconfigure(config: PageConfig) -> Self {
        Self {
            reload: true,
            config: Some(config),
        }
    }

    pub fn release() -> Self {
        Self {
            reload: false,
            config: None,
        }
    }

    pub fn is_release(&self) -> bool {
        !self.reload && self.config.is_none()
    }
}

/// Port onto the third-party embed runtime's global API.
pub trait WidgetRuntime: Send + Sync {
    /// Whether a live widget handle exists.
    fn is_loaded(&self) -> bool;
    /// Registers the callback the runtime consults once its script has loaded.
    fn configure(&self, config: PageConfig);
    fn reset(&self, request: ResetRequest);
}

#[derive(Debug, Default)]
struct EmbedState {
    loaded: bool,
    pending: Option<PageConfig>,
    active: Option<PageConfig>,
    resets: Vec<ResetRequest>,
    configure_calls: usize,
}

/// In-process model of the embed runtime: holds the registered configuration
/// callback, the live thread, and every reset it received.
#[derive(Debug, Default)]
pub struct EmbedRuntime {
    state: Mutex<EmbedState>,
}

impl EmbedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, EmbedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Called when the embed script finished loading: the runtime reads the
    /// registered configuration and the handle comes alive. Returns the thread
    /// it opened, if a configuration was registered.
    pub fn complete_load(&self) -> Option<PageConfig> {
        let mut state = self.lock();
        state.loaded = true;
        state.active = state.pending.take();
        info!(identifier = ?state.active.as_ref().map(|c| &c.identifier), "embed runtime loaded");
        state.active.clone()
    }

    pub fn pending_config(&self) -> Option<PageConfig> {
        self.lock().pending.clone()
    }

    pub fn active_thread(&self) -> Option<PageConfig> {
        self.lock().active.clone()
    }

    pub fn resets(&self) -> Vec<ResetRequest> {
        self.lock().resets.clone()
    }

    pub fn configure_calls(&self) -> usize {
        self.lock().configure_calls
    }
}

impl WidgetRuntime for EmbedRuntime {
    fn is_loaded(&self) -> bool {
        self.lock().loaded
    }

    fn configure(&self, config: PageConfig) {
        let mut state = self.lock();
        debug!(identifier = %config.identifier, "registered embed configuration");
        state.configure_calls += 1;
        state.pending = Some(config);
    }

    fn reset(&self, request: ResetRequest) {
        let mut state = self.lock();
        if request.is_release() {
            state.loaded = false;
            state.active = None;
            state.pending = None;
        } else if let Some(config) = &request.config {
            state.active = Some(config.clone());
        }
        state.resets.push(request);
    }
}
