//! Lifecycle of the embedded discussion widget on one page container.
//!
//! The controller injects the embed script once, reconfigures the live widget in
//! place when the page changes, mirrors the site theme onto the container, and
//! reverses its DOM and runtime effects on unmount. Every failure is logged and
//! swallowed: the page renders whether or not comments ever load.

use crate::config::{ConfigError, SiteConfig, WidgetConfiguration};
use crate::dom::{DocumentPort, DomError, ScriptElement};
use crate::page::{PageConfig, PageContext};
use crate::runtime::{ResetRequest, WidgetRuntime};
use crate::theme::ThemeState;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

pub const EMBED_HOST: &str = "disqus.com";
pub const EMBED_PATH: &str = "/embed.js";

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("widget configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("widget presentation error: {0}")]
    Presentation(#[from] DomError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Unloaded,
    Loaded,
}

/// Which branch a mount took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Injected { src: String },
    Reconfigured,
    /// The script is still loading; its pending configuration was replaced.
    Requeued,
    Skipped,
}

pub fn embed_src(account: &str) -> String {
    format!("https://{account}.{EMBED_HOST}{EMBED_PATH}")
}

pub struct WidgetController<D: DocumentPort> {
    document: D,
    runtime: Arc<dyn WidgetRuntime>,
    site: Arc<dyn SiteConfig>,
    injected: Option<String>,
    errors_reported: usize,
}

impl<D: DocumentPort> WidgetController<D> {
    pub fn new(document: D, runtime: Arc<dyn WidgetRuntime>, site: Arc<dyn SiteConfig>) -> Self {
        Self {
            document,
            runtime,
            site,
            injected: None,
            errors_reported: 0,
        }
    }

    pub fn state(&self) -> WidgetState {
        if self.injected.is_some() || self.runtime.is_loaded() {
            WidgetState::Loaded
        } else {
            WidgetState::Unloaded
        }
    }

    /// Renders the widget container with the class for `theme`, retagging it
    /// when the page already has one.
    pub fn render_container(&mut self, theme: ThemeState) {
        if let Err(err) = self.document.ensure_container(theme.container_class()) {
            self.report(err.into());
        }
    }

    pub fn mount_or_reconfigure(&mut self, page: &PageContext) -> MountOutcome {
        match self.try_mount(page) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report(err);
                MountOutcome::Skipped
            }
        }
    }

    fn try_mount(&mut self, page: &PageContext) -> Result<MountOutcome, WidgetError> {
        let widget = WidgetConfiguration::resolve(self.site.as_ref())?;
        let config = PageConfig::for_page(page, widget.locale.as_deref());

        if self.runtime.is_loaded() {
            info!(identifier = %config.identifier, "reconfiguring comment widget in place");
            self.runtime.reset(ResetRequest::reconfigure(config));
            return Ok(MountOutcome::Reconfigured);
        }

        if self.injected.is_some() {
            debug!(identifier = %config.identifier, "embed script still loading; replacing pending configuration");
            self.runtime.configure(config);
            return Ok(MountOutcome::Requeued);
        }

        let script = ScriptElement {
            src: embed_src(&widget.account),
            timestamp: chrono::Utc::now().timestamp_millis(),
            is_async: true,
        };
        self.document.append_script(&script)?;
        self.runtime.configure(config);
        info!(account = %widget.account, src = %script.src, identifier = %page.identifier, "injected comment widget script");
        self.injected = Some(script.src.clone());
        Ok(MountOutcome::Injected { src: script.src })
    }

    /// Reverses every effect of earlier mounts. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if let Some(src) = self.injected.take() {
            match self.document.remove_script(&src) {
                Ok(true) => debug!(%src, "removed comment widget script"),
                Ok(false) => debug!(%src, "comment widget script already gone"),
                Err(err) => self.report(err.into()),
            }
        }
        if self.runtime.is_loaded() {
            self.runtime.reset(ResetRequest::release());
            debug!("released comment widget handle");
        }
    }

    pub fn apply_theme(&mut self, theme: ThemeState) {
        let Some(dark) = theme.is_dark() else {
            return;
        };
        if !self.runtime.is_loaded() {
            return;
        }
        if let Err(err) = self.document.set_container_theme(dark) {
            self.report(err.into());
        }
    }

    /// Whether the embed runtime holds a live widget handle.
    pub fn is_widget_live(&self) -> bool {
        self.runtime.is_loaded()
    }

    pub fn errors_reported(&self) -> usize {
        self.errors_reported
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    fn report(&mut self, err: WidgetError) {
        self.errors_reported += 1;
        match &err {
            WidgetError::Configuration(_) => error!(%err, "comment widget not loaded"),
            WidgetError::Presentation(_) => error!(%err, "failed to update comment widget"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ACCOUNT_KEY, LOCALE_KEY, StaticSiteConfig};
    use crate::dom::HtmlDocument;
    use crate::runtime::EmbedRuntime;
    use crate::theme::{DARK_CLASS, LIGHT_CLASS};

    const PAGE: &str = "<html><head><title>T</title></head><body><main></main></body></html>";

    fn controller(site: StaticSiteConfig) -> (WidgetController<HtmlDocument>, Arc<EmbedRuntime>) {
        let runtime = Arc::new(EmbedRuntime::new());
        let controller =
            WidgetController::new(HtmlDocument::parse(PAGE), runtime.clone(), Arc::new(site));
        (controller, runtime)
    }

    fn example_site() -> StaticSiteConfig {
        StaticSiteConfig::default().with(ACCOUNT_KEY, "example")
    }

    fn page(path: &str, title: &str) -> PageContext {
        PageContext::new(format!("https://x{path}"), path, Some(title.to_string()))
    }

    fn embed_scripts(c: &WidgetController<HtmlDocument>) -> usize {
        c.document().count_scripts(EMBED_HOST)
    }

    #[test]
    fn missing_account_is_reported_once_and_changes_nothing() {
        let (mut c, runtime) = controller(StaticSiteConfig::default());
        assert_eq!(c.mount_or_reconfigure(&page("/a", "A")), MountOutcome::Skipped);
        assert_eq!(embed_scripts(&c), 0);
        assert_eq!(c.errors_reported(), 1);
        assert_eq!(c.state(), WidgetState::Unloaded);
        assert_eq!(runtime.configure_calls(), 0);
        assert!(!runtime.is_loaded());
    }

    #[test]
    fn navigation_scenario_injects_once_reconfigures_then_cleans_up() {
        let (mut c, runtime) = controller(example_site());

        let first = c.mount_or_reconfigure(&page("/a", "A"));
        assert_eq!(
            first,
            MountOutcome::Injected {
                src: "https://example.disqus.com/embed.js".into()
            }
        );
        assert_eq!(embed_scripts(&c), 1);
        assert_eq!(c.state(), WidgetState::Loaded);
        assert_eq!(runtime.complete_load().unwrap().identifier, "/a");

        assert_eq!(
            c.mount_or_reconfigure(&page("/b", "B")),
            MountOutcome::Reconfigured
        );
        assert_eq!(embed_scripts(&c), 1);
        let resets = runtime.resets();
        assert_eq!(resets.len(), 1);
        assert!(resets[0].reload);
        let cfg = resets[0].config.as_ref().unwrap();
        assert_eq!(cfg.url, "https://x/b");
        assert_eq!(cfg.identifier, "/b");
        assert_eq!(cfg.title.as_deref(), Some("B"));

        c.unmount();
        assert_eq!(embed_scripts(&c), 0);
        assert_eq!(c.state(), WidgetState::Unloaded);
        assert!(runtime.resets().last().unwrap().is_release());
    }

    #[test]
    fn repeated_navigation_keeps_a_single_script() {
        let (mut c, runtime) = controller(example_site().with(LOCALE_KEY, "de"));
        c.mount_or_reconfigure(&page("/0", "0"));
        runtime.complete_load();
        for i in 1..6 {
            c.mount_or_reconfigure(&page(&format!("/{i}"), "n"));
            assert_eq!(embed_scripts(&c), 1);
        }
        let resets = runtime.resets();
        assert_eq!(resets.len(), 5);
        assert!(
            resets
                .iter()
                .all(|r| r.config.as_ref().unwrap().language.as_deref() == Some("de"))
        );
    }

    #[test]
    fn remount_before_load_replaces_pending_configuration() {
        let (mut c, runtime) = controller(example_site());
        c.mount_or_reconfigure(&page("/a", "A"));
        assert_eq!(
            c.mount_or_reconfigure(&page("/b", "B")),
            MountOutcome::Requeued
        );
        assert_eq!(embed_scripts(&c), 1);
        assert!(runtime.resets().is_empty());
        assert_eq!(runtime.complete_load().unwrap().identifier, "/b");
    }

    #[test]
    fn unmount_is_idempotent() {
        let (mut c, runtime) = controller(example_site());
        c.unmount();
        c.mount_or_reconfigure(&page("/a", "A"));
        runtime.complete_load();
        c.unmount();
        c.unmount();
        assert_eq!(c.errors_reported(), 0);
        assert_eq!(runtime.resets().len(), 1);
        assert_eq!(embed_scripts(&c), 0);
    }

    #[test]
    fn mount_after_unmount_starts_fresh() {
        let (mut c, runtime) = controller(example_site());
        c.mount_or_reconfigure(&page("/a", "A"));
        runtime.complete_load();
        c.unmount();
        assert!(matches!(
            c.mount_or_reconfigure(&page("/b", "B")),
            MountOutcome::Injected { .. }
        ));
        assert_eq!(embed_scripts(&c), 1);
    }

    #[test]
    fn theme_toggles_container_classes_only_while_loaded() {
        let (mut c, runtime) = controller(example_site());
        c.render_container(ThemeState::Unresolved);
        c.apply_theme(ThemeState::Dark);
        assert_eq!(
            c.document().container_classes().unwrap(),
            vec![LIGHT_CLASS.to_string()]
        );

        c.mount_or_reconfigure(&page("/a", "A"));
        runtime.complete_load();
        c.apply_theme(ThemeState::Dark);
        assert_eq!(
            c.document().container_classes().unwrap(),
            vec![DARK_CLASS.to_string()]
        );
        c.apply_theme(ThemeState::Unresolved);
        assert_eq!(
            c.document().container_classes().unwrap(),
            vec![DARK_CLASS.to_string()]
        );
        c.apply_theme(ThemeState::Light);
        assert_eq!(
            c.document().container_classes().unwrap(),
            vec![LIGHT_CLASS.to_string()]
        );
        assert_eq!(runtime.resets().len(), 0);
    }

    #[test]
    fn theme_without_container_is_logged_not_fatal() {
        let (mut c, runtime) = controller(example_site());
        c.mount_or_reconfigure(&page("/a", "A"));
        runtime.complete_load();
        c.apply_theme(ThemeState::Dark);
        assert_eq!(c.errors_reported(), 1);
        assert_eq!(c.state(), WidgetState::Loaded);
    }
}
