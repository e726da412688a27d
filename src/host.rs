use crate::controller::{MountOutcome, WidgetController};
use crate::dom::DocumentPort;
use crate::page::PageContext;
use crate::theme::ThemeState;
use tracing::trace;

/// Change-notification binding between a host page and its widget controller.
///
/// The host forwards every page and theme observation; the controller is invoked
/// once per distinct value, in the order the values arrive.
pub struct CommentsHost<D: DocumentPort> {
    controller: WidgetController<D>,
    page: Option<PageContext>,
    theme: Option<ThemeState>,
}

impl<D: DocumentPort> CommentsHost<D> {
    pub fn new(controller: WidgetController<D>) -> Self {
        Self {
            controller,
            page: None,
            theme: None,
        }
    }

    /// Returns `None` when `page` equals the last observed page.
    pub fn on_page_context_changed(&mut self, page: PageContext) -> Option<MountOutcome> {
        if self.page.as_ref() == Some(&page) {
            trace!(identifier = %page.identifier, "page context unchanged");
            return None;
        }
        let outcome = self.controller.mount_or_reconfigure(&page);
        self.page = Some(page);
        Some(outcome)
    }

    /// Returns whether the controller was invoked. Before the widget is live
    /// the container is re-rendered with the new class instead.
    pub fn on_theme_changed(&mut self, theme: ThemeState) -> bool {
        if self.theme == Some(theme) {
            return false;
        }
        if self.controller.is_widget_live() {
            self.controller.apply_theme(theme);
        } else if theme != ThemeState::Unresolved {
            self.controller.render_container(theme);
        }
        self.theme = Some(theme);
        true
    }

    /// Runs the controller's teardown; the next page observation mounts afresh.
    pub fn unmount(&mut self) {
        self.controller.unmount();
        self.page = None;
    }

    pub fn controller(&self) -> &WidgetController<D> {
        &self.controller
    }
}
