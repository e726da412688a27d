//! Server-side host for the Disqus comment widget.
//!
//! [`controller::WidgetController`] owns the widget lifecycle on one page: it
//! injects the embed script once, reconfigures the live widget when the page
//! changes, mirrors the site theme onto the `disqus_thread` container, and undoes
//! its effects on unmount. The DOM and the embed runtime sit behind the
//! [`dom::DocumentPort`] and [`runtime::WidgetRuntime`] ports.

pub mod config;
pub mod controller;
pub mod dom;
pub mod host;
pub mod page;
pub mod render;
pub mod routing;
pub mod runtime;
pub mod sdk;
pub mod server;
pub mod theme;

pub use config::{EnvSiteConfig, SiteConfig, StaticSiteConfig, WidgetConfiguration};
pub use controller::{MountOutcome, WidgetController, WidgetError, WidgetState};
pub use dom::{DocumentPort, HtmlDocument};
pub use host::CommentsHost;
pub use page::{PageConfig, PageContext};
pub use runtime::{EmbedRuntime, ResetRequest, WidgetRuntime};
pub use theme::ThemeState;
