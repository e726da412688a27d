use crate::config::SiteConfig;
use crate::controller::{MountOutcome, WidgetController};
use crate::dom::HtmlDocument;
use crate::page::PageContext;
use crate::runtime::EmbedRuntime;
use crate::sdk::bootstrap_script;
use crate::theme::ThemeState;
use std::sync::Arc;
use tracing::{debug, warn};

/// Server-side render of `document` with the comment widget mounted for `page`.
///
/// A rendered page has no live widget yet, so each render mounts against a
/// fresh runtime and ships the registered configuration as an inline
/// `disqus_config` bootstrap ahead of the embed script.
pub fn render_with_comments(
    document: HtmlDocument,
    page: &PageContext,
    site: Arc<dyn SiteConfig>,
    theme: ThemeState,
) -> String {
    let runtime = Arc::new(EmbedRuntime::new());
    let mut controller = WidgetController::new(document, runtime.clone(), site);
    controller.render_container(theme);
    let outcome = controller.mount_or_reconfigure(page);
    let mut document = controller.into_document();

    if let MountOutcome::Injected { src } = &outcome
        && let Some(config) = runtime.pending_config()
    {
        match bootstrap_script(&config) {
            Ok(script) => {
                if let Err(err) = document.prepend_head_script(&script) {
                    warn!(%src, ?err, "failed to insert comment widget bootstrap");
                }
            }
            Err(err) => warn!(%src, ?err, "failed to build comment widget bootstrap"),
        }
    } else {
        debug!(identifier = %page.identifier, ?outcome, "comment widget not mounted");
    }

    document.to_html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ACCOUNT_KEY, LOCALE_KEY, StaticSiteConfig};

    const HTML: &str = "<html><head><title>Post</title></head><body><article><h1>Post</h1></article></body></html>";

    fn page() -> PageContext {
        PageContext::new("https://blog.example.com/post", "/post", Some("Post".into()))
    }

    #[test]
    fn renders_container_bootstrap_and_embed_script() {
        let site = StaticSiteConfig::default()
            .with(ACCOUNT_KEY, "example")
            .with(LOCALE_KEY, "en");
        let html = render_with_comments(
            HtmlDocument::parse(HTML),
            &page(),
            Arc::new(site),
            ThemeState::Dark,
        );
        assert!(html.contains(r#"<div class="dark-theme" id="disqus_thread"></div>"#)
            || html.contains(r#"<div id="disqus_thread" class="dark-theme"></div>"#));
        assert!(html.contains("https://example.disqus.com/embed.js"));
        assert!(html.contains("disqus_config"));
        assert!(html.contains(r#""identifier":"/post""#));
        let bootstrap = html.find("disqus_config").unwrap();
        let embed = html.find("embed.js").unwrap();
        assert!(bootstrap < embed);
    }

    #[test]
    fn page_supplied_container_gets_theme_class() {
        let site = StaticSiteConfig::default().with(ACCOUNT_KEY, "example");
        let html = render_with_comments(
            HtmlDocument::parse(
                "<html><head></head><body><div id=\"disqus_thread\"></div></body></html>",
            ),
            &page(),
            Arc::new(site),
            ThemeState::Dark,
        );
        assert!(html.contains("dark-theme"));
        assert!(!html.contains("light-theme"));
        assert_eq!(html.matches("disqus_thread").count(), 1);
    }

    #[test]
    fn unconfigured_site_still_renders_page() {
        let html = render_with_comments(
            HtmlDocument::parse(HTML),
            &page(),
            Arc::new(StaticSiteConfig::default()),
            ThemeState::Unresolved,
        );
        assert!(html.contains("<h1>Post</h1>"));
        assert!(html.contains("light-theme"));
        assert!(!html.contains("embed.js"));
        assert!(!html.contains("disqus_config"));
    }
}
