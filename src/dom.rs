use crate::theme::{DARK_CLASS, LIGHT_CLASS};
use kuchiki::NodeRef;
use kuchiki::traits::*;
use thiserror::Error;
use tracing::debug;

pub const CONTAINER_ID: &str = "disqus_thread";

#[derive(Debug, Error)]
pub enum DomError {
    #[error("query selector {0} failed")]
    Selector(String),
    #[error("element #{0} not found")]
    ContainerMissing(String),
    #[error("document has no <{0}> element")]
    MissingElement(&'static str),
    #[error("html manipulation failed: {0}")]
    Html(String),
}

/// External script element as it is inserted into the document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptElement {
    pub src: String,
    pub timestamp: i64,
    pub is_async: bool,
}

impl ScriptElement {
    fn to_html(&self) -> String {
        let async_attr = if self.is_async { " async" } else { "" };
        format!(
            "<script src=\"{}\" data-timestamp=\"{}\"{async_attr}></script>",
            escape_attr(&self.src),
            self.timestamp
        )
    }
}

/// The slice of the page DOM the widget controller touches.
pub trait DocumentPort {
    fn append_script(&mut self, script: &ScriptElement) -> Result<(), DomError>;
    /// Removes the script whose `src` equals `src`; `Ok(false)` when absent.
    fn remove_script(&mut self, src: &str) -> Result<bool, DomError>;
    /// Counts scripts whose `src` contains `fragment`.
    fn count_scripts(&self, fragment: &str) -> usize;
    /// Creates the widget container, or retags an existing one, so it carries
    /// `class` as its only theme class.
    fn ensure_container(&mut self, class: &str) -> Result<(), DomError>;
    fn set_container_theme(&mut self, dark: bool) -> Result<(), DomError>;
    fn container_classes(&self) -> Option<Vec<String>>;
}

/// Parsed HTML page backed by kuchiki.
pub struct HtmlDocument {
    root: NodeRef,
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchiki::parse_html().one(html),
        }
    }

    pub fn to_html(&self) -> String {
        self.root.to_string()
    }

    pub fn title(&self) -> Option<String> {
        let title = self.root.select_first("title").ok()?;
        let text = title.as_node().text_contents();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Inserts an inline script as the first child of `<head>`.
    pub fn prepend_head_script(&mut self, source: &str) -> Result<(), DomError> {
        let head = self.head()?;
        let script = parse_single("<script></script>", "script")?;
        script.append(NodeRef::new_text(source));
        head.prepend(script);
        Ok(())
    }

    fn head(&self) -> Result<NodeRef, DomError> {
        self.root
            .select_first("head")
            .map(|h| h.as_node().clone())
            .map_err(|_| DomError::MissingElement("head"))
    }

    fn replace_theme_class(&mut self, class: &str) -> Result<(), DomError> {
        let container = self.container()?;
        let mut attrs = container.attributes.borrow_mut();
        let mut classes: Vec<String> = attrs
            .get("class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| *c != DARK_CLASS && *c != LIGHT_CLASS)
            .map(str::to_string)
            .collect();
        classes.push(class.to_string());
        attrs.insert("class", classes.join(" "));
        Ok(())
    }

    fn container(&self) -> Result<kuchiki::NodeDataRef<kuchiki::ElementData>, DomError> {
        self.root
            .select_first(&format!("#{CONTAINER_ID}"))
            .map_err(|_| DomError::ContainerMissing(CONTAINER_ID.to_string()))
    }
}

impl DocumentPort for HtmlDocument {
    fn append_script(&mut self, script: &ScriptElement) -> Result<(), DomError> {
        let head = self.head()?;
        let node = parse_single(&script.to_html(), "script")?;
        head.append(node);
        Ok(())
    }

    fn remove_script(&mut self, src: &str) -> Result<bool, DomError> {
        let selector = format!("script[src=\"{}\"]", escape_selector(src));
        let found = self
            .root
            .select(&selector)
            .map_err(|_| DomError::Selector(selector.clone()))?
            .next();
        match found {
            Some(script) => {
                script.as_node().detach();
                debug!(%src, "removed script element");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn count_scripts(&self, fragment: &str) -> usize {
        let selector = format!("script[src*=\"{}\"]", escape_selector(fragment));
        self.root
            .select(&selector)
            .map(|nodes| nodes.count())
            .unwrap_or(0)
    }

    fn ensure_container(&mut self, class: &str) -> Result<(), DomError> {
        if self.container().is_ok() {
            return self.replace_theme_class(class);
        }
        let parent = ["main", "article", "body"]
            .iter()
            .find_map(|sel| self.root.select_first(sel).ok())
            .ok_or(DomError::MissingElement("body"))?;
        let html = format!(
            "<div id=\"{CONTAINER_ID}\" class=\"{}\"></div>",
            escape_attr(class)
        );
        parent.as_node().append(parse_single(&html, "div")?);
        Ok(())
    }

    fn set_container_theme(&mut self, dark: bool) -> Result<(), DomError> {
        self.replace_theme_class(if dark { DARK_CLASS } else { LIGHT_CLASS })
    }

    fn container_classes(&self) -> Option<Vec<String>> {
        let container = self.container().ok()?;
        let attrs = container.attributes.borrow();
        Some(
            attrs
                .get("class")
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        )
    }
}

// Parse the markup inside a wrapper so html5ever keeps it as a standalone element.
fn parse_single(html: &str, tag: &str) -> Result<NodeRef, DomError> {
    let wrapper_html = format!("<div id=\"__greentic_comments_wrapper\">{html}</div>");
    let fragment_doc = kuchiki::parse_html().one(wrapper_html);
    let selector = format!("#__greentic_comments_wrapper > {tag}");
    let node = fragment_doc
        .select_first(&selector)
        .map_err(|_| DomError::Html(format!("could not build <{tag}> from {html}")))?;
    let node = node.as_node().clone();
    node.detach();
    Ok(node)
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_selector(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
