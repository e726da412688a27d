use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

/// Identifies the page being commented on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub url: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PageContext {
    pub fn new(
        url: impl Into<String>,
        identifier: impl Into<String>,
        title: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            identifier: identifier.into(),
            title: title.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Builds a context whose identifier is the normalized path of `url`.
    pub fn from_url(url: &str, title: Option<String>) -> anyhow::Result<Self> {
        let parsed = Url::parse(url)?;
        let identifier = normalize_path(parsed.path());
        Ok(Self::new(parsed.as_str(), identifier, title))
    }
}

/// Payload the embed runtime reads when (re)configuring a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    pub url: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl PageConfig {
    pub fn for_page(page: &PageContext, language: Option<&str>) -> Self {
        Self {
            url: page.url.clone(),
            identifier: page.identifier.clone(),
            title: page.title.clone(),
            language: language.map(str::to_string),
        }
    }
}

pub fn normalize_path(path: &str) -> String {
    static SLASHES: OnceLock<Regex> = OnceLock::new();
    let re = SLASHES.get_or_init(|| Regex::new(r"/+").expect("valid slash regex"));
    let collapsed = re.replace_all(path.trim(), "/");
    if collapsed.starts_with('/') {
        collapsed.into_owned()
    } else {
        format!("/{collapsed}")
    }
}
