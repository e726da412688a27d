use crate::theme::ThemeState;
use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

pub const ACCOUNT_KEY: &str = "COMMENT_DISQUS_SHORTNAME";
pub const LOCALE_KEY: &str = "COMMENT_DISQUS_LANG";

/// Read-only accessor for site-level settings.
pub trait SiteConfig: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads settings from the process environment on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSiteConfig;

impl SiteConfig for EnvSiteConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticSiteConfig(pub HashMap<String, String>);

impl StaticSiteConfig {
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

impl SiteConfig for StaticSiteConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("comment widget account identifier (COMMENT_DISQUS_SHORTNAME) is not configured")]
    MissingAccount,
    #[error("comment widget account identifier {0:?} is not a valid host label")]
    InvalidAccount(String),
}

/// Widget settings resolved from the site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfiguration {
    pub account: String,
    pub locale: Option<String>,
}

impl WidgetConfiguration {
    pub fn resolve(site: &dyn SiteConfig) -> Result<Self, ConfigError> {
        let account = non_blank(site.get(ACCOUNT_KEY)).ok_or(ConfigError::MissingAccount)?;
        if !account_pattern().is_match(&account) {
            return Err(ConfigError::InvalidAccount(account));
        }
        Ok(Self {
            account,
            locale: non_blank(site.get(LOCALE_KEY)),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// The account becomes the first label of the embed host name.
fn account_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").expect("valid account regex")
    })
}

/// Runtime configuration for the page server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub page_root: PathBuf,
    pub public_origin: String,
    pub default_theme: ThemeState,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr: SocketAddr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("failed to parse BIND_ADDR")?;

        let page_root =
            PathBuf::from(std::env::var("PAGE_ROOT").unwrap_or_else(|_| "pages".to_string()));

        let public_origin = std::env::var("PUBLIC_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        url::Url::parse(&public_origin).context("failed to parse PUBLIC_ORIGIN")?;
        let public_origin = public_origin.trim_end_matches('/').to_string();

        let default_theme = std::env::var("DEFAULT_THEME")
            .map(|v| ThemeState::parse(&v))
            .unwrap_or_default();

        Ok(Self {
            bind_addr,
            page_root,
            public_origin,
            default_theme,
        })
    }

    pub fn page_url(&self, path: &str) -> String {
        format!("{}{}", self.public_origin, crate::page::normalize_path(path))
    }
}
