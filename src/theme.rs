use serde::{Deserialize, Serialize};

pub const DARK_CLASS: &str = "dark-theme";
pub const LIGHT_CLASS: &str = "light-theme";

/// Site-wide theme as reported by the theme provider. `Unresolved` means the
/// provider has not decided yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeState {
    Dark,
    Light,
    #[default]
    Unresolved,
}

impl ThemeState {
    pub fn is_dark(self) -> Option<bool> {
        match self {
            ThemeState::Dark => Some(true),
            ThemeState::Light => Some(false),
            ThemeState::Unresolved => None,
        }
    }

    /// Class the container carries for this theme; unresolved renders as light.
    pub fn container_class(self) -> &'static str {
        match self {
            ThemeState::Dark => DARK_CLASS,
            ThemeState::Light | ThemeState::Unresolved => LIGHT_CLASS,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" | "true" | "1" => ThemeState::Dark,
            "light" | "false" | "0" => ThemeState::Light,
            _ => ThemeState::Unresolved,
        }
    }
}

impl From<Option<bool>> for ThemeState {
    fn from(dark: Option<bool>) -> Self {
        match dark {
            Some(true) => ThemeState::Dark,
            Some(false) => ThemeState::Light,
            None => ThemeState::Unresolved,
        }
    }
}
