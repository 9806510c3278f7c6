//! Application-shell state: theme, sidebar and navigation routes.
//!
//! State only changes through [`reduce`], a pure transition function.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Label of the toggle button, which names the theme it switches to.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Dark => "Light Theme",
            Self::Light => "Dark Theme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarSize {
    #[default]
    Full,
    Small,
}

impl SidebarSize {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Full => Self::Small,
            Self::Small => Self::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShellState {
    pub theme: ThemeMode,
    pub sidebar: SidebarSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellAction {
    SetTheme(ThemeMode),
    ToggleTheme,
    SetSidebarSize(SidebarSize),
    ToggleSidebar,
}

#[must_use]
pub const fn reduce(state: ShellState, action: ShellAction) -> ShellState {
    match action {
        ShellAction::SetTheme(theme) => ShellState { theme, ..state },
        ShellAction::ToggleTheme => ShellState {
            theme: state.theme.toggled(),
            ..state
        },
        ShellAction::SetSidebarSize(sidebar) => ShellState { sidebar, ..state },
        ShellAction::ToggleSidebar => ShellState {
            sidebar: state.sidebar.toggled(),
            ..state
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub path: &'static str,
    pub text: &'static str,
    pub title: &'static str,
}

pub const NAV_LINKS: [NavLink; 4] = [
    NavLink {
        path: "/",
        text: "Home",
        title: "Home - Anikii | See recent and popular animes",
    },
    NavLink {
        path: "/popular",
        text: "Popular",
        title: "See popular animes",
    },
    NavLink {
        path: "/new-releases",
        text: "Recent Releases",
        title: "See Recent releases",
    },
    NavLink {
        path: "/movies",
        text: "Anime Movies",
        title: "Find anime movies",
    },
];

impl NavLink {
    /// Exact path match, ignoring any query string on `current`.
    #[must_use]
    pub fn is_active(&self, current: &str) -> bool {
        let path = current.split_once('?').map_or(current, |(path, _)| path);
        self.path == path
    }
}

/// Route of the search results page, or `None` for a blank term.
#[must_use]
pub fn search_route(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    Some(format!("/searchfor?term={}", urlencoding::encode(term)))
}

#[must_use]
pub fn details_route(id: &crate::domain::AnimeId) -> String {
    format!("/anime?anime_id={}", urlencoding::encode(&id.to_string()))
}
