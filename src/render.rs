//! Plain-text rendering of the detail page for the terminal.

use crate::models::{Episode, Recommendation};
use crate::services::detail_page::{DetailModel, FetchState};
use crate::shell::{NAV_LINKS, ShellState, SidebarSize};
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</p>").expect("line break pattern is valid")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Strips markup from an upstream description, keeping line breaks.
#[must_use]
pub fn plain_text(html: &str) -> String {
    let with_breaks = LINE_BREAK.replace_all(html, "\n");
    let stripped = TAG.replace_all(&with_breaks, "");
    let decoded = html_escape::decode_html_entities(&stripped);

    decoded
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[must_use]
pub fn detail(model: &DetailModel) -> String {
    let detail = &model.detail;
    let mut out = String::new();

    let _ = writeln!(out, "{}", detail.display_title);
    let _ = writeln!(out, "{:-<60}", "");
    let mut badges = format!("[HD] [EP {}]", detail.episode_count);
    if !detail.airing_label.is_empty() {
        let _ = write!(badges, "  {}", detail.airing_label.to_lowercase());
    }
    if let Some(score) = detail.score {
        let _ = write!(badges, "  {score}%");
    }
    let _ = writeln!(out, "{badges}");

    if !detail.hero_image.is_empty() {
        let _ = writeln!(out, "Banner:      {}", detail.hero_image);
    }
    if !detail.cover_image.is_empty() {
        let _ = writeln!(out, "Cover:       {}", detail.cover_image);
    }

    let overview = plain_text(&detail.overview);
    if !overview.is_empty() {
        let _ = writeln!(out, "\nOverview:\n{overview}");
    }
    if !detail.other_names.is_empty() {
        let _ = writeln!(out, "\nOther names: {}", detail.other_names.join(", "));
    }
    if !detail.genre_list.is_empty() {
        let _ = writeln!(out, "Genres:      {}", detail.genre_list.join(" | "));
    }

    out
}

#[must_use]
pub fn episodes(episodes: &[Episode]) -> String {
    if episodes.is_empty() {
        return "No episodes available\n".to_string();
    }

    let mut out = String::new();
    for episode in episodes {
        let _ = writeln!(
            out,
            "  EP {:>4}  {}",
            episode.episode_number, episode.episode_descriptor
        );
    }
    out
}

#[must_use]
pub fn recommendations(recommendations: &[Recommendation]) -> String {
    let mut out = String::from("You may like\n");
    if recommendations.is_empty() {
        out.push_str("  (nothing yet)\n");
        return out;
    }

    for rec in recommendations {
        let score = rec
            .average_score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.0}%"));
        let _ = writeln!(out, "  {:<40} {:>5}  [{}]", rec.title, score, rec.id);
    }
    out
}

/// Renders a slot that has no data to show: loading, failed or idle.
///
/// `what` names the data ("anime details"), `retry_hint` tells the user how
/// to reload it.
#[must_use]
pub fn pending<T>(state: &FetchState<T>, what: &str, retry_hint: &str) -> Option<String> {
    match state {
        FetchState::Ready(_) => None,
        FetchState::Idle => Some(String::new()),
        FetchState::Loading => Some(format!("Loading {what}...\n")),
        FetchState::Failed(failure) => Some(format!(
            "Error loading {what}: {}\n  {retry_hint}\n",
            failure.message
        )),
    }
}

/// Sidebar with navigation links and the theme toggle.
#[must_use]
pub fn sidebar(state: ShellState, current_path: &str) -> String {
    let mut out = String::new();

    for link in &NAV_LINKS {
        let marker = if link.is_active(current_path) { '>' } else { ' ' };
        match state.sidebar {
            SidebarSize::Full => {
                let _ = writeln!(out, "{marker} {:<16} {}", link.text, link.path);
            }
            SidebarSize::Small => {
                let _ = writeln!(out, "{marker} {}", link.path);
            }
        }
    }

    if state.sidebar == SidebarSize::Full {
        let _ = writeln!(out, "\n  [{}]", state.theme.toggle_label());
    }
    out
}
