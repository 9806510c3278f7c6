use crate::clients::catalog::CatalogClient;
use crate::config::Config;
use crate::domain::AnimeId;
use crate::render;
use crate::services::detail_page::{DetailPage, DetailView};
use tracing::info;

pub async fn cmd_details(
    config: &Config,
    id_str: &str,
    retries: u32,
    json: bool,
) -> anyhow::Result<()> {
    let Ok(id) = id_str.parse::<AnimeId>();
    let page = DetailPage::new(CatalogClient::new(&config.api)?);

    page.open(id).await;

    for attempt in 1..=retries {
        let view = page.snapshot().await;
        let detail_failed = view.detail().failure().is_some();
        let recs_failed = view.recommendations().failure().is_some();
        if !detail_failed && !recs_failed {
            break;
        }

        info!(attempt, "Retrying failed sections");
        if detail_failed {
            page.retry_detail().await;
        }
        if recs_failed {
            page.retry_recommendations().await;
        }
    }

    let view = page.snapshot().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_page(&view, id_str));
    }

    Ok(())
}

fn render_page(view: &DetailView, id_str: &str) -> String {
    let hint = format!("Reload with: anikii details {id_str} --retries 1");
    let mut out = String::new();

    match view.detail().ready() {
        Some(model) => {
            out.push_str(&render::detail(model));
            out.push_str("\nEpisodes\n");
            out.push_str(&render::episodes(&model.episodes));
        }
        None => {
            let status = render::pending(view.detail(), "anime details", &hint);
            out.push_str(&status.unwrap_or_default());
        }
    }

    out.push('\n');
    match view.recommendations().ready() {
        Some(recs) => out.push_str(&render::recommendations(recs)),
        None => {
            let status = render::pending(view.recommendations(), "recommendations", &hint);
            out.push_str(&status.unwrap_or_default());
        }
    }
    out
}
