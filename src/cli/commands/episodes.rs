use crate::clients::catalog::{CatalogApi, CatalogClient};
use crate::config::Config;
use crate::domain::AnimeId;
use crate::render;
use crate::services::detail_page::DetailModel;

pub async fn cmd_episodes(config: &Config, id_str: &str) -> anyhow::Result<()> {
    let Ok(id) = id_str.parse::<AnimeId>();
    let client = CatalogClient::new(&config.api)?;

    let raw = match client.fetch_detail(&id).await {
        Ok(raw) => raw,
        Err(e) => {
            println!("Error loading anime details: {e}");
            if e.is_retryable() {
                println!("  Run the command again to retry.");
            }
            return Ok(());
        }
    };

    let model = DetailModel::build(&id, &raw);
    println!(
        "Episodes for {} ({} total)",
        model.detail.display_title, model.detail.episode_count
    );
    println!("{:-<60}", "");
    print!("{}", render::episodes(&model.episodes));

    Ok(())
}
