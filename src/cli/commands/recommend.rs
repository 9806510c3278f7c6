use crate::clients::catalog::{CatalogApi, CatalogClient};
use crate::config::Config;
use crate::domain::AnimeId;
use crate::render;
use crate::shell::details_route;

pub async fn cmd_recommend(config: &Config, id_str: &str) -> anyhow::Result<()> {
    let Ok(id) = id_str.parse::<AnimeId>();
    let client = CatalogClient::new(&config.api)?;

    match client.fetch_recommendations(&id).await {
        Ok(recs) => {
            print!("{}", render::recommendations(&recs));
            if let Some(first) = recs.first() {
                println!(
                    "\nOpen one with: anikii details {}  ({})",
                    first.id,
                    details_route(&first.id)
                );
            }
        }
        Err(e) => {
            println!("Error loading recommendations: {e}");
            println!("  Run the command again to retry.");
        }
    }

    Ok(())
}
