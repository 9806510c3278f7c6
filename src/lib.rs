pub mod cli;
pub mod clients;
pub mod config;
pub mod domain;
pub mod models;
pub mod render;
pub mod services;
pub mod shell;

use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use tracing_subscriber::EnvFilter;

pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        print_help();
        return Ok(());
    };

    match command {
        Commands::Details { id, retries, json } => {
            cli::cmd_details(&config, &id, retries, json).await
        }

        Commands::Episodes { id } => cli::cmd_episodes(&config, &id).await,

        Commands::Recommend { id } => cli::cmd_recommend(&config, &id).await,

        Commands::Nav {
            path,
            toggle_theme,
            toggle_sidebar,
            search,
        } => {
            cli::cmd_nav(
                &config,
                &path,
                toggle_theme,
                toggle_sidebar,
                search.as_deref(),
            );
            Ok(())
        }

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists, leaving it untouched.");
            }
            Ok(())
        }
    }
}

fn print_help() {
    println!("Anikii - anime catalog browser");
    println!();
    println!("USAGE:");
    println!("  anikii <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  details <id> [--retries n] [--json]");
    println!("                    Show the detail page of an anime");
    println!("  episodes <id>     List episodes of an anime");
    println!("  recommend <id>    Show recommendations for an anime");
    println!("  nav [--path p]    Show the navigation sidebar");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  anikii details 101291             # Numeric catalog id");
    println!("  anikii details tate-no-yuusha     # Fallback slug id");
    println!("  anikii details 21 --retries 2     # Retry failed sections twice");
    println!("  anikii nav --search \"frieren\"     # Print the search route");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to point [api] base_url at the catalog backend.");
}
