//! CLI module - Command-line interface for Anikii
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Anikii - anime catalog browser
/// Fetches anime details, episodes and recommendations from the catalog API
#[derive(Parser)]
#[command(name = "anikii")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the detail page of an anime
    #[command(alias = "d", alias = "info")]
    Details {
        /// Anime ID (number or slug)
        id: String,
        /// Retry failed sections up to this many times
        #[arg(long, default_value = "0")]
        retries: u32,
        /// Print the normalized page as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the episodes of an anime
    #[command(alias = "eps")]
    Episodes {
        /// Anime ID (number or slug)
        id: String,
    },

    /// Show recommendations for an anime
    #[command(alias = "rec")]
    Recommend {
        /// Anime ID (number or slug)
        id: String,
    },

    /// Show the navigation sidebar
    Nav {
        /// Current page path
        #[arg(long, default_value = "/")]
        path: String,
        /// Flip the theme before rendering
        #[arg(long)]
        toggle_theme: bool,
        /// Flip the sidebar size before rendering
        #[arg(long)]
        toggle_sidebar: bool,
        /// Print the search route for a term
        #[arg(long)]
        search: Option<String>,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
