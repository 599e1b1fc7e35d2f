use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect knowledge-base content as the service sees it
#[derive(Parser)]
#[command(name = "kbcontent")]
#[command(about = "Fetch and normalize knowledge-base posts from the CMS", long_about = None)]
pub struct Cli {
    /// Config file (default: kbcontent.toml in the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every knowledge-base post
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Serve built-in sample posts if the CMS does not answer
        #[arg(long)]
        fallback: bool,
    },
    /// Show one post by slug
    Show {
        slug: String,
        #[arg(long)]
        json: bool,
    },
    /// Show one post by CMS id
    ShowId {
        id: u64,
        #[arg(long)]
        json: bool,
    },
    /// Check that the CMS answers
    Ping,
}
