mod cli;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use kbcontent::{Config, ContentItem, KnowledgeBase};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kbcontent=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let kb = KnowledgeBase::from_config(&config)?;

    match cli.command {
        Commands::List { json, fallback } => {
            let items = if fallback { kb.fetch_all_with_fallback().await } else { kb.fetch_all().await };
            if json {
                println!("{}", serde_json::to_string_pretty(items.as_slice())?);
            } else {
                for item in items.iter() {
                    println!(
                        "{:<40} {:<14} {} {:>8}  {}",
                        item.slug,
                        item.category.label(),
                        item.ranking_stars(),
                        item.reading_time.to_string(),
                        item.title
                    );
                }
                println!("{} posts", items.len());
            }
        }
        Commands::Show { slug, json } => match kb.fetch_one(&slug).await {
            Some(item) => print_item(&item, json)?,
            None => bail!("no post with slug {slug}"),
        },
        Commands::ShowId { id, json } => match kb.fetch_by_id(id).await {
            Some(item) => print_item(&item, json)?,
            None => bail!("no post with id {id}"),
        },
        Commands::Ping => {
            if !kb.ping().await {
                bail!("CMS at {} is not reachable", config.base_url);
            }
            println!("ok: {}", config.api_base());
        }
    }
    Ok(())
}

fn print_item(item: &ContentItem, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
        return Ok(());
    }
    println!("{} ({})", item.title, item.slug);
    println!("  category:  {}", item.category.label());
    println!("  ranking:   {}", item.ranking_stars());
    println!("  reading:   {}", item.reading_time);
    println!("  author:    {}", item.author.name);
    if let Some(date) = item.published_at {
        println!("  published: {}", date.format("%Y-%m-%d"));
    }
    if !item.tags.is_empty() {
        println!("  tags:      {}", item.tags.join(", "));
    }
    for (label, list) in [("prerequisites", &item.prerequisites), ("objectives", &item.objectives)] {
        if !list.is_empty() {
            println!("  {label}:");
            for entry in list {
                println!("    - {entry}");
            }
        }
    }
    for r in &item.resources {
        println!("  resource:  {} <{}>", r.title, r.url);
    }
    for a in &item.attachments {
        println!("  attachment: {} [{}] {}", a.title, a.size, a.url);
    }
    Ok(())
}
