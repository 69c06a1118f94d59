use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use newswire::channel;
use newswire::config::Config;
use newswire::feed::FeedLoad;
use newswire::remote::NewsClient;
use newswire::storage::{Database, DatabaseError, LayoutKind};
use newswire::sync::{LoadTrigger, PAGE_SIZE};
use newswire::NewsReader;

/// Get the config directory path (~/.config/newswire/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("newswire");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(name = "newswire", about = "Cache-first paged news reader")]
struct Args {
    /// Channel to read (default: general)
    #[arg(long, value_name = "CODE")]
    channel: Option<String>,

    /// Search headlines instead of browsing a channel
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Number of pages to load (refresh plus appends)
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Show liked articles and exit
    #[arg(long)]
    liked: bool,

    /// Show reading history and exit
    #[arg(long)]
    history: bool,

    /// List subscribed and available channels and exit
    #[arg(long)]
    channels: bool,

    /// Subscribe to a channel
    #[arg(long, value_name = "CODE")]
    add_channel: Option<String>,

    /// Unsubscribe from a channel
    #[arg(long, value_name = "CODE")]
    remove_channel: Option<String>,

    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,
}

fn layout_tag(kind: LayoutKind) -> &'static str {
    match kind {
        LayoutKind::Standard => "std",
        LayoutKind::Gallery => "gal",
        LayoutKind::TextOnly => "txt",
        LayoutKind::HotRank => "hot",
    }
}

fn print_items(items: &[newswire::feed::FeedItem]) {
    for item in items {
        let viewed = if item.is_viewed { "*" } else { " " };
        let liked = if item.is_liked { "♥" } else { " " };
        println!(
            "{}{} [{}] {} ({})",
            viewed,
            liked,
            layout_tag(item.layout_kind),
            item.title,
            item.source_name
        );
        if !item.description.is_empty() {
            println!("      {}", item.description);
        }
        println!("      {}", item.url);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Set up config directory
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    let db_path = config_dir.join("news.db");
    let config_path = config_dir.join("config.toml");

    // Handle --reset-db flag
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let config = Config::load(&config_path).context("Failed to load config")?;

    // Open database
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of newswire appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let client = NewsClient::new(
        config.base_url()?,
        config.api_key(),
        &config.language,
        &config.country,
    );
    let mut reader = NewsReader::new(db, client);

    // Channel management flags run and exit before any feed work
    if let Some(code) = &args.add_channel {
        reader.add_channel(code).await?;
        println!("Subscribed to: {}", channel::label(code));
        return Ok(());
    }
    if let Some(code) = &args.remove_channel {
        reader.remove_channel(code).await?;
        println!("Unsubscribed from: {}", channel::label(code));
        return Ok(());
    }
    if args.channels {
        println!("Subscribed:");
        for ch in reader.my_channels().await? {
            println!("  {} ({})", ch.name, ch.code);
        }
        println!("Available:");
        for ch in reader.other_channels().await? {
            println!("  {} ({})", ch.name, ch.code);
        }
        return Ok(());
    }
    if args.liked {
        let items = reader.liked().await?;
        println!("Liked articles: {}", items.len());
        print_items(&items);
        return Ok(());
    }
    if args.history {
        let items = reader.viewed_history().await?;
        println!("Reading history: {}", items.len());
        print_items(&items);
        return Ok(());
    }

    if let Some(code) = &args.channel {
        reader.change_channel(code)?;
    }
    if let Some(query) = &args.search {
        reader.change_query(query);
    }

    // First page replaces the cache, further pages extend it
    reader.load_more(LoadTrigger::Refresh).await?;
    for _ in 1..args.pages {
        if let FeedLoad::Completed {
            more_available: false,
        } = reader.load_more(LoadTrigger::Append).await?
        {
            break;
        }
    }

    let total = args.pages as i64 * PAGE_SIZE as i64;
    let items = reader.feed().window(total, 0).await?;
    match reader.current_query() {
        Some(q) => println!("Results for \"{}\": {} articles", q, items.len()),
        None => println!(
            "{}: {} articles",
            channel::label(reader.current_channel()),
            items.len()
        ),
    }
    print_items(&items);

    Ok(())
}
