use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::SecretString;
use std::path::PathBuf;

use glance::api::ApiClient;
use glance::config::Config;
use glance::state::{
    search_articles, trending, Dashboard, DropOutcome, FavoriteItem, FeedStatus,
};
use glance::storage::{Database, DatabaseError};

/// Number of articles shown by `news --trending`.
const TRENDING_LIMIT: usize = 5;

/// Get the config directory path (~/.config/glance/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("glance"))
}

#[derive(Parser, Debug)]
#[command(name = "glance", about = "Personal dashboard for news and movie feeds")]
struct Args {
    /// Path to config file (defaults to ~/.config/glance/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account on the dashboard server and log in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in to the dashboard server
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Fetch and show the news feed
    News {
        /// Topic category (defaults to the first selected category)
        category: Option<String>,
        /// Filter articles by a case-insensitive substring
        #[arg(long)]
        search: Option<String>,
        /// Show only the top articles
        #[arg(long)]
        trending: bool,
    },
    /// Fetch and show the popular movies feed
    Movies,
    /// Fetch both feeds at once
    Refresh,
    /// Manage the favorites list
    Fav {
        #[command(subcommand)]
        command: FavCommand,
    },
    /// Show or change preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
    /// Sync preferences and favorites with the server
    Sync {
        #[command(subcommand)]
        direction: SyncDirection,
    },
}

#[derive(Subcommand, Debug)]
enum FavCommand {
    /// List favorites in display order
    List,
    /// Favorite a movie from the current movies feed by its id
    AddMovie { id: u64 },
    /// Favorite a news article from the current news feed by its URL
    AddNews {
        url: String,
        /// Category feed to look the article up in
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove a favorite by identity (e.g. movie-1, news-https://...)
    Remove { identity: String },
    /// Move a favorite from one position to another (0-based)
    Move { from: usize, to: usize },
    /// Reorder by dropping one favorite onto another (by identity)
    Drop { dragged: String, target: String },
}

#[derive(Subcommand, Debug)]
enum PrefsCommand {
    /// Show current preferences
    Show,
    /// Replace the selected categories
    Categories { categories: Vec<String> },
    /// Change dark mode
    Dark { mode: DarkMode },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DarkMode {
    On,
    Off,
    Toggle,
}

#[derive(Subcommand, Debug)]
enum SyncDirection {
    /// Upload local preferences and favorites to the server
    Push,
    /// Replace local preferences and favorites with the server's copy
    Pull,
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
    }

    // User-only access on Unix: the directory holds the session token
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let config_path = args
        .config
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path).context("Failed to load configuration")?;

    // Open database
    let db_path = config_dir.join("state.db");
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of glance appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let mut api = ApiClient::from_config(&config).context("Failed to create API client")?;
    if let Some(session) = db.load_session().await? {
        tracing::debug!(email = %session.email, "Restored session");
        api.set_token(session.token);
    }

    let mut dash = Dashboard::init(db.clone())
        .await
        .context("Failed to initialize dashboard state")?;

    match args.command {
        Command::Register { email, password } => {
            let auth = api
                .register(&email, &password)
                .await
                .context("Registration rejected")?;
            db.save_session(&auth.user.email, &SecretString::from(auth.token))
                .await?;
            // New accounts come seeded with server-side defaults
            if let Some(doc) = auth.user.preferences {
                dash.apply_doc(doc);
                dash.flush().await?;
            }
            println!("Registered and logged in as {}", auth.user.email);
        }
        Command::Login { email, password } => {
            let auth = api.login(&email, &password).await.context("Login failed")?;
            db.save_session(&auth.user.email, &SecretString::from(auth.token))
                .await?;
            if let Some(doc) = auth.user.preferences {
                dash.apply_doc(doc);
                dash.flush().await?;
            }
            println!("Logged in as {}", auth.user.email);
        }
        Command::Logout => {
            db.clear_session().await?;
            println!("Logged out.");
        }
        Command::News {
            category,
            search,
            trending: show_trending,
        } => {
            let category = resolve_category(category, &dash, &config);
            dash.refresh_news(&api, &category).await;
            print_news(&dash, &category, search.as_deref(), show_trending);
        }
        Command::Movies => {
            dash.refresh_movies(&api).await;
            print_movies(&dash);
        }
        Command::Refresh => {
            let category = resolve_category(None, &dash, &config);
            dash.refresh_all(&api, &category).await;
            print_news(&dash, &category, None, false);
            println!();
            print_movies(&dash);
        }
        Command::Fav { command } => run_fav(command, &mut dash, &api, &config).await?,
        Command::Prefs { command } => match command {
            PrefsCommand::Show => {
                let prefs = dash.preferences();
                println!(
                    "categories: {}",
                    if prefs.categories().is_empty() {
                        "(none)".to_string()
                    } else {
                        prefs.categories().join(", ")
                    }
                );
                println!("dark mode:  {}", if prefs.dark_mode() { "on" } else { "off" });
            }
            PrefsCommand::Categories { categories } => {
                dash.set_categories(categories).await?;
                println!("Categories updated: {}", dash.preferences().categories().join(", "));
            }
            PrefsCommand::Dark { mode } => {
                let on = match mode {
                    DarkMode::On => {
                        dash.set_dark_mode(true).await?;
                        true
                    }
                    DarkMode::Off => {
                        dash.set_dark_mode(false).await?;
                        false
                    }
                    DarkMode::Toggle => dash.toggle_dark_mode().await?,
                };
                println!("Dark mode {}", if on { "on" } else { "off" });
            }
        },
        Command::Sync { direction } => match direction {
            SyncDirection::Push => {
                dash.push_preferences(&api).await?;
                println!("Preferences pushed to server.");
            }
            SyncDirection::Pull => {
                dash.pull_preferences(&api).await?;
                println!(
                    "Preferences pulled from server ({} favorites).",
                    dash.favorites().len()
                );
            }
        },
    }

    Ok(())
}

/// CLI argument wins, then the first selected category, then the config default.
fn resolve_category(cli: Option<String>, dash: &Dashboard, config: &Config) -> String {
    cli.or_else(|| dash.preferences().categories().first().cloned())
        .unwrap_or_else(|| config.default_category.clone())
}

async fn run_fav(
    command: FavCommand,
    dash: &mut Dashboard,
    api: &ApiClient,
    config: &Config,
) -> Result<()> {
    match command {
        FavCommand::List => {
            if dash.favorites().is_empty() {
                println!("No favorites yet.");
                return Ok(());
            }
            for (i, item) in dash.favorites().iter().enumerate() {
                println!("{:3}. [{}] {}", i, item.identity(), item.title());
            }
        }
        FavCommand::AddMovie { id } => {
            dash.refresh_movies(api).await;
            if dash.movies().status() == FeedStatus::Failed {
                anyhow::bail!(
                    "{}",
                    dash.movies().error().unwrap_or("Failed to fetch movies")
                );
            }
            let movie = dash
                .movies()
                .items()
                .iter()
                .find(|m| m.id == id)
                .cloned()
                .with_context(|| format!("Movie {} is not in the current feed", id))?;
            let item = FavoriteItem::from_movie(&movie);
            if dash.add_favorite(item).await? {
                println!("Favorited movie-{} ({})", id, movie.title);
            } else {
                println!("movie-{} is already a favorite", id);
            }
        }
        FavCommand::AddNews { url, category } => {
            let category = resolve_category(category, dash, config);
            dash.refresh_news(api, &category).await;
            if dash.news().status() == FeedStatus::Failed {
                anyhow::bail!("{}", dash.news().error().unwrap_or("Failed to fetch news"));
            }
            let article = dash
                .news()
                .items()
                .iter()
                .find(|a| a.url == url)
                .cloned()
                .with_context(|| format!("No article with url {} in the {} feed", url, category))?;
            let item = FavoriteItem::from_article(&article);
            if dash.add_favorite(item).await? {
                println!("Favorited news-{}", url);
            } else {
                println!("news-{} is already a favorite", url);
            }
        }
        FavCommand::Remove { identity } => {
            if dash.remove_favorite(&identity).await? {
                println!("Removed {}", identity);
            } else {
                println!("{} was not a favorite", identity);
            }
        }
        FavCommand::Move { from, to } => {
            if dash.move_favorite(from, to).await? {
                println!("Moved favorite from {} to {}", from, to);
            } else {
                println!("Nothing to move.");
            }
        }
        FavCommand::Drop { dragged, target } => {
            dash.begin_drag(dragged.as_str());
            match dash.drop_favorite(&target).await? {
                DropOutcome::Moved { from, to } => {
                    println!("Moved {} from position {} to {}", dragged, from, to)
                }
                DropOutcome::Cancelled => println!("Drag cancelled."),
            }
        }
    }
    Ok(())
}

fn print_news(dash: &Dashboard, category: &str, search: Option<&str>, show_trending: bool) {
    let feed = dash.news();
    if let Some(error) = feed.error() {
        eprintln!("Warning: {}", error);
        if feed.items().is_empty() {
            return;
        }
        eprintln!("Showing previously fetched articles.");
    }

    let filtered = match search {
        Some(query) => search_articles(feed.items(), query),
        None if show_trending => trending(feed.items(), TRENDING_LIMIT).iter().collect(),
        None => feed.items().iter().collect(),
    };

    println!("News: {} ({} articles)", category, filtered.len());
    for article in filtered {
        let marker = if dash
            .favorites()
            .contains(&glance::state::article_identity(article))
        {
            "*"
        } else {
            " "
        };
        let source = article
            .source
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .unwrap_or("unknown");
        println!("{} {} ({})", marker, article.title, source);
        println!("    {}", article.url);
    }
}

fn print_movies(dash: &Dashboard) {
    let feed = dash.movies();
    if let Some(error) = feed.error() {
        eprintln!("Warning: {}", error);
        if feed.items().is_empty() {
            return;
        }
        eprintln!("Showing previously fetched movies.");
    }

    println!("Popular movies ({})", feed.items().len());
    for movie in feed.items() {
        let marker = if dash
            .favorites()
            .contains(&glance::state::movie_identity(movie))
        {
            "*"
        } else {
            " "
        };
        println!("{} {:6}  {:.1}  {}", marker, movie.id, movie.vote_average, movie.title);
    }
}
