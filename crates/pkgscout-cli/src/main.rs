use anyhow::Context;
use clap::Parser;
use pkgscout_core::providers::NpmProvider;
use pkgscout_core::search::fetch_page;
use pkgscout_core::{
    Config, FavoritesStore, Notice, NoticeLevel, PageKind, PageRequest, SearchPage,
    SearchProvider, MAX_PAGE, NO_RESULTS_MESSAGE,
};
use pkgscout_store::SqliteStore;
use pkgscout_tui::{App, Toasts};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pkgscout")]
#[command(version, about = "Search npm packages and keep a list of favorites", long_about = None)]
struct Cli {
    /// Path to the favorites database
    #[arg(long, global = true, env = "PKGSCOUT_DB")]
    db: Option<PathBuf>,

    /// Registry base URL (npm or a mirror)
    #[arg(long, global = true, env = "PKGSCOUT_REGISTRY")]
    registry: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Search the registry and print one page of results
    Search {
        /// Package name or keywords
        query: String,

        /// Zero-based page index
        #[arg(
            short,
            long,
            default_value_t = 0,
            value_parser = clap::value_parser!(u32).range(..=MAX_PAGE as i64)
        )]
        page: u32,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage favorite packages
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand)]
enum FavoritesAction {
    /// List favorites in the order they were added
    List,
    /// Add a package with the reason you like it
    Add { name: String, reason: String },
    /// Change the reason for a favorite
    Edit { name: String, reason: String },
    /// Remove a favorite
    Remove { name: String },
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load config")?;
    if let Some(db) = cli.db {
        config.storage.path = Some(db);
    }
    if let Some(registry) = cli.registry {
        config.registry.url = registry;
    }

    init_logging(cli.command.is_none())?;

    match cli.command {
        Some(Commands::Search { query, page, json }) => {
            run_search(&config, &query, page, json).await?;
        }
        Some(Commands::Favorites { action }) => {
            run_favorites(&config, action)?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Path => println!("{}", Config::config_path()?.display()),
            ConfigAction::Show => print!("{}", toml::to_string_pretty(&config)?),
            ConfigAction::Init { force } => {
                let path = Config::config_path()?;
                if path.exists() && !force {
                    eprintln!(
                        "{} already exists, pass --force to overwrite",
                        path.display()
                    );
                } else {
                    config.save()?;
                    println!("Wrote {}", path.display());
                }
            }
        },
        None => {
            let provider: Arc<dyn SearchProvider> = Arc::new(build_provider(&config)?);
            let favorites = open_favorites(&config)?;
            let toasts = Toasts::new(config.ui.toast_ttl()?);

            pkgscout_tui::run_tui(App::new(toasts), provider, favorites, config.ui.mouse_enabled)
                .await?;
        }
    }

    Ok(())
}

/// Logs go to stderr, or to a file while the TUI owns the terminal
fn init_logging(tui: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pkgscout=info".into());

    if tui {
        let path = Config::log_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn build_provider(config: &Config) -> anyhow::Result<NpmProvider> {
    let timeout = config.registry.timeout_secs.map(Duration::from_secs);
    Ok(NpmProvider::new(config.registry.url.clone(), timeout)?)
}

fn open_favorites(config: &Config) -> anyhow::Result<FavoritesStore<SqliteStore>> {
    let path = config.store_path()?;
    let store = SqliteStore::open(&path)
        .with_context(|| format!("Failed to open store at {}", path.display()))?;
    Ok(FavoritesStore::new(store))
}

async fn run_search(config: &Config, query: &str, page: u32, json: bool) -> anyhow::Result<()> {
    let query = query.trim();
    if query.is_empty() {
        print_notice(&Notice::error("Please enter a package name to search."));
        return Ok(());
    }

    tracing::info!("Searching for: {} (page {})", query, page);

    let provider = build_provider(config)?;
    let request = PageRequest {
        seq: 0,
        query: query.to_string(),
        page,
        kind: PageKind::Initial,
    };
    let result = fetch_page(&provider, &request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.packages)?);
        return Ok(());
    }

    match format_page(&request, &result) {
        Ok(text) => print!("{}", text),
        Err(notice) => print_notice(&notice),
    }

    Ok(())
}

/// Plain-text listing of one page, or the warning to show when it is empty
fn format_page(request: &PageRequest, page: &SearchPage) -> Result<String, Notice> {
    if page.is_empty() {
        return Err(Notice::warning(NO_RESULTS_MESSAGE));
    }

    let mut out = String::new();
    for pkg in &page.packages {
        out.push_str(&format!("{}@{}\n", pkg.name, pkg.version));
        out.push_str(&format!("    {}\n", pkg.display_description()));
    }
    if let Some(total) = page.total {
        let shown = request.offset() as u64 + page.packages.len() as u64;
        out.push_str(&format!("\n{} of {} results\n", shown.min(total), total));
    }
    Ok(out)
}

fn run_favorites(config: &Config, action: FavoritesAction) -> anyhow::Result<()> {
    let favorites = open_favorites(config)?;

    let outcome = match action {
        FavoritesAction::List => {
            let list = favorites.load()?;
            if list.is_empty() {
                println!("No favorites yet");
            }
            for fav in list {
                println!("{}\t{}", fav.name, fav.reason);
            }
            return Ok(());
        }
        FavoritesAction::Add { name, reason } => favorites.add(&name, &reason)?,
        FavoritesAction::Edit { name, reason } => favorites.edit(&name, &reason)?,
        FavoritesAction::Remove { name } => favorites.remove(&name)?,
    };

    print_notice(&outcome.notice());
    Ok(())
}

fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success | NoticeLevel::Info => println!("{}", notice.message),
        NoticeLevel::Warning | NoticeLevel::Error => eprintln!("{}", notice.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["pkgscout"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_search_args() {
        let cli = Cli::try_parse_from(["pkgscout", "search", "react", "--page", "2"]).unwrap();
        match cli.command {
            Some(Commands::Search { query, page, json }) => {
                assert_eq!(query, "react");
                assert_eq!(page, 2);
                assert!(!json);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_page_bounded_by_offset_range() {
        let max = MAX_PAGE.to_string();
        assert!(Cli::try_parse_from(["pkgscout", "search", "react", "--page", &max]).is_ok());

        let past = (MAX_PAGE + 1).to_string();
        assert!(Cli::try_parse_from(["pkgscout", "search", "react", "--page", &past]).is_err());
        assert!(
            Cli::try_parse_from(["pkgscout", "search", "react", "--page", "400000000"]).is_err()
        );
    }

    #[test]
    fn test_format_page() {
        let request = PageRequest {
            seq: 0,
            query: "lodash".into(),
            page: 1,
            kind: PageKind::Initial,
        };

        let empty = format_page(&request, &SearchPage::default()).unwrap_err();
        assert_eq!(empty.level, NoticeLevel::Warning);
        assert_eq!(empty.message, "No packages found for your search.");

        let page = SearchPage::new(
            vec![pkgscout_core::Package::new("lodash.get", "4.4.2")],
            Some(20),
        );
        let text = format_page(&request, &page).unwrap();
        assert!(text.starts_with("lodash.get@4.4.2\n    No description\n"));
        assert!(text.ends_with("13 of 20 results\n"));
    }

    #[test]
    fn test_config_init_flag() {
        let cli = Cli::try_parse_from(["pkgscout", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Init { force: true }
            })
        ));
    }

    #[test]
    fn test_global_db_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pkgscout",
            "favorites",
            "add",
            "lodash",
            "utility functions",
            "--db",
            "/tmp/favs.db",
        ])
        .unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("/tmp/favs.db")));
        assert!(matches!(
            cli.command,
            Some(Commands::Favorites {
                action: FavoritesAction::Add { .. }
            })
        ));
    }
}
