//! booktrack: command-line search over a booktrack library.
//!
//! Reads `BOOKTRACK_*` settings from the environment (and `.env`), opens the
//! SQLite library, and prints results as text or JSON.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booktrack_search::{
    AdvancedSearchQuery, BookStatus, BooktrackConfig, CollectionRepository, Database,
    SearchFilters, SearchManager, SearchQuery, SearchResults, SearchScope, SortBy, SortOrder,
};

#[derive(Parser)]
#[command(name = "booktrack")]
#[command(author, version, about = "Search your reading library")]
#[command(propagate_version = true)]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Relevance,
    Date,
    Title,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Relevance => SortBy::Relevance,
            SortArg::Date => SortBy::Date,
            SortArg::Title => SortBy::Title,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Free-text search across the library
    Search {
        /// Text to look for (empty matches everything)
        query: String,

        /// Scopes to search (all, books, notes, quotes, reviews, collections, lists, tags,
        /// authors)
        #[arg(short, long, default_values_t = vec!["all".to_string()], num_args = 1..)]
        scope: Vec<String>,

        /// Result ordering
        #[arg(long, value_enum, default_value_t = SortArg::Relevance)]
        sort: SortArg,

        /// Sort direction for date and title ordering
        #[arg(long, value_enum, default_value_t = OrderArg::Desc)]
        order: OrderArg,

        /// Page size (defaults to BOOKTRACK_SEARCH_LIMIT)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Only books with this reading status
        #[arg(long)]
        status: Option<String>,

        /// Only books with a genre containing this text
        #[arg(long)]
        genre: Option<String>,

        /// Only books whose author contains this text
        #[arg(long)]
        author: Option<String>,

        /// Only books and reviews rated at least this much
        #[arg(long)]
        min_rating: Option<f64>,

        /// Only favorite notes and quotes
        #[arg(long)]
        favorites: bool,
    },

    /// Field-targeted search with required, optional and excluded terms
    Advanced {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        genre: Option<String>,

        /// Terms that must all appear
        #[arg(long = "must", num_args = 1..)]
        must: Vec<String>,

        /// Terms that raise the score when present
        #[arg(long = "should", num_args = 1..)]
        should: Vec<String>,

        /// Terms that exclude a record when present
        #[arg(long = "exclude", num_args = 1..)]
        exclude: Vec<String>,

        #[arg(long, value_enum, default_value_t = SortArg::Relevance)]
        sort: SortArg,

        #[arg(long, value_enum, default_value_t = OrderArg::Desc)]
        order: OrderArg,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Autocomplete titles and authors
    Suggest {
        /// Partial query
        prefix: String,

        #[arg(short, long, default_value_t = booktrack_search::defaults::PAGE_LIMIT_AUTOCOMPLETE)]
        limit: usize,
    },

    /// List the books of a collection
    Collection {
        /// Collection name
        name: String,

        #[arg(short, long, default_value_t = booktrack_search::defaults::PAGE_LIMIT_ENTITY)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Create the schema and the default smart collections
    Init,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so JSON output on stdout stays parseable.
///
/// Environment variables:
///   LOG_FORMAT - "json" or "text" (default: "text")
///   RUST_LOG   - standard env filter (default: "warn")
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BooktrackConfig::from_env();
    let db = Database::from_config(&config)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;
    let manager = SearchManager::with_config(Arc::new(db.clone()), &config);

    match cli.command {
        Commands::Search {
            query,
            scope,
            sort,
            order,
            limit,
            offset,
            status,
            genre,
            author,
            min_rating,
            favorites,
        } => {
            let book_status = status
                .as_deref()
                .map(str::parse::<BookStatus>)
                .transpose()?;
            let filters = SearchFilters {
                book_status,
                genre,
                author,
                min_rating,
                favorites_only: favorites,
                ..SearchFilters::default()
            };
            let request = SearchQuery::new(query)
                .with_scopes(&parse_scopes(&scope))
                .with_filters(filters)
                .with_sort(sort.into(), order.into())
                .with_limit(limit.unwrap_or(config.search_limit))
                .with_offset(offset);
            let results = manager.search(&request).await?;
            print_results(&results, cli.json)?;
        }
        Commands::Advanced {
            title,
            author,
            content,
            tag,
            genre,
            must,
            should,
            exclude,
            sort,
            order,
            limit,
        } => {
            let request = AdvancedSearchQuery {
                title,
                author,
                content,
                tag,
                genre,
                must_include: must,
                should_include: should,
                must_exclude: exclude,
                ..AdvancedSearchQuery::default()
            }
            .with_sort(sort.into(), order.into())
            .with_limit(limit.unwrap_or(config.search_limit));
            let results = manager.advanced_search(&request).await?;
            print_results(&results, cli.json)?;
        }
        Commands::Suggest { prefix, limit } => {
            let suggestions = manager.suggestions(&prefix, limit).await?;
            if cli.json {
                print_json(&suggestions)?;
            } else {
                for s in &suggestions.suggestions {
                    println!("{:<8} {} ({})", s.result_type.as_str(), s.text, s.count);
                }
            }
        }
        Commands::Collection {
            name,
            limit,
            offset,
        } => {
            let Some(collection) = db.collections.get_by_name(&name).await? else {
                bail!("collection not found: {name}");
            };
            let books = db.collections.get_books(collection.id, limit, offset).await?;
            if cli.json {
                print_json(&books)?;
            } else {
                println!(
                    "{} ({}, {} books)",
                    collection.name,
                    collection.collection_type.as_str(),
                    collection.book_count
                );
                for book in &books {
                    println!(
                        "  {} - {} [{}]",
                        book.title,
                        book.author.as_deref().unwrap_or("Unknown"),
                        book.status
                    );
                }
            }
        }
        Commands::Init => {
            let created = db.collections.create_default_collections().await?;
            info!(
                subsystem = "cli",
                op = "init",
                result_count = created.len(),
                "Library initialized"
            );
            if cli.json {
                print_json(&created)?;
            } else if created.is_empty() {
                println!("Library already initialized");
            } else {
                for collection in &created {
                    println!("Created collection: {}", collection.name);
                }
            }
        }
    }

    Ok(())
}

fn parse_scopes(names: &[String]) -> Vec<SearchScope> {
    names
        .iter()
        .filter_map(|name| {
            let scope = SearchScope::parse_lenient(name);
            if scope.is_none() {
                warn!(subsystem = "cli", scope = %name, "Ignoring unknown scope");
            }
            scope
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_results(results: &SearchResults, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(results);
    }
    println!(
        "{} results for \"{}\" ({:.1} ms)",
        results.total_count, results.query, results.search_time_ms
    );
    for hit in &results.results {
        match &hit.subtitle {
            Some(subtitle) => println!(
                "  [{}] {} - {} ({:.2})",
                hit.result_type, hit.title, subtitle, hit.relevance_score
            ),
            None => println!(
                "  [{}] {} ({:.2})",
                hit.result_type, hit.title, hit.relevance_score
            ),
        }
    }
    if results.has_more {
        println!("  ...more results available");
    }
    Ok(())
}
