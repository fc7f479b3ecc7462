//! Cinematch CLI - movie recommendations from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Titles similar to a movie
//! cinematch recommend "Toy Story (1995)"
//! cinematch recommend "Heat (1995)" -n 5 --min-ratings 100 --json
//!
//! # Highest rated titles, as a bar chart
//! cinematch top --limit 20
//!
//! # Query repeatedly without reloading
//! cinematch interactive
//!
//! # Show help
//! cinematch --help
//! ```

mod commands;
mod config;
mod interactive;
mod output;

use anyhow::Result;
use cinematch_core::config::{
    DuplicatePolicy, MatrixConfig, RecommendConfig, DEFAULT_MAX_ITEMS, DEFAULT_MAX_USERS,
    DEFAULT_MIN_RATING_COUNT, DEFAULT_TOP_N,
};
use clap::{Parser, Subcommand, ValueEnum};
use commands::QueryOutput;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Cinematch movie recommendation CLI.
///
/// Finds movies whose ratings move together with a movie you name,
/// using a MovieLens `movies.csv` and `ratings.csv`.
#[derive(Parser)]
#[command(name = "cinematch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding movies.csv and ratings.csv
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Most active users kept in the rating matrix
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_USERS)]
    max_users: usize,

    /// Most rated movies kept in the rating matrix
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_ITEMS)]
    max_items: usize,

    /// How to combine repeated ratings of one title by one user
    #[arg(long, global = true, value_enum, default_value_t = Duplicates::Mean)]
    duplicates: Duplicates,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Movies most correlated with a title
    Recommend {
        /// Exact title, including year, e.g. "Toy Story (1995)"
        title: String,

        /// Maximum number of results to return
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        limit: usize,

        /// Only recommend movies with more than this many ratings
        #[arg(long, default_value_t = DEFAULT_MIN_RATING_COUNT)]
        min_ratings: usize,
    },

    /// Highest rated movies
    Top {
        /// Number of movies to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        limit: usize,

        /// Only rank movies with more than this many ratings
        #[arg(long, default_value_t = DEFAULT_MIN_RATING_COUNT)]
        min_ratings: usize,
    },

    /// Dataset and matrix figures
    Stats,

    /// Titles that can be queried
    Titles {
        /// Case-insensitive substring to match
        filter: Option<String>,

        /// Maximum number of titles to list
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Prompt for titles until 'quit'
    Interactive {
        /// Maximum number of results per query
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        limit: usize,

        /// Only recommend movies with more than this many ratings
        #[arg(long, default_value_t = DEFAULT_MIN_RATING_COUNT)]
        min_ratings: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Duplicates {
    Mean,
    LastWins,
    Reject,
}

impl From<Duplicates> for DuplicatePolicy {
    fn from(value: Duplicates) -> Self {
        match value {
            Duplicates::Mean => DuplicatePolicy::Mean,
            Duplicates::LastWins => DuplicatePolicy::LastWins,
            Duplicates::Reject => DuplicatePolicy::Reject,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let matrix_config = MatrixConfig::new(cli.max_users, cli.max_items)
        .with_duplicate_policy(cli.duplicates.into());
    let session = commands::load_session(cli.data_dir.as_ref(), &matrix_config, cli.json)?;

    match cli.command {
        Command::Recommend {
            title,
            limit,
            min_ratings,
        } => {
            let config = RecommendConfig::default()
                .with_top_n(limit)
                .with_min_rating_count(min_ratings);
            match commands::run_query(&session, &title, &config, cli.json)? {
                QueryOutput::Found(text) => println!("{}", text),
                QueryOutput::NotFound(text) => {
                    eprintln!("{}", text);
                    std::process::exit(1);
                }
            }
        }
        Command::Top { limit, min_ratings } => {
            println!("{}", commands::run_top(&session, limit, min_ratings, cli.json));
        }
        Command::Stats => {
            println!("{}", commands::run_stats(&session, cli.json));
        }
        Command::Titles { filter, limit } => {
            println!(
                "{}",
                commands::run_titles(&session, filter.as_deref(), limit, cli.json)
            );
        }
        Command::Interactive { limit, min_ratings } => {
            let config = RecommendConfig::default()
                .with_top_n(limit)
                .with_min_rating_count(min_ratings);
            let stdin = std::io::stdin();
            interactive::run(&session, &config, cli.json, stdin.lock(), std::io::stdout())?;
        }
    }

    Ok(())
}
