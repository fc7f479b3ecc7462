//! Subcommand implementations.
//!
//! Handles loading the session and running each query against it.

use crate::config;
use crate::output::{self, JsonStats};
use anyhow::{Context, Result};
use cinematch_core::config::{MatrixConfig, RecommendConfig};
use cinematch_core::{LoadError, RecommendError, Session, SessionError};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// How many close titles to offer when a lookup misses
pub const SUGGESTION_LIMIT: usize = 5;

/// Loads the dataset and builds the matrix, showing a spinner unless `quiet`.
pub fn load_session(
    data_dir: Option<&PathBuf>,
    matrix_config: &MatrixConfig,
    quiet: bool,
) -> Result<Session> {
    let paths = config::data_paths(data_dir)?;
    info!(
        "Loading {} and {}",
        paths.movies.display(),
        paths.ratings.display()
    );

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };
    spinner.set_message("Loading ratings and building matrix...");

    let result = Session::load(&paths, matrix_config);
    spinner.finish_and_clear();

    match result {
        Ok(session) => {
            info!(
                "Matrix ready: {} users x {} titles",
                session.matrix().n_users(),
                session.matrix().n_items()
            );
            Ok(session)
        }
        Err(SessionError::Load(err @ LoadError::DataNotFound { .. })) => {
            Err(err).with_context(config::download_hint)
        }
        Err(err) => Err(err).context("Failed to prepare recommendation data"),
    }
}

/// Titles to suggest when `query` is not a matrix column.
///
/// Tries the query as typed, then without a trailing `(year)`.
pub fn suggestions<'a>(session: &'a Session, query: &str) -> Vec<&'a str> {
    let query = query.trim();
    let found = session.find_titles(query, SUGGESTION_LIMIT);
    if !found.is_empty() {
        return found;
    }
    match query.rsplit_once(" (") {
        Some((stem, _)) if !stem.trim().is_empty() => {
            session.find_titles(stem.trim(), SUGGESTION_LIMIT)
        }
        _ => Vec::new(),
    }
}

/// Outcome of a recommendation query, rendered for display.
pub enum QueryOutput {
    Found(String),
    NotFound(String),
}

/// Runs one recommendation query and renders the result.
///
/// An unknown title is reported as [`QueryOutput::NotFound`] with
/// suggestions, any other failure propagates.
pub fn run_query(
    session: &Session,
    title: &str,
    config: &RecommendConfig,
    json: bool,
) -> Result<QueryOutput> {
    match session.recommend(title, config) {
        Ok(recs) => {
            let rendered = if json {
                output::format_recommendations_json(title, &recs)
            } else {
                output::format_recommendations_human(title, &recs)
            };
            Ok(QueryOutput::Found(rendered))
        }
        Err(err @ RecommendError::ItemNotFound(_)) => {
            let hints = suggestions(session, title);
            let rendered = if json {
                output::format_not_found_json(&err.to_string(), &hints)
            } else {
                output::format_not_found(&err.to_string(), &hints)
            };
            Ok(QueryOutput::NotFound(rendered))
        }
        Err(err) => Err(err.into()),
    }
}

/// Renders the top-rated ranking.
pub fn run_top(session: &Session, limit: usize, min_ratings: usize, json: bool) -> String {
    let entries = session.top_rated(min_ratings, limit);
    if json {
        output::format_top_rated_json(min_ratings, &entries)
    } else {
        output::format_top_rated_chart(min_ratings, &entries)
    }
}

/// Renders dataset and matrix figures.
pub fn run_stats(session: &Session, json: bool) -> String {
    let matrix = session.matrix();
    let stats = JsonStats {
        summary: session.store().summary(),
        matrix_users: matrix.n_users(),
        matrix_items: matrix.n_items(),
        matrix_density: matrix.density(),
    };
    if json {
        output::format_stats_json(&stats)
    } else {
        output::format_stats_human(&stats)
    }
}

/// Renders the queryable titles, optionally filtered by a fragment.
pub fn run_titles(session: &Session, filter: Option<&str>, limit: usize, json: bool) -> String {
    let titles = session.find_titles(filter.unwrap_or(""), limit);
    if json {
        serde_json::to_string_pretty(&titles).unwrap_or_else(|_| "[]".to_string())
    } else {
        output::format_titles(&titles)
    }
}
