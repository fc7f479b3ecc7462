//! Output formatting for recommendations, charts and dataset figures.
//!
//! Supports both human-readable terminal output and JSON for scripting.

use cinematch_core::ratings::{DatasetSummary, TopRatedEntry};
use cinematch_core::similarity::Recommendation;
use serde::Serialize;

/// Maximum title width in tables and charts
const TITLE_MAX_LEN: usize = 48;

/// Width of a full-scale bar in the top-rated chart
const BAR_WIDTH: usize = 40;

/// Ratings are on a 0.5–5.0 scale, so bars are drawn against 5.0
const RATING_SCALE_MAX: f64 = 5.0;

/// JSON output structure for a recommendation query
#[derive(Serialize)]
pub struct JsonRecommendations<'a> {
    pub query: &'a str,
    pub results: &'a [Recommendation],
}

/// JSON output structure for the top-rated ranking
#[derive(Serialize)]
pub struct JsonTopRated<'a> {
    pub min_rating_count: usize,
    pub results: &'a [TopRatedEntry],
}

/// JSON output structure for dataset figures
#[derive(Serialize)]
pub struct JsonStats {
    #[serde(flatten)]
    pub summary: DatasetSummary,
    pub matrix_users: usize,
    pub matrix_items: usize,
    pub matrix_density: f64,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats recommendations as JSON.
pub fn format_recommendations_json(query: &str, results: &[Recommendation]) -> String {
    to_json(&JsonRecommendations { query, results })
}

/// Formats recommendations for the terminal.
pub fn format_recommendations_human(query: &str, results: &[Recommendation]) -> String {
    if results.is_empty() {
        return format!(
            "No similar movies found for \"{}\" (no candidate passed the filters)",
            query
        );
    }

    let mut output = format!("Movies similar to '{}':\n\n", query);
    output.push_str(&format!(
        "    {:<width$}  {:>11}  {:>6}  {:>7}\n",
        "Title",
        "Correlation",
        "Avg",
        "Ratings",
        width = TITLE_MAX_LEN
    ));

    for (i, rec) in results.iter().enumerate() {
        output.push_str(&format!(
            "{:>2}. {:<width$}  {:>11.2}  {:>6.2}  {:>7}\n",
            i + 1,
            truncate_text(&rec.title, TITLE_MAX_LEN),
            rec.correlation,
            round2(rec.average_rating),
            rec.rating_count,
            width = TITLE_MAX_LEN
        ));
    }

    output.trim_end().to_string()
}

/// Formats the reply to an unknown title, with close matches if any.
pub fn format_not_found(message: &str, suggestions: &[&str]) -> String {
    if suggestions.is_empty() {
        return message.to_string();
    }
    let mut output = format!("{}\nDid you mean:\n", message);
    for title in suggestions {
        output.push_str(&format!("  - {}\n", title));
    }
    output.trim_end().to_string()
}

/// JSON output structure for an unknown title
#[derive(Serialize)]
pub struct JsonNotFound<'a> {
    pub error: &'a str,
    pub suggestions: &'a [&'a str],
}

/// Formats the reply to an unknown title as JSON.
pub fn format_not_found_json(message: &str, suggestions: &[&str]) -> String {
    to_json(&JsonNotFound {
        error: message,
        suggestions,
    })
}

/// Formats the top-rated ranking as JSON.
pub fn format_top_rated_json(min_rating_count: usize, results: &[TopRatedEntry]) -> String {
    to_json(&JsonTopRated {
        min_rating_count,
        results,
    })
}

/// Draws the top-rated ranking as a horizontal bar chart, best first.
pub fn format_top_rated_chart(min_rating_count: usize, results: &[TopRatedEntry]) -> String {
    if results.is_empty() {
        return format!("No movies with more than {} ratings", min_rating_count);
    }

    let mut output = format!(
        "Top {} Highest Rated Movies (more than {} ratings)\n\n",
        results.len(),
        min_rating_count
    );
    for entry in results {
        output.push_str(&format!(
            "{:<width$} |{} {:.2} ({})\n",
            truncate_text(&entry.title, TITLE_MAX_LEN),
            bar(entry.average_rating),
            round2(entry.average_rating),
            entry.rating_count,
            width = TITLE_MAX_LEN
        ));
    }
    output.push_str(&format!(
        "{:<width$} +{}\n{:<width$}  Average Rating (0 - {:.0})",
        "",
        "-".repeat(BAR_WIDTH),
        "",
        RATING_SCALE_MAX,
        width = TITLE_MAX_LEN
    ));
    output
}

/// Formats dataset figures as JSON.
pub fn format_stats_json(stats: &JsonStats) -> String {
    to_json(stats)
}

/// Formats dataset figures for the terminal.
pub fn format_stats_human(stats: &JsonStats) -> String {
    let s = &stats.summary;
    let mut output = String::from("Dataset Stats\n");
    output.push_str(&format!("  Total Movies:    {}\n", s.catalogue_items));
    output.push_str(&format!("  Rated Movies:    {}\n", s.rated_titles));
    output.push_str(&format!("  Total Ratings:   {}\n", s.ratings));
    output.push_str(&format!("  Users:           {}\n", s.users));
    if s.dropped_ratings > 0 {
        output.push_str(&format!("  Dropped Ratings: {}\n", s.dropped_ratings));
    }
    output.push_str(&format!(
        "  Matrix:          {} users x {} movies ({:.2}% rated)",
        stats.matrix_users,
        stats.matrix_items,
        stats.matrix_density * 100.0
    ));
    output
}

/// Formats a title listing, one per line.
pub fn format_titles(titles: &[&str]) -> String {
    if titles.is_empty() {
        return "No matching movies".to_string();
    }
    titles.join("\n")
}

fn bar(value: f64) -> String {
    let fraction = (value / RATING_SCALE_MAX).clamp(0.0, 1.0);
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Truncates text to a maximum number of characters, adding ellipsis if needed.
fn truncate_text(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated.trim_end())
    }
}
