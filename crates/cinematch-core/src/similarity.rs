//! Similarity Engine: item-to-item Pearson correlation over the rating matrix.
//!
//! For a query title, every other column of the [`RatingMatrix`] is
//! correlated with the query column using pairwise-complete observations:
//! only users who rated *both* titles take part, independently for each
//! pair. Pairs with fewer than [`MIN_OVERLAP`] co-ratings, or with no
//! variance on either side, have no defined correlation and are left out of
//! the candidate set entirely (they neither rank above nor below anything).
//!
//! Candidates are then enriched with their [`ItemStats`], filtered by
//! popularity (`rating_count > min_rating_count`) and ranked.
//!
//! # Ranking
//!
//! 1. correlation, descending
//! 2. rating count, descending
//! 3. title, ascending
//!
//! The full key makes the order total, so truncating to `top_n` is
//! reproducible run to run.

use crate::config::{RecommendConfig, MIN_OVERLAP};
use crate::error::RecommendError;
use crate::matrix::RatingMatrix;
use crate::ratings::{ItemStatistics, ItemStats};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument};

/// Variances at or below this are treated as zero.
const VARIANCE_EPSILON: f64 = 1e-12;

/// One recommended title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    /// Pearson correlation with the query title, in [-1, 1]
    pub correlation: f64,
    /// Mean rating across the whole dataset (full precision)
    pub average_rating: f64,
    /// Number of ratings across the whole dataset
    pub rating_count: usize,
    /// Users in the matrix who rated both titles
    pub co_ratings: usize,
}

impl Recommendation {
    fn new(title: &str, correlation: Correlation, stats: &ItemStats) -> Self {
        Self {
            title: title.to_string(),
            correlation: correlation.value,
            average_rating: stats.average_rating,
            rating_count: stats.rating_count,
            co_ratings: correlation.overlap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Correlation {
    value: f64,
    overlap: usize,
}

/// Pearson correlation over the rows where both columns hold a rating.
///
/// Returns `None` when fewer than [`MIN_OVERLAP`] rows overlap or either
/// side has zero variance over the overlap.
///
/// ```
/// use cinematch_core::similarity::pearson_pairwise;
///
/// let a = [Some(1.0), Some(2.0), None, Some(3.0)];
/// let b = [Some(2.0), Some(4.0), Some(5.0), Some(6.0)];
/// assert_eq!(pearson_pairwise(&a, &b), Some(1.0));
///
/// let flat = [Some(3.0), Some(3.0), Some(3.0), Some(3.0)];
/// assert_eq!(pearson_pairwise(&a, &flat), None);
/// ```
pub fn pearson_pairwise(a: &[Option<f32>], b: &[Option<f32>]) -> Option<f64> {
    correlate(a, b).map(|c| c.value)
}

fn correlate(a: &[Option<f32>], b: &[Option<f32>]) -> Option<Correlation> {
    debug_assert_eq!(a.len(), b.len(), "columns must have one cell per user");

    let overlapping = || {
        a.iter().zip(b).filter_map(|pair| match pair {
            (Some(x), Some(y)) => Some((f64::from(*x), f64::from(*y))),
            _ => None,
        })
    };

    let (mut n, mut sum_a, mut sum_b) = (0usize, 0.0f64, 0.0f64);
    for (x, y) in overlapping() {
        n += 1;
        sum_a += x;
        sum_b += y;
    }
    if n < MIN_OVERLAP {
        return None;
    }

    let mean_a = sum_a / n as f64;
    let mean_b = sum_b / n as f64;
    let (mut cov, mut var_a, mut var_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in overlapping() {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a <= VARIANCE_EPSILON || var_b <= VARIANCE_EPSILON {
        return None;
    }

    let value = (cov / (var_a * var_b).sqrt()).clamp(-1.0, 1.0);
    Some(Correlation { value, overlap: n })
}

/// Titles most correlated with `title`, best first.
///
/// # Errors
///
/// - [`RecommendError::ItemNotFound`] if `title` is not a matrix column
/// - [`RecommendError::MissingStats`] if a matrix title has no statistics
///
/// An empty list is a valid outcome when every candidate is filtered out.
pub fn recommend(
    matrix: &RatingMatrix,
    stats: &ItemStatistics,
    title: &str,
    config: &RecommendConfig,
) -> Result<Vec<Recommendation>, RecommendError> {
    recommend_with_cancel(matrix, stats, title, config, &AtomicBool::new(false))
}

/// Like [`recommend`], but stops with [`RecommendError::Cancelled`] once
/// `cancel` is set. The flag is checked between candidate columns.
#[instrument(skip_all, fields(title = %title, top_n = config.top_n, min_rating_count = config.min_rating_count))]
pub fn recommend_with_cancel(
    matrix: &RatingMatrix,
    stats: &ItemStatistics,
    title: &str,
    config: &RecommendConfig,
    cancel: &AtomicBool,
) -> Result<Vec<Recommendation>, RecommendError> {
    let query_index = matrix
        .column_index(title)
        .ok_or_else(|| RecommendError::ItemNotFound(title.to_string()))?;
    let query = matrix.column(query_index);

    let mut candidates = Vec::new();
    let mut undefined = 0usize;
    for (index, candidate) in matrix.titles().iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            return Err(RecommendError::Cancelled);
        }
        if index == query_index {
            continue;
        }

        let candidate_stats = stats
            .get(candidate)
            .ok_or_else(|| RecommendError::MissingStats(candidate.clone()))?;
        if candidate_stats.rating_count <= config.min_rating_count {
            continue;
        }

        match correlate(query, matrix.column(index)) {
            Some(correlation) => {
                candidates.push(Recommendation::new(candidate, correlation, candidate_stats))
            }
            None => undefined += 1,
        }
    }

    debug!(
        "{} candidates with defined correlation, {} undefined",
        candidates.len(),
        undefined
    );

    rank(&mut candidates);
    candidates.truncate(config.top_n);
    Ok(candidates)
}

fn rank(candidates: &mut [Recommendation]) {
    candidates.sort_by(|a, b| {
        b.correlation
            .total_cmp(&a.correlation)
            .then_with(|| b.rating_count.cmp(&a.rating_count))
            .then_with(|| a.title.cmp(&b.title))
    });
}
