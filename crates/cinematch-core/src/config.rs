//! Default configuration and typed settings for the recommendation pipeline.
//!
//! Constants hold the production defaults. The matrix caps and query
//! thresholds are passed explicitly through [`MatrixConfig`] and
//! [`RecommendConfig`] so every stage is a pure function of its inputs.
//!
//! # Usage
//!
//! ```
//! use cinematch_core::config::{MatrixConfig, RecommendConfig, DEFAULT_MAX_USERS};
//!
//! let matrix_config = MatrixConfig::default();
//! assert_eq!(matrix_config.max_users, DEFAULT_MAX_USERS);
//!
//! let query = RecommendConfig::default().with_top_n(5);
//! assert_eq!(query.top_n, 5);
//! ```

use serde::{Deserialize, Serialize};

// =============================================================================
// Matrix Construction
// =============================================================================

/// Number of most active users kept as matrix rows.
pub const DEFAULT_MAX_USERS: usize = 5000;

/// Number of most rated titles kept as matrix columns.
///
/// Memory grows with `max_users * max_items` cells, and a query correlates
/// the query column against every other column.
pub const DEFAULT_MAX_ITEMS: usize = 1000;

// =============================================================================
// Query Thresholds
// =============================================================================

/// Number of recommendations returned per query.
pub const DEFAULT_TOP_N: usize = 10;

/// Candidates need strictly more ratings than this to be recommended.
pub const DEFAULT_MIN_RATING_COUNT: usize = 50;

/// Minimum number of co-rating users for a correlation to be defined.
pub const MIN_OVERLAP: usize = 2;

// =============================================================================
// Data Sources
// =============================================================================

/// File name of the item catalogue (MovieLens layout).
pub const MOVIES_FILENAME: &str = "movies.csv";

/// File name of the ratings table (MovieLens layout).
pub const RATINGS_FILENAME: &str = "ratings.csv";

/// How to resolve several ratings by one user for one title.
///
/// MovieLens guarantees one rating per `(userId, movieId)`, but titles are
/// not unique across ids, so the same user can end up with two ratings in a
/// single title column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Average all ratings for the pair (pivot-table behaviour)
    #[default]
    Mean,
    /// Keep the rating that appears last in input order
    LastWins,
    /// Fail with [`MatrixError::DuplicateRating`](crate::error::MatrixError::DuplicateRating)
    Reject,
}

/// Settings for [`build_matrix`](crate::matrix::build_matrix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Maximum number of user rows
    pub max_users: usize,
    /// Maximum number of title columns
    pub max_items: usize,
    /// Resolution for duplicate `(user, title)` ratings
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            max_users: DEFAULT_MAX_USERS,
            max_items: DEFAULT_MAX_ITEMS,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl MatrixConfig {
    /// Creates a config with the given caps and the default duplicate policy.
    pub fn new(max_users: usize, max_items: usize) -> Self {
        Self {
            max_users,
            max_items,
            ..Self::default()
        }
    }

    /// Sets the duplicate resolution policy.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

/// Settings for a single recommendation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Maximum number of entries returned
    pub top_n: usize,
    /// Candidates need `rating_count > min_rating_count`
    pub min_rating_count: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            min_rating_count: DEFAULT_MIN_RATING_COUNT,
        }
    }
}

impl RecommendConfig {
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_min_rating_count(mut self, min_rating_count: usize) -> Self {
        self.min_rating_count = min_rating_count;
        self
    }
}
