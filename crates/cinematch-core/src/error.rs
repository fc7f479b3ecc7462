//! Error types for cinematch-core.
//!
//! Errors are split by pipeline stage: loading the rating data, building the
//! rating matrix, and answering a recommendation query. Load and build errors
//! are fatal to a session; query errors are recoverable per request.

use thiserror::Error;

/// Errors that can occur while loading and joining the rating sources.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// A source file is missing or could not be read
    #[error("Data not found: {path} ({reason})")]
    DataNotFound {
        /// Path of the source that could not be opened or read
        path: String,
        /// Underlying I/O failure
        reason: String,
    },
    /// A source is readable but does not match the expected schema
    #[error("Malformed data in {source_name}: {message}")]
    MalformedData {
        /// Which source the problem was found in ("movies", "ratings", "join")
        source_name: String,
        /// What was wrong
        message: String,
    },
}

impl LoadError {
    pub(crate) fn malformed(source_name: &str, message: impl Into<String>) -> Self {
        LoadError::MalformedData {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    /// Maps a CSV failure: I/O errors mean the source is unreadable, anything
    /// else is a schema or parse problem. `path` is the source name until
    /// the caller knows the file path.
    pub(crate) fn from_csv(source_name: &str, err: csv::Error) -> Self {
        if err.is_io_error() {
            LoadError::DataNotFound {
                path: source_name.to_string(),
                reason: err.to_string(),
            }
        } else {
            Self::malformed(source_name, err.to_string())
        }
    }
}

/// Errors that can occur while building the dense rating matrix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// A user rated the same title more than once and the policy rejects it
    #[error("Duplicate rating: user {user_id} rated \"{title}\" more than once")]
    DuplicateRating {
        /// User with more than one rating for the title
        user_id: u32,
        /// Title rated more than once
        title: String,
    },
    /// Matrix caps or other settings are unusable
    #[error("Invalid matrix configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that can occur while answering a recommendation query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    /// The query title is not a column of the rating matrix
    #[error("Movie '{0}' not found!")]
    ItemNotFound(String),
    /// A matrix title has no statistics entry (store and matrix out of sync)
    #[error("No statistics recorded for \"{0}\"")]
    MissingStats(String),
    /// The query was cancelled between column evaluations
    #[error("Recommendation cancelled")]
    Cancelled,
}

impl RecommendError {
    /// Returns true for errors caused by the query itself rather than the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RecommendError::ItemNotFound(_) | RecommendError::Cancelled
        )
    }
}

/// Errors that abort construction of a [`Session`](crate::session::Session).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Loading the rating data failed
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Building the rating matrix failed
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_not_found_message() {
        let err = RecommendError::ItemNotFound("Nonexistent Movie (1900)".to_string());
        assert_eq!(err.to_string(), "Movie 'Nonexistent Movie (1900)' not found!");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_missing_stats_is_not_recoverable() {
        assert!(!RecommendError::MissingStats("x".to_string()).is_recoverable());
    }

    #[test]
    fn test_session_error_from_load_error() {
        let err: SessionError = LoadError::DataNotFound {
            path: "data/movies.csv".to_string(),
            reason: "No such file or directory".to_string(),
        }
        .into();
        assert!(err.to_string().contains("data/movies.csv"));
        assert!(matches!(err, SessionError::Load(_)));
    }

    #[test]
    fn test_duplicate_rating_message() {
        let err = MatrixError::DuplicateRating {
            user_id: 7,
            title: "Heat (1995)".to_string(),
        };
        assert!(err.to_string().contains("user 7"));
        assert!(err.to_string().contains("Heat (1995)"));
    }
}
