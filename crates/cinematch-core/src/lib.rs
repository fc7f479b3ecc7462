//! # Cinematch Core
//!
//! Item-to-item movie recommendations from user ratings.
//!
//! The pipeline loads a MovieLens-style catalogue and ratings table, keeps the
//! most active users and most rated titles in a dense rating matrix, and ranks
//! titles by their pairwise-complete Pearson correlation with a query title.
//! This crate holds the algorithms; frontends (the `cinematch` CLI) handle
//! paths, prompting and display.
//!
//! ## Modules
//!
//! - [`ratings`] - Rating Store: CSV loading, catalogue join, per-title statistics
//! - [`matrix`] - Matrix Builder: capped user × title matrix with explicit absence
//! - [`similarity`] - Similarity Engine: correlation, filtering and ranking
//! - [`session`] - Load once, query many times over shared immutable state
//! - [`config`] - Defaults and typed settings
//! - [`error`] - Error types for loading, building and querying
//!
//! ## Example
//!
//! ```
//! use cinematch_core::config::{MatrixConfig, RecommendConfig};
//! use cinematch_core::ratings::RatingStore;
//! use cinematch_core::session::Session;
//!
//! let movies = "movieId,title\n1,Alien (1979)\n2,Aliens (1986)\n3,Clueless (1995)\n";
//! let ratings = "userId,movieId,rating\n\
//!                1,1,5.0\n1,2,4.5\n1,3,1.0\n\
//!                2,1,3.0\n2,2,3.0\n2,3,4.0\n\
//!                3,1,4.0\n3,2,4.0\n3,3,2.0\n";
//!
//! let store = RatingStore::from_readers(movies.as_bytes(), ratings.as_bytes())?;
//! let session = Session::from_store(store, &MatrixConfig::default())?;
//!
//! let query = RecommendConfig::default().with_min_rating_count(0);
//! let recs = session.recommend("Alien (1979)", &query)?;
//! assert_eq!(recs[0].title, "Aliens (1986)");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod matrix;
pub mod ratings;
pub mod session;
pub mod similarity;

pub use error::{LoadError, MatrixError, RecommendError, SessionError};
pub use matrix::{build_matrix, RatingMatrix};
pub use ratings::{load_and_prepare, DataPaths, ItemStatistics, ItemStats, RatingRecord, RatingStore};
pub use session::Session;
pub use similarity::{recommend, Recommendation};
