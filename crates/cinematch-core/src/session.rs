//! Loaded, query-ready recommendation state.
//!
//! A [`Session`] runs load → build once and then answers any number of
//! queries. The rating store and matrix sit behind `Arc`s and are never
//! mutated after construction, so a session can be cloned cheaply and queried
//! from several threads at once without locking.
//!
//! # Usage
//!
//! ```no_run
//! use cinematch_core::config::{MatrixConfig, RecommendConfig};
//! use cinematch_core::ratings::DataPaths;
//! use cinematch_core::session::Session;
//!
//! let session = Session::load(&DataPaths::in_dir("data"), &MatrixConfig::default())?;
//! let recs = session.recommend("Toy Story (1995)", &RecommendConfig::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::{MatrixConfig, RecommendConfig};
use crate::error::{RecommendError, SessionError};
use crate::matrix::{build_matrix, RatingMatrix};
use crate::ratings::{load_and_prepare, DataPaths, ItemStatistics, RatingStore, TopRatedEntry};
use crate::similarity::{recommend, recommend_with_cancel, Recommendation};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::instrument;

/// Immutable rating store and matrix shared by every query of a session.
#[derive(Debug, Clone)]
pub struct Session {
    store: Arc<RatingStore>,
    matrix: Arc<RatingMatrix>,
}

impl Session {
    /// Loads the data files and builds the matrix.
    #[instrument(skip_all)]
    pub fn load(paths: &DataPaths, config: &MatrixConfig) -> Result<Self, SessionError> {
        let store = load_and_prepare(paths)?;
        Self::from_store(store, config)
    }

    /// Builds the matrix for an already loaded store.
    pub fn from_store(store: RatingStore, config: &MatrixConfig) -> Result<Self, SessionError> {
        let matrix = build_matrix(store.records(), config)?;
        Ok(Self {
            store: Arc::new(store),
            matrix: Arc::new(matrix),
        })
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn stats(&self) -> &ItemStatistics {
        self.store.stats()
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    /// Titles correlated with `title`; see [`recommend`].
    pub fn recommend(
        &self,
        title: &str,
        config: &RecommendConfig,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        recommend(&self.matrix, self.store.stats(), title, config)
    }

    /// Cancellable variant of [`Session::recommend`].
    pub fn recommend_with_cancel(
        &self,
        title: &str,
        config: &RecommendConfig,
        cancel: &AtomicBool,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        recommend_with_cancel(&self.matrix, self.store.stats(), title, config, cancel)
    }

    /// Highest rated titles with more than `min_rating_count` ratings.
    pub fn top_rated(&self, min_rating_count: usize, top_n: usize) -> Vec<TopRatedEntry> {
        self.store.stats().top_rated(min_rating_count, top_n)
    }

    /// Matrix titles matching `fragment`, for title lookup and suggestions.
    pub fn find_titles(&self, fragment: &str, limit: usize) -> Vec<&str> {
        self.matrix.find_titles(fragment, limit)
    }
}
