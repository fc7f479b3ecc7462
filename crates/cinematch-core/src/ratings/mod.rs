//! Rating Store: joined rating records and per-title statistics.
//!
//! The store is produced once from the item catalogue and the ratings table
//! (see [`load_and_prepare`]) and is read-only afterwards. Statistics are
//! derived from every joined record, not only the ones that make it into the
//! capped rating matrix, so a title's `rating_count` reflects the whole
//! dataset.
//!
//! # Usage
//!
//! ```
//! use cinematch_core::ratings::RatingStore;
//!
//! let movies = "movieId,title,genres\n1,Toy Story (1995),Animation\n2,Heat (1995),Action\n";
//! let ratings = "userId,movieId,rating,timestamp\n1,1,4.0,0\n2,1,5.0,0\n1,2,3.5,0\n";
//!
//! let store = RatingStore::from_readers(movies.as_bytes(), ratings.as_bytes()).unwrap();
//! let toy_story = store.stats().get("Toy Story (1995)").unwrap();
//! assert_eq!(toy_story.rating_count, 2);
//! assert_eq!(toy_story.average_rating, 4.5);
//! ```

mod loader;

pub use loader::{load_and_prepare, DataPaths};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One rating joined with the title of the rated item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    /// Rating user
    pub user_id: u32,
    /// Catalogue identifier of the rated item
    pub item_id: u32,
    /// Catalogue title of the rated item
    pub title: String,
    /// Rating value (MovieLens: 0.5 to 5.0 in half steps)
    pub rating: f32,
}

/// Aggregate statistics for one title.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    /// Number of ratings recorded for the title
    pub rating_count: usize,
    /// Arithmetic mean of all ratings, full precision
    pub average_rating: f64,
}

/// Per-title statistics, keyed and iterated in title order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemStatistics {
    by_title: BTreeMap<String, ItemStats>,
}

/// A title ranked by average rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRatedEntry {
    pub title: String,
    pub average_rating: f64,
    pub rating_count: usize,
}

impl ItemStatistics {
    /// Computes statistics from joined rating records.
    pub fn from_records(records: &[RatingRecord]) -> Self {
        let mut sums: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for record in records {
            let entry = sums.entry(record.title.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += f64::from(record.rating);
        }

        let by_title = sums
            .into_iter()
            .map(|(title, (count, sum))| {
                (
                    title.to_string(),
                    ItemStats {
                        rating_count: count,
                        average_rating: sum / count as f64,
                    },
                )
            })
            .collect();

        Self { by_title }
    }

    pub fn get(&self, title: &str) -> Option<&ItemStats> {
        self.by_title.get(title)
    }

    /// Number of distinct titles with at least one rating.
    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }

    /// Iterates `(title, stats)` in ascending title order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ItemStats)> {
        self.by_title.iter().map(|(title, stats)| (title.as_str(), stats))
    }

    /// Highest average ratings among titles with `rating_count > min_rating_count`.
    ///
    /// Ordered by average rating descending, then rating count descending,
    /// then title ascending.
    pub fn top_rated(&self, min_rating_count: usize, top_n: usize) -> Vec<TopRatedEntry> {
        let mut ranked: Vec<TopRatedEntry> = self
            .iter()
            .filter(|(_, stats)| stats.rating_count > min_rating_count)
            .map(|(title, stats)| TopRatedEntry {
                title: title.to_string(),
                average_rating: stats.average_rating,
                rating_count: stats.rating_count,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.average_rating
                .total_cmp(&a.average_rating)
                .then_with(|| b.rating_count.cmp(&a.rating_count))
                .then_with(|| a.title.cmp(&b.title))
        });
        ranked.truncate(top_n);
        ranked
    }
}

/// Size figures for a loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    /// Rows in the item catalogue
    pub catalogue_items: usize,
    /// Distinct titles with at least one joined rating
    pub rated_titles: usize,
    /// Joined rating records
    pub ratings: usize,
    /// Distinct users among joined ratings
    pub users: usize,
    /// Ratings dropped because their item id is not in the catalogue
    pub dropped_ratings: usize,
}

/// Joined rating records plus derived per-title statistics.
#[derive(Debug, Clone)]
pub struct RatingStore {
    records: Vec<RatingRecord>,
    stats: ItemStatistics,
    catalogue_items: usize,
    dropped_ratings: usize,
}

impl RatingStore {
    /// Wraps already joined records, deriving statistics from them.
    ///
    /// Intended for callers that source ratings from somewhere other than
    /// the CSV loader.
    pub fn from_records(records: Vec<RatingRecord>) -> Self {
        let stats = ItemStatistics::from_records(&records);
        let catalogue_items = records
            .iter()
            .map(|r| r.item_id)
            .collect::<HashSet<_>>()
            .len();
        Self {
            records,
            stats,
            catalogue_items,
            dropped_ratings: 0,
        }
    }

    pub(crate) fn from_join(
        records: Vec<RatingRecord>,
        catalogue_items: usize,
        dropped_ratings: usize,
    ) -> Self {
        let stats = ItemStatistics::from_records(&records);
        Self {
            records,
            stats,
            catalogue_items,
            dropped_ratings,
        }
    }

    /// Joined records in input order.
    pub fn records(&self) -> &[RatingRecord] {
        &self.records
    }

    pub fn stats(&self) -> &ItemStatistics {
        &self.stats
    }

    pub fn summary(&self) -> DatasetSummary {
        let users = self
            .records
            .iter()
            .map(|r| r.user_id)
            .collect::<HashSet<_>>()
            .len();
        DatasetSummary {
            catalogue_items: self.catalogue_items,
            rated_titles: self.stats.len(),
            ratings: self.records.len(),
            users,
            dropped_ratings: self.dropped_ratings,
        }
    }
}
