//! Matrix Builder: dense user × title rating matrix with explicit absence.
//!
//! The matrix keeps the `max_users` most active users and the `max_items`
//! most rated titles. Every cell is an `Option<f32>`: `Some(rating)` when the
//! user rated the title, `None` otherwise. A missing rating is never stored as
//! zero, since a zero would pull every correlation toward low ratings.
//!
//! # Layout
//!
//! Rows are ordered by ascending user id and columns by ascending title.
//! Cells are stored column-major so each title's ratings form a contiguous
//! slice, which is what the similarity engine iterates.
//!
//! # Usage
//!
//! ```
//! use cinematch_core::config::MatrixConfig;
//! use cinematch_core::matrix::build_matrix;
//! use cinematch_core::ratings::RatingRecord;
//!
//! let records = vec![
//!     RatingRecord { user_id: 1, item_id: 1, title: "Alien (1979)".into(), rating: 4.0 },
//!     RatingRecord { user_id: 2, item_id: 2, title: "Heat (1995)".into(), rating: 3.5 },
//! ];
//! let matrix = build_matrix(&records, &MatrixConfig::default()).unwrap();
//!
//! assert_eq!(matrix.cell(1, "Alien (1979)"), Some(Some(4.0)));
//! assert_eq!(matrix.cell(1, "Heat (1995)"), Some(None)); // absent, not zero
//! ```

use crate::config::{DuplicatePolicy, MatrixConfig};
use crate::error::MatrixError;
use crate::ratings::RatingRecord;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::{debug, info, instrument};

/// Dense rating matrix restricted to the most active users and titles.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    user_ids: Vec<u32>,
    titles: Vec<String>,
    column_index: HashMap<String, usize>,
    /// Column-major: `cells[column * n_users + row]`
    cells: Vec<Option<f32>>,
}

impl RatingMatrix {
    /// Number of user rows.
    pub fn n_users(&self) -> usize {
        self.user_ids.len()
    }

    /// Number of title columns.
    pub fn n_items(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row labels in ascending order.
    pub fn user_ids(&self) -> &[u32] {
        &self.user_ids
    }

    /// Column labels in ascending order.
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Column position of a title, if the title survived selection.
    pub fn column_index(&self, title: &str) -> Option<usize> {
        self.column_index.get(title).copied()
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.column_index.contains_key(title)
    }

    /// All cells of one column, one per user row.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_items()`.
    pub fn column(&self, index: usize) -> &[Option<f32>] {
        let rows = self.n_users();
        &self.cells[index * rows..(index + 1) * rows]
    }

    /// Cell for a `(user, title)` pair.
    ///
    /// Returns `None` when the user or title is not part of the matrix,
    /// `Some(None)` when both are but the user did not rate the title.
    pub fn cell(&self, user_id: u32, title: &str) -> Option<Option<f32>> {
        let row = self.user_ids.binary_search(&user_id).ok()?;
        let column = self.column_index(title)?;
        Some(self.column(column)[row])
    }

    /// Number of cells holding a rating.
    pub fn rated_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Fraction of cells holding a rating (0.0 for an empty matrix).
    pub fn density(&self) -> f64 {
        if self.cells.is_empty() {
            0.0
        } else {
            self.rated_cells() as f64 / self.cells.len() as f64
        }
    }

    /// Titles containing `fragment`, case-insensitively, in column order.
    pub fn find_titles(&self, fragment: &str, limit: usize) -> Vec<&str> {
        let needle = fragment.to_lowercase();
        self.titles
            .iter()
            .filter(|title| title.to_lowercase().contains(&needle))
            .take(limit)
            .map(String::as_str)
            .collect()
    }
}

/// Builds the capped rating matrix from joined records.
///
/// Users and titles are ranked by rating count descending; ties keep the
/// order in which they first appear in `records`, so the selection is a
/// deterministic function of the input order. Only records whose user and
/// title are both selected contribute cells.
///
/// # Errors
///
/// - [`MatrixError::InvalidConfig`] if either cap is zero
/// - [`MatrixError::DuplicateRating`] if a user rated a title more than once
///   and the policy is [`DuplicatePolicy::Reject`]
#[instrument(skip_all, fields(records = records.len(), max_users = config.max_users, max_items = config.max_items))]
pub fn build_matrix(
    records: &[RatingRecord],
    config: &MatrixConfig,
) -> Result<RatingMatrix, MatrixError> {
    if config.max_users == 0 || config.max_items == 0 {
        return Err(MatrixError::InvalidConfig(format!(
            "caps must be positive (max_users = {}, max_items = {})",
            config.max_users, config.max_items
        )));
    }

    let mut user_ids = top_by_count(records.iter().map(|r| r.user_id), config.max_users);
    let mut titles = top_by_count(records.iter().map(|r| r.title.as_str()), config.max_items);
    user_ids.sort_unstable();
    titles.sort_unstable();

    let row_index: HashMap<u32, usize> = user_ids
        .iter()
        .enumerate()
        .map(|(row, &id)| (id, row))
        .collect();
    let column_index: HashMap<String, usize> = titles
        .iter()
        .enumerate()
        .map(|(column, &title)| (title.to_string(), column))
        .collect();

    let n_users = user_ids.len();
    let mut cells: Vec<Option<f32>> = vec![None; n_users * titles.len()];
    // Running (sum, count) for cells that received more than one rating
    let mut duplicates: HashMap<usize, (f64, u32)> = HashMap::new();
    let mut kept = 0usize;

    for record in records {
        let (Some(&row), Some(&column)) = (
            row_index.get(&record.user_id),
            column_index.get(record.title.as_str()),
        ) else {
            continue;
        };
        kept += 1;

        let index = column * n_users + row;
        match (cells[index], config.duplicate_policy) {
            (None, _) | (Some(_), DuplicatePolicy::LastWins) => {
                cells[index] = Some(record.rating);
            }
            (Some(_), DuplicatePolicy::Reject) => {
                return Err(MatrixError::DuplicateRating {
                    user_id: record.user_id,
                    title: record.title.clone(),
                });
            }
            (Some(previous), DuplicatePolicy::Mean) => {
                let entry = duplicates
                    .entry(index)
                    .or_insert((f64::from(previous), 1));
                entry.0 += f64::from(record.rating);
                entry.1 += 1;
            }
        }
    }

    if !duplicates.is_empty() {
        debug!("Averaged {} duplicate user/title ratings", duplicates.len());
    }
    for (index, (sum, count)) in duplicates {
        cells[index] = Some((sum / f64::from(count)) as f32);
    }

    let matrix = RatingMatrix {
        user_ids,
        titles: titles.into_iter().map(str::to_string).collect(),
        column_index,
        cells,
    };

    info!(
        "Built {}x{} rating matrix from {} ratings ({:.2}% dense)",
        matrix.n_users(),
        matrix.n_items(),
        kept,
        matrix.density() * 100.0
    );
    Ok(matrix)
}

/// Keys with the highest occurrence counts, ties in first-seen order.
fn top_by_count<K: Copy + Eq + Hash>(keys: impl Iterator<Item = K>, limit: usize) -> Vec<K> {
    let mut position: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match position.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                position.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts.into_iter().map(|(key, _)| key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_id: u32, title: &str, rating: f32) -> RatingRecord {
        RatingRecord {
            user_id,
            item_id: 0,
            title: title.to_string(),
            rating,
        }
    }

    fn sample_records() -> Vec<RatingRecord> {
        vec![
            record(3, "B", 4.0),
            record(1, "A", 5.0),
            record(1, "B", 3.0),
            record(2, "A", 2.0),
            record(2, "C", 1.0),
            record(3, "A", 4.5),
        ]
    }

    #[test]
    fn test_layout_is_sorted() {
        let matrix = build_matrix(&sample_records(), &MatrixConfig::default()).unwrap();
        assert_eq!(matrix.user_ids(), &[1, 2, 3]);
        assert_eq!(matrix.titles(), &["A", "B", "C"]);
        assert_eq!(matrix.column(0), &[Some(5.0), Some(2.0), Some(4.5)]);
        assert_eq!(matrix.column(1), &[Some(3.0), None, Some(4.0)]);
        assert_eq!(matrix.column(2), &[None, Some(1.0), None]);
    }

    #[test]
    fn test_absent_cells_are_not_zero() {
        let matrix = build_matrix(&sample_records(), &MatrixConfig::default()).unwrap();
        assert_eq!(matrix.cell(2, "B"), Some(None));
        assert_eq!(matrix.cell(2, "C"), Some(Some(1.0)));
        assert_eq!(matrix.cell(9, "A"), None);
        assert_eq!(matrix.cell(1, "Z"), None);
        assert_eq!(matrix.rated_cells(), 6);
        assert!((matrix.density() - 6.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_caps_keep_most_active() {
        // A: 3 ratings, B: 2, C: 1; users 1, 2, 3 each have 2
        let config = MatrixConfig::new(2, 2);
        let matrix = build_matrix(&sample_records(), &config).unwrap();
        assert_eq!(matrix.titles(), &["A", "B"]);
        // Users tie on count; first seen are 3 then 1
        assert_eq!(matrix.user_ids(), &[1, 3]);
        assert_eq!(matrix.cell(3, "B"), Some(Some(4.0)));
    }

    #[test]
    fn test_ties_follow_encounter_order() {
        let records = vec![
            record(1, "Late", 3.0),
            record(1, "Early", 3.0),
            record(2, "Late", 3.0),
            record(2, "Early", 3.0),
        ];
        let matrix = build_matrix(&records, &MatrixConfig::new(10, 1)).unwrap();
        assert_eq!(matrix.titles(), &["Late"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let records = sample_records();
        let config = MatrixConfig::new(2, 2);
        let first = build_matrix(&records, &config).unwrap();
        let second = build_matrix(&records, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let err = build_matrix(&sample_records(), &MatrixConfig::new(0, 10)).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidConfig(_)));
    }

    #[test]
    fn test_duplicate_mean() {
        let records = vec![record(1, "A", 2.0), record(1, "A", 4.0), record(1, "A", 4.5)];
        let matrix = build_matrix(&records, &MatrixConfig::default()).unwrap();
        let value = matrix.cell(1, "A").unwrap().unwrap();
        assert!((value - 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_last_wins() {
        let records = vec![record(1, "A", 2.0), record(1, "A", 4.0)];
        let config = MatrixConfig::default().with_duplicate_policy(DuplicatePolicy::LastWins);
        let matrix = build_matrix(&records, &config).unwrap();
        assert_eq!(matrix.cell(1, "A"), Some(Some(4.0)));
    }

    #[test]
    fn test_duplicate_reject() {
        let records = vec![record(1, "A", 2.0), record(1, "A", 4.0)];
        let config = MatrixConfig::default().with_duplicate_policy(DuplicatePolicy::Reject);
        let err = build_matrix(&records, &config).unwrap_err();
        assert_eq!(
            err,
            MatrixError::DuplicateRating {
                user_id: 1,
                title: "A".to_string()
            }
        );
    }

    #[test]
    fn test_duplicates_outside_selection_are_ignored() {
        // The duplicate pair is on a title that does not make the cut
        let records = vec![
            record(1, "Big", 3.0),
            record(2, "Big", 3.0),
            record(3, "Big", 3.0),
            record(1, "Small", 2.0),
            record(1, "Small", 4.0),
        ];
        let config = MatrixConfig::new(10, 1).with_duplicate_policy(DuplicatePolicy::Reject);
        let matrix = build_matrix(&records, &config).unwrap();
        assert_eq!(matrix.titles(), &["Big"]);
    }

    #[test]
    fn test_find_titles_case_insensitive() {
        let records = vec![
            record(1, "Toy Story (1995)", 4.0),
            record(1, "Toy Story 2 (1999)", 4.0),
            record(1, "Heat (1995)", 4.0),
        ];
        let matrix = build_matrix(&records, &MatrixConfig::default()).unwrap();
        assert_eq!(
            matrix.find_titles("toy story", 10),
            vec!["Toy Story (1995)", "Toy Story 2 (1999)"]
        );
        assert_eq!(matrix.find_titles("toy", 1).len(), 1);
        assert!(matrix.find_titles("alien", 10).is_empty());
    }
}
