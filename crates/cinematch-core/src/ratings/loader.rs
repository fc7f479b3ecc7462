//! CSV loading and the catalogue/ratings join.
//!
//! Sources follow the MovieLens layout (`movies.csv`: `movieId,title,genres`,
//! `ratings.csv`: `userId,movieId,rating,timestamp`). Generic column names
//! (`item_id`, `item_title`, `user_id`) are accepted as aliases, and columns
//! that are not needed are ignored.

use super::{RatingRecord, RatingStore};
use crate::config::{MOVIES_FILENAME, RATINGS_FILENAME};
use crate::error::LoadError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const MOVIES_SOURCE: &str = "movies";
const RATINGS_SOURCE: &str = "ratings";
const JOIN_SOURCE: &str = "join";

/// Required catalogue columns, each with its accepted spellings.
const MOVIES_COLUMNS: &[&[&str]] = &[&["movieId", "item_id"], &["title", "item_title"]];

/// Required ratings columns, each with its accepted spellings.
const RATINGS_COLUMNS: &[&[&str]] = &[
    &["userId", "user_id"],
    &["movieId", "item_id"],
    &["rating"],
];

#[derive(Debug, Deserialize)]
struct CatalogueRow {
    #[serde(rename = "movieId", alias = "item_id")]
    item_id: u32,
    #[serde(alias = "item_title")]
    title: String,
}

#[derive(Debug, Deserialize)]
struct RatingRow {
    #[serde(rename = "userId", alias = "user_id")]
    user_id: u32,
    #[serde(rename = "movieId", alias = "item_id")]
    item_id: u32,
    rating: f32,
}

/// Locations of the two input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Item catalogue (`movies.csv`)
    pub movies: PathBuf,
    /// Ratings table (`ratings.csv`)
    pub ratings: PathBuf,
}

impl DataPaths {
    /// Standard file names inside a data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            movies: dir.join(MOVIES_FILENAME),
            ratings: dir.join(RATINGS_FILENAME),
        }
    }

    /// Returns the first path that does not exist, if any.
    pub fn first_missing(&self) -> Option<&Path> {
        [&self.movies, &self.ratings]
            .into_iter()
            .find(|p| !p.exists())
            .map(PathBuf::as_path)
    }
}

/// Loads both tables from disk, joins them and derives per-title statistics.
///
/// # Errors
///
/// - [`LoadError::DataNotFound`] if either file cannot be opened or read
/// - [`LoadError::MalformedData`] if a required column is missing, a row does
///   not parse, an item id appears twice in the catalogue, or the join is empty
#[instrument(skip_all, fields(movies = %paths.movies.display(), ratings = %paths.ratings.display()))]
pub fn load_and_prepare(paths: &DataPaths) -> Result<RatingStore, LoadError> {
    let movies = open_source(&paths.movies)?;
    let ratings = open_source(&paths.ratings)?;
    let store = RatingStore::from_readers(movies, ratings).map_err(|e| match e {
        LoadError::DataNotFound { path, reason } => LoadError::DataNotFound {
            path: source_path(paths, &path),
            reason,
        },
        other => other,
    })?;
    let summary = store.summary();
    info!(
        "Loaded {} ratings for {} titles from {} users",
        summary.ratings, summary.rated_titles, summary.users
    );
    Ok(store)
}

fn open_source(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| LoadError::DataNotFound {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn source_path(paths: &DataPaths, source_name: &str) -> String {
    match source_name {
        MOVIES_SOURCE => paths.movies.display().to_string(),
        RATINGS_SOURCE => paths.ratings.display().to_string(),
        other => other.to_string(),
    }
}

impl RatingStore {
    /// Parses and joins a catalogue and a ratings table from any readers.
    ///
    /// A reader that fails mid-way yields [`LoadError::DataNotFound`] with
    /// the source name ("movies" or "ratings") as its path.
    pub fn from_readers<M: Read, R: Read>(movies: M, ratings: R) -> Result<Self, LoadError> {
        let catalogue = read_catalogue(movies)?;
        let catalogue_items = catalogue.len();

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for row in read_ratings(ratings)? {
            match catalogue.get(&row.item_id) {
                Some(title) => records.push(RatingRecord {
                    user_id: row.user_id,
                    item_id: row.item_id,
                    title: title.clone(),
                    rating: row.rating,
                }),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!("Dropped {} ratings with no catalogue entry", dropped);
        }
        if records.is_empty() {
            return Err(LoadError::malformed(
                JOIN_SOURCE,
                "no rating matched a catalogue item",
            ));
        }

        Ok(RatingStore::from_join(records, catalogue_items, dropped))
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn require_columns(
    reader: &mut csv::Reader<impl Read>,
    source_name: &str,
    required: &[&[&str]],
) -> Result<(), LoadError> {
    let headers = reader
        .headers()
        .map_err(|e| LoadError::from_csv(source_name, e))?;

    for accepted in required {
        if !headers.iter().any(|h| accepted.contains(&h)) {
            return Err(LoadError::malformed(
                source_name,
                format!(
                    "missing column '{}' (found: {})",
                    accepted[0],
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            ));
        }
    }
    Ok(())
}

fn read_catalogue<R: Read>(reader: R) -> Result<HashMap<u32, String>, LoadError> {
    let mut reader = csv_reader(reader);
    require_columns(&mut reader, MOVIES_SOURCE, MOVIES_COLUMNS)?;

    let mut catalogue = HashMap::new();
    for row in reader.deserialize::<CatalogueRow>() {
        let row = row.map_err(|e| LoadError::from_csv(MOVIES_SOURCE, e))?;
        if catalogue.insert(row.item_id, row.title).is_some() {
            return Err(LoadError::malformed(
                MOVIES_SOURCE,
                format!("item id {} appears more than once", row.item_id),
            ));
        }
    }
    Ok(catalogue)
}

fn read_ratings<R: Read>(reader: R) -> Result<Vec<RatingRow>, LoadError> {
    let mut reader = csv_reader(reader);
    require_columns(&mut reader, RATINGS_SOURCE, RATINGS_COLUMNS)?;

    let mut rows = Vec::new();
    for row in reader.deserialize::<RatingRow>() {
        let row: RatingRow = row.map_err(|e| LoadError::from_csv(RATINGS_SOURCE, e))?;
        if !row.rating.is_finite() {
            return Err(LoadError::malformed(
                RATINGS_SOURCE,
                format!(
                    "non-finite rating for user {} item {}",
                    row.user_id, row.item_id
                ),
            ));
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MOVIES: &str = "movieId,title,genres\n\
                          1,Toy Story (1995),Adventure|Animation\n\
                          2,Jumanji (1995),Adventure|Children\n\
                          3,Heat (1995),Action|Crime\n";

    const RATINGS: &str = "userId,movieId,rating,timestamp\n\
                           1,1,4.0,964982703\n\
                           1,3,4.5,964981247\n\
                           2,1,5.0,964982224\n\
                           2,2,3.0,964983815\n";

    fn load(movies: &str, ratings: &str) -> Result<RatingStore, LoadError> {
        RatingStore::from_readers(movies.as_bytes(), ratings.as_bytes())
    }

    #[test]
    fn test_join_attaches_titles() {
        let store = load(MOVIES, RATINGS).unwrap();
        assert_eq!(store.records().len(), 4);
        assert_eq!(store.records()[1].title, "Heat (1995)");
        assert_eq!(store.records()[1].rating, 4.5);
        assert_eq!(store.stats().get("Toy Story (1995)").unwrap().rating_count, 2);
    }

    #[test]
    fn test_unmatched_ratings_are_dropped() {
        let ratings = format!("{RATINGS}3,99,2.0,0\n");
        let store = load(MOVIES, &ratings).unwrap();
        assert_eq!(store.records().len(), 4);
        assert_eq!(store.summary().dropped_ratings, 1);
        assert_eq!(store.summary().catalogue_items, 3);
    }

    #[test]
    fn test_empty_join_is_malformed() {
        let ratings = "userId,movieId,rating\n1,42,3.0\n";
        let err = load(MOVIES, ratings).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedData { ref source_name, .. } if source_name == "join"
        ));
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let ratings = "userId,movieId,score\n1,1,3.0\n";
        let err = load(MOVIES, ratings).unwrap_err();
        assert!(err.to_string().contains("missing column 'rating'"));
    }

    #[test]
    fn test_generic_column_names_are_accepted() {
        let movies = "item_id,item_title\n7,Se7en (1995)\n";
        let ratings = "user_id,item_id,rating\n1,7,4.0\n2,7,3.0\n";
        let store = load(movies, ratings).unwrap();
        assert_eq!(store.stats().get("Se7en (1995)").unwrap().average_rating, 3.5);
    }

    #[test]
    fn test_duplicate_catalogue_id_is_malformed() {
        let movies = "movieId,title\n1,A\n1,B\n";
        let err = load(movies, RATINGS).unwrap_err();
        assert!(err.to_string().contains("appears more than once"));
    }

    #[test]
    fn test_unparseable_rating_is_malformed() {
        let ratings = "userId,movieId,rating\n1,1,four\n";
        let err = load(MOVIES, ratings).unwrap_err();
        assert!(matches!(err, LoadError::MalformedData { .. }));
    }

    #[test]
    fn test_nan_rating_is_malformed() {
        let ratings = "userId,movieId,rating\n1,1,NaN\n";
        let err = load(MOVIES, ratings).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_load_and_prepare_missing_file() {
        let temp = TempDir::new().unwrap();
        let paths = DataPaths::in_dir(temp.path());
        let err = load_and_prepare(&paths).unwrap_err();
        match err {
            LoadError::DataNotFound { path, .. } => assert!(path.ends_with("movies.csv")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(paths.first_missing(), Some(paths.movies.as_path()));
    }

    #[test]
    fn test_unreadable_source_is_data_not_found() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("movies.csv")).unwrap();
        std::fs::write(temp.path().join("ratings.csv"), RATINGS).unwrap();

        let err = load_and_prepare(&DataPaths::in_dir(temp.path())).unwrap_err();
        match err {
            LoadError::DataNotFound { path, .. } => assert!(path.ends_with("movies.csv")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk went away"))
        }
    }

    #[test]
    fn test_reader_failure_is_data_not_found() {
        let err = RatingStore::from_readers(MOVIES.as_bytes(), FailingReader).unwrap_err();
        match err {
            LoadError::DataNotFound { path, reason } => {
                assert_eq!(path, "ratings");
                assert!(reason.contains("disk went away"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_and_prepare_from_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("movies.csv"), MOVIES).unwrap();
        std::fs::write(temp.path().join("ratings.csv"), RATINGS).unwrap();

        let paths = DataPaths::in_dir(temp.path());
        assert_eq!(paths.first_missing(), None);

        let store = load_and_prepare(&paths).unwrap();
        assert_eq!(store.summary().users, 2);
        assert_eq!(store.stats().len(), 3);
    }
}
