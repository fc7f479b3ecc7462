//! Data directory resolution for the CLI.
//!
//! Finds the directory holding `movies.csv` and `ratings.csv`:
//! - Custom: `--data-dir` flag
//! - Environment: `$CINEMATCH_DATA_DIR`
//! - Development: `./data` relative to the working directory
//! - Installed: the platform data directory

use anyhow::{anyhow, Result};
use cinematch_core::ratings::DataPaths;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable for a custom data directory
const DATA_DIR_ENV: &str = "CINEMATCH_DATA_DIR";

/// Working-directory relative data directory
const LOCAL_DATA_DIR: &str = "data";

/// Source of the expected dataset
const DATASET_URL: &str = "https://files.grouplens.org/datasets/movielens/ml-latest-small.zip";

/// Returns the platform data directory:
/// - macOS: `~/Library/Application Support/dev.cinematch.Cinematch/`
/// - Linux: `~/.local/share/cinematch/`
/// - Windows: `%APPDATA%\cinematch\Cinematch\data\`
pub fn platform_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("dev", "cinematch", "Cinematch").map(|dirs| dirs.data_dir().to_path_buf())
}

fn has_dataset(dir: &Path) -> bool {
    DataPaths::in_dir(dir).first_missing().is_none()
}

/// Finds the data directory.
///
/// An explicit `custom_dir` is returned as is so that a missing file is
/// reported against the path the user asked for.
///
/// Search order:
/// 1. `custom_dir`
/// 2. `$CINEMATCH_DATA_DIR`
/// 3. `./data`
/// 4. [`platform_data_dir`]
pub fn find_data_dir(custom_dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = custom_dir {
        return Ok(dir.clone());
    }

    let mut searched = Vec::new();

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        let path = PathBuf::from(dir);
        if has_dataset(&path) {
            return Ok(path);
        }
        searched.push(format!("${} ({})", DATA_DIR_ENV, path.display()));
    }

    let local = PathBuf::from(LOCAL_DATA_DIR);
    if has_dataset(&local) {
        return Ok(local);
    }
    searched.push(format!("./{}", LOCAL_DATA_DIR));

    if let Some(path) = platform_data_dir() {
        if has_dataset(&path) {
            return Ok(path);
        }
        searched.push(path.display().to_string());
    }

    Err(anyhow!(
        "Data files not found!\n{}\nSearched locations:\n{}",
        download_hint(),
        searched
            .iter()
            .map(|s| format!("- {}", s))
            .collect::<Vec<_>>()
            .join("\n")
    ))
}

/// Returns the dataset file paths inside the resolved data directory.
pub fn data_paths(custom_dir: Option<&PathBuf>) -> Result<DataPaths> {
    Ok(DataPaths::in_dir(find_data_dir(custom_dir)?))
}

/// How to obtain the dataset.
pub fn download_hint() -> String {
    format!(
        "Download {} and extract movies.csv and ratings.csv into a data directory\n\
         (./data, ${}, or pass --data-dir).",
        DATASET_URL, DATA_DIR_ENV
    )
}
