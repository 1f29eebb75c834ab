//! Loading the dashboard document from disk.
//!
//! The query engine never touches the filesystem; this is the one place
//! the document is read and decoded.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::models::Dataset;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Could not read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode a dataset from JSON text.
pub fn parse_dataset(text: &str) -> Result<Dataset, serde_json::Error> {
    serde_json::from_str(text)
}

/// Read and decode the dataset at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = parse_dataset(&text).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if dataset.appointments.is_empty() {
        warn!(path = %path.display(), "dataset has no appointments");
    }
    info!(
        path = %path.display(),
        appointments = dataset.appointments.len(),
        call_logs = dataset.logs.entries.len(),
        "loaded dataset"
    );

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_an_empty_dataset() {
        let dataset = parse_dataset("{}").unwrap();
        assert!(dataset.appointments.is_empty());
        assert!(dataset.logs.entries.is_empty());
        assert_eq!(dataset.api_cancellation_count.cancelled, 0);
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(parse_dataset("[1, 2, 3]").is_err());
    }
}
