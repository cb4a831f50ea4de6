// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dataset loading.
//!
//! A dataset is a JSON catalog of things, crafters and transformations. It is
//! read from a file or, when none is configured, from the embedded demo.

use craftflow_graph::domain::{Dataset, DomainError, DomainGraph};
use std::path::{Path, PathBuf};

/// Demo dataset shipped with the binary
pub const DEMO_DATASET: &str = include_str!("../assets/demo_dataset.json");

/// Dataset loading errors
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Dataset file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not a valid dataset document
    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Dataset contents are inconsistent
    #[error("Invalid dataset: {0}")]
    Domain(#[from] DomainError),
}

/// Where the current dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// The embedded demo
    Embedded,
    /// A JSON file on disk
    File(PathBuf),
}

impl DatasetSource {
    /// Dataset file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            DatasetSource::Embedded => None,
            DatasetSource::File(path) => Some(path),
        }
    }

    /// Directory image references are resolved against
    pub fn base_dir(&self) -> PathBuf {
        self.path()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Short label for the UI
    pub fn label(&self) -> String {
        match self {
            DatasetSource::Embedded => "demo dataset".to_string(),
            DatasetSource::File(path) => path.display().to_string(),
        }
    }

    /// Read and build the domain graph
    pub fn load(&self) -> Result<DomainGraph, DatasetError> {
        let domain = match self {
            DatasetSource::Embedded => parse(DEMO_DATASET)?,
            DatasetSource::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
                    path: path.clone(),
                    source,
                })?;
                parse(&content)?
            }
        };
        tracing::info!(
            "Loaded {} ({} things, {} transformations)",
            self.label(),
            domain.thing_count(),
            domain.transformation_count()
        );
        Ok(domain)
    }
}

/// Build a domain graph from dataset JSON
pub fn parse(json: &str) -> Result<DomainGraph, DatasetError> {
    let dataset: Dataset = serde_json::from_str(json)?;
    Ok(DomainGraph::from_dataset(dataset)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_dataset_loads() {
        let domain = DatasetSource::Embedded.load().unwrap();
        let default = domain.default_transformation().unwrap();
        assert_eq!(domain.transformation(default).unwrap().name, "electronic-circuit");

        let cable = domain.thing_by_name("copper-cable").unwrap();
        assert_eq!(domain.thing(cable).unwrap().product_of.len(), 1);
        assert_eq!(domain.thing(cable).unwrap().ingredient_of.len(), 1);
    }

    #[test]
    fn test_minimal_document() {
        let domain = parse(r#"{ "transformations": [ { "name": "mine", "products": ["ore"] } ] }"#).unwrap();
        assert_eq!(domain.thing_count(), 1);
        assert_eq!(domain.transformation_count(), 1);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(parse("{ \"things\": 3 }"), Err(DatasetError::Json(_))));
    }

    #[test]
    fn test_inconsistent_dataset() {
        let json = r#"{ "transformations": [ { "name": "a" }, { "name": "a" } ] }"#;
        assert!(matches!(parse(json), Err(DatasetError::Domain(_))));
    }

    #[test]
    fn test_missing_file() {
        let source = DatasetSource::File(PathBuf::from("/nonexistent/craftflow/recipes.json"));
        assert!(matches!(source.load(), Err(DatasetError::Io { .. })));
        assert_eq!(source.base_dir(), PathBuf::from("/nonexistent/craftflow"));
        assert_eq!(DatasetSource::Embedded.base_dir(), PathBuf::new());
    }
}
