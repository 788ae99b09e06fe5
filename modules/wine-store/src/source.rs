//! Loads the raw tasting batch from a JSON file.
//!
//! The whole file is read and parsed up front so that malformed input fails
//! the run before anything touches the database.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mongodb::bson::{Bson, Document};
use tracing::info;

use wine_common::error::{Result, SeedError};
use wine_common::TASTER_NAME;

/// Raw tasting records exactly as they appeared in the source file.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    path: PathBuf,
    records: Vec<Document>,
}

impl SourceBatch {
    /// Read and parse a JSON array of objects.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SeedError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        let batch = Self::parse(path, &content)?;
        info!(path = %path.display(), records = batch.len(), "Source batch loaded");
        Ok(batch)
    }

    /// Parse already-read content. `path` is only used for error messages.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let records: Vec<Document> =
            serde_json::from_str(content).map_err(|source| SeedError::SourceParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn from_records(records: Vec<Document>) -> Self {
        Self {
            path: PathBuf::from("<memory>"),
            records,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[Document] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records per non-null taster name, computed locally.
    /// This is what the taster aggregation is expected to produce.
    pub fn expected_taster_counts(&self) -> BTreeMap<String, i64> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            if let Some(Bson::String(name)) = record.get(TASTER_NAME) {
                *counts.entry(name.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use mongodb::bson::doc;

    const SAMPLE: &str = r#"[
        {"taster_name": "Ana", "points": "88", "region_1": "Napa", "region_2": null, "variety": "Merlot"},
        {"taster_name": "Ana", "points": "92", "region_1": "Sonoma", "region_2": null, "variety": "Merlot"},
        {"taster_name": null, "points": "75", "region_1": null, "region_2": null, "variety": "Pinot"}
    ]"#;

    #[test]
    fn parses_records_verbatim() {
        let batch = SourceBatch::parse(Path::new("wine.json"), SAMPLE).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.records()[0].get_str("points").unwrap(), "88");
        assert!(batch.records()[2].get("taster_name").unwrap().as_null().is_some());
    }

    #[test]
    fn counts_tasters_skipping_null_names() {
        let batch = SourceBatch::parse(Path::new("wine.json"), SAMPLE).unwrap();
        let counts = batch.expected_taster_counts();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["Ana"], 2);
    }

    #[test]
    fn duplicates_are_preserved() {
        let record = doc! { "taster_name": "Roger", "points": "90" };
        let batch = SourceBatch::from_records(vec![record.clone(), record]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.expected_taster_counts()["Roger"], 2);
    }

    #[test]
    fn rejects_non_array_top_level() {
        let err = SourceBatch::parse(Path::new("wine.json"), r#"{"taster_name": "Ana"}"#).unwrap_err();
        assert!(matches!(err, SeedError::SourceParse { .. }));
    }

    #[test]
    fn rejects_non_object_elements() {
        let err = SourceBatch::parse(Path::new("wine.json"), r#"[{"points": "80"}, 42]"#).unwrap_err();
        assert!(matches!(err, SeedError::SourceParse { .. }));
    }

    #[test]
    fn empty_array_is_an_empty_batch() {
        let batch = SourceBatch::parse(Path::new("wine.json"), "[]").unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let batch = SourceBatch::load(file.path()).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.path(), file.path());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceBatch::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SeedError::SourceRead { .. }));
    }
}
