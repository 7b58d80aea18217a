//! Talk to ingest source lookup
//!
//! Two comma-separated files map talks to studios and studios to ingest
//! URLs:
//!
//! ```text
//! talks.csv      studios.csv
//! 11,studio-a    1,studio-a,rtmp://ingest.example/a
//! 12,studio-b    2,studio-b,rtmp://ingest.example/b
//! ```
//!
//! Joining them yields the `talk id -> source URL` map the job builder
//! consumes. Fields may be quoted; surrounding whitespace is trimmed.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::error::Result;
use crate::models::JobId;

/// Talk identifier to ingest source URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalkSources {
    sources: HashMap<JobId, String>,
}

impl TalkSources {
    /// Read and join both files. A missing or unreadable file is an error.
    pub async fn from_files(talk_studio_csv: &Path, studio_ingest_csv: &Path) -> Result<Self> {
        let talks = read(talk_studio_csv).await?;
        let studios = read(studio_ingest_csv).await?;

        let sources = Self::from_csv(&talks, &studios);
        tracing::info!(
            talks_file = %talk_studio_csv.display(),
            studios_file = %studio_ingest_csv.display(),
            sources = sources.len(),
            "Loaded talk sources"
        );
        Ok(sources)
    }

    pub fn from_csv(talk_studios: &str, studio_ingests: &str) -> Self {
        let talks = parse_talk_studios(talk_studios);
        let studios = parse_studio_ingests(studio_ingests);

        let sources = talks
            .into_iter()
            .filter_map(|(id, studio)| match studios.get(&studio) {
                Some(url) => Some((id, url.clone())),
                None => {
                    tracing::debug!(talk_id = id, studio = %studio, "Studio has no ingest URL");
                    None
                }
            })
            .collect();

        Self { sources }
    }

    pub fn get(&self, id: JobId) -> Option<&str> {
        self.sources.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn into_map(self) -> HashMap<JobId, String> {
        self.sources
    }
}

impl From<HashMap<JobId, String>> for TalkSources {
    fn from(sources: HashMap<JobId, String>) -> Self {
        Self { sources }
    }
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())).into())
}

/// Headerless, ragged CSV records. Records that fail to decode are skipped.
fn rows(text: &str) -> Vec<csv::StringRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .records()
        .filter_map(|record| match record {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable CSV record");
                None
            }
        })
        .collect()
}

/// Parse `talk_id,studio` rows. Rows without an integer id are skipped.
pub fn parse_talk_studios(text: &str) -> HashMap<JobId, String> {
    let mut talks = HashMap::new();
    for row in rows(text) {
        let (Some(id), Some(studio)) = (row.get(0), row.get(1)) else {
            tracing::warn!(row = ?row, "Talk row has no studio column");
            continue;
        };
        match id.parse::<JobId>() {
            Ok(id) => {
                talks.insert(id, studio.to_string());
            }
            Err(_) => tracing::warn!(value = id, "Couldn't parse talk id as integer"),
        }
    }
    talks
}

/// Parse `<ignored>,studio,ingest_url` rows. Short rows are skipped.
pub fn parse_studio_ingests(text: &str) -> HashMap<String, String> {
    let mut studios = HashMap::new();
    for row in rows(text) {
        let (Some(studio), Some(url)) = (row.get(1), row.get(2)) else {
            tracing::warn!(row = ?row, "Studio row needs three columns");
            continue;
        };
        studios.insert(studio.to_string(), url.to_string());
    }
    studios
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TALKS: &str = "id,studio\n11,studio-a\n12,studio-b\n13,nowhere\n";
    const STUDIOS: &str = "1,studio-a,rtmp://ingest/a\n2,studio-b,rtmp://ingest/b\n3,broken\n";

    #[test]
    fn test_header_row_is_skipped() {
        let talks = parse_talk_studios(TALKS);
        assert_eq!(talks.len(), 3);
        assert_eq!(talks[&11], "studio-a");
    }

    #[test]
    fn test_short_studio_rows_are_skipped() {
        let studios = parse_studio_ingests(STUDIOS);
        assert_eq!(studios.len(), 2);
        assert_eq!(studios["studio-b"], "rtmp://ingest/b");
    }

    #[test]
    fn test_join_drops_unresolved_studios() {
        let sources = TalkSources::from_csv(TALKS, STUDIOS);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources.get(11), Some("rtmp://ingest/a"));
        assert_eq!(sources.get(13), None);
    }

    #[test]
    fn test_whitespace_and_blank_lines() {
        let sources = TalkSources::from_csv(" 5 , s \r\n\n", "x, s , rtmp://ingest/s\r\n");
        assert_eq!(sources.get(5), Some("rtmp://ingest/s"));
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let sources = TalkSources::from_csv(
            "\"21\",\"Saal 1, east\"\n",
            "1,\"Saal 1, east\",\"rtmp://ingest/s1?a=1,b=2\"\n",
        );
        assert_eq!(sources.get(21), Some("rtmp://ingest/s1?a=1,b=2"));
    }

    #[tokio::test]
    async fn test_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let talks = dir.path().join("talks.csv");
        let studios = dir.path().join("studios.csv");
        std::fs::File::create(&talks)
            .unwrap()
            .write_all(TALKS.as_bytes())
            .unwrap();
        std::fs::write(&studios, STUDIOS).unwrap();

        let sources = TalkSources::from_files(&talks, &studios).await.unwrap();
        assert_eq!(sources.into_map().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");

        let err = TalkSources::from_files(&missing, &missing).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
        assert!(err.to_string().contains("missing.csv"));
    }
}
