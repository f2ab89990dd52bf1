use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use walkdir::WalkDir;

use crate::config::{DOCUMENT_EXTENSIONS, USER_AGENT};
use crate::error::SourceError;

/// Supplies the raw wikitext of one entity's page.
pub trait DocumentSource {
    /// Short name for logs.
    fn kind(&self) -> &'static str;

    fn fetch(&self, entity: &str) -> Result<String, SourceError>;
}

// ═══════════════════════════════════════════════════════════════════════
//  MEDIAWIKI API
// ═══════════════════════════════════════════════════════════════════════

/// Latest revision content via the MediaWiki query API. No retries, no cache.
pub struct WikipediaSource {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl WikipediaSource {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }
}

impl DocumentSource for WikipediaSource {
    fn kind(&self) -> &'static str {
        "wikipedia"
    }

    fn fetch(&self, entity: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("prop", "revisions"),
                ("titles", entity),
                ("rvslots", "*"),
                ("rvprop", "content"),
                ("format", "json"),
                ("formatversion", "2"),
                ("redirects", "1"),
            ])
            .send()?
            .error_for_status()?;

        page_content(entity, response.json()?)
    }
}

// Response shape for formatversion=2:
//   {"query":{"pages":[{"title":"Canada","revisions":[{"slots":{"main":{"content":"..."}}}]}]}}
// A missing page carries `"missing": true` and no revisions.

#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    slots: Slots,
}

#[derive(Debug, Deserialize)]
struct Slots {
    main: Slot,
}

#[derive(Debug, Deserialize)]
struct Slot {
    content: String,
}

fn page_content(title: &str, response: ApiResponse) -> Result<String, SourceError> {
    response
        .query
        .and_then(|q| q.pages.into_iter().next())
        .and_then(|p| p.revisions.into_iter().next())
        .map(|r| r.slots.main.content)
        .ok_or_else(|| SourceError::MissingPage {
            title: title.to_string(),
        })
}

// ═══════════════════════════════════════════════════════════════════════
//  LOCAL DIRECTORY
// ═══════════════════════════════════════════════════════════════════════

/// Documents saved as `<entity>.wiki` (or `.wikitext`, `.txt`) in one
/// directory. Names match ASCII case-insensitively, `_` standing for space.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn find(&self, entity: &str) -> Option<PathBuf> {
        let wanted = normalize_name(entity);
        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .find(|path| is_document(path) && stem_matches(path, &wanted))
    }
}

impl DocumentSource for DirectorySource {
    fn kind(&self) -> &'static str {
        "directory"
    }

    fn fetch(&self, entity: &str) -> Result<String, SourceError> {
        let path = self.find(entity).ok_or_else(|| SourceError::NotFound {
            entity: entity.to_string(),
            dir: self.dir.clone(),
        })?;
        Ok(fs::read_to_string(path)?)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().replace('_', " ").to_ascii_lowercase()
}

fn is_document(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| DOCUMENT_EXTENSIONS.contains(&e))
}

fn stem_matches(path: &Path, wanted: &str) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| normalize_name(s) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── API response ─────────────────────────────────────────────────

    #[test]
    fn test_page_content_from_response() {
        let json = r#"{"batchcomplete":true,"query":{"pages":[{"pageid":5042916,"ns":0,"title":"Canada",
            "revisions":[{"slots":{"main":{"contentmodel":"wikitext","contentformat":"text/x-wiki",
            "content":"{{Infobox country\n| area_km2 = 9,984,670\n}}"}}}]}]}}"#;
        let response: ApiResponse = serde_json::from_str(json).unwrap();
        let content = page_content("Canada", response).unwrap();
        assert!(content.contains("area_km2 = 9,984,670"));
    }

    #[test]
    fn test_missing_page() {
        let json = r#"{"batchcomplete":true,"query":{"pages":[{"ns":0,"title":"Atlantis","missing":true}]}}"#;
        let response: ApiResponse = serde_json::from_str(json).unwrap();
        let err = page_content("Atlantis", response).unwrap_err();
        assert!(matches!(err, SourceError::MissingPage { ref title } if title == "Atlantis"));
    }

    #[test]
    fn test_response_without_query() {
        let response: ApiResponse = serde_json::from_str(r#"{"error":{"code":"x"}}"#).unwrap();
        assert!(page_content("Canada", response).is_err());
    }

    // ── directory ────────────────────────────────────────────────────

    #[test]
    fn test_directory_source_matches_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("United_States.wiki"), "| cctld = .us\n").unwrap();
        fs::write(dir.path().join("canada.txt"), "| cctld = .ca\n").unwrap();
        fs::write(dir.path().join("France.json"), "{}").unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.fetch("United States").unwrap(), "| cctld = .us\n");
        assert_eq!(source.fetch("Canada").unwrap(), "| cctld = .ca\n");
        assert!(matches!(
            source.fetch("France"),
            Err(SourceError::NotFound { .. })
        ));
    }
}
