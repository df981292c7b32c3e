//! Error type shared by request building, fetching, and extraction.

use thiserror::Error;

/// Message shown when a saved item no longer resolves on the site.
pub const MIGRATE_WARNING: &str =
    "Migre o item da Golden Mangás para Golden Mangás para atualizar a URL.";

/// Message shown when a chapter is published as prose instead of images.
pub const CHAPTER_IS_TEXT_ONLY: &str =
    "O capítulo é uma novel em formato de texto e não possui imagens.";

/// Every failure the adapter can report. Variants are mutually exclusive.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    // Transport
    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body: {source}")]
    BodyRead { source: reqwest::Error },

    // Extraction
    #[error("Could not parse page: {message}")]
    Parse { message: String },

    /// The page is well formed but the saved reference points at a moved or removed item.
    #[error("{}", MIGRATE_WARNING)]
    StaleSource,

    #[error("{}", CHAPTER_IS_TEXT_ONLY)]
    ChapterIsTextOnly,
}

impl SourceError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        SourceError::Parse {
            message: message.into(),
        }
    }

    /// True for failures raised before a document was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SourceError::Network { .. } | SourceError::HttpStatus { .. } | SourceError::BodyRead { .. }
        )
    }
}
