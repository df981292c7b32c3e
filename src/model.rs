//! Normalized entities produced by the source adapter.
//!
//! Every extraction call builds fresh values; nothing here borrows from the parsed document.

use serde::{Deserialize, Serialize};

/// Minimal entry shown in a browsable grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    /// Never empty for a valid entry.
    pub title: String,
    pub thumbnail_url: String,
    /// Site-relative path as found in the item's anchor.
    pub url: String,
}

/// One page of a listing plus whether the site advertises another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub entries: Vec<ListingSummary>,
    pub has_next_page: bool,
}

/// Publication status as reported by the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ongoing,
    Completed,
    Unknown,
}

/// Full metadata record for one content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    /// Empty title means the saved reference is stale, not that data is missing.
    pub title: String,
    pub author: String,
    pub artist: String,
    /// Site order, duplicates kept.
    pub genres: Vec<String>,
    pub status: Status,
    pub description: String,
    pub thumbnail_url: String,
}

impl ContentDetails {
    /// Genres as a single comma-separated string.
    pub fn genre(&self) -> String {
        self.genres.join(", ")
    }
}

/// One orderable, fetchable unit of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub name: String,
    /// Credited groups joined with ", "; may be empty.
    pub scanlator: String,
    /// Epoch millis. 0 means the date was missing or unparseable.
    pub upload_timestamp: i64,
    pub url: String,
}

/// One viewable image within a chapter, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageImage {
    /// Zero-based position in the chapter.
    pub index: usize,
    /// URL of the chapter document the image was listed in.
    pub document_url: String,
    pub image_url: String,
}
