//! Stale-reference detection for details and chapter lists.
//!
//! The site keeps serving well-formed pages for items that moved; an empty title or an empty
//! chapter list (or a page whose expected structure is gone) means the saved URL must be
//! re-resolved by the user.

use crate::model::{Chapter, ContentDetails};
use crate::source::error::SourceError;

pub fn guard_details(
    result: Result<ContentDetails, SourceError>,
) -> Result<ContentDetails, SourceError> {
    match result {
        Ok(details) if !details.title.is_empty() => Ok(details),
        Ok(_) => {
            tracing::warn!("details page has an empty title; item has moved");
            Err(SourceError::StaleSource)
        }
        Err(e) => {
            tracing::warn!(error = %e, "details extraction failed; item has moved");
            Err(SourceError::StaleSource)
        }
    }
}

pub fn guard_chapters(
    result: Result<Vec<Chapter>, SourceError>,
) -> Result<Vec<Chapter>, SourceError> {
    match result {
        Ok(chapters) if !chapters.is_empty() => Ok(chapters),
        Ok(_) => {
            tracing::warn!("chapter list is empty; item has moved");
            Err(SourceError::StaleSource)
        }
        Err(e) => {
            tracing::warn!(error = %e, "chapter list extraction failed; item has moved");
            Err(SourceError::StaleSource)
        }
    }
}
