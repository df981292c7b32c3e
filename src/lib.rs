//! goldenmangas: Golden Mangás source adapter with a small command-line host.

pub mod cli;
pub mod config;
pub mod model;
pub mod source;

// Re-exports for CLI and consumers.
pub use model::{Chapter, ContentDetails, ListingPage, ListingSummary, PageImage, Status};
pub use source::{
    GoldenMangas, PoliteClient, PoliteClientBuilder, Request, RequestBuilder, Source, SourceError,
};
