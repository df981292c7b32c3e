//! Golden Mangás source: request building, fetching, extraction, and the operation contract.

mod client;
mod error;
mod extract;
mod guard;
mod normalize;
mod request;

pub use client::{PoliteClient, PoliteClientBuilder};
pub use error::{SourceError, CHAPTER_IS_TEXT_ONLY, MIGRATE_WARNING};
pub use extract::{
    extract_chapters, extract_details, extract_listing, extract_pages, has_next_page, Document,
    ListingKind,
};
pub use guard::{guard_chapters, guard_details};
pub use normalize::{parse_date, parse_status, strip_label, strip_language_tag};
pub use request::{Request, RequestBuilder};

use crate::model::{Chapter, ContentDetails, ListingPage, PageImage};
use reqwest::Url;

pub const NAME: &str = "Golden Mangás";
pub const LANG: &str = "pt-BR";
pub const BASE_URL: &str = "https://goldenmanga.top";
/// Stable source identifier, independent of name and language.
pub const ID: i64 = 6858719406079923084;

/// Operations a host can run against a content source.
///
/// Each operation builds its request, fetches through the source's rate-limited client, and
/// extracts entities from the response.
pub trait Source {
    fn name(&self) -> &str;
    fn lang(&self) -> &str;
    fn base_url(&self) -> &Url;
    fn supports_latest(&self) -> bool;

    fn popular(&mut self) -> Result<ListingPage, SourceError>;
    /// `page` is 1-based.
    fn latest(&mut self, page: u32) -> Result<ListingPage, SourceError>;
    fn search(&mut self, query: &str) -> Result<ListingPage, SourceError>;
    fn details(&mut self, url: &str) -> Result<ContentDetails, SourceError>;
    fn chapters(&mut self, url: &str) -> Result<Vec<Chapter>, SourceError>;
    fn pages(&mut self, chapter_url: &str) -> Result<Vec<PageImage>, SourceError>;
    /// Raw image bytes for a page returned by [Source::pages].
    fn image(&mut self, page: &PageImage) -> Result<Vec<u8>, SourceError>;
}

fn parse_listing(doc: &Document, kind: ListingKind) -> Result<ListingPage, SourceError> {
    Ok(ListingPage {
        entries: extract_listing(doc, kind)?,
        has_next_page: has_next_page(doc, kind)?,
    })
}

pub fn parse_popular(doc: &Document) -> Result<ListingPage, SourceError> {
    parse_listing(doc, ListingKind::Popular)
}

pub fn parse_latest(doc: &Document) -> Result<ListingPage, SourceError> {
    parse_listing(doc, ListingKind::Latest)
}

pub fn parse_search(doc: &Document) -> Result<ListingPage, SourceError> {
    parse_listing(doc, ListingKind::Search)
}

pub fn parse_details(doc: &Document) -> Result<ContentDetails, SourceError> {
    guard_details(extract_details(doc))
}

pub fn parse_chapter_list(doc: &Document) -> Result<Vec<Chapter>, SourceError> {
    guard_chapters(extract_chapters(doc))
}

pub fn parse_page_list(doc: &Document) -> Result<Vec<PageImage>, SourceError> {
    extract_pages(doc)
}

/// Golden Mangás adapter. Holds a reference to the shared polite client.
pub struct GoldenMangas<'a> {
    client: &'a mut PoliteClient,
    requests: RequestBuilder,
}

impl<'a> GoldenMangas<'a> {
    /// Adapter for the production site.
    pub fn new(client: &'a mut PoliteClient) -> Result<Self, SourceError> {
        let base_url = Url::parse(BASE_URL).map_err(|e| SourceError::InvalidUrl {
            input: BASE_URL.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::with_base_url(client, base_url))
    }

    /// Adapter for a mirror or a local test server.
    pub fn with_base_url(client: &'a mut PoliteClient, base_url: Url) -> Self {
        Self {
            client,
            requests: RequestBuilder::new(base_url),
        }
    }

    pub fn requests(&self) -> &RequestBuilder {
        &self.requests
    }
}

impl Source for GoldenMangas<'_> {
    fn name(&self) -> &str {
        NAME
    }

    fn lang(&self) -> &str {
        LANG
    }

    fn base_url(&self) -> &Url {
        self.requests.base_url()
    }

    fn supports_latest(&self) -> bool {
        true
    }

    fn popular(&mut self) -> Result<ListingPage, SourceError> {
        let request = self.requests.popular_request();
        parse_popular(&self.client.fetch_document(&request)?)
    }

    fn latest(&mut self, page: u32) -> Result<ListingPage, SourceError> {
        let request = self.requests.latest_request(page);
        parse_latest(&self.client.fetch_document(&request)?)
    }

    fn search(&mut self, query: &str) -> Result<ListingPage, SourceError> {
        let request = self.requests.search_request(query)?;
        parse_search(&self.client.fetch_document(&request)?)
    }

    fn details(&mut self, url: &str) -> Result<ContentDetails, SourceError> {
        let request = self.requests.details_request(url)?;
        parse_details(&self.client.fetch_document(&request)?)
    }

    fn chapters(&mut self, url: &str) -> Result<Vec<Chapter>, SourceError> {
        let request = self.requests.chapter_list_request(url)?;
        parse_chapter_list(&self.client.fetch_document(&request)?)
    }

    fn pages(&mut self, chapter_url: &str) -> Result<Vec<PageImage>, SourceError> {
        let request = self.requests.chapter_page_request(chapter_url)?;
        parse_page_list(&self.client.fetch_document(&request)?)
    }

    fn image(&mut self, page: &PageImage) -> Result<Vec<u8>, SourceError> {
        let request = self
            .requests
            .image_request(&page.document_url, &page.image_url)?;
        self.client.fetch_bytes(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn doc(html: &str, url: &str) -> Result<Document, SourceError> {
        let url = Url::parse(url).map_err(|e| SourceError::InvalidUrl {
            input: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Document::parse(html, url))
    }

    #[test]
    fn empty_title_node_is_stale_not_parse_error() -> Result<(), SourceError> {
        let html = r#"<div class="row"><div class="col-sm-8"><div class="row">
<div class="col-sm-4 text-right"><img src="/capa.jpg"></div>
<div class="col-sm-8"><h2> (Pt-br) </h2><h5>Autor: Ninguém</h5></div>
</div></div></div>"#;
        let d = doc(html, "https://goldenmanga.top/mangabr/sumiu")?;
        assert!(matches!(parse_details(&d), Err(SourceError::StaleSource)));
        Ok(())
    }

    #[test]
    fn missing_details_block_is_stale() -> Result<(), SourceError> {
        let d = doc("<html><body><h1>Golden Mangás</h1></body></html>", BASE_URL)?;
        assert!(matches!(parse_details(&d), Err(SourceError::StaleSource)));
        Ok(())
    }

    #[test]
    fn details_with_title_are_returned() -> Result<(), SourceError> {
        let html = r#"<div class="row"><div class="col-sm-8"><div class="row">
<div class="col-sm-4 text-right"><img src="/capa.jpg"></div>
<div class="col-sm-8"><h2>Vinland Saga</h2><h5>Status: <a>Completo</a></h5></div>
</div></div></div>"#;
        let d = doc(html, "https://goldenmanga.top/mangabr/vinland-saga")?;
        let details = parse_details(&d)?;
        assert_eq!(details.title, "Vinland Saga");
        assert_eq!(details.status, Status::Completed);
        Ok(())
    }

    #[test]
    fn empty_chapter_list_is_stale() -> Result<(), SourceError> {
        let d = doc(r#"<ul id="capitulos"></ul>"#, "https://goldenmanga.top/mangabr/x")?;
        assert!(matches!(
            parse_chapter_list(&d),
            Err(SourceError::StaleSource)
        ));
        Ok(())
    }

    #[test]
    fn chapter_list_passes_through_guard() -> Result<(), SourceError> {
        let html = r#"<ul id="capitulos"><li class="row">
<a href="/mangabr/x/1"><div class="col-sm-5">Cap 1 <span style="c">(10/01/2020)</span></div></a>
<div class="col-sm-5 text-right"><a href="https://scan.example">Scan A</a><a href="https://scan.b">Scan B</a></div>
</li></ul>"#;
        let d = doc(html, "https://goldenmanga.top/mangabr/x")?;
        let chapters = parse_chapter_list(&d)?;
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].scanlator, "Scan A, Scan B");
        assert_eq!(chapters[0].upload_timestamp, parse_date("(10/01/2020)"));
        Ok(())
    }

    #[test]
    fn text_only_page_list_is_not_stale() -> Result<(), SourceError> {
        let d = doc(
            r#"<div class="block_text_border">Texto</div>"#,
            "https://goldenmanga.top/mangabr/x/1",
        )?;
        assert!(matches!(
            parse_page_list(&d),
            Err(SourceError::ChapterIsTextOnly)
        ));
        Ok(())
    }

    #[test]
    fn popular_and_search_report_no_next_page() -> Result<(), SourceError> {
        let html = r#"<div id="maisLidos"><div class="itemmanga" href="/mangabr/a"><img src="/a.jpg"><h3>A</h3></div></div>
<div class="mangas col-lg-2"><a href="/mangabr/b"><img src="/b.jpg"><h3>B</h3></a></div>
<ul class="pagination"><li><a href="?pagina=2">2</a></li></ul>"#;
        let d = doc(html, BASE_URL)?;
        let popular = parse_popular(&d)?;
        assert_eq!(popular.entries.len(), 1);
        assert!(!popular.has_next_page);
        let search = parse_search(&d)?;
        assert_eq!(search.entries[0].title, "B");
        assert!(!search.has_next_page);
        assert!(parse_latest(&d)?.has_next_page);
        Ok(())
    }

    #[test]
    fn adapter_reports_identity() -> Result<(), Box<dyn std::error::Error>> {
        let mut client = PoliteClient::builder().interval_secs(0).build()?;
        let source = GoldenMangas::new(&mut client)?;
        assert_eq!(source.name(), "Golden Mangás");
        assert_eq!(source.lang(), "pt-BR");
        assert!(source.supports_latest());
        assert_eq!(source.base_url().as_str(), "https://goldenmanga.top/");
        assert_eq!(
            source.requests().latest_request(2).url.as_str(),
            "https://goldenmanga.top/index.php?pagina=2"
        );
        Ok(())
    }
}
